use crate::map::{MapRenderer, Viewport};
use crate::ui;
use ratatui::layout::Rect;
use waste_dashboard::binder::{self, Payloads, Selection};
use waste_dashboard::dataset::{columns, normalize_name, BBox, DataContext, DistrictShape};

/// Application state of the map dashboard
pub struct App<'a> {
    pub ctx: &'a DataContext,
    pub viewport: Viewport,
    pub map_renderer: MapRenderer,
    pub selection: Selection,
    pub should_quit: bool,
    /// Inner rect of the map panel, in terminal cells
    pub map_area: Rect,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Current mouse position for hover and cursor marker
    pub mouse_pos: Option<(u16, u16)>,
    /// Set once a press turns into a drag, so release does not select
    dragged: bool,
}

impl<'a> App<'a> {
    pub fn new(ctx: &'a DataContext, width: u16, height: u16) -> Self {
        let map_area = ui::layout(Rect::new(0, 0, width, height)).map_inner;
        let mut app = Self {
            ctx,
            viewport: Viewport::fit(&BBox::EMPTY, 0, 0),
            map_renderer: MapRenderer::new(),
            selection: Selection::Unselected,
            should_quit: false,
            map_area,
            last_mouse: None,
            mouse_pos: None,
            dragged: false,
        };
        app.reset_view();
        app
    }

    fn state_bbox(&self) -> BBox {
        self.ctx
            .boundaries
            .as_ref()
            .map(|b| b.bbox())
            .unwrap_or(BBox::EMPTY)
    }

    /// Braille gives 2x4 resolution per character
    fn pixel_size(&self) -> (usize, usize) {
        (self.map_area.width as usize * 2, self.map_area.height as usize * 4)
    }

    /// Fit the whole state into the map panel
    pub fn reset_view(&mut self) {
        let (w, h) = self.pixel_size();
        self.viewport = Viewport::fit(&self.state_bbox(), w, h);
    }

    /// Update viewport size when terminal resizes
    pub fn resize(&mut self, width: u16, height: u16) {
        self.map_area = ui::layout(Rect::new(0, 0, width, height)).map_inner;
        let (w, h) = self.pixel_size();
        self.viewport.width = w;
        self.viewport.height = h;
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    /// Terminal cell to braille pixel inside the map panel
    pub fn to_map_pixel(&self, col: u16, row: u16) -> Option<(i32, i32)> {
        let area = self.map_area;
        let inside = col >= area.x && col < area.x + area.width && row >= area.y && row < area.y + area.height;
        inside.then(|| {
            // Center of the cell's 2x4 block
            let px = (col - area.x) as i32 * 2 + 1;
            let py = (row - area.y) as i32 * 4 + 2;
            (px, py)
        })
    }

    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        match self.to_map_pixel(col, row) {
            Some((px, py)) => self.viewport.zoom_in_at(px, py),
            None => self.viewport.zoom_in(),
        }
    }

    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        match self.to_map_pixel(col, row) {
            Some((px, py)) => self.viewport.zoom_out_at(px, py),
            None => self.viewport.zoom_out(),
        }
    }

    /// District under a terminal cell
    pub fn district_at(&self, col: u16, row: u16) -> Option<&'a DistrictShape> {
        let (px, py) = self.to_map_pixel(col, row)?;
        let (lon, lat) = self.viewport.unproject(px, py);
        let ctx = self.ctx;
        ctx.boundaries.as_ref()?.locate(lon, lat)
    }

    /// Map click. Clicking outside every district keeps the current selection.
    pub fn select_at(&mut self, col: u16, row: u16) {
        if let Some(shape) = self.district_at(col, row) {
            self.select(shape.name.clone());
        }
    }

    pub fn select(&mut self, district: String) {
        tracing::info!(district = %district, "district selected");
        self.selection = Selection::Selected(district);
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::Unselected;
    }

    /// Step through the sheet's districts, wrapping around
    pub fn cycle_district(&mut self, step: isize) {
        let names: Vec<&str> = self.ctx.table.names().collect();
        if names.is_empty() {
            return;
        }
        let len = names.len() as isize;
        let current = self.selection.district().and_then(|d| {
            let key = normalize_name(d);
            names.iter().position(|n| normalize_name(n) == key)
        });
        let next = match current {
            Some(idx) => (idx as isize + step).rem_euclid(len),
            None if step >= 0 => 0,
            None => len - 1,
        };
        self.select(names[next as usize].to_string());
    }

    /// Payloads for the current selection, derived fresh on each call
    pub fn payloads(&self) -> Payloads {
        binder::bind_map_click(&self.selection, self.ctx)
    }

    /// Hover text for the district under the mouse
    pub fn hover_info(&self) -> Option<String> {
        let (col, row) = self.mouse_pos?;
        let shape = self.district_at(col, row)?;
        Some(match self.ctx.table.get(&shape.name) {
            Some(record) => format!(
                "{} · Waste Generated: {:.2} TPD",
                shape.name,
                record.value(columns::SW_GENERATED)
            ),
            None => format!("{} · no data", shape.name),
        })
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom)
    }

    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    pub fn mouse_down(&mut self, col: u16, row: u16) {
        self.last_mouse = Some((col, row));
        self.dragged = false;
    }

    /// Pan by the mouse delta since the last event
    pub fn handle_drag(&mut self, col: u16, row: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - col as i32;
            let dy = last_y as i32 - row as i32;
            if dx != 0 || dy != 0 {
                self.dragged = true;
                self.pan(dx * 2, dy * 4);
            }
        }
        self.last_mouse = Some((col, row));
    }

    /// Release without a drag is a click
    pub fn mouse_up(&mut self, col: u16, row: u16) {
        if self.last_mouse.is_some() && !self.dragged {
            self.select_at(col, row);
        }
        self.last_mouse = None;
        self.dragged = false;
    }

    /// Mouse position in braille pixels relative to the map panel
    pub fn mouse_pixel_pos(&self) -> Option<(i32, i32)> {
        self.mouse_pos
            .and_then(|(col, row)| self.to_map_pixel(col, row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;
    use waste_dashboard::binder::ViewStatus;
    use waste_dashboard::dataset::{DistrictBoundaries, DistrictRecord, DistrictTable};

    fn shape(name: &str, lon0: f64, lon1: f64) -> DistrictShape {
        let ring = vec![
            DVec2::new(lon0, 23.0),
            DVec2::new(lon1, 23.0),
            DVec2::new(lon1, 24.0),
            DVec2::new(lon0, 24.0),
        ];
        let mut bbox = BBox::EMPTY;
        for p in &ring {
            bbox.extend(p.x, p.y);
        }
        DistrictShape {
            name: name.to_string(),
            polygons: vec![vec![ring]],
            bbox,
        }
    }

    fn context() -> DataContext {
        let table = DistrictTable::from_records(vec![
            DistrictRecord::new("Sehore").with(columns::SW_GENERATED, 120.0),
            DistrictRecord::new("Raisen").with(columns::SW_GENERATED, 80.0),
        ]);
        let boundaries = DistrictBoundaries::from_shapes(vec![
            shape("SEHORE", 76.0, 77.0),
            shape("Vidisha", 77.0, 78.0),
        ])
        .unwrap();
        DataContext::new(table).with_boundaries(boundaries)
    }

    /// Terminal cell over a geographic point
    fn cell_over(app: &App, lon: f64, lat: f64) -> (u16, u16) {
        let (px, py) = app.viewport.project(lon, lat);
        (
            app.map_area.x + (px / 2) as u16,
            app.map_area.y + (py / 4) as u16,
        )
    }

    #[test]
    fn test_click_selects_district_under_cursor() {
        let ctx = context();
        let mut app = App::new(&ctx, 160, 50);
        let (col, row) = cell_over(&app, 76.5, 23.5);
        app.mouse_down(col, row);
        app.mouse_up(col, row);
        assert_eq!(app.selection, Selection::select("SEHORE"));
        // Sheet spells it differently; lookup is case-insensitive
        assert_eq!(app.payloads().status, ViewStatus::Ready);
    }

    #[test]
    fn test_click_on_district_without_row_is_no_data() {
        let ctx = context();
        let mut app = App::new(&ctx, 160, 50);
        let (col, row) = cell_over(&app, 77.5, 23.5);
        app.select_at(col, row);
        assert_eq!(app.selection, Selection::select("Vidisha"));
        assert_eq!(app.payloads().status, ViewStatus::NoData);
    }

    #[test]
    fn test_click_outside_districts_keeps_selection() {
        let ctx = context();
        let mut app = App::new(&ctx, 160, 50);
        app.select("Raisen".to_string());
        app.select_at(app.map_area.x, app.map_area.y);
        assert_eq!(app.selection, Selection::select("Raisen"));
    }

    #[test]
    fn test_drag_does_not_select() {
        let ctx = context();
        let mut app = App::new(&ctx, 160, 50);
        let (col, row) = cell_over(&app, 76.5, 23.5);
        app.mouse_down(col, row);
        app.handle_drag(col + 3, row);
        app.mouse_up(col + 3, row);
        assert_eq!(app.selection, Selection::Unselected);
    }

    #[test]
    fn test_cycle_wraps_through_sheet_order() {
        let ctx = context();
        let mut app = App::new(&ctx, 160, 50);
        app.cycle_district(1);
        assert_eq!(app.selection.district(), Some("Sehore"));
        app.cycle_district(1);
        assert_eq!(app.selection.district(), Some("Raisen"));
        app.cycle_district(1);
        assert_eq!(app.selection.district(), Some("Sehore"));
        app.clear_selection();
        app.cycle_district(-1);
        assert_eq!(app.selection.district(), Some("Raisen"));
    }

    #[test]
    fn test_unselected_payloads_prompt() {
        let ctx = context();
        let app = App::new(&ctx, 160, 50);
        assert_eq!(app.payloads().status, ViewStatus::Prompt);
    }

    #[test]
    fn test_hover_info() {
        let ctx = context();
        let mut app = App::new(&ctx, 160, 50);
        let (col, row) = cell_over(&app, 76.5, 23.5);
        app.set_mouse_pos(col, row);
        assert_eq!(
            app.hover_info().as_deref(),
            Some("SEHORE · Waste Generated: 120.00 TPD")
        );
        app.mouse_pos = None;
        assert!(app.hover_info().is_none());
    }
}
