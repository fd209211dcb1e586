use crate::braille::BrailleCanvas;
use crate::map::geometry::{draw_line, fill_rings};
use crate::map::projection::Viewport;
use glam::DVec2;
use ratatui::style::Color;
use rayon::prelude::*;
use waste_dashboard::dataset::{columns, normalize_name, DataContext, DistrictShape, Ring};

/// Upper end of the choropleth scale, in TPD generated
pub const COLOR_RANGE_TPD: f64 = 1500.0;

/// Every n-th pixel of a fill is lit, leaving room for outlines
const FILL_STRIDE: usize = 2;

/// Blue (0 TPD) to red (>= 1500 TPD); districts absent from the sheet are gray
pub fn choropleth_color(generated: Option<f64>) -> Color {
    match generated {
        None => Color::DarkGray,
        Some(value) => {
            let t = (value / COLOR_RANGE_TPD).clamp(0.0, 1.0);
            let red = (255.0 * t).round() as u8;
            Color::Rgb(red, 0, 255 - red)
        }
    }
}

/// Display settings for map layers
#[derive(Clone)]
pub struct DisplaySettings {
    pub show_fill: bool,
    pub show_outlines: bool,
    pub show_labels: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_fill: true,
            show_outlines: true,
            show_labels: false,
        }
    }
}

/// One district's shading
pub struct DistrictFill {
    pub color: Color,
    pub canvas: BrailleCanvas,
}

/// Rendered layers, back to front
pub struct MapLayers {
    pub fills: Vec<DistrictFill>,
    pub outlines: BrailleCanvas,
    pub highlight: BrailleCanvas,
    pub labels: Vec<(u16, u16, String)>,
}

impl MapLayers {
    fn empty(width: usize, height: usize) -> Self {
        Self {
            fills: Vec::new(),
            outlines: BrailleCanvas::new(width, height),
            highlight: BrailleCanvas::new(width, height),
            labels: Vec::new(),
        }
    }
}

/// Choropleth of the district boundaries
pub struct MapRenderer {
    pub settings: DisplaySettings,
}

impl MapRenderer {
    pub fn new() -> Self {
        Self {
            settings: DisplaySettings::default(),
        }
    }

    /// Render all districts. `width`/`height` are in terminal cells.
    pub fn render(
        &self,
        ctx: &DataContext,
        selected: Option<&str>,
        width: usize,
        height: usize,
        viewport: &Viewport,
    ) -> MapLayers {
        let mut layers = MapLayers::empty(width, height);
        let Some(boundaries) = ctx.boundaries.as_ref() else {
            return layers;
        };
        let selected = selected.map(normalize_name);

        if self.settings.show_fill {
            layers.fills = boundaries
                .shapes()
                .par_iter()
                .filter_map(|shape| {
                    let generated = ctx
                        .table
                        .get(&shape.name)
                        .map(|r| r.value(columns::SW_GENERATED));
                    fill_district(shape, viewport, width, height).map(|canvas| DistrictFill {
                        color: choropleth_color(generated),
                        canvas,
                    })
                })
                .collect();
        }

        for shape in boundaries.shapes() {
            let is_selected = selected.as_deref() == Some(normalize_name(&shape.name).as_str());
            if is_selected {
                for ring in shape.rings() {
                    draw_ring(&mut layers.highlight, ring, viewport);
                }
            } else if self.settings.show_outlines {
                for ring in shape.rings() {
                    draw_ring(&mut layers.outlines, ring, viewport);
                }
            }

            if self.settings.show_labels {
                let (lon, lat) = shape.bbox.center();
                let (px, py) = viewport.project(lon, lat);
                if px >= 0 && py >= 0 && (px as usize) < viewport.width && (py as usize) < viewport.height {
                    let half = (shape.name.chars().count() / 2) as i32;
                    let char_x = ((px / 2) - half).max(0) as u16;
                    layers.labels.push((char_x, (py / 4) as u16, shape.name.clone()));
                }
            }
        }

        layers
    }

    pub fn toggle_fill(&mut self) {
        self.settings.show_fill = !self.settings.show_fill;
    }

    pub fn toggle_outlines(&mut self) {
        self.settings.show_outlines = !self.settings.show_outlines;
    }

    pub fn toggle_labels(&mut self) {
        self.settings.show_labels = !self.settings.show_labels;
    }
}

impl Default for MapRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Shade one district, None when it is entirely off screen
fn fill_district(shape: &DistrictShape, viewport: &Viewport, width: usize, height: usize) -> Option<BrailleCanvas> {
    let top_left = viewport.project_f(shape.bbox.min_lon, shape.bbox.max_lat);
    let bottom_right = viewport.project_f(shape.bbox.max_lon, shape.bbox.min_lat);
    if bottom_right.x < 0.0
        || bottom_right.y < 0.0
        || top_left.x >= viewport.width as f64
        || top_left.y >= viewport.height as f64
    {
        return None;
    }

    let rings: Vec<Vec<DVec2>> = shape
        .rings()
        .map(|ring| ring.iter().map(|p| viewport.project_f(p.x, p.y)).collect())
        .collect();

    let mut canvas = BrailleCanvas::new(width, height);
    fill_rings(&mut canvas, &rings, FILL_STRIDE);
    (!canvas.is_blank()).then_some(canvas)
}

/// Draw a closed ring with viewport culling
fn draw_ring(canvas: &mut BrailleCanvas, ring: &Ring, viewport: &Viewport) {
    if ring.len() < 2 {
        return;
    }

    let mut prev: Option<(i32, i32)> = None;
    for p in ring.iter().chain(ring.first()) {
        let (px, py) = viewport.project(p.x, p.y);
        if let Some((prev_x, prev_y)) = prev {
            if (prev_x, prev_y) != (px, py) && viewport.line_might_be_visible((prev_x, prev_y), (px, py)) {
                draw_line(canvas, prev_x, prev_y, px, py);
            }
        }
        prev = Some((px, py));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waste_dashboard::dataset::{BBox, DistrictBoundaries, DistrictRecord, DistrictTable};

    fn shape(name: &str, lon0: f64, lat0: f64, lon1: f64, lat1: f64) -> DistrictShape {
        let ring = vec![
            DVec2::new(lon0, lat0),
            DVec2::new(lon1, lat0),
            DVec2::new(lon1, lat1),
            DVec2::new(lon0, lat1),
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
            DistrictRecord::new("West").with(columns::SW_GENERATED, 1500.0),
        ]);
        let boundaries = DistrictBoundaries::from_shapes(vec![
            shape("West", 76.0, 23.0, 77.0, 24.0),
            shape("East", 77.0, 23.0, 78.0, 24.0),
        ])
        .unwrap();
        DataContext::new(table).with_boundaries(boundaries)
    }

    #[test]
    fn test_choropleth_scale() {
        assert_eq!(choropleth_color(Some(0.0)), Color::Rgb(0, 0, 255));
        assert_eq!(choropleth_color(Some(3000.0)), Color::Rgb(255, 0, 0));
        assert_eq!(choropleth_color(Some(-5.0)), Color::Rgb(0, 0, 255));
        assert_eq!(choropleth_color(None), Color::DarkGray);
    }

    #[test]
    fn test_fills_colored_by_generation() {
        let ctx = context();
        let bbox = ctx.boundaries.as_ref().unwrap().bbox();
        let viewport = Viewport::fit(&bbox, 80, 40);
        let layers = MapRenderer::new().render(&ctx, None, 40, 10, &viewport);
        assert_eq!(layers.fills.len(), 2);
        let colors: Vec<Color> = layers.fills.iter().map(|f| f.color).collect();
        assert!(colors.contains(&Color::Rgb(255, 0, 0)));
        assert!(colors.contains(&Color::DarkGray));
        assert!(!layers.outlines.is_blank());
        assert!(layers.highlight.is_blank());
    }

    #[test]
    fn test_selected_district_is_highlighted() {
        let ctx = context();
        let bbox = ctx.boundaries.as_ref().unwrap().bbox();
        let viewport = Viewport::fit(&bbox, 80, 40);
        let layers = MapRenderer::new().render(&ctx, Some(" west "), 40, 10, &viewport);
        assert!(!layers.highlight.is_blank());
    }

    #[test]
    fn test_offscreen_districts_not_filled() {
        let ctx = context();
        let viewport = Viewport::new(0.0, 0.0, 50.0, 80, 40);
        let layers = MapRenderer::new().render(&ctx, None, 40, 10, &viewport);
        assert!(layers.fills.is_empty());
    }

    #[test]
    fn test_no_boundaries_renders_nothing() {
        let ctx = DataContext::new(DistrictTable::default());
        let viewport = Viewport::new(78.0, 24.0, 30.0, 80, 40);
        let layers = MapRenderer::new().render(&ctx, None, 40, 10, &viewport);
        assert!(layers.fills.is_empty());
        assert!(layers.outlines.is_blank());
    }
}
