use crate::app::App;
use crate::braille::BrailleCanvas;
use crate::map::{choropleth_color, MapLayers, COLOR_RANGE_TPD};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget, Wrap,
    },
    Frame,
};
use std::str::FromStr;
use waste_dashboard::binder::{self, KpiCard, LineChart, Payloads, PieChart, ViewStatus};

const TITLE: &str = "Madhya Pradesh · District Waste Dashboard";
const CARDS_PER_ROW: usize = 3;

/// Screen regions shared by rendering and mouse hit-testing
pub struct Areas {
    pub title: Rect,
    pub map: Rect,
    /// Map panel without its border
    pub map_inner: Rect,
    pub dashboard: Rect,
    pub status: Rect,
}

pub fn layout(area: Rect) -> Areas {
    let rows = Layout::vertical([
        Constraint::Length(1), // Title
        Constraint::Min(3),    // Map and dashboard
        Constraint::Length(1), // Status bar
    ])
    .split(area);
    let body = Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).split(rows[1]);

    Areas {
        title: rows[0],
        map: body[0],
        map_inner: map_block().inner(body[0]),
        dashboard: body[1],
        status: rows[2],
    }
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let areas = layout(frame.area());
    let payloads = app.payloads();

    let title = Paragraph::new(Line::from(Span::styled(
        TITLE,
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(title, areas.title);

    render_map(frame, app, areas.map);
    render_dashboard(frame, &payloads, areas.dashboard);
    render_status_bar(frame, app, areas.status);
}

fn map_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Waste Generated (TPD) ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
}

/// Blue to red ramp shown under the map
fn color_scale() -> Line<'static> {
    let steps = 6;
    let mut spans = vec![Span::styled(" 0 ", Style::default().fg(Color::Gray))];
    for i in 0..steps {
        let value = COLOR_RANGE_TPD * i as f64 / (steps - 1) as f64;
        spans.push(Span::styled("██", Style::default().fg(choropleth_color(Some(value)))));
    }
    spans.push(Span::styled(
        format!(" {COLOR_RANGE_TPD:.0}+ "),
        Style::default().fg(Color::Gray),
    ));
    spans.push(Span::styled("██", Style::default().fg(choropleth_color(None))));
    spans.push(Span::styled(" no data ", Style::default().fg(Color::Gray)));
    Line::from(spans)
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = map_block().title_bottom(color_scale());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut viewport = app.viewport.clone();
    // Braille gives 2x4 resolution per character
    viewport.width = inner.width as usize * 2;
    viewport.height = inner.height as usize * 4;

    let layers = app.map_renderer.render(
        app.ctx,
        app.selection.district(),
        inner.width as usize,
        inner.height as usize,
        &viewport,
    );

    let cursor_pos = app.mouse_pixel_pos().and_then(|(px, py)| {
        let cx = (px / 2) as u16;
        let cy = (py / 4) as u16;
        (cx < inner.width && cy < inner.height).then_some((cx, cy))
    });

    frame.render_widget(MapWidget { layers, cursor_pos }, inner);
}

/// Braille choropleth with text labels overlaid
struct MapWidget {
    layers: MapLayers,
    cursor_pos: Option<(u16, u16)>,
}

impl MapWidget {
    /// Render a braille canvas layer with a specific color
    fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        for row in 0..area.height {
            for col in 0..area.width {
                if let Some(ch) = canvas.cell(col as usize, row as usize) {
                    buf[(area.x + col, area.y + row)].set_char(ch).set_fg(color);
                }
            }
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Back to front: fills, outlines, selected district
        for fill in &self.layers.fills {
            Self::render_layer(&fill.canvas, fill.color, area, buf);
        }
        Self::render_layer(&self.layers.outlines, Color::Gray, area, buf);
        Self::render_layer(&self.layers.highlight, Color::White, area, buf);

        let label_style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
        for (lx, ly, text) in &self.layers.labels {
            if *ly >= area.height || *lx >= area.width {
                continue;
            }
            let max_len = (area.width - *lx) as usize;
            for (i, ch) in text.chars().take(max_len).enumerate() {
                buf[(area.x + *lx + i as u16, area.y + *ly)].set_char(ch).set_style(label_style);
            }
        }

        if let Some((cx, cy)) = self.cursor_pos {
            buf[(area.x + cx, area.y + cy)].set_char('╋').set_fg(Color::Yellow);
        }
    }
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(Color::Cyan),
        ))
}

/// Payload colors are CSS names or hex strings
fn css_color(name: &str) -> Color {
    Color::from_str(name).unwrap_or(Color::White)
}

fn render_dashboard(frame: &mut Frame, payloads: &Payloads, area: Rect) {
    let card_rows = payloads.kpi_cards.len().div_ceil(CARDS_PER_ROW).max(1) as u16;
    let rows = Layout::vertical([
        Constraint::Length(card_rows * 3),
        Constraint::Percentage(40),
        Constraint::Min(6),
    ])
    .split(area);

    match &payloads.notice {
        Some(notice) => render_notice(frame, payloads.status, notice, rows[0]),
        None => render_cards(frame, &payloads.kpi_cards, rows[0]),
    }
    render_population(frame, &payloads.population, rows[1]);

    let bottom = Layout::horizontal([
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ])
    .split(rows[2]);
    render_bars(frame, payloads.waste_bars.first(), bottom[0]);
    render_pie(frame, payloads.processed_pies.first(), "Processed vs Gap (TPD)", bottom[1]);
    render_pie(frame, payloads.composition.as_ref(), binder::COMPOSITION_TITLE, bottom[2]);
}

fn render_notice(frame: &mut Frame, status: ViewStatus, notice: &str, area: Rect) {
    let color = match status {
        ViewStatus::Error => Color::Red,
        ViewStatus::NoData => Color::Gray,
        _ => Color::Yellow,
    };
    let paragraph = Paragraph::new(Span::styled(notice, Style::default().fg(color)))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
    frame.render_widget(paragraph, area);
}

fn render_cards(frame: &mut Frame, cards: &[KpiCard], area: Rect) {
    let rows: Vec<&[KpiCard]> = cards.chunks(CARDS_PER_ROW).collect();
    let row_areas = Layout::vertical(vec![Constraint::Length(3); rows.len()]).split(area);

    for (row, row_area) in rows.iter().zip(row_areas.iter()) {
        let n = row.len() as u32;
        let cols = Layout::horizontal(vec![Constraint::Ratio(1, n); row.len()]).split(*row_area);
        for (card, col) in row.iter().zip(cols.iter()) {
            let value = Paragraph::new(Span::styled(
                card.value.as_str(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center)
            .block(panel(&card.title));
            frame.render_widget(value, *col);
        }
    }
}

fn render_population(frame: &mut Frame, chart: &LineChart, area: Rect) {
    let block = panel(&chart.title);
    if chart.is_empty() {
        frame.render_widget(block, area);
        return;
    }

    let data: Vec<(f64, f64)> = chart.y.iter().enumerate().map(|(i, v)| (i as f64, *v)).collect();
    let y_max = chart.y.iter().copied().fold(0.0_f64, f64::max);
    let y_top = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    let dataset = Dataset::default()
        .name(chart.y_title.as_str())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&data);

    let axis_style = Style::default().fg(Color::DarkGray);
    let widget = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .style(axis_style)
                .bounds([0.0, (chart.x.len().max(2) - 1) as f64])
                .labels(chart.x.iter().map(String::as_str)),
        )
        .y_axis(
            Axis::default()
                .style(axis_style)
                .bounds([0.0, y_top])
                .labels([0.0, y_top / 2.0, y_top].map(binder::format_thousands)),
        );
    frame.render_widget(widget, area);
}

fn render_bars(frame: &mut Frame, chart: Option<&binder::BarChart>, area: Rect) {
    let Some(chart) = chart.filter(|c| !c.bars.is_empty()) else {
        frame.render_widget(panel("Current Waste Metrics (TPD)"), area);
        return;
    };

    // Bars take integers; keep two decimals of resolution
    let scaled = |v: f64| (v.max(0.0) * 100.0).round() as u64;
    let bars: Vec<Bar> = chart
        .bars
        .iter()
        .map(|b| {
            let label = b.name.split(':').next().unwrap_or_default().to_string();
            Bar::default()
                .value(scaled(b.value))
                .text_value(format!("{:.2}", b.value))
                .label(Line::from(label))
                .style(Style::default().fg(css_color(b.color)))
        })
        .collect();

    let inner_width = area.width.saturating_sub(2);
    let bar_width = (inner_width / bars.len() as u16).saturating_sub(1).clamp(1, 12);
    let mut widget = BarChart::default()
        .block(panel(&chart.title))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1);
    if let Some(max) = chart.y_max {
        widget = widget.max(scaled(max));
    }
    frame.render_widget(widget, area);
}

fn render_pie(frame: &mut Frame, chart: Option<&PieChart>, fallback_title: &str, area: Rect) {
    let title = chart.map(|c| c.title.as_str()).unwrap_or(fallback_title);
    let block = panel(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(chart) = chart else {
        return;
    };
    let total = chart.total();
    if total <= 0.0 {
        if !chart.slices.is_empty() {
            let empty = Paragraph::new(Span::styled("No data", Style::default().fg(Color::DarkGray)));
            frame.render_widget(empty, inner);
        }
        return;
    }

    frame.render_widget(Paragraph::new(pie_lines(chart, total, inner.width as usize)).wrap(Wrap { trim: true }), inner);
}

/// Proportional strip followed by a legend with shares
fn pie_lines(chart: &PieChart, total: f64, width: usize) -> Vec<Line<'_>> {
    let mut strip = Vec::with_capacity(chart.slices.len());
    let mut cumulative = 0.0;
    let mut used = 0;
    for slice in &chart.slices {
        cumulative += slice.value.max(0.0);
        let end = ((cumulative / total) * width as f64).round() as usize;
        let n = end.min(width).saturating_sub(used);
        used += n;
        strip.push(Span::styled("█".repeat(n), Style::default().fg(css_color(slice.color))));
    }

    let mut lines = vec![Line::from(strip), Line::default()];
    for slice in &chart.slices {
        lines.push(Line::from(vec![
            Span::styled("■ ", Style::default().fg(css_color(slice.color))),
            Span::raw(format!("{} ({:.1}%)", slice.label, slice.value.max(0.0) / total * 100.0)),
        ]));
    }
    lines
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let settings = &app.map_renderer.settings;
    let toggle = |on: bool, on_text: &'static str, off_text: &'static str| {
        Span::styled(
            if on { on_text } else { off_text },
            Style::default().fg(if on { Color::Green } else { Color::DarkGray }),
        )
    };

    let mut spans = vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::raw(" "),
        toggle(settings.show_fill, "[F]ill ", "[f]ill "),
        toggle(settings.show_outlines, "[O]utline ", "[o]utline "),
        toggle(settings.show_labels, "[L]abels ", "[l]abels "),
        Span::styled("| ", Style::default().fg(Color::DarkGray)),
    ];
    if let Some(hover) = app.hover_info() {
        spans.push(Span::styled(hover, Style::default().fg(Color::Cyan)));
        spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
    }
    spans.push(Span::styled(
        "click:select tab:next u:clear hjkl:pan +/-:zoom r:reset q:quit",
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use waste_dashboard::binder::PieSlice;

    #[test]
    fn test_layout_map_inside_body() {
        let areas = layout(Rect::new(0, 0, 100, 40));
        assert_eq!(areas.title.height, 1);
        assert_eq!(areas.status.y, 39);
        assert_eq!(areas.map.x, 0);
        assert_eq!(areas.map_inner, Rect::new(1, 2, areas.map.width - 2, 36));
        assert_eq!(areas.dashboard.x, areas.map.width);
    }

    #[test]
    fn test_css_colors() {
        assert_eq!(css_color("green"), Color::Green);
        assert_eq!(css_color("#2ca02c"), Color::Rgb(0x2c, 0xa0, 0x2c));
        assert_eq!(css_color("not a color"), Color::White);
    }

    #[test]
    fn test_pie_strip_fills_width() {
        let chart = PieChart {
            title: "Processed vs Gap".to_string(),
            slices: vec![
                PieSlice {
                    label: "Processed".to_string(),
                    value: 75.0,
                    color: "green",
                },
                PieSlice {
                    label: "Gap".to_string(),
                    value: 25.0,
                    color: "red",
                },
            ],
        };
        let lines = pie_lines(&chart, chart.total(), 20);
        let widths: Vec<usize> = lines[0].spans.iter().map(|s| s.content.chars().count()).collect();
        assert_eq!(widths, vec![15, 5]);
        assert_eq!(lines.len(), 4);
        assert!(lines[2].spans[1].content.contains("75.0%"));
    }
}
