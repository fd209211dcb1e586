//! Server-side HTML for the dropdown dashboard. Charts are plain HTML/CSS
//! (bars, conic-gradient pies) and an inline SVG polyline, so the page
//! needs no script.

use crate::binder::{BarChart, KpiCard, LineChart, Payloads, PieChart};
use std::fmt::{self, Write};

pub const PAGE_TITLE: &str = "MP Waste Dashboard";
const HEADING: &str = "Madhya Pradesh District-wise Waste Management Dashboard";

const STYLE: &str = "\
body{background:#1e1e1e;color:white;font-family:Arial;padding:20px;margin:0}\
h1{text-align:center}\
select{color:black;font-size:16px;padding:4px;width:100%}\
.row{display:flex;justify-content:space-between;flex-wrap:wrap;margin:20px 0}\
.cards{justify-content:space-around}\
.card{padding:10px;border:1px solid #444;border-radius:10px;width:18%;background:#2c2c2c;text-align:center}\
.chart{width:48%;background:#1e1e1e}\
.notice{flex:1;text-align:center}\
.bars{display:flex;align-items:flex-end;height:240px;gap:12px;border-bottom:1px solid #333}\
.bar{flex:1;text-align:center;font-size:12px}\
.pie{width:200px;height:200px;border-radius:50%;margin:auto;position:relative}\
.pie::after{content:'';position:absolute;inset:30%;border-radius:50%;background:#1e1e1e}\
.legend span{display:inline-block;width:10px;height:10px;margin-right:6px}\
";

fn esc(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Full page for one selection
pub fn render_page<'a>(
    districts: impl Iterator<Item = &'a str>,
    selected: Option<&str>,
    payloads: &Payloads,
) -> Result<String, fmt::Error> {
    let mut buf = String::with_capacity(16 * 1024);
    write_page(&mut buf, districts, selected, payloads)?;
    Ok(buf)
}

fn write_page<'a, W: Write>(
    out: &mut W,
    districts: impl Iterator<Item = &'a str>,
    selected: Option<&str>,
    payloads: &Payloads,
) -> fmt::Result {
    write!(
        out,
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title><style>{}</style></head><body>",
        esc(PAGE_TITLE),
        STYLE
    )?;
    write!(out, "<h1>{}</h1>", esc(HEADING))?;

    write_dropdown(out, districts, selected)?;

    out.write_str("<div id=\"kpi-cards\" class=\"row cards\">")?;
    match &payloads.notice {
        Some(notice) => write!(out, "<div class=\"notice\">{}</div>", esc(notice))?,
        None => {
            for card in &payloads.kpi_cards {
                write_card(out, card)?;
            }
        }
    }
    out.write_str("</div>")?;

    write_line(out, &payloads.population)?;

    out.write_str("<div id=\"waste-bar-comparison\" class=\"row\">")?;
    for chart in &payloads.waste_bars {
        write_bars(out, chart)?;
    }
    out.write_str("</div><div id=\"pie-comparison\" class=\"row\">")?;
    for chart in &payloads.processed_pies {
        write_pie(out, chart)?;
    }
    out.write_str("</div>")?;
    if let Some(chart) = &payloads.composition {
        write_pie(out, chart)?;
    }

    out.write_str("</body></html>")
}

fn write_dropdown<'a, W: Write>(
    out: &mut W,
    districts: impl Iterator<Item = &'a str>,
    selected: Option<&str>,
) -> fmt::Result {
    out.write_str(
        "<form method=\"get\" action=\"/\"><select id=\"district-dropdown\" name=\"district\" onchange=\"this.form.submit()\">",
    )?;
    write!(
        out,
        "<option value=\"\" disabled{}>Select a District</option>",
        if selected.is_none() { " selected" } else { "" }
    )?;
    for name in districts {
        let is_selected = selected.is_some_and(|s| s == name);
        write!(
            out,
            "<option value=\"{0}\"{1}>{0}</option>",
            esc(name),
            if is_selected { " selected" } else { "" }
        )?;
    }
    out.write_str("</select><noscript><button type=\"submit\">Show</button></noscript></form>")
}

fn write_card<W: Write>(out: &mut W, card: &KpiCard) -> fmt::Result {
    write!(
        out,
        "<div class=\"card\"><h4>{}</h4><p>{}</p></div>",
        esc(&card.title),
        esc(&card.value)
    )
}

fn write_line<O: Write>(out: &mut O, chart: &LineChart) -> fmt::Result {
    const W: f64 = 800.0;
    const H: f64 = 300.0;
    const PAD: f64 = 40.0;

    write!(out, "<div id=\"population-forecast\"><h3>{}</h3>", esc(&chart.title))?;
    if chart.is_empty() {
        return out.write_str("</div>");
    }

    let max = chart.y.iter().copied().fold(0.0_f64, f64::max).max(1.0);
    let n = chart.y.len().max(2) - 1;
    let points: Vec<(f64, f64)> = chart
        .y
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let x = PAD + (W - 2.0 * PAD) * i as f64 / n as f64;
            let y = H - PAD - (H - 2.0 * PAD) * (v.max(0.0) / max);
            (x, y)
        })
        .collect();

    write!(out, "<svg viewBox=\"0 0 {W} {H}\" width=\"100%\" height=\"{H}\"><polyline fill=\"none\" stroke=\"blue\" stroke-width=\"3\" points=\"")?;
    for (x, y) in &points {
        write!(out, "{x:.1},{y:.1} ")?;
    }
    out.write_str("\"/>")?;
    for ((x, y), (label, value)) in points.iter().zip(chart.x.iter().zip(&chart.y)) {
        write!(
            out,
            "<circle cx=\"{x:.1}\" cy=\"{y:.1}\" r=\"5\" fill=\"red\"><title>{}: {}</title></circle>\
             <text x=\"{x:.1}\" y=\"{:.1}\" fill=\"white\" text-anchor=\"middle\">{}</text>",
            esc(label),
            crate::binder::format_thousands(*value),
            H - PAD / 4.0,
            esc(label)
        )?;
    }
    write!(out, "<text x=\"4\" y=\"16\" fill=\"white\">{}</text></svg></div>", esc(&chart.y_title))
}

fn write_bars<W: Write>(out: &mut W, chart: &BarChart) -> fmt::Result {
    let ceiling = chart
        .y_max
        .unwrap_or_else(|| chart.bars.iter().map(|b| b.value).fold(0.0, f64::max));
    write!(out, "<div class=\"chart\"><h3>{}</h3><div class=\"bars\">", esc(&chart.title))?;
    for bar in &chart.bars {
        let pct = if ceiling > 0.0 { (bar.value.max(0.0) / ceiling * 100.0).min(100.0) } else { 0.0 };
        write!(
            out,
            "<div class=\"bar\"><div title=\"{0}: {1:.2} TPD\" style=\"height:{2:.1}px;min-height:1px;background:{3}\"></div>{0}<br>{1:.2}</div>",
            esc(&bar.name),
            bar.value,
            pct * 2.0,
            bar.color
        )?;
    }
    match chart.bars.first() {
        Some(first) => write!(out, "</div><p style=\"text-align:center\">{}</p></div>", esc(&first.category)),
        None => out.write_str("</div></div>"),
    }
}

fn write_pie<W: Write>(out: &mut W, chart: &PieChart) -> fmt::Result {
    write!(out, "<div class=\"chart\"><h3>{}</h3>", esc(&chart.title))?;
    let total = chart.total();
    if total <= 0.0 {
        return out.write_str("</div>");
    }

    let mut stops = Vec::with_capacity(chart.slices.len());
    let mut start = 0.0;
    for slice in &chart.slices {
        let end = start + slice.value.max(0.0) / total * 100.0;
        stops.push(format!("{} {start:.2}% {end:.2}%", slice.color));
        start = end;
    }
    write!(
        out,
        "<div class=\"pie\" style=\"background:conic-gradient({})\"></div><div class=\"legend\">",
        stops.join(",")
    )?;
    for slice in &chart.slices {
        write!(
            out,
            "<div title=\"{0}: {1:.2} TPD\"><span style=\"background:{2}\"></span>{0} ({3:.1}%)</div>",
            esc(&slice.label),
            slice.value,
            slice.color,
            slice.value.max(0.0) / total * 100.0
        )?;
    }
    out.write_str("</div></div>")
}
