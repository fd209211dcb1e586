mod geometry;
mod projection;
mod renderer;

pub use projection::Viewport;
pub use renderer::{choropleth_color, MapLayers, MapRenderer, COLOR_RANGE_TPD};
