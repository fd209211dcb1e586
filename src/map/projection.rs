use glam::DVec2;
use std::f64::consts::PI;
use waste_dashboard::dataset::BBox;

const MIN_ZOOM: f64 = 1.0;
const MAX_ZOOM: f64 = 2000.0;
const ZOOM_STEP: f64 = 1.5;

/// Margin left around the state when fitting the view
const FIT_MARGIN: f64 = 0.92;

/// Web Mercator y in [0, 1] for a latitude in degrees
#[inline]
fn mercator_y(lat: f64) -> f64 {
    let lat_rad = lat * PI / 180.0;
    (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0
}

#[inline]
fn inverse_mercator_y(y: f64) -> f64 {
    (PI * (1.0 - 2.0 * y)).sinh().atan() * 180.0 / PI
}

/// Viewport representing the visible map area and zoom level
#[derive(Clone, Debug)]
pub struct Viewport {
    /// Center longitude (-180 to 180)
    pub center_lon: f64,
    /// Center latitude (-85 to 85)
    pub center_lat: f64,
    /// Zoom level (higher = more zoomed in)
    pub zoom: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat,
            zoom,
            width,
            height,
        }
    }

    /// Center on a bounding box and zoom until it fills the canvas.
    /// Braille pixels are close to square, so no aspect correction.
    pub fn fit(bbox: &BBox, width: usize, height: usize) -> Self {
        if bbox.is_empty() || width == 0 || height == 0 {
            return Self::new(78.5, 24.0, MIN_ZOOM, width, height);
        }

        let span_x = ((bbox.max_lon - bbox.min_lon) / 360.0).max(1e-6);
        let span_y = (mercator_y(bbox.min_lat) - mercator_y(bbox.max_lat)).max(1e-6);

        // scale = zoom * width pixels per normalized mercator unit
        let zoom_x = 1.0 / span_x;
        let zoom_y = height as f64 / (span_y * width as f64);
        let zoom = (zoom_x.min(zoom_y) * FIT_MARGIN).clamp(MIN_ZOOM, MAX_ZOOM);

        let center_lat = inverse_mercator_y((mercator_y(bbox.min_lat) + mercator_y(bbox.max_lat)) / 2.0);
        let (center_lon, _) = bbox.center();

        Self::new(center_lon, center_lat, zoom, width, height)
    }

    /// Pan the viewport by pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = self.zoom * self.width.max(1) as f64;
        self.center_lon += dx as f64 * 360.0 / scale;
        let center_y = mercator_y(self.center_lat) + dy as f64 / scale;
        self.center_lat = inverse_mercator_y(center_y).clamp(-85.0, 85.0);

        if self.center_lon > 180.0 {
            self.center_lon -= 360.0;
        } else if self.center_lon < -180.0 {
            self.center_lon += 360.0;
        }
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / ZOOM_STEP).max(MIN_ZOOM);
    }

    /// Zoom in towards a specific pixel location
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, ZOOM_STEP);
    }

    /// Zoom out from a specific pixel location
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0 / ZOOM_STEP);
    }

    /// Keep the point under the cursor fixed while zooming
    fn zoom_at(&mut self, px: i32, py: i32, factor: f64) {
        let (lon, lat) = self.unproject(px, py);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let (new_px, new_py) = self.project(lon, lat);
        self.pan(new_px - px, new_py - py);
    }

    /// Sub-pixel projection, used for polygon fills
    pub fn project_f(&self, lon: f64, lat: f64) -> DVec2 {
        let x = (lon + 180.0) / 360.0;
        let y = mercator_y(lat);

        let center_x = (self.center_lon + 180.0) / 360.0;
        let center_y = mercator_y(self.center_lat);

        let scale = self.zoom * self.width as f64;

        DVec2::new(
            (x - center_x) * scale + self.width as f64 / 2.0,
            (y - center_y) * scale + self.height as f64 / 2.0,
        )
    }

    /// Project a geographic coordinate (lon, lat) to pixel coordinates
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let p = self.project_f(lon, lat);
        (p.x as i32, p.y as i32)
    }

    /// Pixel coordinates back to (lon, lat)
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let scale = self.zoom * self.width.max(1) as f64;

        let center_x = (self.center_lon + 180.0) / 360.0;
        let center_y = mercator_y(self.center_lat);

        let x = (px as f64 - self.width as f64 / 2.0) / scale + center_x;
        let y = (py as f64 - self.height as f64 / 2.0) / scale + center_y;

        (x * 360.0 - 180.0, inverse_mercator_y(y))
    }

    /// Check if a line segment might be visible (rough bounding box check)
    pub fn line_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        let min_x = p1.0.min(p2.0);
        let max_x = p1.0.max(p2.0);
        let min_y = p1.1.min(p2.1);
        let max_y = p1.1.max(p2.1);

        max_x >= 0 && min_x < self.width as i32 && max_y >= 0 && min_y < self.height as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mp() -> BBox {
        BBox {
            min_lon: 74.0,
            min_lat: 21.0,
            max_lon: 82.8,
            max_lat: 26.9,
        }
    }

    #[test]
    fn test_project_center() {
        let vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        let (x, y) = vp.project(0.0, 0.0);
        assert_eq!(x, 50);
        assert_eq!(y, 50);
    }

    #[test]
    fn test_unproject_inverts_project() {
        let vp = Viewport::fit(&mp(), 200, 160);
        let (px, py) = vp.project(77.4, 23.25);
        let (lon, lat) = vp.unproject(px, py);
        // One pixel is a few hundredths of a degree at this zoom
        assert!((lon - 77.4).abs() < 0.1);
        assert!((lat - 23.25).abs() < 0.1);
    }

    #[test]
    fn test_fit_keeps_state_on_canvas() {
        let bbox = mp();
        let vp = Viewport::fit(&bbox, 200, 160);
        for (lon, lat) in [(bbox.min_lon, bbox.min_lat), (bbox.max_lon, bbox.max_lat)] {
            let (x, y) = vp.project(lon, lat);
            assert!((0..200).contains(&x), "x={x}");
            assert!((0..160).contains(&y), "y={y}");
        }
    }

    #[test]
    fn test_pan() {
        let mut vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        vp.pan(10, 0);
        assert!(vp.center_lon > 0.0);
    }

    #[test]
    fn test_zoom_at_keeps_point_fixed() {
        let mut vp = Viewport::fit(&mp(), 200, 160);
        let before = vp.unproject(40, 40);
        vp.zoom_in_at(40, 40);
        let after = vp.unproject(40, 40);
        assert!((before.0 - after.0).abs() < 0.1);
        assert!((before.1 - after.1).abs() < 0.1);
    }
}
