use crate::braille::BrailleCanvas;
use glam::DVec2;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Even-odd scanline fill of rings already projected to pixel space.
/// A pixel is filled when its center lies inside; holes fall out of the
/// even-odd rule.
pub fn fill_rings(canvas: &mut BrailleCanvas, rings: &[Vec<DVec2>], stride: usize) {
    let (min_y, max_y) = rings
        .iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
    if !min_y.is_finite() || max_y < 0.0 {
        return;
    }

    let y0 = min_y.max(0.0).floor() as usize;
    let y1 = (max_y.ceil() as usize).min(canvas.pixel_height());
    let mut crossings: Vec<f64> = Vec::new();

    for y in y0..y1 {
        let scan = y as f64 + 0.5;
        crossings.clear();

        for ring in rings {
            let n = ring.len();
            if n < 3 {
                continue;
            }
            let mut j = n - 1;
            for i in 0..n {
                let (a, b) = (ring[i], ring[j]);
                if (a.y > scan) != (b.y > scan) {
                    crossings.push(a.x + (scan - a.y) * (b.x - a.x) / (b.y - a.y));
                }
                j = i;
            }
        }

        crossings.sort_by(f64::total_cmp);
        for pair in crossings.chunks_exact(2) {
            let x0 = (pair[0] - 0.5).ceil().max(0.0) as usize;
            let x1 = (pair[1] - 0.5).ceil().max(0.0) as usize;
            if x1 > x0 {
                canvas.fill_span(y, x0, x1, stride);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<DVec2> {
        vec![
            DVec2::new(x0, y0),
            DVec2::new(x1, y0),
            DVec2::new(x1, y1),
            DVec2::new(x0, y1),
        ]
    }

    #[test]
    fn test_horizontal_line() {
        let mut canvas = BrailleCanvas::new(5, 1);
        draw_line(&mut canvas, 0, 0, 9, 0);
        assert_eq!(canvas.to_string(), "⠉⠉⠉⠉⠉");
    }

    #[test]
    fn test_vertical_line() {
        let mut canvas = BrailleCanvas::new(1, 2);
        draw_line(&mut canvas, 0, 0, 0, 7);
        assert_eq!(canvas.to_string(), "⡇\n⡇");
    }

    #[test]
    fn test_fill_square() {
        let mut canvas = BrailleCanvas::new(2, 1);
        fill_rings(&mut canvas, &[square(0.0, 0.0, 4.0, 4.0)], 1);
        assert_eq!(canvas.to_string(), "⣿⣿");
    }

    #[test]
    fn test_fill_respects_hole() {
        let mut canvas = BrailleCanvas::new(3, 3);
        fill_rings(
            &mut canvas,
            &[square(0.0, 0.0, 6.0, 12.0), square(2.0, 4.0, 4.0, 8.0)],
            1,
        );
        assert_eq!(canvas.cell(1, 1), None);
        assert_eq!(canvas.cell(0, 1), Some('⣿'));
        assert_eq!(canvas.cell(1, 0), Some('⣿'));
    }

    #[test]
    fn test_fill_clipped_to_canvas() {
        let mut canvas = BrailleCanvas::new(1, 1);
        fill_rings(&mut canvas, &[square(-10.0, -10.0, 10.0, 10.0)], 1);
        assert_eq!(canvas.to_string(), "⣿");
    }
}
