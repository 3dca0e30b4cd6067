use crate::braille::BrailleCanvas;

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

/// Outline an axis-aligned rectangle (inclusive corners)
pub fn draw_rect(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    draw_line(canvas, x0, y0, x1, y0);
    draw_line(canvas, x1, y0, x1, y1);
    draw_line(canvas, x1, y1, x0, y1);
    draw_line(canvas, x0, y1, x0, y0);
}

/// Draw a filled circle (incident markers)
pub fn draw_circle(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: i32) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                canvas.set_pixel_signed(cx + dx, cy + dy);
            }
        }
    }
}

/// Fill a polygon using an even-odd scanline pass over pixel rows
pub fn fill_polygon(canvas: &mut BrailleCanvas, ring: &[(i32, i32)]) {
    if ring.len() < 3 {
        return;
    }

    let max_y = (canvas.height() * 4) as i32 - 1;
    let max_x = (canvas.width() * 2) as i32 - 1;
    let min_ring_y = ring.iter().map(|p| p.1).min().unwrap_or(0).max(0);
    let max_ring_y = ring.iter().map(|p| p.1).max().unwrap_or(0).min(max_y);

    let mut crossings: Vec<f64> = Vec::with_capacity(16);

    for y in min_ring_y..=max_ring_y {
        // Sample at the pixel row centre so vertices never count twice
        let scan = y as f64 + 0.5;
        crossings.clear();

        for i in 0..ring.len() {
            let (x0, y0) = ring[i];
            let (x1, y1) = ring[(i + 1) % ring.len()];
            let (fy0, fy1) = (y0 as f64, y1 as f64);
            if (fy0 <= scan && fy1 > scan) || (fy1 <= scan && fy0 > scan) {
                let t = (scan - fy0) / (fy1 - fy0);
                crossings.push(x0 as f64 + t * (x1 - x0) as f64);
            }
        }

        crossings.sort_by(|a, b| a.total_cmp(b));

        for pair in crossings.chunks_exact(2) {
            let start = pair[0].round().max(0.0) as i32;
            let end = (pair[1].round() as i32).min(max_x);
            for x in start..=end {
                canvas.set_pixel_signed(x, y);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_line() {
        let mut canvas = BrailleCanvas::new(5, 1);
        draw_line(&mut canvas, 0, 0, 9, 0);
        assert_eq!(canvas.row_to_string(0), "⠉⠉⠉⠉⠉");
    }

    #[test]
    fn test_vertical_line() {
        let mut canvas = BrailleCanvas::new(1, 2);
        draw_line(&mut canvas, 0, 0, 0, 7);
        assert_eq!(canvas.to_string(), "⡇\n⡇");
    }

    #[test]
    fn test_rect_outline() {
        let mut canvas = BrailleCanvas::new(4, 2);
        draw_rect(&mut canvas, 0, 0, 7, 7);
        assert!(canvas.is_set(0, 0));
        assert!(canvas.is_set(7, 7));
        assert!(canvas.is_set(0, 4));
        assert!(!canvas.is_set(3, 3));
    }

    #[test]
    fn test_circle_radius_one() {
        let mut canvas = BrailleCanvas::new(4, 2);
        draw_circle(&mut canvas, 3, 3, 1);
        for (x, y) in [(3, 3), (2, 3), (4, 3), (3, 2), (3, 4)] {
            assert!(canvas.is_set(x, y));
        }
        assert!(!canvas.is_set(2, 2));
    }

    #[test]
    fn test_fill_square() {
        let mut canvas = BrailleCanvas::new(8, 4);
        fill_polygon(&mut canvas, &[(2, 2), (10, 2), (10, 10), (2, 10)]);
        assert!(canvas.is_set(5, 5));
        assert!(canvas.is_set(2, 2));
        assert!(!canvas.is_set(12, 5));
        assert!(!canvas.is_set(5, 12));
    }

    #[test]
    fn test_fill_clips_to_canvas() {
        let mut canvas = BrailleCanvas::new(2, 1);
        fill_polygon(&mut canvas, &[(-10, -10), (50, -10), (50, 50), (-10, 50)]);
        assert_eq!(canvas.to_string(), "⣿⣿");
    }

    #[test]
    fn test_fill_degenerate() {
        let mut canvas = BrailleCanvas::new(2, 1);
        fill_polygon(&mut canvas, &[(0, 0), (3, 3)]);
        assert!(canvas.is_blank());
    }
}
