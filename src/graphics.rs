use crate::color::Rgb;

/// Software RGBA drawing surface.
///
/// Polygons are rasterized as triangle fans with the edge function, strokes
/// with Bresenham's algorithm stamped by a round brush. Every write goes
/// through [`Canvas::blend_pixel`] so the global alpha applies uniformly.
#[derive(Clone)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixel_data: Vec<u8>,
    alpha: f64,
}

/// A set of open polylines built with `move_to`/`line_to`
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    subpaths: Vec<Vec<(f64, f64)>>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.subpaths.push(vec![(x, y)]);
    }

    /// Extends the current subpath, or starts one if there is none
    pub fn line_to(&mut self, x: f64, y: f64) {
        match self.subpaths.last_mut() {
            Some(current) => current.push((x, y)),
            None => self.move_to(x, y),
        }
    }

    pub fn subpaths(&self) -> &[Vec<(f64, f64)>] {
        &self.subpaths
    }

    pub fn is_empty(&self) -> bool {
        self.subpaths.is_empty()
    }
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas {
            width,
            height,
            pixel_data: vec![0u8; width * height * 4],
            alpha: 1.0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Reallocates the pixel buffer when the size changes
    pub fn resize(&mut self, width: usize, height: usize) {
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.pixel_data = vec![0u8; width * height * 4];
        }
    }

    /// Fills the whole surface, ignoring the global alpha
    pub fn clear(&mut self, color: Rgb) {
        for px in self.pixel_data.chunks_exact_mut(4) {
            px.copy_from_slice(&[color.r, color.g, color.b, 255]);
        }
    }

    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = if alpha.is_nan() {
            1.0
        } else {
            alpha.clamp(0.0, 1.0)
        };
    }

    #[cfg(test)]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Samples one pixel
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y * self.width + x) * 4;
        Some(Rgb::new(
            self.pixel_data[offset],
            self.pixel_data[offset + 1],
            self.pixel_data[offset + 2],
        ))
    }

    /// Blends `color` into one pixel using the global alpha
    pub fn blend_pixel(&mut self, x: isize, y: isize, color: Rgb) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let offset = (y as usize * self.width + x as usize) * 4;
        let a = self.alpha;
        if a >= 1.0 {
            self.pixel_data[offset] = color.r;
            self.pixel_data[offset + 1] = color.g;
            self.pixel_data[offset + 2] = color.b;
        } else {
            let mix = |dst: u8, src: u8| (src as f64 * a + dst as f64 * (1.0 - a)) as u8;
            self.pixel_data[offset] = mix(self.pixel_data[offset], color.r);
            self.pixel_data[offset + 1] = mix(self.pixel_data[offset + 1], color.g);
            self.pixel_data[offset + 2] = mix(self.pixel_data[offset + 2], color.b);
        }
        self.pixel_data[offset + 3] = 255;
    }

    /// Fills a closed polygon given by its corners in order
    pub fn fill_polygon(&mut self, points: &[(f64, f64)], color: Rgb) {
        if points.len() < 3 {
            return;
        }
        let first = points[0];
        for pair in points[1..].windows(2) {
            self.fill_triangle(first, pair[0], pair[1], color);
        }
    }

    /// Strokes a closed polygon outline
    pub fn stroke_polygon(&mut self, points: &[(f64, f64)], width: f64, color: Rgb) {
        if points.len() < 2 {
            return;
        }
        self.stroke_polyline(points, width, color);
        let (last, first) = (points[points.len() - 1], points[0]);
        self.stroke_segment(last, first, width, color);
    }

    /// Strokes an open polyline with round caps and joins
    pub fn stroke_polyline(&mut self, points: &[(f64, f64)], width: f64, color: Rgb) {
        match points {
            [] => {}
            [only] => self.stroke_segment(*only, *only, width, color),
            _ => {
                for pair in points.windows(2) {
                    self.stroke_segment(pair[0], pair[1], width, color);
                }
            }
        }
    }

    /// Strokes every subpath of `path`
    pub fn stroke_path(&mut self, path: &Path, width: f64, color: Rgb) {
        for subpath in path.subpaths() {
            if subpath.len() >= 2 {
                self.stroke_polyline(subpath, width, color);
            }
        }
    }

    pub fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgb) {
        if !(radius > 0.0) || !cx.is_finite() || !cy.is_finite() {
            return;
        }
        let r2 = radius * radius;
        let Some((min_x, max_x)) = clip_span(cx - radius, cx + radius, self.width) else {
            return;
        };
        let Some((min_y, max_y)) = clip_span(cy - radius, cy + radius, self.height) else {
            return;
        };
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x as f64 + 0.5 - cx;
                let dy = y as f64 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.blend_pixel(x, y, color);
                }
            }
        }
    }

    pub fn stroke_circle(&mut self, cx: f64, cy: f64, radius: f64, width: f64, color: Rgb) {
        if !(radius > 0.0) || !(width > 0.0) || !cx.is_finite() || !cy.is_finite() {
            return;
        }
        let outer = radius + width / 2.0;
        let inner = (radius - width / 2.0).max(0.0);
        let Some((min_x, max_x)) = clip_span(cx - outer, cx + outer, self.width) else {
            return;
        };
        let Some((min_y, max_y)) = clip_span(cy - outer, cy + outer, self.height) else {
            return;
        };
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x as f64 + 0.5 - cx;
                let dy = y as f64 + 0.5 - cy;
                let d2 = dx * dx + dy * dy;
                if d2 <= outer * outer && d2 >= inner * inner {
                    self.blend_pixel(x, y, color);
                }
            }
        }
    }

    /// Axis-aligned rectangle fill in whole pixels
    pub fn fill_rect(&mut self, x: isize, y: isize, w: usize, h: usize, color: Rgb) {
        let x_end = x.saturating_add(w as isize).min(self.width as isize);
        let y_end = y.saturating_add(h as isize).min(self.height as isize);
        for yy in y.max(0)..y_end {
            for xx in x.max(0)..x_end {
                self.blend_pixel(xx, yy, color);
            }
        }
    }

    /// Draws a triangle, accepting either winding
    fn fill_triangle(&mut self, v0: (f64, f64), v1: (f64, f64), v2: (f64, f64), color: Rgb) {
        let area = edge_function(v0, v1, v2);
        if area.abs() < 1e-9 || !area.is_finite() {
            return;
        }

        // Compute bounding box of the triangle
        let (w, h) = (self.width as f64, self.height as f64);
        let min_x = v0.0.min(v1.0).min(v2.0).floor().max(0.0);
        let max_x = v0.0.max(v1.0).max(v2.0).ceil().min(w - 1.0);
        let min_y = v0.1.min(v1.1).min(v2.1).floor().max(0.0);
        let max_y = v0.1.max(v1.1).max(v2.1).ceil().min(h - 1.0);
        if min_x > max_x || min_y > max_y {
            return;
        }

        let sign = area.signum();
        for y in min_y as usize..=max_y as usize {
            for x in min_x as usize..=max_x as usize {
                let p = (x as f64 + 0.5, y as f64 + 0.5);
                let w0 = edge_function(v1, v2, p) * sign;
                let w1 = edge_function(v2, v0, p) * sign;
                let w2 = edge_function(v0, v1, p) * sign;
                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    self.blend_pixel(x as isize, y as isize, color);
                }
            }
        }
    }

    /// Draws a segment with Bresenham's algorithm, stamping a disc of
    /// diameter `width` at each step
    fn stroke_segment(&mut self, from: (f64, f64), to: (f64, f64), width: f64, color: Rgb) {
        let finite = |p: (f64, f64)| p.0.is_finite() && p.1.is_finite();
        if !finite(from) || !finite(to) {
            return;
        }
        // A brush wider than the canvas covers it either way.
        let radius = (width / 2.0).clamp(0.0, (self.width + self.height) as f64);
        // Stamps up to `radius` outside the canvas still reach into it.
        let margin = radius.ceil() + 1.0;
        let bounds = (
            -margin,
            -margin,
            self.width as f64 + margin,
            self.height as f64 + margin,
        );
        let Some((from, to)) = clip_segment(from, to, bounds) else {
            return;
        };
        let (mut x0, mut y0, x1, y1) = (
            from.0.floor() as isize,
            from.1.floor() as isize,
            to.0.floor() as isize,
            to.1.floor() as isize,
        );
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.stamp(x0, y0, radius, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    fn stamp(&mut self, x: isize, y: isize, radius: f64, color: Rgb) {
        // Thin strokes are one pixel wide; anything wider gets a disc so that
        // segment joins come out round.
        if radius <= 0.75 {
            self.blend_pixel(x, y, color);
            return;
        }
        let r = radius.round() as isize;
        let r2 = radius * radius;
        let (x_lo, x_hi) = ((-r).max(-x), r.min(self.width as isize - 1 - x));
        let (y_lo, y_hi) = ((-r).max(-y), r.min(self.height as isize - 1 - y));
        for oy in y_lo..=y_hi {
            for ox in x_lo..=x_hi {
                if (ox * ox + oy * oy) as f64 <= r2 {
                    self.blend_pixel(x + ox, y + oy, color);
                }
            }
        }
    }
}

/// Pixel range covering `[lo, hi]`, clamped to `0..len`
fn clip_span(lo: f64, hi: f64, len: usize) -> Option<(isize, isize)> {
    let start = lo.floor().max(0.0);
    let end = hi.ceil().min(len as f64 - 1.0);
    (start <= end).then_some((start as isize, end as isize))
}

/// Liang-Barsky clip of a segment to `(min_x, min_y, max_x, max_y)`
fn clip_segment(
    from: (f64, f64),
    to: (f64, f64),
    (min_x, min_y, max_x, max_y): (f64, f64, f64, f64),
) -> Option<((f64, f64), (f64, f64))> {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    let edges = [
        (-dx, from.0 - min_x),
        (dx, max_x - from.0),
        (-dy, from.1 - min_y),
        (dy, max_y - from.1),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let t = q / p;
            if p < 0.0 {
                t0 = t0.max(t);
            } else {
                t1 = t1.min(t);
            }
        }
    }
    (t0 <= t1).then(|| {
        (
            (from.0 + t0 * dx, from.1 + t0 * dy),
            (from.0 + t1 * dx, from.1 + t1 * dy),
        )
    })
}

/// Edge function used in rasterization
pub fn edge_function(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    (c.0 - a.0) * (b.1 - a.1) - (c.1 - a.1) * (b.0 - a.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = Rgb::new(255, 0, 0);
    const BG: Rgb = Rgb::new(10, 10, 10);

    fn canvas() -> Canvas {
        let mut c = Canvas::new(40, 30);
        c.clear(BG);
        c
    }

    #[test]
    fn test_fill_polygon_either_winding() {
        let square = [(5.0, 5.0), (15.0, 5.0), (15.0, 15.0), (5.0, 15.0)];
        let mut reversed = square;
        reversed.reverse();
        for pts in [square, reversed] {
            let mut c = canvas();
            c.fill_polygon(&pts, RED);
            assert_eq!(c.pixel(10, 10), Some(RED));
            assert_eq!(c.pixel(20, 10), Some(BG));
        }
    }

    #[test]
    fn test_degenerate_polygon_draws_nothing() {
        let mut c = canvas();
        c.fill_polygon(&[(5.0, 5.0), (5.0, 5.0), (5.0, 5.0), (5.0, 5.0)], RED);
        c.fill_polygon(&[(1.0, 1.0), (10.0, 10.0), (20.0, 20.0)], RED);
        c.fill_polygon(&[(1.0, 1.0), (10.0, 10.0)], RED);
        for y in 0..30 {
            for x in 0..40 {
                assert_eq!(c.pixel(x, y), Some(BG));
            }
        }
    }

    #[test]
    fn test_offscreen_polygon_is_clipped() {
        let mut c = canvas();
        c.fill_polygon(&[(-50.0, -50.0), (100.0, -50.0), (100.0, 100.0)], RED);
        assert_eq!(c.pixel(39, 0), Some(RED));
    }

    #[test]
    fn test_global_alpha_blends() {
        let mut c = Canvas::new(4, 4);
        c.clear(Rgb::BLACK);
        c.set_alpha(0.5);
        c.blend_pixel(1, 1, Rgb::new(200, 100, 0));
        assert_eq!(c.pixel(1, 1), Some(Rgb::new(100, 50, 0)));
        c.set_alpha(f64::NAN);
        assert_eq!(c.alpha(), 1.0);
    }

    #[test]
    fn test_stroke_width() {
        let mut c = canvas();
        c.stroke_polyline(&[(2.0, 10.0), (30.0, 10.0)], 1.0, RED);
        assert_eq!(c.pixel(15, 10), Some(RED));
        assert_eq!(c.pixel(15, 12), Some(BG));

        let mut c = canvas();
        c.stroke_polyline(&[(2.0, 10.0), (30.0, 10.0)], 5.0, RED);
        assert_eq!(c.pixel(15, 12), Some(RED));
    }

    #[test]
    fn test_path_subpaths_are_disjoint() {
        let mut path = Path::new();
        path.move_to(2.0, 2.0);
        path.line_to(10.0, 2.0);
        path.move_to(2.0, 20.0);
        path.line_to(10.0, 20.0);
        assert_eq!(path.subpaths().len(), 2);

        let mut c = canvas();
        c.stroke_path(&path, 1.0, RED);
        assert_eq!(c.pixel(6, 2), Some(RED));
        assert_eq!(c.pixel(6, 20), Some(RED));
        assert_eq!(c.pixel(10, 11), Some(BG));
    }

    #[test]
    fn test_line_to_without_move_starts_subpath() {
        let mut path = Path::new();
        path.line_to(1.0, 1.0);
        assert_eq!(path.subpaths(), &[vec![(1.0, 1.0)]]);
    }

    #[test]
    fn test_circles() {
        let mut c = canvas();
        c.fill_circle(20.0, 15.0, 4.0, RED);
        assert_eq!(c.pixel(20, 15), Some(RED));
        assert_eq!(c.pixel(20, 24), Some(BG));

        let mut c = canvas();
        c.stroke_circle(20.0, 15.0, 6.0, 1.0, RED);
        assert_eq!(c.pixel(20, 15), Some(BG));
        assert_eq!(c.pixel(25, 15), Some(RED));
    }

    #[test]
    fn test_huge_shapes_are_clipped_to_canvas() {
        let start = std::time::Instant::now();
        let mut c = canvas();
        c.fill_circle(20.0, 15.0, 1e6, RED);
        assert_eq!(c.pixel(0, 0), Some(RED));
        assert_eq!(c.pixel(39, 29), Some(RED));

        let mut c = canvas();
        c.stroke_circle(20.0, 15.0, 1e6, 2.0, RED);
        assert_eq!(c.pixel(20, 15), Some(BG));

        let mut c = canvas();
        c.stroke_polyline(&[(-1e12, 15.0), (1e12, 15.0)], 1.0, RED);
        assert_eq!(c.pixel(0, 15), Some(RED));
        assert_eq!(c.pixel(39, 15), Some(RED));
        assert_eq!(c.pixel(20, 14), Some(BG));

        let mut c = canvas();
        c.stroke_polyline(&[(-1e12, 15.0), (1e12, 15.0)], 1e9, RED);
        assert_eq!(c.pixel(0, 0), Some(RED));

        let mut c = canvas();
        c.stroke_polyline(&[(-50.0, -50.0), (-10.0, -60.0)], 1.0, RED);
        c.fill_rect(-1_000_000, -1_000_000, usize::MAX / 4, 2_000_000, RED);
        assert_eq!(c.pixel(39, 29), Some(RED));

        assert!(start.elapsed() < std::time::Duration::from_secs(2));
    }

    #[test]
    fn test_pixel_out_of_bounds() {
        let c = canvas();
        assert_eq!(c.pixel(40, 0), None);
        assert_eq!(c.pixel(0, 30), None);
    }
}
