use crate::color::{ColorScale, Rgb};
use crate::font::{self, FONT_HEIGHT};
use crate::graphics::Canvas;

/// Fraction of the legend height taken by the gradient
const BAR_FRACTION: f64 = 0.7;
const BAR_INSET: isize = 2;
const BAR_WIDTH: usize = 4;
const TICK_LEN: usize = 2;
const LABEL_GAP: usize = 2;
pub const TICK_COUNT: usize = 5;

/// Pixel rectangle on the canvas
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LegendStyle {
    pub background: Rgb,
    pub text_color: Rgb,
    pub title: String,
}

/// Tick positions from the top of the bar (0.0) to the bottom (1.0) with
/// their labels. The top tick is `vmax`.
pub fn ticks(scale: &ColorScale) -> Vec<(f64, String)> {
    (0..TICK_COUNT)
        .map(|i| {
            let frac = i as f64 / (TICK_COUNT - 1) as f64;
            let value = scale.vmin + (scale.vmax - scale.vmin) * (1.0 - frac);
            (frac, format!("{:.1}", value))
        })
        .collect()
}

/// Paints the color bar legend into `rect`.
pub fn draw_legend(canvas: &mut Canvas, rect: Rect, scale: &ColorScale, style: &LegendStyle) {
    if rect.width == 0 || rect.height == 0 {
        return;
    }
    let (x0, y0) = (rect.x as isize, rect.y as isize);
    canvas.fill_rect(x0, y0, rect.width, rect.height, style.background);

    let bar_height = ((rect.height as f64 * BAR_FRACTION) as usize).max(1);
    let bar_x = x0 + BAR_INSET;
    let bar_y = y0 + ((rect.height - bar_height) / 2) as isize;

    // Highest values at the top.
    let n = scale.palette.len();
    for row in 0..bar_height {
        let band = (row * n / bar_height).min(n.saturating_sub(1));
        let color = scale.palette.colors[n - 1 - band];
        canvas.fill_rect(bar_x, bar_y + row as isize, BAR_WIDTH, 1, color);
    }

    let (bx, by) = (bar_x as f64, bar_y as f64);
    let (bw, bh) = (BAR_WIDTH as f64, bar_height as f64);
    let border = [
        (bx - 1.0, by - 1.0),
        (bx + bw, by - 1.0),
        (bx + bw, by + bh),
        (bx - 1.0, by + bh),
    ];
    canvas.stroke_polygon(&border, 1.0, style.text_color);

    let tick_x = bar_x + BAR_WIDTH as isize + 1;
    let label_x = tick_x + (TICK_LEN + LABEL_GAP) as isize;
    for (frac, label) in ticks(scale) {
        let y = bar_y + (frac * (bar_height - 1) as f64).round() as isize;
        canvas.fill_rect(tick_x, y, TICK_LEN, 1, style.text_color);
        let label_y = y - (FONT_HEIGHT / 2) as isize;
        font::draw_text(canvas, label_x, label_y, &label, style.text_color);
    }

    if !style.title.is_empty() {
        let title_y = (bar_y - FONT_HEIGHT as isize - 4).max(y0 + 1);
        font::draw_text(canvas, bar_x, title_y, &style.title, style.text_color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::palette;

    fn scale() -> ColorScale {
        let viridis = palette("Viridis256").unwrap();
        ColorScale::new(viridis, &[-10.0, 30.0], None, None, Rgb::BLACK)
    }

    #[test]
    fn test_ticks_run_from_vmax_down() {
        let t = ticks(&scale());
        let labels: Vec<_> = t.iter().map(|(_, l)| l.as_str()).collect();
        assert_eq!(labels, ["30.0", "20.0", "10.0", "0.0", "-10.0"]);
        assert_eq!(t[0].0, 0.0);
        assert_eq!(t[4].0, 1.0);
    }

    #[test]
    fn test_gradient_is_reversed() {
        let s = scale();
        let rect = Rect {
            x: 60,
            y: 0,
            width: 40,
            height: 100,
        };
        let mut canvas = Canvas::new(100, 100);
        let style = LegendStyle {
            background: Rgb::new(10, 10, 10),
            text_color: Rgb::WHITE,
            title: "Temp".into(),
        };
        draw_legend(&mut canvas, rect, &s, &style);
        // Bar is 70 px tall, starting at y = 15, inset 2 px.
        let top = canvas.pixel(63, 16).unwrap();
        let bottom = canvas.pixel(63, 83).unwrap();
        assert_eq!(top, s.palette.colors[255 - (256 / 70)]);
        assert_eq!(bottom, s.palette.colors[255 - (68 * 256 / 70)]);
        // Border in the text color, background outside.
        assert_eq!(canvas.pixel(61, 50), Some(Rgb::WHITE));
        assert_eq!(canvas.pixel(60, 99), Some(Rgb::new(10, 10, 10)));
    }

    #[test]
    fn test_empty_rect_is_noop() {
        let mut canvas = Canvas::new(10, 10);
        canvas.clear(Rgb::BLACK);
        let style = LegendStyle {
            background: Rgb::WHITE,
            text_color: Rgb::WHITE,
            title: String::new(),
        };
        let rect = Rect {
            x: 0,
            y: 0,
            width: 0,
            height: 10,
        };
        draw_legend(&mut canvas, rect, &scale(), &style);
        assert_eq!(canvas.pixel(0, 0), Some(Rgb::BLACK));
    }
}
