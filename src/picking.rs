use crate::camera::Camera;
use crate::color::ColorScale;
use crate::graphics::Canvas;
use crate::overlay::bar::Bar;
use crate::overlay::scatter::ScatterPoint;

/// Extra pick radius around scatter markers, in pixels
const SCATTER_SLOP: f64 = 3.0;
/// Pixels at or below this level on every channel count as background
const BACKGROUND_LEVEL: u8 = 10;
/// How far below its base a bar still picks, in pixels
const BAR_BASE_SLOP: f64 = 5.0;
/// Pick height per unit of bar height, in pixels
const BAR_HEIGHT_PICK: f64 = 0.2;

/// A resolved hover label anchored at the pointer
#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Everything picking needs from the current frame
pub struct PickContext<'a> {
    pub camera: &'a Camera,
    pub bars: &'a [Bar],
    pub scatter: &'a [ScatterPoint],
    pub canvas: &'a Canvas,
    pub scale: &'a ColorScale,
    /// Canvas columns at or beyond this belong to the legend
    pub viewport_width: usize,
}

/// Resolves the tooltip under the pointer. Bars take priority over scatter
/// markers, which take priority over the grid color under the pointer.
pub fn pick(ctx: &PickContext<'_>, x: f64, y: f64) -> Option<Tooltip> {
    if x.is_nan() || x >= ctx.viewport_width as f64 {
        return None;
    }
    let text = pick_bar(ctx, x, y)
        .or_else(|| pick_scatter(ctx, x, y))
        .or_else(|| pick_grid(ctx, x, y))?;
    Some(Tooltip { text, x, y })
}

fn pick_bar(ctx: &PickContext<'_>, x: f64, y: f64) -> Option<String> {
    ctx.bars.iter().find_map(|bar| {
        let (base, visible) = ctx.camera.project_to_screen(bar.lon, bar.lat);
        if !visible {
            return None;
        }
        let dx = (x - base.x).abs();
        let dy = y - base.y;
        let hit = dx < bar.width() && dy > -bar.height * BAR_HEIGHT_PICK && dy < BAR_BASE_SLOP;
        if !hit {
            return None;
        }
        let label = bar.label.clone();
        Some(label.unwrap_or_else(|| format!("Bar: {:.2}", bar.height)))
    })
}

fn pick_scatter(ctx: &PickContext<'_>, x: f64, y: f64) -> Option<String> {
    ctx.scatter.iter().find_map(|point| {
        let (screen, visible) = ctx.camera.project_to_screen(point.lon, point.lat);
        if !visible {
            return None;
        }
        let dist = (x - screen.x).hypot(y - screen.y);
        (dist < point.radius() + SCATTER_SLOP).then(|| {
            point
                .label
                .clone()
                .unwrap_or_else(|| format!("({:.2}, {:.2})", point.lon, point.lat))
        })
    })
}

/// Inverts the palette at the pixel under the pointer. Lighting, overlays
/// and stroke blending make this approximate.
fn pick_grid(ctx: &PickContext<'_>, x: f64, y: f64) -> Option<String> {
    if x < 0.0 || y < 0.0 || ctx.scale.palette.len() == 0 {
        return None;
    }
    let pixel = ctx.canvas.pixel(x as usize, y as usize)?;
    if pixel.r <= BACKGROUND_LEVEL && pixel.g <= BACKGROUND_LEVEL && pixel.b <= BACKGROUND_LEVEL {
        return None;
    }
    let index = ctx.scale.palette.nearest_index(pixel);
    Some(format!("Value: {:.2}", ctx.scale.value_at_index(index)))
}
