use super::{resolve_color, resolve_positive};
use crate::camera::Camera;
use crate::color::{optional_color, Rgb};
use crate::graphics::Canvas;
use crate::lighting::apply_lighting;
use crate::math::{add_scaled, sphere_point};
use crate::vertex::ScreenPoint;
use serde::Deserialize;

pub const DEFAULT_WIDTH: f64 = 2.0;
/// Height of a bar whose record leaves it out
pub const DEFAULT_HEIGHT: f64 = 100.0;
pub const DEFAULT_BORDER_WIDTH: f64 = 1.0;
/// Radius gained per unit of bar height
pub const HEIGHT_SCALE: f64 = 0.0008;
/// World units per unit of bar width
const WIDTH_SCALE: f64 = 0.025;
const DEPTH_RATIO: f64 = 0.6;

/// A bar is kept if any corner is nearer than this
const BAR_CULL_DEPTH: f64 = -0.1;
/// A face is skipped if its mean depth is farther than this
const FACE_CULL_DEPTH: f64 = -0.15;

/// Corner signs along the width and depth axes, in ring order
const RING: [(f64, f64); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

/// Corner indices and shade factor per face, drawn in this order
const FACES: [([usize; 4], f64); 5] = [
    ([0, 1, 5, 4], 0.5),  // back
    ([0, 4, 7, 3], 0.65), // left
    ([1, 2, 6, 5], 0.75), // right
    ([3, 7, 6, 2], 0.9),  // front
    ([4, 5, 6, 7], 1.0),  // top
];

/// A box extruded radially from the surface
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Bar {
    pub lon: f64,
    pub lat: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default, deserialize_with = "optional_color")]
    pub color: Option<Rgb>,
    #[serde(default, deserialize_with = "optional_color")]
    pub border_color: Option<Rgb>,
    #[serde(default)]
    pub border_width: Option<f64>,
    #[serde(default)]
    pub label: Option<String>,
}

fn default_height() -> f64 {
    DEFAULT_HEIGHT
}

impl Bar {
    pub fn new(lon: f64, lat: f64, height: f64) -> Self {
        Bar {
            lon,
            lat,
            height,
            width: None,
            color: None,
            border_color: None,
            border_width: None,
            label: None,
        }
    }

    pub fn width(&self) -> f64 {
        resolve_positive(self.width, DEFAULT_WIDTH)
    }

    /// World-space corners: 0-3 on the base, 4-7 on the top, each ring
    /// ordered back-left, back-right, front-right, front-left.
    pub fn corners(&self) -> [[f64; 3]; 8] {
        let base = sphere_point(self.lon, self.lat, 1.0);
        let top = sphere_point(self.lon, self.lat, 1.0 + self.height * HEIGHT_SCALE);

        let w = self.width() * WIDTH_SCALE;
        let d = w * DEPTH_RATIO;
        let (sin_lon, cos_lon) = (-self.lon.to_radians()).sin_cos();
        let cos_lat = self.lat.to_radians().cos();
        let half_width = [-sin_lon * w / 2.0, cos_lon * w / 2.0, 0.0];
        let half_depth = [
            -cos_lat * cos_lon * d / 2.0,
            -cos_lat * sin_lon * d / 2.0,
            cos_lat * d / 2.0,
        ];

        let ring = |center: &[f64; 3]| {
            RING.map(|(sw, sd)| {
                let side = add_scaled(center, &half_width, sw);
                add_scaled(&side, &half_depth, sd)
            })
        };
        let [b0, b1, b2, b3] = ring(&base);
        let [t0, t1, t2, t3] = ring(&top);
        [b0, b1, b2, b3, t0, t1, t2, t3]
    }
}

/// A bar transformed for one frame
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectedBar {
    pub corners: [ScreenPoint; 8],
    pub depth: f64,
    pub color: Rgb,
    pub border_color: Rgb,
    pub border_width: f64,
}

/// Transforms every bar, drops those entirely behind the globe and sorts the
/// rest back to front.
pub fn project_bars(bars: &[Bar], camera: &Camera, default_color: Rgb) -> Vec<ProjectedBar> {
    let mut projected: Vec<_> = bars
        .iter()
        .filter_map(|bar| {
            let corners = bar.corners().map(|c| camera.to_screen(camera.transform(c)));
            if !corners.iter().any(|c| c.depth > BAR_CULL_DEPTH) {
                return None;
            }
            Some(ProjectedBar {
                depth: corners.iter().map(|c| c.depth).sum::<f64>() / corners.len() as f64,
                corners,
                color: resolve_color(bar.color, default_color),
                border_color: resolve_color(bar.border_color, Rgb::BLACK),
                border_width: resolve_positive(bar.border_width, DEFAULT_BORDER_WIDTH),
            })
        })
        .collect();
    projected.sort_by(|a, b| a.depth.total_cmp(&b.depth));
    projected
}

pub fn draw_bars(canvas: &mut Canvas, camera: &Camera, bars: &[Bar], default_color: Rgb) {
    for bar in project_bars(bars, camera, default_color) {
        for (indices, shade) in FACES {
            let face = indices.map(|i| bar.corners[i]);
            let depth = face.iter().map(|c| c.depth).sum::<f64>() / 4.0;
            if depth < FACE_CULL_DEPTH {
                continue;
            }
            let outline = face.map(|c| c.xy());
            canvas.fill_polygon(&outline, apply_lighting(bar.color, shade));
            canvas.stroke_polygon(&outline, bar.border_width, bar.border_color);
        }
    }
}
