use super::{resolve_color, resolve_positive};
use crate::camera::Camera;
use crate::color::{optional_color, Rgb};
use crate::graphics::{Canvas, Path};
use crate::math::great_circle;
use serde::Deserialize;

pub const DEFAULT_WIDTH: f64 = 2.0;
/// Great-circle samples between consecutive waypoints
pub const ARC_SEGMENTS: usize = 20;

/// A route along the surface through `[lon, lat]` waypoints
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Line {
    pub coords: Vec<[f64; 2]>,
    #[serde(default, deserialize_with = "optional_color")]
    pub color: Option<Rgb>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub label: Option<String>,
}

impl Line {
    pub fn new(coords: Vec<[f64; 2]>) -> Self {
        Line {
            coords,
            color: None,
            width: None,
            label: None,
        }
    }
}

/// Projects a line, following great circles between waypoints. Samples on
/// the far side end the current subpath.
pub fn project_line(line: &Line, camera: &Camera) -> Path {
    let mut path = Path::new();
    let mut pen_down = false;
    let mut plot = |path: &mut Path, lon: f64, lat: f64| {
        let (screen, visible) = camera.project_to_screen(lon, lat);
        if !visible {
            pen_down = false;
        } else if pen_down {
            path.line_to(screen.x, screen.y);
        } else {
            path.move_to(screen.x, screen.y);
            pen_down = true;
        }
    };

    if let Some(&[lon, lat]) = line.coords.first() {
        plot(&mut path, lon, lat);
    }
    for pair in line.coords.windows(2) {
        let ([lon1, lat1], [lon2, lat2]) = (pair[0], pair[1]);
        for (lon, lat) in great_circle(lon1, lat1, lon2, lat2, ARC_SEGMENTS) {
            plot(&mut path, lon, lat);
        }
    }
    path
}

pub fn draw_lines(canvas: &mut Canvas, camera: &Camera, lines: &[Line], default_color: Rgb) {
    for line in lines {
        let path = project_line(line, camera);
        canvas.stroke_path(
            &path,
            resolve_positive(line.width, DEFAULT_WIDTH),
            resolve_color(line.color, default_color),
        );
    }
}
