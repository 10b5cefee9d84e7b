use super::{resolve_color, resolve_positive};
use crate::camera::Camera;
use crate::color::{optional_color, Rgb};
use crate::graphics::Canvas;
use crate::vertex::ScreenPoint;
use serde::Deserialize;

pub const DEFAULT_SIZE: f64 = 5.0;
pub const DEFAULT_BORDER_WIDTH: f64 = 1.0;

/// A circular marker pinned to the surface
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ScatterPoint {
    pub lon: f64,
    pub lat: f64,
    #[serde(default)]
    pub size: Option<f64>,
    #[serde(default, deserialize_with = "optional_color")]
    pub color: Option<Rgb>,
    #[serde(default, deserialize_with = "optional_color")]
    pub border_color: Option<Rgb>,
    #[serde(default)]
    pub border_width: Option<f64>,
    #[serde(default)]
    pub label: Option<String>,
}

impl ScatterPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        ScatterPoint {
            lon,
            lat,
            size: None,
            color: None,
            border_color: None,
            border_width: None,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn radius(&self) -> f64 {
        resolve_positive(self.size, DEFAULT_SIZE)
    }
}

/// Visible markers with their screen position, nearest last
pub fn project_scatter<'a>(
    points: &'a [ScatterPoint],
    camera: &Camera,
) -> Vec<(&'a ScatterPoint, ScreenPoint)> {
    let mut visible: Vec<_> = points
        .iter()
        .filter_map(|point| {
            let (screen, visible) = camera.project_to_screen(point.lon, point.lat);
            visible.then_some((point, screen))
        })
        .collect();
    visible.sort_by(|a, b| a.1.depth.total_cmp(&b.1.depth));
    visible
}

pub fn draw_scatter(
    canvas: &mut Canvas,
    camera: &Camera,
    points: &[ScatterPoint],
    default_color: Rgb,
) {
    for (point, screen) in project_scatter(points, camera) {
        let radius = point.radius();
        let fill = resolve_color(point.color, default_color);
        canvas.fill_circle(screen.x, screen.y, radius, fill);
        canvas.stroke_circle(
            screen.x,
            screen.y,
            radius,
            resolve_positive(point.border_width, DEFAULT_BORDER_WIDTH),
            resolve_color(point.border_color, Rgb::BLACK),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraState;

    #[test]
    fn test_sorted_and_culled() {
        let points = vec![
            ScatterPoint::new(-90.0, 0.0),
            ScatterPoint::new(90.0, 0.0),
            ScatterPoint::new(-40.0, 10.0),
        ];
        let camera = Camera::new(&CameraState::default(), 100, 100);
        let projected = project_scatter(&points, &camera);
        assert_eq!(projected.len(), 2);
        assert_eq!(projected[0].0.lon, -40.0);
        assert_eq!(projected[1].0.lon, -90.0);
    }

    #[test]
    fn test_defaults_and_overrides() {
        let json = r#"{"lon": 1, "lat": 2, "size": null, "color": ""}"#;
        let p: ScatterPoint = serde_json::from_str(json).unwrap();
        assert_eq!(p.radius(), DEFAULT_SIZE);
        assert_eq!(p.color, None);
        let json = r##"{"lon": 1, "lat": 2, "size": 9, "color": "#112233"}"##;
        let p: ScatterPoint = serde_json::from_str(json).unwrap();
        assert_eq!(p.radius(), 9.0);
        assert_eq!(p.color, Some(Rgb::new(0x11, 0x22, 0x33)));
    }

    #[test]
    fn test_draw_uses_fill_and_border() {
        let points = vec![ScatterPoint {
            size: Some(6.0),
            ..ScatterPoint::new(-90.0, 0.0)
        }];
        let camera = Camera::new(&CameraState::default(), 100, 100);
        let mut canvas = Canvas::new(100, 100);
        canvas.clear(Rgb::WHITE);
        draw_scatter(&mut canvas, &camera, &points, Rgb::new(255, 0, 0));
        assert_eq!(canvas.pixel(50, 50), Some(Rgb::new(255, 0, 0)));
        assert_eq!(canvas.pixel(55, 50), Some(Rgb::BLACK));
        assert_eq!(canvas.pixel(58, 50), Some(Rgb::WHITE));
    }
}
