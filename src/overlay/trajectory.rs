use super::{resolve_color, resolve_positive};
use crate::camera::Camera;
use crate::color::{optional_color, Rgb};
use crate::graphics::Canvas;
use crate::math::lerp;
use crate::vertex::ScreenPoint;
use serde::Deserialize;

pub const DEFAULT_WIDTH: f64 = 2.5;
pub const DEFAULT_POINT_SIZE: f64 = 4.0;
/// Linear sub-steps between consecutive waypoints
pub const SUB_STEPS: usize = 10;
/// Radius gained per unit of altitude
pub const ALTITUDE_SCALE: f64 = 0.0008;

const NEAR_DEPTH: f64 = 0.1;
const FAR_DEPTH: f64 = -0.3;
const MIN_ALPHA: f64 = 0.08;

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Waypoint {
    pub lon: f64,
    pub lat: f64,
    #[serde(default)]
    pub altitude: f64,
}

impl Waypoint {
    pub const fn new(lon: f64, lat: f64, altitude: f64) -> Self {
        Waypoint { lon, lat, altitude }
    }
}

/// A path flown above the surface. Unlike [`Line`](super::line::Line) it
/// interpolates linearly in lon/lat and fades behind the globe instead of
/// being clipped.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Trajectory {
    pub coords: Vec<Waypoint>,
    #[serde(default, deserialize_with = "optional_color")]
    pub color: Option<Rgb>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub show_points: Option<bool>,
    #[serde(default)]
    pub point_size: Option<f64>,
    #[serde(default, deserialize_with = "optional_color")]
    pub point_color: Option<Rgb>,
    #[serde(default)]
    pub label: Option<String>,
}

impl Trajectory {
    pub fn new(coords: Vec<Waypoint>) -> Self {
        Trajectory {
            coords,
            color: None,
            width: None,
            show_points: None,
            point_size: None,
            point_color: None,
            label: None,
        }
    }
}

/// Opacity for a stroke at the given depth: opaque in front, faint behind,
/// with a quadratic ramp across the limb.
pub fn depth_alpha(depth: f64) -> f64 {
    if depth > NEAR_DEPTH {
        1.0
    } else if depth < FAR_DEPTH {
        MIN_ALPHA
    } else {
        let t = (depth - FAR_DEPTH) / (NEAR_DEPTH - FAR_DEPTH);
        MIN_ALPHA + (1.0 - MIN_ALPHA) * t * t
    }
}

fn project_waypoint(camera: &Camera, lon: f64, lat: f64, altitude: f64) -> ScreenPoint {
    camera.project_at_radius(lon, lat, 1.0 + altitude * ALTITUDE_SCALE)
}

/// Screen samples for each leg, `SUB_STEPS + 1` per leg including both ends.
pub fn project_legs(trajectory: &Trajectory, camera: &Camera) -> Vec<Vec<ScreenPoint>> {
    trajectory
        .coords
        .windows(2)
        .map(|pair| {
            let (from, to) = (pair[0], pair[1]);
            (0..=SUB_STEPS)
                .map(|i| {
                    let t = i as f64 / SUB_STEPS as f64;
                    project_waypoint(
                        camera,
                        lerp(from.lon, to.lon, t),
                        lerp(from.lat, to.lat, t),
                        lerp(from.altitude, to.altitude, t),
                    )
                })
                .collect()
        })
        .collect()
}

pub fn draw_trajectories(
    canvas: &mut Canvas,
    camera: &Camera,
    trajectories: &[Trajectory],
    default_color: Rgb,
) {
    for trajectory in trajectories {
        let color = resolve_color(trajectory.color, default_color);
        let width = resolve_positive(trajectory.width, DEFAULT_WIDTH);

        for leg in project_legs(trajectory, camera) {
            for pair in leg.windows(2) {
                canvas.set_alpha(depth_alpha((pair[0].depth + pair[1].depth) / 2.0));
                canvas.stroke_polyline(&[pair[0].xy(), pair[1].xy()], width, color);
            }
        }

        if trajectory.show_points.unwrap_or(false) {
            let size = resolve_positive(trajectory.point_size, DEFAULT_POINT_SIZE);
            let point_color = resolve_color(trajectory.point_color, color);
            for w in &trajectory.coords {
                let p = project_waypoint(camera, w.lon, w.lat, w.altitude);
                canvas.set_alpha(depth_alpha(p.depth));
                canvas.fill_circle(p.x, p.y, size, point_color);
                canvas.stroke_circle(p.x, p.y, size, 1.0, Rgb::BLACK);
            }
        }

        canvas.set_alpha(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraState;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_alpha_ramp() {
        assert_abs_diff_eq!(depth_alpha(-0.3), 0.08, epsilon = 1e-12);
        assert_abs_diff_eq!(depth_alpha(0.1), 1.0, epsilon = 1e-12);
        assert_eq!(depth_alpha(0.5), 1.0);
        assert_eq!(depth_alpha(-0.9), 0.08);
        let mid = depth_alpha(-0.1);
        assert!(mid > 0.08 && mid < 1.0);
        assert_abs_diff_eq!(mid, 0.08 + 0.92 * 0.25, epsilon = 1e-12);
        // Quadratic ramp stays under the straight line between the ends.
        let linear = 0.08 + 0.92 * 0.5;
        assert!(mid < linear);
    }

    #[test]
    fn test_alpha_is_monotonic() {
        let mut prev = 0.0;
        for i in 0..=100 {
            let a = depth_alpha(-1.0 + i as f64 * 0.02);
            assert!(a >= prev);
            prev = a;
        }
    }

    #[test]
    fn test_legs_have_sub_steps() {
        let traj = Trajectory::new(vec![
            Waypoint::new(-100.0, 0.0, 0.0),
            Waypoint::new(-80.0, 10.0, 500.0),
            Waypoint::new(-60.0, 0.0, 0.0),
        ]);
        let camera = Camera::new(&CameraState::default(), 100, 100);
        let legs = project_legs(&traj, &camera);
        assert_eq!(legs.len(), 2);
        assert!(legs.iter().all(|leg| leg.len() == SUB_STEPS + 1));
    }

    #[test]
    fn test_altitude_lifts_above_surface() {
        let camera = Camera::new(&CameraState::default(), 100, 100);
        let ground = project_waypoint(&camera, -90.0, 45.0, 0.0);
        let high = project_waypoint(&camera, -90.0, 45.0, 1000.0);
        assert!(high.y < ground.y);
        let (surface, _) = camera.project_to_screen(-90.0, 45.0);
        assert_abs_diff_eq!(ground.y, surface.y, epsilon = 1e-9);
    }

    #[test]
    fn test_alpha_reset_after_draw() {
        let traj = Trajectory {
            show_points: Some(true),
            ..Trajectory::new(vec![
                Waypoint::new(60.0, 0.0, 0.0),
                Waypoint::new(120.0, 0.0, 0.0),
            ])
        };
        let camera = Camera::new(&CameraState::default(), 100, 100);
        let mut canvas = Canvas::new(100, 100);
        canvas.clear(Rgb::BLACK);
        draw_trajectories(&mut canvas, &camera, &[traj], Rgb::WHITE);
        assert_eq!(canvas.alpha(), 1.0);
    }

    #[test]
    fn test_missing_altitude_defaults_to_zero() {
        let w: Waypoint = serde_json::from_str(r#"{"lon": 3, "lat": 4}"#).unwrap();
        assert_eq!(w.altitude, 0.0);
    }
}
