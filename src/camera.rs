use crate::math::sphere_point;
use crate::vertex::{ProjectedPoint, ScreenPoint};

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 8.0;
pub const MIN_TILT: f64 = -90.0;
pub const MAX_TILT: f64 = 90.0;

/// Fraction of the half-extent the unit sphere fills at zoom 1.
const SPHERE_FILL: f64 = 0.85;

/// Depth above which a point counts as facing the viewer.
pub const VISIBILITY_THRESHOLD: f64 = 0.0;

/// Persistent camera orientation, in degrees.
///
/// The setters keep rotation wrapped to [0, 360), tilt clamped to [-90, 90]
/// and zoom clamped to [0.5, 8.0].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraState {
    rotation: f64,
    tilt: f64,
    zoom: f64,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            rotation: 0.0,
            tilt: 0.0,
            zoom: 1.0,
        }
    }
}

impl CameraState {
    pub fn new(rotation: f64, tilt: f64, zoom: f64) -> Self {
        let mut state = Self::default();
        state.set_rotation(rotation);
        state.set_tilt(tilt);
        state.set_zoom(zoom);
        state
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn tilt(&self) -> f64 {
        self.tilt
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        if degrees.is_finite() {
            // rem_euclid can round up to exactly 360 for tiny negative inputs
            let wrapped = degrees.rem_euclid(360.0);
            self.rotation = if wrapped >= 360.0 { 0.0 } else { wrapped };
        }
    }

    pub fn set_tilt(&mut self, degrees: f64) {
        if !degrees.is_nan() {
            self.tilt = degrees.clamp(MIN_TILT, MAX_TILT);
        }
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        if !zoom.is_nan() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    pub fn rotate_by(&mut self, degrees: f64) {
        self.set_rotation(self.rotation + degrees);
    }

    pub fn tilt_by(&mut self, degrees: f64) {
        self.set_tilt(self.tilt + degrees);
    }

    pub fn zoom_by(&mut self, delta: f64) {
        self.set_zoom(self.zoom + delta);
    }
}

/// Immutable per-frame camera snapshot shared by every renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub cos_rotation: f64,
    pub sin_rotation: f64,
    pub cos_tilt: f64,
    pub sin_tilt: f64,
    /// Pixels per unit radius
    pub scale: f64,
    pub center_x: f64,
    pub center_y: f64,
}

impl Camera {
    /// Builds the snapshot for a canvas of the given pixel size.
    pub fn new(state: &CameraState, width: usize, height: usize) -> Self {
        let (sin_rotation, cos_rotation) = (-state.rotation().to_radians()).sin_cos();
        let (sin_tilt, cos_tilt) = state.tilt().to_radians().sin_cos();
        let scale = (width.min(height) as f64 / 2.0) * SPHERE_FILL * state.zoom();
        Camera {
            cos_rotation,
            sin_rotation,
            cos_tilt,
            sin_tilt,
            scale,
            center_x: width as f64 / 2.0,
            center_y: height as f64 / 2.0,
        }
    }

    /// Rotates a world-space point about the polar axis, then tilts it about
    /// the horizontal axis. Output is `[screen x, depth, screen up]`.
    pub fn transform(&self, p: [f64; 3]) -> [f64; 3] {
        rotate_and_tilt(
            p,
            self.cos_rotation,
            self.sin_rotation,
            self.cos_tilt,
            self.sin_tilt,
        )
    }

    /// Maps a transformed point to canvas pixels.
    pub fn to_screen(&self, rotated: [f64; 3]) -> ScreenPoint {
        ScreenPoint {
            x: self.center_x + rotated[0] * self.scale,
            y: self.center_y - rotated[2] * self.scale,
            depth: rotated[1],
        }
    }

    pub fn project(&self, lon: f64, lat: f64) -> ProjectedPoint {
        project(
            lon,
            lat,
            self.cos_rotation,
            self.sin_rotation,
            self.cos_tilt,
            self.sin_tilt,
        )
    }

    /// Projects `(lon, lat)` on the unit sphere straight to canvas pixels.
    pub fn project_to_screen(&self, lon: f64, lat: f64) -> (ScreenPoint, bool) {
        let p = self.project(lon, lat);
        (self.screen_of(&p), p.visible)
    }

    /// Projects a point lifted to `radius` (1.0 is the surface).
    pub fn project_at_radius(&self, lon: f64, lat: f64, radius: f64) -> ScreenPoint {
        self.to_screen(self.transform(sphere_point(lon, lat, radius)))
    }

    pub fn screen_of(&self, p: &ProjectedPoint) -> ScreenPoint {
        ScreenPoint {
            x: self.center_x + p.x * self.scale,
            y: self.center_y - p.y * self.scale,
            depth: p.depth,
        }
    }
}

fn rotate_and_tilt(p: [f64; 3], cos_r: f64, sin_r: f64, cos_t: f64, sin_t: f64) -> [f64; 3] {
    let x_rot = p[0] * cos_r - p[1] * sin_r;
    let y_rot = p[0] * sin_r + p[1] * cos_r;
    let y_tilt = y_rot * cos_t - p[2] * sin_t;
    let z_tilt = y_rot * sin_t + p[2] * cos_t;
    [x_rot, y_tilt, z_tilt]
}

/// Projects `(lon, lat)` in degrees through the given rotation and tilt.
///
/// A point is visible iff its depth is strictly greater than
/// [`VISIBILITY_THRESHOLD`]; depth 0 lies on the silhouette and is culled.
pub fn project(
    lon: f64,
    lat: f64,
    cos_rotation: f64,
    sin_rotation: f64,
    cos_tilt: f64,
    sin_tilt: f64,
) -> ProjectedPoint {
    let [x, depth, y] = rotate_and_tilt(
        sphere_point(lon, lat, 1.0),
        cos_rotation,
        sin_rotation,
        cos_tilt,
        sin_tilt,
    );
    ProjectedPoint {
        x,
        y,
        depth,
        visible: depth > VISIBILITY_THRESHOLD,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    fn identity() -> Camera {
        Camera::new(&CameraState::default(), 200, 100)
    }

    #[rstest]
    #[case(-90.0, 0.0)]
    #[case(-30.0, 45.0)]
    #[case(-150.0, -60.0)]
    #[case(40.0, 10.0)]
    #[case(120.0, -20.0)]
    fn test_identity_matches_cartesian(#[case] lon: f64, #[case] lat: f64) {
        let p = identity().project(lon, lat);
        let c = sphere_point(lon, lat, 1.0);
        assert_abs_diff_eq!(p.x, c[0], epsilon = 1e-12);
        assert_abs_diff_eq!(p.depth, c[1], epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, c[2], epsilon = 1e-12);
        assert_eq!(p.visible, c[1] > 0.0);
    }

    #[test]
    fn test_visibility_flips_at_zero_depth() {
        let cam = identity();
        // lon 0 at the equator sits exactly on the silhouette.
        let edge = cam.project(0.0, 0.0);
        assert_eq!(edge.depth, 0.0);
        assert!(!edge.visible);
        // Just west of it faces the viewer, just east faces away.
        let near = cam.project(-1e-6, 0.0);
        assert!(near.depth > 0.0 && near.visible);
        let far = cam.project(1e-6, 0.0);
        assert!(far.depth < 0.0 && !far.visible);
    }

    #[test]
    fn test_view_center_is_lon_minus_90() {
        let p = identity().project(-90.0, 0.0);
        assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.depth, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_brings_meridian_to_front() {
        // The front meridian is lon = -90 - rotation.
        let cam = Camera::new(&CameraState::new(270.0, 0.0, 1.0), 100, 100);
        let p = cam.project(0.0, 0.0);
        assert_abs_diff_eq!(p.depth, 1.0, epsilon = 1e-12);
        assert!(p.visible);
        let cam = Camera::new(&CameraState::new(90.0, 0.0, 1.0), 100, 100);
        assert_abs_diff_eq!(cam.project(-180.0, 0.0).depth, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_tilt_exposes_pole() {
        let flat = identity().project(0.0, 90.0);
        assert!(!flat.visible);
        let cam = Camera::new(&CameraState::new(0.0, -30.0, 1.0), 100, 100);
        assert!(cam.project(0.0, 90.0).visible);
    }

    #[test]
    fn test_poles_are_finite() {
        let cam = Camera::new(&CameraState::new(33.0, 47.0, 2.0), 80, 60);
        for lat in [90.0, -90.0] {
            let p = cam.project(77.0, lat);
            assert!(p.x.is_finite() && p.y.is_finite() && p.depth.is_finite());
        }
    }

    #[test]
    fn test_screen_mapping() {
        let cam = Camera::new(&CameraState::default(), 200, 100);
        assert_abs_diff_eq!(cam.scale, 50.0 * 0.85, epsilon = 1e-12);
        let (s, visible) = cam.project_to_screen(-90.0, 0.0);
        assert!(visible);
        assert_abs_diff_eq!(s.x, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(s.y, 50.0, epsilon = 1e-9);
        // North is up on screen.
        let (n, _) = cam.project_to_screen(-90.0, 45.0);
        assert!(n.y < 50.0);
    }

    #[test]
    fn test_radius_lifts_point_outward() {
        let cam = identity();
        let surface = cam.project_at_radius(-90.0, 60.0, 1.0);
        let lifted = cam.project_at_radius(-90.0, 60.0, 1.2);
        assert!(lifted.y < surface.y);
    }

    #[test]
    fn test_state_clamps_and_wraps() {
        let mut s = CameraState::default();
        s.set_rotation(-30.0);
        assert_abs_diff_eq!(s.rotation(), 330.0, epsilon = 1e-12);
        s.set_rotation(725.0);
        assert_abs_diff_eq!(s.rotation(), 5.0, epsilon = 1e-12);
        s.set_rotation(-1e-18);
        assert!(s.rotation() >= 0.0 && s.rotation() < 360.0);
        s.set_tilt(120.0);
        assert_eq!(s.tilt(), 90.0);
        s.set_tilt(-400.0);
        assert_eq!(s.tilt(), -90.0);
        s.set_zoom(100.0);
        assert_eq!(s.zoom(), MAX_ZOOM);
        s.set_zoom(0.0);
        assert_eq!(s.zoom(), MIN_ZOOM);
    }

    #[test]
    fn test_state_ignores_nan() {
        let mut s = CameraState::new(10.0, 20.0, 2.0);
        s.set_rotation(f64::NAN);
        s.set_tilt(f64::NAN);
        s.set_zoom(f64::NAN);
        assert_eq!(s, CameraState::new(10.0, 20.0, 2.0));
    }
}
