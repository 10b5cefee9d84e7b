use crate::color::Rgb;
use crate::math::{dot, sphere_point};

/// Directional light parameters, angles in degrees
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightState {
    pub enabled: bool,
    pub azimuth: f64,
    pub elevation: f64,
    pub intensity: f64,
    /// Ambient term, expected in [0, 1] but not clamped
    pub ambient: f64,
}

impl Default for LightState {
    fn default() -> Self {
        Self {
            enabled: false,
            azimuth: -45.0,
            elevation: 45.0,
            intensity: 0.8,
            ambient: 0.3,
        }
    }
}

impl LightState {
    /// Unit vector pointing toward the light in world space
    pub fn direction(&self) -> [f64; 3] {
        let (sin_az, cos_az) = self.azimuth.to_radians().sin_cos();
        let (sin_el, cos_el) = self.elevation.to_radians().sin_cos();
        [cos_el * sin_az, cos_el * cos_az, sin_el]
    }

    /// The light as seen by one frame, or `None` when lighting is off
    pub fn frame_light(&self) -> Option<FrameLight> {
        self.enabled.then(|| FrameLight {
            direction: self.direction(),
            intensity: self.intensity,
            ambient: self.ambient,
        })
    }
}

/// Light direction resolved once per frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameLight {
    pub direction: [f64; 3],
    pub intensity: f64,
    pub ambient: f64,
}

impl FrameLight {
    /// Illumination factor for the surface at `(lon, lat)`
    pub fn illuminate(&self, lon: f64, lat: f64) -> f64 {
        let normal = sphere_point(lon, lat, 1.0);
        lighting_factor(dot(&normal, &self.direction), self.intensity, self.ambient)
    }
}

/// Lambert's cosine law plus an ambient term, clamped into [0, 1]
pub fn lighting_factor(cos_angle: f64, intensity: f64, ambient: f64) -> f64 {
    let diffuse = cos_angle.max(0.0) * intensity;
    (ambient + diffuse).min(1.0).max(0.0)
}

/// Scales each channel by `factor`, truncating toward zero
pub fn apply_lighting(color: Rgb, factor: f64) -> Rgb {
    let scale = |c: u8| (c as f64 * factor).min(255.0) as u8;
    Rgb::new(scale(color.r), scale(color.g), scale(color.b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_direction_is_unit() {
        let light = LightState {
            azimuth: 123.0,
            elevation: -17.0,
            ..LightState::default()
        };
        let d = light.direction();
        assert_abs_diff_eq!(dot(&d, &d), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_overhead_light() {
        let light = LightState {
            enabled: true,
            elevation: 90.0,
            intensity: 1.0,
            ambient: 0.0,
            ..LightState::default()
        };
        let frame = light.frame_light().unwrap();
        assert_abs_diff_eq!(frame.illuminate(0.0, 90.0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(frame.illuminate(0.0, 0.0), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(frame.illuminate(0.0, -90.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_disabled_has_no_frame_light() {
        assert!(LightState::default().frame_light().is_none());
    }

    #[test]
    fn test_factor_is_monotonic_and_clamped() {
        for &(intensity, ambient) in &[(0.8, 0.3), (1.5, 0.6), (0.2, -0.4), (0.0, 1.2)] {
            let mut prev = f64::MIN;
            for i in 0..=200 {
                let cos = -1.0 + i as f64 * 0.01;
                let f = lighting_factor(cos, intensity, ambient);
                assert!((0.0..=1.0).contains(&f), "factor {f} out of range");
                assert!(f >= prev, "not monotonic at cos {cos}");
                prev = f;
            }
        }
    }

    #[test]
    fn test_back_faces_get_ambient_only() {
        assert_abs_diff_eq!(lighting_factor(-0.7, 0.8, 0.3), 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_apply_lighting_truncates() {
        let c = Rgb::new(255, 101, 3);
        assert_eq!(apply_lighting(c, 0.5), Rgb::new(127, 50, 1));
        assert_eq!(apply_lighting(c, 1.0), c);
        assert_eq!(apply_lighting(c, 0.0), Rgb::BLACK);
    }
}
