//! Vector overlays painted on top of the mesh.
//!
//! Every overlay projects through the same [`Camera`](crate::camera::Camera)
//! snapshot as the mesh. Per-record style fields are optional and resolve
//! against the defaults in [`OverlayStyle`] through [`resolve_positive`] and
//! [`resolve_color`].

pub mod bar;
pub mod line;
pub mod polyline;
pub mod scatter;
pub mod trajectory;

use crate::color::Rgb;
use polyline::PolylineStyle;

/// Default colors for records that carry no override
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayStyle {
    pub scatter_color: Rgb,
    pub line_color: Rgb,
    pub bar_color: Rgb,
    pub trajectory_color: Rgb,
    pub coastlines: PolylineStyle,
    pub countries: PolylineStyle,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        OverlayStyle {
            scatter_color: Rgb::new(255, 0, 0),
            line_color: Rgb::new(0, 0, 255),
            bar_color: Rgb::new(0, 255, 0),
            trajectory_color: Rgb::new(255, 0, 255),
            coastlines: PolylineStyle {
                enabled: true,
                color: Rgb::BLACK,
                width: 0.4,
            },
            countries: PolylineStyle {
                enabled: false,
                color: Rgb::new(0x33, 0x33, 0x33),
                width: 0.4,
            },
        }
    }
}

/// Uses `value` when it is a finite positive number, else `default`.
///
/// Zero counts as unset here: a zero-size marker or zero-width stroke would
/// draw nothing. Bar heights do not go through this.
pub fn resolve_positive(value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => default,
    }
}

pub fn resolve_color(value: Option<Rgb>, default: Rgb) -> Rgb {
    value.unwrap_or(default)
}
