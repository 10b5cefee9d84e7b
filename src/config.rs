use crate::camera::CameraState;
use crate::color::{palette, ColorScale, Rgb};
use crate::error::Result;
use crate::interaction::InteractionSettings;
use crate::legend::LegendStyle;
use crate::lighting::LightState;
use crate::overlay::polyline::PolylineStyle;
use crate::overlay::OverlayStyle;
use log::{info, warn};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "globe3d.yaml";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub view: ViewConfig,
    pub colors: ColorConfig,
    pub overlays: OverlayConfig,
    pub lighting: LightingConfig,
    pub colorbar: ColorbarConfig,
    pub interaction: InteractionConfig,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub rotation: f64,
    pub tilt: f64,
    pub zoom: f64,
    pub autorotate: bool,
    pub rotation_speed: f64,
    pub background: Rgb,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub palette: String,
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
    pub nan_color: Rgb,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub show_coastlines: bool,
    pub coastline_color: Rgb,
    pub coastline_width: f64,
    pub show_countries: bool,
    pub country_color: Rgb,
    pub country_width: f64,
    pub scatter_color: Rgb,
    pub line_color: Rgb,
    pub bar_color: Rgb,
    pub trajectory_color: Rgb,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub enabled: bool,
    pub azimuth: f64,
    pub elevation: f64,
    pub intensity: f64,
    pub ambient: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ColorbarConfig {
    pub show: bool,
    pub title: String,
    pub text_color: Rgb,
    pub width: usize,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub enable_hover: bool,
    pub drag_degrees_per_pixel: f64,
    pub resume_delay_ms: u64,
    pub frame_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            view: ViewConfig::default(),
            colors: ColorConfig::default(),
            overlays: OverlayConfig::default(),
            lighting: LightingConfig::default(),
            colorbar: ColorbarConfig::default(),
            interaction: InteractionConfig::default(),
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            rotation: 0.0,
            tilt: 0.0,
            zoom: 1.0,
            autorotate: false,
            rotation_speed: 1.0,
            background: Rgb::new(0x0a, 0x0a, 0x0a),
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            palette: "Turbo256".into(),
            vmin: None,
            vmax: None,
            nan_color: Rgb::new(0x80, 0x80, 0x80),
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        let style = OverlayStyle::default();
        Self {
            show_coastlines: style.coastlines.enabled,
            coastline_color: style.coastlines.color,
            coastline_width: style.coastlines.width,
            show_countries: style.countries.enabled,
            country_color: style.countries.color,
            country_width: style.countries.width,
            scatter_color: style.scatter_color,
            line_color: style.line_color,
            bar_color: style.bar_color,
            trajectory_color: style.trajectory_color,
        }
    }
}

impl Default for LightingConfig {
    fn default() -> Self {
        let light = LightState::default();
        Self {
            enabled: light.enabled,
            azimuth: light.azimuth,
            elevation: light.elevation,
            intensity: light.intensity,
            ambient: light.ambient,
        }
    }
}

impl Default for ColorbarConfig {
    fn default() -> Self {
        Self {
            show: true,
            title: "Value".into(),
            text_color: Rgb::WHITE,
            width: 40,
        }
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        let settings = InteractionSettings::default();
        Self {
            enable_hover: true,
            drag_degrees_per_pixel: settings.drag_degrees_per_pixel,
            resume_delay_ms: settings.resume_delay.as_millis() as u64,
            frame_interval_ms: settings.frame_interval.as_millis() as u64,
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reads `path`, or the default file when none is given. Problems with
    /// the default file are logged and fall back to defaults; an explicit
    /// path must exist and parse.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if !default_path.exists() {
                return Ok(Config::default());
            }
            return Ok(Self::read(default_path).unwrap_or_else(|e| {
                warn!("failed to load {DEFAULT_CONFIG_FILE}: {e}; using defaults");
                Config::default()
            }));
        };
        Self::read(path)
    }

    fn read(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&contents)?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn camera(&self) -> CameraState {
        CameraState::new(self.view.rotation, self.view.tilt, self.view.zoom)
    }

    pub fn color_scale(&self, values: &[f64]) -> Result<ColorScale> {
        Ok(ColorScale::new(
            palette(&self.colors.palette)?,
            values,
            self.colors.vmin,
            self.colors.vmax,
            self.colors.nan_color,
        ))
    }

    pub fn overlay_style(&self) -> OverlayStyle {
        let o = &self.overlays;
        OverlayStyle {
            scatter_color: o.scatter_color,
            line_color: o.line_color,
            bar_color: o.bar_color,
            trajectory_color: o.trajectory_color,
            coastlines: PolylineStyle {
                enabled: o.show_coastlines,
                color: o.coastline_color,
                width: o.coastline_width,
            },
            countries: PolylineStyle {
                enabled: o.show_countries,
                color: o.country_color,
                width: o.country_width,
            },
        }
    }

    pub fn light(&self) -> LightState {
        let l = &self.lighting;
        LightState {
            enabled: l.enabled,
            azimuth: l.azimuth,
            elevation: l.elevation,
            intensity: l.intensity,
            ambient: l.ambient,
        }
    }

    pub fn legend_style(&self) -> LegendStyle {
        LegendStyle {
            background: self.view.background,
            text_color: self.colorbar.text_color,
            title: self.colorbar.title.clone(),
        }
    }

    pub fn interaction_settings(&self) -> InteractionSettings {
        let i = &self.interaction;
        InteractionSettings {
            drag_degrees_per_pixel: i.drag_degrees_per_pixel,
            resume_delay: Duration::from_millis(i.resume_delay_ms),
            frame_interval: Duration::from_millis(i.frame_interval_ms.max(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GlobeError;

    #[test]
    fn test_default_values() {
        let cfg = Config::default();
        assert_eq!(cfg.colors.palette, "Turbo256");
        assert_eq!(cfg.colors.nan_color, Rgb::new(0x80, 0x80, 0x80));
        assert_eq!(cfg.colors.vmin, None);
        assert_eq!(cfg.view.zoom, 1.0);
        assert!(!cfg.view.autorotate);
        assert_eq!(cfg.view.rotation_speed, 1.0);
        assert!(cfg.overlays.show_coastlines);
        assert!(!cfg.overlays.show_countries);
        assert_eq!(cfg.overlays.country_color, Rgb::new(0x33, 0x33, 0x33));
        assert_eq!(cfg.overlays.coastline_width, 0.4);
        assert_eq!(cfg.overlays.scatter_color, Rgb::new(0xff, 0, 0));
        assert_eq!(cfg.overlays.trajectory_color, Rgb::new(0xff, 0, 0xff));
        assert!(cfg.interaction.enable_hover);
        assert_eq!(cfg.interaction.resume_delay_ms, 1000);
        assert_eq!(cfg.interaction.frame_interval_ms, 16);
        assert!(!cfg.lighting.enabled);
        assert_eq!(cfg.lighting.azimuth, -45.0);
        assert_eq!(cfg.lighting.ambient, 0.3);
        assert!(cfg.colorbar.show);
        assert_eq!(cfg.colorbar.title, "Value");
        assert_eq!(cfg.colorbar.width, 40);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "
view:
  zoom: 2.5
  background: '#112233'
colors:
  palette: Viridis256
  vmin: -5
lighting:
  enabled: true
";
        let cfg = Config::from_yaml(yaml).unwrap();
        assert_eq!(cfg.view.zoom, 2.5);
        assert_eq!(cfg.view.rotation_speed, 1.0);
        assert_eq!(cfg.view.background, Rgb::new(0x11, 0x22, 0x33));
        assert_eq!(cfg.colors.vmin, Some(-5.0));
        assert_eq!(cfg.colors.vmax, None);
        assert!(cfg.light().enabled);
        assert_eq!(cfg.light().intensity, 0.8);
        assert_eq!(cfg.legend_style().background, Rgb::new(0x11, 0x22, 0x33));
    }

    #[test]
    fn test_bad_values_are_errors() {
        let err = Config::from_yaml("view: [1, 2]").unwrap_err();
        assert!(matches!(err, GlobeError::Yaml(_)));
        assert!(Config::from_yaml("colors:\n  nan_color: gray").is_err());
        let cfg = Config::from_yaml("colors:\n  palette: nope").unwrap();
        let err = cfg.color_scale(&[0.0]).unwrap_err();
        assert!(matches!(err, GlobeError::UnknownPalette(_)));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = std::env::temp_dir().join("globe3d-config-missing");
        let missing = dir.join("nope.yaml");
        let err = Config::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, GlobeError::Io(_)));
    }

    #[test]
    fn test_load_explicit_file() {
        let name = format!("globe3d-config-{}.yaml", std::process::id());
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, "colorbar:\n  title: Temperature\n").unwrap();
        let cfg = Config::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(cfg.colorbar.title, "Temperature");
        assert!(cfg.colorbar.show);
    }

    #[test]
    fn test_derived_settings() {
        let cfg = Config::default();
        let style = cfg.overlay_style();
        assert_eq!(style, OverlayStyle::default());
        let settings = cfg.interaction_settings();
        assert_eq!(settings, InteractionSettings::default());
        let camera = cfg.camera();
        assert_eq!(camera.zoom(), 1.0);
    }
}
