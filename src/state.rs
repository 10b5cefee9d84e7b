use crate::camera::CameraState;
use crate::lighting::LightState;
use crate::picking::Tooltip;

/// Application state
#[derive(Clone, Debug, PartialEq)]
pub struct AppState {
    /// Current view orientation and zoom
    pub camera: CameraState,
    /// Directional light applied to the mesh
    pub light: LightState,
    /// Color bar legend visible
    pub show_colorbar: bool,
    /// Enable debug overlay
    pub debug: bool,
    /// Hover label currently shown
    pub tooltip: Option<Tooltip>,
    /// View restored by `reset_view`
    home: CameraState,
}

impl AppState {
    pub fn new(camera: CameraState, light: LightState, show_colorbar: bool) -> Self {
        AppState {
            camera,
            light,
            show_colorbar,
            debug: false,
            tooltip: None,
            home: camera,
        }
    }

    pub fn reset_view(&mut self) {
        self.camera = self.home;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_restores_initial_view() {
        let mut state = AppState::new(
            CameraState::new(30.0, 10.0, 2.0),
            LightState::default(),
            true,
        );
        state.camera.rotate_by(45.0);
        state.camera.zoom_by(1.0);
        state.reset_view();
        assert_eq!(state.camera, CameraState::new(30.0, 10.0, 2.0));
        assert!(state.tooltip.is_none());
        assert!(!state.debug);
    }
}
