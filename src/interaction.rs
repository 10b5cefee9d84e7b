use crate::animation::{RepeatingTask, Timeout};
use crate::camera::CameraState;
use log::debug;
use std::time::{Duration, Instant};

/// Zoom change per wheel notch
pub const ZOOM_STEP: f64 = 0.1;
/// Rotation per tick at `rotation_speed == 1`
pub const AUTOROTATE_STEP: f64 = 0.5;

/// Pointer input in canvas pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up,
    Leave,
    Wheel { delta_y: f64 },
}

/// What the host should do after an event
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Response {
    Nothing,
    Redraw,
    /// Resolve a tooltip at this canvas position
    Hover { x: f64, y: f64 },
    HideTooltip,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct DragStart {
    x: f64,
    y: f64,
    rotation: f64,
    tilt: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum DragState {
    Idle,
    Dragging(DragStart),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InteractionSettings {
    pub drag_degrees_per_pixel: f64,
    pub resume_delay: Duration,
    pub frame_interval: Duration,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        InteractionSettings {
            drag_degrees_per_pixel: 0.5,
            resume_delay: Duration::from_millis(1000),
            frame_interval: Duration::from_millis(16),
        }
    }
}

/// Pointer and autorotation state machine driving the camera.
pub struct Interaction {
    state: DragState,
    settings: InteractionSettings,
    autorotate: bool,
    rotation_speed: f64,
    hover_enabled: bool,
    spinner: RepeatingTask,
    resume: Timeout,
}

impl Interaction {
    pub fn new(settings: InteractionSettings, rotation_speed: f64, hover_enabled: bool) -> Self {
        Interaction {
            state: DragState::Idle,
            spinner: RepeatingTask::new(settings.frame_interval),
            settings,
            autorotate: false,
            rotation_speed,
            hover_enabled,
            resume: Timeout::new(),
        }
    }

    pub fn settings(&self) -> &InteractionSettings {
        &self.settings
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn autorotate(&self) -> bool {
        self.autorotate
    }

    pub fn is_spinning(&self) -> bool {
        self.spinner.is_running()
    }

    pub fn hover_enabled(&self) -> bool {
        self.hover_enabled
    }

    pub fn set_hover_enabled(&mut self, enabled: bool) {
        self.hover_enabled = enabled;
    }

    /// Turns autorotation on or off. Enabling starts spinning right away
    /// unless a drag is in progress.
    pub fn set_autorotate(&mut self, enabled: bool, now: Instant) {
        self.autorotate = enabled;
        if enabled {
            if !self.is_dragging() {
                self.spinner.start(now);
            }
        } else {
            self.spinner.cancel();
            self.resume.cancel();
        }
    }

    pub fn handle(
        &mut self,
        event: PointerEvent,
        camera: &mut CameraState,
        now: Instant,
    ) -> Response {
        match event {
            PointerEvent::Down { x, y } => {
                self.state = DragState::Dragging(DragStart {
                    x,
                    y,
                    rotation: camera.rotation(),
                    tilt: camera.tilt(),
                });
                self.spinner.cancel();
                self.resume.cancel();
                Response::Nothing
            }
            PointerEvent::Move { x, y } => match self.state {
                DragState::Dragging(start) => {
                    let k = self.settings.drag_degrees_per_pixel;
                    camera.set_rotation(start.rotation + (x - start.x) * k);
                    camera.set_tilt(start.tilt - (y - start.y) * k);
                    Response::Redraw
                }
                DragState::Idle if self.hover_enabled => Response::Hover { x, y },
                DragState::Idle => Response::Nothing,
            },
            PointerEvent::Up => {
                self.state = DragState::Idle;
                if self.autorotate {
                    self.resume.schedule(now, self.settings.resume_delay);
                }
                Response::Nothing
            }
            PointerEvent::Leave => {
                if self.is_dragging() && self.autorotate {
                    self.resume.schedule(now, self.settings.resume_delay);
                }
                self.state = DragState::Idle;
                Response::HideTooltip
            }
            PointerEvent::Wheel { delta_y } => {
                if delta_y == 0.0 || delta_y.is_nan() {
                    return Response::Nothing;
                }
                camera.zoom_by(-delta_y.signum() * ZOOM_STEP);
                Response::Redraw
            }
        }
    }

    /// Advances timers. Returns true when the camera moved.
    pub fn tick(&mut self, camera: &mut CameraState, now: Instant) -> bool {
        if self.resume.poll(now) && self.autorotate && !self.is_dragging() {
            debug!("resuming autorotation");
            self.spinner.start(now);
        }
        if !self.spinner.poll(now) {
            return false;
        }
        if !self.autorotate || self.is_dragging() {
            self.spinner.cancel();
            return false;
        }
        camera.rotate_by(self.rotation_speed * AUTOROTATE_STEP);
        true
    }

    /// Time until the next timer is due, if any
    pub fn next_wakeup(&self, now: Instant) -> Option<Duration> {
        let spin = self.spinner.time_until_due(now);
        let resume = self.resume.time_until_due(now);
        match (spin, resume) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Cancels every pending timer
    pub fn teardown(&mut self) {
        self.spinner.cancel();
        self.resume.cancel();
        self.state = DragState::Idle;
    }
}
