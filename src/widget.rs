use crate::camera::Camera;
use crate::color::{ColorScale, Rgb};
use crate::config::Config;
use crate::error::Result;
use crate::font::{self, FONT_HEIGHT};
use crate::graphics::Canvas;
use crate::interaction::{Interaction, PointerEvent, Response, ZOOM_STEP};
use crate::legend::{draw_legend, LegendStyle, Rect};
use crate::mesh::{build_quads, draw_mesh};
use crate::overlay::bar::draw_bars;
use crate::overlay::line::draw_lines;
use crate::overlay::polyline::draw_polylines;
use crate::overlay::scatter::draw_scatter;
use crate::overlay::trajectory::draw_trajectories;
use crate::overlay::OverlayStyle;
use crate::picking::{pick, PickContext};
use crate::scene::Scene;
use crate::state::AppState;
use log::debug;
use std::time::{Duration, Instant};

/// Degrees per arrow key press
const KEY_STEP: f64 = 5.0;
const TOOLTIP_OFFSET: isize = 8;
const TOOLTIP_PADDING: usize = 2;
const TOOLTIP_BACKGROUND: Rgb = Rgb::new(0x22, 0x22, 0x22);
const LINE_SPACING: isize = FONT_HEIGHT as isize + 2;

/// Discrete actions bound to keys
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    ToggleAutorotate,
    ToggleLighting,
    ToggleColorbar,
    ToggleHover,
    ToggleDebug,
    ResetView,
    /// Arrow keys, in steps
    Rotate(f64),
    Tilt(f64),
    Zoom(f64),
}

/// Interactive globe widget.
///
/// Owns the scene, the drawing surfaces and the interaction state machine.
/// The host feeds it input, calls [`GlobeWidget::tick`] on each wakeup and
/// presents [`GlobeWidget::frame`] after [`GlobeWidget::paint`].
pub struct GlobeWidget {
    scene: Scene,
    scale: ColorScale,
    style: OverlayStyle,
    legend_style: LegendStyle,
    legend_width: usize,
    background: Rgb,
    interaction: Interaction,
    /// Scene layers only, sampled by picking
    canvas: Canvas,
    /// `canvas` plus the debug overlay and tooltip
    frame: Canvas,
    dirty: bool,
    frames_since_last_update: usize,
    last_fps_calculation: Instant,
    fps: f64,
}

impl GlobeWidget {
    pub fn new(
        scene: Scene,
        config: &Config,
        width: usize,
        height: usize,
        now: Instant,
    ) -> Result<Self> {
        let scale = config.color_scale(scene.grid.values())?;
        debug!(
            "color scale {} over [{:.3}, {:.3}]",
            scale.palette.name, scale.vmin, scale.vmax
        );
        let mut interaction = Interaction::new(
            config.interaction_settings(),
            config.view.rotation_speed,
            config.interaction.enable_hover,
        );
        interaction.set_autorotate(config.view.autorotate, now);
        Ok(GlobeWidget {
            scene,
            scale,
            style: config.overlay_style(),
            legend_style: config.legend_style(),
            legend_width: config.colorbar.width,
            background: config.view.background,
            interaction,
            canvas: Canvas::new(width, height),
            frame: Canvas::new(width, height),
            dirty: true,
            frames_since_last_update: 0,
            last_fps_calculation: now,
            fps: 0.0,
        })
    }

    /// The last painted frame
    pub fn frame(&self) -> &Canvas {
        &self.frame
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        if width != self.canvas.width() || height != self.canvas.height() {
            self.canvas.resize(width, height);
            self.frame.resize(width, height);
            self.dirty = true;
        }
    }

    /// Width of the globe viewport, leaving room for the legend when shown
    fn globe_width(&self, data: &AppState) -> usize {
        let width = self.canvas.width();
        if data.show_colorbar && width > self.legend_width {
            width - self.legend_width
        } else {
            width
        }
    }

    fn camera(&self, data: &AppState) -> Camera {
        Camera::new(&data.camera, self.globe_width(data), self.canvas.height())
    }

    /// Handles pointer input
    pub fn pointer(&mut self, data: &mut AppState, event: PointerEvent, now: Instant) {
        if matches!(event, PointerEvent::Down { .. }) && data.tooltip.take().is_some() {
            self.dirty = true;
        }
        match self.interaction.handle(event, &mut data.camera, now) {
            Response::Nothing => {}
            Response::Redraw => self.dirty = true,
            Response::Hover { x, y } => {
                let camera = self.camera(data);
                let ctx = PickContext {
                    camera: &camera,
                    bars: &self.scene.bars,
                    scatter: &self.scene.scatter,
                    canvas: &self.canvas,
                    scale: &self.scale,
                    viewport_width: self.globe_width(data),
                };
                let tooltip = pick(&ctx, x, y);
                if tooltip != data.tooltip {
                    data.tooltip = tooltip;
                    self.dirty = true;
                }
            }
            Response::HideTooltip => {
                if data.tooltip.take().is_some() {
                    self.dirty = true;
                }
            }
        }
    }

    /// Handles keyboard commands
    pub fn command(&mut self, data: &mut AppState, command: Command, now: Instant) {
        match command {
            Command::ToggleAutorotate => {
                let enabled = !self.interaction.autorotate();
                self.interaction.set_autorotate(enabled, now);
            }
            Command::ToggleLighting => data.light.enabled = !data.light.enabled,
            Command::ToggleColorbar => data.show_colorbar = !data.show_colorbar,
            Command::ToggleHover => {
                let enabled = !self.interaction.hover_enabled();
                self.interaction.set_hover_enabled(enabled);
                if !enabled {
                    data.tooltip = None;
                }
            }
            Command::ToggleDebug => data.debug = !data.debug,
            Command::ResetView => data.reset_view(),
            Command::Rotate(steps) => data.camera.rotate_by(steps * KEY_STEP),
            Command::Tilt(steps) => data.camera.tilt_by(steps * KEY_STEP),
            Command::Zoom(steps) => data.camera.zoom_by(steps * ZOOM_STEP),
        }
        self.dirty = true;
    }

    /// Advances the autorotation timers
    pub fn tick(&mut self, data: &mut AppState, now: Instant) {
        if self.interaction.tick(&mut data.camera, now) || data.debug {
            self.dirty = true;
        }
    }

    /// Time until the widget next needs a tick. The debug overlay keeps
    /// repainting so the FPS counter stays live.
    pub fn next_wakeup(&self, data: &AppState, now: Instant) -> Option<Duration> {
        let wakeup = self.interaction.next_wakeup(now);
        if data.debug {
            let frame = self.interaction.settings().frame_interval;
            return Some(wakeup.map_or(frame, |w| w.min(frame)));
        }
        wakeup
    }

    pub fn teardown(&mut self) {
        self.interaction.teardown();
    }

    /// Renders every layer back to front
    pub fn paint(&mut self, data: &AppState, now: Instant) {
        // Update FPS calculation
        self.frames_since_last_update += 1;
        let duration = now.duration_since(self.last_fps_calculation);
        if duration.as_secs_f64() >= 1.0 {
            self.fps = self.frames_since_last_update as f64 / duration.as_secs_f64();
            self.frames_since_last_update = 0;
            self.last_fps_calculation = now;
        }

        let camera = self.camera(data);
        let globe_width = self.globe_width(data);
        let (scene, style) = (&self.scene, &self.style);
        let canvas = &mut self.canvas;
        canvas.clear(self.background);

        let light = data.light.frame_light();
        let quads = build_quads(&scene.grid, &camera, &self.scale, light.as_ref());
        draw_mesh(canvas, &quads);

        draw_polylines(canvas, &camera, &scene.coastlines, &style.coastlines);
        draw_polylines(canvas, &camera, &scene.countries, &style.countries);
        draw_lines(canvas, &camera, &scene.lines, style.line_color);
        draw_trajectories(
            canvas,
            &camera,
            &scene.trajectories,
            style.trajectory_color,
        );
        draw_bars(canvas, &camera, &scene.bars, style.bar_color);
        draw_scatter(canvas, &camera, &scene.scatter, style.scatter_color);

        if globe_width < canvas.width() {
            let rect = Rect {
                x: globe_width,
                y: 0,
                width: canvas.width() - globe_width,
                height: canvas.height(),
            };
            draw_legend(canvas, rect, &self.scale, &self.legend_style);
        }

        self.frame.clone_from(&self.canvas);
        if data.debug {
            self.paint_debug(data, quads.len());
        }
        if let Some(tooltip) = &data.tooltip {
            paint_tooltip(&mut self.frame, &tooltip.text, tooltip.x, tooltip.y);
        }
        self.dirty = false;
    }

    fn paint_debug(&mut self, data: &AppState, quad_count: usize) {
        let color = self.legend_style.text_color;
        let camera = &data.camera;
        let spin = if self.interaction.is_spinning() {
            "on"
        } else {
            "off"
        };
        let lines = [
            // Draw program name and version
            format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            format!("rot {:.1} tilt {:.1}", camera.rotation(), camera.tilt()),
            format!("zoom {:.2} quads {}", camera.zoom(), quad_count),
            format!("fps {:.1}", self.fps),
            format!("spin {spin}"),
        ];
        for (i, line) in lines.iter().enumerate() {
            let y = 2 + i as isize * LINE_SPACING;
            font::draw_text(&mut self.frame, 2, y, line, color);
        }
    }
}

/// Draws a boxed label above and right of the pointer, kept on screen
fn paint_tooltip(canvas: &mut Canvas, text: &str, x: f64, y: f64) {
    let box_width = font::text_width(text) + 2 * TOOLTIP_PADDING;
    let box_height = FONT_HEIGHT + 2 * TOOLTIP_PADDING;
    let max_x = canvas.width().saturating_sub(box_width) as isize;
    let max_y = canvas.height().saturating_sub(box_height) as isize;
    let bx = (x as isize + TOOLTIP_OFFSET).min(max_x).max(0);
    let by = (y as isize - TOOLTIP_OFFSET - box_height as isize).min(max_y).max(0);

    canvas.fill_rect(bx, by, box_width, box_height, TOOLTIP_BACKGROUND);
    let (x0, y0) = (bx as f64, by as f64);
    let (x1, y1) = (x0 + box_width as f64 - 1.0, y0 + box_height as f64 - 1.0);
    canvas.stroke_polygon(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1)], 1.0, Rgb::WHITE);
    let pad = TOOLTIP_PADDING as isize;
    font::draw_text(canvas, bx + pad, by + pad, text, Rgb::WHITE);
}
