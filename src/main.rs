mod animation;
mod camera;
mod coastline;
mod color;
mod config;
mod error;
mod font;
mod graphics;
mod interaction;
mod legend;
mod lighting;
mod math;
mod mesh;
mod overlay;
mod picking;
mod scene;
mod state;
mod terminal;
mod vertex;
mod widget;

use crate::config::Config;
use crate::error::Result;
use crate::scene::Scene;
use crate::state::AppState;
use crate::terminal::{Input, Terminal};
use crate::widget::GlobeWidget;
use clap::Parser;
use log::{error, info, LevelFilter};
use std::fs::File;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// How long to block for input when nothing is animating
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Interactive gridded-data globe in the terminal
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON scene file; a built-in demo scene is shown when omitted
    #[arg(long)]
    scene: Option<PathBuf>,

    /// YAML config file [default: globe3d.yaml when present]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Color palette name, e.g. Turbo256 or Viridis256
    #[arg(long)]
    palette: Option<String>,

    #[arg(long, allow_negative_numbers = true)]
    vmin: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    vmax: Option<f64>,

    /// Initial rotation in degrees
    #[arg(long, allow_negative_numbers = true)]
    rotation: Option<f64>,

    /// Initial tilt in degrees
    #[arg(long, allow_negative_numbers = true)]
    tilt: Option<f64>,

    #[arg(long)]
    zoom: Option<f64>,

    #[arg(long)]
    autorotate: bool,

    /// Enable directional lighting
    #[arg(long)]
    lighting: bool,

    #[arg(long)]
    no_colorbar: bool,

    /// Write log output here; logging is off otherwise unless RUST_LOG is set
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    /// Command line values win over the config file
    fn apply(&self, config: &mut Config) {
        if let Some(palette) = &self.palette {
            config.colors.palette = palette.clone();
        }
        if self.vmin.is_some() {
            config.colors.vmin = self.vmin;
        }
        if self.vmax.is_some() {
            config.colors.vmax = self.vmax;
        }
        if let Some(rotation) = self.rotation {
            config.view.rotation = rotation;
        }
        if let Some(tilt) = self.tilt {
            config.view.tilt = tilt;
        }
        if let Some(zoom) = self.zoom {
            config.view.zoom = zoom;
        }
        config.view.autorotate |= self.autorotate;
        config.lighting.enabled |= self.lighting;
        if self.no_colorbar {
            config.colorbar.show = false;
        }
    }
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
            if std::env::var_os("RUST_LOG").is_none() {
                builder.filter_level(LevelFilter::Info);
            }
        }
        // The terminal belongs to the renderer.
        None if std::env::var_os("RUST_LOG").is_none() => {
            builder.filter_level(LevelFilter::Off);
        }
        None => {}
    }
    builder.init();
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let mut config = Config::load(args.config.as_deref())?;
    args.apply(&mut config);

    let scene = match &args.scene {
        Some(path) => Scene::load(path)?,
        None => {
            info!("no scene given, showing the demo scene");
            Scene::demo()
        }
    };
    let scene = if config.overlays.show_coastlines {
        scene.with_default_coastlines()
    } else {
        scene
    };

    let mut state = AppState::new(config.camera(), config.light(), config.colorbar.show);
    let mut term = Terminal::new()?;
    let (width, height) = term.pixel_size();
    let mut widget = GlobeWidget::new(scene, &config, width, height, Instant::now())?;

    loop {
        if widget.is_dirty() {
            widget.paint(&state, Instant::now());
            term.present(widget.frame())?;
        }

        let timeout = widget.next_wakeup(&state, Instant::now()).unwrap_or(IDLE_POLL);
        if let Some(input) = term.poll(timeout)? {
            let now = Instant::now();
            match input {
                Input::Quit => break,
                Input::Pointer(event) => widget.pointer(&mut state, event, now),
                Input::Command(command) => widget.command(&mut state, command, now),
                Input::Resize { width, height } => widget.resize(width, height),
            }
        }
        widget.tick(&mut state, Instant::now());
    }

    widget.teardown();
    info!("exiting");
    Ok(())
}

/// Main function
fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_ref())?;
    let (name, version) = (env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    info!("{name} {version} starting");

    let result = run(&args);
    if let Err(e) = &result {
        error!("{e}");
    }
    result
}
