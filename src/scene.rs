use crate::coastline::coarse_coastlines;
use crate::color::Rgb;
use crate::error::Result;
use crate::mesh::GridDataset;
use crate::overlay::bar::Bar;
use crate::overlay::line::Line;
use crate::overlay::polyline::PolylineSet;
use crate::overlay::scatter::ScatterPoint;
use crate::overlay::trajectory::{Trajectory, Waypoint};
use log::{info, warn};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// On-disk scene layout. Grid arrays are flat and row-major; `null` marks a
/// missing value in `values` and a break in the polyline arrays.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SceneFile {
    lons: Vec<f64>,
    lats: Vec<f64>,
    values: Vec<Option<f64>>,
    n_lat: usize,
    n_lon: usize,
    coast_lons: Vec<Option<f64>>,
    coast_lats: Vec<Option<f64>>,
    country_lons: Vec<Option<f64>>,
    country_lats: Vec<Option<f64>>,
    #[serde(alias = "scatter_data")]
    scatter: Vec<ScatterPoint>,
    #[serde(alias = "line_data")]
    lines: Vec<Line>,
    #[serde(alias = "bar_data")]
    bars: Vec<Bar>,
    #[serde(alias = "trajectory_data")]
    trajectories: Vec<Trajectory>,
}

/// Everything drawn on the globe
#[derive(Clone, Debug)]
pub struct Scene {
    pub grid: GridDataset,
    pub coastlines: PolylineSet,
    pub countries: PolylineSet,
    pub scatter: Vec<ScatterPoint>,
    pub lines: Vec<Line>,
    pub bars: Vec<Bar>,
    pub trajectories: Vec<Trajectory>,
}

impl Scene {
    pub fn from_json(json: &str) -> Result<Self> {
        let file: SceneFile = serde_json::from_str(json)?;
        if file.coast_lons.len() != file.coast_lats.len() {
            warn!(
                "coastline arrays differ in length ({} lons, {} lats), truncating",
                file.coast_lons.len(),
                file.coast_lats.len()
            );
        }
        let values = file
            .values
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();
        Ok(Scene {
            grid: GridDataset::new(file.lons, file.lats, values, file.n_lat, file.n_lon)?,
            coastlines: PolylineSet::from_parallel(&file.coast_lons, &file.coast_lats),
            countries: PolylineSet::from_parallel(&file.country_lons, &file.country_lats),
            scatter: file.scatter,
            lines: file.lines,
            bars: file.bars,
            trajectories: file.trajectories,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let scene = Self::from_json(&json)?;
        if scene.grid.is_empty() {
            warn!("scene {} has no grid values", path.display());
        }
        info!(
            "loaded scene {}: {}x{} grid, {} scatter, {} lines, {} bars, {} trajectories",
            path.display(),
            scene.grid.n_lat(),
            scene.grid.n_lon(),
            scene.scatter.len(),
            scene.lines.len(),
            scene.bars.len(),
            scene.trajectories.len()
        );
        Ok(scene)
    }

    /// Substitutes the bundled outlines when the scene has no coastlines
    pub fn with_default_coastlines(mut self) -> Self {
        if self.coastlines.is_empty() {
            self.coastlines = coarse_coastlines();
        }
        self
    }

    /// A temperature-like field with cities, flight routes, bars and orbits.
    pub fn demo() -> Self {
        let lon_axis = linspace(-180.0, 180.0, 120);
        let lat_axis = linspace(-90.0, 90.0, 60);
        let grid = GridDataset::from_axes(&lon_axis, &lat_axis, |lon, lat| {
            let band = 30.0 - 50.0 * lat.abs() / 90.0;
            let wave = (3.0 * lon.to_radians()).sin() * (2.0 * lat.to_radians()).cos();
            band + 10.0 * wave
        });

        let scatter = DEMO_CITIES
            .iter()
            .map(|&(label, lon, lat, size, color)| ScatterPoint {
                size: Some(size),
                color: color.parse().ok(),
                ..ScatterPoint::new(lon, lat).with_label(label)
            })
            .collect();

        let lines = vec![
            Line {
                label: Some("London - New York".into()),
                ..Line::new(vec![[0.0, 51.5], [-74.0, 40.7]])
            },
            Line {
                color: Some(Rgb::new(0xff, 0xc8, 0x57)),
                label: Some("Tokyo - Los Angeles".into()),
                ..Line::new(vec![[139.69, 35.68], [-118.25, 34.05]])
            },
            Line {
                color: Some(Rgb::new(0x6e, 0xe7, 0xb7)),
                ..Line::new(vec![[28.05, -26.2], [3.38, 6.52], [-3.7, 40.42]])
            },
        ];

        let bars = DEMO_CITIES
            .iter()
            .filter(|city| city.3 >= 10.0)
            .map(|&(label, lon, lat, size, _)| {
                let height = size * 25.0;
                let color = if lat > 0.0 {
                    Rgb::new(0xff, 0x6b, 0x6b)
                } else {
                    Rgb::new(0x4e, 0xcd, 0xc4)
                };
                Bar {
                    color: Some(color),
                    label: Some(format!("{label}: {height:.0}")),
                    ..Bar::new(lon + 2.0, lat + 2.0, height)
                }
            })
            .collect();

        let mut trajectories = orbit_ring(51.6, 0.0, 140.0, 120, Rgb::new(0x00, 0xff, 0xff));
        let polar = orbit_ring(98.0, 60.0, 225.0, 120, Rgb::new(0xff, 0xdd, 0x00));
        trajectories.extend(polar);
        trajectories.push(Trajectory {
            show_points: Some(true),
            label: Some("Flight LHR-JFK".into()),
            ..Trajectory::new(vec![
                Waypoint::new(0.0, 51.5, 0.0),
                Waypoint::new(-30.0, 55.0, 150.0),
                Waypoint::new(-55.0, 48.0, 150.0),
                Waypoint::new(-74.0, 40.7, 0.0),
            ])
        });

        Scene {
            grid,
            coastlines: PolylineSet::default(),
            countries: PolylineSet::default(),
            scatter,
            lines,
            bars,
            trajectories,
        }
    }
}

/// `n` evenly spaced samples from `start` to `end` inclusive
fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => (0..n)
            .map(|i| start + (end - start) * i as f64 / (n - 1) as f64)
            .collect(),
    }
}

/// A circular orbit as trajectories, split where longitude wraps so no leg
/// crosses the antimeridian the long way round.
fn orbit_ring(
    inclination: f64,
    raan: f64,
    altitude: f64,
    samples: usize,
    color: Rgb,
) -> Vec<Trajectory> {
    let (sin_inc, cos_inc) = inclination.to_radians().sin_cos();
    let (sin_raan, cos_raan) = raan.to_radians().sin_cos();
    let waypoints: Vec<Waypoint> = (0..samples)
        .map(|i| {
            let t = std::f64::consts::TAU * i as f64 / samples as f64;
            let (x, y, z) = (t.cos(), t.sin() * cos_inc, t.sin() * sin_inc);
            let (x2, y2) = (x * cos_raan - y * sin_raan, x * sin_raan + y * cos_raan);
            let lat = z.clamp(-1.0, 1.0).asin().to_degrees();
            Waypoint::new(y2.atan2(x2).to_degrees(), lat, altitude)
        })
        .collect();
    let Some(&first) = waypoints.first() else {
        return Vec::new();
    };

    let mut segments: Vec<Vec<Waypoint>> = vec![Vec::new()];
    for (i, w) in waypoints.iter().enumerate() {
        if i > 0 && (w.lon - waypoints[i - 1].lon).abs() > 180.0 {
            segments.push(Vec::new());
        }
        if let Some(current) = segments.last_mut() {
            current.push(*w);
        }
    }
    if let Some(last) = segments.last_mut() {
        // Close the ring unless that would jump the antimeridian.
        let end_lon = last.last().map_or(first.lon, |w| w.lon);
        if (end_lon - first.lon).abs() <= 180.0 {
            last.push(first);
        }
    }

    segments
        .into_iter()
        .filter(|s| s.len() >= 2)
        .map(|coords| Trajectory {
            color: Some(color),
            ..Trajectory::new(coords)
        })
        .collect()
}

/// (label, lon, lat, marker size, color)
const DEMO_CITIES: &[(&str, f64, f64, f64, &str)] = &[
    ("London", 0.0, 51.5, 8.0, "#ff3049"),
    ("Paris", 2.35, 48.86, 7.0, "#ff7a18"),
    ("Berlin", 13.41, 52.52, 21.0, "#ffc857"),
    ("Rome", 12.50, 41.90, 7.0, "#6ee7b7"),
    ("Madrid", -3.70, 40.42, 7.0, "#60a5fa"),
    ("Athens", 23.73, 37.98, 7.0, "#38bdf8"),
    ("New York", -74.0, 40.7, 8.0, "#ff3049"),
    ("Los Angeles", -118.25, 34.05, 7.0, "#f97316"),
    ("Chicago", -87.63, 41.88, 7.0, "#facc15"),
    ("Toronto", -79.38, 43.65, 17.0, "#4ade80"),
    ("Mexico City", -99.13, 19.43, 7.0, "#22d3ee"),
    ("Sao Paulo", -46.63, -23.55, 8.0, "#f472b6"),
    ("Buenos Aires", -58.38, -34.60, 7.0, "#fb7185"),
    ("Santiago", -70.67, -33.45, 7.0, "#a78bfa"),
    ("Cairo", 31.23, 30.04, 11.0, "#fde047"),
    ("Lagos", 3.38, 6.52, 22.0, "#4ade80"),
    ("Johannesburg", 28.05, -26.20, 7.0, "#60a5fa"),
    ("Jerusalem", 35.21, 31.77, 6.0, "#fbbf24"),
    ("Dubai", 55.27, 25.20, 7.0, "#38bdf8"),
    ("Tokyo", 139.69, 35.68, 33.0, "#f43f5e"),
    ("Beijing", 116.40, 39.90, 8.0, "#fb7185"),
    ("Shanghai", 121.47, 31.23, 7.0, "#f97316"),
    ("Delhi", 77.21, 28.61, 22.0, "#fde047"),
    ("Singapore", 103.85, 1.29, 7.0, "#22d3ee"),
    ("Mumbai", 72.88, 19.08, 7.0, "#4ade80"),
    ("Bangkok", 100.50, 13.75, 7.0, "#60a5fa"),
    ("Seoul", 126.98, 37.57, 7.0, "#a78bfa"),
    ("Sydney", 151.21, -33.87, 7.0, "#38bdf8"),
    ("Melbourne", 144.96, -37.81, 6.0, "#60a5fa"),
    ("Auckland", 174.76, -36.85, 6.0, "#22d3ee"),
];
