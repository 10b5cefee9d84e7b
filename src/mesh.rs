use crate::camera::Camera;
use crate::color::{ColorScale, Rgb};
use crate::error::{GlobeError, Result};
use crate::graphics::Canvas;
use crate::lighting::{apply_lighting, FrameLight};
use crate::vertex::ScreenPoint;

/// Stroke width applied around each quad so neighbouring cells leave no seams
pub const QUAD_STROKE_WIDTH: f64 = 1.1;

/// Regular latitude/longitude value grid, row-major by latitude then longitude.
#[derive(Clone, Debug, PartialEq)]
pub struct GridDataset {
    lons: Vec<f64>,
    lats: Vec<f64>,
    values: Vec<f64>,
    n_lat: usize,
    n_lon: usize,
}

impl GridDataset {
    /// Validates that all three arrays hold exactly `n_lat * n_lon` entries.
    pub fn new(
        lons: Vec<f64>,
        lats: Vec<f64>,
        values: Vec<f64>,
        n_lat: usize,
        n_lon: usize,
    ) -> Result<Self> {
        let expected = n_lat.checked_mul(n_lon);
        let lengths = [lons.len(), lats.len(), values.len()];
        let consistent = expected.is_some_and(|n| lengths.iter().all(|&l| l == n));
        if !consistent {
            return Err(GlobeError::InvalidGrid {
                n_lat,
                n_lon,
                expected: expected.unwrap_or(usize::MAX),
                lons: lons.len(),
                lats: lats.len(),
                values: values.len(),
            });
        }
        Ok(GridDataset {
            lons,
            lats,
            values,
            n_lat,
            n_lon,
        })
    }

    /// Builds the grid from separate longitude and latitude axes and a value
    /// function, in the same row-major layout `new` expects.
    pub fn from_axes(
        lon_axis: &[f64],
        lat_axis: &[f64],
        mut value: impl FnMut(f64, f64) -> f64,
    ) -> Self {
        let n = lon_axis.len() * lat_axis.len();
        let mut lons = Vec::with_capacity(n);
        let mut lats = Vec::with_capacity(n);
        let mut values = Vec::with_capacity(n);
        for &lat in lat_axis {
            for &lon in lon_axis {
                lons.push(lon);
                lats.push(lat);
                values.push(value(lon, lat));
            }
        }
        GridDataset {
            lons,
            lats,
            values,
            n_lat: lat_axis.len(),
            n_lon: lon_axis.len(),
        }
    }

    pub fn n_lat(&self) -> usize {
        self.n_lat
    }

    pub fn n_lon(&self) -> usize {
        self.n_lon
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Indices of the corners of cell `(i, j)` in drawing order
    fn cell(&self, i: usize, j: usize) -> [usize; 4] {
        let (top, bottom) = (i * self.n_lon + j, (i + 1) * self.n_lon + j);
        [top, top + 1, bottom + 1, bottom]
    }
}

/// One grid cell ready to paint
#[derive(Clone, Debug, PartialEq)]
pub struct Quad {
    pub points: [ScreenPoint; 4],
    pub depth: f64,
    pub value: f64,
    pub color: Rgb,
}

/// Projects every grid cell with at least one visible corner and returns the
/// quads sorted back to front.
pub fn build_quads(
    grid: &GridDataset,
    camera: &Camera,
    scale: &ColorScale,
    light: Option<&FrameLight>,
) -> Vec<Quad> {
    if grid.n_lat < 2 || grid.n_lon < 2 {
        return Vec::new();
    }

    let projected: Vec<_> = grid
        .lons
        .iter()
        .zip(&grid.lats)
        .map(|(&lon, &lat)| camera.project(lon, lat))
        .collect();

    let mut quads = Vec::with_capacity((grid.n_lat - 1) * (grid.n_lon - 1));
    for i in 0..grid.n_lat - 1 {
        for j in 0..grid.n_lon - 1 {
            let idx = grid.cell(i, j);
            if idx.iter().all(|&k| !projected[k].visible) {
                continue;
            }

            let mean = |data: &[f64]| idx.iter().map(|&k| data[k]).sum::<f64>() / 4.0;
            let value = mean(&grid.values);
            let depth = idx.iter().map(|&k| projected[k].depth).sum::<f64>() / 4.0;

            let mut color = scale.color_of(value);
            if let Some(light) = light {
                let factor = light.illuminate(mean(&grid.lons), mean(&grid.lats));
                color = apply_lighting(color, factor);
            }

            quads.push(Quad {
                points: idx.map(|k| camera.screen_of(&projected[k])),
                depth,
                value,
                color,
            });
        }
    }

    // Painter's algorithm: farthest first. sort_by is stable, so equal
    // depths keep grid order.
    quads.sort_by(|a, b| a.depth.total_cmp(&b.depth));
    quads
}

/// Fills and strokes each quad with its own color, in the given order.
pub fn draw_mesh(canvas: &mut Canvas, quads: &[Quad]) {
    for quad in quads {
        let outline = quad.points.map(|p| p.xy());
        canvas.fill_polygon(&outline, quad.color);
        canvas.stroke_polygon(&outline, QUAD_STROKE_WIDTH, quad.color);
    }
}
