use crate::camera::Camera;
use crate::color::Rgb;
use crate::graphics::{Canvas, Path};

/// Stroke settings for one polyline layer
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolylineStyle {
    pub enabled: bool,
    pub color: Rgb,
    pub width: f64,
}

/// A flat list of `(lon, lat)` vertices where `None` breaks the line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolylineSet {
    points: Vec<Option<(f64, f64)>>,
}

impl PolylineSet {
    pub fn new(points: Vec<Option<(f64, f64)>>) -> Self {
        PolylineSet { points }
    }

    /// Zips parallel longitude/latitude arrays. A missing entry in either
    /// array becomes a break; the longer array is truncated.
    pub fn from_parallel(lons: &[Option<f64>], lats: &[Option<f64>]) -> Self {
        let points = lons
            .iter()
            .zip(lats)
            .map(|(lon, lat)| lon.zip(*lat))
            .collect();
        PolylineSet { points }
    }

    /// Joins closed rings, each followed by a break
    pub fn from_rings(rings: &[&[(f64, f64)]]) -> Self {
        let mut points = Vec::new();
        for ring in rings {
            points.extend(ring.iter().copied().map(Some));
            if let Some(&first) = ring.first() {
                points.push(Some(first));
            }
            points.push(None);
        }
        PolylineSet { points }
    }

    pub fn points(&self) -> &[Option<(f64, f64)>] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Projects the set into screen subpaths. Breaks and far-side points end
/// the current subpath.
pub fn project_polylines(set: &PolylineSet, camera: &Camera) -> Path {
    let mut path = Path::new();
    let mut drawing = false;
    for point in set.points() {
        let Some((lon, lat)) = *point else {
            drawing = false;
            continue;
        };
        let (screen, visible) = camera.project_to_screen(lon, lat);
        if !visible {
            drawing = false;
        } else if drawing {
            path.line_to(screen.x, screen.y);
        } else {
            path.move_to(screen.x, screen.y);
            drawing = true;
        }
    }
    path
}

pub fn draw_polylines(
    canvas: &mut Canvas,
    camera: &Camera,
    set: &PolylineSet,
    style: &PolylineStyle,
) {
    if !style.enabled || set.is_empty() {
        return;
    }
    let path = project_polylines(set, camera);
    canvas.stroke_path(&path, style.width, style.color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraState;

    fn camera() -> Camera {
        Camera::new(&CameraState::default(), 100, 100)
    }

    #[test]
    fn test_sentinel_splits_subpaths() {
        let set = PolylineSet::new(vec![
            Some((-100.0, 0.0)),
            Some((-90.0, 0.0)),
            None,
            Some((-90.0, 20.0)),
            Some((-80.0, 20.0)),
        ]);
        let path = project_polylines(&set, &camera());
        assert_eq!(path.subpaths().len(), 2);
        assert_eq!(path.subpaths()[0].len(), 2);
    }

    #[test]
    fn test_far_side_point_breaks_line() {
        let set = PolylineSet::new(vec![
            Some((-100.0, 0.0)),
            Some((90.0, 0.0)),
            Some((-80.0, 0.0)),
            Some((-70.0, 0.0)),
        ]);
        let path = project_polylines(&set, &camera());
        let lens: Vec<_> = path.subpaths().iter().map(Vec::len).collect();
        assert_eq!(lens, vec![1, 2]);
    }

    #[test]
    fn test_from_parallel_treats_missing_as_break() {
        let lons = [Some(1.0), None, Some(3.0)];
        let lats = [Some(2.0), Some(0.0), None];
        let set = PolylineSet::from_parallel(&lons, &lats);
        assert_eq!(set.points(), &[Some((1.0, 2.0)), None, None]);
    }

    #[test]
    fn test_from_rings_closes_each_ring() {
        let ring: &[(f64, f64)] = &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)];
        let set = PolylineSet::from_rings(&[ring]);
        assert_eq!(set.points().len(), 5);
        assert_eq!(set.points()[3], Some((0.0, 0.0)));
        assert_eq!(set.points()[4], None);
    }

    #[test]
    fn test_disabled_layer_draws_nothing() {
        let set = PolylineSet::new(vec![Some((-100.0, 0.0)), Some((-80.0, 0.0))]);
        let mut canvas = Canvas::new(100, 100);
        canvas.clear(Rgb::BLACK);
        let style = PolylineStyle {
            enabled: false,
            color: Rgb::WHITE,
            width: 1.0,
        };
        draw_polylines(&mut canvas, &camera(), &set, &style);
        assert_eq!(canvas.pixel(50, 50), Some(Rgb::BLACK));
        let style = PolylineStyle {
            enabled: true,
            ..style
        };
        draw_polylines(&mut canvas, &camera(), &set, &style);
        assert_eq!(canvas.pixel(50, 50), Some(Rgb::WHITE));
    }
}
