/// Angle (radians) below which two points are treated as coincident.
const COINCIDENT_ANGLE: f64 = 0.001;

/// Dot product of two 3-dimensional vectors
pub fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Adds `b * k` to `a`
pub fn add_scaled(a: &[f64; 3], b: &[f64; 3], k: f64) -> [f64; 3] {
    [a[0] + b[0] * k, a[1] + b[1] * k, a[2] + b[2] * k]
}

/// Scales a vector
pub fn scale(v: &[f64; 3], k: f64) -> [f64; 3] {
    [v[0] * k, v[1] * k, v[2] * k]
}

/// Cartesian point for `(lon, lat)` in degrees at the given radius.
///
/// Longitude is negated so that increasing longitude turns eastward on screen.
pub fn sphere_point(lon: f64, lat: f64, radius: f64) -> [f64; 3] {
    let lat_rad = lat.to_radians();
    let lon_rad = -lon.to_radians();
    let (sin_lat, cos_lat) = lat_rad.sin_cos();
    let (sin_lon, cos_lon) = lon_rad.sin_cos();
    [
        radius * cos_lat * cos_lon,
        radius * cos_lat * sin_lon,
        radius * sin_lat,
    ]
}

/// Plain (non-negated) unit vector for `(lon, lat)`, used for slerp.
fn unit_vector(lon: f64, lat: f64) -> [f64; 3] {
    let (sin_lat, cos_lat) = lat.to_radians().sin_cos();
    let (sin_lon, cos_lon) = lon.to_radians().sin_cos();
    [cos_lat * cos_lon, cos_lat * sin_lon, sin_lat]
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Samples the shorter great-circle arc between two points.
///
/// Returns `segments + 1` `(lon, lat)` pairs including both endpoints. Points
/// closer than [`COINCIDENT_ANGLE`] fall back to linear interpolation.
pub fn great_circle(
    lon1: f64,
    lat1: f64,
    lon2: f64,
    lat2: f64,
    segments: usize,
) -> Vec<(f64, f64)> {
    if segments == 0 {
        return vec![(lon1, lat1)];
    }

    let p1 = unit_vector(lon1, lat1);
    let p2 = unit_vector(lon2, lat2);
    let angle = dot(&p1, &p2).clamp(-1.0, 1.0).acos();

    (0..=segments)
        .map(|i| {
            let f = i as f64 / segments as f64;
            if angle < COINCIDENT_ANGLE {
                return (lerp(lon1, lon2, f), lerp(lat1, lat2, f));
            }
            let sin_angle = angle.sin();
            let a = ((1.0 - f) * angle).sin() / sin_angle;
            let b = (f * angle).sin() / sin_angle;
            let p = add_scaled(&scale(&p1, a), &p2, b);
            let lat = p[2].clamp(-1.0, 1.0).asin().to_degrees();
            let lon = p[1].atan2(p[0]).to_degrees();
            (lon, lat)
        })
        .collect()
}
