/// Result of projecting a point through the camera, in normalized coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectedPoint {
    /// Horizontal coordinate, roughly in [-1, 1] at the unit radius
    pub x: f64,
    /// Vertical coordinate, up is positive
    pub y: f64,
    /// Signed depth, larger is nearer the viewer
    pub depth: f64,
    /// Whether the point lies on the near hemisphere
    pub visible: bool,
}

/// A projected point in canvas pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
    pub depth: f64,
}

impl ScreenPoint {
    pub fn xy(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}
