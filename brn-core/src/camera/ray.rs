use nalgebra::Vector3;

/// Direction from the optical center, in the camera frame
///
/// Not normalized unless produced by [`Ray::normalized`]. The origin is
/// implicitly the camera center.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Ray {
    direction: Vector3<f64>,
}

impl Ray {
    pub fn new(direction: Vector3<f64>) -> Self {
        Self { direction }
    }

    /// The zero ray, published before any detection succeeds
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn direction(&self) -> &Vector3<f64> {
        &self.direction
    }

    pub fn x(&self) -> f64 {
        self.direction.x
    }

    pub fn y(&self) -> f64 {
        self.direction.y
    }

    pub fn z(&self) -> f64 {
        self.direction.z
    }

    pub fn is_zero(&self) -> bool {
        self.direction == Vector3::zeros()
    }

    /// Unit-length copy; the zero ray stays zero
    pub fn normalized(&self) -> Self {
        match self.direction.try_normalize(f64::EPSILON) {
            Some(unit) => Self::new(unit),
            None => *self,
        }
    }
}

impl From<Vector3<f64>> for Ray {
    fn from(direction: Vector3<f64>) -> Self {
        Self::new(direction)
    }
}
