use brn_core::{Circle, Ray};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Which detection's ray is kept when a frame holds several circles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaySelection {
    /// Last circle in detector order
    #[default]
    Last,
    /// First circle in detector order, i.e. the strongest center
    First,
    /// Largest radius
    Largest,
    /// Closest to the image center
    NearestCenter,
}

impl RaySelection {
    /// Pick one ray among circles that were back-projected successfully
    pub fn select(self, candidates: &[(Circle, Ray)], image_center: Point2<f64>) -> Option<Ray> {
        let picked = match self {
            RaySelection::Last => candidates.last(),
            RaySelection::First => candidates.first(),
            RaySelection::Largest => candidates
                .iter()
                .max_by(|a, b| a.0.radius.total_cmp(&b.0.radius)),
            RaySelection::NearestCenter => candidates.iter().min_by(|a, b| {
                let da = (a.0.center - image_center).norm_squared();
                let db = (b.0.center - image_center).norm_squared();
                da.total_cmp(&db)
            }),
        };
        picked.map(|(_, ray)| *ray)
    }
}
