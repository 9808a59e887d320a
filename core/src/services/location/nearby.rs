//! Great-circle radius filtering

use civic_shared::Coordinate;

use crate::domain::{LocationReading, NearbyItem};

/// Anything that may carry a position
pub trait Located {
    /// `None` when the item has no position recorded
    fn location(&self) -> Option<Coordinate>;
}

impl Located for Coordinate {
    fn location(&self) -> Option<Coordinate> {
        Some(*self)
    }
}

impl Located for LocationReading {
    fn location(&self) -> Option<Coordinate> {
        Some(self.coordinate())
    }
}

impl<T: Located> Located for &T {
    fn location(&self) -> Option<Coordinate> {
        (**self).location()
    }
}

/// Items within `radius_km` of `center`, nearest first
///
/// Items without a position, or with coordinates outside the valid ranges,
/// are skipped.
pub fn filter_nearby<T, I>(center: Coordinate, items: I, radius_km: f64) -> Vec<NearbyItem<T>>
where
    T: Located,
    I: IntoIterator<Item = T>,
{
    let mut nearby: Vec<NearbyItem<T>> = items
        .into_iter()
        .filter_map(|item| {
            let coordinate = item.location().filter(Coordinate::is_valid)?;
            let distance_km = center.distance_km_to(&coordinate);
            (distance_km <= radius_km).then_some(NearbyItem { item, distance_km })
        })
        .collect();

    nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    nearby
}
