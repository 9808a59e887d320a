use std::sync::Arc;

use civic_shared::{Coordinate, LocationConfig};

use crate::services::location::nearby::{filter_nearby, Located};
use crate::services::location::resolver::LocationResolver;

use super::mocks::MockGeolocation;

#[derive(Debug, Clone, PartialEq)]
struct Report {
    id: u32,
    position: Option<Coordinate>,
}

impl Located for Report {
    fn location(&self) -> Option<Coordinate> {
        self.position
    }
}

fn report(id: u32, latitude: f64, longitude: f64) -> Report {
    Report {
        id,
        position: Some(Coordinate::new(latitude, longitude)),
    }
}

fn center() -> Coordinate {
    Coordinate::new(13.0418, 80.2341)
}

#[test]
fn test_filter_nearby_sorts_by_distance() {
    let reports = vec![
        report(1, 13.0827, 80.2707),  // Chennai Central, ~6 km
        report(2, 13.0418, 80.2341),  // same spot
        report(3, 12.9716, 77.5946),  // Bengaluru, ~290 km
        report(4, 13.0500, 80.2400),  // ~1 km
    ];

    let nearby = filter_nearby(center(), reports, 50.0);
    let ids: Vec<u32> = nearby.iter().map(|n| n.item.id).collect();

    assert_eq!(ids, vec![2, 4, 1]);
    assert_eq!(nearby[0].distance_km, 0.0);
    assert!(nearby[2].distance_km > 5.0 && nearby[2].distance_km < 7.0);
}

#[test]
fn test_filter_nearby_skips_missing_and_invalid_positions() {
    let reports = vec![
        Report { id: 1, position: None },
        report(2, f64::NAN, 80.2341),
        report(3, 95.0, 80.2341),
        report(4, 13.0418, 181.0),
        report(5, 13.0420, 80.2345),
    ];

    let nearby = filter_nearby(center(), reports, 50.0);
    assert_eq!(nearby.len(), 1);
    assert_eq!(nearby[0].item.id, 5);
}

#[test]
fn test_filter_nearby_by_reference() {
    let reports = vec![report(1, 13.0500, 80.2400)];
    let nearby = filter_nearby(center(), &reports, 0.5);
    assert!(nearby.is_empty());

    let nearby = filter_nearby(center(), &reports, 2.0);
    assert_eq!(nearby[0].item.id, 1);
    assert_eq!(nearby[0].distance_label(), "1.1 km");
}

#[test]
fn test_resolver_nearby_uses_configured_radius() {
    let resolver = LocationResolver::new(Arc::new(MockGeolocation::new()), LocationConfig::default());
    let points = vec![
        Coordinate::new(13.0827, 80.2707),
        Coordinate::new(12.9716, 77.5946),
    ];

    let nearby = resolver.nearby(center(), points);
    assert_eq!(nearby.len(), 1);
}
