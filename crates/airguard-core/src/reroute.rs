//! Heuristic path correction around forbidden zones.
//!
//! Local repair with a bounded pass count, not an optimal planner: waypoints
//! caught inside a forbidden polygon are ejected past the nearest boundary
//! point, and segments that cut through a polygon get a single detour
//! waypoint pushed out beyond the zone's bounding radius. Non-convergence
//! after the final pass is not an error; callers re-score the result and may
//! invoke the pass again.

use crate::geo;
use crate::models::{Coordinate, Zone, ZoneSeverity};
use crate::zones::ZoneCatalog;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerouteConfig {
    /// Maximum combined ejection + detour passes
    pub max_passes: usize,
    /// Distance past the zone boundary an ejected waypoint is pushed, in km
    pub clearance_km: f64,
    /// Margin added to the bounding radius when placing a detour, in km
    pub detour_margin_km: f64,
    /// Consecutive waypoints closer than this on both axes are collapsed
    pub dedup_epsilon_deg: f64,
}

impl Default for RerouteConfig {
    fn default() -> Self {
        Self {
            max_passes: 4,
            clearance_km: 0.15,
            detour_margin_km: 0.2,
            dedup_epsilon_deg: 1e-5,
        }
    }
}

/// Correct a path away from non-advisory zones.
///
/// Returns a new path; the input is never mutated and its first waypoint is
/// always preserved. Paths with fewer than 2 points are returned unchanged.
pub fn reroute(path: &[Coordinate], catalog: &ZoneCatalog, config: &RerouteConfig) -> Vec<Coordinate> {
    if path.len() < 2 {
        return path.to_vec();
    }

    // Severity-sorted so the most severe containing zone corrects a waypoint
    // first; the sort is stable, so catalog order breaks ties.
    let mut forbidden: Vec<&Zone> = catalog.non_advisory().collect();
    forbidden.sort_by_key(|zone| match zone.severity {
        ZoneSeverity::Critical => 0,
        ZoneSeverity::Restricted => 1,
        ZoneSeverity::Advisory => 2,
    });

    let mut current = path.to_vec();
    for _pass in 0..config.max_passes {
        let mut changed = false;

        // Ejection pass: push contained waypoints out past the boundary.
        for point in current.iter_mut() {
            if let Some(&zone) = forbidden
                .iter()
                .find(|zone| geo::point_in_polygon(*point, &zone.boundary))
            {
                *point = eject_point(*point, zone, config.clearance_km);
                changed = true;
            }
        }

        // Detour pass: insert one waypoint for each segment that still cuts
        // through a zone, placed beyond the zone's bounding radius.
        let mut detoured = Vec::with_capacity(current.len() + 2);
        detoured.push(current[0]);
        for pair in current.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            if let Some(&zone) = forbidden
                .iter()
                .find(|zone| geo::segment_intersects_polygon(from, to, &zone.boundary))
            {
                detoured.push(detour_point(from, to, zone, config.detour_margin_km));
                changed = true;
            }
            detoured.push(to);
        }
        current = detoured;

        if !changed {
            break;
        }
    }

    dedup_consecutive(current, config.dedup_epsilon_deg)
}

/// Push a contained waypoint outward: nearest boundary point, then clearance
/// along the bearing from the zone centroid through that boundary point.
fn eject_point(point: Coordinate, zone: &Zone, clearance_km: f64) -> Coordinate {
    let nearest = geo::nearest_point_on_polygon_boundary(point, &zone.boundary);
    let centroid = geo::polygon_centroid(&zone.boundary);
    let outward = geo::bearing_deg(centroid, nearest);
    geo::destination(nearest, clearance_km * 1000.0, outward)
}

/// Detour waypoint for a segment crossing a zone: from the zone centroid,
/// along the bearing toward the segment midpoint, past the bounding radius.
fn detour_point(from: Coordinate, to: Coordinate, zone: &Zone, margin_km: f64) -> Coordinate {
    let mid = geo::midpoint(from, to);
    let centroid = geo::polygon_centroid(&zone.boundary);
    let outward = geo::bearing_deg(centroid, mid);
    let radius_km = bounding_radius_km(&zone.boundary) + margin_km;
    geo::destination(centroid, radius_km * 1000.0, outward)
}

/// Half the bounding-box diagonal in km.
fn bounding_radius_km(boundary: &[Coordinate]) -> f64 {
    let mut min_lat = f64::INFINITY;
    let mut max_lat = f64::NEG_INFINITY;
    let mut min_lng = f64::INFINITY;
    let mut max_lng = f64::NEG_INFINITY;
    for vertex in boundary {
        min_lat = min_lat.min(vertex.lat);
        max_lat = max_lat.max(vertex.lat);
        min_lng = min_lng.min(vertex.lng);
        max_lng = max_lng.max(vertex.lng);
    }
    if !min_lat.is_finite() || !min_lng.is_finite() {
        return 0.0;
    }
    let diagonal_m = geo::haversine_distance_m(
        Coordinate::new(min_lat, min_lng),
        Coordinate::new(max_lat, max_lng),
    );
    diagonal_m / 2.0 / 1000.0
}

/// Collapse consecutive near-duplicate waypoints. The first waypoint is
/// always preserved.
fn dedup_consecutive(path: Vec<Coordinate>, epsilon_deg: f64) -> Vec<Coordinate> {
    let mut cleaned: Vec<Coordinate> = Vec::with_capacity(path.len());
    for point in path {
        match cleaned.last() {
            Some(prev)
                if (point.lat - prev.lat).abs() <= epsilon_deg
                    && (point.lng - prev.lng).abs() <= epsilon_deg => {}
            _ => cleaned.push(point),
        }
    }
    cleaned
}
