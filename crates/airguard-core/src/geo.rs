//! Spatial math for path risk checks and rerouting.
//!
//! Pure functions over WGS84 coordinates. Degenerate inputs (empty paths,
//! polygons with fewer than 3 vertices) yield safe defaults instead of
//! errors; these are expected transient states during interactive editing.

use crate::models::Coordinate;

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculate distance between two points in meters using the Haversine
/// formula (great-circle distance on a sphere).
pub fn haversine_distance_m(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let dphi = (b.lat - a.lat).to_radians();
    let dlambda = (b.lng - a.lng).to_radians();
    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Cumulative length of a path across consecutive segments.
/// 0 for paths with fewer than 2 points.
pub fn path_length_m(path: &[Coordinate]) -> f64 {
    if path.len() < 2 {
        return 0.0;
    }
    path.windows(2)
        .map(|pair| haversine_distance_m(pair[0], pair[1]))
        .sum()
}

// ==== Local ENU scaling ====
// Latitude-aware meters/degrees conversion (WGS84 series approximation).

/// Meters per degree of latitude at a given latitude.
pub fn meters_per_deg_lat(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_132.954 - 559.822 * (2.0 * lat_rad).cos() + 1.175 * (4.0 * lat_rad).cos()
        - 0.0023 * (6.0 * lat_rad).cos()
}

/// Meters per degree of longitude at a given latitude.
pub fn meters_per_deg_lon(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_412.84 * lat_rad.cos() - 93.5 * (3.0 * lat_rad).cos() + 0.118 * (5.0 * lat_rad).cos()
}

/// Point-in-polygon via ray casting.
///
/// The boundary ring is treated as closed (last vertex connects back to the
/// first). Points exactly on the boundary count as OUTSIDE; the segment
/// intersection test below separately treats boundary touches as crossings.
pub fn point_in_polygon(point: Coordinate, polygon: &[Coordinate]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let vi = polygon[i];
        let vj = polygon[j];
        if ((vi.lat > point.lat) != (vj.lat > point.lat))
            && (point.lng < (vj.lng - vi.lng) * (point.lat - vi.lat) / (vj.lat - vi.lat) + vi.lng)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Segment/segment intersection on locally-projected coordinates (meters).
/// The epsilon absorbs floating-point error from projection and arithmetic;
/// touching counts as intersecting.
fn segments_intersect_2d(a1: (f64, f64), a2: (f64, f64), b1: (f64, f64), b2: (f64, f64)) -> bool {
    const EPS_M: f64 = 1e-6;

    fn orient(p: (f64, f64), q: (f64, f64), r: (f64, f64)) -> f64 {
        (q.0 - p.0) * (r.1 - p.1) - (q.1 - p.1) * (r.0 - p.0)
    }

    fn within(a: f64, b: f64, value: f64) -> bool {
        value >= a.min(b) - EPS_M && value <= a.max(b) + EPS_M
    }

    fn on_segment(p: (f64, f64), q: (f64, f64), r: (f64, f64)) -> bool {
        within(p.0, q.0, r.0) && within(p.1, q.1, r.1)
    }

    let o1 = orient(a1, a2, b1);
    let o2 = orient(a1, a2, b2);
    let o3 = orient(b1, b2, a1);
    let o4 = orient(b1, b2, a2);

    if o1.abs() <= EPS_M && on_segment(a1, a2, b1) {
        return true;
    }
    if o2.abs() <= EPS_M && on_segment(a1, a2, b2) {
        return true;
    }
    if o3.abs() <= EPS_M && on_segment(b1, b2, a1) {
        return true;
    }
    if o4.abs() <= EPS_M && on_segment(b1, b2, a2) {
        return true;
    }

    let a_crosses = (o1 > EPS_M && o2 < -EPS_M) || (o1 < -EPS_M && o2 > EPS_M);
    let b_crosses = (o3 > EPS_M && o4 < -EPS_M) || (o3 < -EPS_M && o4 > EPS_M);
    a_crosses && b_crosses
}

/// True if the segment a-b crosses the polygon boundary or either endpoint
/// lies inside the polygon.
pub fn segment_intersects_polygon(a: Coordinate, b: Coordinate, polygon: &[Coordinate]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    if point_in_polygon(a, polygon) || point_in_polygon(b, polygon) {
        return true;
    }

    // Project everything to local meters around the segment start.
    let ref_lat = (a.lat + b.lat) / 2.0;
    let m_lat = meters_per_deg_lat(ref_lat);
    let m_lon = meters_per_deg_lon(ref_lat).max(1.0);
    let to_xy = |p: Coordinate| ((p.lng - a.lng) * m_lon, (p.lat - a.lat) * m_lat);

    let sa = to_xy(a);
    let sb = to_xy(b);
    for i in 0..n {
        let e1 = to_xy(polygon[i]);
        let e2 = to_xy(polygon[(i + 1) % n]);
        if segments_intersect_2d(sa, sb, e1, e2) {
            return true;
        }
    }
    false
}

/// True if any consecutive segment of the path intersects the polygon.
/// A single-point path reduces to the point-in-polygon test.
pub fn path_intersects_polygon(path: &[Coordinate], polygon: &[Coordinate]) -> bool {
    match path {
        [] => false,
        [only] => point_in_polygon(*only, polygon),
        _ => path
            .windows(2)
            .any(|pair| segment_intersects_polygon(pair[0], pair[1], polygon)),
    }
}

/// Minimum distance in meters from a point to a line segment.
pub fn distance_to_segment_m(point: Coordinate, seg_start: Coordinate, seg_end: Coordinate) -> f64 {
    let nearest = nearest_point_on_segment(point, seg_start, seg_end);
    haversine_distance_m(point, nearest)
}

/// Closest point on the segment to the given point, computed in a local
/// equirectangular projection around the segment start.
pub fn nearest_point_on_segment(
    point: Coordinate,
    seg_start: Coordinate,
    seg_end: Coordinate,
) -> Coordinate {
    let ref_lat = seg_start.lat;
    let m_lat = meters_per_deg_lat(ref_lat);
    let m_lon = meters_per_deg_lon(ref_lat).max(1.0);

    let px = (point.lng - seg_start.lng) * m_lon;
    let py = (point.lat - seg_start.lat) * m_lat;
    let sx = (seg_end.lng - seg_start.lng) * m_lon;
    let sy = (seg_end.lat - seg_start.lat) * m_lat;

    let seg_len_sq = sx * sx + sy * sy;
    if seg_len_sq < 1e-4 {
        // Segment is essentially a point
        return seg_start;
    }

    let t = ((px * sx + py * sy) / seg_len_sq).clamp(0.0, 1.0);
    Coordinate {
        lat: seg_start.lat + t * (seg_end.lat - seg_start.lat),
        lng: seg_start.lng + t * (seg_end.lng - seg_start.lng),
    }
}

/// Minimum distance in meters from a point to the polygon's boundary ring.
/// This measures to the boundary only; it does not test containment.
/// Degenerate polygons (<3 vertices) yield 0.
pub fn distance_to_polygon_boundary_m(point: Coordinate, polygon: &[Coordinate]) -> f64 {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }
    let mut min = f64::INFINITY;
    for i in 0..n {
        let d = distance_to_segment_m(point, polygon[i], polygon[(i + 1) % n]);
        if d < min {
            min = d;
        }
    }
    min
}

/// Closest point on the polygon's boundary ring to the given point.
/// Degenerate polygons yield the query point unchanged.
pub fn nearest_point_on_polygon_boundary(point: Coordinate, polygon: &[Coordinate]) -> Coordinate {
    let n = polygon.len();
    if n < 3 {
        return point;
    }
    let mut best = polygon[0];
    let mut best_dist = f64::INFINITY;
    for i in 0..n {
        let candidate = nearest_point_on_segment(point, polygon[i], polygon[(i + 1) % n]);
        let d = haversine_distance_m(point, candidate);
        if d < best_dist {
            best_dist = d;
            best = candidate;
        }
    }
    best
}

/// Vertex mean of the polygon. Adequate for city-scale zones; an empty
/// polygon yields the origin.
pub fn polygon_centroid(polygon: &[Coordinate]) -> Coordinate {
    if polygon.is_empty() {
        return Coordinate { lat: 0.0, lng: 0.0 };
    }
    let mut sum_lat = 0.0;
    let mut sum_lng = 0.0;
    for vertex in polygon {
        sum_lat += vertex.lat;
        sum_lng += vertex.lng;
    }
    let count = polygon.len() as f64;
    Coordinate {
        lat: sum_lat / count,
        lng: sum_lng / count,
    }
}

/// Planar midpoint of two coordinates.
pub fn midpoint(a: Coordinate, b: Coordinate) -> Coordinate {
    Coordinate {
        lat: (a.lat + b.lat) / 2.0,
        lng: (a.lng + b.lng) / 2.0,
    }
}

/// Initial great-circle bearing from one point to another, in degrees
/// normalized to [0, 360). 0 = north, 90 = east.
pub fn bearing_deg(from: Coordinate, to: Coordinate) -> f64 {
    let phi1 = from.lat.to_radians();
    let phi2 = to.lat.to_radians();
    let delta_lambda = (to.lng - from.lng).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    x.atan2(y).to_degrees().rem_euclid(360.0)
}

/// Destination point given origin, distance and bearing (great-circle
/// forward solution).
pub fn destination(origin: Coordinate, distance_m: f64, bearing_deg: f64) -> Coordinate {
    if distance_m.abs() <= f64::EPSILON {
        return origin;
    }

    let lat1 = origin.lat.to_radians();
    let lng1 = origin.lng.to_radians();
    let bearing_rad = bearing_deg.to_radians();
    let angular_distance = distance_m / EARTH_RADIUS_M;

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_ad = angular_distance.sin();
    let cos_ad = angular_distance.cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let mut lng2 = lng1 + y.atan2(x);
    lng2 =
        (lng2 + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI) - std::f64::consts::PI;

    Coordinate {
        lat: lat2.to_degrees(),
        lng: lng2.to_degrees(),
    }
}

/// Point at a cumulative distance along the path, interpolating within the
/// containing segment. Distances past the end clamp to the final point;
/// negative distances clamp to the start. `None` only for an empty path.
pub fn point_at_distance_along(path: &[Coordinate], distance_m: f64) -> Option<Coordinate> {
    let first = *path.first()?;
    if path.len() == 1 || distance_m <= 0.0 {
        return Some(first);
    }

    let mut remaining = distance_m;
    for pair in path.windows(2) {
        let seg = haversine_distance_m(pair[0], pair[1]);
        if seg > 0.0 && remaining <= seg {
            let t = remaining / seg;
            return Some(Coordinate {
                lat: pair[0].lat + t * (pair[1].lat - pair[0].lat),
                lng: pair[0].lng + t * (pair[1].lng - pair[0].lng),
            });
        }
        remaining -= seg;
    }

    path.last().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng)
    }

    /// Unit square in degrees, open ring.
    fn square() -> Vec<Coordinate> {
        vec![
            coord(0.0, 0.0),
            coord(0.0, 1.0),
            coord(1.0, 1.0),
            coord(1.0, 0.0),
        ]
    }

    #[test]
    fn haversine_known_distance() {
        // ~111km between these points (1 degree latitude)
        let d = haversine_distance_m(coord(0.0, 0.0), coord(1.0, 0.0));
        assert!((d - 111_194.0).abs() < 100.0);
    }

    #[test]
    fn haversine_same_point_is_zero() {
        let p = coord(13.1986, 77.7066);
        assert!(haversine_distance_m(p, p) < 0.001);
    }

    #[test]
    fn path_length_degenerate_paths() {
        assert_eq!(path_length_m(&[]), 0.0);
        assert_eq!(path_length_m(&[coord(1.0, 1.0)]), 0.0);
    }

    #[test]
    fn path_length_sums_segments() {
        let path = [coord(0.0, 0.0), coord(1.0, 0.0), coord(2.0, 0.0)];
        let total = path_length_m(&path);
        assert!((total - 2.0 * 111_194.0).abs() < 200.0);
    }

    #[test]
    fn point_in_polygon_basic() {
        let poly = square();
        assert!(point_in_polygon(coord(0.5, 0.5), &poly));
        assert!(!point_in_polygon(coord(1.5, 0.5), &poly));
        assert!(!point_in_polygon(coord(-0.1, 0.5), &poly));
    }

    #[test]
    fn point_in_polygon_degenerate() {
        assert!(!point_in_polygon(coord(0.0, 0.0), &[]));
        assert!(!point_in_polygon(
            coord(0.0, 0.0),
            &[coord(0.0, 0.0), coord(1.0, 1.0)]
        ));
    }

    #[test]
    fn segment_crossing_polygon_detected() {
        let poly = square();
        // Both endpoints outside, segment passes straight through.
        assert!(segment_intersects_polygon(
            coord(0.5, -0.5),
            coord(0.5, 1.5),
            &poly
        ));
        // Far away segment.
        assert!(!segment_intersects_polygon(
            coord(3.0, 3.0),
            coord(4.0, 4.0),
            &poly
        ));
    }

    #[test]
    fn segment_with_endpoint_inside_intersects() {
        let poly = square();
        assert!(segment_intersects_polygon(
            coord(0.5, 0.5),
            coord(5.0, 5.0),
            &poly
        ));
    }

    #[test]
    fn single_point_path_reduces_to_containment() {
        let poly = square();
        assert!(path_intersects_polygon(&[coord(0.5, 0.5)], &poly));
        assert!(!path_intersects_polygon(&[coord(2.0, 2.0)], &poly));
        assert!(!path_intersects_polygon(&[], &poly));
    }

    #[test]
    fn boundary_distance_from_outside_point() {
        let poly = square();
        // 1 degree north of the top edge.
        let d = distance_to_polygon_boundary_m(coord(2.0, 0.5), &poly);
        assert!((d - 111_194.0).abs() < 300.0);
    }

    #[test]
    fn boundary_distance_degenerate_polygon_is_zero() {
        assert_eq!(
            distance_to_polygon_boundary_m(coord(1.0, 1.0), &[coord(0.0, 0.0)]),
            0.0
        );
    }

    #[test]
    fn nearest_boundary_point_lands_on_closest_edge() {
        let poly = square();
        // Inside, near the top edge: nearest boundary point sits on lat 1.
        let nearest = nearest_point_on_polygon_boundary(coord(0.9, 0.5), &poly);
        assert!((nearest.lat - 1.0).abs() < 0.01);
        assert!((nearest.lng - 0.5).abs() < 0.01);
    }

    #[test]
    fn centroid_of_square() {
        let c = polygon_centroid(&square());
        assert!((c.lat - 0.5).abs() < 1e-9);
        assert!((c.lng - 0.5).abs() < 1e-9);
    }

    #[test]
    fn bearing_cardinal_directions() {
        let origin = coord(0.0, 0.0);
        assert!((bearing_deg(origin, coord(1.0, 0.0)) - 0.0).abs() < 0.1);
        assert!((bearing_deg(origin, coord(0.0, 1.0)) - 90.0).abs() < 0.1);
        assert!((bearing_deg(origin, coord(-1.0, 0.0)) - 180.0).abs() < 0.1);
        assert!((bearing_deg(origin, coord(0.0, -1.0)) - 270.0).abs() < 0.1);
    }

    #[test]
    fn destination_roundtrip() {
        let origin = coord(13.0, 77.6);
        let dest = destination(origin, 1000.0, 90.0);
        assert!((haversine_distance_m(origin, dest) - 1000.0).abs() < 1.0);
        assert!((bearing_deg(origin, dest) - 90.0).abs() < 0.5);
    }

    #[test]
    fn point_along_path_boundaries() {
        let path = [coord(0.0, 0.0), coord(1.0, 0.0), coord(1.0, 1.0)];
        let total = path_length_m(&path);

        let start = point_at_distance_along(&path, 0.0).unwrap();
        assert_eq!(start, path[0]);

        let end = point_at_distance_along(&path, total).unwrap();
        assert!(haversine_distance_m(end, path[2]) < 1.0);

        let past = point_at_distance_along(&path, total + 5_000.0).unwrap();
        assert_eq!(past, path[2]);
    }

    #[test]
    fn point_along_path_interpolates() {
        let path = [coord(0.0, 0.0), coord(1.0, 0.0)];
        let half = path_length_m(&path) / 2.0;
        let mid = point_at_distance_along(&path, half).unwrap();
        assert!((mid.lat - 0.5).abs() < 0.001);
        assert!(mid.lng.abs() < 1e-9);
    }

    #[test]
    fn point_along_empty_path_is_none() {
        assert!(point_at_distance_along(&[], 10.0).is_none());
    }
}
