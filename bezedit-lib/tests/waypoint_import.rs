//! End-to-end import of an authored waypoint route, from the legacy absolute
//! form down to a loaded editing session.

use bezedit_lib::{document, CurveDocument, EditSession, LegacyWaypoint, Waypoint};
use kurbo::Point;

/// The head of a real authored route (a closed-track road).
const ROAD_JSON: &str = r#"[
    {"x": 579.0476, "y": 1150.3175, "lx": 629.02985, "ly": 1151.6504, "rx": 519.5238, "ry": 1148.7302},
    {"x": 279.04758, "y": 1148.7303, "lx": 341.39172, "ly": 1148.693, "rx": 243.35782, "ry": 1148.7517},
    {"x": 204.44446, "y": 1085.238, "lx": 223.99875, "ly": 1136.5992, "rx": 184.56102, "ry": 1033.0123},
    {"x": 83.80948, "y": 764.60315, "lx": 102.22422, "ly": 809.6809, "rx": 63.007175, "ry": 713.68085},
    {"x": 85.39679, "y": 661.4286, "lx": 67.15446, "ly": 700.4593, "rx": 106.256424, "ry": 616.798},
    {"x": 205.7708, "y": 403.15494, "lx": 181.638, "ly": 446.5251, "rx": 311.6265, "ry": 233.78586}
]"#;

fn road_waypoints() -> Vec<Waypoint> {
    let legacy: Vec<LegacyWaypoint> = serde_json::from_str(ROAD_JSON).unwrap();
    legacy.into_iter().map(Waypoint::from).collect()
}

#[test]
fn route_flattens_to_whole_segments() {
    let waypoints = road_waypoints();
    let points = document::from_waypoints(&waypoints).unwrap();
    // n waypoints make n - 1 segments: 4 + 3(n - 2) points
    assert_eq!(points.len(), 4 + 3 * (waypoints.len() - 2));
    assert_eq!(points[0], Point::new(579.0476, 1150.3175));
    // the first segment's trailing handle is the second waypoint's left handle
    assert_eq!(points[2], Point::new(341.39172, 1148.693));
}

#[test]
fn route_loads_into_a_session() {
    let points = document::from_waypoints(&road_waypoints()).unwrap();
    let doc = CurveDocument::from_points(points.iter().copied(), Some(Point::new(720., 1600.)))
        .unwrap();

    let mut session = EditSession::new();
    session.load_document(&doc).unwrap();
    assert_eq!(session.points().segment_count(), road_waypoints().len() - 1);
    assert_eq!(
        session.points().positions().collect::<Vec<_>>(),
        points
    );

    // every interior join has a mirrored handle pair
    let pts = session.points().as_slice();
    for anchor_idx in (3..pts.len() - 1).step_by(3) {
        assert_eq!(pts[anchor_idx - 1].opposite, Some(pts[anchor_idx + 1].id));
        assert_eq!(pts[anchor_idx + 1].opposite, Some(pts[anchor_idx - 1].id));
    }
}

#[test]
fn route_round_trips_through_the_waypoint_format() {
    let points = document::from_waypoints(&road_waypoints()).unwrap();
    let back = document::to_waypoints(&points).unwrap();
    let again = document::from_waypoints(&back).unwrap();
    for (a, b) in points.iter().zip(&again) {
        assert!((a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9);
    }
}

#[test]
fn route_document_serializes_with_wire_names() {
    let points = document::from_waypoints(&road_waypoints()).unwrap();
    let doc = CurveDocument::from_points(points, Some(Point::new(720., 1600.))).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&doc.to_json().unwrap()).unwrap();
    assert_eq!(json["type"], "cubicBezierCurve");
    assert_eq!(json["canvasSize"]["y"], 1600.0);
    assert!(json["controlPoints"].is_array());
}
