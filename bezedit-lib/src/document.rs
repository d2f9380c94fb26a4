//! The serializable curve document and the waypoint authoring format.

use kurbo::{Point, Vec2};
use thiserror::Error;

/// The document type discriminant; reserved for future curve-type
/// polymorphism.
pub const CUBIC_BEZIER_CURVE: &str = "cubicBezierCurve";

/// Structural problems in a curve document or waypoint list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("a curve requires at least 4 control points, found {count}")]
    TooFewPoints { count: usize },
    #[error("{count} control points do not form whole segments (expected 4 + 3k)")]
    PartialSegment { count: usize },
    #[error("a waypoint list requires at least 2 waypoints, found {count}")]
    TooFewWaypoints { count: usize },
}

/// A point as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocPoint {
    pub x: f64,
    pub y: f64,
}

/// A serializable snapshot of a piecewise cubic curve.
///
/// Only positions are persisted; point roles and the follower/master/opposite
/// relations are re-derived from sequence position on load. The legacy
/// single-segment variant omits `canvasSize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveDocument {
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_size: Option<DocPoint>,
    pub control_points: Vec<DocPoint>,
}

/// One anchor of the waypoint authoring format, with its two handles
/// expressed as offsets from the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    pub anchor: DocPoint,
    /// Offset of the handle facing the previous segment. Unused on the first
    /// waypoint.
    pub left_handle_offset: DocPoint,
    /// Offset of the handle facing the next segment. Unused on the last
    /// waypoint.
    pub right_handle_offset: DocPoint,
}

/// A waypoint as written by the legacy authoring pipeline: anchor plus two
/// handles in absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegacyWaypoint {
    pub x: f64,
    pub y: f64,
    pub lx: f64,
    pub ly: f64,
    pub rx: f64,
    pub ry: f64,
}

/// A valid control point list partitioned for graph construction: the first
/// four-point segment plus zero or more three-point extensions.
#[derive(Debug, Clone, PartialEq)]
pub struct PointGroups {
    pub first: [Point; 4],
    pub rest: Vec<[Point; 3]>,
}

/// Check the `4 + 3k` control point invariant.
pub fn validate_count(count: usize) -> Result<(), DocumentError> {
    if count < 4 {
        Err(DocumentError::TooFewPoints { count })
    } else if (count - 4) % 3 != 0 {
        Err(DocumentError::PartialSegment { count })
    } else {
        Ok(())
    }
}

impl DocPoint {
    pub fn new(x: f64, y: f64) -> DocPoint {
        DocPoint { x, y }
    }
}

impl From<Point> for DocPoint {
    fn from(src: Point) -> DocPoint {
        DocPoint { x: src.x, y: src.y }
    }
}

impl From<DocPoint> for Point {
    fn from(src: DocPoint) -> Point {
        Point::new(src.x, src.y)
    }
}

impl CurveDocument {
    /// Flatten an ordered point sequence into a document.
    ///
    /// Fails if the sequence cannot form a whole number of segments. Callers
    /// on the permissive editing path may log and construct the document by
    /// hand instead; a strict import always goes through [`point_groups`].
    ///
    /// [`point_groups`]: CurveDocument::point_groups
    pub fn from_points(
        points: impl IntoIterator<Item = Point>,
        canvas_size: Option<Point>,
    ) -> Result<CurveDocument, DocumentError> {
        let control_points: Vec<DocPoint> = points.into_iter().map(DocPoint::from).collect();
        validate_count(control_points.len())?;
        Ok(CurveDocument {
            typ: CUBIC_BEZIER_CURVE.into(),
            canvas_size: canvas_size.map(DocPoint::from),
            control_points,
        })
    }

    /// Partition the flattened point list into the first segment plus its
    /// three-point extensions, validating the whole document up front so an
    /// importer never mutates a graph for a document that turns out to be
    /// truncated.
    pub fn point_groups(&self) -> Result<PointGroups, DocumentError> {
        validate_count(self.control_points.len())?;
        let pts: Vec<Point> = self.control_points.iter().map(|p| Point::from(*p)).collect();
        let first = [pts[0], pts[1], pts[2], pts[3]];
        let rest = pts[4..]
            .chunks_exact(3)
            .map(|chunk| [chunk[0], chunk[1], chunk[2]])
            .collect();
        Ok(PointGroups { first, rest })
    }

    pub fn from_json(bytes: &[u8]) -> Result<CurveDocument, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Convert a flattened `[anchor, handle, handle, anchor, …]` sequence to the
/// per-anchor waypoint representation.
///
/// The first waypoint's left offset and the last waypoint's right offset have
/// no corresponding control point; they are written as zero.
pub fn to_waypoints(points: &[Point]) -> Result<Vec<Waypoint>, DocumentError> {
    validate_count(points.len())?;
    let anchor_count = (points.len() - 4) / 3 + 2;
    let mut waypoints = Vec::with_capacity(anchor_count);
    for i in 0..anchor_count {
        let idx = i * 3;
        let anchor = points[idx];
        let left = if i == 0 {
            Vec2::ZERO
        } else {
            points[idx - 1] - anchor
        };
        let right = if i == anchor_count - 1 {
            Vec2::ZERO
        } else {
            points[idx + 1] - anchor
        };
        waypoints.push(Waypoint {
            anchor: anchor.into(),
            left_handle_offset: DocPoint::new(left.x, left.y),
            right_handle_offset: DocPoint::new(right.x, right.y),
        });
    }
    Ok(waypoints)
}

/// Convert a waypoint list back to the flattened control point sequence.
///
/// This is the inverse of [`to_waypoints`] on well-formed input: the
/// surviving coordinates round-trip exactly up to floating point tolerance.
pub fn from_waypoints(waypoints: &[Waypoint]) -> Result<Vec<Point>, DocumentError> {
    if waypoints.len() < 2 {
        return Err(DocumentError::TooFewWaypoints {
            count: waypoints.len(),
        });
    }

    let mut points = Vec::with_capacity(4 + 3 * (waypoints.len() - 2) + 2);
    let first = &waypoints[0];
    points.push(first.anchor.into());
    points.push(offset_point(first.anchor, first.right_handle_offset));
    for wp in &waypoints[1..waypoints.len() - 1] {
        points.push(offset_point(wp.anchor, wp.left_handle_offset));
        points.push(wp.anchor.into());
        points.push(offset_point(wp.anchor, wp.right_handle_offset));
    }
    let last = &waypoints[waypoints.len() - 1];
    points.push(offset_point(last.anchor, last.left_handle_offset));
    points.push(last.anchor.into());
    Ok(points)
}

fn offset_point(anchor: DocPoint, offset: DocPoint) -> Point {
    Point::new(anchor.x + offset.x, anchor.y + offset.y)
}

impl From<LegacyWaypoint> for Waypoint {
    fn from(src: LegacyWaypoint) -> Waypoint {
        Waypoint {
            anchor: DocPoint::new(src.x, src.y),
            left_handle_offset: DocPoint::new(src.lx - src.x, src.ly - src.y),
            right_handle_offset: DocPoint::new(src.rx - src.x, src.ry - src.y),
        }
    }
}
