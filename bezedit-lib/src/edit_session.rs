//! The editing state of a curve.

use kurbo::Point;

use crate::bezier;
use crate::document::{CurveDocument, DocumentError};
use crate::drag::DragSession;
use crate::point::EntityId;
use crate::point_list::{CurvePoints, MirrorPolicy};

/// Where the default first segment goes when a session starts empty.
const INITIAL_SEGMENT: [Point; 4] = [
    Point::new(0., 0.),
    Point::new(50., 0.),
    Point::new(-50., 50.),
    Point::new(0., 50.),
];

/// A unique identifier for a session.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct SessionId(usize);

impl SessionId {
    pub(crate) fn next() -> SessionId {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static NEXT_ID: AtomicUsize = AtomicUsize::new(0);
        SessionId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// The single-owner editing state of one curve: the control point graph, the
/// canvas metadata, and the drag gesture in progress, if any.
#[derive(Debug, Clone)]
pub struct EditSession {
    pub id: SessionId,
    points: CurvePoints,
    canvas_size: Option<Point>,
    drag: Option<DragSession>,
}

impl EditSession {
    /// A new session holding the default first segment.
    pub fn new() -> Self {
        EditSession::with_policy(MirrorPolicy::default())
    }

    pub fn with_policy(mirror: MirrorPolicy) -> Self {
        let [p0, p1, p2, p3] = INITIAL_SEGMENT;
        let mut points = CurvePoints::new(mirror);
        points.init_segment(p0, p1, p2, p3);
        EditSession {
            id: SessionId::next(),
            points,
            canvas_size: None,
            drag: None,
        }
    }

    pub fn points(&self) -> &CurvePoints {
        &self.points
    }

    pub fn canvas_size(&self) -> Option<Point> {
        self.canvas_size
    }

    pub fn set_canvas_size(&mut self, size: Point) {
        self.canvas_size = Some(size);
    }

    /// Append a segment continuing from the trailing anchor, with the same
    /// handle layout as the default segment.
    pub fn append_segment(&mut self) -> [EntityId; 3] {
        let last = self
            .points
            .positions()
            .last()
            .expect("session always holds at least one segment");
        self.points.append_segment(
            Point::new(last.x + 50., last.y),
            Point::new(last.x - 50., last.y + 50.),
            Point::new(last.x, last.y + 50.),
        )
    }

    /// Start a drag gesture on `point` at `cursor`.
    ///
    /// A gesture already in progress is discarded first; that only happens
    /// when an up event went missing, so it is worth a log line.
    pub fn begin_drag(&mut self, point: EntityId, cursor: Point) {
        if self.drag.is_some() {
            log::warn!("drag began while another drag was in progress");
        }
        self.drag = DragSession::begin(&self.points, point, cursor);
    }

    /// Move the dragged point (and its followers) to track `cursor`.
    ///
    /// Without a preceding `begin_drag` this is a no-op.
    pub fn update_drag(&mut self, cursor: Point) {
        match self.drag.as_ref() {
            Some(session) => session.update(&mut self.points, cursor),
            None => log::warn!("drag update without an active drag"),
        }
    }

    /// Finish the gesture, releasing the captured offsets.
    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// Abandon the gesture. Offsets are released exactly as on a normal end;
    /// positions stay wherever the last update put them.
    pub fn cancel_drag(&mut self) {
        self.end_drag();
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Snapshot the curve as a document.
    ///
    /// This is the permissive editing path: a session should never hold a
    /// partial curve, but if it somehow does we log and export it as-is
    /// rather than losing the designer's work.
    pub fn to_document(&self) -> CurveDocument {
        let positions: Vec<Point> = self.points.positions().collect();
        match CurveDocument::from_points(positions.iter().copied(), self.canvas_size) {
            Ok(doc) => doc,
            Err(err) => {
                log::warn!("exporting degenerate curve: {}", err);
                CurveDocument {
                    typ: crate::document::CUBIC_BEZIER_CURVE.into(),
                    canvas_size: self.canvas_size.map(Into::into),
                    control_points: positions.into_iter().map(Into::into).collect(),
                }
            }
        }
    }

    /// Replace the graph with the contents of `doc`.
    ///
    /// Strict: the document is validated in full before anything is touched,
    /// so a rejected load leaves the current curve exactly as it was.
    pub fn load_document(&mut self, doc: &CurveDocument) -> Result<(), DocumentError> {
        let groups = doc.point_groups()?;

        let mut points = CurvePoints::new(self.points.mirror_policy());
        let [p0, p1, p2, p3] = groups.first;
        points.init_segment(p0, p1, p2, p3);
        for [h1, h2, end] in &groups.rest {
            points.append_segment(*h1, *h2, *end);
        }

        self.points = points;
        self.canvas_size = doc.canvas_size.map(Into::into);
        self.drag = None;
        Ok(())
    }

    /// Sample every segment for drawing, `steps` points per segment.
    pub fn render_samples(&self, steps: usize) -> impl Iterator<Item = Point> + '_ {
        self.points
            .iter_segments()
            .flat_map(move |seg| bezier::sample_segment(seg, steps))
    }
}

impl Default for EditSession {
    fn default() -> Self {
        EditSession::new()
    }
}
