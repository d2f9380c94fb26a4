//! Per-gesture drag state.

use kurbo::{Point, Vec2};

use crate::point::EntityId;
use crate::point_list::CurvePoints;

/// The points affected by an in-progress drag, with their offsets from the
/// cursor captured when the gesture began.
///
/// A session is created at drag start and dropped at drag end or cancel; the
/// offsets cannot outlive the gesture, so an abandoned drag never leaks stale
/// state into a later one.
#[derive(Debug, Clone)]
pub struct DragSession {
    dragged: EntityId,
    offsets: Vec<(EntityId, Vec2)>,
}

impl DragSession {
    /// Capture the offset from `cursor` of every follower of `dragged`,
    /// the dragged point included.
    ///
    /// Returns `None` if `dragged` is not a point of `points`.
    pub fn begin(points: &CurvePoints, dragged: EntityId, cursor: Point) -> Option<DragSession> {
        points.point(dragged)?;
        let offsets = points
            .followers_of(dragged)
            .filter_map(|id| points.point(id).map(|pt| (id, pt.point - cursor)))
            .collect();
        Some(DragSession { dragged, offsets })
    }

    pub fn dragged(&self) -> EntityId {
        self.dragged
    }

    /// Move every captured follower to its offset from `cursor`, then apply
    /// the mirroring rule to each one.
    ///
    /// The two passes are separate so that mirroring always sees the
    /// post-move position of the dragged point.
    pub fn update(&self, points: &mut CurvePoints, cursor: Point) {
        for (id, offset) in &self.offsets {
            points.set_position(*id, cursor + *offset);
        }
        for (id, _) in &self.offsets {
            points.mirror_adjust(*id);
        }
    }
}
