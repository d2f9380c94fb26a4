//! Raw storage for the control points that make up a piecewise cubic curve.

use std::collections::HashMap;

use kurbo::{CubicBez, Point};

use crate::point::{CurvePoint, EntityId};
use crate::util::{bail, normalize_or_zero};

/// How the mirroring rule determines the distance of the pushed-around handle
/// from its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorPolicy {
    /// Recompute the distance from the opposite handle's current position on
    /// every drag step. This matches the historical editor behaviour; the
    /// distance can drift over repeated drags.
    LiveLength,
    /// Use the distance captured when the handle pair was linked.
    FrozenLength,
}

impl Default for MirrorPolicy {
    fn default() -> Self {
        MirrorPolicy::LiveLength
    }
}

/// The control points of one piecewise cubic curve.
///
/// Points are stored in curve order, `[anchor, handle, handle, anchor,
/// handle, handle, anchor, …]`; segment `i` uses points `[3i .. 3i + 4]`.
/// All relations between points (followers, master, opposite) are id-based
/// lookups into this arena.
#[derive(Debug, Clone)]
pub struct CurvePoints {
    curve_id: EntityId,
    points: protected::RawPoints,
    followers: HashMap<EntityId, Vec<EntityId>>,
    mirror: MirrorPolicy,
    frozen_lengths: HashMap<EntityId, f64>,
}

/// A module to hide the implementation of the RawPoints type.
///
/// We want to be able to index into our vec of points using `EntityId`s; to
/// do this we need to keep a map from those ids to the actual indices in the
/// underlying vec. By hiding this implementation, we can ensure it is only
/// used via the declared API; in that API we can ensure we always keep our
/// map up to date.
mod protected {
    use super::{CurvePoint, EntityId};
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    #[derive(Debug, Clone)]
    pub(super) struct RawPoints {
        points: Vec<CurvePoint>,
        // these two use interior mutability so that we can rebuild the indices
        // in getters
        indices: RefCell<HashMap<EntityId, usize>>,
        needs_to_rebuild_indices: Cell<bool>,
    }

    impl RawPoints {
        pub(super) fn new() -> Self {
            RawPoints {
                points: Vec::new(),
                indices: RefCell::new(HashMap::new()),
                needs_to_rebuild_indices: Cell::new(false),
            }
        }

        pub(super) fn len(&self) -> usize {
            self.points.len()
        }

        pub(super) fn is_empty(&self) -> bool {
            self.len() == 0
        }

        pub(super) fn as_ref(&self) -> &[CurvePoint] {
            &self.points
        }

        pub(super) fn push(&mut self, point: CurvePoint) {
            self.set_needs_rebuild();
            self.points.push(point);
        }

        fn set_needs_rebuild(&self) {
            self.needs_to_rebuild_indices.set(true);
        }

        fn rebuild_if_needed(&self) {
            if self.needs_to_rebuild_indices.replace(false) {
                let mut indices = self.indices.borrow_mut();
                indices.clear();
                for (i, pt) in self.points.iter().enumerate() {
                    indices.insert(pt.id, i);
                }
            }
        }

        pub(super) fn index_for_point(&self, item: EntityId) -> Option<usize> {
            self.rebuild_if_needed();
            self.indices.borrow().get(&item).copied()
        }

        pub(super) fn get(&self, item: EntityId) -> Option<&CurvePoint> {
            let idx = self.index_for_point(item)?;
            self.points.get(idx)
        }

        /// Update a point using a closure.
        ///
        /// This cannot remove the point, or change its id; this means we don't
        /// need to invalidate our indices.
        pub(super) fn with_mut(&mut self, item: EntityId, f: impl FnOnce(&mut CurvePoint)) {
            self.rebuild_if_needed();
            if let Some(idx) = self.index_for_point(item) {
                if let Some(val) = self.points.get_mut(idx) {
                    f(val);
                    val.id = item;
                }
            }
        }
    }
}

impl CurvePoints {
    pub fn new(mirror: MirrorPolicy) -> Self {
        CurvePoints {
            curve_id: EntityId::next(),
            points: protected::RawPoints::new(),
            followers: HashMap::new(),
            mirror,
            frozen_lengths: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn id(&self) -> EntityId {
        self.curve_id
    }

    pub fn mirror_policy(&self) -> MirrorPolicy {
        self.mirror
    }

    pub fn as_slice(&self) -> &[CurvePoint] {
        self.points.as_ref()
    }

    pub fn point(&self, id: EntityId) -> Option<&CurvePoint> {
        self.points.get(id)
    }

    pub fn set_position(&mut self, id: EntityId, pos: Point) {
        self.points.with_mut(id, |pt| pt.point = pos);
    }

    /// Iterates point positions in curve order.
    pub fn positions(&self) -> impl Iterator<Item = Point> + '_ {
        self.points.as_ref().iter().map(|pt| pt.point)
    }

    /// The number of cubic segments in the curve.
    pub fn segment_count(&self) -> usize {
        self.len().saturating_sub(1) / 3
    }

    pub fn iter_segments(&self) -> Segments {
        Segments {
            points: self.points.as_ref(),
            idx: 0,
        }
    }

    /// Allocate a new anchor point with a follower set containing itself.
    pub fn create_anchor(&mut self, pos: Point) -> EntityId {
        let point = CurvePoint::anchor(self.curve_id, pos);
        self.followers.insert(point.id, vec![point.id]);
        self.points.push(point);
        point.id
    }

    /// Allocate a new handle point with a follower set containing itself.
    pub fn create_handle(&mut self, pos: Point) -> EntityId {
        let point = CurvePoint::handle(self.curve_id, pos);
        self.followers.insert(point.id, vec![point.id]);
        self.points.push(point);
        point.id
    }

    /// Register `follower` to translate along with `owner` when `owner` is
    /// dragged. When the two are distinct, `follower` records `owner` as its
    /// master anchor.
    ///
    /// Callers attach each follower at most once; re-attachment duplicates
    /// the entry.
    pub fn attach_follower(&mut self, owner: EntityId, follower: EntityId) {
        let list = bail!(
            self.followers.get_mut(&owner),
            "attach_follower: unknown owner {}",
            owner
        );
        list.push(follower);
        if follower != owner {
            self.points.with_mut(follower, |pt| pt.master = Some(owner));
        }
    }

    /// Link two handles as opposites mirrored through their shared anchor.
    ///
    /// Under [`MirrorPolicy::FrozenLength`] this also captures each handle's
    /// current distance from the shared anchor, which the mirroring rule will
    /// keep using for the rest of the session.
    pub fn link_opposite(&mut self, a: EntityId, b: EntityId) {
        self.points.with_mut(a, |pt| pt.opposite = Some(b));
        self.points.with_mut(b, |pt| pt.opposite = Some(a));
        if self.mirror == MirrorPolicy::FrozenLength {
            self.freeze_length(a, b);
            self.freeze_length(b, a);
        }
    }

    /// Record the distance the mirror rule preserves when `moved` is dragged:
    /// the distance from `moved`'s master anchor to its opposite handle.
    fn freeze_length(&mut self, moved: EntityId, opposite: EntityId) {
        let master = match self.points.get(moved).and_then(|pt| pt.master) {
            Some(m) => m,
            None => return,
        };
        let master_pos = bail!(self.points.get(master)).point;
        let opposite_pos = bail!(self.points.get(opposite)).point;
        self.frozen_lengths
            .insert(moved, (master_pos - opposite_pos).hypot());
    }

    /// The follower set of a point, the point itself first.
    pub fn followers_of(&self, id: EntityId) -> impl Iterator<Item = EntityId> + '_ {
        self.followers
            .get(&id)
            .map(|list| list.as_slice())
            .unwrap_or(&[])
            .iter()
            .copied()
    }

    /// Create the first segment of a curve.
    ///
    /// The leading handle follows the start anchor and the trailing handle
    /// follows the end anchor, so dragging either anchor carries its handle.
    pub fn init_segment(&mut self, p0: Point, p1: Point, p2: Point, p3: Point) -> [EntityId; 4] {
        assert!(self.is_empty(), "init_segment on a non-empty curve");
        let start = self.create_anchor(p0);
        let h1 = self.create_handle(p1);
        let h2 = self.create_handle(p2);
        let end = self.create_anchor(p3);
        self.attach_follower(start, h1);
        self.attach_follower(end, h2);
        debug_assert!(self.debug_validate(), "{:?}", self);
        [start, h1, h2, end]
    }

    /// Append one segment, continuing from the current trailing anchor.
    ///
    /// The new leading handle is attached to the shared anchor and linked as
    /// the opposite of the previous segment's trailing handle, so the join
    /// stays smooth under the mirroring rule.
    pub fn append_segment(&mut self, h1: Point, h2: Point, end: Point) -> [EntityId; 3] {
        assert!(
            self.len() >= 4 && (self.len() - 4) % 3 == 0,
            "append_segment on a partial curve ({} points)",
            self.len()
        );
        let slice = self.points.as_ref();
        let shared_anchor = slice[slice.len() - 1].id;
        let prev_handle = slice[slice.len() - 2].id;

        let h1 = self.create_handle(h1);
        self.attach_follower(shared_anchor, h1);

        let h2 = self.create_handle(h2);
        let end = self.create_anchor(end);
        self.attach_follower(end, h2);

        self.link_opposite(prev_handle, h1);
        debug_assert!(self.debug_validate(), "{:?}", self);
        [h1, h2, end]
    }

    /// Apply the mirroring rule for a point that has just moved.
    ///
    /// If `moved` has both a master anchor and an opposite handle, the
    /// opposite is repositioned on the ray from `moved` through the anchor,
    /// keeping the handles collinear so the join between the two segments
    /// stays tangent-continuous. A point without both relations is left
    /// alone.
    pub fn mirror_adjust(&mut self, moved: EntityId) {
        let moved_pt = match self.points.get(moved) {
            Some(pt) => *pt,
            None => return,
        };
        let (master, opposite) = match (moved_pt.master, moved_pt.opposite) {
            (Some(m), Some(o)) => (m, o),
            _ => return,
        };
        let master_pos = bail!(self.points.get(master)).point;
        let opposite_pos = bail!(self.points.get(opposite)).point;

        let mirror_len = match self.mirror {
            MirrorPolicy::FrozenLength => self
                .frozen_lengths
                .get(&moved)
                .copied()
                .unwrap_or_else(|| (master_pos - opposite_pos).hypot()),
            MirrorPolicy::LiveLength => (master_pos - opposite_pos).hypot(),
        };

        let direction = normalize_or_zero(master_pos - moved_pt.point);
        let new_pos = master_pos + direction * mirror_len;
        self.points.with_mut(opposite, |pt| pt.point = new_pos);
    }

    /// Check if our internal structure is consistent: a whole number of
    /// segments, anchors and handles alternating in curve order, and every
    /// point owned by this curve.
    fn debug_validate(&self) -> bool {
        if self.len() < 4 || (self.len() - 4) % 3 != 0 {
            return false;
        }
        let curve_id = self.curve_id;
        self.points.as_ref().iter().enumerate().all(|(i, pt)| {
            let role_ok = if i % 3 == 0 {
                pt.is_anchor()
            } else {
                pt.is_handle()
            };
            role_ok && pt.id.is_child_of(curve_id)
        })
    }
}

/// An iterator over the cubic segments of a curve.
pub struct Segments<'a> {
    points: &'a [CurvePoint],
    idx: usize,
}

impl Iterator for Segments<'_> {
    type Item = CubicBez;

    fn next(&mut self) -> Option<CubicBez> {
        let win = self.points.get(self.idx..self.idx + 4)?;
        self.idx += 3;
        Some(CubicBez::new(
            win[0].point,
            win[1].point,
            win[2].point,
            win[3].point,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_segment_curve(mirror: MirrorPolicy) -> (CurvePoints, [EntityId; 4], [EntityId; 3]) {
        let mut points = CurvePoints::new(mirror);
        let first = points.init_segment(
            Point::new(0., 0.),
            Point::new(50., 0.),
            Point::new(-50., 50.),
            Point::new(0., 50.),
        );
        let second = points.append_segment(
            Point::new(50., 50.),
            Point::new(-50., 100.),
            Point::new(0., 100.),
        );
        (points, first, second)
    }

    #[test]
    fn init_segment_roles_and_relations() {
        let (points, [start, h1, h2, end], _) = two_segment_curve(MirrorPolicy::LiveLength);
        assert_eq!(points.len(), 7);
        assert_eq!(points.segment_count(), 2);

        let typs: Vec<bool> = points.as_slice().iter().map(|pt| pt.is_anchor()).collect();
        assert_eq!(typs, vec![true, false, false, true, false, false, true]);

        assert_eq!(points.point(h1).unwrap().master, Some(start));
        assert_eq!(points.point(h2).unwrap().master, Some(end));
        // the first segment's handles are not opposites of each other
        assert_eq!(points.point(h1).unwrap().opposite, None);
    }

    #[test]
    fn append_links_opposites_through_shared_anchor() {
        let (points, [_, _, h2, end], [h3, h4, new_end]) =
            two_segment_curve(MirrorPolicy::LiveLength);
        assert_eq!(points.point(h2).unwrap().opposite, Some(h3));
        assert_eq!(points.point(h3).unwrap().opposite, Some(h2));
        assert_eq!(points.point(h3).unwrap().master, Some(end));
        assert_eq!(points.point(h4).unwrap().master, Some(new_end));
    }

    #[test]
    fn followers_include_self_first() {
        let (points, [start, h1, ..], _) = two_segment_curve(MirrorPolicy::LiveLength);
        let followers: Vec<EntityId> = points.followers_of(start).collect();
        assert_eq!(followers[0], start);
        assert!(followers.contains(&h1));
        // a handle only follows itself
        assert_eq!(points.followers_of(h1).collect::<Vec<_>>(), vec![h1]);
    }

    #[test]
    fn mirror_keeps_opposite_collinear_at_its_distance() {
        let (mut points, [_, _, h2, shared], [h3, ..]) =
            two_segment_curve(MirrorPolicy::LiveLength);
        let anchor = points.point(shared).unwrap().point;
        let pre_dist = (anchor - points.point(h3).unwrap().point).hypot();

        let target = Point::new(-80., 20.);
        points.set_position(h2, target);
        points.mirror_adjust(h2);

        let h3_pos = points.point(h3).unwrap().point;
        // distance from the anchor is preserved
        assert_relative_eq!((anchor - h3_pos).hypot(), pre_dist, epsilon = 1e-9);
        // and the three points are collinear, handle on the far side
        let to_moved = normalize_or_zero(target - anchor);
        let to_opposite = normalize_or_zero(h3_pos - anchor);
        assert_relative_eq!(to_moved.x, -to_opposite.x, epsilon = 1e-9);
        assert_relative_eq!(to_moved.y, -to_opposite.y, epsilon = 1e-9);
    }

    #[test]
    fn mirror_with_degenerate_opposite_stays_finite() {
        let (mut points, [_, _, h2, shared], [h3, ..]) =
            two_segment_curve(MirrorPolicy::LiveLength);
        let anchor = points.point(shared).unwrap().point;
        // opposite coincides with the anchor: zero mirror length
        points.set_position(h3, anchor);
        points.set_position(h2, Point::new(-70., 30.));
        points.mirror_adjust(h2);
        let h3_pos = points.point(h3).unwrap().point;
        assert!(h3_pos.x.is_finite() && h3_pos.y.is_finite());
        assert_eq!(h3_pos, anchor);

        // and the moved handle sitting on the anchor must not produce NaN either
        points.set_position(h2, anchor);
        points.mirror_adjust(h2);
        let h3_pos = points.point(h3).unwrap().point;
        assert!(h3_pos.x.is_finite() && h3_pos.y.is_finite());
    }

    #[test]
    fn frozen_length_is_captured_at_link_time() {
        let (mut points, [_, _, h2, shared], [h3, ..]) =
            two_segment_curve(MirrorPolicy::FrozenLength);
        let anchor = points.point(shared).unwrap().point;
        let linked_dist = (anchor - points.point(h3).unwrap().point).hypot();

        // move the opposite off its linked distance, then drag the partner;
        // the frozen policy snaps it back to the link-time distance
        points.set_position(h3, Point::new(200., 200.));
        points.set_position(h2, Point::new(-80., 20.));
        points.mirror_adjust(h2);

        let h3_pos = points.point(h3).unwrap().point;
        assert_relative_eq!((anchor - h3_pos).hypot(), linked_dist, epsilon = 1e-9);
    }

    #[test]
    fn segments_iterate_in_windows_of_four() {
        let (points, ..) = two_segment_curve(MirrorPolicy::LiveLength);
        let segs: Vec<CubicBez> = points.iter_segments().collect();
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].p0, Point::new(0., 0.));
        assert_eq!(segs[0].p3, Point::new(0., 50.));
        // the second segment starts at the shared anchor
        assert_eq!(segs[1].p0, segs[0].p3);
        assert_eq!(segs[1].p3, Point::new(0., 100.));
    }

    #[test]
    fn unlinked_point_is_not_mirrored() {
        let (mut points, [_, h1, h2, _], _) = two_segment_curve(MirrorPolicy::LiveLength);
        let before = points.point(h2).unwrap().point;
        // h1 has a master but no opposite; adjusting it must touch nothing
        points.set_position(h1, Point::new(90., -10.));
        points.mirror_adjust(h1);
        assert_eq!(points.point(h2).unwrap().point, before);
    }
}
