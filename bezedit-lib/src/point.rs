//! Control points and the identifiers used to link them.

use kurbo::Point;

const NO_PARENT_TYPE_ID: IdComponent = 0;

type IdComponent = usize;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Hash, Eq, Ord)]
/// A unique identifier for some entity, such as a control point or a curve.
///
/// The id has two parts; the first ('parent') identifies the curve that owns
/// the point, and the second ('point') identifies the item itself.
///
/// A given id will be unique across the application at any given time.
pub struct EntityId {
    parent: IdComponent,
    point: IdComponent,
}

/// Whether a control point lies on the curve or flanks an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointType {
    /// A point on the curve, shared by up to two adjacent segments.
    Anchor,
    /// A tangent-control point flanking an anchor; not on the curve itself.
    Handle,
}

/// One node in a piecewise cubic curve.
///
/// The `master` and `opposite` fields are id-based relations into the owning
/// [`CurvePoints`](crate::point_list::CurvePoints) arena, not references;
/// handle pairs mirrored through a shared anchor would otherwise form
/// ownership cycles.
#[derive(Clone, Copy, PartialEq)]
pub struct CurvePoint {
    pub id: EntityId,
    pub point: Point,
    pub typ: PointType,
    /// The anchor this handle is attached to, if any.
    pub master: Option<EntityId>,
    /// The other handle mirrored through the same shared anchor.
    pub opposite: Option<EntityId>,
}

impl EntityId {
    /// Returns a new unique id with no associated parent.
    pub fn next() -> EntityId {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static NEXT_ID: AtomicUsize = AtomicUsize::new(1);
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        EntityId {
            parent: NO_PARENT_TYPE_ID,
            point: id,
        }
    }

    pub fn new_with_parent(parent: EntityId) -> Self {
        EntityId {
            parent: parent.point,
            ..EntityId::next()
        }
    }

    pub(crate) fn is_child_of(self, other: EntityId) -> bool {
        self.parent == other.point
    }
}

impl PointType {
    pub fn is_anchor(self) -> bool {
        matches!(self, PointType::Anchor)
    }

    pub fn is_handle(self) -> bool {
        matches!(self, PointType::Handle)
    }
}

impl CurvePoint {
    pub fn anchor(curve: EntityId, point: Point) -> CurvePoint {
        CurvePoint {
            id: EntityId::new_with_parent(curve),
            point,
            typ: PointType::Anchor,
            master: None,
            opposite: None,
        }
    }

    pub fn handle(curve: EntityId, point: Point) -> CurvePoint {
        CurvePoint {
            id: EntityId::new_with_parent(curve),
            point,
            typ: PointType::Handle,
            master: None,
            opposite: None,
        }
    }

    pub fn is_anchor(&self) -> bool {
        self.typ.is_anchor()
    }

    pub fn is_handle(&self) -> bool {
        self.typ.is_handle()
    }
}

impl std::fmt::Debug for CurvePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}: ({:.2}, {:.2}) {:?}", self.id, self.point.x, self.point.y, self.typ)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "id{}.{}", self.parent, self.point)
    }
}
