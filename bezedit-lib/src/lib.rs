//! The core library of the bezedit curve editor.
//!
//! A curve is a piecewise cubic Bézier: `4 + 3k` control points ordered
//! `[anchor, handle, handle, anchor, …]`, with handle pairs around a shared
//! anchor kept collinear by the mirroring rule so adjacent segments join
//! smoothly. The editor front end owns input and drawing; this crate owns the
//! point graph, the math, and the document format.

#[macro_use]
extern crate serde_derive;

mod util;

pub mod bezier;
pub mod document;
pub mod drag;
pub mod edit_session;
pub mod point;
pub mod point_list;

pub use document::{CurveDocument, DocumentError, LegacyWaypoint, Waypoint};
pub use edit_session::EditSession;
pub use point_list::MirrorPolicy;
