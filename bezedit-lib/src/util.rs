//! Shared helpers.

use kurbo::Vec2;

/// Unwrap an optional, logging a message and returning if it is missing.
macro_rules! bail {
    ($opt:expr $(,)?) => {
        match $opt {
            Some(val) => val,
            None => {
                log::warn!("[{}:{}] bailed", file!(), line!());
                return;
            }
        }
    };
    ($opt:expr, $($arg:tt)+) => {
        match $opt {
            Some(val) => val,
            None => {
                log::warn!($($arg)+);
                return;
            }
        }
    };
}

pub(crate) use bail;

/// `Vec2::normalize` returns NaN components for the zero vector; a degenerate
/// handle (coincident with its anchor) has to stay put instead of poisoning
/// every later position with NaN.
pub(crate) fn normalize_or_zero(v: Vec2) -> Vec2 {
    let mag = v.hypot();
    if mag == 0.0 {
        Vec2::ZERO
    } else {
        v / mag
    }
}
