mod grid_area;
mod weiss1974;

pub use grid_area::{gradient, EllipsoidGridArea, WGS84_SEMI_MAJOR, WGS84_SEMI_MINOR};
pub use weiss1974::{Weiss1974, Weiss1974Parameters};
