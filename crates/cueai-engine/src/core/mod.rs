//! Table model: geometry, balls, shots and board states.

pub use self::{ball::*, board::*, geometry::*, shot::*, table::*};

pub(crate) mod ball;
pub(crate) mod board;
pub mod geometry;
pub(crate) mod shot;
pub(crate) mod table;
