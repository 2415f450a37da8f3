//! Piece graph and rotation groups for a 3×3 "floppy cube" puzzle.
//!
//! The puzzle has nine pieces. The center is the parent of the four edges,
//! and each corner is a child of the two edges beside it. Picking two related
//! pieces selects a rotation group; rotating a group past a half turn swaps
//! which edges the moved corners belong to.
//!
//! [`FloppyCube`] is the entry point for a frontend. It owns the
//! [`PieceGraph`] and the current [`GestureState`], and reports each motion as
//! a [`RotationStep`] that the frontend applies to its own transforms.

macro_rules! debug_panic {
    ($($tok:tt)*) => {
        match cfg!(debug_assertions) {
            true => panic!($($tok)*),
            false => log::error!($($tok)*),
        }
    };
}

mod angle;
mod arcball;
mod error;
mod graph;
mod group;
mod layout;
mod manager;
mod piece;

#[cfg(test)]
mod tests;

pub use prelude::*;

/// Prelude of common imports.
pub mod prelude {
    pub use crate::angle::{align_angle, fold_half_turns};
    pub use crate::arcball::ArcballDrag;
    pub use crate::error::{InvalidPieceId, Rejection, TopologyError};
    pub use crate::graph::{PieceGraph, PieceTopology, RotateOutcome};
    pub use crate::group::{AxisRef, RotationGroup};
    pub use crate::layout::{Layout, PiecePositions};
    pub use crate::manager::{FloppyCube, GestureState, PickOutcome, RotationStep, Settings};
    pub use crate::piece::{Arm, ChildList, ParentList, Piece, PieceId, PieceKind, Relation};
}

/// Number of pieces in the puzzle.
pub const PIECE_COUNT: usize = 9;
/// Maximum number of parents of a single piece.
pub const MAX_PARENTS: usize = 2;
/// Maximum number of children of a single piece.
pub const MAX_CHILDREN: usize = 4;

/// Angle in degrees between neutral orientations of a piece.
pub const HALF_TURN: f64 = 180.0;
/// Default distance in degrees from a neutral orientation within which a
/// piece snaps into alignment.
pub const DEFAULT_SNAP_TOLERANCE: f64 = 15.0;
