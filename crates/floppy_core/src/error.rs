use smallvec::SmallVec;
use thiserror::Error;

use crate::{PieceId, Relation};

/// Violation of the fixed piece topology.
///
/// The topology is established once at construction and only mutated by
/// re-parenting, so any of these indicates a bug rather than bad input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TopologyError {
    /// Piece already has the maximum number of links of this kind.
    #[error("{piece} already has {max} {relation} links")]
    CapacityExceeded {
        /// Piece being linked.
        piece: PieceId,
        /// Side of the link.
        relation: Relation,
        /// Maximum number of links of this kind.
        max: usize,
    },
    /// Link to replace does not exist.
    #[error("{piece} has no {relation} link to {other}")]
    NotLinked {
        /// Piece being modified.
        piece: PieceId,
        /// Side of the link.
        relation: Relation,
        /// Expected linked piece.
        other: PieceId,
    },
    /// Piece would become its own parent or child.
    #[error("{piece} cannot be its own {relation}")]
    SelfLink {
        /// Piece being linked.
        piece: PieceId,
        /// Side of the link.
        relation: Relation,
    },
    /// Child of a piece has no second parent to swap with.
    #[error("child {child} of {piece} has no other parent")]
    MissingCoParent {
        /// Piece being re-parented around.
        piece: PieceId,
        /// Child lacking a second parent.
        child: PieceId,
    },
    /// Rotation angle is NaN or infinite.
    #[error("cannot rotate {piece} by non-finite angle {angle}")]
    NonFiniteAngle {
        /// Piece being rotated.
        piece: PieceId,
        /// Offending angle.
        angle: f64,
    },
    /// Structural invariant does not hold.
    #[error("topology invariant violated: {0}")]
    Invariant(String),
}

/// Integer that is not a valid piece ID.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
#[error("invalid piece ID {0}; expected 1 to 9")]
pub struct InvalidPieceId(pub u32);

/// Reason that a pair of picked pieces did not form a rotation group.
///
/// These are expected during normal interaction and are never fatal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rejection {
    /// Both picks are the same piece.
    #[error("both picks are {0}")]
    SamePiece(PieceId),
    /// Neither piece is the parent of the other and they share no parent.
    #[error("{0} and {1} are not related")]
    Unrelated(PieceId, PieceId),
    /// Both pieces are edges, but not on opposite sides of the center.
    #[error("{0} and {1} are adjacent edges")]
    DisallowedSiblings(PieceId, PieceId),
    /// Pieces that would rotate together are not at the same angle.
    #[error("pieces around pivot {pivot} have different rotations: {rotations:?}")]
    InconsistentRotation {
        /// Pivot of the candidate group.
        pivot: PieceId,
        /// Rotation of each candidate member.
        rotations: SmallVec<[(PieceId, f64); 3]>,
    },
}
