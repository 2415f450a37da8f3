use cgmath::{InnerSpace, Vector3};
use serde::Serialize;
use smallvec::{SmallVec, smallvec};

use crate::{Arm, PieceGraph, PieceId, PiecePositions, Rejection};

/// Pair of pieces whose offset defines a rotation axis.
#[derive(Serialize, Debug, Copy, Clone, PartialEq, Eq)]
pub struct AxisRef {
    /// Start of the axis vector.
    pub tail: PieceId,
    /// End of the axis vector.
    pub head: PieceId,
}
impl AxisRef {
    /// Returns the normalized axis vector, or `None` if the two pieces are at
    /// the same position.
    pub fn resolve(self, positions: &impl PiecePositions) -> Option<Vector3<f64>> {
        let v = positions.offset(self.tail, self.head);
        let len = v.magnitude();
        (len > 0.0 && len.is_finite()).then(|| v / len)
    }
}

/// Set of pieces that rotate together around a pivot.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RotationGroup {
    /// Piece whose rotation drives the group.
    pub pivot: PieceId,
    /// Pivot followed by the two pieces that move with it.
    pub members: SmallVec<[PieceId; 3]>,
    /// When the pivot is the center: the two edges that turn relative to the
    /// members, each carrying its own children. Empty otherwise.
    pub counter_arms: SmallVec<[PieceId; 2]>,
    /// Pieces defining the rotation axis.
    pub axis_ref: AxisRef,
    /// Normalized rotation axis as of the last update, or `None` if it was
    /// degenerate.
    pub axis: Option<Vector3<f64>>,
}
impl RotationGroup {
    /// Returns whether the pivot is the center piece.
    pub fn is_center_pivot(&self) -> bool {
        self.pivot == PieceId::CENTER
    }

    /// Returns whether `piece` is a member of the group.
    pub fn contains(&self, piece: PieceId) -> bool {
        self.members.contains(&piece)
    }

    /// Recomputes the rotation axis from current positions.
    pub fn refresh_axis(&mut self, positions: &impl PiecePositions) {
        self.axis = self.axis_ref.resolve(positions);
        if self.axis.is_none() {
            log::trace!("degenerate axis for group around {}", self.pivot);
        }
    }
}

/// Which center children take part when the center is the pivot.
struct CenterGrip {
    /// Indices of the center children that stay with the center.
    members: [usize; 2],
    /// Index of the center child at the head of the axis.
    axis_head: usize,
    /// Indices of the center children that turn.
    counter_arms: [usize; 2],
}

/// Returns which children of the center move together, given one of the arms
/// that was picked.
fn center_grip(picked: Arm) -> CenterGrip {
    if picked.is_vertical() {
        CenterGrip {
            members: [Arm::Up.center_child_index(), Arm::Down.center_child_index()],
            axis_head: Arm::Left.center_child_index(),
            counter_arms: [Arm::Right.center_child_index(), Arm::Left.center_child_index()],
        }
    } else {
        CenterGrip {
            members: [Arm::Right.center_child_index(), Arm::Left.center_child_index()],
            axis_head: Arm::Up.center_child_index(),
            counter_arms: [Arm::Up.center_child_index(), Arm::Down.center_child_index()],
        }
    }
}

/// Resolves a pair of picked pieces into a rotation group.
///
/// `older` and `newer` are in the order they were picked. The pivot is
/// whichever piece is the parent of the other, or else their shared parent.
/// Two edges only form a group when they are on opposite sides of the center.
pub(crate) fn resolve(
    graph: &PieceGraph,
    older: PieceId,
    newer: PieceId,
    positions: &impl PiecePositions,
) -> Result<RotationGroup, Rejection> {
    if older == newer {
        return Err(Rejection::SamePiece(older));
    }

    let (pivot, other) = if graph[older].has_parent(newer) {
        (newer, older)
    } else if graph[newer].has_parent(older) {
        (older, newer)
    } else {
        let (a, b) = (&graph[older], &graph[newer]);
        let shared = (a.num_parents() == b.num_parents())
            .then(|| a.parents().iter().copied().find(|&p| b.has_parent(p)))
            .flatten()
            .ok_or(Rejection::Unrelated(older, newer))?;
        if let (Some(arm_a), Some(arm_b)) = (older.arm(), newer.arm())
            && arm_a.opposite() != arm_b
        {
            return Err(Rejection::DisallowedSiblings(older, newer));
        }
        (shared, newer)
    };

    let pivot_piece = &graph[pivot];
    // Unreachable while the topology invariants hold.
    let missing_child = || {
        debug_panic!("pivot {pivot} has no children to rotate with {other}");
        Rejection::Unrelated(older, newer)
    };

    let mut group = if pivot == PieceId::CENTER {
        // `other` is a child of the center, so it must be an edge.
        let arm = other.arm().ok_or_else(missing_child)?;
        let grip = center_grip(arm);
        let child = |i| pivot_piece.child(i).ok_or_else(missing_child);
        RotationGroup {
            pivot,
            members: smallvec![pivot, child(grip.members[0])?, child(grip.members[1])?],
            counter_arms: smallvec![child(grip.counter_arms[0])?, child(grip.counter_arms[1])?],
            axis_ref: AxisRef {
                tail: pivot,
                head: child(grip.axis_head)?,
            },
            axis: None,
        }
    } else {
        let (Some(c0), Some(c1)) = (pivot_piece.child(0), pivot_piece.child(1)) else {
            return Err(missing_child());
        };
        // Orient every edge axis the same way: up for vertical arms, left for
        // horizontal ones.
        let axis_ref = match pivot.arm() {
            Some(Arm::Up | Arm::Left) => AxisRef {
                tail: PieceId::CENTER,
                head: pivot,
            },
            _ => AxisRef {
                tail: pivot,
                head: PieceId::CENTER,
            },
        };
        RotationGroup {
            pivot,
            members: smallvec![pivot, c0, c1],
            counter_arms: SmallVec::new(),
            axis_ref,
            axis: None,
        }
    };

    let pivot_rotation = graph.rotation(pivot);
    if group
        .members
        .iter()
        .any(|&m| graph.rotation(m) != pivot_rotation)
    {
        return Err(Rejection::InconsistentRotation {
            pivot,
            rotations: group
                .members
                .iter()
                .map(|&m| (m, graph.rotation(m)))
                .collect(),
        });
    }

    group.refresh_axis(positions);
    Ok(group)
}
