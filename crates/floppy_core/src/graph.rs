use std::ops::Index;

use itertools::Itertools;
use serde::Serialize;

use crate::{
    ChildList, HALF_TURN, PIECE_COUNT, ParentList, Piece, PieceId, PieceKind, Relation,
    TopologyError, align_angle, fold_half_turns,
};

/// Children of each piece that has any, in link order.
const INITIAL_CHILDREN: [(u8, &[u8]); 5] = [
    (5, &[2, 6, 8, 4]),
    (2, &[1, 3]),
    (6, &[3, 9]),
    (8, &[9, 7]),
    (4, &[7, 1]),
];
/// Parents of each piece that has any, in link order.
const INITIAL_PARENTS: [(u8, &[u8]); 8] = [
    (2, &[5]),
    (6, &[5]),
    (8, &[5]),
    (4, &[5]),
    (1, &[4, 2]),
    (3, &[2, 6]),
    (9, &[6, 8]),
    (7, &[8, 4]),
];

/// Parent and child links of a piece.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PieceTopology {
    /// Ordered list of parents.
    pub parents: ParentList,
    /// Ordered list of children.
    pub children: ChildList,
}

/// Result of rotating a single piece.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RotateOutcome {
    /// New rotation of the piece, in degrees.
    pub rotation: f64,
    /// Signed number of half-turn seams crossed.
    pub seams: i64,
    /// Whether the piece's children swapped parents.
    pub reparented: bool,
}

/// Arena owning all nine pieces, addressed by [`PieceId`].
#[derive(Debug, Clone, PartialEq)]
pub struct PieceGraph {
    pieces: [Piece; PIECE_COUNT],
}
impl Default for PieceGraph {
    fn default() -> Self {
        Self::new()
    }
}
impl Index<PieceId> for PieceGraph {
    type Output = Piece;

    fn index(&self, index: PieceId) -> &Self::Output {
        &self.pieces[index.index()]
    }
}
impl PieceGraph {
    /// Constructs the puzzle in its solved state.
    ///
    /// # Panics
    ///
    /// Panics if the built-in topology is malformed.
    pub fn new() -> Self {
        Self::try_new().expect("error building floppy cube topology")
    }

    fn try_new() -> Result<Self, TopologyError> {
        let mut graph = Self {
            pieces: std::array::from_fn(|i| Piece::new(PieceId::from_index(i))),
        };
        for (id, children) in INITIAL_CHILDREN {
            let children = children.iter().map(|&c| PieceId::from_raw(c)).collect_vec();
            graph.piece_mut(PieceId::from_raw(id)).set_children(&children)?;
        }
        for (id, parents) in INITIAL_PARENTS {
            let parents = parents.iter().map(|&p| PieceId::from_raw(p)).collect_vec();
            graph.piece_mut(PieceId::from_raw(id)).set_parents(&parents)?;
        }
        graph.check_invariants()?;
        Ok(graph)
    }

    pub(crate) fn piece_mut(&mut self, id: PieceId) -> &mut Piece {
        &mut self.pieces[id.index()]
    }

    /// Iterates over all pieces in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter()
    }

    /// Returns a piece.
    pub fn piece(&self, id: PieceId) -> &Piece {
        &self[id]
    }
    /// Returns the rotation of a piece, in degrees.
    pub fn rotation(&self, id: PieceId) -> f64 {
        self[id].rotation()
    }
    /// Overwrites the rotation of a piece without rotating it. This is how
    /// group members follow their pivot.
    pub(crate) fn set_rotation(&mut self, id: PieceId, rotation: f64) {
        self.piece_mut(id).set_rotation(rotation);
    }

    /// Returns the links of a piece.
    pub fn topology(&self, id: PieceId) -> PieceTopology {
        let piece = &self[id];
        PieceTopology {
            parents: piece.parents().iter().copied().collect(),
            children: piece.children().iter().copied().collect(),
        }
    }

    /// Adds `delta` degrees to the rotation of a piece.
    ///
    /// The result is folded back into (-180°, 180°) using
    /// [`fold_half_turns()`]. If the piece has exactly two children and an odd
    /// number of seams are crossed, the children swap which other parent they
    /// belong to. See [`Self::swap_co_parents()`].
    pub fn rotate(&mut self, id: PieceId, delta: f64) -> Result<RotateOutcome, TopologyError> {
        if !delta.is_finite() {
            return Err(TopologyError::NonFiniteAngle {
                piece: id,
                angle: delta,
            });
        }

        let (rotation, seams) = fold_half_turns(self.rotation(id) + delta);
        let reparented = self[id].num_children() == 2 && seams % 2 != 0;
        if reparented {
            self.swap_co_parents(id)?;
            log::trace!("{id} crossed a seam; swapped parents of {:?}", self[id].children());
        }
        self.set_rotation(id, rotation);

        Ok(RotateOutcome {
            rotation,
            seams,
            reparented,
        })
    }

    /// Returns the angle that would snap a piece to its nearest neutral
    /// orientation. See [`align_angle()`].
    pub fn align_angle(&self, id: PieceId, tolerance: f64) -> f64 {
        align_angle(self.rotation(id), tolerance)
    }

    /// Swaps the other parents of the two children of `id`.
    ///
    /// After `id` turns a half turn, each of its two children sits where the
    /// other used to be, so each now touches the edge that the other used to
    /// touch. Both sides of all four affected links are updated.
    pub fn swap_co_parents(&mut self, id: PieceId) -> Result<(), TopologyError> {
        let piece = &self[id];
        let (Some(c0), Some(c1), 2) = (piece.child(0), piece.child(1), piece.num_children())
        else {
            return Err(TopologyError::Invariant(format!(
                "{id} must have exactly two children to swap them",
            )));
        };
        let p0 = self.co_parent(c0, id)?;
        let p1 = self.co_parent(c1, id)?;

        // Check every link before touching any of them.
        for (piece, relation, old) in [
            (c0, Relation::Parent, p0),
            (c1, Relation::Parent, p1),
            (p0, Relation::Child, c0),
            (p1, Relation::Child, c1),
        ] {
            if !self[piece].links(relation).contains(&old) {
                return Err(TopologyError::NotLinked {
                    piece,
                    relation,
                    other: old,
                });
            }
        }

        self.piece_mut(c0).switch_parent(p0, p1)?;
        self.piece_mut(c1).switch_parent(p1, p0)?;
        self.piece_mut(p0).switch_child(c0, c1)?;
        self.piece_mut(p1).switch_child(c1, c0)?;
        Ok(())
    }

    /// Returns the parent of `child` that is not `parent`.
    fn co_parent(&self, child: PieceId, parent: PieceId) -> Result<PieceId, TopologyError> {
        self[child]
            .parents()
            .iter()
            .copied()
            .find(|&p| p != parent)
            .ok_or(TopologyError::MissingCoParent {
                piece: parent,
                child,
            })
    }

    /// Checks every structural invariant of the graph.
    pub fn check_invariants(&self) -> Result<(), TopologyError> {
        let fail = |msg: String| Err(TopologyError::Invariant(msg));

        for piece in &self.pieces {
            let id = piece.id();

            let (expected_parents, expected_children) = match id.kind() {
                PieceKind::Center => (0, 4),
                PieceKind::Edge => (1, 2),
                PieceKind::Corner => (2, 0),
            };
            if piece.num_parents() != expected_parents
                || piece.num_children() != expected_children
            {
                return fail(format!(
                    "{} {id} has {} parents and {} children",
                    id.kind(),
                    piece.num_parents(),
                    piece.num_children(),
                ));
            }

            if !piece.parents().iter().all_unique() || !piece.children().iter().all_unique() {
                return fail(format!("{id} has duplicate links"));
            }
            if piece.has_parent(id) || piece.has_child(id) {
                return fail(format!("{id} is linked to itself"));
            }

            for &parent in piece.parents() {
                if !self[parent].has_child(id) {
                    return fail(format!("{id} lists parent {parent}, which does not list it"));
                }
            }
            for &child in piece.children() {
                if !self[child].has_parent(id) {
                    return fail(format!("{id} lists child {child}, which does not list it"));
                }
            }

            let expected_link_kind = match id.kind() {
                PieceKind::Center => PieceKind::Edge,
                PieceKind::Edge => PieceKind::Corner,
                PieceKind::Corner => PieceKind::Corner,
            };
            if let Some(&bad) = piece.children().iter().find(|c| c.kind() != expected_link_kind)
            {
                return fail(format!("{id} has {} child {bad}", bad.kind()));
            }

            match id.kind() {
                PieceKind::Edge if piece.parents() != [PieceId::CENTER] => {
                    return fail(format!("edge {id} is not a child of the center"));
                }
                PieceKind::Edge => {
                    let co_parents: Vec<PieceId> = piece
                        .children()
                        .iter()
                        .map(|&c| self.co_parent(c, id))
                        .collect::<Result<_, _>>()?;
                    if !co_parents.iter().all_unique() {
                        return fail(format!("children of {id} share their other parent"));
                    }
                }
                PieceKind::Corner => {
                    let verticals = piece
                        .parents()
                        .iter()
                        .filter_map(|p| p.arm())
                        .map(|arm| arm.is_vertical())
                        .collect_vec();
                    if verticals.len() != 2 || verticals[0] == verticals[1] {
                        return fail(format!(
                            "corner {id} must have one vertical and one horizontal parent",
                        ));
                    }
                }
                PieceKind::Center => (),
            }

            let rotation = piece.rotation();
            if !(rotation > -HALF_TURN && rotation < HALF_TURN) {
                return fail(format!("{id} has rotation {rotation} out of range"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn id(n: u8) -> PieceId {
        PieceId::from_raw(n)
    }
    fn ids(ns: &[u8]) -> Vec<PieceId> {
        ns.iter().map(|&n| id(n)).collect()
    }

    #[test]
    fn test_initial_topology() {
        let graph = PieceGraph::new();
        graph.check_invariants().unwrap();

        assert_eq!(graph[id(5)].children(), ids(&[2, 6, 8, 4]));
        assert_eq!(graph[id(5)].num_parents(), 0);
        assert_eq!(graph[id(2)].parents(), ids(&[5]));
        assert_eq!(graph[id(2)].children(), ids(&[1, 3]));
        assert_eq!(graph[id(6)].children(), ids(&[3, 9]));
        assert_eq!(graph[id(8)].children(), ids(&[9, 7]));
        assert_eq!(graph[id(4)].children(), ids(&[7, 1]));
        assert_eq!(graph[id(1)].parents(), ids(&[4, 2]));
        assert_eq!(graph[id(3)].parents(), ids(&[2, 6]));
        assert_eq!(graph[id(9)].parents(), ids(&[6, 8]));
        assert_eq!(graph[id(7)].parents(), ids(&[8, 4]));
        assert!(graph.iter().all(|p| p.rotation() == 0.0));
    }

    #[test]
    fn test_rotate_without_crossing() {
        let mut graph = PieceGraph::new();
        let before = graph.clone();
        let outcome = graph.rotate(id(2), 90.0).unwrap();
        assert_eq!(outcome.rotation, 90.0);
        assert!(!outcome.reparented);
        assert_eq!(graph.topology(id(1)), before.topology(id(1)));
        assert_eq!(graph.rotation(id(2)), 90.0);
        // Only the rotated piece changes; followers are updated by the caller.
        assert_eq!(graph.rotation(id(1)), 0.0);
    }

    #[test]
    fn test_rotate_across_seam_reparents_once() {
        let mut graph = PieceGraph::new();
        for n in [2, 1, 3] {
            graph.set_rotation(id(n), 170.0);
        }

        let outcome = graph.rotate(id(2), 15.0).unwrap();
        assert_eq!(outcome.rotation, 5.0);
        assert_eq!(outcome.seams, 1);
        assert!(outcome.reparented);

        // Corners swapped their other parent.
        assert_eq!(graph[id(1)].parents(), ids(&[6, 2]));
        assert_eq!(graph[id(3)].parents(), ids(&[2, 4]));
        assert_eq!(graph[id(4)].children(), ids(&[7, 3]));
        assert_eq!(graph[id(6)].children(), ids(&[1, 9]));

        // The pivot's own links are unchanged.
        assert_eq!(graph[id(2)].parents(), ids(&[5]));
        assert_eq!(graph[id(2)].children(), ids(&[1, 3]));

        graph.set_rotation(id(1), 5.0);
        graph.set_rotation(id(3), 5.0);
        graph.check_invariants().unwrap();
    }

    #[test]
    fn test_rotate_negative_seam() {
        let mut graph = PieceGraph::new();
        let outcome = graph.rotate(id(6), -190.0).unwrap();
        assert_eq!(outcome.rotation, -10.0);
        assert_eq!(outcome.seams, -1);
        assert!(outcome.reparented);
        assert_eq!(graph[id(3)].parents(), ids(&[8, 6]));
        assert_eq!(graph[id(9)].parents(), ids(&[6, 2]));
    }

    #[test]
    fn test_rotate_full_turn_restores_links() {
        let mut graph = PieceGraph::new();
        let before = graph.clone();
        let outcome = graph.rotate(id(8), 370.0).unwrap();
        assert_eq!(outcome.rotation, 10.0);
        assert_eq!(outcome.seams, 2);
        assert!(!outcome.reparented);
        for piece in PieceId::iter() {
            assert_eq!(graph.topology(piece), before.topology(piece));
        }
    }

    #[test]
    fn test_two_half_turns_restore_links() {
        let mut graph = PieceGraph::new();
        let before = graph.clone();
        graph.rotate(id(4), 180.0).unwrap();
        assert_eq!(graph.rotation(id(4)), 0.0);
        assert_ne!(graph.topology(id(1)), before.topology(id(1)));
        graph.rotate(id(4), 180.0).unwrap();
        for piece in PieceId::iter() {
            assert_eq!(graph.topology(piece), before.topology(piece));
        }
    }

    #[test]
    fn test_center_and_corners_never_reparent() {
        let mut graph = PieceGraph::new();
        let before = graph.clone();
        assert!(!graph.rotate(PieceId::CENTER, 200.0).unwrap().reparented);
        assert!(!graph.rotate(id(9), -200.0).unwrap().reparented);
        for piece in PieceId::iter() {
            assert_eq!(graph.topology(piece), before.topology(piece));
        }
    }

    #[test]
    fn test_rotate_non_finite() {
        let mut graph = PieceGraph::new();
        assert!(matches!(
            graph.rotate(id(2), f64::NAN),
            Err(TopologyError::NonFiniteAngle { .. }),
        ));
        assert_eq!(graph.rotation(id(2)), 0.0);
    }

    #[test]
    fn test_swap_requires_two_children() {
        let mut graph = PieceGraph::new();
        assert!(matches!(
            graph.swap_co_parents(PieceId::CENTER),
            Err(TopologyError::Invariant(_)),
        ));
        assert!(graph.swap_co_parents(id(1)).is_err());
        assert_eq!(graph, PieceGraph::new());
    }

    #[test]
    fn test_invariant_detects_one_sided_link() {
        let mut graph = PieceGraph::new();
        graph.piece_mut(id(1)).switch_parent(id(4), id(6)).unwrap();
        assert!(matches!(
            graph.check_invariants(),
            Err(TopologyError::Invariant(_)),
        ));
    }
}
