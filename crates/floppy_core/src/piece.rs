use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{InvalidPieceId, MAX_CHILDREN, MAX_PARENTS, PIECE_COUNT, TopologyError};

/// List of parent pieces.
pub type ParentList = SmallVec<[PieceId; MAX_PARENTS]>;
/// List of child pieces.
pub type ChildList = SmallVec<[PieceId; MAX_CHILDREN]>;

/// ID of a **piece**, which is one of the nine segments of the puzzle.
///
/// IDs are 1-indexed in reading order:
///
/// ```text
/// 1 2 3
/// 4 5 6
/// 7 8 9
/// ```
#[derive(Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
pub struct PieceId(u8);

impl fmt::Debug for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl TryFrom<u8> for PieceId {
    type Error = InvalidPieceId;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value.into()).ok_or(InvalidPieceId(value.into()))
    }
}
impl From<PieceId> for u8 {
    fn from(value: PieceId) -> Self {
        value.0
    }
}

impl PieceId {
    /// Center piece, which never moves relative to the rest of the puzzle.
    pub const CENTER: PieceId = PieceId(5);

    /// Returns the piece with the given 1-indexed ID, or `None` if it is out
    /// of range. Picking returns 0 for the background, which maps to `None`.
    pub fn new(id: u32) -> Option<Self> {
        (1..=PIECE_COUNT as u32)
            .contains(&id)
            .then_some(PieceId(id as u8))
    }

    /// Constructs an ID known to be in range.
    pub(crate) const fn from_raw(id: u8) -> Self {
        debug_assert!(id >= 1 && id as usize <= PIECE_COUNT);
        PieceId(id)
    }
    pub(crate) const fn from_index(index: usize) -> Self {
        Self::from_raw(index as u8 + 1)
    }
    pub(crate) const fn index(self) -> usize {
        self.0 as usize - 1
    }

    /// Returns the 1-indexed ID as an integer.
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Iterates over all pieces in ID order.
    pub fn iter() -> impl Iterator<Item = PieceId> {
        (0..PIECE_COUNT).map(Self::from_index)
    }

    /// Returns what kind of piece this is.
    pub fn kind(self) -> PieceKind {
        match self.0 {
            5 => PieceKind::Center,
            2 | 4 | 6 | 8 => PieceKind::Edge,
            _ => PieceKind::Corner,
        }
    }

    /// Returns the arm for an edge piece, or `None` for other pieces.
    pub fn arm(self) -> Option<Arm> {
        match self.0 {
            2 => Some(Arm::Up),
            6 => Some(Arm::Right),
            8 => Some(Arm::Down),
            4 => Some(Arm::Left),
            _ => None,
        }
    }
}

/// Kind of piece, determined by its position in the grid.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PieceKind {
    /// Middle piece, parent of all four edges.
    Center,
    /// Piece adjacent to the center, parent of two corners.
    Edge,
    /// Piece on a corner, child of two edges.
    Corner,
}

/// Edge piece, named by its direction from the center.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Arm {
    /// Piece #2.
    Up,
    /// Piece #6.
    Right,
    /// Piece #8.
    Down,
    /// Piece #4.
    Left,
}
impl Arm {
    /// Returns the edge piece for this arm.
    pub const fn piece(self) -> PieceId {
        match self {
            Arm::Up => PieceId(2),
            Arm::Right => PieceId(6),
            Arm::Down => PieceId(8),
            Arm::Left => PieceId(4),
        }
    }

    /// Returns the arm on the other side of the center.
    #[must_use]
    pub const fn opposite(self) -> Arm {
        match self {
            Arm::Up => Arm::Down,
            Arm::Right => Arm::Left,
            Arm::Down => Arm::Up,
            Arm::Left => Arm::Right,
        }
    }

    /// Returns whether the arm lies on the vertical line through the center.
    pub const fn is_vertical(self) -> bool {
        matches!(self, Arm::Up | Arm::Down)
    }

    /// Returns the index of this arm in the center's child list.
    pub const fn center_child_index(self) -> usize {
        match self {
            Arm::Up => 0,
            Arm::Right => 1,
            Arm::Down => 2,
            Arm::Left => 3,
        }
    }
}

/// Side of a parent/child link.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Relation {
    /// Link from a piece to the piece that rotates it.
    Parent,
    /// Link from a piece to a piece that it rotates.
    Child,
}
impl Relation {
    /// Returns the maximum number of links of this kind on one piece.
    pub const fn capacity(self) -> usize {
        match self {
            Relation::Parent => MAX_PARENTS,
            Relation::Child => MAX_CHILDREN,
        }
    }
}

/// Node in the piece graph.
///
/// Links are stored as IDs into the owning [`crate::PieceGraph`]. Mutating a
/// link on one piece does not update the piece on the other end; callers must
/// keep both sides consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    id: PieceId,
    /// Rotation offset in degrees from the piece's neutral orientation.
    rotation: f64,
    parents: ParentList,
    children: ChildList,
}
impl Piece {
    /// Constructs a piece with no links and no rotation.
    pub fn new(id: PieceId) -> Self {
        Self {
            id,
            rotation: 0.0,
            parents: SmallVec::new(),
            children: SmallVec::new(),
        }
    }

    /// Returns the piece ID.
    pub fn id(&self) -> PieceId {
        self.id
    }
    /// Returns the rotation offset in degrees.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }
    pub(crate) fn set_rotation(&mut self, rotation: f64) {
        self.rotation = rotation;
    }

    /// Returns the ordered list of parents.
    pub fn parents(&self) -> &[PieceId] {
        &self.parents
    }
    /// Returns the ordered list of children.
    pub fn children(&self) -> &[PieceId] {
        &self.children
    }
    /// Returns the links on one side.
    pub fn links(&self, relation: Relation) -> &[PieceId] {
        match relation {
            Relation::Parent => &self.parents,
            Relation::Child => &self.children,
        }
    }

    /// Returns parent #`i`, if there is one.
    pub fn parent(&self, i: usize) -> Option<PieceId> {
        self.parents.get(i).copied()
    }
    /// Returns child #`i`, if there is one.
    pub fn child(&self, i: usize) -> Option<PieceId> {
        self.children.get(i).copied()
    }
    /// Returns the number of parents.
    pub fn num_parents(&self) -> usize {
        self.parents.len()
    }
    /// Returns the number of children.
    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    /// Returns whether `other` is one of this piece's parents.
    pub fn has_parent(&self, other: PieceId) -> bool {
        self.parents.contains(&other)
    }
    /// Returns whether `other` is one of this piece's children.
    pub fn has_child(&self, other: PieceId) -> bool {
        self.children.contains(&other)
    }

    /// Appends a child.
    pub fn add_child(&mut self, child: PieceId) -> Result<(), TopologyError> {
        self.push_link(Relation::Child, child)
    }
    /// Appends a parent.
    pub fn add_parent(&mut self, parent: PieceId) -> Result<(), TopologyError> {
        self.push_link(Relation::Parent, parent)
    }

    /// Replaces all children. Only used when building the initial topology.
    pub fn set_children(&mut self, children: &[PieceId]) -> Result<(), TopologyError> {
        self.check_capacity(Relation::Child, children.len())?;
        self.children = children.iter().copied().collect();
        Ok(())
    }
    /// Replaces all parents. Only used when building the initial topology.
    pub fn set_parents(&mut self, parents: &[PieceId]) -> Result<(), TopologyError> {
        self.check_capacity(Relation::Parent, parents.len())?;
        self.parents = parents.iter().copied().collect();
        Ok(())
    }

    /// Replaces the first occurrence of `old` in the child list with `new`.
    pub fn switch_child(&mut self, old: PieceId, new: PieceId) -> Result<(), TopologyError> {
        self.switch_link(Relation::Child, old, new)
    }
    /// Replaces the first occurrence of `old` in the parent list with `new`.
    pub fn switch_parent(&mut self, old: PieceId, new: PieceId) -> Result<(), TopologyError> {
        self.switch_link(Relation::Parent, old, new)
    }

    fn push_link(&mut self, relation: Relation, other: PieceId) -> Result<(), TopologyError> {
        self.check_self_link(relation, other)?;
        self.check_capacity(relation, self.links(relation).len() + 1)?;
        match relation {
            Relation::Parent => self.parents.push(other),
            Relation::Child => self.children.push(other),
        }
        Ok(())
    }

    fn switch_link(
        &mut self,
        relation: Relation,
        old: PieceId,
        new: PieceId,
    ) -> Result<(), TopologyError> {
        self.check_self_link(relation, new)?;
        let piece = self.id;
        let links = match relation {
            Relation::Parent => &mut self.parents[..],
            Relation::Child => &mut self.children[..],
        };
        let slot = links
            .iter_mut()
            .find(|link| **link == old)
            .ok_or(TopologyError::NotLinked {
                piece,
                relation,
                other: old,
            })?;
        *slot = new;
        Ok(())
    }

    fn check_capacity(&self, relation: Relation, len: usize) -> Result<(), TopologyError> {
        let max = relation.capacity();
        if len > max {
            return Err(TopologyError::CapacityExceeded {
                piece: self.id,
                relation,
                max,
            });
        }
        Ok(())
    }

    fn check_self_link(&self, relation: Relation, other: PieceId) -> Result<(), TopologyError> {
        if other == self.id {
            return Err(TopologyError::SelfLink {
                piece: self.id,
                relation,
            });
        }
        Ok(())
    }
}
