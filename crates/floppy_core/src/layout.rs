use std::ops::Index;

use cgmath::{Point3, Quaternion, Rotation, Vector3, point3};

use crate::{PIECE_COUNT, PieceId, RotationStep};

/// Source of world-space piece positions, owned by the frontend.
pub trait PiecePositions {
    /// Returns the world-space position of the center of a piece.
    fn position(&self, piece: PieceId) -> Point3<f64>;

    /// Returns the vector from `tail` to `head`.
    fn offset(&self, tail: PieceId, head: PieceId) -> Vector3<f64> {
        self.position(head) - self.position(tail)
    }
}

/// Minimal transform store tracking only the position of each piece.
///
/// Frontends with full model matrices should implement [`PiecePositions`]
/// on those instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    positions: [Point3<f64>; PIECE_COUNT],
}
impl Default for Layout {
    /// Returns the solved layout: a 3×3 grid of unit cubes one unit in front
    /// of the camera, with the center slightly above the ground.
    fn default() -> Self {
        const XS: [f64; 3] = [-1.0, 0.0, 1.0];
        const YS: [f64; 3] = [1.2, 0.2, -0.8];
        const Z: f64 = -1.0;
        Self {
            positions: std::array::from_fn(|i| point3(XS[i % 3], YS[i / 3], Z)),
        }
    }
}
impl Index<PieceId> for Layout {
    type Output = Point3<f64>;

    fn index(&self, index: PieceId) -> &Self::Output {
        &self.positions[index.index()]
    }
}
impl PiecePositions for Layout {
    fn position(&self, piece: PieceId) -> Point3<f64> {
        self[piece]
    }
}
impl Layout {
    /// Moves the pieces of a rotation step around the position of its pivot.
    ///
    /// Steps with no axis are skipped.
    pub fn apply_step(&mut self, step: &RotationStep) {
        let Some(rot) = step.quaternion() else {
            return;
        };
        let origin = self[step.pivot];
        for &piece in &step.pieces {
            self.rotate_about(piece, origin, rot);
        }
    }

    /// Rotates the whole puzzle about the center piece.
    pub fn rotate_all(&mut self, rot: Quaternion<f64>) {
        let origin = self[PieceId::CENTER];
        for piece in PieceId::iter() {
            self.rotate_about(piece, origin, rot);
        }
    }

    fn rotate_about(&mut self, piece: PieceId, origin: Point3<f64>, rot: Quaternion<f64>) {
        let pos = &mut self.positions[piece.index()];
        *pos = origin + rot.rotate_vector(*pos - origin);
    }
}
