use cgmath::{Deg, InnerSpace, Point2, Rad, Vector3, vec3};
use serde::{Deserialize, Serialize};

/// Cursor motion over an arcball centered on the pivot of a rotation group.
///
/// Screen coordinates have the Y axis pointing down. The resulting sphere
/// vectors are in eye space, with Y up and Z toward the viewer.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct ArcballDrag {
    /// Screen-space center of the arcball.
    pub center: Point2<f32>,
    /// Screen-space radius of the arcball.
    pub radius: f32,
    /// Cursor position at the previous frame.
    pub from: Point2<f32>,
    /// Cursor position at the current frame.
    pub to: Point2<f32>,
}
impl ArcballDrag {
    /// Projects a screen-space cursor position onto the arcball sphere.
    /// Points outside the ball land on its silhouette.
    fn sphere_vector(&self, cursor: Point2<f32>) -> Option<Vector3<f64>> {
        let x = f64::from(cursor.x - self.center.x);
        let y = f64::from(self.center.y - cursor.y);
        let r = f64::from(self.radius);
        let z = (r * r - x * x - y * y).max(0.0).sqrt();
        let v = vec3(x, y, z);
        (v.magnitude2() > 0.0).then(|| v.normalize())
    }

    /// Returns the angle in degrees that this drag rotates around `axis`.
    ///
    /// The magnitude is the full arc between the two sphere vectors and the
    /// sign is the direction of their rotation projected onto `axis`. Returns
    /// `None` if the rotation has no component along `axis`, including when
    /// the cursor did not move.
    pub fn signed_angle(&self, axis: Vector3<f64>) -> Option<f64> {
        let start = self.sphere_vector(self.from)?;
        let end = self.sphere_vector(self.to)?;

        let along_axis = start.cross(end).dot(axis);
        if along_axis == 0.0 || !along_axis.is_finite() {
            return None;
        }

        let Deg(angle) = Rad(start.dot(end).clamp(-1.0, 1.0).acos()).into();
        Some(if along_axis < 0.0 { -angle } else { angle })
    }
}
