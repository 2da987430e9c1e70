//! Named rigid-body transforms between coordinate frames.

use approx::AbsDiffEq;
use nalgebra::{Matrix4, Quaternion, UnitQuaternion, Vector3};
use thiserror::Error;

/// Quaternions with a norm below this value are considered degenerate and
/// cannot be normalized into a rotation.
pub const MIN_ROTATION_NORM: f64 = 1e-12;

/// A rigid-body transform from a parent frame to a child frame.
///
/// The translation is the position of the child frame's origin in parent
/// coordinates, and the rotation is the orientation of the child frame
/// relative to the parent frame. The rotation is stored as it was given and
/// is normalized whenever it is converted into a rotation matrix.
///
/// Instances are immutable; operations on them always produce new values.
#[derive(Clone, Debug, PartialEq)]
pub struct RigidTransform {
    parent_frame: String,
    child_frame: String,
    translation: Vector3<f64>,
    rotation: Quaternion<f64>,
}

/// Error produced when a quaternion is too close to zero to represent a
/// rotation.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
#[error("Quaternion with norm {norm:e} cannot be normalized into a rotation")]
pub struct InvalidRotation {
    pub norm: f64,
}

impl RigidTransform {
    /// Creates a transform from `parent_frame` to `child_frame` with the given
    /// translation and rotation.
    ///
    /// # Errors
    /// Returns [`InvalidRotation`] if the norm of `rotation` is below
    /// [`MIN_ROTATION_NORM`] or not finite.
    pub fn from_parts(
        parent_frame: impl Into<String>,
        child_frame: impl Into<String>,
        translation: Vector3<f64>,
        rotation: Quaternion<f64>,
    ) -> Result<Self, InvalidRotation> {
        let norm = quaternion_norm(&rotation);
        if !norm.is_finite() || norm < MIN_ROTATION_NORM {
            return Err(InvalidRotation { norm });
        }
        Ok(Self {
            parent_frame: parent_frame.into(),
            child_frame: child_frame.into(),
            translation,
            rotation,
        })
    }

    /// Creates the identity transform from the given frame to itself.
    pub fn identity(frame: impl Into<String>) -> Self {
        let frame = frame.into();
        Self {
            parent_frame: frame.clone(),
            child_frame: frame,
            translation: Vector3::zeros(),
            rotation: Quaternion::identity(),
        }
    }

    pub fn parent_frame(&self) -> &str {
        &self.parent_frame
    }

    pub fn child_frame(&self) -> &str {
        &self.child_frame
    }

    pub fn translation(&self) -> &Vector3<f64> {
        &self.translation
    }

    /// Returns the rotation quaternion exactly as it was given, which is not
    /// necessarily of unit length.
    pub fn rotation(&self) -> &Quaternion<f64> {
        &self.rotation
    }

    pub fn rotation_norm(&self) -> f64 {
        quaternion_norm(&self.rotation)
    }

    /// Returns the rotation scaled to unit length.
    pub fn rotation_normalized(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::new_normalize(scaled_to_unit_max(&self.rotation).1)
    }

    /// Returns a copy of this transform with the stored rotation replaced by
    /// its normalized version.
    pub fn normalized(&self) -> Self {
        Self {
            rotation: self.rotation_normalized().into_inner(),
            ..self.clone()
        }
    }

    /// Computes the 4x4 homogeneous matrix of the transform.
    ///
    /// The upper-left 3x3 block is the rotation matrix of the normalized
    /// rotation, the upper-right column is the translation and the bottom row
    /// is always `(0, 0, 0, 1)`.
    pub fn to_homogeneous(&self) -> Matrix4<f64> {
        let rotation_matrix = self.rotation_normalized().to_rotation_matrix();

        let mut matrix = Matrix4::identity();
        matrix
            .fixed_view_mut::<3, 3>(0, 0)
            .copy_from(rotation_matrix.matrix());
        matrix
            .fixed_view_mut::<3, 1>(0, 3)
            .copy_from(&self.translation);
        matrix
    }
}

/// Splits the quaternion into its largest absolute component and the
/// quaternion divided by it, so that norms of finite quaternions with huge
/// components do not overflow. Zero and non-finite quaternions are returned
/// unscaled.
fn scaled_to_unit_max(quaternion: &Quaternion<f64>) -> (f64, Quaternion<f64>) {
    let scale = quaternion.coords.amax();
    if scale > 0.0 && scale.is_finite() {
        (scale, Quaternion::from(quaternion.coords / scale))
    } else {
        (1.0, *quaternion)
    }
}

fn quaternion_norm(quaternion: &Quaternion<f64>) -> f64 {
    let (scale, scaled) = scaled_to_unit_max(quaternion);
    scale * scaled.norm()
}

/// Frames must match exactly. Translations are compared component-wise and
/// rotations after normalization, with `q` and `-q` treated as equal.
impl AbsDiffEq for RigidTransform {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        let rotation = self.rotation_normalized().into_inner();
        let other_rotation = other.rotation_normalized().into_inner();

        self.parent_frame == other.parent_frame
            && self.child_frame == other.child_frame
            && self.translation.abs_diff_eq(&other.translation, epsilon)
            && (rotation.abs_diff_eq(&other_rotation, epsilon)
                || rotation.abs_diff_eq(&(-other_rotation), epsilon))
    }
}
