//! Validation and composition of chained transforms.

use crate::{
    error::TransformRole,
    rotation::quaternion_from_rotation_matrix,
    transform::{InvalidRotation, RigidTransform},
};
use nalgebra::Vector3;
use std::fmt;
use thiserror::Error;

/// Error produced when the child frame of the first transform is not the
/// parent frame of the second.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error(
    "Cannot chain transforms: child frame `{child_frame}` of the first transform \
     differs from parent frame `{parent_frame}` of the second"
)]
pub struct ChainMismatch {
    pub child_frame: String,
    pub parent_frame: String,
}

/// The frame of a transform that an [`UnresolvedFrame`] error concerns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameField {
    Parent,
    Child,
}

/// Error produced when a transform to be composed lacks one of its frame ids.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Cannot chain transforms: the {role} transform has no {field} frame id")]
pub struct UnresolvedFrame {
    pub role: TransformRole,
    pub field: FrameField,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error(transparent)]
    UnresolvedFrame(#[from] UnresolvedFrame),

    #[error(transparent)]
    Mismatch(#[from] ChainMismatch),
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum CompositionError {
    #[error(transparent)]
    UnresolvedFrame(#[from] UnresolvedFrame),

    #[error(transparent)]
    ChainMismatch(#[from] ChainMismatch),

    #[error("Composed transform has a degenerate rotation")]
    InvalidRotation(#[from] InvalidRotation),
}

impl fmt::Display for FrameField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parent => write!(f, "parent"),
            Self::Child => write!(f, "child"),
        }
    }
}

impl From<ChainError> for CompositionError {
    fn from(error: ChainError) -> Self {
        match error {
            ChainError::UnresolvedFrame(error) => Self::UnresolvedFrame(error),
            ChainError::Mismatch(error) => Self::ChainMismatch(error),
        }
    }
}

/// Checks that `second` continues the chain started by `first`, meaning that
/// all four frame ids are present and the child frame of `first` is exactly
/// the parent frame of `second`.
///
/// # Errors
/// Returns [`ChainError::UnresolvedFrame`] for the first empty frame id found
/// (in the order parent and child of `first`, then of `second`), and
/// [`ChainError::Mismatch`] if the two middle frames differ.
pub fn validate_chain(first: &RigidTransform, second: &RigidTransform) -> Result<(), ChainError> {
    require_resolved_frames(first, TransformRole::First)?;
    require_resolved_frames(second, TransformRole::Second)?;

    if first.child_frame() == second.parent_frame() {
        Ok(())
    } else {
        Err(ChainMismatch {
            child_frame: first.child_frame().to_owned(),
            parent_frame: second.parent_frame().to_owned(),
        }
        .into())
    }
}

fn require_resolved_frames(
    transform: &RigidTransform,
    role: TransformRole,
) -> Result<(), UnresolvedFrame> {
    if transform.parent_frame().is_empty() {
        Err(UnresolvedFrame {
            role,
            field: FrameField::Parent,
        })
    } else if transform.child_frame().is_empty() {
        Err(UnresolvedFrame {
            role,
            field: FrameField::Child,
        })
    } else {
        Ok(())
    }
}

/// Composes the two transforms into the transform from the parent frame of
/// `first` to the child frame of `second`.
///
/// The homogeneous matrix of the result is the product of the matrices of
/// `first` and `second`, in that order. The chain is not checked here, so
/// [`validate_chain`] must have succeeded for the two transforms (or use
/// [`compose_chain`]).
///
/// # Errors
/// Returns [`InvalidRotation`] if the rotation block of the product does not
/// yield a normalizable quaternion.
pub fn compose(
    first: &RigidTransform,
    second: &RigidTransform,
) -> Result<RigidTransform, InvalidRotation> {
    let matrix = first.to_homogeneous() * second.to_homogeneous();

    let translation: Vector3<f64> = matrix.fixed_view::<3, 1>(0, 3).into_owned();
    let rotation =
        quaternion_from_rotation_matrix(&matrix.fixed_view::<3, 3>(0, 0).into_owned());

    let composed = RigidTransform::from_parts(
        first.parent_frame(),
        second.child_frame(),
        translation,
        rotation,
    )?;

    Ok(composed.normalized())
}

/// Validates the chain and composes the two transforms.
pub fn compose_chain(
    first: &RigidTransform,
    second: &RigidTransform,
) -> Result<RigidTransform, CompositionError> {
    validate_chain(first, second)?;
    Ok(compose(first, second)?)
}
