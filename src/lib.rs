//! Composition of chained rigid-body frame transforms.
//!
//! Two transforms `a: parent -> child` and `b: child -> grandchild` are
//! decoded from structured documents, checked to form a chain and composed
//! into the transform `parent -> grandchild`.

pub mod codec;
pub mod compositor;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod resource;
pub mod rotation;
pub mod transform;

pub use compositor::{
    ChainError, ChainMismatch, FrameField, UnresolvedFrame, compose, compose_chain,
    validate_chain,
};
pub use config::{ComposeConfig, RotationNormPolicy};
pub use error::{PipelineError, TransformRole};
pub use pipeline::Pipeline;
pub use transform::{InvalidRotation, RigidTransform};
