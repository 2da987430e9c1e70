//! Errors from running the composition pipeline.

use crate::{
    codec::DecodeError,
    compositor::{ChainError, ChainMismatch, UnresolvedFrame},
    transform::InvalidRotation,
};
use std::fmt;
use thiserror::Error;

/// Which of the transforms in the pipeline an error concerns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformRole {
    First,
    Second,
    Result,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Could not read {resource} as a transform document")]
    ResourceUnreadable {
        resource: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Missing field `{field}` in {resource}")]
    MissingField { resource: String, field: String },

    #[error("Field `{field}` in {resource} is not a finite number: {raw}")]
    MalformedNumber {
        resource: String,
        field: String,
        raw: String,
    },

    #[error("Field `{field}` in {resource} is not a string frame id")]
    MalformedFrameId { resource: String, field: String },

    #[error("The {role} transform has an invalid rotation (quaternion norm {norm})")]
    InvalidRotation { role: TransformRole, norm: f64 },

    #[error(transparent)]
    UnresolvedFrame(#[from] UnresolvedFrame),

    #[error(transparent)]
    ChainMismatch(#[from] ChainMismatch),

    #[error("Could not write the result to {resource}")]
    ResourceWriteFailure {
        resource: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for TransformRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => write!(f, "first"),
            Self::Second => write!(f, "second"),
            Self::Result => write!(f, "resulting"),
        }
    }
}

impl From<ChainError> for PipelineError {
    fn from(error: ChainError) -> Self {
        match error {
            ChainError::UnresolvedFrame(error) => Self::UnresolvedFrame(error),
            ChainError::Mismatch(error) => Self::ChainMismatch(error),
        }
    }
}

impl PipelineError {
    pub(crate) fn unreadable(
        resource: &str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ResourceUnreadable {
            resource: resource.to_owned(),
            source: source.into(),
        }
    }

    pub(crate) fn from_decode(resource: &str, role: TransformRole, error: DecodeError) -> Self {
        let resource = resource.to_owned();
        match error {
            DecodeError::MissingField { field } => Self::MissingField { resource, field },
            DecodeError::MalformedNumber { field, raw } => Self::MalformedNumber {
                resource,
                field,
                raw,
            },
            DecodeError::MalformedFrameId { field } => Self::MalformedFrameId { resource, field },
            DecodeError::InvalidRotation(InvalidRotation { norm }) => {
                Self::InvalidRotation { role, norm }
            }
        }
    }

    pub(crate) fn write_failure(
        resource: &str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ResourceWriteFailure {
            resource: resource.to_owned(),
            source: source.into(),
        }
    }
}
