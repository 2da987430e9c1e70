//! Conversion between [`RigidTransform`]s and structured transform documents.
//!
//! Documents follow this layout, where both frame ids are optional but must be
//! strings when present:
//!
//! ```yaml
//! child_frame_id: sensor
//! header:
//!   frame_id: robot
//! transform:
//!   translation: { x: 0.0, y: 0.0, z: 1.0 }
//!   rotation: { x: 0.0, y: 0.0, z: 0.0, w: 1.0 }
//! ```
//!
//! Decoding only checks that the document can be interpreted as a transform.
//! Whether two transforms connect is decided by the
//! [`compositor`](crate::compositor).

use crate::transform::{InvalidRotation, RigidTransform};
use nalgebra::{Quaternion, Vector3};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::{fmt, path::Path};
use thiserror::Error;

/// Serializable form of a transform document.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TransformDocument {
    pub child_frame_id: String,
    pub header: HeaderSection,
    pub transform: TransformSection,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HeaderSection {
    pub frame_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TransformSection {
    pub translation: TranslationSection,
    pub rotation: RotationSection,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TranslationSection {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RotationSection {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

/// Text format of a transform document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentFormat {
    #[default]
    Yaml,
    Json,
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("Missing field `{field}`")]
    MissingField { field: String },

    #[error("Field `{field}` is not a finite number: {raw}")]
    MalformedNumber { field: String, raw: String },

    #[error("Field `{field}` is not a string frame id")]
    MalformedFrameId { field: String },

    #[error(transparent)]
    InvalidRotation(#[from] InvalidRotation),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Could not render transform document as YAML")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Could not render transform document as JSON")]
    Json(#[from] serde_json::Error),
}

const CHILD_FRAME_ID: &str = "child_frame_id";
const HEADER: &str = "header";
const FRAME_ID: &str = "frame_id";
const TRANSFORM: &str = "transform";
const TRANSLATION: &str = "translation";
const ROTATION: &str = "rotation";

impl DocumentFormat {
    /// Picks the format from the extension of the given path: `.json` means
    /// JSON and anything else YAML.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => write!(f, "YAML"),
            Self::Json => write!(f, "JSON"),
        }
    }
}

/// Parses text into a structured document. JSON is accepted as well, since
/// it is a subset of YAML.
pub fn parse_document(text: &str) -> Result<Value, serde_yaml::Error> {
    serde_yaml::from_str(text)
}

/// Interprets a structured document as a [`RigidTransform`].
///
/// # Errors
/// See [`DecodeError`]. A key holding an explicit null counts as missing.
pub fn decode(document: &Value) -> Result<RigidTransform, DecodeError> {
    let child_frame = decode_frame_id(document.get(CHILD_FRAME_ID), CHILD_FRAME_ID)?;
    let parent_frame = decode_frame_id(
        document.get(HEADER).and_then(|header| header.get(FRAME_ID)),
        "header.frame_id",
    )?;

    let transform = required(document.get(TRANSFORM), TRANSFORM)?;

    let translation = required(transform.get(TRANSLATION), "transform.translation")?;
    let translation = Vector3::new(
        decode_component(translation, "transform.translation", "x")?,
        decode_component(translation, "transform.translation", "y")?,
        decode_component(translation, "transform.translation", "z")?,
    );

    let rotation = required(transform.get(ROTATION), "transform.rotation")?;
    let rotation = Quaternion::new(
        decode_component(rotation, "transform.rotation", "w")?,
        decode_component(rotation, "transform.rotation", "x")?,
        decode_component(rotation, "transform.rotation", "y")?,
        decode_component(rotation, "transform.rotation", "z")?,
    );

    Ok(RigidTransform::from_parts(
        parent_frame,
        child_frame,
        translation,
        rotation,
    )?)
}

/// Creates the document for the given transform. The rotation is always
/// written in normalized form.
pub fn encode(transform: &RigidTransform) -> TransformDocument {
    let translation = transform.translation();
    let rotation = transform.rotation_normalized();

    TransformDocument {
        child_frame_id: transform.child_frame().to_owned(),
        header: HeaderSection {
            frame_id: transform.parent_frame().to_owned(),
        },
        transform: TransformSection {
            translation: TranslationSection {
                x: translation.x,
                y: translation.y,
                z: translation.z,
            },
            rotation: RotationSection {
                x: rotation.i,
                y: rotation.j,
                z: rotation.k,
                w: rotation.w,
            },
        },
    }
}

/// Renders the document as text in the given format.
pub fn to_text(document: &TransformDocument, format: DocumentFormat) -> Result<String, RenderError> {
    Ok(match format {
        DocumentFormat::Yaml => serde_yaml::to_string(document)?,
        DocumentFormat::Json => {
            let mut text = serde_json::to_string_pretty(document)?;
            text.push('\n');
            text
        }
    })
}

fn required<'a>(value: Option<&'a Value>, field: &str) -> Result<&'a Value, DecodeError> {
    match value {
        None | Some(Value::Null) => Err(DecodeError::MissingField {
            field: field.to_owned(),
        }),
        Some(value) => Ok(value),
    }
}

fn decode_component(section: &Value, section_path: &str, key: &str) -> Result<f64, DecodeError> {
    let field = format!("{section_path}.{key}");
    let value = required(section.get(key), &field)?;

    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    match number {
        Some(number) if number.is_finite() => Ok(number),
        _ => Err(DecodeError::MalformedNumber {
            field,
            raw: describe_value(value),
        }),
    }
}

fn decode_frame_id(value: Option<&Value>, field: &str) -> Result<String, DecodeError> {
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(id)) => Ok(id.clone()),
        Some(_) => Err(DecodeError::MalformedFrameId {
            field: field.to_owned(),
        }),
    }
}

fn describe_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_owned(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => format!("{text:?}"),
        Value::Sequence(_) => "<sequence>".to_owned(),
        Value::Mapping(_) => "<mapping>".to_owned(),
        Value::Tagged(tagged) => format!("<tagged {}>", tagged.tag),
    }
}
