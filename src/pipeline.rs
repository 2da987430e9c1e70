//! Loading, composing and storing a chain of two transforms.

use crate::{
    codec::{self, DocumentFormat},
    compositor,
    config::{ComposeConfig, RotationNormPolicy},
    error::{PipelineError, TransformRole},
    resource::ResourceAccess,
    transform::RigidTransform,
};
use framechain_log::{debug, info, warn, with_step_logging, with_timing_info_logging};

/// Runs the steps for composing the transforms in two resources and storing
/// the result in a third.
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    config: ComposeConfig,
}

impl Pipeline {
    pub fn new(config: ComposeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ComposeConfig {
        &self.config
    }

    /// Loads the transforms in `first` and `second`, composes them and writes
    /// the result to `output`. The composed transform is returned.
    ///
    /// # Errors
    /// Returns the error of the first step that fails. Nothing is written to
    /// `output` in that case.
    pub fn run(
        &self,
        resources: &mut impl ResourceAccess,
        first: &str,
        second: &str,
        output: &str,
    ) -> Result<RigidTransform, PipelineError> {
        with_timing_info_logging!("Composing {} with {}", first, second; {
            let first = self.load(&*resources, first, TransformRole::First)?;
            let second = self.load(&*resources, second, TransformRole::Second)?;

            let composed = self.compose(&first, &second)?;

            self.store(resources, &composed, output)?;

            Ok(composed)
        })
    }

    /// Reads and decodes the transform in the given resource and checks its
    /// rotation against the configured norm policy.
    pub fn load(
        &self,
        resources: &impl ResourceAccess,
        resource: &str,
        role: TransformRole,
    ) -> Result<RigidTransform, PipelineError> {
        let transform = with_step_logging!("Loading {} transform from {}", role, resource; {
            let text = resources
                .read_text(resource)
                .map_err(|error| PipelineError::unreadable(resource, error))?;

            let document = codec::parse_document(&text)
                .map_err(|error| PipelineError::unreadable(resource, error))?;

            codec::decode(&document)
                .map_err(|error| PipelineError::from_decode(resource, role, error))?
        });

        info!(
            "Loaded {} transform {:?} -> {:?} from {}",
            role,
            transform.parent_frame(),
            transform.child_frame(),
            resource
        );
        debug!(
            "{} translation: {:?}, rotation (x, y, z, w): {:?}",
            role,
            transform.translation().as_slice(),
            transform.rotation().coords.as_slice()
        );

        self.check_rotation_norm(transform, role)
    }

    /// Validates the chain formed by the two transforms and composes them.
    pub fn compose(
        &self,
        first: &RigidTransform,
        second: &RigidTransform,
    ) -> Result<RigidTransform, PipelineError> {
        compositor::validate_chain(first, second)?;

        let composed = compositor::compose(first, second).map_err(|error| {
            PipelineError::InvalidRotation {
                role: TransformRole::Result,
                norm: error.norm,
            }
        })?;

        info!(
            "Composed transform {:?} -> {:?} with translation {:?}",
            composed.parent_frame(),
            composed.child_frame(),
            composed.translation().as_slice()
        );
        debug!("Composed homogeneous matrix: {}", composed.to_homogeneous());

        Ok(composed)
    }

    /// Encodes the transform and writes it to the given resource.
    pub fn store(
        &self,
        resources: &mut impl ResourceAccess,
        transform: &RigidTransform,
        resource: &str,
    ) -> Result<(), PipelineError> {
        let format = self
            .config
            .output_format
            .unwrap_or_else(|| DocumentFormat::from_path(resource));

        let document = codec::encode(transform);
        debug!(
            "Resulting rotation (x, y, z, w): ({}, {}, {}, {})",
            document.transform.rotation.x,
            document.transform.rotation.y,
            document.transform.rotation.z,
            document.transform.rotation.w
        );

        let text = codec::to_text(&document, format)
            .map_err(|error| PipelineError::write_failure(resource, error))?;

        resources
            .write_text(resource, &text)
            .map_err(|error| PipelineError::write_failure(resource, error))?;

        info!("Wrote {} transform document to {}", format, resource);
        Ok(())
    }

    fn check_rotation_norm(
        &self,
        transform: RigidTransform,
        role: TransformRole,
    ) -> Result<RigidTransform, PipelineError> {
        let norm = transform.rotation_norm();
        if self.config.accepts_rotation_norm(norm) {
            return Ok(transform);
        }
        match self.config.rotation_norm_policy {
            RotationNormPolicy::Reject => Err(PipelineError::InvalidRotation { role, norm }),
            RotationNormPolicy::Renormalize => {
                warn!(
                    "Rotation of {} transform has norm {} and will be normalized",
                    role, norm
                );
                Ok(transform.normalized())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        compositor::{ChainMismatch, FrameField, UnresolvedFrame},
        resource::InMemoryResources,
    };
    use approx::assert_abs_diff_eq;
    use nalgebra::{Quaternion, Vector3};

    const WORLD_TO_ROBOT: &str = "\
header:
  frame_id: world
child_frame_id: robot
transform:
  translation: { x: 1.0, y: 0.0, z: 0.0 }
  rotation: { x: 0.0, y: 0.0, z: 0.0, w: 1.0 }
";

    const ROBOT_TO_SENSOR: &str = "\
header:
  frame_id: robot
child_frame_id: sensor
transform:
  translation: { x: 0.0, y: 0.0, z: 1.0 }
  rotation: { x: 0.0, y: 0.0, z: 0.0, w: 1.0 }
";

    fn resources() -> InMemoryResources {
        InMemoryResources::new()
            .with_text("a.yaml", WORLD_TO_ROBOT)
            .with_text("b.yaml", ROBOT_TO_SENSOR)
    }

    #[test]
    fn running_pipeline_composes_and_stores_chain() {
        let mut resources = resources();

        let composed = Pipeline::default()
            .run(&mut resources, "a.yaml", "b.yaml", "out.yaml")
            .unwrap();

        let expected = RigidTransform::from_parts(
            "world",
            "sensor",
            Vector3::new(1.0, 0.0, 1.0),
            Quaternion::identity(),
        )
        .unwrap();
        assert_abs_diff_eq!(composed, expected, epsilon = 1e-12);

        let stored = codec::decode(&codec::parse_document(resources.get("out.yaml").unwrap()).unwrap())
            .unwrap();
        assert_abs_diff_eq!(stored, expected, epsilon = 1e-12);
    }

    #[test]
    fn running_pipeline_on_reversed_inputs_reports_mismatch() {
        let mut resources = resources();

        let error = Pipeline::default()
            .run(&mut resources, "b.yaml", "a.yaml", "out.yaml")
            .unwrap_err();

        assert!(matches!(
            error,
            PipelineError::ChainMismatch(ChainMismatch { ref child_frame, ref parent_frame })
                if child_frame == "sensor" && parent_frame == "world"
        ));
        assert!(resources.get("out.yaml").is_none());
    }

    #[test]
    fn running_pipeline_on_inputs_without_frame_ids_writes_nothing() {
        let anonymous = "\
transform:
  translation: { x: 1.0, y: 0.0, z: 0.0 }
  rotation: { x: 0.0, y: 0.0, z: 0.0, w: 1.0 }
";
        let mut resources = InMemoryResources::new()
            .with_text("a.yaml", anonymous)
            .with_text("b.yaml", anonymous);

        let error = Pipeline::default()
            .run(&mut resources, "a.yaml", "b.yaml", "out.yaml")
            .unwrap_err();

        assert!(matches!(
            error,
            PipelineError::UnresolvedFrame(UnresolvedFrame {
                role: TransformRole::First,
                field: FrameField::Parent,
            })
        ));
        assert!(resources.get("out.yaml").is_none());
    }

    #[test]
    fn running_pipeline_with_missing_middle_frame_writes_nothing() {
        let second = ROBOT_TO_SENSOR.replace("  frame_id: robot\n", "");
        let mut resources = resources().with_text("b.yaml", second);

        let error = Pipeline::default()
            .run(&mut resources, "a.yaml", "b.yaml", "out.yaml")
            .unwrap_err();

        assert!(matches!(
            error,
            PipelineError::UnresolvedFrame(UnresolvedFrame {
                role: TransformRole::Second,
                field: FrameField::Parent,
            })
        ));
        assert!(resources.get("out.yaml").is_none());
    }

    #[test]
    fn running_pipeline_with_missing_input_reports_unreadable_resource() {
        let mut resources = resources();

        let error = Pipeline::default()
            .run(&mut resources, "a.yaml", "missing.yaml", "out.yaml")
            .unwrap_err();

        assert!(matches!(
            error,
            PipelineError::ResourceUnreadable { ref resource, .. } if resource == "missing.yaml"
        ));
    }

    #[test]
    fn loading_invalid_yaml_reports_unreadable_resource() {
        let resources = InMemoryResources::new().with_text("bad.yaml", "transform: [unclosed");

        let error = Pipeline::default()
            .load(&resources, "bad.yaml", TransformRole::First)
            .unwrap_err();

        assert!(matches!(error, PipelineError::ResourceUnreadable { .. }));
    }

    #[test]
    fn loading_document_without_rotation_reports_missing_field() {
        let text = WORLD_TO_ROBOT.replace("  rotation: { x: 0.0, y: 0.0, z: 0.0, w: 1.0 }\n", "");
        let resources = InMemoryResources::new().with_text("a.yaml", text);

        let error = Pipeline::default()
            .load(&resources, "a.yaml", TransformRole::First)
            .unwrap_err();

        assert!(matches!(
            error,
            PipelineError::MissingField { ref resource, ref field }
                if resource == "a.yaml" && field == "transform.rotation"
        ));
    }

    #[test]
    fn loading_zero_rotation_reports_role() {
        let text = WORLD_TO_ROBOT.replace("w: 1.0", "w: 0.0");
        let resources = InMemoryResources::new().with_text("b.yaml", text);

        let error = Pipeline::default()
            .load(&resources, "b.yaml", TransformRole::Second)
            .unwrap_err();

        assert!(matches!(
            error,
            PipelineError::InvalidRotation { role: TransformRole::Second, .. }
        ));
    }

    #[test]
    fn loading_unnormalized_rotation_is_rejected_by_default() {
        let text = WORLD_TO_ROBOT.replace("w: 1.0", "w: 2.0");
        let resources = InMemoryResources::new().with_text("a.yaml", text);

        let error = Pipeline::default()
            .load(&resources, "a.yaml", TransformRole::First)
            .unwrap_err();

        assert!(matches!(
            error,
            PipelineError::InvalidRotation { role: TransformRole::First, norm } if norm == 2.0
        ));
    }

    #[test]
    fn loading_unnormalized_rotation_with_renormalize_policy_normalizes_it() {
        let text = WORLD_TO_ROBOT.replace("w: 1.0", "w: 2.0");
        let resources = InMemoryResources::new().with_text("a.yaml", text);
        let pipeline = Pipeline::new(ComposeConfig {
            rotation_norm_policy: RotationNormPolicy::Renormalize,
            ..ComposeConfig::default()
        });

        let transform = pipeline
            .load(&resources, "a.yaml", TransformRole::First)
            .unwrap();

        assert_abs_diff_eq!(transform.rotation_norm(), 1.0);
    }

    #[test]
    fn loading_slightly_unnormalized_rotation_within_tolerance_works() {
        let text = WORLD_TO_ROBOT.replace("w: 1.0", "w: 1.0000000001");
        let resources = InMemoryResources::new().with_text("a.yaml", text);

        assert!(
            Pipeline::default()
                .load(&resources, "a.yaml", TransformRole::First)
                .is_ok()
        );
    }

    #[test]
    fn storing_uses_configured_format_over_extension() {
        let mut resources = InMemoryResources::new();
        let pipeline = Pipeline::new(ComposeConfig {
            output_format: Some(DocumentFormat::Json),
            ..ComposeConfig::default()
        });

        pipeline
            .store(&mut resources, &RigidTransform::identity("world"), "out.yaml")
            .unwrap();

        assert!(resources.get("out.yaml").unwrap().trim_start().starts_with('{'));
    }

    #[test]
    fn storing_infers_format_from_extension() {
        let mut resources = InMemoryResources::new();

        Pipeline::default()
            .store(&mut resources, &RigidTransform::identity("world"), "out.json")
            .unwrap();
        Pipeline::default()
            .store(&mut resources, &RigidTransform::identity("world"), "out.yaml")
            .unwrap();

        assert!(resources.get("out.json").unwrap().trim_start().starts_with('{'));
        assert!(resources.get("out.yaml").unwrap().starts_with("child_frame_id: world"));
    }
}
