use std::sync::Arc;

use crate::error::StoreError;
use crate::id::ObjectId;

/// One attribute of a whole-step write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepAttribute {
    pub nr: usize,
    pub code: String,
    pub value: String,
}

impl StepAttribute {
    pub fn new(nr: usize, code: impl Into<String>, value: impl Into<String>) -> Self {
        Self { nr, code: code.into(), value: value.into() }
    }
}

/// Repository attribute store port.
///
/// Attributes are strings addressed by `(step, nr, code)`. Scalar values live
/// at `nr = 0`; multi-row values use `nr` as the row index. The transformation
/// id is recorded on write only: reads are scoped by step id, which is unique
/// across the repository.
///
/// Calls are blocking. Implementations must not retry internally.
pub trait AttributeStore: Send + Sync {
    /// Write (or overwrite) one attribute.
    fn save_step_attribute(
        &self,
        transformation: &ObjectId,
        step: &ObjectId,
        nr: usize,
        code: &str,
        value: &str,
    ) -> Result<(), StoreError>;

    /// Read one attribute. `Ok(None)` means the attribute was never written,
    /// which is distinct from an empty value.
    fn step_attribute(
        &self,
        step: &ObjectId,
        nr: usize,
        code: &str,
    ) -> Result<Option<String>, StoreError>;

    /// Number of rows stored under `code` for the step.
    fn count_step_attributes(&self, step: &ObjectId, code: &str) -> Result<usize, StoreError>;

    /// Drop every attribute of the step.
    fn delete_step_attributes(&self, step: &ObjectId) -> Result<(), StoreError>;

    /// Replace everything stored for the step with `attributes`.
    ///
    /// The default deletes and then writes row by row, so a failure part way
    /// leaves a partial step behind. Stores that can swap a step in one
    /// operation override it.
    fn replace_step_attributes(
        &self,
        transformation: &ObjectId,
        step: &ObjectId,
        attributes: &[StepAttribute],
    ) -> Result<(), StoreError> {
        self.delete_step_attributes(step)?;
        for attr in attributes {
            self.save_step_attribute(transformation, step, attr.nr, &attr.code, &attr.value)?;
        }
        Ok(())
    }
}

/// Builds a store from its JSON configuration.
pub trait StoreFactory: Send + Sync {
    fn create(&self, config_json: &str) -> Result<Arc<dyn AttributeStore>, StoreError>;
}
