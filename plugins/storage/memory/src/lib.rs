use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use avro_meta_api::{AttributeStore, ObjectId, StepAttribute, StoreError, StoreFactory};

// ═══════════════════════════════════════════════════════════════
//  MemoryStoreConfig
// ═══════════════════════════════════════════════════════════════

fn default_max_steps() -> usize {
    10_000
}

#[derive(Debug, serde::Deserialize)]
pub struct MemoryStoreConfig {
    /// Upper bound on distinct steps; a save for a new step beyond it fails.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  MemoryAttributeStore
// ═══════════════════════════════════════════════════════════════

#[derive(Default)]
struct StepAttributes {
    transformation: Option<ObjectId>,
    /// `(code, nr) → value`
    values: BTreeMap<(String, usize), String>,
}

/// In-memory attribute store. For tests and one-shot conversions that do
/// not need persistence.
pub struct MemoryAttributeStore {
    steps: RwLock<BTreeMap<ObjectId, StepAttributes>>,
    max_steps: usize,
}

impl Default for MemoryAttributeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAttributeStore {
    pub fn new() -> Self {
        Self::with_max_steps(default_max_steps())
    }

    pub fn with_max_steps(max_steps: usize) -> Self {
        Self {
            steps: RwLock::new(BTreeMap::new()),
            max_steps,
        }
    }

    /// Transformation the step was last saved under.
    pub fn owner(&self, step: &ObjectId) -> Result<Option<ObjectId>, StoreError> {
        let steps = self.steps.read().map_err(|_| poisoned())?;
        Ok(steps.get(step).and_then(|s| s.transformation.clone()))
    }

    fn check_capacity(
        &self,
        steps: &BTreeMap<ObjectId, StepAttributes>,
        step: &ObjectId,
    ) -> Result<(), StoreError> {
        if !steps.contains_key(step) && steps.len() >= self.max_steps {
            return Err(StoreError::new(format!(
                "memory store full ({} steps), cannot add step '{step}'",
                self.max_steps
            )));
        }
        Ok(())
    }
}

fn poisoned() -> StoreError {
    StoreError::new("memory store lock poisoned")
}

impl AttributeStore for MemoryAttributeStore {
    fn save_step_attribute(
        &self,
        transformation: &ObjectId,
        step: &ObjectId,
        nr: usize,
        code: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        let mut steps = self.steps.write().map_err(|_| poisoned())?;
        self.check_capacity(&steps, step)?;
        let entry = steps.entry(step.clone()).or_default();
        entry.transformation = Some(transformation.clone());
        entry.values.insert((code.to_string(), nr), value.to_string());
        Ok(())
    }

    fn step_attribute(
        &self,
        step: &ObjectId,
        nr: usize,
        code: &str,
    ) -> Result<Option<String>, StoreError> {
        let steps = self.steps.read().map_err(|_| poisoned())?;
        Ok(steps
            .get(step)
            .and_then(|s| s.values.get(&(code.to_string(), nr)))
            .cloned())
    }

    fn count_step_attributes(&self, step: &ObjectId, code: &str) -> Result<usize, StoreError> {
        let steps = self.steps.read().map_err(|_| poisoned())?;
        Ok(steps
            .get(step)
            .map(|s| s.values.keys().filter(|(c, _)| c == code).count())
            .unwrap_or(0))
    }

    fn delete_step_attributes(&self, step: &ObjectId) -> Result<(), StoreError> {
        let mut steps = self.steps.write().map_err(|_| poisoned())?;
        if steps.remove(step).is_some() {
            tracing::trace!(step = %step, "dropped step attributes");
        }
        Ok(())
    }

    /// Swaps the step under one write lock.
    fn replace_step_attributes(
        &self,
        transformation: &ObjectId,
        step: &ObjectId,
        attributes: &[StepAttribute],
    ) -> Result<(), StoreError> {
        let values = attributes
            .iter()
            .map(|a| ((a.code.clone(), a.nr), a.value.clone()))
            .collect();
        let mut steps = self.steps.write().map_err(|_| poisoned())?;
        self.check_capacity(&steps, step)?;
        steps.insert(
            step.clone(),
            StepAttributes { transformation: Some(transformation.clone()), values },
        );
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════
//  MemoryStoreFactory
// ═══════════════════════════════════════════════════════════════

pub struct MemoryStoreFactory;

impl StoreFactory for MemoryStoreFactory {
    fn create(&self, config_json: &str) -> Result<Arc<dyn AttributeStore>, StoreError> {
        let config: MemoryStoreConfig = if config_json.trim().is_empty() || config_json == "{}" {
            MemoryStoreConfig::default()
        } else {
            serde_json::from_str(config_json)?
        };
        Ok(Arc::new(MemoryAttributeStore::with_max_steps(config.max_steps)))
    }
}
