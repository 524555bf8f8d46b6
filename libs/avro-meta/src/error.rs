use avro_meta_api::{ObjectId, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum MetaError {
    /// Type code or name outside the closed catalog.
    #[error("unknown {catalog} type {value:?}{}", at_suffix(.at))]
    UnknownType { catalog: &'static str, value: String, at: Option<String> },

    #[error("malformed configuration: {0}")]
    MalformedConfig(String),

    #[error("repository read failed (step '{step}', attribute '{code}' #{nr}): {detail}")]
    RepositoryRead { step: ObjectId, code: String, nr: usize, detail: String },

    #[error("repository write failed (step '{step}', attribute '{code}' #{nr}): {detail}")]
    RepositoryWrite { step: ObjectId, code: String, nr: usize, detail: String },

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("avro schema: {0}")]
    Schema(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl MetaError {
    pub(crate) fn unknown_type(catalog: &'static str, value: impl ToString) -> Self {
        MetaError::UnknownType { catalog, value: value.to_string(), at: None }
    }

    pub(crate) fn read(step: &ObjectId, code: &str, nr: usize, detail: impl Into<String>) -> Self {
        MetaError::RepositoryRead {
            step: step.clone(),
            code: code.to_string(),
            nr,
            detail: detail.into(),
        }
    }

    pub(crate) fn read_store(step: &ObjectId, code: &str, nr: usize, e: StoreError) -> Self {
        Self::read(step, code, nr, e.to_string())
    }

    pub(crate) fn write_store(step: &ObjectId, code: &str, nr: usize, e: StoreError) -> Self {
        MetaError::RepositoryWrite {
            step: step.clone(),
            code: code.to_string(),
            nr,
            detail: e.to_string(),
        }
    }

    /// Add context to the error.
    ///
    /// Message-carrying variants get the context prepended; structured
    /// variants already name their location and are returned unchanged.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            MetaError::MalformedConfig(msg) => MetaError::MalformedConfig(format!("{ctx}: {msg}")),
            MetaError::Schema(msg) => MetaError::Schema(format!("{ctx}: {msg}")),
            MetaError::Config(msg) => MetaError::Config(format!("{ctx}: {msg}")),
            MetaError::UnknownType { catalog, value, at } => MetaError::UnknownType {
                catalog,
                value,
                at: Some(match at {
                    Some(inner) => format!("{ctx}: {inner}"),
                    None => ctx.to_string(),
                }),
            },
            other => other,
        }
    }
}

fn at_suffix(at: &Option<String>) -> String {
    at.as_ref().map(|a| format!(" at {a}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_type_reports_location_after_context() {
        let err = MetaError::unknown_type("avro", "notatype").with_context("field #2");
        assert_eq!(err.to_string(), r#"unknown avro type "notatype" at field #2"#);
    }

    #[test]
    fn repository_errors_name_step_attribute_and_row() {
        let err = MetaError::read(&ObjectId::new("s1"), "path", 2, "attribute missing");
        assert_eq!(
            err.to_string(),
            "repository read failed (step 's1', attribute 'path' #2): attribute missing"
        );
    }
}
