use std::collections::HashSet;

use crate::meta::AvroInputMeta;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// One finding of `AvroInputMeta::check()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRemark {
    pub severity: Severity,
    /// Index into `fields`, when the remark is about a single field.
    pub field: Option<usize>,
    pub message: String,
}

impl CheckRemark {
    fn error(field: Option<usize>, message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, field, message: message.into() }
    }

    fn warning(field: Option<usize>, message: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, field, message: message.into() }
    }
}

impl std::fmt::Display for CheckRemark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        match self.field {
            Some(i) => write!(f, "{level}: field #{i}: {}", self.message),
            None => write!(f, "{level}: {}", self.message),
        }
    }
}

pub(crate) fn check(meta: &AvroInputMeta) -> Vec<CheckRemark> {
    let mut remarks = Vec::new();

    if meta.use_field_as_input_stream {
        if meta.input_stream_field_name.trim().is_empty() {
            remarks.push(CheckRemark::error(None, "input stream field name is not set"));
        }
    } else if meta.file_locations.file_name.iter().all(|f| f.trim().is_empty())
        && meta.filename.trim().is_empty()
    {
        remarks.push(CheckRemark::error(None, "no input file specified"));
    }

    if meta.fields.is_empty() {
        remarks.push(CheckRemark::warning(None, "no output fields defined"));
    }

    let mut seen = HashSet::new();
    for (i, field) in meta.fields.iter().enumerate() {
        if field.target_field_name.is_empty() {
            remarks.push(CheckRemark::error(Some(i), "output field name is empty"));
        } else if !seen.insert(field.target_field_name.as_str()) {
            remarks.push(CheckRemark::error(
                Some(i),
                format!("duplicate output field name '{}'", field.target_field_name),
            ));
        }
        if field.source_field_name.is_empty() {
            remarks.push(CheckRemark::error(Some(i), "avro path is empty"));
        }
        if !field.nullable && !field.default_value.is_empty() {
            remarks.push(CheckRemark::warning(
                Some(i),
                "default value is ignored for a non-nullable field",
            ));
        }
    }

    remarks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AvroType;
    use crate::field::FieldDescriptor;

    fn valid() -> AvroInputMeta {
        let mut meta = AvroInputMeta::new();
        meta.filename = "/in/a.avro".into();
        meta.fields = vec![
            FieldDescriptor::new("a", "a", AvroType::String),
            FieldDescriptor::new("b", "b", AvroType::Int),
        ];
        meta
    }

    #[test]
    fn valid_step_has_no_remarks() {
        assert!(valid().check().is_empty());
    }

    #[test]
    fn reports_field_problems_by_index() {
        let mut meta = valid();
        meta.fields.push(FieldDescriptor::new("", "a", AvroType::Long));
        meta.fields.push(FieldDescriptor::new("d", "", AvroType::Long));

        let remarks = meta.check();
        assert_eq!(remarks.len(), 3);
        assert!(remarks.iter().all(|r| r.severity == Severity::Error));
        assert_eq!(remarks[0].field, Some(2));
        assert!(remarks[0].message.contains("duplicate"));
        assert_eq!(remarks[1].to_string(), "error: field #2: avro path is empty");
        assert_eq!(remarks[2].field, Some(3));
    }

    #[test]
    fn stream_mode_needs_a_field_name() {
        let mut meta = valid();
        meta.use_field_as_input_stream = true;
        let remarks = meta.check();
        assert_eq!(remarks.len(), 1);
        assert_eq!(remarks[0].to_string(), "error: input stream field name is not set");
    }

    #[test]
    fn file_mode_needs_a_file() {
        let mut meta = valid();
        meta.filename.clear();
        assert_eq!(meta.check()[0].message, "no input file specified");

        meta.file_locations.file_name = vec!["/in".into()];
        assert!(meta.check().is_empty());
    }
}
