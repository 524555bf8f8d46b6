use std::collections::HashSet;
use std::path::Path;

use apache_avro::Schema;

use crate::catalog::AvroType;
use crate::error::MetaError;
use crate::field::FieldDescriptor;

/// Field list for every leaf of an Avro record schema.
///
/// Nested records flatten to dotted paths; `["null", T]` unions become
/// nullable fields of `T`. Arrays, maps and multi-type unions have no single
/// field type and are skipped.
pub fn fields_from_schema(schema: &Schema) -> Result<Vec<FieldDescriptor>, MetaError> {
    let Schema::Record(record) = schema else {
        return Err(MetaError::Schema("top-level schema is not a record".into()));
    };

    let mut out = Vec::new();
    for field in &record.fields {
        visit(&field.name, &field.schema, false, &mut out);
    }
    dedup_target_names(&mut out);
    Ok(out)
}

pub fn fields_from_schema_str(json: &str) -> Result<Vec<FieldDescriptor>, MetaError> {
    let schema = Schema::parse_str(json).map_err(|e| MetaError::Schema(e.to_string()))?;
    fields_from_schema(&schema)
}

pub fn fields_from_schema_file(path: impl AsRef<Path>) -> Result<Vec<FieldDescriptor>, MetaError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .map_err(|e| MetaError::Schema(format!("failed to read '{}': {e}", path.display())))?;
    fields_from_schema_str(&json).map_err(|e| e.with_context(path.display()))
}

fn visit(path: &str, schema: &Schema, nullable: bool, out: &mut Vec<FieldDescriptor>) {
    match schema {
        Schema::Record(record) => {
            for field in &record.fields {
                visit(&format!("{path}.{}", field.name), &field.schema, nullable, out);
            }
        }
        Schema::Union(union) => {
            let variants = union.variants();
            let non_null: Vec<&Schema> = variants
                .iter()
                .filter(|v| !matches!(v, Schema::Null))
                .collect();
            if non_null.len() == 1 {
                let has_null = non_null.len() < variants.len();
                visit(path, non_null[0], nullable || has_null, out);
            } else {
                tracing::debug!(path, variants = variants.len(), "skipping multi-type union");
            }
        }
        other => match scalar_type(other) {
            Some(avro_type) => {
                let name = path.rsplit('.').next().unwrap_or(path);
                out.push(FieldDescriptor::new(path, name, avro_type).with_nullable(nullable));
            }
            None => tracing::debug!(path, "skipping field without a scalar avro type"),
        },
    }
}

fn scalar_type(schema: &Schema) -> Option<AvroType> {
    match schema {
        Schema::Boolean => Some(AvroType::Boolean),
        Schema::Int | Schema::TimeMillis => Some(AvroType::Int),
        Schema::Long | Schema::TimeMicros => Some(AvroType::Long),
        Schema::Float => Some(AvroType::Float),
        Schema::Double => Some(AvroType::Double),
        Schema::Bytes => Some(AvroType::Bytes),
        Schema::Fixed(_) => Some(AvroType::Fixed),
        Schema::String | Schema::Enum(_) | Schema::Uuid => Some(AvroType::String),
        Schema::Decimal(_) | Schema::BigDecimal => Some(AvroType::Decimal),
        Schema::Date => Some(AvroType::Date),
        Schema::TimestampMillis
        | Schema::TimestampMicros
        | Schema::TimestampNanos
        | Schema::LocalTimestampMillis
        | Schema::LocalTimestampMicros
        | Schema::LocalTimestampNanos => Some(AvroType::TimestampMillis),
        _ => None,
    }
}

/// Leaf names collide for `a.id` / `b.id`; later ones fall back to the
/// full path with `_` separators.
fn dedup_target_names(fields: &mut [FieldDescriptor]) {
    let mut seen = HashSet::new();
    for field in fields.iter_mut() {
        if !seen.insert(field.target_field_name.clone()) {
            field.target_field_name = field.source_field_name.replace('.', "_");
            seen.insert(field.target_field_name.clone());
        }
    }
}
