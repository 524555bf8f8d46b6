use crate::catalog::{AvroType, ValueType};

/// One Avro field → output field mapping.
///
/// - `source_field_name`: path inside the Avro schema. Nested records use
///   dots (`order.customer.id`), arrays an index suffix (`items[0].sku`).
/// - `target_field_name`: name exposed downstream.
/// - `default_value`: used when the value is null; only meaningful for
///   nullable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub source_field_name: String,
    pub target_field_name: String,
    pub avro_type: AvroType,
    pub value_type: ValueType,
    pub nullable: bool,
    pub default_value: String,
}

impl FieldDescriptor {
    /// Nullable field without default, value type derived from the Avro type.
    pub fn new(
        source_field_name: impl Into<String>,
        target_field_name: impl Into<String>,
        avro_type: AvroType,
    ) -> Self {
        Self {
            source_field_name: source_field_name.into(),
            target_field_name: target_field_name.into(),
            avro_type,
            value_type: avro_type.default_value_type(),
            nullable: true,
            default_value: String::new(),
        }
    }

    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = default_value.into();
        self
    }

    /// Both names set.
    pub fn is_complete(&self) -> bool {
        !self.source_field_name.is_empty() && !self.target_field_name.is_empty()
    }

    /// Value type to convert into: the explicit one, or the Avro default.
    pub fn effective_value_type(&self) -> ValueType {
        match self.value_type {
            ValueType::None => self.avro_type.default_value_type(),
            other => other,
        }
    }
}
