use crate::error::MetaError;

// ════════════════════════════════════════════════════════════════
//  Avro Type
// ════════════════════════════════════════════════════════════════

/// Avro types a field of the input step can be read as.
///
/// Closed set. The repository persists `code()`, markup persists `name()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AvroType {
    String,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    Fixed,
    /// Logical `decimal` over bytes/fixed.
    Decimal,
    /// Logical `date` (days from epoch).
    Date,
    /// Logical `timestamp-millis`.
    TimestampMillis,
}

impl AvroType {
    pub const ALL: [AvroType; 11] = [
        AvroType::String,
        AvroType::Boolean,
        AvroType::Int,
        AvroType::Long,
        AvroType::Float,
        AvroType::Double,
        AvroType::Bytes,
        AvroType::Fixed,
        AvroType::Decimal,
        AvroType::Date,
        AvroType::TimestampMillis,
    ];

    pub fn code(self) -> i64 {
        match self {
            AvroType::String => 0,
            AvroType::Boolean => 1,
            AvroType::Int => 2,
            AvroType::Long => 3,
            AvroType::Float => 4,
            AvroType::Double => 5,
            AvroType::Bytes => 6,
            AvroType::Fixed => 7,
            AvroType::Decimal => 8,
            AvroType::Date => 9,
            AvroType::TimestampMillis => 10,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AvroType::String => "string",
            AvroType::Boolean => "boolean",
            AvroType::Int => "int",
            AvroType::Long => "long",
            AvroType::Float => "float",
            AvroType::Double => "double",
            AvroType::Bytes => "bytes",
            AvroType::Fixed => "fixed",
            AvroType::Decimal => "decimal",
            AvroType::Date => "date",
            AvroType::TimestampMillis => "timestamp-millis",
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Exact lower-case name; surrounding whitespace is ignored.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Downstream value type a field of this Avro type is converted into
    /// when the caller does not choose one.
    pub fn default_value_type(self) -> ValueType {
        match self {
            AvroType::String => ValueType::String,
            AvroType::Boolean => ValueType::Boolean,
            AvroType::Int | AvroType::Long => ValueType::Integer,
            AvroType::Float | AvroType::Double => ValueType::Number,
            AvroType::Bytes | AvroType::Fixed => ValueType::Binary,
            AvroType::Decimal => ValueType::BigNumber,
            AvroType::Date => ValueType::Date,
            AvroType::TimestampMillis => ValueType::Timestamp,
        }
    }
}

impl std::fmt::Display for AvroType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ════════════════════════════════════════════════════════════════
//  Value Type
// ════════════════════════════════════════════════════════════════

/// Downstream value type of an output field (persisted as `sourcetype`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValueType {
    /// Not set; the consumer falls back to the Avro type's default.
    #[default]
    None,
    Number,
    String,
    Date,
    Boolean,
    Integer,
    BigNumber,
    Binary,
    Timestamp,
}

impl ValueType {
    pub const ALL: [ValueType; 9] = [
        ValueType::None,
        ValueType::Number,
        ValueType::String,
        ValueType::Date,
        ValueType::Boolean,
        ValueType::Integer,
        ValueType::BigNumber,
        ValueType::Binary,
        ValueType::Timestamp,
    ];

    // 7 is reserved for serialized objects, which this step never produces.
    pub fn code(self) -> i64 {
        match self {
            ValueType::None => 0,
            ValueType::Number => 1,
            ValueType::String => 2,
            ValueType::Date => 3,
            ValueType::Boolean => 4,
            ValueType::Integer => 5,
            ValueType::BigNumber => 6,
            ValueType::Binary => 8,
            ValueType::Timestamp => 9,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueType::None => "none",
            ValueType::Number => "number",
            ValueType::String => "string",
            ValueType::Date => "date",
            ValueType::Boolean => "boolean",
            ValueType::Integer => "integer",
            ValueType::BigNumber => "bignumber",
            ValueType::Binary => "binary",
            ValueType::Timestamp => "timestamp",
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ════════════════════════════════════════════════════════════════
//  Lookups
// ════════════════════════════════════════════════════════════════

pub fn code_of(name: &str) -> Result<i64, MetaError> {
    AvroType::from_name(name)
        .map(AvroType::code)
        .ok_or_else(|| MetaError::unknown_type("avro", name))
}

pub fn name_of(code: i64) -> Result<&'static str, MetaError> {
    AvroType::from_code(code)
        .map(AvroType::name)
        .ok_or_else(|| MetaError::unknown_type("avro", code))
}

pub(crate) fn avro_type_by_name(name: &str) -> Result<AvroType, MetaError> {
    AvroType::from_name(name).ok_or_else(|| MetaError::unknown_type("avro", name))
}

/// Repository form: a decimal code string.
pub(crate) fn avro_type_by_code_str(code: &str) -> Result<AvroType, MetaError> {
    code.trim()
        .parse::<i64>()
        .ok()
        .and_then(AvroType::from_code)
        .ok_or_else(|| MetaError::unknown_type("avro", code))
}

pub(crate) fn value_type_by_name(name: &str) -> Result<ValueType, MetaError> {
    ValueType::from_name(name).ok_or_else(|| MetaError::unknown_type("value", name))
}

pub(crate) fn value_type_by_code_str(code: &str) -> Result<ValueType, MetaError> {
    code.trim()
        .parse::<i64>()
        .ok()
        .and_then(ValueType::from_code)
        .ok_or_else(|| MetaError::unknown_type("value", code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_names_are_bijective() {
        for t in AvroType::ALL {
            assert_eq!(AvroType::from_code(t.code()), Some(t));
            assert_eq!(AvroType::from_name(t.name()), Some(t));
        }
        for t in ValueType::ALL {
            assert_eq!(ValueType::from_code(t.code()), Some(t));
            assert_eq!(ValueType::from_name(t.name()), Some(t));
        }
    }

    #[test]
    fn code_zero_is_string() {
        assert_eq!(name_of(0).unwrap(), "string");
        assert_eq!(code_of("string").unwrap(), 0);
        assert_eq!(code_of("timestamp-millis").unwrap(), 10);
    }

    #[test]
    fn unknown_entries_fail_explicitly() {
        assert!(matches!(
            code_of("notatype"),
            Err(MetaError::UnknownType { catalog: "avro", .. })
        ));
        assert!(name_of(42).is_err());
        assert!(avro_type_by_code_str("abc").is_err());
        assert!(value_type_by_code_str("7").is_err());
        // names are case-sensitive
        assert!(AvroType::from_name("String").is_none());
    }

    #[test]
    fn repository_code_strings_tolerate_padding() {
        assert_eq!(avro_type_by_code_str(" 3 ").unwrap(), AvroType::Long);
        assert_eq!(value_type_by_code_str("9").unwrap(), ValueType::Timestamp);
    }
}
