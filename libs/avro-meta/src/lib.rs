pub mod catalog;
pub mod check;
pub mod codec;
pub mod config;
pub mod error;
pub mod field;
pub mod file_locations;
pub mod markup;
pub mod meta;
pub mod repository;
pub mod schema;

mod xml;

pub use catalog::{AvroType, ValueType};
pub use check::{CheckRemark, Severity};
pub use codec::MetaCodec;
pub use error::MetaError;
pub use field::FieldDescriptor;
pub use file_locations::{FileLocation, FileLocations};
pub use markup::MarkupCodec;
pub use meta::{AvroInputMeta, InputSource};
pub use repository::RepositoryCodec;
