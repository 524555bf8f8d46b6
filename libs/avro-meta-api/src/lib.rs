pub mod error;
pub mod id;
pub mod store;
pub mod variables;

pub use error::{StoreError, StoreErrorKind};
pub use id::ObjectId;
pub use store::{AttributeStore, StepAttribute, StoreFactory};
pub use variables::{VariableSpace, Variables};
