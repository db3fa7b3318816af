// Domain Layer - Types shared by discovery, dispatch and signatures

pub mod context;
pub mod error;
pub mod field;
pub mod naming;
pub mod shape;
pub mod time;

// Re-exports
pub use context::CallContext;
pub use error::SchemaError;
pub use field::{FieldDescriptor, FieldKind, PrimitiveTag};
pub use naming::to_wire_name;
pub use shape::{Describe, FieldShape, RecordBuilder, RecordShape, TypeRef, TypeShape};
pub use time::{JsonTime, TimeParseError};
