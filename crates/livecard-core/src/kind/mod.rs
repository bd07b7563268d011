//! Activity kinds: typed attribute/content schemas and the named registry.
//!
//! A kind pairs an immutable attributes record with a mutable content
//! record. Untyped payloads are parsed into those records through
//! [`schema::FieldReader`], which checks required fields in declaration
//! order and ignores anything it does not know about.

pub mod catalog;
pub mod registry;
pub mod schema;

pub use catalog::{
    Counter, CounterAttributes, CounterContent, Progress, ProgressAttributes, ProgressContent,
    Status, StatusAttributes, StatusContent,
};
pub use registry::{KindDescriptor, KindRegistry};
pub use schema::{FieldError, FieldReader, FieldSpec, FieldType, Schema};

/// A named (attributes, content) schema pair.
///
/// Third parties add kinds by implementing this trait and calling
/// [`KindRegistry::register`].
pub trait ActivityKind: Send + Sync + 'static {
    /// Name callers use to select this kind (e.g. `"Counter"`).
    const NAME: &'static str;

    /// Fields fixed at creation.
    type Attributes: Schema;

    /// Fields replaced wholesale on every update.
    type Content: Schema;
}
