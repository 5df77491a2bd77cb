//! Tool domain model
//!
//! Pure data types describing tools: the metadata shown to mediators, the
//! error/output value objects, and the context patch a tool can declare for
//! folding its result into the run context. The async `Tool` capability
//! itself is defined in the application layer (ports).

pub mod metadata;
pub mod patch;
pub mod value_objects;
