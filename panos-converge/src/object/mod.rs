//! Configuration objects: their schema, instances, and XML encoding.

pub mod codec;
pub mod instance;
pub mod spec;

pub use instance::{ConfigObject, Slot};
pub use spec::{FieldSpec, ObjectKind, ObjectSpec, Placement, SlotSpec};
