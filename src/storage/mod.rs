//! Storage layer: filename derivation and file persistence.
//!
//! The storage directory is a flat set of files; its listing is the source
//! of truth, there is no index. Derived names are collision-free and safe
//! by construction, so concurrent writes never need cross-request locking.

pub mod namer;
pub mod persister;

pub use namer::derive_name;
pub use persister::{store, StoredFile};
