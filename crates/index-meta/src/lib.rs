//! # SearchSync Index Metadata
//!
//! Maps logical entity types to search index names and mapping definitions.
//! The registry is built once at startup and read-only afterwards; a lookup
//! miss is a configuration error, not a runtime fault.

mod definition;
mod error;
mod registry;

pub use definition::IndexDefinition;
pub use error::{MetaError, Result};
pub use registry::IndexDefinitionRegistry;
