pub mod catalog;
pub mod classifier;
pub mod engine;
pub mod introspect;
pub mod quoting;
pub mod resolver;

pub use classifier::{classify, dialect_offset, PluginDescriptor, PluginFamily};
pub use engine::QueryEngine;
pub use quoting::format_drill_table;
pub use resolver::resolve;
