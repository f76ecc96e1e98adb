pub mod resolver;

pub use resolver::{inherited_fields, is_inherited, resolve, InheritableField, ResolvedEdition};
