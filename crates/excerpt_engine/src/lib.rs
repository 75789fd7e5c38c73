//! Excerpt engine: asynchronous excerpt resolution against a host's content nodes.
mod binder;
mod field;
mod resolver;

pub use binder::{ExcerptField, SchemaFieldBinder};
pub use field::{FieldError, FieldResolver, FieldValueCache, JsonFieldResolver, ResolveContext};
pub use resolver::ExcerptResolver;
