//! Core traits for resolving from a container.

mod resolver;

pub use resolver::{Resolver, ResolverCore};
