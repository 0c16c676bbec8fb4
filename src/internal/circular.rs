//! Circular dependency detection infrastructure.
//!
//! Every construction pushes a frame onto an explicit, borrowed linked list
//! that lives on the stack of the resolving call. Nested resolutions made by
//! a factory extend that list through their `ResolverContext`, so each
//! top-level request owns exactly one in-progress path and concurrent
//! requests on other threads never see it.

use crate::error::{DiError, DiResult};
use crate::key::TypeToken;

/// One concrete type currently under construction.
pub(crate) struct ResolutionPath<'p> {
    concrete: TypeToken,
    depth: usize,
    parent: Option<&'p ResolutionPath<'p>>,
}

impl<'p> ResolutionPath<'p> {
    /// Enters `concrete` below `parent`.
    ///
    /// Fails with `CyclicDependency` when `concrete` is already in progress
    /// on this path, and with `DepthExceeded` past `max_depth` frames.
    pub(crate) fn enter(
        parent: Option<&'p ResolutionPath<'p>>,
        concrete: TypeToken,
        max_depth: usize,
    ) -> DiResult<Self> {
        if let Some(parent) = parent {
            if parent.contains(concrete) {
                let mut path = parent.names();
                path.push(concrete.name());
                return Err(DiError::CyclicDependency(path));
            }
        }

        let depth = parent.map_or(1, |p| p.depth + 1);
        if depth > max_depth {
            return Err(DiError::DepthExceeded(max_depth));
        }

        Ok(Self { concrete, depth, parent })
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn concrete(&self) -> TypeToken {
        self.concrete
    }

    fn frames(&self) -> impl Iterator<Item = &ResolutionPath<'p>> {
        std::iter::successors(Some(self), |frame| frame.parent)
    }

    fn contains(&self, concrete: TypeToken) -> bool {
        self.frames().any(|frame| frame.concrete == concrete)
    }

    /// Type names from the outermost frame to this one.
    pub(crate) fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.frames().map(|frame| frame.concrete.name()).collect();
        names.reverse();
        names
    }
}
