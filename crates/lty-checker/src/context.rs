//! Per-query inference state.

use crate::options::InferenceOptions;
use lty_binder::DeclKey;
use lty_common::{Atom, CancellationToken, FileId};
use lty_solver::{DepthCounter, RecursionGuard, RecursionProfile, Ty, TypeSubstitution};

/// Identity of an in-progress computation in the recursion guard.
///
/// Declarations, alias expansions and class constructions share one guard
/// so a cycle running through any mix of them is cut.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum GuardKey {
    Decl(DeclKey),
    Alias(Atom),
    Class(Atom),
}

/// Mutable state for one query. Never shared between threads; every query
/// builds a fresh one.
pub struct InferenceContext {
    /// Generic bindings in effect; part of every cache key.
    pub bindings: TypeSubstitution,
    pub guard: RecursionGuard<GuardKey>,
    /// Expression nesting depth.
    pub depth: DepthCounter,
    /// Expected type at a call-argument position.
    pub expected: Option<Ty>,
    pub cancel: CancellationToken,
    /// Files of the declarations currently being inferred, innermost last.
    pub(crate) decl_files: Vec<FileId>,
}

impl InferenceContext {
    pub fn new(options: &InferenceOptions, cancel: CancellationToken) -> Self {
        let profile = RecursionProfile::DeclarationInference;
        InferenceContext {
            bindings: TypeSubstitution::new(),
            guard: RecursionGuard::new(options.max_inference_depth, profile.max_iterations()),
            depth: DepthCounter::new(options.max_inference_depth),
            expected: None,
            cancel,
            decl_files: Vec::new(),
        }
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether results computed now may be stored in the shared cache.
    pub fn may_cache(&self) -> bool {
        !self.is_cancelled() && !self.guard.is_exceeded() && !self.depth.is_exceeded()
    }

    /// Replace the expected type, returning the previous one.
    pub fn swap_expected(&mut self, expected: Option<Ty>) -> Option<Ty> {
        std::mem::replace(&mut self.expected, expected)
    }

    pub(crate) fn current_file(&self) -> Option<FileId> {
        self.decl_files.last().copied()
    }
}
