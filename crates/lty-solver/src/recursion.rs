//! Unified recursion guard for cycle detection, depth limiting,
//! and iteration bounding in recursive type computations.
//!
//! # Design
//!
//! `RecursionGuard` combines three safety mechanisms:
//! 1. **Cycle detection** via a visiting set
//! 2. **Depth limiting** to prevent stack overflow
//! 3. **Iteration bounding** to prevent runaway work
//!
//! It also records *how far out* a detected cycle reached. When a key that
//! is deeper in the stack hits a cycle on an entry further out, every entry
//! between the two computed its result against an incomplete value. Leaving
//! such an entry reports it as provisional so callers can refuse to cache it.
//!
//! # Profiles
//!
//! [`RecursionProfile`] provides named presets so call sites say what they
//! guard instead of repeating magic numbers:
//!
//! ```ignore
//! let guard = RecursionGuard::with_profile(RecursionProfile::SubtypeCheck);
//! ```
//!
//! # Safety
//!
//! - **Debug leak detection**: In debug builds, dropping a guard with active entries
//!   triggers a panic, catching forgotten `leave()` calls.
//! - **Debug double-leave detection**: In debug builds, leaving a key that isn't in
//!   the visiting set triggers a panic.

use lty_common::limits;
use rustc_hash::FxHashMap;
use std::hash::Hash;

// ---------------------------------------------------------------------------
// RecursionProfile
// ---------------------------------------------------------------------------

/// Named recursion limit presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionProfile {
    /// Structural subtype comparison of recursive class/function shapes.
    ///
    /// depth = 100, iterations = 100,000
    SubtypeCheck,

    /// Generic argument unification at call sites.
    ///
    /// depth = 50, iterations = 100,000
    Unification,

    /// Alias expansion in the substitutor.
    ///
    /// depth = `MAX_ALIAS_EXPANSION_DEPTH`, iterations = 100,000
    AliasExpansion,

    /// Declaration inference in the checker.
    ///
    /// depth = `MAX_EXPR_CHECK_DEPTH`, iterations = 1,000,000
    DeclarationInference,

    /// Custom limits for one-off or test scenarios.
    Custom { max_depth: u32, max_iterations: u32 },
}

impl RecursionProfile {
    pub const fn max_depth(self) -> u32 {
        match self {
            Self::SubtypeCheck => 100,
            Self::Unification => 50,
            Self::AliasExpansion => limits::MAX_ALIAS_EXPANSION_DEPTH,
            Self::DeclarationInference => limits::MAX_EXPR_CHECK_DEPTH,
            Self::Custom { max_depth, .. } => max_depth,
        }
    }

    pub const fn max_iterations(self) -> u32 {
        match self {
            Self::SubtypeCheck => 100_000,
            Self::Unification => 100_000,
            Self::AliasExpansion => 100_000,
            Self::DeclarationInference => 1_000_000,
            Self::Custom { max_iterations, .. } => max_iterations,
        }
    }
}

// ---------------------------------------------------------------------------
// RecursionResult
// ---------------------------------------------------------------------------

/// Result of attempting to enter a recursive computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionResult {
    /// Proceed with the computation.
    Entered,
    /// This key is already being visited.
    Cycle,
    /// Maximum recursion depth exceeded.
    DepthExceeded,
    /// Maximum iteration count exceeded.
    IterationExceeded,
}

impl RecursionResult {
    #[inline]
    pub fn is_entered(self) -> bool {
        matches!(self, Self::Entered)
    }

    #[inline]
    pub fn is_cycle(self) -> bool {
        matches!(self, Self::Cycle)
    }

    #[inline]
    pub fn is_exceeded(self) -> bool {
        matches!(self, Self::DepthExceeded | Self::IterationExceeded)
    }

    #[inline]
    pub fn is_denied(self) -> bool {
        !self.is_entered()
    }
}

// ---------------------------------------------------------------------------
// RecursionGuard
// ---------------------------------------------------------------------------

struct Frame {
    /// Lowest stack index reached by a cycle before this frame was entered.
    saved_cycle_floor: Option<usize>,
}

/// Tracks recursion state for cycle detection, depth limiting,
/// and iteration bounding.
///
/// ```ignore
/// match guard.enter(key.clone()) {
///     RecursionResult::Entered => {
///         let result = do_work();
///         let provisional = guard.leave(&key);
///         result
///     }
///     RecursionResult::Cycle => handle_cycle(),
///     RecursionResult::DepthExceeded
///     | RecursionResult::IterationExceeded => handle_exceeded(),
/// }
/// ```
pub struct RecursionGuard<K: Hash + Eq + Clone> {
    /// Key to its index in `frames`.
    visiting: FxHashMap<K, usize>,
    frames: Vec<Frame>,
    cycle_floor: Option<usize>,
    iterations: u32,
    max_depth: u32,
    max_iterations: u32,
    exceeded: bool,
}

impl<K: Hash + Eq + Clone> RecursionGuard<K> {
    /// Create a guard with explicit limits.
    ///
    /// Prefer [`with_profile`](Self::with_profile) for standard use cases.
    pub fn new(max_depth: u32, max_iterations: u32) -> Self {
        Self {
            visiting: FxHashMap::default(),
            frames: Vec::with_capacity(limits::INITIAL_GUARD_CAPACITY),
            cycle_floor: None,
            iterations: 0,
            max_depth,
            max_iterations,
            exceeded: false,
        }
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth(), profile.max_iterations())
    }

    /// Try to enter a recursive computation for `key`.
    ///
    /// On [`RecursionResult::Entered`] the caller **must** call
    /// [`leave`](Self::leave) with the same key when done.
    pub fn enter(&mut self, key: K) -> RecursionResult {
        self.iterations = self.iterations.saturating_add(1);

        if self.iterations > self.max_iterations {
            self.exceeded = true;
            return RecursionResult::IterationExceeded;
        }
        if self.frames.len() as u32 >= self.max_depth {
            self.exceeded = true;
            return RecursionResult::DepthExceeded;
        }
        if let Some(&index) = self.visiting.get(&key) {
            self.cycle_floor = Some(self.cycle_floor.map_or(index, |floor| floor.min(index)));
            return RecursionResult::Cycle;
        }

        self.visiting.insert(key, self.frames.len());
        self.frames.push(Frame {
            saved_cycle_floor: self.cycle_floor.take(),
        });
        RecursionResult::Entered
    }

    /// Leave a recursive computation for `key`.
    ///
    /// Returns `true` when, while this entry was active, a cycle was cut on
    /// an entry *outside* it. The result computed for `key` then depends on
    /// an unfinished outer value and must not be memoized.
    ///
    /// Entries are expected to be left in LIFO order.
    pub fn leave(&mut self, key: &K) -> bool {
        let Some(index) = self.visiting.remove(key) else {
            debug_assert!(
                false,
                "RecursionGuard::leave() called with a key that is not in the visiting set. \
                 This indicates a double-leave or a leave without a matching enter()."
            );
            return false;
        };
        debug_assert_eq!(
            index + 1,
            self.frames.len(),
            "RecursionGuard entries must be left in LIFO order"
        );
        let frame = self.frames.pop();
        // Cycles that targeted this entry are resolved once it finishes.
        let carried = self.cycle_floor.take().filter(|&floor| floor < index);
        let provisional = carried.is_some();

        let saved = frame.and_then(|frame| frame.saved_cycle_floor);
        self.cycle_floor = match (saved, carried) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        provisional
    }

    /// Execute `f` inside a guarded scope.
    ///
    /// Returns `Ok(value)` on success or `Err(reason)` if entry was denied.
    pub fn scope<T>(&mut self, key: K, f: impl FnOnce() -> T) -> Result<T, RecursionResult> {
        match self.enter(key.clone()) {
            RecursionResult::Entered => {
                let result = f();
                self.leave(&key);
                Ok(result)
            }
            denied => Err(denied),
        }
    }

    #[inline]
    pub fn is_visiting(&self, key: &K) -> bool {
        self.visiting.contains_key(key)
    }

    /// Current recursion depth (number of active entries on the stack).
    #[inline]
    pub fn depth(&self) -> u32 {
        self.frames.len() as u32
    }

    /// Total enter attempts so far (successful or not).
    #[inline]
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        !self.frames.is_empty()
    }

    #[inline]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    #[inline]
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Returns `true` if any limit was previously exceeded. Sticky until
    /// [`reset`](Self::reset).
    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }

    #[inline]
    pub fn mark_exceeded(&mut self) {
        self.exceeded = true;
    }

    /// Reset all state while preserving configured limits.
    pub fn reset(&mut self) {
        self.visiting.clear();
        self.frames.clear();
        self.cycle_floor = None;
        self.iterations = 0;
        self.exceeded = false;
    }
}

#[cfg(debug_assertions)]
impl<K: Hash + Eq + Clone> Drop for RecursionGuard<K> {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.visiting.is_empty() {
            panic!(
                "RecursionGuard dropped with {} active entries still in the visiting set. \
                 This indicates leaked enter() calls without matching leave() calls.",
                self.visiting.len(),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// DepthCounter
// ---------------------------------------------------------------------------

/// A lightweight depth counter for stack overflow protection.
///
/// Unlike [`RecursionGuard`], `DepthCounter` does not track which keys are
/// being visited. Expressions are legitimately re-inferred (for example with
/// a different expected type), so only their nesting depth is bounded.
pub struct DepthCounter {
    depth: u32,
    max_depth: u32,
    exceeded: bool,
}

impl DepthCounter {
    pub fn new(max_depth: u32) -> Self {
        Self {
            depth: 0,
            max_depth,
            exceeded: false,
        }
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth())
    }

    /// Try to enter a deeper level. On `false` the depth is not incremented
    /// and `leave()` must not be called.
    #[inline]
    pub fn enter(&mut self) -> bool {
        if self.depth >= self.max_depth {
            self.exceeded = true;
            return false;
        }
        self.depth += 1;
        true
    }

    #[inline]
    pub fn leave(&mut self) {
        debug_assert!(
            self.depth > 0,
            "DepthCounter::leave() called at depth 0. \
             This indicates a leave without a matching enter()."
        );
        self.depth = self.depth.saturating_sub(1);
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }

    pub fn reset(&mut self) {
        self.depth = 0;
        self.exceeded = false;
    }
}

#[cfg(debug_assertions)]
impl Drop for DepthCounter {
    fn drop(&mut self) {
        if !std::thread::panicking() && self.depth > 0 {
            panic!(
                "DepthCounter dropped with depth {}. \
                 This indicates leaked enter() calls without matching leave() calls.",
                self.depth,
            );
        }
    }
}

#[cfg(test)]
#[path = "../tests/recursion_tests.rs"]
mod tests;
