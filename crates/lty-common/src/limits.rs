//! Centralized limits and thresholds for the inference engine.
//!
//! Shared constants for recursion depths and iteration counts. Every limit
//! here is a hard stop: exceeding it never fails a query, it makes the
//! affected branch resolve to `Unknown`.
//!
//! Solver recursion limits (subtype checking, substitution) live in
//! `lty_solver::recursion::RecursionProfile` rather than here.

// =============================================================================
// Recursion Depth Limits (Checker / Binder)
// =============================================================================

/// Maximum depth for expression type inference.
///
/// Each nested expression adds a frame to the call stack; past this depth the
/// inferrer bails out with `Unknown`.
///
/// ```lua
/// local x = ((((((((((1 + 2) + 3) + 4) --[[ ... 500 levels ... ]])))))))
/// local y = a.b.c.d.e.f.g.h.i.j.k.l --[[ ... hundreds of levels ... ]]
/// ```
pub const MAX_EXPR_CHECK_DEPTH: u32 = 500;

/// Maximum number of nested alias expansions during substitution.
///
/// ```lua
/// ---@alias A B
/// ---@alias B C
/// ---@alias C A   -- cycle, resolves to unknown
/// ```
pub const MAX_ALIAS_EXPANSION_DEPTH: u32 = 50;

/// Maximum depth for walking a class's supertype chain.
pub const MAX_SUPERTYPE_CHAIN_DEPTH: u32 = 64;

// =============================================================================
// Stack Growth
// =============================================================================

/// Remaining stack below which a recursive entry point (declaration,
/// expression, alias, stub walk) continues on a freshly allocated segment.
///
/// The depth limits above count logical levels only; one level can take
/// several kilobytes of native stack in debug builds.
pub const STACK_RED_ZONE: usize = 128 * 1024;

/// Size of each stack segment allocated when the red zone is reached.
pub const STACK_GROWTH_SIZE: usize = 2 * 1024 * 1024;

// =============================================================================
// Operation Count Limits
// =============================================================================

/// Maximum iterations for walking up the scope or parent chain.
///
/// Guards against malformed trees whose parent links form a cycle.
pub const MAX_TREE_WALK_ITERATIONS: usize = 10_000;

/// Maximum number of candidates unioned for one reference.
///
/// Globals assigned in hundreds of files would otherwise produce huge unions
/// that are useless for display.
pub const MAX_RESOLUTION_CANDIDATES: usize = 64;

// =============================================================================
// Capacity Hints
// =============================================================================

/// Initial capacity for the in-progress declaration set.
pub const INITIAL_GUARD_CAPACITY: usize = 16;
