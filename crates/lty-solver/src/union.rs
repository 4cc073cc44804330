//! Union construction.
//!
//! Every union is built here so its invariants hold: flattened (no nested
//! unions), deduplicated, never empty, and free of alternatives that another
//! alternative already covers.

use crate::resolver::{NoopResolver, TypeResolver};
use crate::subtype::SubtypeChecker;
use crate::types::{Ty, UnionType};
use tracing::trace;

/// `union(a, b)`.
pub fn union(a: &Ty, b: &Ty) -> Ty {
    union_of([a.clone(), b.clone()])
}

/// Union of any number of types, using only the supertype links carried by
/// the values themselves.
pub fn union_of(types: impl IntoIterator<Item = Ty>) -> Ty {
    union_with(types, &NoopResolver)
}

/// Union of any number of types; `resolver` supplies transitive supertypes
/// so `Dog | Animal` collapses to `Animal` across files.
pub fn union_with(types: impl IntoIterator<Item = Ty>, resolver: &dyn TypeResolver) -> Ty {
    let mut flat: Vec<Ty> = Vec::new();
    for ty in types {
        match ty {
            Ty::Union(union) => {
                for alt in union.alternatives() {
                    push_unique(&mut flat, alt.clone());
                }
            }
            other => push_unique(&mut flat, other),
        }
    }

    if flat.iter().any(Ty::is_known) {
        flat.retain(Ty::is_known);
    }

    match flat.len() {
        0 => {
            debug_assert!(false, "union of zero types");
            return Ty::Unknown;
        }
        1 => return flat.pop().unwrap_or(Ty::Unknown),
        _ => {}
    }

    // Nil stays a distinct alternative here so `T|nil` survives collapsing.
    let mut checker = SubtypeChecker::new(resolver).with_nil_strict(true);
    let mut keep = vec![true; flat.len()];
    for i in 0..flat.len() {
        for j in 0..flat.len() {
            if i == j || !keep[j] {
                continue;
            }
            if checker.is_subtype(&flat[i], &flat[j])
                && (j < i || !checker.is_subtype(&flat[j], &flat[i]))
            {
                keep[i] = false;
                break;
            }
        }
    }
    let mut kept: Vec<Ty> = flat
        .into_iter()
        .zip(keep)
        .filter_map(|(ty, keep)| keep.then_some(ty))
        .collect();

    if kept.len() == 1 {
        return kept.pop().unwrap_or(Ty::Unknown);
    }
    trace!(alternatives = kept.len(), "built union");
    Ty::Union(UnionType(kept.into()))
}

fn push_unique(flat: &mut Vec<Ty>, ty: Ty) {
    if !flat.contains(&ty) {
        flat.push(ty);
    }
}
