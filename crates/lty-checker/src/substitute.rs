//! Alias substitution.
//!
//! `resolve_type` rewrites every `AliasRef` in a type: class names become
//! class values, aliases expand with their generic parameters bound
//! positionally to the reference's arguments, and (when enabled) a name
//! matching a global table variable becomes that variable's type. Anything
//! else is unresolved and becomes `Unknown`.
//!
//! Expansion runs under the same recursion guard as declaration inference,
//! so `alias A = B` / `alias B = A` ends in `Unknown` instead of looping.

use crate::context::GuardKey;
use crate::infer::Inferrer;
use lty_binder::DeclKey;
use lty_common::limits::{STACK_GROWTH_SIZE, STACK_RED_ZONE};
use lty_solver::{AliasRef, RecursionResult, Ty, TypeSubstitution, instantiate_type, map_type};
use tracing::{debug, trace};

impl<'a> Inferrer<'a> {
    pub fn resolve_type(&mut self, ty: &Ty) -> Ty {
        if !ty.contains_alias_ref() {
            return ty.clone();
        }
        map_type(ty, &mut |inner| match inner {
            Ty::AliasRef(alias) => Some(stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH_SIZE, || {
                self.resolve_alias(alias)
            })),
            _ => None,
        })
    }

    fn resolve_alias(&mut self, alias: &AliasRef) -> Ty {
        if self.ctx.is_cancelled() {
            return Ty::Unknown;
        }
        let index = self.index;
        let name = &alias.name;
        self.record_name(name);

        if index.is_class(name) {
            return self.class_value(name);
        }
        if let Some(&key) = index.alias_decls(name).first() {
            return self.expand_alias(key, alias);
        }
        if self.options.recognize_global_name_as_type && !index.global_decls(name).is_empty() {
            trace!(name = %name, "type name resolved to global table");
            return self.global_type(name);
        }
        trace!(name = %name, "unresolved type name");
        Ty::Unknown
    }

    fn expand_alias(&mut self, key: DeclKey, alias: &AliasRef) -> Ty {
        let index = self.index;
        let Some(entry) = index.entry(key) else {
            return Ty::Unknown;
        };
        let args: Vec<Ty> = alias.args.iter().map(|arg| self.resolve_type(arg)).collect();

        let guard_key = GuardKey::Alias(alias.name.clone());
        match self.ctx.guard.enter(guard_key.clone()) {
            RecursionResult::Entered => {}
            RecursionResult::Cycle => {
                debug!(alias = %alias.name, "alias cycle resolves to unknown");
                return Ty::Unknown;
            }
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                debug!(alias = %alias.name, "alias expansion limit reached");
                return Ty::Unknown;
            }
        }
        self.record_dependency(key.file);
        let target = entry.declared.clone().unwrap_or(Ty::Unknown);
        // Missing arguments bind to `Unknown`.
        let bindings = TypeSubstitution::from_args(&entry.generics, &args);
        let expanded = instantiate_type(&target, &bindings);
        let resolved = self.resolve_type(&expanded);
        self.ctx.guard.leave(&guard_key);
        resolved
    }
}

#[cfg(test)]
#[path = "../tests/substitute_tests.rs"]
mod tests;
