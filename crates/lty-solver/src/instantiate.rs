//! Generic substitution.
//!
//! `instantiate_type(ty, subst)` replaces every bound `Generic(name)` inside
//! `ty` with its binding. Primitives are returned unchanged; compound types
//! are rebuilt around their rewritten children.

use crate::types::{AliasRef, ClassType, FunctionType, MemberInfo, Ty};
use crate::union::union_of;
use lty_common::Atom;
use rustc_hash::{FxHashMap, FxHasher};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Mapping from generic parameter names to concrete types.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeSubstitution {
    map: FxHashMap<Atom, Ty>,
}

impl TypeSubstitution {
    pub fn new() -> Self {
        TypeSubstitution::default()
    }

    /// Bind `params` positionally to `args`. Missing arguments bind to `Unknown`.
    pub fn from_args(params: &[Atom], args: &[Ty]) -> Self {
        let mut subst = TypeSubstitution::new();
        for (i, name) in params.iter().enumerate() {
            subst.insert(name.clone(), args.get(i).cloned().unwrap_or(Ty::Unknown));
        }
        subst
    }

    pub fn insert(&mut self, name: Atom, ty: Ty) {
        self.map.insert(name, ty);
    }

    pub fn get(&self, name: &Atom) -> Option<&Ty> {
        self.map.get(name)
    }

    pub fn contains(&self, name: &Atom) -> bool {
        self.map.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Atom, &Ty)> {
        self.map.iter()
    }

    /// Bindings of `other` override ours.
    pub fn extend(&mut self, other: &TypeSubstitution) {
        for (name, ty) in other.iter() {
            self.map.insert(name.clone(), ty.clone());
        }
    }

    /// Order-independent hash of the bindings, used in cache keys.
    pub fn fingerprint(&self) -> u64 {
        if self.map.is_empty() {
            return 0;
        }
        let mut entries: Vec<(&Atom, &Ty)> = self.map.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        let mut hasher = FxHasher::default();
        for (name, ty) in entries {
            name.hash(&mut hasher);
            ty.hash(&mut hasher);
        }
        hasher.finish()
    }
}

/// Replace bound generics in `ty`.
pub fn instantiate_type(ty: &Ty, subst: &TypeSubstitution) -> Ty {
    if subst.is_empty() {
        return ty.clone();
    }
    instantiate(ty, subst)
}

/// Replace every `Generic` with `Unknown`, used when generics are disabled
/// or a placeholder escapes its declaration.
pub fn erase_generics(ty: &Ty) -> Ty {
    if !ty.contains_generic() {
        return ty.clone();
    }
    map_type(ty, &mut |inner| match inner {
        Ty::Generic(_) => Some(Ty::Unknown),
        _ => None,
    })
}

fn instantiate(ty: &Ty, subst: &TypeSubstitution) -> Ty {
    map_type(ty, &mut |inner| match inner {
        Ty::Generic(name) => subst.get(name).cloned(),
        _ => None,
    })
}

/// Structural rewrite: `f` may replace a node outright, otherwise children
/// are rewritten recursively.
pub fn map_type(ty: &Ty, f: &mut dyn FnMut(&Ty) -> Option<Ty>) -> Ty {
    if let Some(replaced) = f(ty) {
        return replaced;
    }
    match ty {
        Ty::Function(function) => {
            let params: Vec<Ty> = function.params.iter().map(|p| map_type(p, f)).collect();
            let ret = map_type(&function.ret, f);
            Ty::Function(Arc::new(FunctionType {
                params,
                ret,
                variadic: function.variadic,
                generics: function.generics.clone(),
            }))
        }
        Ty::Class(class) => {
            if class.members.is_empty() {
                return ty.clone();
            }
            let members = class
                .members
                .iter()
                .map(|(name, info)| {
                    (
                        name.clone(),
                        MemberInfo {
                            ty: map_type(&info.ty, f),
                            ..info.clone()
                        },
                    )
                })
                .collect();
            Ty::class(ClassType {
                name: class.name.clone(),
                supers: class.supers.clone(),
                members,
                anonymous: class.anonymous,
            })
        }
        Ty::Union(union) => union_of(union.alternatives().iter().map(|alt| map_type(alt, f))),
        Ty::AliasRef(alias) => Ty::AliasRef(AliasRef {
            name: alias.name.clone(),
            args: alias.args.iter().map(|arg| map_type(arg, f)).collect(),
        }),
        Ty::Array(element) => Ty::array(map_type(element, f)),
        Ty::Tuple(elements) => Ty::Tuple(elements.iter().map(|e| map_type(e, f)).collect()),
        Ty::Unknown
        | Ty::Nil
        | Ty::Boolean
        | Ty::Number
        | Ty::String
        | Ty::StringLiteral(_)
        | Ty::Generic(_) => ty.clone(),
    }
}

#[cfg(test)]
#[path = "../tests/instantiate_tests.rs"]
mod tests;
