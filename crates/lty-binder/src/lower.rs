//! Lowering of annotation types into type values.
//!
//! Lowering is purely syntactic: names of primitives map to their type,
//! names bound by an enclosing `---@generic` become `Generic`, and every
//! other name becomes an `AliasRef` for the substitutor to resolve later.

use lty_common::Atom;
use lty_solver::{ClassType, MemberInfo, Ty, union_of};
use lty_syntax::DocTy;

pub fn lower_doc_ty(doc: &DocTy, generics: &[Atom]) -> Ty {
    match doc {
        DocTy::Name { name, args } => lower_name(name, args, generics),
        DocTy::Array(element) => Ty::array(lower_doc_ty(element, generics)),
        DocTy::Union(alternatives) => {
            if alternatives.is_empty() {
                return Ty::Unknown;
            }
            union_of(alternatives.iter().map(|alt| lower_doc_ty(alt, generics)))
        }
        DocTy::Function {
            params,
            returns,
            variadic,
        } => {
            let params = params
                .iter()
                .map(|(_, ty)| lower_doc_ty(ty, generics))
                .collect();
            let returns: Vec<&DocTy> = returns.iter().collect();
            Ty::function(params, lower_returns(&returns, generics), *variadic)
        }
        DocTy::Table { fields } => {
            let mut class = ClassType::anonymous();
            for (name, ty) in fields {
                class
                    .members
                    .insert(name.clone(), MemberInfo::new(lower_doc_ty(ty, generics)));
            }
            Ty::class(class)
        }
        DocTy::StringLiteral(text) => Ty::StringLiteral(text.clone()),
        DocTy::Tuple(elements) => {
            Ty::tuple(elements.iter().map(|e| lower_doc_ty(e, generics)).collect())
        }
        DocTy::Missing => Ty::Unknown,
    }
}

/// `---@return` lists: none is `Nil`, one is itself, several form a tuple.
pub fn lower_returns(returns: &[&DocTy], generics: &[Atom]) -> Ty {
    match returns {
        [] => Ty::Nil,
        [single] => lower_doc_ty(single, generics),
        many => Ty::tuple(many.iter().map(|ty| lower_doc_ty(ty, generics)).collect()),
    }
}

fn lower_name(name: &Atom, args: &[DocTy], generics: &[Atom]) -> Ty {
    match name.as_str() {
        "" | "any" | "unknown" => Ty::Unknown,
        "nil" | "void" => Ty::Nil,
        "boolean" | "bool" => Ty::Boolean,
        "number" | "integer" => Ty::Number,
        "string" => Ty::String,
        "table" => Ty::table(),
        "function" => Ty::any_function(),
        _ if generics.contains(name) => Ty::Generic(name.clone()),
        _ => Ty::alias_ref(
            name.clone(),
            args.iter().map(|arg| lower_doc_ty(arg, generics)).collect(),
        ),
    }
}

#[cfg(test)]
#[path = "../tests/lower_tests.rs"]
mod tests;
