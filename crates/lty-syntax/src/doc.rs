//! Parsed documentation annotations.
//!
//! The `---@tag` comment grammar is parsed outside this workspace; what
//! arrives here is already structured. A piece the parser could not make
//! sense of is kept as [`DocTy::Missing`] so the rest of the comment is
//! still usable.

use lty_common::{Atom, Visibility};
use serde::Serialize;

/// Type expression inside an annotation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DocTy {
    /// `Name` or `Name<Arg, ...>`; also covers primitives (`number`, `string`, ...).
    Name { name: Atom, args: Vec<DocTy> },
    /// `T[]`
    Array(Box<DocTy>),
    /// `A | B`
    Union(Vec<DocTy>),
    /// `fun(a: A, b: B, ...): R1, R2`
    Function {
        params: Vec<(Atom, DocTy)>,
        returns: Vec<DocTy>,
        variadic: bool,
    },
    /// `{ name: T, ... }`
    Table { fields: Vec<(Atom, DocTy)> },
    /// `"literal"`
    StringLiteral(Atom),
    /// `[A, B]`
    Tuple(Vec<DocTy>),
    /// Unparseable fragment.
    Missing,
}

impl DocTy {
    pub fn named(name: &str) -> DocTy {
        DocTy::Name {
            name: Atom::new(name),
            args: Vec::new(),
        }
    }

    pub fn apply(name: &str, args: Vec<DocTy>) -> DocTy {
        DocTy::Name {
            name: Atom::new(name),
            args,
        }
    }

    pub fn array(element: DocTy) -> DocTy {
        DocTy::Array(Box::new(element))
    }

    pub fn union(alternatives: Vec<DocTy>) -> DocTy {
        DocTy::Union(alternatives)
    }

    pub fn function(params: Vec<(&str, DocTy)>, returns: Vec<DocTy>) -> DocTy {
        DocTy::Function {
            params: params
                .into_iter()
                .map(|(name, ty)| (Atom::new(name), ty))
                .collect(),
            returns,
            variadic: false,
        }
    }

    pub fn literal(text: &str) -> DocTy {
        DocTy::StringLiteral(Atom::new(text))
    }
}

/// `---@generic T : Constraint`
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct GenericParam {
    pub name: Atom,
    pub constraint: Option<DocTy>,
}

impl GenericParam {
    pub fn new(name: &str) -> GenericParam {
        GenericParam {
            name: Atom::new(name),
            constraint: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DocTag {
    /// `---@class Name : Super1, Super2`
    Class { name: Atom, supers: Vec<Atom> },
    /// `---@field [visibility] name Type`
    Field {
        visibility: Visibility,
        name: Atom,
        ty: DocTy,
    },
    /// `---@param name Type`
    Param { name: Atom, ty: DocTy },
    /// `---@return T1, T2`
    Return { tys: Vec<DocTy> },
    /// `---@alias Name<T> Type`
    Alias {
        name: Atom,
        generics: Vec<GenericParam>,
        ty: DocTy,
    },
    /// `---@generic T, U : Constraint`
    Generic { params: Vec<GenericParam> },
    /// `---@type Type`
    Type { ty: DocTy },
    /// `---@deprecated`
    Deprecated,
    /// `---@overload fun(...): R`
    Overload { ty: DocTy },
}

impl DocTag {
    pub fn class(name: &str, supers: &[&str]) -> DocTag {
        DocTag::Class {
            name: Atom::new(name),
            supers: supers.iter().map(|s| Atom::new(s)).collect(),
        }
    }

    pub fn field(name: &str, ty: DocTy) -> DocTag {
        DocTag::Field {
            visibility: Visibility::Public,
            name: Atom::new(name),
            ty,
        }
    }

    pub fn param(name: &str, ty: DocTy) -> DocTag {
        DocTag::Param {
            name: Atom::new(name),
            ty,
        }
    }

    pub fn returns(ty: DocTy) -> DocTag {
        DocTag::Return { tys: vec![ty] }
    }

    pub fn alias(name: &str, ty: DocTy) -> DocTag {
        DocTag::Alias {
            name: Atom::new(name),
            generics: Vec::new(),
            ty,
        }
    }

    pub fn generic(names: &[&str]) -> DocTag {
        DocTag::Generic {
            params: names.iter().map(|n| GenericParam::new(n)).collect(),
        }
    }

    pub fn ty(ty: DocTy) -> DocTag {
        DocTag::Type { ty }
    }
}

/// All tags of one `---` comment block.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DocComment {
    pub tags: Vec<DocTag>,
}

impl DocComment {
    pub fn new(tags: Vec<DocTag>) -> DocComment {
        DocComment { tags }
    }

    pub fn class_tag(&self) -> Option<(&Atom, &[Atom])> {
        self.tags.iter().find_map(|tag| match tag {
            DocTag::Class { name, supers } => Some((name, supers.as_slice())),
            _ => None,
        })
    }

    pub fn type_tag(&self) -> Option<&DocTy> {
        self.tags.iter().find_map(|tag| match tag {
            DocTag::Type { ty } => Some(ty),
            _ => None,
        })
    }

    pub fn param(&self, name: &str) -> Option<&DocTy> {
        self.tags.iter().find_map(|tag| match tag {
            DocTag::Param { name: n, ty } if n == name => Some(ty),
            _ => None,
        })
    }

    /// Return types across all `@return` tags, in order.
    pub fn returns(&self) -> Vec<&DocTy> {
        self.tags
            .iter()
            .filter_map(|tag| match tag {
                DocTag::Return { tys } => Some(tys.iter()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn generics(&self) -> Vec<&GenericParam> {
        self.tags
            .iter()
            .filter_map(|tag| match tag {
                DocTag::Generic { params } => Some(params.iter()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn is_deprecated(&self) -> bool {
        self.tags.iter().any(|tag| matches!(tag, DocTag::Deprecated))
    }
}
