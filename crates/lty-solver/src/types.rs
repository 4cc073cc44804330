//! Type values.
//!
//! A [`Ty`] is an immutable, cheaply clonable description of the shapes a
//! runtime value may take. Compound variants are reference counted so a type
//! computed on one thread can be cached and handed to others.
//!
//! Equality is semantic where it matters:
//! - named classes are nominal (compared by name), anonymous classes are
//!   structural (compared by member types)
//! - unions are sets (alternative order is irrelevant)

use indexmap::IndexMap;
use lty_common::{Atom, FileId, Span, Visibility};
use rustc_hash::FxHasher;
use smallvec::SmallVec;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Name of the anonymous empty class every table-like type is a subtype of.
pub const TABLE_CLASS_NAME: &str = "table";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ty {
    /// Inference failed or the value is not yet resolved.
    Unknown,
    Nil,
    Boolean,
    Number,
    String,
    StringLiteral(Atom),
    Function(Arc<FunctionType>),
    Class(Arc<ClassType>),
    Union(UnionType),
    /// Placeholder bound inside a generic declaration's scope.
    Generic(Atom),
    /// Unresolved reference to a named alias (or class) with type arguments.
    AliasRef(AliasRef),
    Array(Arc<Ty>),
    /// Fixed sequence, also used for multiple return values.
    Tuple(Arc<[Ty]>),
}

/// Where a declaration lives; enough for navigation without a tree pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DeclSite {
    pub file: FileId,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionType {
    pub params: Vec<Ty>,
    pub ret: Ty,
    pub variadic: bool,
    /// Generic parameter names bindable at a call site.
    pub generics: Vec<Atom>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MemberInfo {
    pub ty: Ty,
    pub visibility: Visibility,
    pub deprecated: bool,
    pub site: Option<DeclSite>,
}

impl MemberInfo {
    pub fn new(ty: Ty) -> MemberInfo {
        MemberInfo {
            ty,
            visibility: Visibility::Public,
            deprecated: false,
            site: None,
        }
    }
}

/// A nominal (`---@class`) or structural (table literal, `{ x: T }`) table type.
///
/// `supers` holds the *direct* supertypes only; the transitive chain is
/// walked through a [`TypeResolver`](crate::TypeResolver).
#[derive(Clone, Debug)]
pub struct ClassType {
    pub name: Atom,
    pub supers: SmallVec<[Atom; 2]>,
    pub members: IndexMap<Atom, MemberInfo>,
    pub anonymous: bool,
}

impl ClassType {
    pub fn named(name: Atom) -> ClassType {
        ClassType {
            name,
            supers: SmallVec::new(),
            members: IndexMap::new(),
            anonymous: false,
        }
    }

    pub fn anonymous() -> ClassType {
        ClassType {
            name: Atom::new(TABLE_CLASS_NAME),
            supers: SmallVec::new(),
            members: IndexMap::new(),
            anonymous: true,
        }
    }

    /// The empty anonymous `table` class.
    pub fn is_table(&self) -> bool {
        self.anonymous && self.members.is_empty()
    }

    pub fn member(&self, name: &str) -> Option<&MemberInfo> {
        self.members.get(name)
    }

    pub fn with_member(mut self, name: &str, ty: Ty) -> ClassType {
        self.members.insert(Atom::new(name), MemberInfo::new(ty));
        self
    }

    pub fn with_super(mut self, name: &str) -> ClassType {
        self.supers.push(Atom::new(name));
        self
    }
}

impl PartialEq for ClassType {
    fn eq(&self, other: &Self) -> bool {
        if self.anonymous != other.anonymous || self.name != other.name {
            return false;
        }
        if !self.anonymous {
            return true;
        }
        self.members.len() == other.members.len()
            && self
                .members
                .iter()
                .all(|(name, info)| other.members.get(name).is_some_and(|o| o.ty == info.ty))
    }
}

impl Eq for ClassType {}

impl Hash for ClassType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.anonymous.hash(state);
        if self.anonymous {
            self.members.len().hash(state);
        }
    }
}

/// Flattened, deduplicated set of at least two alternatives.
///
/// Build through [`union_of`](crate::union_of) so the invariants hold.
#[derive(Clone, Debug)]
pub struct UnionType(pub(crate) Arc<[Ty]>);

impl UnionType {
    pub fn alternatives(&self) -> &[Ty] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for UnionType {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && self.0.iter().all(|ty| other.0.contains(ty))
    }
}

impl Eq for UnionType {}

impl Hash for UnionType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Order-independent so equal sets hash equally.
        let combined = self.0.iter().fold(0u64, |acc, ty| {
            let mut hasher = FxHasher::default();
            ty.hash(&mut hasher);
            acc.wrapping_add(hasher.finish())
        });
        self.0.len().hash(state);
        combined.hash(state);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AliasRef {
    pub name: Atom,
    pub args: Arc<[Ty]>,
}

impl Ty {
    pub fn function(params: Vec<Ty>, ret: Ty, variadic: bool) -> Ty {
        Ty::Function(Arc::new(FunctionType {
            params,
            ret,
            variadic,
            generics: Vec::new(),
        }))
    }

    pub fn generic_function(params: Vec<Ty>, ret: Ty, variadic: bool, generics: Vec<Atom>) -> Ty {
        Ty::Function(Arc::new(FunctionType {
            params,
            ret,
            variadic,
            generics,
        }))
    }

    /// The `function` type: accepts any arguments, returns `Unknown`.
    pub fn any_function() -> Ty {
        Ty::function(Vec::new(), Ty::Unknown, true)
    }

    pub fn class(class: ClassType) -> Ty {
        Ty::Class(Arc::new(class))
    }

    /// A named class with no members, used as a shallow reference.
    pub fn class_ref(name: &str) -> Ty {
        Ty::class(ClassType::named(Atom::new(name)))
    }

    /// The empty anonymous `table` class.
    pub fn table() -> Ty {
        Ty::class(ClassType::anonymous())
    }

    pub fn array(element: Ty) -> Ty {
        Ty::Array(Arc::new(element))
    }

    pub fn tuple(elements: Vec<Ty>) -> Ty {
        Ty::Tuple(elements.into())
    }

    pub fn string_literal(text: &str) -> Ty {
        Ty::StringLiteral(Atom::new(text))
    }

    pub fn generic(name: &str) -> Ty {
        Ty::Generic(Atom::new(name))
    }

    pub fn alias_ref(name: Atom, args: Vec<Ty>) -> Ty {
        Ty::AliasRef(AliasRef {
            name,
            args: args.into(),
        })
    }

    #[inline]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Ty::Unknown)
    }

    #[inline]
    pub fn is_known(&self) -> bool {
        !self.is_unknown()
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Ty::Nil)
    }

    /// Alternatives of a union, or the type itself.
    pub fn alternatives(&self) -> &[Ty] {
        match self {
            Ty::Union(union) => union.alternatives(),
            other => std::slice::from_ref(other),
        }
    }

    pub fn contains_nil(&self) -> bool {
        self.alternatives().iter().any(Ty::is_nil)
    }

    /// Drop `Nil` alternatives. A bare `Nil` becomes `Unknown`.
    pub fn without_nil(&self) -> Ty {
        match self {
            Ty::Nil => Ty::Unknown,
            Ty::Union(union) => {
                crate::union_of(union.alternatives().iter().filter(|ty| !ty.is_nil()).cloned())
            }
            other => other.clone(),
        }
    }

    /// Widen literal types to their primitive.
    pub fn widen(&self) -> Ty {
        match self {
            Ty::StringLiteral(_) => Ty::String,
            Ty::Union(union) => crate::union_of(union.alternatives().iter().map(Ty::widen)),
            other => other.clone(),
        }
    }

    /// The value a multi-value type contributes in a single-value position.
    pub fn first_value(&self) -> Ty {
        match self {
            Ty::Tuple(elements) => elements.first().cloned().unwrap_or(Ty::Nil),
            other => other.clone(),
        }
    }

    /// The `index`-th value of a multi-value type.
    pub fn nth_value(&self, index: usize) -> Ty {
        match self {
            Ty::Tuple(elements) => elements.get(index).cloned().unwrap_or(Ty::Nil),
            other if index == 0 => other.clone(),
            _ => Ty::Nil,
        }
    }

    pub fn as_class(&self) -> Option<&Arc<ClassType>> {
        match self {
            Ty::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Arc<FunctionType>> {
        match self {
            Ty::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn is_number_like(&self) -> bool {
        matches!(self, Ty::Number)
    }

    pub fn is_string_like(&self) -> bool {
        matches!(self, Ty::String | Ty::StringLiteral(_))
    }

    /// Whether any `AliasRef` remains anywhere inside this type.
    pub fn contains_alias_ref(&self) -> bool {
        self.any_node(&mut |ty| matches!(ty, Ty::AliasRef(_)))
    }

    pub fn contains_generic(&self) -> bool {
        self.any_node(&mut |ty| matches!(ty, Ty::Generic(_)))
    }

    fn any_node(&self, pred: &mut dyn FnMut(&Ty) -> bool) -> bool {
        if pred(self) {
            return true;
        }
        match self {
            Ty::Function(function) => {
                function.params.iter().any(|p| p.any_node(pred)) || function.ret.any_node(pred)
            }
            Ty::Class(class) => class.members.values().any(|m| m.ty.any_node(pred)),
            Ty::Union(union) => union.alternatives().iter().any(|t| t.any_node(pred)),
            Ty::AliasRef(alias) => alias.args.iter().any(|t| t.any_node(pred)),
            Ty::Array(element) => element.any_node(pred),
            Ty::Tuple(elements) => elements.iter().any(|t| t.any_node(pred)),
            Ty::Unknown
            | Ty::Nil
            | Ty::Boolean
            | Ty::Number
            | Ty::String
            | Ty::StringLiteral(_)
            | Ty::Generic(_) => false,
        }
    }
}

impl From<ClassType> for Ty {
    fn from(class: ClassType) -> Ty {
        Ty::class(class)
    }
}
