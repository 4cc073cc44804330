//! Calls, iterators and contextual parameter types.

use crate::infer::{Inferrer, union_all};
use lty_binder::NameResolver;
use lty_common::{Atom, FileId};
use lty_solver::{FunctionType, Ty, erase_generics, infer_generic_bindings, instantiate_type, map_type};
use lty_syntax::{IndexKey, NodeData, NodeIndex};
use std::sync::Arc;
use tracing::trace;

impl<'a> Inferrer<'a> {
    pub(crate) fn infer_call(
        &mut self,
        file: FileId,
        callee: NodeIndex,
        method: Option<&Atom>,
        args: &[NodeIndex],
    ) -> Ty {
        let index = self.index;
        let Some(arena) = index.arena(file) else {
            return Ty::Unknown;
        };

        // `recv:m(...)` and `recv.m(...)` both look `m` up on the receiver.
        let (callee_ty, receiver, member) = match (method, arena.data(callee)) {
            (Some(method), _) => {
                let receiver = self.infer_value(file, callee);
                (self.member_type(&receiver, method), Some(receiver), Some(method))
            }
            (
                None,
                Some(NodeData::Index {
                    base,
                    key: IndexKey::Named(name),
                }),
            ) => {
                let receiver = self.infer_value(file, *base);
                (self.member_type(&receiver, name), Some(receiver), Some(name))
            }
            (None, _) => (self.infer_value(file, callee), None, None),
        };

        let self_arg = if method.is_some() { receiver.clone() } else { None };
        let ret = self.apply_call(file, &callee_ty, self_arg, args);

        if ret.is_unknown()
            && let Some(member) = member
            && self.options.is_constructor_name(member)
            && let Some(Ty::Class(class)) = &receiver
            && !class.anonymous
        {
            trace!(class = %class.name, member = %member, "constructor call");
            return Ty::Class(Arc::clone(class));
        }
        ret
    }

    pub(crate) fn apply_call(
        &mut self,
        file: FileId,
        callee: &Ty,
        self_arg: Option<Ty>,
        args: &[NodeIndex],
    ) -> Ty {
        match callee {
            Ty::Function(function) => self.call_function(file, function, self_arg, args),
            // Calling a class value constructs an instance.
            Ty::Class(class) if !class.anonymous => callee.clone(),
            Ty::Union(union) => {
                let results = union
                    .alternatives()
                    .iter()
                    .map(|alt| self.apply_call(file, alt, self_arg.clone(), args))
                    .collect();
                union_all(results)
            }
            _ => Ty::Unknown,
        }
    }

    fn call_function(
        &mut self,
        file: FileId,
        function: &FunctionType,
        self_arg: Option<Ty>,
        args: &[NodeIndex],
    ) -> Ty {
        let mut arg_types: Vec<Ty> = Vec::with_capacity(args.len() + 1);
        arg_types.extend(self_arg);
        for (i, &arg) in args.iter().enumerate() {
            let expected = function.params.get(arg_types.len()).cloned();
            match self.infer_expr_expecting(file, arg, expected) {
                // The last argument expands to all of its values.
                Ty::Tuple(values) if i + 1 == args.len() => arg_types.extend(values.iter().cloned()),
                ty => arg_types.push(ty.first_value()),
            }
        }

        let mut ret = function.ret.clone();
        if !function.generics.is_empty() && self.options.enable_generic {
            let bindings = infer_generic_bindings(&function.generics, &function.params, &arg_types);
            ret = instantiate_type(&ret, &bindings);
        }
        self.erase_unbound(&ret, &function.generics)
    }

    /// Placeholders of `generics` left after binding become `Unknown`; with
    /// generics disabled every placeholder does.
    fn erase_unbound(&self, ty: &Ty, generics: &[Atom]) -> Ty {
        if !self.options.enable_generic {
            return erase_generics(ty);
        }
        if generics.is_empty() || !ty.contains_generic() {
            return ty.clone();
        }
        map_type(ty, &mut |inner| match inner {
            Ty::Generic(name) if generics.contains(name) => Some(Ty::Unknown),
            _ => None,
        })
    }

    /// Type of an unannotated closure parameter from the function-typed
    /// parameter of the call the closure is passed to.
    pub(crate) fn contextual_param_type(&mut self, file: FileId, param: NodeIndex) -> Option<Ty> {
        let index = self.index;
        let arena = index.arena(file)?;
        let closure = arena.parent(param);
        let Some(NodeData::Closure { params, .. }) = arena.data(closure) else {
            return None;
        };
        let position = params.iter().position(|&p| p == param)?;
        let expected = self.expected_argument_type(file, closure)?;
        let function = expected.as_function()?;
        let ty = function.params.get(position)?;
        ty.is_known().then(|| ty.clone())
    }

    /// Declared type of the callee parameter that `arg` is passed to.
    fn expected_argument_type(&mut self, file: FileId, arg: NodeIndex) -> Option<Ty> {
        let index = self.index;
        let arena = index.arena(file)?;
        let call = arena.parent(arg);
        let Some(NodeData::Call {
            callee,
            method,
            args,
        }) = arena.data(call)
        else {
            return None;
        };
        let position = args.iter().position(|&a| a == arg)?;

        let (callee_ty, self_arg) = match method {
            Some(method) => {
                let receiver = self.infer_value(file, *callee);
                (self.member_type(&receiver, method), Some(receiver))
            }
            None => (self.infer_value(file, *callee), None),
        };
        let callee_ty = self.resolve_type(&callee_ty);
        let function = callee_ty
            .alternatives()
            .iter()
            .find_map(Ty::as_function)
            .cloned()?;
        let offset = usize::from(self_arg.is_some());
        let param = function.params.get(position + offset)?.clone();
        if function.generics.is_empty() || !param.contains_generic() {
            return Some(param);
        }

        // Bind what the other, non-function arguments determine.
        let mut arg_types: Vec<Ty> = Vec::with_capacity(args.len() + offset);
        arg_types.extend(self_arg);
        for &other in args {
            let is_closure = matches!(arena.data(other), Some(NodeData::Closure { .. }));
            arg_types.push(if other == arg || is_closure {
                Ty::Unknown
            } else {
                self.infer_value(file, other)
            });
        }
        let bindings = if self.options.enable_generic {
            infer_generic_bindings(&function.generics, &function.params, &arg_types)
        } else {
            Default::default()
        };
        Some(self.erase_unbound(&instantiate_type(&param, &bindings), &function.generics))
    }

    /// Type of the `value_index`-th variable of `for ... in expr`.
    pub(crate) fn iterator_value_type(&mut self, file: FileId, expr: NodeIndex, value_index: usize) -> Ty {
        let index = self.index;
        let Some(arena) = index.arena(file) else {
            return Ty::Unknown;
        };
        if let Some(NodeData::Call {
            callee,
            method: None,
            args,
        }) = arena.data(expr)
            && let Some(NodeData::Name(name)) = arena.data(*callee)
            && matches!(&**name, "ipairs" | "pairs")
            && NameResolver::new(index)
                .resolve_name(file, name, arena.span(*callee).start)
                .is_empty()
        {
            let Some(&table) = args.first() else {
                return Ty::Unknown;
            };
            let table = self.infer_value(file, table);
            return match (&**name, value_index) {
                ("ipairs", 0) => Ty::Number,
                ("ipairs", 1) => match &table {
                    Ty::Array(element) => (**element).clone(),
                    _ => Ty::Unknown,
                },
                (_, 0) => match &table {
                    Ty::Array(_) | Ty::Tuple(_) => Ty::Number,
                    _ => Ty::Unknown,
                },
                (_, 1) => element_type(&table),
                _ => Ty::Unknown,
            };
        }

        // A function-valued iterator: the loop variables take its return values.
        match self.infer_value(file, expr) {
            Ty::Function(function) => function.ret.nth_value(value_index),
            _ => Ty::Unknown,
        }
    }
}

/// Value type when iterating `ty` with `pairs`.
fn element_type(ty: &Ty) -> Ty {
    match ty {
        Ty::Array(element) => (**element).clone(),
        Ty::Tuple(elements) => union_all(elements.to_vec()),
        Ty::Class(class) if class.anonymous => {
            union_all(class.members.values().map(|m| m.ty.clone()).collect())
        }
        _ => Ty::Unknown,
    }
}
