use super::*;
use crate::cache::InferenceCache;
use crate::options::InferenceOptions;
use lty_binder::StubIndex;
use lty_common::{Atom, CancellationToken, FileId};
use lty_syntax::{DocTag, DocTy, GenericParam, NodeArena, NodeIndex, TreeBuilder};

fn infer_with(arena: NodeArena, node: NodeIndex, options: InferenceOptions) -> Ty {
    let index = StubIndex::new();
    index.set_file(FileId(1), arena);
    let snapshot = index.snapshot();
    let cache = InferenceCache::new();
    let mut inferrer = Inferrer::new(&snapshot, &cache, &options, CancellationToken::new());
    inferrer.infer_type(FileId(1), node)
}

fn infer(arena: NodeArena, node: NodeIndex) -> Ty {
    infer_with(arena, node, InferenceOptions::default())
}

/// Declares `---@type <ty>` `local v` and returns a reference to `v`.
fn typed_reference(b: &mut TreeBuilder, stmts: &mut Vec<NodeIndex>, ty: DocTy) -> NodeIndex {
    let decl = b.local_decl("v");
    let decl = b.doc(decl, vec![DocTag::ty(ty)]);
    let reference = b.name("v");
    let stat = b.expr_stat(reference);
    stmts.push(decl);
    stmts.push(stat);
    reference
}

#[test]
fn test_self_alias_is_unknown() {
    let mut b = TreeBuilder::new();
    let alias = b.doc_only(vec![DocTag::alias("A", DocTy::named("A"))]);
    let mut stmts = vec![alias];
    let v = typed_reference(&mut b, &mut stmts, DocTy::named("A"));
    assert_eq!(infer(b.finish(stmts), v), Ty::Unknown);
}

#[test]
fn test_mutual_alias_cycle_is_unknown() {
    let mut b = TreeBuilder::new();
    let a = b.doc_only(vec![DocTag::alias("A", DocTy::named("B"))]);
    let bb = b.doc_only(vec![DocTag::alias("B", DocTy::named("A"))]);
    let mut stmts = vec![a, bb];
    let v = typed_reference(
        &mut b,
        &mut stmts,
        DocTy::union(vec![DocTy::named("A"), DocTy::named("number")]),
    );
    // The cyclic alternative drops out of the union.
    assert_eq!(infer(b.finish(stmts), v), Ty::Number);
}

#[test]
fn test_alias_chain_expands() {
    let mut b = TreeBuilder::new();
    let id = b.doc_only(vec![DocTag::alias("Id", DocTy::named("Key"))]);
    let key = b.doc_only(vec![DocTag::alias("Key", DocTy::named("string"))]);
    let mut stmts = vec![id, key];
    let v = typed_reference(&mut b, &mut stmts, DocTy::array(DocTy::named("Id")));
    assert_eq!(infer(b.finish(stmts), v), Ty::array(Ty::String));
}

fn list_alias(b: &mut TreeBuilder) -> NodeIndex {
    // ---@alias List<T> T[]
    b.doc_only(vec![DocTag::Alias {
        name: Atom::new("List"),
        generics: vec![GenericParam::new("T")],
        ty: DocTy::array(DocTy::named("T")),
    }])
}

#[test]
fn test_generic_alias_binds_arguments() {
    let mut b = TreeBuilder::new();
    let list = list_alias(&mut b);
    let mut stmts = vec![list];
    let v = typed_reference(
        &mut b,
        &mut stmts,
        DocTy::apply("List", vec![DocTy::named("number")]),
    );
    assert_eq!(infer(b.finish(stmts), v), Ty::array(Ty::Number));
}

#[test]
fn test_missing_alias_arguments_are_unknown() {
    let mut b = TreeBuilder::new();
    let list = list_alias(&mut b);
    let mut stmts = vec![list];
    let v = typed_reference(&mut b, &mut stmts, DocTy::named("List"));
    assert_eq!(infer(b.finish(stmts), v), Ty::array(Ty::Unknown));
}

#[test]
fn test_self_referential_class_field() {
    // ---@class Node
    // ---@field next Node
    // local Node = {}
    let mut b = TreeBuilder::new();
    let table = b.table(Vec::new());
    let node = b.local("Node", table);
    let node = b.doc(
        node,
        vec![
            DocTag::class("Node", &[]),
            DocTag::field("next", DocTy::named("Node")),
        ],
    );
    let mut stmts = vec![node];
    let v = typed_reference(&mut b, &mut stmts, DocTy::named("Node"));
    let base = b.name("v");
    let next = b.field(base, "next");
    let next_next = b.field(next, "next");
    stmts.push(b.expr_stat(next_next));
    let arena = b.finish(stmts);

    let ty = infer(arena.clone(), v);
    let class = ty.as_class().expect("class value");
    assert_eq!(&*class.name, "Node");
    assert_eq!(class.member("next").map(|m| m.ty.clone()), Some(Ty::class_ref("Node")));
    assert_eq!(infer(arena, next_next), Ty::class_ref("Node"));
}

fn config_global(b: &mut TreeBuilder) -> NodeIndex {
    // Config = { debug = true }
    let yes = b.boolean(true);
    let field = b.table_field("debug", yes);
    let table = b.table(vec![field]);
    let target = b.name("Config");
    b.assign(vec![target], vec![table])
}

#[test]
fn test_global_name_as_type() {
    let build = || {
        let mut b = TreeBuilder::new();
        let config = config_global(&mut b);
        let mut stmts = vec![config];
        typed_reference(&mut b, &mut stmts, DocTy::named("Config"));
        let base = b.name("v");
        let debug = b.field(base, "debug");
        stmts.push(b.expr_stat(debug));
        (b.finish(stmts), debug)
    };

    let (arena, debug) = build();
    assert_eq!(infer(arena, debug), Ty::Boolean);

    let (arena, debug) = build();
    let options = InferenceOptions {
        recognize_global_name_as_type: false,
        ..InferenceOptions::default()
    };
    assert_eq!(infer_with(arena, debug, options), Ty::Unknown);
}

#[test]
fn test_unresolved_type_name_is_unknown() {
    let mut b = TreeBuilder::new();
    let mut stmts = Vec::new();
    let v = typed_reference(&mut b, &mut stmts, DocTy::named("Missing"));
    assert_eq!(infer(b.finish(stmts), v), Ty::Unknown);
}

#[test]
fn test_resolve_type_leaves_plain_types_alone() {
    let index = StubIndex::new();
    let snapshot = index.snapshot();
    let cache = InferenceCache::new();
    let options = InferenceOptions::default();
    let mut inferrer = Inferrer::new(&snapshot, &cache, &options, CancellationToken::new());

    let plain = Ty::function(vec![Ty::Number], Ty::array(Ty::String), false);
    assert_eq!(inferrer.resolve_type(&plain), plain);
    let unresolved = Ty::array(Ty::alias_ref(Atom::new("Nope"), Vec::new()));
    assert_eq!(inferrer.resolve_type(&unresolved), Ty::array(Ty::Unknown));
}
