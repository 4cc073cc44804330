use super::*;
use crate::cache::InferenceCache;
use crate::options::InferenceOptions;
use lty_binder::StubIndex;
use lty_common::CancellationToken;
use lty_solver::union;
use lty_syntax::{DocTag, DocTy, NodeArena, TreeBuilder};

fn infer(arena: NodeArena, node: NodeIndex) -> Ty {
    let index = StubIndex::new();
    index.set_file(FileId(1), arena);
    let snapshot = index.snapshot();
    let cache = InferenceCache::new();
    let options = InferenceOptions::default();
    let mut inferrer = Inferrer::new(&snapshot, &cache, &options, CancellationToken::new());
    inferrer.infer_type(FileId(1), node)
}

/// `---@class <name> : <supers>` `local <name> = {}`
fn class_table(b: &mut TreeBuilder, name: &str, supers: &[&str], fields: Vec<DocTag>) -> NodeIndex {
    let table = b.table(Vec::new());
    let stmt = b.local(name, table);
    let mut tags = vec![DocTag::class(name, supers)];
    tags.extend(fields);
    b.doc(stmt, tags)
}

/// `---@type <ty>` `local <name>`
fn typed_local(b: &mut TreeBuilder, name: &str, ty: DocTy) -> NodeIndex {
    let stmt = b.local_decl(name);
    b.doc(stmt, vec![DocTag::ty(ty)])
}

#[test]
fn test_method_found_through_supertype() {
    let mut b = TreeBuilder::new();
    let animal = class_table(&mut b, "Animal", &[], Vec::new());
    let text = b.string("...");
    let ret = b.ret(vec![text]);
    let body = b.closure(&[], vec![ret]);
    let speak = b.method_stat("Animal", "speak", body);
    let speak = b.doc(speak, vec![DocTag::returns(DocTy::named("string"))]);
    let dog = class_table(&mut b, "Dog", &["Animal"], Vec::new());
    let d = typed_local(&mut b, "d", DocTy::named("Dog"));
    let d_ref = b.name("d");
    let call = b.method_call(d_ref, "speak", Vec::new());
    let s1 = b.expr_stat(call);
    let d_ref = b.name("d");
    let access = b.field(d_ref, "speak");
    let s2 = b.expr_stat(access);
    let arena = b.finish(vec![animal, speak, dog, d, s1, s2]);

    assert_eq!(infer(arena.clone(), call), Ty::String);
    let method = infer(arena, access);
    let function = method.as_function().expect("method type");
    assert_eq!(function.params, vec![Ty::class_ref("Animal")]);
    assert_eq!(function.ret, Ty::String);
}

#[test]
fn test_self_is_the_owning_class() {
    // function Animal:me() return self end
    let mut b = TreeBuilder::new();
    let animal = class_table(&mut b, "Animal", &[], Vec::new());
    let self_ref = b.name("self");
    let ret = b.ret(vec![self_ref]);
    let body = b.closure(&[], vec![ret]);
    let me = b.method_stat("Animal", "me", body);
    let arena = b.finish(vec![animal, me]);

    assert_eq!(infer(arena, self_ref), Ty::class_ref("Animal"));
}

#[test]
fn test_doc_field_outranks_assignment() {
    // ---@class Box
    // ---@field size number
    // local Box = {}
    // Box.size = "big"
    let mut b = TreeBuilder::new();
    let class = class_table(
        &mut b,
        "Box",
        &[],
        vec![DocTag::field("size", DocTy::named("number"))],
    );
    let big = b.string("big");
    let base = b.name("Box");
    let target = b.field(base, "size");
    let assign = b.assign(vec![target], vec![big]);
    let boxed = typed_local(&mut b, "boxed", DocTy::named("Box"));
    let base = b.name("boxed");
    let size = b.field(base, "size");
    let stat = b.expr_stat(size);
    let arena = b.finish(vec![class, assign, boxed, stat]);

    assert_eq!(infer(arena, size), Ty::Number);
}

#[test]
fn test_member_of_union_unions_alternatives() {
    let mut b = TreeBuilder::new();
    let cat = class_table(
        &mut b,
        "Cat",
        &[],
        vec![DocTag::field("name", DocTy::named("string"))],
    );
    let bird = class_table(
        &mut b,
        "Bird",
        &[],
        vec![DocTag::field("name", DocTy::named("number"))],
    );
    let pet = typed_local(
        &mut b,
        "pet",
        DocTy::union(vec![DocTy::named("Cat"), DocTy::named("Bird")]),
    );
    let base = b.name("pet");
    let name = b.field(base, "name");
    let stat = b.expr_stat(name);
    let arena = b.finish(vec![cat, bird, pet, stat]);

    assert_eq!(infer(arena, name), union(&Ty::String, &Ty::Number));
}

#[test]
fn test_supertype_cycle_terminates() {
    let mut b = TreeBuilder::new();
    let a = class_table(&mut b, "A", &["B"], Vec::new());
    let bb = class_table(&mut b, "B", &["A"], Vec::new());
    let value = typed_local(&mut b, "value", DocTy::named("A"));
    let value_ref = b.name("value");
    let s1 = b.expr_stat(value_ref);
    let base = b.name("value");
    let missing = b.field(base, "missing");
    let s2 = b.expr_stat(missing);
    let arena = b.finish(vec![a, bb, value, s1, s2]);

    let ty = infer(arena.clone(), value_ref);
    assert_eq!(ty, Ty::class_ref("A"));
    // The cyclic supertype is dropped from the value.
    assert!(ty.as_class().is_some_and(|class| class.supers.is_empty()));
    assert_eq!(infer(arena, missing), Ty::Unknown);
}

#[test]
fn test_resolve_reference_for_names_and_members() {
    // local M = {}
    // function M.run() end
    // M.run()
    // local x = 1
    // x
    let mut b = TreeBuilder::new();
    let table = b.table(Vec::new());
    let m = b.local("M", table);
    let body = b.closure(&[], Vec::new());
    let base = b.name("M");
    let target = b.field(base, "run");
    let run = b.function_stat(target, body);
    let base = b.name("M");
    let callee = b.field(base, "run");
    let call = b.call(callee, Vec::new());
    let s1 = b.expr_stat(call);
    let one = b.number(1.0);
    let x = b.local("x", one);
    let x_ref = b.name("x");
    let s2 = b.expr_stat(x_ref);
    let unknown = b.name("nowhere");
    let s3 = b.expr_stat(unknown);

    let index = StubIndex::new();
    index.set_file(FileId(1), b.finish(vec![m, run, s1, x, s2, s3]));
    let snapshot = index.snapshot();
    let cache = InferenceCache::new();
    let options = InferenceOptions::default();
    let mut inferrer = Inferrer::new(&snapshot, &cache, &options, CancellationToken::new());

    assert_eq!(
        inferrer.resolve_reference(FileId(1), callee),
        snapshot.find_by_name("run", None)
    );
    assert_eq!(
        inferrer.resolve_reference(FileId(1), x_ref),
        snapshot.find_by_name("x", Some(DeclKind::Local))
    );
    assert!(inferrer.resolve_reference(FileId(1), unknown).is_empty());
}

#[test]
fn test_method_reference_resolves_to_supertype_declaration() {
    let mut b = TreeBuilder::new();
    let animal = class_table(&mut b, "Animal", &[], Vec::new());
    let body = b.closure(&[], Vec::new());
    let speak = b.method_stat("Animal", "speak", body);
    let dog = class_table(&mut b, "Dog", &["Animal"], Vec::new());
    let d = typed_local(&mut b, "d", DocTy::named("Dog"));
    let d_ref = b.name("d");
    let call = b.method_call(d_ref, "speak", Vec::new());
    let stat = b.expr_stat(call);

    let index = StubIndex::new();
    index.set_file(FileId(1), b.finish(vec![animal, speak, dog, d, stat]));
    let snapshot = index.snapshot();
    let cache = InferenceCache::new();
    let options = InferenceOptions::default();
    let mut inferrer = Inferrer::new(&snapshot, &cache, &options, CancellationToken::new());

    let found = inferrer.resolve_reference(FileId(1), call);
    assert_eq!(found.len(), 1);
    assert_eq!(found, snapshot.find_by_name("speak", None));
}
