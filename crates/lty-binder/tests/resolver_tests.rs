use super::*;
use crate::index::StubIndex;
use crate::stubs::DeclKind;
use lty_syntax::{DocTag, DocTy, NodeArena, NodeIndex, TreeBuilder};

fn snapshot_of(files: Vec<(u32, NodeArena)>) -> std::sync::Arc<IndexSnapshot> {
    let index = StubIndex::new();
    for (id, arena) in files {
        index.set_file(FileId(id), arena);
    }
    index.snapshot()
}

fn pos_of(snapshot: &IndexSnapshot, file: u32, node: NodeIndex) -> u32 {
    snapshot.arena(FileId(file)).map(|a| a.span(node).start).unwrap_or(0)
}

#[test]
fn test_innermost_scope_wins() {
    // local x = 1
    // do local x = "s"; use(x) end
    // use(x)
    let mut b = TreeBuilder::new();
    let one = b.number(1.0);
    let outer = b.local("x", one);
    let s = b.string("s");
    let inner = b.local("x", s);
    let inner_ref = b.name("x");
    let inner_use = b.expr_stat(inner_ref);
    let block = b.do_stat(vec![inner, inner_use]);
    let outer_ref = b.name("x");
    let outer_use = b.expr_stat(outer_ref);
    let arena = b.finish(vec![outer, block, outer_use]);
    let snapshot = snapshot_of(vec![(1, arena)]);
    let resolver = NameResolver::new(&snapshot);

    let tree = snapshot.stubs(FileId(1)).expect("stubs");
    let locals = tree.find_by_name("x", Some(DeclKind::Local));
    assert_eq!(locals.len(), 2);

    let found = resolver.resolve_name(FileId(1), "x", pos_of(&snapshot, 1, inner_ref));
    assert_eq!(found, vec![DeclKey::new(FileId(1), locals[1].id)]);
    let found = resolver.resolve_name(FileId(1), "x", pos_of(&snapshot, 1, outer_ref));
    assert_eq!(found, vec![DeclKey::new(FileId(1), locals[0].id)]);
}

#[test]
fn test_globals_from_all_files() {
    let mut files = Vec::new();
    for id in [2u32, 1] {
        let mut b = TreeBuilder::new();
        let value = b.number(id as f64);
        let target = b.name("CONFIG");
        let assign = b.assign(vec![target], vec![value]);
        files.push((id, b.finish(vec![assign])));
    }
    let mut b = TreeBuilder::new();
    let reference = b.name("CONFIG");
    let stat = b.expr_stat(reference);
    files.push((3, b.finish(vec![stat])));
    let snapshot = snapshot_of(files);

    let resolver = NameResolver::new(&snapshot);
    let found = resolver.resolve_name(FileId(3), "CONFIG", pos_of(&snapshot, 3, reference));
    let files: Vec<FileId> = found.iter().map(|k| k.file).collect();
    assert_eq!(files, vec![FileId(1), FileId(2)]);
}

#[test]
fn test_unresolved_name() {
    let mut b = TreeBuilder::new();
    let reference = b.name("nothing");
    let stat = b.expr_stat(reference);
    let snapshot = snapshot_of(vec![(1, b.finish(vec![stat]))]);
    let resolver = NameResolver::new(&snapshot);
    assert!(resolver.resolve_name(FileId(1), "nothing", 0).is_empty());
    assert!(resolver.resolve_name(FileId(9), "nothing", 0).is_empty());
}

#[test]
fn test_enclosing_class_members_and_supertypes() {
    // ---@class Animal
    // ---@field legs number
    // local Animal = {}
    // ---@class Dog : Animal
    // local Dog = {}
    // function Dog:walk() return legs end
    let mut b = TreeBuilder::new();
    let table = b.table(Vec::new());
    let animal = b.local("Animal", table);
    let animal = b.doc(
        animal,
        vec![
            DocTag::class("Animal", &[]),
            DocTag::field("legs", DocTy::named("number")),
        ],
    );
    let table = b.table(Vec::new());
    let dog = b.local("Dog", table);
    let dog = b.doc(dog, vec![DocTag::class("Dog", &["Animal"])]);
    let legs = b.name("legs");
    let ret = b.ret(vec![legs]);
    let body = b.closure(&[], vec![ret]);
    let walk = b.method_stat("Dog", "walk", body);
    let arena = b.finish(vec![animal, dog, walk]);
    let snapshot = snapshot_of(vec![(1, arena)]);
    let resolver = NameResolver::new(&snapshot);

    let found = resolver.resolve_name(FileId(1), "legs", pos_of(&snapshot, 1, legs));
    assert_eq!(found.len(), 1);
    let entry = snapshot.entry(found[0]).expect("legs");
    assert_eq!(entry.kind, DeclKind::Field);
    assert_eq!(entry.owner, Some(MemberOwner::Class(Atom::new("Animal"))));

    // `self` is the implicit parameter, found lexically.
    let found = resolver.resolve_name(FileId(1), "self", pos_of(&snapshot, 1, legs));
    let entry = snapshot.entry(found[0]).expect("self");
    assert_eq!(entry.kind, DeclKind::Parameter);

    let walk = resolver.resolve_class_member(&Atom::new("Dog"), "walk");
    assert_eq!(walk.len(), 1);
    let legs = resolver.resolve_class_member(&Atom::new("Dog"), "legs");
    assert_eq!(legs.len(), 1);
    assert!(resolver.resolve_class_member(&Atom::new("Dog"), "wings").is_empty());
}

#[test]
fn test_supertype_cycle_terminates() {
    let mut b = TreeBuilder::new();
    let a = b.doc_only(vec![DocTag::class("A", &["B"])]);
    let c = b.doc_only(vec![DocTag::class("B", &["A"])]);
    let snapshot = snapshot_of(vec![(1, b.finish(vec![a, c]))]);
    let resolver = NameResolver::new(&snapshot);
    assert!(resolver.resolve_class_member(&Atom::new("A"), "missing").is_empty());
}

#[test]
fn test_class_chain_is_breadth_first() {
    let mut b = TreeBuilder::new();
    let base = b.doc_only(vec![DocTag::class("Base", &[])]);
    let left = b.doc_only(vec![DocTag::class("Left", &["Base"])]);
    let right = b.doc_only(vec![DocTag::class("Right", &["Base"])]);
    let leaf = b.doc_only(vec![DocTag::class("Leaf", &["Left", "Right"])]);
    let snapshot = snapshot_of(vec![(1, b.finish(vec![base, left, right, leaf]))]);
    let resolver = NameResolver::new(&snapshot);
    let chain = resolver.class_chain(&Atom::new("Leaf"));
    let names: Vec<&str> = chain.iter().map(|a| &**a).collect();
    assert_eq!(names, vec!["Leaf", "Left", "Right", "Base"]);
}
