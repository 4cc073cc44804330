use super::*;
use lty_binder::StubIndex;
use lty_solver::union;
use lty_syntax::{BinaryOp, DocTag, DocTy, NodeArena, TreeBuilder, UnaryOp};
use rayon::prelude::*;

struct Project {
    index: StubIndex,
    cache: InferenceCache,
    options: InferenceOptions,
}

impl Project {
    fn new() -> Self {
        Project {
            index: StubIndex::new(),
            cache: InferenceCache::new(),
            options: InferenceOptions::default(),
        }
    }

    fn with_file(arena: NodeArena) -> Self {
        let project = Project::new();
        project.index.set_file(FileId(1), arena);
        project
    }

    fn infer(&self, node: NodeIndex) -> Ty {
        let snapshot = self.index.snapshot();
        let mut inferrer = Inferrer::new(&snapshot, &self.cache, &self.options, CancellationToken::new());
        inferrer.infer_type(FileId(1), node)
    }
}

#[test]
fn test_local_chain_shares_type() {
    // local x = 5
    // local y = x
    // y
    let mut b = TreeBuilder::new();
    let five = b.number(5.0);
    let x = b.local("x", five);
    let x_ref = b.name("x");
    let y = b.local("y", x_ref);
    let y_ref = b.name("y");
    let stat = b.expr_stat(y_ref);
    let project = Project::with_file(b.finish(vec![x, y, stat]));

    assert_eq!(project.infer(y_ref), Ty::Number);
    assert_eq!(project.infer(x_ref), Ty::Number);
}

#[test]
fn test_string_literal_keeps_value() {
    let mut b = TreeBuilder::new();
    let hi = b.string("hi");
    let s = b.local("s", hi);
    let s_ref = b.name("s");
    let stat = b.expr_stat(s_ref);
    let project = Project::with_file(b.finish(vec![s, stat]));
    assert_eq!(project.infer(s_ref), Ty::string_literal("hi"));
}

/// `local function add(a, b) return a + b end`
fn add_function(b: &mut TreeBuilder) -> NodeIndex {
    let a = b.name("a");
    let c = b.name("b");
    let sum = b.binary(BinaryOp::Add, a, c);
    let ret = b.ret(vec![sum]);
    let body = b.closure(&["a", "b"], vec![ret]);
    b.local_function("add", body)
}

#[test]
fn test_unannotated_add_returns_unknown() {
    let mut b = TreeBuilder::new();
    let add = add_function(&mut b);
    let add_ref = b.name("add");
    let stat = b.expr_stat(add_ref);
    let project = Project::with_file(b.finish(vec![add, stat]));

    assert_eq!(
        project.infer(add_ref),
        Ty::function(vec![Ty::Unknown, Ty::Unknown], Ty::Unknown, false)
    );
}

#[test]
fn test_annotated_add_returns_number() {
    let mut b = TreeBuilder::new();
    let add = add_function(&mut b);
    let add = b.doc(
        add,
        vec![
            DocTag::param("a", DocTy::named("number")),
            DocTag::param("b", DocTy::named("number")),
        ],
    );
    let add_ref = b.name("add");
    let one = b.number(1.0);
    let two = b.number(2.0);
    let call = b.call(add_ref, vec![one, two]);
    let stat = b.expr_stat(call);
    let project = Project::with_file(b.finish(vec![add, stat]));

    assert_eq!(
        project.infer(add_ref),
        Ty::function(vec![Ty::Number, Ty::Number], Ty::Number, false)
    );
    assert_eq!(project.infer(call), Ty::Number);
}

#[test]
fn test_documented_type_wins_over_initializer() {
    // ---@type string
    // local s = 5
    let mut b = TreeBuilder::new();
    let five = b.number(5.0);
    let s = b.local("s", five);
    let s = b.doc(s, vec![DocTag::ty(DocTy::named("string"))]);
    let s_ref = b.name("s");
    let stat = b.expr_stat(s_ref);
    let project = Project::with_file(b.finish(vec![s, stat]));
    assert_eq!(project.infer(s_ref), Ty::String);
}

#[test]
fn test_mutual_recursion_terminates() {
    // function f() return g() end
    // function g() return f() end
    let mut b = TreeBuilder::new();
    let g_ref = b.name("g");
    let g_call = b.call(g_ref, Vec::new());
    let ret = b.ret(vec![g_call]);
    let body = b.closure(&[], vec![ret]);
    let f_target = b.name("f");
    let f = b.function_stat(f_target, body);
    let f_ref = b.name("f");
    let f_call = b.call(f_ref, Vec::new());
    let ret = b.ret(vec![f_call]);
    let body = b.closure(&[], vec![ret]);
    let g_target = b.name("g");
    let g = b.function_stat(g_target, body);
    let use_f = b.name("f");
    let stat = b.expr_stat(use_f);
    let project = Project::with_file(b.finish(vec![f, g, stat]));

    let first = project.infer(use_f);
    assert_eq!(first, Ty::function(Vec::new(), Ty::Unknown, false));
    // Idempotent, whether or not the second call hits the cache.
    assert_eq!(project.infer(use_f), first);
}

#[test]
fn test_local_does_not_see_itself() {
    // local x = x
    let mut b = TreeBuilder::new();
    let inner = b.name("x");
    let x = b.local("x", inner);
    let x_ref = b.name("x");
    let stat = b.expr_stat(x_ref);
    let project = Project::with_file(b.finish(vec![x, stat]));
    assert_eq!(project.infer(x_ref), Ty::Unknown);
}

#[test]
fn test_multiple_return_values() {
    // local function pair() return 1, "a" end
    // local a, b, c = pair()
    let mut b = TreeBuilder::new();
    let one = b.number(1.0);
    let text = b.string("a");
    let ret = b.ret(vec![one, text]);
    let body = b.closure(&[], vec![ret]);
    let pair = b.local_function("pair", body);
    let callee = b.name("pair");
    let call = b.call(callee, Vec::new());
    let locals = b.locals(&["a", "b", "c"], vec![call]);
    let a = b.name("a");
    let bb = b.name("b");
    let c = b.name("c");
    let stats = [a, bb, c].map(|n| b.expr_stat(n));
    let mut all = vec![pair, locals];
    all.extend(stats);
    let project = Project::with_file(b.finish(all));

    assert_eq!(project.infer(a), Ty::Number);
    assert_eq!(project.infer(bb), Ty::string_literal("a"));
    assert_eq!(project.infer(c), Ty::Nil);
    assert_eq!(
        project.infer(call),
        Ty::tuple(vec![Ty::Number, Ty::string_literal("a")])
    );
}

#[test]
fn test_return_unions_and_fallthrough() {
    // local function maybe(x) if x then return 1 end end
    // local function noop() end
    let mut b = TreeBuilder::new();
    let cond = b.name("x");
    let one = b.number(1.0);
    let ret = b.ret(vec![one]);
    let branch = b.if_stat(vec![(cond, vec![ret])], None);
    let body = b.closure(&["x"], vec![branch]);
    let maybe = b.local_function("maybe", body);
    let body = b.closure(&[], Vec::new());
    let noop = b.local_function("noop", body);
    let maybe_ref = b.name("maybe");
    let noop_ref = b.name("noop");
    let s1 = b.expr_stat(maybe_ref);
    let s2 = b.expr_stat(noop_ref);
    let project = Project::with_file(b.finish(vec![maybe, noop, s1, s2]));

    assert_eq!(
        project.infer(maybe_ref),
        Ty::function(vec![Ty::Unknown], union(&Ty::Number, &Ty::Nil), false)
    );
    assert_eq!(project.infer(noop_ref), Ty::function(Vec::new(), Ty::Nil, false));
}

#[test]
fn test_operator_rules() {
    let mut b = TreeBuilder::new();
    let one = b.number(1.0);
    let two = b.number(2.0);
    let sum = b.binary(BinaryOp::Mul, one, two);
    let unknown = b.name("mystery");
    let three = b.number(3.0);
    let mixed = b.binary(BinaryOp::Add, unknown, three);
    let l = b.string("a");
    let r = b.number(1.0);
    let concat = b.binary(BinaryOp::Concat, l, r);
    let l = b.number(1.0);
    let r = b.number(2.0);
    let less = b.binary(BinaryOp::Lt, l, r);
    let nil = b.nil();
    let three = b.number(3.0);
    let or = b.binary(BinaryOp::Or, nil, three);
    let t = b.boolean(true);
    let s = b.string("s");
    let and = b.binary(BinaryOp::And, t, s);
    let operand = b.number(1.0);
    let not = b.unary(UnaryOp::Not, operand);
    let operand = b.string("abc");
    let len = b.unary(UnaryOp::Len, operand);
    let operand = b.number(4.0);
    let neg = b.unary(UnaryOp::Neg, operand);
    let operand = b.string("x");
    let bad_neg = b.unary(UnaryOp::Neg, operand);
    let exprs = [sum, mixed, concat, less, or, and, not, len, neg, bad_neg];
    let stats: Vec<NodeIndex> = exprs.iter().map(|&e| b.expr_stat(e)).collect();
    let project = Project::with_file(b.finish(stats));

    assert_eq!(project.infer(sum), Ty::Number);
    assert_eq!(project.infer(mixed), Ty::Unknown);
    assert_eq!(project.infer(concat), Ty::String);
    assert_eq!(project.infer(less), Ty::Boolean);
    assert_eq!(project.infer(or), Ty::Number);
    assert_eq!(project.infer(and), Ty::string_literal("s"));
    assert_eq!(project.infer(not), Ty::Boolean);
    assert_eq!(project.infer(len), Ty::Number);
    assert_eq!(project.infer(neg), Ty::Number);
    assert_eq!(project.infer(bad_neg), Ty::Unknown);
}

#[test]
fn test_table_literals_and_members() {
    // local t = { name = "n", count = 1 }
    // t.extra = true
    // local arr = { 1, 2 }
    // t.count; t.extra; arr[1]
    let mut b = TreeBuilder::new();
    let n = b.string("n");
    let name = b.table_field("name", n);
    let one = b.number(1.0);
    let count = b.table_field("count", one);
    let table = b.table(vec![name, count]);
    let t = b.local("t", table);
    let value = b.boolean(true);
    let base = b.name("t");
    let target = b.field(base, "extra");
    let assign = b.assign(vec![target], vec![value]);
    let one = b.number(1.0);
    let two = b.number(2.0);
    let i1 = b.table_item(one);
    let i2 = b.table_item(two);
    let items = b.table(vec![i1, i2]);
    let arr = b.local("arr", items);
    let base = b.name("t");
    let count_ref = b.field(base, "count");
    let base = b.name("t");
    let extra_ref = b.field(base, "extra");
    let base = b.name("arr");
    let key = b.number(1.0);
    let element = b.index(base, key);
    let t_ref = b.name("t");
    let arr_ref = b.name("arr");
    let exprs = [count_ref, extra_ref, element, t_ref, arr_ref];
    let mut stmts = vec![t, assign, arr];
    stmts.extend(exprs.iter().map(|&e| b.expr_stat(e)));
    let project = Project::with_file(b.finish(stmts));

    assert_eq!(project.infer(count_ref), Ty::Number);
    assert_eq!(project.infer(extra_ref), Ty::Boolean);
    assert_eq!(project.infer(element), Ty::Number);
    assert_eq!(project.infer(arr_ref), Ty::array(Ty::Number));

    let t_ty = project.infer(t_ref);
    let class = t_ty.as_class().expect("table type");
    assert!(class.anonymous);
    let names: Vec<&str> = class.members.keys().map(|k| &**k).collect();
    assert_eq!(names, vec!["name", "count", "extra"]);
}

#[test]
fn test_loop_variables() {
    // local list = { "a", "b" }
    // for i, v in ipairs(list) do use(i, v) end
    // for n = 1, 10 do use(n) end
    let mut b = TreeBuilder::new();
    let a = b.string("a");
    let c = b.string("b");
    let i1 = b.table_item(a);
    let i2 = b.table_item(c);
    let items = b.table(vec![i1, i2]);
    let list = b.local("list", items);
    let i_ref = b.name("i");
    let v_ref = b.name("v");
    let s1 = b.expr_stat(i_ref);
    let s2 = b.expr_stat(v_ref);
    let ipairs = b.name("ipairs");
    let list_ref = b.name("list");
    let iter = b.call(ipairs, vec![list_ref]);
    let generic = b.generic_for(&["i", "v"], vec![iter], vec![s1, s2]);
    let n_ref = b.name("n");
    let s3 = b.expr_stat(n_ref);
    let start = b.number(1.0);
    let limit = b.number(10.0);
    let numeric = b.numeric_for("n", start, limit, None, vec![s3]);
    let project = Project::with_file(b.finish(vec![list, generic, numeric]));

    assert_eq!(project.infer(i_ref), Ty::Number);
    assert_eq!(project.infer(v_ref), Ty::String);
    assert_eq!(project.infer(n_ref), Ty::Number);
}

/// `---@generic T` `---@param x T` `---@return T` `local function id(x) return x end`
fn identity_function(b: &mut TreeBuilder) -> NodeIndex {
    let x = b.name("x");
    let ret = b.ret(vec![x]);
    let body = b.closure(&["x"], vec![ret]);
    let id = b.local_function("id", body);
    b.doc(
        id,
        vec![
            DocTag::generic(&["T"]),
            DocTag::param("x", DocTy::named("T")),
            DocTag::returns(DocTy::named("T")),
        ],
    )
}

#[test]
fn test_generic_call_binds_argument_type() {
    let mut b = TreeBuilder::new();
    let id = identity_function(&mut b);
    let callee = b.name("id");
    let five = b.number(5.0);
    let call = b.call(callee, vec![five]);
    let n = b.local("n", call);
    let n_ref = b.name("n");
    let stat = b.expr_stat(n_ref);
    let arena = b.finish(vec![id, n, stat]);

    let project = Project::with_file(arena.clone());
    assert_eq!(project.infer(n_ref), Ty::Number);

    let mut disabled = Project::with_file(arena);
    disabled.options.enable_generic = false;
    assert_eq!(disabled.infer(n_ref), Ty::Unknown);
}

#[test]
fn test_contextual_closure_parameter() {
    // ---@param f fun(x: number): nil
    // local function each(f) end
    // each(function(x) return x end)
    let mut b = TreeBuilder::new();
    let body = b.closure(&["f"], Vec::new());
    let each = b.local_function("each", body);
    let each = b.doc(
        each,
        vec![DocTag::param(
            "f",
            DocTy::function(vec![("x", DocTy::named("number"))], vec![DocTy::named("nil")]),
        )],
    );
    let x_ref = b.name("x");
    let ret = b.ret(vec![x_ref]);
    let callback = b.closure(&["x"], vec![ret]);
    let callee = b.name("each");
    let call = b.call(callee, vec![callback]);
    let stat = b.expr_stat(call);
    let project = Project::with_file(b.finish(vec![each, stat]));

    assert_eq!(project.infer(x_ref), Ty::Number);
    assert_eq!(
        project.infer(callback),
        Ty::function(vec![Ty::Number], Ty::Number, false)
    );
}

#[test]
fn test_constructor_convention() {
    // ---@class Point
    // local Point = {}
    // function Point.new() return setmetatable({}, Point) end
    // local p = Point.new()
    let mut b = TreeBuilder::new();
    let table = b.table(Vec::new());
    let point = b.local("Point", table);
    let point = b.doc(point, vec![DocTag::class("Point", &[])]);
    let setmt = b.name("setmetatable");
    let empty = b.table(Vec::new());
    let arg = b.name("Point");
    let call = b.call(setmt, vec![empty, arg]);
    let ret = b.ret(vec![call]);
    let body = b.closure(&[], vec![ret]);
    let base = b.name("Point");
    let target = b.field(base, "new");
    let new = b.function_stat(target, body);
    let base = b.name("Point");
    let callee = b.field(base, "new");
    let construct = b.call(callee, Vec::new());
    let p = b.local("p", construct);
    let p_ref = b.name("p");
    let stat = b.expr_stat(p_ref);
    let project = Project::with_file(b.finish(vec![point, new, p, stat]));

    assert_eq!(project.infer(p_ref), Ty::class_ref("Point"));
}

#[test]
fn test_overloads_are_unioned() {
    // ---@overload fun(x: string): string
    // ---@type fun(x: number): number
    // local convert
    let mut b = TreeBuilder::new();
    let convert = b.local_decl("convert");
    let convert = b.doc(
        convert,
        vec![
            DocTag::Overload {
                ty: DocTy::function(vec![("x", DocTy::named("string"))], vec![DocTy::named("string")]),
            },
            DocTag::ty(DocTy::function(
                vec![("x", DocTy::named("number"))],
                vec![DocTy::named("number")],
            )),
        ],
    );
    let callee = b.name("convert");
    let arg = b.number(1.0);
    let call = b.call(callee, vec![arg]);
    let stat = b.expr_stat(call);
    let project = Project::with_file(b.finish(vec![convert, stat]));

    // Both signatures are candidates; the call unions their results.
    assert_eq!(project.infer(call), union(&Ty::Number, &Ty::String));
}

#[test]
fn test_cancelled_query_returns_unknown_and_caches_nothing() {
    let mut b = TreeBuilder::new();
    let five = b.number(5.0);
    let x = b.local("x", five);
    let x_ref = b.name("x");
    let stat = b.expr_stat(x_ref);
    let project = Project::with_file(b.finish(vec![x, stat]));

    let snapshot = project.index.snapshot();
    let token = CancellationToken::new();
    token.cancel();
    let mut inferrer = Inferrer::new(&snapshot, &project.cache, &project.options, token.clone());
    assert_eq!(inferrer.infer_type(FileId(1), x_ref), Ty::Unknown);
    assert!(project.cache.is_empty());

    token.reset();
    let mut inferrer = Inferrer::new(&snapshot, &project.cache, &project.options, token);
    assert_eq!(inferrer.infer_type(FileId(1), x_ref), Ty::Number);
    assert!(!project.cache.is_empty());
}

#[test]
fn test_results_are_cached_per_declaration() {
    let mut b = TreeBuilder::new();
    let five = b.number(5.0);
    let x = b.local("x", five);
    let x_ref = b.name("x");
    let stat = b.expr_stat(x_ref);
    let project = Project::with_file(b.finish(vec![x, stat]));

    assert_eq!(project.infer(x_ref), Ty::Number);
    let entries = project.cache.len();
    assert_eq!(entries, 1);
    assert_eq!(project.infer(x_ref), Ty::Number);
    assert_eq!(project.cache.len(), entries);
    assert!(project.cache.stats().hits >= 1);
}

#[test]
fn test_generation_change_misses_stale_entries() {
    let build = |value: f64| {
        let mut b = TreeBuilder::new();
        let v = b.number(value);
        let x = b.local("x", v);
        let x_ref = b.name("x");
        let stat = b.expr_stat(x_ref);
        (b.finish(vec![x, stat]), x_ref)
    };
    let (arena, x_ref) = build(1.0);
    let project = Project::with_file(arena);
    assert_eq!(project.infer(x_ref), Ty::Number);

    // Same shape, now a string.
    let mut b = TreeBuilder::new();
    let v = b.string("s");
    let x = b.local("x", v);
    let x_ref2 = b.name("x");
    let stat = b.expr_stat(x_ref2);
    project.index.set_file(FileId(1), b.finish(vec![x, stat]));
    assert_eq!(x_ref, x_ref2);
    assert_eq!(project.infer(x_ref2), Ty::string_literal("s"));
}

#[test]
fn test_parallel_queries_agree() {
    let mut b = TreeBuilder::new();
    let add = add_function(&mut b);
    let add = b.doc(
        add,
        vec![
            DocTag::param("a", DocTy::named("number")),
            DocTag::param("b", DocTy::named("number")),
        ],
    );
    let callee = b.name("add");
    let one = b.number(1.0);
    let two = b.number(2.0);
    let call = b.call(callee, vec![one, two]);
    let total = b.local("total", call);
    let total_ref = b.name("total");
    let stat = b.expr_stat(total_ref);
    let project = Project::with_file(b.finish(vec![add, total, stat]));
    let snapshot = project.index.snapshot();

    let results: Vec<Ty> = (0..64)
        .into_par_iter()
        .map(|_| {
            let mut inferrer =
                Inferrer::new(&snapshot, &project.cache, &project.options, CancellationToken::new());
            inferrer.infer_type(FileId(1), total_ref)
        })
        .collect();
    assert!(results.iter().all(|ty| *ty == Ty::Number));
}

/// `local x0 = 5` `local x1 = x0` ... `local x{len-1} = x{len-2}`, then a
/// reference to the last one.
fn local_chain(len: usize) -> (NodeArena, NodeIndex) {
    let mut b = TreeBuilder::new();
    let five = b.number(5.0);
    let mut stmts = vec![b.local("x0", five)];
    for i in 1..len {
        let prev = b.name(&format!("x{}", i - 1));
        stmts.push(b.local(&format!("x{i}"), prev));
    }
    let last = b.name(&format!("x{}", len - 1));
    stmts.push(b.expr_stat(last));
    (b.finish(stmts), last)
}

#[test]
fn test_long_local_chain_within_depth_budget() {
    let (arena, last) = local_chain(400);
    let project = Project::with_file(arena);
    assert_eq!(project.infer(last), Ty::Number);
}

#[test]
fn test_local_chain_past_depth_budget_degrades_to_unknown() {
    let (arena, last) = local_chain(1000);
    let project = Project::with_file(arena);
    assert_eq!(project.infer(last), Ty::Unknown);
    // Nothing computed past the limit is memoized.
    assert_eq!(project.infer(last), Ty::Unknown);
}

#[test]
fn test_local_chain_with_raised_depth_budget() {
    let (arena, last) = local_chain(1000);
    let project = Project {
        options: InferenceOptions {
            max_inference_depth: 5000,
            ..InferenceOptions::default()
        },
        ..Project::new()
    };
    project.index.set_file(FileId(1), arena);
    assert_eq!(project.infer(last), Ty::Number);
}

#[test]
fn test_deeply_nested_expression_is_unknown() {
    // local total = 1 + 1 + ... (20,000 terms, left-associative)
    let mut b = TreeBuilder::new();
    let mut expr = b.number(1.0);
    for _ in 0..20_000 {
        let one = b.number(1.0);
        expr = b.binary(BinaryOp::Add, expr, one);
    }
    let total = b.local("total", expr);
    let total_ref = b.name("total");
    let stat = b.expr_stat(total_ref);
    let project = Project::with_file(b.finish(vec![total, stat]));

    assert_eq!(project.infer(expr), Ty::Unknown);
    assert_eq!(project.infer(total_ref), Ty::Unknown);
}

#[test]
fn test_generic_for_iterates_outer_table_it_shadows() {
    // local t = { "a", "b" }
    // for _, t in ipairs(t) do use(t) end
    let mut b = TreeBuilder::new();
    let a = b.string("a");
    let c = b.string("b");
    let i1 = b.table_item(a);
    let i2 = b.table_item(c);
    let items = b.table(vec![i1, i2]);
    let outer = b.local("t", items);
    let ipairs = b.name("ipairs");
    let header_t = b.name("t");
    let iter = b.call(ipairs, vec![header_t]);
    let use_fn = b.name("use");
    let body_t = b.name("t");
    let use_call = b.call(use_fn, vec![body_t]);
    let use_stat = b.expr_stat(use_call);
    let for_stat = b.generic_for(&["_", "t"], vec![iter], vec![use_stat]);
    let project = Project::with_file(b.finish(vec![outer, for_stat]));

    assert_eq!(project.infer(header_t), Ty::array(Ty::String));
    assert_eq!(project.infer(body_t), Ty::String);
}

#[test]
fn test_numeric_for_start_reads_outer_binding() {
    // local i = "s"
    // for i = i, 10 do use(i) end
    let mut b = TreeBuilder::new();
    let s = b.string("s");
    let outer = b.local("i", s);
    let start = b.name("i");
    let limit = b.number(10.0);
    let body_i = b.name("i");
    let body = b.expr_stat(body_i);
    let for_stat = b.numeric_for("i", start, limit, None, vec![body]);
    let project = Project::with_file(b.finish(vec![outer, for_stat]));

    assert_eq!(project.infer(start), Ty::string_literal("s"));
    assert_eq!(project.infer(body_i), Ty::Number);
}
