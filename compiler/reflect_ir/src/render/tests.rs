use pretty_assertions::assert_eq;

use super::*;
use crate::{BinaryOp, DeclId, LambdaParam, Param, Span, StringInterner, WhenArm};

const S: Span = Span::DUMMY;

struct Fixture {
    interner: StringInterner,
    arena: ExprArena,
}

impl Fixture {
    fn new() -> Self {
        Fixture {
            interner: StringInterner::new(),
            arena: ExprArena::new(),
        }
    }

    fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    fn ty(&self, s: &str) -> TypeRef {
        TypeRef::named(self.name(s))
    }

    fn render_decl(&self, decl: &Declaration) -> String {
        Renderer::new(&self.interner, &self.arena).decl(decl)
    }

    fn render_expr(&self, id: ExprId) -> String {
        Renderer::new(&self.interner, &self.arena).expr(id)
    }
}

#[test]
fn extension_accessor() {
    let mut fx = Fixture::new();
    let x = fx.name("x");
    let this = fx.arena.this(S);
    let body = fx.arena.field(this, x, S);
    let decl = Declaration::function(
        fx.name("getX"),
        Some(fx.ty("Point")),
        Vec::new(),
        TypeRef::named(Name::INT),
        body,
        S,
    );
    assert_eq!(fx.render_decl(&decl), "fun Point.getX(): Int = this.x");
}

#[test]
fn descriptor_type_and_pairs() {
    let mut fx = Fixture::new();
    let x = fx.name("x");
    let key = fx.arena.string(x, S);
    let this = fx.arena.this(S);
    let value = fx.arena.field(this, x, S);
    let pair = fx.arena.pair(key, value, S);
    let list = fx
        .arena
        .call(Name::LIST_OF, vec![CallArg::positional(pair)], S);
    let ty = TypeRef::generic(
        Name::LIST,
        vec![TypeRef::generic(
            Name::PAIR,
            vec![TypeRef::named(Name::STRING), TypeRef::Star],
        )],
    );
    let decl = Declaration::function(Name::PRODUCT_FN, Some(fx.ty("Point")), vec![], ty, list, S);
    assert_eq!(
        fx.render_decl(&decl),
        r#"fun Point.product(): List<Pair<String, *>> = listOf("x" to this.x)"#
    );
}

#[test]
fn trailing_lambda_leaves_parentheses() {
    let mut fx = Fixture::new();
    let decorator = fx.name("Decorator");
    let value = fx.name("value");
    let foo = fx.name("foo");

    let receiver = fx.arena.ident(decorator, S);
    let arg = fx.arena.ident(value, S);
    let list = fx.arena.call(Name::LIST_OF, vec![CallArg::positional(arg)], S);
    let args = fx.arena.ident(Name::ARGS, S);
    let zero = fx.arena.int(0, S);
    let first = fx.arena.index(args, zero, S);
    let cast = fx.arena.cast(first, TypeRef::named(Name::INT), S);
    let inner = fx.arena.call(foo, vec![CallArg::positional(cast)], S);
    let args_ty = TypeRef::generic(Name::LIST, vec![TypeRef::named(Name::ANY).nullable()]);
    let lambda = fx.arena.lambda(
        vec![LambdaParam {
            name: Name::ARGS,
            ty: Some(args_ty),
        }],
        inner,
        S,
    );
    let call = fx.arena.method_call(
        receiver,
        Name::INTERCEPT,
        vec![CallArg::positional(list), CallArg::positional(lambda)],
        S,
    );

    let decl = Declaration::function(
        fx.name("fooDecorated"),
        None,
        vec![Param::new(value, TypeRef::named(Name::INT))],
        TypeRef::Infer,
        call,
        S,
    );
    assert_eq!(
        fx.render_decl(&decl),
        "fun fooDecorated(value: Int) = Decorator.intercept(listOf(value)) \
         { args: List<Any?> -> foo(args[0] as Int) }"
    );
}

#[test]
fn named_arguments_stay_inside() {
    let mut fx = Fixture::new();
    let x = fx.name("x");
    let point = fx.ty("Point");
    let it = fx.arena.ident(Name::IT, S);
    let value = fx.arena.ident(Name::VALUE, S);
    let copy = fx
        .arena
        .method_call(it, Name::COPY, vec![CallArg::named(x, value)], S);
    let lambda = fx.arena.lambda(
        vec![
            LambdaParam {
                name: Name::IT,
                ty: Some(point),
            },
            LambdaParam {
                name: Name::VALUE,
                ty: Some(TypeRef::named(Name::INT)),
            },
        ],
        copy,
        S,
    );
    assert_eq!(
        fx.render_expr(lambda),
        "{ it: Point, value: Int -> it.copy(x = value) }"
    );
}

#[test]
fn when_renders_one_arm_per_line() {
    let mut fx = Fixture::new();
    let red = fx.name("Red");
    let blue = fx.name("Blue");
    let subject = fx.arena.this(S);
    let red_str = fx.arena.string(red, S);
    let blue_str = fx.arena.string(blue, S);
    let arms = fx.arena.alloc_when_arms([
        WhenArm {
            condition: WhenCondition::Is(TypeRef::named(red)),
            body: red_str,
        },
        WhenArm {
            condition: WhenCondition::Is(TypeRef::named(blue)),
            body: blue_str,
        },
    ]);
    let when = fx.arena.alloc(ExprKind::When { subject, arms }, S);
    assert_eq!(
        fx.render_expr(when),
        "when (this) {\n    is Red -> \"Red\"\n    is Blue -> \"Blue\"\n}"
    );
}

#[test]
fn parentheses_follow_precedence() {
    let mut fx = Fixture::new();
    let a = fx.arena.int(1, S);
    let b = fx.arena.int(2, S);
    let c = fx.arena.int(3, S);
    let sum = fx.arena.alloc(
        ExprKind::Binary {
            op: BinaryOp::Add,
            lhs: a,
            rhs: b,
        },
        S,
    );
    let product = fx.arena.alloc(
        ExprKind::Binary {
            op: BinaryOp::Mul,
            lhs: sum,
            rhs: c,
        },
        S,
    );
    assert_eq!(fx.render_expr(product), "(1 + 2) * 3");

    let left = fx.arena.alloc(
        ExprKind::Binary {
            op: BinaryOp::Sub,
            lhs: a,
            rhs: b,
        },
        S,
    );
    let nested = fx.arena.alloc(
        ExprKind::Binary {
            op: BinaryOp::Sub,
            lhs: c,
            rhs: left,
        },
        S,
    );
    assert_eq!(fx.render_expr(nested), "3 - (1 - 2)");
}

#[test]
fn literals_are_escaped() {
    let mut fx = Fixture::new();
    let text = fx.name("say \"hi\" $x\n");
    let s = fx.arena.string(text, S);
    assert_eq!(fx.render_expr(s), r#""say \"hi\" \$x\n""#);
    let c = fx.arena.alloc(ExprKind::Char('\''), S);
    assert_eq!(fx.render_expr(c), r"'\''");
    let d = fx.arena.alloc(ExprKind::Double(0.0f64.to_bits()), S);
    assert_eq!(fx.render_expr(d), "0.0");
}

#[test]
fn class_header() {
    let fx = Fixture::new();
    let mut decl = Declaration::new(DeclKind::Class, fx.name("Point"), S);
    decl.id = DeclId::new(0);
    decl.flags = DeclFlags::DATA;
    decl.members = vec![crate::Member {
        name: fx.name("x"),
        ty: TypeRef::named(Name::INT),
        is_property: true,
        mutable: false,
        default: None,
        span: S,
    }];
    decl.annotations = vec![Annotation::marker(Name::OPTICS, S)];
    assert_eq!(fx.render_decl(&decl), "@Optics data class Point(val x: Int)");
}

#[test]
fn nullable_function_type_is_parenthesized() {
    let fx = Fixture::new();
    let ty = TypeRef::function(vec![TypeRef::named(Name::INT)], TypeRef::named(Name::UNIT))
        .nullable();
    assert_eq!(
        Renderer::new(&fx.interner, &fx.arena).ty(&ty),
        "((Int) -> Unit)?"
    );
}
