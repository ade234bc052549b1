use super::*;

#[test]
fn rollback_discards_everything_after_mark() {
    let mut arena = ExprArena::new();
    let kept = arena.int(1, Span::DUMMY);
    let mark = arena.checkpoint();

    let a = arena.int(2, Span::DUMMY);
    let b = arena.ident(Name::IT, Span::DUMMY);
    arena.call(Name::LIST_OF, vec![CallArg::positional(a), CallArg::positional(b)], Span::DUMMY);
    arena.lambda(
        vec![LambdaParam {
            name: Name::IT,
            ty: None,
        }],
        b,
        Span::DUMMY,
    );
    assert!(arena.len() > 1);

    arena.rollback(mark);
    assert_eq!(arena.len(), 1);
    assert_eq!(arena.kind(kept), &ExprKind::Int(1));
    assert_eq!(arena.checkpoint(), mark);
}

#[test]
fn call_args_round_through_ranges() {
    let mut arena = ExprArena::new();
    let x = arena.int(0, Span::DUMMY);
    let call = arena.call(Name::COPY, vec![CallArg::named(Name::VALUE, x)], Span::DUMMY);
    let ExprKind::Call { callee, args } = arena.kind(call).clone() else {
        panic!("expected call");
    };
    assert_eq!(arena.kind(callee), &ExprKind::Ident(Name::COPY));
    assert_eq!(arena.call_args(args), &[CallArg::named(Name::VALUE, x)]);
}

#[test]
fn empty_lists_are_empty_ranges() {
    let mut arena = ExprArena::new();
    let range = arena.alloc_expr_list(std::iter::empty());
    assert!(range.is_empty());
    assert!(arena.expr_list(range).is_empty());
}
