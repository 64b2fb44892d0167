use alfk::{Ctx, Expr, Kind, Literal, Options, State, TypeChecker};
use criterion::{criterion_group, criterion_main, Criterion};

/// A unary-numeral addition program: (plus 0 y) -> y,
/// (plus (s x) y) -> (s (plus x y)).
fn plus_setup() -> (State, Expr, Expr, Expr) {
    let mut st = State::new();
    let ty = st.mk_type();
    let int = st.mk_symbol(Kind::Const, "Int", ty);
    let s_ty = st.mk_function_type(&[int], int);
    let s = st.mk_symbol(Kind::Const, "s", s_ty);
    let plus_ty = st.mk_function_type(&[int, int], int);
    let plus = st.mk_symbol(Kind::ProgramConst, "plus", plus_ty);
    let x = st.mk_symbol(Kind::Param, "x", int);
    let y = st.mk_symbol(Kind::Param, "y", int);
    let zero = st.mk_literal(Literal::Numeral(0.into()));
    let lhs1 = st.mk_expr(Kind::Apply, vec![plus, zero, y]);
    let sx = st.mk_expr(Kind::Apply, vec![s, x]);
    let lhs2 = st.mk_expr(Kind::Apply, vec![plus, sx, y]);
    let pxy = st.mk_expr(Kind::Apply, vec![plus, x, y]);
    let rhs2 = st.mk_expr(Kind::Apply, vec![s, pxy]);
    st.define_program(plus, vec![(lhs1, y), (lhs2, rhs2)]);
    (st, plus, s, zero)
}

fn unary(st: &mut State, s: Expr, zero: Expr, n: usize) -> Expr {
    let mut e = zero;
    for _ in 0..n {
        e = st.mk_expr(Kind::Apply, vec![s, e]);
    }
    e
}

pub fn criterion_benchmark(c: &mut Criterion) {
    // reduce (plus 32 32) over unary numerals, fresh session per run
    c.bench_function("plus32", |b| {
        b.iter(|| {
            let (mut st, plus, s, zero) = plus_setup();
            let x = unary(&mut st, s, zero, 32);
            let y = unary(&mut st, s, zero, 32);
            let call = st.mk_expr(Kind::Apply, vec![plus, x, y]);
            let tc = TypeChecker::new(&Options::default());
            tc.evaluate(&mut st, call, &Ctx::default())
        })
    });

    // type a deep, shared application tower
    c.bench_function("tower128", |b| {
        b.iter(|| {
            let mut st = State::new();
            let mut tc = TypeChecker::new(&Options::default());
            let ty = st.mk_type();
            let int = st.mk_symbol(Kind::Const, "Int", ty);
            tc.set_literal_type_rule(&st, Kind::Numeral, int);
            let f_ty = st.mk_function_type(&[int, int], int);
            let f = st.mk_symbol(Kind::Const, "f", f_ty);
            let mut e = st.mk_literal(Literal::Numeral(1.into()));
            for _ in 0..128 {
                e = st.mk_expr(Kind::Apply, vec![f, e, e]);
            }
            tc.get_type(&mut st, e).unwrap()
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
