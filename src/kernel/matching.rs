//! First-order matching of patterns against terms.

use super::Ctx;
use crate::{Expr, Kind, State};
use fnv::FnvHashSet;
use std::collections::hash_map::Entry;

/// Match `pattern` against `term`, extending `ctx`.
///
/// On success, substituting `ctx` into `pattern` yields `term`.
/// A parameter already bound must map to the identical node.
///
/// Neither the type of a captured term nor occurs-consistency with
/// the parameter's declaration is checked here; the caller surfaces
/// any conflict when it evaluates the declared return type under the
/// produced substitution.
pub fn match_expr(st: &State, pattern: Expr, term: Expr, ctx: &mut Ctx) -> bool {
    let mut visited = FnvHashSet::default();
    match_expr_visited(st, pattern, term, ctx, &mut visited)
}

/// As [`match_expr`], with a caller-supplied set of already visited
/// pattern-term pairs, so that a sequence of matches over shared
/// subterms prunes repeated work.
pub fn match_expr_visited(
    st: &State,
    pattern: Expr,
    term: Expr,
    ctx: &mut Ctx,
    visited: &mut FnvHashSet<(Expr, Expr)>,
) -> bool {
    let mut stack = vec![(pattern, term)];
    while let Some(curr) = stack.pop() {
        if curr.0 == curr.1 {
            // holds trivially
            continue;
        }
        if !visited.insert(curr) {
            // already processed
            continue;
        }
        let (p, t) = curr;
        if st.num_children(p) == 0 {
            if st.kind(p) != Kind::Param {
                // distinct leaves
                return false;
            }
            match ctx.entry(p) {
                // note that the types need not match here
                Entry::Vacant(e) => {
                    e.insert(t);
                }
                Entry::Occupied(e) => {
                    if *e.get() != t {
                        return false;
                    }
                }
            }
        } else {
            if st.num_children(p) != st.num_children(t) || st.kind(p) != st.kind(t) {
                return false;
            }
            for i in 0..st.num_children(p) {
                stack.push((st.child(p, i), st.child(t, i)));
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Literal;

    fn setup() -> (State, Expr, Expr, Expr) {
        let mut st = State::new();
        let ty = st.mk_type();
        let int = st.mk_symbol(Kind::Const, "Int", ty);
        let f_ty = st.mk_function_type(&[int, int], int);
        let f = st.mk_symbol(Kind::Const, "f", f_ty);
        (st, int, f_ty, f)
    }

    #[test]
    fn binds_params() {
        let (mut st, int, _, f) = setup();
        let x = st.mk_symbol(Kind::Param, "x", int);
        let y = st.mk_symbol(Kind::Param, "y", int);
        let one = st.mk_literal(Literal::Numeral(1.into()));
        let two = st.mk_literal(Literal::Numeral(2.into()));
        let pat = st.mk_expr(Kind::Apply, vec![f, x, y]);
        let term = st.mk_expr(Kind::Apply, vec![f, one, two]);
        let mut ctx = Ctx::default();
        assert!(match_expr(&st, pat, term, &mut ctx));
        assert_eq!(ctx.get(&x), Some(&one));
        assert_eq!(ctx.get(&y), Some(&two));
    }

    #[test]
    fn nonlinear_binding_must_agree() {
        let (mut st, int, _, f) = setup();
        let x = st.mk_symbol(Kind::Param, "x", int);
        let one = st.mk_literal(Literal::Numeral(1.into()));
        let two = st.mk_literal(Literal::Numeral(2.into()));
        let pat = st.mk_expr(Kind::Apply, vec![f, x, x]);
        let same = st.mk_expr(Kind::Apply, vec![f, one, one]);
        let diff = st.mk_expr(Kind::Apply, vec![f, one, two]);
        let mut ctx = Ctx::default();
        assert!(match_expr(&st, pat, same, &mut ctx));
        ctx.clear();
        assert!(!match_expr(&st, pat, diff, &mut ctx));
    }

    #[test]
    fn mismatched_shapes() {
        let (mut st, int, _, f) = setup();
        let g_ty = st.mk_function_type(&[int], int);
        let g = st.mk_symbol(Kind::Const, "g", g_ty);
        let one = st.mk_literal(Literal::Numeral(1.into()));
        let fa = st.mk_expr(Kind::Apply, vec![f, one, one]);
        let ga = st.mk_expr(Kind::Apply, vec![g, one]);
        let mut ctx = Ctx::default();
        // distinct heads
        assert!(!match_expr(&st, fa, ga, &mut ctx));
        // distinct arities
        let fa1 = st.mk_expr(Kind::Apply, vec![f, one]);
        assert!(!match_expr(&st, fa1, ga, &mut ctx));
        // identical terms match without bindings
        assert!(match_expr(&st, fa, fa, &mut ctx));
        assert!(ctx.is_empty());
    }

    /// If `match` succeeds on a ground term, evaluating the pattern
    /// under the produced substitution gives back the term.
    #[test]
    fn substitution_agreement() {
        let (mut st, int, _, f) = setup();
        let x = st.mk_symbol(Kind::Param, "x", int);
        let one = st.mk_literal(Literal::Numeral(1.into()));
        let two = st.mk_literal(Literal::Numeral(2.into()));
        let inner = st.mk_expr(Kind::Apply, vec![f, two, two]);
        let pat = st.mk_expr(Kind::Apply, vec![f, x, one]);
        let term = st.mk_expr(Kind::Apply, vec![f, inner, one]);
        let mut ctx = Ctx::default();
        assert!(match_expr(&st, pat, term, &mut ctx));
        let evaluated = super::super::reduce::evaluate(&mut st, pat, &ctx);
        assert_eq!(evaluated, st.ensure_hashed(term));
    }
}
