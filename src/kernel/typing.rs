//! Type checking, including type-directed evaluation of result types.

use super::{matching, reduce, Ctx};
use crate::error::TypingError;
use crate::{Expr, Kind, Options, State};
use fnv::{FnvHashMap, FnvHashSet};

fn missing(st: &State, e: Expr) -> TypingError {
    TypingError::MissingType(st.display(e).to_string())
}

/// The type checker: computes the type of every subterm, matching
/// argument types against declared argument types and evaluating the
/// declared result type under the induced substitution.
pub struct TypeChecker {
    /// Type rules of the literal kinds; `None` until first use, then
    /// defaulted to the builtin type.
    literal_type_rules: FnvHashMap<Kind, Option<Expr>>,
}

impl TypeChecker {
    /// Initialize the literal kinds that may carry a type rule.
    ///
    /// A frontend that normalizes decimals (resp. hexadecimals) never
    /// produces those literal kinds, so they get no rule slot.
    pub fn new(opts: &Options) -> Self {
        let mut literal_type_rules = FnvHashMap::default();
        let mut kinds = vec![
            Kind::Boolean,
            Kind::Numeral,
            Kind::Rational,
            Kind::Binary,
            Kind::String,
        ];
        if !opts.normalize_decimal {
            kinds.push(Kind::Decimal);
        }
        if !opts.normalize_hexadecimal {
            kinds.push(Kind::Hexadecimal);
        }
        for k in kinds {
            literal_type_rules.insert(k, None);
        }
        Self { literal_type_rules }
    }

    /// Set the type rule of literal kind `k` to `t`.
    ///
    /// Panics if `k` is not a registered literal kind or a different
    /// rule was set before; this is a frontend configuration error.
    pub fn set_literal_type_rule(&mut self, st: &State, k: Kind, t: Expr) {
        match self.literal_type_rules.get_mut(&k) {
            None => panic!("cannot set type rule for kind {}", k),
            Some(slot) => {
                if let Some(prev) = *slot {
                    if prev != t {
                        panic!(
                            "cannot set type rule for kind {} to {}, since its type was already set to {}",
                            k,
                            st.display(t),
                            st.display(prev)
                        );
                    }
                }
                *slot = Some(t);
            }
        }
    }

    /// The type rule of literal kind `k`, defaulting it to the
    /// builtin type on first use.
    fn get_or_set_literal_type_rule(&mut self, st: &mut State, k: Kind) -> Expr {
        match self.literal_type_rules.get(&k) {
            None => panic!("cannot get type rule for kind {}", k),
            Some(Some(t)) => *t,
            Some(None) => {
                let t = st.mk_builtin_type(k);
                self.literal_type_rules.insert(k, Some(t));
                t
            }
        }
    }

    /// Compute the type of `e`, or the diagnostic explaining why it
    /// has none.
    ///
    /// Iterative post-order walk over the DAG; each subterm is typed
    /// once and cached in the state. Any subterm failure aborts the
    /// entire walk.
    pub fn get_type(&mut self, st: &mut State, e: Expr) -> Result<Expr, TypingError> {
        debug!("get type of {}", st.display(e));
        let mut visited = FnvHashSet::default();
        let mut to_visit = vec![e];
        while let Some(&cur) = to_visit.last() {
            if st.lookup_type(cur).is_some() {
                to_visit.pop();
                continue;
            }
            if visited.insert(cur) {
                to_visit.extend_from_slice(st.children(cur));
            } else {
                let ty = match self.get_type_internal(st, cur) {
                    Ok(ty) => ty,
                    Err(err) => {
                        trace!("TYPE {} : [FAIL] {}", st.display(cur), err);
                        return Err(err);
                    }
                };
                st.cache_type(cur, ty);
                trace!("TYPE {} : {}", st.display(cur), st.display(ty));
                to_visit.pop();
            }
        }
        st.lookup_type(e).ok_or_else(|| missing(st, e))
    }

    /// The type of the application `(children[0] children[1..])`.
    pub fn get_type_app(
        &mut self,
        st: &mut State,
        children: &[Expr],
    ) -> Result<Expr, TypingError> {
        self.get_type_app_internal(st, children)
    }

    /// Check that kind `k` supports `nargs` arguments.
    pub fn check_arity(k: Kind, nargs: usize) -> Result<(), TypingError> {
        use Kind::*;
        let ok = match k {
            Nil => nargs == 0,
            EvalIsEq | EvalIntDiv | EvalRatDiv | EvalToBv | EvalFind | EvalCons => nargs == 2,
            EvalAdd | EvalMul | EvalAnd | EvalOr | EvalXor | EvalConcat => nargs >= 2,
            ProofType | EvalHash | EvalNot | EvalNeg | EvalIsNeg | EvalLength | EvalToInt
            | EvalToRat | EvalToString | EvalToList | EvalFromList => nargs == 1,
            EvalRequires | EvalIfThenElse => nargs == 3,
            EvalExtract => nargs == 2 || nargs == 3,
            _ => return Err(TypingError::UnknownArity(k)),
        };
        if ok {
            Ok(())
        } else {
            Err(TypingError::IncorrectArity(k, nargs))
        }
    }

    fn get_type_internal(&mut self, st: &mut State, e: Expr) -> Result<Expr, TypingError> {
        let k = st.kind(e);
        match k {
            Kind::Apply => {
                let children = st.children(e).to_vec();
                self.get_type_app_internal(st, &children)
            }
            Kind::Lambda => {
                let (params, body) = match *st.children(e) {
                    [params, body] => (params, body),
                    _ => return Err(TypingError::IncorrectArity(k, st.num_children(e))),
                };
                let mut args = Vec::with_capacity(st.num_children(params));
                for i in 0..st.num_children(params) {
                    let v = st.child(params, i);
                    args.push(st.lookup_type(v).ok_or_else(|| missing(st, v))?);
                }
                let ret = st.lookup_type(body).ok_or_else(|| missing(st, body))?;
                Ok(st.mk_function_type(&args, ret))
            }
            Kind::Nil => {
                Self::check_arity(k, st.num_children(e))?;
                // nil is its own type
                Ok(e)
            }
            Kind::Type | Kind::AbstractType | Kind::BoolType | Kind::FunctionType => {
                Ok(st.mk_type())
            }
            Kind::ProofType => {
                let &arg = st
                    .children(e)
                    .first()
                    .ok_or(TypingError::IncorrectArity(k, 0))?;
                let ty = st.lookup_type(arg).ok_or_else(|| missing(st, arg))?;
                if st.kind(ty) != Kind::BoolType {
                    return Err(TypingError::NonBoolProofArg);
                }
                Ok(st.mk_type())
            }
            // anything can be quoted
            Kind::QuoteType => Ok(st.mk_type()),
            Kind::Tuple => Ok(st.mk_abstract_type()),
            // Bool is builtin
            Kind::Boolean => Ok(st.mk_bool_type()),
            k if k.is_literal() => {
                let rule = self.get_or_set_literal_type_rule(st, k);
                if st.is_ground(rule) {
                    Ok(rule)
                } else {
                    // the rule mentions the `self` parameter
                    let mut ctx = Ctx::default();
                    ctx.insert(st.mk_self(), e);
                    Ok(reduce::evaluate(st, rule, &ctx))
                }
            }
            k if k.is_literal_op() => {
                let children = st.children(e).to_vec();
                let mut ctypes = Vec::with_capacity(children.len());
                for c in children {
                    ctypes.push(st.lookup_type(c).ok_or_else(|| missing(st, c))?);
                }
                self.get_literal_op_type(st, k, &ctypes)
            }
            k => Err(TypingError::UnknownKind(k)),
        }
    }

    fn get_type_app_internal(
        &mut self,
        st: &mut State,
        children: &[Expr],
    ) -> Result<Expr, TypingError> {
        let (&hd, args) = children
            .split_first()
            .ok_or(TypingError::IncorrectArity(Kind::Apply, 0))?;
        let hd_type = st.lookup_type(hd).ok_or_else(|| missing(st, hd))?;
        if st.kind(hd_type) != Kind::FunctionType {
            return Err(TypingError::NonFunctionHead(st.display(hd).to_string()));
        }
        let hdtypes = st.children(hd_type).to_vec();
        if hdtypes.len() != children.len() {
            return Err(TypingError::ApplyArity {
                head: st.display(hd).to_string(),
                arg_types: hdtypes.len(),
                children: children.len(),
            });
        }
        let mut ctypes = Vec::with_capacity(args.len());
        for (i, &c) in args.iter().enumerate() {
            // an argument declared (Quote t) receives the argument
            // itself rather than its type: the implicit quote upcast
            let arg = if st.kind(hdtypes[i]) == Kind::QuoteType {
                c
            } else {
                st.lookup_type(c).ok_or_else(|| missing(st, c))?
            };
            ctypes.push(arg);
        }
        let mut ctx = Ctx::default();
        let mut visited = FnvHashSet::default();
        for (i, &ctype) in ctypes.iter().enumerate() {
            // matching against the argument of (Quote t) completes
            // the upcast
            let hdt = hdtypes[i];
            let hdt = if st.kind(hdt) == Kind::QuoteType {
                st.child(hdt, 0)
            } else {
                hdt
            };
            if !matching::match_expr_visited(st, hdt, ctype, &mut ctx, &mut visited) {
                let lhs = reduce::evaluate(st, hdtypes[i], &ctx);
                return Err(TypingError::ArgMismatch {
                    head: st.display(hd).to_string(),
                    index: i,
                    expected: st.display(lhs).to_string(),
                    expected_orig: st.display(hdtypes[i]).to_string(),
                    found: st.display(ctype).to_string(),
                });
            }
        }
        let ret = hdtypes
            .last()
            .copied()
            .ok_or(TypingError::IncorrectArity(Kind::FunctionType, 0))?;
        // the result type under the accumulated substitution
        Ok(reduce::evaluate(st, ret, &ctx))
    }

    fn get_literal_op_type(
        &mut self,
        st: &mut State,
        k: Kind,
        child_types: &[Expr],
    ) -> Result<Expr, TypingError> {
        // operators whose first child is a function are indexed by it
        let i = usize::from(
            !child_types.is_empty() && st.kind(child_types[0]) == Kind::FunctionType,
        );
        Self::check_arity(k, child_types.len() - i)?;
        let pick = |idx: usize| {
            child_types
                .get(idx)
                .copied()
                .ok_or(TypingError::IncorrectArity(k, child_types.len()))
        };
        use Kind::*;
        match k {
            EvalAdd | EvalMul | EvalNeg | EvalAnd | EvalOr | EvalXor | EvalNot => pick(0),
            EvalIfThenElse | EvalCons | EvalToList | EvalFromList => pick(1),
            EvalRequires => pick(2),
            // the first child after an indexing function
            EvalConcat | EvalExtract => pick(i),
            EvalIsEq | EvalIsNeg => Ok(st.mk_bool_type()),
            EvalHash | EvalIntDiv | EvalToInt | EvalLength | EvalFind => {
                Ok(self.get_or_set_literal_type_rule(st, Kind::Numeral))
            }
            EvalRatDiv | EvalToRat => Ok(self.get_or_set_literal_type_rule(st, Kind::Rational)),
            _ => Err(TypingError::UnknownLiteralOpType(k)),
        }
    }

    /// Reduce `e` under the substitution `ctx`.
    pub fn evaluate(&self, st: &mut State, e: Expr, ctx: &Ctx) -> Expr {
        reduce::evaluate(st, e, ctx)
    }

    /// Reduce a program or oracle call by one step, leaving the
    /// matched substitution in `new_ctx`.
    ///
    /// Returns the application of the inputs when the call does not
    /// reduce.
    pub fn evaluate_program(&self, st: &mut State, args: &[Expr], new_ctx: &mut Ctx) -> Expr {
        match reduce::evaluate_program_internal(st, args, new_ctx) {
            Some(body) => st.ensure_hashed(body),
            None => st.mk_expr(Kind::Apply, args.to_vec()),
        }
    }

    /// Reduce the literal operator `k` on the given arguments.
    ///
    /// Returns the operator applied to the inputs when it does not
    /// reduce.
    pub fn evaluate_literal_op(&self, st: &mut State, k: Kind, args: &[Expr]) -> Expr {
        match reduce::evaluate_literal_op_internal(st, k, args) {
            Some(r) => st.ensure_hashed(r),
            None => st.mk_expr(k, args.to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Literal;

    fn num(st: &mut State, i: i64) -> Expr {
        st.mk_literal(Literal::Numeral(i.into()))
    }

    fn setup() -> (State, TypeChecker, Expr) {
        let mut st = State::new();
        let mut tc = TypeChecker::new(&Options::default());
        let ty = st.mk_type();
        let int = st.mk_symbol(Kind::Const, "Int", ty);
        tc.set_literal_type_rule(&st, Kind::Numeral, int);
        (st, tc, int)
    }

    #[test]
    fn arity_gate() {
        use Kind::*;
        assert!(TypeChecker::check_arity(Nil, 0).is_ok());
        assert!(TypeChecker::check_arity(Nil, 1).is_err());
        for k in [EvalIsEq, EvalIntDiv, EvalRatDiv, EvalToBv, EvalFind, EvalCons] {
            assert!(TypeChecker::check_arity(k, 2).is_ok());
            assert!(TypeChecker::check_arity(k, 1).is_err());
            assert!(TypeChecker::check_arity(k, 3).is_err());
        }
        for k in [EvalAdd, EvalMul, EvalAnd, EvalOr, EvalXor, EvalConcat] {
            assert!(TypeChecker::check_arity(k, 1).is_err());
            assert!(TypeChecker::check_arity(k, 2).is_ok());
            assert!(TypeChecker::check_arity(k, 7).is_ok());
        }
        for k in [
            ProofType, EvalHash, EvalNot, EvalNeg, EvalIsNeg, EvalLength, EvalToInt, EvalToRat,
            EvalToString, EvalToList, EvalFromList,
        ] {
            assert!(TypeChecker::check_arity(k, 1).is_ok());
            assert!(TypeChecker::check_arity(k, 2).is_err());
        }
        for k in [EvalRequires, EvalIfThenElse] {
            assert!(TypeChecker::check_arity(k, 3).is_ok());
            assert!(TypeChecker::check_arity(k, 2).is_err());
        }
        assert!(TypeChecker::check_arity(EvalExtract, 2).is_ok());
        assert!(TypeChecker::check_arity(EvalExtract, 3).is_ok());
        assert!(TypeChecker::check_arity(EvalExtract, 4).is_err());
        assert_eq!(
            TypeChecker::check_arity(Apply, 2),
            Err(TypingError::UnknownArity(Apply))
        );
    }

    #[test]
    fn lambda_application() {
        let (mut st, mut tc, int) = setup();
        let x = st.mk_symbol(Kind::Param, "x", int);
        let params = st.mk_expr(Kind::Tuple, vec![x]);
        let lam = st.mk_expr(Kind::Lambda, vec![params, x]);
        let seven = num(&mut st, 7);
        let app = st.mk_expr(Kind::Apply, vec![lam, seven]);
        assert_eq!(tc.get_type(&mut st, app), Ok(int));
        // the lambda itself got a function type
        let lam_ty = st.lookup_type(lam).expect("cached");
        assert_eq!(st.kind(lam_ty), Kind::FunctionType);
        assert_eq!(st.children(lam_ty), &[int, int]);
    }

    #[test]
    fn non_function_head() {
        let (mut st, mut tc, int) = setup();
        let a = st.mk_symbol(Kind::Const, "a", int);
        let seven = num(&mut st, 7);
        let app = st.mk_expr(Kind::Apply, vec![a, seven]);
        let err = tc.get_type(&mut st, app).unwrap_err();
        assert_eq!(err, TypingError::NonFunctionHead("a".to_string()));
        assert!(err.to_string().starts_with("Non-function"));
    }

    #[test]
    fn apply_arity_mismatch() {
        let (mut st, mut tc, int) = setup();
        let f_ty = st.mk_function_type(&[int], int);
        let f = st.mk_symbol(Kind::Const, "f", f_ty);
        let seven = num(&mut st, 7);
        let app = st.mk_expr(Kind::Apply, vec![f, seven, seven]);
        assert!(matches!(
            tc.get_type(&mut st, app),
            Err(TypingError::ApplyArity { .. })
        ));
    }

    #[test]
    fn argument_mismatch() {
        let (mut st, mut tc, int) = setup();
        let ty = st.mk_type();
        let string = st.mk_symbol(Kind::Const, "Str", ty);
        tc.set_literal_type_rule(&st, Kind::String, string);
        let f_ty = st.mk_function_type(&[int], int);
        let f = st.mk_symbol(Kind::Const, "f", f_ty);
        let s = st.mk_literal(Literal::String("s".into()));
        let app = st.mk_expr(Kind::Apply, vec![f, s]);
        let err = tc.get_type(&mut st, app).unwrap_err();
        assert!(matches!(err, TypingError::ArgMismatch { index: 0, .. }));
        assert!(err.to_string().starts_with("Unexpected argument type 0"));
    }

    #[test]
    fn polymorphic_result_type() {
        // f : (-> T (list T)); the result type is evaluated under the
        // substitution induced by matching the argument type
        let (mut st, mut tc, int) = setup();
        let ty = st.mk_type();
        let t = st.mk_symbol(Kind::Param, "T", ty);
        let list_ty = st.mk_function_type(&[ty], ty);
        let list = st.mk_symbol(Kind::Const, "list", list_ty);
        let list_t = st.mk_expr(Kind::Apply, vec![list, t]);
        let g_ty = st.mk_function_type(&[t], list_t);
        let g = st.mk_symbol(Kind::Const, "g", g_ty);
        let seven = num(&mut st, 7);
        let app = st.mk_expr(Kind::Apply, vec![g, seven]);
        let list_int = st.mk_expr(Kind::Apply, vec![list, int]);
        assert_eq!(tc.get_type(&mut st, app), Ok(list_int));
    }

    #[test]
    fn quote_upcast_is_syntactic() {
        // h : (-> (Quote x) x): the argument is passed itself, not
        // its type, and the result is the captured term
        let (mut st, mut tc, int) = setup();
        let x = st.mk_symbol(Kind::Param, "x", int);
        let quote_x = st.mk_expr(Kind::QuoteType, vec![x]);
        let h_ty = st.mk_function_type(&[quote_x], x);
        let h = st.mk_symbol(Kind::Const, "h", h_ty);
        let seven = num(&mut st, 7);
        let app = st.mk_expr(Kind::Apply, vec![h, seven]);
        assert_eq!(tc.get_type(&mut st, app), Ok(seven));
        // the capture is not checked against the parameter's declared
        // type: a string is captured all the same, and any conflict
        // only surfaces when the result type is used
        let s = st.mk_literal(Literal::String("s".into()));
        let ty = st.mk_type();
        let string = st.mk_symbol(Kind::Const, "Str", ty);
        tc.set_literal_type_rule(&st, Kind::String, string);
        let app = st.mk_expr(Kind::Apply, vec![h, s]);
        assert_eq!(tc.get_type(&mut st, app), Ok(s));
    }

    #[test]
    fn type_cache_is_stable() {
        let (mut st, mut tc, int) = setup();
        let f_ty = st.mk_function_type(&[int], int);
        let f = st.mk_symbol(Kind::Const, "f", f_ty);
        let seven = num(&mut st, 7);
        let app = st.mk_expr(Kind::Apply, vec![f, seven]);
        let t1 = tc.get_type(&mut st, app);
        let t2 = tc.get_type(&mut st, app);
        assert_eq!(t1, Ok(int));
        assert_eq!(t1, t2);
    }

    #[test]
    fn builtin_literal_types() {
        let mut st = State::new();
        let mut tc = TypeChecker::new(&Options::default());
        // without a configured rule, literal kinds default to their
        // builtin type constants
        let five = num(&mut st, 5);
        let t1 = tc.get_type(&mut st, five).expect("typed");
        let six = num(&mut st, 6);
        let t2 = tc.get_type(&mut st, six).expect("typed");
        assert_eq!(t1, t2);
        let b = st.mk_true();
        assert_eq!(tc.get_type(&mut st, b), Ok(st.mk_bool_type()));
    }

    #[test]
    fn literal_rule_with_self() {
        // numerals are typed by sign, via a rule mentioning `self`
        let mut st = State::new();
        let mut tc = TypeChecker::new(&Options::default());
        let ty = st.mk_type();
        let pos = st.mk_symbol(Kind::Const, "Pos", ty);
        let neg = st.mk_symbol(Kind::Const, "Neg", ty);
        let this = st.mk_self();
        let is_neg = st.mk_expr(Kind::EvalIsNeg, vec![this]);
        let rule = st.mk_expr(Kind::EvalIfThenElse, vec![is_neg, neg, pos]);
        tc.set_literal_type_rule(&st, Kind::Numeral, rule);
        let five = num(&mut st, 5);
        assert_eq!(tc.get_type(&mut st, five), Ok(pos));
        let minus = num(&mut st, -3);
        assert_eq!(tc.get_type(&mut st, minus), Ok(neg));
    }

    #[test]
    fn proof_type_requires_bool() {
        let (mut st, mut tc, int) = setup();
        let b = st.mk_bool_type();
        let p = st.mk_symbol(Kind::Const, "p", b);
        let proof = st.mk_expr(Kind::ProofType, vec![p]);
        assert_eq!(tc.get_type(&mut st, proof), Ok(st.mk_type()));
        let a = st.mk_symbol(Kind::Const, "a", int);
        let proof = st.mk_expr(Kind::ProofType, vec![a]);
        assert_eq!(tc.get_type(&mut st, proof), Err(TypingError::NonBoolProofArg));
    }

    #[test]
    fn nil_is_its_own_type() {
        let mut st = State::new();
        let mut tc = TypeChecker::new(&Options::default());
        let nil = st.mk_expr(Kind::Nil, Vec::new());
        assert_eq!(tc.get_type(&mut st, nil), Ok(nil));
    }

    #[test]
    fn literal_op_types() {
        let (mut st, mut tc, int) = setup();
        let one = num(&mut st, 1);
        let two = num(&mut st, 2);
        let add = st.mk_expr(Kind::EvalAdd, vec![one, two]);
        assert_eq!(tc.get_type(&mut st, add), Ok(int));
        let eq = st.mk_expr(Kind::EvalIsEq, vec![one, two]);
        assert_eq!(tc.get_type(&mut st, eq), Ok(st.mk_bool_type()));
        // to_bv has no return type rule, faithfully to its source
        let tobv = st.mk_expr(Kind::EvalToBv, vec![two, one]);
        assert_eq!(
            tc.get_type(&mut st, tobv),
            Err(TypingError::UnknownLiteralOpType(Kind::EvalToBv))
        );
    }

    #[test]
    fn program_definitions_are_untyped() {
        let (mut st, mut tc, int) = setup();
        let f_ty = st.mk_function_type(&[int], int);
        let f = st.mk_symbol(Kind::ProgramConst, "f", f_ty);
        let zero = num(&mut st, 0);
        let lhs = st.mk_expr(Kind::Apply, vec![f, zero]);
        let def = st.define_program(f, vec![(lhs, zero)]);
        assert_eq!(
            tc.get_type(&mut st, def),
            Err(TypingError::UnknownKind(Kind::Program))
        );
    }

    #[test]
    fn evaluate_literal_op_convention() {
        let (mut st, tc, int) = setup();
        let args = [num(&mut st, 2), num(&mut st, 3), num(&mut st, 4)];
        let nine = num(&mut st, 9);
        assert_eq!(tc.evaluate_literal_op(&mut st, Kind::EvalAdd, &args), nine);
        // a stuck operator returns its own application
        let x = st.mk_symbol(Kind::Param, "x", int);
        let one = num(&mut st, 1);
        let args = [x, one];
        let stuck = tc.evaluate_literal_op(&mut st, Kind::EvalAdd, &args);
        assert_eq!(st.kind(stuck), Kind::EvalAdd);
        assert_eq!(st.children(stuck), &[x, one]);
    }

    #[test]
    fn evaluate_program_convention() {
        let (mut st, tc, int) = setup();
        let f_ty = st.mk_function_type(&[int], int);
        let f = st.mk_symbol(Kind::ProgramConst, "f", f_ty);
        let x = st.mk_symbol(Kind::Param, "x", int);
        let lhs = st.mk_expr(Kind::Apply, vec![f, x]);
        st.define_program(f, vec![(lhs, x)]);
        let seven = num(&mut st, 7);
        let mut ctx = Ctx::default();
        // one step: the case body, with the match left in ctx
        let args = [f, seven];
        assert_eq!(tc.evaluate_program(&mut st, &args, &mut ctx), x);
        assert_eq!(ctx.get(&x), Some(&seven));
        // non-ground arguments do not reduce: the application is
        // returned instead
        let y = st.mk_symbol(Kind::Param, "y", int);
        ctx.clear();
        let args = [f, y];
        let ret = tc.evaluate_program(&mut st, &args, &mut ctx);
        assert_eq!(st.kind(ret), Kind::Apply);
        assert_eq!(st.children(ret), &[f, y]);
    }

    #[test]
    #[should_panic(expected = "cannot set type rule")]
    fn unregistered_literal_rule_is_fatal() {
        let mut st = State::new();
        let mut tc = TypeChecker::new(&Options {
            normalize_decimal: true,
            ..Options::default()
        });
        let ty = st.mk_type();
        let dec = st.mk_symbol(Kind::Const, "Dec", ty);
        // decimals are normalized away, so their rule cannot be set
        tc.set_literal_type_rule(&st, Kind::Decimal, dec);
    }

    #[test]
    #[should_panic(expected = "already set")]
    fn conflicting_literal_rule_is_fatal() {
        let (mut st, mut tc, int) = setup();
        // setting the same rule again is fine
        tc.set_literal_type_rule(&st, Kind::Numeral, int);
        let ty = st.mk_type();
        let other = st.mk_symbol(Kind::Const, "Other", ty);
        tc.set_literal_type_rule(&st, Kind::Numeral, other);
    }
}
