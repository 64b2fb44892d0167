//! Reduction of expressions under substitutions.
//!
//! The evaluator is an explicit stack machine: each `EvFrame` holds
//! one term being reduced under one substitution, with its own
//! visited map and visit queue. A program call whose matched body
//! must be reduced under a fresh substitution pushes a new frame
//! rather than recursing, so deep proof terms cannot overflow the
//! native stack. A per-call memo trie keyed by canonical argument
//! tuples makes programs that recurse over shared subterms traverse
//! the DAG, not the tree.

use super::{display_ctx, matching, oracle, Ctx};
use crate::literal::Integer;
use crate::state::Attr;
use crate::{Expr, Kind, Literal, State};
use fnv::FnvHashMap;
use num_traits::ToPrimitive;

/// One term being reduced under one substitution.
struct EvFrame {
    /// The term this frame entered to reduce.
    init: Expr,
    /// The substitution in force.
    ctx: Ctx,
    /// Reducts of subterms within this frame; `None` marks a term
    /// whose children are still being processed.
    visited: FnvHashMap<Expr, Option<Expr>>,
    /// The subterms left to process.
    visit: Vec<Expr>,
    /// The memo-trie key under which to store the final reduct.
    result: Option<Vec<Expr>>,
}

impl EvFrame {
    fn new(init: Expr, ctx: Ctx, result: Option<Vec<Expr>>) -> Self {
        Self {
            init,
            ctx,
            visited: FnvHashMap::default(),
            visit: vec![init],
            result,
        }
    }
}

/// Memoization trie for program and oracle calls, keyed by the
/// canonical argument tuple.
#[derive(Default)]
struct ExprTrie {
    data: Option<Expr>,
    children: FnvHashMap<Expr, ExprTrie>,
}

impl ExprTrie {
    fn get(&self, key: &[Expr]) -> Option<Expr> {
        let mut node = self;
        for e in key {
            node = node.children.get(e)?;
        }
        node.data
    }

    fn set(&mut self, key: &[Expr], value: Expr) {
        let mut node = self;
        for e in key {
            node = node.children.entry(*e).or_default();
        }
        node.data = Some(value);
    }
}

/// Reduce `e` under the substitution `ctx` to a normal form.
///
/// Stuck subterms are left in their partially-reduced form; the
/// returned expression is canonical.
pub fn evaluate(st: &mut State, e: Expr, ctx: &Ctx) -> Expr {
    debug!("evaluate {} {}", st.display(e), display_ctx(st, ctx));
    let mut trie = ExprTrie::default();
    let mut estack = vec![EvFrame::new(e, ctx.clone(), None)];
    let mut evaluated = e;
    while let Some(fi) = estack.len().checked_sub(1) {
        let mut new_frame = None;
        while let Some(&cur) = estack[fi].visit.last() {
            trace!(
                "visit {} {}, depth={}",
                st.display(cur),
                display_ctx(st, &estack[fi].ctx),
                estack.len()
            );
            // the term stays the same if it is not evaluatable and
            // either it is ground or the substitution is empty
            if !st.is_evaluatable(cur) && (st.is_ground(cur) || estack[fi].ctx.is_empty()) {
                let frame = &mut estack[fi];
                frame.visited.insert(cur, Some(cur));
                frame.visit.pop();
                continue;
            }
            if st.kind(cur) == Kind::Param {
                let frame = &mut estack[fi];
                let r = frame.ctx.get(&cur).copied().unwrap_or(cur);
                frame.visited.insert(cur, Some(r));
                frame.visit.pop();
                continue;
            }
            let ck = st.kind(cur);
            match estack[fi].visited.get(&cur).copied() {
                None => {
                    // first visit: mark and schedule the children;
                    // for ite only the condition, to short-circuit
                    // branch selection
                    let children: Vec<Expr> = st.children(cur).to_vec();
                    let frame = &mut estack[fi];
                    frame.visited.insert(cur, None);
                    if ck == Kind::EvalIfThenElse {
                        if let Some(&cond) = children.first() {
                            frame.visit.push(cond);
                        }
                    } else {
                        frame.visit.extend(children);
                    }
                }
                Some(Some(_)) => {
                    estack[fi].visit.pop();
                }
                Some(None) => {
                    let children: Vec<Expr> = st.children(cur).to_vec();
                    let cchildren: Vec<Option<Expr>> = children
                        .iter()
                        .map(|c| estack[fi].visited.get(c).copied().flatten())
                        .collect();
                    let cchanged = children
                        .iter()
                        .zip(&cchildren)
                        .any(|(c, cc)| cc.map_or(false, |cc| cc != *c));
                    let mut result = None;
                    let mut can_evaluate = true;
                    match ck {
                        Kind::Apply => {
                            let hd = cchildren.first().copied().flatten();
                            let is_call = hd
                                .map_or(false, |hd| {
                                    matches!(st.kind(hd), Kind::ProgramConst | Kind::Oracle)
                                });
                            if is_call {
                                // canonical argument tuple, also the memo key
                                let mut key = Vec::with_capacity(cchildren.len());
                                for (c, cc) in children.iter().zip(&cchildren) {
                                    key.push(st.ensure_hashed(cc.unwrap_or(*c)));
                                }
                                if let Some(r) = trie.get(&key) {
                                    trace!("evaluated via cached program call");
                                    result = Some(r);
                                } else {
                                    let mut new_ctx = Ctx::default();
                                    match evaluate_program_internal(st, &key, &mut new_ctx) {
                                        Some(body)
                                            if !st.is_ground(body) && !new_ctx.is_empty() =>
                                        {
                                            // the body needs its own scope
                                            new_frame =
                                                Some(EvFrame::new(body, new_ctx, Some(key)));
                                        }
                                        Some(body) => {
                                            trie.set(&key, body);
                                            result = Some(body);
                                        }
                                        None => {}
                                    }
                                }
                            }
                        }
                        Kind::EvalIfThenElse => {
                            match cchildren.first().copied().flatten() {
                                Some(cond) if st.kind(cond) == Kind::Boolean => {
                                    let branch = match st.literal(cond) {
                                        Some(Literal::Bool(true)) => 1,
                                        _ => 2,
                                    };
                                    match cchildren.get(branch).copied().flatten() {
                                        Some(v) => {
                                            trace!("evaluated via ite");
                                            result = Some(v);
                                        }
                                        None => {
                                            // evaluate the selected branch first
                                            can_evaluate = false;
                                            let frame = &mut estack[fi];
                                            frame.visit.push(children[branch]);
                                        }
                                    }
                                }
                                _ => {
                                    // reduce both branches, so that
                                    // substitution into a non-ground ite
                                    // stays accurate
                                    for i in 1..children.len() {
                                        if cchildren[i].is_none() {
                                            can_evaluate = false;
                                            estack[fi].visit.push(children[i]);
                                        }
                                    }
                                }
                            }
                        }
                        k if k.is_literal_op() => {
                            let args: Vec<Expr> = children
                                .iter()
                                .zip(&cchildren)
                                .map(|(c, cc)| cc.unwrap_or(*c))
                                .collect();
                            result = evaluate_literal_op_internal(st, k, &args);
                        }
                        _ => {}
                    }
                    if new_frame.is_some() {
                        break;
                    }
                    if can_evaluate {
                        let r = match result {
                            Some(r) => r,
                            None if cchanged => {
                                let new_children = children
                                    .iter()
                                    .zip(&cchildren)
                                    .map(|(c, cc)| cc.unwrap_or(*c))
                                    .collect();
                                st.mk_transient(ck, new_children)
                            }
                            None => cur,
                        };
                        let frame = &mut estack[fi];
                        frame.visited.insert(cur, Some(r));
                        frame.visit.pop();
                    }
                }
            }
        }
        if let Some(frame) = new_frame {
            estack.push(frame);
            continue;
        }
        // the frame is done: deliver its result
        let Some(frame) = estack.pop() else { break };
        let result = frame
            .visited
            .get(&frame.init)
            .copied()
            .flatten()
            .unwrap_or(frame.init);
        trace!(
            "EVALUATE {} {} = {}",
            st.display(frame.init),
            display_ctx(st, &frame.ctx),
            st.display(result)
        );
        if let Some(key) = frame.result {
            trie.set(&key, result);
        }
        evaluated = result;
        if let Some(parent) = estack.last_mut() {
            if let Some(&target) = parent.visit.last() {
                parent.visited.insert(target, Some(result));
                parent.visit.pop();
            }
        }
    }
    st.ensure_hashed(evaluated)
}

/// Try to reduce a program or oracle call by one step.
///
/// `children` is the full application, head included. On a match,
/// returns the case body and leaves the matched substitution in
/// `new_ctx`; the caller reduces the body under it. `None` means the
/// application does not reduce.
pub(crate) fn evaluate_program_internal(
    st: &mut State,
    children: &[Expr],
    new_ctx: &mut Ctx,
) -> Option<Expr> {
    if !children.iter().all(|&c| st.is_ground(c)) {
        // do not evaluate on non-ground arguments
        return None;
    }
    let &hd = children.first()?;
    match st.kind(hd) {
        Kind::ProgramConst => {
            if let Some(native) = st.get_native(hd) {
                trace!("RUN program {}", st.display(hd));
                return (*native)(st, children);
            }
            let prog = st.get_program(hd)?;
            trace!("INTERPRET program {}", st.display(hd));
            let nargs = children.len();
            for i in 0..st.num_children(prog) {
                let case = st.child(prog, i);
                new_ctx.clear();
                let lhs = st.child(case, 0);
                if nargs != st.num_children(lhs) {
                    warn!(
                        "bad number of arguments provided in function call to {}",
                        st.display(hd)
                    );
                    return None;
                }
                let mut matched = true;
                for j in 1..nargs {
                    if !matching::match_expr(st, st.child(lhs, j), children[j], new_ctx) {
                        matched = false;
                        break;
                    }
                }
                if matched {
                    trace!(
                        "...matches {}, ctx = {}",
                        st.display(lhs),
                        display_ctx(st, new_ctx)
                    );
                    return Some(st.child(case, 1));
                }
            }
            trace!("...failed to match");
            None
        }
        Kind::Oracle => oracle::invoke(st, hd, &children[1..]),
        _ => None,
    }
}

/// Try to reduce a literal operator applied to already-reduced
/// arguments. `None` means the application does not reduce.
pub(crate) fn evaluate_literal_op_internal(
    st: &mut State,
    k: Kind,
    args: &[Expr],
) -> Option<Expr> {
    match k {
        Kind::EvalIsEq => {
            let a = st.ensure_hashed(*args.first()?);
            let b = st.ensure_hashed(*args.get(1)?);
            if a == b {
                // eagerly true on identical operands, even non-ground
                return Some(st.mk_true());
            }
            if args.iter().all(|&x| st.is_ground(x)) {
                // ground but distinct operands are unequal, whether
                // or not they are values
                return Some(st.mk_false());
            }
            return None;
        }
        Kind::EvalIfThenElse => {
            // eagerly select on a boolean condition, even if the
            // branches are non-ground
            return match st.literal(*args.first()?) {
                Some(Literal::Bool(b)) => args.get(if *b { 1 } else { 2 }).copied(),
                _ => None,
            };
        }
        Kind::EvalRequires => {
            let a = st.ensure_hashed(*args.first()?);
            let b = st.ensure_hashed(*args.get(1)?);
            if a == b {
                // eagerly return the body, even non-ground
                return args.get(2).copied();
            }
            if args.iter().all(|&x| st.is_ground(x)) {
                trace!(
                    "REQUIRES: failed {} == {}",
                    st.display(a),
                    st.display(b)
                );
            }
            return None;
        }
        Kind::EvalHash => {
            let e = *args.first()?;
            if !st.is_ground(e) {
                return None;
            }
            let eh = st.ensure_hashed(e);
            let h = st.get_hash(eh);
            return Some(st.mk_literal(Literal::Numeral(h.into())));
        }
        _ => {}
    }
    if !args.iter().all(|&x| st.is_ground(x)) {
        trace!("{} does not evaluate (non-ground)", k);
        return None;
    }
    // if all arguments are values, run the literal evaluator
    let lits: Option<Vec<&Literal>> = args.iter().map(|&a| st.literal(a)).collect();
    if let Some(lits) = lits {
        let value = Literal::evaluate(k, &lits);
        return match value {
            Some(value) => Some(st.mk_literal(value)),
            None => {
                trace!("{} does not value-evaluate", k);
                None
            }
        };
    }
    // otherwise, maybe a list operation over an associative operator
    let op = *args.first()?;
    let info = st.get_app_info(op)?;
    let is_left = match info.attr_cons {
        Attr::LeftAssocNil => true,
        Attr::RightAssocNil => false,
        Attr::None => return None,
    };
    let nil = info.attr_cons_term?;
    trace!("EVALUATE-LIT (list) {} is_left={}", k, is_left);
    let (tail_index, head_index) = if is_left { (1, 2) } else { (2, 1) };
    let mut hargs = Vec::new();
    let ret;
    match k {
        Kind::EvalToList => {
            let harg = *args.get(1)?;
            if harg == nil {
                // already nil
                return Some(harg);
            }
            let a = get_nary_children(st, harg, op, None, &mut hargs, is_left, 0)?;
            if !hargs.is_empty() {
                // already a list
                return Some(harg);
            }
            // wrap as a singleton list
            ret = nil;
            hargs.push(a);
        }
        Kind::EvalFromList => {
            // with two or more elements this is a no-op
            let a = get_nary_children(st, *args.get(1)?, op, Some(nil), &mut hargs, is_left, 2);
            if hargs.len() == 1 {
                // eliminate the singleton list; an ill-terminated
                // spine does not evaluate
                a?;
                return hargs.first().copied();
            }
            return args.get(1).copied();
        }
        Kind::EvalCons => {
            let mut targs = Vec::new();
            // the tail must already be in list form
            get_nary_children(st, *args.get(tail_index)?, op, Some(nil), &mut targs, is_left, 0)?;
            hargs.push(*args.get(head_index)?);
            ret = *args.get(tail_index)?;
        }
        Kind::EvalConcat => {
            let mut targs = Vec::new();
            get_nary_children(st, *args.get(tail_index)?, op, Some(nil), &mut targs, is_left, 0)?;
            get_nary_children(st, *args.get(head_index)?, op, Some(nil), &mut hargs, is_left, 0)?;
            // the tail is taken verbatim
            ret = *args.get(tail_index)?;
        }
        Kind::EvalExtract => {
            // the n-th element of the spine
            let n = match st.literal(*args.get(2)?) {
                Some(Literal::Numeral(i)) => i.to_u32()? as usize,
                _ => return None,
            };
            let _ = get_nary_children(st, *args.get(1)?, op, Some(nil), &mut hargs, is_left, n + 1);
            if hargs.len() == n + 1 {
                return hargs.last().copied();
            }
            return None;
        }
        Kind::EvalFind => {
            let _ = get_nary_children(st, *args.get(1)?, op, Some(nil), &mut hargs, is_left, 0);
            let needle = *args.get(2)?;
            let idx = match hargs.iter().position(|&e| e == needle) {
                Some(i) => Integer::from(i),
                None => Integer::from(-1),
            };
            return Some(st.mk_literal(Literal::Numeral(idx)));
        }
        _ => return None,
    }
    // rebuild the spine bottom-up over transient applications;
    // the boundary canonicalizes
    let mut ret = ret;
    let n = hargs.len();
    for i in 0..n {
        let head = hargs[if is_left { i } else { n - 1 - i }];
        let (fst, snd) = if is_left { (ret, head) } else { (head, ret) };
        ret = st.mk_transient(Kind::Apply, vec![op, fst, snd]);
    }
    Some(ret)
}

/// Walk the associative spine of `op`-applications, pushing the
/// element of each step onto `children` and returning the tail.
///
/// `max_children` bounds the walk (0 means no limit). When
/// `check_nil` is given, an exhausted spine must end exactly at that
/// nil element.
fn get_nary_children(
    st: &State,
    e: Expr,
    op: Expr,
    check_nil: Option<Expr>,
    children: &mut Vec<Expr>,
    is_left: bool,
    max_children: usize,
) -> Option<Expr> {
    let orig = e;
    let mut e = e;
    while st.kind(e) == Kind::Apply && st.num_children(e) == 3 && st.child(e, 0) == op {
        children.push(st.child(e, if is_left { 2 } else { 1 }));
        e = st.child(e, if is_left { 1 } else { 2 });
        if children.len() == max_children {
            return Some(e);
        }
    }
    if let Some(nil) = check_nil {
        if e != nil {
            warn!(
                "expected associative application to end in {}, got {}",
                st.display(nil),
                st.display(orig)
            );
            return None;
        }
    }
    Some(e)
}
