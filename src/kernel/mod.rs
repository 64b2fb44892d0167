//! The three algorithms of the core: matching, typing, evaluation.

pub mod matching;
mod oracle;
pub mod reduce;
pub mod typing;

use crate::{Expr, State};
use fnv::FnvHashMap;

/// A substitution from parameter nodes to expression nodes,
/// produced by the matcher and consumed by the evaluator.
pub type Ctx = FnvHashMap<Expr, Expr>;

/// Render a substitution for trace output.
pub(crate) fn display_ctx(st: &State, ctx: &Ctx) -> String {
    let mut out = String::from("[");
    for (i, (k, v)) in ctx.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&format!("{} -> {}", st.display(*k), st.display(*v)));
    }
    out.push(']');
    out
}

pub use typing::TypeChecker;
