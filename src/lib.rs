#![forbid(unsafe_code)]

//! Type checking and side-condition evaluation for the AletheLF (ALF)
//! proof format.
//!
//! This is the core of an ALF proof checker: a dependently-typed term
//! language together with the three algorithms that check proof rule
//! applications — a type checker, a first-order matcher, and a
//! stack-machine evaluator. The core answers two questions about any
//! expression: what is its type, and what does it reduce to under a
//! substitution. The two reinforce each other: typing an application
//! matches the argument types against the declared ones, and the
//! declared result type is then *evaluated* under the substitution
//! the match produced, running user-defined side-condition programs
//! along the way.
//!
//! A checking session owns a [`State`]: the hash-consed expression
//! DAG plus the tables a frontend populates as declarations are
//! processed — types, programs, oracles, and constructor attributes.
//! Surface parsing, command dispatch, and option handling live in
//! such a frontend; the core only consumes expression handles.
//!
//! ~~~
//! use alfk::{Ctx, Kind, Literal, Options, State, TypeChecker};
//!
//! let mut st = State::new();
//! let mut tc = TypeChecker::new(&Options::default());
//!
//! // declare a type `Int` and make it the type of numerals
//! let ty = st.mk_type();
//! let int = st.mk_symbol(Kind::Const, "Int", ty);
//! tc.set_literal_type_rule(&st, Kind::Numeral, int);
//!
//! // ((lambda ((x : Int)) x) 7) is an Int
//! let x = st.mk_symbol(Kind::Param, "x", int);
//! let params = st.mk_expr(Kind::Tuple, vec![x]);
//! let lam = st.mk_expr(Kind::Lambda, vec![params, x]);
//! let seven = st.mk_literal(Literal::Numeral(7.into()));
//! let app = st.mk_expr(Kind::Apply, vec![lam, seven]);
//! assert_eq!(tc.get_type(&mut st, app), Ok(int));
//!
//! // programs reduce during checking: (double 21) ~> 42
//! let double_ty = st.mk_function_type(&[int], int);
//! let double = st.mk_symbol(Kind::ProgramConst, "double", double_ty);
//! let y = st.mk_symbol(Kind::Param, "y", int);
//! let lhs = st.mk_expr(Kind::Apply, vec![double, y]);
//! let rhs = st.mk_expr(Kind::EvalAdd, vec![y, y]);
//! st.define_program(double, vec![(lhs, rhs)]);
//! let n = st.mk_literal(Literal::Numeral(21.into()));
//! let call = st.mk_expr(Kind::Apply, vec![double, n]);
//! let result = tc.evaluate(&mut st, call, &Ctx::default());
//! assert_eq!(st.literal(result), Some(&Literal::Numeral(42.into())));
//! ~~~
//!
//! # Organisation
//!
//! The leaf data model lives at the top level: [`Kind`] tags,
//! [`Literal`] payloads, and the interned expression DAG in
//! [`Exprs`]. The [`State`] ties them to the session tables. The
//! algorithms live in the [`kernel`] module: matching, typing, and
//! reduction, plus the oracle boundary that shells out to external
//! commands and reads back a single expression.

#[macro_use]
extern crate log;

pub mod error;
mod expr;
mod kind;
mod literal;
mod state;

pub mod kernel;

pub use error::{Error, TypingError};
pub use expr::{DisplayExpr, Expr, Exprs};
pub use kernel::{Ctx, TypeChecker};
pub use kind::Kind;
pub use literal::{Bv, Integer, Literal, Rational};
pub use state::{AppInfo, Attr, NativeFn, Options, State};
