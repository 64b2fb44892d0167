//! The shared state of a checking session.
//!
//! [`State`] owns the expression arena and every table the kernel
//! consults: the type cache, the symbol environment, the program and
//! oracle tables, and the constructor attributes of declared
//! operators. A frontend populates the tables between checking
//! calls; the kernel reads them and grows the caches.

use crate::expr::DisplayExpr;
use crate::{Expr, Exprs, Kind, Literal};
use fnv::FnvHashMap;
use std::rc::Rc;

/// Frontend options consumed during literal type-rule initialization.
///
/// When a frontend normalizes decimal (resp. hexadecimal) literals
/// into rationals (resp. binaries) at construction, the corresponding
/// literal kind never occurs and gets no type rule.
#[derive(Clone, Copy, Debug, Default)]
pub struct Options {
    pub normalize_decimal: bool,
    pub normalize_hexadecimal: bool,
}

/// Constructor attribute of a declared operator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Attr {
    None,
    /// Variadic to the left, with a nil element.
    LeftAssocNil,
    /// Variadic to the right, with a nil element.
    RightAssocNil,
}

/// Attributes attached to an operator symbol.
///
/// The list primitives require `attr_cons` to be one of the
/// associative-with-nil attributes and `attr_cons_term` to hold the
/// nil element.
#[derive(Clone, Copy, Debug)]
pub struct AppInfo {
    pub attr_cons: Attr,
    pub attr_cons_term: Option<Expr>,
}

/// A native implementation attached to a program constant.
pub type NativeFn = Rc<dyn Fn(&mut State, &[Expr]) -> Option<Expr>>;

/// The tables of a checking session.
pub struct State {
    exprs: Exprs,
    /// Declared or computed type of each node.
    type_cache: FnvHashMap<Expr, Expr>,
    /// Name to symbol node.
    symbols: FnvHashMap<String, Expr>,
    /// Program constant to its definition node.
    programs: FnvHashMap<Expr, Expr>,
    /// Oracle constant to its external command.
    oracles: FnvHashMap<Expr, String>,
    app_info: FnvHashMap<Expr, AppInfo>,
    natives: FnvHashMap<Expr, NativeFn>,
    builtin_types: FnvHashMap<Kind, Expr>,
    ty: Expr,
    bool_ty: Expr,
    abstract_ty: Expr,
    true_: Expr,
    false_: Expr,
    self_param: Expr,
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl State {
    pub fn new() -> Self {
        let mut exprs = Exprs::new();
        let ty = exprs.mk_expr(Kind::Type, Vec::new());
        let bool_ty = exprs.mk_expr(Kind::BoolType, Vec::new());
        let abstract_ty = exprs.mk_expr(Kind::AbstractType, Vec::new());
        let true_ = exprs.mk_literal(Literal::Bool(true));
        let false_ = exprs.mk_literal(Literal::Bool(false));
        let self_param = exprs.mk_symbol(Kind::Param, "alf.self");
        Self {
            exprs,
            type_cache: FnvHashMap::default(),
            symbols: FnvHashMap::default(),
            programs: FnvHashMap::default(),
            oracles: FnvHashMap::default(),
            app_info: FnvHashMap::default(),
            natives: FnvHashMap::default(),
            builtin_types: FnvHashMap::default(),
            ty,
            bool_ty,
            abstract_ty,
            true_,
            false_,
            self_param,
        }
    }

    /// The type of types.
    pub fn mk_type(&self) -> Expr {
        self.ty
    }

    pub fn mk_bool_type(&self) -> Expr {
        self.bool_ty
    }

    pub fn mk_abstract_type(&self) -> Expr {
        self.abstract_ty
    }

    pub fn mk_true(&self) -> Expr {
        self.true_
    }

    pub fn mk_false(&self) -> Expr {
        self.false_
    }

    /// The distinguished parameter bound to a literal during
    /// evaluation of its type rule.
    pub fn mk_self(&self) -> Expr {
        self.self_param
    }

    /// The builtin type constant of a literal kind.
    pub fn mk_builtin_type(&mut self, k: Kind) -> Expr {
        if k == Kind::Boolean {
            return self.mk_bool_type();
        }
        if let Some(&t) = self.builtin_types.get(&k) {
            return t;
        }
        let name = match k {
            Kind::Numeral => "Int",
            Kind::Decimal => "Dec",
            Kind::Rational => "Rat",
            Kind::Binary => "Bin",
            Kind::Hexadecimal => "Hex",
            Kind::String => "Str",
            _ => return self.mk_abstract_type(),
        };
        let ty = self.mk_type();
        let t = self.exprs.mk_symbol(Kind::Const, name);
        self.type_cache.insert(t, ty);
        self.builtin_types.insert(k, t);
        t
    }

    /// A function type listing all argument types and the result.
    ///
    /// A function-type result is flattened into the combined list,
    /// which is what the right-associated declared form stores.
    pub fn mk_function_type(&mut self, args: &[Expr], ret: Expr) -> Expr {
        if args.is_empty() {
            return ret;
        }
        let mut children = args.to_vec();
        if self.exprs.kind(ret) == Kind::FunctionType {
            children.extend_from_slice(self.exprs.children(ret));
        } else {
            children.push(ret);
        }
        self.exprs.mk_expr(Kind::FunctionType, children)
    }

    /// See [`Exprs::mk_expr`].
    pub fn mk_expr(&mut self, kind: Kind, children: Vec<Expr>) -> Expr {
        self.exprs.mk_expr(kind, children)
    }

    /// See [`Exprs::mk_literal`].
    pub fn mk_literal(&mut self, lit: Literal) -> Expr {
        self.exprs.mk_literal(lit)
    }

    pub(crate) fn mk_transient(&mut self, kind: Kind, children: Vec<Expr>) -> Expr {
        self.exprs.mk_transient(kind, children)
    }

    /// Declare a symbol of the given kind and type, binding its name.
    pub fn mk_symbol(&mut self, kind: Kind, name: &str, ty: Expr) -> Expr {
        let e = self.exprs.mk_symbol(kind, name);
        self.symbols.insert(name.to_string(), e);
        self.type_cache.insert(e, ty);
        e
    }

    /// Resolve a previously declared name.
    pub fn get_symbol(&self, name: &str) -> Option<Expr> {
        self.symbols.get(name).copied()
    }

    /// The declared or previously computed type of a node.
    pub fn lookup_type(&self, e: Expr) -> Option<Expr> {
        self.type_cache.get(&e).copied()
    }

    pub(crate) fn cache_type(&mut self, e: Expr, ty: Expr) {
        debug_assert!(self.exprs.is_hashed(e));
        self.type_cache.insert(e, ty);
    }

    /// Bind a program constant to its cases, each a `(pattern, body)`
    /// pair whose pattern head is an application of the constant.
    pub fn define_program(&mut self, prog: Expr, cases: Vec<(Expr, Expr)>) -> Expr {
        let pairs = cases
            .into_iter()
            .map(|(lhs, rhs)| self.exprs.mk_expr(Kind::Tuple, vec![lhs, rhs]))
            .collect();
        let def = self.exprs.mk_expr(Kind::Program, pairs);
        self.programs.insert(prog, def);
        def
    }

    pub fn get_program(&self, e: Expr) -> Option<Expr> {
        self.programs.get(&e).copied()
    }

    /// Bind an oracle constant to an external command.
    pub fn define_oracle(&mut self, oracle: Expr, cmd: impl Into<String>) {
        self.oracles.insert(oracle, cmd.into());
    }

    pub fn get_oracle_cmd(&self, e: Expr) -> Option<&str> {
        self.oracles.get(&e).map(|s| s.as_str())
    }

    pub fn set_app_info(&mut self, e: Expr, info: AppInfo) {
        self.app_info.insert(e, info);
    }

    pub fn get_app_info(&self, e: Expr) -> Option<&AppInfo> {
        self.app_info.get(&e)
    }

    /// Attach a native implementation to a program constant; it is
    /// consulted before the interpreted cases.
    pub fn define_native(
        &mut self,
        prog: Expr,
        f: impl Fn(&mut State, &[Expr]) -> Option<Expr> + 'static,
    ) {
        self.natives.insert(prog, Rc::new(f));
    }

    pub(crate) fn get_native(&self, e: Expr) -> Option<NativeFn> {
        self.natives.get(&e).cloned()
    }

    /// A stable identifier of a hashed node.
    pub fn get_hash(&self, e: Expr) -> u64 {
        debug_assert!(self.exprs.is_hashed(e));
        e.index() as u64
    }

    pub fn kind(&self, e: Expr) -> Kind {
        self.exprs.kind(e)
    }

    pub fn children(&self, e: Expr) -> &[Expr] {
        self.exprs.children(e)
    }

    pub fn num_children(&self, e: Expr) -> usize {
        self.exprs.num_children(e)
    }

    pub fn child(&self, e: Expr, i: usize) -> Expr {
        self.exprs.child(e, i)
    }

    pub fn literal(&self, e: Expr) -> Option<&Literal> {
        self.exprs.literal(e)
    }

    pub fn name(&self, e: Expr) -> Option<&str> {
        self.exprs.name(e)
    }

    pub fn is_hashed(&self, e: Expr) -> bool {
        self.exprs.is_hashed(e)
    }

    pub fn is_ground(&self, e: Expr) -> bool {
        self.exprs.is_ground(e)
    }

    pub fn is_evaluatable(&self, e: Expr) -> bool {
        self.exprs.is_evaluatable(e)
    }

    /// See [`Exprs::ensure_hashed`].
    pub fn ensure_hashed(&mut self, e: Expr) -> Expr {
        self.exprs.ensure_hashed(e)
    }

    pub fn num_exprs(&self) -> usize {
        self.exprs.len()
    }

    pub fn display(&self, e: Expr) -> DisplayExpr {
        self.exprs.display(e)
    }
}
