//! The hash-consed expression DAG.
//!
//! Expressions are small [`Expr`] handles into an arena owned by
//! [`Exprs`]. Canonical ("hashed") nodes are interned: two hashed
//! nodes are handle-equal iff they are structurally equal. The
//! evaluator may also allocate *transient* nodes during reduction;
//! [`Exprs::ensure_hashed`] canonicalizes a transient DAG at the
//! boundary. The arena owns every node, transient or not, until
//! teardown.

use crate::{Kind, Literal};
use fnv::FnvHashMap;
use smallvec::SmallVec;
use std::fmt;

/// Handle to an expression node.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Expr(u32);

impl Expr {
    /// The arena index of this node, a stable identifier.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

type Children = SmallVec<[Expr; 4]>;

/// The payload of a leaf node.
#[derive(Clone, Debug)]
enum Payload {
    /// A literal value.
    Lit(Literal),
    /// The name of a declared symbol.
    Sym(String),
}

/// An expression node.
#[derive(Debug)]
struct ExprValue {
    kind: Kind,
    children: Children,
    payload: Option<Payload>,
    /// Canonical representative of its structure.
    hashed: bool,
    /// No `Param` in any descendant.
    ground: bool,
    /// Contains anything the evaluator may reduce or substitute.
    evaluatable: bool,
}

/// The expression arena and interning table.
#[derive(Default)]
pub struct Exprs {
    nodes: Vec<ExprValue>,
    interner: FnvHashMap<(Kind, Children, Option<Literal>), Expr>,
}

impl Exprs {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of allocated nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn get(&self, e: Expr) -> &ExprValue {
        &self.nodes[e.index()]
    }

    fn alloc(&mut self, kind: Kind, children: Children, payload: Option<Payload>, hashed: bool) -> Expr {
        let ground =
            kind != Kind::Param && children.iter().all(|&c| self.get(c).ground);
        let evaluatable = kind.is_literal_op()
            || matches!(kind, Kind::Param | Kind::ProgramConst | Kind::Oracle)
            || children.iter().any(|&c| self.get(c).evaluatable);
        let e = Expr(self.nodes.len() as u32);
        self.nodes.push(ExprValue {
            kind,
            children,
            payload,
            hashed,
            ground,
            evaluatable,
        });
        e
    }

    /// Return the unique hashed node of the given structure,
    /// constructing it only if absent.
    pub fn mk_expr(&mut self, kind: Kind, children: Vec<Expr>) -> Expr {
        let children = Children::from_vec(children);
        if let Some(&e) = self.interner.get(&(kind, children.clone(), None)) {
            return e;
        }
        let e = self.alloc(kind, children.clone(), None, true);
        self.interner.insert((kind, children, None), e);
        e
    }

    /// Return the unique hashed node carrying the given literal.
    pub fn mk_literal(&mut self, lit: Literal) -> Expr {
        let kind = lit.kind();
        if let Some(&e) = self.interner.get(&(kind, Children::new(), Some(lit.clone()))) {
            return e;
        }
        let e = self.alloc(kind, Children::new(), Some(Payload::Lit(lit.clone())), true);
        self.interner.insert((kind, Children::new(), Some(lit)), e);
        e
    }

    /// Allocate a fresh symbol node.
    ///
    /// Symbols are born hashed but never interned: each declaration
    /// yields a distinct node, even under the same name.
    pub fn mk_symbol(&mut self, kind: Kind, name: &str) -> Expr {
        debug_assert!(kind.is_symbol());
        self.alloc(kind, Children::new(), Some(Payload::Sym(name.to_string())), true)
    }

    /// Allocate a transient node, to be canonicalized by
    /// [`Self::ensure_hashed`] before it escapes.
    pub fn mk_transient(&mut self, kind: Kind, children: Vec<Expr>) -> Expr {
        self.alloc(kind, Children::from_vec(children), None, false)
    }

    /// Return a fully-hashed DAG structurally equal to `e`.
    ///
    /// Iterative post-order walk with a transient-to-canonical map;
    /// hashed subterms are kept as they are.
    pub fn ensure_hashed(&mut self, e: Expr) -> Expr {
        if self.get(e).hashed {
            return e;
        }
        let mut visited: FnvHashMap<Expr, Option<Expr>> = FnvHashMap::default();
        let mut visit = vec![e];
        while let Some(&cur) = visit.last() {
            if self.get(cur).hashed {
                visited.insert(cur, Some(cur));
                visit.pop();
                continue;
            }
            match visited.get(&cur) {
                None => {
                    visited.insert(cur, None);
                    visit.extend(self.get(cur).children.iter().copied());
                }
                Some(None) => {
                    visit.pop();
                    let node = self.get(cur);
                    debug_assert!(!node.kind.is_symbol(), "symbol nodes are born hashed");
                    let canonical = match &node.payload {
                        Some(Payload::Lit(lit)) => {
                            let lit = lit.clone();
                            self.mk_literal(lit)
                        }
                        _ => {
                            let kind = node.kind;
                            let children = node
                                .children
                                .iter()
                                .map(|c| visited.get(c).copied().flatten().unwrap_or(*c))
                                .collect();
                            self.mk_expr(kind, children)
                        }
                    };
                    visited.insert(cur, Some(canonical));
                }
                Some(Some(_)) => {
                    visit.pop();
                }
            }
        }
        visited.get(&e).copied().flatten().unwrap_or(e)
    }

    pub fn kind(&self, e: Expr) -> Kind {
        self.get(e).kind
    }

    pub fn children(&self, e: Expr) -> &[Expr] {
        &self.get(e).children
    }

    pub fn num_children(&self, e: Expr) -> usize {
        self.get(e).children.len()
    }

    pub fn child(&self, e: Expr, i: usize) -> Expr {
        self.get(e).children[i]
    }

    /// The literal payload of a literal node.
    pub fn literal(&self, e: Expr) -> Option<&Literal> {
        match &self.get(e).payload {
            Some(Payload::Lit(lit)) => Some(lit),
            _ => None,
        }
    }

    /// The name of a symbol node.
    pub fn name(&self, e: Expr) -> Option<&str> {
        match &self.get(e).payload {
            Some(Payload::Sym(name)) => Some(name),
            _ => None,
        }
    }

    pub fn is_hashed(&self, e: Expr) -> bool {
        self.get(e).hashed
    }

    pub fn is_ground(&self, e: Expr) -> bool {
        self.get(e).ground
    }

    pub fn is_evaluatable(&self, e: Expr) -> bool {
        self.get(e).evaluatable
    }

    /// Adaptor rendering `e` in surface syntax.
    pub fn display(&self, e: Expr) -> DisplayExpr {
        DisplayExpr { exprs: self, expr: e }
    }
}

/// Renders an expression in surface syntax, for diagnostics,
/// traces, and the oracle wire.
pub struct DisplayExpr<'e> {
    exprs: &'e Exprs,
    expr: Expr,
}

impl fmt::Display for DisplayExpr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let node = self.exprs.get(self.expr);
        match &node.payload {
            Some(Payload::Sym(name)) => return name.fmt(f),
            Some(Payload::Lit(lit)) => return lit.fmt(f),
            None => {}
        }
        if node.children.is_empty() {
            return node.kind.fmt(f);
        }
        write!(f, "(")?;
        if node.kind != Kind::Apply {
            write!(f, "{}", node.kind)?;
            write!(f, " ")?;
        }
        for (i, c) in node.children.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", self.exprs.display(*c))?;
        }
        write!(f, ")")
    }
}
