//! Invocation of oracle commands and decoding of their responses.
//!
//! An oracle call runs the oracle's command through the shell with
//! each argument rendered in surface syntax, separated by single
//! spaces. The subprocess must exit with code zero and print exactly
//! one expression on stdout. Decoding a response is the one place
//! the core reads surface syntax itself: a minimal S-expression
//! reader over the environment's declared symbols and the literal
//! token forms.

use crate::literal::{Bv, Integer, Literal, Rational};
use crate::{Expr, Kind, State};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use std::fmt::Write as _;
use std::process::Command;

/// Run the oracle `hd` on the given arguments.
///
/// `None` on a spawn failure, a non-zero exit, or an unparseable
/// response; the caller treats this as "no reduction".
pub(crate) fn invoke(st: &mut State, hd: Expr, args: &[Expr]) -> Option<Expr> {
    debug!("invoke oracle {}", st.display(hd));
    let mut call = st.get_oracle_cmd(hd)?.to_string();
    for &a in args {
        let _ = write!(call, " {}", st.display(a));
    }
    trace!("call oracle: {}", call);
    let output = match Command::new("sh").arg("-c").arg(&call).output() {
        Ok(output) => output,
        Err(err) => {
            trace!("...failed to spawn: {}", err);
            return None;
        }
    };
    if !output.status.success() {
        trace!("...failed to run");
        return None;
    }
    let response = String::from_utf8_lossy(&output.stdout);
    trace!("...got response {:?}", response);
    let ret = parse_expr(st, &response);
    if ret.is_none() {
        trace!("...unparseable response");
    }
    ret
}

enum Token {
    Open,
    Close,
    Atom(String),
    Str(String),
}

fn tokenize(input: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            '"' => {
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next()? {
                        // a doubled quote is an escaped quote
                        '"' => {
                            if chars.peek() == Some(&'"') {
                                chars.next();
                                s.push('"');
                            } else {
                                break;
                            }
                        }
                        c => s.push(c),
                    }
                }
                tokens.push(Token::Str(s));
            }
            _ => {
                let mut s = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || c == '(' || c == ')' || c == '"' {
                        break;
                    }
                    s.push(c);
                    chars.next();
                }
                tokens.push(Token::Atom(s));
            }
        }
    }
    Some(tokens)
}

/// Parse exactly one expression in surface syntax.
pub(crate) fn parse_expr(st: &mut State, input: &str) -> Option<Expr> {
    let tokens = tokenize(input)?;
    let mut pos = 0;
    let e = parse_term(st, &tokens, &mut pos)?;
    if pos != tokens.len() {
        return None;
    }
    Some(e)
}

fn parse_term(st: &mut State, tokens: &[Token], pos: &mut usize) -> Option<Expr> {
    match tokens.get(*pos)? {
        Token::Open => {
            *pos += 1;
            let mut children = Vec::new();
            loop {
                if let Token::Close = tokens.get(*pos)? {
                    *pos += 1;
                    break;
                }
                children.push(parse_term(st, tokens, pos)?);
            }
            if children.is_empty() {
                return None;
            }
            Some(st.mk_expr(Kind::Apply, children))
        }
        Token::Close => None,
        Token::Str(s) => {
            let s = s.clone();
            *pos += 1;
            Some(st.mk_literal(Literal::String(s)))
        }
        Token::Atom(a) => {
            let a = a.clone();
            *pos += 1;
            parse_atom(st, &a)
        }
    }
}

fn parse_atom(st: &mut State, a: &str) -> Option<Expr> {
    if a == "true" {
        return Some(st.mk_true());
    }
    if a == "false" {
        return Some(st.mk_false());
    }
    if let Some(bits) = a.strip_prefix("#b") {
        if bits.is_empty() || !bits.chars().all(|c| c == '0' || c == '1') {
            return None;
        }
        let value = BigUint::parse_bytes(bits.as_bytes(), 2)?;
        return Some(st.mk_literal(Literal::Binary(Bv::new(bits.len(), value))));
    }
    if let Some(digits) = a.strip_prefix("#x") {
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let value = BigUint::parse_bytes(digits.as_bytes(), 16)?;
        return Some(st.mk_literal(Literal::Hexadecimal(Bv::new(4 * digits.len(), value))));
    }
    if let Ok(i) = a.parse::<Integer>() {
        return Some(st.mk_literal(Literal::Numeral(i)));
    }
    if let Some(lit) = parse_rational(a) {
        return Some(st.mk_literal(lit));
    }
    if let Some(lit) = parse_decimal(a) {
        return Some(st.mk_literal(lit));
    }
    st.get_symbol(a)
}

fn parse_rational(a: &str) -> Option<Literal> {
    let (n, d) = a.split_once('/')?;
    let n: Integer = n.parse().ok()?;
    let d: Integer = d.parse().ok()?;
    if d.is_zero() {
        return None;
    }
    Some(Literal::Rational(Rational::new(n, d)))
}

fn parse_decimal(a: &str) -> Option<Literal> {
    let (i, f) = a.split_once('.')?;
    if f.is_empty() || !f.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let int: Integer = i.parse().ok()?;
    let frac: Integer = f.parse().ok()?;
    let mut scale = Integer::one();
    for _ in 0..f.len() {
        scale *= 10;
    }
    let numer = &int * &scale + if i.starts_with('-') { -frac } else { frac };
    Some(Literal::Decimal(Rational::new(numer, scale)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_literals() {
        let mut st = State::new();
        let e = parse_expr(&mut st, " 42 ").expect("parses");
        assert_eq!(st.literal(e), Some(&Literal::Numeral(42.into())));
        let e = parse_expr(&mut st, "-7").expect("parses");
        assert_eq!(st.literal(e), Some(&Literal::Numeral((-7).into())));
        let e = parse_expr(&mut st, "true").expect("parses");
        assert_eq!(e, st.mk_true());
        let e = parse_expr(&mut st, "1/2").expect("parses");
        assert_eq!(
            st.literal(e),
            Some(&Literal::Rational(Rational::new(1.into(), 2.into())))
        );
        let e = parse_expr(&mut st, "2.50").expect("parses");
        assert_eq!(
            st.literal(e),
            Some(&Literal::Decimal(Rational::new(5.into(), 2.into())))
        );
        let e = parse_expr(&mut st, "#b0101").expect("parses");
        assert_eq!(
            st.literal(e),
            Some(&Literal::Binary(Bv::new(4, 5u32.into())))
        );
        let e = parse_expr(&mut st, "#xff").expect("parses");
        assert_eq!(
            st.literal(e),
            Some(&Literal::Hexadecimal(Bv::new(8, 255u32.into())))
        );
        let e = parse_expr(&mut st, "\"a\"\"b\"").expect("parses");
        assert_eq!(st.literal(e), Some(&Literal::String("a\"b".into())));
    }

    #[test]
    fn parses_applications() {
        let mut st = State::new();
        let ty = st.mk_type();
        let int = st.mk_symbol(Kind::Const, "Int", ty);
        let f_ty = st.mk_function_type(&[int, int], int);
        let f = st.mk_symbol(Kind::Const, "f", f_ty);
        let e = parse_expr(&mut st, "(f 1 (f 2 3))").expect("parses");
        assert_eq!(st.kind(e), Kind::Apply);
        assert_eq!(st.child(e, 0), f);
        let inner = st.child(e, 2);
        assert_eq!(st.kind(inner), Kind::Apply);
        assert_eq!(st.num_children(inner), 3);
    }

    #[test]
    fn rejects_garbage() {
        let mut st = State::new();
        // undeclared symbol
        assert_eq!(parse_expr(&mut st, "unknown"), None);
        // more than one expression
        assert_eq!(parse_expr(&mut st, "1 2"), None);
        // unbalanced parentheses
        assert_eq!(parse_expr(&mut st, "(1 2"), None);
        // empty input and empty application
        assert_eq!(parse_expr(&mut st, ""), None);
        assert_eq!(parse_expr(&mut st, "()"), None);
    }

    #[test]
    fn round_trips_display() {
        let mut st = State::new();
        let ty = st.mk_type();
        let int = st.mk_symbol(Kind::Const, "Int", ty);
        let f_ty = st.mk_function_type(&[int], int);
        let f = st.mk_symbol(Kind::Const, "f", f_ty);
        let one = st.mk_literal(Literal::Numeral(1.into()));
        let e = st.mk_expr(Kind::Apply, vec![f, one]);
        let rendered = st.display(e).to_string();
        assert_eq!(parse_expr(&mut st, &rendered), Some(e));
    }
}
