//! Literal values and the primitive operations on them.
//!
//! A [`Literal`] is the payload of a literal expression node:
//! arbitrary-precision integers and rationals, booleans,
//! unbounded-width bit-vectors, decimals and hexadecimals
//! (which a frontend may or may not normalize), and strings.
//!
//! [`Literal::evaluate`] is the value-level half of the evaluator:
//! it receives the already-reduced literal arguments of a literal
//! operator and either computes a new literal or reports that the
//! operator does not evaluate on these operands.

use crate::Kind;
use num_bigint::{BigInt, BigUint};
use num_integer::Integer as _;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::fmt;
use std::fmt::Display as _;

/// Arbitrary-precision integer.
pub type Integer = BigInt;

/// Arbitrary-precision rational.
pub type Rational = num_rational::BigRational;

/// An unbounded-width bit-vector: a width and a value below `2^width`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Bv {
    width: usize,
    value: BigUint,
}

fn mask(width: usize) -> BigUint {
    (BigUint::one() << width) - BigUint::one()
}

impl Bv {
    /// Create a bit-vector, truncating the value to the given width.
    pub fn new(width: usize, value: BigUint) -> Self {
        let value = value & mask(width);
        Self { width, value }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn value(&self) -> &BigUint {
        &self.value
    }

    /// Bitwise complement.
    pub fn not(&self) -> Self {
        Self::new(self.width, self.value.clone() ^ mask(self.width))
    }

    fn zip(&self, other: &Self, f: impl FnOnce(&BigUint, &BigUint) -> BigUint) -> Option<Self> {
        if self.width != other.width {
            return None;
        }
        Some(Self::new(self.width, f(&self.value, &other.value)))
    }

    pub fn and(&self, other: &Self) -> Option<Self> {
        self.zip(other, |a, b| a & b)
    }

    pub fn or(&self, other: &Self) -> Option<Self> {
        self.zip(other, |a, b| a | b)
    }

    pub fn xor(&self, other: &Self) -> Option<Self> {
        self.zip(other, |a, b| a ^ b)
    }

    /// Addition modulo `2^width`.
    pub fn add(&self, other: &Self) -> Option<Self> {
        self.zip(other, |a, b| a + b)
    }

    /// Multiplication modulo `2^width`.
    pub fn mul(&self, other: &Self) -> Option<Self> {
        self.zip(other, |a, b| a * b)
    }

    /// Concatenation; `self` provides the high bits.
    pub fn concat(&self, other: &Self) -> Self {
        let value = (self.value.clone() << other.width) | other.value.clone();
        Self::new(self.width + other.width, value)
    }

    /// The bits `i ..= j`, counting from the least significant bit.
    pub fn extract(&self, i: usize, j: usize) -> Option<Self> {
        if i > j || j >= self.width {
            return None;
        }
        Some(Self::new(j - i + 1, self.value.clone() >> i))
    }
}

impl fmt::Display for Bv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#b")?;
        for i in (0..self.width).rev() {
            let bit = (&self.value >> i) & BigUint::one();
            write!(f, "{}", if bit.is_zero() { '0' } else { '1' })?;
        }
        Ok(())
    }
}

/// A literal value.
///
/// `Decimal` and `Hexadecimal` carry the same payloads as
/// `Rational` and `Binary`; they are distinct kinds so that a
/// frontend can keep them unnormalized.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Literal {
    Bool(bool),
    Numeral(Integer),
    Decimal(Rational),
    Rational(Rational),
    Binary(Bv),
    Hexadecimal(Bv),
    String(String),
}

fn as_int(l: &Literal) -> Option<&Integer> {
    match l {
        Literal::Numeral(i) => Some(i),
        _ => None,
    }
}

fn as_rat(l: &Literal) -> Option<&Rational> {
    match l {
        Literal::Decimal(r) | Literal::Rational(r) => Some(r),
        _ => None,
    }
}

/// Rational reading that also accepts numerals, for the division operators.
fn to_rat(l: &Literal) -> Option<Rational> {
    match l {
        Literal::Numeral(i) => Some(Rational::from_integer(i.clone())),
        Literal::Decimal(r) | Literal::Rational(r) => Some(r.clone()),
        _ => None,
    }
}

fn as_bv(l: &Literal) -> Option<&Bv> {
    match l {
        Literal::Binary(b) | Literal::Hexadecimal(b) => Some(b),
        _ => None,
    }
}

fn as_bool(l: &Literal) -> Option<bool> {
    match l {
        Literal::Bool(b) => Some(*b),
        _ => None,
    }
}

fn as_str(l: &Literal) -> Option<&str> {
    match l {
        Literal::String(s) => Some(s),
        _ => None,
    }
}

fn as_index(l: &Literal) -> Option<usize> {
    as_int(l)?.to_usize()
}

impl Literal {
    /// The expression kind carrying this literal.
    pub fn kind(&self) -> Kind {
        match self {
            Self::Bool(_) => Kind::Boolean,
            Self::Numeral(_) => Kind::Numeral,
            Self::Decimal(_) => Kind::Decimal,
            Self::Rational(_) => Kind::Rational,
            Self::Binary(_) => Kind::Binary,
            Self::Hexadecimal(_) => Kind::Hexadecimal,
            Self::String(_) => Kind::String,
        }
    }

    /// Evaluate the literal operator `k` on literal arguments.
    ///
    /// Returns `None` if the operator does not evaluate on these
    /// operands: wrong operand kinds, width mismatches, division by
    /// zero, or out-of-range positions.
    pub fn evaluate(k: Kind, args: &[&Literal]) -> Option<Literal> {
        match k {
            Kind::EvalAdd => fold_arith(args, |a, b| a + b, |a, b| a + b, Bv::add),
            Kind::EvalMul => fold_arith(args, |a, b| a * b, |a, b| a * b, Bv::mul),
            Kind::EvalNeg => match args {
                [Literal::Numeral(i)] => Some(Literal::Numeral(-i)),
                [l] => Some(Literal::Rational(-as_rat(l)?.clone())),
                _ => None,
            },
            Kind::EvalIsNeg => match args {
                [Literal::Numeral(i)] => Some(Literal::Bool(i.is_negative())),
                [l] => Some(Literal::Bool(as_rat(l)?.is_negative())),
                _ => None,
            },
            Kind::EvalIntDiv => match args {
                [a, b] => {
                    let (a, b) = (as_int(a)?, as_int(b)?);
                    if b.is_zero() {
                        return None;
                    }
                    Some(Literal::Numeral(a.div_floor(b)))
                }
                _ => None,
            },
            Kind::EvalRatDiv => match args {
                [a, b] => {
                    let (a, b) = (to_rat(a)?, to_rat(b)?);
                    if b.is_zero() {
                        return None;
                    }
                    Some(Literal::Rational(a / b))
                }
                _ => None,
            },
            Kind::EvalNot => match args {
                [Literal::Bool(b)] => Some(Literal::Bool(!b)),
                [l] => Some(Literal::Binary(as_bv(l)?.not())),
                _ => None,
            },
            Kind::EvalAnd => fold_bits(args, |a, b| a && b, Bv::and),
            Kind::EvalOr => fold_bits(args, |a, b| a || b, Bv::or),
            Kind::EvalXor => fold_bits(args, |a, b| a ^ b, Bv::xor),
            Kind::EvalConcat => {
                let (first, rest) = args.split_first()?;
                match first {
                    Literal::String(s) => {
                        let mut acc = s.clone();
                        for a in rest {
                            acc.push_str(as_str(a)?);
                        }
                        Some(Literal::String(acc))
                    }
                    _ => {
                        let mut acc = as_bv(first)?.clone();
                        for a in rest {
                            acc = acc.concat(as_bv(a)?);
                        }
                        Some(Literal::Binary(acc))
                    }
                }
            }
            Kind::EvalLength => match args {
                [Literal::String(s)] => Some(Literal::Numeral(s.chars().count().into())),
                [l] => Some(Literal::Numeral(as_bv(l)?.width().into())),
                _ => None,
            },
            Kind::EvalFind => match args {
                [s, t] => {
                    let (s, t) = (as_str(s)?, as_str(t)?);
                    let idx = match s.find(t) {
                        Some(byte) => s[..byte].chars().count().into(),
                        None => Integer::from(-1),
                    };
                    Some(Literal::Numeral(idx))
                }
                _ => None,
            },
            Kind::EvalExtract => match args {
                [Literal::String(s), i, j] => {
                    let (i, j) = (as_index(i)?, as_index(j)?);
                    let sub: String = s.chars().skip(i).take((j + 1).saturating_sub(i)).collect();
                    Some(Literal::String(sub))
                }
                [b, i, j] => {
                    let bv = as_bv(b)?.extract(as_index(i)?, as_index(j)?)?;
                    Some(Literal::Binary(bv))
                }
                _ => None,
            },
            Kind::EvalToInt => match args {
                [Literal::Numeral(i)] => Some(Literal::Numeral(i.clone())),
                [Literal::Decimal(r) | Literal::Rational(r)] => {
                    Some(Literal::Numeral(r.floor().to_integer()))
                }
                [l] => Some(Literal::Numeral(as_bv(l)?.value().clone().into())),
                _ => None,
            },
            Kind::EvalToRat => match args {
                [l] => Some(Literal::Rational(to_rat(l)?)),
                _ => None,
            },
            Kind::EvalToString => match args {
                [Literal::String(s)] => Some(Literal::String(s.clone())),
                [l @ (Literal::Numeral(_)
                | Literal::Decimal(_)
                | Literal::Rational(_)
                | Literal::Binary(_)
                | Literal::Hexadecimal(_))] => Some(Literal::String(l.to_string())),
                _ => None,
            },
            Kind::EvalToBv => match args {
                [w, v] => {
                    let width = as_index(w)?;
                    let value = match v {
                        Literal::Numeral(i) => {
                            let m = BigInt::one() << width;
                            i.mod_floor(&m).to_biguint()?
                        }
                        l => as_bv(l)?.value().clone(),
                    };
                    Some(Literal::Binary(Bv::new(width, value)))
                }
                _ => None,
            },
            _ => None,
        }
    }
}

/// Fold a chainable arithmetic operator over all arguments,
/// which must share one of the three numeric shapes.
fn fold_arith(
    args: &[&Literal],
    int_op: fn(Integer, &Integer) -> Integer,
    rat_op: fn(Rational, &Rational) -> Rational,
    bv_op: fn(&Bv, &Bv) -> Option<Bv>,
) -> Option<Literal> {
    let (first, rest) = args.split_first()?;
    match first {
        Literal::Numeral(i) => {
            let mut acc = i.clone();
            for a in rest {
                acc = int_op(acc, as_int(a)?);
            }
            Some(Literal::Numeral(acc))
        }
        Literal::Decimal(_) | Literal::Rational(_) => {
            let mut acc = as_rat(first)?.clone();
            for a in rest {
                acc = rat_op(acc, as_rat(a)?);
            }
            Some(Literal::Rational(acc))
        }
        _ => {
            let mut acc = as_bv(first)?.clone();
            for a in rest {
                acc = bv_op(&acc, as_bv(a)?)?;
            }
            Some(Literal::Binary(acc))
        }
    }
}

/// Fold a boolean or bitwise operator over all arguments.
fn fold_bits(
    args: &[&Literal],
    bool_op: fn(bool, bool) -> bool,
    bv_op: fn(&Bv, &Bv) -> Option<Bv>,
) -> Option<Literal> {
    let (first, rest) = args.split_first()?;
    match first {
        Literal::Bool(b) => {
            let mut acc = *b;
            for a in rest {
                acc = bool_op(acc, as_bool(a)?);
            }
            Some(Literal::Bool(acc))
        }
        _ => {
            let mut acc = as_bv(first)?.clone();
            for a in rest {
                acc = bv_op(&acc, as_bv(a)?)?;
            }
            Some(Literal::Binary(acc))
        }
    }
}

/// Print a rational as a decimal expansion if it has one,
/// falling back to the fraction notation otherwise.
fn fmt_decimal(r: &Rational, f: &mut fmt::Formatter) -> fmt::Result {
    // a reduced fraction terminates iff the denominator is 2^a * 5^b
    let mut denom = r.denom().clone();
    let (two, five) = (Integer::from(2), Integer::from(5));
    let mut digits = 0usize;
    while (&denom % &two).is_zero() {
        denom /= &two;
        digits += 1;
    }
    let mut fives = 0usize;
    while (&denom % &five).is_zero() {
        denom /= &five;
        fives += 1;
    }
    if !denom.is_one() {
        return r.fmt(f);
    }
    let digits = digits.max(fives).max(1);
    let mut scale = Integer::one();
    for _ in 0..digits {
        scale *= 10;
    }
    let scaled = r.numer().abs() * &scale / r.denom();
    let (int, frac) = scaled.div_rem(&scale);
    if r.is_negative() {
        write!(f, "-")?;
    }
    write!(f, "{}.{:0>width$}", int, frac.to_string(), width = digits)
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Bool(b) => b.fmt(f),
            Self::Numeral(i) => i.fmt(f),
            Self::Decimal(r) => fmt_decimal(r, f),
            Self::Rational(r) => r.fmt(f),
            Self::Binary(b) => b.fmt(f),
            Self::Hexadecimal(b) => {
                if b.width() % 4 != 0 {
                    return b.fmt(f);
                }
                write!(f, "#x")?;
                for i in (0..b.width() / 4).rev() {
                    let nibble = ((b.value() >> (4 * i)) & BigUint::from(15u8)).to_u8();
                    match nibble {
                        Some(n) => write!(f, "{:x}", n)?,
                        None => return Err(fmt::Error),
                    }
                }
                Ok(())
            }
            Self::String(s) => {
                write!(f, "\"")?;
                for c in s.chars() {
                    if c == '"' {
                        write!(f, "\"\"")?;
                    } else {
                        write!(f, "{}", c)?;
                    }
                }
                write!(f, "\"")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(i: i64) -> Literal {
        Literal::Numeral(i.into())
    }

    fn rat(n: i64, d: i64) -> Literal {
        Literal::Rational(Rational::new(n.into(), d.into()))
    }

    fn bv(width: usize, value: u64) -> Literal {
        Literal::Binary(Bv::new(width, value.into()))
    }

    fn eval(k: Kind, args: &[Literal]) -> Option<Literal> {
        let args: Vec<&Literal> = args.iter().collect();
        Literal::evaluate(k, &args)
    }

    #[test]
    fn arith() {
        assert_eq!(eval(Kind::EvalAdd, &[num(2), num(3), num(4)]), Some(num(9)));
        assert_eq!(eval(Kind::EvalMul, &[num(2), num(3)]), Some(num(6)));
        assert_eq!(eval(Kind::EvalAdd, &[rat(1, 2), rat(1, 3)]), Some(rat(5, 6)));
        assert_eq!(eval(Kind::EvalNeg, &[num(5)]), Some(num(-5)));
        // mixed operand kinds do not evaluate
        assert_eq!(eval(Kind::EvalAdd, &[num(1), rat(1, 2)]), None);
    }

    #[test]
    fn division() {
        assert_eq!(eval(Kind::EvalIntDiv, &[num(7), num(2)]), Some(num(3)));
        assert_eq!(eval(Kind::EvalIntDiv, &[num(-7), num(2)]), Some(num(-4)));
        assert_eq!(eval(Kind::EvalIntDiv, &[num(1), num(0)]), None);
        assert_eq!(eval(Kind::EvalRatDiv, &[num(1), num(2)]), Some(rat(1, 2)));
        assert_eq!(eval(Kind::EvalRatDiv, &[rat(1, 2), num(0)]), None);
    }

    #[test]
    fn sign() {
        assert_eq!(eval(Kind::EvalIsNeg, &[num(-1)]), Some(Literal::Bool(true)));
        assert_eq!(eval(Kind::EvalIsNeg, &[rat(1, 2)]), Some(Literal::Bool(false)));
    }

    #[test]
    fn boolean() {
        let (t, f) = (Literal::Bool(true), Literal::Bool(false));
        assert_eq!(eval(Kind::EvalNot, &[t.clone()]), Some(f.clone()));
        assert_eq!(eval(Kind::EvalAnd, &[t.clone(), t.clone(), f.clone()]), Some(f.clone()));
        assert_eq!(eval(Kind::EvalOr, &[f.clone(), t.clone()]), Some(t.clone()));
        assert_eq!(eval(Kind::EvalXor, &[t.clone(), t]), Some(f));
    }

    #[test]
    fn bitvectors() {
        assert_eq!(eval(Kind::EvalAdd, &[bv(4, 9), bv(4, 9)]), Some(bv(4, 2)));
        assert_eq!(eval(Kind::EvalAnd, &[bv(4, 0b1100), bv(4, 0b1010)]), Some(bv(4, 0b1000)));
        assert_eq!(eval(Kind::EvalNot, &[bv(4, 0b1100)]), Some(bv(4, 0b0011)));
        // width mismatch
        assert_eq!(eval(Kind::EvalAnd, &[bv(4, 1), bv(8, 1)]), None);
        assert_eq!(eval(Kind::EvalConcat, &[bv(2, 0b10), bv(2, 0b01)]), Some(bv(4, 0b1001)));
        assert_eq!(eval(Kind::EvalExtract, &[bv(8, 0b1011_0110), num(1), num(4)]), Some(bv(4, 0b1011)));
        assert_eq!(eval(Kind::EvalExtract, &[bv(8, 0), num(4), num(8)]), None);
        assert_eq!(eval(Kind::EvalLength, &[bv(8, 0)]), Some(num(8)));
    }

    #[test]
    fn strings() {
        let s = |x: &str| Literal::String(x.to_string());
        assert_eq!(eval(Kind::EvalConcat, &[s("foo"), s("bar")]), Some(s("foobar")));
        assert_eq!(eval(Kind::EvalLength, &[s("héllo")]), Some(num(5)));
        assert_eq!(eval(Kind::EvalFind, &[s("abcd"), s("cd")]), Some(num(2)));
        assert_eq!(eval(Kind::EvalFind, &[s("abcd"), s("e")]), Some(num(-1)));
        assert_eq!(eval(Kind::EvalExtract, &[s("abcde"), num(1), num(3)]), Some(s("bcd")));
        assert_eq!(eval(Kind::EvalExtract, &[s("abc"), num(2), num(0)]), Some(s("")));
    }

    #[test]
    fn conversions() {
        assert_eq!(eval(Kind::EvalToInt, &[rat(7, 2)]), Some(num(3)));
        assert_eq!(eval(Kind::EvalToInt, &[bv(4, 11)]), Some(num(11)));
        assert_eq!(eval(Kind::EvalToRat, &[num(3)]), Some(rat(3, 1)));
        assert_eq!(eval(Kind::EvalToString, &[num(42)]), Some(Literal::String("42".into())));
        assert_eq!(eval(Kind::EvalToBv, &[num(4), num(5)]), Some(bv(4, 5)));
        // two's complement of a negative value
        assert_eq!(eval(Kind::EvalToBv, &[num(4), num(-1)]), Some(bv(4, 15)));
    }

    #[test]
    fn display() {
        assert_eq!(bv(4, 0b0101).to_string(), "#b0101");
        assert_eq!(Literal::Hexadecimal(Bv::new(8, 0xa5u32.into())).to_string(), "#xa5");
        assert_eq!(Literal::Decimal(Rational::new(15.into(), 10.into())).to_string(), "1.5");
        assert_eq!(Literal::String("a\"b".into()).to_string(), "\"a\"\"b\"");
    }
}
