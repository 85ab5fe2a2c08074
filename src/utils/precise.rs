//! Precise - exact decimal arithmetic over string-encoded numbers
//!
//! Venues report prices, amounts and fees as strings. Every derived quantity
//! (cost, remaining, fee sums) is computed here on a scaled `BigInt` so no
//! binary floating-point rounding ever enters the pipeline.

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::errors::{CcxtError, CcxtResult};

/// Fractional digits kept by `string_div` when no precision is given
pub const DEFAULT_DIV_PRECISION: i32 = 18;

/// Largest `|exponent|` accepted in scientific notation
pub const MAX_EXPONENT: i32 = 1000;

fn pow10(exponent: u32) -> BigInt {
    num_traits::pow(BigInt::from(10), exponent as usize)
}

/// Decimal number `integer * 10^-decimals`
#[derive(Clone, Debug)]
pub struct Precise {
    pub integer: BigInt,
    pub decimals: i32,
}

impl Precise {
    pub fn new(integer: BigInt, decimals: i32) -> Self {
        Precise { integer, decimals }
    }

    pub fn from_i64(value: i64) -> Self {
        Precise::new(BigInt::from(value), 0)
    }

    /// Parse a decimal string (`-12.5`, `+3`, `.5`, `1.5e-3`)
    ///
    /// Anything else, including the empty string, fails with `NumericError`.
    pub fn parse(number: &str) -> CcxtResult<Precise> {
        let malformed = || CcxtError::numeric(format!("malformed decimal string: {number:?}"));

        let lower = number.to_ascii_lowercase();
        let (mantissa, exponent) = match lower.split_once('e') {
            Some((m, e)) => {
                let exp: i32 = e.parse().map_err(|_| malformed())?;
                if exp.unsigned_abs() > MAX_EXPONENT as u32 {
                    return Err(CcxtError::numeric(format!(
                        "exponent out of range (|e| <= {MAX_EXPONENT}): {number:?}"
                    )));
                }
                (m, exp)
            }
            None => (lower.as_str(), 0),
        };

        let (negative, unsigned) = match mantissa.as_bytes().first() {
            Some(b'-') => (true, &mantissa[1..]),
            Some(b'+') => (false, &mantissa[1..]),
            _ => (false, mantissa),
        };

        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        let digits_only = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if whole.len() + fraction.len() == 0 || !digits_only(whole) || !digits_only(fraction) {
            return Err(malformed());
        }

        let digits = format!("{whole}{fraction}");
        let mut integer = BigInt::from_str(&digits).map_err(|_| malformed())?;
        if negative {
            integer = -integer;
        }

        let decimals = i32::try_from(fraction.len())
            .ok()
            .and_then(|scale| scale.checked_sub(exponent))
            .ok_or_else(malformed)?;

        Ok(Precise { integer, decimals })
    }

    /// Both operands rescaled to the larger decimal count
    fn aligned(&self, other: &Precise) -> (BigInt, BigInt, i32) {
        match self.decimals.cmp(&other.decimals) {
            Ordering::Equal => (self.integer.clone(), other.integer.clone(), self.decimals),
            Ordering::Less => {
                let scale = pow10((other.decimals - self.decimals) as u32);
                (&self.integer * scale, other.integer.clone(), other.decimals)
            }
            Ordering::Greater => {
                let scale = pow10((self.decimals - other.decimals) as u32);
                (self.integer.clone(), &other.integer * scale, self.decimals)
            }
        }
    }

    pub fn add(&self, other: &Precise) -> Precise {
        let (a, b, decimals) = self.aligned(other);
        Precise::new(a + b, decimals)
    }

    pub fn sub(&self, other: &Precise) -> Precise {
        let (a, b, decimals) = self.aligned(other);
        Precise::new(a - b, decimals)
    }

    pub fn mul(&self, other: &Precise) -> Precise {
        Precise::new(&self.integer * &other.integer, self.decimals + other.decimals)
    }

    /// Quotient truncated to `precision` fractional digits
    pub fn div(&self, other: &Precise, precision: i32) -> CcxtResult<Precise> {
        if other.integer.is_zero() {
            return Err(CcxtError::numeric("division by zero"));
        }
        let distance = precision
            .checked_sub(self.decimals)
            .and_then(|d| d.checked_add(other.decimals))
            .ok_or_else(|| CcxtError::numeric("division scale out of range"))?;
        let numerator = match distance.cmp(&0) {
            Ordering::Equal => self.integer.clone(),
            Ordering::Less => &self.integer / pow10(distance.unsigned_abs()),
            Ordering::Greater => &self.integer * pow10(distance as u32),
        };
        Ok(Precise::new(numerator / &other.integer, precision))
    }

    pub fn modulo(&self, other: &Precise) -> CcxtResult<Precise> {
        if other.integer.is_zero() {
            return Err(CcxtError::numeric("modulo by zero"));
        }
        let (a, b, decimals) = self.aligned(other);
        Ok(Precise::new(a % b, decimals))
    }

    pub fn abs(&self) -> Precise {
        Precise::new(self.integer.abs(), self.decimals)
    }

    pub fn neg(&self) -> Precise {
        Precise::new(-&self.integer, self.decimals)
    }

    pub fn is_zero(&self) -> bool {
        self.integer.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.integer.is_negative()
    }

    pub fn gt(&self, other: &Precise) -> bool {
        self.cmp(other) == Ordering::Greater
    }

    pub fn ge(&self, other: &Precise) -> bool {
        self.cmp(other) != Ordering::Less
    }

    pub fn lt(&self, other: &Precise) -> bool {
        self.cmp(other) == Ordering::Less
    }

    pub fn le(&self, other: &Precise) -> bool {
        self.cmp(other) != Ordering::Greater
    }

    pub fn equals(&self, other: &Precise) -> bool {
        self.cmp(other) == Ordering::Equal
    }

    /// Strip trailing zeros from the scaled integer
    pub fn reduce(&mut self) {
        if self.integer.is_zero() {
            self.decimals = 0;
            return;
        }
        let ten = BigInt::from(10);
        while (&self.integer % &ten).is_zero() {
            self.integer /= &ten;
            self.decimals -= 1;
        }
    }

    fn reduced(&self) -> Precise {
        let mut copy = self.clone();
        copy.reduce();
        copy
    }

    // Static string operations

    /// `a + b`
    pub fn string_add(a: &str, b: &str) -> CcxtResult<String> {
        Ok(Precise::parse(a)?.add(&Precise::parse(b)?).to_string())
    }

    /// `a - b`
    pub fn string_sub(a: &str, b: &str) -> CcxtResult<String> {
        Ok(Precise::parse(a)?.sub(&Precise::parse(b)?).to_string())
    }

    /// `a * b`
    pub fn string_mul(a: &str, b: &str) -> CcxtResult<String> {
        Ok(Precise::parse(a)?.mul(&Precise::parse(b)?).to_string())
    }

    /// `a / b`, truncated to `precision` (default 18) fractional digits
    pub fn string_div(a: &str, b: &str, precision: Option<i32>) -> CcxtResult<String> {
        let quotient = Precise::parse(a)?.div(
            &Precise::parse(b)?,
            precision.unwrap_or(DEFAULT_DIV_PRECISION),
        )?;
        Ok(quotient.to_string())
    }

    pub fn string_mod(a: &str, b: &str) -> CcxtResult<String> {
        Ok(Precise::parse(a)?.modulo(&Precise::parse(b)?)?.to_string())
    }

    pub fn string_abs(a: &str) -> CcxtResult<String> {
        Ok(Precise::parse(a)?.abs().to_string())
    }

    pub fn string_neg(a: &str) -> CcxtResult<String> {
        Ok(Precise::parse(a)?.neg().to_string())
    }

    pub fn string_min(a: &str, b: &str) -> CcxtResult<String> {
        Ok(Precise::parse(a)?.min(Precise::parse(b)?).to_string())
    }

    pub fn string_max(a: &str, b: &str) -> CcxtResult<String> {
        Ok(Precise::parse(a)?.max(Precise::parse(b)?).to_string())
    }

    pub fn string_cmp(a: &str, b: &str) -> CcxtResult<Ordering> {
        Ok(Precise::parse(a)?.cmp(&Precise::parse(b)?))
    }

    pub fn string_eq(a: &str, b: &str) -> CcxtResult<bool> {
        Ok(Precise::string_cmp(a, b)? == Ordering::Equal)
    }

    pub fn string_gt(a: &str, b: &str) -> CcxtResult<bool> {
        Ok(Precise::string_cmp(a, b)? == Ordering::Greater)
    }

    pub fn string_ge(a: &str, b: &str) -> CcxtResult<bool> {
        Ok(Precise::string_cmp(a, b)? != Ordering::Less)
    }

    pub fn string_lt(a: &str, b: &str) -> CcxtResult<bool> {
        Ok(Precise::string_cmp(a, b)? == Ordering::Less)
    }

    pub fn string_le(a: &str, b: &str) -> CcxtResult<bool> {
        Ok(Precise::string_cmp(a, b)? != Ordering::Greater)
    }
}

impl FromStr for Precise {
    type Err = CcxtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Precise::parse(s)
    }
}

/// Reduced plain notation: no exponent, no trailing fractional zeros
impl fmt::Display for Precise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reduced = self.reduced();
        let sign = if reduced.integer.is_negative() { "-" } else { "" };
        let digits = reduced.integer.abs().to_string();

        if reduced.decimals <= 0 {
            let zeros = "0".repeat(reduced.decimals.unsigned_abs() as usize);
            return write!(f, "{sign}{digits}{zeros}");
        }

        let scale = reduced.decimals as usize;
        if digits.len() > scale {
            let (whole, fraction) = digits.split_at(digits.len() - scale);
            write!(f, "{sign}{whole}.{fraction}")
        } else {
            let padding = "0".repeat(scale - digits.len());
            write!(f, "{sign}0.{padding}{digits}")
        }
    }
}

impl PartialEq for Precise {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for Precise {}

impl PartialOrd for Precise {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Precise {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b, _) = self.aligned(other);
        a.cmp(&b)
    }
}
