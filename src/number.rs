// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::Rc;

use alloc::format;
use alloc::string::{String, ToString as _};
use core::cmp::{Ord, Ordering};
use core::fmt::{Debug, Formatter};
use core::str::FromStr;

use num_traits::cast::ToPrimitive;
use serde::ser::Serializer;
use serde::Serialize;

type BigFloat = dashu_float::DBig;

// Working precision for all number payloads. Inputs longer than this are
// rounded on construction.
const PRECISION: usize = 100;

#[derive(Clone, Debug, PartialEq)]
struct BigDecimal {
    d: BigFloat,
}

impl From<BigFloat> for BigDecimal {
    fn from(value: BigFloat) -> Self {
        BigDecimal { d: value }
    }
}

impl BigDecimal {
    fn is_integer(&self) -> bool {
        self.d.floor() == self.d
    }
}

/// Arbitrary-precision decimal payload of a number value.
///
/// Numbers compare exactly; `1` and `1.0` are the same number. Parsing
/// accepts anything in JSON number syntax.
#[derive(Clone)]
pub struct Number {
    big: Rc<BigDecimal>,
}

impl Debug for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), core::fmt::Error> {
        self.big.d.fmt(f)
    }
}

impl core::fmt::Display for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), core::fmt::Error> {
        f.write_str(&self.to_decimal_string())
    }
}

impl Serialize for Number {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if let Some(n) = self.as_u64() {
            n.serialize(serializer)
        } else if let Some(n) = self.as_i64() {
            n.serialize(serializer)
        } else if let Some(f) = self.as_f64() {
            f.serialize(serializer)
        } else {
            let s = self.big.d.to_string();
            let v = serde_json::Number::from_str(&s)
                .map_err(|_| serde::ser::Error::custom("could not serialize big number"))?;
            v.serialize(serializer)
        }
    }
}

impl From<BigFloat> for Number {
    fn from(n: BigFloat) -> Self {
        Self {
            big: Rc::new(BigDecimal::from(n.with_precision(PRECISION).value())),
        }
    }
}

impl From<u64> for Number {
    fn from(n: u64) -> Self {
        BigFloat::from(n).into()
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        BigFloat::from(n).into()
    }
}

impl From<usize> for Number {
    fn from(n: usize) -> Self {
        BigFloat::from(n).into()
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        // Reading from float is not precise. Therefore, serialize to string and read.
        match Self::from_str(&format!("{n}")) {
            Ok(v) => v,
            _ => BigFloat::ZERO.into(),
        }
    }
}

impl Number {
    pub fn as_u64(&self) -> Option<u64> {
        if self.big.is_integer() {
            self.big.d.to_u64()
        } else {
            None
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        if self.big.is_integer() {
            self.big.d.to_i64()
        } else {
            None
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        Some(self.big.d.to_binary().value().to_f64().value())
    }

    pub fn is_integer(&self) -> bool {
        self.big.is_integer()
    }

    /// Plain decimal rendering, without an exponent and without a trailing
    /// fractional part for integers. This is the text produced when a number
    /// is coerced to a string.
    pub fn to_decimal_string(&self) -> String {
        if self.big.is_integer() {
            if let Some(i) = self.big.d.to_i128() {
                return format!("{i}");
            }
        }
        self.big.d.to_string()
    }
}

/// Error returned when a string is not in number syntax.
#[derive(Debug, PartialEq, Eq)]
pub struct ParseNumberError;

impl core::fmt::Display for ParseNumberError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str("invalid number syntax")
    }
}

impl core::error::Error for ParseNumberError {}

impl FromStr for Number {
    type Err = ParseNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(v) = BigFloat::from_str(s) {
            return Ok(v.into());
        }
        Ok(f64::from_str(s).map_err(|_| ParseNumberError)?.into())
    }
}

impl Eq for Number {}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.big.d == other.big.d
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        self.big.d.cmp(&other.big.d)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
