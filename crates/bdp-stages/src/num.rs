//! Aritmética sobre números JSON: enteros mientras sea posible (i64 con
//! chequeo de overflow), `f64` en otro caso.

use std::cmp::Ordering;

use bdp_core::StageError;
use serde_json::{Number, Value};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    pub(crate) fn from_value(stage: &str, v: &Value) -> Result<Self, StageError> {
        if let Some(i) = v.as_i64() {
            Ok(Num::Int(i))
        } else if let Some(f) = v.as_f64() {
            Ok(Num::Float(f))
        } else {
            Err(StageError::new(stage, format!("expected a number, found {v}")))
        }
    }

    /// Entero si `f` es integral y cabe en i64.
    pub(crate) fn from_f64(f: f64) -> Self {
        if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
            Num::Int(f as i64)
        } else {
            Num::Float(f)
        }
    }

    pub(crate) fn as_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
        }
    }

    pub(crate) fn add(self, other: Num) -> Num {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => a.checked_add(b).map(Num::Int).unwrap_or(Num::Float(a as f64 + b as f64)),
            _ => Num::Float(self.as_f64() + other.as_f64()),
        }
    }

    pub(crate) fn mul(self, other: Num) -> Num {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => a.checked_mul(b).map(Num::Int).unwrap_or(Num::Float(a as f64 * b as f64)),
            _ => Num::Float(self.as_f64() * other.as_f64()),
        }
    }

    /// Orden total exacto: un entero y un float se comparan sin pasar el
    /// entero a `f64`, que pierde precisión por encima de 2^53.
    pub(crate) fn compare(self, other: Num) -> Ordering {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => a.cmp(&b),
            (Num::Int(a), Num::Float(b)) => cmp_int_float(a, b),
            (Num::Float(a), Num::Int(b)) => cmp_int_float(b, a).reverse(),
            (Num::Float(a), Num::Float(b)) => a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b)),
        }
    }

    pub(crate) fn into_value(self, stage: &str) -> Result<Value, StageError> {
        match self {
            Num::Int(i) => Ok(Value::from(i)),
            Num::Float(f) => Number::from_f64(f).map(Value::Number)
                                                 .ok_or_else(|| StageError::new(stage, format!("non-finite result {f}"))),
        }
    }
}

fn cmp_int_float(a: i64, b: f64) -> Ordering {
    // NaN queda en los extremos, igual que con `total_cmp`
    if b.is_nan() {
        return if b.is_sign_negative() { Ordering::Greater } else { Ordering::Less };
    }
    if b >= 9_223_372_036_854_775_808.0 {
        return Ordering::Less;
    }
    if b < -9_223_372_036_854_775_808.0 {
        return Ordering::Greater;
    }
    let whole = b.trunc();
    (a as i128).cmp(&(whole as i128)).then_with(|| {
                                            if b > whole {
                                                Ordering::Less
                                            } else if b < whole {
                                                Ordering::Greater
                                            } else {
                                                Ordering::Equal
                                            }
                                        })
}

/// Suma JSON de dos números.
pub(crate) fn add(stage: &str, a: &Value, b: &Value) -> Result<Value, StageError> {
    Num::from_value(stage, a)?.add(Num::from_value(stage, b)?).into_value(stage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integers_stay_integers() {
        assert_eq!(add("t", &json!(2), &json!(3)).unwrap(), json!(5));
        assert_eq!(add("t", &json!(2), &json!(0.5)).unwrap(), json!(2.5));
    }

    #[test]
    fn overflow_falls_back_to_float() {
        let v = add("t", &json!(i64::MAX), &json!(1)).unwrap();
        assert!(v.is_f64());
    }

    #[test]
    fn int_and_float_compare_exactly_above_2_pow_53() {
        let big = 1i64 << 53;
        assert_eq!(Num::Int(big + 1).compare(Num::Float(big as f64)), Ordering::Greater);
        assert_eq!(Num::Float(big as f64).compare(Num::Int(big + 1)), Ordering::Less);
        assert_eq!(Num::Float(big as f64).compare(Num::Int(big)), Ordering::Equal);
        assert_eq!(Num::Int(i64::MAX).compare(Num::Float(9.3e18)), Ordering::Less);
        assert_eq!(Num::Int(i64::MIN).compare(Num::Float(-9.3e18)), Ordering::Greater);
    }

    #[test]
    fn fractions_break_ties_with_integers() {
        assert_eq!(Num::Int(2).compare(Num::Float(2.5)), Ordering::Less);
        assert_eq!(Num::Int(-2).compare(Num::Float(-2.5)), Ordering::Greater);
        assert_eq!(Num::Int(0).compare(Num::Float(-0.0)), Ordering::Equal);
        assert_eq!(Num::Float(-0.0).compare(Num::Float(0.0)), Ordering::Equal);
    }

    #[test]
    fn non_numbers_are_rejected() {
        let err = add("num.sum", &json!("a"), &json!(1)).unwrap_err();
        assert_eq!(err.stage, "num.sum");
    }
}
