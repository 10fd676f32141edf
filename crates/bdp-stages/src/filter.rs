//! Filtros numéricos.

use bdp_core::typed_stage;
use bdp_core::{Filter, StageError, TypedStage};
use serde_json::Value;

use crate::num::Num;

typed_stage!(
    /// Enteros pares. Números no enteros no pasan.
    pub Even = "num.even"
);

typed_stage!(
    /// Enteros impares.
    pub Odd = "num.odd"
);

typed_stage!(
    /// Números estrictamente mayores que `value`.
    pub GreaterThan { value: f64 } = "num.gt"
);

fn integer(stage: &str, item: &Value) -> Result<Option<i64>, StageError> {
    Ok(match Num::from_value(stage, item)? {
        Num::Int(i) => Some(i),
        Num::Float(f) if f.fract() == 0.0 => Some(f as i64),
        Num::Float(_) => None,
    })
}

impl Filter for Even {
    fn keep(&self, item: &Value, _context: &Value) -> Result<bool, StageError> {
        Ok(integer(Self::KEY, item)?.is_some_and(|i| i % 2 == 0))
    }
}

impl Filter for Odd {
    fn keep(&self, item: &Value, _context: &Value) -> Result<bool, StageError> {
        Ok(integer(Self::KEY, item)?.is_some_and(|i| i % 2 != 0))
    }
}

impl Filter for GreaterThan {
    fn keep(&self, item: &Value, _context: &Value) -> Result<bool, StageError> {
        Ok(Num::from_value(Self::KEY, item)?.as_f64() > self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parity_filters() {
        let ctx = Value::Null;
        assert!(Even.keep(&json!(4), &ctx).unwrap());
        assert!(!Even.keep(&json!(3), &ctx).unwrap());
        assert!(Odd.keep(&json!(-3), &ctx).unwrap());
        assert!(!Even.keep(&json!(2.5), &ctx).unwrap());
        assert!(Even.keep(&json!(2.0), &ctx).unwrap());
        assert!(Even.keep(&json!("2"), &ctx).is_err());
    }

    #[test]
    fn greater_than_uses_param() {
        let gt = GreaterThan { value: 2.5 };
        assert!(gt.keep(&json!(3), &Value::Null).unwrap());
        assert!(!gt.keep(&json!(2.5), &Value::Null).unwrap());
    }
}
