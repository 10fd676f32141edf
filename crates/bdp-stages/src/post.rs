//! Post-processes.

use std::cmp::Ordering;

use bdp_core::typed_stage;
use bdp_core::{PostProcess, StageError, TypedStage};
use serde_json::Value;

use crate::num::Num;

typed_stage!(
    /// Ordena un acumulado array. Útil tras `core.append`, cuyo orden depende
    /// de la llegada de las particiones.
    pub Sort = "list.sort"
);

typed_stage!(
    /// `sum / count` sobre el acumulado de `num.sum_count`; `null` sin items.
    pub Mean = "num.mean"
);

fn rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(_), Value::Number(_)) => match (Num::from_value("", a), Num::from_value("", b)) {
            (Ok(x), Ok(y)) => x.compare(y),
            _ => Ordering::Equal,
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)).then_with(|| a.to_string().cmp(&b.to_string())),
    }
}

impl PostProcess for Sort {
    fn post_process(&self, acc: Value, _context: &Value) -> Result<Value, StageError> {
        match acc {
            Value::Array(mut items) => {
                items.sort_by(compare);
                Ok(Value::Array(items))
            }
            other => Err(StageError::new(Self::KEY, format!("expected an array, found {other}"))),
        }
    }
}

impl PostProcess for Mean {
    fn post_process(&self, acc: Value, _context: &Value) -> Result<Value, StageError> {
        let sum = Num::from_value(Self::KEY, acc.get("sum").unwrap_or(&Value::Null))?;
        let count = Num::from_value(Self::KEY, acc.get("count").unwrap_or(&Value::Null))?;
        if count.as_f64() == 0.0 {
            return Ok(Value::Null);
        }
        Num::from_f64(sum.as_f64() / count.as_f64()).into_value(Self::KEY)
    }
}
