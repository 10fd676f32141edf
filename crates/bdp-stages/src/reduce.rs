//! Reduces numéricos. Todos combinan parciales con una operación asociativa
//! y conmutativa, así que el resultado no depende del orden de llegada.

use std::cmp::Ordering;

use bdp_core::typed_stage;
use bdp_core::{Reduce, StageError, TypedStage};
use serde_json::{json, Value};

use crate::num::{add, Num};

typed_stage!(
    /// Suma de items; valor inicial habitual `0`.
    pub Sum = "num.sum"
);

typed_stage!(
    /// Cuenta items: +1 por item, suma de cuentas al combinar.
    pub Count = "num.count"
);

typed_stage!(
    /// Máximo; valor inicial `null` (= sin items).
    pub Max = "num.max"
);

typed_stage!(
    /// Mínimo; valor inicial `null`.
    pub Min = "num.min"
);

typed_stage!(
    /// Acumula `{"sum", "count"}`; valor inicial `{"sum": 0, "count": 0}`.
    /// Pensado para `num.mean` como post-process.
    pub SumCount = "num.sum_count"
);

impl Reduce for Sum {
    fn reduce(&self, acc: Value, item: Value, _context: &Value, _combine: bool) -> Result<Value, StageError> {
        add(Self::KEY, &acc, &item)
    }
}

impl Reduce for Count {
    fn reduce(&self, acc: Value, item: Value, _context: &Value, combine: bool) -> Result<Value, StageError> {
        let increment = if combine { item } else { json!(1) };
        add(Self::KEY, &acc, &increment)
    }
}

fn extreme(stage: &str, acc: Value, item: Value, keep: Ordering) -> Result<Value, StageError> {
    if item.is_null() {
        return Ok(acc);
    }
    if acc.is_null() {
        Num::from_value(stage, &item)?;
        return Ok(item);
    }
    let a = Num::from_value(stage, &acc)?;
    let b = Num::from_value(stage, &item)?;
    Ok(if b.compare(a) == keep { item } else { acc })
}

impl Reduce for Max {
    fn reduce(&self, acc: Value, item: Value, _context: &Value, _combine: bool) -> Result<Value, StageError> {
        extreme(Self::KEY, acc, item, Ordering::Greater)
    }
}

impl Reduce for Min {
    fn reduce(&self, acc: Value, item: Value, _context: &Value, _combine: bool) -> Result<Value, StageError> {
        extreme(Self::KEY, acc, item, Ordering::Less)
    }
}

impl Reduce for SumCount {
    fn reduce(&self, acc: Value, item: Value, _context: &Value, combine: bool) -> Result<Value, StageError> {
        let (sum, count) = if combine {
            (item.get("sum").cloned().unwrap_or(json!(0)), item.get("count").cloned().unwrap_or(json!(0)))
        } else {
            (item, json!(1))
        };
        let acc_sum = acc.get("sum").cloned().unwrap_or(json!(0));
        let acc_count = acc.get("count").cloned().unwrap_or(json!(0));
        Ok(json!({
            "sum": add(Self::KEY, &acc_sum, &sum)?,
            "count": add(Self::KEY, &acc_count, &count)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fold<R: Reduce>(r: &R, start: Value, items: &[Value], combine: bool) -> Value {
        items.iter().cloned().fold(start, |acc, i| r.reduce(acc, i, &Value::Null, combine).unwrap())
    }

    #[test]
    fn count_distinguishes_items_from_partials() {
        assert_eq!(fold(&Count, json!(0), &[json!("a"), json!(null), json!(3)], false), json!(3));
        assert_eq!(fold(&Count, json!(0), &[json!(3), json!(4)], true), json!(7));
    }

    #[test]
    fn max_and_min_skip_empty_partials() {
        assert_eq!(fold(&Max, Value::Null, &[json!(3), json!(9), json!(-1)], false), json!(9));
        assert_eq!(fold(&Max, Value::Null, &[Value::Null, json!(4)], true), json!(4));
        assert_eq!(fold(&Min, Value::Null, &[json!(3), json!(1.5)], false), json!(1.5));
    }

    #[test]
    fn sum_count_combines_fieldwise() {
        let start = json!({"sum": 0, "count": 0});
        let part = fold(&SumCount, start.clone(), &[json!(2), json!(4)], false);
        assert_eq!(part, json!({"sum": 6, "count": 2}));
        let total = fold(&SumCount, start, &[part, json!({"sum": 1, "count": 1})], true);
        assert_eq!(total, json!({"sum": 7, "count": 3}));
    }

    #[test]
    fn sum_rejects_strings() {
        assert!(Sum.reduce(json!(0), json!("1"), &Value::Null, false).is_err());
    }
}
