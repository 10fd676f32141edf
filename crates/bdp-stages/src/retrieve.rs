//! Stages de retrieve.

use bdp_core::{Items, Retrieve, StageError, TypedStage};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Emite cada elemento de `context[field]` en orden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListItems {
    pub field: String,
}

impl Default for ListItems {
    fn default() -> Self {
        Self { field: "list".into() }
    }
}

impl ListItems {
    pub fn on(field: impl Into<String>) -> Self {
        Self { field: field.into() }
    }
}

impl TypedStage for ListItems {
    const KEY: &'static str = "list.items";
}

impl Retrieve for ListItems {
    fn retrieve<'a>(&'a self, context: &'a Value, _part: usize, _parts: usize) -> Result<Items<'a>, StageError> {
        match context.get(&self.field) {
            Some(Value::Array(list)) => Ok(Box::new(list.iter().cloned().map(Ok))),
            _ => Err(StageError::new(Self::KEY, format!("context.{} must be an array", self.field))),
        }
    }
}

/// Enteros de `[start, end)` repartidos por paso: la partición `p` recibe
/// los `i` con `(i - start) % parts == p`. No necesita pre-process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeStride {
    pub start: i64,
    pub end: i64,
}

impl TypedStage for RangeStride {
    const KEY: &'static str = "range.stride";
}

impl Retrieve for RangeStride {
    fn retrieve<'a>(&'a self, _context: &'a Value, part: usize, parts: usize) -> Result<Items<'a>, StageError> {
        let offset = i64::try_from(part).map_err(|_| StageError::new(Self::KEY, "partition index out of range"))?;
        let step = usize::max(parts, 1);
        let first = self.start.saturating_add(offset);
        Ok(Box::new((first..self.end).step_by(step).map(|i| Ok(Value::from(i)))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn collect(items: Items<'_>) -> Vec<Value> {
        items.map(|i| i.unwrap()).collect()
    }

    #[test]
    fn list_items_emits_in_order_including_nulls() {
        let ctx = json!({"list": [3, null, 1]});
        let stage = ListItems::default();
        assert_eq!(collect(stage.retrieve(&ctx, 0, 1).unwrap()), vec![json!(3), Value::Null, json!(1)]);
    }

    #[test]
    fn list_items_requires_array() {
        assert!(ListItems::default().retrieve(&json!({"list": 3}), 0, 1).is_err());
    }

    #[test]
    fn range_stride_partitions_cover_range_once() {
        let stage = RangeStride { start: 1, end: 11 };
        let ctx = Value::Null;
        let mut all: Vec<i64> = (0..3).flat_map(|p| collect(stage.retrieve(&ctx, p, 3).unwrap()))
                                      .map(|v| v.as_i64().unwrap())
                                      .collect();
        assert_eq!(collect(stage.retrieve(&ctx, 0, 3).unwrap()), vec![json!(1), json!(4), json!(7), json!(10)]);
        all.sort_unstable();
        assert_eq!(all, (1..11).collect::<Vec<_>>());
    }
}
