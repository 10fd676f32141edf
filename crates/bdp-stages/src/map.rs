//! Maps numéricos y de objetos.

use bdp_core::typed_stage;
use bdp_core::{Map, StageError, TypedStage};
use serde_json::Value;

use crate::num::Num;

typed_stage!(pub Square = "num.square");

typed_stage!(
    /// Multiplica por `factor`.
    pub Scale { factor: f64 } = "num.scale"
);

typed_stage!(
    /// Suma `by`.
    pub Offset { by: f64 } = "num.offset"
);

typed_stage!(
    /// Extrae `item[field]` de un objeto (`null` si falta).
    pub Pluck { field: String } = "json.pluck"
);

impl Map for Square {
    fn transform(&self, item: Value, _context: &Value) -> Result<Value, StageError> {
        let n = Num::from_value(Self::KEY, &item)?;
        n.mul(n).into_value(Self::KEY)
    }
}

impl Map for Scale {
    fn transform(&self, item: Value, _context: &Value) -> Result<Value, StageError> {
        Num::from_value(Self::KEY, &item)?.mul(Num::from_f64(self.factor)).into_value(Self::KEY)
    }
}

impl Map for Offset {
    fn transform(&self, item: Value, _context: &Value) -> Result<Value, StageError> {
        Num::from_value(Self::KEY, &item)?.add(Num::from_f64(self.by)).into_value(Self::KEY)
    }
}

impl Map for Pluck {
    fn transform(&self, item: Value, _context: &Value) -> Result<Value, StageError> {
        match item {
            Value::Object(mut map) => Ok(map.remove(&self.field).unwrap_or(Value::Null)),
            other => Err(StageError::new(Self::KEY, format!("expected an object, found {other}"))),
        }
    }
}
