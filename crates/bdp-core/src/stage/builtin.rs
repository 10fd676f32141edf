//! Stages por defecto de una chain recién creada.
//!
//! - `core.identity`: pre-process y post-process que devuelven su entrada.
//! - `core.empty`: retrieve sin items.
//! - `core.append`: reduce que acumula items en un array y concatena
//!   parciales al combinar. Su valor inicial es `[]`.

use serde_json::Value;

use super::{Items, PostProcess, PreProcess, Reduce, Retrieve, TypedStage};
use crate::errors::StageError;
use crate::typed_stage;

typed_stage!(
    /// Devuelve el contexto (pre-process) o el acumulado (post-process) sin cambios.
    pub Identity = "core.identity"
);

typed_stage!(
    /// Partición sin items.
    pub Empty = "core.empty"
);

typed_stage!(
    /// Acumula en un array: item a item al reducir, concatenando al combinar.
    pub Append = "core.append"
);

impl PreProcess for Identity {
    fn pre_process(&self, context: &Value, _part: usize, _parts: usize) -> Result<Value, StageError> {
        Ok(context.clone())
    }
}

impl PostProcess for Identity {
    fn post_process(&self, acc: Value, _context: &Value) -> Result<Value, StageError> {
        Ok(acc)
    }
}

impl Retrieve for Empty {
    fn retrieve<'a>(&'a self, _context: &'a Value, _part: usize, _parts: usize) -> Result<Items<'a>, StageError> {
        Ok(Box::new(std::iter::empty()))
    }
}

impl Reduce for Append {
    fn reduce(&self, acc: Value, item: Value, _context: &Value, combine: bool) -> Result<Value, StageError> {
        let mut out = match acc {
            Value::Array(out) => out,
            other => return Err(StageError::new(Self::KEY, format!("accumulator must be an array, found {other}"))),
        };
        if combine {
            match item {
                Value::Array(partial) => out.extend(partial),
                other => return Err(StageError::new(Self::KEY, format!("partial result must be an array, found {other}"))),
            }
        } else {
            out.push(item);
        }
        Ok(Value::Array(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn append_pushes_items_and_concatenates_partials() {
        let acc = Append.reduce(json!([]), json!([1, 2]), &Value::Null, false).unwrap();
        assert_eq!(acc, json!([[1, 2]]));
        let acc = Append.reduce(json!([0]), json!([1, 2]), &Value::Null, true).unwrap();
        assert_eq!(acc, json!([0, 1, 2]));
    }

    #[test]
    fn append_rejects_non_array_accumulator() {
        let err = Append.reduce(json!(0), json!(1), &Value::Null, false).unwrap_err();
        assert_eq!(err.stage, "core.append");
    }

    #[test]
    fn unit_stages_have_null_params() {
        use crate::stage::Stage;
        assert_eq!(Identity.params().unwrap(), Value::Null);
        assert_eq!(Stage::key(&Empty), "core.empty");
    }
}
