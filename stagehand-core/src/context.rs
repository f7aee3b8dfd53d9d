//! Layered render context.
//!
//! A [`Context`] is a stack of [`Layer`]s: the first layer is the outermost
//! scope (site-wide values), later layers are pushed by request handling and
//! nested blocks. Lookups walk from the innermost layer outwards; flattening
//! copies layers in order so the innermost write for a key wins.

use serde::Serialize;
use serde_json::{Map, Value};

/// One scope of variables.
pub type Layer = Map<String, Value>;

/// Ordered stack of variable scopes, outer to inner.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Context {
    dicts: Vec<Layer>,
}

impl Context {
    /// A context with one empty layer.
    pub fn new() -> Self {
        Self {
            dicts: vec![Layer::new()],
        }
    }

    /// Build a context from existing layers, outer first.
    pub fn from_layers(dicts: Vec<Layer>) -> Self {
        Self { dicts }
    }

    /// The layers, outer first.
    pub fn dicts(&self) -> &[Layer] {
        &self.dicts
    }

    /// Push a new innermost layer.
    pub fn push(&mut self, layer: Layer) {
        self.dicts.push(layer);
    }

    /// Remove and return the innermost layer.
    pub fn pop(&mut self) -> Option<Layer> {
        self.dicts.pop()
    }

    /// Set `key` in the innermost layer, creating one if the stack is empty.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        if self.dicts.is_empty() {
            self.dicts.push(Layer::new());
        }
        if let Some(top) = self.dicts.last_mut() {
            top.insert(key.into(), value.into());
        }
    }

    /// Innermost value bound to `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.dicts.iter().rev().find_map(|layer| layer.get(key))
    }

    /// Collapse all layers into one mapping, later layers overwriting earlier.
    pub fn flatten(&self) -> Layer {
        let mut flat = Layer::new();
        for layer in &self.dicts {
            for (key, value) in layer {
                flat.insert(key.clone(), value.clone());
            }
        }
        flat
    }
}

impl From<Layer> for Context {
    fn from(layer: Layer) -> Self {
        Self { dicts: vec![layer] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn layer(value: Value) -> Layer {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn flatten_later_layer_wins() {
        let ctx = Context::from_layers(vec![
            layer(json!({"a": 1})),
            layer(json!({"a": 2, "b": 3})),
        ]);
        assert_eq!(Value::Object(ctx.flatten()), json!({"a": 2, "b": 3}));
    }

    #[test]
    fn flatten_empty_context_is_empty() {
        assert!(Context::from_layers(vec![]).flatten().is_empty());
    }

    #[test]
    fn get_prefers_innermost_layer() {
        let mut ctx = Context::new();
        ctx.insert("user", "outer");
        ctx.push(layer(json!({"user": "inner"})));
        assert_eq!(ctx.get("user"), Some(&json!("inner")));
        ctx.pop();
        assert_eq!(ctx.get("user"), Some(&json!("outer")));
        assert_eq!(ctx.get("missing"), None);
    }

    #[test]
    fn insert_on_empty_stack_creates_layer() {
        let mut ctx = Context::from_layers(vec![]);
        ctx.insert("k", 1);
        assert_eq!(ctx.dicts().len(), 1);
        assert_eq!(ctx.get("k"), Some(&json!(1)));
    }
}
