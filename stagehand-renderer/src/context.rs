//! Conversion from the host's layered [`Context`] to a [`tera::Context`].

use serde_json::Value;

use stagehand_core::{Context, Layer};

use crate::error::RenderError;

/// Globals first, then every context layer outer-to-inner; the last write
/// for a key wins, so context values shadow globals.
pub fn flatten_with_globals(globals: &Layer, context: &Context) -> Layer {
    let mut flat = globals.clone();
    for (key, value) in context.flatten() {
        flat.insert(key, value);
    }
    flat
}

/// Build the engine context for one render.
pub fn to_tera_context(globals: &Layer, context: &Context) -> Result<tera::Context, RenderError> {
    let flat = flatten_with_globals(globals, context);
    Ok(tera::Context::from_value(Value::Object(flat))?)
}
