use crate::errors::CompilationRawError;
use crate::extension::ExtensionContext;
use crate::form::Form;
use serde_json::Value;

pub(super) fn install(cx: &mut ExtensionContext) {
    cx.hooks_builder().check(Form::Discriminator, |schema, cx| {
        let is_empty = schema
            .get("mapping")
            .and_then(Value::as_object)
            .map_or(false, |mapping| mapping.is_empty());

        if is_empty {
            cx.push_error(CompilationRawError::EmptyMapping);
        }

        vec![]
    });
}
