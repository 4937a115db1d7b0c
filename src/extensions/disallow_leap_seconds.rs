use crate::errors::ValidationRawError;
use crate::extension::ExtensionContext;
use crate::form::Form;
use crate::hooks::{SupplementalContext, SupplementalValidateFn};
use serde_json::Value;

pub(super) fn install(cx: &mut ExtensionContext) {
    cx.hooks_builder().check(Form::Type, |schema, _| {
        if schema.get("type").and_then(Value::as_str) != Some("timestamp") {
            return vec![];
        }

        let reject_leap_second: SupplementalValidateFn =
            Box::new(|v: &Value, cx: &mut SupplementalContext<'_>| {
                // "2006-01-02T15:04:05Z"
                //                   ^^ bytes 17 and 18
                if v.as_str().and_then(|s| s.get(17..19)) == Some("60") {
                    cx.push_error(ValidationRawError::LeapSecondNotAllowed);
                }
            });

        vec![reject_leap_second]
    });
}
