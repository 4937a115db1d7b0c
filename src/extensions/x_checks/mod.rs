//! The `x:checks` extension: value constraints beyond plain JTD.
//!
//! A schema opts in with an `x:checks` object next to its form keys:
//!
//! ```
//! use serde_json::json;
//! use jtdx::{compile, extensions, CompilationOptions};
//!
//! let schema = json!({
//!     "type": "string",
//!     "x:checks": { "minLength": 3, "pattern": "^foo" },
//! });
//!
//! let options = CompilationOptions::new().with_extension(extensions::X_CHECKS);
//! let validator = compile(&schema, &options).unwrap();
//!
//! assert!(validator.validate(&json!("foobar")).is_ok());
//! assert_eq!(2, validator.validate(&json!("fo")).unwrap_err().len());
//! ```
//!
//! The keys understood per form are:
//!
//! | form         | keys |
//! |--------------|------|
//! | `type`       | `minLength`, `maxLength`, `pattern` (strings); `minimum`, `exclusiveMinimum`, `maximum`, `exclusiveMaximum` (numbers and timestamps); `multipleOf` (integers) |
//! | `elements`   | `minElements`, `maxElements`, `uniqueElements` |
//! | `properties` | `minProperties`, `maxProperties` |
//! | `values`     | `minValues`, `maxValues` |
//!
//! Any other key is reported as surplus.

mod bounds;

pub use crate::errors::{BoundSide, Comparison, ComparisonTarget};

use self::bounds::{check_in_bound, keep, BoundKeys, BoundRule, Processed};
use crate::errors::{CompilationRawError, ValidationRawError};
use crate::extension::ExtensionContext;
use crate::form::{Form, TypeName};
use crate::hooks::{HookContext, SupplementalContext, SupplementalValidateFn};
use crate::json_type::{is_truthy, JsonType};
use crate::rfc3339::{is_rfc3339, timestamp_millis};
use regex::Regex;
use serde_json::{Map, Value};

const PROPERTY: &str = "x:checks";

pub(super) fn install(cx: &mut ExtensionContext) {
    cx.declare_property(PROPERTY);

    let hooks = cx.hooks_builder();
    for form in [Form::Empty, Form::Enum, Form::Discriminator, Form::Ref].iter() {
        hooks.check(*form, check_surplus_only);
    }

    hooks
        .check(Form::Type, check_type)
        .check(Form::Elements, check_elements)
        .check(Form::Properties, check_properties)
        .check(Form::Values, check_values);
}

/// The keys of a schema's `x:checks` object that have not been consumed yet.
pub(super) struct ChecksObject<'s> {
    entries: &'s Map<String, Value>,
    remaining: Vec<&'s str>,
}

impl<'s> ChecksObject<'s> {
    fn extract(schema: &'s Map<String, Value>, cx: &mut HookContext<'_>) -> Option<Self> {
        match schema.get(PROPERTY)? {
            Value::Object(entries) => Some(Self {
                entries,
                remaining: entries.keys().map(String::as_str).collect(),
            }),
            _ => {
                cx.push_error(CompilationRawError::ChecksNotObject);
                None
            }
        }
    }

    pub(super) fn has(&self, key: &str) -> bool {
        self.remaining.iter().any(|k| *k == key)
    }

    pub(super) fn take(&mut self, key: &str) -> Option<&'s Value> {
        let index = self.remaining.iter().position(|k| *k == key)?;
        self.remaining.remove(index);
        self.entries.get(key)
    }

    fn finish(self, cx: &mut HookContext<'_>) {
        if !self.remaining.is_empty() {
            cx.push_error(CompilationRawError::ChecksSurplusProperties {
                keys: self.remaining.iter().map(|k| (*k).to_owned()).collect(),
            });
        }
    }
}

fn check_surplus_only(
    schema: &Map<String, Value>,
    cx: &mut HookContext<'_>,
) -> Vec<SupplementalValidateFn> {
    if let Some(checks) = ChecksObject::extract(schema, cx) {
        checks.finish(cx);
    }

    vec![]
}

fn check_type(schema: &Map<String, Value>, cx: &mut HookContext<'_>) -> Vec<SupplementalValidateFn> {
    let mut checks = match ChecksObject::extract(schema, cx) {
        Some(checks) => checks,
        None => return vec![],
    };

    // An unknown type is already a compilation error; none of its checks apply.
    let type_name = match schema
        .get("type")
        .and_then(Value::as_str)
        .and_then(|name| name.parse::<TypeName>().ok())
    {
        Some(type_name) => type_name,
        None => {
            checks.finish(cx);
            return vec![];
        }
    };

    let mut fns = Vec::new();

    check_in_bound(
        &mut checks,
        &mut fns,
        BoundRule {
            target: ComparisonTarget::StringLength,
            min: BoundKeys::inclusive("minLength"),
            max: BoundKeys::inclusive("maxLength"),
            non_negative_integers: true,
            extract: string_length,
        },
        |_: &Value, _: BoundSide, cx: &mut HookContext<'_>| {
            if type_name == TypeName::String {
                Processed::Keep
            } else {
                cx.push_error(CompilationRawError::LengthOnNonString {
                    actual_type: type_name,
                });
                Processed::Reject
            }
        },
        cx,
    );

    if let Some(pattern) = checks.take("pattern") {
        if let Some(f) = check_pattern(type_name, pattern, cx) {
            fns.push(f);
        }
    }

    check_in_bound(
        &mut checks,
        &mut fns,
        BoundRule {
            target: ComparisonTarget::Value,
            min: BoundKeys::with_exclusive("minimum", "exclusiveMinimum"),
            max: BoundKeys::with_exclusive("maximum", "exclusiveMaximum"),
            non_negative_integers: false,
            extract: if type_name == TypeName::Timestamp {
                timestamp_value
            } else {
                Value::as_f64
            },
        },
        |bound: &Value, side: BoundSide, cx: &mut HookContext<'_>| {
            process_value_bound(type_name, bound, side, cx)
        },
        cx,
    );

    if let Some(multiple_of) = checks.take("multipleOf") {
        if let Some(f) = check_multiple_of(type_name, multiple_of, cx) {
            fns.push(f);
        }
    }

    checks.finish(cx);
    fns
}

fn check_pattern(
    type_name: TypeName,
    pattern: &Value,
    cx: &mut HookContext<'_>,
) -> Option<SupplementalValidateFn> {
    if type_name != TypeName::String {
        cx.push_error(CompilationRawError::PatternOnNonString {
            actual_type: type_name,
        });
        return None;
    }

    let pattern = match pattern.as_str() {
        Some(pattern) => pattern.to_owned(),
        None => {
            cx.push_error(CompilationRawError::NonStringPattern {
                pattern_type: JsonType::of(pattern),
            });
            return None;
        }
    };

    let regex = match Regex::new(&pattern) {
        Ok(regex) => regex,
        Err(err) => {
            cx.push_error(CompilationRawError::InvalidPattern {
                error_message: err.to_string(),
            });
            return None;
        }
    };

    let f: SupplementalValidateFn = Box::new(move |v: &Value, cx: &mut SupplementalContext<'_>| {
        if let Some(s) = v.as_str() {
            if !regex.is_match(s) {
                cx.push_error(ValidationRawError::PatternMismatch {
                    pattern: pattern.clone(),
                });
            }
        }
    });

    Some(f)
}

fn process_value_bound(
    type_name: TypeName,
    bound: &Value,
    side: BoundSide,
    cx: &mut HookContext<'_>,
) -> Processed {
    if !type_name.is_boundable() {
        cx.push_error(CompilationRawError::BoundOnNonBoundable {
            bound_side: side,
            actual_type: type_name,
        });
        return Processed::Reject;
    }

    if type_name == TypeName::Timestamp {
        let bound = match bound.as_str() {
            Some(bound) => bound,
            None => {
                cx.push_error(CompilationRawError::NonStringBoundOnTimestamp {
                    bound_side: side,
                    actual_bound_type: JsonType::of(bound),
                });
                return Processed::Reject;
            }
        };

        if is_rfc3339(bound) {
            if let Some(millis) = timestamp_millis(bound) {
                return Processed::Replace(millis);
            }
        }

        cx.push_error(CompilationRawError::NonRfc3339BoundOnTimestamp { bound_side: side });
        return Processed::Reject;
    }

    // Non-numbers are reported by the generic bound checks.
    let value = match bound.as_f64() {
        Some(value) => value,
        None => return Processed::Keep,
    };

    if let Some((min, max)) = type_name.integer_range() {
        let mut ok = true;

        if value.fract() != 0.0 {
            ok = false;
            cx.push_error(CompilationRawError::NonIntegerBoundOnInteger { bound_side: side });
        }

        if value < min || value > max {
            ok = false;
            cx.push_error(CompilationRawError::BoundOutOfRange {
                bound_side: side,
                type_type: type_name,
            });
        }

        if !ok {
            return Processed::Reject;
        }
    }

    Processed::Keep
}

fn check_multiple_of(
    type_name: TypeName,
    multiple_of: &Value,
    cx: &mut HookContext<'_>,
) -> Option<SupplementalValidateFn> {
    if !type_name.is_numeric() {
        cx.push_error(CompilationRawError::MultipleOfOnNonNumeric);
        return None;
    }

    // TODO: support float types once there is a rounding rule for them.
    if !type_name.is_integer() {
        cx.push_error(CompilationRawError::MultipleOfOnNonIntegerNumericNotSupported);
        return None;
    }

    let multiple_of = match multiple_of.as_f64() {
        Some(multiple_of) => multiple_of,
        None => {
            cx.push_error(CompilationRawError::NonNumericMultipleOf);
            return None;
        }
    };

    if multiple_of.fract() != 0.0 {
        cx.push_error(CompilationRawError::NonIntegerMultipleOfNotSupported);
        return None;
    }

    let f: SupplementalValidateFn = Box::new(move |v: &Value, cx: &mut SupplementalContext<'_>| {
        if let Some(n) = v.as_f64() {
            if n % multiple_of != 0.0 {
                cx.push_error(ValidationRawError::NotMultipleOf { multiple_of });
            }
        }
    });

    Some(f)
}

fn check_elements(
    schema: &Map<String, Value>,
    cx: &mut HookContext<'_>,
) -> Vec<SupplementalValidateFn> {
    let mut checks = match ChecksObject::extract(schema, cx) {
        Some(checks) => checks,
        None => return vec![],
    };

    let mut fns = Vec::new();

    check_in_bound(
        &mut checks,
        &mut fns,
        BoundRule {
            target: ComparisonTarget::Elements,
            min: BoundKeys::inclusive("minElements"),
            max: BoundKeys::inclusive("maxElements"),
            non_negative_integers: true,
            extract: array_len,
        },
        keep,
        cx,
    );

    // Any truthy value turns the check on.
    if checks.take("uniqueElements").map_or(false, is_truthy) {
        fns.push(Box::new(|v: &Value, cx: &mut SupplementalContext<'_>| {
            if let Some(elements) = v.as_array() {
                if !all_unique(elements) {
                    cx.push_error(ValidationRawError::ElementsNotUnique);
                }
            }
        }));
    }

    checks.finish(cx);
    fns
}

fn check_properties(
    schema: &Map<String, Value>,
    cx: &mut HookContext<'_>,
) -> Vec<SupplementalValidateFn> {
    check_object_size(schema, ComparisonTarget::Properties, "minProperties", "maxProperties", cx)
}

fn check_values(
    schema: &Map<String, Value>,
    cx: &mut HookContext<'_>,
) -> Vec<SupplementalValidateFn> {
    check_object_size(schema, ComparisonTarget::Values, "minValues", "maxValues", cx)
}

fn check_object_size(
    schema: &Map<String, Value>,
    target: ComparisonTarget,
    min_key: &'static str,
    max_key: &'static str,
    cx: &mut HookContext<'_>,
) -> Vec<SupplementalValidateFn> {
    let mut checks = match ChecksObject::extract(schema, cx) {
        Some(checks) => checks,
        None => return vec![],
    };

    let mut fns = Vec::new();

    check_in_bound(
        &mut checks,
        &mut fns,
        BoundRule {
            target,
            min: BoundKeys::inclusive(min_key),
            max: BoundKeys::inclusive(max_key),
            non_negative_integers: true,
            extract: object_len,
        },
        keep,
        cx,
    );

    checks.finish(cx);
    fns
}

fn string_length(v: &Value) -> Option<f64> {
    v.as_str().map(|s| s.chars().count() as f64)
}

fn timestamp_value(v: &Value) -> Option<f64> {
    v.as_str().and_then(timestamp_millis)
}

fn array_len(v: &Value) -> Option<f64> {
    v.as_array().map(|arr| arr.len() as f64)
}

fn object_len(v: &Value) -> Option<f64> {
    v.as_object().map(|obj| obj.len() as f64)
}

fn all_unique(elements: &[Value]) -> bool {
    elements
        .iter()
        .enumerate()
        .all(|(i, a)| elements[i + 1..].iter().all(|b| !json_eq(a, b)))
}

/// Structural equality, with numbers compared by value so that `1` and `1.0`
/// are the same element.
fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| json_eq(a, b))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter().all(|(key, a)| b.get(key).map_or(false, |b| json_eq(a, b)))
        }
        _ => a == b,
    }
}
