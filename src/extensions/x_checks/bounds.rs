use super::{BoundSide, ChecksObject, Comparison, ComparisonTarget};
use crate::errors::{CompilationRawError, ValidationRawError};
use crate::hooks::{HookContext, SupplementalContext, SupplementalValidateFn};
use crate::json_type::JsonType;
use serde_json::Value;

/// The keys that set one side of a bound. When both are present the
/// exclusive key wins.
#[derive(Clone, Copy, Debug)]
pub(super) struct BoundKeys {
    pub inclusive: &'static str,
    pub exclusive: Option<&'static str>,
}

impl BoundKeys {
    pub const fn inclusive(key: &'static str) -> Self {
        Self {
            inclusive: key,
            exclusive: None,
        }
    }

    pub const fn with_exclusive(key: &'static str, exclusive: &'static str) -> Self {
        Self {
            inclusive: key,
            exclusive: Some(exclusive),
        }
    }
}

/// How a pair of bounds is read from the checks object and applied.
pub(super) struct BoundRule {
    pub target: ComparisonTarget,
    pub min: BoundKeys,
    pub max: BoundKeys,
    pub non_negative_integers: bool,
    /// Measures an instance. `None` skips the check.
    pub extract: fn(&Value) -> Option<f64>,
}

/// Outcome of a form-specific look at a raw bound, before the generic
/// numeric checks.
pub(super) enum Processed {
    Keep,
    Replace(f64),
    /// The bound was reported as an error and must be dropped.
    Reject,
}

pub(super) fn keep(_: &Value, _: BoundSide, _: &mut HookContext<'_>) -> Processed {
    Processed::Keep
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Bound {
    value: f64,
    exclusive: bool,
}

/// Reads both sides of a bound, reports every problem with them, and adds a
/// supplemental validator for each side that resolved.
pub(super) fn check_in_bound<P>(
    checks: &mut ChecksObject<'_>,
    fns: &mut Vec<SupplementalValidateFn>,
    rule: BoundRule,
    mut process: P,
    cx: &mut HookContext<'_>,
) where
    P: FnMut(&Value, BoundSide, &mut HookContext<'_>) -> Processed,
{
    let min = extract_bound(checks, &rule, BoundSide::Min, &mut process, cx);
    let max = extract_bound(checks, &rule, BoundSide::Max, &mut process, cx);

    if let (Some(min), Some(max)) = (min, max) {
        if min.value > max.value {
            cx.push_error(CompilationRawError::MinGreaterThanMax {
                comparison_target_type: rule.target,
            });
        } else if (min.exclusive || max.exclusive) && min.value == max.value {
            cx.push_error(CompilationRawError::MinEqualToMaxWhileExclusive {
                comparison_target_type: rule.target,
            });
        }
    }

    if let Some(min) = min {
        fns.push(out_of_bound(&rule, BoundSide::Min, min));
    }

    if let Some(max) = max {
        fns.push(out_of_bound(&rule, BoundSide::Max, max));
    }
}

fn extract_bound<P>(
    checks: &mut ChecksObject<'_>,
    rule: &BoundRule,
    side: BoundSide,
    process: &mut P,
    cx: &mut HookContext<'_>,
) -> Option<Bound>
where
    P: FnMut(&Value, BoundSide, &mut HookContext<'_>) -> Processed,
{
    let keys = match side {
        BoundSide::Min => rule.min,
        BoundSide::Max => rule.max,
    };

    let (key, exclusive) = match keys.exclusive {
        Some(exclusive_key) if checks.has(exclusive_key) => {
            if checks.take(keys.inclusive).is_some() {
                cx.push_error(CompilationRawError::BothExclusiveAndInclusive {
                    comparison_target_type: rule.target,
                    bound_side: side,
                });
            }

            (exclusive_key, true)
        }
        _ if checks.has(keys.inclusive) => (keys.inclusive, false),
        _ => return None,
    };

    let raw = checks.take(key)?;
    let value = match process(raw, side, cx) {
        Processed::Reject => return None,
        Processed::Replace(value) => value,
        Processed::Keep => match raw.as_f64() {
            Some(value) => value,
            None => {
                cx.push_error(CompilationRawError::NonNumericBound {
                    comparison_target_type: rule.target,
                    bound_side: side,
                    actual_bound_type: JsonType::of(raw),
                });
                return None;
            }
        },
    };

    if rule.non_negative_integers && !(value >= 0.0 && value.fract() == 0.0) {
        cx.push_error(CompilationRawError::NegativeOrNonIntegerBound {
            comparison_target_type: rule.target,
            bound_side: side,
        });
        return None;
    }

    Some(Bound { value, exclusive })
}

fn out_of_bound(rule: &BoundRule, side: BoundSide, bound: Bound) -> SupplementalValidateFn {
    // The comparison that, when it holds, puts the target out of bound.
    let comparison = match (side, bound.exclusive) {
        (BoundSide::Min, true) => Comparison::LessOrEqual,
        (BoundSide::Min, false) => Comparison::Less,
        (BoundSide::Max, true) => Comparison::GreaterOrEqual,
        (BoundSide::Max, false) => Comparison::Greater,
    };

    let target = rule.target;
    let extract = rule.extract;

    Box::new(move |v: &Value, cx: &mut SupplementalContext<'_>| {
        let measured = match extract(v) {
            Some(measured) => measured,
            None => return,
        };

        if comparison.holds(measured, bound.value) {
            cx.push_error(ValidationRawError::OutOfBound {
                comparison_target_type: target,
                bound: bound.value,
                target_being_what_than_bound: comparison,
            });
        }
    })
}
