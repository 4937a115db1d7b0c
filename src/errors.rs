use crate::form::{Form, TypeName};
use crate::json_type::JsonType;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// A problem with the schema itself, found while compiling it.
#[derive(Clone, Debug, PartialEq, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("{raw} (at schema path {schema_path:?})")]
pub struct CompilationError {
    pub schema_path: Vec<String>,
    pub raw: CompilationRawError,
}

/// A place where an instance does not conform to a compiled schema.
#[derive(Clone, Debug, PartialEq, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("{raw} (at schema path {schema_path:?}, instance path {instance_path:?})")]
pub struct ValidationError {
    pub schema_path: Vec<String>,
    pub instance_path: Vec<String>,
    pub raw: ValidationRawError,
}

/// The kinds of compilation error.
///
/// Serializes with a `"type"` tag holding the error code, e.g.
/// `{"type": "SCHEMA_FORM:AMBIGUOUS", "discriminatorKeys": ["type", "properties"]}`.
/// The `Display` text is meant for humans and may change.
#[derive(Clone, Debug, PartialEq, Serialize, Error)]
#[serde(tag = "type")]
pub enum CompilationRawError {
    #[serde(rename = "SCHEMA_FORM:AMBIGUOUS", rename_all = "camelCase")]
    #[error("schema mixes keys of several forms: {discriminator_keys:?}")]
    Ambiguous { discriminator_keys: Vec<String> },

    #[serde(rename = "SCHEMA_FORM:NOT_OBJECT", rename_all = "camelCase")]
    #[error("schema must be an object, got {actual_type}")]
    NotObject { actual_type: JsonType },

    #[serde(rename = "MAPPING:NON_PROPERTIES_SCHEMA_FORM")]
    #[error("mapping entries must be of the properties form, got {form}")]
    MappingNonPropertiesForm { form: Form },

    #[serde(rename = "MAPPING:NULLABLE")]
    #[error("mapping entries must not be nullable")]
    MappingNullable,

    #[serde(rename = "MAPPING:DISCRIMINATOR_AS_PROPERTY_KEY")]
    #[error("mapping entry declares the discriminator {discriminator:?} as a property")]
    MappingDiscriminatorAsPropertyKey { discriminator: String },

    #[serde(rename = "NON_ROOT_SCHEMA:ROOT_ONLY_KEYS")]
    #[error("keys only allowed on the root schema: {keys:?}")]
    RootOnlyKeys { keys: Vec<String> },

    #[serde(rename = "COMMON_SCHEMA:UNRECOGNIZED_KEYS")]
    #[error("unrecognized keys on a {form} schema: {keys:?}")]
    UnrecognizedKeys { form: Form, keys: Vec<String> },

    #[serde(rename = "COMMON_SCHEMA:NON_BOOLEAN_NULLABLE_VALUE", rename_all = "camelCase")]
    #[error("nullable must be a boolean, got {actual_type}")]
    NonBooleanNullable { actual_type: JsonType },

    #[serde(rename = "TYPE_FORM:UNKNOWN_TYPE", rename_all = "camelCase")]
    #[error("unknown type {actual_type:?}")]
    UnknownType { actual_type: String },

    #[serde(rename = "TYPE_FORM:NON_STRING_TYPE", rename_all = "camelCase")]
    #[error("type must be a string, got {actual_type_type}")]
    NonStringType { actual_type_type: JsonType },

    #[serde(rename = "ENUM_FORM:NON_ARRAY_ENUM", rename_all = "camelCase")]
    #[error("enum must be an array, got {actual_enum_type}")]
    NonArrayEnum { actual_enum_type: JsonType },

    #[serde(rename = "ENUM_FORM:EMPTY_ENUM")]
    #[error("enum must not be empty")]
    EmptyEnum,

    #[serde(rename = "ENUM_FORM:NON_STRING_VARIANTS")]
    #[error("enum variants must be strings")]
    NonStringVariants,

    #[serde(rename = "ENUM_FORM:DUPLICATE_VARIANTS", rename_all = "camelCase")]
    #[error("duplicate enum variants: {duplicate_variants:?}")]
    DuplicateVariants { duplicate_variants: Vec<Value> },

    #[serde(rename = "PROPERTIES_FORM:NON_OBJECT_PROPERTIES", rename_all = "camelCase")]
    #[error("properties must be an object, got {actual_properties_type}")]
    NonObjectProperties { actual_properties_type: JsonType },

    #[serde(
        rename = "PROPERTIES_FORM:NON_OBJECT_OPTIONAL_PROPERTIES",
        rename_all = "camelCase"
    )]
    #[error("optionalProperties must be an object, got {actual_optional_properties_type}")]
    NonObjectOptionalProperties { actual_optional_properties_type: JsonType },

    #[serde(rename = "PROPERTIES_FORM:OVERLAPPING_REQUIRED_AND_OPTIONAL_PROPERTIES")]
    #[error("properties declared both required and optional: {keys:?}")]
    OverlappingProperties { keys: Vec<String> },

    #[serde(
        rename = "PROPERTIES_FORM:NON_BOOLEAN_ADDITIONAL_PROPERTIES",
        rename_all = "camelCase"
    )]
    #[error("additionalProperties must be a boolean, got {actual_additional_properties_type}")]
    NonBooleanAdditionalProperties { actual_additional_properties_type: JsonType },

    #[serde(
        rename = "DISCRIMINATOR_FORM:NON_STRING_DISCRIMINATOR",
        rename_all = "camelCase"
    )]
    #[error("discriminator must be a string, got {actual_discriminator_type}")]
    NonStringDiscriminator { actual_discriminator_type: JsonType },

    #[serde(rename = "DISCRIMINATOR_FORM:MISSING_MAPPING")]
    #[error("discriminator schema has no mapping")]
    MissingMapping,

    #[serde(rename = "DISCRIMINATOR_FORM:NON_OBJECT_MAPPING", rename_all = "camelCase")]
    #[error("mapping must be an object, got {actual_mapping_type}")]
    NonObjectMapping { actual_mapping_type: JsonType },

    #[serde(rename = "REF_FORM:NON_STRING_REF", rename_all = "camelCase")]
    #[error("ref must be a string, got {actual_ref_type}")]
    NonStringRef { actual_ref_type: JsonType },

    #[serde(rename = "REF_FORM:NO_DEFINITION")]
    #[error("no definition named {definition:?}")]
    NoDefinition { definition: String },

    #[serde(rename = "DEFINITIONS:NON_OBJECT_DEFINITIONS", rename_all = "camelCase")]
    #[error("definitions must be an object, got {actual_definitions_type}")]
    NonObjectDefinitions { actual_definitions_type: JsonType },

    #[serde(
        rename = "DEFINITIONS:NOOP_CIRCULAR_REFERENCES_DETECTED",
        rename_all = "camelCase"
    )]
    #[error("definitions only refer to each other in a cycle: {definitions_in_cycle:?}")]
    NoopCircularReferences { definitions_in_cycle: Vec<String> },

    #[serde(rename = "EXTENSION:DISALLOW_EMPTY_MAPPINGS:DISCRIMINATOR_FORM:EMPTY_MAPPING")]
    #[error("mapping must not be empty")]
    EmptyMapping,

    #[serde(rename = "EXTENSION:X_CHECKS:X_OBJECT:NOT_OBJECT")]
    #[error("x:checks must be an object")]
    ChecksNotObject,

    #[serde(rename = "EXTENSION:X_CHECKS:X_OBJECT:SURPLUS_PROPERTIES")]
    #[error("x:checks has keys that do not apply here: {keys:?}")]
    ChecksSurplusProperties { keys: Vec<String> },

    #[serde(rename = "EXTENSION:X_CHECKS:TYPE_FORM:LENGTH_ON_NON_STRING", rename_all = "camelCase")]
    #[error("length checks only apply to strings, not {actual_type}")]
    LengthOnNonString { actual_type: TypeName },

    #[serde(
        rename = "EXTENSION:X_CHECKS:TYPE_FORM:PATTERN_ON_NON_STRING",
        rename_all = "camelCase"
    )]
    #[error("pattern only applies to strings, not {actual_type}")]
    PatternOnNonString { actual_type: TypeName },

    #[serde(rename = "EXTENSION:X_CHECKS:TYPE_FORM:NON_STRING_PATTERN", rename_all = "camelCase")]
    #[error("pattern must be a string, got {pattern_type}")]
    NonStringPattern { pattern_type: JsonType },

    #[serde(rename = "EXTENSION:X_CHECKS:TYPE_FORM:INVALID_PATTERN", rename_all = "camelCase")]
    #[error("invalid pattern: {error_message}")]
    InvalidPattern { error_message: String },

    #[serde(
        rename = "EXTENSION:X_CHECKS:TYPE_FORM:BOUND_ON_NON_BOUNDABLE",
        rename_all = "camelCase"
    )]
    #[error("{bound_side} bound does not apply to {actual_type}")]
    BoundOnNonBoundable { bound_side: BoundSide, actual_type: TypeName },

    #[serde(
        rename = "EXTENSION:X_CHECKS:TYPE_FORM:NON_STRING_BOUND_ON_TIMESTAMP",
        rename_all = "camelCase"
    )]
    #[error("{bound_side} bound of a timestamp must be a string, got {actual_bound_type}")]
    NonStringBoundOnTimestamp { bound_side: BoundSide, actual_bound_type: JsonType },

    #[serde(
        rename = "EXTENSION:X_CHECKS:TYPE_FORM:NON_RFC3339_BOUND_ON_TIMESTAMP",
        rename_all = "camelCase"
    )]
    #[error("{bound_side} bound of a timestamp must be an RFC3339 timestamp")]
    NonRfc3339BoundOnTimestamp { bound_side: BoundSide },

    #[serde(
        rename = "EXTENSION:X_CHECKS:TYPE_FORM:NON_INTEGER_BOUND_ON_INTEGER",
        rename_all = "camelCase"
    )]
    #[error("{bound_side} bound of an integer type must be an integer")]
    NonIntegerBoundOnInteger { bound_side: BoundSide },

    #[serde(rename = "EXTENSION:X_CHECKS:TYPE_FORM:BOUND_OUT_OF_RANGE", rename_all = "camelCase")]
    #[error("{bound_side} bound is outside the range of {type_type}")]
    BoundOutOfRange { bound_side: BoundSide, type_type: TypeName },

    #[serde(rename = "EXTENSION:X_CHECKS:TYPE_FORM:MULTIPLE_OF_ON_NON_NUMERIC")]
    #[error("multipleOf only applies to numeric types")]
    MultipleOfOnNonNumeric,

    #[serde(rename = "EXTENSION:X_CHECKS:TYPE_FORM:MULTIPLE_OF_ON_NON_INTEGER_NUMERIC_NOT_SUPPORTED")]
    #[error("multipleOf is not supported on float types")]
    MultipleOfOnNonIntegerNumericNotSupported,

    #[serde(rename = "EXTENSION:X_CHECKS:TYPE_FORM:NON_NUMERIC_MULTIPLE_OF")]
    #[error("multipleOf must be a number")]
    NonNumericMultipleOf,

    #[serde(rename = "EXTENSION:X_CHECKS:TYPE_FORM:NON_INTEGER_MULTIPLE_OF_NOT_SUPPORTED")]
    #[error("multipleOf must be an integer")]
    NonIntegerMultipleOfNotSupported,

    #[serde(rename = "EXTENSION:X_CHECKS:BOUND:MIN_GREATER_THAN_MAX", rename_all = "camelCase")]
    #[error("minimum {comparison_target_type} bound is greater than the maximum")]
    MinGreaterThanMax { comparison_target_type: ComparisonTarget },

    #[serde(
        rename = "EXTENSION:X_CHECKS:BOUND:MIN_EQUAL_TO_MAX_WHILE_EXCLUSIVE",
        rename_all = "camelCase"
    )]
    #[error("exclusive {comparison_target_type} bounds are equal, so nothing can satisfy them")]
    MinEqualToMaxWhileExclusive { comparison_target_type: ComparisonTarget },

    #[serde(
        rename = "EXTENSION:X_CHECKS:BOUND:BOTH_EXCLUSIVE_AND_INCLUSIVE",
        rename_all = "camelCase"
    )]
    #[error("{bound_side} {comparison_target_type} bound is both exclusive and inclusive")]
    BothExclusiveAndInclusive {
        comparison_target_type: ComparisonTarget,
        bound_side: BoundSide,
    },

    #[serde(rename = "EXTENSION:X_CHECKS:BOUND:NON_NUMERIC_BOUND", rename_all = "camelCase")]
    #[error("{bound_side} {comparison_target_type} bound must be a number, got {actual_bound_type}")]
    NonNumericBound {
        comparison_target_type: ComparisonTarget,
        bound_side: BoundSide,
        actual_bound_type: JsonType,
    },

    #[serde(
        rename = "EXTENSION:X_CHECKS:BOUND:NEGATIVE_OR_NON_INTEGER_BOUND_NOT_ALLOWED",
        rename_all = "camelCase"
    )]
    #[error("{bound_side} {comparison_target_type} bound must be a non-negative integer")]
    NegativeOrNonIntegerBound {
        comparison_target_type: ComparisonTarget,
        bound_side: BoundSide,
    },
}

/// The kinds of validation error.
///
/// Serializes with a `"type"` tag holding the error code, like
/// [`CompilationRawError`].
#[derive(Clone, Debug, PartialEq, Serialize, Error)]
#[serde(tag = "type")]
pub enum ValidationRawError {
    #[serde(rename = "TYPE_FORM:TYPE_MISMATCH", rename_all = "camelCase")]
    #[error("expected {expected_type}, got {actual_type}")]
    TypeMismatch {
        expected_type: TypeName,
        actual_type: JsonType,
    },

    #[serde(rename = "TYPE_FORM:TYPE_MISMATCH:NOT_INTEGER", rename_all = "camelCase")]
    #[error("expected {expected_type}, got a non-integer number")]
    NotInteger { expected_type: TypeName },

    #[serde(rename = "ENUM_FORM:NOT_STRING", rename_all = "camelCase")]
    #[error("expected an enum variant, got {actual_type}")]
    EnumNotString { actual_type: JsonType },

    #[serde(rename = "ENUM_FORM:INVALID_VARIANT", rename_all = "camelCase")]
    #[error("{actual_value:?} is not an enum variant")]
    InvalidVariant { actual_value: String },

    #[serde(rename = "ELEMENTS_FORM:NOT_ARRAY", rename_all = "camelCase")]
    #[error("expected an array, got {actual_type}")]
    NotArray { actual_type: JsonType },

    #[serde(rename = "PROPERTIES_FORM:NOT_OBJECT", rename_all = "camelCase")]
    #[error("expected an object, got {actual_type}")]
    PropertiesNotObject { actual_type: JsonType },

    #[serde(rename = "PROPERTIES_FORM:MISSING_REQUIRED_PROPERTY")]
    #[error("missing required property {key:?}")]
    MissingRequiredProperty { key: String },

    #[serde(rename = "PROPERTIES_FORM:UNEXPECTED_ADDITIONAL_PROPERTY")]
    #[error("unexpected property {key:?}")]
    UnexpectedAdditionalProperty { key: String },

    #[serde(rename = "VALUES_FORM:NOT_OBJECT", rename_all = "camelCase")]
    #[error("expected an object, got {actual_type}")]
    ValuesNotObject { actual_type: JsonType },

    #[serde(rename = "DISCRIMINATOR_FORM:NOT_OBJECT", rename_all = "camelCase")]
    #[error("expected an object, got {actual_type}")]
    DiscriminatorNotObject { actual_type: JsonType },

    #[serde(rename = "DISCRIMINATOR_FORM:MISSING_DISCRIMINATOR")]
    #[error("missing discriminator property {discriminator:?}")]
    MissingDiscriminator { discriminator: String },

    #[serde(
        rename = "DISCRIMINATOR_FORM:DISCRIMINATOR_VALUE_NOT_STRING",
        rename_all = "camelCase"
    )]
    #[error("discriminator value must be a string, got {actual_type}")]
    DiscriminatorValueNotString { actual_type: JsonType },

    #[serde(
        rename = "DISCRIMINATOR_FORM:INVALID_DISCRIMINATOR_VALUE",
        rename_all = "camelCase"
    )]
    #[error("{actual_discriminator_value:?} is not in the mapping")]
    InvalidDiscriminatorValue { actual_discriminator_value: String },

    #[serde(
        rename = "EXTENSION:DISALLOW_LEAP_SECONDS:TYPE_FORM:LEAP_SECONDS_NOT_ALLOWED_ON_TIMESTAMP"
    )]
    #[error("leap seconds are not allowed")]
    LeapSecondNotAllowed,

    #[serde(rename = "EXTENSION:X_CHECKS:PATTERN_MISMATCH")]
    #[error("string does not match {pattern:?}")]
    PatternMismatch { pattern: String },

    #[serde(rename = "EXTENSION:X_CHECKS:NOT_MULTIPLE_OF", rename_all = "camelCase")]
    #[error("value is not a multiple of {multiple_of}")]
    NotMultipleOf {
        #[serde(serialize_with = "serialize_number")]
        multiple_of: f64,
    },

    #[serde(rename = "EXTENSION:X_CHECKS:ELEMENTS_NOT_UNIQUE")]
    #[error("elements are not unique")]
    ElementsNotUnique,

    #[serde(rename = "EXTENSION:X_CHECKS:OUT_OF_BOUND", rename_all = "camelCase")]
    #[error("{comparison_target_type} is {target_being_what_than_bound} {bound}")]
    OutOfBound {
        comparison_target_type: ComparisonTarget,
        #[serde(serialize_with = "serialize_number")]
        bound: f64,
        target_being_what_than_bound: Comparison,
    },
}

/// Writes whole numbers without a fractional part, so a bound of `3.0`
/// renders as `3`.
fn serialize_number<S: Serializer>(n: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        serializer.serialize_i64(*n as i64)
    } else {
        serializer.serialize_f64(*n)
    }
}

/// What a bound is compared against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonTarget {
    StringLength,
    Value,
    Elements,
    Properties,
    Values,
}

impl ComparisonTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StringLength => "string_length",
            Self::Value => "value",
            Self::Elements => "elements",
            Self::Properties => "properties",
            Self::Values => "values",
        }
    }
}

impl fmt::Display for ComparisonTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundSide {
    Min,
    Max,
}

impl fmt::Display for BoundSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Min => "min",
            Self::Max => "max",
        })
    }
}

/// How an out-of-bound target relates to the bound it broke.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Comparison {
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = ">=")]
    GreaterOrEqual,
}

impl Comparison {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
        }
    }

    /// Whether `target <op> bound` holds.
    pub fn holds(self, target: f64, bound: f64) -> bool {
        match self {
            Self::Less => target < bound,
            Self::LessOrEqual => target <= bound,
            Self::Greater => target > bound,
            Self::GreaterOrEqual => target >= bound,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serialize_compilation_error() {
        let err = CompilationError {
            schema_path: vec![],
            raw: CompilationRawError::Ambiguous {
                discriminator_keys: vec!["type".to_owned(), "properties".to_owned()],
            },
        };

        assert_eq!(
            json!({
                "schemaPath": [],
                "raw": {
                    "type": "SCHEMA_FORM:AMBIGUOUS",
                    "discriminatorKeys": ["type", "properties"],
                },
            }),
            serde_json::to_value(&err).unwrap()
        );
    }

    #[test]
    fn serialize_unit_variant() {
        assert_eq!(
            json!({ "type": "ENUM_FORM:EMPTY_ENUM" }),
            serde_json::to_value(&CompilationRawError::EmptyEnum).unwrap()
        );
    }

    #[test]
    fn serialize_validation_error() {
        let err = ValidationError {
            schema_path: vec!["type".to_owned()],
            instance_path: vec![],
            raw: ValidationRawError::TypeMismatch {
                expected_type: TypeName::Uint8,
                actual_type: JsonType::Number,
            },
        };

        assert_eq!(
            json!({
                "schemaPath": ["type"],
                "instancePath": [],
                "raw": {
                    "type": "TYPE_FORM:TYPE_MISMATCH",
                    "expectedType": "uint8",
                    "actualType": "number",
                },
            }),
            serde_json::to_value(&err).unwrap()
        );
    }

    #[test]
    fn serialize_extension_error() {
        assert_eq!(
            json!({
                "type": "EXTENSION:X_CHECKS:OUT_OF_BOUND",
                "comparisonTargetType": "string_length",
                "bound": 3,
                "targetBeingWhatThanBound": "<",
            }),
            serde_json::to_value(&ValidationRawError::OutOfBound {
                comparison_target_type: ComparisonTarget::StringLength,
                bound: 3.0,
                target_being_what_than_bound: Comparison::Less,
            })
            .unwrap()
        );
    }

    #[test]
    fn serialize_numbers_like_json_does() {
        assert_eq!(
            r#"{"type":"EXTENSION:X_CHECKS:NOT_MULTIPLE_OF","multipleOf":4}"#,
            serde_json::to_string(&ValidationRawError::NotMultipleOf { multiple_of: 4.0 }).unwrap()
        );

        assert_eq!(
            r#"{"type":"EXTENSION:X_CHECKS:OUT_OF_BOUND","comparisonTargetType":"value","bound":-1.5,"targetBeingWhatThanBound":">="}"#,
            serde_json::to_string(&ValidationRawError::OutOfBound {
                comparison_target_type: ComparisonTarget::Value,
                bound: -1.5,
                target_being_what_than_bound: Comparison::GreaterOrEqual,
            })
            .unwrap()
        );

        assert_eq!(
            r#"{"type":"EXTENSION:X_CHECKS:OUT_OF_BOUND","comparisonTargetType":"elements","bound":0,"targetBeingWhatThanBound":"<"}"#,
            serde_json::to_string(&ValidationRawError::OutOfBound {
                comparison_target_type: ComparisonTarget::Elements,
                bound: 0.0,
                target_being_what_than_bound: Comparison::Less,
            })
            .unwrap()
        );
    }

    #[test]
    fn display() {
        assert_eq!(
            "expected uint8, got string",
            ValidationRawError::TypeMismatch {
                expected_type: TypeName::Uint8,
                actual_type: JsonType::String,
            }
            .to_string()
        );
    }
}
