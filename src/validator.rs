use crate::errors::{ValidationError, ValidationRawError};
use crate::form::{Form, TypeName};
use crate::hooks::{SupplementalContext, SupplementalValidateFn};
use crate::json_type::JsonType;
use crate::rfc3339::is_rfc3339;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default)]
pub struct ValidateOptions {
    max_depth: usize,
    max_errors: usize,
}

impl ValidateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits how many `ref`s may be followed inside one another. Zero, the
    /// default, means no limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Stops validating once this many errors have been found. Zero, the
    /// default, means no limit.
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidateError {
    #[error("max depth exceeded")]
    MaxDepthExceeded,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct NodeId(pub usize);

/// One compiled schema node. Nodes only hold data; [`Vm`] interprets them.
pub(crate) struct Node {
    /// Path of the schema object this node was compiled from.
    pub schema_path: Vec<String>,
    pub nullable: bool,
    pub supplements: Vec<SupplementalValidateFn>,
    pub kind: NodeKind,
}

pub(crate) enum NodeKind {
    Empty,
    Type(TypeName),
    Enum(HashSet<String>),
    Elements(NodeId),
    Properties(PropertiesNode),
    Values(NodeId),
    Discriminator {
        discriminator: String,
        mapping: HashMap<String, NodeId>,
    },
    /// Index into [`Validator::definitions`].
    Ref(usize),
}

pub(crate) struct PropertiesNode {
    /// Required property names, in schema order.
    pub required: Vec<String>,
    /// Sub-schemas of required and optional properties alike.
    pub subs: HashMap<String, NodeId>,
    pub additional: bool,
    pub has_properties_key: bool,
    /// Set when this node is a discriminator mapping entry; the tag property
    /// is then never an additional property.
    pub discriminator: Option<String>,
}

impl NodeKind {
    fn form(&self) -> Form {
        match self {
            Self::Empty => Form::Empty,
            Self::Type(_) => Form::Type,
            Self::Enum(_) => Form::Enum,
            Self::Elements(_) => Form::Elements,
            Self::Properties(_) => Form::Properties,
            Self::Values(_) => Form::Values,
            Self::Discriminator { .. } => Form::Discriminator,
            Self::Ref(_) => Form::Ref,
        }
    }
}

impl Node {
    fn path_with(&self, tokens: &[&str]) -> Vec<String> {
        let mut path = self.schema_path.clone();
        path.extend(tokens.iter().map(|t| (*t).to_owned()));
        path
    }

    fn form_path(&self) -> Vec<String> {
        match self.kind.form().keyword() {
            Some(keyword) => self.path_with(&[keyword]),
            None => self.schema_path.clone(),
        }
    }

    /// Where supplemental errors are reported: the form path, except for
    /// discriminator nodes, which report at the node itself.
    fn supplement_path(&self) -> Vec<String> {
        match self.kind {
            NodeKind::Discriminator { .. } => self.schema_path.clone(),
            _ => self.form_path(),
        }
    }
}

/// A compiled schema, ready to validate any number of instances.
///
/// Validators are immutable and can be shared across threads; every call to
/// [`Validator::validate`] keeps its own state.
pub struct Validator {
    nodes: Vec<Node>,
    definitions: Vec<NodeId>,
    root: NodeId,
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("nodes", &self.nodes.len())
            .field("definitions", &self.definitions.len())
            .finish()
    }
}

impl Validator {
    pub(crate) fn new(nodes: Vec<Node>, definitions: Vec<NodeId>, root: NodeId) -> Self {
        Self {
            nodes,
            definitions,
            root,
        }
    }

    /// Validates `instance`, returning every error found.
    ///
    /// ```
    /// use serde_json::json;
    ///
    /// let validator = jtdx::compile(
    ///     &json!({ "properties": { "name": { "type": "string" } } }),
    ///     &jtdx::CompilationOptions::new(),
    /// )
    /// .unwrap();
    ///
    /// assert!(validator.validate(&json!({ "name": "jtd" })).is_ok());
    ///
    /// let errors = validator.validate(&json!({ "name": 42 })).unwrap_err();
    /// assert_eq!(vec!["properties", "name", "type"], errors[0].schema_path);
    /// assert_eq!(vec!["name"], errors[0].instance_path);
    /// ```
    pub fn validate(&self, instance: &Value) -> Result<(), Vec<ValidationError>> {
        let mut vm = Vm::new(self, ValidateOptions::new());

        // Without limits the walk always runs to completion.
        let _ = vm.validate(self.root, instance);

        if vm.errors.is_empty() {
            Ok(())
        } else {
            Err(vm.errors)
        }
    }

    /// Like [`Validator::validate`], but bounded by `options`.
    ///
    /// Reaching the error limit is not a failure: the errors found so far are
    /// returned. Exceeding the depth limit is.
    pub fn validate_with_options(
        &self,
        instance: &Value,
        options: ValidateOptions,
    ) -> Result<Vec<ValidationError>, ValidateError> {
        let mut vm = Vm::new(self, options);

        match vm.validate(self.root, instance) {
            Ok(()) | Err(VmValidateError::MaxErrorsReached) => Ok(vm.errors),
            Err(VmValidateError::MaxDepthExceeded) => Err(ValidateError::MaxDepthExceeded),
        }
    }
}

struct Vm<'v> {
    validator: &'v Validator,
    max_depth: usize,
    max_errors: usize,
    depth: usize,
    instance_tokens: Vec<String>,
    errors: Vec<ValidationError>,
}

enum VmValidateError {
    MaxErrorsReached,
    MaxDepthExceeded,
}

impl<'v> Vm<'v> {
    fn new(validator: &'v Validator, options: ValidateOptions) -> Self {
        Self {
            validator,
            max_depth: options.max_depth,
            max_errors: options.max_errors,
            depth: 0,
            instance_tokens: vec![],
            errors: vec![],
        }
    }

    fn validate(&mut self, id: NodeId, instance: &Value) -> Result<(), VmValidateError> {
        let validator = self.validator;
        let node = &validator.nodes[id.0];

        if node.nullable && instance.is_null() {
            return Ok(());
        }

        match &node.kind {
            NodeKind::Empty => self.run_supplements(node, instance)?,
            NodeKind::Type(type_name) => match check_type(*type_name, instance) {
                Some(raw) => self.push_error(node.form_path(), raw)?,
                None => self.run_supplements(node, instance)?,
            },
            NodeKind::Enum(variants) => {
                match instance.as_str() {
                    None => self.push_error(
                        node.form_path(),
                        ValidationRawError::EnumNotString {
                            actual_type: JsonType::of(instance),
                        },
                    )?,
                    Some(s) if !variants.contains(s) => self.push_error(
                        node.form_path(),
                        ValidationRawError::InvalidVariant {
                            actual_value: s.to_owned(),
                        },
                    )?,
                    Some(_) => {}
                }

                self.run_supplements(node, instance)?;
            }
            NodeKind::Elements(sub) => {
                if let Some(arr) = instance.as_array() {
                    self.run_supplements(node, instance)?;

                    for (i, sub_instance) in arr.iter().enumerate() {
                        self.push_instance_token(&i.to_string());
                        self.validate(*sub, sub_instance)?;
                        self.pop_instance_token();
                    }
                } else {
                    self.push_error(
                        node.form_path(),
                        ValidationRawError::NotArray {
                            actual_type: JsonType::of(instance),
                        },
                    )?;
                }
            }
            NodeKind::Properties(properties) => {
                self.validate_properties(node, properties, instance)?
            }
            NodeKind::Values(sub) => {
                if let Some(obj) = instance.as_object() {
                    self.run_supplements(node, instance)?;

                    for (name, sub_instance) in obj {
                        self.push_instance_token(name);
                        self.validate(*sub, sub_instance)?;
                        self.pop_instance_token();
                    }
                } else {
                    self.push_error(
                        node.form_path(),
                        ValidationRawError::ValuesNotObject {
                            actual_type: JsonType::of(instance),
                        },
                    )?;
                }
            }
            NodeKind::Discriminator {
                discriminator,
                mapping,
            } => {
                if let Some(obj) = instance.as_object() {
                    if let Some(sub) = self.select_mapping(node, discriminator, mapping, obj)? {
                        self.run_supplements(node, instance)?;
                        self.validate(sub, instance)?;
                    }
                } else {
                    self.push_error(
                        node.form_path(),
                        ValidationRawError::DiscriminatorNotObject {
                            actual_type: JsonType::of(instance),
                        },
                    )?;
                }
            }
            NodeKind::Ref(definition) => {
                self.run_supplements(node, instance)?;

                self.depth += 1;
                if self.max_depth != 0 && self.depth > self.max_depth {
                    return Err(VmValidateError::MaxDepthExceeded);
                }

                self.validate(validator.definitions[*definition], instance)?;
                self.depth -= 1;
            }
        };

        Ok(())
    }

    fn validate_properties(
        &mut self,
        node: &Node,
        properties: &PropertiesNode,
        instance: &Value,
    ) -> Result<(), VmValidateError> {
        let obj = match instance.as_object() {
            Some(obj) => obj,
            None => {
                let token = if properties.has_properties_key {
                    "properties"
                } else {
                    "optionalProperties"
                };

                return self.push_error(
                    node.path_with(&[token]),
                    ValidationRawError::PropertiesNotObject {
                        actual_type: JsonType::of(instance),
                    },
                );
            }
        };

        for name in &properties.required {
            if !obj.contains_key(name) {
                self.push_error(
                    node.path_with(&["properties", name.as_str()]),
                    ValidationRawError::MissingRequiredProperty { key: name.clone() },
                )?;
            }
        }

        if !properties.additional {
            for name in obj.keys() {
                if !properties.subs.contains_key(name)
                    && properties.discriminator.as_deref() != Some(name.as_str())
                {
                    self.push_instance_token(name);
                    self.push_error(
                        node.schema_path.clone(),
                        ValidationRawError::UnexpectedAdditionalProperty { key: name.clone() },
                    )?;
                    self.pop_instance_token();
                }
            }
        }

        self.run_supplements(node, instance)?;

        for (name, sub_instance) in obj {
            if let Some(sub) = properties.subs.get(name) {
                self.push_instance_token(name);
                self.validate(*sub, sub_instance)?;
                self.pop_instance_token();
            }
        }

        Ok(())
    }

    /// Finds the mapping entry selected by the instance's tag, reporting why
    /// when there is none.
    fn select_mapping(
        &mut self,
        node: &Node,
        discriminator: &str,
        mapping: &HashMap<String, NodeId>,
        obj: &Map<String, Value>,
    ) -> Result<Option<NodeId>, VmValidateError> {
        let tag = match obj.get(discriminator) {
            Some(tag) => tag,
            None => {
                self.push_error(
                    node.form_path(),
                    ValidationRawError::MissingDiscriminator {
                        discriminator: discriminator.to_owned(),
                    },
                )?;
                return Ok(None);
            }
        };

        self.push_instance_token(discriminator);
        let selected = match tag.as_str() {
            Some(tag) => match mapping.get(tag) {
                Some(sub) => Some(*sub),
                None => {
                    self.push_error(
                        node.path_with(&["mapping"]),
                        ValidationRawError::InvalidDiscriminatorValue {
                            actual_discriminator_value: tag.to_owned(),
                        },
                    )?;
                    None
                }
            },
            None => {
                self.push_error(
                    node.form_path(),
                    ValidationRawError::DiscriminatorValueNotString {
                        actual_type: JsonType::of(tag),
                    },
                )?;
                None
            }
        };
        self.pop_instance_token();

        Ok(selected)
    }

    fn run_supplements(&mut self, node: &Node, instance: &Value) -> Result<(), VmValidateError> {
        if node.supplements.is_empty() {
            return Ok(());
        }

        let schema_path = node.supplement_path();
        for supplement in &node.supplements {
            supplement(
                instance,
                &mut SupplementalContext::new(&schema_path, &self.instance_tokens, &mut self.errors),
            );
            self.check_max_errors()?;
        }

        Ok(())
    }

    fn push_error(
        &mut self,
        schema_path: Vec<String>,
        raw: ValidationRawError,
    ) -> Result<(), VmValidateError> {
        self.errors.push(ValidationError {
            schema_path,
            instance_path: self.instance_tokens.clone(),
            raw,
        });

        self.check_max_errors()
    }

    fn check_max_errors(&mut self) -> Result<(), VmValidateError> {
        if self.max_errors != 0 && self.errors.len() >= self.max_errors {
            self.errors.truncate(self.max_errors);
            Err(VmValidateError::MaxErrorsReached)
        } else {
            Ok(())
        }
    }

    fn push_instance_token(&mut self, token: &str) {
        self.instance_tokens.push(token.to_owned());
    }

    fn pop_instance_token(&mut self) {
        self.instance_tokens.pop();
    }
}

/// Checks a value against a primitive type. At most one error is reported:
/// the first check that fails.
fn check_type(type_name: TypeName, instance: &Value) -> Option<ValidationRawError> {
    let mismatch = || ValidationRawError::TypeMismatch {
        expected_type: type_name,
        actual_type: JsonType::of(instance),
    };

    if let Some((min, max)) = type_name.integer_range() {
        let n = match instance.as_f64() {
            Some(n) => n,
            None => return Some(mismatch()),
        };

        if n.fract() != 0.0 {
            return Some(ValidationRawError::NotInteger {
                expected_type: type_name,
            });
        }

        return if n < min || n > max {
            Some(mismatch())
        } else {
            None
        };
    }

    let ok = match type_name {
        TypeName::Boolean => instance.is_boolean(),
        TypeName::String => instance.is_string(),
        TypeName::Timestamp => instance.as_str().map_or(false, is_rfc3339),
        _ => instance.is_number(),
    };

    if ok {
        None
    } else {
        Some(mismatch())
    }
}
