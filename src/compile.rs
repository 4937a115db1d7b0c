use crate::errors::{CompilationError, CompilationRawError};
use crate::extension::{Extension, FinalizedExtensionContext};
use crate::form::{Form, TypeName};
use crate::graph::find_cycles;
use crate::hooks::HookContext;
use crate::json_type::{is_truthy, JsonType};
use crate::schema_keys::{group_keys, GroupedKeys};
use crate::validator::{Node, NodeId, NodeKind, PropertiesNode, Validator};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

/// Options for [`compile`].
///
/// ```
/// use jtdx::{extensions, CompilationOptions};
///
/// let options = CompilationOptions::new()
///     .with_extension(extensions::X_CHECKS)
///     .with_extension(extensions::DISALLOW_LEAP_SECONDS);
///
/// assert_eq!(2, options.extensions().len());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CompilationOptions {
    extensions: Vec<Extension>,
}

impl CompilationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables `extension`. Enabling the same extension twice has no further
    /// effect.
    pub fn with_extension(mut self, extension: Extension) -> Self {
        if !self.extensions.contains(&extension) {
            self.extensions.push(extension);
        }

        self
    }

    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }
}

/// Compiles a JSON Type Definition schema into a [`Validator`].
///
/// Compilation does not stop at the first problem: every independent error
/// in the schema is returned.
///
/// ```
/// use serde_json::json;
///
/// let errors = jtdx::compile(
///     &json!({ "type": "string", "properties": {} }),
///     &jtdx::CompilationOptions::new(),
/// )
/// .unwrap_err();
///
/// assert_eq!(1, errors.len());
/// assert_eq!(
///     json!({
///         "schemaPath": [],
///         "raw": {
///             "type": "SCHEMA_FORM:AMBIGUOUS",
///             "discriminatorKeys": ["type", "properties"],
///         },
///     }),
///     serde_json::to_value(&errors[0]).unwrap(),
/// );
/// ```
pub fn compile(
    schema: &Value,
    options: &CompilationOptions,
) -> Result<Validator, Vec<CompilationError>> {
    debug!(
        extensions = ?options.extensions.iter().map(Extension::name).collect::<Vec<_>>(),
        "compiling schema"
    );

    let ext = FinalizedExtensionContext::from_extensions(&options.extensions);
    let mut compiler = Compiler::new(&ext);

    if let Some(definitions) = schema.as_object().and_then(|obj| obj.get("definitions")) {
        compiler.compile_definitions(definitions);
    }

    let root = compiler.compile_sub(schema, vec![], Position::ROOT);
    let result = compiler.finish(root);

    match &result {
        Ok(_) => debug!("schema compiled"),
        Err(errors) => debug!(errors = errors.len(), "schema rejected"),
    }

    result
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Placement {
    Root,
    DefinitionRoot,
    Nested,
}

/// Where a schema sits in the document, as far as compilation rules care.
#[derive(Clone, Copy, Debug)]
struct Position<'s> {
    placement: Placement,
    /// Set for the entries of a discriminator's `mapping`.
    mapping: Option<MappingEntry<'s>>,
}

#[derive(Clone, Copy, Debug)]
struct MappingEntry<'s> {
    /// `None` when the discriminator itself is malformed.
    discriminator: Option<&'s str>,
}

impl<'s> Position<'s> {
    const ROOT: Self = Self {
        placement: Placement::Root,
        mapping: None,
    };

    const DEFINITION_ROOT: Self = Self {
        placement: Placement::DefinitionRoot,
        mapping: None,
    };

    const NESTED: Self = Self {
        placement: Placement::Nested,
        mapping: None,
    };
}

/// The form aborted; it built nothing and its hooks do not run.
struct Aborted;

struct Compiler<'a> {
    ext: &'a FinalizedExtensionContext,
    errors: Vec<CompilationError>,
    nodes: Vec<Node>,
    /// Definition name to its index in `definitions`.
    slots: HashMap<String, usize>,
    definitions: Vec<Option<NodeId>>,
    /// The definition a definition's own `ref` points at, if any.
    root_dependency: Option<String>,
}

impl<'a> Compiler<'a> {
    fn new(ext: &'a FinalizedExtensionContext) -> Self {
        Self {
            ext,
            errors: vec![],
            nodes: vec![],
            slots: HashMap::new(),
            definitions: vec![],
            root_dependency: None,
        }
    }

    fn finish(self, root: Option<NodeId>) -> Result<Validator, Vec<CompilationError>> {
        let definitions: Option<Vec<NodeId>> = self.definitions.into_iter().collect();

        match (root, definitions) {
            (Some(root), Some(definitions)) if self.errors.is_empty() => {
                Ok(Validator::new(self.nodes, definitions, root))
            }
            _ => Err(self.errors),
        }
    }

    /// Once any error is known, no more nodes are built, but the walk goes
    /// on to find the rest of the errors.
    fn is_dry_run(&self) -> bool {
        !self.errors.is_empty()
    }

    fn push_error(&mut self, schema_path: Vec<String>, raw: CompilationRawError) {
        self.errors.push(CompilationError { schema_path, raw });
    }

    fn compile_definitions(&mut self, definitions: &Value) {
        let definitions = match definitions.as_object() {
            Some(definitions) => definitions,
            None => {
                self.push_error(
                    vec![],
                    CompilationRawError::NonObjectDefinitions {
                        actual_definitions_type: JsonType::of(definitions),
                    },
                );
                return;
            }
        };

        // Every name is known before any body compiles, so refs may point
        // forwards and at themselves.
        for (slot, name) in definitions.keys().enumerate() {
            self.slots.insert(name.clone(), slot);
            self.definitions.push(None);
        }

        let mut edges = Vec::new();
        for (slot, (name, schema)) in definitions.iter().enumerate() {
            self.root_dependency = None;

            let node = self.compile_sub(
                schema,
                vec!["definitions".to_owned(), name.clone()],
                Position::DEFINITION_ROOT,
            );
            self.definitions[slot] = node;

            if let Some(to) = self.root_dependency.take() {
                edges.push((name.clone(), to));
            }
        }

        for cycle in find_cycles(&edges) {
            debug!(definitions = ?cycle, "no-op reference cycle");
            self.push_error(
                vec![],
                CompilationRawError::NoopCircularReferences {
                    definitions_in_cycle: cycle,
                },
            );
        }
    }

    fn compile_sub(
        &mut self,
        schema: &Value,
        schema_path: Vec<String>,
        position: Position<'_>,
    ) -> Option<NodeId> {
        let obj = match schema.as_object() {
            Some(obj) => obj,
            None => {
                self.push_error(
                    schema_path,
                    CompilationRawError::NotObject {
                        actual_type: JsonType::of(schema),
                    },
                );
                return None;
            }
        };

        let keys = match group_keys(obj.keys(), &self.ext.declared_properties) {
            GroupedKeys::Form(keys) => keys,
            GroupedKeys::Ambiguous { discriminator_keys } => {
                self.push_error(
                    schema_path,
                    CompilationRawError::Ambiguous { discriminator_keys },
                );
                return None;
            }
        };

        if let Some(entry) = position.mapping {
            if keys.form != Form::Properties {
                self.push_error(
                    schema_path.clone(),
                    CompilationRawError::MappingNonPropertiesForm { form: keys.form },
                );
            } else if let Some(discriminator) = entry.discriminator {
                let declares = |key: &str| {
                    obj.get(key)
                        .and_then(Value::as_object)
                        .map_or(false, |props| props.contains_key(discriminator))
                };

                if declares("properties") || declares("optionalProperties") {
                    self.push_error(
                        schema_path.clone(),
                        CompilationRawError::MappingDiscriminatorAsPropertyKey {
                            discriminator: discriminator.to_owned(),
                        },
                    );
                }
            }

            if keys.nullable {
                self.push_error(schema_path.clone(), CompilationRawError::MappingNullable);
            }
        }

        if position.placement != Placement::Root && keys.definitions {
            self.push_error(
                schema_path.clone(),
                CompilationRawError::RootOnlyKeys {
                    keys: vec!["definitions".to_owned()],
                },
            );
        }

        if !keys.unrecognized.is_empty() {
            self.push_error(
                schema_path.clone(),
                CompilationRawError::UnrecognizedKeys {
                    form: keys.form,
                    keys: keys.unrecognized.clone(),
                },
            );
        }

        let mut nullable = false;
        if let Some(value) = obj.get("nullable") {
            if !value.is_boolean() {
                self.push_error(
                    schema_path.clone(),
                    CompilationRawError::NonBooleanNullable {
                        actual_type: JsonType::of(value),
                    },
                );
            }

            // A mistyped but truthy value still makes the schema nullable.
            nullable = is_truthy(value);
        }

        let kind = match keys.form {
            Form::Empty => Ok(Some(NodeKind::Empty)),
            Form::Type => Ok(self.compile_type(obj, &schema_path)),
            Form::Enum => self.compile_enum(obj, &schema_path),
            Form::Elements => Ok(self
                .compile_sub(field(obj, "elements"), child(&schema_path, "elements"), Position::NESTED)
                .map(NodeKind::Elements)),
            Form::Properties => Ok(self.compile_properties(obj, &schema_path, position)),
            Form::Values => Ok(self
                .compile_sub(field(obj, "values"), child(&schema_path, "values"), Position::NESTED)
                .map(NodeKind::Values)),
            Form::Discriminator => self.compile_discriminator(obj, &schema_path),
            Form::Ref => self.compile_ref(obj, &schema_path, position),
        };

        let kind = match kind {
            Ok(kind) => kind,
            Err(Aborted) => return None,
        };

        let supplements = {
            let form_path = match keys.form.keyword() {
                Some(keyword) => child(&schema_path, keyword),
                None => schema_path.clone(),
            };

            let ext = self.ext;
            ext.hooks.run(
                keys.form,
                obj,
                &mut HookContext::new(&form_path, &mut self.errors),
            )
        };

        if self.is_dry_run() {
            return None;
        }

        let kind = kind?;
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            schema_path,
            nullable,
            supplements,
            kind,
        });

        Some(id)
    }

    fn compile_type(&mut self, obj: &Map<String, Value>, schema_path: &[String]) -> Option<NodeKind> {
        let schema_path = child(schema_path, "type");

        match field(obj, "type") {
            Value::String(name) => match name.parse::<TypeName>() {
                Ok(type_name) => Some(NodeKind::Type(type_name)),
                Err(()) => {
                    self.push_error(
                        schema_path,
                        CompilationRawError::UnknownType {
                            actual_type: name.clone(),
                        },
                    );
                    None
                }
            },
            other => {
                self.push_error(
                    schema_path,
                    CompilationRawError::NonStringType {
                        actual_type_type: JsonType::of(other),
                    },
                );
                None
            }
        }
    }

    fn compile_enum(
        &mut self,
        obj: &Map<String, Value>,
        schema_path: &[String],
    ) -> Result<Option<NodeKind>, Aborted> {
        let schema_path = child(schema_path, "enum");

        let variants = match field(obj, "enum") {
            Value::Array(variants) => variants,
            other => {
                self.push_error(
                    schema_path,
                    CompilationRawError::NonArrayEnum {
                        actual_enum_type: JsonType::of(other),
                    },
                );
                return Err(Aborted);
            }
        };

        if variants.is_empty() {
            self.push_error(schema_path, CompilationRawError::EmptyEnum);
            return Err(Aborted);
        }

        if variants.iter().any(|v| !v.is_string()) {
            self.push_error(schema_path.clone(), CompilationRawError::NonStringVariants);
        }

        let mut duplicate_variants = Vec::new();
        for (i, variant) in variants.iter().enumerate() {
            if variants[..i].iter().any(|seen| same_variant(seen, variant)) {
                duplicate_variants.push(variant.clone());
            }
        }

        if !duplicate_variants.is_empty() {
            self.push_error(
                schema_path,
                CompilationRawError::DuplicateVariants { duplicate_variants },
            );
            return Err(Aborted);
        }

        let set = variants
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect();
        Ok(Some(NodeKind::Enum(set)))
    }

    fn compile_properties(
        &mut self,
        obj: &Map<String, Value>,
        schema_path: &[String],
        position: Position<'_>,
    ) -> Option<NodeKind> {
        let mut required = Vec::new();
        let mut subs = HashMap::new();

        if let Some(properties) = obj.get("properties") {
            let properties_path = child(schema_path, "properties");

            match properties.as_object() {
                Some(properties) => {
                    for (name, sub_schema) in properties {
                        let sub =
                            self.compile_sub(sub_schema, child(&properties_path, name), Position::NESTED);

                        required.push(name.clone());
                        if let Some(sub) = sub {
                            subs.insert(name.clone(), sub);
                        }
                    }
                }
                None => self.push_error(
                    properties_path,
                    CompilationRawError::NonObjectProperties {
                        actual_properties_type: JsonType::of(properties),
                    },
                ),
            }
        }

        if let Some(optional_properties) = obj.get("optionalProperties") {
            let optional_path = child(schema_path, "optionalProperties");

            match optional_properties.as_object() {
                Some(optional_properties) => {
                    let mut overlapping = Vec::new();
                    for (name, sub_schema) in optional_properties {
                        let sub =
                            self.compile_sub(sub_schema, child(&optional_path, name), Position::NESTED);

                        if required.contains(name) {
                            overlapping.push(name.clone());
                        } else if let Some(sub) = sub {
                            subs.insert(name.clone(), sub);
                        }
                    }

                    if !overlapping.is_empty() {
                        self.push_error(
                            optional_path,
                            CompilationRawError::OverlappingProperties { keys: overlapping },
                        );
                    }
                }
                None => self.push_error(
                    optional_path,
                    CompilationRawError::NonObjectOptionalProperties {
                        actual_optional_properties_type: JsonType::of(optional_properties),
                    },
                ),
            }
        }

        let mut additional = false;
        if let Some(value) = obj.get("additionalProperties") {
            match value.as_bool() {
                Some(value) => additional = value,
                None => self.push_error(
                    child(schema_path, "additionalProperties"),
                    CompilationRawError::NonBooleanAdditionalProperties {
                        actual_additional_properties_type: JsonType::of(value),
                    },
                ),
            }
        }

        Some(NodeKind::Properties(PropertiesNode {
            required,
            subs,
            additional,
            has_properties_key: obj.contains_key("properties"),
            discriminator: position
                .mapping
                .and_then(|entry| entry.discriminator)
                .map(str::to_owned),
        }))
    }

    fn compile_discriminator(
        &mut self,
        obj: &Map<String, Value>,
        schema_path: &[String],
    ) -> Result<Option<NodeKind>, Aborted> {
        let discriminator = field(obj, "discriminator");
        let tag = discriminator.as_str();
        if tag.is_none() {
            self.push_error(
                schema_path.to_vec(),
                CompilationRawError::NonStringDiscriminator {
                    actual_discriminator_type: JsonType::of(discriminator),
                },
            );
        }

        let mapping = match obj.get("mapping") {
            Some(Value::Object(mapping)) => mapping,
            Some(other) => {
                self.push_error(
                    schema_path.to_vec(),
                    CompilationRawError::NonObjectMapping {
                        actual_mapping_type: JsonType::of(other),
                    },
                );
                return Err(Aborted);
            }
            None => {
                self.push_error(schema_path.to_vec(), CompilationRawError::MissingMapping);
                return Err(Aborted);
            }
        };

        let mapping_path = child(schema_path, "mapping");
        let position = Position {
            placement: Placement::Nested,
            mapping: Some(MappingEntry { discriminator: tag }),
        };

        let mut subs = HashMap::new();
        for (name, sub_schema) in mapping {
            if let Some(sub) = self.compile_sub(sub_schema, child(&mapping_path, name), position) {
                subs.insert(name.clone(), sub);
            }
        }

        Ok(tag.map(|tag| NodeKind::Discriminator {
            discriminator: tag.to_owned(),
            mapping: subs,
        }))
    }

    fn compile_ref(
        &mut self,
        obj: &Map<String, Value>,
        schema_path: &[String],
        position: Position<'_>,
    ) -> Result<Option<NodeKind>, Aborted> {
        let schema_path = child(schema_path, "ref");

        let name = match field(obj, "ref") {
            Value::String(name) => name,
            other => {
                self.push_error(
                    schema_path,
                    CompilationRawError::NonStringRef {
                        actual_ref_type: JsonType::of(other),
                    },
                );
                return Err(Aborted);
            }
        };

        let slot = self.slots.get(name).copied();
        if slot.is_none() {
            self.push_error(
                schema_path,
                CompilationRawError::NoDefinition {
                    definition: name.clone(),
                },
            );
        }

        if position.placement == Placement::DefinitionRoot {
            self.root_dependency = Some(name.clone());
        }

        Ok(slot.map(NodeKind::Ref))
    }
}

/// The value of a key the schema's form guarantees is present.
fn field<'s>(obj: &'s Map<String, Value>, key: &str) -> &'s Value {
    obj.get(key).unwrap_or(&Value::Null)
}

/// Whether two enum variants are the same value. Arrays and objects are never
/// the same as anything, numbers compare by value.
fn same_variant(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Array(_), _) | (Value::Object(_), _) => false,
        _ => a == b,
    }
}

fn child(path: &[String], token: &str) -> Vec<String> {
    let mut path = path.to_vec();
    path.push(token.to_owned());
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{SupplementalContext, SupplementalValidateFn};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn compile_errors(schema: Value) -> Vec<Value> {
        compile(&schema, &CompilationOptions::new())
            .unwrap_err()
            .iter()
            .map(|err| serde_json::to_value(err).unwrap())
            .collect()
    }

    #[test]
    fn compile_valid_schemas() {
        let schemas = vec![
            json!({}),
            json!({ "nullable": true, "metadata": { "description": "anything" } }),
            json!({ "type": "uint32" }),
            json!({ "enum": ["a", "b"] }),
            json!({ "elements": { "type": "string" } }),
            json!({ "properties": { "a": {} }, "optionalProperties": { "b": {} } }),
            json!({ "optionalProperties": {}, "additionalProperties": true }),
            json!({ "values": { "ref": "a" }, "definitions": { "a": {} } }),
            json!({ "discriminator": "kind", "mapping": {} }),
            json!({
                "discriminator": "kind",
                "mapping": { "a": { "properties": { "x": {} } } },
            }),
            json!({ "definitions": { "a": { "ref": "b" }, "b": {} }, "ref": "a" }),
        ];

        for schema in schemas {
            assert!(
                compile(&schema, &CompilationOptions::new()).is_ok(),
                "{}",
                schema
            );
        }
    }

    #[test]
    fn compile_legal_recursion() {
        let schema = json!({
            "definitions": {
                "node": {
                    "properties": {
                        "value": { "type": "int32" },
                        "next": { "ref": "node", "nullable": true },
                    },
                },
            },
            "ref": "node",
        });

        assert!(compile(&schema, &CompilationOptions::new()).is_ok());
    }

    #[test]
    fn compile_mutual_recursion_through_forms() {
        let schema = json!({
            "definitions": {
                "a": { "elements": { "ref": "b" } },
                "b": { "values": { "ref": "a" } },
            },
        });

        assert!(compile(&schema, &CompilationOptions::new()).is_ok());
    }

    #[test]
    fn compile_errors_table() {
        let table = vec![
            (
                json!({ "type": "string", "properties": {} }),
                json!({
                    "schemaPath": [],
                    "raw": {
                        "type": "SCHEMA_FORM:AMBIGUOUS",
                        "discriminatorKeys": ["type", "properties"],
                    },
                }),
            ),
            (
                json!(42),
                json!({
                    "schemaPath": [],
                    "raw": { "type": "SCHEMA_FORM:NOT_OBJECT", "actualType": "number" },
                }),
            ),
            (
                json!({ "discriminator": "foo", "mapping": { "bar": { "type": "string" } } }),
                json!({
                    "schemaPath": ["mapping", "bar"],
                    "raw": { "type": "MAPPING:NON_PROPERTIES_SCHEMA_FORM", "form": "type" },
                }),
            ),
            (
                json!({
                    "discriminator": "foo",
                    "mapping": { "bar": { "properties": {}, "nullable": true } },
                }),
                json!({
                    "schemaPath": ["mapping", "bar"],
                    "raw": { "type": "MAPPING:NULLABLE" },
                }),
            ),
            (
                json!({
                    "discriminator": "foo",
                    "mapping": { "bar": { "properties": { "foo": {} } } },
                }),
                json!({
                    "schemaPath": ["mapping", "bar"],
                    "raw": {
                        "type": "MAPPING:DISCRIMINATOR_AS_PROPERTY_KEY",
                        "discriminator": "foo",
                    },
                }),
            ),
            (
                json!({ "elements": { "definitions": {} } }),
                json!({
                    "schemaPath": ["elements"],
                    "raw": { "type": "NON_ROOT_SCHEMA:ROOT_ONLY_KEYS", "keys": ["definitions"] },
                }),
            ),
            (
                json!({ "unknown": 42 }),
                json!({
                    "schemaPath": [],
                    "raw": {
                        "type": "COMMON_SCHEMA:UNRECOGNIZED_KEYS",
                        "form": "empty",
                        "keys": ["unknown"],
                    },
                }),
            ),
            (
                json!({ "type": "string", "nullable": 42 }),
                json!({
                    "schemaPath": [],
                    "raw": {
                        "type": "COMMON_SCHEMA:NON_BOOLEAN_NULLABLE_VALUE",
                        "actualType": "number",
                    },
                }),
            ),
            (
                json!({ "type": "unknown" }),
                json!({
                    "schemaPath": ["type"],
                    "raw": { "type": "TYPE_FORM:UNKNOWN_TYPE", "actualType": "unknown" },
                }),
            ),
            (
                json!({ "type": 42 }),
                json!({
                    "schemaPath": ["type"],
                    "raw": { "type": "TYPE_FORM:NON_STRING_TYPE", "actualTypeType": "number" },
                }),
            ),
            (
                json!({ "enum": 42 }),
                json!({
                    "schemaPath": ["enum"],
                    "raw": { "type": "ENUM_FORM:NON_ARRAY_ENUM", "actualEnumType": "number" },
                }),
            ),
            (
                json!({ "enum": [] }),
                json!({ "schemaPath": ["enum"], "raw": { "type": "ENUM_FORM:EMPTY_ENUM" } }),
            ),
            (
                json!({ "enum": [42] }),
                json!({
                    "schemaPath": ["enum"],
                    "raw": { "type": "ENUM_FORM:NON_STRING_VARIANTS" },
                }),
            ),
            (
                json!({ "enum": ["foo", "foo"] }),
                json!({
                    "schemaPath": ["enum"],
                    "raw": { "type": "ENUM_FORM:DUPLICATE_VARIANTS", "duplicateVariants": ["foo"] },
                }),
            ),
            (
                json!({ "properties": 42 }),
                json!({
                    "schemaPath": ["properties"],
                    "raw": {
                        "type": "PROPERTIES_FORM:NON_OBJECT_PROPERTIES",
                        "actualPropertiesType": "number",
                    },
                }),
            ),
            (
                json!({ "optionalProperties": 42 }),
                json!({
                    "schemaPath": ["optionalProperties"],
                    "raw": {
                        "type": "PROPERTIES_FORM:NON_OBJECT_OPTIONAL_PROPERTIES",
                        "actualOptionalPropertiesType": "number",
                    },
                }),
            ),
            (
                json!({ "properties": { "foo": {} }, "optionalProperties": { "foo": {} } }),
                json!({
                    "schemaPath": ["optionalProperties"],
                    "raw": {
                        "type": "PROPERTIES_FORM:OVERLAPPING_REQUIRED_AND_OPTIONAL_PROPERTIES",
                        "keys": ["foo"],
                    },
                }),
            ),
            (
                json!({ "properties": {}, "additionalProperties": 42 }),
                json!({
                    "schemaPath": ["additionalProperties"],
                    "raw": {
                        "type": "PROPERTIES_FORM:NON_BOOLEAN_ADDITIONAL_PROPERTIES",
                        "actualAdditionalPropertiesType": "number",
                    },
                }),
            ),
            (
                json!({ "discriminator": 42, "mapping": { "foo": { "properties": {} } } }),
                json!({
                    "schemaPath": [],
                    "raw": {
                        "type": "DISCRIMINATOR_FORM:NON_STRING_DISCRIMINATOR",
                        "actualDiscriminatorType": "number",
                    },
                }),
            ),
            (
                json!({ "discriminator": "foo" }),
                json!({ "schemaPath": [], "raw": { "type": "DISCRIMINATOR_FORM:MISSING_MAPPING" } }),
            ),
            (
                json!({ "discriminator": "foo", "mapping": 42 }),
                json!({
                    "schemaPath": [],
                    "raw": {
                        "type": "DISCRIMINATOR_FORM:NON_OBJECT_MAPPING",
                        "actualMappingType": "number",
                    },
                }),
            ),
            (
                json!({ "ref": 42 }),
                json!({
                    "schemaPath": ["ref"],
                    "raw": { "type": "REF_FORM:NON_STRING_REF", "actualRefType": "number" },
                }),
            ),
            (
                json!({ "ref": "foo" }),
                json!({
                    "schemaPath": ["ref"],
                    "raw": { "type": "REF_FORM:NO_DEFINITION", "definition": "foo" },
                }),
            ),
            (
                json!({ "definitions": 42 }),
                json!({
                    "schemaPath": [],
                    "raw": {
                        "type": "DEFINITIONS:NON_OBJECT_DEFINITIONS",
                        "actualDefinitionsType": "number",
                    },
                }),
            ),
            (
                json!({ "definitions": { "foo": { "ref": "foo" } } }),
                json!({
                    "schemaPath": [],
                    "raw": {
                        "type": "DEFINITIONS:NOOP_CIRCULAR_REFERENCES_DETECTED",
                        "definitionsInCycle": ["foo"],
                    },
                }),
            ),
        ];

        for (schema, expected) in table {
            assert_eq!(vec![expected], compile_errors(schema.clone()), "{}", schema);
        }
    }

    #[test]
    fn invalid_schemas() {
        let test_cases: BTreeMap<String, Value> =
            serde_json::from_str(include_str!("../json-typedef-spec/tests/invalid_schemas.json"))
                .expect("parse invalid_schemas.json");

        for (test_case_name, schema) in test_cases {
            assert!(
                compile(&schema, &CompilationOptions::new()).is_err(),
                "schema should not compile: {}",
                &test_case_name
            );
        }
    }

    #[test]
    fn compile_enum_duplicates_include_non_strings() {
        assert_eq!(
            vec![
                json!({ "schemaPath": ["enum"], "raw": { "type": "ENUM_FORM:NON_STRING_VARIANTS" } }),
                json!({
                    "schemaPath": ["enum"],
                    "raw": {
                        "type": "ENUM_FORM:DUPLICATE_VARIANTS",
                        "duplicateVariants": [1.0, "a", null],
                    },
                }),
            ],
            compile_errors(json!({ "enum": ["a", 1, [], 1.0, "a", [], null, {}, null] }))
        );
    }

    #[test]
    fn compile_reports_every_independent_error() {
        let errors = compile_errors(json!({
            "properties": {
                "a": { "type": "foo" },
                "b": { "enum": [] },
                "c": { "elements": 42 },
            },
            "optionalProperties": { "a": {} },
            "additionalProperties": "no",
        }));

        let paths: Vec<&Value> = errors.iter().map(|err| &err["schemaPath"]).collect();
        assert_eq!(
            vec![
                &json!(["properties", "a", "type"]),
                &json!(["properties", "b", "enum"]),
                &json!(["properties", "c", "elements"]),
                &json!(["optionalProperties"]),
                &json!(["additionalProperties"]),
            ],
            paths
        );
    }

    #[test]
    fn compile_longer_noop_cycle() {
        let errors = compile_errors(json!({
            "definitions": {
                "a": { "ref": "b" },
                "b": { "ref": "c" },
                "c": { "ref": "a" },
                "d": { "ref": "a" },
            },
        }));

        assert_eq!(
            vec![json!({
                "schemaPath": [],
                "raw": {
                    "type": "DEFINITIONS:NOOP_CIRCULAR_REFERENCES_DETECTED",
                    "definitionsInCycle": ["a", "b", "c"],
                },
            })],
            errors
        );
    }

    #[test]
    fn compile_definitions_allow_definitions_key_at_root_only() {
        let errors = compile_errors(json!({
            "definitions": { "a": { "definitions": {} } },
        }));

        assert_eq!(
            vec![json!({
                "schemaPath": ["definitions", "a"],
                "raw": { "type": "NON_ROOT_SCHEMA:ROOT_ONLY_KEYS", "keys": ["definitions"] },
            })],
            errors
        );
    }

    #[test]
    fn compile_is_idempotent() {
        let schemas = vec![
            json!({ "elements": { "type": "nope" }, "extra": true }),
            json!({ "properties": { "a": { "type": "int8" } } }),
        ];

        for schema in schemas {
            let options = CompilationOptions::new();
            let first = compile(&schema, &options).map(|_| ());
            let second = compile(&schema, &options).map(|_| ());
            assert_eq!(first, second);
        }
    }

    #[test]
    fn compile_extension_properties_need_the_extension() {
        let schema = json!({ "type": "string", "x:checks": {} });

        assert_eq!(
            vec![json!({
                "schemaPath": [],
                "raw": {
                    "type": "COMMON_SCHEMA:UNRECOGNIZED_KEYS",
                    "form": "type",
                    "keys": ["x:checks"],
                },
            })],
            compile_errors(schema.clone())
        );

        let options = CompilationOptions::new().with_extension(crate::extensions::X_CHECKS);
        assert!(compile(&schema, &options).is_ok());
    }

    fn reject_non_empty(cx: &mut crate::extension::ExtensionContext) {
        cx.hooks_builder().check(Form::Elements, |schema, cx| {
            let mut out: Vec<SupplementalValidateFn> = Vec::new();
            if schema.contains_key("metadata") {
                cx.push_error(CompilationRawError::EmptyEnum);
            } else {
                out.push(Box::new(|v: &Value, cx: &mut SupplementalContext<'_>| {
                    if v.as_array().map_or(false, |arr| !arr.is_empty()) {
                        cx.push_error(crate::errors::ValidationRawError::ElementsNotUnique);
                    }
                }));
            }
            out
        });
    }

    #[test]
    fn compile_runs_hooks_at_the_form_path() {
        let options =
            CompilationOptions::new().with_extension(Extension::new("reject", reject_non_empty));

        let errors = compile(
            &json!({ "values": { "elements": {}, "metadata": {} } }),
            &options,
        )
        .unwrap_err();
        assert_eq!(vec!["values", "elements"], errors[0].schema_path);

        let validator = compile(&json!({ "values": { "elements": {} } }), &options).unwrap();
        assert!(validator.validate(&json!({ "a": [] })).is_ok());

        let errors = validator.validate(&json!({ "a": [1] })).unwrap_err();
        assert_eq!(vec!["values", "elements"], errors[0].schema_path);
        assert_eq!(vec!["a"], errors[0].instance_path);
    }

    #[test]
    fn compile_skips_hooks_of_aborted_forms() {
        let options =
            CompilationOptions::new().with_extension(crate::extensions::DISALLOW_EMPTY_MAPPINGS);

        assert_eq!(
            vec![json!({
                "schemaPath": [],
                "raw": { "type": "DISCRIMINATOR_FORM:MISSING_MAPPING" },
            })],
            compile(&json!({ "discriminator": "foo" }), &options)
                .unwrap_err()
                .iter()
                .map(|err| serde_json::to_value(err).unwrap())
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn with_extension_ignores_duplicates() {
        let options = CompilationOptions::new()
            .with_extension(crate::extensions::X_CHECKS)
            .with_extension(crate::extensions::X_CHECKS);

        assert_eq!(1, options.extensions().len());
    }
}
