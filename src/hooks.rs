use crate::errors::{CompilationError, CompilationRawError, ValidationError, ValidationRawError};
use crate::form::Form;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// An extra check attached to one compiled schema node. It runs at
/// validation time, after the node's own checks have accepted the instance.
pub type SupplementalValidateFn = Box<dyn Fn(&Value, &mut SupplementalContext<'_>) + Send + Sync>;

/// A compile-time hook. It receives the raw schema object of every node of
/// the form it was registered for, and returns the supplemental validators
/// to attach to that node (possibly none).
pub type Hook =
    Box<dyn Fn(&Map<String, Value>, &mut HookContext<'_>) -> Vec<SupplementalValidateFn> + Send + Sync>;

/// Error sink handed to a [`Hook`], scoped to the schema path of the node
/// being compiled.
pub struct HookContext<'a> {
    schema_path: &'a [String],
    errors: &'a mut Vec<CompilationError>,
}

impl<'a> HookContext<'a> {
    pub(crate) fn new(schema_path: &'a [String], errors: &'a mut Vec<CompilationError>) -> Self {
        Self {
            schema_path,
            errors,
        }
    }

    pub fn push_error(&mut self, raw: CompilationRawError) {
        self.errors.push(CompilationError {
            schema_path: self.schema_path.to_vec(),
            raw,
        });
    }

    pub fn schema_path(&self) -> &[String] {
        self.schema_path
    }
}

/// Error sink handed to a [`SupplementalValidateFn`], scoped to the schema
/// and instance paths being validated.
pub struct SupplementalContext<'a> {
    schema_path: &'a [String],
    instance_path: &'a [String],
    errors: &'a mut Vec<ValidationError>,
}

impl<'a> SupplementalContext<'a> {
    pub(crate) fn new(
        schema_path: &'a [String],
        instance_path: &'a [String],
        errors: &'a mut Vec<ValidationError>,
    ) -> Self {
        Self {
            schema_path,
            instance_path,
            errors,
        }
    }

    pub fn push_error(&mut self, raw: ValidationRawError) {
        self.errors.push(ValidationError {
            schema_path: self.schema_path.to_vec(),
            instance_path: self.instance_path.to_vec(),
            raw,
        });
    }
}

/// Collects hooks per schema form. Consumed by [`HooksBuilder::build`].
#[derive(Default)]
pub struct HooksBuilder {
    hooks: HashMap<Form, Vec<Hook>>,
}

impl HooksBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `hook` for every schema node of form `form`. Hooks of one
    /// form run in registration order.
    pub fn check<F>(&mut self, form: Form, hook: F) -> &mut Self
    where
        F: Fn(&Map<String, Value>, &mut HookContext<'_>) -> Vec<SupplementalValidateFn>
            + Send
            + Sync
            + 'static,
    {
        self.hooks.entry(form).or_default().push(Box::new(hook));
        self
    }

    pub fn build(self) -> Hooks {
        Hooks { hooks: self.hooks }
    }
}

impl fmt::Debug for HooksBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HooksBuilder")
            .field("forms", &self.hooks.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// The frozen set of hooks used for one compilation.
#[derive(Default)]
pub struct Hooks {
    hooks: HashMap<Form, Vec<Hook>>,
}

impl Hooks {
    pub(crate) fn run(
        &self,
        form: Form,
        schema: &Map<String, Value>,
        cx: &mut HookContext<'_>,
    ) -> Vec<SupplementalValidateFn> {
        let hooks = match self.hooks.get(&form) {
            Some(hooks) => hooks,
            None => return Vec::new(),
        };

        let mut out = Vec::new();
        for hook in hooks {
            out.extend(hook(schema, cx));
        }

        out
    }
}
