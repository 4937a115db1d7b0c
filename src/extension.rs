use crate::hooks::{Hooks, HooksBuilder};
use std::collections::HashSet;
use std::fmt;

/// An optional, compiled-in check that can be enabled for a compilation.
///
/// An extension is a named function that declares extra schema property
/// names and registers hooks on the [`ExtensionContext`] it is given. The
/// ones shipped with this crate live in [`crate::extensions`].
#[derive(Clone, Copy)]
pub struct Extension {
    name: &'static str,
    install: fn(&mut ExtensionContext),
}

impl Extension {
    pub const fn new(name: &'static str, install: fn(&mut ExtensionContext)) -> Self {
        Self { name, install }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Extension").field(&self.name).finish()
    }
}

impl PartialEq for Extension {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// What an [`Extension`] gets to configure while it is installed.
#[derive(Debug, Default)]
pub struct ExtensionContext {
    declared_properties: HashSet<String>,
    hooks: HooksBuilder,
}

impl ExtensionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `name` as a legal schema property wherever it appears.
    pub fn declare_property(&mut self, name: &str) {
        self.declared_properties.insert(name.to_owned());
    }

    pub fn hooks_builder(&mut self) -> &mut HooksBuilder {
        &mut self.hooks
    }

    pub(crate) fn install(&mut self, extension: &Extension) {
        tracing::trace!(extension = extension.name, "installing extension");
        (extension.install)(self);
    }

    pub(crate) fn finalize(self) -> FinalizedExtensionContext {
        FinalizedExtensionContext {
            declared_properties: self.declared_properties,
            hooks: self.hooks.build(),
        }
    }
}

/// The read-only outcome of installing every enabled extension.
pub(crate) struct FinalizedExtensionContext {
    pub declared_properties: HashSet<String>,
    pub hooks: Hooks,
}

impl FinalizedExtensionContext {
    pub fn from_extensions(extensions: &[Extension]) -> Self {
        let mut cx = ExtensionContext::new();
        for extension in extensions {
            cx.install(extension);
        }
        cx.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CompilationRawError;
    use crate::form::Form;
    use crate::hooks::HookContext;
    use serde_json::json;

    fn install_foo(cx: &mut ExtensionContext) {
        cx.declare_property("x:foo");
        cx.hooks_builder().check(Form::Empty, |_, cx| {
            cx.push_error(CompilationRawError::EmptyMapping);
            vec![]
        });
    }

    const FOO: Extension = Extension::new("foo", install_foo);

    #[test]
    fn finalize_collects_properties_and_hooks() {
        let finalized = FinalizedExtensionContext::from_extensions(&[FOO]);
        assert!(finalized.declared_properties.contains("x:foo"));

        let schema = json!({});
        let mut errors = Vec::new();
        finalized.hooks.run(
            Form::Empty,
            schema.as_object().unwrap(),
            &mut HookContext::new(&[], &mut errors),
        );
        assert_eq!(1, errors.len());
    }

    #[test]
    fn debug_shows_name() {
        assert_eq!("Extension(\"foo\")", format!("{:?}", FOO));
    }
}
