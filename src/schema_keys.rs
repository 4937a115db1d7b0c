use crate::form::Form;
use std::collections::HashSet;

/// The keys of one schema object, sorted by the role they play.
#[derive(Clone, Debug, PartialEq)]
pub enum GroupedKeys {
    Form(FormKeys),

    /// Keys of more than one form were present. Carries every form key seen,
    /// in encounter order.
    Ambiguous { discriminator_keys: Vec<String> },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormKeys {
    pub form: Form,

    pub nullable: bool,
    pub metadata: bool,
    pub definitions: bool,

    pub properties: bool,
    pub optional_properties: bool,
    pub additional_properties: bool,
    pub mapping: bool,

    /// Keys that belong to no form and were not declared by an extension.
    pub unrecognized: Vec<String>,
}

/// Classifies a schema's keys into exactly one form.
///
/// `declared` holds the extra property names registered by extensions; those
/// are accepted without being reported.
pub fn group_keys<'a, I>(keys: I, declared: &HashSet<String>) -> GroupedKeys
where
    I: IntoIterator<Item = &'a String>,
{
    let mut form: Option<Form> = None;
    let mut ambiguous = false;
    let mut discriminator_keys = Vec::new();
    let mut properties = false;
    let mut optional_properties = false;
    let mut rest = Vec::new();

    for key in keys {
        let key_form = match key.as_str() {
            "type" => Form::Type,
            "enum" => Form::Enum,
            "elements" => Form::Elements,
            "properties" | "optionalProperties" => Form::Properties,
            "values" => Form::Values,
            "discriminator" => Form::Discriminator,
            "ref" => Form::Ref,
            _ => {
                rest.push(key);
                continue;
            }
        };

        discriminator_keys.push(key.clone());
        if key == "properties" {
            properties = true;
        } else if key == "optionalProperties" {
            optional_properties = true;
        }

        match form {
            None => form = Some(key_form),
            Some(f) if f == key_form && f == Form::Properties => {}
            Some(_) => ambiguous = true,
        }
    }

    if ambiguous {
        return GroupedKeys::Ambiguous { discriminator_keys };
    }

    let mut out = FormKeys {
        form: form.unwrap_or_default(),
        properties,
        optional_properties,
        ..Default::default()
    };

    for key in rest {
        match key.as_str() {
            "nullable" => out.nullable = true,
            "metadata" => out.metadata = true,
            "definitions" => out.definitions = true,
            "additionalProperties" if out.form == Form::Properties => {
                out.additional_properties = true
            }
            "mapping" if out.form == Form::Discriminator => out.mapping = true,
            _ if declared.contains(key) => {}
            _ => out.unrecognized.push(key.clone()),
        }
    }

    GroupedKeys::Form(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(keys: &[&str], declared: &[&str]) -> GroupedKeys {
        let keys: Vec<String> = keys.iter().map(|k| (*k).to_owned()).collect();
        let declared = declared.iter().map(|k| (*k).to_owned()).collect();
        group_keys(&keys, &declared)
    }

    fn form_keys(grouped: GroupedKeys) -> FormKeys {
        match grouped {
            GroupedKeys::Form(keys) => keys,
            GroupedKeys::Ambiguous { .. } => panic!("unexpected ambiguous keys"),
        }
    }

    #[test]
    fn empty() {
        assert_eq!(FormKeys::default(), form_keys(group(&[], &[])));
    }

    #[test]
    fn single_forms() {
        for (key, form) in &[
            ("type", Form::Type),
            ("enum", Form::Enum),
            ("elements", Form::Elements),
            ("properties", Form::Properties),
            ("optionalProperties", Form::Properties),
            ("values", Form::Values),
            ("discriminator", Form::Discriminator),
            ("ref", Form::Ref),
        ] {
            assert_eq!(*form, form_keys(group(&[key], &[])).form);
        }
    }

    #[test]
    fn properties_and_optional_properties() {
        let keys = form_keys(group(&["optionalProperties", "properties"], &[]));
        assert_eq!(Form::Properties, keys.form);
        assert!(keys.properties);
        assert!(keys.optional_properties);
    }

    #[test]
    fn ambiguous() {
        assert_eq!(
            GroupedKeys::Ambiguous {
                discriminator_keys: vec!["type".to_owned(), "properties".to_owned()]
            },
            group(&["type", "nullable", "properties"], &[])
        );

        assert_eq!(
            GroupedKeys::Ambiguous {
                discriminator_keys: vec![
                    "properties".to_owned(),
                    "ref".to_owned(),
                    "optionalProperties".to_owned()
                ]
            },
            group(&["properties", "ref", "optionalProperties"], &[])
        );
    }

    #[test]
    fn rest_keys() {
        let keys = form_keys(group(
            &["nullable", "metadata", "definitions", "type", "x:checks", "foo"],
            &["x:checks"],
        ));

        assert_eq!(Form::Type, keys.form);
        assert!(keys.nullable);
        assert!(keys.metadata);
        assert!(keys.definitions);
        assert_eq!(vec!["foo".to_owned()], keys.unrecognized);
    }

    #[test]
    fn form_specific_keys() {
        let keys = form_keys(group(&["properties", "additionalProperties"], &[]));
        assert!(keys.additional_properties);
        assert!(keys.unrecognized.is_empty());

        let keys = form_keys(group(&["type", "additionalProperties", "mapping"], &[]));
        assert_eq!(
            vec!["additionalProperties".to_owned(), "mapping".to_owned()],
            keys.unrecognized
        );

        let keys = form_keys(group(&["discriminator", "mapping"], &[]));
        assert!(keys.mapping);
    }
}
