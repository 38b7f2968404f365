use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

pub type Attributes = Map<String, Value>;

/// Field name to the messages recorded against it, in the order they were added.
pub type ErrorMap = BTreeMap<String, Vec<String>>;

/// One archival record under validation together with its error ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    entity_type: String,
    identifier: String,
    attributes: Attributes,
    errors: ErrorMap,
}

impl Entity {
    pub fn new(
        entity_type: impl Into<String>,
        identifier: impl Into<String>,
        attributes: Attributes,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            identifier: identifier.into(),
            attributes,
            errors: ErrorMap::new(),
        }
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Attribute rendered as plain text. Strings come back verbatim, scalars
    /// through their JSON form, and `null` counts as absent.
    pub fn text_attribute(&self, name: &str) -> Option<String> {
        match self.attributes.get(name)? {
            Value::Null => None,
            Value::String(value) => Some(value.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn get_errors(&self) -> &ErrorMap {
        &self.errors
    }
}
