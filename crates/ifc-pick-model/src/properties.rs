// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element properties returned by the metadata collaborator

use crate::{ElementId, ElementRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A property value as decoded from the IFC attribute
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Unset value ($)
    #[default]
    Null,
    /// Boolean or logical value
    Bool(bool),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Real(f64),
    /// Label, text, identifier or enumeration value
    Text(String),
    /// Reference to another entity (#123)
    Reference {
        #[serde(rename = "ref")]
        id: ElementId,
    },
    /// List of values
    List(Vec<PropertyValue>),
}

impl PropertyValue {
    /// Try to get as string
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as float (integers are widened)
    pub fn as_real(&self) -> Option<f64> {
        match self {
            PropertyValue::Real(v) => Some(*v),
            PropertyValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Try to get as entity reference
    pub fn as_reference(&self) -> Option<ElementId> {
        match self {
            PropertyValue::Reference { id } => Some(*id),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Null => write!(f, "-"),
            PropertyValue::Bool(v) => write!(f, "{}", v),
            PropertyValue::Integer(v) => write!(f, "{}", v),
            PropertyValue::Real(v) => write!(f, "{}", v),
            PropertyValue::Text(v) => write!(f, "{}", v),
            PropertyValue::Reference { id } => write!(f, "{}", id),
            PropertyValue::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Real(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Integer(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<ElementId> for PropertyValue {
    fn from(id: ElementId) -> Self {
        PropertyValue::Reference { id }
    }
}

/// A single named property with optional unit
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Property name
    pub name: String,
    /// Property value
    pub value: PropertyValue,
    /// Unit of measurement (if applicable)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Property {
    /// Create a new property
    pub fn new(name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            unit: None,
        }
    }

    /// Create a property with unit
    pub fn with_unit(
        name: impl Into<String>,
        value: impl Into<PropertyValue>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            unit: Some(unit.into()),
        }
    }
}

/// Properties of one element
///
/// Produced on demand for an element and never cached by the picking code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertySet {
    /// Element the properties belong to
    pub element: ElementRef,
    /// IFC class name (e.g., "IFCWALLSTANDARDCASE")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ifc_type: Option<String>,
    /// Properties in attribute order
    pub properties: Vec<Property>,
}

impl PropertySet {
    /// Create an empty property set for an element
    pub fn new(element: ElementRef) -> Self {
        Self {
            element,
            ifc_type: None,
            properties: Vec::new(),
        }
    }

    pub fn with_type(mut self, ifc_type: impl Into<String>) -> Self {
        self.ifc_type = Some(ifc_type.into());
        self
    }

    /// Add a property to this set
    pub fn add(&mut self, property: Property) {
        self.properties.push(property);
    }

    /// Get a property by name
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Get a property value by name
    pub fn value(&self, name: &str) -> Option<&PropertyValue> {
        self.get(name).map(|p| &p.value)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
