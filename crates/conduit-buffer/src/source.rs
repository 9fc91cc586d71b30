//! Input line features and attribute binding.

use crate::config::Settings;
use crate::error::{ConduitError, Result};
use crate::Point2;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// An attribute value of an input feature.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    /// Missing or null.
    #[default]
    Null,
    /// Numeric value.
    Number(f64),
    /// Text value.
    Text(String),
}

impl FieldValue {
    /// Numeric view of the value. Numeric text is parsed; NaN counts as null.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            FieldValue::Null => return None,
            FieldValue::Number(v) => *v,
            FieldValue::Text(s) => s.trim().parse().ok()?,
        };
        (!value.is_nan()).then_some(value)
    }

    /// Whether the value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "NULL"),
            FieldValue::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => {
                write!(f, "{}", *v as i64)
            }
            FieldValue::Number(v) => write!(f, "{}", v),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// An input line feature.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Positional feature id.
    pub fid: u64,
    /// Attribute values by field name.
    pub attributes: HashMap<String, FieldValue>,
    /// Polyline vertices.
    pub geometry: Vec<Point2>,
}

impl Feature {
    /// Create a feature with no attributes.
    pub fn new(fid: u64, geometry: Vec<Point2>) -> Self {
        Self {
            fid,
            attributes: HashMap::new(),
            geometry,
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Value of an attribute; absent fields read as [`FieldValue::Null`].
    pub fn attribute(&self, name: &str) -> &FieldValue {
        static NULL: FieldValue = FieldValue::Null;
        self.attributes.get(name).unwrap_or(&NULL)
    }
}

/// A collection of line features that can be iterated in a stable order.
pub trait FeatureSource {
    /// Names of the attribute fields in the schema.
    fn field_names(&self) -> Vec<String>;

    /// Number of features.
    fn feature_count(&self) -> usize;

    /// Features in input order.
    fn features(&self) -> Box<dyn Iterator<Item = &Feature> + '_>;

    /// Spatial reference, passed through to the outputs unchanged.
    fn crs(&self) -> Option<&str> {
        None
    }
}

/// In-memory feature collection.
#[derive(Debug, Clone, Default)]
pub struct FeatureCollection {
    /// Schema field names.
    pub fields: Vec<String>,
    /// Features in input order.
    pub features: Vec<Feature>,
    /// Spatial reference identifier.
    pub crs: Option<String>,
}

impl FeatureCollection {
    /// Build a collection whose schema is the union of all attribute names.
    pub fn from_features(features: Vec<Feature>) -> Self {
        let fields: BTreeSet<&String> = features.iter().flat_map(|f| f.attributes.keys()).collect();
        Self {
            fields: fields.into_iter().cloned().collect(),
            features,
            crs: None,
        }
    }

    /// Set the spatial reference.
    pub fn with_crs(mut self, crs: impl Into<String>) -> Self {
        self.crs = Some(crs.into());
        self
    }
}

impl FeatureSource for FeatureCollection {
    fn field_names(&self) -> Vec<String> {
        self.fields.clone()
    }

    fn feature_count(&self) -> usize {
        self.features.len()
    }

    fn features(&self) -> Box<dyn Iterator<Item = &Feature> + '_> {
        Box::new(self.features.iter())
    }

    fn crs(&self) -> Option<&str> {
        self.crs.as_deref()
    }
}

/// Attribute names resolved once per run against the input schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    /// Width field.
    pub width: String,
    /// First height candidate present in the schema.
    pub height: Option<String>,
    /// Identifier field, if present.
    pub id: Option<String>,
    /// First upstream invert candidate present.
    pub start_invert: Option<String>,
    /// First downstream invert candidate present.
    pub end_invert: Option<String>,
}

impl FieldBinding {
    /// Resolve field names against the schema.
    ///
    /// Fails only when the width field itself is absent; every optional
    /// field simply binds to `None`.
    pub fn resolve(settings: &Settings, available: &[String]) -> Result<Self> {
        let has = |name: &str| available.iter().any(|f| f == name);
        let first = |candidates: &[String]| candidates.iter().find(|c| has(c.as_str())).cloned();

        if !has(settings.width_field.as_str()) {
            return Err(ConduitError::MissingField(settings.width_field.clone()));
        }

        Ok(Self {
            width: settings.width_field.clone(),
            height: first(&settings.height_fields),
            id: has(settings.id_field.as_str()).then(|| settings.id_field.clone()),
            start_invert: first(&settings.start_invert_fields),
            end_invert: first(&settings.end_invert_fields),
        })
    }

    /// Conduit identifier, falling back to the feature id.
    pub fn id(&self, feature: &Feature) -> String {
        match self.id.as_deref().map(|name| feature.attribute(name)) {
            Some(value) if !value.is_null() => value.to_string(),
            _ => feature.fid.to_string(),
        }
    }

    /// Width attribute as stored, in the configured unit.
    pub fn width_value<'a>(&self, feature: &'a Feature) -> &'a FieldValue {
        feature.attribute(&self.width)
    }

    /// Raw height in the configured unit.
    pub fn height(&self, feature: &Feature) -> Option<f64> {
        self.height
            .as_deref()
            .and_then(|name| feature.attribute(name).as_f64())
    }

    /// Upstream and downstream invert elevations, 0 when absent.
    pub fn inverts(&self, feature: &Feature) -> (f64, f64) {
        let read = |field: &Option<String>| {
            field
                .as_deref()
                .and_then(|name| feature.attribute(name).as_f64())
                .unwrap_or(0.0)
        };
        (read(&self.start_invert), read(&self.end_invert))
    }
}
