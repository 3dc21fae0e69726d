//! Typed model of a `pingdom-checks` manifest.
//!
//! A manifest is validated once by [`schema::validate`], which yields a [`CheckManifest`]. Each
//! check keeps its raw field bag so that unknown Pingdom fields pass through to the API untouched;
//! [`DeclaredCheck`] lifts the fields the reconciler reasons about into typed form.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::{GitopsError, Result};

pub mod defaults;
pub mod resolve;
pub mod schema;

pub use defaults::apply_defaults;
pub use resolve::{ResolvedCheck, resolve};
pub use schema::validate;

/// Raw field bag of a single check, as written in the manifest.
pub type CheckFields = Map<String, Value>;

pub const FIELD_NAME: &str = "name";
pub const FIELD_HOST: &str = "host";
pub const FIELD_TYPE: &str = "type";
pub const FIELD_TAGS: &str = "tags";
pub const FIELD_TEAM_IDS: &str = "teamids";
pub const FIELD_INTEGRATION_IDS: &str = "integrationids";

/// Field values copied into every check that does not set them itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefaultRecord(CheckFields);

impl DefaultRecord {
    pub fn new(fields: CheckFields) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &CheckFields {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Maps manifest-local names (teams, integrations) to Pingdom numeric ids.
#[derive(Debug, Clone, PartialEq)]
pub struct NameTable {
    source: &'static str,
    ids: BTreeMap<String, i64>,
}

impl NameTable {
    pub fn new(source: &'static str) -> Self {
        Self {
            source,
            ids: BTreeMap::new(),
        }
    }

    pub fn with_entries<I, S>(source: &'static str, entries: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        Self {
            source,
            ids: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, id: i64) {
        self.ids.insert(name.into(), id);
    }

    /// Manifest path of the section this table was built from, e.g. `pingdom.teams`.
    pub fn source(&self) -> &'static str {
        self.source
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.ids.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ids.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// A validated manifest, ready to be reconciled.
#[derive(Debug, Clone)]
pub struct CheckManifest {
    /// Reconciliation tag: marks the remote checks owned by this manifest.
    pub tag: String,
    pub teams: NameTable,
    pub integrations: NameTable,
    pub default: Option<DefaultRecord>,
    /// Check field bags with defaults already applied.
    pub checks: Vec<CheckFields>,
}

/// A declared check with its well-known fields typed and everything else kept opaque.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredCheck {
    pub name: String,
    pub host: String,
    pub check_type: String,
    pub tags: Option<Vec<String>>,
    pub team_names: Option<Vec<String>>,
    pub integration_names: Option<Vec<String>>,
    /// Remote-API fields this tool does not interpret.
    pub extra: CheckFields,
}

impl DeclaredCheck {
    pub fn from_fields(mut fields: CheckFields) -> Result<Self> {
        let name = take_required_string(&mut fields, FIELD_NAME)?;
        let host = take_required_string(&mut fields, FIELD_HOST)?;
        let check_type = take_required_string(&mut fields, FIELD_TYPE)?;
        let tags = take_string_list(&mut fields, FIELD_TAGS)?;
        let team_names = take_string_list(&mut fields, FIELD_TEAM_IDS)?;
        let integration_names = take_string_list(&mut fields, FIELD_INTEGRATION_IDS)?;

        Ok(Self {
            name,
            host,
            check_type,
            tags,
            team_names,
            integration_names,
            extra: fields,
        })
    }
}

/// Renders a scalar as the text the Pingdom API expects. Sequences, mappings and null have no
/// scalar rendering.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn take_required_string(fields: &mut CheckFields, key: &str) -> Result<String> {
    match fields.remove(key) {
        None => Err(GitopsError::configuration(format!(
            "Could not locate mandatory `{key}` value in check"
        ))),
        Some(Value::String(s)) if s.trim().is_empty() => Err(GitopsError::configuration(format!(
            "Empty `{key}` value in check, expected non-empty string"
        ))),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(GitopsError::configuration(format!(
            "Invalid data type `{key}` in check, expected string value"
        ))),
    }
}

fn take_string_list(fields: &mut CheckFields, key: &str) -> Result<Option<Vec<String>>> {
    let Some(value) = fields.remove(key) else {
        return Ok(None);
    };
    let Value::Array(items) = value else {
        return Err(GitopsError::configuration(format!(
            "Invalid data type `{key}` in check, expected YAML list"
        )));
    };
    items
        .iter()
        .map(|item| {
            scalar_text(item).ok_or_else(|| {
                GitopsError::configuration(format!(
                    "Invalid `{key}` list item in check, expected scalar value"
                ))
            })
        })
        .collect::<Result<Vec<_>>>()
        .map(Some)
}
