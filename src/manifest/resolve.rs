//! Identity resolution: team and integration names become Pingdom ids, and the reconciliation
//! tag is attached to the check's tags.
//!
//! The comma-separated rendering the Pingdom API wants for `tags`, `teamids` and
//! `integrationids` only happens in [`ResolvedCheck::create_fields`] and
//! [`ResolvedCheck::update_fields`].

use serde_json::Value;

use super::{
    CheckFields, DeclaredCheck, FIELD_HOST, FIELD_INTEGRATION_IDS, FIELD_NAME, FIELD_TAGS,
    FIELD_TEAM_IDS, FIELD_TYPE, NameTable,
};
use crate::error::{GitopsError, Result};

/// A declared check whose names have been resolved to ids.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCheck {
    pub name: String,
    pub host: String,
    pub check_type: String,
    /// Reconciliation tag first, then the declared tags in order.
    pub tags: Vec<String>,
    pub team_ids: Option<Vec<i64>>,
    pub integration_ids: Option<Vec<i64>>,
    pub extra: CheckFields,
}

pub fn resolve(
    check: &DeclaredCheck,
    teams: &NameTable,
    integrations: &NameTable,
    reconciliation_tag: &str,
) -> Result<ResolvedCheck> {
    let mut tags = Vec::with_capacity(1 + check.tags.as_ref().map_or(0, Vec::len));
    tags.push(reconciliation_tag.to_string());
    if let Some(declared) = &check.tags {
        tags.extend(declared.iter().cloned());
    }

    Ok(ResolvedCheck {
        name: check.name.clone(),
        host: check.host.clone(),
        check_type: check.check_type.clone(),
        tags,
        team_ids: resolve_names(check.team_names.as_deref(), teams, FIELD_TEAM_IDS)?,
        integration_ids: resolve_names(
            check.integration_names.as_deref(),
            integrations,
            FIELD_INTEGRATION_IDS,
        )?,
        extra: check.extra.clone(),
    })
}

fn resolve_names(
    names: Option<&[String]>,
    table: &NameTable,
    field: &str,
) -> Result<Option<Vec<i64>>> {
    let Some(names) = names else {
        return Ok(None);
    };
    names
        .iter()
        .map(|name| {
            table.get(name).ok_or_else(|| {
                GitopsError::configuration(format!(
                    "Unknown `{field}` name `{name}` specified in check, ensure ID defined in `{}` tag",
                    table.source()
                ))
            })
        })
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

/// Joins items with `,`, no trailing separator.
pub fn join_csv<T: ToString>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

impl ResolvedCheck {
    pub fn tags_csv(&self) -> String {
        join_csv(&self.tags)
    }

    pub fn team_ids_csv(&self) -> Option<String> {
        self.team_ids.as_deref().map(join_csv)
    }

    pub fn integration_ids_csv(&self) -> Option<String> {
        self.integration_ids.as_deref().map(join_csv)
    }

    /// Wire fields for `POST /checks`.
    pub fn create_fields(&self) -> CheckFields {
        self.wire_fields(true)
    }

    /// Wire fields for `PUT /checks/{id}`. Pingdom rejects `type` on update, so it is never sent,
    /// not even when it arrived through the passthrough fields.
    pub fn update_fields(&self) -> CheckFields {
        self.wire_fields(false)
    }

    fn wire_fields(&self, include_type: bool) -> CheckFields {
        let mut fields = CheckFields::new();
        fields.insert(FIELD_NAME.to_string(), Value::String(self.name.clone()));
        fields.insert(FIELD_HOST.to_string(), Value::String(self.host.clone()));
        if include_type {
            fields.insert(FIELD_TYPE.to_string(), Value::String(self.check_type.clone()));
        }
        fields.insert(FIELD_TAGS.to_string(), Value::String(self.tags_csv()));
        if let Some(csv) = self.team_ids_csv() {
            fields.insert(FIELD_TEAM_IDS.to_string(), Value::String(csv));
        }
        if let Some(csv) = self.integration_ids_csv() {
            fields.insert(FIELD_INTEGRATION_IDS.to_string(), Value::String(csv));
        }
        for (key, value) in &self.extra {
            if key == FIELD_TYPE && !include_type {
                continue;
            }
            fields.entry(key.clone()).or_insert_with(|| value.clone());
        }
        fields
    }
}
