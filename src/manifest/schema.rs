//! Structural validation of a manifest document. Checks run in a fixed order and stop at the
//! first problem; nothing here touches the network.

use serde_json::{Map, Value};

use super::{
    CheckFields, CheckManifest, DeclaredCheck, DefaultRecord, FIELD_INTEGRATION_IDS,
    FIELD_TEAM_IDS, NameTable, apply_defaults, scalar_text,
};
use crate::error::{GitopsError, Result};

pub const MANIFEST_TYPE: &str = "pingdom-checks";
pub const SUPPORTED_VERSIONS: &[&str] = &["1.0"];

const REQUIRED_PINGDOM_KEYS: [&str; 4] = ["tag", "checks", "teams", "integrations"];

pub fn validate(document: &Value) -> Result<CheckManifest> {
    validate_gitops_marker(document)?;

    let pingdom = match document.get("pingdom") {
        None => {
            return Err(GitopsError::configuration(
                "Could not locate required `pingdom` tag",
            ));
        }
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(GitopsError::configuration(
                "Invalid `pingdom` tag type, expected YAML object",
            ));
        }
    };

    for key in REQUIRED_PINGDOM_KEYS {
        if !pingdom.contains_key(key) {
            return Err(GitopsError::configuration(format!(
                "Could not locate required `pingdom.{key}` tag"
            )));
        }
    }

    let tag = pingdom
        .get("tag")
        .and_then(scalar_text)
        .filter(|tag| !tag.trim().is_empty())
        .ok_or_else(|| {
            GitopsError::configuration("Invalid `pingdom.tag` value, expected non-empty string")
        })?;

    let teams = build_name_table(pingdom, "teams", "pingdom.teams")?;
    let integrations = build_name_table(pingdom, "integrations", "pingdom.integrations")?;

    let Some(Value::Array(raw_checks)) = pingdom.get("checks") else {
        return Err(GitopsError::configuration(
            "Invalid `pingdom.checks` tag type, expected YAML list",
        ));
    };

    let default = match pingdom.get("default") {
        None => None,
        Some(Value::Object(map)) => Some(DefaultRecord::new(map.clone())),
        Some(_) => {
            return Err(GitopsError::configuration(
                "Invalid `pingdom.default` item type, expected YAML object",
            ));
        }
    };

    let mut checks = Vec::with_capacity(raw_checks.len());
    for raw in raw_checks {
        let Value::Object(fields) = raw else {
            return Err(GitopsError::configuration(
                "Invalid `pingdom.checks` list item type, expected YAML object",
            ));
        };
        let mut fields = fields.clone();
        if let Some(default) = &default {
            apply_defaults(&mut fields, default);
        }
        validate_check(&fields, &teams, &integrations)?;
        checks.push(fields);
    }

    Ok(CheckManifest {
        tag,
        teams,
        integrations,
        default,
        checks,
    })
}

fn validate_gitops_marker(document: &Value) -> Result<()> {
    let gitops = match document.get("gitops") {
        None => {
            return Err(GitopsError::unexpected_file_type(
                "Could not locate required `gitops` tag",
            ));
        }
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(GitopsError::configuration(
                "Invalid `gitops` tag type, expected YAML object",
            ));
        }
    };

    for key in ["type", "version"] {
        if !gitops.contains_key(key) {
            return Err(GitopsError::configuration(format!(
                "Could not locate required `gitops.{key}` tag"
            )));
        }
    }

    if gitops.get("type").and_then(Value::as_str) != Some(MANIFEST_TYPE) {
        return Err(GitopsError::unexpected_file_type(
            "The supplied file did not contain expected `gitops.type` value",
        ));
    }

    let version = gitops.get("version").and_then(scalar_text).unwrap_or_default();
    if !SUPPORTED_VERSIONS.contains(&version.as_str()) {
        return Err(GitopsError::unexpected_file_type(format!(
            "The file version `{version}` was not recognized"
        )));
    }

    Ok(())
}

fn build_name_table(
    pingdom: &Map<String, Value>,
    key: &str,
    source: &'static str,
) -> Result<NameTable> {
    let mut table = NameTable::new(source);
    let Some(Value::Object(entries)) = pingdom.get(key) else {
        return Err(GitopsError::configuration(format!(
            "Invalid `{source}` tag type, expected YAML object"
        )));
    };
    for (name, id) in entries {
        let id = id.as_i64().ok_or_else(|| {
            GitopsError::configuration(format!(
                "Invalid `{source}` ID type for `{name}`, expected integer"
            ))
        })?;
        table.insert(name.clone(), id);
    }
    Ok(table)
}

fn validate_check(fields: &CheckFields, teams: &NameTable, integrations: &NameTable) -> Result<()> {
    let check = DeclaredCheck::from_fields(fields.clone())?;
    check_references(&check.name, check.team_names.as_deref(), teams, FIELD_TEAM_IDS)?;
    check_references(
        &check.name,
        check.integration_names.as_deref(),
        integrations,
        FIELD_INTEGRATION_IDS,
    )
}

fn check_references(
    check_name: &str,
    names: Option<&[String]>,
    table: &NameTable,
    field: &str,
) -> Result<()> {
    for name in names.unwrap_or_default() {
        if !table.contains(name) {
            return Err(GitopsError::configuration(format!(
                "Unknown `{field}` name `{name}` specified in check `{check_name}`, ensure ID defined in `{}` tag",
                table.source()
            )));
        }
    }
    Ok(())
}
