//! GitOps reconciler for Pingdom health checks.
//!
//! A `pingdom-checks` manifest declares the checks a team owns. A run validates the manifest,
//! then creates or updates each declared check in Pingdom. Ownership is tracked through a
//! reconciliation tag that is attached to every check this tool writes.

pub mod config;
pub mod directory;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod matcher;
pub mod pingdom;
pub mod reconciler;
pub mod version;

#[cfg(test)]
pub(crate) mod testing;

use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::config::{ApiSettings, load_document};
use crate::error::Result;
use crate::pingdom::PingdomClient;
use crate::reconciler::{Reconciler, RunReport};

/// Loads, validates and reconciles the manifest at `path` against the configured Pingdom API.
///
/// Validation completes before the first remote call.
pub async fn reconcile_file(path: &Path, settings: ApiSettings) -> Result<RunReport> {
    let document = load_document(path)?;
    let manifest = manifest::validate(&document)?;
    info!(
        path = %path.display(),
        tag = %manifest.tag,
        checks = manifest.checks.len(),
        "Manifest validated"
    );

    let client = Arc::new(PingdomClient::new(settings)?);
    Reconciler::new(client).run(&manifest).await
}
