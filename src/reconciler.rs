//! Drives a validated manifest against Pingdom: one create or update round per declared check.
//!
//! Every check is processed even after failures. Each yields a [`CheckOutcome`]; the run fails
//! afterwards only if an update failed. Create failures are logged and reported but do not fail
//! the run.

use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::directory::RemoteCheckDirectory;
use crate::error::{GitopsError, Result};
use crate::manifest::{
    CheckFields, CheckManifest, DeclaredCheck, ResolvedCheck, apply_defaults, resolve,
};
use crate::matcher::find_matches;
use crate::pingdom::{
    ApiResponse, CheckTransport, RemoteCheck, check_path, checks_path, encode_params,
};

/// Where a declared check is in its round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Pending,
    Matching,
    Creating,
    Updating,
    Done,
    Failed,
}

/// Result of updating one matched remote check.
#[derive(Debug)]
pub struct UpdateAttempt {
    pub check_id: u64,
    pub result: Result<()>,
}

#[derive(Debug)]
pub enum CheckAction {
    Created,
    CreateFailed(GitopsError),
    Updated(Vec<UpdateAttempt>),
}

/// What happened to one declared check.
#[derive(Debug)]
pub struct CheckOutcome {
    pub name: String,
    pub host: String,
    pub action: CheckAction,
}

impl CheckOutcome {
    pub fn state(&self) -> CheckState {
        match &self.action {
            CheckAction::Created => CheckState::Done,
            CheckAction::CreateFailed(_) => CheckState::Failed,
            CheckAction::Updated(attempts) if attempts.iter().any(|a| a.result.is_err()) => {
                CheckState::Failed
            }
            CheckAction::Updated(_) => CheckState::Done,
        }
    }

    pub fn failed_updates(&self) -> usize {
        match &self.action {
            CheckAction::Updated(attempts) => {
                attempts.iter().filter(|a| a.result.is_err()).count()
            }
            _ => 0,
        }
    }
}

/// Per-check outcomes of a full run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<CheckOutcome>,
}

impl RunReport {
    pub fn created(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.action, CheckAction::Created))
            .count()
    }

    pub fn failed_creates(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.action, CheckAction::CreateFailed(_)))
            .count()
    }

    pub fn updated(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match &o.action {
                CheckAction::Updated(attempts) => {
                    attempts.iter().filter(|a| a.result.is_ok()).count()
                }
                _ => 0,
            })
            .sum()
    }

    pub fn failed_updates(&self) -> usize {
        self.outcomes.iter().map(CheckOutcome::failed_updates).sum()
    }

    /// Folds the outcomes into the run result. Only update failures fail the run.
    pub fn into_result(self) -> Result<RunReport> {
        match self.failed_updates() {
            0 => Ok(self),
            failed_updates => Err(GitopsError::Aggregate { failed_updates }),
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} create failure(s), {} update failure(s)",
            self.created(),
            self.updated(),
            self.failed_creates(),
            self.failed_updates()
        )
    }
}

pub struct Reconciler<T: CheckTransport + ?Sized> {
    transport: Arc<T>,
    directory: RemoteCheckDirectory<T>,
}

impl<T: CheckTransport + ?Sized> Reconciler<T> {
    pub fn new(transport: Arc<T>) -> Self {
        let directory = RemoteCheckDirectory::new(Arc::clone(&transport));
        Self {
            transport,
            directory,
        }
    }

    pub fn directory(&self) -> &RemoteCheckDirectory<T> {
        &self.directory
    }

    /// Processes every declared check and returns the per-check report without judging it.
    ///
    /// Configuration problems and failures to list or inspect remote checks abort the run;
    /// create and update failures are recorded in the report.
    pub async fn reconcile(&mut self, manifest: &CheckManifest) -> Result<RunReport> {
        let mut report = RunReport::default();
        info!(
            tag = %manifest.tag,
            checks = manifest.checks.len(),
            "Reconciling Pingdom checks"
        );
        for fields in &manifest.checks {
            let outcome = self.reconcile_check(manifest, fields.clone()).await?;
            report.outcomes.push(outcome);
        }
        Ok(report)
    }

    /// [`reconcile`](Self::reconcile) followed by the aggregate decision.
    pub async fn run(&mut self, manifest: &CheckManifest) -> Result<RunReport> {
        let report = self.reconcile(manifest).await?;
        info!(summary = %report, "Reconciliation finished");
        report.into_result()
    }

    async fn reconcile_check(
        &mut self,
        manifest: &CheckManifest,
        mut fields: CheckFields,
    ) -> Result<CheckOutcome> {
        if let Some(default) = &manifest.default {
            apply_defaults(&mut fields, default);
        }
        let declared = DeclaredCheck::from_fields(fields)?;
        trace_state(&declared.host, CheckState::Pending);
        let resolved = resolve(
            &declared,
            &manifest.teams,
            &manifest.integrations,
            &manifest.tag,
        )?;

        // Ownership is decided by the reconciliation tag alone, not the declared tags.
        let scope = [manifest.tag.clone()];
        trace_state(&resolved.host, CheckState::Matching);
        let matches = find_matches(&mut self.directory, &resolved.host, &scope).await?;

        let action = if matches.is_empty() {
            trace_state(&resolved.host, CheckState::Creating);
            self.create(&resolved).await
        } else {
            trace_state(&resolved.host, CheckState::Updating);
            self.update_all(&resolved, &matches).await
        };

        let outcome = CheckOutcome {
            name: resolved.name,
            host: resolved.host,
            action,
        };
        trace_state(&outcome.host, outcome.state());
        Ok(outcome)
    }

    async fn create(&self, check: &ResolvedCheck) -> CheckAction {
        info!(host = %check.host, name = %check.name, "Creating check");
        let params = encode_params(&check.create_fields());
        let result = self
            .transport
            .post(checks_path(), &params)
            .await
            .and_then(ApiResponse::into_success);
        match result {
            Ok(_) => CheckAction::Created,
            Err(e) => {
                warn!(host = %check.host, error = %e, "Failed to create Pingdom health check");
                CheckAction::CreateFailed(e)
            }
        }
    }

    async fn update_all(&self, check: &ResolvedCheck, matches: &[RemoteCheck]) -> CheckAction {
        let params = encode_params(&check.update_fields());
        let mut attempts = Vec::with_capacity(matches.len());
        for remote in matches {
            info!(
                host = %check.host,
                check_id = remote.id,
                remote_name = remote.name.as_deref().unwrap_or_default(),
                "Updating check"
            );
            let result = self
                .transport
                .put(&check_path(remote.id), &params)
                .await
                .and_then(ApiResponse::into_success)
                .map(|_| ());
            if let Err(e) = &result {
                warn!(
                    host = %check.host,
                    check_id = remote.id,
                    error = %e,
                    "Failed to update existing Pingdom health check"
                );
            }
            attempts.push(UpdateAttempt {
                check_id: remote.id,
                result,
            });
        }
        CheckAction::Updated(attempts)
    }
}

fn trace_state(host: &str, state: CheckState) {
    debug!(host = %host, state = ?state, "Check state");
}
