//! Read-through view of the checks that currently exist in Pingdom.

use std::sync::Arc;
use tracing::{debug, info};

use crate::error::Result;
use crate::pingdom::{
    CheckDetailEnvelope, CheckListEnvelope, CheckTransport, RemoteCheck, RemoteCheckDetail,
    check_path, checks_path,
};

/// Caches the full check list after the first successful fetch. Detail records are always
/// fetched fresh.
pub struct RemoteCheckDirectory<T: CheckTransport + ?Sized> {
    transport: Arc<T>,
    cached: Option<Vec<RemoteCheck>>,
}

impl<T: CheckTransport + ?Sized> RemoteCheckDirectory<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            cached: None,
        }
    }

    /// Returns every remote check, fetching `GET /checks` only when nothing is cached or
    /// `force_refresh` is set. A failed listing is returned as an error and leaves the cache as
    /// it was.
    pub async fn list_checks(&mut self, force_refresh: bool) -> Result<&[RemoteCheck]> {
        if force_refresh || self.cached.is_none() {
            let body = self.transport.get(checks_path()).await?.into_success()?;
            let envelope: CheckListEnvelope = serde_json::from_str(&body)?;
            info!(count = envelope.checks.len(), "Fetched remote check list");
            self.cached = Some(envelope.checks);
        }
        Ok(self.cached.as_deref().unwrap_or_default())
    }

    /// Fetches `GET /checks/{id}`, which is the only place Pingdom reports a check's tags.
    pub async fn get_check_detail(&self, id: u64) -> Result<RemoteCheckDetail> {
        debug!(check_id = id, "Fetching remote check detail");
        let body = self.transport.get(&check_path(id)).await?.into_success()?;
        let envelope: CheckDetailEnvelope = serde_json::from_str(&body)?;
        Ok(envelope.check)
    }

    /// Drops the cached list; the next [`list_checks`](Self::list_checks) refetches.
    pub fn refresh(&mut self) {
        self.cached = None;
    }

    pub fn is_cached(&self) -> bool {
        self.cached.is_some()
    }
}
