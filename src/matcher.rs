//! Finds the remote checks a declared check corresponds to.
//!
//! Identity is host plus tags. The query host is lower-cased, the remote `host`/`hostname`
//! values are compared verbatim. Tag matching counts hits, so a remote check carrying the same
//! tag name twice scores two hits for one requested tag and no longer matches.

use tracing::debug;

use crate::directory::RemoteCheckDirectory;
use crate::error::Result;
use crate::pingdom::{CheckTransport, RemoteCheck, RemoteCheckDetail};

pub async fn find_matches<T>(
    directory: &mut RemoteCheckDirectory<T>,
    host: &str,
    tags: &[String],
) -> Result<Vec<RemoteCheck>>
where
    T: CheckTransport + ?Sized,
{
    let host = host.to_lowercase();

    let candidates = host_candidates(directory.list_checks(false).await?, &host);
    if candidates.is_empty() || tags.is_empty() {
        debug!(host = %host, candidates = candidates.len(), "Host candidates without tag filter");
        return Ok(candidates);
    }

    let mut matches = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let detail = directory.get_check_detail(candidate.id).await?;
        if has_all_tags(&detail, tags) {
            matches.push(candidate);
        }
    }
    debug!(host = %host, matches = matches.len(), "Tag-filtered matches");
    Ok(matches)
}

/// A check is listed once per matching field, so one whose `host` and `hostname` both match
/// appears twice.
fn host_candidates(checks: &[RemoteCheck], host: &str) -> Vec<RemoteCheck> {
    let mut found = Vec::new();
    for check in checks {
        if check.host.as_deref() == Some(host) {
            found.push(check.clone());
        }
        if check.hostname.as_deref() == Some(host) {
            found.push(check.clone());
        }
    }
    found
}

fn has_all_tags(detail: &RemoteCheckDetail, tags: &[String]) -> bool {
    let Some(remote_tags) = &detail.tags else {
        return false;
    };
    tag_hits(remote_tags.iter().map(|t| t.name.as_str()), tags) == tags.len()
}

fn tag_hits<'a>(remote: impl Iterator<Item = &'a str>, requested: &[String]) -> usize {
    remote
        .map(|name| requested.iter().filter(|wanted| *wanted == name).count())
        .sum()
}
