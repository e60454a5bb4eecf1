//! Raw tracker list lines to a deduplicated candidate set.

use std::collections::BTreeSet;

use url::{Host, Url};

use crate::tracker::Scheme;

/// Normalizes one line of a tracker list, or `None` when it is not a usable
/// tracker URL.
///
/// Blank lines, `#` comments, unknown schemes and IPv6 literal hosts are
/// skipped. A trailing `/` is stripped, and HTTP(S) trackers without an
/// `/announce` path get one appended. WebSocket URLs are otherwise kept as
/// written.
pub fn normalize_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (raw_scheme, rest) = line.split_once("://")?;
    let scheme = Scheme::from_url_scheme(&raw_scheme.to_ascii_lowercase())?;

    let url = Url::parse(line).ok()?;
    if matches!(url.host(), None | Some(Host::Ipv6(_))) {
        return None;
    }

    let mut normalized = format!("{}://{}", scheme.as_str(), rest);
    while normalized.ends_with('/') {
        normalized.pop();
    }

    let needs_announce = matches!(scheme, Scheme::Http | Scheme::Https)
        && !url.path().contains("/announce")
        && url.query().is_none()
        && url.fragment().is_none();
    if needs_announce {
        normalized.push_str("/announce");
    }

    Some(normalized)
}

/// Normalizes and deduplicates every line; the result is sorted.
pub fn collect_candidates<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|line| normalize_line(line.as_ref()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
