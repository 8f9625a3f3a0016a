//! Published spreadsheet ingestion.
//!
//! Rewrites a shared sheet link into its CSV export endpoint, fetches it and
//! hands the text to the normalizer. The caller owns cancellation: a fetch that
//! has been superseded by a newer upload should simply have its result dropped.

use crate::data::Table;
use crate::error::NormalizeError;
use crate::normalize::{normalize, Source};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

/// Rewrite a sheet link into a URL that returns CSV.
///
/// `.../edit...` becomes `.../export?format=csv&gid=<id>`, taking `<id>` from a
/// `gid=` parameter anywhere after `/edit` (query or fragment) and falling back
/// to the first tab, `0`. Other links get `format=csv` appended unless they
/// already ask for CSV output. A string that is not a URL is a
/// [`NormalizeError::Parse`].
pub fn export_url(raw: &str) -> Result<String, NormalizeError> {
    let raw = raw.trim();
    let parsed = Url::parse(raw)
        .map_err(|e| NormalizeError::parse(format!("invalid sheet URL '{raw}': {e}")))?;

    if let Some(pos) = raw.find("/edit") {
        let gid = sheet_gid(&raw[pos..]).unwrap_or("0");
        return Ok(format!("{}/export?format=csv&gid={}", &raw[..pos], gid));
    }

    let wants_csv = parsed
        .query_pairs()
        .any(|(k, v)| (k == "format" || k == "output") && v == "csv");
    if wants_csv {
        return Ok(raw.to_string());
    }

    let mut url = parsed;
    url.query_pairs_mut().append_pair("format", "csv");
    Ok(url.to_string())
}

/// Digits following the first `gid=` in `tail`.
fn sheet_gid(tail: &str) -> Option<&str> {
    let start = tail.find("gid=")? + "gid=".len();
    let rest = &tail[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    (end > 0).then(|| &rest[..end])
}

/// Fetch a published sheet and normalize it.
///
/// Non-success statuses and HTML responses (what a private sheet serves in
/// place of CSV) are reported as [`NormalizeError::Fetch`]; see
/// [`NormalizeError::hint`] for the message to show. No retries or timeouts
/// are applied here; configure them on the `client`.
pub async fn fetch_sheet(client: &Client, sheet_url: &str) -> Result<Table, NormalizeError> {
    let url = export_url(sheet_url)?;
    info!(%url, "fetching published sheet");

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| fetch_error(&url, None, e.to_string()))?;

    let status = response.status();
    debug!(%url, %status, "sheet response");
    if !status.is_success() {
        return Err(fetch_error(&url, Some(status.as_u16()), format!("HTTP {status}")));
    }

    let is_html = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"));
    if is_html {
        return Err(fetch_error(
            &url,
            Some(status.as_u16()),
            "received an HTML page instead of CSV".to_string(),
        ));
    }

    let text = response
        .text()
        .await
        .map_err(|e| fetch_error(&url, Some(status.as_u16()), e.to_string()))?;
    normalize(Source::Fetched(&text))
}

fn fetch_error(url: &str, status: Option<u16>, message: String) -> NormalizeError {
    NormalizeError::Fetch {
        url: url.to_string(),
        status,
        message,
    }
}
