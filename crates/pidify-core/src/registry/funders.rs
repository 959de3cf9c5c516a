//! Crossref funder registry lookup.

use serde_json::Value;

use super::{RegistryError, Transport, fetch_json};
use crate::Config;
use crate::matching::funder_names_match;

pub fn search_url(base: &str, funder_name: &str, mailto: Option<&str>) -> String {
    let mut url = format!("{}/funders?query={}", base, urlencoding::encode(funder_name));
    if let Some(email) = mailto {
        url.push_str(&format!("&mailto={}", urlencoding::encode(email)));
    }
    url
}

/// Pick the funder id matching `funder_name` from registry candidates.
///
/// Candidates are examined in response order. A candidate matches when its
/// name scores above `threshold`, or failing that when `funder_name` appears
/// verbatim among its alternate names. The first match wins.
pub fn match_funder(items: &[Value], funder_name: &str, threshold: f64) -> Option<String> {
    items.iter().find_map(|item| {
        let name = item["name"].as_str().unwrap_or("");
        let matched = funder_names_match(funder_name, name, threshold)
            || item["alt-names"]
                .as_array()
                .is_some_and(|alts| alts.iter().any(|alt| alt.as_str() == Some(funder_name)));
        if matched {
            item["id"].as_str().map(String::from)
        } else {
            None
        }
    })
}

/// Funder registry id for `funder_name`. Failures are logged and reported
/// as `None`.
pub async fn search_funder_registry(
    transport: &dyn Transport,
    config: &Config,
    funder_name: &str,
) -> Option<String> {
    let url = search_url(
        &config.crossref_url,
        funder_name,
        config.crossref_mailto.as_deref(),
    );
    let result = fetch_json(transport, &url).await.and_then(|data| {
        data["message"]["items"]
            .as_array()
            .map(|items| match_funder(items, funder_name, config.funder_match_threshold))
            .ok_or_else(|| RegistryError::Parse("missing message.items".into()))
    });
    match result {
        Ok(found) => {
            tracing::debug!(funder_name, funder_id = ?found, "funder registry search complete");
            found
        }
        Err(e) => {
            tracing::warn!(registry = "Crossref funders", query = funder_name, error = %e, "funder registry search failed");
            None
        }
    }
}
