//! OpenAlex works by author since a given year.

use serde_json::Value;

use super::{RegistryError, Transport, fetch_json};
use crate::Config;

pub fn works_url(
    base: &str,
    orcid_id: &str,
    start_year: i32,
    api_key: Option<&str>,
    mailto: Option<&str>,
) -> String {
    let mut url = format!(
        "{}/works?filter=authorships.author.orcid:{},publication_year:{}-",
        base,
        urlencoding::encode(orcid_id),
        start_year
    );
    if let Some(key) = api_key {
        url.push_str(&format!("&api_key={}", urlencoding::encode(key)));
    }
    if let Some(email) = mailto {
        url.push_str(&format!("&mailto={}", urlencoding::encode(email)));
    }
    url
}

/// DOIs of the returned works, in response order. Works without a DOI are dropped.
pub fn parse_work_dois(data: &Value) -> Result<Vec<String>, RegistryError> {
    let results = data["results"]
        .as_array()
        .ok_or_else(|| RegistryError::Parse("missing results array".into()))?;
    Ok(results
        .iter()
        .filter_map(|work| work["doi"].as_str())
        .filter(|doi| !doi.is_empty())
        .map(String::from)
        .collect())
}

/// Works by `orcid_id` published in `start_year` or later. Failures are
/// logged and reported as `None`.
pub async fn search_author_works(
    transport: &dyn Transport,
    config: &Config,
    orcid_id: &str,
    start_year: i32,
) -> Option<Vec<String>> {
    let url = works_url(
        &config.openalex_url,
        orcid_id,
        start_year,
        config.openalex_key.as_deref(),
        config.crossref_mailto.as_deref(),
    );
    match fetch_json(transport, &url)
        .await
        .and_then(|data| parse_work_dois(&data))
    {
        Ok(dois) => {
            tracing::debug!(orcid_id, start_year, works = dois.len(), "author works lookup complete");
            Some(dois)
        }
        Err(e) => {
            tracing::warn!(registry = "OpenAlex", orcid_id, start_year, error = %e, "author works lookup failed");
            None
        }
    }
}
