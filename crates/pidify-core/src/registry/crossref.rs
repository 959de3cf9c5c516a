//! Crossref works filtered by award number.

use serde_json::Value;

use super::{RegistryError, Transport, fetch_json};
use crate::{AwardWorks, Config};

pub fn award_url(base: &str, award_number: &str, mailto: Option<&str>) -> String {
    let mut url = format!(
        "{}/works?filter=award.number:{}",
        base,
        urlencoding::encode(award_number)
    );
    if let Some(email) = mailto {
        url.push_str(&format!("&mailto={}", urlencoding::encode(email)));
    }
    url
}

/// Collect work DOIs and funder DOIs from a works response.
///
/// Both sequences keep response order. Funder ids are flattened work by work
/// and are not deduplicated. Works or funders without a `DOI` are skipped.
pub fn parse_award_works(data: &Value) -> Result<AwardWorks, RegistryError> {
    let items = data["message"]["items"]
        .as_array()
        .ok_or_else(|| RegistryError::Parse("missing message.items".into()))?;

    let mut works = AwardWorks::default();
    for item in items {
        if let Some(doi) = item["DOI"].as_str() {
            works.dois.push(doi.to_string());
        }
        if let Some(funders) = item["funder"].as_array() {
            works.funder_ids.extend(
                funders
                    .iter()
                    .filter_map(|f| f["DOI"].as_str().map(String::from)),
            );
        }
    }
    Ok(works)
}

/// Works funded under `award_number`. A failed lookup yields empty sequences.
pub async fn get_award_works(
    transport: &dyn Transport,
    config: &Config,
    award_number: &str,
) -> AwardWorks {
    let url = award_url(
        &config.crossref_url,
        award_number,
        config.crossref_mailto.as_deref(),
    );
    match fetch_json(transport, &url)
        .await
        .and_then(|data| parse_award_works(&data))
    {
        Ok(works) => {
            tracing::debug!(award_number, works = works.dois.len(), "award lookup complete");
            works
        }
        Err(e) => {
            tracing::warn!(registry = "Crossref works", query = award_number, error = %e, "award lookup failed");
            AwardWorks::default()
        }
    }
}
