//! ROR affiliation matching.
//!
//! The `affiliation` endpoint returns candidate organizations, at most one of
//! them flagged `chosen`. That flag is trusted as-is; nothing is re-ranked
//! locally.

use serde_json::Value;

use super::{RegistryError, Transport, fetch_json};
use crate::Config;

pub fn search_url(base: &str, query: &str) -> String {
    format!("{}?affiliation={}", base, urlencoding::encode(query))
}

/// The first candidate flagged `chosen`, in response order.
pub fn chosen_candidate(data: &Value) -> Result<Option<&Value>, RegistryError> {
    let items = data["items"]
        .as_array()
        .ok_or_else(|| RegistryError::Parse("missing items array".into()))?;
    Ok(items
        .iter()
        .find(|item| item["chosen"].as_bool() == Some(true)))
}

fn organization_id(candidate: &Value) -> Option<String> {
    candidate["organization"]["id"].as_str().map(String::from)
}

/// Funder registry id cross-referenced by a ROR organization record.
///
/// The `preferred` id wins. Without one, a single entry in `all` is used;
/// zero or several entries are ambiguous and yield `None`.
pub fn fundref_id(organization: &Value) -> Option<String> {
    let fundref = &organization["external_ids"]["FundRef"];
    if let Some(preferred) = fundref["preferred"].as_str().filter(|s| !s.is_empty()) {
        return Some(preferred.to_string());
    }
    match fundref["all"].as_array().map(Vec::as_slice) {
        Some([only]) => only.as_str().map(String::from),
        _ => None,
    }
}

/// Organization id and FundRef cross-reference found for a funder name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FunderOrganization {
    pub ror_id: Option<String>,
    pub funder_id: Option<String>,
}

async fn search_chosen(
    transport: &dyn Transport,
    config: &Config,
    query: &str,
) -> Result<Option<Value>, RegistryError> {
    let data = fetch_json(transport, &search_url(&config.ror_url, query)).await?;
    Ok(chosen_candidate(&data)?.cloned())
}

/// ROR id of the organization chosen for an affiliation string.
pub async fn resolve_affiliation(
    transport: &dyn Transport,
    config: &Config,
    affiliation: &str,
) -> Option<String> {
    match search_chosen(transport, config, affiliation).await {
        Ok(chosen) => chosen.as_ref().and_then(organization_id),
        Err(e) => {
            tracing::warn!(registry = "ROR", query = affiliation, error = %e, "ROR affiliation lookup failed");
            None
        }
    }
}

/// ROR id and FundRef id of the organization chosen for a funder name.
pub async fn resolve_funder_organization(
    transport: &dyn Transport,
    config: &Config,
    funder_name: &str,
) -> FunderOrganization {
    match search_chosen(transport, config, funder_name).await {
        Ok(Some(chosen)) => {
            let organization = &chosen["organization"];
            FunderOrganization {
                ror_id: organization_id(&chosen),
                funder_id: fundref_id(organization),
            }
        }
        Ok(None) => FunderOrganization::default(),
        Err(e) => {
            tracing::warn!(registry = "ROR", query = funder_name, error = %e, "ROR funder lookup failed");
            FunderOrganization::default()
        }
    }
}
