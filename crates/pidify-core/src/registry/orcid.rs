//! ORCID expanded search: resolve a creator name and affiliation to an ORCID iD.

use quick_xml::Reader;
use quick_xml::events::Event;

use super::{RegistryError, Transport, fetch_text};
use crate::fields::DocumentFields;
use crate::{Config, IdentityMatch};

const RESULT_FIELDS: &str = "orcid,given-names,family-name,current-institution-affiliation-name,past-institution-affiliation-name";

/// Solr query combining the name and affiliation as conjunctive terms.
pub fn build_query(name: &str, affiliation: Option<&str>) -> String {
    let name_clause = format!("given-and-family-names:\"{}\"", escape_phrase(name));
    match affiliation {
        Some(org) => format!(
            "{} AND affiliation-org-name:\"{}\"",
            name_clause,
            escape_phrase(org)
        ),
        None => name_clause,
    }
}

fn escape_phrase(phrase: &str) -> String {
    phrase.replace('\\', "\\\\").replace('"', "\\\"")
}

pub fn search_url(base: &str, name: &str, affiliation: Option<&str>) -> String {
    format!(
        "{}?q={}&fl={}",
        base,
        urlencoding::encode(&build_query(name, affiliation)),
        urlencoding::encode(RESULT_FIELDS)
    )
}

/// Parse an expanded-search XML response into the first listed ORCID iD.
///
/// `num-found="0"` yields `Ok(None)`. Ranking is left to the registry; only
/// the first result is considered.
pub fn parse_expanded_search(xml: &str) -> Result<Option<String>, RegistryError> {
    let mut reader = Reader::from_str(xml);

    let mut num_found: Option<String> = None;
    let mut in_orcid_id = false;
    let mut current_id = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                match e.local_name().as_ref() {
                    b"expanded-search" => {
                        for attr in e.attributes().flatten() {
                            if attr.key.local_name().as_ref() == b"num-found" {
                                num_found = Some(String::from_utf8_lossy(&attr.value).to_string());
                            }
                        }
                    }
                    b"orcid-id" => {
                        in_orcid_id = true;
                        current_id.clear();
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) if in_orcid_id => {
                let text = e.unescape().unwrap_or_default();
                current_id.push_str(&text);
            }
            Ok(Event::End(ref e)) => {
                if e.local_name().as_ref() == b"orcid-id" {
                    in_orcid_id = false;
                    let id = current_id.trim();
                    if !id.is_empty() && num_found.as_deref() != Some("0") {
                        return Ok(Some(id.to_string()));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(RegistryError::Parse(format!("XML parse error: {}", e))),
            _ => {}
        }
    }

    match num_found {
        Some(_) => Ok(None),
        None => Err(RegistryError::Parse(
            "missing expanded-search element".into(),
        )),
    }
}

/// Search ORCID for `name` at `affiliation`. Failures are logged and
/// reported as `None`.
pub async fn search_orcid(
    transport: &dyn Transport,
    config: &Config,
    name: &str,
    affiliation: Option<&str>,
) -> Option<String> {
    let url = search_url(&config.orcid_url, name, affiliation);
    let result = match fetch_text(transport, &url).await {
        Ok(body) => parse_expanded_search(&body),
        Err(e) => Err(e),
    };
    match result {
        Ok(found) => {
            tracing::debug!(name, affiliation, orcid = ?found, "ORCID search complete");
            found
        }
        Err(e) => {
            tracing::warn!(registry = "ORCID", name, affiliation, error = %e, "ORCID search failed");
            None
        }
    }
}

/// Resolve the plan creator's ORCID iD.
///
/// An iD printed on the creator line is used as-is without touching the
/// network. Otherwise the registry is searched by name and affiliation; with
/// no creator name there is nothing to search for.
pub async fn resolve_identity(
    transport: &dyn Transport,
    config: &Config,
    fields: &DocumentFields,
) -> IdentityMatch {
    if let Some(ref orcid) = fields.inline_orcid {
        return IdentityMatch::inline(orcid.clone());
    }
    let Some(ref name) = fields.creator_name else {
        tracing::debug!("no creator name, skipping ORCID search");
        return IdentityMatch::unresolved();
    };
    match search_orcid(transport, config, name, fields.affiliation.as_deref()).await {
        Some(orcid) => IdentityMatch::searched(orcid),
        None => IdentityMatch::unresolved(),
    }
}
