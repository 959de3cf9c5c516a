use std::time::Duration;

use serde::Serialize;

pub mod backend;
pub mod config_file;
pub mod dates;
pub mod fields;
pub mod matching;
pub mod pipeline;
pub mod registry;
pub mod report;

// Re-export for convenience
pub use backend::{PlainTextRenderer, RenderError, TextRenderer};
pub use fields::{DocumentFields, extract_fields};
pub use pipeline::{Pipeline, Resolutions};
pub use registry::{HttpResponse, RegistryError, ReqwestTransport, Transport};
pub use report::Report;

pub const DEFAULT_ORCID_URL: &str = "https://pub.orcid.org/v3.0/expanded-search/";
pub const DEFAULT_ROR_URL: &str = "https://api.ror.org/organizations";
pub const DEFAULT_CROSSREF_URL: &str = "https://api.crossref.org";
pub const DEFAULT_OPENALEX_URL: &str = "https://api.openalex.org";

/// Token-sort score (0-100) a Crossref funder name must exceed to count as a match.
pub const DEFAULT_FUNDER_THRESHOLD: f64 = 95.0;

/// Where a researcher identifier came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentitySource {
    /// Printed next to the creator name in the document.
    Inline,
    /// First hit of an ORCID expanded search.
    RegistrySearch,
    #[default]
    Unresolved,
}

/// Outcome of resolving the plan creator's ORCID iD.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdentityMatch {
    pub orcid_id: Option<String>,
    pub source: IdentitySource,
}

impl IdentityMatch {
    pub fn inline(orcid_id: impl Into<String>) -> Self {
        Self {
            orcid_id: Some(orcid_id.into()),
            source: IdentitySource::Inline,
        }
    }

    pub fn searched(orcid_id: impl Into<String>) -> Self {
        Self {
            orcid_id: Some(orcid_id.into()),
            source: IdentitySource::RegistrySearch,
        }
    }

    pub fn unresolved() -> Self {
        Self::default()
    }
}

/// Identifiers found for the funder name.
///
/// `funder_registry_id` comes from the Crossref funder registry and
/// `funder_id_from_ror` from the FundRef cross-reference on the chosen ROR
/// record. The two paths are independent and are reported side by side even
/// when they disagree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrganizationMatch {
    pub ror_id: Option<String>,
    pub funder_registry_id: Option<String>,
    pub funder_id_from_ror: Option<String>,
}

/// Works indexed by Crossref under an award number.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AwardWorks {
    pub dois: Vec<String>,
    pub funder_ids: Vec<String>,
}

/// Configuration for registry lookups.
#[derive(Clone)]
pub struct Config {
    pub orcid_url: String,
    pub ror_url: String,
    pub crossref_url: String,
    pub openalex_url: String,
    /// Contact address for the Crossref and OpenAlex polite pools.
    pub crossref_mailto: Option<String>,
    pub openalex_key: Option<String>,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    pub funder_match_threshold: f64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("orcid_url", &self.orcid_url)
            .field("ror_url", &self.ror_url)
            .field("crossref_url", &self.crossref_url)
            .field("openalex_url", &self.openalex_url)
            .field(
                "crossref_mailto",
                &self.crossref_mailto.as_ref().map(|_| "***"),
            )
            .field("openalex_key", &self.openalex_key.as_ref().map(|_| "***"))
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("funder_match_threshold", &self.funder_match_threshold)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            orcid_url: DEFAULT_ORCID_URL.to_string(),
            ror_url: DEFAULT_ROR_URL.to_string(),
            crossref_url: DEFAULT_CROSSREF_URL.to_string(),
            openalex_url: DEFAULT_OPENALEX_URL.to_string(),
            crossref_mailto: None,
            openalex_key: None,
            http_timeout_secs: 30,
            user_agent: format!("pidify/{}", env!("CARGO_PKG_VERSION")),
            funder_match_threshold: DEFAULT_FUNDER_THRESHOLD,
        }
    }
}

impl Config {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// User-Agent header, carrying the polite-pool contact when one is configured.
    pub fn user_agent_header(&self) -> String {
        match self.crossref_mailto {
            Some(ref email) => format!("{} (mailto:{})", self.user_agent, email),
            None => self.user_agent.clone(),
        }
    }
}
