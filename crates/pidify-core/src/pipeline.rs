use std::sync::Arc;

use chrono::Datelike;

use crate::fields::{DocumentFields, extract_fields};
use crate::registry::{RegistryError, ReqwestTransport, Transport, crossref, funders, openalex, orcid, ror};
use crate::report::Report;
use crate::{AwardWorks, Config, IdentityMatch, OrganizationMatch};

/// Results of every registry lookup for one plan.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Resolutions {
    pub identity: IdentityMatch,
    pub affiliation_ror_id: Option<String>,
    pub funder: OrganizationMatch,
    /// `None` when the plan has no funding opportunity number.
    pub award_works: Option<AwardWorks>,
    /// `None` when the lookup was skipped or failed.
    pub author_works: Option<Vec<String>>,
}

/// Extraction followed by identifier resolution against the registries.
pub struct Pipeline {
    config: Config,
    transport: Arc<dyn Transport>,
}

impl Pipeline {
    pub fn new(config: Config, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    /// Pipeline talking to the live registries over HTTP.
    pub fn with_reqwest(config: Config) -> Result<Self, RegistryError> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    /// Extract fields from rendered plan text, resolve them and compile the report.
    pub async fn run(&self, text: &str) -> Report {
        let fields = extract_fields(text);
        tracing::info!(
            dmp_id = ?fields.dmp_id,
            creator = ?fields.creator_name,
            inline_orcid = fields.has_inline_orcid,
            "extracted plan fields"
        );
        let resolved = self.resolve(&fields).await;
        tracing::info!(
            orcid = ?resolved.identity.orcid_id,
            orcid_source = ?resolved.identity.source,
            affiliation_ror = ?resolved.affiliation_ror_id,
            funder_ror = ?resolved.funder.ror_id,
            "registry lookups complete"
        );
        Report::compile(&fields, &resolved)
    }

    /// Run every lookup the extracted fields allow.
    ///
    /// The branches are independent and run concurrently; a failure in one
    /// never cancels or short-circuits another. Lookups whose input field is
    /// missing are skipped.
    pub async fn resolve(&self, fields: &DocumentFields) -> Resolutions {
        let ((identity, author_works), affiliation_ror_id, funder_org, funder_registry_id, award_works) = tokio::join!(
            self.identity_and_works(fields),
            self.affiliation_ror(fields),
            self.funder_ror(fields),
            self.funder_registry(fields),
            self.award_works(fields),
        );

        Resolutions {
            identity,
            affiliation_ror_id,
            funder: OrganizationMatch {
                ror_id: funder_org.ror_id,
                funder_registry_id,
                funder_id_from_ror: funder_org.funder_id,
            },
            award_works,
            author_works,
        }
    }

    async fn identity_and_works(
        &self,
        fields: &DocumentFields,
    ) -> (IdentityMatch, Option<Vec<String>>) {
        let transport = self.transport.as_ref();
        let identity = orcid::resolve_identity(transport, &self.config, fields).await;
        let works = match (identity.orcid_id.as_deref(), fields.start_date) {
            (Some(orcid_id), Some(start)) => {
                openalex::search_author_works(transport, &self.config, orcid_id, start.year())
                    .await
            }
            _ => {
                tracing::debug!("no ORCID iD or start date, skipping author works lookup");
                None
            }
        };
        (identity, works)
    }

    async fn affiliation_ror(&self, fields: &DocumentFields) -> Option<String> {
        let affiliation = fields.affiliation.as_deref()?;
        ror::resolve_affiliation(self.transport.as_ref(), &self.config, affiliation).await
    }

    async fn funder_ror(&self, fields: &DocumentFields) -> ror::FunderOrganization {
        match fields.funder_name.as_deref() {
            Some(name) => {
                ror::resolve_funder_organization(self.transport.as_ref(), &self.config, name).await
            }
            None => ror::FunderOrganization::default(),
        }
    }

    async fn funder_registry(&self, fields: &DocumentFields) -> Option<String> {
        let name = fields.funder_name.as_deref()?;
        funders::search_funder_registry(self.transport.as_ref(), &self.config, name).await
    }

    async fn award_works(&self, fields: &DocumentFields) -> Option<AwardWorks> {
        let award = fields.funding_opportunity_number.as_deref()?;
        Some(crossref::get_award_works(self.transport.as_ref(), &self.config, award).await)
    }
}
