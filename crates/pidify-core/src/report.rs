//! The consolidated JSON report.
//!
//! The schema is fixed: every key is always present and anything that was not
//! extracted or resolved serializes as `null`.

use serde::Serialize;

use crate::dates::to_iso;
use crate::fields::DocumentFields;
use crate::pipeline::Resolutions;
use crate::AwardWorks;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub inputs: Inputs,
    pub matches: Matches,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inputs {
    pub dmp_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub last_modified: Option<String>,
    pub affiliation: Option<String>,
    pub funder_name: Option<String>,
    pub funding_opportunity_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Matches {
    pub dmp_id: DmpIdMatch,
    pub creator_orcid: CreatorOrcidMatch,
    pub affiliation: AffiliationMatch,
    pub funder_name: FunderNameMatch,
    pub funding_opportunity_number: AwardMatch,
    pub author_works: AuthorWorksMatch,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DmpIdMatch {
    pub input: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatorOrcidMatch {
    /// `[creator, affiliation]`
    pub input: (Option<String>, Option<String>),
    pub orcid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AffiliationMatch {
    pub input: Option<String>,
    pub ror_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunderNameMatch {
    pub input: Option<String>,
    pub funder_id: Option<String>,
    pub ror_id: Option<String>,
    pub funder_id_from_ror: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AwardMatch {
    pub input: Option<String>,
    pub crossref_award_works: Option<AwardWorks>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorWorksMatch {
    pub inputs: AuthorWorksInputs,
    pub dois: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorWorksInputs {
    pub orcid_id: Option<String>,
    pub start_date: Option<String>,
}

impl Report {
    /// Arrange extracted fields and lookup results into the report schema.
    pub fn compile(fields: &DocumentFields, resolved: &Resolutions) -> Self {
        let start_date = fields.start_date.as_ref().map(to_iso);
        let orcid = resolved.identity.orcid_id.clone();

        Report {
            inputs: Inputs {
                dmp_id: fields.dmp_id.clone(),
                start_date: start_date.clone(),
                end_date: fields.end_date.as_ref().map(to_iso),
                last_modified: fields.last_modified.as_ref().map(to_iso),
                affiliation: fields.affiliation.clone(),
                funder_name: fields.funder_name.clone(),
                funding_opportunity_number: fields.funding_opportunity_number.clone(),
            },
            matches: Matches {
                dmp_id: DmpIdMatch {
                    input: fields.dmp_id.clone(),
                },
                creator_orcid: CreatorOrcidMatch {
                    input: (fields.creator_name.clone(), fields.affiliation.clone()),
                    orcid: orcid.clone(),
                },
                affiliation: AffiliationMatch {
                    input: fields.affiliation.clone(),
                    ror_id: resolved.affiliation_ror_id.clone(),
                },
                funder_name: FunderNameMatch {
                    input: fields.funder_name.clone(),
                    funder_id: resolved.funder.funder_registry_id.clone(),
                    ror_id: resolved.funder.ror_id.clone(),
                    funder_id_from_ror: resolved.funder.funder_id_from_ror.clone(),
                },
                funding_opportunity_number: AwardMatch {
                    input: fields.funding_opportunity_number.clone(),
                    crossref_award_works: resolved.award_works.clone(),
                },
                author_works: AuthorWorksMatch {
                    inputs: AuthorWorksInputs {
                        orcid_id: orcid,
                        start_date,
                    },
                    dois: resolved.author_works.clone(),
                },
            },
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
