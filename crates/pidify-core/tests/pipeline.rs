//! End-to-end pipeline runs against canned registry responses.

use std::sync::Arc;

use pidify_core::registry::mock::MockTransport;
use pidify_core::{Config, IdentitySource, Pipeline, RegistryError, extract_fields};
use serde_json::{Value, json};

const ORCID: &str = "https://pub.orcid.org/v3.0/expanded-search/?q=";
const ROR: &str = "https://api.ror.org/organizations?affiliation=";
const FUNDERS: &str = "https://api.crossref.org/funders?query=";
const AWARDS: &str = "https://api.crossref.org/works?filter=award.number:";
const OPENALEX: &str = "https://api.openalex.org/works?filter=";

const PLAN: &str = "\
Soil Microbiome Survey
DMP ID: https://doi.org/10.48321/D1AB2C
Creator: Jane Doe
Affiliation: University of Oxford (ox.ac.uk)
Funder: Wellcome Trust (wellcome.org)
Funding opportunity number: WT-2024-1
Start date: 2024-03-01
End date: 2026-02-28
Last modified: 01/15/2024
";

fn orcid_hit(orcid: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<expanded-search:expanded-search num-found="1" xmlns:expanded-search="http://www.orcid.org/ns/expanded-search">
    <expanded-search:expanded-result>
        <expanded-search:orcid-id>{orcid}</expanded-search:orcid-id>
    </expanded-search:expanded-result>
</expanded-search:expanded-search>"#
    )
}

fn ror_items(items: Value) -> Value {
    let count = items.as_array().map_or(0, Vec::len);
    json!({"number_of_results": count, "items": items})
}

fn happy_transport() -> MockTransport {
    MockTransport::new()
        .with_body(ORCID, 200, orcid_hit("0000-0002-1825-0097"))
        .with_json(
            &format!("{ROR}University%20of%20Oxford"),
            &ror_items(json!([
                {"chosen": true, "score": 1.0, "organization": {"id": "https://ror.org/052gg0110"}}
            ])),
        )
        .with_json(
            &format!("{ROR}Wellcome%20Trust"),
            &ror_items(json!([
                {"chosen": true, "score": 1.0, "organization": {
                    "id": "https://ror.org/029chgv08",
                    "external_ids": {"FundRef": {"preferred": "100010269", "all": ["100010269", "100004440"]}}
                }}
            ])),
        )
        .with_json(
            FUNDERS,
            &json!({"message": {"items": [
                {"id": "100004440", "name": "Wellcome Trust", "alt-names": ["Wellcome"]}
            ]}}),
        )
        .with_json(
            AWARDS,
            &json!({"message": {"items": [
                {"DOI": "10.1/a", "funder": [{"DOI": "10.13039/100004440"}]},
                {"DOI": "10.1/b", "funder": [{"DOI": "10.13039/100004440"}, {"DOI": "10.13039/501100000780"}]}
            ]}}),
        )
        .with_json(
            OPENALEX,
            &json!({"results": [
                {"id": "https://openalex.org/W1", "doi": "https://doi.org/10.1/c"},
                {"id": "https://openalex.org/W2", "doi": null}
            ]}),
        )
}

async fn run(transport: &Arc<MockTransport>, text: &str) -> Value {
    let pipeline = Pipeline::new(Config::default(), transport.clone());
    serde_json::to_value(pipeline.run(text).await).unwrap()
}

#[tokio::test]
async fn full_plan_resolves_every_identifier() {
    let transport = Arc::new(happy_transport());
    let report = run(&transport, PLAN).await;

    assert_eq!(report["inputs"]["start_date"], "2024-03-01");
    assert_eq!(report["inputs"]["end_date"], "2026-02-28");
    assert_eq!(report["inputs"]["last_modified"], "2024-01-15");

    let m = &report["matches"];
    assert_eq!(m["dmp_id"]["input"], "https://doi.org/10.48321/D1AB2C");
    assert_eq!(m["creator_orcid"]["input"], json!(["Jane Doe", "University of Oxford"]));
    assert_eq!(m["creator_orcid"]["orcid"], "0000-0002-1825-0097");
    assert_eq!(m["affiliation"]["ror_id"], "https://ror.org/052gg0110");
    assert_eq!(m["funder_name"]["funder_id"], "100004440");
    assert_eq!(m["funder_name"]["ror_id"], "https://ror.org/029chgv08");
    assert_eq!(m["funder_name"]["funder_id_from_ror"], "100010269");
    assert_eq!(
        m["funding_opportunity_number"]["crossref_award_works"],
        json!({
            "dois": ["10.1/a", "10.1/b"],
            "funder_ids": ["10.13039/100004440", "10.13039/100004440", "10.13039/501100000780"]
        })
    );
    assert_eq!(
        m["author_works"],
        json!({
            "inputs": {"orcid_id": "0000-0002-1825-0097", "start_date": "2024-03-01"},
            "dois": ["https://doi.org/10.1/c"]
        })
    );

    assert_eq!(transport.call_count(), 6);
    assert_eq!(transport.calls_to(ORCID), 1);
    assert_eq!(transport.calls_to(ROR), 2);
    let works_call = transport
        .calls()
        .into_iter()
        .find(|url| url.starts_with(OPENALEX))
        .unwrap();
    assert!(works_call.contains("authorships.author.orcid:0000-0002-1825-0097,publication_year:2024-"));
}

#[tokio::test]
async fn dmp_id_only_leaves_every_match_null() {
    let transport = Arc::new(MockTransport::new());
    let report = run(&transport, "DMP ID: https://doi.org/10.1/xyz").await;

    let m = &report["matches"];
    assert_eq!(m["dmp_id"]["input"], "https://doi.org/10.1/xyz");
    assert_eq!(m["creator_orcid"], json!({"input": [null, null], "orcid": null}));
    assert_eq!(m["affiliation"], json!({"input": null, "ror_id": null}));
    assert_eq!(
        m["funder_name"],
        json!({"input": null, "funder_id": null, "ror_id": null, "funder_id_from_ror": null})
    );
    assert_eq!(
        m["funding_opportunity_number"],
        json!({"input": null, "crossref_award_works": null})
    );
    assert_eq!(
        m["author_works"],
        json!({"inputs": {"orcid_id": null, "start_date": null}, "dois": null})
    );
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn inline_orcid_skips_identity_search() {
    let transport = Arc::new(MockTransport::new());
    let text = "Creator: Jane Doe - ORCID: 0000-0002-1111-234X\n";
    let report = run(&transport, text).await;

    assert_eq!(report["matches"]["creator_orcid"]["orcid"], "0000-0002-1111-234X");
    assert_eq!(report["matches"]["creator_orcid"]["input"], json!(["Jane Doe", null]));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn inline_orcid_feeds_author_works() {
    let transport = Arc::new(MockTransport::new().with_json(
        OPENALEX,
        &json!({"results": [{"doi": "https://doi.org/10.1/d"}]}),
    ));
    let text = "Creator: Jane Doe - ORCID: 0000-0002-1111-234X\nStart date: March 1, 2023\n";
    let report = run(&transport, text).await;

    assert_eq!(report["matches"]["author_works"]["dois"], json!(["https://doi.org/10.1/d"]));
    assert_eq!(transport.calls_to(ORCID), 0);
    assert_eq!(transport.calls_to(OPENALEX), 1);
    assert!(transport.calls()[0].contains("0000-0002-1111-234X,publication_year:2023-"));
}

#[tokio::test]
async fn implausible_inline_orcid_falls_back_to_search() {
    let transport =
        Arc::new(MockTransport::new().with_body(ORCID, 200, orcid_hit("0000-0002-1825-0097")));
    let text = "Creator: Jane Doe - ORCID: 0000-0009-0000-0000\n";
    let report = run(&transport, text).await;

    assert_eq!(report["matches"]["creator_orcid"]["orcid"], "0000-0002-1825-0097");
    assert_eq!(transport.calls_to(ORCID), 1);
}

#[tokio::test]
async fn affiliation_uses_the_chosen_candidate() {
    let transport = Arc::new(MockTransport::new().with_json(
        ROR,
        &ror_items(json!([
            {"chosen": false, "score": 0.8, "organization": {"id": "https://ror.org/first"}},
            {"chosen": true, "score": 0.9, "organization": {"id": "https://ror.org/second"}},
            {"chosen": false, "score": 0.95, "organization": {"id": "https://ror.org/third"}}
        ])),
    ));
    let report = run(&transport, "Affiliation: Some University (some.edu)\n").await;

    assert_eq!(report["matches"]["affiliation"]["ror_id"], "https://ror.org/second");
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn ambiguous_fundref_alternatives_are_null() {
    let transport = Arc::new(
        MockTransport::new()
            .with_json(
                ROR,
                &ror_items(json!([
                    {"chosen": true, "organization": {
                        "id": "https://ror.org/021nxhr62",
                        "external_ids": {"FundRef": {"preferred": null, "all": ["100000001", "100006445"]}}
                    }}
                ])),
            )
            .with_json(FUNDERS, &json!({"message": {"items": []}})),
    );
    let report = run(&transport, "Funder: National Science Foundation (nsf.gov)\n").await;

    let funder = &report["matches"]["funder_name"];
    assert_eq!(funder["ror_id"], "https://ror.org/021nxhr62");
    assert_eq!(funder["funder_id_from_ror"], Value::Null);
    assert_eq!(funder["funder_id"], Value::Null);
}

#[tokio::test]
async fn single_fundref_alternative_is_used() {
    let transport = Arc::new(
        MockTransport::new()
            .with_json(
                ROR,
                &ror_items(json!([
                    {"chosen": true, "organization": {
                        "id": "https://ror.org/021nxhr62",
                        "external_ids": {"FundRef": {"preferred": null, "all": ["100000001"]}}
                    }}
                ])),
            )
            .with_json(
                FUNDERS,
                &json!({"message": {"items": [
                    {"id": "100000001", "name": "National Science Foundation", "alt-names": ["NSF"]}
                ]}}),
            ),
    );
    let report = run(&transport, "Funder: NSF (nsf.gov)\n").await;

    let funder = &report["matches"]["funder_name"];
    assert_eq!(funder["funder_id_from_ror"], "100000001");
    // Name scores low; the exact alternate name still matches.
    assert_eq!(funder["funder_id"], "100000001");
}

#[tokio::test]
async fn failed_branches_do_not_affect_the_others() {
    let transport = Arc::new(
        happy_transport()
            .with_body(ORCID, 503, "Service Unavailable")
            .with_body(AWARDS, 200, "<html>not json</html>")
            .with_error(
                &format!("{ROR}Wellcome%20Trust"),
                RegistryError::Http("connection reset".into()),
            ),
    );
    let report = run(&transport, PLAN).await;
    let m = &report["matches"];

    assert_eq!(m["creator_orcid"]["orcid"], Value::Null);
    assert_eq!(m["author_works"]["dois"], Value::Null);
    assert_eq!(
        m["funding_opportunity_number"]["crossref_award_works"],
        json!({"dois": [], "funder_ids": []})
    );
    assert_eq!(m["funder_name"]["ror_id"], Value::Null);
    assert_eq!(m["funder_name"]["funder_id_from_ror"], Value::Null);

    assert_eq!(m["affiliation"]["ror_id"], "https://ror.org/052gg0110");
    assert_eq!(m["funder_name"]["funder_id"], "100004440");
    assert_eq!(transport.calls_to(OPENALEX), 0);
}

#[tokio::test]
async fn author_works_needs_a_start_date() {
    let transport = Arc::new(happy_transport());
    let text = "Creator: Jane Doe\nAffiliation: University of Oxford (ox.ac.uk)\nStart date: TBD\n";
    let report = run(&transport, text).await;

    assert_eq!(report["matches"]["creator_orcid"]["orcid"], "0000-0002-1825-0097");
    assert_eq!(report["matches"]["author_works"]["dois"], Value::Null);
    assert_eq!(report["inputs"]["start_date"], Value::Null);
    assert_eq!(transport.calls_to(OPENALEX), 0);
}

#[tokio::test]
async fn orcid_search_with_no_hits_is_null() {
    let transport = Arc::new(MockTransport::new().with_body(
        ORCID,
        200,
        r#"<expanded-search:expanded-search num-found="0" xmlns:expanded-search="http://www.orcid.org/ns/expanded-search"/>"#,
    ));
    let report = run(&transport, "Creator: Nobody Known\nStart date: 2024-01-01\n").await;

    assert_eq!(report["matches"]["creator_orcid"]["orcid"], Value::Null);
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn orcid_wrapped_onto_next_line_is_used_verbatim() {
    let transport = Arc::new(MockTransport::new());
    let text = "Creator: Jane Doe - ORCID:\n0000-0002-1111-234X\nAffiliation: Univ (u.edu)\n";
    let pipeline = Pipeline::new(Config::default(), transport.clone());
    let resolved = pipeline.resolve(&extract_fields(text)).await;

    assert_eq!(resolved.identity.orcid_id.as_deref(), Some("0000-0002-1111-234X"));
    assert_eq!(resolved.identity.source, IdentitySource::Inline);
    assert_eq!(transport.calls_to(ORCID), 0);
}

#[tokio::test]
async fn identity_source_reflects_the_search() {
    let transport = Arc::new(happy_transport());
    let pipeline = Pipeline::new(Config::default(), transport.clone());

    let searched = pipeline.resolve(&extract_fields(PLAN)).await;
    assert_eq!(searched.identity.source, IdentitySource::RegistrySearch);

    let unresolved = pipeline.resolve(&extract_fields("Funder: Wellcome Trust (w.org)\n")).await;
    assert_eq!(unresolved.identity.source, IdentitySource::Unresolved);
}

#[tokio::test]
async fn failed_funder_registry_and_affiliation_lookups_are_null() {
    let transport = Arc::new(
        happy_transport()
            .with_body(FUNDERS, 500, "Internal Server Error")
            .with_error(
                &format!("{ROR}University%20of%20Oxford"),
                RegistryError::Http("timed out".into()),
            ),
    );
    let report = run(&transport, PLAN).await;
    let m = &report["matches"];

    assert_eq!(m["funder_name"]["funder_id"], Value::Null);
    assert_eq!(m["affiliation"]["ror_id"], Value::Null);

    assert_eq!(m["creator_orcid"]["orcid"], "0000-0002-1825-0097");
    assert_eq!(m["funder_name"]["ror_id"], "https://ror.org/029chgv08");
    assert_eq!(m["funder_name"]["funder_id_from_ror"], "100010269");
    assert_eq!(
        m["funding_opportunity_number"]["crossref_award_works"]["dois"],
        json!(["10.1/a", "10.1/b"])
    );
    assert_eq!(m["author_works"]["dois"], json!(["https://doi.org/10.1/c"]));
}

#[tokio::test]
async fn malformed_funder_registry_responses_are_null() {
    for transport in [
        happy_transport().with_body(FUNDERS, 200, "<html>maintenance</html>"),
        happy_transport().with_json(FUNDERS, &json!({"status": "ok", "message": {}})),
        happy_transport().with_body(FUNDERS, 429, ""),
    ] {
        let transport = Arc::new(transport);
        let report = run(&transport, PLAN).await;
        assert_eq!(report["matches"]["funder_name"]["funder_id"], Value::Null);
        assert_eq!(report["matches"]["affiliation"]["ror_id"], "https://ror.org/052gg0110");
        assert_eq!(transport.calls_to(FUNDERS), 1);
    }
}
