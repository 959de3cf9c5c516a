//! Labelled-field extraction from rendered plan text.
//!
//! Each field is described by a row in [`FIELD_RULES`]: the literal label
//! printed in the export and the grammar of the value that follows it. Rules
//! are independent; a rule that does not match leaves its field empty and
//! never affects the others.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::dates::normalize_date;

/// Fields printed in a DMPTool plan export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    DmpId,
    StartDate,
    EndDate,
    LastModified,
    Creator,
    Affiliation,
    Funder,
    FundingOpportunityNumber,
}

/// Shape of the value following a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueGrammar {
    /// A `doi.org` URL, up to the next whitespace.
    DoiUrl,
    /// Free text up to the end of the line.
    Line,
    /// Free text up to an opening parenthesis. May wrap across lines.
    UntilParen,
}

impl ValueGrammar {
    fn pattern(self) -> &'static str {
        match self {
            ValueGrammar::DoiUrl => r"https?://doi\.org/[^\s]+",
            ValueGrammar::Line => r"[^\n]+",
            ValueGrammar::UntilParen => r"[^(]+",
        }
    }
}

pub struct FieldRule {
    pub field: Field,
    pub label: &'static str,
    pub grammar: ValueGrammar,
}

pub static FIELD_RULES: &[FieldRule] = &[
    FieldRule {
        field: Field::DmpId,
        label: "DMP ID",
        grammar: ValueGrammar::DoiUrl,
    },
    FieldRule {
        field: Field::StartDate,
        label: "Start date",
        grammar: ValueGrammar::Line,
    },
    FieldRule {
        field: Field::EndDate,
        label: "End date",
        grammar: ValueGrammar::Line,
    },
    FieldRule {
        field: Field::LastModified,
        label: "Last modified",
        grammar: ValueGrammar::Line,
    },
    FieldRule {
        field: Field::Creator,
        label: "Creator",
        grammar: ValueGrammar::Line,
    },
    FieldRule {
        field: Field::Affiliation,
        label: "Affiliation",
        grammar: ValueGrammar::UntilParen,
    },
    FieldRule {
        field: Field::Funder,
        label: "Funder",
        grammar: ValueGrammar::UntilParen,
    },
    FieldRule {
        field: Field::FundingOpportunityNumber,
        label: "Funding opportunity number",
        grammar: ValueGrammar::Line,
    },
];

static COMPILED_RULES: Lazy<Vec<(Field, ValueGrammar, Regex)>> = Lazy::new(|| {
    FIELD_RULES
        .iter()
        .map(|rule| {
            let pattern = format!(
                r"{}:\s+({})",
                regex::escape(rule.label),
                rule.grammar.pattern()
            );
            (rule.field, rule.grammar, Regex::new(&pattern).unwrap())
        })
        .collect()
});

/// Lexical shape of an ORCID iD in a currently allocated block. This is a
/// plausibility filter, not a checksum check.
static ORCID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b0000-000(?:1-[5-9]|2-[0-9]|3-[0-4])\d{3}-\d{3}[\dX]\b").unwrap()
});

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Everything the extractor could read from one plan.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentFields {
    pub dmp_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub last_modified: Option<NaiveDate>,
    pub creator_name: Option<String>,
    /// The creator line mentions an ORCID.
    pub has_inline_orcid: bool,
    /// The first iD matching [`find_orcid`] from the creator line's ORCID
    /// label onward. It may sit on a following line when the export wraps.
    pub inline_orcid: Option<String>,
    pub affiliation: Option<String>,
    pub funder_name: Option<String>,
    pub funding_opportunity_number: Option<String>,
}

/// Parsed `Creator:` line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreatorLine {
    pub name: Option<String>,
    pub has_inline_orcid: bool,
}

/// Raw value of the first occurrence of `field` in `text`.
pub fn extract_field(text: &str, field: Field) -> Option<String> {
    let (_, grammar, re) = COMPILED_RULES.iter().find(|(f, _, _)| *f == field)?;
    let value = re.captures(text)?.get(1)?.as_str();
    let value = match grammar {
        ValueGrammar::UntilParen => WHITESPACE_RE.replace_all(value.trim(), " ").into_owned(),
        ValueGrammar::DoiUrl | ValueGrammar::Line => value.trim().to_string(),
    };
    (!value.is_empty()).then_some(value)
}

/// Split a creator line into the name and whether it mentions an ORCID.
///
/// `"Jane Doe - ORCID: 0000-0002-1111-234X"` yields the name `Jane Doe`.
pub fn parse_creator(line: &str) -> CreatorLine {
    let (name, has_inline_orcid) = match line.find("ORCID") {
        Some(idx) => (line[..idx].trim_end().trim_end_matches('-').trim(), true),
        None => (line.trim(), false),
    };
    CreatorLine {
        name: (!name.is_empty()).then(|| name.to_string()),
        has_inline_orcid,
    }
}

/// First plausible ORCID iD in `text`, as a whole token.
pub fn find_orcid(text: &str) -> Option<String> {
    ORCID_RE.find(text).map(|m| m.as_str().to_string())
}

/// The iD printed after the creator line's ORCID label, searching on past
/// the end of the line.
fn inline_orcid(text: &str) -> Option<String> {
    let (_, _, re) = COMPILED_RULES.iter().find(|(f, _, _)| *f == Field::Creator)?;
    let value = re.captures(text)?.get(1)?;
    let label = value.as_str().find("ORCID")?;
    find_orcid(&text[value.start() + label..])
}

/// Apply every rule in [`FIELD_RULES`] to `text`.
pub fn extract_fields(text: &str) -> DocumentFields {
    let date = |field| extract_field(text, field).and_then(|raw| normalize_date(&raw));
    let creator = extract_field(text, Field::Creator)
        .map(|line| parse_creator(&line))
        .unwrap_or_default();

    DocumentFields {
        dmp_id: extract_field(text, Field::DmpId),
        start_date: date(Field::StartDate),
        end_date: date(Field::EndDate),
        last_modified: date(Field::LastModified),
        creator_name: creator.name,
        has_inline_orcid: creator.has_inline_orcid,
        inline_orcid: if creator.has_inline_orcid {
            inline_orcid(text)
        } else {
            None
        },
        affiliation: extract_field(text, Field::Affiliation),
        funder_name: extract_field(text, Field::Funder),
        funding_opportunity_number: extract_field(text, Field::FundingOpportunityNumber),
    }
}
