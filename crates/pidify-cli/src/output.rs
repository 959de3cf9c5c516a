use std::io::Write;
use std::path::Path;

use pidify_core::Report;

/// Writer for the report: the `--output` file if given, else stdout.
pub fn open_writer(output: Option<&Path>) -> std::io::Result<Box<dyn Write>> {
    Ok(match output {
        Some(path) => Box::new(std::fs::File::create(path)?),
        None => Box::new(std::io::stdout()),
    })
}

/// Write the report as two-space indented JSON followed by a newline.
pub fn write_report(w: &mut dyn Write, report: &Report) -> anyhow::Result<()> {
    let json = report.to_json_pretty()?;
    writeln!(w, "{}", json)?;
    w.flush()?;
    Ok(())
}

/// One stderr line per lookup, for `-v` runs.
pub fn print_resolution_summary(w: &mut dyn Write, report: &Report) -> std::io::Result<()> {
    let m = &report.matches;
    let mark = |found: bool| if found { "resolved" } else { "unresolved" };

    writeln!(w, "creator ORCID:      {}", mark(m.creator_orcid.orcid.is_some()))?;
    writeln!(w, "affiliation ROR:    {}", mark(m.affiliation.ror_id.is_some()))?;
    writeln!(w, "funder registry id: {}", mark(m.funder_name.funder_id.is_some()))?;
    writeln!(w, "funder ROR:         {}", mark(m.funder_name.ror_id.is_some()))?;
    match m.funding_opportunity_number.crossref_award_works {
        Some(ref works) => writeln!(w, "award works:        {}", works.dois.len())?,
        None => writeln!(w, "award works:        skipped")?,
    }
    match m.author_works.dois {
        Some(ref dois) => writeln!(w, "author works:       {}", dois.len())?,
        None => writeln!(w, "author works:       unresolved")?,
    }
    Ok(())
}
