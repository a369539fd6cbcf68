//! Table rendering for command reports.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use hs_correlate::{Confidence, Conversion, FallbackLevel};
use hs_standards::{DoctorReport, VersionSummary};
use hs_validate::{ErrorKind, ValidationResult, WarningKind};

use crate::commands::{EntryList, LookupReport, SearchReport, ValidateReport};

pub fn validation_table(report: &ValidateReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Input"),
        header_cell("Code"),
        header_cell("Level"),
        header_cell("Status"),
        header_cell("Findings"),
    ]);
    apply_table_style(&mut table);
    for result in &report.results {
        table.add_row(vec![
            Cell::new(&result.input),
            optional_cell(result.code.as_ref().map(|code| code.digits())),
            optional_cell(result.code.as_ref().map(|code| code.level().as_str())),
            status_cell(result),
            findings_cell(result),
        ]);
    }
    table
}

/// One-line batch outcome printed under the validation table.
pub fn validation_footer(report: &ValidateReport) -> String {
    let summary = &report.summary;
    format!(
        "{} checked, {} valid, {} invalid, {} with warnings",
        summary.total, summary.valid, summary.invalid, summary.with_warnings
    )
}

pub fn lookup_table(report: &LookupReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Field"), header_cell("Value")]);
    apply_table_style(&mut table);
    table.add_row(vec![dim_cell("Version"), Cell::new(&report.version)]);
    if let Some(jurisdiction) = &report.jurisdiction {
        table.add_row(vec![dim_cell("Jurisdiction"), Cell::new(jurisdiction)]);
    }
    table.add_row(vec![
        dim_cell("Code"),
        Cell::new(&report.entry.code).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![dim_cell("Level"), Cell::new(report.entry.level)]);
    table.add_row(vec![
        dim_cell("Description"),
        Cell::new(&report.entry.description),
    ]);
    if let Some(section) = &report.section {
        table.add_row(vec![
            dim_cell("Section"),
            Cell::new(format!("{} {}", section.id, section.title)),
        ]);
    }
    for ancestor in &report.ancestors {
        table.add_row(vec![
            dim_cell(ancestor.level.as_str()),
            Cell::new(format!("{} {}", ancestor.code, ancestor.description)),
        ]);
    }
    for note in &report.entry.notes {
        table.add_row(vec![dim_cell("Note"), Cell::new(note)]);
    }
    table
}

pub fn entries_table(list: &EntryList) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Code"),
        header_cell("Level"),
        header_cell("Description"),
    ]);
    apply_table_style(&mut table);
    for entry in &list.entries {
        table.add_row(vec![
            Cell::new(&entry.code),
            Cell::new(entry.level),
            Cell::new(&entry.description),
        ]);
    }
    table
}

pub fn conversion_table(conversions: &[Conversion]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("From"),
        header_cell("To"),
        header_cell("Target"),
        header_cell("Confidence"),
        header_cell("Alternatives"),
        header_cell("Notes"),
    ]);
    apply_table_style(&mut table);
    for conversion in conversions {
        let alternatives = conversion
            .alternatives
            .iter()
            .map(|alt| format!("{} ({:.2})", alt.code, alt.weight))
            .collect::<Vec<_>>();
        table.add_row(vec![
            Cell::new(&conversion.source),
            Cell::new(&conversion.from),
            Cell::new(&conversion.to),
            optional_cell(conversion.target.as_deref()),
            confidence_cell(conversion.confidence),
            list_cell(&alternatives),
            list_cell(&conversion_notes(conversion)),
        ]);
    }
    table
}

pub fn search_table(report: &SearchReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Code"),
        header_cell("Level"),
        header_cell("Description"),
        header_cell("Score"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for hit in &report.hits {
        table.add_row(vec![
            Cell::new(&hit.code),
            Cell::new(hit.level),
            Cell::new(&hit.description),
            Cell::new(format!("{:.3}", hit.score)),
        ]);
    }
    table
}

pub fn versions_table(versions: &[VersionSummary]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Version"),
        header_cell("Label"),
        header_cell("Effective"),
        header_cell("Chapters"),
        header_cell("Headings"),
        header_cell("Subheadings"),
        header_cell("National"),
    ]);
    apply_table_style(&mut table);
    for column in 3..=5 {
        align_column(&mut table, column, CellAlignment::Right);
    }
    for version in versions {
        let id = if version.pinned {
            Cell::new(format!("{} *", version.id)).add_attribute(Attribute::Bold)
        } else {
            Cell::new(&version.id)
        };
        let effective = match version.effective_to {
            Some(end) => format!("{} to {end}", version.effective_from),
            None => format!("from {}", version.effective_from),
        };
        let national = version
            .jurisdictions
            .iter()
            .map(|(jurisdiction, lines)| format!("{jurisdiction} ({lines})"))
            .collect::<Vec<_>>();
        table.add_row(vec![
            id,
            optional_cell(version.label.as_deref()),
            Cell::new(effective),
            Cell::new(version.stats.chapters),
            Cell::new(version.stats.headings),
            Cell::new(version.stats.subheadings),
            list_cell(&national),
        ]);
    }
    table
}

pub fn doctor_table(report: &DoctorReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Path"),
        header_cell("Role"),
        header_cell("Scope"),
        header_cell("SHA-256"),
    ]);
    apply_table_style(&mut table);
    for file in &report.files {
        let scope = match (&file.version, &file.jurisdiction, &file.from, &file.to) {
            (_, _, Some(from), Some(to)) => format!("{from} -> {to}"),
            (Some(version), Some(jurisdiction), _, _) => format!("{version} / {jurisdiction}"),
            (Some(version), None, _, _) => version.to_string(),
            _ => "-".to_string(),
        };
        table.add_row(vec![
            Cell::new(&file.path),
            Cell::new(file.role.as_str()),
            Cell::new(scope),
            dim_cell(&file.sha256[..file.sha256.len().min(12)]),
        ]);
    }
    table
}

/// Counts line printed under the doctor table.
pub fn doctor_footer(report: &DoctorReport) -> String {
    let counts = &report.counts;
    format!(
        "{} files verified: {} versions, {} jurisdictions, {} subheadings, {} correlation tables",
        counts.files,
        counts.versions,
        counts.jurisdictions,
        counts.subheadings,
        counts.correlation_tables
    )
}

fn conversion_notes(conversion: &Conversion) -> Vec<String> {
    let mut notes = Vec::new();
    match conversion.fallback {
        Some(FallbackLevel::Subheading) => notes.push("matched at subheading".to_string()),
        Some(FallbackLevel::Heading) => notes.push("matched at heading".to_string()),
        None => {}
    }
    if !conversion.merged_with.is_empty() {
        notes.push(format!("merged with {}", conversion.merged_with.join(", ")));
    }
    if !conversion.via.is_empty() {
        let via = conversion
            .via
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        notes.push(format!("via {}", via.join(", ")));
    }
    notes
}

/// Status text for one verdict.
pub fn status_label(result: &ValidationResult) -> &'static str {
    match (result.valid, result.has_warnings()) {
        (false, _) => "invalid",
        (true, true) => "valid (warnings)",
        (true, false) => "valid",
    }
}

fn status_cell(result: &ValidationResult) -> Cell {
    let color = match (result.valid, result.has_warnings()) {
        (false, _) => Color::Red,
        (true, true) => Color::Yellow,
        (true, false) => Color::Green,
    };
    Cell::new(status_label(result)).fg(color)
}

fn findings_cell(result: &ValidationResult) -> Cell {
    let findings = result
        .errors
        .iter()
        .map(ErrorKind::description)
        .chain(result.warnings.iter().map(WarningKind::description))
        .map(str::to_string)
        .collect::<Vec<_>>();
    list_cell(&findings)
}

fn confidence_cell(confidence: Confidence) -> Cell {
    let color = match confidence {
        Confidence::Exact => Color::Green,
        Confidence::Probable => Color::Cyan,
        Confidence::Uncertain | Confidence::Split | Confidence::Merge => Color::Yellow,
        Confidence::NotFound => Color::Red,
    };
    Cell::new(confidence.as_str()).fg(color)
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn optional_cell(value: Option<&str>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn list_cell(values: &[String]) -> Cell {
    if values.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(values.join("\n"))
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).add_attribute(Attribute::Dim)
}
