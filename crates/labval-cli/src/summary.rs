use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use labval_model::{
    AlertSeverity, ClinicalReport, CorrectionPackage, ImplementationRisk, Priority, TestRegistry,
};

pub fn print_correction_package(package: &CorrectionPackage) {
    println!("Test: {}", package.test_id);
    println!(
        "Overall confidence: {:.2}  Risk: {:?}",
        package.overall_confidence, package.implementation_risk
    );

    if package.suggestions.is_empty() {
        println!("No correction suggestions.");
    } else {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Rank"),
            header_cell("Type"),
            header_cell("Suggested"),
            header_cell("Unit"),
            header_cell("Confidence"),
            header_cell("Priority"),
            header_cell("Risk"),
            header_cell("Auto"),
            header_cell("Justification"),
        ]);
        apply_wide_table_style(&mut table);
        align_column(&mut table, 0, CellAlignment::Right);
        align_column(&mut table, 2, CellAlignment::Right);
        align_column(&mut table, 4, CellAlignment::Right);
        align_column(&mut table, 7, CellAlignment::Center);
        for ranked in &package.suggestions {
            let suggestion = &ranked.suggestion;
            table.add_row(vec![
                Cell::new(ranked.rank),
                Cell::new(suggestion.kind.label()),
                Cell::new(suggestion.suggested_value),
                Cell::new(suggestion.suggested_unit.as_deref().unwrap_or("-")),
                confidence_cell(suggestion.confidence),
                priority_cell(suggestion.priority),
                risk_cell(suggestion.risk),
                auto_cell(suggestion.auto_apply_eligible),
                Cell::new(&suggestion.justification),
            ]);
        }
        println!("{table}");
    }

    for recommendation in &package.recommendations {
        println!("[{}] {}", recommendation.category, recommendation.message);
    }
    if !package.generator_faults.is_empty() {
        eprintln!("Generator faults:");
        for fault in &package.generator_faults {
            eprintln!("- {}: {}", fault.generator, fault.message);
        }
    }
}

pub fn print_clinical_report(report: &ClinicalReport) {
    println!(
        "Overall: {}",
        if report.overall_valid { "VALID" } else { "INVALID" }
    );
    println!(
        "Risk: {:?} (score {})",
        report.risk.level, report.risk.score
    );

    if !report.correlations.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Rule"),
            header_cell("Valid"),
            header_cell("Expected"),
            header_cell("Actual"),
            header_cell("Interpretation"),
        ]);
        apply_table_style(&mut table);
        align_column(&mut table, 1, CellAlignment::Center);
        align_column(&mut table, 2, CellAlignment::Right);
        align_column(&mut table, 3, CellAlignment::Right);
        for finding in &report.correlations {
            table.add_row(vec![
                Cell::new(&finding.rule_id),
                valid_cell(finding.valid),
                optional_value_cell(finding.expected),
                optional_value_cell(finding.actual),
                Cell::new(&finding.interpretation),
            ]);
        }
        println!("{table}");
    }

    if !report.patterns.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Pattern"),
            header_cell("Classification"),
            header_cell("Diagnostic hits"),
            header_cell("Note"),
        ]);
        apply_table_style(&mut table);
        for finding in &report.patterns {
            table.add_row(vec![
                Cell::new(&finding.pattern_id),
                Cell::new(format!("{:?}", finding.classification)),
                Cell::new(finding.diagnostic_hits.join(", ")),
                Cell::new(finding.note.as_deref().unwrap_or("-")),
            ]);
        }
        println!("{table}");
    }

    if !report.panels.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Panel"),
            header_cell("Checked"),
            header_cell("Valid"),
            header_cell("Interpretation"),
        ]);
        apply_table_style(&mut table);
        align_column(&mut table, 1, CellAlignment::Center);
        align_column(&mut table, 2, CellAlignment::Center);
        for finding in &report.panels {
            table.add_row(vec![
                Cell::new(&finding.panel),
                Cell::new(if finding.checked { "yes" } else { "no" }),
                valid_cell(finding.valid),
                Cell::new(finding.interpretation.as_deref().unwrap_or("-")),
            ]);
        }
        println!("{table}");
    }

    for alert in &report.alerts {
        let tag = match alert.severity {
            AlertSeverity::Info => "INFO",
            AlertSeverity::Warning => "WARNING",
            AlertSeverity::Critical => "CRITICAL",
        };
        println!("[{tag}] {}: {}", alert.source, alert.message);
    }
    for recommendation in &report.recommendations {
        println!("- {recommendation}");
    }
    if !report.skipped.is_empty() {
        println!("Skipped:");
        for note in &report.skipped {
            println!("- {note}");
        }
    }
    println!("Actions: {}", report.risk.actions.join(", "));
}

pub fn print_registry(registry: &TestRegistry) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Test"),
        header_cell("Name"),
        header_cell("Primary unit"),
        header_cell("Alternatives"),
    ]);
    apply_table_style(&mut table);
    for def in registry.tests.values() {
        let alternatives: Vec<&str> = def
            .alternative_units
            .iter()
            .map(|alt| alt.unit.as_str())
            .collect();
        table.add_row(vec![
            Cell::new(&def.test_id),
            Cell::new(&def.name),
            Cell::new(&def.primary_unit),
            Cell::new(if alternatives.is_empty() {
                "-".to_string()
            } else {
                alternatives.join(", ")
            }),
        ]);
    }
    println!("{table}");
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_wide_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(165);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn confidence_cell(confidence: f64) -> Cell {
    let cell = Cell::new(format!("{confidence:.2}"));
    if confidence >= 0.8 {
        cell.fg(Color::Green)
    } else if confidence >= 0.5 {
        cell.fg(Color::Yellow)
    } else {
        cell.fg(Color::Red)
    }
}

fn priority_cell(priority: Priority) -> Cell {
    match priority {
        Priority::High => Cell::new("high").fg(Color::Green),
        Priority::Medium => Cell::new("medium").fg(Color::Yellow),
        Priority::Low => Cell::new("low"),
    }
}

fn risk_cell(risk: ImplementationRisk) -> Cell {
    match risk {
        ImplementationRisk::Low => Cell::new("low").fg(Color::Green),
        ImplementationRisk::Medium => Cell::new("medium").fg(Color::Yellow),
        ImplementationRisk::High => Cell::new("high").fg(Color::Red),
    }
}

fn auto_cell(eligible: bool) -> Cell {
    if eligible {
        Cell::new("✓").fg(Color::Green).add_attribute(Attribute::Bold)
    } else {
        Cell::new("-")
    }
}

fn valid_cell(valid: bool) -> Cell {
    if valid {
        Cell::new("✓").fg(Color::Green)
    } else {
        Cell::new("✗").fg(Color::Red).add_attribute(Attribute::Bold)
    }
}

fn optional_value_cell(value: Option<f64>) -> Cell {
    Cell::new(format_optional_value(value))
}

fn format_optional_value(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |value| format!("{value:.2}"))
}
