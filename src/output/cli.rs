use super::Catalog;
use crate::model::{Component, HintSeverity};
use anyhow::Result;
use std::collections::HashMap;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Component")]
    id: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Bundle")]
    bundle: String,
    #[tabled(rename = "GCID")]
    gcid: String,
}

#[derive(Tabled)]
struct HintRow {
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Component")]
    cid: String,
    #[tabled(rename = "Tag")]
    tag: String,
}

pub fn print_cli_table(catalog: &Catalog) -> Result<()> {
    println!();
    println!(
        "Composed at: {}",
        catalog.generated.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();

    let rows: Vec<ComponentRow> = catalog
        .units
        .iter()
        .flat_map(|unit| {
            let name = unit_name(unit.report.bundle_id.as_deref(), &unit.source);
            unit.report.components.iter().map(move |cpt| ComponentRow {
                unit: truncate(&name, 30),
                id: truncate(cpt.id(), 45),
                kind: cpt.kind().to_string(),
                bundle: format_bundle(cpt),
                gcid: truncate(cpt.data_id().unwrap_or("-"), 60),
            })
        })
        .collect();

    if rows.is_empty() {
        println!("No components found.");
    } else {
        println!("Found {} components:", rows.len());
        println!();
        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{}", table);
    }

    let mut hint_rows: Vec<(HintSeverity, HintRow)> = catalog
        .units
        .iter()
        .flat_map(|unit| {
            let name = unit_name(unit.report.bundle_id.as_deref(), &unit.source);
            unit.report.hints.iter().flat_map(move |(cid, hints)| {
                let name = name.clone();
                hints.iter().map(move |hint| {
                    (
                        hint.severity,
                        HintRow {
                            severity: format_severity(&hint.severity),
                            unit: truncate(&name, 30),
                            cid: truncate(cid, 45),
                            tag: hint.tag.clone(),
                        },
                    )
                })
            })
        })
        .collect();

    if !hint_rows.is_empty() {
        // stable sort keeps the order hints were raised in
        hint_rows.sort_by_key(|(severity, _)| match severity {
            HintSeverity::Error => 0,
            HintSeverity::Warning => 1,
            HintSeverity::Info => 2,
            HintSeverity::Pedantic => 3,
        });

        println!();
        println!("Found {} hints:", hint_rows.len());
        println!();
        let rows: Vec<HintRow> = hint_rows.into_iter().map(|(_, row)| row).collect();
        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{}", table);
    }

    if !catalog.failed_units.is_empty() {
        println!();
        println!("Failed to load {} units:", catalog.failed_units.len());
        for failed in &catalog.failed_units {
            println!("  {}: {}", failed.source, failed.error);
        }
    }

    println!();
    print_summary(catalog);

    Ok(())
}

fn unit_name(bundle_id: Option<&str>, source: &str) -> String {
    bundle_id.unwrap_or(source).to_string()
}

fn format_bundle(cpt: &Component) -> String {
    if !cpt.pkgnames().is_empty() {
        return format!("pkg:{}", cpt.pkgnames().join(","));
    }
    let bundles: Vec<String> = cpt
        .bundles()
        .iter()
        .map(|b| format!("{}:{}", b.kind, b.id.as_deref().unwrap_or("?")))
        .collect();
    if bundles.is_empty() {
        "-".to_string()
    } else {
        bundles.join(", ")
    }
}

fn format_severity(severity: &HintSeverity) -> String {
    match severity {
        HintSeverity::Error => "\x1b[31mERROR\x1b[0m".to_string(),
        HintSeverity::Warning => "\x1b[33mWARNING\x1b[0m".to_string(),
        HintSeverity::Info => "\x1b[32mINFO\x1b[0m".to_string(),
        HintSeverity::Pedantic => "PEDANTIC".to_string(),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

fn print_summary(catalog: &Catalog) {
    let mut by_severity: HashMap<HintSeverity, usize> = HashMap::new();
    for unit in &catalog.units {
        for hint in unit.report.hints.values().flatten() {
            *by_severity.entry(hint.severity).or_default() += 1;
        }
    }
    let count = |s: HintSeverity| by_severity.get(&s).copied().unwrap_or(0);

    println!("Summary:");
    println!("  Units with results: {}", catalog.units.len());
    if !catalog.ignored_units.is_empty() {
        println!("  Ignored units: {}", catalog.ignored_units.len());
    }
    println!("  Components: {}", catalog.components_count());
    if catalog.hints_count() > 0 {
        println!(
            "  Hints: {} errors, {} warnings, {} info, {} pedantic",
            count(HintSeverity::Error),
            count(HintSeverity::Warning),
            count(HintSeverity::Info),
            count(HintSeverity::Pedantic)
        );
    }
}
