use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::license::registry::LicenseRegistry;
use crate::models::{License, LicenseKind, LicenseOrigin, ValidationResult};

/// Render the outcome of validating `expression`.
pub fn render_validation(
    expression: &str,
    result: &ValidationResult,
    registry: &LicenseRegistry,
    quiet: bool,
) {
    if let Some(error) = &result.error {
        println!("{} {}", "✗ invalid:".red().bold(), error);
        return;
    }

    if quiet {
        if result.unknown_tokens.is_empty() {
            println!("{}", "✓ valid".green());
        } else {
            println!(
                "{} unknown: {}",
                "⚠ valid".yellow(),
                result.unknown_tokens.join(", ")
            );
        }
        return;
    }

    println!("\n {} {}", "Expression:".bold(), expression);
    if let Some(normalized) = &result.normalized {
        if normalized != expression.trim() {
            println!(" {} {}", "Normalized:".bold(), normalized);
        }
    }
    println!();

    if result.unknown_tokens.is_empty() {
        println!(" {} all licenses are registered", "✓".green());
        return;
    }

    println!(
        " {} {} unknown license token(s):\n",
        "[WARN]".yellow().bold(),
        result.unknown_tokens.len()
    );
    for token in &result.unknown_tokens {
        match registry.suggest(token.trim_end_matches('+')) {
            Some(hint) => println!(
                "   {} {}  (did you mean {}?)",
                "⚠".yellow(),
                token,
                hint.id.green()
            ),
            None => println!("   {} {}", "⚠".yellow(), token),
        }
    }
    println!();
}

/// Render registry entries as a table, followed by a one-line summary.
pub fn render_licenses(licenses: &[&License], quiet: bool) {
    let spdx = licenses
        .iter()
        .filter(|l| l.origin == LicenseOrigin::Spdx)
        .count();
    let custom = licenses.len() - spdx;

    if !quiet {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("ID").add_attribute(Attribute::Bold),
                Cell::new("Name").add_attribute(Attribute::Bold),
                Cell::new("Origin").add_attribute(Attribute::Bold),
                Cell::new("Kind").add_attribute(Attribute::Bold),
            ]);

        for license in licenses {
            let origin_color = match license.origin {
                LicenseOrigin::Spdx => Color::Cyan,
                LicenseOrigin::Custom => Color::Magenta,
            };
            let kind = match (license.kind, license.deprecated) {
                (LicenseKind::License, true) => "license (deprecated)".to_string(),
                (kind, _) => kind.to_string(),
            };
            let id_cell = if license.deprecated {
                Cell::new(&license.id).fg(Color::DarkGrey)
            } else {
                Cell::new(&license.id)
            };

            table.add_row(vec![
                id_cell,
                Cell::new(&license.name),
                Cell::new(license.origin.to_string()).fg(origin_color),
                Cell::new(kind),
            ]);
        }

        println!("{}", table);
    }

    println!(
        "Total: {}  SPDX: {}  Custom: {}",
        licenses.len(),
        spdx.to_string().cyan(),
        custom.to_string().magenta(),
    );
}
