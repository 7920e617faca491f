//! @ai:module:intent Format reports and models for different formats (JSON, text)
//! @ai:module:layer infrastructure
//! @ai:module:public_api OutputFormat, format_diagnostics, format_model, to_json
//! @ai:module:depends_on diagnostic, model
//! @ai:module:stateless true

use crate::diagnostic::{Diagnostic, Diagnostics, Severity};
use crate::model::{ApiModel, Member};
use colored::Colorize;
use serde::Serialize;

/// @ai:intent Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    JsonPretty,
}

/// @ai:intent Format any serializable value as JSON
/// @ai:effects pure
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> String {
    if pretty {
        serde_json::to_string_pretty(value).unwrap_or_default()
    } else {
        serde_json::to_string(value).unwrap_or_default()
    }
}

/// @ai:intent Format one comparison report as a string
/// @ai:effects pure
pub fn format_diagnostics(diagnostics: &Diagnostics, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(diagnostics, false),
        OutputFormat::JsonPretty => to_json(diagnostics, true),
        OutputFormat::Text => format_diagnostics_text(diagnostics),
    }
}

/// @ai:intent Format one finding as a single report line
/// @ai:effects pure
pub fn format_diagnostic_line(diagnostic: &Diagnostic) -> String {
    let severity = match diagnostic.severity {
        Severity::Error => "error".red().bold(),
        Severity::Warning => "warning".yellow().bold(),
    };

    format!(
        "{}: {}: {} {}",
        diagnostic.location.to_string().dimmed(),
        severity,
        diagnostic.message,
        format!("[{}]", diagnostic.issue).dimmed()
    )
}

/// @ai:intent Format a comparison report as human-readable text
/// @ai:effects pure
fn format_diagnostics_text(diagnostics: &Diagnostics) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Compatibility: {} -> {}\n\n",
        diagnostics.previous.bold(),
        diagnostics.current.bold()
    ));

    for diagnostic in diagnostics {
        output.push_str(&format_diagnostic_line(diagnostic));
        output.push('\n');
    }

    if !diagnostics.is_empty() {
        output.push('\n');
    }

    if diagnostics.errors() > 0 {
        output.push_str(&format!(
            "{} errors, {} warnings\n",
            diagnostics.errors().to_string().red().bold(),
            diagnostics.warnings().to_string().yellow()
        ));
    } else if diagnostics.warnings() > 0 {
        output.push_str(&format!(
            "{} {} warnings\n",
            "OK".green().bold(),
            diagnostics.warnings().to_string().yellow()
        ));
    } else {
        output.push_str(&format!("{} No compatibility issues found\n", "OK".green().bold()));
    }

    output
}

/// @ai:intent Format a parsed model as a string
/// @ai:effects pure
pub fn format_model(model: &ApiModel, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(model, false),
        OutputFormat::JsonPretty => to_json(model, true),
        OutputFormat::Text => format_model_text(model),
    }
}

/// @ai:intent Format a parsed model as a human-readable summary
/// @ai:effects pure
fn format_model_text(model: &ApiModel) -> String {
    let mut output = String::new();

    output.push_str(&format!("{} ({})\n", model.source.bold(), model.null_mode));
    output.push_str(&format!(
        "  {} packages, {} classes, {} members\n",
        model.packages.len(),
        model.class_count(),
        model.member_count()
    ));

    for package in model.packages.values() {
        output.push_str(&format!("\n  package {} (line {})\n", package.name.cyan(), package.line.0));

        for class in package.classes.values() {
            output.push_str(&format!(
                "    {} {} (line {})\n",
                class.kind.keyword(),
                class.name.cyan(),
                class.line.0
            ));

            for member in class.members.values() {
                let description = match member {
                    Member::Constructor(ctor) => format!("ctor {}", ctor.signature()),
                    Member::Method(method) => {
                        format!("method {} {}", method.return_type, method.signature())
                    }
                    Member::Field(field) if field.enum_constant => {
                        format!("enum_constant {}", field.name)
                    }
                    Member::Field(field) => format!("field {} {}", field.ty, field.name),
                };
                output.push_str(&format!("      {} (line {})\n", description, member.line()));
            }
        }
    }

    output
}
