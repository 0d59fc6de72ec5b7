use crate::checker::annotate::{covered_text, AnnotatedDocument, Marker, Segment};
use crate::stats::TextStats;
use crate::CheckReport;
use anyhow::{Context, Result};
use colored::*;
use dialoguer::theme::{ColorfulTheme, SimpleTheme};
use dialoguer::Select;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonIssue {
    offset: usize,
    length: usize,
    text: Option<String>,
    message: String,
    rule: Option<String>,
    replacements: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonReport {
    source: String,
    words: usize,
    characters: usize,
    truncated: bool,
    total_issues: usize,
    issues: Vec<JsonIssue>,
}

pub fn print_report(
    source: &str,
    report: &CheckReport,
    doc: &AnnotatedDocument,
    stats: TextStats,
    max_text_length: usize,
    colored_output: bool,
    format: &OutputFormat,
) {
    match format {
        OutputFormat::Text => {
            print_text_report(source, report, doc, stats, max_text_length, colored_output)
        }
        OutputFormat::Json => print_json_report(source, report, doc, stats),
    }
}

fn print_text_report(
    source: &str,
    report: &CheckReport,
    doc: &AnnotatedDocument,
    stats: TextStats,
    max_text_length: usize,
    colored_output: bool,
) {
    if colored_output {
        println!("\n{}", source.bold().underline());
    } else {
        println!("\n{}", source);
    }

    if report.truncated {
        print_truncation_notice(max_text_length, colored_output);
    }

    print_counters(stats, report.error_count, colored_output);

    if report.matches.is_empty() {
        return;
    }

    println!("\n{}", render_annotated(doc, colored_output));
    println!();

    for (i, marker) in doc.markers().enumerate() {
        let shown = display_text(marker);
        let number = format!("{}.", i + 1);

        if colored_output {
            println!(
                "  {} {} {}",
                number.blue().bold(),
                shown.red().bold(),
                marker.message
            );

            if !marker.replacements.is_empty() {
                let suggestions = marker
                    .replacements
                    .iter()
                    .map(|s| s.green().to_string())
                    .collect::<Vec<_>>()
                    .join(&", ".dimmed().to_string());
                println!("     {} {}", "→".dimmed(), suggestions);
            }
        } else {
            println!("  {} {} {}", number, shown, marker.message);

            if !marker.replacements.is_empty() {
                println!("     → {}", marker.replacements.join(", "));
            }
        }
    }

    if doc.dropped_count() > 0 {
        let note = format!(
            "{} overlapping or out-of-range {} not shown",
            doc.dropped_count(),
            if doc.dropped_count() == 1 {
                "match"
            } else {
                "matches"
            }
        );
        if colored_output {
            println!("  {}", note.dimmed());
        } else {
            println!("  {}", note);
        }
    }
}

fn print_json_report(source: &str, report: &CheckReport, doc: &AnnotatedDocument, stats: TextStats) {
    let text = doc.reconstruct();
    let issues: Vec<JsonIssue> = report
        .matches
        .iter()
        .map(|m| JsonIssue {
            offset: m.offset,
            length: m.length,
            text: covered_text(&text, m.offset, m.length).map(|s| s.to_string()),
            message: m.message.clone(),
            rule: m.rule_id.clone(),
            replacements: m.replacements.clone(),
        })
        .collect();

    let output = JsonReport {
        source: source.to_string(),
        words: stats.word_count,
        characters: stats.char_count,
        truncated: report.truncated,
        total_issues: report.error_count,
        issues,
    };

    println!("{}", serde_json::to_string_pretty(&output).unwrap());
}

/// The annotated document as one block of text, markers highlighted.
pub fn render_annotated(doc: &AnnotatedDocument, colored_output: bool) -> String {
    if !colored_output {
        return doc.to_markup();
    }

    let mut out = String::new();
    for segment in doc.segments() {
        match segment {
            Segment::Plain(text) => out.push_str(text),
            Segment::Marker(marker) => {
                if marker.text.is_empty() {
                    // A zero-width marker still needs something to point at.
                    out.push_str(&"·".red().bold().to_string());
                } else {
                    out.push_str(&marker.text.red().bold().underline().to_string());
                }
            }
        }
    }
    out
}

fn print_counters(stats: TextStats, error_count: usize, colored_output: bool) {
    let line = format!(
        "{} words · {} characters · {} {}",
        stats.word_count,
        stats.char_count,
        error_count,
        if error_count == 1 { "issue" } else { "issues" }
    );
    if colored_output {
        println!("{}", line.dimmed());
    } else {
        println!("{}", line);
    }
}

pub fn print_truncation_notice(max_text_length: usize, colored_output: bool) {
    let notice = format!("Only the first {} characters were checked", max_text_length);
    if colored_output {
        println!("{} {}", "⚠".yellow().bold(), notice.yellow());
    } else {
        println!("! {}", notice);
    }
}

pub fn print_check_summary(total_errors: usize, sources: usize, colored_output: bool) {
    println!();
    if total_errors == 0 {
        if colored_output {
            println!("{}", "✓ No issues found!".green().bold());
        } else {
            println!("✓ No issues found!");
        }
    } else {
        let issue_word = if total_errors == 1 { "issue" } else { "issues" };
        if colored_output {
            println!(
                "{} {} {} found in {} {}",
                "✗".red().bold(),
                total_errors.to_string().red().bold(),
                issue_word,
                sources,
                if sources == 1 { "source" } else { "sources" }
            );
        } else {
            println!(
                "✗ {} {} found in {} {}",
                total_errors,
                issue_word,
                sources,
                if sources == 1 { "source" } else { "sources" }
            );
        }
    }
}

pub fn print_fix_summary(total_fixed: usize, colored_output: bool) {
    println!();
    if total_fixed == 0 {
        if colored_output {
            println!("{}", "No corrections needed!".green().bold());
        } else {
            println!("No corrections needed!");
        }
    } else {
        let fix_word = if total_fixed == 1 {
            "correction"
        } else {
            "corrections"
        };
        if colored_output {
            println!(
                "{} {} {} applied",
                "✓".green().bold(),
                total_fixed.to_string().green().bold(),
                fix_word
            );
        } else {
            println!("✓ {} {} applied", total_fixed, fix_word);
        }
    }
}

/// Let the user pick one of the document's markers, or `None` for done.
pub fn prompt_marker(doc: &AnnotatedDocument, colored_output: bool) -> Result<Option<usize>> {
    let ids: Vec<usize> = doc.markers().map(|m| m.id).collect();

    let mut items: Vec<String> = doc
        .markers()
        .map(|m| format!("{} — {}", display_text(m), m.message))
        .collect();
    items.push("Done".to_string());

    let choice = select("Pick an issue to fix", &items, colored_output)?;
    Ok(ids.get(choice).copied())
}

/// Let the user pick one of a marker's candidates, or `None` to skip.
pub fn prompt_suggestion(marker: &Marker, colored_output: bool) -> Result<Option<usize>> {
    if marker.replacements.is_empty() {
        let note = "No suggestions for this issue.";
        if colored_output {
            println!("{}", note.yellow());
        } else {
            println!("{}", note);
        }
        return Ok(None);
    }

    let mut items = marker.replacements.clone();
    items.push("Skip".to_string());

    let prompt = format!("Replace \"{}\" with", display_text(marker));
    let choice = select(&prompt, &items, colored_output)?;

    if choice == marker.replacements.len() {
        Ok(None)
    } else {
        Ok(Some(choice))
    }
}

fn select(prompt: &str, items: &[String], colored_output: bool) -> Result<usize> {
    let selection = if colored_output {
        Select::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact()
    } else {
        Select::with_theme(&SimpleTheme)
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact()
    };

    selection.context("Selection prompt failed")
}

fn display_text(marker: &Marker) -> String {
    if marker.text.is_empty() {
        "(missing text)".to_string()
    } else {
        marker.text.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::annotate::annotate;
    use crate::Match;

    fn spelling_match() -> Match {
        Match {
            offset: 0,
            length: 3,
            message: "Possible spelling mistake found.".to_string(),
            rule_id: Some("MORFOLOGIK_RULE_EN_US".to_string()),
            replacements: vec!["This".to_string()],
        }
    }

    #[test]
    fn test_output_format_parsing() {
        assert!(matches!(
            "text".parse::<OutputFormat>(),
            Ok(OutputFormat::Text)
        ));
        assert!(matches!(
            "JSON".parse::<OutputFormat>(),
            Ok(OutputFormat::Json)
        ));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_render_without_color_uses_markup() {
        let doc = annotate("Ths is a test.", &[spelling_match()]);
        assert_eq!(render_annotated(&doc, false), "<mark>Ths</mark> is a test.");
    }

    #[test]
    fn test_json_issue_round_trips() {
        let issue = JsonIssue {
            offset: 0,
            length: 3,
            text: Some("Ths".to_string()),
            message: "Possible spelling mistake found.".to_string(),
            rule: Some("MORFOLOGIK_RULE_EN_US".to_string()),
            replacements: vec!["This".to_string()],
        };

        let json = serde_json::to_string(&issue).unwrap();
        let back: JsonIssue = serde_json::from_str(&json).unwrap();
        assert_eq!(back.text.as_deref(), Some("Ths"));
        assert_eq!(back.replacements, vec!["This"]);
    }
}
