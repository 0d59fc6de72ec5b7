pub mod annotate;
pub mod session;

use crate::cli::output::{self, OutputFormat};
use crate::client::ApiClient;
use crate::stats::TextStats;
use crate::{CheckReport, Config, Match};
use annotate::covered_text;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use session::CorrectionSession;
use std::fs;
use std::path::Path;
use std::time::Duration;
use unicode_segmentation::UnicodeSegmentation;

pub struct GrammarChecker {
    client: ApiClient,
    language: String,
    disabled_rules: Vec<String>,
    ignore_patterns: Vec<Regex>,
    max_suggestions: usize,
    max_text_length: usize,
}

impl GrammarChecker {
    pub fn new(config: &Config) -> Result<Self> {
        let client = ApiClient::new(&config.endpoint, Duration::from_secs(config.timeout_secs))
            .context("Failed to build HTTP client")?;

        // Compile ignore patterns
        let mut ignore_patterns = Vec::new();
        for pattern in &config.ignore_patterns {
            match Regex::new(pattern) {
                Ok(re) => ignore_patterns.push(re),
                Err(e) => eprintln!("Warning: Invalid regex pattern '{}': {}", pattern, e),
            }
        }

        Ok(Self {
            client,
            language: config.language.clone(),
            disabled_rules: config.disabled_rules.clone(),
            ignore_patterns,
            max_suggestions: config.max_suggestions,
            max_text_length: config.max_text_length,
        })
    }

    /// Submit text to the remote service and collect the reported matches.
    ///
    /// Empty input short-circuits to a clean report without a request.
    /// Oversized input is truncated to the configured limit and flagged so
    /// the caller can tell the user only a prefix was checked.
    pub fn check_text(&self, text: &str) -> Result<CheckReport> {
        if text.trim().is_empty() {
            return Ok(CheckReport::default());
        }

        let (to_check, truncated) = truncate_text(text, self.max_text_length);

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        pb.set_message("Checking...");
        pb.enable_steady_tick(Duration::from_millis(120));

        let outcome = self
            .client
            .check(to_check, &self.language, &self.disabled_rules);
        // The spinner must go away on the failure path too.
        pb.finish_and_clear();

        let response = outcome.context("Check request failed")?;

        let matches: Vec<Match> = response
            .matches
            .into_iter()
            .map(|m| Match {
                offset: m.offset,
                length: m.length,
                message: m.message,
                rule_id: m.rule.map(|r| r.id),
                replacements: m
                    .replacements
                    .into_iter()
                    .take(self.max_suggestions)
                    .map(|r| r.value)
                    .collect(),
            })
            .filter(|m| !self.should_ignore(m, to_check))
            .collect();

        Ok(CheckReport {
            error_count: matches.len(),
            fixed_count: 0,
            truncated,
            matches,
        })
    }

    pub fn check_file(
        &self,
        file_path: &Path,
        colored: bool,
        format: &OutputFormat,
    ) -> Result<CheckReport> {
        let content = fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))?;

        self.check_content(&file_path.display().to_string(), &content, colored, format)
    }

    pub fn check_content(
        &self,
        source: &str,
        content: &str,
        colored: bool,
        format: &OutputFormat,
    ) -> Result<CheckReport> {
        let report = self.check_text(content)?;
        let doc = annotate::annotate(content, &report.matches);

        output::print_report(
            source,
            &report,
            &doc,
            TextStats::of(content),
            self.max_text_length,
            colored,
            format,
        );

        Ok(report)
    }

    /// Apply the top suggestion of every match in one pass and write the
    /// file back. Replacements are spliced highest offset first, so no
    /// applied fix shifts the range of one still pending.
    pub fn fix_auto(&self, file_path: &Path, colored: bool) -> Result<CheckReport> {
        let content = fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))?;

        let report = self.check_text(&content)?;
        if report.truncated {
            output::print_truncation_notice(self.max_text_length, colored);
        }

        let picks: Vec<(Match, String)> = report
            .matches
            .iter()
            .filter_map(|m| m.replacements.first().map(|r| (m.clone(), r.clone())))
            .collect();

        let (new_content, fixed_count) = annotate::apply_replacements(&content, &picks);

        if fixed_count > 0 {
            fs::write(file_path, new_content)
                .with_context(|| format!("Failed to write file: {}", file_path.display()))?;
        }

        Ok(CheckReport {
            error_count: 0,
            fixed_count,
            truncated: report.truncated,
            matches: Vec::new(),
        })
    }

    /// Walk the user through corrections one at a time. After every applied
    /// correction the remaining markers are stale, so the whole new text is
    /// re-checked before offering anything further.
    pub fn fix_interactive(&self, file_path: &Path, colored: bool) -> Result<CheckReport> {
        let original = fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))?;

        let mut current = original.clone();
        let mut fixed_count = 0;
        let mut truncated = false;

        'rounds: loop {
            let report = self.check_text(&current)?;
            truncated |= report.truncated;
            if report.matches.is_empty() {
                break;
            }
            if report.truncated {
                output::print_truncation_notice(self.max_text_length, colored);
            }

            let mut session = CorrectionSession::new(&current, &report.matches);
            println!("\n{}", output::render_annotated(session.document(), colored));

            loop {
                let Some(marker_id) = output::prompt_marker(session.document(), colored)? else {
                    break 'rounds;
                };
                session.open(marker_id)?;

                let marker = session
                    .document()
                    .marker(marker_id)
                    .context("Marker disappeared from the document")?
                    .clone();

                match output::prompt_suggestion(&marker, colored)? {
                    Some(index) => {
                        current = session.apply(marker_id, index)?.to_string();
                        fixed_count += 1;
                        // Offsets are stale now; go check the new text.
                        continue 'rounds;
                    }
                    None => session.dismiss(),
                }
            }
        }

        if current != original {
            fs::write(file_path, &current)
                .with_context(|| format!("Failed to write file: {}", file_path.display()))?;
        }

        Ok(CheckReport {
            error_count: 0,
            fixed_count,
            truncated,
            matches: Vec::new(),
        })
    }

    fn should_ignore(&self, m: &Match, text: &str) -> bool {
        let covered = match covered_text(text, m.offset, m.length) {
            Some(covered) => covered,
            None => return false,
        };

        self.ignore_patterns.iter().any(|re| re.is_match(covered))
    }
}

/// Cut `text` down to at most `max_chars` characters, on a grapheme
/// boundary so no cluster is split.
fn truncate_text(text: &str, max_chars: usize) -> (&str, bool) {
    if text.chars().count() <= max_chars {
        return (text, false);
    }

    let mut cut = text.len();
    let mut chars = 0;
    for (idx, grapheme) in text.grapheme_indices(true) {
        let next = chars + grapheme.chars().count();
        if next > max_chars {
            cut = idx;
            break;
        }
        chars = next;
    }

    (&text[..cut], true)
}
