use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use colored::Colorize;
use grammarchk::cli::output::{self, OutputFormat};
use grammarchk::client::ApiClient;
use grammarchk::{checker, Config};
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "grammarchk")]
#[command(version, about = "A grammar and spell checker backed by a LanguageTool-compatible API", long_about = None)]
struct Cli {
    /// Files to check (reads standard input when none are given)
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Fix issues in place (auto-apply top suggestion)
    #[arg(short, long)]
    fix: bool,

    /// Interactive mode for selecting corrections
    #[arg(short, long, requires = "fix")]
    interactive: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Exit with code 0 even if issues are found
    #[arg(long)]
    no_fail: bool,

    /// Language to check against (e.g. en-US, de-DE, auto)
    #[arg(short, long, default_value = "en-US")]
    language: String,

    /// Checker API endpoint
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Output format (text, json)
    #[arg(short = 'o', long, default_value = "text")]
    format: OutputFormat,

    /// Pattern whose matches should not be reported (regex)
    #[arg(long)]
    ignore_pattern: Vec<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Parser, Debug)]
enum Commands {
    /// List languages supported by the checking service
    Languages,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle shell completion generation
    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "grammarchk", &mut io::stdout());
        return Ok(());
    }

    // Load configuration
    let config = Config::load(
        cli.language.clone(),
        cli.endpoint.clone(),
        cli.ignore_pattern.clone(),
        cli.timeout,
    )?;

    // Handle subcommands
    if let Some(command) = cli.command {
        return handle_command(command, &config);
    }

    let colored = !cli.no_color;

    // Initialize checker
    let checker = checker::GrammarChecker::new(&config)?;

    // No files means the text comes from standard input
    if cli.files.is_empty() {
        if cli.fix {
            anyhow::bail!("Cannot fix standard input in place. Pass a file to --fix.");
        }

        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read standard input")?;

        let report = checker.check_content("<stdin>", &text, colored, &cli.format)?;
        output::print_check_summary(report.error_count, 1, colored);

        if report.error_count > 0 && !cli.no_fail {
            std::process::exit(1);
        }
        return Ok(());
    }

    // Process files
    let mut total_errors = 0;
    let mut total_fixed = 0;
    let mut sources = 0;

    for file_path in &cli.files {
        if !file_path.exists() {
            eprintln!("Error: File not found: {}", file_path.display());
            continue;
        }
        sources += 1;

        let report = if cli.fix {
            if cli.interactive {
                checker.fix_interactive(file_path, colored)?
            } else {
                checker.fix_auto(file_path, colored)?
            }
        } else {
            checker.check_file(file_path, colored, &cli.format)?
        };

        total_errors += report.error_count;
        total_fixed += report.fixed_count;
    }

    // Print summary
    if cli.fix {
        output::print_fix_summary(total_fixed, colored);
    } else {
        output::print_check_summary(total_errors, sources, colored);
    }

    // Exit with appropriate code
    if total_errors > 0 && !cli.no_fail && !cli.fix {
        std::process::exit(1);
    }

    Ok(())
}

fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Languages => {
            let client = ApiClient::new(&config.endpoint, Duration::from_secs(config.timeout_secs))?;
            let languages = client.languages()?;

            println!("{}", "Supported languages:".bold());
            println!();
            for language in languages {
                println!("  {}  {}", language.long_code.cyan(), language.name);
            }
        }
    }
    Ok(())
}
