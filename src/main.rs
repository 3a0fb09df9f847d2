use std::path::PathBuf;
use std::process::ExitCode;

use ambedkar_gpt::commands::{load_config, run_qa};
use ambedkar_gpt::config::{Config, get_config_dir, run_interactive_config, show_config};
use ambedkar_gpt::{QaError, Result};
use clap::{Parser, Subcommand};
use console::style;

#[derive(Parser)]
#[command(name = "ambedkar-gpt")]
#[command(about = "Answer questions about a local text document with a local language model")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// Directory holding config.toml
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,
    /// Text file to answer questions about
    #[arg(long)]
    document: Option<PathBuf>,
    /// Number of chunks retrieved for each question
    #[arg(long)]
    top_k: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure Ollama connection, models and retrieval settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let (status, report) = exit_report(run(cli).await);
    match report {
        Some(Report::Stdout(message)) => println!("{}", message),
        Some(Report::Stderr(message)) => eprintln!("\n{}", style(message).red()),
        None => {}
    }
    ExitCode::from(status)
}

/// A message printed when the run ends
#[derive(Debug, PartialEq, Eq)]
enum Report {
    Stdout(String),
    Stderr(String),
}

/// Map the outcome of a run to a process exit status and its final message.
/// A missing or empty document is a clean exit.
fn exit_report(result: Result<()>) -> (u8, Option<Report>) {
    match result {
        Ok(()) => (0, None),
        Err(e) if e.is_missing_source() => (0, Some(Report::Stdout(format!("Error: {}", e)))),
        Err(e @ QaError::Dependency(_)) => (1, Some(Report::Stderr(e.to_string()))),
        Err(e) => (
            1,
            Some(Report::Stderr(format!(
                "An unexpected error occurred: {}",
                e
            ))),
        ),
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Config { show }) => {
            if show {
                show_config(&load_config(cli.config_dir.as_deref())?);
            } else {
                let config_dir = match cli.config_dir {
                    Some(dir) => dir,
                    None => get_config_dir()?,
                };
                run_interactive_config(&config_dir)?;
            }
            Ok(())
        }
        None => {
            let mut config = load_config(cli.config_dir.as_deref())?;
            apply_overrides(&mut config, cli.document, cli.top_k)?;
            run_qa(&config).await
        }
    }
}

fn apply_overrides(
    config: &mut Config,
    document: Option<PathBuf>,
    top_k: Option<usize>,
) -> Result<()> {
    if let Some(path) = document {
        config.set_document_path(path)?;
    }
    if let Some(top_k) = top_k {
        config.set_top_k(top_k)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn no_arguments_runs_session() {
        let cli = Cli::try_parse_from(["ambedkar-gpt"]).expect("should parse");

        assert!(cli.command.is_none());
        assert_eq!(cli.document, None);
        assert_eq!(cli.top_k, None);
    }

    #[test]
    fn document_and_top_k_overrides() {
        let cli = Cli::try_parse_from([
            "ambedkar-gpt",
            "--document",
            "annihilation.txt",
            "--top-k",
            "2",
        ])
        .expect("should parse");

        let mut config = Config::default();
        apply_overrides(&mut config, cli.document, cli.top_k).expect("overrides are valid");

        assert_eq!(config.document.path, PathBuf::from("annihilation.txt"));
        assert_eq!(config.retrieval.top_k, 2);
    }

    #[test]
    fn invalid_top_k_override_is_rejected() {
        let mut config = Config::default();
        let result = apply_overrides(&mut config, None, Some(0));

        assert!(matches!(result, Err(QaError::Config(_))));
        assert_eq!(config.retrieval.top_k, 4);
    }

    #[test]
    fn config_show_flag() {
        let cli = Cli::try_parse_from(["ambedkar-gpt", "config", "--show"]).expect("should parse");

        if let Some(Commands::Config { show }) = cli.command {
            assert!(show);
        } else {
            panic!("expected config subcommand");
        }
    }

    #[test]
    fn config_dir_is_global() {
        let cli = Cli::try_parse_from(["ambedkar-gpt", "config", "--config-dir", "/tmp/qa"])
            .expect("should parse");

        assert_eq!(cli.config_dir, Some(PathBuf::from("/tmp/qa")));
    }

    #[test]
    fn invalid_command() {
        let cli = Cli::try_parse_from(["ambedkar-gpt", "invalid"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
        }
    }

    #[test]
    fn successful_run_exits_cleanly() {
        assert_eq!(exit_report(Ok(())), (0, None));
    }

    #[test]
    fn missing_document_prints_to_stdout_and_exits_zero() {
        let (status, report) =
            exit_report(Err(QaError::MissingDocument(PathBuf::from("speech.txt"))));

        assert_eq!(status, 0);
        assert_eq!(
            report,
            Some(Report::Stdout(
                "Error: Could not load speech.txt. Make sure the file exists and is not empty."
                    .to_string()
            ))
        );
    }

    #[test]
    fn empty_document_exits_zero() {
        let (status, report) =
            exit_report(Err(QaError::EmptyDocumentSet(PathBuf::from("blank.txt"))));

        assert_eq!(status, 0);
        assert!(matches!(report, Some(Report::Stdout(message)) if message.starts_with("Error: Could not load blank.txt.")));
    }

    #[test]
    fn dependency_failure_exits_one() {
        let (status, report) = exit_report(Err(QaError::Dependency(
            "Model 'mistral' is not available".to_string(),
        )));

        assert_eq!(status, 1);
        assert_eq!(
            report,
            Some(Report::Stderr(
                "Dependency error: Model 'mistral' is not available".to_string()
            ))
        );
    }

    #[test]
    fn other_failures_are_unexpected_and_exit_one() {
        let (status, report) =
            exit_report(Err(QaError::IndexBuild("Failed to create table".to_string())));

        assert_eq!(status, 1);
        assert_eq!(
            report,
            Some(Report::Stderr(
                "An unexpected error occurred: Index build error: Failed to create table"
                    .to_string()
            ))
        );
    }

    #[test]
    fn help_message() {
        let cli = Cli::try_parse_from(["ambedkar-gpt", "--help"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        }
    }
}
