use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fehler_csv::fix_csv;
use fehler_ingest::PdfTextSource;
use std::path::PathBuf;
use std::process::ExitCode;

mod batch;
mod config;

use batch::{ConvertOptions, Converter};

#[derive(Parser, Debug)]
#[command(name = "fehler", version, about = "Convert Fehlerreport PDFs into canonical semicolon CSV")]
struct Cli {
    /// Config file (default: ~/.fehlerreport/config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a Fehlerreport PDF, or every PDF in a directory, to CSV
    Convert {
        /// PDF file or directory containing PDFs
        input: PathBuf,

        /// Output CSV path (single input only; default: <input>.csv)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Directory for CSV outputs (default: next to each PDF)
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Write the extracted text lines here (single input only)
        #[arg(long)]
        dump_text: Option<PathBuf>,
    },

    /// Rewrite a CSV export into the canonical 19-column header
    Fix {
        input: PathBuf,
        output: PathBuf,
    },

    /// Config file helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a config file with the built-in defaults
    Init,

    /// Print the effective configuration
    Show,
}

fn main() -> ExitCode {
    init_logger();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logger() {
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    pretty_env_logger::formatted_builder()
        .parse_filters(&filters)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Command::Convert {
            input,
            out,
            out_dir,
            dump_text,
        } => {
            let cfg = config::load_config(cli.config.as_deref())?;
            let source = PdfTextSource;
            let converter = Converter::new(&source, &cfg.rules);
            let opts = ConvertOptions {
                out,
                out_dir,
                dump_text,
            };

            let summary = converter
                .run(&input, &opts)
                .with_context(|| format!("converting {}", input.display()))?;

            println!(
                "Converted {} file(s), {} record(s); {} failed",
                summary.written.len(),
                summary.records,
                summary.failed.len()
            );
            for (pdf, _) in &summary.failed {
                println!("  failed: {}", pdf.display());
            }

            if summary.is_success() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }

        Command::Fix { input, output } => {
            let report = fix_csv(&input, &output)?;
            println!("Wrote {} with {} rows", output.display(), report.rows);
            if report.repaired > 0 {
                println!("Repaired {} malformed row(s)", report.repaired);
            }
            if !report.dropped_columns.is_empty() {
                println!("Dropped columns: {}", report.dropped_columns.join(", "));
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Config { command } => {
            match command {
                ConfigCommand::Init => {
                    config::init_config(cli.config.as_deref())?;
                }
                ConfigCommand::Show => {
                    let cfg = config::load_config(cli.config.as_deref())?;
                    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
