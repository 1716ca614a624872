use crate::error::{QaqcError, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "weather-qaqc")]
#[command(about = "Quality control and reference ET processing for daily weather station data")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase logging verbosity (-v, -vv, -vvv)")]
    pub verbose: u8,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Suppress progress output")]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Parquet,
    Csv,
    Both,
}

impl OutputFormat {
    pub fn parse(format: &str) -> Result<Self> {
        match format.trim().to_lowercase().as_str() {
            "parquet" => Ok(OutputFormat::Parquet),
            "csv" => Ok(OutputFormat::Csv),
            "both" => Ok(OutputFormat::Both),
            _ => Err(QaqcError::Configuration(format!(
                "Unsupported output format: {} (expected parquet, csv or both)",
                format
            ))),
        }
    }

    pub fn parquet(self) -> bool {
        matches!(self, OutputFormat::Parquet | OutputFormat::Both)
    }

    pub fn csv(self) -> bool {
        matches!(self, OutputFormat::Csv | OutputFormat::Both)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full cascade, apply scripted corrections and write the output tables
    Process {
        #[arg(short, long, help = "Station configuration file (TOML or INI)")]
        config: PathBuf,

        #[arg(short, long, help = "Daily observations CSV")]
        input: PathBuf,

        #[arg(long, help = "Correction edits CSV (date,variable,value)")]
        corrections: Option<PathBuf>,

        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        #[arg(short, long, default_value = "parquet", help = "parquet, csv or both")]
        format: String,

        #[arg(long, default_value = "snappy")]
        compression: String,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,

        #[arg(long, help = "Also write the run summary as JSON")]
        summary_json: Option<PathBuf>,
    },

    /// Run the initial cascade only and print the run summary
    Inspect {
        #[arg(short, long, help = "Station configuration file (TOML or INI)")]
        config: PathBuf,

        #[arg(short, long, help = "Daily observations CSV")]
        input: PathBuf,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,
    },

    /// Display information about a daily Parquet output file
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "5")]
        sample: usize,
    },
}
