use crate::analyzers::{QaqcAnalyzer, QaqcSummary};
use crate::cli::args::{Cli, Commands, OutputFormat};
use crate::error::Result;
use crate::models::{Station, StationConfig, Variable, VariableStore};
use crate::processors::{PresetCorrector, RecalculationOrchestrator};
use crate::readers::{CorrectionReader, DailyReader, StationReader};
use crate::utils::logging;
use crate::utils::progress::ProgressReporter;
use crate::utils::OutputPaths;
use crate::writers::{CsvTableWriter, ParquetWriter};
use std::path::Path;
use tracing::{info, warn};

pub fn run(cli: Cli) -> Result<()> {
    logging::init(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Process {
            config,
            input,
            corrections,
            output_dir,
            format,
            compression,
            max_workers,
            summary_json,
        } => {
            println!("Processing station data...");
            println!("Input file: {}", input.display());
            println!("Output directory: {}", output_dir.display());

            // Fail on bad output options before any work is done
            let format = OutputFormat::parse(&format)?;
            let parquet = ParquetWriter::new().with_compression(&compression)?;

            let (station, station_config, mut orchestrator) =
                load_station(&config, &input, max_workers)?;

            let progress = ProgressReporter::new_spinner("Running initial cascade...", cli.quiet);
            orchestrator.initial_pass()?;
            progress.finish_with_message(&format!(
                "Initial cascade complete ({} days)",
                orchestrator.store().len()
            ));

            if let Some(path) = corrections {
                apply_corrections(&mut orchestrator, &path, cli.quiet)?;
            }

            std::fs::create_dir_all(&output_dir)?;
            write_outputs(
                &orchestrator,
                &station,
                &station_config,
                &output_dir,
                format,
                &parquet,
            )?;

            let summary = summarize(&station, &orchestrator);
            if let Some(path) = summary_json {
                let json = serde_json::to_string_pretty(&summary)?;
                std::fs::write(&path, json)?;
                info!(path = %path.display(), "Wrote run summary");
            }

            println!("\n{}", summary.detailed_summary());
            println!("Processing complete!");
        }

        Commands::Inspect {
            config,
            input,
            max_workers,
        } => {
            println!("Inspecting station data...");
            println!("Input file: {}", input.display());

            let (station, _, mut orchestrator) = load_station(&config, &input, max_workers)?;

            let progress = ProgressReporter::new_spinner("Running initial cascade...", cli.quiet);
            orchestrator.initial_pass()?;
            progress.finish_with_message("Initial cascade complete");

            println!("\n{}", summarize(&station, &orchestrator).detailed_summary());
        }

        Commands::Info { file, sample } => {
            println!("Analyzing Parquet file: {}", file.display());

            let writer = ParquetWriter::new();
            let file_info = writer.get_file_info(&file)?;
            println!("\n{}", file_info.summary());

            if sample > 0 {
                let table = writer.read_daily_table(&file)?;
                println!("\nSample Records (showing {} of {}):", sample.min(table.len()), table.len());
                for (i, row) in table.rows.iter().take(sample).enumerate() {
                    println!(
                        "{}. {:04}-{:02}-{:02}: TMax={:.1}, TMin={:.1}, Ea={:.2}, ETo={:.2}, ETr={:.2}",
                        i + 1,
                        row.year,
                        row.month,
                        row.day,
                        row.get(Variable::TMax),
                        row.get(Variable::TMin),
                        row.get(Variable::VaporPressure),
                        row.get(Variable::Eto),
                        row.get(Variable::Etr),
                    );
                }
            }
        }
    }

    Ok(())
}

fn load_station(
    config: &Path,
    input: &Path,
    max_workers: usize,
) -> Result<(Station, StationConfig, RecalculationOrchestrator)> {
    let (station, station_config) = StationReader::new().read_station(config)?;

    let records = DailyReader::new()
        .with_missing_value(station_config.data.missing_value)
        .read_records(input)?;
    let store = VariableStore::from_records(&records)?;

    let orchestrator = RecalculationOrchestrator::new(&station, store)
        .with_humidity_blend(station_config.data.humidity_blend)
        .with_max_workers(max_workers);

    Ok((station, station_config, orchestrator))
}

fn apply_corrections(orchestrator: &mut RecalculationOrchestrator, path: &Path, quiet: bool) -> Result<()> {
    let edits = CorrectionReader::read_edits(path)?;
    let mut corrector = PresetCorrector::new(&edits)?;
    let targets = corrector.targets();

    let progress = ProgressReporter::new(targets.len() as u64, "Applying corrections...", quiet);
    for target in targets {
        progress.set_message(&format!("Correcting {}", target));
        orchestrator.apply_correction(target, &mut corrector)?;
        progress.increment(1);
    }
    progress.finish_with_message(&format!("Applied {} of {} edits", corrector.applied(), corrector.edit_count()));

    if corrector.pending() > 0 {
        warn!(
            pending = corrector.pending(),
            "Some edits were not used by any correction pass"
        );
    }
    Ok(())
}

fn write_outputs(
    orchestrator: &RecalculationOrchestrator,
    station: &Station,
    station_config: &StationConfig,
    output_dir: &Path,
    format: OutputFormat,
    parquet: &ParquetWriter,
) -> Result<()> {
    let tables = orchestrator.output_tables();
    let climatology = orchestrator.store().climatology();

    if format.parquet() {
        let paths = OutputPaths::for_station(output_dir, &station.name, "parquet");
        parquet.write_daily_table(&tables.corrected, &paths.corrected)?;
        parquet.write_daily_table(&tables.delta, &paths.delta)?;
        parquet.write_daily_table(&tables.fill, &paths.fill)?;
        parquet.write_climatology(climatology, &paths.climatology)?;
        for path in paths.all() {
            info!(path = %path.display(), "Wrote output table");
        }

        let file_info = parquet.get_file_info(&paths.corrected)?;
        println!("\nWrote {}", paths.corrected.display());
        println!("{}", file_info.summary());
    }

    if format.csv() {
        let paths = OutputPaths::for_station(output_dir, &station.name, "csv");
        let csv = CsvTableWriter::new().with_missing_value(station_config.data.missing_value);
        csv.write_daily_table(&tables.corrected, &paths.corrected)?;
        csv.write_daily_table(&tables.delta, &paths.delta)?;
        csv.write_daily_table(&tables.fill, &paths.fill)?;
        csv.write_climatology(climatology, &paths.climatology)?;
        for path in paths.all() {
            info!(path = %path.display(), "Wrote output table");
        }
        println!("\nWrote {}", paths.corrected.display());
    }

    Ok(())
}

fn summarize(station: &Station, orchestrator: &RecalculationOrchestrator) -> QaqcSummary {
    QaqcAnalyzer::new().analyze(
        &station.name,
        orchestrator.store(),
        orchestrator.humidity_source(),
        orchestrator.applied_corrections(),
    )
}
