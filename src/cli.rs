use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use datasweeper::config::SweeperConfig;
use datasweeper::pipeline::{FileContext, FileId, PipelineSpec, run_batch};
use datasweeper::selection::ColumnSelection;
use datasweeper::table;
use datasweeper::upload::{FileFormat, UploadedFile};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "datasweeper",
    version,
    about = "Clean, trim and convert CSV and Excel files"
)]
pub struct Cli {
    /// Also write logs to rolling files in the data directory
    #[arg(long, global = true)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the column types and first rows of each file
    Preview {
        /// CSV or XLSX files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Number of rows to show. Defaults to the configured preview size.
        #[arg(short, long)]
        rows: Option<usize>,
    },
    /// Clean, select columns and convert each file
    Convert {
        /// CSV or XLSX files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Target format: csv, xlsx or excel
        #[arg(long)]
        to: Option<FileFormat>,

        /// Remove duplicate rows
        #[arg(long)]
        dedup: bool,

        /// Fill missing numeric cells with the column mean
        #[arg(long)]
        fill_missing: bool,

        /// Comma-separated columns to keep, in output order
        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<String>>,

        /// Print chart data for the first two numeric columns as JSON
        #[arg(long)]
        chart: bool,

        /// Pipeline spec JSON; flags given here override it
        #[arg(long)]
        spec: Option<PathBuf>,

        /// Save the effective pipeline spec to this path
        #[arg(long)]
        save_spec: Option<PathBuf>,

        /// Directory for converted files
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Replace existing output files
        #[arg(long)]
        overwrite: bool,
    },
}

/// Run a command. Returns `false` when any file failed.
pub fn run_command(command: Commands, config: &SweeperConfig) -> Result<bool> {
    match command {
        Commands::Preview { files, rows } => Ok(handle_preview(
            &files,
            rows.unwrap_or(config.preview_rows),
        )),
        Commands::Convert {
            files,
            to,
            dedup,
            fill_missing,
            columns,
            chart,
            spec,
            save_spec,
            out_dir,
            overwrite,
        } => {
            let mut spec = match spec {
                Some(path) => PipelineSpec::from_file(&path)?,
                None => {
                    let mut spec = PipelineSpec::new("command line");
                    spec.output.format = config.default_format;
                    spec
                }
            };
            spec.cleaning.remove_duplicates |= dedup;
            spec.cleaning.fill_missing_numeric |= fill_missing;
            spec.visualize |= chart;
            spec.output.overwrite |= overwrite || config.overwrite;
            if let Some(columns) = columns {
                spec.columns = ColumnSelection::Only(columns);
            }
            if let Some(format) = to {
                spec.output.format = format;
            }
            if out_dir.is_some() {
                spec.output.dir = out_dir;
            } else if spec.output.dir.is_none() {
                spec.output.dir.clone_from(&config.output_dir);
            }

            if let Some(path) = save_spec {
                spec.to_file(&path)?;
                println!("Saved pipeline spec to {}", path.display());
            }

            handle_convert(&files, &spec)
        }
    }
}

fn handle_preview(paths: &[PathBuf], rows: usize) -> bool {
    let mut all_ok = true;

    for (idx, path) in paths.iter().enumerate() {
        let context = UploadedFile::from_path(path)
            .and_then(|upload| FileContext::from_upload(FileId::new(idx), &upload));

        match context {
            Ok(context) => print_preview(&context, rows),
            Err(err) => {
                println!("{}: {err}", path.display());
                all_ok = false;
            }
        }
        println!();
    }

    all_ok
}

fn print_preview(context: &FileContext, rows: usize) {
    let df = context.base();
    println!(
        "{} ({}, {} rows, {} columns)",
        context.name(),
        context.format().label(),
        df.height(),
        df.width()
    );
    for (name, kind) in table::column_kinds(df) {
        println!("  {name}: {}", kind.as_str());
    }
    println!("  missing cells: {}", table::missing_cells(df));
    println!("{}", table::preview(df, rows));
}

fn handle_convert(paths: &[PathBuf], spec: &PipelineSpec) -> Result<bool> {
    let mut all_ok = true;
    let mut uploads = Vec::new();

    for path in paths {
        match UploadedFile::from_path(path) {
            Ok(upload) => uploads.push(upload),
            Err(err) => {
                println!("FAILED {}: {err}", path.display());
                all_ok = false;
            }
        }
    }

    let out_dir = spec.output.dir.as_deref().unwrap_or_else(|| Path::new("."));
    let report = run_batch(uploads, spec);

    for outcome in &report.outcomes {
        let run = match &outcome.result {
            Ok(run) => run,
            Err(err) => {
                println!("FAILED {}: {err}", outcome.name);
                all_ok = false;
                continue;
            }
        };

        match run.artifact.write_to(out_dir, spec.output.overwrite) {
            Ok(path) => println!(
                "ok     {} -> {} ({})",
                outcome.name,
                path.display(),
                run.report.summary()
            ),
            Err(err) => {
                println!("FAILED {}: {err}", outcome.name);
                all_ok = false;
            }
        }
        for warning in &run.report.warnings {
            println!("       warning: {warning}");
        }
        if let Some(chart) = &run.chart {
            let json = serde_json::to_string(chart).context("Failed to serialize chart")?;
            println!("       chart: {json}");
        }
    }

    println!("{}", report.summary());
    Ok(all_ok)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_flags_parse() {
        let cli = Cli::try_parse_from([
            "datasweeper",
            "convert",
            "a.csv",
            "b.xlsx",
            "--to",
            "Excel",
            "--columns",
            "x,y",
            "--dedup",
        ])
        .expect("arguments should parse");

        match cli.command {
            Commands::Convert {
                files,
                to,
                columns,
                dedup,
                fill_missing,
                ..
            } => {
                assert_eq!(files.len(), 2);
                assert_eq!(to, Some(FileFormat::Xlsx));
                assert_eq!(columns, Some(vec!["x".to_owned(), "y".to_owned()]));
                assert!(dedup);
                assert!(!fill_missing);
            }
            Commands::Preview { .. } => panic!("expected convert"),
        }
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["datasweeper", "convert", "a.csv", "--to", "pdf"]).is_err());
    }

    #[test]
    fn test_convert_writes_artifacts() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("In Put.csv");
        std::fs::write(&input, "x,y\n1,2\n1,2\n")?;
        let out = dir.path().join("out");

        let config = SweeperConfig {
            output_dir: Some(out.clone()),
            ..Default::default()
        };
        let command = Commands::Convert {
            files: vec![input, dir.path().join("missing.csv")],
            to: None,
            dedup: true,
            fill_missing: false,
            columns: None,
            chart: false,
            spec: None,
            save_spec: None,
            out_dir: None,
            overwrite: false,
        };

        // the missing file fails, the other one is still converted
        assert!(!run_command(command, &config)?);
        assert_eq!(std::fs::read_to_string(out.join("In_Put_csv.csv"))?, "x,y\n1,2\n");
        Ok(())
    }
}
