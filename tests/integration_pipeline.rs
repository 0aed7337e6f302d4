//! Integration tests for the full upload -> clean -> select -> export flow
//!
//! These tests run sessions and batches on fixture files and check the
//! artifacts that come out the other end.

use datasweeper::cleaning::CleaningOptions;
use datasweeper::error::SweeperError;
use datasweeper::export::ConversionRequest;
use datasweeper::io;
use datasweeper::pipeline::{PipelineSpec, Session, run_batch};
use datasweeper::table::{self, ColumnKind};
use datasweeper::upload::{FileFormat, UploadedFile};
use std::path::PathBuf;

fn fixture(name: &str) -> UploadedFile {
    UploadedFile::from_path(PathBuf::from("testdata").join(name)).expect("fixture should exist")
}

fn csv_text(bytes: &[u8]) -> String {
    String::from_utf8(bytes.to_vec()).expect("CSV output should be UTF-8")
}

#[test]
fn test_fill_missing_writes_mean() -> anyhow::Result<()> {
    let mut session = Session::new();
    let ids = session.upload([fixture("scenario_a.csv")]);
    let file = session.get_mut(ids[0])?;

    file.clean(&CleaningOptions {
        fill_missing_numeric: true,
        ..Default::default()
    })?;
    let artifact = file.export(&ConversionRequest::new(FileFormat::Csv))?;

    assert_eq!(artifact.file_name, "scenario_a_csv.csv");
    assert_eq!(csv_text(&artifact.bytes), "a,b\n1,3.5\n1,3.0\n2,4.0\n");
    Ok(())
}

#[test]
fn test_dedup_writes_first_occurrences() -> anyhow::Result<()> {
    let mut session = Session::new();
    let ids = session.upload([fixture("duplicates.csv")]);
    let file = session.get_mut(ids[0])?;

    let report = file.clean(&CleaningOptions {
        remove_duplicates: true,
        ..Default::default()
    })?;
    let artifact = file.export(&ConversionRequest::default())?;

    assert_eq!(report.duplicates_removed, 1);
    assert_eq!(csv_text(&artifact.bytes), "x,y\n1,2\n3,4\n");
    Ok(())
}

#[test]
fn test_excel_export_name_and_round_trip() -> anyhow::Result<()> {
    let source = fixture("mixed.csv");
    let upload = UploadedFile::new("My File (final).csv", source.bytes().to_vec());

    let mut session = Session::new();
    let ids = session.upload([upload]);
    let file = session.get_mut(ids[0])?;
    let artifact = file.export(&ConversionRequest::new(FileFormat::Xlsx))?;

    assert_eq!(artifact.file_name, "My_File__final__csv.xlsx");
    assert_eq!(
        artifact.mime_type,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );

    let back = io::read_table(&artifact.file_name, FileFormat::Xlsx, &artifact.bytes)?;
    assert!(back.equals_missing(&file.current()?));
    Ok(())
}

#[test]
fn test_csv_round_trip_keeps_table() -> anyhow::Result<()> {
    let (_, df) = io::read_upload(&fixture("mixed.csv"))?;
    let bytes = io::write_table("mixed.csv", &df, FileFormat::Csv)?;
    let back = io::read_table("mixed.csv", FileFormat::Csv, &bytes)?;

    assert!(back.equals_missing(&df));
    Ok(())
}

#[test]
fn test_mixed_fixture_types() -> anyhow::Result<()> {
    let (format, df) = io::read_upload(&fixture("mixed.csv"))?;

    assert_eq!(format, FileFormat::Csv);
    assert_eq!(df.shape(), (4, 6));
    assert_eq!(
        table::column_kinds(&df),
        vec![
            ("id".to_owned(), ColumnKind::Numeric),
            ("name".to_owned(), ColumnKind::Text),
            ("amount".to_owned(), ColumnKind::Numeric),
            ("active".to_owned(), ColumnKind::Boolean),
            ("joined".to_owned(), ColumnKind::Temporal),
            ("code".to_owned(), ColumnKind::Text),
        ]
    );
    assert_eq!(table::missing_cells(&df), 3);
    Ok(())
}

#[test]
fn test_unsupported_file_does_not_stop_batch() {
    let files = vec![
        fixture("duplicates.csv"),
        fixture("notes.txt"),
        fixture("scenario_a.csv"),
    ];
    let report = run_batch(files, &PipelineSpec::new("batch"));

    assert_eq!(report.outcomes.len(), 3);
    assert!(report.outcomes[0].is_ok());
    assert!(report.outcomes[2].is_ok());
    match &report.outcomes[1].result {
        Err(SweeperError::UnsupportedFormat { file, extension }) => {
            assert_eq!(file, "notes.txt");
            assert_eq!(extension, "txt");
        }
        other => panic!("expected an unsupported format error, got {other:?}"),
    }
    assert!(!report.all_succeeded());
}

#[test]
fn test_saved_spec_drives_batch() -> anyhow::Result<()> {
    let spec = PipelineSpec::from_file("testdata/pipeline.json")?;
    assert_eq!(spec.output.format, FileFormat::Xlsx);

    let report = run_batch([fixture("mixed.csv")], &spec);
    assert!(report.all_succeeded(), "{}", report.summary());

    let run = report.outcomes[0]
        .result
        .as_ref()
        .expect("mixed.csv should convert");
    assert_eq!(run.report.duplicates_removed, 1);
    assert_eq!(run.report.cells_filled, 1);
    assert_eq!((run.report.rows_after, run.report.columns_after), (3, 3));
    assert_eq!(run.artifact.file_name, "mixed_csv.xlsx");

    let chart = run.chart.as_ref().expect("spec asks for a chart");
    let names: Vec<&str> = chart.series.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["amount", "id"]);

    let back = io::read_table(&run.artifact.file_name, FileFormat::Xlsx, &run.artifact.bytes)?;
    let amounts: Vec<Option<f64>> = back
        .column("amount")?
        .as_materialized_series()
        .f64()?
        .into_iter()
        .collect();
    assert_eq!(amounts, vec![Some(12.5), Some(9.875), Some(7.25)]);
    Ok(())
}

#[test]
fn test_artifacts_land_on_disk() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let report = run_batch([fixture("duplicates.csv")], &PipelineSpec::new("disk"));
    let run = report.outcomes[0]
        .result
        .as_ref()
        .expect("duplicates.csv should convert");

    let path = run.artifact.write_to(dir.path(), false)?;
    assert_eq!(path, dir.path().join("duplicates_csv.csv"));
    assert_eq!(std::fs::read(&path)?, run.artifact.bytes);
    Ok(())
}
