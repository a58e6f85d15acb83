use chrono::{Local, TimeZone};
use std::fmt::Write as _;
use varmix::export::{archive_path, save_table_csv};
use varmix::report::{HtmlReportContext, save_html_report};
use varmix::sources::load_entities;
use varmix::{AnalysisMode, EntityId, build, calculate_statistics};

const CALLS: [u32; 12] = [
    1200, 1100, 1300, 1400, 1500, 1600, 1700, 1600, 1500, 1400, 1300, 1200,
];

fn monthly_counts_csv() -> String {
    let mut csv = String::from("company_id,company_name,month,calls\n");
    for (month, calls) in CALLS.iter().enumerate() {
        writeln!(csv, "42,Monarch HVAC,{},{calls}", month + 1).unwrap();
        writeln!(csv, "7,\"Elite Plumbing, Inc.\",{},250", month + 1).unwrap();
    }
    csv
}

#[tokio::test]
async fn csv_input_round_trips_to_csv_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("calls.csv");
    std::fs::write(&input, monthly_counts_csv()).unwrap();

    let entities = load_entities(&input).await.unwrap();
    assert_eq!(entities.len(), 2);
    assert_eq!(entities[0].id, EntityId::Number(42));

    let (table, _) = build(&entities, AnalysisMode::Absolute).unwrap();
    let output = dir.path().join("out").join("variability.csv");
    let written = save_table_csv(&output, &table, false).await.unwrap();
    assert_eq!(written, output);

    let mut reader = csv::Reader::from_path(&written).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.len(), 26);
    assert_eq!(&headers[0], "Company");
    assert_eq!(&headers[15], "Jul_var");

    let records: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(&records[0][0], "Monarch HVAC");
    assert_eq!(&records[0][1], "1,400.00");
    assert_eq!(&records[0][2], "1,200");
    assert_eq!(&records[0][3], "-200.00");
    assert_eq!(&records[0][15], "+300.00");
    assert_eq!(&records[1][0], "Elite Plumbing, Inc.");
    assert_eq!(&records[1][3], "+0.00");
}

#[tokio::test]
async fn archived_csv_is_gzipped() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("calls.csv");
    std::fs::write(&input, monthly_counts_csv()).unwrap();
    let entities = load_entities(&input).await.unwrap();
    let (table, _) = build(&entities, AnalysisMode::Percentage).unwrap();

    let output = dir.path().join("variability.csv");
    let written = save_table_csv(&output, &table, true).await.unwrap();
    assert_eq!(written, archive_path(&output));
    assert!(!output.exists());

    let bytes = std::fs::read(&written).unwrap();
    assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
}

#[tokio::test]
async fn json_records_without_percentages_are_derived() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("companies.json");
    std::fs::write(
        &input,
        r#"[{"name":"Monarch HVAC","id":"MON-1","absolute_values":[1200,1100,1300,1400,1500,1600,1700,1600,1500,1400,1300,1200]}]"#,
    )
    .unwrap();

    let entities = load_entities(&input).await.unwrap();
    assert_eq!(entities[0].id, EntityId::Text("MON-1".to_string()));
    assert!(entities[0].percentage_values.is_none());

    let (table, _) = build(&entities, AnalysisMode::Percentage).unwrap();
    assert_eq!(table.rows[0].average_cell, "8.33%");
    assert_eq!(table.rows[0].months[6].deviation, "+1.79");
}

#[tokio::test]
async fn html_report_is_written_next_to_the_csv() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("calls.csv");
    std::fs::write(&input, monthly_counts_csv()).unwrap();
    let entities = load_entities(&input).await.unwrap();
    let (table, styles) = build(&entities, AnalysisMode::Absolute).unwrap();
    let statistics = calculate_statistics(&entities, AnalysisMode::Absolute).unwrap();

    let csv_path = save_table_csv(&dir.path().join("variability.csv"), &table, false)
        .await
        .unwrap();
    let html_path = dir.path().join("report.html");
    let started = Local.with_ymd_and_hms(2025, 3, 14, 8, 0, 0).unwrap();
    let context = HtmlReportContext {
        run_started_at: &started,
        table: &table,
        styles: &styles,
        statistics: statistics.as_ref(),
        csv_path: Some(&csv_path),
        output_path: &html_path,
    };
    save_html_report(&html_path, &context).await.unwrap();

    let html = std::fs::read_to_string(&html_path).unwrap();
    assert!(html.contains("Monarch HVAC"));
    assert!(html.contains("cell-up"));
    assert!(html.contains("variability.csv"));
}

#[tokio::test]
async fn missing_input_reports_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.csv");
    let err = load_entities(&missing).await.unwrap_err();
    assert!(err.to_string().contains("nope.csv"));
}
