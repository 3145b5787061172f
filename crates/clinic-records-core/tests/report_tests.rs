//! Report composition, layout and export tests.

use std::fs;

use clinic_records_core::models::IntakeRecord;
use clinic_records_core::report::{
    ClinicHeader, PageDecoration, ReportComposer, ReportError, VisitEntry, PLACEHOLDER,
    VISIT_HISTORY_TITLE,
};

fn header() -> ClinicHeader {
    ClinicHeader {
        clinic_name: "Sunrise Homoeo Clinic".to_string(),
        practitioner_name: "Dr. A. Rao".to_string(),
        credentials: "D.H.M.S.".to_string(),
        registration_no: "Reg. No: 1234".to_string(),
        address: "Main Road, Pune".to_string(),
        contact: "Contact: 555 0100".to_string(),
    }
}

fn record() -> IntakeRecord {
    IntakeRecord::from_iter([
        ("date", "01-01-2025"),
        ("case_no", "00042"),
        ("name", "Asha Patil"),
        ("age", "34"),
        ("gender", "F"),
        ("co", "Headache\nWorse in morning"),
        ("treatment", "Bell 200"),
    ])
}

fn visits(n: usize) -> Vec<VisitEntry> {
    (1..=n)
        .map(|i| {
            VisitEntry::from((
                format!("{:02}-02-2025", i),
                format!("Complaint {i}"),
                "",
                format!("Remedy {i}"),
            ))
        })
        .collect()
}

#[test]
fn test_intake_only_report_is_one_page() {
    let composer = ReportComposer::new(header());
    let (document, layout) = composer.layout(&record(), &[]);

    assert_eq!(document.page_breaks(), 0);
    assert_eq!(layout.page_count(), 1);
    assert_eq!(layout.forced_breaks, 0);
    assert!(layout.find_page(VISIT_HISTORY_TITLE).is_none());
    assert!(layout.find_page("PATIENT INTAKE RECORD: Asha Patil (Case No: 42)").is_some());
}

#[test]
fn test_missing_values_render_placeholder() {
    let composer = ReportComposer::new(header());
    let (document, layout) = composer.layout(&record(), &[]);

    assert_eq!(document.section_text("Diagnosis"), Some(PLACEHOLDER));
    assert!(layout.body_text().contains(&PLACEHOLDER));
}

#[test]
fn test_multi_line_values_become_separate_lines() {
    let composer = ReportComposer::new(header());
    let (_, layout) = composer.layout(&record(), &[]);
    let body = layout.body_text();

    let first = body.iter().position(|t| *t == "Headache").unwrap();
    assert_eq!(body[first + 1], "Worse in morning");
}

#[test]
fn test_visit_section_starts_new_page() {
    let composer = ReportComposer::new(header());
    let (document, layout) = composer.layout(&record(), &visits(2));

    assert_eq!(document.page_breaks(), 1);
    assert_eq!(layout.forced_breaks, 1);
    assert_eq!(layout.page_count(), 2);

    let visit_page = layout.find_page(VISIT_HISTORY_TITLE).unwrap();
    assert_eq!(visit_page, 1);
    assert_eq!(layout.pages[visit_page].body[0].text, VISIT_HISTORY_TITLE);

    assert_eq!(
        document.visit_headings(),
        vec!["Visit 1: 01-02-2025", "Visit 2: 02-02-2025"]
    );
    let body = layout.body_text();
    let first = body.iter().position(|t| *t == "Visit 1: 01-02-2025").unwrap();
    let second = body.iter().position(|t| *t == "Visit 2: 02-02-2025").unwrap();
    assert!(first < second);
}

#[test]
fn test_many_visits_flow_without_extra_breaks() {
    let composer = ReportComposer::new(header());
    let (_, layout) = composer.layout(&record(), &visits(30));

    assert!(layout.page_count() > 2);
    assert_eq!(layout.forced_breaks, 1);
    for page in &layout.pages {
        assert!(page.contains("SUNRISE HOMOEO CLINIC"));
        assert!(page.contains("Dr. A. Rao, D.H.M.S."));
        assert!(page.contains(&format!("Page {}", page.number)));
    }
}

#[test]
fn test_header_callback_once_per_page() {
    let header = header();
    let composer = ReportComposer::new(header.clone());
    let (document, layout) = composer.layout(&record(), &visits(25));

    let mut calls = Vec::new();
    let relaid = clinic_records_core::report::layout_document(
        &document,
        &clinic_records_core::report::PageGeometry::letter(),
        |page, geometry| {
            calls.push(page);
            let decoration: PageDecoration = header.decorate(page, geometry);
            decoration
        },
    );

    assert_eq!(relaid, layout);
    assert_eq!(calls, (1..=layout.page_count()).collect::<Vec<_>>());
}

#[test]
fn test_export_writes_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("Asha Patil_42_Full_Record.pdf");
    let composer = ReportComposer::new(header());

    let summary = composer.export(Some(&record()), &visits(3), &dest).unwrap();

    assert_eq!(summary.path, dest);
    assert_eq!(summary.visits, 3);
    assert_eq!(summary.pages, 2);
    let bytes = fs::read(&dest).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_export_to_directory_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("taken");
    fs::create_dir(&dest).unwrap();
    let composer = ReportComposer::new(header());

    let err = composer.export(Some(&record()), &[], &dest).unwrap_err();
    match &err {
        ReportError::Write { path, .. } => assert_eq!(path, &dest),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!err.to_string().is_empty());
    assert!(dest.is_dir());

    let leftovers = fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(leftovers, 1);
}

#[test]
fn test_export_without_record() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("none.pdf");
    let err = ReportComposer::default().export(None, &visits(1), &dest).unwrap_err();
    assert!(matches!(err, ReportError::MissingRecord));
    assert!(!dest.exists());
}
