//! Patient report generation.
//!
//! A report is produced in three stages:
//!
//! 1. [`compose`] turns an [`IntakeRecord`] and its visits into a [`Document`]
//! 2. [`layout_document`] flows the document onto pages, asking the
//!    [`ClinicHeader`] for each page's letterhead and footer
//! 3. [`render_pdf`] draws the pages and the result is written atomically

mod composer;
mod header;
mod layout;
mod pdf;

pub use composer::*;
pub use header::*;
pub use layout::*;
pub use pdf::*;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::IntakeRecord;

/// Report errors
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("No patient record to export")]
    MissingRecord,

    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    #[error("Could not write report to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type ReportResult<T> = Result<T, ReportError>;

/// Outcome of a successful export.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub path: PathBuf,
    pub pages: usize,
    pub visits: usize,
}

/// Builds patient reports under a fixed clinic letterhead.
#[derive(Debug, Clone, Default)]
pub struct ReportComposer {
    header: ClinicHeader,
    geometry: PageGeometry,
}

impl ReportComposer {
    pub fn new(header: ClinicHeader) -> Self {
        Self {
            header,
            geometry: PageGeometry::letter(),
        }
    }

    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn header(&self) -> &ClinicHeader {
        &self.header
    }

    /// Compose and lay out a report without rendering it.
    pub fn layout(&self, record: &IntakeRecord, visits: &[VisitEntry]) -> (Document, Layout) {
        let document = compose(record, visits);
        let layout = layout_document(&document, &self.geometry, |page, geometry| {
            self.header.decorate(page, geometry)
        });
        (document, layout)
    }

    /// Render a report to PDF bytes.
    pub fn render(
        &self,
        record: Option<&IntakeRecord>,
        visits: &[VisitEntry],
    ) -> ReportResult<(Vec<u8>, Layout)> {
        let record = record.ok_or(ReportError::MissingRecord)?;
        let (document, layout) = self.layout(record, visits);
        let bytes = render_pdf(&document.title, &layout, &self.geometry)?;
        Ok((bytes, layout))
    }

    /// Render a report and write it to `destination`.
    ///
    /// On failure nothing is left at `destination`.
    pub fn export(
        &self,
        record: Option<&IntakeRecord>,
        visits: &[VisitEntry],
        destination: &Path,
    ) -> ReportResult<ReportSummary> {
        let (bytes, layout) = self.render(record, visits)?;
        write_atomically(&bytes, destination)?;

        tracing::info!(
            path = %destination.display(),
            pages = layout.page_count(),
            visits = visits.len(),
            "Report exported"
        );
        Ok(ReportSummary {
            path: destination.to_path_buf(),
            pages: layout.page_count(),
            visits: visits.len(),
        })
    }
}

/// Suggested file name for a patient's report.
///
/// `case_no` should already be in display form.
pub fn default_report_filename(name: &str, case_no: &str) -> String {
    let safe_name: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '_')
        .collect();
    format!("{}_{}_Full_Record.pdf", safe_name.trim_end(), case_no)
}
