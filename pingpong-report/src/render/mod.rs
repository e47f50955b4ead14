//! Two-page PDF report: charts on the first page, summary on the second.
use std::fs;
use std::io::BufWriter;
use std::path::Path;
use log::info;
use plotters::prelude::IntoDrawingArea;
use printpdf::PdfDocument;
use crate::config::ReportConfig;
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::estimate::Estimate;

mod backend;
pub use backend::{pt_to_mm, PdfBackend, PdfFonts};
mod charts;
mod summary;

const DOCUMENT_TITLE: &str = "MPI Ping-Pong Report";

/// Render the whole report into memory.
pub fn render(dataset: &Dataset, est: &Estimate, config: &ReportConfig) -> Result<Vec<u8>> {
    let layout = &config.layout;
    let size = (layout.page_width, layout.page_height);
    let width = pt_to_mm(layout.page_width as f64);
    let height = pt_to_mm(layout.page_height as f64);

    let (doc, page, layer) = PdfDocument::new(DOCUMENT_TITLE, width, height, "Charts");
    let fonts = PdfFonts::builtin(&doc)?;

    let charts = PdfBackend::new(doc.get_page(page).get_layer(layer), fonts.clone(), size);
    charts::draw(&charts.into_drawing_area(), dataset, est, layout)?;

    let (page, layer) = doc.add_page(width, height, "Summary");
    let summary = PdfBackend::new(doc.get_page(page).get_layer(layer), fonts, size);
    summary::draw(&summary.into_drawing_area(), dataset, est, config)?;

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)?;
    buf.into_inner().map_err(|err| Error::Io(err.into_error()))
}

/// Render the report and write it to `path`. Nothing is written unless
/// rendering succeeded.
pub fn write_report<P: AsRef<Path>>(
    path: P,
    dataset: &Dataset,
    est: &Estimate,
    config: &ReportConfig,
) -> Result<()> {
    let path = path.as_ref();
    let bytes = render(dataset, est, config)?;
    fs::write(path, &bytes)?;
    info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
