#[cfg(test)]
mod tests;

use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::{AssistantError, Result};

const PDF_MAGIC: &[u8; 4] = b"%PDF";
const PAGE_BREAK: char = '\x0c';
pub const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(120);

/// True if `data` starts with the PDF header
#[inline]
pub fn is_pdf(data: &[u8]) -> bool {
    data.starts_with(PDF_MAGIC)
}

/// Extract the text of every page, in order.
///
/// Uses `pdftotext` from poppler-utils, which separates pages with form feeds.
/// Pages without a text layer come back as empty strings so that page indices
/// still line up with the document.
#[inline]
pub async fn extract_pages(path: &Path) -> Result<Vec<String>> {
    let data = tokio::fs::read(path).await?;

    if !is_pdf(&data) {
        return Err(AssistantError::InvalidPdf(format!(
            "'{}' is missing the %PDF header",
            path.display()
        )));
    }

    let text = run_pdftotext(path).await?;
    let pages = split_pages(&text);

    if pages.iter().all(|page| page.trim().is_empty()) {
        warn!(
            "No extractable text in {}, it may be a scanned document",
            path.display()
        );
    }

    debug!("Extracted {} pages from {}", pages.len(), path.display());
    Ok(pages)
}

/// True if the `pdftotext` executable can be run
#[inline]
pub async fn pdftotext_available() -> bool {
    match Command::new("pdftotext").arg("-v").output().await {
        // Depending on the poppler version `-v` exits with 0 or 99
        Ok(output) => output.status.success() || output.status.code() == Some(99),
        Err(_) => false,
    }
}

async fn run_pdftotext(path: &Path) -> Result<String> {
    let output = tokio::time::timeout(
        EXTRACTION_TIMEOUT,
        Command::new("pdftotext")
            .arg("-enc")
            .arg("UTF-8")
            .arg(path)
            .arg("-")
            .kill_on_drop(true)
            .output(),
    )
    .await
    .map_err(|_| {
        AssistantError::Ingestion(format!(
            "pdftotext timed out after {}s",
            EXTRACTION_TIMEOUT.as_secs()
        ))
    })?
    .map_err(|e| AssistantError::Ingestion(format!("Failed to run pdftotext: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AssistantError::InvalidPdf(format!(
            "pdftotext failed on '{}' ({}): {}",
            path.display(),
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Split pdftotext output into pages. The output ends with a form feed after
/// the last page, which does not start a new page.
#[inline]
pub fn split_pages(text: &str) -> Vec<String> {
    let mut pages: Vec<String> = text.split(PAGE_BREAK).map(str::to_string).collect();

    if pages.last().is_some_and(|last| last.trim().is_empty()) {
        pages.pop();
    }

    pages
}
