use super::*;
use tempfile::TempDir;

#[test]
fn pdf_magic_bytes() {
    assert!(is_pdf(b"%PDF-1.7\n%\xe2\xe3"));
    assert!(!is_pdf(b"%PD"));
    assert!(!is_pdf(b""));
    assert!(!is_pdf(b"PK\x03\x04 not a pdf"));
}

#[test]
fn split_pages_drops_trailing_form_feed() {
    let text = "Page one text\n\x0cPage two text\n\x0c";
    let pages = split_pages(text);

    assert_eq!(pages, vec!["Page one text\n", "Page two text\n"]);
}

#[test]
fn split_pages_keeps_empty_interior_pages() {
    let text = "Cover\x0c\x0cRecipes\x0c";
    let pages = split_pages(text);

    assert_eq!(pages.len(), 3);
    assert_eq!(pages[1], "");
    assert_eq!(pages[2], "Recipes");
}

#[test]
fn split_pages_without_form_feed() {
    assert_eq!(split_pages("just one page"), vec!["just one page"]);
    assert!(split_pages("").is_empty());
}

#[tokio::test]
async fn extract_rejects_non_pdf_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("notes.pdf");
    std::fs::write(&path, "plain text pretending to be a pdf").expect("Failed to write file");

    let result = extract_pages(&path).await;

    assert!(matches!(result, Err(AssistantError::InvalidPdf(_))));
}

#[tokio::test]
async fn extract_missing_file_is_io_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let result = extract_pages(&temp_dir.path().join("missing.pdf")).await;

    assert!(matches!(result, Err(AssistantError::Io(_))));
}

#[tokio::test]
async fn extract_pages_from_real_pdf() {
    if !pdftotext_available().await {
        eprintln!("Skipping extract_pages_from_real_pdf: pdftotext not installed");
        return;
    }

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("two-pages.pdf");
    std::fs::write(
        &path,
        crate::test_support::pdf_with_pages(&["Whisk the eggs", "Fold in the flour"]),
    )
    .expect("Failed to write file");

    let pages = extract_pages(&path).await.expect("extraction should succeed");

    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].trim(), "Whisk the eggs");
    assert_eq!(pages[1].trim(), "Fold in the flour");
}
