//! Policy document text extraction.

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};

/// Text of one document page. Plain-text documents are a single page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// 1-based page number.
    pub page: u32,
    /// Extracted text.
    pub text: String,
}

/// Extracts the text of a document, page by page.
///
/// `.pdf` files are parsed with `lopdf`; anything else is read as UTF-8
/// text. Pages whose text cannot be extracted are skipped.
pub fn extract_pages(path: &Path) -> EngineResult<Vec<PageText>> {
    if !path.exists() {
        return Err(assistant_error(path, "document not found"));
    }

    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));

    let pages = if is_pdf {
        extract_pdf(path)?
    } else {
        let text = fs::read_to_string(path).map_err(|e| assistant_error(path, e))?;
        vec![PageText { page: 1, text }]
    };

    info!(path = %path.display(), pages = pages.len(), "Extracted document text");
    Ok(pages)
}

fn extract_pdf(path: &Path) -> EngineResult<Vec<PageText>> {
    let document = lopdf::Document::load(path)
        .map_err(|e| assistant_error(path, format!("failed to load PDF: {}", e)))?;

    let mut pages = Vec::new();
    for (page, _) in document.get_pages() {
        match document.extract_text(&[page]) {
            Ok(text) => pages.push(PageText { page, text }),
            Err(e) => warn!(page, error = %e, "Skipping page without extractable text"),
        }
    }
    debug!(pages = pages.len(), "PDF pages extracted");
    Ok(pages)
}

fn assistant_error(path: &Path, cause: impl std::fmt::Display) -> EngineError {
    EngineError::AssistantError {
        message: format!("{}: {}", path.display(), cause),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Document, Object, Stream, dictionary};

    fn minimal_pdf(text: &str) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.new_object_id();
        let resources_id = doc.new_object_id();
        let content_id = doc.new_object_id();
        let page_id = doc.new_object_id();

        doc.objects.insert(
            font_id,
            Object::Dictionary(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Courier",
            }),
        );
        doc.objects.insert(
            resources_id,
            Object::Dictionary(dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            }),
        );
        let content = format!("BT /F1 12 Tf 50 700 Td ({}) Tj ET", text);
        doc.objects.insert(
            content_id,
            Object::Stream(Stream::new(dictionary! {}, content.into_bytes())),
        );
        doc.objects.insert(
            page_id,
            Object::Dictionary(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Resources" => resources_id,
                "Contents" => content_id,
            }),
        );
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_plain_text_is_one_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regras.txt");
        fs::write(&path, "O VR é pago por dia útil.").unwrap();

        let pages = extract_pages(&path).unwrap();

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].page, 1);
        assert!(pages[0].text.contains("dia útil"));
    }

    #[test]
    fn test_pdf_pages_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regras.pdf");
        fs::write(&path, minimal_pdf("Regras de VR")).unwrap();

        let pages = extract_pages(&path).unwrap();

        assert!(pages.len() <= 1);
    }

    #[test]
    fn test_corrupted_pdf_is_an_assistant_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        fs::write(&path, b"not a valid pdf content").unwrap();

        let err = extract_pages(&path).unwrap_err();

        assert!(matches!(err, EngineError::AssistantError { .. }));
        assert!(err.to_string().contains("failed to load PDF"));
    }

    #[test]
    fn test_missing_document() {
        let err = extract_pages(Path::new("/nonexistent/regras.pdf")).unwrap_err();
        assert!(err.to_string().contains("document not found"));
    }
}
