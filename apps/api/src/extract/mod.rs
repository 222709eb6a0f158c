//! Text extraction for uploaded resumes.
//!
//! Extraction never fails: internal errors are logged and collapse to the
//! text accumulated so far (possibly empty), so callers only ever branch
//! on the returned value.

use std::path::Path;

use docx_rs::{read_docx, DocumentChild, ParagraphChild, RunChild};
use tracing::warn;

/// Outcome of text extraction. `Unsupported` is distinct from empty text
/// so callers can tell "no text in the document" apart from "wrong type".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Text(String),
    Unsupported,
}

/// Extracts raw text from the file at `path`.
///
/// `ext` is the declared extension, lowercased, without the leading dot.
pub fn extract(path: &Path, ext: &str) -> Extraction {
    match ext {
        "pdf" => Extraction::Text(extract_pdf(path)),
        "docx" => Extraction::Text(extract_docx(path)),
        "txt" => Extraction::Text(extract_txt(path)),
        _ => Extraction::Unsupported,
    }
}

/// Page-ordered text layer of a PDF. A document that cannot be read
/// yields an empty string.
fn extract_pdf(path: &Path) -> String {
    match pdf_extract::extract_text(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("Error extracting text from PDF {}: {e}", path.display());
            String::new()
        }
    }
}

/// Concatenates every paragraph of a DOCX body, each followed by a
/// newline, in document order.
fn extract_docx(path: &Path) -> String {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Error reading DOCX {}: {e}", path.display());
            return String::new();
        }
    };

    let docx = match read_docx(&bytes) {
        Ok(docx) => docx,
        Err(e) => {
            warn!("Error extracting text from DOCX {}: {e}", path.display());
            return String::new();
        }
    };

    let mut text = String::new();
    for child in docx.document.children {
        if let DocumentChild::Paragraph(paragraph) = child {
            for pc in paragraph.children {
                if let ParagraphChild::Run(run) = pc {
                    for rc in run.children {
                        if let RunChild::Text(t) = rc {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            text.push('\n');
        }
    }
    text
}

/// Reads a text file permissively: undecodable bytes are replaced rather
/// than failing the upload.
fn extract_txt(path: &Path) -> String {
    match std::fs::read(path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            warn!("Error reading text file {}: {e}", path.display());
            String::new()
        }
    }
}
