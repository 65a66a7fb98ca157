//! Uploaded job descriptions. Only plain text is accepted; document formats are
//! rejected outright, never partially read.

use thiserror::Error;

use crate::errors::AppError;

const TEXT_EXTENSIONS: &[&str] = &["txt", "text", "md"];
const TEXT_CONTENT_TYPES: &[&str] = &["text/plain", "text/markdown"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("{0} files are not supported. Paste the text or upload a .txt file instead.")]
    UnsupportedDocument(&'static str),

    #[error("Unsupported file type '{0}'. Upload a plain-text (.txt) file.")]
    UnsupportedType(String),

    #[error("The uploaded file is not valid UTF-8 text.")]
    NotUtf8,
}

impl From<UploadError> for AppError {
    fn from(e: UploadError) -> Self {
        AppError::UnsupportedFormat(e.to_string())
    }
}

fn extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    (!stem.is_empty()).then(|| ext.to_ascii_lowercase())
}

/// Names the document format when the upload is a known non-text document.
fn document_kind(filename: Option<&str>, content_type: Option<&str>, bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"%PDF-") {
        return Some("PDF");
    }
    // DOCX is a ZIP container; legacy DOC is an OLE compound file.
    if bytes.starts_with(b"PK\x03\x04") || bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0]) {
        return Some("Word (DOC/DOCX)");
    }
    match filename.and_then(extension).as_deref() {
        Some("pdf") => return Some("PDF"),
        Some("doc" | "docx") => return Some("Word (DOC/DOCX)"),
        _ => {}
    }
    match content_type.map(essence).as_deref() {
        Some("application/pdf") => Some("PDF"),
        Some(
            "application/msword"
            | "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ) => Some("Word (DOC/DOCX)"),
        _ => None,
    }
}

/// Media type without parameters, lowercased.
fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Validates an uploaded file and returns its text.
///
/// Accepted when the extension is `.txt`/`.text`/`.md`, or when there is no
/// extension and the content type is plain text or markdown. A UTF-8 byte-order
/// mark is dropped.
pub fn read_text_upload(
    filename: Option<&str>,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<String, UploadError> {
    if let Some(kind) = document_kind(filename, content_type, bytes) {
        return Err(UploadError::UnsupportedDocument(kind));
    }

    let accepted = match filename.and_then(extension) {
        Some(ext) => TEXT_EXTENSIONS.contains(&ext.as_str()),
        None => content_type
            .map(essence)
            .is_some_and(|ct| TEXT_CONTENT_TYPES.contains(&ct.as_str())),
    };
    if !accepted {
        let descriptor = filename
            .or(content_type)
            .unwrap_or("unknown")
            .to_string();
        return Err(UploadError::UnsupportedType(descriptor));
    }

    let text = std::str::from_utf8(bytes).map_err(|_| UploadError::NotUtf8)?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_file_accepted() {
        let text = read_text_upload(Some("jd.txt"), Some("text/plain"), b"Rust engineer").unwrap();
        assert_eq!(text, "Rust engineer");
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert!(read_text_upload(Some("JD.TXT"), None, b"Rust").is_ok());
        assert!(read_text_upload(Some("notes.md"), None, b"Rust").is_ok());
    }

    #[test]
    fn test_content_type_used_without_extension() {
        assert!(read_text_upload(Some("jd"), Some("text/plain; charset=utf-8"), b"Rust").is_ok());
        assert!(read_text_upload(None, Some("application/json"), b"{}").is_err());
    }

    #[test]
    fn test_pdf_rejected_by_extension() {
        assert_eq!(
            read_text_upload(Some("jd.pdf"), None, b"whatever"),
            Err(UploadError::UnsupportedDocument("PDF"))
        );
    }

    #[test]
    fn test_pdf_rejected_by_magic_even_if_named_txt() {
        assert_eq!(
            read_text_upload(Some("jd.txt"), Some("text/plain"), b"%PDF-1.7\n..."),
            Err(UploadError::UnsupportedDocument("PDF"))
        );
    }

    #[test]
    fn test_docx_rejected() {
        assert_eq!(
            read_text_upload(Some("jd.docx"), None, b"PK\x03\x04rest"),
            Err(UploadError::UnsupportedDocument("Word (DOC/DOCX)"))
        );
        assert_eq!(
            read_text_upload(
                None,
                Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
                b"x"
            ),
            Err(UploadError::UnsupportedDocument("Word (DOC/DOCX)"))
        );
    }

    #[test]
    fn test_other_extension_rejected() {
        assert_eq!(
            read_text_upload(Some("jd.rtf"), Some("text/plain"), b"{\\rtf1}"),
            Err(UploadError::UnsupportedType("jd.rtf".to_string()))
        );
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        assert_eq!(
            read_text_upload(Some("jd.txt"), None, &[0x66, 0xff, 0xfe, 0x67]),
            Err(UploadError::NotUtf8)
        );
    }

    #[test]
    fn test_bom_is_stripped() {
        let text = read_text_upload(Some("jd.txt"), None, b"\xEF\xBB\xBFRust").unwrap();
        assert_eq!(text, "Rust");
    }

    #[test]
    fn test_hidden_file_without_extension_uses_content_type() {
        assert!(read_text_upload(Some(".profile"), Some("text/plain"), b"Rust").is_ok());
    }

    #[test]
    fn test_upload_error_maps_to_unsupported_format() {
        let err: AppError = UploadError::UnsupportedDocument("PDF").into();
        assert!(matches!(err, AppError::UnsupportedFormat(ref m) if m.starts_with("PDF files")));
    }
}
