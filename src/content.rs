/// Formats the pipeline accepts. Anything else is rejected before
/// classification is attempted.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "txt"];

/// Extensions for which we hold actual text content rather than a filename
/// proxy.
const TEXT_EXTENSIONS: &[&str] = &["txt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Decoded text content.
    Text,
    /// Binary format: `text` holds the lowercased filename as a weak proxy,
    /// so filename-keyword matches still work.
    BinaryProxy,
}

#[derive(Debug, Clone)]
pub struct ExtractedContent {
    /// Normalized (lowercased) text.
    pub text: String,
    /// Lowercased filename suffix.
    pub extension: String,
    pub kind: FileKind,
}

impl ExtractedContent {
    pub fn is_text(&self) -> bool {
        self.kind == FileKind::Text
    }
}

#[derive(Debug, Clone)]
pub enum Extraction {
    Supported(ExtractedContent),
    Unsupported { extension: String },
}

pub fn file_extension(filename: &str) -> String {
    filename
        .rsplit('.')
        .next()
        .filter(|suffix| *suffix != filename)
        .unwrap_or_default()
        .to_lowercase()
}

/// Normalize an upload into lowercase text plus a file-kind tag.
///
/// Plain-text formats are decoded directly. Binary formats get no text
/// extraction; the lowercased filename stands in for the content. Unsupported
/// extensions short-circuit the whole pipeline.
pub fn extract(bytes: &[u8], filename: &str) -> Extraction {
    let extension = file_extension(filename);

    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Extraction::Unsupported { extension };
    }

    if TEXT_EXTENSIONS.contains(&extension.as_str()) {
        Extraction::Supported(ExtractedContent {
            text: String::from_utf8_lossy(bytes).to_lowercase(),
            extension,
            kind: FileKind::Text,
        })
    } else {
        Extraction::Supported(ExtractedContent {
            text: filename.to_lowercase(),
            extension,
            kind: FileKind::BinaryProxy,
        })
    }
}

pub fn unsupported_format_message() -> String {
    "Unsupported file format. Please upload PDF, DOC, DOCX, or TXT files.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("Balance 2023.PDF"), "pdf");
        assert_eq!(file_extension("archive.tar.gz"), "gz");
        assert_eq!(file_extension("no_extension"), "");
    }

    #[test]
    fn test_text_upload_is_decoded_and_lowercased() {
        let extraction = extract(b"Balance Sheet FOR 2023", "balance.txt");
        match extraction {
            Extraction::Supported(content) => {
                assert_eq!(content.kind, FileKind::Text);
                assert_eq!(content.text, "balance sheet for 2023");
            }
            Extraction::Unsupported { .. } => panic!("txt must be supported"),
        }
    }

    #[test]
    fn test_binary_upload_falls_back_to_filename() {
        let extraction = extract(&[0xff, 0xd8], "DICOSE Registro 2023.pdf");
        match extraction {
            Extraction::Supported(content) => {
                assert_eq!(content.kind, FileKind::BinaryProxy);
                assert_eq!(content.text, "dicose registro 2023.pdf");
            }
            Extraction::Unsupported { .. } => panic!("pdf must be supported"),
        }
    }

    #[test]
    fn test_unsupported_extension_short_circuits() {
        match extract(b"MZ", "malware.exe") {
            Extraction::Unsupported { extension } => assert_eq!(extension, "exe"),
            Extraction::Supported(_) => panic!("exe must not be supported"),
        }
    }
}
