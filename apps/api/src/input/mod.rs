//! Document inputs: the file-or-text choice for a single document slot.
//!
//! A slot holds at most one `InputSource` variant at a time. `InputCollector`
//! is the only way the HTTP surface mutates a slot, so the exclusivity
//! invariant lives in exactly one place.

use bytes::Bytes;
use serde::Serialize;

use crate::pipeline::PipelineError;

pub mod request;

pub use request::AnalysisRequest;

/// An uploaded document: raw bytes plus the metadata the remote extractor needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInput {
    #[serde(skip)]
    pub bytes: Bytes,
    pub filename: String,
    pub size: u64,
    pub mime_hint: Option<String>,
}

impl FileInput {
    pub fn new(bytes: Bytes, filename: impl Into<String>, mime_hint: Option<String>) -> Self {
        let size = bytes.len() as u64;
        Self {
            bytes,
            filename: filename.into(),
            size,
            mime_hint,
        }
    }

    /// Lowercased extension of the filename, without the dot.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.filename.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// Content of one document slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputSource {
    #[default]
    None,
    File(FileInput),
    Text { content: String },
}

impl InputSource {
    pub fn is_none(&self) -> bool {
        matches!(self, InputSource::None)
    }

    pub fn as_file(&self) -> Option<&FileInput> {
        match self {
            InputSource::File(file) => Some(file),
            _ => None,
        }
    }

    /// The pasted text, or `""` when the slot is not in text mode.
    pub fn text(&self) -> &str {
        match self {
            InputSource::Text { content } => content,
            _ => "",
        }
    }
}

/// Which variants a slot may reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Resumes: only `file` or `none`. Pasted text would lose the formatting
    /// the extractor relies on.
    FileOnly,
    FileOrText,
}

/// Which document a slot carries. Drives the accepted file extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Resume,
    JobDescription,
}

impl DocumentKind {
    pub fn accepted_extensions(self) -> &'static [&'static str] {
        match self {
            DocumentKind::Resume => &["pdf", "doc", "docx"],
            DocumentKind::JobDescription => &["pdf", "doc", "docx", "txt"],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Resume => "resume",
            DocumentKind::JobDescription => "job description",
        }
    }

    fn mode(self) -> InputMode {
        match self {
            DocumentKind::Resume => InputMode::FileOnly,
            DocumentKind::JobDescription => InputMode::FileOrText,
        }
    }
}

/// State holder for one document slot. Setting one variant replaces the other.
#[derive(Debug, Clone)]
pub struct InputCollector {
    kind: DocumentKind,
    source: InputSource,
}

impl InputCollector {
    pub fn new(kind: DocumentKind) -> Self {
        Self {
            kind,
            source: InputSource::None,
        }
    }

    pub fn resume() -> Self {
        Self::new(DocumentKind::Resume)
    }

    pub fn job_description() -> Self {
        Self::new(DocumentKind::JobDescription)
    }

    pub fn mode(&self) -> InputMode {
        self.kind.mode()
    }

    pub fn source(&self) -> &InputSource {
        &self.source
    }

    /// Selects a file, dropping any previously pasted text.
    pub fn set_file(&mut self, file: FileInput) {
        self.source = InputSource::File(file);
    }

    /// Selects pasted text, dropping any previously selected file.
    ///
    /// Rejected on file-only slots; the slot is left untouched in that case.
    pub fn set_text(&mut self, text: impl Into<String>) -> Result<(), PipelineError> {
        if self.mode() == InputMode::FileOnly {
            return Err(PipelineError::Validation(format!(
                "The {} must be uploaded as a file",
                self.kind.label()
            )));
        }
        self.source = InputSource::Text {
            content: text.into(),
        };
        Ok(())
    }

    pub fn clear(&mut self) {
        self.source = InputSource::None;
    }

    pub fn into_source(self) -> InputSource {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> FileInput {
        FileInput::new(
            Bytes::from_static(b"%PDF-1.4 fake"),
            name,
            Some("application/pdf".to_string()),
        )
    }

    #[test]
    fn test_new_collector_is_empty() {
        let collector = InputCollector::job_description();
        assert!(collector.source().is_none());
        assert_eq!(collector.source().text(), "");
    }

    #[test]
    fn test_set_file_after_text_clears_text() {
        let mut collector = InputCollector::job_description();
        collector.set_text("Seeking engineer").unwrap();
        collector.set_file(file("jd.pdf"));

        assert_eq!(collector.source().as_file().unwrap().filename, "jd.pdf");
        assert_eq!(collector.source().text(), "");
    }

    #[test]
    fn test_set_text_after_file_clears_file() {
        let mut collector = InputCollector::job_description();
        collector.set_file(file("jd.pdf"));
        collector.set_text("Seeking engineer").unwrap();

        assert!(collector.source().as_file().is_none());
        assert_eq!(collector.source().text(), "Seeking engineer");
    }

    #[test]
    fn test_exclusivity_holds_after_arbitrary_sequence() {
        let mut collector = InputCollector::job_description();
        for step in 0..12 {
            match step % 3 {
                0 => collector.set_file(file(&format!("jd{step}.txt"))),
                1 => collector.set_text(format!("text {step}")).unwrap(),
                _ => {
                    if step % 2 == 0 {
                        collector.clear();
                    }
                }
            }
            let source = collector.source();
            let has_file = source.as_file().is_some();
            let has_text = !source.text().is_empty();
            assert!(!(has_file && has_text), "slot holds both variants at step {step}");
        }
    }

    #[test]
    fn test_clear_resets_to_none() {
        let mut collector = InputCollector::job_description();
        collector.set_file(file("jd.pdf"));
        collector.clear();
        assert_eq!(collector.source(), &InputSource::None);
    }

    #[test]
    fn test_resume_slot_rejects_text() {
        let mut collector = InputCollector::resume();
        collector.set_file(file("cv.pdf"));

        let err = collector.set_text("my resume").unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
        // The previously selected file survives the rejected write
        assert_eq!(collector.source().as_file().unwrap().filename, "cv.pdf");
    }

    #[test]
    fn test_file_size_tracks_bytes() {
        let f = FileInput::new(Bytes::from(vec![0u8; 42]), "cv.docx", None);
        assert_eq!(f.size, 42);
    }

    #[test]
    fn test_extension_is_lowercased() {
        assert_eq!(file("CV.PDF").extension().as_deref(), Some("pdf"));
        assert_eq!(file("archive.tar.docx").extension().as_deref(), Some("docx"));
        assert_eq!(file("README").extension(), None);
        assert_eq!(file(".pdf").extension(), None);
    }
}
