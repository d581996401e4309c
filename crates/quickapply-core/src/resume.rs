use quick_xml::events::Event;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::Reader;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResumeError {
    #[error("Unsupported resume format '{0}'. Please use .pdf, .docx, or .txt")]
    UnsupportedFormat(String),

    #[error("Failed to parse resume {path}: {source}")]
    ParseFailure {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ResumeError {
    fn parse(path: &Path, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        ResumeError::ParseFailure {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }
}

/// Resume file formats with a text extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeFormat {
    Pdf,
    Docx,
    Txt,
}

impl ResumeFormat {
    /// Detect the format from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self, ResumeError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "pdf" => Ok(ResumeFormat::Pdf),
            "docx" => Ok(ResumeFormat::Docx),
            "txt" => Ok(ResumeFormat::Txt),
            _ => Err(ResumeError::UnsupportedFormat(
                path.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.display().to_string()),
            )),
        }
    }
}

/// Extract plain text from a resume file
pub fn load(path: &Path) -> Result<String, ResumeError> {
    let format = ResumeFormat::from_path(path)?;
    tracing::debug!("Loading {:?} resume from {}", format, path.display());

    let text = match format {
        ResumeFormat::Pdf => load_pdf(path)?,
        ResumeFormat::Docx => load_docx(path)?,
        ResumeFormat::Txt => {
            std::fs::read_to_string(path).map_err(|e| ResumeError::parse(path, e))?
        }
    };

    tracing::debug!("Resume loaded: {} characters", text.len());
    Ok(text)
}

fn load_pdf(path: &Path) -> Result<String, ResumeError> {
    let text = pdf_extract::extract_text(path).map_err(|e| ResumeError::parse(path, e.to_string()))?;
    Ok(text.trim().to_string())
}

fn load_docx(path: &Path) -> Result<String, ResumeError> {
    let file = std::fs::File::open(path).map_err(|e| ResumeError::parse(path, e))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| ResumeError::parse(path, e))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ResumeError::parse(path, e))?
        .read_to_string(&mut xml)
        .map_err(|e| ResumeError::parse(path, e))?;

    document_text(&xml).map_err(|e| ResumeError::parse(path, e))
}

/// Paragraph texts of a WordprocessingML body, joined by single spaces
fn document_text(xml: &str) -> Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(e) if e.name().as_ref() == b"w:t" => in_text = false,
            Event::End(e) if e.name().as_ref() == b"w:p" => {
                paragraphs.push(std::mem::take(&mut current));
            }
            Event::Text(t) if in_text => {
                current.push_str(&String::from_utf8_lossy(&t));
            }
            Event::GeneralRef(r) if in_text => {
                if let Some(c) = r.resolve_char_ref()? {
                    current.push(c);
                } else {
                    let name = String::from_utf8_lossy(&r);
                    if let Some(resolved) = resolve_predefined_entity(&name) {
                        current.push_str(resolved);
                    }
                }
            }
            Event::Empty(e) if e.name().as_ref() == b"w:tab" => current.push('\t'),
            Event::Empty(e) if matches!(e.name().as_ref(), b"w:br" | b"w:cr") => {
                current.push('\n');
            }
            Event::Eof => break,
            _ => {}
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }

    Ok(paragraphs.join(" "))
}
