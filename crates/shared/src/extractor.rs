use crate::error::{Result, SummaristError};
use crate::models::ContentSource;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File-format-specific procedure for turning a file into plain text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    Pdf,
    Word,
    PlainText,
}

impl ExtractionStrategy {
    /// Pick a strategy from the file extension (case-insensitive).
    pub fn for_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase());

        match ext.as_deref() {
            Some("pdf") => Ok(ExtractionStrategy::Pdf),
            Some("doc") | Some("docx") => Ok(ExtractionStrategy::Word),
            Some("txt") => Ok(ExtractionStrategy::PlainText),
            _ => Err(SummaristError::UnsupportedFormat { extension: ext }),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ContentExtractor;

impl ContentExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, source: &ContentSource) -> Result<String> {
        match source {
            ContentSource::Text(text) => {
                if text.trim().is_empty() {
                    return Err(SummaristError::Extraction(
                        "no text was entered".to_string(),
                    ));
                }
                Ok(text.clone())
            }
            ContentSource::File(path) => self.extract_file(path),
        }
    }

    pub fn extract_file(&self, path: &Path) -> Result<String> {
        // Resolve the strategy first so unsupported files are never touched
        let strategy = ExtractionStrategy::for_path(path)?;
        let bytes = read_bytes(path)?;

        let text = match strategy {
            ExtractionStrategy::Pdf => extract_pdf(&bytes)?,
            ExtractionStrategy::Word => extract_word(&bytes)?,
            ExtractionStrategy::PlainText => String::from_utf8(bytes).map_err(|e| {
                SummaristError::Extraction(format!("{} is not valid UTF-8: {}", path.display(), e))
            })?,
        };

        if text.trim().is_empty() {
            return Err(SummaristError::Extraction(format!(
                "no text found in {}",
                path.display()
            )));
        }

        tracing::debug!(
            "Extracted {} chars from {} ({:?})",
            text.len(),
            path.display(),
            strategy
        );

        Ok(text)
    }
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => SummaristError::FileNotFound(PathBuf::from(path)),
        _ => SummaristError::Read {
            path: PathBuf::from(path),
            source: e,
        },
    })
}

fn extract_pdf(bytes: &[u8]) -> Result<String> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| SummaristError::Extraction(format!("failed to parse PDF: {}", e)))?;
    Ok(clean_text(&text))
}

fn extract_word(bytes: &[u8]) -> Result<String> {
    let docx = docx_rs::read_docx(bytes)
        .map_err(|e| SummaristError::Extraction(format!("failed to parse Word document: {}", e)))?;

    let mut all_text = String::new();
    for child in &docx.document.children {
        collect_document_text(child, &mut all_text);
    }

    Ok(clean_text(&all_text))
}

fn collect_document_text(element: &docx_rs::DocumentChild, output: &mut String) {
    match element {
        docx_rs::DocumentChild::Paragraph(para) => {
            collect_paragraph_text(para, output);
            output.push('\n');
        }
        docx_rs::DocumentChild::Table(table) => {
            for row in &table.rows {
                let docx_rs::TableChild::TableRow(tr) = row;
                for cell in &tr.cells {
                    let docx_rs::TableRowChild::TableCell(tc) = cell;
                    for child in &tc.children {
                        if let docx_rs::TableCellContent::Paragraph(para) = child {
                            collect_paragraph_text(para, output);
                            output.push_str(" | ");
                        }
                    }
                }
                output.push('\n');
            }
        }
        _ => {}
    }
}

fn collect_paragraph_text(para: &docx_rs::Paragraph, output: &mut String) {
    for child in &para.children {
        match child {
            docx_rs::ParagraphChild::Run(run) => collect_run_text(run, output),
            docx_rs::ParagraphChild::Hyperlink(link) => {
                for linked in &link.children {
                    if let docx_rs::ParagraphChild::Run(run) = linked {
                        collect_run_text(run, output);
                    }
                }
            }
            _ => {}
        }
    }
}

fn collect_run_text(run: &docx_rs::Run, output: &mut String) {
    for run_child in &run.children {
        if let docx_rs::RunChild::Text(text) = run_child {
            output.push_str(&text.text);
        }
    }
}

/// Trim every line and drop the blank ones.
fn clean_text(text: &str) -> String {
    text.lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
