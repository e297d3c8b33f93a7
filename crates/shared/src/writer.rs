use crate::error::{Result, SummaristError};
use crate::models::{OutputFormat, OutputRequest, SummaryDocument};
use std::fs;
use std::path::{Path, PathBuf};

/// Renders a `SummaryDocument` into one file format
pub trait DocumentWriter: Send + Sync {
    fn format(&self) -> OutputFormat;
    fn write(&self, doc: &SummaryDocument, path: &Path) -> Result<()>;
}

/// Result of writing one format during a save
#[derive(Debug)]
pub struct SaveOutcome {
    pub format: OutputFormat,
    pub result: Result<PathBuf>,
}

impl SaveOutcome {
    pub fn path(&self) -> Option<&Path> {
        self.result.as_ref().ok().map(PathBuf::as_path)
    }
}

pub struct OutputWriter {
    output_dir: PathBuf,
    writers: Vec<Box<dyn DocumentWriter>>,
}

impl OutputWriter {
    /// Writer with the built-in text, PDF and Word renderers.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self::with_writers(
            output_dir,
            vec![
                Box::new(TextDocumentWriter),
                Box::new(PdfDocumentWriter),
                Box::new(WordDocumentWriter),
            ],
        )
    }

    pub fn with_writers(
        output_dir: impl Into<PathBuf>,
        writers: Vec<Box<dyn DocumentWriter>>,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            writers,
        }
    }

    /// Write every requested format. Each format succeeds or fails on its
    /// own; files already written are kept when a later format fails.
    pub fn save(&self, request: &OutputRequest, doc: &SummaryDocument) -> Vec<SaveOutcome> {
        request
            .selection
            .formats()
            .into_iter()
            .map(|format| {
                let path = self.output_dir.join(request.filename(format));
                let result = self.write_one(format, doc, &path).map(|_| path);
                match &result {
                    Ok(path) => tracing::info!("Saved {:?} summary to {}", format, path.display()),
                    Err(e) => tracing::warn!("Failed to save {:?} summary: {}", format, e),
                }
                SaveOutcome { format, result }
            })
            .collect()
    }

    fn write_one(&self, format: OutputFormat, doc: &SummaryDocument, path: &Path) -> Result<()> {
        let writer = self
            .writers
            .iter()
            .find(|w| w.format() == format)
            .ok_or_else(|| SummaristError::Write {
                path: path.to_path_buf(),
                message: format!("no writer registered for .{}", format.extension()),
            })?;
        writer.write(doc, path)
    }
}

fn write_error(path: &Path, e: impl std::fmt::Display) -> SummaristError {
    SummaristError::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

fn timestamp_line(doc: &SummaryDocument) -> String {
    format!(
        "Generated by Summarist on {}",
        doc.generated_at.format("%Y-%m-%d %H:%M")
    )
}

// ==================== Plain Text ====================

pub struct TextDocumentWriter;

impl TextDocumentWriter {
    pub fn render(doc: &SummaryDocument) -> String {
        let mut content = String::new();

        content.push_str(&timestamp_line(doc));
        content.push_str("\n\nSummary:\n");
        content.push_str(doc.summary.trim());
        content.push_str("\n\nInsights:\n");
        for (label, value) in doc.insights.fields() {
            content.push_str(&format!("- {}: {}\n", label, value));
        }

        content
    }
}

impl DocumentWriter for TextDocumentWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Text
    }

    fn write(&self, doc: &SummaryDocument, path: &Path) -> Result<()> {
        fs::write(path, Self::render(doc)).map_err(|e| write_error(path, e))
    }
}

// ==================== PDF ====================

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 56;
const BODY_SIZE: i64 = 10;
const BODY_LEADING: i64 = 14;
const HEADING_SIZE: i64 = 14;
const HEADING_LEADING: i64 = 22;
/// Courier advance is 0.6em, so 80 columns fit between the margins at 10pt
const BODY_COLUMNS: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineStyle {
    Heading,
    Body,
    Blank,
}

#[derive(Debug, Clone, PartialEq)]
struct PdfLine {
    style: LineStyle,
    text: String,
}

impl PdfLine {
    fn heading(text: &str) -> Self {
        Self {
            style: LineStyle::Heading,
            text: text.to_string(),
        }
    }

    fn body(text: String) -> Self {
        Self {
            style: LineStyle::Body,
            text,
        }
    }

    fn blank() -> Self {
        Self {
            style: LineStyle::Blank,
            text: String::new(),
        }
    }

    fn leading(&self) -> i64 {
        match self.style {
            LineStyle::Heading => HEADING_LEADING,
            LineStyle::Body | LineStyle::Blank => BODY_LEADING,
        }
    }
}

pub struct PdfDocumentWriter;

impl PdfDocumentWriter {
    fn layout(doc: &SummaryDocument) -> Vec<PdfLine> {
        let mut lines = vec![PdfLine::body(timestamp_line(doc)), PdfLine::blank()];

        lines.push(PdfLine::heading("Summary:"));
        for paragraph in doc.summary.trim().lines() {
            if paragraph.trim().is_empty() {
                lines.push(PdfLine::blank());
                continue;
            }
            for wrapped in wrap_line(&fold_to_ascii(paragraph), BODY_COLUMNS) {
                lines.push(PdfLine::body(wrapped));
            }
        }

        lines.push(PdfLine::blank());
        lines.push(PdfLine::heading("Insights:"));
        for (label, value) in doc.insights.fields() {
            let item = fold_to_ascii(&format!("- {}: {}", label, value));
            for wrapped in wrap_line(&item, BODY_COLUMNS) {
                lines.push(PdfLine::body(wrapped));
            }
        }

        lines
    }

    fn paginate(lines: Vec<PdfLine>) -> Vec<Vec<(PdfLine, i64)>> {
        let mut pages = Vec::new();
        let mut current = Vec::new();
        let mut y = PAGE_HEIGHT - MARGIN;

        for line in lines {
            let leading = line.leading();
            if y - leading < MARGIN && !current.is_empty() {
                pages.push(std::mem::take(&mut current));
                y = PAGE_HEIGHT - MARGIN;
            }
            y -= leading;
            current.push((line, y));
        }

        if !current.is_empty() {
            pages.push(current);
        }
        pages
    }

    fn page_operations(page: &[(PdfLine, i64)]) -> Vec<lopdf::content::Operation> {
        use lopdf::content::Operation;
        use lopdf::Object;

        let mut ops = vec![Operation::new("BT", vec![])];
        let mut underlines = Vec::new();

        for (line, y) in page {
            let (font, size) = match line.style {
                LineStyle::Blank => continue,
                LineStyle::Heading => ("F2", HEADING_SIZE),
                LineStyle::Body => ("F1", BODY_SIZE),
            };
            ops.push(Operation::new("Tf", vec![font.into(), size.into()]));
            ops.push(Operation::new(
                "Tm",
                vec![
                    1i64.into(),
                    0i64.into(),
                    0i64.into(),
                    1i64.into(),
                    MARGIN.into(),
                    (*y).into(),
                ],
            ));
            ops.push(Operation::new(
                "Tj",
                vec![Object::string_literal(line.text.as_str())],
            ));

            if line.style == LineStyle::Heading {
                // 0.6em per Courier glyph
                let width = (line.text.len() as i64 * HEADING_SIZE * 3) / 5;
                underlines.push((*y - 3, width));
            }
        }
        ops.push(Operation::new("ET", vec![]));

        for (y, width) in underlines {
            ops.push(Operation::new("m", vec![MARGIN.into(), y.into()]));
            ops.push(Operation::new("l", vec![(MARGIN + width).into(), y.into()]));
            ops.push(Operation::new("S", vec![]));
        }

        ops
    }

    pub fn render(doc: &SummaryDocument) -> std::result::Result<lopdf::Document, String> {
        use lopdf::content::Content;
        use lopdf::{dictionary, Document, Object, Stream};

        let mut pdf = Document::with_version("1.5");
        let pages_id = pdf.new_object_id();

        let body_font = pdf.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let heading_font = pdf.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier-Bold",
        });
        let resources_id = pdf.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => body_font,
                "F2" => heading_font,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for page in Self::paginate(Self::layout(doc)) {
            let content = Content {
                operations: Self::page_operations(&page),
            };
            let encoded = content.encode().map_err(|e| e.to_string())?;
            let content_id = pdf.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = pdf.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let page_count = kids.len() as i64;
        pdf.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            }),
        );

        let catalog_id = pdf.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        pdf.trailer.set("Root", catalog_id);
        pdf.compress();

        Ok(pdf)
    }
}

impl DocumentWriter for PdfDocumentWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Pdf
    }

    fn write(&self, doc: &SummaryDocument, path: &Path) -> Result<()> {
        let mut pdf = Self::render(doc).map_err(|e| write_error(path, e))?;
        pdf.save(path).map_err(|e| write_error(path, e))?;
        Ok(())
    }
}

/// Greedy word wrap; words longer than `width` are split.
fn wrap_line(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word.to_string();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            lines.push(word);
            word = rest;
        }

        if current.is_empty() {
            current = word;
        } else if current.len() + 1 + word.len() <= width {
            current.push(' ');
            current.push_str(&word);
        } else {
            lines.push(std::mem::replace(&mut current, word));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// The standard Type1 fonts only cover Latin text; fold common typographic
/// punctuation and replace everything else outside ASCII.
fn fold_to_ascii(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201B}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201F}' => '"',
            '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
            '\u{2022}' | '\u{00B7}' => '*',
            '\u{00A0}' | '\t' => ' ',
            c if c.is_ascii() => c,
            _ => '?',
        })
        .collect()
}

// ==================== Word ====================

/// Writes a WordprocessingML package. The `.doc` name is kept for
/// compatibility; Word detects the format from the content.
pub struct WordDocumentWriter;

impl WordDocumentWriter {
    pub fn render(doc: &SummaryDocument) -> docx_rs::Docx {
        use docx_rs::{Docx, Paragraph, Run};

        let heading = |text: &str| {
            Paragraph::new().add_run(Run::new().add_text(text).bold().size(32).underline("single"))
        };
        let body = |text: &str| Paragraph::new().add_run(Run::new().add_text(text).size(24));

        let mut docx = Docx::new()
            .add_paragraph(body(&timestamp_line(doc)))
            .add_paragraph(heading("Summary:"));

        for paragraph in doc.summary.trim().lines() {
            docx = docx.add_paragraph(body(paragraph.trim()));
        }

        docx = docx.add_paragraph(heading("Insights:"));
        for (label, value) in doc.insights.fields() {
            docx = docx.add_paragraph(body(&format!("- {}: {}", label, value)));
        }

        docx
    }
}

impl DocumentWriter for WordDocumentWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Doc
    }

    fn write(&self, doc: &SummaryDocument, path: &Path) -> Result<()> {
        let file = fs::File::create(path).map_err(|e| write_error(path, e))?;
        Self::render(doc)
            .build()
            .pack(file)
            .map_err(|e| write_error(path, e))
    }
}
