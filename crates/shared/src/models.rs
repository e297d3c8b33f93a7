use chrono::{DateTime, Local};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Base name of every file the summarizer writes
pub const OUTPUT_FILENAME_BASE: &str = "summary_output";

/// Where the text to summarize comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    Text(String),
    File(PathBuf),
}

impl ContentSource {
    pub fn is_file(&self) -> bool {
        matches!(self, ContentSource::File(_))
    }
}

/// Overall tone of a summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Classify a comparative (per-word) sentiment score.
    pub fn from_comparative(comparative: f32) -> Self {
        if comparative > 0.0 {
            SentimentLabel::Positive
        } else if comparative < 0.0 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "Positive"),
            SentimentLabel::Negative => write!(f, "Negative"),
            SentimentLabel::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Sentiment and keyword insights derived from a generated summary
#[derive(Debug, Clone, PartialEq)]
pub struct InsightReport {
    pub word_count: usize,
    pub score: i32,
    pub comparative: f32,
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    pub overall_sentiment: SentimentLabel,
    pub keywords: Vec<String>,
}

impl InsightReport {
    /// Labelled insight fields, in display order.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Summary Word Count", self.word_count.to_string()),
            ("Sentiment Score", self.score.to_string()),
            ("Positive Words", self.positive.join(", ")),
            ("Negative Words", self.negative.join(", ")),
            ("Overall Sentiment", self.overall_sentiment.to_string()),
            ("Keywords", self.keywords.join(", ")),
        ]
    }
}

/// A summary plus its insights, ready to be rendered to disk
#[derive(Debug, Clone)]
pub struct SummaryDocument {
    pub summary: String,
    pub insights: InsightReport,
    pub generated_at: DateTime<Local>,
}

impl SummaryDocument {
    pub fn new(summary: impl Into<String>, insights: InsightReport) -> Self {
        Self {
            summary: summary.into(),
            insights,
            generated_at: Local::now(),
        }
    }
}

/// A single file format the output writer can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Text,
    Pdf,
    Doc,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Doc => "doc",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text/plain",
            OutputFormat::Pdf => "application/pdf",
            OutputFormat::Doc => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "txt" => Some(OutputFormat::Text),
            "pdf" => Some(OutputFormat::Pdf),
            "doc" | "docx" => Some(OutputFormat::Doc),
            _ => None,
        }
    }
}

/// The format answer given at the save prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatSelection {
    Txt,
    Pdf,
    Doc,
    All,
}

impl FormatSelection {
    pub fn formats(&self) -> Vec<OutputFormat> {
        match self {
            FormatSelection::Txt => vec![OutputFormat::Text],
            FormatSelection::Pdf => vec![OutputFormat::Pdf],
            FormatSelection::Doc => vec![OutputFormat::Doc],
            FormatSelection::All => vec![OutputFormat::Text, OutputFormat::Pdf, OutputFormat::Doc],
        }
    }
}

impl FromStr for FormatSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "txt" | "text" => Ok(FormatSelection::Txt),
            "pdf" => Ok(FormatSelection::Pdf),
            "doc" | "docx" => Ok(FormatSelection::Doc),
            "all" => Ok(FormatSelection::All),
            other => Err(format!("Unknown output format: '{}'", other)),
        }
    }
}

/// One save operation: which formats, under which base filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRequest {
    pub selection: FormatSelection,
    pub filename_base: String,
}

impl OutputRequest {
    pub fn new(selection: FormatSelection) -> Self {
        Self {
            selection,
            filename_base: OUTPUT_FILENAME_BASE.to_string(),
        }
    }

    pub fn filename(&self, format: OutputFormat) -> String {
        format!("{}.{}", self.filename_base, format.extension())
    }
}

/// A mail carrying one written summary file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachment: PathBuf,
}
