//! Error types shared by every component of the summarizer.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SummaristError {
    /// A required setting is missing or invalid. Fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported file format{}. Please provide a PDF, DOC/DOCX, or TXT file.", format_extension(.extension))]
    UnsupportedFormat { extension: Option<String> },

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to extract text: {0}")]
    Extraction(String),

    #[error("Failed to generate summary: {0}")]
    Generation(String),

    #[error("Failed to write {}: {message}", .path.display())]
    Write { path: PathBuf, message: String },

    /// Mail credentials are missing or were rejected by the server
    #[error("Email authentication failed: {0}")]
    Auth(String),

    #[error("Email delivery failed: {0}")]
    Delivery(String),

    #[error("Console I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_extension(extension: &Option<String>) -> String {
    match extension {
        Some(ext) => format!(" '.{}'", ext),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, SummaristError>;
