// Public modules
pub mod config;
pub mod error;
pub mod extractor;
pub mod insights;
pub mod models;
pub mod notifier;
pub mod session;
pub mod summarizer;
pub mod writer;

// Re-export commonly used types
pub use config::{Config, MailSettings};
pub use error::{Result, SummaristError};
pub use extractor::{ContentExtractor, ExtractionStrategy};
pub use insights::{
    AfinnScorer, InsightReporter, KeywordExtractor, RakeKeywordExtractor, SentimentScore,
    SentimentScorer,
};
pub use models::{
    ContentSource, FormatSelection, InsightReport, OutgoingMail, OutputFormat, OutputRequest,
    SentimentLabel, SummaryDocument,
};
pub use notifier::{MailSender, Notifier, SmtpMailer};
pub use session::{Services, Session, SessionState};
pub use summarizer::{GeminiSummarizer, GenerationConfig, TextGenerator};
pub use writer::{DocumentWriter, OutputWriter, SaveOutcome};
