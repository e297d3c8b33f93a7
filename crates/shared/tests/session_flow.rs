//! End-to-end tests of the interactive session with substituted services.

use async_trait::async_trait;
use shared::{
    ContentExtractor, InsightReporter, KeywordExtractor, MailSender, Notifier, OutgoingMail,
    OutputFormat, OutputWriter, Result, SentimentLabel, SentimentScore, SentimentScorer,
    Services, Session, SessionState, SummaristError, TextGenerator,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const SUMMARY: &str = "The launch was a great success and customers love the new design.";

// ==================== Fakes ====================

#[derive(Clone, Default)]
struct FakeGenerator {
    reply: Option<String>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl FakeGenerator {
    fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            prompts: Arc::default(),
        }
    }

    fn failing() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply
            .clone()
            .ok_or_else(|| SummaristError::Generation("network unreachable".to_string()))
    }
}

struct PositiveScorer;

impl SentimentScorer for PositiveScorer {
    fn score(&self, _text: &str) -> SentimentScore {
        SentimentScore {
            score: 6,
            comparative: 0.5,
            positive: vec!["great".to_string(), "love".to_string()],
            negative: vec![],
        }
    }
}

struct FixedKeywords;

impl KeywordExtractor for FixedKeywords {
    fn extract(&self, _text: &str) -> Vec<String> {
        vec!["launch".to_string(), "new design".to_string()]
    }
}

#[derive(Clone, Default)]
struct RecordingMailer {
    sent: Arc<Mutex<Vec<OutgoingMail>>>,
}

#[async_trait]
impl MailSender for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

struct FailingMailer;

#[async_trait]
impl MailSender for FailingMailer {
    async fn send(&self, _mail: &OutgoingMail) -> Result<()> {
        Err(SummaristError::Delivery("connection refused".to_string()))
    }
}

fn services(generator: FakeGenerator, mailer: Box<dyn MailSender>, dir: &Path) -> Services {
    Services {
        extractor: ContentExtractor::new(),
        generator: Box::new(generator),
        insights: InsightReporter::new(Box::new(PositiveScorer), Box::new(FixedKeywords)),
        writer: OutputWriter::new(dir),
        notifier: Notifier::new(mailer),
    }
}

fn started(services: Services) -> Session<Vec<u8>> {
    let mut session = Session::new(services, Vec::new());
    session.start().unwrap();
    session
}

fn transcript(session: &Session<Vec<u8>>) -> String {
    String::from_utf8_lossy(session.output()).to_string()
}

async fn feed(session: &mut Session<Vec<u8>>, lines: &[&str]) -> SessionState {
    let mut state = session.state();
    for line in lines {
        state = session.handle_line(line).await.unwrap();
    }
    state
}

// ==================== Menu Tests ====================

#[tokio::test]
async fn test_start_shows_menu() {
    let dir = tempfile::tempdir().unwrap();
    let session = started(services(
        FakeGenerator::replying(SUMMARY),
        Box::new(RecordingMailer::default()),
        dir.path(),
    ));

    let out = transcript(&session);
    assert_eq!(session.state(), SessionState::MainMenu);
    assert!(out.contains("1. Summarize text"));
    assert!(out.contains("2. Summarize a file"));
    assert!(out.contains("3. Help"));
    assert!(out.contains("4. Exit"));
}

#[tokio::test]
async fn test_invalid_menu_choice_keeps_main_menu() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = started(services(
        FakeGenerator::replying(SUMMARY),
        Box::new(RecordingMailer::default()),
        dir.path(),
    ));

    let state = feed(&mut session, &["5"]).await;

    assert_eq!(state, SessionState::MainMenu);
    assert!(transcript(&session).contains("Invalid choice, please select again."));
    assert!(session.last_summary().is_none());
    assert!(session.last_report().is_none());
}

#[tokio::test]
async fn test_invalid_menu_choice_keeps_previous_summary() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = started(services(
        FakeGenerator::replying(SUMMARY),
        Box::new(RecordingMailer::default()),
        dir.path(),
    ));

    feed(&mut session, &["1", "Some text", "no", "yes"]).await;
    assert_eq!(session.state(), SessionState::MainMenu);

    let state = feed(&mut session, &["5"]).await;
    assert_eq!(state, SessionState::MainMenu);
    assert_eq!(session.last_summary(), Some(SUMMARY));
    assert!(session.last_report().is_some());
}

#[tokio::test]
async fn test_only_explicit_exit_leaves_main_menu() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = started(services(
        FakeGenerator::replying(SUMMARY),
        Box::new(RecordingMailer::default()),
        dir.path(),
    ));

    for line in ["", "0", "5", "exit", "quit", "no", "q", " 44 "] {
        let state = session.handle_line(line).await.unwrap();
        assert_eq!(state, SessionState::MainMenu, "input {:?} left the menu", line);
        assert!(!session.is_finished());
    }

    let state = feed(&mut session, &[" 4 "]).await;
    assert_eq!(state, SessionState::Exiting);
    assert!(session.is_finished());
    assert!(transcript(&session).contains("Thank you for using Summarist CLI"));
}

#[tokio::test]
async fn test_input_after_exit_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = started(services(
        FakeGenerator::replying(SUMMARY),
        Box::new(RecordingMailer::default()),
        dir.path(),
    ));

    feed(&mut session, &["4"]).await;
    let before = transcript(&session);

    let state = feed(&mut session, &["1", "yes"]).await;
    assert_eq!(state, SessionState::Exiting);
    assert_eq!(transcript(&session), before);
}

#[tokio::test]
async fn test_help_then_return_to_menu() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = started(services(
        FakeGenerator::replying(SUMMARY),
        Box::new(RecordingMailer::default()),
        dir.path(),
    ));

    let state = feed(&mut session, &["3"]).await;
    assert_eq!(state, SessionState::AwaitingReturnDecision);
    assert!(transcript(&session).contains("Here's how to use it"));

    let state = feed(&mut session, &["YES"]).await;
    assert_eq!(state, SessionState::MainMenu);
}

#[tokio::test]
async fn test_declining_return_exits() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = started(services(
        FakeGenerator::replying(SUMMARY),
        Box::new(RecordingMailer::default()),
        dir.path(),
    ));

    let state = feed(&mut session, &["3", "no"]).await;
    assert_eq!(state, SessionState::Exiting);
}

// ==================== Summarize Tests ====================

#[tokio::test]
async fn test_summarize_text_shows_summary_and_insights() {
    let dir = tempfile::tempdir().unwrap();
    let generator = FakeGenerator::replying(SUMMARY);
    let mut session = started(services(
        generator.clone(),
        Box::new(RecordingMailer::default()),
        dir.path(),
    ));

    let state = feed(&mut session, &["1", "Quarterly results were strong."]).await;

    assert_eq!(state, SessionState::AwaitingSaveDecision);
    assert_eq!(session.last_summary(), Some(SUMMARY));

    let report = session.last_report().unwrap();
    assert_eq!(report.overall_sentiment, SentimentLabel::Positive);
    assert_eq!(report.keywords, vec!["launch", "new design"]);

    let out = transcript(&session);
    assert!(out.contains("Summary Generated"));
    assert!(out.contains(SUMMARY));
    assert!(out.contains("Sentiment Score: 6"));
    assert!(out.contains("Positive Words: great, love"));
    assert!(out.contains("Overall Sentiment: Positive"));
    assert!(out.contains("Keywords: launch, new design"));

    let prompts = generator.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert_eq!(
        prompts[0],
        "Summarize the following text:\n\nQuarterly results were strong."
    );
}

#[tokio::test]
async fn test_summarize_file_uses_file_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.TXT");
    std::fs::write(&input, "Meeting notes about the product roadmap.").unwrap();

    let generator = FakeGenerator::replying(SUMMARY);
    let mut session = started(services(
        generator.clone(),
        Box::new(RecordingMailer::default()),
        dir.path(),
    ));

    let quoted = format!("'{}'", input.display());
    let state = feed(&mut session, &["2", quoted.as_str()]).await;

    assert_eq!(state, SessionState::AwaitingSaveDecision);
    assert!(transcript(&session).contains("Extracting text from the file"));
    let prompts = generator.prompts.lock().unwrap();
    assert!(prompts[0].starts_with("Summarize the following content extracted from a file:"));
    assert!(prompts[0].contains("product roadmap"));
}

#[tokio::test]
async fn test_unsupported_file_returns_to_menu_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let generator = FakeGenerator::replying(SUMMARY);
    let mut session = started(services(
        generator.clone(),
        Box::new(RecordingMailer::default()),
        dir.path(),
    ));

    let state = feed(&mut session, &["2", "spreadsheet.xlsx"]).await;

    assert_eq!(state, SessionState::AwaitingReturnDecision);
    assert!(transcript(&session).contains("Unsupported file format"));
    assert!(generator.prompts.lock().unwrap().is_empty());
    assert!(session.last_summary().is_none());
}

#[tokio::test]
async fn test_missing_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = started(services(
        FakeGenerator::replying(SUMMARY),
        Box::new(RecordingMailer::default()),
        dir.path(),
    ));

    let missing = dir.path().join("missing.pdf");
    let state = feed(&mut session, &["2", missing.to_str().unwrap()]).await;

    assert_eq!(state, SessionState::AwaitingReturnDecision);
    assert!(transcript(&session).contains("File not found"));
}

#[tokio::test]
async fn test_generation_failure_returns_to_menu_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = started(services(
        FakeGenerator::failing(),
        Box::new(RecordingMailer::default()),
        dir.path(),
    ));

    let state = feed(&mut session, &["1", "Some text"]).await;

    assert_eq!(state, SessionState::AwaitingReturnDecision);
    let out = transcript(&session);
    assert!(out.contains("Error while summarizing"));
    assert!(out.contains("network unreachable"));
    assert!(session.last_summary().is_none());

    let state = feed(&mut session, &["yes"]).await;
    assert_eq!(state, SessionState::MainMenu);
}

// ==================== Save Tests ====================

#[tokio::test]
async fn test_declining_save_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = started(services(
        FakeGenerator::replying(SUMMARY),
        Box::new(RecordingMailer::default()),
        dir.path(),
    ));

    let state = feed(&mut session, &["1", "Some text", "no"]).await;

    assert_eq!(state, SessionState::AwaitingReturnDecision);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_unknown_format_reprompts() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = started(services(
        FakeGenerator::replying(SUMMARY),
        Box::new(RecordingMailer::default()),
        dir.path(),
    ));

    let state = feed(&mut session, &["1", "Some text", "Yes", "xml"]).await;

    assert_eq!(state, SessionState::AwaitingFormat);
    assert!(transcript(&session).contains("Unknown output format"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_save_single_format_then_skip_email() {
    let dir = tempfile::tempdir().unwrap();
    let mailer = RecordingMailer::default();
    let mut session = started(services(
        FakeGenerator::replying(SUMMARY),
        Box::new(mailer.clone()),
        dir.path(),
    ));

    let state = feed(&mut session, &["1", "Some text", "yes", "TXT"]).await;
    assert_eq!(state, SessionState::AwaitingEmailDecision);
    assert_eq!(session.saved_files().len(), 1);
    assert_eq!(session.saved_files()[0].0, OutputFormat::Text);

    let written = std::fs::read_to_string(dir.path().join("summary_output.txt")).unwrap();
    assert!(written.contains(SUMMARY));
    assert!(!dir.path().join("summary_output.pdf").exists());
    assert!(!dir.path().join("summary_output.doc").exists());

    let state = feed(&mut session, &["no"]).await;
    assert_eq!(state, SessionState::AwaitingReturnDecision);
    assert!(mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_save_all_and_email_prefers_doc() {
    let dir = tempfile::tempdir().unwrap();
    let mailer = RecordingMailer::default();
    let mut session = started(services(
        FakeGenerator::replying(SUMMARY),
        Box::new(mailer.clone()),
        dir.path(),
    ));

    let state = feed(
        &mut session,
        &["1", "Some text", "yes", "all", "yes", "reader@example.com"],
    )
    .await;

    assert_eq!(state, SessionState::AwaitingReturnDecision);
    for name in ["summary_output.txt", "summary_output.pdf", "summary_output.doc"] {
        assert!(dir.path().join(name).exists(), "{} was not written", name);
    }

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "reader@example.com");
    assert_eq!(sent[0].attachment, dir.path().join("summary_output.doc"));
    assert!(transcript(&session).contains("Summary sent to reader@example.com."));
}

#[tokio::test]
async fn test_email_attaches_the_written_file() {
    let dir = tempfile::tempdir().unwrap();
    let mailer = RecordingMailer::default();
    let mut session = started(services(
        FakeGenerator::replying(SUMMARY),
        Box::new(mailer.clone()),
        dir.path(),
    ));

    feed(
        &mut session,
        &["1", "Some text", "yes", "pdf", "yes", "reader@example.com"],
    )
    .await;

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent[0].attachment, dir.path().join("summary_output.pdf"));
}

// ==================== Email Failure Tests ====================

#[tokio::test]
async fn test_email_failure_still_reaches_return_decision() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = started(services(
        FakeGenerator::replying(SUMMARY),
        Box::new(FailingMailer),
        dir.path(),
    ));

    let state = feed(
        &mut session,
        &["1", "Some text", "yes", "doc", "yes", "reader@example.com"],
    )
    .await;

    assert_eq!(state, SessionState::AwaitingReturnDecision);
    let out = transcript(&session);
    assert!(out.contains("Error sending email"));
    assert!(out.contains("connection refused"));
    assert!(dir.path().join("summary_output.doc").exists());

    let state = feed(&mut session, &["yes"]).await;
    assert_eq!(state, SessionState::MainMenu);
}

#[tokio::test]
async fn test_blank_email_address_skips_sending() {
    let dir = tempfile::tempdir().unwrap();
    let mailer = RecordingMailer::default();
    let mut session = started(services(
        FakeGenerator::replying(SUMMARY),
        Box::new(mailer.clone()),
        dir.path(),
    ));

    let state = feed(&mut session, &["1", "Some text", "yes", "txt", "yes", "   "]).await;

    assert_eq!(state, SessionState::AwaitingReturnDecision);
    assert!(mailer.sent.lock().unwrap().is_empty());
}

// ==================== Write Failure Tests ====================

#[tokio::test]
async fn test_write_failure_skips_email_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let missing_dir: PathBuf = dir.path().join("not-created");
    let mut session = started(services(
        FakeGenerator::replying(SUMMARY),
        Box::new(RecordingMailer::default()),
        &missing_dir,
    ));

    let state = feed(&mut session, &["1", "Some text", "yes", "all"]).await;

    assert_eq!(state, SessionState::AwaitingReturnDecision);
    assert!(transcript(&session).contains("Error saving summary"));
    assert!(session.saved_files().is_empty());
}

// ==================== Lexicon Scenario ====================

#[tokio::test]
async fn test_positive_product_review_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = started(Services {
        extractor: ContentExtractor::new(),
        generator: Box::new(FakeGenerator::replying("I love this great product!")),
        insights: InsightReporter::default(),
        writer: OutputWriter::new(dir.path()),
        notifier: Notifier::new(Box::new(RecordingMailer::default())),
    });

    feed(&mut session, &["1", "I love this great product!"]).await;

    let report = session.last_report().unwrap();
    assert_eq!(report.overall_sentiment, SentimentLabel::Positive);
    assert!(report.positive.iter().any(|w| w == "love"));
    assert!(report.positive.iter().any(|w| w == "great"));
    assert!(transcript(&session).contains("Overall Sentiment: Positive"));
}

// ==================== Input Loop Tests ====================

#[tokio::test]
async fn test_run_replaces_invalid_utf8_and_continues() {
    let dir = tempfile::tempdir().unwrap();
    let generator = FakeGenerator::replying(SUMMARY);
    let mut session = started(services(
        generator.clone(),
        Box::new(RecordingMailer::default()),
        dir.path(),
    ));

    let input: &[u8] = b"1\nCaf\xe9 menu was great\nno\nno\n";
    session.run(input).await.unwrap();

    assert_eq!(session.state(), SessionState::Exiting);
    assert_eq!(session.last_summary(), Some(SUMMARY));
    let prompts = generator.prompts.lock().unwrap();
    assert_eq!(
        prompts[0],
        "Summarize the following text:\n\nCaf\u{FFFD} menu was great"
    );
    assert!(transcript(&session).contains("Return to the main menu?"));
}

#[tokio::test]
async fn test_run_treats_end_of_input_as_exit() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = started(services(
        FakeGenerator::failing(),
        Box::new(RecordingMailer::default()),
        dir.path(),
    ));

    let input: &[u8] = b"3\n";
    session.run(input).await.unwrap();

    assert_eq!(session.state(), SessionState::Exiting);
    assert!(transcript(&session).contains("Thank you for using Summarist CLI"));
}

#[tokio::test]
async fn test_run_on_empty_input_exits_from_menu() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = started(services(
        FakeGenerator::failing(),
        Box::new(RecordingMailer::default()),
        dir.path(),
    ));

    session.run(&b""[..]).await.unwrap();

    assert!(session.is_finished());
}

#[tokio::test]
async fn test_run_handles_last_line_without_newline() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = started(services(
        FakeGenerator::failing(),
        Box::new(RecordingMailer::default()),
        dir.path(),
    ));

    session.run(&b"4"[..]).await.unwrap();

    assert!(session.is_finished());
    let out = transcript(&session);
    assert_eq!(out.matches("Thank you for using Summarist CLI").count(), 1);
}
