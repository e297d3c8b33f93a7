//! Interactive summarization workflow.
//!
//! The session is a finite state machine driven by one event: the user
//! submitting a line of input. Every transition writes its output and the
//! prompt for the next state to the session's console writer, so the same
//! code runs against stdout in the binary and an in-memory buffer in tests.

use crate::config::Config;
use crate::error::{Result, SummaristError};
use crate::extractor::ContentExtractor;
use crate::insights::InsightReporter;
use crate::models::{
    ContentSource, FormatSelection, InsightReport, OutputFormat, OutputRequest, SummaryDocument,
};
use crate::notifier::Notifier;
use crate::summarizer::{build_prompt, GeminiSummarizer, TextGenerator};
use crate::writer::OutputWriter;
use colored::{Color, Colorize};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use std::path::{Path, PathBuf};

/// Order in which written files are preferred as the email attachment
const ATTACHMENT_PREFERENCE: [OutputFormat; 3] =
    [OutputFormat::Doc, OutputFormat::Pdf, OutputFormat::Text];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    MainMenu,
    AwaitingText,
    AwaitingFile,
    AwaitingSaveDecision,
    AwaitingFormat,
    AwaitingEmailDecision,
    AwaitingEmailAddress,
    AwaitingReturnDecision,
    Exiting,
}

/// The collaborators a session calls into
pub struct Services {
    pub extractor: ContentExtractor,
    pub generator: Box<dyn TextGenerator>,
    pub insights: InsightReporter,
    pub writer: OutputWriter,
    pub notifier: Notifier,
}

impl Services {
    /// Production stack: Gemini, AFINN + RAKE insights, file writers in the
    /// configured output directory, SMTP mail.
    pub fn from_config(config: &Config) -> Result<Self> {
        let generator = GeminiSummarizer::new(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
            config.gemini_base_url.clone(),
        )?;

        Ok(Self {
            extractor: ContentExtractor::new(),
            generator: Box::new(generator),
            insights: InsightReporter::default(),
            writer: OutputWriter::new(&config.output_dir),
            notifier: Notifier::default(),
        })
    }
}

pub struct Session<W: Write> {
    services: Services,
    out: W,
    state: SessionState,
    last_summary: Option<String>,
    last_report: Option<InsightReport>,
    saved_files: Vec<(OutputFormat, PathBuf)>,
}

impl<W: Write> Session<W> {
    pub fn new(services: Services, out: W) -> Self {
        Self {
            services,
            out,
            state: SessionState::MainMenu,
            last_summary: None,
            last_report: None,
            saved_files: Vec::new(),
        }
    }

    /// Display the main menu. Call once before feeding input.
    pub fn start(&mut self) -> Result<()> {
        self.state = SessionState::MainMenu;
        self.show_prompt()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Exiting
    }

    pub fn last_summary(&self) -> Option<&str> {
        self.last_summary.as_deref()
    }

    pub fn last_report(&self) -> Option<&InsightReport> {
        self.last_report.as_ref()
    }

    pub fn saved_files(&self) -> &[(OutputFormat, PathBuf)] {
        &self.saved_files
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Feed lines from `input` until the session exits. End of input counts
    /// as choosing Exit. Bytes that are not valid UTF-8 are replaced.
    pub async fn run<R>(&mut self, mut input: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut buf = Vec::new();
        while !self.is_finished() {
            buf.clear();
            if input.read_until(b'\n', &mut buf).await? == 0 {
                tracing::debug!("End of input, leaving session");
                writeln!(self.out)?;
                self.state = SessionState::Exiting;
                self.show_prompt()?;
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            self.handle_line(&line).await?;
        }
        Ok(())
    }

    /// Feed one line of user input and advance the state machine.
    pub async fn handle_line(&mut self, line: &str) -> Result<SessionState> {
        if self.state == SessionState::Exiting {
            return Ok(self.state);
        }

        let input = line.trim();
        let next = match self.state {
            SessionState::MainMenu => self.on_menu_choice(input)?,
            SessionState::AwaitingText => {
                self.summarize(ContentSource::Text(input.to_string())).await?
            }
            SessionState::AwaitingFile => {
                let path = PathBuf::from(strip_quotes(input));
                self.summarize(ContentSource::File(path)).await?
            }
            SessionState::AwaitingSaveDecision => {
                if is_yes(input) {
                    SessionState::AwaitingFormat
                } else {
                    SessionState::AwaitingReturnDecision
                }
            }
            SessionState::AwaitingFormat => self.on_format(input)?,
            SessionState::AwaitingEmailDecision => {
                if is_yes(input) {
                    SessionState::AwaitingEmailAddress
                } else {
                    SessionState::AwaitingReturnDecision
                }
            }
            SessionState::AwaitingEmailAddress => self.on_email_address(input).await?,
            SessionState::AwaitingReturnDecision => {
                if is_yes(input) {
                    SessionState::MainMenu
                } else {
                    SessionState::Exiting
                }
            }
            SessionState::Exiting => SessionState::Exiting,
        };

        tracing::debug!("Session {:?} -> {:?}", self.state, next);
        self.state = next;
        self.show_prompt()?;
        Ok(self.state)
    }

    fn on_menu_choice(&mut self, choice: &str) -> Result<SessionState> {
        match choice {
            "1" => Ok(SessionState::AwaitingText),
            "2" => Ok(SessionState::AwaitingFile),
            "3" => {
                writeln!(self.out, "{}", help_text())?;
                Ok(SessionState::AwaitingReturnDecision)
            }
            "4" => Ok(SessionState::Exiting),
            _ => {
                writeln!(
                    self.out,
                    "{}",
                    "❌ Invalid choice, please select again.".red()
                )?;
                Ok(SessionState::MainMenu)
            }
        }
    }

    async fn summarize(&mut self, source: ContentSource) -> Result<SessionState> {
        if source.is_file() {
            writeln!(self.out, "{}", "\n🔄 Extracting text from the file...".blue())?;
            self.out.flush()?;
        }

        let text = match self.services.extractor.extract(&source) {
            Ok(text) => text,
            Err(e) => return self.report_summarize_failure(e),
        };

        writeln!(self.out, "{}", "\n🔄 Generating summary, please wait...".blue())?;
        self.out.flush()?;

        let prompt = build_prompt(&source, &text);
        let summary = match self.services.generator.generate(&prompt).await {
            Ok(summary) => summary,
            Err(e) => return self.report_summarize_failure(e),
        };

        writeln!(self.out, "{}", "\n✅ Summary Generated:\n".green())?;
        writeln!(self.out, "{}", summary.white())?;

        let report = self.services.insights.report(&summary);
        self.write_insights(&report)?;

        self.last_summary = Some(summary);
        self.last_report = Some(report);
        self.saved_files.clear();

        Ok(SessionState::AwaitingSaveDecision)
    }

    fn report_summarize_failure(&mut self, e: SummaristError) -> Result<SessionState> {
        tracing::warn!("Summarization failed: {}", e);
        writeln!(self.out, "{}", "\n❌ Error while summarizing:".red())?;
        writeln!(self.out, "{}", e.to_string().red())?;
        Ok(SessionState::AwaitingReturnDecision)
    }

    fn write_insights(&mut self, report: &InsightReport) -> Result<()> {
        const COLORS: [Color; 6] = [
            Color::Green,
            Color::Magenta,
            Color::Cyan,
            Color::Red,
            Color::Green,
            Color::Blue,
        ];

        writeln!(self.out, "{}", "\n🔍 Insights:".yellow())?;
        for ((label, value), color) in report.fields().into_iter().zip(COLORS) {
            writeln!(self.out, "{}", format!("{}: {}", label, value).color(color))?;
        }
        Ok(())
    }

    fn on_format(&mut self, answer: &str) -> Result<SessionState> {
        let selection = match answer.parse::<FormatSelection>() {
            Ok(selection) => selection,
            Err(message) => {
                writeln!(
                    self.out,
                    "{}",
                    format!("❌ {}. Choose txt, pdf, doc, or all.", message).red()
                )?;
                return Ok(SessionState::AwaitingFormat);
            }
        };

        let doc = match (&self.last_summary, &self.last_report) {
            (Some(summary), Some(report)) => SummaryDocument::new(summary.clone(), report.clone()),
            _ => {
                writeln!(self.out, "{}", "❌ There is no summary to save yet.".red())?;
                return Ok(SessionState::AwaitingReturnDecision);
            }
        };

        let outcomes = self
            .services
            .writer
            .save(&OutputRequest::new(selection), &doc);

        self.saved_files.clear();
        for outcome in outcomes {
            match outcome.result {
                Ok(path) => {
                    writeln!(
                        self.out,
                        "{}",
                        format!("✔️ Summary saved as '{}'.", path.display()).green()
                    )?;
                    self.saved_files.push((outcome.format, path));
                }
                Err(e) => {
                    writeln!(self.out, "{}", "❌ Error saving summary:".red())?;
                    writeln!(self.out, "{}", e.to_string().red())?;
                }
            }
        }

        if self.saved_files.is_empty() {
            Ok(SessionState::AwaitingReturnDecision)
        } else {
            Ok(SessionState::AwaitingEmailDecision)
        }
    }

    fn preferred_attachment(&self) -> Option<&Path> {
        ATTACHMENT_PREFERENCE.iter().find_map(|wanted| {
            self.saved_files
                .iter()
                .find(|(format, _)| format == wanted)
                .map(|(_, path)| path.as_path())
        })
    }

    async fn on_email_address(&mut self, recipient: &str) -> Result<SessionState> {
        if recipient.is_empty() {
            writeln!(self.out, "{}", "No address entered, skipping email.".yellow())?;
            return Ok(SessionState::AwaitingReturnDecision);
        }

        let attachment = match self.preferred_attachment().map(Path::to_path_buf) {
            Some(path) => path,
            None => {
                writeln!(self.out, "{}", "❌ There is no saved file to send.".red())?;
                return Ok(SessionState::AwaitingReturnDecision);
            }
        };

        // Delivery failures are reported and never end the session
        match self.services.notifier.notify(&attachment, recipient).await {
            Ok(()) => writeln!(
                self.out,
                "{}",
                format!("✔️ Summary sent to {}.", recipient).green()
            )?,
            Err(e) => {
                writeln!(self.out, "{}", "❌ Error sending email:".red())?;
                writeln!(self.out, "{}", e.to_string().red())?;
            }
        }

        Ok(SessionState::AwaitingReturnDecision)
    }

    fn show_prompt(&mut self) -> Result<()> {
        match self.state {
            SessionState::MainMenu => {
                writeln!(
                    self.out,
                    "\n{}",
                    "==================== AI Summarizer ====================".bright_blue()
                )?;
                write!(
                    self.out,
                    "{}",
                    "\n🔍 Welcome to the Summarist CLI!\nChoose an option:\n\n\
                    1. Summarize text\n\
                    2. Summarize a file\n\
                    3. Help\n\
                    4. Exit\n\n\
                    Enter your choice: "
                        .cyan()
                )?;
            }
            SessionState::AwaitingText => {
                write!(self.out, "{}", "\n📝 Enter the text to summarize: ".green())?
            }
            SessionState::AwaitingFile => write!(
                self.out,
                "{}",
                "\n📂 Enter the file path (PDF, DOC/DOCX, TXT) to summarize: ".green()
            )?,
            SessionState::AwaitingSaveDecision => write!(
                self.out,
                "{}",
                "\n💾 Do you want to save the summary? (yes/no): ".cyan()
            )?,
            SessionState::AwaitingFormat => write!(
                self.out,
                "{}",
                "\n📂 Enter the output file format (txt/pdf/doc/all): ".cyan()
            )?,
            SessionState::AwaitingEmailDecision => write!(
                self.out,
                "{}",
                "\n📧 Do you want to send the summary by email? (yes/no): ".cyan()
            )?,
            SessionState::AwaitingEmailAddress => write!(
                self.out,
                "{}",
                "\n📧 Enter the recipient's email address: ".cyan()
            )?,
            SessionState::AwaitingReturnDecision => write!(
                self.out,
                "{}",
                "\n🔄 Return to the main menu? (yes/no): ".cyan()
            )?,
            SessionState::Exiting => writeln!(
                self.out,
                "{}",
                "\n✨ Thank you for using Summarist CLI. Have a great day! ✨".green()
            )?,
        }
        self.out.flush()?;
        Ok(())
    }
}

fn is_yes(answer: &str) -> bool {
    answer.eq_ignore_ascii_case("yes")
}

/// Paths dragged into a terminal often arrive quoted.
fn strip_quotes(input: &str) -> &str {
    let trimmed = input.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = trimmed
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    trimmed
}

pub fn help_text() -> &'static str {
    "\n📖 Welcome to the Summarist CLI! Here's how to use it:\n\
    \n🔍 1. Summarize Text:\
    \n   - Type or paste text, and Summarist will summarize it. Example: 'Summarist helps simplify documents.'\n\
    \n📂 2. Summarize a File:\
    \n   - Provide a file path (PDF, DOC/DOCX, TXT). Example: './research_paper.pdf'\n\
    \n💾 3. Save Output:\
    \n   - Save your summary as TXT, PDF, DOC, or all three. Example: 'txt' or 'all'\n\
    \n💬 4. Sentiment Analysis:\
    \n   - Every summary is scored for tone. Example: 'Fantastic job!' is reported as Positive.\n\
    \n🔑 5. Extract Keywords:\
    \n   - Key phrases are pulled from every summary. Example: 'Summarist is a great tool.' returns 'summarist', 'great tool'\n\
    \n📧 Email:\
    \n   - After saving, send the file to any address (needs EMAIL_USER and EMAIL_PASS).\n\
    \n✨ Enjoy using Summarist!"
}
