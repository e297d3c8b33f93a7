use crate::models::{InsightReport, SentimentLabel};

/// Number of ranked phrases kept as keywords
pub const MAX_KEYWORDS: usize = 10;

/// Raw output of a lexicon-based sentiment analysis
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SentimentScore {
    pub score: i32,
    pub comparative: f32,
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

pub trait SentimentScorer: Send + Sync {
    fn score(&self, text: &str) -> SentimentScore;
}

pub trait KeywordExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Vec<String>;
}

/// Tokens that flip the polarity of the word that follows them
const NEGATORS: [&str; 12] = [
    "cant", "can't", "dont", "don't", "doesnt", "doesn't", "not", "non", "wont", "won't", "isnt",
    "isn't",
];

/// AFINN lexicon scorer backed by the `sentiment` crate. Words are scored one
/// at a time so that a preceding negator can invert them.
#[derive(Debug, Default, Clone, Copy)]
pub struct AfinnScorer;

impl SentimentScorer for AfinnScorer {
    fn score(&self, text: &str) -> SentimentScore {
        let tokens = tokenize(text);
        let mut result = SentimentScore::default();
        let mut total = 0f32;

        for (i, token) in tokens.iter().enumerate() {
            let mut value = sentiment::analyze(token.clone()).score;
            if value == 0.0 {
                continue;
            }
            if i > 0 && NEGATORS.contains(&tokens[i - 1].as_str()) {
                value = -value;
            }

            total += value;
            if value > 0.0 {
                result.positive.push(token.clone());
            } else {
                result.negative.push(token.clone());
            }
        }

        result.score = total.round() as i32;
        if !tokens.is_empty() {
            result.comparative = total / tokens.len() as f32;
        }
        result
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// RAKE key-phrase extraction with the English stop-word list
pub struct RakeKeywordExtractor {
    stop_words: Vec<String>,
    limit: usize,
}

impl RakeKeywordExtractor {
    pub fn new() -> Self {
        Self {
            stop_words: stop_words::get(stop_words::LANGUAGE::English),
            limit: MAX_KEYWORDS,
        }
    }
}

impl Default for RakeKeywordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordExtractor for RakeKeywordExtractor {
    fn extract(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        use keyword_extraction::rake::{Rake, RakeParams};

        let rake = Rake::new(RakeParams::WithDefaults(text, &self.stop_words));
        rake.get_ranked_phrases(self.limit)
    }
}

/// Derives an `InsightReport` from generated summary text
pub struct InsightReporter {
    scorer: Box<dyn SentimentScorer>,
    keywords: Box<dyn KeywordExtractor>,
}

impl InsightReporter {
    pub fn new(scorer: Box<dyn SentimentScorer>, keywords: Box<dyn KeywordExtractor>) -> Self {
        Self { scorer, keywords }
    }

    pub fn report(&self, summary: &str) -> InsightReport {
        let sentiment = self.scorer.score(summary);

        InsightReport {
            word_count: summary.split_whitespace().count(),
            score: sentiment.score,
            comparative: sentiment.comparative,
            overall_sentiment: SentimentLabel::from_comparative(sentiment.comparative),
            positive: sentiment.positive,
            negative: sentiment.negative,
            keywords: self.keywords.extract(summary),
        }
    }
}

impl Default for InsightReporter {
    fn default() -> Self {
        Self::new(Box::new(AfinnScorer), Box::new(RakeKeywordExtractor::new()))
    }
}
