//! Tokenization and frequency-based comment analytics.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+|[^\w\s]").expect("token pattern is valid"));

static STOPWORDS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ENGLISH_STOPWORDS.iter().copied().collect());

const POSITIVE_WORDS: [&str; 6] = ["good", "great", "excellent", "amazing", "love", "best"];
const NEGATIVE_WORDS: [&str; 6] = ["bad", "poor", "terrible", "worst", "hate", "awful"];

/// Scores above this are positive, below its negation negative
pub const SENTIMENT_THRESHOLD: f64 = 0.05;

/// Overall tone of a body of comments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    /// Score above the threshold
    Positive,
    /// Score below the negative threshold
    Negative,
    /// Anything in between
    Neutral,
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        };
        f.write_str(label)
    }
}

/// Sentiment label together with the raw score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    /// Classified tone
    pub sentiment: Sentiment,
    /// `(positive - negative) / total tokens`
    pub score: f64,
}

/// Lowercase `text` and split it into word and punctuation tokens
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn is_content_word(token: &str) -> bool {
    !token.is_empty()
        && token.chars().all(char::is_alphanumeric)
        && !STOPWORDS.contains(token)
}

/// The `top_n` most frequent non-stopword tokens with their counts
///
/// Sorted by count, descending; ties keep first-occurrence order.
///
/// # Examples
///
/// ```
/// use yt_seo_etl::analysis::extract_keywords;
///
/// let keywords = extract_keywords("good good bad the a", 2);
/// assert_eq!(keywords, vec![("good".to_string(), 2), ("bad".to_string(), 1)]);
/// ```
pub fn extract_keywords(text: &str, top_n: usize) -> Vec<(String, usize)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for token in tokenize(text) {
        if !is_content_word(&token) {
            continue;
        }
        match counts.get_mut(&token) {
            Some(count) => *count += 1,
            None => {
                counts.insert(token.clone(), 1);
                order.push(token);
            }
        }
    }

    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|word| {
            let count = counts.get(&word).copied().unwrap_or(0);
            (word, count)
        })
        .collect();
    // stable: equal counts stay in first-seen order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(top_n);
    ranked
}

/// Word-list sentiment heuristic over all tokens, punctuation included
pub fn analyze_sentiment(text: &str) -> SentimentScore {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return SentimentScore {
            sentiment: Sentiment::Neutral,
            score: 0.0,
        };
    }

    let positive = tokens
        .iter()
        .filter(|t| POSITIVE_WORDS.contains(&t.as_str()))
        .count();
    let negative = tokens
        .iter()
        .filter(|t| NEGATIVE_WORDS.contains(&t.as_str()))
        .count();

    let score = (positive as f64 - negative as f64) / tokens.len() as f64;
    let sentiment = if score > SENTIMENT_THRESHOLD {
        Sentiment::Positive
    } else if score < -SENTIMENT_THRESHOLD {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    };

    SentimentScore { sentiment, score }
}

/// The `num_topics` most frequent keywords, without counts
pub fn extract_topics(text: &str, num_topics: usize) -> Vec<String> {
    extract_keywords(text, num_topics)
        .into_iter()
        .map(|(word, _)| word)
        .collect()
}

/// One video suggestion per topic
pub fn content_ideas(topics: &[String]) -> Vec<String> {
    topics
        .iter()
        .map(|topic| {
            format!("Create a video expanding on the topic of '{topic}' based on viewer interest.")
        })
        .collect()
}

// NLTK english stopword corpus
const ENGLISH_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan",
    "shan't", "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't",
    "wouldn", "wouldn't",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_splits_punctuation() {
        assert_eq!(
            tokenize("Great video!! Thanks."),
            vec!["great", "video", "!", "!", "thanks", "."]
        );
    }

    #[test]
    fn test_keywords_skip_stopwords_and_rank_by_count() {
        let keywords = extract_keywords("good good bad the a", 2);
        assert_eq!(
            keywords,
            vec![("good".to_string(), 2), ("bad".to_string(), 1)]
        );
    }

    #[test]
    fn test_keywords_ties_keep_first_occurrence() {
        let keywords = extract_keywords("rust tokio serde tokio rust axum", 10);
        assert_eq!(
            keywords,
            vec![
                ("rust".to_string(), 2),
                ("tokio".to_string(), 2),
                ("serde".to_string(), 1),
                ("axum".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_keywords_ignore_punctuation_and_case() {
        let keywords = extract_keywords("Rust! RUST, rust?", 5);
        assert_eq!(keywords, vec![("rust".to_string(), 3)]);
    }

    #[test]
    fn test_sentiment_positive_ratio() {
        // 10 tokens, 3 of them positive
        let result = analyze_sentiment("good great love this is a nice video for me");
        assert!((result.score - 0.3).abs() < 1e-9);
        assert_eq!(result.sentiment, Sentiment::Positive);
    }

    #[test]
    fn test_sentiment_negative_and_neutral() {
        assert_eq!(
            analyze_sentiment("awful, terrible video").sentiment,
            Sentiment::Negative
        );
        assert_eq!(
            analyze_sentiment("good bad video here").sentiment,
            Sentiment::Neutral
        );
    }

    #[test]
    fn test_sentiment_empty_text_is_neutral() {
        let result = analyze_sentiment("   ");
        assert_eq!(result.sentiment, Sentiment::Neutral);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_topics_and_ideas() {
        let topics = extract_topics("lighting lighting camera audio audio audio", 2);
        assert_eq!(topics, vec!["audio", "lighting"]);

        let ideas = content_ideas(&topics);
        assert_eq!(
            ideas[0],
            "Create a video expanding on the topic of 'audio' based on viewer interest."
        );
        assert_eq!(ideas.len(), 2);
    }
}
