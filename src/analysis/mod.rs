//! Comment analytics: keywords, sentiment, topics and an LLM-backed SEO report.
//!
//! The frequency-based pieces ([`extract_keywords`], [`analyze_sentiment`],
//! [`extract_topics`]) are pure functions. [`SeoAnalyzer`]
//! combines them with a [`TextCompletion`] client and keeps a bounded
//! [`AnalysisCache`] so the same comment text is only sent to the LLM once.

mod cache;
mod llm;
mod report;
mod text;

pub use cache::{AnalysisCache, fingerprint};
pub use llm::{OpenAiClient, SYSTEM_PROMPT, TextCompletion, analysis_prompt, truncate_input};
pub use report::{SeoAnalyzer, SeoReport};
pub use text::{
    SENTIMENT_THRESHOLD, Sentiment, SentimentScore, analyze_sentiment, content_ideas,
    extract_keywords, extract_topics, tokenize,
};
