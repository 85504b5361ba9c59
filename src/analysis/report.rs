//! SEO report assembled from the text analytics and an LLM summary.

use super::cache::AnalysisCache;
use super::llm::{SYSTEM_PROMPT, TextCompletion, analysis_prompt, truncate_input};
use super::text::{
    Sentiment, SentimentScore, analyze_sentiment, content_ideas, extract_keywords, extract_topics,
};
use crate::config::{AnalysisConfig, LlmConfig};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Everything the report shows, before rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoReport {
    /// Most frequent keywords with counts
    pub keywords: Vec<(String, usize)>,
    /// Overall tone
    pub sentiment: SentimentScore,
    /// Main discussion topics
    pub topics: Vec<String>,
    /// One video idea per topic
    pub content_ideas: Vec<String>,
    /// LLM narrative
    pub insights: String,
}

impl SeoReport {
    /// Render as Markdown
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let keywords = self
            .keywords
            .iter()
            .map(|(word, count)| format!("**{word}** ({count})"))
            .collect::<Vec<_>>()
            .join(", ");
        let ideas = self
            .content_ideas
            .iter()
            .map(|idea| format!("- {idea}"))
            .collect::<Vec<_>>()
            .join("\n");

        let (recommendation, engagement) = match self.sentiment.sentiment {
            Sentiment::Positive => (
                "Highlight positive aspects in your marketing.",
                "Encourage viewers to share their positive experiences.",
            ),
            Sentiment::Negative => (
                "Address concerns in future content.",
                "Ask for constructive feedback on how to improve.",
            ),
            Sentiment::Neutral => (
                "Encourage more specific feedback in future videos.",
                "Prompt viewers to share more detailed opinions on the content.",
            ),
        };

        // writing to a String cannot fail
        let _ = write!(
            out,
            "# Comprehensive SEO and Content Analysis

## 1. Top Keywords
{keywords}

## 2. Overall Sentiment
{sentiment} (score {score:.3})

## 3. Main Topics of Discussion
{topics}

## 4. Content Ideas
{ideas}

## 5. SEO Recommendations
- Incorporate top keywords and topics into video titles, descriptions, and tags.
- {recommendation}
- Create a content series based on the main topics of discussion.
- Use timestamps in video descriptions to highlight sections related to popular topics.

## 6. Engagement Strategies
- Respond to comments discussing the main topics to foster community engagement.
- Create polls or surveys based on the identified topics to gather more specific viewer preferences.
- {engagement}

## 7. AI-Generated Insights
{insights}

## 8. Next Steps
- Prioritize content ideas based on keyword frequency and sentiment.
- Develop a content calendar incorporating the suggested topics and ideas.
- Regularly review and update SEO strategies based on changing viewer interests and comments.
",
            sentiment = self.sentiment.sentiment,
            score = self.sentiment.score,
            topics = self.topics.join(", "),
            insights = self.insights,
        );
        out
    }
}

/// Runs the comment analytics and caches LLM summaries per distinct text
pub struct SeoAnalyzer<C> {
    client: C,
    cache: AnalysisCache,
    settings: AnalysisConfig,
    max_input_chars: usize,
}

impl<C: TextCompletion> SeoAnalyzer<C> {
    /// Create an analyzer around a completion client
    pub fn new(client: C, settings: AnalysisConfig, llm: &LlmConfig) -> Self {
        Self {
            client,
            cache: AnalysisCache::new(settings.cache_capacity),
            settings,
            max_input_chars: llm.max_input_chars,
        }
    }

    /// The completion client
    pub fn client(&self) -> &C {
        &self.client
    }

    /// LLM summary of `comments`, served from cache when the same text was seen before
    pub async fn overall_suggestions(&mut self, comments: &str) -> Result<String> {
        if let Some(cached) = self.cache.get(comments) {
            tracing::debug!("Using cached analysis");
            return Ok(cached);
        }

        let truncated = truncate_input(comments, self.max_input_chars);
        let summary = self
            .client
            .complete(SYSTEM_PROMPT, &analysis_prompt(&truncated))
            .await?;

        self.cache.insert(comments, summary.clone());
        Ok(summary)
    }

    /// Keywords, sentiment, topics, content ideas and the LLM summary for `comments`
    pub async fn comprehensive_analysis(&mut self, comments: &str) -> Result<SeoReport> {
        let keywords = extract_keywords(comments, self.settings.top_keywords);
        let sentiment = analyze_sentiment(comments);
        let topics = extract_topics(comments, self.settings.num_topics);
        let ideas = content_ideas(&topics);
        let insights = self.overall_suggestions(comments).await?;

        tracing::info!(
            keywords = keywords.len(),
            sentiment = %sentiment.sentiment,
            topics = topics.len(),
            "Comment analysis complete"
        );

        Ok(SeoReport {
            keywords,
            sentiment,
            topics,
            content_ideas: ideas,
            insights,
        })
    }
}
