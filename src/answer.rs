//! Answer synthesis and link formatting.
//!
//! Retrieval hands a ranked context list to a [`Summarizer`], which turns it
//! into prose. Two implementations exist:
//!
//! | Provider | Behaviour |
//! |----------|-----------|
//! | `excerpt` | Quotes the leading contexts verbatim; no network. |
//! | `openai` | One `chat/completions` call with the contexts as grounding. |
//!
//! [`Answer`] is the response shape the request layer returns: the text plus
//! one [`Link`] per context document.

use anyhow::{bail, Result};
use serde::Serialize;
use tds_ta_core::models::ScoredDocument;

use crate::config::AnswerConfig;
use crate::http;

const EXCERPT_PREAMBLE: &str = "Based on the course materials:\n\n";

/// Turns a question and its supporting documents into an answer.
pub trait Summarizer: Send + Sync {
    fn summarize(&self, question: &str, contexts: &[ScoredDocument]) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub url: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub answer: String,
    pub links: Vec<Link>,
}

/// One link per context, text truncated to `text_chars` characters plus `...`.
pub fn format_links(contexts: &[ScoredDocument], text_chars: usize) -> Vec<Link> {
    contexts
        .iter()
        .map(|hit| Link {
            url: hit.document.source_url.clone(),
            text: format!("{}...", truncate_chars(&hit.document.content, text_chars)),
        })
        .collect()
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((byte, _)) => &s[..byte],
        None => s,
    }
}

/// Summarize and attach links in one step.
pub fn answer(
    summarizer: &dyn Summarizer,
    question: &str,
    contexts: &[ScoredDocument],
    link_text_chars: usize,
) -> Result<Answer> {
    Ok(Answer {
        answer: summarizer.summarize(question, contexts)?,
        links: format_links(contexts, link_text_chars),
    })
}

/// Quotes the contexts, truncated to a character budget.
pub struct ExcerptSummarizer {
    max_chars: usize,
}

impl ExcerptSummarizer {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }
}

impl Summarizer for ExcerptSummarizer {
    fn summarize(&self, _question: &str, contexts: &[ScoredDocument]) -> Result<String> {
        let joined = join_contexts(contexts);
        Ok(format!(
            "{}{}...",
            EXCERPT_PREAMBLE,
            truncate_chars(&joined, self.max_chars)
        ))
    }
}

fn join_contexts(contexts: &[ScoredDocument]) -> String {
    contexts
        .iter()
        .map(|hit| hit.document.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Asks an OpenAI chat model to answer from the contexts.
///
/// Requires `OPENAI_API_KEY`.
pub struct OpenAIChatSummarizer {
    model: String,
    temperature: f32,
    max_context_chars: usize,
    max_retries: u32,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl OpenAIChatSummarizer {
    pub fn new(config: &AnswerConfig) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))?;
        Self::with_api_key(config, api_key)
    }

    fn with_api_key(config: &AnswerConfig, api_key: String) -> Result<Self> {
        Ok(Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_context_chars: config.max_context_chars,
            max_retries: config.max_retries,
            api_key,
            client: http::client(config.timeout_secs)?,
        })
    }

    fn request_body(&self, question: &str, contexts: &[ScoredDocument]) -> serde_json::Value {
        let mut context = String::new();
        for (i, hit) in contexts.iter().enumerate() {
            context.push_str(&format!(
                "[{}] ({})\n{}\n\n",
                i + 1,
                hit.document.source_url,
                hit.document.content
            ));
        }
        let context = truncate_chars(&context, self.max_context_chars);

        serde_json::json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [
                {
                    "role": "system",
                    "content": "You are a teaching assistant for the Tools in Data Science course. \
                                Answer using only the provided course materials."
                },
                {
                    "role": "user",
                    "content": format!("Course materials:\n{}\nQuestion: {}", context, question)
                }
            ]
        })
    }
}

impl Summarizer for OpenAIChatSummarizer {
    fn summarize(&self, question: &str, contexts: &[ScoredDocument]) -> Result<String> {
        let body = self.request_body(question, contexts);
        let json = http::post_json_with_retry(
            &self.client,
            "https://api.openai.com/v1/chat/completions",
            Some(&self.api_key),
            &body,
            self.max_retries,
            "OpenAI API",
        )?;
        parse_chat_response(&json)
    }
}

fn parse_chat_response(json: &serde_json::Value) -> Result<String> {
    json.pointer("/choices/0/message/content")
        .and_then(|c| c.as_str())
        .map(|c| c.trim().to_string())
        .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response: missing message content"))
}

/// Build the summarizer named by `config.provider`.
pub fn create_summarizer(config: &AnswerConfig) -> Result<Box<dyn Summarizer>> {
    match config.provider.as_str() {
        "excerpt" => Ok(Box::new(ExcerptSummarizer::new(config.max_context_chars))),
        "openai" => Ok(Box::new(OpenAIChatSummarizer::new(config)?)),
        other => bail!("Unknown answer provider: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tds_ta_core::models::Document;

    fn hit(content: &str, url: &str, score: f64) -> ScoredDocument {
        ScoredDocument {
            document: Document::new(content, url, None),
            score,
        }
    }

    #[test]
    fn test_excerpt_joins_and_truncates() {
        let contexts = vec![hit("first part", "u1", 1.0), hit("second part", "u2", 0.5)];
        let s = ExcerptSummarizer::new(2000).summarize("q", &contexts).unwrap();
        assert_eq!(
            s,
            "Based on the course materials:\n\nfirst part\n\nsecond part..."
        );

        let s = ExcerptSummarizer::new(5).summarize("q", &contexts).unwrap();
        assert_eq!(s, "Based on the course materials:\n\nfirst...");
    }

    #[test]
    fn test_excerpt_with_no_contexts() {
        let s = ExcerptSummarizer::new(10).summarize("q", &[]).unwrap();
        assert_eq!(s, "Based on the course materials:\n\n...");
    }

    #[test]
    fn test_links_truncate_on_char_boundaries() {
        let links = format_links(&[hit("héllo wörld", "https://x", 0.9)], 4);
        assert_eq!(
            links,
            vec![Link {
                url: "https://x".to_string(),
                text: "héll...".to_string()
            }]
        );

        let links = format_links(&[hit("short", "Unknown", 0.9)], 100);
        assert_eq!(links[0].text, "short...");
    }

    #[test]
    fn test_answer_serializes_like_api_response() {
        let contexts = vec![hit("body", "https://x", 1.0)];
        let a = answer(&ExcerptSummarizer::new(100), "q", &contexts, 100).unwrap();
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["links"][0]["url"], "https://x");
        assert!(json["answer"].as_str().unwrap().contains("body"));
    }

    #[test]
    fn test_parse_chat_response() {
        let json = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "  Use Docker.  "}}]
        });
        assert_eq!(parse_chat_response(&json).unwrap(), "Use Docker.");
        assert!(parse_chat_response(&serde_json::json!({"choices": []})).is_err());
    }

    #[test]
    fn test_chat_summarizer_takes_retries_from_config() {
        let config = AnswerConfig {
            provider: "openai".to_string(),
            max_retries: 7,
            ..AnswerConfig::default()
        };
        let summarizer = OpenAIChatSummarizer::with_api_key(&config, "sk-test".into()).unwrap();
        assert_eq!(summarizer.max_retries, 7);

        let summarizer =
            OpenAIChatSummarizer::with_api_key(&AnswerConfig::default(), "sk-test".into()).unwrap();
        assert_eq!(summarizer.max_retries, 3);
    }

    #[test]
    fn test_create_summarizer() {
        assert!(create_summarizer(&AnswerConfig::default()).is_ok());
        let bad = AnswerConfig {
            provider: "oracle".to_string(),
            ..AnswerConfig::default()
        };
        assert!(create_summarizer(&bad).is_err());
    }
}
