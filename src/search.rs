//! `ta search` and `ta ask`: the serving read path.
//!
//! Both commands initialize a [`RetrievalService`] from the configured index
//! prefix and refuse to run when it is missing. `search` prints ranked
//! documents; `ask` additionally runs the configured [`Summarizer`] and prints
//! the `{answer, links}` JSON the request layer returns.
//!
//! [`Summarizer`]: crate::answer::Summarizer

use anyhow::Result;
use tds_ta_core::models::SearchHit;

use crate::answer::{self, create_summarizer, Answer};
use crate::config::Config;
use crate::service::RetrievalService;

pub fn run_search(config: &Config, query: &str, k: Option<usize>, json: bool) -> Result<()> {
    let service = RetrievalService::initialize(config)?;
    let k = k.unwrap_or(config.retrieval.top_k);
    let results = service.answer_context(query, k)?;

    if json {
        let hits: Vec<SearchHit> = results.iter().map(SearchHit::from).collect();
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, result) in results.iter().enumerate() {
        let doc = &result.document;
        println!("{}. [{:.4}] {}", i + 1, result.score, doc.source_url);
        if let Some(date) = doc.date {
            println!("    date: {}", date);
        }
        println!("    excerpt: \"{}\"", excerpt(&doc.content, 160));
        println!();
    }
    Ok(())
}

fn excerpt(content: &str, max_chars: usize) -> String {
    let mut out: String = content.chars().take(max_chars).collect();
    if content.chars().nth(max_chars).is_some() {
        out.push_str("...");
    }
    out
}

/// Retrieve context for `question` and synthesize an answer.
pub fn ask(service: &RetrievalService, config: &Config, question: &str, k: usize) -> Result<Answer> {
    let contexts = service.answer_context(question, k)?;
    let summarizer = create_summarizer(&config.answer)?;
    answer::answer(
        summarizer.as_ref(),
        question,
        &contexts,
        config.answer.link_text_chars,
    )
}

pub fn run_ask(config: &Config, question: &str, k: Option<usize>) -> Result<()> {
    let service = RetrievalService::initialize(config)?;
    let k = k.unwrap_or(config.retrieval.top_k);
    let answer = ask(&service, config, question, k)?;
    println!("{}", serde_json::to_string_pretty(&answer)?);
    Ok(())
}
