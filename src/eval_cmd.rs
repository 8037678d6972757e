//! `ta eval`: keyword checks over synthesized answers.
//!
//! Cases are read from a TOML file:
//!
//! ```toml
//! [[case]]
//! question = "How do I submit my GA5 assignment?"
//! expected_keywords = ["submit", "portal", "deadline"]
//! ```
//!
//! Each question runs through the same path as `ta ask`. A case passes when
//! every keyword appears in the answer (case-insensitive), fails when some
//! are missing, and errors when retrieval or synthesis fails. The command
//! exits non-zero unless every case passes.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::config::Config;
use crate::search::ask;
use crate::service::RetrievalService;

#[derive(Debug, Deserialize)]
pub struct EvalFile {
    #[serde(default, rename = "case")]
    pub cases: Vec<EvalCase>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvalCase {
    pub question: String,
    #[serde(default)]
    pub expected_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail { missing: Vec<String> },
    Error(String),
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Pass => "PASS",
            Outcome::Fail { .. } => "FAIL",
            Outcome::Error(_) => "ERROR",
        }
    }
}

pub fn load_cases(path: &Path) -> Result<Vec<EvalCase>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read eval cases: {}", path.display()))?;
    let file: EvalFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse eval cases: {}", path.display()))?;
    Ok(file.cases)
}

/// Keywords from `expected` that do not occur in `answer`, ignoring case.
pub fn missing_keywords(answer: &str, expected: &[String]) -> Vec<String> {
    let answer = answer.to_lowercase();
    expected
        .iter()
        .filter(|kw| !answer.contains(&kw.to_lowercase()))
        .cloned()
        .collect()
}

pub fn run_eval(config: &Config, cases_path: &Path) -> Result<()> {
    let cases = load_cases(cases_path)?;
    let service = RetrievalService::initialize(config)?;
    let k = config.retrieval.top_k;

    println!("Test Results:");
    let mut passed = 0usize;
    for case in &cases {
        let (outcome, answer) = match ask(&service, config, &case.question, k) {
            Ok(a) => {
                let missing = missing_keywords(&a.answer, &case.expected_keywords);
                let outcome = if missing.is_empty() {
                    Outcome::Pass
                } else {
                    Outcome::Fail { missing }
                };
                (outcome, Some(a.answer))
            }
            Err(e) => (Outcome::Error(format!("{:#}", e)), None),
        };

        println!();
        println!("Question: {}", case.question);
        println!("Status: {}", outcome.label());
        match &outcome {
            Outcome::Pass => passed += 1,
            Outcome::Fail { missing } => println!("Missing keywords: {}", missing.join(", ")),
            Outcome::Error(message) => println!("Error: {}", message),
        }
        if let Some(answer) = answer {
            let preview: String = answer.chars().take(200).collect();
            let ellipsis = if answer.chars().count() > 200 { "..." } else { "" };
            println!("Answer: {}{}", preview.replace('\n', " "), ellipsis);
        }
    }

    println!();
    println!("{} / {} passed", passed, cases.len());
    if passed != cases.len() {
        bail!("{} eval case(s) did not pass", cases.len() - passed);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keywords_case_insensitive() {
        let expected = vec![
            "Docker".to_string(),
            "podman".to_string(),
            "GPT-3.5-turbo".to_string(),
        ];
        let missing = missing_keywords("Use docker or gpt-3.5-TURBO.", &expected);
        assert_eq!(missing, vec!["podman".to_string()]);
        assert!(missing_keywords("anything", &[]).is_empty());
    }

    #[test]
    fn test_load_cases() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("cases.toml");
        std::fs::write(
            &path,
            r#"
[[case]]
question = "How do I submit GA5?"
expected_keywords = ["submit", "portal"]

[[case]]
question = "No keywords"
"#,
        )
        .unwrap();
        let cases = load_cases(&path).unwrap();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].expected_keywords, vec!["submit", "portal"]);
        assert!(cases[1].expected_keywords.is_empty());
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(Outcome::Pass.label(), "PASS");
        assert_eq!(Outcome::Fail { missing: vec![] }.label(), "FAIL");
        assert_eq!(Outcome::Error("x".into()).label(), "ERROR");
    }
}
