use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const CORPUS: &str = "\
Docker and Podman are container tools. The course recommends Podman. [Source](https://tds.example/docker)

---

Submit GA5 on the course portal before the deadline, 15 April 2025. [Source](https://discourse.example/ga5)

---

Pandas merges dataframes on shared key columns.
";

fn ta_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("ta");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    let data_dir = root.join("data");
    fs::create_dir_all(&data_dir).unwrap();

    fs::write(data_dir.join("extracted_contents.doc"), CORPUS).unwrap();

    let config_content = format!(
        r#"[index]
path = "{root}/data/tds_vector_db"

[corpus]
input = "{root}/data/extracted_contents.doc"
processed = "{root}/data/processed_data.json"

[embedding]
provider = "hashed"
dims = 128
batch_size = 2

[retrieval]
top_k = 3
"#,
        root = root.display()
    );

    let config_path = config_dir.join("ta.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_ta(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = ta_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run ta binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn process_and_build(config_path: &Path) {
    let (stdout, stderr, success) = run_ta(config_path, &["process"]);
    assert!(success, "process failed: stdout={}, stderr={}", stdout, stderr);

    let (stdout, stderr, success) = run_ta(config_path, &["build", "--progress", "off"]);
    assert!(success, "build failed: stdout={}, stderr={}", stdout, stderr);
}

#[test]
fn test_process_writes_documents() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_ta(&config_path, &["process"]);
    assert!(success, "process failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Processed 3 documents"), "stdout={}", stdout);

    let written = fs::read_to_string(tmp.path().join("data/processed_data.json")).unwrap();
    let docs: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(docs[1]["source_url"], "https://discourse.example/ga5");
    assert_eq!(docs[1]["date"], "2025-04-15");
    assert_eq!(docs[2]["source_url"], "Unknown");
}

#[test]
fn test_process_without_config_file() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("raw.doc");
    let output = tmp.path().join("docs.json");
    fs::write(&input, "only one document").unwrap();

    // No --config flag and no ./config/ta.toml in the working directory.
    let binary = ta_binary();
    let result = Command::new(&binary)
        .current_dir(tmp.path())
        .args([
            "process",
            "--input",
            input.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ])
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run ta binary at {:?}: {}", binary, e));
    let stdout = String::from_utf8_lossy(&result.stdout);
    let stderr = String::from_utf8_lossy(&result.stderr);

    assert!(
        result.status.success(),
        "process failed: stdout={}, stderr={}",
        stdout,
        stderr
    );
    assert!(stdout.contains("Processed 1 documents"));
    assert!(output.exists());
}

#[test]
fn test_process_with_missing_explicit_config_fails() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("raw.doc");
    let output = tmp.path().join("docs.json");
    fs::write(&input, "only one document").unwrap();

    let (_, stderr, success) = run_ta(
        &tmp.path().join("missing.toml"),
        &[
            "process",
            "--input",
            input.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ],
    );
    assert!(!success, "process should not ignore a missing --config file");
    assert!(stderr.contains("Failed to read config file"), "stderr={}", stderr);
    assert!(!output.exists());
}

#[test]
fn test_search_before_build_fails() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_ta(&config_path, &["search", "docker"]);
    assert!(!success, "search should fail without an index");
    assert!(stderr.contains("no index found"), "stderr={}", stderr);
}

#[test]
fn test_build_reports_summary() {
    let (tmp, config_path) = setup_test_env();
    run_ta(&config_path, &["process"]);

    let (stdout, stderr, success) = run_ta(&config_path, &["build", "--progress", "json"]);
    assert!(success, "build failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("documents: 3"));
    assert!(stdout.contains("dims: 128"));
    assert!(stdout.contains("model: hashed-fnv1a"));
    assert!(stderr.contains("\"phase\":\"embedding\""), "stderr={}", stderr);

    assert!(tmp.path().join("data/tds_vector_db.index").exists());
    assert!(tmp.path().join("data/tds_vector_db.docs.json").exists());
}

#[test]
fn test_search_json_ranks_exact_match_first() {
    let (_tmp, config_path) = setup_test_env();
    process_and_build(&config_path);

    let (stdout, stderr, success) = run_ta(
        &config_path,
        &[
            "search",
            "Pandas merges dataframes on shared key columns.",
            "--json",
        ],
    );
    assert!(success, "search failed: stdout={}, stderr={}", stdout, stderr);

    let hits: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let hits = hits.as_array().unwrap();
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0]["source_url"], "Unknown");
    assert_eq!(hits[0]["score"].as_f64().unwrap(), 1.0);

    let scores: Vec<f64> = hits.iter().map(|h| h["score"].as_f64().unwrap()).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_search_respects_k() {
    let (_tmp, config_path) = setup_test_env();
    process_and_build(&config_path);

    let (stdout, _, success) = run_ta(&config_path, &["search", "podman", "--k", "1", "--json"]);
    assert!(success);
    let hits: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(hits.as_array().unwrap().len(), 1);

    let (stdout, _, success) = run_ta(&config_path, &["search", "podman", "--k", "0"]);
    assert!(success);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_ask_returns_answer_and_links() {
    let (_tmp, config_path) = setup_test_env();
    process_and_build(&config_path);

    let (stdout, stderr, success) = run_ta(&config_path, &["ask", "How do I submit GA5?"]);
    assert!(success, "ask failed: stdout={}, stderr={}", stdout, stderr);

    let answer: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(answer["answer"]
        .as_str()
        .unwrap()
        .starts_with("Based on the course materials:"));
    let links = answer["links"].as_array().unwrap();
    assert_eq!(links.len(), 3);
    assert!(links
        .iter()
        .all(|l| l["text"].as_str().unwrap().ends_with("...")));
}

#[test]
fn test_stats_after_build() {
    let (_tmp, config_path) = setup_test_env();
    process_and_build(&config_path);

    let (stdout, stderr, success) = run_ta(&config_path, &["stats"]);
    assert!(success, "stats failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Documents:   3"));
    assert!(stdout.contains("Dated:       1"));
    assert!(stdout.contains("Structure:   flat-l2"));
}

#[test]
fn test_eval_pass_and_fail() {
    let (tmp, config_path) = setup_test_env();
    process_and_build(&config_path);

    let passing = tmp.path().join("pass.toml");
    fs::write(
        &passing,
        "[[case]]\nquestion = \"How do I submit GA5?\"\nexpected_keywords = [\"portal\", \"DEADLINE\"]\n",
    )
    .unwrap();
    let (stdout, stderr, success) = run_ta(&config_path, &["eval", passing.to_str().unwrap()]);
    assert!(success, "eval failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Status: PASS"));

    let failing = tmp.path().join("fail.toml");
    fs::write(
        &failing,
        "[[case]]\nquestion = \"What about Kubernetes?\"\nexpected_keywords = [\"kubernetes\"]\n",
    )
    .unwrap();
    let (stdout, _, success) = run_ta(&config_path, &["eval", failing.to_str().unwrap()]);
    assert!(!success);
    assert!(stdout.contains("Status: FAIL"));
    assert!(stdout.contains("Missing keywords: kubernetes"));
}

#[test]
fn test_invalid_config_rejected() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("bad.toml");
    fs::write(&config_path, "[index]\npath = \"x\"\n[retrieval]\ntop_k = 0\n").unwrap();

    let (_, stderr, success) = run_ta(&config_path, &["stats"]);
    assert!(!success);
    assert!(stderr.contains("top_k"), "stderr={}", stderr);
}
