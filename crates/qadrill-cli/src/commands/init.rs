//! The `qadrill init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create qadrill.toml
    if std::path::Path::new("qadrill.toml").exists() {
        println!("qadrill.toml already exists, skipping.");
    } else {
        std::fs::write("qadrill.toml", SAMPLE_CONFIG)?;
        println!("Created qadrill.toml");
    }

    // Create example question set
    std::fs::create_dir_all("question-sets")?;
    let example_path = std::path::Path::new("question-sets/example.toml");
    if example_path.exists() {
        println!("question-sets/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUESTION_SET)?;
        println!("Created question-sets/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit qadrill.toml with your API key");
    println!("  2. Register yourself: qadrill user add --email you@example.com");
    println!("  3. Run: qadrill validate --questions question-sets/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# qadrill configuration

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

[providers.ollama]
type = "ollama"
base_url = "http://localhost:11434"

default_provider = "openai"
default_model = "gpt-4o-mini"
default_temperature = 0.0
credentials_path = "data/credentials.json"
reports_dir = "reports"

[categories]
test-design = """
You are a software test design assistant. Answer questions about test
case design, equivalence partitioning, and boundary value analysis.
"""
feature-triage = """
You are a feature triage assistant. Help classify application features
for test planning purposes.
"""
"#;

const EXAMPLE_QUESTION_SET: &str = r#"[question_set]
id = "example"
name = "Example Drill"
description = "A small starter drill"

[[questions]]
ref_number = "1.1"
ref_page = "2-4"
category = "What is testing?"
text = "Name four consequences of software not working as expected."
answer_count = 4
correct_answers = [
    "economic loss",
    "wasted time",
    "loss of trust",
    "injury and death",
]
evaluation_criteria = """
Score each part on meaning, not wording:
1. Any phrasing of monetary or economic loss is acceptable.
2. Any phrasing of lost time or wasted effort is acceptable.
3. Any phrasing of damaged reputation or lost trust is acceptable.
4. Any phrasing of harm to people is acceptable.
"""

[[questions]]
ref_number = "1.2.3"
ref_page = "21"
category = "Errors, defects, and failures"
text = "What do we call the human action that produces a defect?"
answer_count = 1
correct_answers = ["error"]
"#;
