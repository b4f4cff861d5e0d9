//! LLM prompt for playbook extraction.
//!
//! The JSON shape in this prompt is a contract with
//! [`parse_extraction_response`](super::extract::parse_extraction_response):
//! change one and the other must follow.

/// Extraction prompt. `{content}` is replaced with the document text.
pub const EXTRACTION_PROMPT: &str = r#"Extract a structured playbook from this text. Return ONLY valid JSON:
{
  "task_name": "Short title",
  "steps": [{"step": 1, "action": "command", "description": "what it does"}],
  "common_failures": [{"issue": "problem", "fix": "solution"}]
}

Text:
{content}"#;

/// Format the extraction prompt for a document.
pub fn format_extraction_prompt(content: &str) -> String {
    EXTRACTION_PROMPT.replace("{content}", content)
}
