//! Prompt templates for the three generator roles.
//!
//! Every prompt that expects structured output ends with the exact JSON shape
//! the corresponding [`crate::structured::Schema`] validates.

use crate::models::{RetrievedEmail, SearchResult};
use std::fmt::Write as _;

/// System prompt for the mode classifier.
pub const MODE_SYSTEM_PROMPT: &str = r"You are an AI assistant that sorts user queries into one of two modes: 'phishing_detection' or 'qa'.
- 'phishing_detection': the user supplies a specific piece of content (an email, a URL, a message) and wants a verdict on whether *that content* is a phishing attempt or safe.
- 'qa': the user asks a general question or wants information, definitions, explanations, or advice. This includes questions *about* phishing and other cybersecurity topics. The user wants knowledge, not a verdict on supplied content.

Read the query carefully and decide what the user primarily intends.";

/// Few-shot examples shown to the mode classifier.
const MODE_EXAMPLES: &str = r#"# Examples of Classification

## Example 1
User Query: "Is this email a scam? 'Subject: Urgent Account Verification. Dear user, click here http://example.com/login to verify your account.'"
Output:
{
    "reason": "The user pasted an email and asked whether it is a scam, so they want that text analyzed.",
    "mode": "phishing_detection"
}

## Example 2
User Query: "What are the common signs of a phishing email?"
Output:
{
    "reason": "The user wants general information about phishing signs and did not supply an email.",
    "mode": "qa"
}

## Example 3
User Query: "Can you check if 'http://suspicious-link.com/update-your-details' is safe?"
Output:
{
    "reason": "The user supplied a URL and asked whether it is safe.",
    "mode": "phishing_detection"
}

## Example 4
User Query: "Tell me about spear phishing."
Output:
{
    "reason": "The user asks for an explanation of a cybersecurity term.",
    "mode": "qa"
}

## Example 5
User Query: "what is a phishing attack?"
Output:
{
    "reason": "The user asks for a definition, which is a request for information.",
    "mode": "qa"
}

## Example 6
User Query: "
```
Subject: Important Update Required
Dear User,
We have detected unusual activity in your account. Please click the link below to verify your identity:
http://malicious-link.com/verify
Failure to do so may result in account suspension.
Best regards,
Your Bank
```
Is this email safe?"
Output:
{
    "reason": "The user pasted an email and asked whether it is safe.",
    "mode": "phishing_detection"
}"#;

/// Builds the user message for the mode classifier.
#[must_use]
pub fn mode_user_prompt(query: &str) -> String {
    format!(
        r#"# Instructions
Based on the user query below, decide whether the primary intent is to have a specific piece of content analyzed for phishing ('phishing_detection') or to ask a question / seek information ('qa').
Give your reasoning.

{MODE_EXAMPLES}

# User Query to Analyze
{query}

# Required Output Format
Return a JSON object with "reason" and "mode".
{{
    "reason": "Your reasoning here.",
    "mode": "phishing_detection" | "qa"
}}"#
    )
}

/// System prompt for the Q&A answerer.
pub const QA_SYSTEM_PROMPT: &str = "You are a question-answering assistant that is well-versed in cybersecurity. Your task is to answer the user's query.";

/// Builds the Q&A system message, appending search context when present.
#[must_use]
pub fn qa_system_prompt(context: &[SearchResult]) -> String {
    if context.is_empty() {
        return QA_SYSTEM_PROMPT.to_string();
    }

    let mut prompt = String::from(QA_SYSTEM_PROMPT);
    prompt.push_str(
        "\n# Context\nPlease use the following context to answer the user's query. If the context is not relevant, answer based on your general knowledge.",
    );
    for (index, doc) in context.iter().enumerate() {
        let _ = write!(prompt, "\n\n## Search Result {}\n{}", index + 1, doc.format());
    }
    prompt
}

/// System prompt for the phishing classifier.
pub const PHISHING_SYSTEM_PROMPT: &str = "You are a phishing detection assistant. Your task is to determine whether the provided email is a phishing attempt. If it is, set \"is_phishing\" to true. If it is not, set it to false.";

/// Builds the user message for the phishing classifier.
#[must_use]
pub fn phishing_user_prompt(query: &str, similar: &[RetrievedEmail]) -> String {
    let mut emails = String::new();
    for (index, email) in similar.iter().enumerate() {
        if index > 0 {
            emails.push('\n');
        }
        let _ = write!(emails, "### Email {}\n{}", index + 1, email.format());
    }
    if emails.is_empty() {
        emails.push_str("No similar emails were found.");
    }

    format!(
        r#"# User Query
{query}

# Similar Emails
{emails}

# Instructions
Decide whether the provided email is a phishing attempt. The similar emails are labeled reference examples.
Explain the reasoning behind the classification to the user in simple language, without technical jargon.
Follow the format below.

# Format
{{
    "reason": "The reason for the classification",
    "explanation": "The explanation of the classification to the user",
    "is_phishing": true | false
}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmailLabel;
    use crate::structured::extract;
    use serde_json::Map;

    #[test]
    fn test_mode_prompt_contains_query_and_format() {
        let prompt = mode_user_prompt("Tell me about smishing");
        assert!(prompt.contains("# User Query to Analyze\nTell me about smishing\n"));
        assert!(prompt.ends_with("\"mode\": \"phishing_detection\" | \"qa\"\n}"));
    }

    #[test]
    fn test_mode_examples_are_extractable() {
        // The first example in the prompt must itself be a balanced object.
        let span = extract(MODE_EXAMPLES).unwrap();
        assert!(span.contains("\"mode\": \"phishing_detection\""));
    }

    #[test]
    fn test_qa_prompt_without_context() {
        assert_eq!(qa_system_prompt(&[]), QA_SYSTEM_PROMPT);
    }

    #[test]
    fn test_qa_prompt_with_context() {
        let context = vec![
            SearchResult {
                url: "https://a.example".to_string(),
                content: "first".to_string(),
            },
            SearchResult {
                url: "https://b.example".to_string(),
                content: "second".to_string(),
            },
        ];
        let prompt = qa_system_prompt(&context);
        assert!(prompt.starts_with(QA_SYSTEM_PROMPT));
        assert!(prompt.contains("# Context"));
        assert!(prompt.contains("## Search Result 1\nURL: https://a.example"));
        assert!(prompt.contains("## Search Result 2\nURL: https://b.example"));
    }

    #[test]
    fn test_phishing_prompt_lists_similar_emails() {
        let similar = vec![RetrievedEmail {
            score: 0.5,
            text: "Claim your prize".to_string(),
            label: EmailLabel::Phishing,
            metadata: Map::new(),
        }];
        let prompt = phishing_user_prompt("Is this safe?", &similar);
        assert!(prompt.starts_with("# User Query\nIs this safe?\n"));
        assert!(prompt.contains("### Email 1\nSimilarity Score: 50.00%\nLabel: phishing"));
        assert!(prompt.contains("\"is_phishing\": true | false"));
    }

    #[test]
    fn test_phishing_prompt_without_similar_emails() {
        let prompt = phishing_user_prompt("email body", &[]);
        assert!(prompt.contains("# Similar Emails\nNo similar emails were found.\n"));
    }
}
