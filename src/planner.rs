use crate::plan::{Plan, Step, ToolKind};
use serde_json::json;

/// Very small deterministic planner.
///
/// Intentionally conservative: it recognizes a handful of common intents and
/// otherwise produces a single clarification step, so the executor always
/// has *something* well-formed to run.
pub fn build_plan(query: &str) -> Plan {
    let q = query.trim();
    let q_lower = q.to_lowercase();

    // Weather, optionally followed by a summary of the result.
    if q_lower.contains("weather") || q_lower.contains("temperature") {
        let location = extract_location(q).unwrap_or_else(|| "New York".to_string());
        let mut steps = vec![Step::new(
            "step_1",
            ToolKind::Weather,
            json!({"location": location}),
        )];
        if q_lower.contains("summar") {
            steps.push(
                Step::new(
                    "step_2",
                    ToolKind::Summarize,
                    json!({"text": "{{step_1.output}}"}),
                )
                .depends_on(["step_1"]),
            );
        }
        return Plan::new("Get weather and optionally summarize", steps);
    }

    // Time in a timezone.
    if q_lower.contains("time") && find_ci(q, " in ").is_some() {
        let timezone = after_marker(q, " in ")
            .map(|rest| rest.trim().trim_end_matches(['?', '.', '!']).trim().to_string())
            .filter(|tz| !tz.is_empty())
            .unwrap_or_else(|| "Asia/Kolkata".to_string());
        return Plan::new(
            "Get current time",
            vec![Step::new(
                "step_1",
                ToolKind::TimeIn,
                json!({"timezone": timezone}),
            )],
        );
    }

    // Arithmetic.
    let has_operator = ['+', '-', '*', '/', '^'].iter().any(|op| q.contains(*op));
    if q_lower.starts_with("calculate") || (q.chars().any(|c| c.is_ascii_digit()) && has_operator)
    {
        let expression = if q_lower.starts_with("calculate") {
            q["calculate".len()..].trim()
        } else {
            q
        };
        let expression = if expression.is_empty() { q } else { expression };
        return Plan::new(
            "Evaluate arithmetic",
            vec![Step::new(
                "step_1",
                ToolKind::Calculate,
                json!({"expression": expression}),
            )],
        );
    }

    // Encyclopedia-style lookup.
    if q_lower.starts_with("who is")
        || q_lower.starts_with("what is")
        || q_lower.contains("tell me about")
    {
        let mut topic = q;
        for prefix in ["who is", "what is", "tell me about"] {
            if topic
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
            {
                topic = topic[prefix.len()..].trim_start();
            }
        }
        let topic = topic.trim().trim_end_matches(['?', ' ']).to_string();
        return Plan::new(
            "Look up a topic",
            vec![Step::new(
                "step_1",
                ToolKind::WikipediaSummary,
                json!({"query": topic}),
            )],
        );
    }

    // Fallback: ask for clarification via a summarize step.
    Plan::new(
        "Clarification needed",
        vec![Step::new(
            "step_1",
            ToolKind::Summarize,
            json!({
                "text": "I can help with weather, Wikipedia summaries, calculations, and time zones. \
                         Can you rephrase your request or specify what you'd like?"
            }),
        )],
    )
}

/// Case-insensitive substring search (ASCII).
fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

fn after_marker<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    // The byte offset from the ASCII-case-insensitive search is a valid char
    // boundary because the needle is pure ASCII.
    find_ci(text, marker).map(|pos| &text[pos + marker.len()..])
}

/// Grab a location phrase following "in" or "for": letters, spaces and a few
/// punctuation marks, at least three characters long.
fn extract_location(query: &str) -> Option<String> {
    for marker in [" in ", " for "] {
        let Some(rest) = after_marker(query, marker) else {
            continue;
        };
        let phrase: String = rest
            .chars()
            .take_while(|c| c.is_alphabetic() || matches!(c, ' ' | ',' | '.' | '-'))
            .collect();
        let phrase = phrase
            .trim()
            .trim_end_matches(['.', ',', '-'])
            .trim()
            .to_string();
        if phrase.chars().count() >= 3 {
            return Some(phrase);
        }
    }
    None
}
