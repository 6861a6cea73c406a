//! Heuristic tool-intent classification.
//!
//! Decides whether tool schemas should be offered to the model for a given
//! utterance. This is a cost/latency optimization, not a correctness gate:
//! a false negative only means a slower path (the model simply answers
//! without tools), a false positive costs one extra schema payload.

use regex::Regex;
use std::sync::LazyLock;

// Compiled once, reused across calls.
static TOOL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    let pats = [
        // Time and date
        r"(?i)\b(what|which)\b.*\b(time|date|day)\b",
        r"(?i)\btime\s+is\s+it\b",
        // Memory
        r"(?i)\bremember\b",
        r"(?i)\bdon'?t\s+forget\b",
        r"(?i)\bdo\s+you\s+(know|recall)\b",
        r"(?i)\bwhat\s+do\s+you\s+know\s+about\b",
        // Reminders and scheduling
        r"(?i)\bremind\s+me\b",
        r"(?i)\bset\s+a\s+reminder\b",
        r"(?i)\b(calendar|schedule|meeting|appointment)\b",
        // Location
        r"(?i)\bwhere\s+am\s+i\b",
        r"(?i)\bmy\s+location\b",
        r"(?i)\bnear\s+me\b",
    ];
    pats.iter()
        .map(|p| Regex::new(p).expect("Invalid tool intent regex"))
        .collect()
});

/// Keyword/heuristic classifier for tool access.
#[derive(Debug, Default, Clone, Copy)]
pub struct ToolIntentClassifier;

impl ToolIntentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Whether the message looks like it needs tool access.
    pub fn should_offer_tools(&self, message: &str) -> bool {
        TOOL_PATTERNS.iter().any(|re| re.is_match(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offers(msg: &str) -> bool {
        ToolIntentClassifier::new().should_offer_tools(msg)
    }

    #[test]
    fn test_time_questions_offer_tools() {
        assert!(offers("what time is it?"));
        assert!(offers("What day is it today"));
    }

    #[test]
    fn test_memory_phrases_offer_tools() {
        assert!(offers("remember that I prefer green tea"));
        assert!(offers("do you know my sister's name?"));
        assert!(offers("don't forget the garage code is 4411"));
    }

    #[test]
    fn test_reminder_and_calendar_offer_tools() {
        assert!(offers("remind me to water the plants"));
        assert!(offers("what's on my calendar tomorrow"));
        assert!(offers("schedule a meeting with Ana"));
    }

    #[test]
    fn test_location_offers_tools() {
        assert!(offers("where am I right now?"));
        assert!(offers("any good bakeries near me"));
    }

    #[test]
    fn test_small_talk_withholds_tools() {
        assert!(!offers("hello there"));
        assert!(!offers("tell me a joke"));
        assert!(!offers("how are you feeling"));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(offers("REMIND ME to stretch"));
    }
}
