//! Static content shown around the conversation.

/// Quick-start prompts offered before the first exchange.
pub const SUGGESTED_PROMPTS: [&str; 6] = [
    "Check Dr. Ahuja's availability tomorrow morning",
    "Book appointment with Dr. Sharma on Friday",
    "What slots does Dr. Ahuja have this week?",
    "I need to see a cardiologist",
    "How many appointments do I have today?",
    "Generate summary report for yesterday",
];

/// Doctors listed in the header bar, with their specialty.
pub const DOCTORS: [(&str, &str); 2] = [("Dr. Ahuja", "Cardiology"), ("Dr. Sharma", "Pediatrics")];

/// Look up a suggested prompt by zero-based index.
#[must_use]
pub fn suggested(index: usize) -> Option<&'static str> {
    SUGGESTED_PROMPTS.get(index).copied()
}
