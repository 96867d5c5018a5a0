//! Scripted persona material
//!
//! Everything deterministic the persona can say lives here as data: the
//! emotional tone ladder, the greeting opener, the hard-control refusal
//! table and the fallback table. The two reply tables are distinct sets
//! by contract — refusals are the late-stage safety valve, fallbacks
//! cover generation failures at any stage.

use crate::signals::Category;

/// Stage ceiling
pub const MAX_STAGE: u8 = 3;

/// Emotional tone ladder, indexed by `min(stage, 3)`
const STAGE_TONES: [&str; 4] = [
    "calm but attentive",
    "slightly confused",
    "worried and cautious",
    "firm and demanding clarity",
];

/// Fixed friendly opener for non-scam greetings
pub const GREETING_OPENER: &str = "Hey 🙂 How's it going?";

/// Tone for a given stage
pub fn tone_for_stage(stage: u8) -> &'static str {
    STAGE_TONES[stage.min(MAX_STAGE) as usize]
}

/// Hard-control refusal, keyed by category
///
/// Only disclosure-risk categories have one; anything else returns
/// `None` and stays on the generated path.
pub fn hard_refusal(category: Category) -> Option<&'static str> {
    match category {
        Category::Credentials => Some("I'm not sharing any bank, card, or personal details."),
        Category::Money => Some("I'm not sending money. Why are you asking?"),
        Category::Link => Some("I'm not clicking any link. What is it for?"),
        _ => None,
    }
}

/// Deterministic fallback when generation fails or returns nothing
pub fn fallback_line(category: Category) -> &'static str {
    match category {
        Category::Credentials => "I'm not comfortable sharing any bank or personal details.",
        Category::Money => "Why do you need money from me? What is this for?",
        Category::Link => "I don't click random links. What is it related to?",
        Category::Threat => "Who exactly are you and which organization is this?",
        Category::Other => "Can you explain what you mean?",
        Category::Greeting => "What exactly are you trying to say?",
    }
}
