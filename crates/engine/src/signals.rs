//! Signal classification
//!
//! Pure keyword classification of a single message into a coarse intent
//! category, plus the identity-shift claim predicate. The rules live in
//! ordered tables so they can be tested and extended without touching
//! control flow.
//!
//! Note: these per-category tables and the scam detector's signal list
//! (see `detector`) are maintained separately on purpose — the detector
//! gates admission with stronger multi-word signals, while these tables
//! only steer the persona's reply strategy.

use serde::{Deserialize, Serialize};

/// Coarse intent category of a counterparty message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Asking for money or payment
    Money,
    /// Fishing for bank/card/UPI credentials
    Credentials,
    /// Pushing a link
    Link,
    /// Urgency or account-threat pressure
    Threat,
    /// Plain greeting
    Greeting,
    /// Anything else
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Money => "money",
            Category::Credentials => "credentials",
            Category::Link => "link",
            Category::Threat => "threat",
            Category::Greeting => "greeting",
            Category::Other => "other",
        }
    }

    /// Categories that mark a session as scam-indicative on sight
    pub fn is_scam_signal(&self) -> bool {
        matches!(
            self,
            Category::Money | Category::Credentials | Category::Link | Category::Threat
        )
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

const MONEY_KEYWORDS: &[&str] = &[
    "send money",
    "transfer",
    "pay",
    "payment",
    "rupees",
    "rs",
    "inr",
];

const CREDENTIAL_KEYWORDS: &[&str] = &[
    "bank details",
    "account number",
    "upi id",
    "upi",
    "card",
    "cvv",
    "pin",
    "otp",
];

const LINK_MARKERS: &[&str] = &["http", "click"];

const THREAT_KEYWORDS: &[&str] = &[
    "kyc",
    "verify",
    "blocked",
    "suspended",
    "urgent",
    "immediately",
];

/// Greetings match the whole trimmed message exactly, not as substrings
const GREETINGS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "how are you",
    "good morning",
    "good evening",
];

const IDENTITY_SHIFT_CLAIMS: &[&str] = &[
    "your friend",
    "this is your friend",
    "bank officer",
    "customer care",
    "support team",
];

/// Ordered rule table; first match wins
const CATEGORY_RULES: &[(Category, &[&str])] = &[
    (Category::Money, MONEY_KEYWORDS),
    (Category::Credentials, CREDENTIAL_KEYWORDS),
    (Category::Link, LINK_MARKERS),
    (Category::Threat, THREAT_KEYWORDS),
];

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Classify a message into its intent category
///
/// Pure and total: any text, including the empty string, maps to a
/// category. Evaluation is first-match over the ordered substring
/// tables, then exact-match greetings, then `Other`.
pub fn classify(text: &str) -> Category {
    let t = text.to_lowercase();
    let t = t.trim();

    for (category, keywords) in CATEGORY_RULES {
        if contains_any(t, keywords) {
            return *category;
        }
    }

    if GREETINGS.contains(&t) {
        return Category::Greeting;
    }

    Category::Other
}

/// Does the sender claim to be someone they are not?
///
/// Independent of `classify`; a message can be `Other` and still carry
/// an identity-shift claim.
pub fn claims_identity_shift(text: &str) -> bool {
    let t = text.to_lowercase();
    contains_any(&t, IDENTITY_SHIFT_CLAIMS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_takes_priority() {
        // "pay" (money) and "click" (link) both present; money wins
        assert_eq!(classify("Pay now or click this"), Category::Money);
    }

    #[test]
    fn test_credentials() {
        assert_eq!(classify("share your OTP"), Category::Credentials);
        assert_eq!(classify("what is your CVV"), Category::Credentials);
        assert_eq!(classify("give me your UPI id"), Category::Credentials);
    }

    #[test]
    fn test_link() {
        assert_eq!(classify("open http://x.test"), Category::Link);
        assert_eq!(classify("just click here"), Category::Link);
    }

    #[test]
    fn test_threat() {
        assert_eq!(classify("Your bank account is blocked"), Category::Threat);
        assert_eq!(classify("act immediately"), Category::Threat);
    }

    #[test]
    fn test_greeting_is_exact_match() {
        assert_eq!(classify("hi"), Category::Greeting);
        assert_eq!(classify("  Hello  "), Category::Greeting);
        // Greeting word embedded in a longer message is not a greeting
        assert_eq!(classify("hi there, nice weather"), Category::Other);
    }

    #[test]
    fn test_other_and_empty() {
        assert_eq!(classify(""), Category::Other);
        assert_eq!(classify("see you at lunch"), Category::Other);
    }

    #[test]
    fn test_identity_shift() {
        assert!(claims_identity_shift("This is your friend from abroad"));
        assert!(claims_identity_shift("I am a Bank Officer"));
        assert!(claims_identity_shift("calling from customer care"));
        assert!(!claims_identity_shift("hello there"));
    }

    #[test]
    fn test_identity_shift_is_independent_of_category() {
        let text = "this is your friend";
        assert_eq!(classify(text), Category::Other);
        assert!(claims_identity_shift(text));
    }
}
