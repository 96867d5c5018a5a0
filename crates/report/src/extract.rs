//! Intelligence extraction
//!
//! Regex tables compiled once at startup. Matches are returned in
//! transcript order, duplicates included — repetition is itself signal.

use once_cell::sync::Lazy;
use regex::Regex;

/// Bank-account-like sequences: 9 to 18 contiguous digits as a bounded token
static ACCOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{9,18}\b").expect("account regex is valid"));

/// Payment-handle-like tokens: local part @ alphabetic provider
static HANDLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._-]+@[A-Za-z]+").expect("handle regex is valid"));

/// URLs: http(s)-prefixed tokens
static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://\S+").expect("url regex is valid"));

fn find_all(re: &Regex, text: &str) -> Vec<String> {
    re.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

/// Extract bank-account-like digit sequences
pub fn extract_accounts(text: &str) -> Vec<String> {
    find_all(&ACCOUNT_RE, text)
}

/// Extract UPI-style payment handles
pub fn extract_handles(text: &str) -> Vec<String> {
    find_all(&HANDLE_RE, text)
}

/// Extract URLs
pub fn extract_urls(text: &str) -> Vec<String> {
    find_all(&URL_RE, text)
}
