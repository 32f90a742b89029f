//! Heuristic password strength scoring.
//!
//! Points: +1 each for length >= 8, 12, 16 and 20; +1 per character class
//! present (lowercase, uppercase, digit, symbol); -2 once if the lowercased
//! password contains a common pattern.  Floor at 0, then bucket:
//!
//! ```text
//! 0..=2 Weak (25%)   3..=4 Fair (50%)   5..=6 Good (75%)   7.. Strong (100%)
//! ```

use std::fmt;

use serde::Serialize;

/// Characters counted as the "special" class.
const SYMBOLS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?";

/// Substrings that cost two points when present.
const COMMON_PATTERNS: [&str; 5] = ["123", "abc", "password", "qwerty", "admin"];

pub const FEEDBACK_TOO_SHORT: &str = "Use at least 8 characters";
pub const FEEDBACK_NO_LOWERCASE: &str = "Add lowercase letters";
pub const FEEDBACK_NO_UPPERCASE: &str = "Add uppercase letters";
pub const FEEDBACK_NO_DIGIT: &str = "Add numbers";
pub const FEEDBACK_NO_SYMBOL: &str = "Add special characters";
pub const FEEDBACK_COMMON_PATTERN: &str = "Avoid common patterns";

/// Four-tier strength label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Strength {
    Weak,
    Fair,
    Good,
    Strong,
}

impl Strength {
    fn from_score(score: u32) -> Self {
        match score {
            0..=2 => Self::Weak,
            3..=4 => Self::Fair,
            5..=6 => Self::Good,
            _ => Self::Strong,
        }
    }

    pub fn percentage(self) -> u8 {
        match self {
            Self::Weak => 25,
            Self::Fair => 50,
            Self::Good => 75,
            Self::Strong => 100,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weak => "Weak",
            Self::Fair => "Fair",
            Self::Good => "Good",
            Self::Strong => "Strong",
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of scoring one password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrengthReport {
    pub score: u32,
    pub strength: Strength,
    pub percentage: u8,
    pub feedback: Vec<String>,
}

/// Score `password`. Pure and deterministic.
pub fn score(password: &str) -> StrengthReport {
    let length = password.chars().count();
    let mut points: i32 = 0;
    let mut feedback = Vec::new();

    for threshold in [8, 12, 16, 20] {
        if length >= threshold {
            points += 1;
        }
    }
    if length < 8 {
        feedback.push(FEEDBACK_TOO_SHORT.to_string());
    }

    let classes = [
        (password.chars().any(char::is_lowercase), FEEDBACK_NO_LOWERCASE),
        (password.chars().any(char::is_uppercase), FEEDBACK_NO_UPPERCASE),
        (password.chars().any(|c| c.is_ascii_digit()), FEEDBACK_NO_DIGIT),
        (password.chars().any(|c| SYMBOLS.contains(c)), FEEDBACK_NO_SYMBOL),
    ];
    for (present, hint) in classes {
        if present {
            points += 1;
        } else {
            feedback.push(hint.to_string());
        }
    }

    let lowered = password.to_lowercase();
    if COMMON_PATTERNS.iter().any(|p| lowered.contains(p)) {
        points -= 2;
        feedback.push(FEEDBACK_COMMON_PATTERN.to_string());
    }

    let score = u32::try_from(points.max(0)).unwrap_or(0);
    let strength = Strength::from_score(score);

    StrengthReport {
        score,
        strength,
        percentage: strength.percentage(),
        feedback,
    }
}
