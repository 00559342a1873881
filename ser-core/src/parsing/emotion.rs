//! `[EMOTION:<n>]` tag parser

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use super::parser::OutputParser;

// ASCII and full-width digits only; other scripts' digits are not tags.
static EMOTION_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[EMOTION:([0-9０-９]+)\]").unwrap());

/// Decimal value of a run of ASCII or full-width digits; `None` on overflow.
fn parse_label(digits: &str) -> Option<u32> {
    digits.chars().try_fold(0u32, |acc, c| {
        let digit = match c {
            '0'..='9' => c as u32 - '0' as u32,
            '０'..='９' => c as u32 - '０' as u32,
            _ => return None,
        };
        acc.checked_mul(10)?.checked_add(digit)
    })
}

/// The six emotion classes, numbered as in the recognition prompt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    #[default]
    Normal = 0,
    Happy = 1,
    Tired = 2,
    Confident = 3,
    Afraid = 4,
    Shy = 5,
}

impl Emotion {
    pub const ALL: [Emotion; 6] = [
        Emotion::Normal,
        Emotion::Happy,
        Emotion::Tired,
        Emotion::Confident,
        Emotion::Afraid,
        Emotion::Shy,
    ];

    /// Map a numeric label to an emotion; `None` outside `0..=5`.
    pub fn from_label(label: u32) -> Option<Self> {
        Self::ALL.get(label as usize).copied()
    }

    pub fn label(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Emotion::Normal => "normal",
            Emotion::Happy => "happy",
            Emotion::Tired => "tired",
            Emotion::Confident => "confident",
            Emotion::Afraid => "afraid",
            Emotion::Shy => "shy",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Emotion {
    type Err = String;

    /// Accepts either the name (`"happy"`) or the numeric label (`"1"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(label) = s.parse::<u32>() {
            return Emotion::from_label(label).ok_or_else(|| format!("unknown emotion label {s}"));
        }
        Emotion::ALL
            .into_iter()
            .find(|e| e.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown emotion '{s}'"))
    }
}

/// Parsed emotion reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionResult {
    /// Recognised emotion (always in range)
    pub emotion: Emotion,
    /// Reply text with the tag removed and whitespace trimmed
    pub text: String,
}

impl EmotionResult {
    pub fn label(&self) -> u8 {
        self.emotion.label()
    }
}

/// Extracts the emotion tag from a recognition reply.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmotionParser;

impl EmotionParser {
    pub fn new() -> Self {
        Self
    }
}

impl OutputParser for EmotionParser {
    type Output = EmotionResult;

    fn parse(&self, raw: &str) -> EmotionResult {
        let Some(caps) = EMOTION_TAG_RE.captures(raw) else {
            return EmotionResult {
                emotion: Emotion::Normal,
                text: raw.trim().to_string(),
            };
        };

        let digits = &caps[1];
        let emotion = match parse_label(digits).and_then(Emotion::from_label) {
            Some(emotion) => emotion,
            None => {
                tracing::warn!(label = digits, "Emotion label out of range, using normal");
                Emotion::Normal
            }
        };

        let text = EMOTION_TAG_RE.replace_all(raw, "").trim().to_string();
        EmotionResult { emotion, text }
    }

    fn can_parse(&self, raw: &str) -> bool {
        EMOTION_TAG_RE.is_match(raw)
    }

    fn name(&self) -> &'static str {
        "emotion"
    }
}
