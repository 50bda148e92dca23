use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RpyError;

/// Target languages offered by the menu, in menu order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TargetLanguage {
    Arabic,
    ChineseSimplified,
    Dutch,
    Finnish,
    #[default]
    French,
    German,
    Hindi,
    Italian,
    Japanese,
    Korean,
    Norwegian,
    Portuguese,
    Spanish,
    Swedish,
    Turkish,
    Ukrainian,
}

impl TargetLanguage {
    pub const ALL: [TargetLanguage; 16] = [
        Self::Arabic,
        Self::ChineseSimplified,
        Self::Dutch,
        Self::Finnish,
        Self::French,
        Self::German,
        Self::Hindi,
        Self::Italian,
        Self::Japanese,
        Self::Korean,
        Self::Norwegian,
        Self::Portuguese,
        Self::Spanish,
        Self::Swedish,
        Self::Turkish,
        Self::Ukrainian,
    ];

    /// Identifier written into `translate <identifier>` directives and used
    /// as the batch output directory name.
    pub fn identifier(&self) -> &'static str {
        match self {
            Self::Arabic => "arabic",
            Self::ChineseSimplified => "zh-CN",
            Self::Dutch => "dutch",
            Self::Finnish => "finnish",
            Self::French => "french",
            Self::German => "german",
            Self::Hindi => "hindi",
            Self::Italian => "italian",
            Self::Japanese => "japanese",
            Self::Korean => "korean",
            Self::Norwegian => "norwegian",
            Self::Portuguese => "portuguese",
            Self::Spanish => "spanish",
            Self::Swedish => "swedish",
            Self::Turkish => "turkish",
            Self::Ukrainian => "ukrainian",
        }
    }

    /// Language code understood by the translation services.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Arabic => "ar",
            Self::ChineseSimplified => "zh-CN",
            Self::Dutch => "nl",
            Self::Finnish => "fi",
            Self::French => "fr",
            Self::German => "de",
            Self::Hindi => "hi",
            Self::Italian => "it",
            Self::Japanese => "ja",
            Self::Korean => "ko",
            Self::Norwegian => "no",
            Self::Portuguese => "pt",
            Self::Spanish => "es",
            Self::Swedish => "sv",
            Self::Turkish => "tr",
            Self::Ukrainian => "uk",
        }
    }

    pub fn english_name(&self) -> &'static str {
        match self {
            Self::Arabic => "Arabic",
            Self::ChineseSimplified => "Simplified Chinese",
            Self::Dutch => "Dutch",
            Self::Finnish => "Finnish",
            Self::French => "French",
            Self::German => "German",
            Self::Hindi => "Hindi",
            Self::Italian => "Italian",
            Self::Japanese => "Japanese",
            Self::Korean => "Korean",
            Self::Norwegian => "Norwegian",
            Self::Portuguese => "Portuguese",
            Self::Spanish => "Spanish",
            Self::Swedish => "Swedish",
            Self::Turkish => "Turkish",
            Self::Ukrainian => "Ukrainian",
        }
    }

    /// One-based position in the interactive menu.
    pub fn menu_key(&self) -> usize {
        Self::ALL
            .iter()
            .position(|lang| lang == self)
            .map(|idx| idx + 1)
            .unwrap_or_default()
    }

    pub fn from_menu_key(key: &str) -> Option<Self> {
        let idx: usize = key.trim().parse().ok()?;
        idx.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for TargetLanguage {
    type Err = RpyError;

    /// Accepts a menu key, an identifier or a service code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(lang) = Self::from_menu_key(s) {
            return Ok(lang);
        }

        let wanted = s.trim();
        Self::ALL
            .iter()
            .find(|lang| {
                lang.identifier().eq_ignore_ascii_case(wanted)
                    || lang.code().eq_ignore_ascii_case(wanted)
            })
            .copied()
            .ok_or_else(|| RpyError::UnknownLanguage(s.to_string()))
    }
}

impl TryFrom<String> for TargetLanguage {
    type Error = RpyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TargetLanguage> for String {
    fn from(lang: TargetLanguage) -> Self {
        lang.identifier().to_string()
    }
}
