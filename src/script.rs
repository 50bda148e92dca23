//! Line rewriting for Ren'Py `.rpy` scripts.
//!
//! Each line is classified on its own text alone and either kept as-is or
//! replaced by a commented copy of the original followed by the translated
//! statement. Lines whose quoted text already contains Cyrillic are treated
//! as translated and never sent to the backend.

use std::borrow::Cow;
use std::ops::{Add, AddAssign};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use crate::language::TargetLanguage;
use crate::translate::SafeTranslator;

static BRACKET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?\]").expect("valid regex"));
static OLD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^(\s*)old\s*(".*")"#).expect("valid regex"));
static NEW_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^(\s*)new\s*(".*")"#).expect("valid regex"));
static CHARACTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(\s*)(\w+)\s*(".*")"#).expect("valid regex"));
static QUOTED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^(\s*).*?"([^"]+)""#).expect("valid regex"));

const SOURCE_DIRECTIVE: &str = "translate english";

/// What a single script line is, in the order the checks are made
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Contains a `[...]` span, usually an interpolated variable
    Bracketed,
    /// `old "..."`: the source side of a string translation
    Old,
    /// `new "..."`
    New { indent: &'a str, quoted: &'a str },
    /// `speaker "..."`
    Character { indent: &'a str, speaker: &'a str, quoted: &'a str },
    /// Any other line with a non-empty `"..."` span; `text` excludes the quotes
    Quoted { indent: &'a str, text: &'a str },
    Plain,
}

impl LineKind<'_> {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bracketed => "bracketed",
            Self::Old => "old",
            Self::New { .. } => "new",
            Self::Character { .. } => "character",
            Self::Quoted { .. } => "quoted",
            Self::Plain => "plain",
        }
    }
}

/// Classify a line (without its line terminator).
pub fn classify(line: &str) -> LineKind<'_> {
    if BRACKET_RE.is_match(line) {
        return LineKind::Bracketed;
    }

    if OLD_RE.is_match(line) {
        return LineKind::Old;
    }

    if let Some(caps) = NEW_RE.captures(line) {
        return LineKind::New {
            indent: caps.get(1).map_or("", |m| m.as_str()),
            quoted: caps.get(2).map_or("", |m| m.as_str()),
        };
    }

    if let Some(caps) = CHARACTER_RE.captures(line) {
        return LineKind::Character {
            indent: caps.get(1).map_or("", |m| m.as_str()),
            speaker: caps.get(2).map_or("", |m| m.as_str()),
            quoted: caps.get(3).map_or("", |m| m.as_str()),
        };
    }

    if let Some(caps) = QUOTED_RE.captures(line) {
        return LineKind::Quoted {
            indent: caps.get(1).map_or("", |m| m.as_str()),
            text: caps.get(2).map_or("", |m| m.as_str()),
        };
    }

    LineKind::Plain
}

/// True if any char falls in the Cyrillic block U+0400..=U+04FF.
pub fn contains_cyrillic(text: &str) -> bool {
    text.chars().any(|c| ('\u{0400}'..='\u{04FF}').contains(&c))
}

/// Running totals for a file or a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslationStats {
    pub translated_lines: usize,
    pub source_chars: usize,
    pub translated_chars: usize,
}

impl TranslationStats {
    pub fn record(&mut self, source: &str, translated: &str) {
        self.translated_lines += 1;
        self.source_chars += source.chars().count();
        self.translated_chars += translated.chars().count();
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl AddAssign for TranslationStats {
    fn add_assign(&mut self, rhs: Self) {
        self.translated_lines += rhs.translated_lines;
        self.source_chars += rhs.source_chars;
        self.translated_chars += rhs.translated_chars;
    }
}

impl Add for TranslationStats {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

/// Result of rewriting one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite<'a> {
    /// Emit this text in place of the input line
    Kept(Cow<'a, str>),
    /// Emit `comment` then `replacement`
    Translated {
        comment: String,
        replacement: String,
        stats: TranslationStats,
    },
}

impl Rewrite<'_> {
    pub fn lines(&self) -> Vec<&str> {
        match self {
            Self::Kept(line) => vec![line.as_ref()],
            Self::Translated { comment, replacement, .. } => vec![comment.as_str(), replacement.as_str()],
        }
    }

    pub fn stats(&self) -> TranslationStats {
        match self {
            Self::Kept(_) => TranslationStats::default(),
            Self::Translated { stats, .. } => *stats,
        }
    }
}

/// Rewrites script lines for one target language
#[derive(Debug, Clone)]
pub struct Transducer {
    target: TargetLanguage,
    rewrite_directive: bool,
}

impl Transducer {
    pub fn new(target: TargetLanguage, rewrite_directive: bool) -> Self {
        Self {
            target,
            rewrite_directive,
        }
    }

    /// Replace `translate english` with `translate <target>` when enabled.
    pub fn apply_directive<'a>(&self, line: &'a str) -> Cow<'a, str> {
        if self.rewrite_directive && line.contains(SOURCE_DIRECTIVE) {
            Cow::Owned(line.replace(SOURCE_DIRECTIVE, &format!("translate {}", self.target.identifier())))
        } else {
            Cow::Borrowed(line)
        }
    }

    /// Rewrite a single line (without its line terminator).
    pub async fn rewrite_line<'a>(&self, line: &'a str, translator: &SafeTranslator) -> Rewrite<'a> {
        if BRACKET_RE.is_match(line) {
            return Rewrite::Kept(Cow::Borrowed(line));
        }

        let line = self.apply_directive(line);

        // Captures borrow from `line`; take owned copies before it can be moved out.
        let kind = classify(&line);
        let label = kind.label();
        let plan = match kind {
            LineKind::New { indent, quoted } if !contains_cyrillic(quoted) => {
                Some((indent.to_string(), Some("new".to_string()), quoted.trim_matches('"').to_string()))
            }
            LineKind::Character { indent, speaker, quoted } if !contains_cyrillic(quoted) => {
                Some((indent.to_string(), Some(speaker.to_string()), quoted.trim_matches('"').to_string()))
            }
            LineKind::Quoted { indent, text } if !contains_cyrillic(text) => {
                Some((indent.to_string(), None, text.to_string()))
            }
            _ => None,
        };

        let Some((indent, head, source)) = plan else {
            return Rewrite::Kept(line);
        };

        let translated = translator.translate(&source, self.target).await;

        let mut stats = TranslationStats::default();
        stats.record(&source, &translated);

        info!("Translated {}: {} -> {}", label, source, translated);

        let comment = format!("{}# {}", indent, line.trim());
        let replacement = match head {
            Some(head) => format!("{}{} \"{}\"", indent, head, translated),
            None => format!("{}\"{}\"", indent, translated),
        };

        Rewrite::Translated {
            comment,
            replacement,
            stats,
        }
    }

    /// Rewrite a sequence of lines in order, returning the emitted lines and totals.
    pub async fn rewrite_lines<'a, I>(&self, lines: I, translator: &SafeTranslator) -> (Vec<String>, TranslationStats)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut output = Vec::new();
        let mut stats = TranslationStats::default();

        for line in lines {
            let rewrite = self.rewrite_line(line, translator).await;
            stats += rewrite.stats();
            output.extend(rewrite.lines().into_iter().map(str::to_string));
        }

        (output, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use async_trait::async_trait;

    use crate::error::{Result, RpyError};
    use crate::translate::Translator;
    use crate::translate::safe::SafePolicy;

    /// Dictionary-backed translator; unknown strings fail.
    struct DictionaryTranslator(HashMap<&'static str, &'static str>);

    #[async_trait]
    impl Translator for DictionaryTranslator {
        async fn translate(&self, text: &str, _target: TargetLanguage) -> Result<String> {
            self.0
                .get(text)
                .map(|t| t.to_string())
                .ok_or_else(|| RpyError::Translation(format!("no entry for {}", text)))
        }
    }

    fn translator(entries: &[(&'static str, &'static str)]) -> SafeTranslator {
        let dictionary = DictionaryTranslator(entries.iter().copied().collect());
        SafeTranslator::new(Box::new(dictionary), SafePolicy::default())
    }

    fn rewrite(transducer: &Transducer, line: &str, safe: &SafeTranslator) -> (Vec<String>, TranslationStats) {
        tokio_test::block_on(transducer.rewrite_lines([line], safe))
    }

    fn french() -> Transducer {
        Transducer::new(TargetLanguage::French, false)
    }

    #[test]
    fn test_classify_precedence() {
        assert_eq!(classify(r#"    new "Hello [name]""#), LineKind::Bracketed);
        assert_eq!(classify(r#"    old "Hello""#), LineKind::Old);
        assert_eq!(classify(r#"old"Hello""#), LineKind::Old);
        assert_eq!(
            classify(r#"    new "Hello""#),
            LineKind::New { indent: "    ", quoted: r#""Hello""# }
        );
        assert_eq!(
            classify(r#"  e "Hi" with dissolve"#),
            LineKind::Character { indent: "  ", speaker: "e", quoted: r#""Hi""# }
        );
        assert_eq!(
            classify(r#"    $ renpy.notify("Saved")"#),
            LineKind::Quoted { indent: "    ", text: "Saved" }
        );
        assert_eq!(classify("label start:"), LineKind::Plain);
        assert_eq!(classify(""), LineKind::Plain);
    }

    #[test]
    fn test_classify_character_quote_is_greedy() {
        assert_eq!(
            classify(r#"e "one" "two""#),
            LineKind::Character { indent: "", speaker: "e", quoted: r#""one" "two""# }
        );
    }

    #[test]
    fn test_classify_skips_empty_quotes() {
        assert_eq!(
            classify(r#"    $ x = "" + "tail""#),
            LineKind::Quoted { indent: "    ", text: " + " }
        );
        assert_eq!(classify(r#"    $ x = """#), LineKind::Plain);
    }

    #[test]
    fn test_contains_cyrillic_block_bounds() {
        assert!(contains_cyrillic("Привет"));
        assert!(contains_cyrillic("ёж"));
        assert!(contains_cyrillic("\u{0400}"));
        assert!(contains_cyrillic("\u{04FF}"));
        assert!(!contains_cyrillic("\u{0500}"));
        assert!(!contains_cyrillic("Hello"));
    }

    #[test]
    fn test_new_line_translated() {
        let safe = translator(&[("Hello there", "Bonjour")]);
        let (lines, stats) = rewrite(&french(), r#"    new "Hello there""#, &safe);

        assert_eq!(lines, vec![r#"    # new "Hello there""#, r#"    new "Bonjour""#]);
        assert_eq!(
            stats,
            TranslationStats { translated_lines: 1, source_chars: 11, translated_chars: 7 }
        );
    }

    #[test]
    fn test_old_line_kept() {
        let safe = translator(&[("Bonjour", "Hello")]);
        let (lines, stats) = rewrite(&french(), r#"    old "Bonjour""#, &safe);

        assert_eq!(lines, vec![r#"    old "Bonjour""#]);
        assert!(stats.is_empty());
    }

    #[test]
    fn test_character_line_translated() {
        let safe = translator(&[("I agree.", "D'accord.")]);
        let (lines, stats) = rewrite(&french(), r#"    Alice "I agree.""#, &safe);

        assert_eq!(lines, vec![r#"    # Alice "I agree.""#, r#"    Alice "D'accord.""#]);
        assert_eq!(stats.translated_lines, 1);
        assert_eq!(stats.source_chars, 8);
        assert_eq!(stats.translated_chars, 9);
    }

    #[test]
    fn test_generic_line_drops_surroundings() {
        let safe = translator(&[("Some text", "Du texte")]);
        let (lines, stats) = rewrite(&french(), r#"    "Some text" extra stuff"#, &safe);

        assert_eq!(
            lines,
            vec![r#"    # "Some text" extra stuff"#, r#"    "Du texte""#]
        );
        assert_eq!(stats.translated_lines, 1);

        let safe = translator(&[("Saved", "Enregistré")]);
        let (lines, _) = rewrite(&french(), r#"    $ renpy.notify("Saved")"#, &safe);
        assert_eq!(lines, vec![r#"    # $ renpy.notify("Saved")"#, r#"    "Enregistré""#]);
    }

    #[test]
    fn test_bracket_line_kept_even_with_directive() {
        let safe = translator(&[]);
        let transducer = Transducer::new(TargetLanguage::French, true);
        let line = r#"translate english [scene]: "Hi""#;
        let (lines, stats) = rewrite(&transducer, line, &safe);

        assert_eq!(lines, vec![line]);
        assert!(stats.is_empty());
    }

    #[test]
    fn test_cyrillic_lines_kept() {
        let safe = translator(&[]);
        for line in [
            r#"    new "Привет""#,
            r#"    e "Как дела?""#,
            r#"    $ renpy.notify("Сохранено")"#,
        ] {
            let (lines, stats) = rewrite(&french(), line, &safe);
            assert_eq!(lines, vec![line]);
            assert!(stats.is_empty());
        }
    }

    #[test]
    fn test_directive_rewrite() {
        let safe = translator(&[]);
        let transducer = Transducer::new(TargetLanguage::German, true);

        let (lines, _) = rewrite(&transducer, "translate english strings:", &safe);
        assert_eq!(lines, vec!["translate german strings:"]);

        // disabled: untouched
        let (lines, _) = rewrite(&french(), "translate english strings:", &safe);
        assert_eq!(lines, vec!["translate english strings:"]);

        // no directive: no-op
        assert_eq!(transducer.apply_directive("label start:"), Cow::Borrowed("label start:"));
    }

    #[test]
    fn test_directive_rewrite_applies_before_old() {
        let safe = translator(&[]);
        let transducer = Transducer::new(TargetLanguage::Spanish, true);
        let (lines, _) = rewrite(&transducer, r#"    old "translate english""#, &safe);
        assert_eq!(lines, vec![r#"    old "translate spanish""#]);
    }

    #[test]
    fn test_failed_translation_keeps_text_but_counts() {
        let safe = translator(&[]);
        let (lines, stats) = rewrite(&french(), r#"  new "Unknown""#, &safe);

        assert_eq!(lines, vec![r#"  # new "Unknown""#, r#"  new "Unknown""#]);
        assert_eq!(
            stats,
            TranslationStats { translated_lines: 1, source_chars: 7, translated_chars: 7 }
        );
    }

    #[test]
    fn test_kept_lines_are_fixed_points() {
        let safe = translator(&[]);
        let transducer = Transducer::new(TargetLanguage::French, true);
        let input = [
            "label start:",
            r#"    old "Bonjour""#,
            r#"    e "Hello [player]""#,
            r#"    new "Привет""#,
            "translate english strings:",
        ];

        let (first, _) = tokio_test::block_on(transducer.rewrite_lines(input, &safe));
        let (second, stats) =
            tokio_test::block_on(transducer.rewrite_lines(first.iter().map(String::as_str), &safe));

        assert_eq!(first, second);
        assert!(stats.is_empty());
    }

    #[test]
    fn test_rewrite_lines_preserves_order_and_sums() {
        let safe = translator(&[("Hi", "Salut"), ("Bye", "Au revoir")]);
        let input = ["label start:", r#"    e "Hi""#, r#"    old "x""#, r#"    e "Bye""#];
        let (lines, stats) = tokio_test::block_on(french().rewrite_lines(input, &safe));

        assert_eq!(
            lines,
            vec![
                "label start:",
                r#"    # e "Hi""#,
                r#"    e "Salut""#,
                r#"    old "x""#,
                r#"    # e "Bye""#,
                r#"    e "Au revoir""#,
            ]
        );
        assert_eq!(
            stats,
            TranslationStats { translated_lines: 2, source_chars: 5, translated_chars: 14 }
        );
    }

    #[test]
    fn test_stats_add() {
        let a = TranslationStats { translated_lines: 1, source_chars: 2, translated_chars: 3 };
        let b = TranslationStats { translated_lines: 4, source_chars: 5, translated_chars: 6 };
        assert_eq!(
            a + b,
            TranslationStats { translated_lines: 5, source_chars: 7, translated_chars: 9 }
        );
    }
}
