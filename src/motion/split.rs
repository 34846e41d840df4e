//! Text splitting into independently animated units.
//!
//! Splitting is lossless: `join(&split(text, unit), unit) == text` for every
//! input, so whitespace is kept as its own unit instead of being collapsed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SplitUnit {
    /// One unit per Unicode code point.
    #[default]
    Char,
    /// Split on single ASCII spaces. Runs of spaces yield empty units.
    Word,
    /// Split on `\n`.
    Line,
}

impl SplitUnit {
    /// Separator dropped by `split` and restored by `join`.
    pub fn separator(self) -> &'static str {
        match self {
            SplitUnit::Char => "",
            SplitUnit::Word => " ",
            SplitUnit::Line => "\n",
        }
    }
}

/// Smallest text fragment animated on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextUnit {
    pub index: usize,
    pub content: String,
}

impl TextUnit {
    /// Whitespace-only units still occupy layout width (rendered narrow).
    pub fn is_blank(&self) -> bool {
        self.content.chars().all(char::is_whitespace)
    }
}

pub fn split(text: &str, unit: SplitUnit) -> Vec<TextUnit> {
    if text.is_empty() {
        return Vec::new();
    }

    let pieces: Vec<String> = match unit {
        SplitUnit::Char => text.chars().map(String::from).collect(),
        SplitUnit::Word => text.split(' ').map(String::from).collect(),
        SplitUnit::Line => text.split('\n').map(String::from).collect(),
    };

    pieces
        .into_iter()
        .enumerate()
        .map(|(index, content)| TextUnit { index, content })
        .collect()
}

pub fn join(units: &[TextUnit], unit: SplitUnit) -> String {
    units
        .iter()
        .map(|u| u.content.as_str())
        .collect::<Vec<_>>()
        .join(unit.separator())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn contents(units: &[TextUnit]) -> Vec<&str> {
        units.iter().map(|u| u.content.as_str()).collect()
    }

    #[test]
    fn empty_text_yields_no_units() {
        assert!(split("", SplitUnit::Char).is_empty());
        assert!(split("", SplitUnit::Word).is_empty());
        assert!(split("", SplitUnit::Line).is_empty());
    }

    #[test]
    fn chars_keep_spaces_and_multibyte_code_points() {
        let units = split("Ок ai", SplitUnit::Char);

        assert_eq!(contents(&units), vec!["О", "к", " ", "a", "i"]);
        assert!(units[2].is_blank());
        assert_eq!(units[4].index, 4);
    }

    #[test]
    fn words_split_on_single_space() {
        let units = split("eat  more greens", SplitUnit::Word);

        assert_eq!(contents(&units), vec!["eat", "", "more", "greens"]);
    }

    #[test]
    fn whitespace_only_text_is_not_dropped() {
        assert_eq!(split("   ", SplitUnit::Char).len(), 3);
        assert_eq!(split("  ", SplitUnit::Word).len(), 3);
        assert_eq!(split("\n", SplitUnit::Line).len(), 2);
    }

    #[test]
    fn lines_split_on_newline() {
        let units = split("Track\nyour\nmeals", SplitUnit::Line);

        assert_eq!(contents(&units), vec!["Track", "your", "meals"]);
    }

    fn any_unit() -> impl Strategy<Value = SplitUnit> {
        prop_oneof![
            Just(SplitUnit::Char),
            Just(SplitUnit::Word),
            Just(SplitUnit::Line),
        ]
    }

    proptest! {
        #[test]
        fn split_then_join_round_trips(text in "\\PC*|[ \\n a-z]*", unit in any_unit()) {
            let units = split(&text, unit);
            prop_assert_eq!(join(&units, unit), text);
        }

        #[test]
        fn unit_indices_follow_source_order(text in "[ a-zA-Z\\n]{0,40}", unit in any_unit()) {
            let units = split(&text, unit);
            for (i, u) in units.iter().enumerate() {
                prop_assert_eq!(u.index, i);
            }
        }
    }
}
