//! 検索用マッチャー
//!
//! 正規表現は使わないリテラル一致。大文字小文字を区別しない場合は
//! ロケール非依存の小文字化で1文字ずつ比較する。正規化は行わない。

use super::types::MatchSpan;

/// リテラルマッチャー
#[derive(Debug, Clone, Default)]
pub struct LiteralMatcher {
    pattern: Vec<char>,
    case_sensitive: bool,
}

impl LiteralMatcher {
    /// インスタンスを作成
    pub fn new(pattern: &str, case_sensitive: bool) -> Self {
        Self {
            pattern: pattern.chars().collect(),
            case_sensitive,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    /// パターン長（文字数）
    pub fn len(&self) -> usize {
        self.pattern.len()
    }

    /// `start` から始まる位置で一致するか
    pub fn matches_at(&self, chars: &[char], start: usize) -> bool {
        if self.pattern.is_empty() || start + self.pattern.len() > chars.len() {
            return false;
        }
        chars[start..start + self.pattern.len()]
            .iter()
            .zip(&self.pattern)
            .all(|(a, b)| chars_equal(*a, *b, self.case_sensitive))
    }

    /// 開始位置が `from..until` にある最初のマッチ
    pub fn find_forward(&self, chars: &[char], from: usize, until: usize) -> Option<MatchSpan> {
        if self.pattern.is_empty() || self.pattern.len() > chars.len() {
            return None;
        }
        let last_start = (chars.len() - self.pattern.len()).min(until.saturating_sub(1));
        if from > last_start || until == 0 {
            return None;
        }
        (from..=last_start)
            .find(|&start| self.matches_at(chars, start))
            .map(|start| self.span_at(start))
    }

    /// 終了位置が `after..=before` にある最後のマッチ
    pub fn find_backward(&self, chars: &[char], before: usize, after: usize) -> Option<MatchSpan> {
        if self.pattern.is_empty() || self.pattern.len() > chars.len() {
            return None;
        }
        let len = self.pattern.len();
        let max_end = before.min(chars.len());
        let min_end = after.max(len);
        if max_end < min_end {
            return None;
        }
        (min_end..=max_end)
            .rev()
            .map(|end| end - len)
            .find(|&start| self.matches_at(chars, start))
            .map(|start| self.span_at(start))
    }

    /// 重ならないすべてのマッチ
    pub fn find_all(&self, text: &str) -> Vec<MatchSpan> {
        let chars: Vec<char> = text.chars().collect();
        let mut matches = Vec::new();
        let mut pos = 0;
        while let Some(span) = self.find_forward(&chars, pos, chars.len()) {
            pos = span.end;
            matches.push(span);
        }
        matches
    }

    fn span_at(&self, start: usize) -> MatchSpan {
        MatchSpan::new(start, start + self.pattern.len())
    }
}

fn chars_equal(a: char, b: char, case_sensitive: bool) -> bool {
    if case_sensitive || a == b {
        return a == b;
    }
    a.to_lowercase().eq(b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    #[test]
    fn finds_basic_matches() {
        let matcher = LiteralMatcher::new("hello", true);
        let result = matcher.find_all("hello world hello");
        assert_eq!(result, vec![MatchSpan::new(0, 5), MatchSpan::new(12, 17)]);
    }

    #[test]
    fn returns_empty_for_non_match() {
        let matcher = LiteralMatcher::new("z", true);
        assert!(matcher.find_all("abc").is_empty());
    }

    #[test]
    fn supports_case_insensitive() {
        let matcher = LiteralMatcher::new("NEEDLE", false);
        let text = chars("hay needle stack");
        assert_eq!(
            matcher.find_forward(&text, 0, text.len()),
            Some(MatchSpan::new(4, 10))
        );

        let strict = LiteralMatcher::new("NEEDLE", true);
        assert_eq!(strict.find_forward(&text, 0, text.len()), None);
    }

    #[test]
    fn forward_respects_limit() {
        let matcher = LiteralMatcher::new("a", true);
        let text = chars("a b a");
        assert_eq!(matcher.find_forward(&text, 1, text.len()), Some(MatchSpan::new(4, 5)));
        assert_eq!(matcher.find_forward(&text, 1, 4), None);
        assert_eq!(matcher.find_forward(&text, 0, 1), Some(MatchSpan::new(0, 1)));
    }

    #[test]
    fn backward_finds_match_ending_before_offset() {
        let matcher = LiteralMatcher::new("ab", true);
        let text = chars("ab ab ab");
        assert_eq!(matcher.find_backward(&text, 6, 0), Some(MatchSpan::new(3, 5)));
        assert_eq!(matcher.find_backward(&text, 1, 0), None);
        assert_eq!(
            matcher.find_backward(&text, text.len(), 6),
            Some(MatchSpan::new(6, 8))
        );
    }

    #[test]
    fn find_all_is_non_overlapping() {
        let matcher = LiteralMatcher::new("aa", true);
        assert_eq!(matcher.find_all("aaaa").len(), 2);
    }

    #[test]
    fn empty_pattern_never_matches() {
        let matcher = LiteralMatcher::new("", false);
        let text = chars("anything");
        assert!(matcher.is_empty());
        assert_eq!(matcher.find_forward(&text, 0, text.len()), None);
        assert_eq!(matcher.find_backward(&text, text.len(), 0), None);
    }

    #[test]
    fn multibyte_offsets_are_char_based() {
        let matcher = LiteralMatcher::new("ß", false);
        let text = chars("straße STRASSE");
        assert_eq!(matcher.find_forward(&text, 0, text.len()), Some(MatchSpan::new(4, 5)));
    }
}
