//! 有害成分照合モジュール
//!
//! OCRテキストから成分リストの各成分名を単語単位で検出する。
//!
//! ## 照合ルール
//! - 大文字小文字を区別しない
//! - 出現の直前・直後が英数字なら不一致（"nitrated" は "nitrate" に一致しない）
//! - 複数語の成分名の語間は、テキスト側の任意の空白の連続（改行を含む）に一致
//! - 結果はテキスト中の出現順ではなく、成分リストの順に並ぶ
//! - 空の成分名は一致しない

use crate::substances::SubstanceList;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// テキスト中の成分の出現位置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    /// 成分リスト上の名前
    pub substance: String,
    /// 開始バイト位置
    pub start: usize,
    /// 終了バイト位置（排他）
    pub end: usize,
    /// テキスト上の表記そのまま
    pub text: String,
}

/// コンパイル済みの成分パターン
#[derive(Debug, Clone)]
struct SubstancePattern {
    name: String,
    /// 空の名前は None（一致しない）
    compiled: Option<Compiled>,
}

/// 成分名の照合方式
#[derive(Debug, Clone)]
enum Compiled {
    Regex(Regex),
    /// 正規表現のサイズ上限を超える長い名前用。語ごとの小文字化済み文字列
    Literal(Vec<Vec<char>>),
}

impl SubstancePattern {
    fn compile(name: &str) -> Self {
        let words: Vec<&str> = name.split_whitespace().collect();

        let compiled = if words.is_empty() {
            None
        } else {
            let pattern = words.iter().map(|w| regex::escape(w)).collect::<Vec<_>>().join(r"\s+");
            match RegexBuilder::new(&pattern).case_insensitive(true).build() {
                Ok(regex) => Some(Compiled::Regex(regex)),
                Err(_) => Some(Compiled::literal(&words)),
            }
        };

        Self {
            name: name.to_string(),
            compiled,
        }
    }

    /// 最初の単語境界付き出現
    fn find_first(&self, text: &str) -> Option<(usize, usize)> {
        self.compiled.as_ref()?.find_bounded(text, 0)
    }

    /// 単語境界付き出現をすべて列挙（同一成分内では重ならない）
    fn find_all(&self, text: &str) -> Vec<(usize, usize)> {
        let Some(compiled) = self.compiled.as_ref() else {
            return Vec::new();
        };

        let mut spans = Vec::new();
        let mut start = 0;
        while let Some((s, e)) = compiled.find_bounded(text, start) {
            spans.push((s, e));
            start = e;
        }
        spans
    }
}

impl Compiled {
    fn literal(words: &[&str]) -> Self {
        Compiled::Literal(
            words
                .iter()
                .map(|w| w.chars().flat_map(char::to_lowercase).collect())
                .collect(),
        )
    }

    /// `start` 以降の最初の出現（境界は見ない）
    fn find_at(&self, text: &str, start: usize) -> Option<(usize, usize)> {
        match self {
            Compiled::Regex(regex) => regex.find_at(text, start).map(|m| (m.start(), m.end())),
            Compiled::Literal(words) => text[start..]
                .char_indices()
                .find_map(|(i, _)| literal_match_at(text, start + i, words).map(|end| (start + i, end))),
        }
    }

    /// `start` 以降で前後が英数字に接しない最初の出現を探す
    fn find_bounded(&self, text: &str, mut start: usize) -> Option<(usize, usize)> {
        while start < text.len() {
            let (s, e) = self.find_at(text, start)?;
            if is_word_bounded(text, s, e) {
                return Some((s, e));
            }
            // 1文字ずらして再探索（境界を満たさない出現に重なる出現を取りこぼさない）
            start = s + text[s..].chars().next().map_or(1, char::len_utf8);
        }
        None
    }
}

/// `at` から語の並びに一致すれば終了位置を返す
///
/// 語間はテキスト側の1文字以上の空白に一致する。
fn literal_match_at(text: &str, at: usize, words: &[Vec<char>]) -> Option<usize> {
    let mut chars = text[at..].chars().peekable();
    let mut pos = at;

    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            let mut gap = 0;
            while let Some(c) = chars.next_if(|c| c.is_whitespace()) {
                pos += c.len_utf8();
                gap += 1;
            }
            if gap == 0 {
                return None;
            }
        }

        // 小文字化で1文字が複数文字になる場合に備え、テキスト側も小文字化して比べる
        let mut expected = word.iter().peekable();
        while expected.peek().is_some() {
            let c = chars.next()?;
            for lower in c.to_lowercase() {
                if expected.next() != Some(&lower) {
                    return None;
                }
            }
            pos += c.len_utf8();
        }
    }

    Some(pos)
}

fn is_word_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

/// 成分リストをコンパイルした照合器
///
/// 一度構築すれば複数のテキストに使い回せる。内部状態を持たないため
/// スレッド間で共有してよい。
#[derive(Debug, Clone)]
pub struct SubstanceMatcher {
    patterns: Vec<SubstancePattern>,
}

impl SubstanceMatcher {
    pub fn new<S: AsRef<str>>(substances: &[S]) -> Self {
        let mut patterns: Vec<SubstancePattern> = Vec::with_capacity(substances.len());
        for name in substances {
            let name = name.as_ref();
            // 同名エントリは最初の1つだけ残す
            if patterns.iter().any(|p| p.name == name) {
                continue;
            }
            patterns.push(SubstancePattern::compile(name));
        }
        Self { patterns }
    }

    pub fn from_list(list: &SubstanceList) -> Self {
        Self::new(list.names())
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// テキストに含まれる成分名を成分リストの順で返す
    pub fn find(&self, text: &str) -> Vec<String> {
        self.patterns
            .iter()
            .filter(|p| p.find_first(text).is_some())
            .map(|p| p.name.clone())
            .collect()
    }

    /// すべての出現を位置順で返す（ハイライト表示用）
    ///
    /// 同じ開始位置では長い出現を先に、さらに同じ長さならリスト順に並べる。
    pub fn find_occurrences(&self, text: &str) -> Vec<Occurrence> {
        let mut indexed: Vec<(usize, Occurrence)> = Vec::new();

        for (index, pattern) in self.patterns.iter().enumerate() {
            for (start, end) in pattern.find_all(text) {
                indexed.push((
                    index,
                    Occurrence {
                        substance: pattern.name.clone(),
                        start,
                        end,
                        text: text[start..end].to_string(),
                    },
                ));
            }
        }

        indexed.sort_by_key(|(index, occ)| (occ.start, Reverse(occ.end), *index));
        indexed.into_iter().map(|(_, occ)| occ).collect()
    }
}

/// テキストに含まれる成分名を成分リストの順で返す
///
/// 1回限りの照合用。同じリストを何度も使う場合は [`SubstanceMatcher`] を構築する。
///
/// # Examples
/// ```
/// use label_scan_common::find_substances;
///
/// let found = find_substances("INGREDIENTS: SUGAR, RED\n40, MSG.", &["msg", "sugar alcohol", "red 40"]);
/// assert_eq!(found, vec!["msg", "red 40"]);
/// ```
pub fn find_substances<S: AsRef<str>>(text: &str, substances: &[S]) -> Vec<String> {
    SubstanceMatcher::new(substances).find(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_substance_in_text() {
        let found = find_substances("Ingredients: water, sugar, salt.", &["msg", "nitrate"]);
        assert!(found.is_empty());
    }

    #[test]
    fn test_case_insensitive() {
        for text in ["msg", "MSG", "Msg", "contains mSg"] {
            assert_eq!(find_substances(text, &["msg"]), names(&["msg"]), "text: {}", text);
        }
    }

    #[test]
    fn test_each_substance_matches_itself_once() {
        let list = SubstanceList::default_list();
        let matcher = SubstanceMatcher::from_list(&list);
        for name in &list {
            let found = matcher.find(name);
            assert_eq!(found.iter().filter(|f| *f == name).count(), 1, "substance: {}", name);
        }
    }

    #[test]
    fn test_result_follows_list_order() {
        let found = find_substances("c then a", &["a", "b", "c"]);
        assert_eq!(found, names(&["a", "c"]));
    }

    #[test]
    fn test_whole_word_rejects_longer_tokens() {
        assert!(find_substances("cured with nitrated salt", &["nitrate"]).is_empty());
        assert!(find_substances("nitrates-free bacon", &["nitrate"]).is_empty());
        assert!(find_substances("nonitrate", &["nitrate"]).is_empty());
        assert!(find_substances("nitrate2", &["nitrate"]).is_empty());
    }

    #[test]
    fn test_whole_word_accepts_punctuation() {
        assert_eq!(find_substances("contains nitrate.", &["nitrate"]), names(&["nitrate"]));
        assert_eq!(find_substances("Nitrate, salt", &["nitrate"]), names(&["nitrate"]));
        assert_eq!(find_substances("(sodium nitrite)", &["nitrite"]), names(&["nitrite"]));
        assert_eq!(find_substances("nitrate-free", &["nitrate"]), names(&["nitrate"]));
    }

    #[test]
    fn test_bounded_occurrence_after_unbounded_one() {
        // 先頭の "nitrates" は不一致だが、後続の "nitrate" は一致する
        let found = find_substances("nitrates and nitrate", &["nitrate"]);
        assert_eq!(found, names(&["nitrate"]));
    }

    #[test]
    fn test_overlapping_candidate_is_not_missed() {
        // "xab ab" の位置は境界を満たさないが、重なる "ab ab" は満たす
        let found = find_substances("xab ab ab", &["ab ab"]);
        assert_eq!(found, names(&["ab ab"]));
    }

    #[test]
    fn test_multi_word_across_line_wrap() {
        let found = find_substances("artificial color: red\n40 added", &["red 40"]);
        assert_eq!(found, names(&["red 40"]));

        let found = find_substances("POLYSORBATE \r\n\t 80", &["polysorbate 80"]);
        assert_eq!(found, names(&["polysorbate 80"]));
    }

    #[test]
    fn test_multi_word_requires_whitespace_between_words() {
        assert!(find_substances("red40", &["red 40"]).is_empty());
        assert!(find_substances("red-40", &["red 40"]).is_empty());
        assert!(find_substances("red 400", &["red 40"]).is_empty());
    }

    #[test]
    fn test_substance_with_regex_metacharacters() {
        let found = find_substances("contains benzo[a]pyrene traces", &["benzo[a]pyrene", "n-hexane"]);
        assert_eq!(found, names(&["benzo[a]pyrene"]));
        assert!(find_substances("benzoXaXpyrene", &["benzo[a]pyrene"]).is_empty());
    }

    #[test]
    fn test_empty_inputs() {
        let list = SubstanceList::default_list();
        assert!(find_substances("", list.names()).is_empty());
        let empty: [&str; 0] = [];
        assert!(find_substances("msg nitrate", &empty).is_empty());
    }

    #[test]
    fn test_empty_substance_never_matches() {
        let found = find_substances("msg", &["", "   ", "msg"]);
        assert_eq!(found, names(&["msg"]));
        assert!(find_substances("", &[""]).is_empty());
    }

    #[test]
    fn test_duplicate_entries_reported_once() {
        let found = find_substances("msg", &["msg", "msg"]);
        assert_eq!(found, names(&["msg"]));
    }

    #[test]
    fn test_unicode_neighbours() {
        // 英字以外の英数字（全角・アクセント付き文字）も境界として扱う
        assert!(find_substances("écaramel coloring", &["caramel coloring"]).is_empty());
        assert!(find_substances("原材料MSG砂糖", &["msg"]).is_empty());
        // 全角の区切り記号は英数字ではない
        assert_eq!(find_substances("原材料：MSG、砂糖", &["msg"]), names(&["msg"]));
    }

    #[test]
    fn test_idempotent() {
        let list = SubstanceList::default_list();
        let text = "Sugar, Sodium Benzoate, Red 40, Sucralose";
        let first = find_substances(text, list.names());
        let second = find_substances(text, list.names());
        assert_eq!(first, second);
        assert_eq!(first, names(&["benzoate", "red 40", "sodium benzoate", "sucralose"]));
    }

    #[test]
    fn test_find_occurrences_positions() {
        let matcher = SubstanceMatcher::new(&["benzoate", "sodium benzoate", "msg"]);
        let text = "MSG, Sodium Benzoate";
        let occurrences = matcher.find_occurrences(text);

        assert_eq!(occurrences.len(), 3);
        assert_eq!(occurrences[0].substance, "msg");
        assert_eq!((occurrences[0].start, occurrences[0].end), (0, 3));
        assert_eq!(occurrences[0].text, "MSG");
        assert_eq!(occurrences[1].substance, "sodium benzoate");
        assert_eq!(occurrences[1].text, "Sodium Benzoate");
        assert_eq!(occurrences[2].substance, "benzoate");
        assert_eq!(occurrences[2].text, "Benzoate");
    }

    #[test]
    fn test_find_occurrences_repeated() {
        let matcher = SubstanceMatcher::new(&["msg"]);
        let occurrences = matcher.find_occurrences("msg; MSG; msgs");
        let spans: Vec<(usize, usize)> = occurrences.iter().map(|o| (o.start, o.end)).collect();
        assert_eq!(spans, vec![(0, 3), (5, 8)]);
    }

    #[test]
    fn test_literal_fallback_rules() {
        let compiled = Compiled::literal(&["Red", "40"]);
        assert_eq!(compiled.find_bounded("color: RED\n 40.", 0), Some((7, 14)));
        assert_eq!(compiled.find_bounded("red40", 0), None);
        assert_eq!(compiled.find_bounded("red 400, red 40", 0), Some((9, 15)));
        assert_eq!(compiled.find_bounded("xred 40", 0), None);
        assert_eq!(compiled.find_bounded("原材料：red\t40、砂糖", 0), Some((12, 18)));
    }

    #[test]
    fn test_very_long_name_still_matches() {
        // 正規表現のサイズ上限を超える長さの名前
        let name = "ab".repeat(100_000);
        let text = format!("contains {}, salt", name.to_uppercase());

        let matcher = SubstanceMatcher::new(&[name.as_str(), "salt"]);
        assert_eq!(matcher.find(&text), vec![name.clone(), "salt".to_string()]);

        let occurrences = matcher.find_occurrences(&text);
        assert_eq!((occurrences[0].start, occurrences[0].end), (9, 9 + name.len()));
    }

    #[test]
    fn test_matcher_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SubstanceMatcher>();
    }
}
