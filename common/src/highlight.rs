//! ハイライト表示モジュール
//!
//! 検出した成分の出現箇所をマーカーで囲んだテキストを生成する。

use crate::matcher::Occurrence;

/// 出現箇所を `open` / `close` で囲む
///
/// 出現は位置順に処理し、先に囲んだ範囲と重なる出現は読み飛ばす
/// （"sodium benzoate" を囲んだ後の "benzoate" など）。
pub fn highlight(text: &str, occurrences: &[Occurrence], open: &str, close: &str) -> String {
    let mut ordered: Vec<&Occurrence> = occurrences.iter().collect();
    ordered.sort_by_key(|occ| (occ.start, std::cmp::Reverse(occ.end)));

    let mut out = String::with_capacity(text.len() + occurrences.len() * (open.len() + close.len()));
    let mut cursor = 0;

    for occ in ordered {
        if occ.start < cursor
            || occ.end > text.len()
            || !text.is_char_boundary(occ.start)
            || !text.is_char_boundary(occ.end)
        {
            continue;
        }

        out.push_str(&text[cursor..occ.start]);
        out.push_str(open);
        out.push_str(&text[occ.start..occ.end]);
        out.push_str(close);
        cursor = occ.end;
    }

    out.push_str(&text[cursor..]);
    out
}
