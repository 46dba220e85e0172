//! 成分リストモジュール
//!
//! 照合対象の成分名を順序付きで保持する。
//! 順序は出力順を決めるだけで、優先度の意味は持たない。

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// 組み込みの成分リスト（発がん性・神経毒性が懸念される添加物）
pub const DEFAULT_SUBSTANCES: &[&str] = &[
    "aspartame",
    "benzoate",
    "butylated hydroxyanisole",
    "butylated hydroxytoluene",
    "caramel coloring",
    "msg",
    "nitrate",
    "nitrite",
    "polysorbate 80",
    "propylene glycol",
    "red 40",
    "yellow 5",
    "yellow 6",
    "sodium benzoate",
    "sucralose",
];

/// 順序付き成分リスト
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SubstanceList {
    names: Vec<String>,
}

/// JSONの受け付け形式: `["a", "b"]` または `{"substances": ["a", "b"]}`
#[derive(Deserialize)]
#[serde(untagged)]
enum SubstanceListJson {
    Names(Vec<String>),
    Wrapped { substances: Vec<String> },
}

impl SubstanceList {
    /// 名前の列から構築
    ///
    /// 前後の空白を除去し、空の名前と重複（大文字小文字・空白の違いを無視）は
    /// 最初の出現を残して取り除く。
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::default();
        for name in names {
            list.push(name.into());
        }
        list
    }

    /// 組み込みリスト
    pub fn default_list() -> Self {
        Self::new(DEFAULT_SUBSTANCES.iter().copied())
    }

    /// JSON文字列から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let names = match serde_json::from_str::<SubstanceListJson>(json)? {
            SubstanceListJson::Names(names) => names,
            SubstanceListJson::Wrapped { substances } => substances,
        };
        Ok(Self::new(names))
    }

    /// テキストから読み込み（1行1成分、空行と `#` コメントは無視）
    pub fn from_text(text: &str) -> Self {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    /// ファイルから読み込み（非WASM環境のみ）
    ///
    /// 拡張子が `.json` ならJSON、それ以外はテキストとして扱う。
    #[cfg(not(feature = "wasm"))]
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            Self::from_json(&content)
        } else {
            Ok(Self::from_text(&content))
        }
    }

    /// 別リストを後ろに追加（既存の名前は追加しない）
    pub fn merge(&mut self, other: &SubstanceList) {
        for name in &other.names {
            self.push(name.clone());
        }
    }

    /// 名前を含むか（大文字小文字・空白の違いを無視）
    pub fn contains(&self, name: &str) -> bool {
        let key = dedup_key(name);
        self.names.iter().any(|n| dedup_key(n) == key)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.names.iter()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn push(&mut self, name: String) {
        let trimmed = name.trim();
        if trimmed.is_empty() || self.contains(trimmed) {
            return;
        }
        self.names.push(trimmed.to_string());
    }
}

impl<'a> IntoIterator for &'a SubstanceList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}

fn dedup_key(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
