//! 検索関連の共通型

/// 検索方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    /// 前方検索
    Forward,
    /// 後方検索
    Backward,
}

/// 検索オプション
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub case_sensitive: bool,
    pub wrap_around: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            wrap_around: true,
        }
    }
}

/// マッチ範囲（文字インデックス、`end` は排他的）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
}

impl MatchSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// マッチ長（文字数）
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// 検索でヒットしたマッチ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchHit {
    pub span: MatchSpan,
    /// 端で折り返して見つかったか
    pub wrapped: bool,
}

/// 検索エンジンの変更イベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    /// パターンまたはオプションが変わった
    QueryChanged,
    /// 現在のマッチが変わった（`None` は見つからなかった）
    MatchChanged(Option<SearchHit>),
    /// マッチを1件置換した
    Replaced(MatchSpan),
    /// 一括置換が完了した
    ReplacedAll(usize),
}
