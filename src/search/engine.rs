//! 検索エンジン
//!
//! バッファは所有せず、操作ごとに借用する。最後に報告したマッチは
//! バッファのリビジョンと組で覚えておき、内容が変わった後の置換は
//! `StaleMatch` として拒否する。

use super::matcher::LiteralMatcher;
use super::types::{MatchSpan, SearchDirection, SearchEvent, SearchHit, SearchOptions};
use crate::buffer::notifier::{ChangeListener, ChangeNotifier, ListenerId};
use crate::buffer::{DocumentBuffer, Edit};
use crate::error::{Result, SearchError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ReportedMatch {
    span: MatchSpan,
    revision: u64,
}

/// 検索エンジン
#[derive(Debug, Default)]
pub struct SearchEngine {
    pattern: String,
    options: SearchOptions,
    matcher: LiteralMatcher,
    last_match: Option<ReportedMatch>,
    notifier: ChangeNotifier<SearchEvent>,
}

impl SearchEngine {
    pub fn new(options: SearchOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn options(&self) -> SearchOptions {
        self.options
    }

    pub fn is_active(&self) -> bool {
        !self.pattern.is_empty()
    }

    /// 最後に報告したマッチ
    pub fn last_match(&self) -> Option<MatchSpan> {
        self.last_match.map(|m| m.span)
    }

    /// 最後のマッチが現在の内容でも有効か
    pub fn has_valid_match(&self, buffer: &DocumentBuffer) -> bool {
        self.last_match
            .is_some_and(|m| m.revision == buffer.revision())
    }

    /// クエリを設定（カーソル移動も検索もしない）
    pub fn set_pattern(&mut self, pattern: &str, case_sensitive: bool, wrap_around: bool) {
        let options = SearchOptions {
            case_sensitive,
            wrap_around,
        };
        if pattern == self.pattern && options == self.options {
            return;
        }
        self.pattern = pattern.to_string();
        self.options = options;
        self.matcher = LiteralMatcher::new(pattern, case_sensitive);
        self.last_match = None;
        self.notifier.notify(&SearchEvent::QueryChanged);
    }

    /// 前方検索。`from` 省略時は選択終端（無ければカーソル）から
    pub fn find_next(
        &mut self,
        buffer: &mut DocumentBuffer,
        from: Option<usize>,
    ) -> Option<SearchHit> {
        let from = from.unwrap_or_else(|| {
            buffer
                .selection()
                .map(|(_, end)| end)
                .unwrap_or_else(|| buffer.cursor())
        });
        self.find(buffer, from, SearchDirection::Forward)
    }

    /// 後方検索。`from` 省略時は選択始端（無ければカーソル）から
    pub fn find_previous(
        &mut self,
        buffer: &mut DocumentBuffer,
        from: Option<usize>,
    ) -> Option<SearchHit> {
        let from = from.unwrap_or_else(|| {
            buffer
                .selection()
                .map(|(start, _)| start)
                .unwrap_or_else(|| buffer.cursor())
        });
        self.find(buffer, from, SearchDirection::Backward)
    }

    fn find(
        &mut self,
        buffer: &mut DocumentBuffer,
        from: usize,
        direction: SearchDirection,
    ) -> Option<SearchHit> {
        if self.matcher.is_empty() {
            return None;
        }

        let chars: Vec<char> = buffer.content().chars().collect();
        let from = from.min(chars.len());
        let hit = match direction {
            SearchDirection::Forward => self.scan_forward(&chars, from),
            SearchDirection::Backward => self.scan_backward(&chars, from),
        };

        match hit {
            Some(hit) => {
                buffer.select_range(hit.span.start, hit.span.end);
                self.last_match = Some(ReportedMatch {
                    span: hit.span,
                    revision: buffer.revision(),
                });
                if hit.wrapped {
                    log::debug!("Search for {:?} wrapped", self.pattern);
                }
            }
            None => self.last_match = None,
        }
        self.notifier.notify(&SearchEvent::MatchChanged(hit));
        hit
    }

    fn scan_forward(&self, chars: &[char], from: usize) -> Option<SearchHit> {
        if let Some(span) = self.matcher.find_forward(chars, from, chars.len()) {
            return Some(SearchHit {
                span,
                wrapped: false,
            });
        }
        if !self.options.wrap_around {
            return None;
        }
        // 開始位置より前で始まるマッチだけを対象にする
        self.matcher
            .find_forward(chars, 0, from)
            .map(|span| SearchHit {
                span,
                wrapped: true,
            })
    }

    fn scan_backward(&self, chars: &[char], from: usize) -> Option<SearchHit> {
        if let Some(span) = self.matcher.find_backward(chars, from, 0) {
            return Some(SearchHit {
                span,
                wrapped: false,
            });
        }
        if !self.options.wrap_around {
            return None;
        }
        self.matcher
            .find_backward(chars, chars.len(), from + 1)
            .map(|span| SearchHit {
                span,
                wrapped: true,
            })
    }

    /// 最後に報告したマッチを置換する
    ///
    /// `(start, end)` が最後のマッチと異なるか、その後に内容が変わっていれば
    /// `StaleMatch` で失敗し、内容は変更しない。成功時は置換後の範囲を選択し、
    /// 最後のマッチをその範囲へ更新する。
    pub fn replace(
        &mut self,
        buffer: &mut DocumentBuffer,
        start: usize,
        end: usize,
        replacement: &str,
    ) -> Result<MatchSpan> {
        let span = MatchSpan::new(start, end);
        let valid = self
            .last_match
            .is_some_and(|m| m.span == span && m.revision == buffer.revision());
        if !valid {
            log::debug!("Rejected replace of stale match {}..{}", start, end);
            return Err(SearchError::StaleMatch { start, end }.into());
        }

        let replaced = MatchSpan::new(start, start + replacement.chars().count());
        buffer.transact(|tx| {
            tx.apply(Edit::replace(start, end, replacement))?;
            tx.select_range(replaced.start, replaced.end);
            Ok(())
        })?;

        self.last_match = Some(ReportedMatch {
            span: replaced,
            revision: buffer.revision(),
        });
        self.notifier.notify(&SearchEvent::Replaced(replaced));
        Ok(replaced)
    }

    /// 先頭から折り返しなしで、重ならないマッチをすべて置換する
    ///
    /// 1回の履歴エントリとして記録される。置換した件数を返す。
    pub fn replace_all(&mut self, buffer: &mut DocumentBuffer, replacement: &str) -> Result<usize> {
        if self.matcher.is_empty() {
            return Ok(0);
        }

        let matcher = &self.matcher;
        let replacement_chars: Vec<char> = replacement.chars().collect();
        let count = buffer.transact(|tx| {
            // 置換のたびに更新する作業用コピー
            let mut chars: Vec<char> = tx.text().chars().collect();
            let mut pos = 0;
            let mut count = 0;
            while let Some(span) = matcher.find_forward(&chars, pos, chars.len()) {
                tx.apply(Edit::replace(span.start, span.end, replacement))?;
                chars.splice(span.start..span.end, replacement_chars.iter().copied());
                pos = span.start + replacement_chars.len();
                count += 1;
            }
            if count > 0 {
                tx.place_cursor(pos);
            }
            Ok(count)
        })?;

        self.last_match = None;
        log::info!("Replaced {} occurrence(s) of {:?}", count, self.pattern);
        self.notifier.notify(&SearchEvent::ReplacedAll(count));
        Ok(count)
    }

    /// 現在の内容でのマッチ総数
    pub fn count_matches(&self, buffer: &DocumentBuffer) -> usize {
        self.matcher.find_all(buffer.content()).len()
    }

    /// リスナーを追加
    pub fn add_listener(&mut self, listener: Box<dyn ChangeListener<SearchEvent>>) -> ListenerId {
        self.notifier.add_listener(listener)
    }

    /// リスナーを削除
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.notifier.remove_listener(id)
    }
}
