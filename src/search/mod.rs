//! 検索・置換
//!
//! リテラル文字列の前方・後方検索（折り返しあり）と置換

pub mod engine;
pub mod matcher;
pub mod types;

pub use engine::SearchEngine;
pub use matcher::LiteralMatcher;
pub use types::{MatchSpan, SearchDirection, SearchEvent, SearchHit, SearchOptions};
