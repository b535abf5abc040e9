//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("Pattern error in `{pattern}`: {reason}")]
    Pattern { pattern: String, reason: String },

    #[error("Assignment error: {0}")]
    Assignment(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
