//! 胎児脳 MRI の目視QCレポート生成
//!
//! BIDS 走査 → マスク照合 → レポート生成 → 評価者への分割 → インデックス

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod index;
pub mod manifest;
pub mod matcher;
pub mod render;
pub mod report;
pub mod run_log;
pub mod scanner;
pub mod split;
pub mod volume;

use tracing_subscriber::EnvFilter;

/// ログ初期化。`RUST_LOG` があればそちらを優先する。
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
