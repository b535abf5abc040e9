//! 各サブコマンドの実行
//!
//! 引数と設定の検証は I/O より前に行う。

pub mod generate_index;
pub mod generate_reports;
pub mod list_bids;
pub mod run_pipeline;

use crate::cli::MaskArgs;
use crate::config::Config;
use crate::error::{QcError, Result};
use crate::render::RenderOptions;
use std::path::PathBuf;

/// マスクパターンと基準ディレクトリ。CLI で何も指定しなければ設定値を使う。
pub(crate) fn mask_patterns(mask: &MaskArgs, config: &Config) -> (Vec<String>, Vec<PathBuf>) {
    if mask.mask_patterns.is_empty() && mask.mask_patterns_base.is_empty() {
        (config.mask_patterns.clone(), Vec::new())
    } else {
        (mask.mask_patterns.clone(), mask.mask_patterns_base.clone())
    }
}

pub(crate) fn render_options(
    config: &Config,
    n_slices: Option<usize>,
    boundary_mm: Option<f32>,
) -> Result<RenderOptions> {
    let options = RenderOptions {
        n_slices: n_slices.unwrap_or(config.n_slices),
        boundary_mm: boundary_mm.unwrap_or(config.boundary_mm),
    };
    if options.n_slices == 0 {
        return Err(QcError::Config("n_slices は 1 以上が必要です".into()));
    }
    if !options.boundary_mm.is_finite() || options.boundary_mm < 0.0 {
        return Err(QcError::Config(format!(
            "boundary_mm が不正です: {}",
            options.boundary_mm
        )));
    }
    Ok(options)
}
