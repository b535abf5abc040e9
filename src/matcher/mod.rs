//! 系列とマスクの照合
//!
//! 候補パターンを順に展開し、最初に実在したファイルを採用する。
//! 同点の決着はパターンの順序のみで、ファイルシステムの列挙順には依存しない。

mod types;

pub use types::{MaskCandidate, Resolution};

use crate::config::MASK_PATTERN;
use crate::error::{QcError, Result};
use crate::run_log::{RunLog, WarningKind};
use fetal_qc_common::{ManifestRow, MaskPattern, SeriesEntry};
use std::path::{Path, PathBuf};
use tracing::debug;

/// パターンと基準ディレクトリから候補列を作る。
///
/// - `bases` が空: 各パターンを BIDS ルート基準で使う
/// - `bases` あり + `patterns` 空: 各基準に既定パターンを付ける
/// - 両方あり: 同じ長さでなければ設定エラー
pub fn build_candidates(patterns: &[String], bases: &[PathBuf]) -> Result<Vec<MaskCandidate>> {
    if bases.is_empty() {
        return patterns
            .iter()
            .map(|p| -> Result<MaskCandidate> {
                Ok(MaskCandidate {
                    pattern: MaskPattern::parse(p)?,
                    base: None,
                })
            })
            .collect();
    }

    if patterns.is_empty() {
        let pattern = MaskPattern::parse(MASK_PATTERN)?;
        return Ok(bases
            .iter()
            .map(|b| MaskCandidate {
                pattern: pattern.clone(),
                base: Some(b.clone()),
            })
            .collect());
    }

    if patterns.len() != bases.len() {
        return Err(QcError::Config(format!(
            "mask_patterns_base ({}) と mask_patterns ({}) の数が一致しません",
            bases.len(),
            patterns.len()
        )));
    }

    patterns
        .iter()
        .zip(bases)
        .map(|(p, b)| -> Result<MaskCandidate> {
            Ok(MaskCandidate {
                pattern: MaskPattern::parse(p)?,
                base: Some(b.clone()),
            })
        })
        .collect()
}

fn candidate_path(candidate: &MaskCandidate, expanded: &str, root: &Path) -> PathBuf {
    let expanded = Path::new(expanded);
    if expanded.is_absolute() {
        return expanded.to_path_buf();
    }
    candidate.base.as_deref().unwrap_or(root).join(expanded)
}

/// 系列1件のマスクを探す
pub fn resolve_series(
    series: &SeriesEntry,
    candidates: &[MaskCandidate],
    root: &Path,
    mask_suffix: &str,
) -> Option<Resolution> {
    let entities = series.entities(mask_suffix);
    candidates.iter().enumerate().find_map(|(i, candidate)| {
        let expanded = candidate.pattern.expand(&entities)?;
        let path = candidate_path(candidate, &expanded, root);
        debug!(series = %series.name(), candidate = %path.display(), "マスク候補");
        path.is_file().then_some(Resolution {
            mask: path,
            candidate_index: i,
        })
    })
}

/// 全系列を照合してマニフェストを作る。見つからない系列は警告して除外。
pub fn resolve_manifest(
    series: Vec<SeriesEntry>,
    candidates: &[MaskCandidate],
    root: &Path,
    mask_suffix: &str,
    log: &mut RunLog,
) -> Vec<ManifestRow> {
    let mut rows = Vec::with_capacity(series.len());
    for entry in series {
        match resolve_series(&entry, candidates, root, mask_suffix) {
            Some(resolution) => rows.push(ManifestRow::new(entry, resolution.mask)),
            None => log.warn(
                WarningKind::UnresolvedMask,
                format!("no mask found for {}", entry.label()),
            ),
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_without_bases() {
        let c = build_candidates(&["a/{subject}.nii.gz".into()], &[]).unwrap();
        assert_eq!(c.len(), 1);
        assert!(c[0].base.is_none());
    }

    #[test]
    fn test_candidates_bases_only_use_default_pattern() {
        let c = build_candidates(&[], &[PathBuf::from("/m1"), PathBuf::from("/m2")]).unwrap();
        assert_eq!(c.len(), 2);
        assert_eq!(c[1].pattern.as_str(), MASK_PATTERN);
        assert_eq!(c[1].base.as_deref(), Some(Path::new("/m2")));
    }

    #[test]
    fn test_candidates_length_mismatch_is_config_error() {
        let result = build_candidates(&["{subject}".into()], &[PathBuf::from("/a"), PathBuf::from("/b")]);
        assert!(matches!(result, Err(QcError::Config(_))));
    }

    #[test]
    fn test_candidates_invalid_pattern() {
        let result = build_candidates(&["sub-{nope}".into()], &[]);
        assert!(matches!(result, Err(QcError::Common(_))));
    }
}
