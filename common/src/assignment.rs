//! 評価者へのレポート割り当て
//!
//! 評価者ごとに `0..K` の置換を1つ作り、先頭 M 件を割り当てる。
//! 評価者内では重複なし、評価者間では重複あり（評価者間一致度の測定用）。

use crate::error::{Error, Result};
use crate::shuffle::{SeededShuffler, STREAM_ASSIGNMENT};
use serde::{Deserialize, Serialize};

/// 評価者1人分の割り当て
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaterAssignment {
    /// 1始まりの評価者番号
    pub rater: usize,
    /// マニフェスト内の位置（提示順）
    pub indices: Vec<usize>,
}

/// パラメータ検証のみ。I/O の前に呼ぶ。
pub fn validate(manifest_len: usize, n_reports: usize, n_raters: usize) -> Result<()> {
    if n_raters == 0 {
        return Err(Error::Assignment("n_raters must be at least 1".into()));
    }
    if n_reports == 0 {
        return Err(Error::Assignment("n_reports must be at least 1".into()));
    }
    if n_reports > manifest_len {
        return Err(Error::Assignment(format!(
            "n_reports ({}) exceeds the number of available reports ({})",
            n_reports, manifest_len
        )));
    }
    Ok(())
}

/// 評価者1..=N の順に、継続する乱数列で割り当てを作る
pub fn assign_raters(
    manifest_len: usize,
    n_reports: usize,
    n_raters: usize,
    seed: u64,
) -> Result<Vec<RaterAssignment>> {
    validate(manifest_len, n_reports, n_raters)?;

    let mut shuffler = SeededShuffler::with_stream(seed, STREAM_ASSIGNMENT);
    let assignments = (1..=n_raters)
        .map(|rater| {
            let mut indices = shuffler.permutation(manifest_len);
            indices.truncate(n_reports);
            RaterAssignment { rater, indices }
        })
        .collect();

    Ok(assignments)
}
