use fetal_qc_common::MaskPattern;
use std::path::PathBuf;

/// マスク候補（パターン + 探索の基準ディレクトリ）
#[derive(Debug, Clone)]
pub struct MaskCandidate {
    pub pattern: MaskPattern,
    /// None なら BIDS ルートを基準にする
    pub base: Option<PathBuf>,
}

/// 系列1件の照合結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub mask: PathBuf,
    /// 何番目の候補で見つかったか
    pub candidate_index: usize,
}
