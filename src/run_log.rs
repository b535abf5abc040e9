//! 実行単位のログハンドル
//!
//! 各処理段に `&mut RunLog` を渡し、警告を `tracing` に流すと同時に記録する。
//! 実行の最後に件数をまとめて表示し、テストからも警告内容を検査できる。

use tracing::warn;

/// 記録された警告の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// マスクが見つからない系列
    UnresolvedMask,
    /// 同じキーの系列が複数ある
    DuplicateSeries,
    /// ボリュームの読み込み・描画に失敗
    ReportSkipped,
    /// マニフェストの不正な行
    ManifestRow,
    /// レポートのコピーやスクリプト挿入に失敗
    Output,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct RunLog {
    warnings: Vec<Warning>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, kind: WarningKind, message: impl Into<String>) {
        let message = message.into();
        warn!(kind = ?kind, "{}", message);
        self.warnings.push(Warning { kind, message });
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// 実行終了時のまとめ
    pub fn print_summary(&self) {
        if self.is_clean() {
            return;
        }
        println!("⚠ 警告 {}件", self.warnings.len());
        for kind in [
            WarningKind::UnresolvedMask,
            WarningKind::DuplicateSeries,
            WarningKind::ReportSkipped,
            WarningKind::ManifestRow,
            WarningKind::Output,
        ] {
            let n = self.count(kind);
            if n > 0 {
                println!("  {:?}: {}", kind, n);
            }
        }
    }
}
