//! 系列・マニフェストの型定義
//!
//! - Entities: テンプレート展開に使うフィールドマップ
//! - SeriesEntry: BIDS ディレクトリから列挙された LR 系列
//! - ManifestRow: マスクが解決済みの系列（レポート生成の入力）

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 系列の一意キー: (subject, session, acquisition, run)
pub type SeriesKey = (String, Option<String>, Option<String>, Option<String>);

/// テンプレート展開用のフィールドマップ
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entities {
    pub subject: String,
    pub session: Option<String>,
    pub acquisition: Option<String>,
    pub run: Option<String>,
    pub datatype: Option<String>,
    pub suffix: Option<String>,
}

/// LR 系列1件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesEntry {
    pub subject: String,
    pub session: Option<String>,
    pub acquisition: Option<String>,
    pub run: Option<String>,
    pub datatype: String,
    /// 接尾辞（T2w など）
    pub suffix: String,
    /// 画像ボリュームの絶対パス
    pub path: PathBuf,
}

impl SeriesEntry {
    pub fn key(&self) -> SeriesKey {
        (
            self.subject.clone(),
            self.session.clone(),
            self.acquisition.clone(),
            self.run.clone(),
        )
    }

    /// BIDS 形式の名前（例: `sub-01_ses-01_run-1_T2w`）
    pub fn name(&self) -> String {
        let mut name = format!("sub-{}", self.subject);
        if let Some(ses) = &self.session {
            name.push_str(&format!("_ses-{}", ses));
        }
        if let Some(acq) = &self.acquisition {
            name.push_str(&format!("_acq-{}", acq));
        }
        if let Some(run) = &self.run {
            name.push_str(&format!("_run-{}", run));
        }
        name.push('_');
        name.push_str(&self.suffix);
        name
    }

    /// 警告メッセージ用のラベル（例: `sub-01, ses-02, run-1`）
    pub fn label(&self) -> String {
        let mut parts = vec![format!("sub-{}", self.subject)];
        if let Some(ses) = &self.session {
            parts.push(format!("ses-{}", ses));
        }
        if let Some(acq) = &self.acquisition {
            parts.push(format!("acq-{}", acq));
        }
        if let Some(run) = &self.run {
            parts.push(format!("run-{}", run));
        }
        parts.join(", ")
    }

    /// マスクパターン展開用のフィールドマップ。`suffix` はマスク側の接尾辞。
    pub fn entities(&self, suffix: &str) -> Entities {
        Entities {
            subject: self.subject.clone(),
            session: self.session.clone(),
            acquisition: self.acquisition.clone(),
            run: self.run.clone(),
            datatype: Some(self.datatype.clone()),
            suffix: Some(suffix.to_string()),
        }
    }
}

/// マニフェストの1行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRow {
    pub series: SeriesEntry,
    pub mask: PathBuf,
    /// 匿名化名（匿名化しない場合は None）
    pub anon_name: Option<String>,
}

impl ManifestRow {
    pub fn new(series: SeriesEntry, mask: PathBuf) -> Self {
        Self {
            series,
            mask,
            anon_name: None,
        }
    }

    pub fn key(&self) -> SeriesKey {
        self.series.key()
    }

    pub fn name(&self) -> String {
        self.series.name()
    }

    /// レポートに表示する名前。匿名化名があればそちらを優先。
    pub fn display_name(&self) -> String {
        self.anon_name.clone().unwrap_or_else(|| self.name())
    }

    pub fn is_anonymized(&self) -> bool {
        self.anon_name.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(session: Option<&str>, run: Option<&str>) -> SeriesEntry {
        SeriesEntry {
            subject: "01".to_string(),
            session: session.map(String::from),
            acquisition: None,
            run: run.map(String::from),
            datatype: "anat".to_string(),
            suffix: "T2w".to_string(),
            path: PathBuf::from("/data/sub-01/anat/sub-01_run-1_T2w.nii.gz"),
        }
    }

    #[test]
    fn test_name_without_session() {
        assert_eq!(entry(None, Some("1")).name(), "sub-01_run-1_T2w");
    }

    #[test]
    fn test_name_with_session() {
        assert_eq!(entry(Some("02"), Some("3")).name(), "sub-01_ses-02_run-3_T2w");
    }

    #[test]
    fn test_label_lists_present_entities() {
        assert_eq!(entry(None, Some("1")).label(), "sub-01, run-1");
        assert_eq!(entry(Some("02"), None).label(), "sub-01, ses-02");
    }

    #[test]
    fn test_display_name_prefers_anon() {
        let mut row = ManifestRow::new(entry(None, Some("1")), PathBuf::from("/m.nii.gz"));
        assert_eq!(row.display_name(), "sub-01_run-1_T2w");
        row.anon_name = Some("anon-003_run-1".to_string());
        assert_eq!(row.display_name(), "anon-003_run-1");
        assert!(row.is_anonymized());
    }

    #[test]
    fn test_entities_uses_mask_suffix() {
        let ents = entry(None, Some("1")).entities("mask");
        assert_eq!(ents.suffix.as_deref(), Some("mask"));
        assert_eq!(ents.datatype.as_deref(), Some("anat"));
    }
}
