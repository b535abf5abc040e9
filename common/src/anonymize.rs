//! 匿名化マッピング
//!
//! (subject, session) の組をシャッフルし `anon-001` 形式のラベルを振る。
//! レポート名は `anon-001[_acq-X][_run-R]`。逆引きはインデックス生成で使う。

use crate::shuffle::{SeededShuffler, STREAM_ANONYMIZE};
use crate::types::{ManifestRow, SeriesKey};
use std::collections::{BTreeMap, BTreeSet};

/// 実IDと匿名ラベルの対応（全単射）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnonymizationMap {
    /// (subject, session) → 匿名ラベル
    labels: BTreeMap<(String, Option<String>), String>,
    /// 匿名化名 → 実キー
    reverse: BTreeMap<String, SeriesKey>,
}

impl AnonymizationMap {
    /// シードに従ってラベルを割り当てる
    pub fn build(rows: &[ManifestRow], seed: u64) -> Self {
        let pairs: BTreeSet<(String, Option<String>)> = rows
            .iter()
            .map(|r| (r.series.subject.clone(), r.series.session.clone()))
            .collect();
        let mut pairs: Vec<_> = pairs.into_iter().collect();
        SeededShuffler::with_stream(seed, STREAM_ANONYMIZE).shuffle(&mut pairs);

        let width = pairs.len().to_string().len().max(3);
        let labels = pairs
            .into_iter()
            .enumerate()
            .map(|(i, pair)| (pair, format!("anon-{:0width$}", i + 1, width = width)))
            .collect();

        let mut map = Self {
            labels,
            reverse: BTreeMap::new(),
        };
        for row in rows {
            if let Some(name) = map.anon_name(row) {
                map.reverse.insert(name, row.key());
            }
        }
        map
    }

    /// 既に匿名化名を持つ行（CSVから読んだ行）から逆引き表を復元する
    pub fn from_rows(rows: &[ManifestRow]) -> Self {
        let mut map = Self::default();
        for row in rows {
            if let Some(name) = &row.anon_name {
                map.reverse.insert(name.clone(), row.key());
            }
        }
        map
    }

    pub fn label(&self, subject: &str, session: Option<&str>) -> Option<&str> {
        self.labels
            .get(&(subject.to_string(), session.map(String::from)))
            .map(String::as_str)
    }

    /// 行に対応する匿名化レポート名
    pub fn anon_name(&self, row: &ManifestRow) -> Option<String> {
        let s = &row.series;
        let mut name = self.label(&s.subject, s.session.as_deref())?.to_string();
        if let Some(acq) = &s.acquisition {
            name.push_str(&format!("_acq-{}", acq));
        }
        if let Some(run) = &s.run {
            name.push_str(&format!("_run-{}", run));
        }
        Some(name)
    }

    /// 各行に匿名化名を設定する
    pub fn apply(&self, rows: &mut [ManifestRow]) {
        for row in rows.iter_mut() {
            row.anon_name = self.anon_name(row);
        }
    }

    pub fn real_key(&self, anon_name: &str) -> Option<&SeriesKey> {
        self.reverse.get(anon_name)
    }

    pub fn len(&self) -> usize {
        self.reverse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reverse.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SeriesEntry;
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn row(sub: &str, ses: Option<&str>, run: &str) -> ManifestRow {
        let series = SeriesEntry {
            subject: sub.into(),
            session: ses.map(String::from),
            acquisition: None,
            run: Some(run.into()),
            datatype: "anat".into(),
            suffix: "T2w".into(),
            path: PathBuf::from(format!("/d/sub-{}_run-{}_T2w.nii.gz", sub, run)),
        };
        ManifestRow::new(series, PathBuf::from("/d/mask.nii.gz"))
    }

    fn rows() -> Vec<ManifestRow> {
        vec![
            row("01", None, "1"),
            row("01", None, "2"),
            row("02", Some("01"), "1"),
            row("02", Some("02"), "1"),
            row("03", None, "1"),
        ]
    }

    #[test]
    fn test_labels_are_bijective() {
        let map = AnonymizationMap::build(&rows(), 42);
        let labels: HashSet<_> = [
            map.label("01", None).unwrap(),
            map.label("02", Some("01")).unwrap(),
            map.label("02", Some("02")).unwrap(),
            map.label("03", None).unwrap(),
        ]
        .into_iter()
        .collect();
        assert_eq!(labels.len(), 4);
    }

    #[test]
    fn test_names_are_unique_and_reversible() {
        let mut rows = rows();
        let map = AnonymizationMap::build(&rows, 42);
        map.apply(&mut rows);

        let names: HashSet<_> = rows.iter().map(|r| r.anon_name.clone().unwrap()).collect();
        assert_eq!(names.len(), rows.len());
        for r in &rows {
            let name = r.anon_name.as_deref().unwrap();
            assert!(name.starts_with("anon-"));
            assert_eq!(map.real_key(name), Some(&r.key()));
        }
    }

    #[test]
    fn test_runs_of_same_subject_share_label() {
        let mut rows = rows();
        AnonymizationMap::build(&rows, 1).apply(&mut rows);
        let a = rows[0].anon_name.clone().unwrap();
        let b = rows[1].anon_name.clone().unwrap();
        assert_eq!(a.trim_end_matches("_run-1"), b.trim_end_matches("_run-2"));
    }

    #[test]
    fn test_reproducible() {
        let a = AnonymizationMap::build(&rows(), 5);
        let b = AnonymizationMap::build(&rows(), 5);
        assert_eq!(a, b);
    }

    /// 1被験者1系列のとき、並べ替え後の順が匿名ラベル順と一致しない
    #[test]
    fn test_label_order_independent_of_manifest_order() {
        use crate::shuffle::STREAM_MANIFEST_ORDER;

        let mut rows: Vec<ManifestRow> = ["01", "02", "03", "04", "05"]
            .iter()
            .map(|sub| row(sub, None, "1"))
            .collect();
        AnonymizationMap::build(&rows, 7).apply(&mut rows);
        SeededShuffler::with_stream(7, STREAM_MANIFEST_ORDER).shuffle(&mut rows);

        let names: Vec<String> = rows.iter().map(|r| r.anon_name.clone().unwrap()).collect();
        assert_eq!(
            names,
            vec![
                "anon-002_run-1",
                "anon-003_run-1",
                "anon-004_run-1",
                "anon-001_run-1",
                "anon-005_run-1",
            ]
        );
    }

    #[test]
    fn test_from_rows_restores_reverse_lookup() {
        let mut rows = rows();
        AnonymizationMap::build(&rows, 3).apply(&mut rows);
        let restored = AnonymizationMap::from_rows(&rows);
        assert_eq!(restored.len(), rows.len());
        let name = rows[2].anon_name.as_deref().unwrap();
        assert_eq!(restored.real_key(name), Some(&rows[2].key()));
    }
}
