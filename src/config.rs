use crate::error::{QcError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 既定のマスクパターン（BIDS derivatives 形式）
pub const MASK_PATTERN: &str = "sub-{subject}[/ses-{session}][/{datatype}]/sub-{subject}[_ses-{session}][_acq-{acquisition}][_run-{run}]_{suffix}.nii.gz";

/// 手動マスク → 自動マスクの順に探す
pub const MANUAL_MASK_BASE: &str = "derivatives/masks";
pub const AUTO_MASK_BASE: &str = "derivatives/automated_masks";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// BIDS ルートからの相対パターン（絶対パスも可）
    pub mask_patterns: Vec<String>,
    /// 画像側の接尾辞
    pub suffix: String,
    /// マスク側の接尾辞（パターンの `{suffix}` に入る）
    pub mask_suffix: String,
    /// 断面あたりのスライス数
    pub n_slices: usize,
    /// マスク周りの切り出し余白（mm）
    pub boundary_mm: f32,
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| QcError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("fetal-qc").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            mask_patterns: vec![
                format!("{}/{}", MANUAL_MASK_BASE, MASK_PATTERN),
                format!("{}/{}", AUTO_MASK_BASE, MASK_PATTERN),
            ],
            suffix: "T2w".into(),
            mask_suffix: "mask".into(),
            n_slices: 7,
            boundary_mm: 15.0,
            seed: 42,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_patterns_prefer_manual_masks() {
        let config = Config::default();
        assert_eq!(config.mask_patterns.len(), 2);
        assert!(config.mask_patterns[0].starts_with(MANUAL_MASK_BASE));
        assert!(config.mask_patterns[1].starts_with(AUTO_MASK_BASE));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"suffix": "T1w", "seed": 7}"#).unwrap();
        assert_eq!(config.suffix, "T1w");
        assert_eq!(config.seed, 7);
        assert_eq!(config.mask_suffix, "mask");
        assert_eq!(config.n_slices, 7);
    }
}
