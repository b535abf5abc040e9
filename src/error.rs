use thiserror::Error;

#[derive(Error, Debug)]
pub enum QcError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("ボリューム読み込みエラー: {path}: {reason}")]
    VolumeLoad { path: String, reason: String },

    #[error("画像とマスクの形状が一致しません: {image:?} != {mask:?}")]
    ShapeMismatch {
        image: [usize; 3],
        mask: [usize; 3],
    },

    #[error("マスクが空です")]
    EmptyMask,

    #[error("描画エラー: {0}")]
    Render(String),

    #[error("マニフェストが不正: {0}")]
    Manifest(String),

    #[error("レポートが見つかりません: {0}")]
    NoReportsFound(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("CSVエラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("画像エンコードエラー: {0}")]
    Image(#[from] image::ImageError),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] fetal_qc_common::Error),
}

pub type Result<T> = std::result::Result<T, QcError>;
