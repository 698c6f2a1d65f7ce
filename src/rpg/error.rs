//! セーブ/セッション周りのエラー型

use std::path::PathBuf;

use thiserror::Error;

/// セーブファイル操作のエラー
#[derive(Debug, Error)]
pub enum SaveError {
    /// セーブが存在しない（呼び出し側は「セーブなし」として扱う）
    #[error("no save found at {}", .0.display())]
    NotFound(PathBuf),

    /// パースできない、または必須フィールドが欠けている
    #[error("corrupt save: {0}")]
    Corrupt(String),

    /// 保存内容を JSON にできなかった（ファイルには触れていない）
    #[error("could not encode save: {0}")]
    Encode(#[source] serde_json::Error),

    /// 書き込み/削除/読み込み時のファイルシステムエラー
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SaveError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SaveError::NotFound(_))
    }
}

/// セッション API の誤用
#[derive(Debug, Error)]
pub enum SessionError {
    /// setup / restore 前に戦闘を要求した
    #[error("no player: start a new game or load a save first")]
    NotStarted,

    /// 残りのボスがいない、もしくはプレイヤーが既に倒れている
    #[error("no opponent left to fight")]
    NoOpponent,

    #[error(transparent)]
    Save(#[from] SaveError),
}
