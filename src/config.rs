//! アプリケーション設定

use std::path::PathBuf;

use tracing::warn;

/// アプリケーション設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// セーブファイルの場所
    pub save_path: PathBuf,
    /// ログ出力ディレクトリ
    pub log_dir: PathBuf,
    /// 乱数シード（None なら毎回ランダム）
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        let home = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            save_path: home.join("rpg_saves").join("save.json"),
            log_dir: PathBuf::from("logs"),
            seed: None,
        }
    }
}

impl GameConfig {
    /// 新しい設定インスタンスを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 環境変数（.env 読み込み後）で上書きした設定
    ///
    /// - `RPG_SAVE_PATH`
    /// - `RPG_LOG_DIR`
    /// - `RPG_SEED`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意のキー参照関数から組み立てる
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(p) = lookup("RPG_SAVE_PATH").filter(|s| !s.trim().is_empty()) {
            cfg.save_path = PathBuf::from(p);
        }
        if let Some(p) = lookup("RPG_LOG_DIR").filter(|s| !s.trim().is_empty()) {
            cfg.log_dir = PathBuf::from(p);
        }
        if let Some(raw) = lookup("RPG_SEED") {
            match raw.trim().parse::<u64>() {
                Ok(n) => cfg.seed = Some(n),
                Err(_) => warn!(target: "config", value = %raw, "invalid RPG_SEED, ignoring"),
            }
        }
        cfg
    }
}
