//! セーブファイルの読み書き
//!
//! 保存形式は JSON 1ファイル。
//! ```text
//! {
//!   "player": {"name": .., "health": .., "damage": .., "weapon": {"name": ..|null, "damage_bonus": ..}},
//!   "bosses": [{"name": .., "health": .., "damage": ..}, ...]
//! }
//! ```
//! ボスの特殊攻撃パラメータは保存されない。復元時にルールから引き直す。

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::SaveError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedWeapon {
    pub name: Option<String>,
    pub damage_bonus: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPlayer {
    pub name: String,
    pub health: i32,
    pub damage: i32,
    pub weapon: SavedWeapon,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedBoss {
    pub name: String,
    pub health: i32,
    pub damage: i32,
}

/// セッションの永続化用スナップショット
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveDocument {
    pub player: SavedPlayer,
    pub bosses: Vec<SavedBoss>,
}

impl SaveDocument {
    /// 形が合わなければ `SaveError::Corrupt`
    pub fn from_json(text: &str) -> Result<Self, SaveError> {
        serde_json::from_str(text).map_err(|e| SaveError::Corrupt(e.to_string()))
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, SaveError> {
        serde_json::from_value(value).map_err(|e| SaveError::Corrupt(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, SaveError> {
        encode(self)
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, SaveError> {
    serde_json::to_string_pretty(value).map_err(SaveError::Encode)
}

/// セーブ先1か所を担当するアダプタ。保存先は構築時に渡す。
#[derive(Debug, Clone)]
pub struct SaveStore {
    path: PathBuf,
}

impl SaveStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn io_err(&self, source: std::io::Error) -> SaveError {
        SaveError::Io { path: self.path.clone(), source }
    }

    /// 親ディレクトリが無ければ作ってから書き込む。
    /// 一時ファイルに書いてから rename するので、途中で落ちても既存セーブは壊れない。
    pub fn save(&self, doc: &SaveDocument) -> Result<(), SaveError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        let json = doc.to_json()?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| self.io_err(e))?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            if let Err(rm) = fs::remove_file(&tmp) {
                warn!(target: "save", path = %tmp.display(), error = %rm, "failed to remove temp save");
            }
            return Err(self.io_err(e));
        }
        info!(target: "save", path = %self.path.display(), bosses = doc.bosses.len(), "game saved");
        Ok(())
    }

    /// 無ければ `SaveError::NotFound`
    pub fn load(&self) -> Result<SaveDocument, SaveError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(target: "save", path = %self.path.display(), "no save file");
                return Err(SaveError::NotFound(self.path.clone()));
            }
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(SaveError::Corrupt(e.to_string()));
            }
            Err(e) => return Err(self.io_err(e)),
        };
        let doc = SaveDocument::from_json(&text).inspect_err(|e| {
            warn!(target: "save", path = %self.path.display(), error = %e, "failed to parse save");
        })?;
        info!(target: "save", path = %self.path.display(), "game loaded");
        Ok(doc)
    }

    /// `load` の NotFound を `None` に読み替えたもの
    pub fn try_load(&self) -> Result<Option<SaveDocument>, SaveError> {
        match self.load() {
            Ok(doc) => Ok(Some(doc)),
            Err(SaveError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// 存在しなければ何もせず成功
    pub fn delete(&self) -> Result<(), SaveError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(target: "save", path = %self.path.display(), "save deleted");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_err(e)),
        }
    }
}
