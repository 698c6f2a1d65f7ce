//! モードシステム: メニュー、キャラ作成、バトル、結果画面を管理

use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;

use crate::config::GameConfig;
use crate::rpg::{GameSession, RpgRules, SaveStore};

/// 各モードが実装すべきトレイト
pub trait Mode {
    /// 画面描画
    fn render(&self, f: &mut Frame);

    /// キーイベント処理
    /// 戻り値: Some(次のモード) でモード遷移、None で同じモード継続
    fn handle_key(&mut self, key: KeyEvent) -> Result<Option<AppMode>>;
}

/// 全モードで共有する設定とセーブ先
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: GameConfig,
    pub rules: RpgRules,
    pub store: SaveStore,
}

impl AppContext {
    pub fn new(config: GameConfig) -> Self {
        let store = SaveStore::new(&config.save_path);
        Self { config, rules: RpgRules::default(), store }
    }

    pub fn new_session(&self) -> GameSession {
        GameSession::from_config(self.rules.clone(), &self.config)
    }
}

/// アプリケーションが取り得るモードの列挙型
pub enum AppMode {
    Menu(MenuMode),
    Setup(SetupMode),
    Battle(BattleMode),
    Result(ResultMode),
    Exit,
}

impl AppMode {
    /// 現在のモードで render() を呼び出す
    pub fn render(&self, f: &mut Frame) {
        match self {
            AppMode::Menu(m) => m.render(f),
            AppMode::Setup(m) => m.render(f),
            AppMode::Battle(m) => m.render(f),
            AppMode::Result(m) => m.render(f),
            AppMode::Exit => {}
        }
    }

    /// 現在のモードで handle_key() を呼び出す
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<Option<AppMode>> {
        match self {
            AppMode::Menu(m) => m.handle_key(key),
            AppMode::Setup(m) => m.handle_key(key),
            AppMode::Battle(m) => m.handle_key(key),
            AppMode::Result(m) => m.handle_key(key),
            AppMode::Exit => Ok(None),
        }
    }
}

pub mod battle;
pub mod menu;
pub mod result;
pub mod setup;

pub use battle::BattleMode;
pub use menu::MenuMode;
pub use result::ResultMode;
pub use setup::SetupMode;
