//! メニューモード: 起動時の選択画面

use super::{AppContext, AppMode, BattleMode, Mode, ResultMode, SetupMode};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::fmt;
use tracing::{info, warn};

/// メニューの選択肢
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MenuItem {
    NewGame,
    LoadGame,
    HowToPlay,
    Exit,
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuItem::NewGame => write!(f, "New Game"),
            MenuItem::LoadGame => write!(f, "Load Game"),
            MenuItem::HowToPlay => write!(f, "How to Play"),
            MenuItem::Exit => write!(f, "Quit"),
        }
    }
}

impl MenuItem {
    fn all() -> [MenuItem; 4] {
        [MenuItem::NewGame, MenuItem::LoadGame, MenuItem::HowToPlay, MenuItem::Exit]
    }

    fn next(self) -> MenuItem {
        match self {
            MenuItem::NewGame => MenuItem::LoadGame,
            MenuItem::LoadGame => MenuItem::HowToPlay,
            MenuItem::HowToPlay => MenuItem::Exit,
            MenuItem::Exit => MenuItem::NewGame,
        }
    }

    fn prev(self) -> MenuItem {
        match self {
            MenuItem::NewGame => MenuItem::Exit,
            MenuItem::LoadGame => MenuItem::NewGame,
            MenuItem::HowToPlay => MenuItem::LoadGame,
            MenuItem::Exit => MenuItem::HowToPlay,
        }
    }
}

const HOW_TO_PLAY: &str = "Defeat every boss in order. Each round you strike first, then the boss \
strikes back. Bosses sometimes land a special attack for extra damage. \
In battle: [A]ttack, [S]ave, save & [X]it, [Esc] quit to menu.";

/// メニューモード状態
pub struct MenuMode {
    ctx: AppContext,
    selected: MenuItem,
    /// 直前の操作結果（ロード失敗など）
    notice: Option<String>,
    show_help: bool,
}

impl MenuMode {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx, selected: MenuItem::NewGame, notice: None, show_help: false }
    }

    pub fn with_notice(ctx: AppContext, notice: impl Into<String>) -> Self {
        Self { notice: Some(notice.into()), ..Self::new(ctx) }
    }

    fn load_game(&mut self) -> Option<AppMode> {
        let mut session = self.ctx.new_session();
        match session.load(&self.ctx.store) {
            Ok(true) if session.is_complete() => {
                info!(target: "app", "loaded save is already finished");
                Some(AppMode::Result(ResultMode::new(self.ctx.clone(), &session)))
            }
            Ok(true) => Some(AppMode::Battle(BattleMode::new(
                self.ctx.clone(),
                session,
                "Game loaded successfully!",
            ))),
            Ok(false) => {
                self.notice = Some("No saved game found.".into());
                None
            }
            Err(e) => {
                warn!(target: "app", error = %e, "load failed");
                self.notice = Some(format!("Could not load save: {e}"));
                None
            }
        }
    }
}

impl Mode for MenuMode {
    fn render(&self, f: &mut Frame) {
        let area = f.area();

        let block = Block::default()
            .title(format!(" {} v{} ", self.ctx.rules.game_name, self.ctx.rules.version))
            .borders(Borders::ALL);
        f.render_widget(block, area);

        // コンテンツエリア（パディング考慮）
        let content_area = Rect {
            x: area.x + 2,
            y: area.y + 2,
            width: area.width.saturating_sub(4),
            height: area.height.saturating_sub(4),
        };

        let title = Paragraph::new(format!("Welcome to {}!", self.ctx.rules.game_name))
            .style(Style::default().fg(Color::Cyan).bold());
        f.render_widget(title, Rect { height: 2, ..content_area });

        let menu_start_y = content_area.y + 3;
        for (index, item) in MenuItem::all().iter().enumerate() {
            let is_selected = self.selected == *item;
            let prefix = if is_selected { "▶ " } else { "  " };
            let style = if is_selected {
                Style::default().fg(Color::White).bg(Color::Blue).bold()
            } else {
                Style::default().fg(Color::White)
            };
            let item_area = Rect { y: menu_start_y + index as u16, height: 1, ..content_area };
            f.render_widget(Paragraph::new(format!("{prefix}{item}")).style(style), item_area);
        }

        let info_y = menu_start_y + MenuItem::all().len() as u16 + 1;
        let info_area = Rect {
            y: info_y,
            height: content_area.height.saturating_sub(info_y - content_area.y),
            ..content_area
        };
        if self.show_help {
            let help = Paragraph::new(HOW_TO_PLAY)
                .style(Style::default().fg(Color::Gray))
                .wrap(Wrap { trim: true });
            f.render_widget(help, info_area);
        } else if let Some(notice) = &self.notice {
            f.render_widget(Paragraph::new(notice.as_str()).style(Style::default().fg(Color::Yellow)), info_area);
        }

        let footer = Paragraph::new("↑/↓: Navigate | Enter: Select | Esc/q: Exit")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(footer, Rect { x: area.x, y: area.height.saturating_sub(2), width: area.width, height: 1 });
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<Option<AppMode>> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.prev();
                Ok(None)
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = self.selected.next();
                Ok(None)
            }
            KeyCode::Enter => {
                self.show_help = false;
                let next_mode = match self.selected {
                    MenuItem::NewGame => Some(AppMode::Setup(SetupMode::new(self.ctx.clone()))),
                    MenuItem::LoadGame => self.load_game(),
                    MenuItem::HowToPlay => {
                        self.show_help = true;
                        None
                    }
                    MenuItem::Exit => Some(AppMode::Exit),
                };
                Ok(next_mode)
            }
            KeyCode::Esc | KeyCode::Char('q') => Ok(Some(AppMode::Exit)),
            _ => Ok(None),
        }
    }
}
