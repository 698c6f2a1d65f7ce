//! キャラクター作成モード（名前入力 → 武器選択）

use super::{AppContext, AppMode, BattleMode, MenuMode, Mode};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    prelude::Stylize,
    text::Line,
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Name,
    Weapon,
}

pub struct SetupMode {
    ctx: AppContext,
    stage: Stage,
    name: String,
    notice: Option<String>,
}

impl SetupMode {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx, stage: Stage::Name, name: String::new(), notice: None }
    }

    fn start(&mut self, choice: usize) -> Option<AppMode> {
        let Some(weapon) = self.ctx.rules.weapon_choice(choice) else {
            self.notice = Some(format!("Please enter a number between 1 and {}", self.ctx.rules.weapons.len()));
            return None;
        };
        let weapon = weapon.to_weapon();
        let mut session = self.ctx.new_session();
        session.setup(&self.name, Some(weapon));

        // 新しい冒険を始めたら古いセーブは消す
        if let Err(e) = session.delete_save(&self.ctx.store) {
            warn!(target: "app", error = %e, "could not delete stale save");
        }
        info!(target: "app", "setup complete");
        Some(AppMode::Battle(BattleMode::new(self.ctx.clone(), session, "Your adventure begins!")))
    }
}

impl Mode for SetupMode {
    fn render(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([Constraint::Length(5), Constraint::Min(6), Constraint::Length(3)])
            .split(f.area());

        let intro = Paragraph::new(
            "In a world where darkness looms, you are the chosen hero destined to defeat \
             the evil bosses and restore peace.",
        )
        .wrap(Wrap { trim: true })
        .block(Block::default().title(" Welcome ").borders(Borders::ALL).border_type(BorderType::Rounded));
        f.render_widget(intro, chunks[0]);

        let body: Vec<Line> = match self.stage {
            Stage::Name => vec![
                Line::from("Enter your character's name:"),
                Line::from(format!("> {}_", self.name)).green(),
            ],
            Stage::Weapon => {
                let mut lines = vec![Line::from("Choose your weapon:")];
                for (i, w) in self.ctx.rules.weapons.iter().enumerate() {
                    lines.push(Line::from(format!(
                        "{}. {} (+{} damage) - {}",
                        i + 1,
                        w.name,
                        w.damage_bonus,
                        w.description
                    )));
                }
                lines
            }
        };
        let body = Paragraph::new(body)
            .block(Block::default().title(" Character ").borders(Borders::ALL).border_type(BorderType::Rounded));
        f.render_widget(body, chunks[1]);

        let hint = match (&self.notice, self.stage) {
            (Some(n), _) => n.clone(),
            (None, Stage::Name) => "Type a name and press Enter - Esc to return to menu".to_string(),
            (None, Stage::Weapon) => format!("Press 1-{} - Esc to return to menu", self.ctx.rules.weapons.len()),
        };
        let footer = Paragraph::new(Line::from(hint).yellow())
            .block(Block::default().title(" Command ").borders(Borders::ALL).border_type(BorderType::Rounded));
        f.render_widget(footer, chunks[2]);
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<Option<AppMode>> {
        if key.code == KeyCode::Esc {
            return Ok(Some(AppMode::Menu(MenuMode::new(self.ctx.clone()))));
        }
        match self.stage {
            Stage::Name => match key.code {
                KeyCode::Enter => {
                    self.stage = Stage::Weapon;
                    self.notice = None;
                }
                KeyCode::Backspace => {
                    self.name.pop();
                }
                KeyCode::Char(c) if !c.is_control() && self.name.chars().count() < 24 => {
                    self.name.push(c);
                }
                _ => {}
            },
            Stage::Weapon => {
                if let KeyCode::Char(c) = key.code {
                    if let Some(n) = c.to_digit(10) {
                        return Ok(self.start(n as usize));
                    }
                    self.notice = Some("Please enter a valid number.".into());
                }
            }
        }
        Ok(None)
    }
}
