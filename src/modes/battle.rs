//! バトルモード
//!
//! 1キー = 1判断。攻撃なら1ラウンド進め、セーブ/終了はセッション経由で行う。

use super::{AppContext, AppMode, MenuMode, Mode, ResultMode};
use crate::rpg::{CombatEvent, EncounterResult, Fighter, GameSession, TurnAction, TurnOutcome};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    prelude::Stylize,
    text::Line,
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};
use tracing::{info, warn};

const MAX_MESSAGES: usize = 8;

pub struct BattleMode {
    ctx: AppContext,
    session: GameSession,
    messages: Vec<String>,
}

impl BattleMode {
    pub fn new(ctx: AppContext, session: GameSession, greeting: &str) -> Self {
        let mut mode = Self { ctx, session, messages: Vec::new() };
        mode.add_message(greeting.to_string());
        mode.announce_boss();
        mode
    }

    /// メッセージログに追加（最新 MAX_MESSAGES 件を保持）
    fn add_message(&mut self, msg: String) {
        self.messages.push(msg);
        if self.messages.len() > MAX_MESSAGES {
            let overflow = self.messages.len() - MAX_MESSAGES;
            self.messages.drain(..overflow);
        }
    }

    fn announce_boss(&mut self) {
        if let Some(intro) = self.session.current_intro() {
            self.add_message(intro);
        }
    }

    fn describe(&mut self, events: &[CombatEvent]) {
        let player = self.session.player().map(|p| p.name.clone()).unwrap_or_default();
        for e in events {
            let crit = if e.is_critical { " Special attack!" } else { "" };
            let line = if e.attacker == player {
                format!("You dealt {} damage to {}.", e.amount, e.defender)
            } else {
                format!("{} dealt {} damage to you.{}", e.attacker, e.amount, crit)
            };
            self.add_message(line);
        }
    }

    fn to_menu(&self, notice: impl Into<String>) -> AppMode {
        AppMode::Menu(MenuMode::with_notice(self.ctx.clone(), notice))
    }

    fn act(&mut self, action: TurnAction) -> Result<Option<AppMode>> {
        let outcome = self.session.play_turn(action, &self.ctx.store)?;
        match outcome {
            TurnOutcome::Continue { events } => {
                self.describe(&events);
                Ok(None)
            }
            TurnOutcome::Finished { events, summary } => {
                self.describe(&events);
                match summary.result {
                    EncounterResult::PlayerWon => self.add_message(format!("Victory! You defeated {}.", summary.boss)),
                    EncounterResult::PlayerLost => self.add_message(format!("Defeat! You were defeated by {}.", summary.boss)),
                }
                if self.session.is_complete() {
                    // 決着がついたセーブは残さない
                    if let Err(e) = self.session.delete_save(&self.ctx.store) {
                        warn!(target: "app", error = %e, "could not delete finished save");
                    }
                    return Ok(Some(AppMode::Result(ResultMode::new(self.ctx.clone(), &self.session))));
                }
                self.announce_boss();
                Ok(None)
            }
            TurnOutcome::Saved(Ok(())) => {
                self.add_message("Game saved successfully!".into());
                Ok(None)
            }
            TurnOutcome::Saved(Err(e)) => {
                warn!(target: "app", error = %e, "save failed");
                self.add_message(format!("Error saving game: {e}"));
                Ok(None)
            }
            TurnOutcome::Quit { save: Some(Ok(())) } => {
                info!(target: "app", "battle: save and quit");
                Ok(Some(self.to_menu("Game saved successfully!")))
            }
            TurnOutcome::Quit { save: Some(Err(e)) } => {
                // 保存できなかったので戦闘画面に留まる
                warn!(target: "app", error = %e, "save before quit failed");
                self.add_message(format!("Error saving game: {e}"));
                Ok(None)
            }
            TurnOutcome::Quit { save: None } => {
                info!(target: "app", "battle: quit to menu");
                Ok(Some(self.to_menu("Progress since the last save was discarded.")))
            }
        }
    }
}

impl Mode for BattleMode {
    fn render(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(8),  // 両者のステータス
                Constraint::Min(6),     // メッセージログ
                Constraint::Length(3),  // 操作説明
            ])
            .split(f.area());

        render_status(f, chunks[0], &self.session);
        render_messages(f, chunks[1], &self.messages);

        let footer = Paragraph::new(Line::from("[A]ttack, [S]ave, Save & [X]it - Press ESC to quit to menu").cyan())
            .block(Block::default().title(" Command ").borders(Borders::ALL).border_type(BorderType::Rounded))
            .alignment(Alignment::Left);
        f.render_widget(footer, chunks[2]);
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<Option<AppMode>> {
        let action = match key.code {
            KeyCode::Esc | KeyCode::Char('q') => TurnAction::Quit,
            KeyCode::Char(c) => match c.to_ascii_lowercase() {
                'a' => TurnAction::Attack,
                's' => TurnAction::Save,
                'x' => TurnAction::SaveAndQuit,
                _ => return Ok(None),
            },
            _ => return Ok(None),
        };
        self.act(action)
    }
}

/// プレイヤーとボスを左右に並べて描画
fn render_status(f: &mut Frame, area: Rect, session: &GameSession) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let player_text = session.player().map(|p| p.display()).unwrap_or_default();
    let player = Paragraph::new(player_text)
        .block(Block::default().title(" You ").borders(Borders::ALL).border_type(BorderType::Rounded));
    f.render_widget(player, halves[0]);

    let (title, boss_text) = match session.current_boss() {
        Some(b) => (format!(" LEVEL {}: {} ", session.level(), b.name()), b.display()),
        None => (" - ".to_string(), String::new()),
    };
    let boss = Paragraph::new(boss_text)
        .block(Block::default().title(Line::from(title).red()).borders(Borders::ALL).border_type(BorderType::Rounded));
    f.render_widget(boss, halves[1]);
}

/// メッセージログを描画
fn render_messages(f: &mut Frame, area: Rect, messages: &[String]) {
    let lines: Vec<Line> = messages.iter().map(|m| Line::from(m.clone()).yellow()).collect();
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().title(" Battle Log ").borders(Borders::ALL).border_type(BorderType::Rounded));
    f.render_widget(paragraph, area);
}
