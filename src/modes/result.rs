//! 結果画面（全ボス撃破 or 敗北）

use super::{AppContext, AppMode, MenuMode, Mode};
use crate::rpg::{Combatant, Fighter, GameOutcome, GameSession};
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{
    layout::Alignment,
    prelude::Stylize,
    text::Line,
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

pub struct ResultMode {
    ctx: AppContext,
    outcome: GameOutcome,
    standings: Vec<Combatant>,
}

impl ResultMode {
    pub fn new(ctx: AppContext, session: &GameSession) -> Self {
        Self {
            ctx,
            outcome: session.outcome().unwrap_or(GameOutcome::Defeat),
            standings: session.final_standings(),
        }
    }
}

impl Mode for ResultMode {
    fn render(&self, f: &mut Frame) {
        let headline = match self.outcome {
            GameOutcome::Victory => Line::from("Congratulations! You defeated all the bosses and restored peace!").green(),
            GameOutcome::Defeat => Line::from("Game Over! Thanks for playing!").red(),
        };
        let mut lines = vec![headline, Line::from("")];
        for c in &self.standings {
            let tag = match c {
                Combatant::Player(_) => "YOU ",
                Combatant::Boss(_) if c.is_alive() => "BOSS",
                Combatant::Boss(_) => "DEAD",
            };
            lines.push(Line::from(format!("[{tag}] {} - HP {}", c.name(), c.health())));
        }
        lines.push(Line::from(""));
        lines.push(Line::from("Press any key to return to the menu").dark_gray());

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().title(" Result ").borders(Borders::ALL).border_type(BorderType::Rounded));
        f.render_widget(paragraph, f.area());
    }

    fn handle_key(&mut self, _key: KeyEvent) -> Result<Option<AppMode>> {
        Ok(Some(AppMode::Menu(MenuMode::new(self.ctx.clone()))))
    }
}
