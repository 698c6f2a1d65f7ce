// 同階層のファイルをモジュールとしてインポート
pub mod config;
pub mod modes; // TUI modes (menu / setup / battle / result)
pub mod rpg; // boss rush core: models, combat, session, save

pub use config::GameConfig;
pub use rpg::{GameSession, SaveStore};

use color_eyre::Result;
use crossterm::event::{self as crossterm_event, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;
use std::time::Duration;

// Ensure .env is loaded for tests before anything else runs in the test process.
#[cfg(test)]
#[ctor::ctor]
fn load_dotenv_for_tests() {
    let _ = dotenvy::dotenv();
}

/// アプリケーションのメインループを実行
pub fn run(mut terminal: DefaultTerminal, config: GameConfig) -> Result<()> {
    let ctx = modes::AppContext::new(config);
    tracing::info!(target: "app", save_path = %ctx.store.path().display(), "starting");
    let mut current_mode = modes::AppMode::Menu(modes::MenuMode::new(ctx.clone()));

    loop {
        terminal.draw(|f| current_mode.render(f))?;

        // 100ms以内にイベントが来たら処理
        if crossterm_event::poll(Duration::from_millis(100))? {
            match crossterm_event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        break;
                    }
                    match current_mode.handle_key(key) {
                        Ok(Some(next_mode)) => {
                            // モード遷移またはExit
                            if matches!(next_mode, modes::AppMode::Exit) {
                                break;
                            }
                            current_mode = next_mode;
                        }
                        Ok(None) => {
                            // 同じモード継続
                        }
                        Err(e) => {
                            // エラーが発生した場合はメニューに戻す
                            tracing::error!("Error in mode: {:?}", e);
                            current_mode = modes::AppMode::Menu(modes::MenuMode::with_notice(ctx.clone(), e.to_string()));
                        }
                    }
                }
                Event::Resize(_, _) => {
                    // 次ループで再描画されるので特別な処理なし
                }
                _ => {}
            }
        }
    }
    tracing::info!(target: "app", "bye");
    Ok(())
}
