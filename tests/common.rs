#![allow(dead_code)]

use once_cell::sync::Lazy;
use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter, prelude::*};
use tracing_appender::rolling;

use boss_rush::rpg::{combat_log::NullCombatLog, GameSession, RpgRules, ScriptedDice};

static START: Once = Once::new();
static _GUARD: Lazy<std::sync::Mutex<Option<tracing_appender::non_blocking::WorkerGuard>>> = Lazy::new(|| std::sync::Mutex::new(None));

/// Initialize test environment: dotenv and tracing (stderr + file).
/// Idempotent: safe to call multiple times.
pub fn init() {
    START.call_once(|| {
        let _ = dotenvy::dotenv();
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("info"))
            .expect("env filter");

        // Daily rotating log file separate from app runtime logs
        let file_appender = rolling::daily("logs", "tests.log");
        let (file_nb, guard) = tracing_appender::non_blocking(file_appender);
        *_GUARD.lock().unwrap() = Some(guard); // retain guard for lifetime

        let stderr_layer = fmt::layer()
            .with_target(true)
            .with_test_writer();

        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(file_nb);

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .with(file_layer)
            .try_init();

        tracing::info!(target="test_init", "Test tracing initialized (stderr + rotating file)");
    });
}

/// 特殊攻撃が一切発動しない決定的なセッション
pub fn quiet_session() -> GameSession {
    GameSession::new(RpgRules::default())
        .with_dice(Box::new(ScriptedDice::always(0.99)))
        .with_log(Box::new(NullCombatLog))
}
