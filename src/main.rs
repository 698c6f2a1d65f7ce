use boss_rush::GameConfig;
use color_eyre::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::rolling;

fn main() -> Result<()> {
    color_eyre::install()?;

    // Load .env (optional). RPG_SAVE_PATH / RPG_SEED などを .env から読めるようにする。
    // If the file doesn't exist, ignore the error.
    let _ = dotenvy::dotenv();
    let config = GameConfig::from_env();

    // ログ: 標準出力は使わず、ファイルへのみ出力してratatuiと衝突しないようにする
    let file_appender = rolling::daily(&config.log_dir, "game.log");
    // _guardはdropするとログが失われるため、main の終わりまで保持
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // ファイルにANSIカラー不要
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    let terminal = ratatui::init();
    let res = boss_rush::run(terminal, config);
    ratatui::restore();
    res
}
