//! 戦闘ログ
//!
//! 攻撃ごとに `(attacker, defender, amount, is_critical, timestamp)` を受け取るシンク。
//! コアはこの呼び出し契約にしか依存しない。

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::info;

/// 1回の攻撃
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatEvent {
    pub attacker: String,
    pub defender: String,
    /// 実際に削れた HP（オーバーキル分は含まない）
    pub amount: i32,
    pub is_critical: bool,
    pub timestamp: DateTime<Local>,
}

impl CombatEvent {
    pub fn new(attacker: &str, defender: &str, amount: i32, is_critical: bool) -> Self {
        Self {
            attacker: attacker.to_string(),
            defender: defender.to_string(),
            amount,
            is_critical,
            timestamp: Local::now(),
        }
    }

    /// `[HH:MM:SS] COMBAT LOG: A attacks B for N damage (CRITICAL!)`
    pub fn log_line(&self) -> String {
        let crit = if self.is_critical { " (CRITICAL!)" } else { "" };
        format!(
            "[{}] COMBAT LOG: {} attacks {} for {} damage{}",
            self.timestamp.format("%H:%M:%S"),
            self.attacker,
            self.defender,
            self.amount,
            crit
        )
    }
}

pub trait CombatLogSink {
    fn log_combat(&mut self, event: &CombatEvent);
}

/// tracing に流すだけのシンク
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingCombatLog;

impl CombatLogSink for TracingCombatLog {
    fn log_combat(&mut self, event: &CombatEvent) {
        info!(
            target: "combat",
            attacker = %event.attacker,
            defender = %event.defender,
            amount = event.amount,
            critical = event.is_critical,
            "{}",
            event.log_line()
        );
    }
}

/// 受け取ったイベントを保持する（UI のバトルログ表示・テスト用）
#[derive(Debug, Default, Clone)]
pub struct RecordingCombatLog {
    pub events: Vec<CombatEvent>,
}

impl RecordingCombatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }
}

impl CombatLogSink for RecordingCombatLog {
    fn log_combat(&mut self, event: &CombatEvent) {
        self.events.push(event.clone());
    }
}

/// 何もしない
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCombatLog;

impl CombatLogSink for NullCombatLog {
    fn log_combat(&mut self, _event: &CombatEvent) {}
}
