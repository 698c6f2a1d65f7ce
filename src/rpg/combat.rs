//! プレイヤー対ボスのターン制戦闘
//!
//! 1ラウンド = プレイヤーの攻撃 → (ボスが生きていれば) ボスの攻撃。
//! どちらかの HP が 0 になった時点で終了する。コンソール出力は一切しない。
//!
//! 特殊攻撃は正のダメージにしか掛からないので、双方 0 ダメージのラウンドは
//! 以後も必ず繰り返す。その時点で膠着として打ち切る。

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::combat_log::{CombatEvent, CombatLogSink};
use super::dice::RandomSource;
use super::models::Fighter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatState {
    #[default]
    Ongoing,
    PlayerWon,
    PlayerLost,
}

impl CombatState {
    pub fn is_terminal(self) -> bool {
        self != CombatState::Ongoing
    }
}

/// 戦闘結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatReport {
    pub state: CombatState,
    pub rounds: u32,
    pub events: Vec<CombatEvent>,
    /// 双方 0 ダメージのラウンドで打ち切られた
    pub stalemate: bool,
}

/// 発生したイベントを手元に残しつつ外部シンクにも転送する
struct Tee<'a> {
    events: &'a mut Vec<CombatEvent>,
    sink: &'a mut dyn CombatLogSink,
}

impl CombatLogSink for Tee<'_> {
    fn log_combat(&mut self, event: &CombatEvent) {
        self.events.push(event.clone());
        self.sink.log_combat(event);
    }
}

/// 1回の遭遇の状態機械
#[derive(Debug, Clone, Default)]
pub struct CombatResolver {
    state: CombatState,
    rounds: u32,
    events: Vec<CombatEvent>,
    stalemate: bool,
}

impl CombatResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CombatState {
        self.state
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    /// 1ラウンド進める。終了済みなら何もしない。
    pub fn play_round(
        &mut self,
        player: &mut dyn Fighter,
        boss: &mut dyn Fighter,
        dice: &mut dyn RandomSource,
        sink: &mut dyn CombatLogSink,
    ) -> CombatState {
        if self.state.is_terminal() {
            return self.state;
        }
        // 開始時点で既に倒れている側がいる場合は即決着
        if !player.is_alive() {
            self.state = CombatState::PlayerLost;
            return self.state;
        }
        if !boss.is_alive() {
            self.state = CombatState::PlayerWon;
            return self.state;
        }

        self.rounds += 1;
        let mut tee = Tee { events: &mut self.events, sink };

        let dealt = player.attack(boss, dice, &mut tee);
        debug!(target: "combat", round = self.rounds, dealt, boss_hp = boss.health(), "player turn");
        if !boss.is_alive() {
            self.state = CombatState::PlayerWon;
            return self.state;
        }

        let received = boss.attack(player, dice, &mut tee);
        debug!(target: "combat", round = self.rounds, received, player_hp = player.health(), "boss turn");
        if !player.is_alive() {
            self.state = CombatState::PlayerLost;
            return self.state;
        }

        if dealt == 0 && received == 0 {
            warn!(
                target: "combat",
                rounds = self.rounds,
                "neither {} nor {} can deal damage; treating as a loss",
                player.name(),
                boss.name()
            );
            self.stalemate = true;
            self.state = CombatState::PlayerLost;
        }
        self.state
    }

    /// 決着がつくまでラウンドを回す
    pub fn resolve(
        mut self,
        player: &mut dyn Fighter,
        boss: &mut dyn Fighter,
        dice: &mut dyn RandomSource,
        sink: &mut dyn CombatLogSink,
    ) -> CombatReport {
        while !self.play_round(player, boss, dice, sink).is_terminal() {}
        self.into_report()
    }

    pub fn into_report(self) -> CombatReport {
        CombatReport {
            state: self.state,
            rounds: self.rounds,
            events: self.events,
            stalemate: self.stalemate,
        }
    }

    /// 途中経過を含むレポートのコピー
    pub fn report(&self) -> CombatReport {
        self.clone().into_report()
    }
}
