use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::GameConfig;

use super::combat::{CombatReport, CombatResolver, CombatState};
use super::combat_log::{CombatEvent, CombatLogSink, TracingCombatLog};
use super::dice::{self, RandomSource, ThreadDice};
use super::error::{SaveError, SessionError};
use super::models::{Boss, Character, Combatant, SpecialAttack, Weapon};
use super::rules::RpgRules;
use super::save::{SaveDocument, SaveStore, SavedBoss, SavedPlayer, SavedWeapon};

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncounterResult {
    PlayerWon,
    PlayerLost,
}

/// ゲーム全体の結末
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    Victory,
    Defeat,
}

/// ラウンド間にプレイヤーが選ぶ行動
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnAction {
    Attack,
    Save,
    SaveAndQuit,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterSummary {
    pub boss: String,
    pub result: EncounterResult,
    pub report: CombatReport,
}

#[derive(Debug)]
pub enum TurnOutcome {
    /// 決着せず次のラウンドへ。このラウンドのイベントを返す。
    Continue { events: Vec<CombatEvent> },
    /// 遭遇の決着
    Finished { events: Vec<CombatEvent>, summary: EncounterSummary },
    /// セーブして続行。失敗しても戦闘は中断しない。
    Saved(Result<()>),
    /// 終了要求。`SaveAndQuit` のときだけ保存結果が入る。
    Quit { save: Option<Result<()>> },
}

/// プレイヤー1人とボスの列を管理する
pub struct GameSession {
    rules: RpgRules,
    player: Option<Character>,
    /// 先頭が次の相手
    bosses: VecDeque<Boss>,
    defeated: Vec<Boss>,
    encounter: Option<CombatResolver>,
    /// 直近の遭遇で負けた（膠着で HP が残っていても敗北扱い）
    lost: bool,
    dice: Box<dyn RandomSource>,
    log: Box<dyn CombatLogSink>,
}

impl GameSession {
    pub fn new(rules: RpgRules) -> Self {
        Self {
            rules,
            player: None,
            bosses: VecDeque::new(),
            defeated: Vec::new(),
            encounter: None,
            lost: false,
            dice: Box::new(ThreadDice),
            log: Box::new(TracingCombatLog),
        }
    }

    /// 設定のシードを反映したセッション
    pub fn from_config(rules: RpgRules, config: &GameConfig) -> Self {
        Self::new(rules).with_dice(dice::from_seed(config.seed))
    }

    pub fn with_dice(mut self, dice: Box<dyn RandomSource>) -> Self {
        self.dice = dice;
        self
    }

    pub fn with_log(mut self, log: Box<dyn CombatLogSink>) -> Self {
        self.log = log;
        self
    }

    pub fn rules(&self) -> &RpgRules {
        &self.rules
    }

    pub fn player(&self) -> Option<&Character> {
        self.player.as_ref()
    }

    pub fn current_boss(&self) -> Option<&Boss> {
        self.bosses.front()
    }

    pub fn bosses(&self) -> impl Iterator<Item = &Boss> {
        self.bosses.iter()
    }

    pub fn remaining_bosses(&self) -> usize {
        self.bosses.len()
    }

    pub fn defeated(&self) -> &[Boss] {
        &self.defeated
    }

    /// 現在の相手のレベル番号（正規ボスでなければ撃破数 + 1）
    pub fn level(&self) -> usize {
        self.current_boss()
            .and_then(|b| self.rules.boss_level(b.name()))
            .unwrap_or(self.defeated.len() + 1)
    }

    pub fn current_intro(&self) -> Option<String> {
        let boss = self.current_boss()?;
        let player = self.player.as_ref()?;
        Some(self.rules.boss_intro(boss.name(), &player.name))
    }

    /// 進行中の遭遇の途中経過
    pub fn encounter_report(&self) -> Option<CombatReport> {
        self.encounter.as_ref().map(CombatResolver::report)
    }

    /// 新規ゲーム。プレイヤーを初期値で作り、正規のボス列を並べる。
    pub fn setup(&mut self, player_name: &str, weapon: Option<Weapon>) {
        let name = normalize_name(player_name);
        info!(target: "session", player = %name, weapon = ?weapon.as_ref().map(|w| w.name.as_str()), "new game");
        self.player = Some(Character::new(
            name,
            self.rules.player_default_health,
            self.rules.player_default_damage,
            weapon,
        ));
        self.bosses = self.rules.spawn_bosses().into();
        self.defeated.clear();
        self.encounter = None;
        self.lost = false;
    }

    /// ボス列が空（勝利）かプレイヤーが敗北済み。未開始も完了扱い。
    pub fn is_complete(&self) -> bool {
        self.lost || self.bosses.is_empty() || !self.player.as_ref().is_some_and(Character::is_alive)
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        let player = self.player.as_ref()?;
        if self.lost || !player.is_alive() {
            Some(GameOutcome::Defeat)
        } else if self.bosses.is_empty() {
            Some(GameOutcome::Victory)
        } else {
            None
        }
    }

    /// 先頭のボスと決着がつくまで戦う
    pub fn run_next_encounter(&mut self) -> Result<EncounterResult> {
        Ok(self.run_next_encounter_summary()?.result)
    }

    pub fn run_next_encounter_summary(&mut self) -> Result<EncounterSummary> {
        loop {
            let (state, _) = self.step()?;
            if state.is_terminal() {
                return Ok(self.finish_encounter());
            }
        }
    }

    /// ラウンド間の1判断を処理する
    pub fn play_turn(&mut self, action: TurnAction, store: &SaveStore) -> Result<TurnOutcome> {
        match action {
            TurnAction::Attack => {
                let (state, events) = self.step()?;
                if state.is_terminal() {
                    let summary = self.finish_encounter();
                    Ok(TurnOutcome::Finished { events, summary })
                } else {
                    Ok(TurnOutcome::Continue { events })
                }
            }
            TurnAction::Save => Ok(TurnOutcome::Saved(self.save(store))),
            TurnAction::SaveAndQuit => Ok(TurnOutcome::Quit { save: Some(self.save(store)) }),
            TurnAction::Quit => Ok(TurnOutcome::Quit { save: None }),
        }
    }

    /// 1ラウンド進め、その状態とこのラウンドのイベントを返す
    fn step(&mut self) -> Result<(CombatState, Vec<CombatEvent>)> {
        let player = self.player.as_mut().ok_or(SessionError::NotStarted)?;
        if self.lost || !player.is_alive() {
            return Err(SessionError::NoOpponent);
        }
        let boss = self.bosses.front_mut().ok_or(SessionError::NoOpponent)?;
        let resolver = self.encounter.get_or_insert_with(|| {
            info!(target: "session", boss = %boss.name(), "encounter begins");
            CombatResolver::new()
        });

        let seen = resolver.events().len();
        let state = resolver.play_round(player, boss, self.dice.as_mut(), self.log.as_mut());
        Ok((state, resolver.events()[seen..].to_vec()))
    }

    fn finish_encounter(&mut self) -> EncounterSummary {
        let report = self.encounter.take().map(CombatResolver::into_report).unwrap_or_else(|| CombatReport {
            state: CombatState::Ongoing,
            rounds: 0,
            events: Vec::new(),
            stalemate: false,
        });
        let result = match report.state {
            CombatState::PlayerWon => EncounterResult::PlayerWon,
            _ => EncounterResult::PlayerLost,
        };
        let boss = self.bosses.front().map(|b| b.name().to_string()).unwrap_or_default();
        match result {
            EncounterResult::PlayerWon => {
                if let Some(b) = self.bosses.pop_front() {
                    self.defeated.push(b);
                }
            }
            EncounterResult::PlayerLost => self.lost = true,
        }
        info!(target: "session", boss = %boss, ?result, rounds = report.rounds, remaining = self.bosses.len(), "encounter finished");
        EncounterSummary { boss, result, report }
    }

    /// プレイヤー、撃破済みボス、残りのボスの順
    pub fn final_standings(&self) -> Vec<Combatant> {
        self.player
            .iter()
            .cloned()
            .map(Combatant::from)
            .chain(self.defeated.iter().cloned().map(Combatant::from))
            .chain(self.bosses.iter().cloned().map(Combatant::from))
            .collect()
    }

    pub fn snapshot(&self) -> Result<SaveDocument> {
        let player = self.player.as_ref().ok_or(SessionError::NotStarted)?;
        Ok(SaveDocument {
            player: SavedPlayer {
                name: player.name.clone(),
                health: player.health(),
                damage: player.base_damage,
                weapon: SavedWeapon {
                    name: player.weapon.as_ref().map(|w| w.name.clone()),
                    damage_bonus: player.weapon_bonus(),
                },
            },
            bosses: self
                .bosses
                .iter()
                .map(|b| SavedBoss { name: b.name().to_string(), health: b.health(), damage: b.base_damage() })
                .collect(),
        })
    }

    /// スナップショットから復元する。特殊攻撃と武器はボス名でルールを引き直す。
    pub fn restore(&mut self, doc: SaveDocument) -> std::result::Result<(), SaveError> {
        if doc.player.name.trim().is_empty() {
            return Err(SaveError::Corrupt("player name is empty".into()));
        }
        let weapon = doc.player.weapon.name.map(|n| Weapon::new(n, doc.player.weapon.damage_bonus));
        let player = Character::new(doc.player.name, doc.player.health, doc.player.damage, weapon);

        let mut bosses = VecDeque::with_capacity(doc.bosses.len());
        for saved in doc.bosses {
            if saved.health <= 0 {
                warn!(target: "session", boss = %saved.name, "dropping defeated boss from save");
                continue;
            }
            bosses.push_back(self.rebuild_boss(saved));
        }

        info!(target: "session", player = %player.name, health = player.health(), bosses = bosses.len(), "session restored");
        self.player = Some(player);
        self.bosses = bosses;
        self.defeated.clear();
        self.encounter = None;
        self.lost = false;
        Ok(())
    }

    fn rebuild_boss(&self, saved: SavedBoss) -> Boss {
        let (special, weapon): (SpecialAttack, Option<Weapon>) = match self.rules.boss_template(&saved.name) {
            Some(t) => (t.special, t.weapon.as_ref().map(|w| w.to_weapon())),
            None => (self.rules.fallback_special, None),
        };
        Boss::new(saved.name, saved.health, saved.damage, weapon, special)
    }

    pub fn save(&self, store: &SaveStore) -> Result<()> {
        let doc = self.snapshot()?;
        store.save(&doc)?;
        Ok(())
    }

    /// セーブが無ければ `Ok(false)`
    pub fn load(&mut self, store: &SaveStore) -> Result<bool> {
        match store.try_load()? {
            Some(doc) => {
                self.restore(doc)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn delete_save(&self, store: &SaveStore) -> Result<()> {
        store.delete()?;
        Ok(())
    }
}

fn normalize_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => "Hero".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpg::combat_log::NullCombatLog;
    use crate::rpg::dice::ScriptedDice;

    fn session() -> GameSession {
        GameSession::new(RpgRules::default())
            .with_dice(Box::new(ScriptedDice::always(0.99)))
            .with_log(Box::new(NullCombatLog))
    }

    #[test]
    fn setup_installs_player_and_bosses() {
        let mut s = session();
        assert!(s.is_complete());
        s.setup("  aria ", Some(Weapon::new("Rock", 2)));
        let p = s.player().unwrap();
        assert_eq!(p.name, "Aria");
        assert_eq!(p.health(), 110);
        assert_eq!(p.base_damage, 10);
        assert_eq!(s.remaining_bosses(), 2);
        assert_eq!(s.current_boss().unwrap().name(), "Goblin King");
        assert_eq!(s.level(), 1);
        assert!(!s.is_complete());
    }

    #[test]
    fn empty_name_defaults_to_hero() {
        assert_eq!(normalize_name("   "), "Hero");
        assert_eq!(normalize_name("sIR bob"), "Sir bob");
    }

    #[test]
    fn full_run_without_specials_is_a_victory() {
        let mut s = session();
        s.setup("Hero", Some(Weapon::new("Scissors", 4)));
        assert_eq!(s.run_next_encounter().unwrap(), EncounterResult::PlayerWon);
        assert_eq!(s.current_boss().unwrap().name(), "Dark Sorcerer");
        assert_eq!(s.level(), 2);
        assert_eq!(s.run_next_encounter().unwrap(), EncounterResult::PlayerWon);
        assert!(s.is_complete());
        assert_eq!(s.outcome(), Some(GameOutcome::Victory));
        assert_eq!(s.defeated().len(), 2);
        assert!(matches!(s.run_next_encounter(), Err(SessionError::NoOpponent)));
    }

    #[test]
    fn encounter_before_setup_fails() {
        let mut s = session();
        assert!(matches!(s.run_next_encounter(), Err(SessionError::NotStarted)));
        assert!(matches!(s.snapshot(), Err(SessionError::NotStarted)));
    }

    #[test]
    fn restore_rebuilds_special_by_name() {
        let mut s = session();
        s.restore(SaveDocument {
            player: SavedPlayer {
                name: "Aria".into(),
                health: 80,
                damage: 10,
                weapon: SavedWeapon { name: None, damage_bonus: 7 },
            },
            bosses: vec![
                SavedBoss { name: "Dead".into(), health: 0, damage: 1 },
                SavedBoss { name: "Dark Sorcerer".into(), health: 33, damage: 9 },
                SavedBoss { name: "Wyrm".into(), health: 40, damage: 6 },
            ],
        })
        .unwrap();
        assert!(s.player().unwrap().weapon.is_none());
        let bosses: Vec<_> = s.bosses().collect();
        assert_eq!(bosses.len(), 2);
        assert_eq!(bosses[0].special, SpecialAttack::new(0.4, 1.7));
        assert_eq!(bosses[0].weapon().map(|w| w.damage_bonus), Some(5));
        assert_eq!(bosses[1].special, SpecialAttack::new(0.25, 1.5));
        assert!(bosses[1].weapon().is_none());
    }

    #[test]
    fn restore_rejects_empty_name() {
        let mut s = session();
        let err = s
            .restore(SaveDocument {
                player: SavedPlayer {
                    name: " ".into(),
                    health: 1,
                    damage: 1,
                    weapon: SavedWeapon { name: None, damage_bonus: 0 },
                },
                bosses: Vec::new(),
            })
            .unwrap_err();
        assert!(matches!(err, SaveError::Corrupt(_)));
        assert!(s.player().is_none());
    }

    #[test]
    fn standings_list_player_first() {
        let mut s = session();
        s.setup("Hero", None);
        s.run_next_encounter().unwrap();
        let names: Vec<String> = s
            .final_standings()
            .iter()
            .map(|c| crate::rpg::models::Fighter::name(c).to_string())
            .collect();
        assert_eq!(names, ["Hero", "Goblin King", "Dark Sorcerer"]);
    }
}
