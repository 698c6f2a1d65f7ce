use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::combat_log::{CombatEvent, CombatLogSink};
use super::dice::RandomSource;

/// 武器。名前とダメージボーナスだけを持つ値型。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    pub damage_bonus: i32,
}

impl Weapon {
    pub fn new(name: impl Into<String>, damage_bonus: i32) -> Self {
        Self { name: name.into(), damage_bonus }
    }
}

impl fmt::Display for Weapon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (+{} damage)", self.name, self.damage_bonus)
    }
}

/// ボスの特殊攻撃パラメータ
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpecialAttack {
    /// 発動確率 [0, 1]
    pub chance: f64,
    /// 倍率 (>= 1)
    pub multiplier: f64,
}

impl SpecialAttack {
    /// 範囲外・NaN は丸める
    pub fn new(chance: f64, multiplier: f64) -> Self {
        let chance = if chance.is_nan() { 0.0 } else { chance.clamp(0.0, 1.0) };
        let multiplier = if multiplier.is_nan() { 1.0 } else { multiplier.max(1.0) };
        Self { chance, multiplier }
    }

    /// 特殊攻撃なし
    pub fn none() -> Self {
        Self { chance: 0.0, multiplier: 1.0 }
    }

    pub fn triggers(&self, sample: f64) -> bool {
        sample < self.chance
    }

    /// 倍率を掛けて 0 方向に切り捨て。元のダメージを下回ることはない。
    pub fn apply(&self, nominal: i32) -> i32 {
        if nominal <= 0 {
            return nominal;
        }
        ((nominal as f64) * self.multiplier).trunc().min(i32::MAX as f64) as i32
    }
}

impl Default for SpecialAttack {
    fn default() -> Self {
        Self::none()
    }
}

/// 戦闘参加者が共通で持つ能力
pub trait Fighter {
    fn name(&self) -> &str;
    fn health(&self) -> i32;
    /// 基礎ダメージ + 武器ボーナス
    fn nominal_damage(&self) -> i32;
    fn take_damage(&mut self, amount: i32);
    fn display(&self) -> String;

    /// 今回の攻撃で与える予定のダメージとクリティカルかどうか
    fn roll_damage(&self, _dice: &mut dyn RandomSource) -> (i32, bool) {
        (self.nominal_damage(), false)
    }

    fn is_alive(&self) -> bool {
        self.health() > 0
    }

    /// `target` を攻撃し、実際に削れた HP を返す（オーバーキル分は含まない）。
    fn attack(
        &self,
        target: &mut dyn Fighter,
        dice: &mut dyn RandomSource,
        log: &mut dyn CombatLogSink,
    ) -> i32 {
        let (damage, critical) = self.roll_damage(dice);
        let before = target.health();
        target.take_damage(damage);
        let actual = before - target.health();
        log.log_combat(&CombatEvent::new(self.name(), target.name(), actual, critical));
        actual
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    health: i32,
    pub base_damage: i32,
    pub weapon: Option<Weapon>,
}

impl Character {
    pub fn new(name: impl Into<String>, health: i32, base_damage: i32, weapon: Option<Weapon>) -> Self {
        Self { name: name.into(), health: health.max(0), base_damage, weapon }
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    /// 負の値は 0 として保存される
    pub fn set_health(&mut self, value: i32) {
        self.health = value.max(0);
    }

    pub fn weapon_bonus(&self) -> i32 {
        self.weapon.as_ref().map_or(0, |w| w.damage_bonus)
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// 0 以下は無視（回復しない）
    pub fn take_damage(&mut self, amount: i32) {
        if amount > 0 {
            self.set_health(self.health.saturating_sub(amount));
        }
    }
}

impl Fighter for Character {
    fn name(&self) -> &str {
        &self.name
    }

    fn health(&self) -> i32 {
        self.health
    }

    fn nominal_damage(&self) -> i32 {
        self.base_damage.saturating_add(self.weapon_bonus())
    }

    fn take_damage(&mut self, amount: i32) {
        Character::take_damage(self, amount);
    }

    fn display(&self) -> String {
        let (weapon_name, weapon_bonus) = match &self.weapon {
            Some(w) => (w.name.as_str(), w.damage_bonus),
            None => ("No Weapon", 0),
        };
        format!(
            "Name: {}\nHealth: {}\nDamage: {}\nWeapon: {} (+{} Damage)",
            self.name, self.health, self.base_damage, weapon_name, weapon_bonus
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boss {
    stats: Character,
    pub special: SpecialAttack,
}

impl Boss {
    pub fn new(
        name: impl Into<String>,
        health: i32,
        base_damage: i32,
        weapon: Option<Weapon>,
        special: SpecialAttack,
    ) -> Self {
        Self { stats: Character::new(name, health, base_damage, weapon), special }
    }

    pub fn stats(&self) -> &Character {
        &self.stats
    }

    pub fn name(&self) -> &str {
        &self.stats.name
    }

    pub fn health(&self) -> i32 {
        self.stats.health()
    }

    pub fn set_health(&mut self, value: i32) {
        self.stats.set_health(value);
    }

    pub fn base_damage(&self) -> i32 {
        self.stats.base_damage
    }

    pub fn weapon(&self) -> Option<&Weapon> {
        self.stats.weapon.as_ref()
    }

    pub fn is_alive(&self) -> bool {
        self.stats.is_alive()
    }

    /// HP が 0 になった瞬間に撃破を通知する
    pub fn take_damage(&mut self, amount: i32) {
        let was_alive = self.stats.is_alive();
        self.stats.take_damage(amount);
        if was_alive && !self.stats.is_alive() {
            info!(target: "combat", boss = %self.stats.name, "{} has been defeated!", self.stats.name);
        }
    }
}

impl Fighter for Boss {
    fn name(&self) -> &str {
        Boss::name(self)
    }

    fn health(&self) -> i32 {
        Boss::health(self)
    }

    fn nominal_damage(&self) -> i32 {
        self.stats.nominal_damage()
    }

    fn take_damage(&mut self, amount: i32) {
        Boss::take_damage(self, amount);
    }

    fn display(&self) -> String {
        self.stats.display()
    }

    /// 攻撃ごとに乱数を1回引き、`chance` 未満なら倍率を掛ける
    fn roll_damage(&self, dice: &mut dyn RandomSource) -> (i32, bool) {
        let nominal = self.nominal_damage();
        if self.special.triggers(dice.next_unit()) {
            (self.special.apply(nominal), true)
        } else {
            (nominal, false)
        }
    }
}

/// プレイヤーかボスのどちらか
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Combatant {
    Player(Character),
    Boss(Boss),
}

impl Combatant {
    pub fn is_boss(&self) -> bool {
        matches!(self, Combatant::Boss(_))
    }

    fn inner(&self) -> &dyn Fighter {
        match self {
            Combatant::Player(c) => c,
            Combatant::Boss(b) => b,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Fighter {
        match self {
            Combatant::Player(c) => c,
            Combatant::Boss(b) => b,
        }
    }
}

impl From<Character> for Combatant {
    fn from(c: Character) -> Self {
        Combatant::Player(c)
    }
}

impl From<Boss> for Combatant {
    fn from(b: Boss) -> Self {
        Combatant::Boss(b)
    }
}

impl Fighter for Combatant {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn health(&self) -> i32 {
        self.inner().health()
    }

    fn nominal_damage(&self) -> i32 {
        self.inner().nominal_damage()
    }

    fn take_damage(&mut self, amount: i32) {
        self.inner_mut().take_damage(amount);
    }

    fn display(&self) -> String {
        self.inner().display()
    }

    fn roll_damage(&self, dice: &mut dyn RandomSource) -> (i32, bool) {
        self.inner().roll_damage(dice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpg::combat_log::{NullCombatLog, RecordingCombatLog};
    use crate::rpg::dice::ScriptedDice;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    fn hero() -> Character {
        Character::new("Hero", 100, 10, None)
    }

    #[test]
    fn weapon_display_and_equality() {
        let w = Weapon::new("Sword", 5);
        assert_eq!(w.to_string(), "Sword (+5 damage)");
        assert_eq!(w, Weapon::new("Sword", 5));
        assert_ne!(w, Weapon::new("Sword", 6));
        assert_ne!(w, Weapon::new("Axe", 5));
    }

    #[test]
    fn health_is_clamped_at_zero() {
        let mut c = hero();
        for v in [-50, -1, 0, 1, 42] {
            c.set_health(v);
            assert_eq!(c.health(), v.max(0));
        }
        assert_eq!(Character::new("Ghost", -10, 1, None).health(), 0);
        assert!(!Character::new("Ghost", -10, 1, None).is_alive());
    }

    #[test]
    fn non_positive_damage_is_a_no_op() {
        let mut c = hero();
        c.take_damage(0);
        c.take_damage(-25);
        assert_eq!(c.health(), 100);
        c.take_damage(30);
        assert_eq!(c.health(), 70);
        c.take_damage(500);
        assert_eq!(c.health(), 0);
    }

    #[test]
    fn attack_returns_absorbed_damage() {
        let attacker = Character::new("Hero", 100, 10, Some(Weapon::new("Sword", 5)));
        let mut target = Character::new("Rat", 8, 1, None);
        let mut dice = ScriptedDice::always(0.0);
        let mut log = RecordingCombatLog::new();

        let dealt = attacker.attack(&mut target, &mut dice, &mut log);
        assert_eq!(dealt, 8);
        assert_eq!(target.health(), 0);
        assert_eq!(log.events.len(), 1);
        assert_eq!(log.events[0].amount, 8);
        assert!(!log.events[0].is_critical);
    }

    #[test]
    fn boss_normal_attack() {
        let boss = Boss::new("Test Boss", 200, 15, Some(Weapon::new("Boss Weapon", 5)), SpecialAttack::new(0.25, 1.5));
        let mut target = hero();
        let mut log = RecordingCombatLog::new();
        let dealt = boss.attack(&mut target, &mut ScriptedDice::always(0.8), &mut log);
        assert_eq!(dealt, 20);
        assert_eq!(target.health(), 80);
        assert!(!log.events[0].is_critical);
    }

    #[test]
    fn boss_special_attack_truncates() {
        let boss = Boss::new("Dragon", 200, 20, Some(Weapon::new("Boss Weapon", 5)), SpecialAttack::new(0.25, 1.5));
        let mut target = hero();
        let mut log = RecordingCombatLog::new();
        let dealt = boss.attack(&mut target, &mut ScriptedDice::always(0.1), &mut log);
        // (20 + 5) * 1.5 = 37.5 -> 37
        assert_eq!(dealt, 37);
        assert_eq!(target.health(), 63);
        assert_eq!(log.events[0].attacker, "Dragon");
        assert_eq!(log.events[0].defender, "Hero");
        assert!(log.events[0].is_critical);
    }

    #[test]
    fn special_attack_never_reduces_damage() {
        let s = SpecialAttack::new(1.0, 0.5);
        assert_eq!(s.multiplier, 1.0);
        for n in [0, 1, 7, 25, 1000] {
            assert!(s.apply(n) >= n);
            assert!(SpecialAttack::new(1.0, 1.7).apply(n) >= n);
        }
        assert_eq!(SpecialAttack::new(1.0, 1.7).apply(9), 15);
    }

    #[test]
    fn zero_chance_never_triggers() {
        let s = SpecialAttack::new(0.0, 3.0);
        assert!(!s.triggers(0.0));
        let always = SpecialAttack::new(1.0, 2.0);
        assert!(always.triggers(0.999));
    }

    #[test]
    fn combatant_delegates() {
        let mut c: Combatant = Boss::new("Wyrm", 40, 3, None, SpecialAttack::none()).into();
        assert!(c.is_boss());
        c.take_damage(15);
        assert_eq!(c.health(), 25);
        let p: Combatant = hero().into();
        let dealt = p.attack(&mut c, &mut ScriptedDice::always(0.5), &mut NullCombatLog);
        assert_eq!(dealt, 10);
        assert_eq!(c.health(), 15);
        assert!(c.display().contains("Name: Wyrm"));
    }

    #[test]
    fn display_lists_fields() {
        let out = Boss::new("Test Boss", 200, 15, Some(Weapon::new("Boss Weapon", 5)), SpecialAttack::none()).display();
        assert!(out.contains("Name: Test Boss"));
        assert!(out.contains("Health: 200"));
        assert!(out.contains("Damage: 15"));
        assert!(out.contains("Boss Weapon (+5 Damage)"));
        assert!(hero().display().contains("No Weapon (+0 Damage)"));
    }

    /// `combat` ターゲットで `boss` フィールドを持つイベントを数える
    struct DefeatCounter(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for DefeatCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let meta = event.metadata();
            if meta.target() == "combat" && meta.fields().field("boss").is_some() {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn defeat_notice_fires_once_on_the_killing_blow() {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(DefeatCounter(Arc::clone(&count)));
        tracing::subscriber::with_default(subscriber, || {
            let mut boss = Boss::new("Goblin King", 20, 8, None, SpecialAttack::none());
            boss.take_damage(0);
            boss.take_damage(15);
            assert_eq!(count.load(Ordering::SeqCst), 0);
            boss.take_damage(15);
            assert!(!boss.is_alive());
            assert_eq!(count.load(Ordering::SeqCst), 1);
            boss.take_damage(5);
            boss.take_damage(100);
            assert_eq!(count.load(Ordering::SeqCst), 1);
        });
    }
}
