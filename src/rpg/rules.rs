use serde::{Deserialize, Serialize};

use super::models::{Boss, SpecialAttack, Weapon};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponTemplate {
    pub name: String,
    pub damage_bonus: i32,
    pub description: String,
}

impl WeaponTemplate {
    pub fn to_weapon(&self) -> Weapon {
        Weapon::new(self.name.clone(), self.damage_bonus)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossTemplate {
    pub name: String,
    pub health: i32,
    pub damage: i32,
    pub special: SpecialAttack,
    pub weapon: Option<WeaponTemplate>,
    /// 戦闘前に表示する導入文。`{player}` はプレイヤー名に置き換わる。
    pub intro: String,
}

impl BossTemplate {
    pub fn spawn(&self) -> Boss {
        Boss::new(
            self.name.clone(),
            self.health,
            self.damage,
            self.weapon.as_ref().map(WeaponTemplate::to_weapon),
            self.special,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpgRules {
    pub game_name: String,
    pub version: String,
    pub player_default_health: i32,
    pub player_default_damage: i32,
    pub weapons: Vec<WeaponTemplate>,
    /// 出現順
    pub bosses: Vec<BossTemplate>,
    /// 名前で引けなかったボスに使う特殊攻撃
    pub fallback_special: SpecialAttack,
}

impl RpgRules {
    /// 1 始まりの番号で武器を選ぶ
    pub fn weapon_choice(&self, choice: usize) -> Option<&WeaponTemplate> {
        choice.checked_sub(1).and_then(|i| self.weapons.get(i))
    }

    pub fn boss_template(&self, name: &str) -> Option<&BossTemplate> {
        self.bosses.iter().find(|b| b.name == name)
    }

    /// 正規の出現順での 1 始まりのレベル番号
    pub fn boss_level(&self, name: &str) -> Option<usize> {
        self.bosses.iter().position(|b| b.name == name).map(|i| i + 1)
    }

    pub fn boss_intro(&self, name: &str, player_name: &str) -> String {
        match self.boss_template(name) {
            Some(t) => t.intro.replace("{player}", player_name),
            None => "A new boss appears!".to_string(),
        }
    }

    pub fn spawn_bosses(&self) -> Vec<Boss> {
        self.bosses.iter().map(BossTemplate::spawn).collect()
    }
}

impl Default for RpgRules {
    fn default() -> Self {
        let boss_weapon = WeaponTemplate {
            name: "Boss Weapon".into(),
            damage_bonus: 5,
            description: "A brutal weapon wielded by bosses.".into(),
        };
        Self {
            game_name: "RPG Adventure".to_string(),
            version: "1.0.0".to_string(),
            player_default_health: 110,
            player_default_damage: 10,
            weapons: vec![
                WeaponTemplate { name: "Rock".into(), damage_bonus: 2, description: "A simple rock. Basic but reliable.".into() },
                WeaponTemplate { name: "Paper".into(), damage_bonus: 3, description: "A sheet of paper. Surprisingly effective.".into() },
                WeaponTemplate { name: "Scissors".into(), damage_bonus: 4, description: "Sharp scissors. Handle with care!".into() },
            ],
            bosses: vec![
                BossTemplate {
                    name: "Goblin King".into(),
                    health: 50,
                    damage: 8,
                    special: SpecialAttack::new(0.3, 1.5),
                    weapon: Some(boss_weapon.clone()),
                    intro: "Level 1 - You have entered the lair of the Goblin King. \
                            He is known for his strength and brutality. Prepare for battle, {player}!"
                        .into(),
                },
                BossTemplate {
                    name: "Dark Sorcerer".into(),
                    health: 60,
                    damage: 9,
                    special: SpecialAttack::new(0.4, 1.7),
                    weapon: Some(boss_weapon),
                    intro: "Level 2 - You have defeated the Goblin King! Now, you face the Dark Sorcerer, \
                            a master of dark magic. Good luck, {player}!"
                        .into(),
                },
            ],
            fallback_special: SpecialAttack::new(0.25, 1.5),
        }
    }
}
