pub mod combat;
pub mod combat_log;
pub mod dice;
pub mod error;
pub mod game;
pub mod models;
pub mod rules;
pub mod save;

pub use combat::{CombatReport, CombatResolver, CombatState};
pub use combat_log::{CombatEvent, CombatLogSink, RecordingCombatLog, TracingCombatLog};
pub use dice::{RandomSource, ScriptedDice, SeededDice, ThreadDice};
pub use error::{SaveError, SessionError};
pub use game::{EncounterResult, EncounterSummary, GameOutcome, GameSession, TurnAction, TurnOutcome};
pub use models::{Boss, Character, Combatant, Fighter, SpecialAttack, Weapon};
pub use rules::{BossTemplate, RpgRules, WeaponTemplate};
pub use save::{SaveDocument, SaveStore};
