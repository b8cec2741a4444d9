//! Tuning constants, read from the `config` section of the world file.
//!
//! Every field has a default, so the section (or any single entry in it)
//! may be left out.

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    /// Fixed-step clock rate driving the game logic.
    pub ticks_per_sec: u32,
    /// Duration of one tile step.
    pub move_ms: u32,
    /// Fade-out before a map switch.
    pub fade_ms: u32,
    /// No random encounters for this long after any battle resolves.
    pub encounter_cooldown_ms: u64,
    /// Yen needed at the vending machine.
    pub cola_price: u32,
    pub battle: BattleConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            ticks_per_sec: 30,
            move_ms: 150,
            fade_ms: 400,
            encounter_cooldown_ms: 5000,
            cola_price: 3,
            battle: BattleConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct BattleConfig {
    pub player_max_hp: u32,
    pub enemy_max_hp: u32,
    pub starting_potions: u32,
    pub potion_heal: u32,
    /// Player hit before variance and multiplier.
    pub base_damage: i32,
    /// Player hits vary uniformly by +/- this much.
    pub damage_variance: i32,
    pub enemy_damage_min: u32,
    pub enemy_damage_max: u32,
    /// "An enemy appears..." before the first turn.
    pub intro_ms: u32,
    /// Pause after each action before the next one resolves.
    pub step_ms: u32,
    /// Pause between the result and handing control back.
    pub outro_ms: u32,
    /// How many heart halves battles can ever grant.
    pub heart_reward_cap: u32,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            player_max_hp: 100,
            enemy_max_hp: 60,
            starting_potions: 2,
            potion_heal: 30,
            base_damage: 15,
            damage_variance: 3,
            enemy_damage_min: 8,
            enemy_damage_max: 15,
            intro_ms: 1500,
            step_ms: 1500,
            outro_ms: 2000,
            heart_reward_cap: 2,
        }
    }
}
