//! Turn-based battle state machine.
//!
//! Phases run `Start → PlayerTurn → Animating → EnemyTurn → PlayerTurn …`
//! until one side drops to 0 HP (`Won` / `Lost`). Pauses between phases are
//! steps in the session's own [`StepQueue`]; dropping the session cancels
//! them. Player input is only accepted in `PlayerTurn`.

use rand::Rng;

use super::config::BattleConfig;
use super::steps::StepQueue;
use super::world::{Direction, MapId, TilePos};

const MAX_LOG: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BattlePhase {
    Start,
    PlayerTurn,
    Animating,
    EnemyTurn,
    Won,
    Lost,
}

impl BattlePhase {
    pub fn is_over(&self) -> bool {
        matches!(self, BattlePhase::Won | BattlePhase::Lost)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AttackKind {
    Normal,
    Fire,
    Quick,
}

impl AttackKind {
    pub fn multiplier(&self) -> f64 {
        match self {
            AttackKind::Normal => 1.0,
            AttackKind::Fire => 1.5,
            AttackKind::Quick => 0.8,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            AttackKind::Normal => "a normal attack",
            AttackKind::Fire => "a fire attack",
            AttackKind::Quick => "a quick attack",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BattleAction {
    Attack(AttackKind),
    Potion,
}

impl BattleAction {
    /// Menu order during the player's turn.
    pub const MENU: [BattleAction; 4] = [
        BattleAction::Attack(AttackKind::Normal),
        BattleAction::Attack(AttackKind::Fire),
        BattleAction::Attack(AttackKind::Quick),
        BattleAction::Potion,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BattleAction::Attack(AttackKind::Normal) => "Normal attack",
            BattleAction::Attack(AttackKind::Fire) => "Fire attack (x1.5)",
            BattleAction::Attack(AttackKind::Quick) => "Quick attack (x0.8)",
            BattleAction::Potion => "Use potion",
        }
    }
}

/// Where to put the player back once the battle is over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReturnContext {
    pub map: MapId,
    pub tile: TilePos,
    pub facing: Direction,
}

/// Everything the caller supplies when starting a battle.
#[derive(Clone, Debug, PartialEq)]
pub struct BattleRequest {
    pub return_to: ReturnContext,
    /// Sentry id, `None` for a random encounter.
    pub enemy: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BattleResult {
    Won,
    Lost,
}

#[derive(Clone, Debug, PartialEq)]
pub enum BattleEvent {
    /// Reported exactly once, when the battle ends.
    Resolved(BattleResult),
    /// The closing pause is over; resume at this context.
    Exit(ReturnContext),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Not the player's turn.
    Ignored,
    /// Refused with a message; still the player's turn.
    Rejected,
    Performed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BattleStep {
    Begin,
    AfterPlayer,
    AfterEnemy,
    Exit,
}

#[derive(Clone, Debug)]
pub struct BattleSession {
    pub player_hp: u32,
    pub player_max_hp: u32,
    pub enemy_hp: u32,
    pub enemy_max_hp: u32,
    pub potions: u32,
    /// Highlighted menu row.
    pub cursor: usize,
    phase: BattlePhase,
    request: BattleRequest,
    log: Vec<String>,
    steps: StepQueue<BattleStep>,
    config: BattleConfig,
}

/// `max(1, round((base + v) * multiplier))` with `v` uniform in
/// `[-variance, variance]`.
pub fn roll_player_damage<R: Rng>(rng: &mut R, base: i32, variance: i32, multiplier: f64) -> u32 {
    let v = if variance > 0 {
        rng.gen_range(-variance..=variance)
    } else {
        0
    };
    let raw = ((base + v) as f64 * multiplier).round();
    if raw < 1.0 {
        1
    } else {
        raw as u32
    }
}

impl BattleSession {
    pub fn new(request: BattleRequest, potions: u32, config: &BattleConfig) -> Self {
        let mut steps = StepQueue::new();
        steps.push(config.intro_ms, BattleStep::Begin);
        tracing::info!(enemy = ?request.enemy, map = ?request.return_to.map, "battle started");
        Self {
            player_hp: config.player_max_hp,
            player_max_hp: config.player_max_hp,
            enemy_hp: config.enemy_max_hp,
            enemy_max_hp: config.enemy_max_hp,
            potions,
            cursor: 0,
            phase: BattlePhase::Start,
            request,
            log: vec!["An enemy appears...".into()],
            steps,
            config: config.clone(),
        }
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn request(&self) -> &BattleRequest {
        &self.request
    }

    /// Actions on offer right now; empty outside the player's turn.
    pub fn actions(&self) -> &'static [BattleAction] {
        if self.phase == BattlePhase::PlayerTurn {
            &BattleAction::MENU
        } else {
            &[]
        }
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn message(&self) -> &str {
        self.log.last().map(String::as_str).unwrap_or("")
    }

    pub fn player_hp_ratio(&self) -> f64 {
        ratio(self.player_hp, self.player_max_hp)
    }

    pub fn enemy_hp_ratio(&self) -> f64 {
        ratio(self.enemy_hp, self.enemy_max_hp)
    }

    pub fn enemy_name(&self) -> &'static str {
        match self.request.enemy {
            Some(_) => "Sentry",
            None => "Wild creature",
        }
    }

    fn push_log(&mut self, text: impl Into<String>) {
        self.log.push(text.into());
        if self.log.len() > MAX_LOG {
            self.log.remove(0);
        }
    }

    pub fn move_cursor(&mut self, down: bool) {
        let n = self.actions().len();
        if n == 0 {
            return;
        }
        self.cursor = if down {
            (self.cursor + 1) % n
        } else {
            (self.cursor + n - 1) % n
        };
    }

    pub fn select_action<R: Rng>(&mut self, action: BattleAction, rng: &mut R) -> ActionOutcome {
        if self.phase != BattlePhase::PlayerTurn {
            return ActionOutcome::Ignored;
        }

        match action {
            BattleAction::Attack(kind) => {
                let damage = roll_player_damage(
                    rng,
                    self.config.base_damage,
                    self.config.damage_variance,
                    kind.multiplier(),
                );
                self.enemy_hp = self.enemy_hp.saturating_sub(damage);
                self.push_log(format!("You used {}! It dealt {} damage.", kind.name(), damage));
            }
            BattleAction::Potion => {
                if self.potions == 0 {
                    self.push_log("You have no potions!");
                    return ActionOutcome::Rejected;
                }
                self.potions -= 1;
                let before = self.player_hp;
                self.player_hp = (self.player_hp + self.config.potion_heal).min(self.player_max_hp);
                self.push_log(format!(
                    "You drank a potion and recovered {} HP.",
                    self.player_hp - before
                ));
            }
        }

        self.phase = BattlePhase::Animating;
        self.steps.push(self.config.step_ms, BattleStep::AfterPlayer);
        ActionOutcome::Performed
    }

    /// The enemy strikes once. No-op after the battle ended or if the
    /// enemy is already down.
    pub fn enemy_turn<R: Rng>(&mut self, rng: &mut R) {
        if self.phase.is_over() || self.enemy_hp == 0 {
            return;
        }
        self.phase = BattlePhase::EnemyTurn;
        let lo = self.config.enemy_damage_min;
        let hi = self.config.enemy_damage_max.max(lo);
        let damage = rng.gen_range(lo..=hi);
        self.player_hp = self.player_hp.saturating_sub(damage);
        self.push_log(format!("The enemy attacks! You take {} damage.", damage));
        self.steps.push(self.config.step_ms, BattleStep::AfterEnemy);
    }

    /// Settle the battle if either side is down. Returns the result only
    /// on the call that ends it.
    pub fn check_end(&mut self) -> Option<BattleResult> {
        if self.phase.is_over() {
            return None;
        }
        let result = if self.enemy_hp == 0 {
            self.phase = BattlePhase::Won;
            self.push_log("Victory! You defeated the enemy.");
            BattleResult::Won
        } else if self.player_hp == 0 {
            self.phase = BattlePhase::Lost;
            self.push_log("You were defeated...");
            self.player_hp = self.player_max_hp;
            self.potions = self.config.starting_potions;
            BattleResult::Lost
        } else {
            return None;
        };

        self.steps.clear();
        self.steps.push(self.config.outro_ms, BattleStep::Exit);
        tracing::info!(?result, "battle resolved");
        Some(result)
    }

    /// Advance pacing timers.
    pub fn advance<R: Rng>(&mut self, elapsed_ms: u32, rng: &mut R) -> Vec<BattleEvent> {
        let mut events = Vec::new();
        for step in self.steps.advance(elapsed_ms) {
            match step {
                BattleStep::Begin => {
                    self.phase = BattlePhase::PlayerTurn;
                    self.push_log("Your turn! Choose an action.");
                }
                BattleStep::AfterPlayer => match self.check_end() {
                    Some(result) => events.push(BattleEvent::Resolved(result)),
                    None => self.enemy_turn(rng),
                },
                BattleStep::AfterEnemy => match self.check_end() {
                    Some(result) => events.push(BattleEvent::Resolved(result)),
                    None => {
                        self.phase = BattlePhase::PlayerTurn;
                        self.push_log("Your turn! Choose your action.");
                    }
                },
                BattleStep::Exit => events.push(BattleEvent::Exit(self.request.return_to)),
            }
        }
        events
    }
}

fn ratio(current: u32, max: u32) -> f64 {
    if max == 0 {
        0.0
    } else {
        current as f64 / max as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn request() -> BattleRequest {
        BattleRequest {
            return_to: ReturnContext {
                map: MapId::Valencia,
                tile: TilePos::new(3, 4),
                facing: Direction::Left,
            },
            enemy: Some("crab".into()),
        }
    }

    fn started(cfg: &BattleConfig) -> (BattleSession, ChaCha8Rng) {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut b = BattleSession::new(request(), 2, cfg);
        b.advance(cfg.intro_ms, &mut rng);
        assert_eq!(b.phase(), BattlePhase::PlayerTurn);
        (b, rng)
    }

    #[test]
    fn starts_in_start_phase_without_menu() {
        let cfg = BattleConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut b = BattleSession::new(request(), 2, &cfg);
        assert_eq!(b.phase(), BattlePhase::Start);
        assert!(b.actions().is_empty());
        let outcome = b.select_action(BattleAction::Attack(AttackKind::Normal), &mut rng);
        assert_eq!(outcome, ActionOutcome::Ignored);
        assert_eq!(b.enemy_hp, cfg.enemy_max_hp);
    }

    #[test]
    fn attack_damages_then_enemy_replies() {
        let cfg = BattleConfig::default();
        let (mut b, mut rng) = started(&cfg);
        assert_eq!(b.actions().len(), 4);

        let outcome = b.select_action(BattleAction::Attack(AttackKind::Normal), &mut rng);
        assert_eq!(outcome, ActionOutcome::Performed);
        assert_eq!(b.phase(), BattlePhase::Animating);
        let dealt = cfg.enemy_max_hp - b.enemy_hp;
        assert!((12..=18).contains(&dealt), "dealt {}", dealt);

        // Second selection while animating is a no-op.
        let again = b.select_action(BattleAction::Attack(AttackKind::Fire), &mut rng);
        assert_eq!(again, ActionOutcome::Ignored);

        assert!(b.advance(cfg.step_ms, &mut rng).is_empty());
        assert_eq!(b.phase(), BattlePhase::EnemyTurn);
        let taken = cfg.player_max_hp - b.player_hp;
        assert!((8..=15).contains(&taken), "took {}", taken);

        b.advance(cfg.step_ms, &mut rng);
        assert_eq!(b.phase(), BattlePhase::PlayerTurn);
    }

    #[test]
    fn final_hit_wins_exactly_once() {
        let cfg = BattleConfig::default();
        let (mut b, mut rng) = started(&cfg);
        b.enemy_hp = 1;
        b.select_action(BattleAction::Attack(AttackKind::Quick), &mut rng);
        assert_eq!(b.enemy_hp, 0);

        let events = b.advance(cfg.step_ms, &mut rng);
        assert_eq!(events, vec![BattleEvent::Resolved(BattleResult::Won)]);
        assert_eq!(b.phase(), BattlePhase::Won);

        // Nothing moves the battle afterwards.
        let hp = b.player_hp;
        assert_eq!(
            b.select_action(BattleAction::Attack(AttackKind::Fire), &mut rng),
            ActionOutcome::Ignored
        );
        b.enemy_turn(&mut rng);
        assert_eq!(b.player_hp, hp);
        assert_eq!(b.check_end(), None);

        let events = b.advance(cfg.outro_ms, &mut rng);
        assert_eq!(events, vec![BattleEvent::Exit(request().return_to)]);
        assert!(b.advance(10_000, &mut rng).is_empty());
    }

    #[test]
    fn potion_heals_capped_at_max() {
        let cfg = BattleConfig::default();
        let (mut b, mut rng) = started(&cfg);
        b.player_hp = 90;
        assert_eq!(b.select_action(BattleAction::Potion, &mut rng), ActionOutcome::Performed);
        assert_eq!(b.player_hp, 100);
        assert_eq!(b.potions, 1);
    }

    #[test]
    fn empty_potion_keeps_turn_and_values() {
        let cfg = BattleConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut b = BattleSession::new(request(), 0, &cfg);
        b.advance(cfg.intro_ms, &mut rng);
        b.player_hp = 40;

        assert_eq!(b.select_action(BattleAction::Potion, &mut rng), ActionOutcome::Rejected);
        assert_eq!(b.player_hp, 40);
        assert_eq!(b.potions, 0);
        assert_eq!(b.phase(), BattlePhase::PlayerTurn);
        assert_eq!(b.message(), "You have no potions!");
        // No turn was consumed: nothing is scheduled.
        assert!(b.advance(10_000, &mut rng).is_empty());
        assert_eq!(b.phase(), BattlePhase::PlayerTurn);
    }

    #[test]
    fn losing_restores_hp_and_potions() {
        let cfg = BattleConfig::default();
        let (mut b, mut rng) = started(&cfg);
        b.potions = 0;
        b.player_hp = 1;
        b.select_action(BattleAction::Attack(AttackKind::Quick), &mut rng);
        b.enemy_hp = 60;
        b.advance(cfg.step_ms, &mut rng);
        assert_eq!(b.player_hp, 0);

        let events = b.advance(cfg.step_ms, &mut rng);
        assert_eq!(events, vec![BattleEvent::Resolved(BattleResult::Lost)]);
        assert_eq!(b.phase(), BattlePhase::Lost);
        assert_eq!(b.player_hp, cfg.player_max_hp);
        assert_eq!(b.potions, cfg.starting_potions);
    }

    #[test]
    fn hp_ratios_for_bars() {
        let cfg = BattleConfig::default();
        let mut b = BattleSession::new(request(), 2, &cfg);
        b.enemy_hp = 15;
        b.player_hp = 50;
        assert!((b.enemy_hp_ratio() - 0.25).abs() < 1e-9);
        assert!((b.player_hp_ratio() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn cursor_wraps_only_during_player_turn() {
        let cfg = BattleConfig::default();
        let mut b = BattleSession::new(request(), 2, &cfg);
        b.move_cursor(true);
        assert_eq!(b.cursor, 0);
        let (mut b, _) = started(&cfg);
        b.move_cursor(false);
        assert_eq!(b.cursor, 3);
        b.move_cursor(true);
        assert_eq!(b.cursor, 0);
    }

    proptest! {
        #[test]
        fn player_damage_is_at_least_one(seed in any::<u64>(), base in -20i32..40, variance in 0i32..5) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            for kind in [AttackKind::Normal, AttackKind::Fire, AttackKind::Quick] {
                prop_assert!(roll_player_damage(&mut rng, base, variance, kind.multiplier()) >= 1);
            }
        }

        #[test]
        fn default_damage_stays_in_range(seed in any::<u64>()) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let fire = roll_player_damage(&mut rng, 15, 3, 1.5);
            prop_assert!((18..=27).contains(&fire));
            let quick = roll_player_damage(&mut rng, 15, 3, 0.8);
            prop_assert!((10..=14).contains(&quick));
        }

        #[test]
        fn hp_never_leaves_bounds(seed in any::<u64>(), picks in proptest::collection::vec(0usize..4, 1..40)) {
            let cfg = BattleConfig::default();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut b = BattleSession::new(request(), 2, &cfg);
            for pick in picks {
                b.advance(cfg.intro_ms.max(cfg.step_ms), &mut rng);
                b.select_action(BattleAction::MENU[pick], &mut rng);
                prop_assert!(b.player_hp <= b.player_max_hp);
                prop_assert!(b.enemy_hp <= b.enemy_max_hp);
            }
        }
    }
}
