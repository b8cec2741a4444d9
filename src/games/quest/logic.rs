//! Session orchestration: routes commands to whichever mode owns input,
//! runs narrative triggers and hands control between the map, battles and
//! puzzles.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::battle::{BattleAction, BattleEvent, BattleRequest, BattleResult, BattleSession, ReturnContext};
use super::dialog::DialogRouter;
use super::navigation::{check_exit, MoveResult, Navigator, Transition};
use super::puzzle::{PuzzleKind, PuzzleOutcome, PuzzleSession};
use super::state::{ClueSlot, QuestState};
use super::steps::StepQueue;
use super::world::{Direction, MapDef, MapId, Prop, PropKind, Terrain, TilePos, World};

const WELCOME: &str =
    "You wake up at home. A locked package sits on the table. Find the three digits of its code.";
const NOTE_TEXT: &str =
    "A note: \"Valencia keeps the first digit, Valladolid the second, Japan the last.\"";

/// Normalised player intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Confirm,
    Cancel,
    /// Direct menu pick (0-based).
    Choose(usize),
}

/// What runs after a dialog is confirmed.
#[derive(Clone, Debug, PartialEq)]
pub enum FollowUp {
    Battle(Option<String>),
    Puzzle(PuzzleKind),
    Victory,
}

pub enum Mode {
    Explore,
    /// Fade-out before a map switch. Owns the pending load.
    Fading(StepQueue<Transition>),
    Battle(Box<BattleSession>),
    Puzzle(PuzzleSession),
    Victory,
}

/// Who receives the next command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Consumer {
    Dialog,
    Explore,
    Fading,
    Battle,
    Puzzle,
    Victory,
}

pub struct QuestSession {
    world: World,
    quest: QuestState,
    dialog: DialogRouter<FollowUp>,
    map: MapId,
    nav: Navigator,
    mode: Mode,
    rng: ChaCha8Rng,
    /// Game time since the session started.
    now_ms: u64,
    /// Shown once the battle screen closes.
    battle_note: Option<String>,
}

/// Defeated sentries and picked-up coins are gone for good.
fn is_live(prop: &Prop, quest: &QuestState) -> bool {
    match &prop.what {
        PropKind::Sentry { id } => !quest.is_defeated(id),
        PropKind::Coin { id } => !quest.collected_yens.contains(id),
        _ => true,
    }
}

/// Props still on the map.
pub fn live_props<'a>(map: &'a MapDef, quest: &'a QuestState) -> impl Iterator<Item = &'a Prop> {
    map.props.iter().filter(move |p| is_live(p, quest))
}

fn blocks(map: &MapDef, quest: &QuestState, tile: TilePos) -> bool {
    map.props_at(tile).any(|p| p.what.is_solid() && is_live(p, quest))
}

impl QuestSession {
    pub fn new(world: World, seed: u64) -> Self {
        let start = world.map(world.start);
        let nav = Navigator::new(start.spawn, Direction::Down, world.config.move_ms);
        let mut dialog = DialogRouter::new();
        dialog.show(WELCOME, None);
        Self {
            quest: QuestState::new(world.config.battle.starting_potions),
            map: world.start,
            nav,
            dialog,
            mode: Mode::Explore,
            rng: ChaCha8Rng::seed_from_u64(seed),
            now_ms: 0,
            battle_note: None,
            world,
        }
    }

    /// Back to a fresh quest in the start map.
    pub fn restart(&mut self) {
        self.quest = QuestState::new(self.world.config.battle.starting_potions);
        self.map = self.world.start;
        let spawn = self.world.map(self.map).spawn;
        self.nav.place(spawn, Direction::Down);
        self.mode = Mode::Explore;
        self.battle_note = None;
        self.dialog.show(WELCOME, None);
        tracing::info!("quest restarted");
    }

    // ── Accessors ───────────────────────────────────────────────

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn quest(&self) -> &QuestState {
        &self.quest
    }

    pub fn dialog(&self) -> &DialogRouter<FollowUp> {
        &self.dialog
    }

    pub fn map_id(&self) -> MapId {
        self.map
    }

    pub fn map(&self) -> &MapDef {
        self.world.map(self.map)
    }

    pub fn nav(&self) -> &Navigator {
        &self.nav
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Potions in hand, counting any drunk in a battle still on screen.
    pub fn potions(&self) -> u32 {
        match &self.mode {
            Mode::Battle(battle) => battle.potions,
            _ => self.quest.potions,
        }
    }

    pub fn consumer(&self) -> Consumer {
        if self.dialog.is_visible() {
            return Consumer::Dialog;
        }
        match self.mode {
            Mode::Explore => Consumer::Explore,
            Mode::Fading(_) => Consumer::Fading,
            Mode::Battle(_) => Consumer::Battle,
            Mode::Puzzle(_) => Consumer::Puzzle,
            Mode::Victory => Consumer::Victory,
        }
    }

    // ── Input ───────────────────────────────────────────────────

    /// Returns true if the command did something.
    pub fn handle(&mut self, cmd: Command) -> bool {
        match self.consumer() {
            Consumer::Dialog => match cmd {
                Command::Confirm => {
                    if let Some(follow_up) = self.dialog.confirm() {
                        self.run_follow_up(follow_up);
                    }
                    true
                }
                _ => false,
            },
            Consumer::Fading => false,
            Consumer::Victory => match cmd {
                Command::Confirm => {
                    self.restart();
                    true
                }
                _ => false,
            },
            Consumer::Explore => self.handle_explore(cmd),
            Consumer::Battle => self.handle_battle(cmd),
            Consumer::Puzzle => self.handle_puzzle(cmd),
        }
    }

    fn handle_explore(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Move(dir) => {
                let map = self.world.map(self.map);
                let quest = &self.quest;
                let result = self.nav.try_move(dir, map, |t| blocks(map, quest, t));
                result == MoveResult::Started
            }
            Command::Confirm => self.interact(),
            Command::Cancel | Command::Choose(_) => false,
        }
    }

    fn handle_battle(&mut self, cmd: Command) -> bool {
        let Mode::Battle(battle) = &mut self.mode else {
            return false;
        };
        let action = match cmd {
            Command::Move(Direction::Up) => {
                battle.move_cursor(false);
                return true;
            }
            Command::Move(Direction::Down) => {
                battle.move_cursor(true);
                return true;
            }
            Command::Confirm => battle.actions().get(battle.cursor).copied(),
            Command::Choose(i) => battle.actions().get(i).copied(),
            Command::Move(_) | Command::Cancel => None,
        };
        match action {
            Some(action) => {
                if let Some(i) = BattleAction::MENU.iter().position(|a| *a == action) {
                    battle.cursor = i;
                }
                battle.select_action(action, &mut self.rng);
                true
            }
            None => false,
        }
    }

    fn handle_puzzle(&mut self, cmd: Command) -> bool {
        let Mode::Puzzle(puzzle) = &mut self.mode else {
            return false;
        };
        let kind = puzzle.kind();
        let outcome = match cmd {
            Command::Move(Direction::Up) => {
                puzzle.move_cursor(false);
                return true;
            }
            Command::Move(Direction::Down) => {
                puzzle.move_cursor(true);
                return true;
            }
            Command::Move(_) => return false,
            Command::Confirm => puzzle.confirm(),
            Command::Choose(i) => puzzle.choose(i),
            Command::Cancel => puzzle.cancel(),
        };
        self.finish_puzzle(kind, outcome);
        true
    }

    fn finish_puzzle(&mut self, kind: PuzzleKind, outcome: PuzzleOutcome) {
        match outcome {
            PuzzleOutcome::Pending | PuzzleOutcome::Wrong(_) => {}
            PuzzleOutcome::Left => self.mode = Mode::Explore,
            PuzzleOutcome::Solved => {
                self.mode = Mode::Explore;
                match kind {
                    PuzzleKind::Switches => {
                        let digit = ClueSlot::Valladolid.reward_digit();
                        self.quest.set_clue(ClueSlot::Valladolid, digit);
                        self.dialog.show(
                            format!("The vault swings open. A digit is carved inside: {}.", digit),
                            None,
                        );
                    }
                    PuzzleKind::Quiz => {
                        let digit = ClueSlot::Japan.reward_digit();
                        self.quest.quiz_completed = true;
                        self.quest.set_clue(ClueSlot::Japan, digit);
                        self.dialog
                            .show(format!("Correct! Your digit is {}.", digit), None);
                    }
                }
            }
        }
    }

    fn run_follow_up(&mut self, follow_up: FollowUp) {
        match follow_up {
            FollowUp::Battle(enemy) => self.start_battle(enemy),
            FollowUp::Puzzle(kind) => self.mode = Mode::Puzzle(PuzzleSession::new(kind)),
            FollowUp::Victory => {
                tracing::info!("package opened");
                self.mode = Mode::Victory;
            }
        }
    }

    // ── Interaction ─────────────────────────────────────────────

    /// Confirm while exploring: act on the prop in front of the player.
    fn interact(&mut self) -> bool {
        if self.nav.is_moving() {
            return false;
        }
        let target = self.nav.tile().step(self.nav.facing());
        let map = self.world.map(self.map);
        let what = match map.props_at(target).find(|p| is_live(p, &self.quest)) {
            Some(p) => p.what.clone(),
            None => return false,
        };

        let cfg = &self.world.config;
        let q = &mut self.quest;
        match what {
            PropKind::Package => {
                if q.check_code() {
                    self.dialog
                        .show("You enter 2-0-6. The lock clicks open!", Some(FollowUp::Victory));
                } else {
                    self.dialog
                        .show(format!("The package is locked. {}", q.status()), None);
                }
            }
            PropKind::Note => self.dialog.show(NOTE_TEXT, None),
            PropKind::Villager { text } => self.dialog.show(text, None),
            PropKind::HeartKeeper => {
                let cap = cfg.battle.heart_reward_cap;
                if q.has_combined_hearts {
                    self.dialog
                        .show("The heart is whole again. I already told you: 2.", None);
                } else if q.hearts_collected >= cap {
                    q.has_combined_hearts = true;
                    let digit = ClueSlot::Valencia.reward_digit();
                    q.set_clue(ClueSlot::Valencia, digit);
                    self.dialog.show(
                        format!("The two halves join into one heart! The keeper says: {}.", digit),
                        None,
                    );
                } else {
                    self.dialog.show(
                        format!(
                            "Bring me both heart halves. You have {} of {}. The crabs took them.",
                            q.hearts_collected, cap
                        ),
                        None,
                    );
                }
            }
            PropKind::SwitchVault => {
                if q.clue(ClueSlot::Valladolid).is_some() {
                    self.dialog
                        .show("The vault is already open. Its digit was 0.", None);
                } else {
                    self.dialog.show(
                        "A heavy vault with three switches.",
                        Some(FollowUp::Puzzle(PuzzleKind::Switches)),
                    );
                }
            }
            PropKind::VendingMachine => {
                if q.has_cola {
                    self.dialog.show("You already bought a cola.", None);
                } else if q.yen_count >= cfg.cola_price {
                    q.yen_count -= cfg.cola_price;
                    q.has_cola = true;
                    self.dialog.show("Clunk! You bought a cola.", None);
                } else {
                    self.dialog.show(
                        format!(
                            "A cola costs {} yen. You have {}.",
                            cfg.cola_price, q.yen_count
                        ),
                        None,
                    );
                }
            }
            PropKind::QuizMaster => {
                if q.quiz_completed {
                    self.dialog
                        .show("You already passed my quiz. Your digit was 6.", None);
                } else if !q.has_cola {
                    self.dialog
                        .show("So thirsty... bring me a cola and I'll give you a quiz.", None);
                } else {
                    self.dialog.show(
                        "A cola! Thank you. Now, answer my question.",
                        Some(FollowUp::Puzzle(PuzzleKind::Quiz)),
                    );
                }
            }
            PropKind::Sentry { id } => {
                self.dialog
                    .show("A sentry blocks the way!", Some(FollowUp::Battle(Some(id))));
            }
            PropKind::Coin { .. } => return false,
        }
        true
    }

    // ── Battles ─────────────────────────────────────────────────

    fn start_battle(&mut self, enemy: Option<String>) {
        let request = BattleRequest {
            return_to: ReturnContext {
                map: self.map,
                tile: self.nav.tile(),
                facing: self.nav.facing(),
            },
            enemy,
        };
        let battle = BattleSession::new(request, self.quest.potions, &self.world.config.battle);
        self.mode = Mode::Battle(Box::new(battle));
    }

    fn resolve_battle(&mut self, result: BattleResult, enemy: Option<String>, from: MapId) {
        self.quest.record_battle_end(self.now_ms);
        if result == BattleResult::Lost {
            self.battle_note = Some("You limp back, patched up and restocked.".into());
            return;
        }
        if let Some(id) = &enemy {
            self.quest.record_defeat(id);
        }
        let cap = self.world.config.battle.heart_reward_cap;
        if from == MapId::Valencia && self.quest.grant_heart_half(cap) {
            self.battle_note = Some(format!(
                "You found a heart half! ({} of {})",
                self.quest.hearts_collected, cap
            ));
        }
    }

    fn exit_battle(&mut self, ctx: ReturnContext, potions: u32) {
        self.quest.potions = potions;
        self.map = ctx.map;
        self.nav.place(ctx.tile, ctx.facing);
        self.mode = Mode::Explore;
        if let Some(note) = self.battle_note.take() {
            self.dialog.show(note, None);
        }
    }

    // ── Time ────────────────────────────────────────────────────

    pub fn tick(&mut self, elapsed_ms: u32) {
        self.now_ms += elapsed_ms as u64;

        match &mut self.mode {
            Mode::Explore => {
                if let Some(tile) = self.nav.advance(elapsed_ms) {
                    self.on_stopped(tile);
                }
            }
            Mode::Fading(steps) => {
                if let Some(t) = steps.advance(elapsed_ms).pop() {
                    self.load_map(t);
                }
            }
            Mode::Battle(battle) => {
                let events = battle.advance(elapsed_ms, &mut self.rng);
                let enemy = battle.request().enemy.clone();
                let from = battle.request().return_to.map;
                let potions = battle.potions;
                for event in events {
                    match event {
                        BattleEvent::Resolved(result) => self.resolve_battle(result, enemy.clone(), from),
                        BattleEvent::Exit(ctx) => self.exit_battle(ctx, potions),
                    }
                }
            }
            Mode::Puzzle(_) | Mode::Victory => {}
        }
    }

    fn on_stopped(&mut self, tile: TilePos) {
        let map = self.world.map(self.map);

        let coin = map
            .props_at(tile)
            .filter(|p| is_live(p, &self.quest))
            .find_map(|p| match p.what {
                PropKind::Coin { id } => Some(id),
                _ => None,
            });
        if let Some(id) = coin {
            if self.quest.collect_yen(id) {
                self.dialog.show(
                    format!("You picked up a yen coin. ({} yen)", self.quest.yen_count),
                    None,
                );
            }
            return;
        }

        if let Some(t) = check_exit(&self.world, map, tile, self.nav.facing()) {
            let mut steps = StepQueue::new();
            steps.push(self.world.config.fade_ms, t);
            self.mode = Mode::Fading(steps);
            return;
        }

        if map.terrain(tile) == Some(Terrain::Grass) && map.encounter_rate > 0.0 {
            let cooldown = self.world.config.encounter_cooldown_ms;
            if self.quest.encounter_suppressed(self.now_ms, cooldown) {
                return;
            }
            if self.rng.gen_bool(map.encounter_rate.clamp(0.0, 1.0)) {
                tracing::debug!(map = ?self.map, x = tile.x, y = tile.y, "random encounter");
                self.start_battle(None);
            }
        }
    }

    fn load_map(&mut self, t: Transition) {
        tracing::info!(from = ?self.map, to = ?t.to, x = t.spawn.x, y = t.spawn.y, "map switch");
        self.map = t.to;
        self.nav.place(t.spawn, t.facing);
        self.mode = Mode::Explore;
    }
}
