//! Clue Quest: a tile-map adventure. Walk between five maps, win battles,
//! solve two puzzles and collect the three digits that open the package.
//!
//! Keys: arrows / WASD move, Z / Space / Enter confirm, X / Esc cancel,
//! 1-9 pick menu rows. The on-screen pad sends the same commands.

pub mod actions;
pub mod battle;
pub mod config;
pub mod dialog;
pub mod error;
pub mod logic;
pub mod navigation;
pub mod puzzle;
pub mod render;
pub mod state;
pub mod steps;
pub mod world;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::games::Game;
use crate::input::{ClickState, InputEvent, NavKey};

use actions::*;
use logic::{Command, QuestSession};
use world::{Direction, World};

pub struct QuestGame {
    session: QuestSession,
    /// Clock tick length; the clock owns the rate.
    tick_ms: f64,
    ticks: u64,
    /// Game time already handed to the session.
    sent_ms: u64,
}

impl QuestGame {
    pub fn new(world: World, seed: u64, tick_ms: f64) -> Self {
        Self {
            session: QuestSession::new(world, seed),
            tick_ms,
            ticks: 0,
            sent_ms: 0,
        }
    }
}

impl Game for QuestGame {
    fn handle_input(&mut self, event: &InputEvent) -> bool {
        match command_for(event) {
            Some(cmd) => self.session.handle(cmd),
            None => false,
        }
    }

    fn tick(&mut self, delta_ticks: u32) {
        if delta_ticks == 0 {
            return;
        }
        // Convert the running total so fractional tick lengths never drift.
        self.ticks += delta_ticks as u64;
        let target = (self.ticks as f64 * self.tick_ms).round() as u64;
        let elapsed = target.saturating_sub(self.sent_ms);
        self.sent_ms = target;
        if elapsed > 0 {
            self.session.tick(elapsed as u32);
        }
    }

    fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(&self.session, f, area, click_state);
    }
}

// ── Input Mapping ───────────────────────────────────────────

fn command_for(event: &InputEvent) -> Option<Command> {
    match event {
        InputEvent::Key(ch) => key_command(*ch),
        InputEvent::Nav(key) => Some(nav_command(*key)),
        InputEvent::Click(id) => click_command(*id),
    }
}

fn key_command(ch: char) -> Option<Command> {
    let cmd = match ch.to_ascii_lowercase() {
        'w' => Command::Move(Direction::Up),
        's' => Command::Move(Direction::Down),
        'a' => Command::Move(Direction::Left),
        'd' => Command::Move(Direction::Right),
        'z' | ' ' => Command::Confirm,
        'x' => Command::Cancel,
        c @ '1'..='9' => Command::Choose(c as usize - '1' as usize),
        _ => return None,
    };
    Some(cmd)
}

fn nav_command(key: NavKey) -> Command {
    match key {
        NavKey::Up => Command::Move(Direction::Up),
        NavKey::Down => Command::Move(Direction::Down),
        NavKey::Left => Command::Move(Direction::Left),
        NavKey::Right => Command::Move(Direction::Right),
        NavKey::Confirm => Command::Confirm,
        NavKey::Cancel => Command::Cancel,
    }
}

fn click_command(id: u16) -> Option<Command> {
    let cmd = match id {
        PAD_UP => Command::Move(Direction::Up),
        PAD_DOWN => Command::Move(Direction::Down),
        PAD_LEFT => Command::Move(Direction::Left),
        PAD_RIGHT => Command::Move(Direction::Right),
        PAD_CONFIRM => Command::Confirm,
        PAD_CANCEL => Command::Cancel,
        id if (MENU_BASE..MENU_BASE + MENU_MAX).contains(&id) => {
            Command::Choose((id - MENU_BASE) as usize)
        }
        _ => return None,
    };
    Some(cmd)
}
