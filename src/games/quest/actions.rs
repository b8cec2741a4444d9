//! Semantic action IDs for click targets.

// ── On-screen pad ──────────────────────────────────────────────
pub const PAD_UP: u16 = 1;
pub const PAD_DOWN: u16 = 2;
pub const PAD_LEFT: u16 = 3;
pub const PAD_RIGHT: u16 = 4;
/// The A button: confirm, talk, OK.
pub const PAD_CONFIRM: u16 = 5;
/// The B button: cancel, leave.
pub const PAD_CANCEL: u16 = 6;

// ── Menus (battle, puzzle) ─────────────────────────────────────
/// Menu row base: + index (0-based).
pub const MENU_BASE: u16 = 10;
pub const MENU_MAX: u16 = 9;
