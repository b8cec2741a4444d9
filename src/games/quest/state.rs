//! Quest progress for one play session: clue digits, side-quest flags,
//! collected coins and defeated sentries. Never persisted.

use std::collections::BTreeSet;

/// The package opens with the three clue digits in slot order.
pub const TARGET_CODE: &str = "206";

/// One of the three location-bound clue cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClueSlot {
    Valencia,
    Valladolid,
    Japan,
}

impl ClueSlot {
    /// Order in which the digits are read to form the code.
    pub const ORDER: [ClueSlot; 3] = [ClueSlot::Valencia, ClueSlot::Valladolid, ClueSlot::Japan];

    fn index(&self) -> usize {
        match self {
            ClueSlot::Valencia => 0,
            ClueSlot::Valladolid => 1,
            ClueSlot::Japan => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClueSlot::Valencia => "Valencia",
            ClueSlot::Valladolid => "Valladolid",
            ClueSlot::Japan => "Japan",
        }
    }

    /// Digit handed out when this location's quest is finished.
    pub fn reward_digit(&self) -> u8 {
        match self {
            ClueSlot::Valencia => 2,
            ClueSlot::Valladolid => 0,
            ClueSlot::Japan => 6,
        }
    }
}

#[derive(Clone, Debug)]
pub struct QuestState {
    clues: [Option<u8>; 3],
    /// Heart halves won in Valencia battles (0..=cap).
    pub hearts_collected: u32,
    pub has_combined_hearts: bool,
    pub yen_count: u32,
    pub has_cola: bool,
    pub quiz_completed: bool,
    pub collected_yens: BTreeSet<u32>,
    pub defeated_enemies: BTreeSet<String>,
    /// Potion stock carried from one battle to the next.
    pub potions: u32,
    /// Game time (ms) when the last battle resolved.
    pub last_battle_ms: Option<u64>,
}

impl QuestState {
    pub fn new(potions: u32) -> Self {
        Self {
            clues: [None; 3],
            hearts_collected: 0,
            has_combined_hearts: false,
            yen_count: 0,
            has_cola: false,
            quiz_completed: false,
            collected_yens: BTreeSet::new(),
            defeated_enemies: BTreeSet::new(),
            potions,
            last_battle_ms: None,
        }
    }

    pub fn clue(&self, slot: ClueSlot) -> Option<u8> {
        self.clues[slot.index()]
    }

    pub fn set_clue(&mut self, slot: ClueSlot, digit: u8) {
        self.clues[slot.index()] = Some(digit);
        tracing::info!(slot = slot.name(), digit, "clue found");
    }

    pub fn clues_found(&self) -> usize {
        self.clues.iter().filter(|c| c.is_some()).count()
    }

    /// HUD summary of clue progress.
    pub fn status(&self) -> String {
        format!("Digits found: {} of 3.", self.clues_found())
    }

    /// True only when every slot is set and the digits, read in slot
    /// order, spell [`TARGET_CODE`] exactly.
    pub fn check_code(&self) -> bool {
        let mut code = String::with_capacity(3);
        for slot in ClueSlot::ORDER {
            match self.clue(slot) {
                Some(d) => code.push_str(&d.to_string()),
                None => return false,
            }
        }
        code == TARGET_CODE
    }

    /// Returns false when the coin was already taken.
    pub fn collect_yen(&mut self, id: u32) -> bool {
        if !self.collected_yens.insert(id) {
            return false;
        }
        self.yen_count += 1;
        true
    }

    pub fn is_defeated(&self, enemy_id: &str) -> bool {
        self.defeated_enemies.contains(enemy_id)
    }

    /// Returns false when the id was already recorded.
    pub fn record_defeat(&mut self, enemy_id: &str) -> bool {
        self.defeated_enemies.insert(enemy_id.to_string())
    }

    /// Grant one heart half unless `cap` halves were already handed out.
    pub fn grant_heart_half(&mut self, cap: u32) -> bool {
        if self.hearts_collected >= cap {
            return false;
        }
        self.hearts_collected += 1;
        true
    }

    pub fn record_battle_end(&mut self, now_ms: u64) {
        self.last_battle_ms = Some(now_ms);
    }

    /// Random encounters stay off for `cooldown_ms` after any battle.
    pub fn encounter_suppressed(&self, now_ms: u64, cooldown_ms: u64) -> bool {
        match self.last_battle_ms {
            Some(t) => now_ms.saturating_sub(t) < cooldown_ms,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn with_clues(v: u8, va: u8, j: u8) -> QuestState {
        let mut s = QuestState::new(2);
        s.set_clue(ClueSlot::Valencia, v);
        s.set_clue(ClueSlot::Valladolid, va);
        s.set_clue(ClueSlot::Japan, j);
        s
    }

    #[test]
    fn all_unset_does_not_open() {
        let s = QuestState::new(2);
        assert!(!s.check_code());
        assert_eq!(s.status(), "Digits found: 0 of 3.");
    }

    #[test]
    fn correct_order_opens() {
        assert!(with_clues(2, 0, 6).check_code());
    }

    #[test]
    fn permutations_do_not_open() {
        for (a, b, c) in [(0, 2, 6), (2, 6, 0), (6, 0, 2), (6, 2, 0), (0, 6, 2)] {
            assert!(!with_clues(a, b, c).check_code(), "{}{}{}", a, b, c);
        }
    }

    #[test]
    fn partial_clues_do_not_open() {
        let mut s = QuestState::new(2);
        s.set_clue(ClueSlot::Valencia, 2);
        s.set_clue(ClueSlot::Valladolid, 0);
        assert!(!s.check_code());
        assert_eq!(s.status(), "Digits found: 2 of 3.");
    }

    #[test]
    fn reward_digits_spell_the_code() {
        let mut s = QuestState::new(2);
        for slot in ClueSlot::ORDER {
            s.set_clue(slot, slot.reward_digit());
        }
        assert!(s.check_code());
    }

    #[test]
    fn yen_is_counted_once_per_coin() {
        let mut s = QuestState::new(2);
        assert!(s.collect_yen(1));
        assert!(!s.collect_yen(1));
        assert!(s.collect_yen(2));
        assert_eq!(s.yen_count, 2);
    }

    #[test]
    fn defeats_dedup_by_id() {
        let mut s = QuestState::new(2);
        assert!(s.record_defeat("crab"));
        assert!(!s.record_defeat("crab"));
        assert!(s.is_defeated("crab"));
        assert_eq!(s.defeated_enemies.len(), 1);
    }

    #[test]
    fn heart_halves_stop_at_cap() {
        let mut s = QuestState::new(2);
        assert!(s.grant_heart_half(2));
        assert!(s.grant_heart_half(2));
        assert!(!s.grant_heart_half(2));
        assert_eq!(s.hearts_collected, 2);
    }

    #[test]
    fn encounter_cooldown_window() {
        let mut s = QuestState::new(2);
        assert!(!s.encounter_suppressed(0, 5000));
        s.record_battle_end(10_000);
        assert!(s.encounter_suppressed(12_000, 5000));
        assert!(!s.encounter_suppressed(15_000, 5000));
    }

    proptest! {
        #[test]
        fn only_206_opens(v in 0u8..10, va in 0u8..10, j in 0u8..10) {
            let s = with_clues(v, va, j);
            prop_assert_eq!(s.check_code(), (v, va, j) == (2, 0, 6));
        }
    }
}
