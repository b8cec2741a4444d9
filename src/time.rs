//! Fixed-step game clock.
//!
//! The browser calls `draw_web()` at whatever rate it likes. `GameTime`
//! turns those uneven frame gaps into whole ticks of a fixed length, so the
//! game only ever advances in multiples of [`GameTime::tick_ms`].

pub struct GameTime {
    ms_per_tick: f64,
    /// Wall time not yet turned into ticks.
    accumulator: f64,
    pub total_ticks: u64,
    last_timestamp: Option<f64>,
}

/// Longest frame gap honoured; a backgrounded tab does not fast-forward.
const MAX_FRAME_MS: f64 = 500.0;

impl GameTime {
    pub fn new(ticks_per_sec: u32) -> Self {
        Self {
            ms_per_tick: 1000.0 / ticks_per_sec.max(1) as f64,
            accumulator: 0.0,
            total_ticks: 0,
            last_timestamp: None,
        }
    }

    /// Length of one tick in milliseconds.
    pub fn tick_ms(&self) -> f64 {
        self.ms_per_tick
    }

    /// Feed a timestamp from `performance.now()`. Returns how many ticks
    /// elapsed since the previous call.
    pub fn update(&mut self, now_ms: f64) -> u32 {
        let delta = match self.last_timestamp {
            Some(prev) => (now_ms - prev).clamp(0.0, MAX_FRAME_MS),
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);

        self.accumulator += delta;
        let ticks = (self.accumulator / self.ms_per_tick) as u32;
        self.accumulator -= ticks as f64 * self.ms_per_tick;
        self.total_ticks += ticks as u64;
        ticks
    }
}
