//! Discrete time. 480 ticks per beat, 4 beats per bar.

/// Integer discrete time. All event times are non-negative ticks.
pub type Tick = u64;

/// Ticks per quarter-note beat.
pub const TICKS_PER_BEAT: Tick = 480;

/// Beats per bar (common time throughout).
pub const BEATS_PER_BAR: Tick = 4;

/// Ticks per bar.
pub const TICKS_PER_BAR: Tick = TICKS_PER_BEAT * BEATS_PER_BAR;

/// 0-based bar index of a tick.
pub fn bar_of(tick: Tick) -> u64 {
    tick / TICKS_PER_BAR
}

/// First tick of a 0-based bar.
pub fn tick_of_bar(bar: u64) -> Tick {
    bar * TICKS_PER_BAR
}

/// 0-based beat within the bar (0-3).
pub fn beat_in_bar(tick: Tick) -> u64 {
    (tick % TICKS_PER_BAR) / TICKS_PER_BEAT
}

/// Beats 0 and 2 are metrically strong.
pub fn is_strong_beat(tick: Tick) -> bool {
    tick % TICKS_PER_BEAT == 0 && matches!(beat_in_bar(tick), 0 | 2)
}
