// Copyright (c) 2025 rezk_nightky

use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Stopped,
    Running,
}

/// Delay between `start()` and the first tick.
pub const START_DELAY: Duration = Duration::from_millis(10);

/// Default delay between two ticks while running.
pub const TICK_INTERVAL: Duration = Duration::from_millis(1);
