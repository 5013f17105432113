// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

use rand::{rngs::StdRng, Rng};

use crate::{
    flake::{Flake, FlakeDice},
    runtime::{RunState, START_DELAY, TICK_INTERVAL},
    surface::{Bounds, OverlayStyle, Surface},
};

/// Vertical position new flakes appear at, just above the top edge.
pub const SPAWN_Y: f64 = -10.0;

pub const DEFAULT_SPAWN_RATE: f64 = 1.0;
pub const DEFAULT_WIND_ANGLE: f64 = 0.0;
pub const DEFAULT_WIND_FORCE: f64 = 0.5;
pub const DEFAULT_MAX_FLAKES: usize = 10_000;

/// Resolved simulation settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnowOptions {
    /// Flakes per second. 1 is a light snow, 100 a blizzard.
    pub spawn_rate: f64,
    /// Radians; 0 is straight down. Not used by the force model yet.
    pub wind_angle: f64,
    /// 0.5 is normal, 1 is a gale. Not used by the force model yet.
    pub wind_force: f64,
    /// Seconds before a flake melts. `None` keeps flakes until they leave.
    pub lifetime: Option<f64>,
    pub max_flakes: usize,
}

impl Default for SnowOptions {
    fn default() -> Self {
        Self {
            spawn_rate: DEFAULT_SPAWN_RATE,
            wind_angle: DEFAULT_WIND_ANGLE,
            wind_force: DEFAULT_WIND_FORCE,
            lifetime: None,
            max_flakes: DEFAULT_MAX_FLAKES,
        }
    }
}

/// User supplied settings; anything missing or unusable falls back to the
/// default.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PartialOptions {
    pub spawn_rate: Option<f64>,
    pub wind_angle: Option<f64>,
    pub wind_force: Option<f64>,
    pub lifetime: Option<f64>,
    pub max_flakes: Option<usize>,
}

impl PartialOptions {
    pub fn resolve(self) -> SnowOptions {
        let finite = |v: Option<f64>| v.filter(|v| v.is_finite());
        let d = SnowOptions::default();
        SnowOptions {
            spawn_rate: finite(self.spawn_rate).unwrap_or(d.spawn_rate),
            wind_angle: finite(self.wind_angle).unwrap_or(d.wind_angle),
            wind_force: finite(self.wind_force).unwrap_or(d.wind_force),
            lifetime: finite(self.lifetime).filter(|l| *l > 0.0),
            max_flakes: self.max_flakes.unwrap_or(d.max_flakes),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    pub spawned: usize,
    pub culled: usize,
}

/// Owns every flake and the surface they are drawn on.
pub struct Snow<S: Surface> {
    options: SnowOptions,
    surface: S,

    active: Vec<Flake>,
    pool: Vec<Flake>,

    state: RunState,
    last_tick: Option<Instant>,
    tick_interval: Duration,
    spawn_remainder: f64,

    dice: FlakeDice,
    rng: StdRng,
}

fn out_of_bounds(f: &Flake, b: Bounds) -> bool {
    // no cull above the top edge, flakes spawn there
    f.x > b.width || f.x < 0.0 || f.y > b.height
}

impl<S: Surface> Snow<S> {
    pub fn new(options: SnowOptions, mut surface: S, rng: StdRng) -> Self {
        surface.mount_overlay(&OverlayStyle::BEHIND_CONTENT);
        let b = surface.size();
        log::debug!(
            "snow overlay mounted ({}x{} px); spawn_rate={} wind_angle={} wind_force={} lifetime={:?}",
            b.width,
            b.height,
            options.spawn_rate,
            options.wind_angle,
            options.wind_force,
            options.lifetime
        );

        Self {
            options,
            surface,
            active: Vec::new(),
            pool: Vec::new(),
            state: RunState::Stopped,
            last_tick: None,
            tick_interval: TICK_INTERVAL,
            spawn_remainder: 0.0,
            dice: FlakeDice::new(),
            rng,
        }
    }

    pub fn options(&self) -> &SnowOptions {
        &self.options
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn active(&self) -> &[Flake] {
        &self.active
    }

    pub fn pooled(&self) -> &[Flake] {
        &self.pool
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn set_tick_interval(&mut self, d: Duration) {
        self.tick_interval = d;
    }

    /// Starts the snowfall. Returns the delay before the first tick.
    pub fn start(&mut self, now: Instant) -> Duration {
        self.state = RunState::Running;
        self.last_tick = Some(now);
        log::info!("snowfall started");
        START_DELAY
    }

    /// Stops rescheduling. A tick that is already due still runs once.
    pub fn stop(&mut self) {
        if self.state == RunState::Running {
            log::info!(
                "snowfall stopped ({} active, {} pooled)",
                self.active.len(),
                self.pool.len()
            );
        }
        self.state = RunState::Stopped;
    }

    /// Runs one tick at `now`. Returns the delay to the next tick, or `None`
    /// once stopped.
    pub fn tick(&mut self, now: Instant) -> Option<Duration> {
        let then = self.last_tick.replace(now).unwrap_or(now);
        let dt = now.saturating_duration_since(then).as_secs_f64();
        let stats = self.step(dt);
        log::trace!(
            "tick dt={:.4}s spawned={} culled={} active={}",
            dt,
            stats.spawned,
            stats.culled,
            self.active.len()
        );

        match self.state {
            RunState::Running => Some(self.tick_interval),
            RunState::Stopped => None,
        }
    }

    /// Advances the simulation by `dt` seconds: spawn, update, cull.
    pub fn step(&mut self, dt: f64) -> TickStats {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

        let spawned = self.spawn_budget(dt);
        self.spawn(spawned);

        for f in &mut self.active {
            f.update(dt, &mut self.surface);
        }

        let bounds = self.surface.size();
        let to_cull: Vec<usize> = self
            .active
            .iter()
            .enumerate()
            .filter(|(_, f)| f.melted || out_of_bounds(f, bounds))
            .map(|(i, _)| i)
            .collect();

        // highest index first so the remaining indices stay valid
        for &i in to_cull.iter().rev() {
            self.retire(i);
        }

        TickStats {
            spawned,
            culled: to_cull.len(),
        }
    }

    fn spawn_budget(&mut self, dt: f64) -> usize {
        let budget = self.options.spawn_rate * dt + self.spawn_remainder;
        if !budget.is_finite() || budget <= 0.0 {
            self.spawn_remainder = 0.0;
            return 0;
        }
        let whole = budget.floor();
        self.spawn_remainder = budget - whole;

        let room = self.options.max_flakes.saturating_sub(self.active.len());
        (whole as usize).min(room)
    }

    /// Puts `count` flakes at the top of the viewport, reusing pooled ones
    /// first.
    pub fn spawn(&mut self, count: usize) {
        for _ in 0..count {
            let width = self.surface.viewport_width().max(0.0);
            let x = self.rng.random::<f64>() * width;

            let mut flake = match self.pool.pop() {
                Some(mut f) => {
                    f.recycle(x, SPAWN_Y);
                    f
                }
                None => Flake::new(x, SPAWN_Y, &self.dice, &mut self.rng, &mut self.surface),
            };
            flake.lifetime = self.options.lifetime;

            self.surface.attach(flake.element);
            self.surface
                .set_position(flake.element, flake.visual_left(), flake.y);
            self.active.push(flake);
        }
    }

    /// Moves the flake at `index` from the active list to the pool.
    pub fn retire(&mut self, index: usize) {
        if index >= self.active.len() {
            return;
        }
        let flake = self.active.remove(index);
        self.surface.detach(flake.element);
        self.pool.push(flake);
    }
}
