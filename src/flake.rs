// Copyright (c) 2026 rezky_nightky

use rand::{
    distr::{Distribution, Uniform},
    Rng,
};

use crate::surface::{ElementId, ElementStyle, Surface};

pub const BASE_FALL_SPEED: f64 = 100.0;
pub const DEPTH_FALL_SPEED: f64 = 50.0;
pub const SWAY_AMPLITUDE: f64 = 20.0;
pub const FLAKE_Z_INDEX: i32 = 9999;

/// Samplers for the per-flake random traits.
#[derive(Clone, Debug)]
pub struct FlakeDice {
    depth: Uniform<f64>,
    vx: Uniform<f64>,
    radius: Uniform<u32>,
}

impl FlakeDice {
    pub fn new() -> Self {
        Self {
            depth: Uniform::new_inclusive(-1.0, 1.0).expect("valid range"),
            vx: Uniform::new_inclusive(-50.0, 50.0).expect("valid range"),
            radius: Uniform::new_inclusive(1, 5).expect("valid range"),
        }
    }
}

impl Default for FlakeDice {
    fn default() -> Self {
        Self::new()
    }
}

/// A single snowflake.
///
/// `depth` runs from -1 (far) to 1 (close to the viewer). Closer flakes fall
/// faster and carry a wider glow; flakes near either extreme fade out.
#[derive(Clone, Debug)]
pub struct Flake {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub age: f64,
    pub lifetime: Option<f64>,
    pub depth: f64,
    pub radius: u32,
    pub melted: bool,
    pub element: ElementId,
}

impl Flake {
    pub fn new<R, S>(x: f64, y: f64, dice: &FlakeDice, rng: &mut R, surface: &mut S) -> Self
    where
        R: Rng + ?Sized,
        S: Surface + ?Sized,
    {
        let depth = dice.depth.sample(rng);
        let vx = dice.vx.sample(rng);
        let radius = dice.radius.sample(rng);
        Self::with_traits(x, y, depth, vx, radius, surface)
    }

    /// Builds a flake from already chosen traits. Out-of-range traits are
    /// clamped.
    pub fn with_traits<S>(
        x: f64,
        y: f64,
        depth: f64,
        vx: f64,
        radius: u32,
        surface: &mut S,
    ) -> Self
    where
        S: Surface + ?Sized,
    {
        let depth = if depth.is_finite() {
            depth.clamp(-1.0, 1.0)
        } else {
            0.0
        };
        let radius = radius.max(1);
        let style = Self::style_for(depth, radius);
        let element = surface.create_element(&style);

        Self {
            x,
            y,
            vx,
            vy: BASE_FALL_SPEED + depth * DEPTH_FALL_SPEED,
            age: 0.0,
            lifetime: None,
            depth,
            radius,
            melted: false,
            element,
        }
    }

    fn style_for(depth: f64, radius: u32) -> ElementStyle {
        ElementStyle {
            size: radius * 2,
            opacity: (depth * 1.5).cos(),
            glow_blur: 5.0,
            glow_spread: depth * 10.0,
            corner_radius: radius,
            z_index: FLAKE_Z_INDEX,
        }
    }

    /// Horizontal position of the visual, including the sway.
    pub fn visual_left(&self) -> f64 {
        self.x + self.age.cos() * SWAY_AMPLITUDE
    }

    /// Re-seats a pooled flake. Traits and visual are kept; age restarts.
    pub fn recycle(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
        self.age = 0.0;
        self.melted = false;
    }

    pub fn update<S: Surface + ?Sized>(&mut self, dt: f64, surface: &mut S) {
        self.age += dt;
        self.x += self.vx * dt;
        self.y += self.vy * dt;

        if self.lifetime.is_some_and(|l| self.age >= l) {
            self.melted = true;
        }

        surface.set_position(self.element, self.visual_left(), self.y);
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::surface::mock::RecordingSurface;

    #[test]
    fn random_traits_stay_in_range() {
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let mut rng = StdRng::seed_from_u64(7);
        let dice = FlakeDice::new();

        for _ in 0..500 {
            let f = Flake::new(10.0, -10.0, &dice, &mut rng, &mut surface);
            assert!((-1.0..=1.0).contains(&f.depth));
            assert!((-50.0..=50.0).contains(&f.vx));
            assert!((1..=5).contains(&f.radius));
            assert_eq!(f.vy, 100.0 + f.depth * 50.0);
            assert!((50.0..=150.0).contains(&f.vy));
            assert_eq!(f.age, 0.0);
            assert!(!f.melted);
        }
        assert_eq!(surface.created, 500);
    }

    #[test]
    fn style_is_derived_from_depth_and_radius() {
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let f = Flake::with_traits(0.0, 0.0, 0.5, 0.0, 3, &mut surface);
        let style = surface.element(f.element).style;

        assert_eq!(style.size, 6);
        assert_eq!(style.corner_radius, 3);
        assert_eq!(style.glow_spread, 5.0);
        assert_eq!(style.z_index, FLAKE_Z_INDEX);
        assert!((style.opacity - 0.75f64.cos()).abs() < 1e-12);
    }

    #[test]
    fn update_moves_by_velocity_and_sways_only_the_visual() {
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let mut f = Flake::with_traits(400.0, 50.0, 0.0, 0.0, 2, &mut surface);
        assert_eq!(f.vy, 100.0);

        f.update(1.0, &mut surface);

        assert_eq!(f.age, 1.0);
        assert_eq!(f.x, 400.0);
        assert_eq!(f.y, 150.0);
        let (left, top) = surface.element(f.element).position.unwrap();
        assert!((left - (400.0 + 1f64.cos() * 20.0)).abs() < 1e-9);
        assert!((left - 410.806).abs() < 1e-3);
        assert_eq!(top, 150.0);
    }

    #[test]
    fn update_accumulates_age_and_position() {
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let mut f = Flake::with_traits(100.0, 0.0, -1.0, 20.0, 1, &mut surface);

        for _ in 0..4 {
            f.update(0.25, &mut surface);
        }

        assert!((f.age - 1.0).abs() < 1e-12);
        assert!((f.x - 120.0).abs() < 1e-9);
        assert!((f.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn melts_only_with_a_lifetime() {
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let mut f = Flake::with_traits(0.0, 0.0, 0.0, 0.0, 1, &mut surface);
        f.update(1000.0, &mut surface);
        assert!(!f.melted);

        f.recycle(0.0, 0.0);
        f.lifetime = Some(2.0);
        f.update(1.5, &mut surface);
        assert!(!f.melted);
        f.update(0.5, &mut surface);
        assert!(f.melted);
    }

    #[test]
    fn out_of_range_traits_are_clamped() {
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let f = Flake::with_traits(0.0, 0.0, 3.0, 0.0, 0, &mut surface);
        assert_eq!(f.depth, 1.0);
        assert_eq!(f.radius, 1);
        assert_eq!(f.vy, 150.0);
    }

    #[test]
    fn recycle_keeps_traits_and_restarts_age() {
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let mut f = Flake::with_traits(5.0, 5.0, 0.2, -12.0, 4, &mut surface);
        f.lifetime = Some(1.0);
        f.update(3.0, &mut surface);
        assert!(f.melted);

        let element = f.element;
        f.recycle(42.0, -10.0);
        assert_eq!((f.x, f.y, f.age), (42.0, -10.0, 0.0));
        assert!(!f.melted);
        assert_eq!(f.vx, -12.0);
        assert_eq!(f.radius, 4);
        assert_eq!(f.element, element);
    }
}
