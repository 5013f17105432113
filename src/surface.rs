// Copyright (c) 2026 rezky_nightky

//! Host surface the snow is drawn on.
//!
//! The simulation only ever talks to a [`Surface`]: it mounts one overlay
//! container, creates one element per flake and moves elements around in
//! pixel space. Element handles are opaque to the simulation.

/// Opaque handle to a visual element owned by a [`Surface`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementId(pub u32);

/// Container size in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

/// Styling of the full-viewport container every flake lives in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayStyle {
    /// Negative values sit behind page content.
    pub z_index: i32,
    pub interactive: bool,
    pub clip_overflow: bool,
}

impl OverlayStyle {
    pub const BEHIND_CONTENT: OverlayStyle = OverlayStyle {
        z_index: -1,
        interactive: false,
        clip_overflow: true,
    };
}

/// Styling of a single flake element. Lengths are in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementStyle {
    pub size: u32,
    pub opacity: f64,
    pub glow_blur: f64,
    pub glow_spread: f64,
    pub corner_radius: u32,
    pub z_index: i32,
}

pub trait Surface {
    /// Creates the overlay container and inserts it as the first child of the
    /// host root. Called once per simulation.
    fn mount_overlay(&mut self, style: &OverlayStyle);

    /// Current size of the overlay container.
    fn size(&self) -> Bounds;

    /// Width used to place freshly spawned flakes.
    fn viewport_width(&self) -> f64 {
        self.size().width
    }

    fn create_element(&mut self, style: &ElementStyle) -> ElementId;

    fn attach(&mut self, id: ElementId);

    fn detach(&mut self, id: ElementId);

    /// Moves an element's top-left corner to (`left`, `top`).
    fn set_position(&mut self, id: ElementId, left: f64, top: f64);
}
