// Copyright (c) 2026 rezky_nightky

use crate::{
    cell::Cell,
    frame::Frame,
    message::{layout_message, MsgChr},
    palette::Palette,
    surface::{Bounds, ElementId, ElementStyle, OverlayStyle, Surface},
};

const GLYPHS_UNICODE: [char; 5] = ['·', '•', '∗', '❄', '❅'];
const GLYPHS_ASCII: [char; 5] = ['.', '.', 'o', '*', '*'];

#[derive(Clone, Debug)]
struct Element {
    style: ElementStyle,
    pos: Option<(f64, f64)>,
    attached: bool,
}

/// A [`Surface`] that paints pixel-space elements onto terminal cells.
///
/// Every cell stands for `cell_w` x `cell_h` pixels. Elements are painted at
/// the cell under their center.
pub struct Canvas {
    pub cols: u16,
    pub lines: u16,
    cell_w: f64,
    cell_h: f64,
    ascii: bool,
    palette: Palette,

    overlay: Option<OverlayStyle>,
    elements: Vec<Element>,
    order: Vec<ElementId>,
    painted: Vec<usize>,

    message_text: Option<String>,
    message_border: bool,
    message: Vec<MsgChr>,
}

impl Canvas {
    pub fn new(
        cols: u16,
        lines: u16,
        cell_w: f64,
        cell_h: f64,
        ascii: bool,
        palette: Palette,
    ) -> Self {
        Self {
            cols,
            lines,
            cell_w: cell_w.max(1.0),
            cell_h: cell_h.max(1.0),
            ascii,
            palette,
            overlay: None,
            elements: Vec::new(),
            order: Vec::new(),
            painted: Vec::new(),
            message_text: None,
            message_border: true,
            message: Vec::new(),
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn set_message(&mut self, text: &str, border: bool) {
        self.message_text = Some(text.to_string());
        self.message_border = border;
        self.message = layout_message(text, border, self.cols, self.lines);
    }

    /// Adopts a new grid size. Callers hand in a fresh frame afterwards.
    pub fn resize(&mut self, cols: u16, lines: u16) {
        log::debug!("canvas resized to {}x{} cells", cols, lines);
        self.cols = cols;
        self.lines = lines;
        self.painted.clear();
        if let Some(text) = self.message_text.as_deref() {
            self.message = layout_message(text, self.message_border, cols, lines);
        }
    }

    fn glyph(&self, radius: u32) -> char {
        let set = if self.ascii {
            &GLYPHS_ASCII
        } else {
            &GLYPHS_UNICODE
        };
        let i = (radius.max(1) as usize - 1).min(set.len() - 1);
        set[i]
    }

    fn cell_of(&self, el: &Element) -> Option<(u16, u16)> {
        let (left, top) = el.pos?;
        let half = el.style.size as f64 / 2.0;
        let cx = ((left + half) / self.cell_w).floor();
        let cy = ((top + half) / self.cell_h).floor();
        if cx < 0.0 || cy < 0.0 || cx >= self.cols as f64 || cy >= self.lines as f64 {
            return None;
        }
        Some((cx as u16, cy as u16))
    }

    fn paint_flakes(&mut self, frame: &mut Frame) {
        let bg = self.palette.bg;
        for &id in &self.order {
            let el = &self.elements[id.0 as usize];
            let Some((x, y)) = self.cell_of(el) else {
                continue;
            };
            let cell = Cell::glyph(
                self.glyph(el.style.corner_radius),
                self.palette.flake_color(el.style.opacity),
                bg,
                el.style.glow_blur > 0.0 && el.style.glow_spread > 0.0,
            );
            if let Some(i) = frame.index(x, y) {
                frame.set_index(i, cell);
                self.painted.push(i);
            }
        }
    }

    fn paint_message(&mut self, frame: &mut Frame) {
        let bg = self.palette.bg;
        for mc in &self.message {
            let fg = if mc.val == ' ' {
                None
            } else {
                self.palette.content
            };
            if let Some(i) = frame.index(mc.col, mc.line) {
                frame.set_index(i, Cell::glyph(mc.val, fg, bg, false));
                self.painted.push(i);
            }
        }
    }

    /// Repaints `frame`, clearing whatever the previous call drew.
    pub fn render(&mut self, frame: &mut Frame) {
        let blank = frame.blank();
        for i in self.painted.drain(..) {
            frame.set_index(i, blank);
        }

        let behind = self.overlay.map_or(true, |o| o.z_index < 0);
        if behind {
            self.paint_flakes(frame);
            self.paint_message(frame);
        } else {
            self.paint_message(frame);
            self.paint_flakes(frame);
        }
    }
}

impl Surface for Canvas {
    fn mount_overlay(&mut self, style: &OverlayStyle) {
        log::debug!(
            "overlay mounted z_index={} interactive={} clip={}",
            style.z_index,
            style.interactive,
            style.clip_overflow
        );
        self.overlay = Some(*style);
    }

    fn size(&self) -> Bounds {
        Bounds {
            width: self.cols as f64 * self.cell_w,
            height: self.lines as f64 * self.cell_h,
        }
    }

    fn create_element(&mut self, style: &ElementStyle) -> ElementId {
        let id = ElementId(self.elements.len() as u32);
        self.elements.push(Element {
            style: *style,
            pos: None,
            attached: false,
        });
        id
    }

    fn attach(&mut self, id: ElementId) {
        if let Some(el) = self.elements.get_mut(id.0 as usize) {
            if !el.attached {
                el.attached = true;
                let z = el.style.z_index;
                let elements = &self.elements;
                let at = self
                    .order
                    .partition_point(|o| elements[o.0 as usize].style.z_index <= z);
                self.order.insert(at, id);
            }
        }
    }

    fn detach(&mut self, id: ElementId) {
        if let Some(el) = self.elements.get_mut(id.0 as usize) {
            if el.attached {
                el.attached = false;
                self.order.retain(|&o| o != id);
            }
        }
    }

    fn set_position(&mut self, id: ElementId, left: f64, top: f64) {
        if let Some(el) = self.elements.get_mut(id.0 as usize) {
            el.pos = Some((left, top));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{palette::build_palette, runtime::ColorMode};

    fn style(radius: u32, glow_spread: f64) -> ElementStyle {
        ElementStyle {
            size: radius * 2,
            opacity: 1.0,
            glow_blur: 5.0,
            glow_spread,
            corner_radius: radius,
            z_index: 9999,
        }
    }

    fn make_canvas() -> Canvas {
        let palette = build_palette(ColorMode::Mono, true);
        let mut c = Canvas::new(10, 5, 8.0, 16.0, true, palette);
        c.mount_overlay(&OverlayStyle::BEHIND_CONTENT);
        c
    }

    #[test]
    fn size_is_in_pixels() {
        let c = make_canvas();
        assert_eq!(
            c.size(),
            Bounds {
                width: 80.0,
                height: 80.0
            }
        );
        assert_eq!(c.viewport_width(), 80.0);
    }

    #[test]
    fn attached_elements_land_under_their_center() {
        let mut c = make_canvas();
        let mut frame = Frame::new(10, 5, None);
        let id = c.create_element(&style(4, 2.0));
        c.attach(id);
        // center at (20, 36) -> cell (2, 2)
        c.set_position(id, 16.0, 32.0);

        c.render(&mut frame);

        let cell = frame.get(2, 2).unwrap();
        assert_eq!(cell.ch, '*');
        assert!(cell.bold);
    }

    #[test]
    fn detached_and_offscreen_elements_are_not_drawn() {
        let mut c = make_canvas();
        let mut frame = Frame::new(10, 5, None);
        let a = c.create_element(&style(1, -1.0));
        let b = c.create_element(&style(1, -1.0));
        c.attach(a);
        c.attach(b);
        c.set_position(a, 0.0, 0.0);
        c.set_position(b, -30.0, 0.0);
        c.render(&mut frame);
        assert_eq!(frame.get(0, 0).unwrap().ch, '.');
        assert!(!frame.get(0, 0).unwrap().bold);

        c.detach(a);
        c.render(&mut frame);
        assert_eq!(frame.get(0, 0).unwrap().ch, ' ');
    }

    #[test]
    fn moving_an_element_clears_its_old_cell() {
        let mut c = make_canvas();
        let mut frame = Frame::new(10, 5, None);
        let id = c.create_element(&style(2, 0.0));
        c.attach(id);
        c.set_position(id, 0.0, 0.0);
        c.render(&mut frame);
        frame.clear_dirty();

        c.set_position(id, 40.0, 0.0);
        c.render(&mut frame);

        assert_eq!(frame.get(0, 0).unwrap().ch, ' ');
        assert_eq!(frame.get(5, 0).unwrap().ch, '.');
        assert!(frame.has_changes());
    }

    #[test]
    fn message_is_drawn_in_front_of_the_snow() {
        let mut c = make_canvas();
        let mut frame = Frame::new(10, 5, None);
        c.set_message("x", false);
        let id = c.create_element(&style(5, 0.0));
        c.attach(id);
        // lands on the message text cell (5, 2)
        c.set_position(id, 35.0, 27.0);

        c.render(&mut frame);

        assert_eq!(frame.get(5, 2).unwrap().ch, 'x');
    }
}
