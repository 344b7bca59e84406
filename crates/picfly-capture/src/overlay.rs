use std::time::Duration;

use picfly_types::{OverlayEvent, ScreenBounds, SelectionRect};

use crate::CaptureError;
use crate::backdrop::Backdrop;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// One-pixel frames drawn around the live selection, outermost first, as
/// `(distance outside the selection edge, colour)`. Distance 0 lies on the selection's own
/// outer row and column.
pub const BORDER_LAYERS: [(i32, Rgb); 4] = [
    (3, Rgb(0x5b, 0xb0, 0xff)),
    (2, Rgb(0x5b, 0xb0, 0xff)),
    (1, Rgb(0x2f, 0x80, 0xed)),
    (0, Rgb(0x02, 0xe1, 0x6e)),
];

/// How far a redraw has to reach past the selection to cover its border.
pub const DAMAGE_MARGIN: i32 = 4;

/// Pre-rendered pixels for the overlay, top-down BGRA rows.
///
/// `bright` is the untouched backdrop shown inside the selection, `dimmed` the darkened copy
/// shown everywhere else. Both are built once per session so a redraw is only row copies.
pub struct OverlayFrames {
    width: u32,
    height: u32,
    bright: Vec<u8>,
    dimmed: Vec<u8>,
}

/// A composed rectangle of overlay pixels, ready to blit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub rect: SelectionRect,
    /// Top-down BGRA, `rect.width() * 4` bytes per row
    pub pixels: Vec<u8>,
}

impl OverlayFrames {
    pub fn prepare(backdrop: &Backdrop, dim_alpha: u8) -> Self {
        let image = backdrop.image();
        let keep = 255 - u32::from(dim_alpha);
        let len = image.as_raw().len();

        let mut bright = Vec::with_capacity(len);
        let mut dimmed = Vec::with_capacity(len);
        for px in image.as_raw().chunks_exact(4) {
            let (r, g, b) = (px[0], px[1], px[2]);
            bright.extend_from_slice(&[b, g, r, 255]);
            dimmed.extend_from_slice(&[darken(b, keep), darken(g, keep), darken(r, keep), 255]);
        }

        Self {
            width: image.width(),
            height: image.height(),
            bright,
            dimmed,
        }
    }

    pub fn extent(&self) -> SelectionRect {
        SelectionRect::from_origin_size(0, 0, self.width, self.height)
    }

    /// Compose `area` for the given selection state. `None` when `area` misses the overlay.
    pub fn compose(&self, selection: Option<SelectionRect>, area: SelectionRect) -> Option<Patch> {
        let area = area.intersect(&self.extent())?;
        let row_bytes = area.width() as usize * 4;
        let mut pixels = Vec::with_capacity(row_bytes * area.height() as usize);

        for y in area.y0..area.y1 {
            let start = pixels.len();
            pixels.extend_from_slice(self.row(&self.dimmed, y, area.x0, area.x1));

            if let Some(sel) = selection
                && y >= sel.y0
                && y < sel.y1
            {
                let x0 = sel.x0.max(area.x0);
                let x1 = sel.x1.min(area.x1);
                if x0 < x1 {
                    let at = start + (x0 - area.x0) as usize * 4;
                    pixels[at..at + (x1 - x0) as usize * 4]
                        .copy_from_slice(self.row(&self.bright, y, x0, x1));
                }
            }

            if let Some(sel) = selection {
                let row = &mut pixels[start..start + row_bytes];
                paint_border_row(row, area, y, sel);
            }
        }

        Some(Patch { rect: area, pixels })
    }

    /// Every pixel dimmed, what the overlay shows before the first button-down.
    pub fn initial(&self) -> &[u8] {
        &self.dimmed
    }

    fn row<'a>(&self, frame: &'a [u8], y: i32, x0: i32, x1: i32) -> &'a [u8] {
        let base = (y as usize * self.width as usize + x0 as usize) * 4;
        &frame[base..base + (x1 - x0) as usize * 4]
    }
}

fn darken(channel: u8, keep: u32) -> u8 {
    (u32::from(channel) * keep / 255) as u8
}

fn paint_border_row(row: &mut [u8], area: SelectionRect, y: i32, selection: SelectionRect) {
    for (distance, Rgb(r, g, b)) in BORDER_LAYERS {
        let frame = selection.inflate(distance);
        if frame.is_empty() || y < frame.y0 || y >= frame.y1 {
            continue;
        }

        let mut put = |x: i32| {
            if x >= area.x0 && x < area.x1 {
                let at = (x - area.x0) as usize * 4;
                row[at..at + 4].copy_from_slice(&[b, g, r, 255]);
            }
        };

        if y == frame.y0 || y == frame.y1 - 1 {
            for x in frame.x0.max(area.x0)..frame.x1.min(area.x1) {
                put(x);
            }
        } else {
            put(frame.x0);
            put(frame.x1 - 1);
        }
    }
}

/// Full-screen surface the selector draws on.
pub trait OverlaySurface: Send + Sync {
    /// Show `frames` over the whole virtual screen at `bounds`.
    ///
    /// Called on the thread that will drive the returned session.
    fn open(
        &self,
        bounds: ScreenBounds,
        frames: OverlayFrames,
    ) -> Result<Box<dyn OverlaySession>, CaptureError>;
}

/// An open overlay. Dropping it tears the surface down.
pub trait OverlaySession {
    /// Wait up to `timeout` for the next pointer or keyboard event.
    fn next_event(&mut self, timeout: Duration) -> Option<OverlayEvent>;

    /// Repaint `damage` with `selection` as the live rectangle.
    fn render(&mut self, selection: Option<SelectionRect>, damage: SelectionRect);
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};
    use picfly_types::Point;

    use super::*;

    fn frames(width: u32, height: u32, dim_alpha: u8) -> OverlayFrames {
        let image = RgbaImage::from_pixel(width, height, Rgba([200, 100, 50, 255]));
        OverlayFrames::prepare(&Backdrop::new(image, Point::new(0, 0)), dim_alpha)
    }

    fn pixel(patch: &Patch, x: i32, y: i32) -> [u8; 4] {
        let w = patch.rect.width() as usize;
        let at = ((y - patch.rect.y0) as usize * w + (x - patch.rect.x0) as usize) * 4;
        [
            patch.pixels[at],
            patch.pixels[at + 1],
            patch.pixels[at + 2],
            patch.pixels[at + 3],
        ]
    }

    const BRIGHT: [u8; 4] = [50, 100, 200, 255];

    #[test]
    fn frames_are_bgra_and_dimmed() {
        let f = frames(4, 4, 128);
        assert_eq!(&f.bright[..4], &BRIGHT);
        assert_eq!(&f.initial()[..4], &[24, 49, 99, 255]);
    }

    #[test]
    fn zero_alpha_leaves_backdrop_untouched() {
        let f = frames(2, 2, 0);
        assert_eq!(f.initial(), f.bright.as_slice());
    }

    #[test]
    fn no_selection_is_all_dimmed() {
        let f = frames(10, 10, 77);
        let patch = f.compose(None, f.extent()).unwrap();
        assert_eq!(patch.pixels, f.initial());
    }

    #[test]
    fn selection_interior_is_bright_and_edges_are_coloured() {
        let f = frames(40, 40, 77);
        let sel = SelectionRect {
            x0: 10,
            y0: 10,
            x1: 30,
            y1: 30,
        };
        let patch = f.compose(Some(sel), f.extent()).unwrap();

        assert_eq!(pixel(&patch, 20, 20), BRIGHT);
        assert_eq!(pixel(&patch, 10, 20), [0x6e, 0xe1, 0x02, 255]);
        assert_eq!(pixel(&patch, 9, 20), [0xed, 0x80, 0x2f, 255]);
        assert_eq!(pixel(&patch, 8, 20), [0xff, 0xb0, 0x5b, 255]);
        assert_eq!(pixel(&patch, 7, 20), [0xff, 0xb0, 0x5b, 255]);
        assert_eq!(&pixel(&patch, 6, 20), &f.initial()[..4]);
        assert_eq!(pixel(&patch, 20, 32), [0xff, 0xb0, 0x5b, 255]);
    }

    #[test]
    fn compose_only_covers_requested_area() {
        let f = frames(100, 100, 77);
        let sel = SelectionRect::from_origin_size(20, 20, 30, 30);
        let damage = sel.inflate(DAMAGE_MARGIN);
        let patch = f.compose(Some(sel), damage).unwrap();

        assert_eq!(patch.rect, damage);
        assert_eq!(
            patch.pixels.len(),
            (damage.width() * damage.height() * 4) as usize
        );
        // Outermost damage ring lies beyond the glow
        assert_eq!(&pixel(&patch, damage.x0, damage.y0), &f.initial()[..4]);
    }

    #[test]
    fn compose_clips_to_the_overlay() {
        let f = frames(20, 20, 77);
        let sel = SelectionRect::from_origin_size(0, 0, 5, 5);
        let patch = f.compose(Some(sel), sel.inflate(DAMAGE_MARGIN)).unwrap();
        assert_eq!(patch.rect, SelectionRect::from_origin_size(0, 0, 9, 9));
        assert!(f.compose(None, SelectionRect::from_origin_size(50, 50, 5, 5)).is_none());
    }

    #[test]
    fn empty_selection_still_shows_a_marker() {
        let f = frames(20, 20, 77);
        let sel = SelectionRect::from_origin_size(10, 10, 0, 0);
        let patch = f.compose(Some(sel), f.extent()).unwrap();
        assert_eq!(pixel(&patch, 9, 10), [0xed, 0x80, 0x2f, 255]);
    }
}
