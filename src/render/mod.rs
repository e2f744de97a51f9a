//! Drawing seam between the object model and a 2D backend
//!
//! Entities never talk to a canvas directly. They resolve a [`RenderKind`]
//! and issue calls against a [`Surface`], which the browser build backs with
//! `CanvasRenderingContext2d` and tests back with a [`CommandRecorder`].

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod recorder;

use std::cell::Cell;
use std::rc::Rc;

pub use recorder::{CommandRecorder, DrawCommand};

/// Minimal immediate-mode 2D drawing API
pub trait Surface {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f32, y: f32);
    fn rotate(&mut self, radians: f32);
    /// Centered text (both axes) at `px` font size
    fn fill_text(&mut self, text: &str, x: f32, y: f32, px: f32, color: &str);
    /// Draw a loaded image by its asset path into the given rect
    fn draw_image(&mut self, path: &str, x: f32, y: f32, w: f32, h: f32);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: &str);
    fn stroke_circle(&mut self, x: f32, y: f32, radius: f32, line_width: f32, color: &str);
}

/// Load state of an image asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageStatus {
    #[default]
    Pending,
    Loaded,
    Failed,
}

/// Shared handle to an image that may still be loading
///
/// The loader callback writes the status; `draw` polls it. Clones share the
/// same underlying asset.
#[derive(Debug, Clone)]
pub struct ImageSlot {
    path: Rc<str>,
    status: Rc<Cell<ImageStatus>>,
}

impl ImageSlot {
    pub fn new(path: &str) -> Self {
        Self {
            path: Rc::from(path),
            status: Rc::new(Cell::new(ImageStatus::Pending)),
        }
    }

    /// Slot whose outcome is already known
    pub fn with_status(path: &str, status: ImageStatus) -> Self {
        let slot = Self::new(path);
        slot.set_status(status);
        slot
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn status(&self) -> ImageStatus {
        self.status.get()
    }

    pub fn set_status(&self, status: ImageStatus) {
        self.status.set(status);
    }

    pub fn is_loaded(&self) -> bool {
        self.status() == ImageStatus::Loaded
    }
}

/// Starts (or reuses) an image load for an asset path
pub trait ImageLoader {
    fn request(&self, path: &str) -> ImageSlot;
}

impl<T: ImageLoader + ?Sized> ImageLoader for Rc<T> {
    fn request(&self, path: &str) -> ImageSlot {
        (**self).request(path)
    }
}

/// What an entity looks like this frame
#[derive(Debug, Clone, PartialEq)]
pub enum RenderKind {
    Glyph { text: String, size: f32 },
    Image { path: String, size: f32 },
    Placeholder { color: String, label: String, size: f32 },
}

impl RenderKind {
    /// Draw the sprite body centered at (x, y)
    pub fn draw(&self, surface: &mut impl Surface, x: f32, y: f32) {
        match self {
            RenderKind::Glyph { text, size } => {
                surface.fill_text(text, x, y, *size, "#000000");
            }
            RenderKind::Image { path, size } => {
                surface.draw_image(path, x - size / 2.0, y - size / 2.0, *size, *size);
            }
            RenderKind::Placeholder { color, label, size } => {
                surface.fill_rect(x - size / 2.0, y - size / 2.0, *size, *size, color);
                if !label.is_empty() {
                    surface.fill_text(label, x, y, size * 0.3, "white");
                }
            }
        }
    }
}
