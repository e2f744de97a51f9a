//! Canvas2D backend (browser only)

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use super::{ImageLoader, ImageSlot, ImageStatus, Surface};

/// Per-path cache of `<img>` elements
///
/// Loads are fire-and-forget: the onload/onerror closures only flip the slot
/// status, so an entity that is culled mid-load leaves nothing to cancel.
#[derive(Default)]
pub struct HtmlImageLoader {
    images: RefCell<HashMap<String, (HtmlImageElement, ImageSlot)>>,
}

impl HtmlImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loaded element for a path, if any
    pub fn element(&self, path: &str) -> Option<HtmlImageElement> {
        self.images
            .borrow()
            .get(path)
            .filter(|(_, slot)| slot.is_loaded())
            .map(|(img, _)| img.clone())
    }

    fn start_load(path: &str) -> Result<(HtmlImageElement, ImageSlot), JsValue> {
        let img = HtmlImageElement::new()?;
        let slot = ImageSlot::new(path);

        {
            let slot = slot.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                slot.set_status(ImageStatus::Loaded);
            });
            img.set_onload(Some(closure.as_ref().unchecked_ref()));
            closure.forget();
        }

        {
            let slot = slot.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                log::warn!("Failed to load image: {}", slot.path());
                slot.set_status(ImageStatus::Failed);
            });
            img.set_onerror(Some(closure.as_ref().unchecked_ref()));
            closure.forget();
        }

        img.set_src(path);
        Ok((img, slot))
    }
}

impl ImageLoader for HtmlImageLoader {
    fn request(&self, path: &str) -> ImageSlot {
        if let Some((_, slot)) = self.images.borrow().get(path) {
            return slot.clone();
        }

        match Self::start_load(path) {
            Ok((img, slot)) => {
                self.images
                    .borrow_mut()
                    .insert(path.to_string(), (img, slot.clone()));
                slot
            }
            Err(e) => {
                log::warn!("Could not create image element for {}: {:?}", path, e);
                ImageSlot::with_status(path, ImageStatus::Failed)
            }
        }
    }
}

/// `Surface` over a 2D canvas context
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    images: Rc<HtmlImageLoader>,
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d, images: Rc<HtmlImageLoader>) -> Self {
        Self { ctx, images }
    }

    /// Wipe the whole canvas
    pub fn clear(&self, width: f64, height: f64) {
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }
}

impl Surface for CanvasSurface {
    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, x: f32, y: f32) {
        let _ = self.ctx.translate(x as f64, y as f64);
    }

    fn rotate(&mut self, radians: f32) {
        let _ = self.ctx.rotate(radians as f64);
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, px: f32, color: &str) {
        self.ctx.set_font(&format!("{}px Arial", px));
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
        self.ctx.set_fill_style_str(color);
        let _ = self.ctx.fill_text(text, x as f64, y as f64);
    }

    fn draw_image(&mut self, path: &str, x: f32, y: f32, w: f32, h: f32) {
        if let Some(img) = self.images.element(path) {
            let _ = self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
                &img, x as f64, y as f64, w as f64, h as f64,
            );
        }
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(x as f64, y as f64, w as f64, h as f64);
    }

    fn stroke_circle(&mut self, x: f32, y: f32, radius: f32, line_width: f32, color: &str) {
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(line_width as f64);
        self.ctx.begin_path();
        let _ = self
            .ctx
            .arc(x as f64, y as f64, radius as f64, 0.0, std::f64::consts::TAU);
        self.ctx.stroke();
    }
}
