//! A surface that records calls instead of drawing
//!
//! Used by tests and the headless native build.

use super::Surface;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Save,
    Restore,
    Translate { x: f32, y: f32 },
    Rotate { radians: f32 },
    Text { text: String, x: f32, y: f32, px: f32, color: String },
    Image { path: String, x: f32, y: f32, w: f32, h: f32 },
    FillRect { x: f32, y: f32, w: f32, h: f32, color: String },
    StrokeCircle { x: f32, y: f32, radius: f32, line_width: f32, color: String },
}

#[derive(Debug, Clone, Default)]
pub struct CommandRecorder {
    pub commands: Vec<DrawCommand>,
}

impl CommandRecorder {
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Number of sprite bodies drawn (text, image or rect)
    pub fn sprite_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    DrawCommand::Text { .. } | DrawCommand::Image { .. } | DrawCommand::FillRect { .. }
                )
            })
            .count()
    }

    /// Save/restore calls are balanced
    pub fn is_balanced(&self) -> bool {
        let mut depth = 0i32;
        for command in &self.commands {
            match command {
                DrawCommand::Save => depth += 1,
                DrawCommand::Restore => {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
                _ => {}
            }
        }
        depth == 0
    }
}

impl Surface for CommandRecorder {
    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::Translate { x, y });
    }

    fn rotate(&mut self, radians: f32) {
        self.commands.push(DrawCommand::Rotate { radians });
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, px: f32, color: &str) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            px,
            color: color.to_string(),
        });
    }

    fn draw_image(&mut self, path: &str, x: f32, y: f32, w: f32, h: f32) {
        self.commands.push(DrawCommand::Image {
            path: path.to_string(),
            x,
            y,
            w,
            h,
        });
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: &str) {
        self.commands.push(DrawCommand::FillRect {
            x,
            y,
            w,
            h,
            color: color.to_string(),
        });
    }

    fn stroke_circle(&mut self, x: f32, y: f32, radius: f32, line_width: f32, color: &str) {
        self.commands.push(DrawCommand::StrokeCircle {
            x,
            y,
            radius,
            line_width,
            color: color.to_string(),
        });
    }
}
