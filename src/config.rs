use egui::Vec2;
use serde::{Deserialize, Serialize};

/// z-value range allocated to each layer; items never interleave across
/// layers as long as a layer stays below this many items.
pub const LAYER_Z_RANGE: i32 = 10_000;

/// Scale factors below this magnitude are clamped to it so a resize can
/// never collapse or invert geometry into a degenerate state.
pub const MIN_SCALE_FACTOR: f32 = 0.01;

/// Fonts never scale below this size.
pub const MIN_FONT_SIZE: f32 = 1.0;

/// Rotation snap increment in degrees.
pub const ROTATION_SNAP_DEGREES: f32 = 15.0;

/// Tunable editor behavior.
///
/// Serialized alongside application preferences by the host; every field has
/// a sensible default so a missing or partial config is never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of entries kept on the undo stack.
    pub undo_limit: usize,
    /// Pointer travel (in scene units) before a press becomes a drag.
    pub drag_threshold: f32,
    /// Arrow-key nudge distance.
    pub nudge_step: f32,
    /// Arrow-key nudge distance with the accelerator held.
    pub nudge_step_large: f32,
    /// Positional offset applied to pasted items (zero for paste-in-place).
    pub paste_offset: Vec2,
    /// Logical canvas size for a fresh scene.
    pub canvas_size: Vec2,
    pub default_stroke_width: f32,
    pub default_font_size: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            undo_limit: 200,
            drag_threshold: 4.0,
            nudge_step: 1.0,
            nudge_step_large: 10.0,
            paste_offset: Vec2::new(16.0, 16.0),
            canvas_size: Vec2::new(1920.0, 1080.0),
            default_stroke_width: 2.0,
            default_font_size: 14.0,
        }
    }
}
