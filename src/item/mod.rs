pub(crate) mod raster;

pub use raster::RasterImage;

use egui::{Color32, Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::config::MIN_FONT_SIZE;
use crate::id::ItemId;
use crate::transform::Transform;

/// A single annotation item in the scene.
///
/// One shared transform/identity header, a per-kind payload, and a z-offset
/// inside the owning layer. Items are owned exclusively by their layer and
/// referenced everywhere else by [`ItemId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    id: ItemId,
    pub transform: Transform,
    /// Stacking offset within the layer, added to the layer's z-base.
    pub z_offset: i32,
    pub kind: ItemKind,
}

/// Per-kind geometry and styling payloads.
///
/// Dispatch is by matching on the tag; there is no trait-object hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemKind {
    Rectangle {
        rect: Rect,
        stroke_width: f32,
        corner_radius: f32,
        stroke: Color32,
        fill: Color32,
    },
    Ellipse {
        rect: Rect,
        stroke_width: f32,
        stroke: Color32,
        fill: Color32,
    },
    Line {
        start: Pos2,
        end: Pos2,
        stroke_width: f32,
        color: Color32,
    },
    Arrow {
        start: Pos2,
        end: Pos2,
        stroke_width: f32,
        head_size: f32,
        color: Color32,
    },
    Freehand {
        points: Vec<Pos2>,
        stroke_width: f32,
        color: Color32,
    },
    Highlight {
        rect: Rect,
        color: Color32,
    },
    Callout {
        rect: Rect,
        /// Tip of the speech-bubble tail, in local coordinates.
        tail: Pos2,
        corner_radius: f32,
        stroke_width: f32,
        font_size: f32,
        text: String,
        stroke: Color32,
        fill: Color32,
    },
    Blur {
        rect: Rect,
        blur_radius: f32,
    },
    NumberedStep {
        center: Pos2,
        radius: f32,
        number: u32,
        font_size: f32,
        color: Color32,
    },
    Stamp {
        rect: Rect,
        /// Identifier of the stamp asset, resolved by the renderer.
        stamp: String,
    },
    Text {
        /// Wrap width; height follows from the content.
        width: f32,
        text: String,
        font_size: f32,
        color: Color32,
    },
    RasterRegion {
        image: RasterImage,
    },
}

impl Item {
    /// Create an item with a fresh id and identity transform.
    pub fn new(kind: ItemKind) -> Self {
        Self {
            id: ItemId::next(),
            transform: Transform::identity(),
            z_offset: 0,
            kind,
        }
    }

    /// Create an item positioned at `position`.
    pub fn at(kind: ItemKind, position: Vec2) -> Self {
        let mut item = Self::new(kind);
        item.transform.position = position;
        item
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Clone carrying a fresh id, used when pasting.
    pub fn with_new_id(mut self) -> Self {
        self.id = ItemId::next();
        self
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ItemKind::Rectangle { .. } => "rectangle",
            ItemKind::Ellipse { .. } => "ellipse",
            ItemKind::Line { .. } => "line",
            ItemKind::Arrow { .. } => "arrow",
            ItemKind::Freehand { .. } => "freehand",
            ItemKind::Highlight { .. } => "highlight",
            ItemKind::Callout { .. } => "callout",
            ItemKind::Blur { .. } => "blur",
            ItemKind::NumberedStep { .. } => "numbered step",
            ItemKind::Stamp { .. } => "stamp",
            ItemKind::Text { .. } => "text",
            ItemKind::RasterRegion { .. } => "raster region",
        }
    }

    /// Bounding rectangle of the local geometry, before the transform.
    pub fn local_bounds(&self) -> Rect {
        match &self.kind {
            ItemKind::Rectangle { rect, stroke_width, .. }
            | ItemKind::Ellipse { rect, stroke_width, .. } => rect.expand(stroke_width / 2.0),
            ItemKind::Line { start, end, stroke_width, .. } => {
                Rect::from_two_pos(*start, *end).expand(stroke_width / 2.0)
            }
            ItemKind::Arrow { start, end, stroke_width, head_size, .. } => {
                Rect::from_two_pos(*start, *end).expand(stroke_width / 2.0 + head_size)
            }
            ItemKind::Freehand { points, stroke_width, .. } => {
                let mut rect = Rect::NOTHING;
                for p in points {
                    rect.extend_with(*p);
                }
                if rect == Rect::NOTHING {
                    Rect::ZERO
                } else {
                    rect.expand(stroke_width / 2.0)
                }
            }
            ItemKind::Highlight { rect, .. }
            | ItemKind::Blur { rect, .. }
            | ItemKind::Stamp { rect, .. } => *rect,
            ItemKind::Callout { rect, tail, stroke_width, .. } => {
                let mut bounds = *rect;
                bounds.extend_with(*tail);
                bounds.expand(stroke_width / 2.0)
            }
            ItemKind::NumberedStep { center, radius, .. } => {
                Rect::from_center_size(*center, Vec2::splat(radius * 2.0))
            }
            ItemKind::Text { width, font_size, text, .. } => {
                // Rough line-count estimate; exact metrics live in the
                // rendering collaborator.
                let lines = text.lines().count().max(1) as f32;
                Rect::from_min_size(Pos2::ZERO, Vec2::new(width.max(1.0), lines * font_size * 1.4))
            }
            ItemKind::RasterRegion { image } => Rect::from_min_size(Pos2::ZERO, image.size()),
        }
    }

    /// Axis-aligned bounds in scene coordinates.
    pub fn scene_bounds(&self) -> Rect {
        self.transform.map_rect(self.local_bounds())
    }

    /// Scale the local geometry by `(sx, sy)`.
    ///
    /// Scalar properties (stroke width, corner radius, blur radius, arrow
    /// head, step radius) scale by the average of the two factors so their
    /// visual proportion survives non-uniform scaling; font sizes do the
    /// same but never drop below the minimum. Raster buffers are resampled
    /// with a smooth filter.
    pub(crate) fn scale_geometry(&mut self, sx: f32, sy: f32) {
        let avg = (sx + sy) / 2.0;
        match &mut self.kind {
            ItemKind::Rectangle { rect, stroke_width, corner_radius, .. } => {
                *rect = scale_rect(*rect, sx, sy);
                *stroke_width *= avg;
                *corner_radius *= avg;
            }
            ItemKind::Ellipse { rect, stroke_width, .. } => {
                *rect = scale_rect(*rect, sx, sy);
                *stroke_width *= avg;
            }
            ItemKind::Line { start, end, stroke_width, .. } => {
                *start = scale_pos(*start, sx, sy);
                *end = scale_pos(*end, sx, sy);
                *stroke_width *= avg;
            }
            ItemKind::Arrow { start, end, stroke_width, head_size, .. } => {
                *start = scale_pos(*start, sx, sy);
                *end = scale_pos(*end, sx, sy);
                *stroke_width *= avg;
                *head_size *= avg;
            }
            ItemKind::Freehand { points, stroke_width, .. } => {
                for p in points.iter_mut() {
                    *p = scale_pos(*p, sx, sy);
                }
                *stroke_width *= avg;
            }
            ItemKind::Highlight { rect, .. } => *rect = scale_rect(*rect, sx, sy),
            ItemKind::Callout { rect, tail, corner_radius, stroke_width, font_size, .. } => {
                *rect = scale_rect(*rect, sx, sy);
                *tail = scale_pos(*tail, sx, sy);
                *corner_radius *= avg;
                *stroke_width *= avg;
                *font_size = (*font_size * avg).max(MIN_FONT_SIZE);
            }
            ItemKind::Blur { rect, blur_radius } => {
                *rect = scale_rect(*rect, sx, sy);
                *blur_radius *= avg;
            }
            ItemKind::NumberedStep { center, radius, font_size, .. } => {
                *center = scale_pos(*center, sx, sy);
                *radius *= avg;
                *font_size = (*font_size * avg).max(MIN_FONT_SIZE);
            }
            ItemKind::Stamp { rect, .. } => *rect = scale_rect(*rect, sx, sy),
            ItemKind::Text { width, font_size, .. } => {
                *width *= sx;
                *font_size = (*font_size * avg).max(MIN_FONT_SIZE);
            }
            ItemKind::RasterRegion { image } => {
                let w = (image.width() as f32 * sx).round().max(1.0) as u32;
                let h = (image.height() as f32 * sy).round().max(1.0) as u32;
                *image = image.resample(w, h);
            }
        }
    }

    pub fn raster(&self) -> Option<&RasterImage> {
        match &self.kind {
            ItemKind::RasterRegion { image } => Some(image),
            _ => None,
        }
    }

    pub(crate) fn raster_mut(&mut self) -> Option<&mut RasterImage> {
        match &mut self.kind {
            ItemKind::RasterRegion { image } => Some(image),
            _ => None,
        }
    }
}

fn scale_pos(p: Pos2, sx: f32, sy: f32) -> Pos2 {
    Pos2::new(p.x * sx, p.y * sy)
}

fn scale_rect(r: Rect, sx: f32, sy: f32) -> Rect {
    Rect::from_two_pos(scale_pos(r.min, sx, sy), scale_pos(r.max, sx, sy))
}
