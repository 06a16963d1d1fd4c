//! Transform type and the pure geometry behind resize/rotate/skew handles.
//!
//! Every function here computes an *absolute* result from an immutable
//! snapshot taken at gesture start plus the current cursor position. Nothing
//! is re-applied incrementally across pointer samples, so repeated updates
//! cannot accumulate drift and cancelling a gesture is just dropping the
//! computed values.

use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::config::{MIN_SCALE_FACTOR, ROTATION_SNAP_DEGREES};

/// Affine transform applied to an item on top of its local geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Offset of the item's local origin in scene coordinates.
    pub position: Vec2,
    /// Per-axis scale factor (1.0 = original size).
    pub scale: Vec2,
    /// Rotation in radians.
    pub rotation: f32,
    /// Shear factors: `skew.x` shears x by y, `skew.y` shears y by x.
    pub skew: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: Vec2::new(1.0, 1.0),
            rotation: 0.0,
            skew: Vec2::ZERO,
        }
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self::default()
    }

    /// Map a local-space rectangle to scene space.
    ///
    /// Rotation and skew are intentionally ignored: this is the axis-aligned
    /// bound used for hit regions and raster intersection, where items with
    /// a rotation get a conservative box from the caller instead.
    pub fn map_rect(&self, local: Rect) -> Rect {
        let min = Pos2::new(
            local.min.x * self.scale.x + self.position.x,
            local.min.y * self.scale.y + self.position.y,
        );
        let max = Pos2::new(
            local.max.x * self.scale.x + self.position.x,
            local.max.y * self.scale.y + self.position.y,
        );
        Rect::from_two_pos(min, max)
    }
}

/// The nine interactive handles around a selection's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
    Rotate,
}

impl Handle {
    pub const RESIZE_HANDLES: [Handle; 8] = [
        Handle::TopLeft,
        Handle::TopCenter,
        Handle::TopRight,
        Handle::MiddleLeft,
        Handle::MiddleRight,
        Handle::BottomLeft,
        Handle::BottomCenter,
        Handle::BottomRight,
    ];

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            Handle::TopLeft | Handle::TopRight | Handle::BottomLeft | Handle::BottomRight
        )
    }

    pub fn is_edge(self) -> bool {
        matches!(
            self,
            Handle::TopCenter | Handle::BottomCenter | Handle::MiddleLeft | Handle::MiddleRight
        )
    }

    /// Where the handle sits on `rect`.
    pub fn position_on(self, rect: Rect) -> Pos2 {
        let c = rect.center();
        match self {
            Handle::TopLeft => rect.left_top(),
            Handle::TopCenter => Pos2::new(c.x, rect.top()),
            Handle::TopRight => rect.right_top(),
            Handle::MiddleLeft => Pos2::new(rect.left(), c.y),
            Handle::MiddleRight => Pos2::new(rect.right(), c.y),
            Handle::BottomLeft => rect.left_bottom(),
            Handle::BottomCenter => Pos2::new(c.x, rect.bottom()),
            Handle::BottomRight => rect.right_bottom(),
            Handle::Rotate => c,
        }
    }

    /// The fixed reference point a drag of this handle is computed against:
    /// opposite corner for corners, opposite edge midpoint for edges, the
    /// selection center for rotation.
    pub fn anchor_on(self, rect: Rect) -> Pos2 {
        let c = rect.center();
        match self {
            Handle::TopLeft => rect.right_bottom(),
            Handle::TopCenter => Pos2::new(c.x, rect.bottom()),
            Handle::TopRight => rect.left_bottom(),
            Handle::MiddleLeft => Pos2::new(rect.right(), c.y),
            Handle::MiddleRight => Pos2::new(rect.left(), c.y),
            Handle::BottomLeft => rect.right_top(),
            Handle::BottomCenter => Pos2::new(c.x, rect.top()),
            Handle::BottomRight => rect.left_top(),
            Handle::Rotate => c,
        }
    }
}

fn axis_ratio(current: f32, original: f32) -> f32 {
    if original.abs() < f32::EPSILON {
        1.0
    } else {
        current / original
    }
}

fn clamp_factor(s: f32) -> f32 {
    if s.abs() < MIN_SCALE_FACTOR {
        MIN_SCALE_FACTOR.copysign(s)
    } else {
        s
    }
}

/// Scale factors for a corner drag: the per-axis ratio of (anchor→cursor)
/// over (anchor→start). With `aspect_lock` both axes take the larger
/// magnitude while keeping their own signs. Factors are clamped to a
/// minimum magnitude so geometry can never degenerate.
pub fn corner_scale_factors(anchor: Pos2, start: Pos2, current: Pos2, aspect_lock: bool) -> Vec2 {
    let orig = start - anchor;
    let cur = current - anchor;
    let mut sx = axis_ratio(cur.x, orig.x);
    let mut sy = axis_ratio(cur.y, orig.y);
    if aspect_lock {
        let m = sx.abs().max(sy.abs());
        sx = m.copysign(sx);
        sy = m.copysign(sy);
    }
    Vec2::new(clamp_factor(sx), clamp_factor(sy))
}

/// Scale factors for an edge drag: the corner computation restricted to the
/// handle's axis, the other axis pinned at 1.
pub fn edge_scale_factors(handle: Handle, anchor: Pos2, start: Pos2, current: Pos2) -> Vec2 {
    let full = corner_scale_factors(anchor, start, current, false);
    match handle {
        Handle::MiddleLeft | Handle::MiddleRight => Vec2::new(full.x, 1.0),
        Handle::TopCenter | Handle::BottomCenter => Vec2::new(1.0, full.y),
        _ => full,
    }
}

/// Shear factors for an edge drag with the skew modifier: cursor travel
/// along the edge, relative to the selection's perpendicular extent.
pub fn edge_shear(handle: Handle, bounds: Rect, start: Pos2, current: Pos2) -> Vec2 {
    let delta = current - start;
    match handle {
        Handle::TopCenter | Handle::BottomCenter => {
            let extent = bounds.height().max(f32::EPSILON);
            Vec2::new(delta.x / extent, 0.0)
        }
        Handle::MiddleLeft | Handle::MiddleRight => {
            let extent = bounds.width().max(f32::EPSILON);
            Vec2::new(0.0, delta.y / extent)
        }
        _ => Vec2::ZERO,
    }
}

/// Rotation angle for a rotate drag, in radians. With `snap` the result is
/// rounded to the nearest 15° increment.
pub fn rotation_angle(center: Pos2, start: Pos2, current: Pos2, snap: bool) -> f32 {
    let a = current - center;
    let b = start - center;
    let mut angle = a.y.atan2(a.x) - b.y.atan2(b.x);
    if snap {
        let step = ROTATION_SNAP_DEGREES.to_radians();
        angle = (angle / step).round() * step;
    }
    angle
}

/// Snapshot translated by `delta`.
pub fn translated(snapshot: &Transform, delta: Vec2) -> Transform {
    Transform {
        position: snapshot.position + delta,
        ..*snapshot
    }
}

/// Snapshot scaled by `factors` about `anchor`: the position moves away from
/// (or toward) the anchor and the factors compose into the scale.
pub fn scaled_about(snapshot: &Transform, anchor: Pos2, factors: Vec2) -> Transform {
    let rel = snapshot.position - anchor.to_vec2();
    Transform {
        position: anchor.to_vec2() + Vec2::new(rel.x * factors.x, rel.y * factors.y),
        scale: Vec2::new(snapshot.scale.x * factors.x, snapshot.scale.y * factors.y),
        ..*snapshot
    }
}

/// Snapshot rotated by `angle` about `center`: the position orbits the
/// shared center and the angle composes into the rotation.
pub fn rotated_about(snapshot: &Transform, center: Pos2, angle: f32) -> Transform {
    let (sin, cos) = angle.sin_cos();
    let rel = snapshot.position - center.to_vec2();
    let rotated = Vec2::new(rel.x * cos - rel.y * sin, rel.x * sin + rel.y * cos);
    Transform {
        position: center.to_vec2() + rotated,
        rotation: snapshot.rotation + angle,
        ..*snapshot
    }
}

/// Snapshot sheared by `shear` pivoted at `anchor` (the opposite edge).
pub fn sheared_about(snapshot: &Transform, anchor: Pos2, shear: Vec2) -> Transform {
    let rel = snapshot.position - anchor.to_vec2();
    let offset = Vec2::new(shear.x * rel.y, shear.y * rel.x);
    Transform {
        position: snapshot.position + offset,
        skew: snapshot.skew + shear,
        ..*snapshot
    }
}
