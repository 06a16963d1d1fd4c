//! The gesture state machine shared by all interactive tools.
//!
//! IDLE → ARMED (press) → ACTIVE (drag past threshold) → COMMIT / CANCEL.
//! While a gesture runs, only this module's preview map changes — the scene
//! graph and command stack are untouched until COMMIT, and CANCEL discards
//! the preview with zero residue.

use egui::{Pos2, Rect, Vec2};

use crate::command::{Command, TransformEntry};
use crate::id::ItemId;
use crate::transform::{
    self, Handle, Transform, corner_scale_factors, edge_scale_factors, edge_shear, rotation_angle,
};

/// What a drag does to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    Move,
    Resize(Handle),
    Rotate,
}

/// Modifier keys sampled with each pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragModifiers {
    /// Uniform scaling on corner handles.
    pub aspect_lock: bool,
    /// Resize about the selection center.
    pub from_center: bool,
    /// Shear instead of scaling on edge handles.
    pub skew: bool,
    /// Snap rotation to 15° increments.
    pub snap_angle: bool,
    /// Constrain a move to its dominant axis.
    pub constrain_axis: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Armed,
    Active,
}

#[derive(Debug)]
struct GestureState {
    kind: DragKind,
    phase: Phase,
    start: Pos2,
    current: Pos2,
    modifiers: DragModifiers,
    /// Selection bounds at gesture start; anchors derive from this.
    bounds: Rect,
    /// Immutable per-item transforms captured at gesture start.
    snapshots: Vec<(ItemId, Transform)>,
    /// Transient presentation state, recomputed absolutely every sample.
    preview: Vec<(ItemId, Transform)>,
}

/// One in-flight pointer gesture.
pub struct DragGesture {
    threshold: f32,
    state: Option<GestureState>,
}

impl DragGesture {
    pub fn new(threshold: f32) -> Self {
        Self { threshold, state: None }
    }

    /// Arm a gesture at `start`. Any previous gesture is cancelled.
    pub fn begin(
        &mut self,
        kind: DragKind,
        start: Pos2,
        bounds: Rect,
        snapshots: Vec<(ItemId, Transform)>,
    ) {
        // The rotate handle always rotates, whichever way it was picked up.
        let kind = match kind {
            DragKind::Resize(Handle::Rotate) => DragKind::Rotate,
            other => other,
        };
        let preview = snapshots.clone();
        self.state = Some(GestureState {
            kind,
            phase: Phase::Armed,
            start,
            current: start,
            modifiers: DragModifiers::default(),
            bounds,
            snapshots,
            preview,
        });
    }

    /// Feed a pointer sample. Arms become active once travel exceeds the
    /// drag threshold; active gestures recompute the preview from the start
    /// snapshots and the current cursor — never incrementally.
    pub fn update(&mut self, pos: Pos2, modifiers: DragModifiers) {
        let threshold = self.threshold;
        let Some(state) = self.state.as_mut() else { return };
        state.current = pos;
        state.modifiers = modifiers;
        if state.phase == Phase::Armed && (pos - state.start).length() >= threshold {
            state.phase = Phase::Active;
        }
        if state.phase == Phase::Active {
            state.preview = compute_preview(state);
        }
    }

    /// The live transform for `id` during the gesture, if any.
    pub fn preview(&self, id: ItemId) -> Option<Transform> {
        self.state
            .as_ref()?
            .preview
            .iter()
            .find(|(pid, _)| *pid == id)
            .map(|(_, t)| *t)
    }

    /// True once the drag threshold has been crossed.
    pub fn is_active(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.phase == Phase::Active)
    }

    /// True from press until commit or cancel.
    pub fn is_engaged(&self) -> bool {
        self.state.is_some()
    }

    /// Discard the gesture. Scene and stack are untouched, so the caller's
    /// state is byte-identical to before the press.
    pub fn cancel(&mut self) {
        if self.state.take().is_some() {
            log::debug!("gesture cancelled");
        }
    }

    /// Finish the gesture, producing at most one command covering every
    /// affected item, so a single undo reverses the whole gesture.
    pub fn commit(&mut self) -> Option<Command> {
        let state = self.state.take()?;
        if state.phase != Phase::Active {
            return None;
        }
        match state.kind {
            DragKind::Move => {
                let delta = constrained_delta(&state);
                if delta == Vec2::ZERO || state.snapshots.is_empty() {
                    return None;
                }
                let ids = state.snapshots.iter().map(|(id, _)| *id).collect();
                Some(Command::move_items(ids, delta))
            }
            DragKind::Resize(_) | DragKind::Rotate => {
                let entries: Vec<TransformEntry> = state
                    .snapshots
                    .iter()
                    .zip(state.preview.iter())
                    .map(|((id, before), (_, after))| TransformEntry {
                        id: *id,
                        before: *before,
                        after: *after,
                    })
                    .collect();
                if entries.iter().all(|e| e.before == e.after) {
                    return None;
                }
                Some(Command::transform_items(entries))
            }
        }
    }
}

fn constrained_delta(state: &GestureState) -> Vec2 {
    let delta = state.current - state.start;
    if state.modifiers.constrain_axis {
        if delta.x.abs() >= delta.y.abs() {
            Vec2::new(delta.x, 0.0)
        } else {
            Vec2::new(0.0, delta.y)
        }
    } else {
        delta
    }
}

fn compute_preview(state: &GestureState) -> Vec<(ItemId, Transform)> {
    match state.kind {
        DragKind::Move => {
            let delta = constrained_delta(state);
            state
                .snapshots
                .iter()
                .map(|(id, snap)| (*id, transform::translated(snap, delta)))
                .collect()
        }
        DragKind::Resize(handle) => {
            let mods = state.modifiers;
            if handle.is_edge() && mods.skew {
                let pivot = handle.anchor_on(state.bounds);
                let shear = edge_shear(handle, state.bounds, state.start, state.current);
                return state
                    .snapshots
                    .iter()
                    .map(|(id, snap)| (*id, transform::sheared_about(snap, pivot, shear)))
                    .collect();
            }
            let anchor = if mods.from_center {
                state.bounds.center()
            } else {
                handle.anchor_on(state.bounds)
            };
            let factors = if handle.is_corner() {
                corner_scale_factors(anchor, state.start, state.current, mods.aspect_lock)
            } else {
                edge_scale_factors(handle, anchor, state.start, state.current)
            };
            state
                .snapshots
                .iter()
                .map(|(id, snap)| (*id, transform::scaled_about(snap, anchor, factors)))
                .collect()
        }
        DragKind::Rotate => {
            let center = state.bounds.center();
            let angle =
                rotation_angle(center, state.start, state.current, state.modifiers.snap_angle);
            state
                .snapshots
                .iter()
                .map(|(id, snap)| (*id, transform::rotated_about(snap, center, angle)))
                .collect()
        }
    }
}
