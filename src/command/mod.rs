mod stack;

pub use stack::CommandStack;

use egui::{Rect, Vec2};

use crate::clipboard::{ItemCodec, ItemSnapshot};
use crate::error::CoreError;
use crate::event::{CoreEvent, EventBus};
use crate::id::{ItemId, LayerId};
use crate::item::Item;
use crate::raster::{self, CutBackup};
use crate::scene::Scene;
use crate::transform::Transform;

/// Everything a command may touch while applying or reversing itself.
///
/// This is the only path that hands out mutable scene access, which keeps
/// the single-writer rule checkable by the compiler rather than by review.
pub struct CommandContext<'a> {
    pub scene: &'a mut Scene,
    pub events: &'a EventBus,
    pub codec: &'a dyn ItemCodec,
}

/// Before/after transform pair for one item within a transform command.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformEntry {
    pub id: ItemId,
    pub before: Transform,
    pub after: Transform,
}

/// An undoable scene mutation.
///
/// Every variant can re-execute (`redo`), reverse itself (`undo`), and
/// optionally absorb an immediately following command of the same shape
/// (`merge_with`). Commands referencing destroyed items degrade to no-ops
/// for those items rather than failing.
#[derive(Debug, Clone)]
pub enum Command {
    /// Translate a set of items by a shared delta. Consecutive moves of the
    /// identical item set merge into one entry.
    MoveItems { ids: Vec<ItemId>, delta: Vec2 },

    /// Apply absolute before/after transforms to a set of items; one entry
    /// per gesture, so a single undo reverses the whole gesture atomically.
    TransformItems { entries: Vec<TransformEntry> },

    /// Add one item to a layer.
    AddItem {
        layer: LayerId,
        item: Item,
        /// Set once the first apply allocates a stacking offset.
        placed: bool,
    },

    /// Remove items; captures each item with its layer and position on
    /// first apply so undo reinserts them exactly where they were.
    RemoveItems {
        ids: Vec<ItemId>,
        removed: Vec<(Item, LayerId, usize)>,
    },

    /// Erase a scene-space region from the raster items of one layer.
    RasterCut {
        layer: LayerId,
        region: Rect,
        backups: Vec<CutBackup>,
    },

    /// Resize the logical canvas, scaling every item's geometry. Undo
    /// restores each item from a full pre-scale snapshot, never by inverse
    /// scaling, so repeated resize/undo cannot accumulate rounding drift.
    ResizeCanvas {
        new_size: Vec2,
        old_size: Option<Vec2>,
        snapshots: Vec<(ItemId, ItemSnapshot)>,
    },

    SetLayerVisible {
        layer: LayerId,
        visible: bool,
        was: Option<bool>,
    },

    SetLayerLocked {
        layer: LayerId,
        locked: bool,
        was: Option<bool>,
    },

    /// Ordered group of sub-commands applied as one unit and undone in
    /// reverse order.
    Macro {
        description: String,
        commands: Vec<Command>,
    },
}

impl Command {
    pub fn move_items(ids: Vec<ItemId>, delta: Vec2) -> Self {
        Command::MoveItems { ids, delta }
    }

    pub fn transform_items(entries: Vec<TransformEntry>) -> Self {
        Command::TransformItems { entries }
    }

    pub fn add_item(layer: LayerId, item: Item) -> Self {
        Command::AddItem { layer, item, placed: false }
    }

    pub fn remove_items(ids: Vec<ItemId>) -> Self {
        Command::RemoveItems { ids, removed: Vec::new() }
    }

    pub fn raster_cut(layer: LayerId, region: Rect) -> Self {
        Command::RasterCut { layer, region, backups: Vec::new() }
    }

    pub fn resize_canvas(new_size: Vec2) -> Self {
        Command::ResizeCanvas { new_size, old_size: None, snapshots: Vec::new() }
    }

    pub fn set_layer_visible(layer: LayerId, visible: bool) -> Self {
        Command::SetLayerVisible { layer, visible, was: None }
    }

    pub fn set_layer_locked(layer: LayerId, locked: bool) -> Self {
        Command::SetLayerLocked { layer, locked, was: None }
    }

    pub fn macro_of(description: &str, commands: Vec<Command>) -> Self {
        Command::Macro { description: description.to_string(), commands }
    }

    /// Human-readable description for the undo/redo menu.
    pub fn description(&self) -> String {
        match self {
            Command::MoveItems { ids, .. } => {
                format!("Move {} item{}", ids.len(), plural(ids.len()))
            }
            Command::TransformItems { entries } => {
                format!("Transform {} item{}", entries.len(), plural(entries.len()))
            }
            Command::AddItem { item, .. } => format!("Add {}", item.kind_name()),
            Command::RemoveItems { ids, .. } => {
                format!("Remove {} item{}", ids.len(), plural(ids.len()))
            }
            Command::RasterCut { .. } => "Erase region".to_string(),
            Command::ResizeCanvas { .. } => "Resize canvas".to_string(),
            Command::SetLayerVisible { visible: true, .. } => "Show layer".to_string(),
            Command::SetLayerVisible { visible: false, .. } => "Hide layer".to_string(),
            Command::SetLayerLocked { locked: true, .. } => "Lock layer".to_string(),
            Command::SetLayerLocked { locked: false, .. } => "Unlock layer".to_string(),
            Command::Macro { description, .. } => description.clone(),
        }
    }

    /// Execute (or re-execute) the command.
    pub fn redo(&mut self, ctx: &mut CommandContext<'_>) -> Result<(), CoreError> {
        match self {
            Command::MoveItems { ids, delta } => {
                for id in ids.iter() {
                    if let Some(item) = ctx.scene.item_mut(*id) {
                        item.transform.position += *delta;
                    }
                }
                Ok(())
            }

            Command::TransformItems { entries } => {
                for entry in entries.iter() {
                    if let Some(item) = ctx.scene.item_mut(entry.id) {
                        item.transform = entry.after;
                    }
                }
                Ok(())
            }

            Command::AddItem { layer, item, placed } => {
                if !*placed {
                    item.z_offset = ctx.scene.allocate_z(*layer)?;
                    *placed = true;
                }
                ctx.scene.insert_item(*layer, None, item.clone())
            }

            Command::RemoveItems { ids, removed } => {
                removed.clear();
                for id in ids.iter() {
                    if let Some(taken) = ctx.scene.take_item(*id) {
                        removed.push(taken);
                    }
                }
                Ok(())
            }

            Command::RasterCut { layer, region, backups } => {
                *backups = raster::cut(ctx.scene, *layer, *region);
                Ok(())
            }

            Command::ResizeCanvas { new_size, old_size, snapshots } => {
                let from = match *old_size {
                    Some(size) => size,
                    None => {
                        // First apply: full per-item snapshots for undo.
                        let mut taken = Vec::new();
                        for item in ctx.scene.items() {
                            taken.push((item.id(), ctx.codec.serialize(item)?));
                        }
                        *snapshots = taken;
                        let size = ctx.scene.canvas_size();
                        *old_size = Some(size);
                        size
                    }
                };
                let sx = new_size.x / from.x;
                let sy = new_size.y / from.y;
                ctx.scene.set_canvas_size(*new_size);
                let ids: Vec<ItemId> = ctx.scene.items().map(|i| i.id()).collect();
                for id in ids {
                    if let Some(item) = ctx.scene.item_mut(id) {
                        item.scale_geometry(sx, sy);
                        item.transform.position =
                            Vec2::new(item.transform.position.x * sx, item.transform.position.y * sy);
                    }
                }
                ctx.events.emit(CoreEvent::CanvasResized { size: *new_size });
                Ok(())
            }

            Command::SetLayerVisible { layer, visible, was } => {
                if was.is_none() {
                    *was = ctx.scene.layer(*layer).map(|l| l.visible);
                }
                if ctx.scene.set_layer_visible(*layer, *visible) {
                    ctx.events.emit(CoreEvent::LayerChanged { layer: *layer });
                }
                Ok(())
            }

            Command::SetLayerLocked { layer, locked, was } => {
                if was.is_none() {
                    *was = ctx.scene.layer(*layer).map(|l| l.locked);
                }
                if ctx.scene.set_layer_locked(*layer, *locked) {
                    ctx.events.emit(CoreEvent::LayerChanged { layer: *layer });
                }
                Ok(())
            }

            Command::Macro { commands, .. } => {
                for i in 0..commands.len() {
                    if let Err(err) = commands[i].redo(ctx) {
                        // Roll back the applied prefix so a failed macro
                        // leaves no partial effect.
                        for done in commands[..i].iter_mut().rev() {
                            let _ = done.undo(ctx);
                        }
                        return Err(err);
                    }
                }
                Ok(())
            }
        }
    }

    /// Reverse the command.
    pub fn undo(&mut self, ctx: &mut CommandContext<'_>) -> Result<(), CoreError> {
        match self {
            Command::MoveItems { ids, delta } => {
                for id in ids.iter() {
                    if let Some(item) = ctx.scene.item_mut(*id) {
                        item.transform.position -= *delta;
                    }
                }
                Ok(())
            }

            Command::TransformItems { entries } => {
                for entry in entries.iter() {
                    if let Some(item) = ctx.scene.item_mut(entry.id) {
                        item.transform = entry.before;
                    }
                }
                Ok(())
            }

            Command::AddItem { item, .. } => {
                ctx.scene.take_item(item.id());
                Ok(())
            }

            Command::RemoveItems { removed, .. } => {
                // Each index was recorded against the list as it shrank, so
                // reinserting in reverse removal order exactly inverts it.
                for (item, layer, index) in removed.iter().rev() {
                    ctx.scene.insert_item(*layer, Some(*index), item.clone())?;
                }
                Ok(())
            }

            Command::RasterCut { backups, .. } => {
                raster::restore(ctx.scene, backups);
                Ok(())
            }

            Command::ResizeCanvas { old_size, snapshots, .. } => {
                let Some(from) = *old_size else { return Ok(()) };
                // Decode everything before touching the scene, so a codec
                // failure declines the undo without corrupting anything.
                let mut restored = Vec::with_capacity(snapshots.len());
                for (id, snapshot) in snapshots.iter() {
                    restored.push((*id, ctx.codec.deserialize(snapshot)?));
                }
                ctx.scene.set_canvas_size(from);
                for (id, item) in restored {
                    if let Some(slot) = ctx.scene.item_mut(id) {
                        *slot = item;
                    }
                }
                ctx.events.emit(CoreEvent::CanvasResized { size: from });
                Ok(())
            }

            Command::SetLayerVisible { layer, was, .. } => {
                if let Some(was) = *was {
                    if ctx.scene.set_layer_visible(*layer, was) {
                        ctx.events.emit(CoreEvent::LayerChanged { layer: *layer });
                    }
                }
                Ok(())
            }

            Command::SetLayerLocked { layer, was, .. } => {
                if let Some(was) = *was {
                    if ctx.scene.set_layer_locked(*layer, was) {
                        ctx.events.emit(CoreEvent::LayerChanged { layer: *layer });
                    }
                }
                Ok(())
            }

            Command::Macro { commands, .. } => {
                for command in commands.iter_mut().rev() {
                    command.undo(ctx)?;
                }
                Ok(())
            }
        }
    }

    /// Try to absorb `other` into this command.
    ///
    /// Eligibility is structural: same variant, identical target id
    /// sequence. On success this command's delta already reflects the
    /// combined effect and the caller must apply only `other`'s incremental
    /// effect to the live scene.
    pub fn merge_with(&mut self, other: &Command) -> bool {
        match (self, other) {
            (
                Command::MoveItems { ids, delta },
                Command::MoveItems { ids: other_ids, delta: other_delta },
            ) if ids == other_ids => {
                *delta += *other_delta;
                true
            }
            (
                Command::TransformItems { entries },
                Command::TransformItems { entries: other_entries },
            ) if entries.len() == other_entries.len()
                && entries.iter().zip(other_entries).all(|(a, b)| a.id == b.id) =>
            {
                for (entry, newer) in entries.iter_mut().zip(other_entries) {
                    entry.after = newer.after;
                }
                true
            }
            _ => false,
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}
