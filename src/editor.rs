//! The editor facade tying the core pieces together.
//!
//! Hosts talk to [`Editor`] and subscribe to its [`EventBus`]; every
//! persisted mutation funnels through the command stack, and collaborator
//! capabilities (serialization, region rendering, the platform clipboard)
//! are injected as trait objects so the core stays headless.

use egui::{Color32, Pos2, Rect, Vec2};

use crate::clipboard::{
    ClipboardArbiter, ItemCodec, ItemSnapshot, JsonCodec, NullRenderer, NullSystemClipboard,
    RegionRenderer, SystemClipboard,
};
use crate::command::{Command, CommandContext, CommandStack};
use crate::config::EditorConfig;
use crate::error::CoreError;
use crate::event::{CoreEvent, EventBus};
use crate::gesture::{DragGesture, DragKind, DragModifiers};
use crate::id::{ItemId, LayerId};
use crate::item::Item;
use crate::scene::Scene;
use crate::selection::{PixelRegion, SelectionManager};
use crate::transform::Transform;

pub struct Editor {
    scene: Scene,
    stack: CommandStack,
    selection: SelectionManager,
    clipboard: ClipboardArbiter,
    events: EventBus,
    gesture: DragGesture,
    codec: Box<dyn ItemCodec>,
    renderer: Box<dyn RegionRenderer>,
    system_clipboard: Box<dyn SystemClipboard>,
    config: EditorConfig,
    viewport_center: Pos2,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    /// An editor with the stub collaborators, suitable for headless use.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_collaborators(
            config,
            Box::new(JsonCodec),
            Box::new(NullRenderer),
            Box::new(NullSystemClipboard),
        )
    }

    pub fn with_collaborators(
        config: EditorConfig,
        codec: Box<dyn ItemCodec>,
        renderer: Box<dyn RegionRenderer>,
        system_clipboard: Box<dyn SystemClipboard>,
    ) -> Self {
        let scene = Scene::new(config.canvas_size);
        let viewport_center = (config.canvas_size / 2.0).to_pos2();
        Self {
            scene,
            stack: CommandStack::new(config.undo_limit),
            selection: SelectionManager::new(),
            clipboard: ClipboardArbiter::new(),
            events: EventBus::new(),
            gesture: DragGesture::new(config.drag_threshold),
            codec,
            renderer,
            system_clipboard,
            config,
            viewport_center,
        }
    }

    // --- accessors ---

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn clipboard(&self) -> &ClipboardArbiter {
        &self.clipboard
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn can_undo(&self) -> bool {
        self.stack.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.stack.can_redo()
    }

    pub fn undo_text(&self) -> String {
        self.stack.undo_text()
    }

    pub fn redo_text(&self) -> String {
        self.stack.redo_text()
    }

    /// Number of entries on the undo stack.
    pub fn command_count(&self) -> usize {
        self.stack.count()
    }

    pub fn mark_clean(&mut self) {
        self.stack.mark_clean();
    }

    pub fn is_dirty(&self) -> bool {
        self.stack.is_dirty()
    }

    /// Scene point the host's viewport is centered on; paste targets it when
    /// nothing else dictates a position.
    pub fn set_viewport_center(&mut self, center: Pos2) {
        self.viewport_center = center;
    }

    // --- command plumbing ---

    /// Apply an arbitrary command through the stack. The named operations
    /// below all route through here; hosts with bespoke commands may too.
    pub fn apply(&mut self, command: Command) -> Result<(), CoreError> {
        self.push(command)
    }

    fn push(&mut self, command: Command) -> Result<(), CoreError> {
        let mut ctx = CommandContext {
            scene: &mut self.scene,
            events: &self.events,
            codec: self.codec.as_ref(),
        };
        self.stack.push(command, &mut ctx)?;
        self.selection.sync(&self.scene, &self.events);
        Ok(())
    }

    /// Undo the last command. While a gesture is active the request is
    /// consumed as a gesture cancel instead, so it cannot skip past the
    /// in-flight edit and reverse the previous one. An armed press that
    /// never crossed the drag threshold has no live edit: it is dropped
    /// and the undo still pops the stack.
    pub fn undo(&mut self) -> Result<(), CoreError> {
        if self.gesture.is_active() {
            self.gesture.cancel();
            return Ok(());
        }
        self.gesture.cancel();
        let mut ctx = CommandContext {
            scene: &mut self.scene,
            events: &self.events,
            codec: self.codec.as_ref(),
        };
        self.stack.undo(&mut ctx)?;
        self.selection.sync(&self.scene, &self.events);
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), CoreError> {
        if self.gesture.is_active() {
            self.gesture.cancel();
            return Ok(());
        }
        self.gesture.cancel();
        let mut ctx = CommandContext {
            scene: &mut self.scene,
            events: &self.events,
            codec: self.codec.as_ref(),
        };
        self.stack.redo(&mut ctx)?;
        self.selection.sync(&self.scene, &self.events);
        Ok(())
    }

    // --- selection ---

    pub fn select(&mut self, ids: &[ItemId], additive: bool) {
        self.selection.select(ids, additive, &self.scene, &self.events);
    }

    pub fn toggle_selected(&mut self, id: ItemId) {
        self.selection.toggle(id, &self.scene, &self.events);
    }

    pub fn deselect_all(&mut self) {
        self.selection.deselect_all(&self.events);
    }

    pub fn selected(&self) -> &[ItemId] {
        self.selection.selected()
    }

    pub fn pixel_region(&self) -> Option<&PixelRegion> {
        self.selection.pixel_region()
    }

    pub fn set_pixel_region(&mut self, region: PixelRegion) {
        self.selection.set_pixel_region(region);
    }

    pub fn clear_pixel_region(&mut self) {
        self.selection.clear_pixel_region();
    }

    // --- item edits ---

    /// Add `item` to the active layer and select it.
    pub fn add_item(&mut self, item: Item) -> Result<ItemId, CoreError> {
        let id = item.id();
        let layer = self.scene.active_layer();
        self.push(Command::add_item(layer, item))?;
        self.select(&[id], false);
        Ok(id)
    }

    pub fn delete_selection(&mut self) -> Result<(), CoreError> {
        let ids = self.selection.selected().to_vec();
        if ids.is_empty() {
            return Ok(());
        }
        self.push(Command::remove_items(ids))
    }

    /// Move the selection by one step in `direction`. Consecutive nudges
    /// merge into a single undo entry.
    pub fn nudge(&mut self, direction: Vec2, large: bool) -> Result<(), CoreError> {
        let ids = self.selection.selected().to_vec();
        if ids.is_empty() {
            return Ok(());
        }
        let step = if large {
            self.config.nudge_step_large
        } else {
            self.config.nudge_step
        };
        self.push(Command::move_items(ids, direction * step))
    }

    pub fn resize_canvas(&mut self, size: Vec2) -> Result<(), CoreError> {
        self.push(Command::resize_canvas(size))
    }

    /// Document background color. A document property, not an undoable edit.
    pub fn set_background(&mut self, color: Color32) {
        self.scene.set_background(color);
    }

    // --- layers ---

    pub fn add_layer(&mut self, name: &str) -> LayerId {
        let id = self.scene.add_layer(name);
        self.events.emit(CoreEvent::LayerChanged { layer: id });
        id
    }

    /// Remove a layer outright. Not undoable; the stack is cleared because
    /// recorded commands may reference the removed layer.
    pub fn remove_layer(&mut self, id: LayerId) -> bool {
        let removed = self.scene.remove_layer(id).is_some();
        if removed {
            self.stack.clear(&self.events);
            self.selection.sync(&self.scene, &self.events);
            self.events.emit(CoreEvent::LayerChanged { layer: id });
        }
        removed
    }

    pub fn rename_layer(&mut self, id: LayerId, name: &str) -> bool {
        let renamed = self.scene.rename_layer(id, name);
        if renamed {
            self.events.emit(CoreEvent::LayerChanged { layer: id });
        }
        renamed
    }

    /// Reorder a layer within the stack. Like add/remove, document
    /// assembly rather than an undoable edit.
    pub fn move_layer(&mut self, id: LayerId, index: usize) -> bool {
        let moved = self.scene.move_layer(id, index);
        if moved {
            self.events.emit(CoreEvent::LayerChanged { layer: id });
        }
        moved
    }

    /// Layer opacity, clamped to `0.0..=1.0`. A presentation attribute
    /// like rename, not an undoable edit.
    pub fn set_layer_opacity(&mut self, id: LayerId, opacity: f32) -> bool {
        let changed = self.scene.set_layer_opacity(id, opacity);
        if changed {
            self.events.emit(CoreEvent::LayerChanged { layer: id });
        }
        changed
    }

    pub fn set_layer_locked(&mut self, id: LayerId, locked: bool) -> Result<(), CoreError> {
        self.push(Command::set_layer_locked(id, locked))
    }

    pub fn set_layer_visible(&mut self, id: LayerId, visible: bool) -> Result<(), CoreError> {
        self.push(Command::set_layer_visible(id, visible))
    }

    /// Make `id` the active layer. View state, not an undoable edit; the
    /// pixel region is dropped because it is scoped to the outgoing layer.
    pub fn set_active_layer(&mut self, id: LayerId) {
        if self.scene.set_active_layer(id) {
            self.selection.clear_pixel_region();
            self.events.emit(CoreEvent::ActiveLayerChanged { layer: id });
        }
    }

    // --- clipboard ---

    /// Copy the selected items to the internal clipboard as snapshots.
    /// Serialization happens fully before the clipboard changes, so a codec
    /// failure leaves the previous content intact.
    pub fn copy(&mut self) -> Result<(), CoreError> {
        let ids = self.selection.selected();
        if ids.is_empty() {
            return Ok(());
        }
        let mut snapshots: Vec<ItemSnapshot> = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(item) = self.scene.item(*id) {
                snapshots.push(self.codec.serialize(item)?);
            }
        }
        self.clipboard.set_items(snapshots);
        self.events.emit(CoreEvent::ClipboardChanged);
        Ok(())
    }

    pub fn cut(&mut self) -> Result<(), CoreError> {
        self.copy()?;
        self.delete_selection()
    }

    /// Paste from the highest-priority populated source, offsetting internal
    /// content by the configured paste offset. Pasted items land on the
    /// active layer as one undo entry and become the selection.
    pub fn paste(&mut self) -> Result<(), CoreError> {
        self.paste_with_offset(self.config.paste_offset)
    }

    /// Paste internal content exactly where it was copied from.
    pub fn paste_in_place(&mut self) -> Result<(), CoreError> {
        self.paste_with_offset(Vec2::ZERO)
    }

    fn paste_with_offset(&mut self, offset: Vec2) -> Result<(), CoreError> {
        let items = self.clipboard.resolve(
            self.codec.as_ref(),
            self.system_clipboard.as_ref(),
            self.viewport_center,
            offset,
            &self.config,
        )?;
        if items.is_empty() {
            return Ok(());
        }
        let layer = self.scene.active_layer();
        let ids: Vec<ItemId> = items.iter().map(|item| item.id()).collect();
        let adds = items
            .into_iter()
            .map(|item| Command::add_item(layer, item))
            .collect();
        self.push(Command::macro_of("Paste", adds))?;
        self.select(&ids, false);
        Ok(())
    }

    /// Render `region` and place the pixels on the internal clipboard.
    pub fn copy_region(&mut self, region: Rect) {
        let image = self.renderer.render_region(&self.scene, region);
        self.clipboard.set_raster(image, region);
        self.events.emit(CoreEvent::ClipboardChanged);
    }

    /// Copy `region` to the clipboard, then erase it from the active
    /// layer's raster items.
    pub fn cut_region(&mut self, region: Rect) -> Result<(), CoreError> {
        self.copy_region(region);
        let layer = self.scene.active_layer();
        self.push(Command::raster_cut(layer, region))?;
        self.selection.clear_pixel_region();
        Ok(())
    }

    pub fn clear_clipboard(&mut self) {
        if !self.clipboard.is_empty() {
            self.clipboard.clear();
            self.events.emit(CoreEvent::ClipboardChanged);
        }
    }

    // --- gestures ---

    /// Arm a drag gesture on the current selection. No-op when nothing is
    /// selected.
    pub fn begin_drag(&mut self, kind: DragKind, start: Pos2) {
        let mut snapshots = Vec::new();
        let mut bounds = Rect::NOTHING;
        for id in self.selection.selected() {
            if let Some(item) = self.scene.item(*id) {
                snapshots.push((*id, item.transform));
                bounds = bounds.union(item.scene_bounds());
            }
        }
        if snapshots.is_empty() {
            return;
        }
        self.gesture.begin(kind, start, bounds, snapshots);
    }

    pub fn update_drag(&mut self, pos: Pos2, modifiers: DragModifiers) {
        self.gesture.update(pos, modifiers);
    }

    /// The transform an item would have if the active gesture committed now.
    pub fn drag_preview(&self, id: ItemId) -> Option<Transform> {
        self.gesture.preview(id)
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_active()
    }

    /// Commit the gesture as a single undoable command. A drag that never
    /// crossed the threshold, or had no net effect, records nothing.
    pub fn commit_drag(&mut self) -> Result<(), CoreError> {
        match self.gesture.commit() {
            Some(command) => self.push(command),
            None => Ok(()),
        }
    }

    pub fn cancel_drag(&mut self) {
        self.gesture.cancel();
    }

    /// The host lost input focus; any in-flight gesture is abandoned.
    pub fn focus_lost(&mut self) {
        self.gesture.cancel();
    }
}
