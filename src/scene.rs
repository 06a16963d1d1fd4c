use egui::{Color32, Vec2};

use crate::config::LAYER_Z_RANGE;
use crate::error::CoreError;
use crate::id::{ItemId, LayerId};
use crate::item::Item;

/// A named group of items with shared lock/visibility state.
///
/// Layers are ordered bottom-to-top; index 0 is the lowest. Each layer's
/// z-base is `index * LAYER_Z_RANGE`, and item z-offsets stay below that
/// range by convention, so items on different layers never interleave in
/// draw order.
#[derive(Debug, Clone)]
pub struct Layer {
    id: LayerId,
    pub name: String,
    pub visible: bool,
    pub locked: bool,
    pub opacity: f32,
    items: Vec<Item>,
    next_z: i32,
}

impl Layer {
    fn new(name: &str) -> Self {
        Self {
            id: LayerId::new(),
            name: name.to_string(),
            visible: true,
            locked: false,
            opacity: 1.0,
            items: Vec::new(),
            next_z: 0,
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Items in stacking order (lowest first).
    pub fn items(&self) -> &[Item] {
        &self.items
    }
}

/// The scene graph: an ordered stack of layers owning all items.
///
/// Persisted state is only reachable mutably through `pub(crate)` methods,
/// so outside this crate every mutation must travel through the command
/// stack — the single-writer rule is structural, not a convention.
#[derive(Debug)]
pub struct Scene {
    layers: Vec<Layer>,
    active_layer: LayerId,
    canvas_size: Vec2,
    background: Color32,
}

impl Scene {
    pub fn new(canvas_size: Vec2) -> Self {
        let base = Layer::new("Layer 1");
        let active_layer = base.id();
        Self {
            layers: vec![base],
            active_layer,
            canvas_size,
            background: Color32::WHITE,
        }
    }

    // --- layers ---

    /// Layers bottom-to-top.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn layer_index(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    /// Baseline stacking value for a layer.
    pub fn z_base(&self, id: LayerId) -> Option<i32> {
        self.layer_index(id).map(|i| i as i32 * LAYER_Z_RANGE)
    }

    pub fn active_layer(&self) -> LayerId {
        self.active_layer
    }

    pub(crate) fn set_active_layer(&mut self, id: LayerId) -> bool {
        if self.active_layer != id && self.layer(id).is_some() {
            self.active_layer = id;
            true
        } else {
            false
        }
    }

    /// Append a new layer on top. Document assembly, not an undoable edit.
    pub(crate) fn add_layer(&mut self, name: &str) -> LayerId {
        let layer = Layer::new(name);
        let id = layer.id;
        self.layers.push(layer);
        id
    }

    /// Remove a layer and its items. The last layer is never removed.
    pub(crate) fn remove_layer(&mut self, id: LayerId) -> Option<Layer> {
        if self.layers.len() <= 1 {
            return None;
        }
        let idx = self.layer_index(id)?;
        let removed = self.layers.remove(idx);
        if self.active_layer == id {
            let fallback = idx.min(self.layers.len() - 1);
            self.active_layer = self.layers[fallback].id;
        }
        Some(removed)
    }

    pub(crate) fn rename_layer(&mut self, id: LayerId, name: &str) -> bool {
        match self.layer_mut(id) {
            Some(layer) if layer.name != name => {
                layer.name = name.to_string();
                true
            }
            _ => false,
        }
    }

    /// Move a layer to `index` in the stack, clamped to the layer count.
    /// All z-bases shift implicitly since they derive from the index.
    pub(crate) fn move_layer(&mut self, id: LayerId, index: usize) -> bool {
        let Some(from) = self.layer_index(id) else { return false };
        let to = index.min(self.layers.len() - 1);
        if from == to {
            return false;
        }
        let layer = self.layers.remove(from);
        self.layers.insert(to, layer);
        true
    }

    pub(crate) fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// Returns true if the flag actually changed.
    pub(crate) fn set_layer_locked(&mut self, id: LayerId, locked: bool) -> bool {
        match self.layer_mut(id) {
            Some(layer) if layer.locked != locked => {
                layer.locked = locked;
                true
            }
            _ => false,
        }
    }

    /// Set a layer's opacity, clamped to `0.0..=1.0`.
    pub(crate) fn set_layer_opacity(&mut self, id: LayerId, opacity: f32) -> bool {
        let opacity = opacity.clamp(0.0, 1.0);
        match self.layer_mut(id) {
            Some(layer) if layer.opacity != opacity => {
                layer.opacity = opacity;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn set_layer_visible(&mut self, id: LayerId, visible: bool) -> bool {
        match self.layer_mut(id) {
            Some(layer) if layer.visible != visible => {
                layer.visible = visible;
                true
            }
            _ => false,
        }
    }

    // --- items ---

    /// Resolve an item by id. Stale ids resolve to `None`, never to a crash.
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.layers.iter().flat_map(|l| l.items.iter()).find(|i| i.id() == id)
    }

    /// The layer an item lives on.
    pub fn layer_of(&self, id: ItemId) -> Option<LayerId> {
        self.layers
            .iter()
            .find(|l| l.items.iter().any(|i| i.id() == id))
            .map(|l| l.id)
    }

    /// All items in draw order (lowest layer first, then stacking order).
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.layers.iter().flat_map(|l| l.items.iter())
    }

    /// Absolute stacking value: layer z-base plus the item's z-offset.
    pub fn item_z(&self, id: ItemId) -> Option<i32> {
        let layer_id = self.layer_of(id)?;
        Some(self.z_base(layer_id)? + self.item(id)?.z_offset)
    }

    /// An item is editable when its layer is visible and unlocked.
    pub fn is_item_editable(&self, id: ItemId) -> bool {
        self.layers
            .iter()
            .find(|l| l.items.iter().any(|i| i.id() == id))
            .is_some_and(|l| l.visible && !l.locked)
    }

    pub(crate) fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.layers
            .iter_mut()
            .flat_map(|l| l.items.iter_mut())
            .find(|i| i.id() == id)
    }

    /// Hand out the next stacking offset within `layer`.
    pub(crate) fn allocate_z(&mut self, layer: LayerId) -> Result<i32, CoreError> {
        let layer = self.layer_mut(layer).ok_or(CoreError::UnknownLayer(layer))?;
        let z = layer.next_z;
        layer.next_z += 1;
        Ok(z)
    }

    /// Insert an item into `layer`, at `index` or on top. The item's
    /// z-offset is preserved so undo/redo reinsertion is byte-exact.
    pub(crate) fn insert_item(
        &mut self,
        layer: LayerId,
        index: Option<usize>,
        item: Item,
    ) -> Result<(), CoreError> {
        let layer = self.layer_mut(layer).ok_or(CoreError::UnknownLayer(layer))?;
        layer.next_z = layer.next_z.max(item.z_offset + 1);
        let index = index.unwrap_or(layer.items.len()).min(layer.items.len());
        layer.items.insert(index, item);
        Ok(())
    }

    /// Remove an item, returning it with its layer and position for exact
    /// reinsertion on undo. Stale ids yield `None`.
    pub(crate) fn take_item(&mut self, id: ItemId) -> Option<(Item, LayerId, usize)> {
        for layer in &mut self.layers {
            if let Some(index) = layer.items.iter().position(|i| i.id() == id) {
                return Some((layer.items.remove(index), layer.id, index));
            }
        }
        None
    }

    // --- canvas ---

    pub fn canvas_size(&self) -> Vec2 {
        self.canvas_size
    }

    pub(crate) fn set_canvas_size(&mut self, size: Vec2) {
        self.canvas_size = Vec2::new(size.x.max(1.0), size.y.max(1.0));
    }

    pub fn background(&self) -> Color32 {
        self.background
    }

    pub(crate) fn set_background(&mut self, color: Color32) {
        self.background = color;
    }
}
