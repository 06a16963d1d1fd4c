use egui::{Pos2, Rect};

use crate::event::{CoreEvent, EventBus};
use crate::id::ItemId;
use crate::scene::Scene;

/// Transient pixel-region selection drawn by the raster select tools.
///
/// Scoped to the active layer; never an item selection and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelRegion {
    Rect(Rect),
    Freeform(Vec<Pos2>),
}

impl PixelRegion {
    /// Axis-aligned bounds of the region.
    pub fn bounds(&self) -> Rect {
        match self {
            PixelRegion::Rect(rect) => *rect,
            PixelRegion::Freeform(points) => {
                let mut rect = Rect::NOTHING;
                for p in points {
                    rect.extend_with(*p);
                }
                if rect == Rect::NOTHING { Rect::ZERO } else { rect }
            }
        }
    }
}

/// Tracks which items are selected.
///
/// Holds ids, never item references, so destroyed items cannot be
/// dereferenced through the selection: stale ids are no-ops and are pruned
/// lazily whenever the set is read against the scene or mutated.
#[derive(Debug, Default)]
pub struct SelectionManager {
    selected: Vec<ItemId>,
    pixel_region: Option<PixelRegion>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// The selected ids, in selection order.
    pub fn selected(&self) -> &[ItemId] {
        &self.selected
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Replace (or with `additive`, extend) the selection. Ids that are
    /// stale or live on locked/hidden layers are dropped silently.
    pub(crate) fn select(
        &mut self,
        ids: &[ItemId],
        additive: bool,
        scene: &Scene,
        events: &EventBus,
    ) {
        let before = self.selected.clone();
        if !additive {
            self.selected.clear();
        }
        for id in ids {
            if scene.is_item_editable(*id) && !self.selected.contains(id) {
                self.selected.push(*id);
            }
        }
        self.prune(scene);
        if self.selected != before {
            self.emit(events);
        }
    }

    /// Toggle one item's selected state. Stale ids are a no-op.
    pub(crate) fn toggle(&mut self, id: ItemId, scene: &Scene, events: &EventBus) {
        let before = self.selected.clone();
        if let Some(pos) = self.selected.iter().position(|s| *s == id) {
            self.selected.remove(pos);
        } else if scene.is_item_editable(id) {
            self.selected.push(id);
        }
        self.prune(scene);
        if self.selected != before {
            self.emit(events);
        }
    }

    pub(crate) fn deselect_all(&mut self, events: &EventBus) {
        if !self.selected.is_empty() {
            self.selected.clear();
            self.emit(events);
        }
    }

    /// Re-validate the set against the scene: stale ids and items on layers
    /// that became locked or hidden are removed. Runs after every stack
    /// mutation and layer-state change.
    pub(crate) fn sync(&mut self, scene: &Scene, events: &EventBus) {
        let before = self.selected.len();
        self.prune(scene);
        if self.selected.len() != before {
            self.emit(events);
        }
    }

    fn prune(&mut self, scene: &Scene) {
        self.selected.retain(|id| scene.is_item_editable(*id));
    }

    // --- transient pixel region ---

    pub fn pixel_region(&self) -> Option<&PixelRegion> {
        self.pixel_region.as_ref()
    }

    pub(crate) fn set_pixel_region(&mut self, region: PixelRegion) {
        self.pixel_region = Some(region);
    }

    /// Cancel the in-progress pixel selection. Called on active-layer
    /// change (the region is scoped to that layer) and after a region cut.
    pub(crate) fn clear_pixel_region(&mut self) {
        self.pixel_region = None;
    }

    fn emit(&self, events: &EventBus) {
        events.emit(CoreEvent::SelectionChanged { ids: self.selected.clone() });
    }
}
