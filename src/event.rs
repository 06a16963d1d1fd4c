use std::cell::RefCell;

use egui::Vec2;

use crate::id::{ItemId, LayerId};

/// Change notifications published by the core.
///
/// Each variant carries enough data for an observer to refresh its view
/// without re-querying the whole scene.
#[derive(Debug, Clone)]
pub enum CoreEvent {
    /// The selected item set changed.
    SelectionChanged { ids: Vec<ItemId> },
    /// The command stack changed (push, merge, undo, redo or clear).
    StackChanged {
        can_undo: bool,
        can_redo: bool,
        undo_text: String,
        redo_text: String,
    },
    /// The internal clipboard content changed.
    ClipboardChanged,
    /// A layer's locked or visible flag changed.
    LayerChanged { layer: LayerId },
    /// A different layer became the active layer.
    ActiveLayerChanged { layer: LayerId },
    /// The logical canvas was resized.
    CanvasResized { size: Vec2 },
}

/// Implemented by observers that want core change notifications.
pub trait EventHandler {
    fn handle_event(&mut self, event: &CoreEvent);
}

/// A simple event bus broadcasting core events to registered handlers.
pub struct EventBus {
    handlers: RefCell<Vec<Box<dyn EventHandler>>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &format!("<{} handlers>", self.handlers.borrow().len()))
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
        }
    }

    /// Subscribe a handler to receive events.
    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.handlers.borrow_mut().push(handler);
    }

    /// Emit an event to all registered handlers.
    pub fn emit(&self, event: CoreEvent) {
        for handler in &mut *self.handlers.borrow_mut() {
            handler.handle_event(&event);
        }
    }
}
