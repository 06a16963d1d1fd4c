#![warn(clippy::all, rust_2018_idioms)]

pub mod clipboard;
pub mod command;
pub mod config;
pub mod editor;
pub mod error;
pub mod event;
pub mod gesture;
pub mod id;
pub mod item;
pub mod raster;
pub mod scene;
pub mod selection;
pub mod transform;

pub use clipboard::{ClipboardArbiter, ClipboardContent, ItemCodec, ItemSnapshot, JsonCodec};
pub use clipboard::{RegionRenderer, SystemClipboard};
pub use command::{Command, CommandStack};
pub use config::EditorConfig;
pub use editor::Editor;
pub use error::CoreError;
pub use event::{CoreEvent, EventBus, EventHandler};
pub use gesture::{DragGesture, DragKind, DragModifiers};
pub use id::{ItemId, LayerId};
pub use item::{Item, ItemKind, RasterImage};
pub use scene::{Layer, Scene};
pub use selection::{PixelRegion, SelectionManager};
pub use transform::{Handle, Transform};
