use egui::{Pos2, Rect, Vec2};

use crate::config::EditorConfig;
use crate::error::CoreError;
use crate::item::{Item, ItemKind, RasterImage};
use crate::scene::Scene;

/// Opaque serialized form of an item. The core never looks inside; only the
/// codec collaborator can produce or consume one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSnapshot(Vec<u8>);

impl ItemSnapshot {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Item serialize/deserialize capability, provided by the persistence layer.
pub trait ItemCodec {
    fn serialize(&self, item: &Item) -> Result<ItemSnapshot, CoreError>;
    fn deserialize(&self, snapshot: &ItemSnapshot) -> Result<Item, CoreError>;
}

/// Codec writing items as JSON, the default for hosts without a custom one.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl ItemCodec for JsonCodec {
    fn serialize(&self, item: &Item) -> Result<ItemSnapshot, CoreError> {
        serde_json::to_vec(item)
            .map(ItemSnapshot)
            .map_err(|e| CoreError::Serialize(e.to_string()))
    }

    fn deserialize(&self, snapshot: &ItemSnapshot) -> Result<Item, CoreError> {
        serde_json::from_slice(&snapshot.0).map_err(|e| CoreError::Deserialize(e.to_string()))
    }
}

/// Region-rendering capability, provided by the paint widget. Used to
/// materialize pixels for raster copy/cut.
pub trait RegionRenderer {
    fn render_region(&self, scene: &Scene, region: Rect) -> RasterImage;
}

/// Renderer stub producing transparent pixels, for headless hosts and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl RegionRenderer for NullRenderer {
    fn render_region(&self, _scene: &Scene, region: Rect) -> RasterImage {
        RasterImage::new(region.width().max(1.0) as u32, region.height().max(1.0) as u32)
    }
}

/// Read-only view of the platform clipboard. Always the lowest-priority
/// paste source.
pub trait SystemClipboard {
    fn image(&self) -> Option<RasterImage>;
    fn text(&self) -> Option<String>;
}

/// System clipboard stub reporting nothing available.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSystemClipboard;

impl SystemClipboard for NullSystemClipboard {
    fn image(&self) -> Option<RasterImage> {
        None
    }

    fn text(&self) -> Option<String> {
        None
    }
}

/// Internal clipboard state. A tagged enum rather than parallel fields, so
/// holding item snapshots and a raster buffer at the same time is not merely
/// forbidden but unrepresentable.
#[derive(Debug, Clone, Default)]
pub enum ClipboardContent {
    #[default]
    Empty,
    /// Serialized item snapshots in selection order.
    Items(Vec<ItemSnapshot>),
    /// A rendered pixel region and the scene rect it came from.
    Raster { image: RasterImage, source: Rect },
}

/// Priority-ordered clipboard state and paste resolution.
#[derive(Debug, Default)]
pub struct ClipboardArbiter {
    content: ClipboardContent,
}

impl ClipboardArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &ClipboardContent {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.content, ClipboardContent::Empty)
    }

    /// Store item snapshots, displacing any raster content.
    pub(crate) fn set_items(&mut self, snapshots: Vec<ItemSnapshot>) {
        self.content = ClipboardContent::Items(snapshots);
    }

    /// Store a rendered raster region, displacing any item content.
    pub(crate) fn set_raster(&mut self, image: RasterImage, source: Rect) {
        self.content = ClipboardContent::Raster { image, source };
    }

    pub(crate) fn clear(&mut self) {
        self.content = ClipboardContent::Empty;
    }

    /// Resolve a paste in strict priority order; the first populated tier
    /// wins: internal items, internal raster, system image, system text.
    ///
    /// Returns the items to add (empty when every tier is empty — a no-op,
    /// not an error). A deserialize failure declines the whole paste and
    /// leaves the clipboard untouched.
    pub fn resolve(
        &self,
        codec: &dyn ItemCodec,
        system: &dyn SystemClipboard,
        viewport_center: Pos2,
        offset: Vec2,
        config: &EditorConfig,
    ) -> Result<Vec<Item>, CoreError> {
        match &self.content {
            ClipboardContent::Items(snapshots) => {
                let mut items = Vec::with_capacity(snapshots.len());
                for snapshot in snapshots {
                    items.push(codec.deserialize(snapshot)?);
                }
                log::debug!("paste resolved to {} internal item(s)", items.len());
                Ok(items
                    .into_iter()
                    .map(|mut item| {
                        item.transform.position += offset;
                        item.with_new_id()
                    })
                    .collect())
            }
            ClipboardContent::Raster { image, source } => {
                log::debug!("paste resolved to internal raster {:?}", source);
                Ok(vec![Item::at(
                    ItemKind::RasterRegion { image: image.clone() },
                    source.min.to_vec2() + offset,
                )])
            }
            ClipboardContent::Empty => {
                if let Some(image) = system.image() {
                    log::debug!("paste resolved to system image");
                    let position = viewport_center.to_vec2() - image.size() / 2.0;
                    return Ok(vec![Item::at(ItemKind::RasterRegion { image }, position)]);
                }
                if let Some(text) = system.text() {
                    log::debug!("paste resolved to system text");
                    return Ok(vec![Item::at(
                        ItemKind::Text {
                            width: 240.0,
                            text,
                            font_size: config.default_font_size,
                            color: egui::Color32::BLACK,
                        },
                        viewport_center.to_vec2(),
                    )]);
                }
                Ok(Vec::new())
            }
        }
    }
}
