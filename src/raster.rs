//! Per-pixel erasure and restoration on raster items.
//!
//! These operate only on alpha-explicit [`RasterImage`] buffers, so a clear
//! always produces transparent pixels. Invoked exclusively from the command
//! apply path; during a live gesture nothing here runs.

use egui::Rect;

use crate::id::{ItemId, LayerId};
use crate::item::RasterImage;
use crate::scene::Scene;

/// Pre-erase pixel snapshot of one raster item, for byte-exact undo.
#[derive(Debug, Clone, PartialEq)]
pub struct CutBackup {
    pub id: ItemId,
    pub image: RasterImage,
}

/// Map a scene-space region into an item's local pixel space.
fn to_local(region: Rect, item: &crate::item::Item) -> Rect {
    let t = &item.transform;
    let sx = if t.scale.x.abs() < f32::EPSILON { 1.0 } else { t.scale.x };
    let sy = if t.scale.y.abs() < f32::EPSILON { 1.0 } else { t.scale.y };
    Rect::from_min_max(
        egui::pos2((region.min.x - t.position.x) / sx, (region.min.y - t.position.y) / sy),
        egui::pos2((region.max.x - t.position.x) / sx, (region.max.y - t.position.y) / sy),
    )
}

/// Erase `region` from every raster item on `layer` whose bounds intersect
/// it, clearing the intersected pixels to fully transparent.
///
/// Returns one backup per touched item; an empty intersection returns an
/// empty list and changes nothing.
pub(crate) fn cut(scene: &mut Scene, layer: LayerId, region: Rect) -> Vec<CutBackup> {
    let targets: Vec<ItemId> = scene
        .layer(layer)
        .map(|l| {
            l.items()
                .iter()
                .filter(|i| i.raster().is_some() && i.scene_bounds().intersects(region))
                .map(|i| i.id())
                .collect()
        })
        .unwrap_or_default();

    let mut backups = Vec::with_capacity(targets.len());
    for id in targets {
        let Some(item) = scene.item_mut(id) else { continue };
        let local = to_local(region, item);
        let Some(image) = item.raster_mut() else { continue };
        backups.push(CutBackup { id, image: image.clone() });
        image.clear_rect(local);
    }
    log::debug!("raster cut {:?} touched {} item(s)", region, backups.len());
    backups
}

/// Restore the snapshotted buffers byte-for-byte. Backups whose item has
/// since been destroyed are skipped.
pub(crate) fn restore(scene: &mut Scene, backups: &[CutBackup]) {
    for backup in backups {
        if let Some(image) = scene.item_mut(backup.id).and_then(|i| i.raster_mut()) {
            *image = backup.image.clone();
        }
    }
}
