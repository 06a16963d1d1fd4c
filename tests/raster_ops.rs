use egui::{Color32, Pos2, Rect, Vec2};
use snapmark::selection::PixelRegion;
use snapmark::{ClipboardContent, Editor, Item, ItemKind, RasterImage};

// Helper to add a solid-colored raster item and return its id
fn add_solid_raster(editor: &mut Editor, x: f32, y: f32, w: u32, h: u32) -> snapmark::ItemId {
    let image = RasterImage::solid(w, h, Color32::RED);
    editor
        .add_item(Item::at(ItemKind::RasterRegion { image }, Vec2::new(x, y)))
        .unwrap()
}

#[test]
fn test_region_cut_clears_pixels_to_transparent() {
    let mut editor = Editor::default();
    let id = add_solid_raster(&mut editor, 0.0, 0.0, 100, 100);

    let region = Rect::from_min_max(Pos2::new(10.0, 10.0), Pos2::new(20.0, 20.0));
    editor.cut_region(region).unwrap();

    let image = editor.scene().item(id).unwrap().raster().unwrap();
    // Inside the region: fully transparent, not black-opaque
    assert_eq!(image.pixel(15, 15), Some([0, 0, 0, 0]));
    // Outside the region: untouched
    assert_eq!(image.pixel(5, 5), Some(Color32::RED.to_array()));
    assert_eq!(image.pixel(25, 25), Some(Color32::RED.to_array()));
}

#[test]
fn test_region_cut_undo_restores_bytes_exactly() {
    let mut editor = Editor::default();
    let id = add_solid_raster(&mut editor, 0.0, 0.0, 64, 64);
    let before = editor.scene().item(id).unwrap().raster().unwrap().clone();

    editor
        .cut_region(Rect::from_min_max(Pos2::new(8.0, 8.0), Pos2::new(40.0, 40.0)))
        .unwrap();
    assert_ne!(
        editor.scene().item(id).unwrap().raster().unwrap().as_bytes(),
        before.as_bytes()
    );

    editor.undo().unwrap();
    assert_eq!(
        editor.scene().item(id).unwrap().raster().unwrap().as_bytes(),
        before.as_bytes()
    );
}

#[test]
fn test_region_cut_respects_item_position() {
    let mut editor = Editor::default();
    // Item offset into the scene; the scene-space region must land on the
    // right local pixels
    let id = add_solid_raster(&mut editor, 100.0, 50.0, 32, 32);

    let region = Rect::from_min_max(Pos2::new(100.0, 50.0), Pos2::new(108.0, 58.0));
    editor.cut_region(region).unwrap();

    let image = editor.scene().item(id).unwrap().raster().unwrap();
    assert_eq!(image.pixel(4, 4), Some([0, 0, 0, 0]));
    assert_eq!(image.pixel(12, 12), Some(Color32::RED.to_array()));
}

#[test]
fn test_region_cut_with_no_intersection_changes_nothing() {
    let mut editor = Editor::default();
    let id = add_solid_raster(&mut editor, 0.0, 0.0, 32, 32);
    let before = editor.scene().item(id).unwrap().raster().unwrap().clone();

    editor
        .cut_region(Rect::from_min_max(Pos2::new(500.0, 500.0), Pos2::new(600.0, 600.0)))
        .unwrap();
    assert_eq!(
        editor.scene().item(id).unwrap().raster().unwrap().as_bytes(),
        before.as_bytes()
    );
}

#[test]
fn test_region_cut_spans_multiple_raster_items() {
    let mut editor = Editor::default();
    let a = add_solid_raster(&mut editor, 0.0, 0.0, 20, 20);
    let b = add_solid_raster(&mut editor, 30.0, 0.0, 20, 20);

    // Region straddling both buffers
    let region = Rect::from_min_max(Pos2::new(10.0, 5.0), Pos2::new(40.0, 15.0));
    editor.cut_region(region).unwrap();

    let image_a = editor.scene().item(a).unwrap().raster().unwrap();
    let image_b = editor.scene().item(b).unwrap().raster().unwrap();
    assert_eq!(image_a.pixel(15, 10), Some([0, 0, 0, 0]));
    assert_eq!(image_b.pixel(5, 10), Some([0, 0, 0, 0]));
    assert_eq!(image_a.pixel(5, 10), Some(Color32::RED.to_array()));

    // One undo restores both items
    editor.undo().unwrap();
    let image_a = editor.scene().item(a).unwrap().raster().unwrap();
    let image_b = editor.scene().item(b).unwrap().raster().unwrap();
    assert_eq!(image_a.pixel(15, 10), Some(Color32::RED.to_array()));
    assert_eq!(image_b.pixel(5, 10), Some(Color32::RED.to_array()));
}

#[test]
fn test_pixel_lookup_outside_the_buffer_is_none() {
    let image = RasterImage::solid(8, 8, Color32::RED);
    assert_eq!(image.pixel(7, 7), Some(Color32::RED.to_array()));
    assert_eq!(image.pixel(8, 0), None);
    assert_eq!(image.pixel(0, 8), None);
    assert_eq!(image.pixel(100, 100), None);
}

#[test]
fn test_region_cut_leaves_vector_items_alone() {
    let mut editor = Editor::default();
    let rect_id = editor
        .add_item(Item::at(
            ItemKind::Highlight {
                rect: Rect::from_min_size(Pos2::ZERO, Vec2::new(50.0, 50.0)),
                color: Color32::YELLOW,
            },
            Vec2::ZERO,
        ))
        .unwrap();
    let before = editor.scene().item(rect_id).unwrap().clone();

    editor
        .cut_region(Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(25.0, 25.0)))
        .unwrap();
    assert_eq!(editor.scene().item(rect_id).unwrap(), &before);
}

#[test]
fn test_region_cut_populates_clipboard_and_drops_pixel_selection() {
    let mut editor = Editor::default();
    add_solid_raster(&mut editor, 0.0, 0.0, 32, 32);

    let region = Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(16.0, 16.0));
    editor.set_pixel_region(PixelRegion::Rect(region));
    editor.cut_region(region).unwrap();

    assert!(matches!(editor.clipboard().content(), ClipboardContent::Raster { .. }));
    assert!(editor.pixel_region().is_none());
}
