use egui::{Color32, Pos2, Rect, Vec2};
use snapmark::clipboard::{ItemCodec, ItemSnapshot, JsonCodec, NullRenderer, SystemClipboard};
use snapmark::{ClipboardContent, CoreError, Editor, EditorConfig, Item, ItemKind, RasterImage};

// System clipboard stub with freely settable content
struct StubSystem {
    image: Option<RasterImage>,
    text: Option<String>,
}

impl SystemClipboard for StubSystem {
    fn image(&self) -> Option<RasterImage> {
        self.image.clone()
    }

    fn text(&self) -> Option<String> {
        self.text.clone()
    }
}

// Codec that writes fine but refuses to read anything back
struct BrokenReadCodec;

impl ItemCodec for BrokenReadCodec {
    fn serialize(&self, item: &Item) -> Result<ItemSnapshot, CoreError> {
        JsonCodec.serialize(item)
    }

    fn deserialize(&self, _snapshot: &ItemSnapshot) -> Result<Item, CoreError> {
        Err(CoreError::Deserialize("corrupt snapshot".into()))
    }
}

fn editor_with_system(image: Option<RasterImage>, text: Option<String>) -> Editor {
    Editor::with_collaborators(
        EditorConfig::default(),
        Box::new(JsonCodec),
        Box::new(NullRenderer),
        Box::new(StubSystem { image, text }),
    )
}

fn highlight_at(x: f32, y: f32) -> Item {
    Item::at(
        ItemKind::Highlight {
            rect: Rect::from_min_size(Pos2::ZERO, Vec2::new(50.0, 20.0)),
            color: Color32::YELLOW,
        },
        Vec2::new(x, y),
    )
}

#[test]
fn test_copy_paste_offsets_and_assigns_fresh_ids() {
    let mut editor = Editor::default();
    let original = editor.add_item(highlight_at(10.0, 10.0)).unwrap();

    editor.copy().unwrap();
    editor.paste().unwrap();

    assert_eq!(editor.scene().items().count(), 2);
    let pasted = *editor.selected().first().expect("paste selects the new item");
    assert_ne!(pasted, original);
    let offset = editor.config().paste_offset;
    assert_eq!(
        editor.scene().item(pasted).unwrap().transform.position,
        Vec2::new(10.0, 10.0) + offset
    );
    // The source item did not move
    assert_eq!(
        editor.scene().item(original).unwrap().transform.position,
        Vec2::new(10.0, 10.0)
    );
}

#[test]
fn test_paste_in_place_lands_exactly_on_the_source() {
    let mut editor = Editor::default();
    editor.add_item(highlight_at(42.0, 7.0)).unwrap();

    editor.copy().unwrap();
    editor.paste_in_place().unwrap();

    let pasted = *editor.selected().first().unwrap();
    assert_eq!(
        editor.scene().item(pasted).unwrap().transform.position,
        Vec2::new(42.0, 7.0)
    );
}

#[test]
fn test_multi_item_paste_is_one_undo_entry() {
    let mut editor = Editor::default();
    let a = editor.add_item(highlight_at(0.0, 0.0)).unwrap();
    let b = editor.add_item(highlight_at(60.0, 0.0)).unwrap();

    editor.select(&[a, b], false);
    editor.copy().unwrap();
    editor.paste().unwrap();

    assert_eq!(editor.scene().items().count(), 4);
    assert_eq!(editor.selected().len(), 2);
    assert_eq!(editor.undo_text(), "Paste");

    editor.undo().unwrap();
    assert_eq!(editor.scene().items().count(), 2);
}

#[test]
fn test_copying_items_displaces_raster_and_vice_versa() {
    let mut editor = Editor::default();
    editor.add_item(highlight_at(0.0, 0.0)).unwrap();

    editor.copy().unwrap();
    assert!(matches!(editor.clipboard().content(), ClipboardContent::Items(_)));

    editor.copy_region(Rect::from_min_max(Pos2::ZERO, Pos2::new(10.0, 10.0)));
    assert!(matches!(editor.clipboard().content(), ClipboardContent::Raster { .. }));

    editor.copy().unwrap();
    assert!(matches!(editor.clipboard().content(), ClipboardContent::Items(_)));
}

#[test]
fn test_internal_items_win_over_everything() {
    let mut editor = editor_with_system(
        Some(RasterImage::solid(8, 8, Color32::BLUE)),
        Some("ignored".into()),
    );
    editor.add_item(highlight_at(5.0, 5.0)).unwrap();
    editor.copy().unwrap();

    editor.paste().unwrap();
    let pasted = *editor.selected().first().unwrap();
    assert!(matches!(
        editor.scene().item(pasted).unwrap().kind,
        ItemKind::Highlight { .. }
    ));
}

#[test]
fn test_internal_raster_wins_over_system_content() {
    let mut editor = editor_with_system(
        Some(RasterImage::solid(8, 8, Color32::BLUE)),
        Some("ignored".into()),
    );
    let source = Rect::from_min_max(Pos2::new(30.0, 40.0), Pos2::new(62.0, 72.0));
    editor.copy_region(source);

    editor.paste_in_place().unwrap();
    let pasted = *editor.selected().first().unwrap();
    let item = editor.scene().item(pasted).unwrap();
    assert!(matches!(item.kind, ItemKind::RasterRegion { .. }));
    assert_eq!(item.transform.position, Vec2::new(30.0, 40.0));
}

#[test]
fn test_system_image_wins_over_system_text() {
    let mut editor = editor_with_system(
        Some(RasterImage::solid(10, 10, Color32::BLUE)),
        Some("hello".into()),
    );

    editor.paste().unwrap();
    let pasted = *editor.selected().first().unwrap();
    let item = editor.scene().item(pasted).unwrap();
    assert!(matches!(item.kind, ItemKind::RasterRegion { .. }));
    // Centered on the viewport
    let center = (editor.config().canvas_size / 2.0).to_pos2();
    assert_eq!(item.transform.position, center.to_vec2() - Vec2::splat(5.0));
}

#[test]
fn test_system_text_is_the_last_resort() {
    let mut editor = editor_with_system(None, Some("hello".into()));

    editor.paste().unwrap();
    let pasted = *editor.selected().first().unwrap();
    match &editor.scene().item(pasted).unwrap().kind {
        ItemKind::Text { text, font_size, .. } => {
            assert_eq!(text, "hello");
            assert_eq!(*font_size, editor.config().default_font_size);
        }
        other => panic!("expected a text item, got {other:?}"),
    }
}

#[test]
fn test_paste_with_everything_empty_is_a_noop() {
    let mut editor = Editor::default();
    editor.paste().unwrap();
    assert_eq!(editor.scene().items().count(), 0);
    assert!(!editor.can_undo());
}

#[test]
fn test_failing_codec_declines_the_whole_paste() {
    let mut editor = Editor::with_collaborators(
        EditorConfig::default(),
        Box::new(BrokenReadCodec),
        Box::new(NullRenderer),
        Box::new(StubSystem { image: None, text: None }),
    );
    editor.add_item(highlight_at(0.0, 0.0)).unwrap();
    editor.copy().unwrap();

    assert!(editor.paste().is_err());
    // Nothing was added, nothing recorded, clipboard untouched
    assert_eq!(editor.scene().items().count(), 1);
    assert_eq!(editor.command_count(), 1);
    assert!(matches!(editor.clipboard().content(), ClipboardContent::Items(_)));
}

#[test]
fn test_copy_with_empty_selection_keeps_clipboard() {
    let mut editor = Editor::default();
    editor.add_item(highlight_at(0.0, 0.0)).unwrap();
    editor.copy().unwrap();

    editor.deselect_all();
    editor.copy().unwrap();
    assert!(matches!(editor.clipboard().content(), ClipboardContent::Items(_)));
}

#[test]
fn test_cut_copies_then_removes_the_selection() {
    let mut editor = Editor::default();
    let id = editor.add_item(highlight_at(12.0, 0.0)).unwrap();

    editor.cut().unwrap();
    assert!(editor.scene().item(id).is_none());
    assert!(editor.selected().is_empty());

    editor.paste_in_place().unwrap();
    let pasted = *editor.selected().first().unwrap();
    assert_eq!(
        editor.scene().item(pasted).unwrap().transform.position,
        Vec2::new(12.0, 0.0)
    );
}
