use egui::{Color32, Pos2, Rect, Vec2};
use snapmark::{Editor, EditorConfig, Item, ItemKind};

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

fn editor_with_canvas(w: f32, h: f32) -> Editor {
    Editor::new(EditorConfig {
        canvas_size: Vec2::new(w, h),
        ..EditorConfig::default()
    })
}

#[test]
fn test_resize_scales_positions_and_geometry() {
    let mut editor = editor_with_canvas(800.0, 600.0);
    let id = editor
        .add_item(Item::at(
            ItemKind::Rectangle {
                rect: Rect::from_min_size(Pos2::ZERO, Vec2::new(100.0, 100.0)),
                stroke_width: 2.0,
                corner_radius: 8.0,
                stroke: Color32::RED,
                fill: Color32::TRANSPARENT,
            },
            Vec2::new(100.0, 200.0),
        ))
        .unwrap();

    editor.resize_canvas(Vec2::new(400.0, 300.0)).unwrap();
    assert_eq!(editor.scene().canvas_size(), Vec2::new(400.0, 300.0));

    let item = editor.scene().item(id).unwrap();
    assert_eq!(item.transform.position, Vec2::new(50.0, 100.0));
    match &item.kind {
        ItemKind::Rectangle { rect, stroke_width, corner_radius, .. } => {
            assert_eq!(rect.max, Pos2::new(50.0, 50.0));
            // Scalar properties scale by the average factor
            assert!(close(*stroke_width, 1.0));
            assert!(close(*corner_radius, 4.0));
        }
        other => panic!("unexpected kind {other:?}"),
    }
}

#[test]
fn test_nonuniform_resize_averages_scalar_properties() {
    let mut editor = editor_with_canvas(800.0, 600.0);
    let id = editor
        .add_item(Item::new(ItemKind::Line {
            start: Pos2::new(0.0, 0.0),
            end: Pos2::new(100.0, 0.0),
            stroke_width: 4.0,
            color: Color32::RED,
        }))
        .unwrap();

    // x halves, y stays: average factor 0.75
    editor.resize_canvas(Vec2::new(400.0, 600.0)).unwrap();
    match &editor.scene().item(id).unwrap().kind {
        ItemKind::Line { end, stroke_width, .. } => {
            assert_eq!(*end, Pos2::new(50.0, 0.0));
            assert!(close(*stroke_width, 3.0));
        }
        other => panic!("unexpected kind {other:?}"),
    }
}

#[test]
fn test_font_size_never_scales_below_the_minimum() {
    let mut editor = editor_with_canvas(800.0, 600.0);
    let id = editor
        .add_item(Item::new(ItemKind::Text {
            width: 240.0,
            text: "note".into(),
            font_size: 1.5,
            color: Color32::BLACK,
        }))
        .unwrap();

    editor.resize_canvas(Vec2::new(400.0, 300.0)).unwrap();
    match &editor.scene().item(id).unwrap().kind {
        ItemKind::Text { font_size, .. } => assert!(close(*font_size, 1.0)),
        other => panic!("unexpected kind {other:?}"),
    }
}

#[test]
fn test_resize_undo_restores_snapshots_exactly() {
    let mut editor = editor_with_canvas(800.0, 600.0);
    let id = editor
        .add_item(Item::at(
            ItemKind::Freehand {
                points: vec![Pos2::new(1.0, 2.0), Pos2::new(33.3, 66.6), Pos2::new(7.0, 9.0)],
                stroke_width: 2.0,
                color: Color32::BLUE,
            },
            Vec2::new(13.0, 17.0),
        ))
        .unwrap();
    let before = editor.scene().item(id).unwrap().clone();

    // A shrink and an undo; floating-point drift from inverse scaling is
    // exactly what the snapshot path avoids
    editor.resize_canvas(Vec2::new(257.0, 191.0)).unwrap();
    editor.undo().unwrap();

    assert_eq!(editor.scene().canvas_size(), Vec2::new(800.0, 600.0));
    assert_eq!(editor.scene().item(id).unwrap(), &before);
}

#[test]
fn test_resize_redo_after_undo_converges() {
    let mut editor = editor_with_canvas(800.0, 600.0);
    let id = editor
        .add_item(Item::at(
            ItemKind::Highlight {
                rect: Rect::from_min_size(Pos2::ZERO, Vec2::new(64.0, 64.0)),
                color: Color32::YELLOW,
            },
            Vec2::new(40.0, 40.0),
        ))
        .unwrap();

    editor.resize_canvas(Vec2::new(400.0, 300.0)).unwrap();
    let after_first = editor.scene().item(id).unwrap().clone();

    editor.undo().unwrap();
    editor.redo().unwrap();
    assert_eq!(editor.scene().item(id).unwrap(), &after_first);
}

#[test]
fn test_resize_emits_canvas_event_text() {
    let mut editor = editor_with_canvas(800.0, 600.0);
    editor.resize_canvas(Vec2::new(1024.0, 768.0)).unwrap();
    assert_eq!(editor.undo_text(), "Resize canvas");
    editor.undo().unwrap();
    assert_eq!(editor.scene().canvas_size(), Vec2::new(800.0, 600.0));
}
