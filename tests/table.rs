mod common;

use common::FixedMetrics;
use docket_pdf::pdf::cursor::FlowCursor;
use docket_pdf::pdf::item_table_layout;
use docket_pdf::pdf::layout::Align;
use docket_pdf::pdf::surface::{Color, DrawCommand, TextStyle};
use docket_pdf::pdf::table::{Column, RowLayout, TableLayout, TableReport, draw_table, render_table};
use docket_pdf::{Error, FontId, LayoutConfig, PageGeometry};

const METRICS: FixedMetrics = FixedMetrics::new();

/// Content area runs from y=20 to y=260.
fn short_page() -> PageGeometry {
    PageGeometry::new(200.0, 300.0, 20.0, 40.0)
}

fn two_column_table() -> TableLayout {
    TableLayout {
        columns: vec![
            Column::new("Name", 0.0, 100.0, Align::Left),
            Column::new("Value", 100.0, 60.0, Align::Right),
        ],
        left: 20.0,
        header_style: TextStyle::new(FontId::Bold, 8.0),
        body_style: TextStyle::new(FontId::Regular, 8.0),
        header_height: 20.0,
        min_row_height: 20.0,
        padding: 2.0,
    }
}

fn fixed_rows(heights: &[f32]) -> Vec<RowLayout> {
    heights
        .iter()
        .map(|&height| RowLayout {
            cells: Vec::new(),
            height,
        })
        .collect()
}

/// Draws "HEADER" for each header band and "row N" inside each row frame.
fn draw_marked(cursor: &mut FlowCursor, rows: &[RowLayout]) -> Result<TableReport, Error> {
    draw_table(
        cursor,
        &two_column_table(),
        rows,
        |cursor, _| {
            let y = cursor.y();
            cursor.draw(DrawCommand::Text {
                x: 20.0,
                baseline: y + 10.0,
                text: "HEADER".into(),
                style: TextStyle::new(FontId::Bold, 8.0),
            });
            Ok(())
        },
        |cursor, _, _, frame| {
            cursor.draw(DrawCommand::Text {
                x: 22.0,
                baseline: frame.top + 10.0,
                text: format!("row {}", frame.index),
                style: TextStyle::new(FontId::Regular, 8.0),
            });
            Ok(())
        },
    )
}

#[test]
fn full_page_then_one_more_row_starts_page_two_with_header() {
    // Header (20) + 11 rows (220) fill the 240pt content area exactly.
    let mut cursor = FlowCursor::new(short_page());
    let rows = fixed_rows(&[20.0; 12]);
    let report = draw_marked(&mut cursor, &rows).unwrap();

    assert_eq!(report.header_pages, [0, 1]);
    assert_eq!(report.rows[10].page, 0);
    assert_eq!(report.rows[10].top, 240.0);
    assert_eq!(report.rows[11].page, 1);
    assert_eq!(report.rows[11].top, 40.0);

    // Shading continues by global index across the break.
    assert!(!report.rows[10].shaded);
    assert!(report.rows[11].shaded);

    let pages = cursor.surface().pages();
    assert_eq!(pages.len(), 2);
    assert_eq!(common::page_texts(&pages[1]), ["HEADER", "row 11"]);
    let fills_on_page_two = pages[1]
        .commands
        .iter()
        .filter(|c| matches!(c, DrawCommand::FillRect { color, .. } if *color == Color::ROW_FILL))
        .count();
    assert_eq!(fills_on_page_two, 1);
}

#[test]
fn exact_fill_does_not_open_an_empty_page() {
    let mut cursor = FlowCursor::new(short_page());
    let report = draw_marked(&mut cursor, &fixed_rows(&[20.0; 11])).unwrap();
    assert_eq!(report.header_pages, [0]);
    assert_eq!(cursor.surface().page_count(), 1);
    assert_eq!(cursor.y(), 260.0);
}

#[test]
fn rows_are_never_split_and_headers_repeat_once_per_page() {
    let heights: Vec<f32> = (0..40).map(|i| 20.0 + (i % 4) as f32 * 13.0).collect();
    let mut cursor = FlowCursor::new(short_page());
    let report = draw_marked(&mut cursor, &fixed_rows(&heights)).unwrap();
    let bottom = short_page().content_bottom();

    assert_eq!(report.rows.len(), heights.len());
    assert_eq!(report.header_pages, report.pages_touched());

    for frame in &report.rows {
        assert!(frame.top + frame.height <= bottom, "row {} crosses the footer band", frame.index);
        assert_eq!(frame.shaded, frame.index % 2 == 1);

        let page = &cursor.surface().pages()[frame.page];
        let label = format!("row {}", frame.index);
        assert!(page.texts().any(|t| t == label));
    }

    for (index, page) in cursor.surface().pages().iter().enumerate() {
        let headers = page.texts().filter(|t| *t == "HEADER").count();
        assert_eq!(headers, 1, "page {index}");
        // The header opens every continuation page.
        assert_eq!(page.texts().next(), Some("HEADER"));
    }
}

#[test]
fn header_is_kept_with_the_first_row() {
    let mut cursor = FlowCursor::new(short_page());
    // 25pt left: the header fits but header plus first row does not.
    cursor.advance(215.0);
    let report = draw_marked(&mut cursor, &fixed_rows(&[20.0, 20.0])).unwrap();
    assert_eq!(report.header_pages, [1]);
    assert_eq!(report.rows[0].page, 1);
    assert_eq!(report.rows[0].top, 40.0);
    assert!(cursor.surface().pages()[0].commands.is_empty());
}

#[test]
fn oversized_row_is_drawn_on_a_fresh_page_and_flow_continues() {
    let mut cursor = FlowCursor::new(short_page());
    cursor.advance(100.0);
    let report = draw_marked(&mut cursor, &fixed_rows(&[20.0, 500.0, 20.0])).unwrap();

    // Row 1 cannot fit anywhere: it gets a fresh page with its own header.
    assert_eq!(report.rows[0].page, 0);
    assert_eq!(report.rows[1].page, 1);
    assert_eq!(report.rows[1].top, 40.0);
    // The row after it continues on the next page under a new header.
    assert_eq!(report.rows[2].page, 2);
    assert_eq!(report.rows[2].top, 40.0);
    assert_eq!(report.header_pages, [0, 1, 2]);
}

#[test]
fn oversized_first_row_does_not_loop() {
    let mut cursor = FlowCursor::new(short_page());
    let report = draw_marked(&mut cursor, &fixed_rows(&[500.0])).unwrap();
    assert_eq!(report.header_pages, [0]);
    assert_eq!(report.rows[0].page, 0);
    assert_eq!(cursor.surface().page_count(), 2);
}

#[test]
fn empty_table_draws_only_the_header() {
    let mut cursor = FlowCursor::new(short_page());
    let report = draw_marked(&mut cursor, &[]).unwrap();
    assert_eq!(report.header_pages, [0]);
    assert!(report.rows.is_empty());
    assert_eq!(common::page_texts(&cursor.surface().pages()[0]), ["HEADER"]);
}

#[test]
fn measured_row_height_follows_the_tallest_cell() {
    let table = two_column_table();
    // 8pt text at 4pt per char; the Name cell wraps after 96pt.
    let row = table
        .measure_row(&METRICS, &["aaaa bbbb cccc dddd eeee ffff".into(), "1".into()])
        .unwrap();
    let line_h = 8.0 * 1.2;
    assert_eq!(row.cells[0].len(), 2);
    assert_eq!(row.cells[1].len(), 1);
    assert!((row.height - (2.0 * line_h + 4.0)).abs() < 1e-4);

    let short = table.measure_row(&METRICS, &["a".into()]).unwrap();
    assert_eq!(short.height, table.min_row_height);
    assert!(short.cells[1].is_empty());
}

#[test]
fn long_description_word_leaves_other_columns_in_place() {
    let config = LayoutConfig::default();
    let table = item_table_layout(&config);
    let word = "X".repeat(60);
    let rows = vec![
        vec!["Filter".into(), "1".into(), "$1.00".into(), "10%".into(), "$1.00".into()],
        vec![format!("{word} kit"), "1".into(), "$1.00".into(), "10%".into(), "$1.00".into()],
    ];
    let mut cursor = FlowCursor::new(config.geometry);
    let report = render_table(&mut cursor, &METRICS, &table, &rows).unwrap();
    assert!(report.rows[1].height > report.rows[0].height);

    let texts = common::text_commands(&cursor.surface().pages()[0]);
    assert!(texts.iter().any(|&(_, _, t)| t == word));
    assert!(texts.iter().any(|&(_, _, t)| t == "kit"));

    for cell in ["1", "10%"] {
        let xs: Vec<f32> = texts
            .iter()
            .filter(|&&(_, _, t)| t == cell)
            .map(|&(x, _, _)| x)
            .collect();
        assert_eq!(xs.len(), 2, "{cell}");
        assert_eq!(xs[0], xs[1], "{cell} moved");
    }

    // Right-aligned cells end at their column's right padding.
    let qty = &table.columns[1];
    let qty_right = table.left + qty.x + qty.width - table.padding;
    let (x, _, _) = texts.iter().find(|&&(_, _, t)| t == "1").copied().unwrap();
    assert!((x + 0.5 * config.body_size - qty_right).abs() < 1e-3);
}

#[test]
fn render_table_propagates_measurement_errors() {
    let mut cursor = FlowCursor::new(short_page());
    let rows = vec![vec!["\u{2603}".to_string(), "1".to_string()]];
    let err = render_table(&mut cursor, &METRICS, &two_column_table(), &rows).unwrap_err();
    assert!(matches!(err, Error::MetricsUnavailable { .. }));
}
