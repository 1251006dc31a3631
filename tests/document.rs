mod common;

use common::{FixedMetrics, item, numbered_items, sample_model};
use docket_pdf::pdf::surface::DrawCommand;
use docket_pdf::{
    Cents, DocumentKind, Error, LayoutConfig, MetaField, PageGeometry, PaperSize, SecondaryFee,
    StandardFonts, layout,
};

fn page_of(doc: &docket_pdf::pdf::surface::FinishedDocument, text: &str) -> Option<usize> {
    doc.pages()
        .iter()
        .position(|p| p.texts().any(|t| t == text))
}

#[test]
fn empty_item_list_is_one_page_with_header_only_table() {
    let model = sample_model(vec![]);
    let result = layout(&model, &LayoutConfig::default(), &StandardFonts).unwrap();
    let doc = &result.document;

    assert_eq!(doc.page_count(), 1);
    assert_eq!(result.table.header_pages, [0]);
    assert!(result.table.rows.is_empty());

    assert_eq!(result.totals.subtotal, Cents(0));
    assert_eq!(result.totals.tax, Cents(0));
    assert_eq!(result.totals.grand_total, Cents(0));

    let texts = common::page_texts(&doc.pages()[0]);
    for expected in ["QUOTATION", "Description", "Amount", "Subtotal", "Grand total"] {
        assert!(texts.contains(&expected), "missing {expected}");
    }
    assert_eq!(texts.iter().filter(|t| **t == "$0.00").count(), 3);
    assert_eq!(doc.pages()[0].footer().unwrap().page_label, "Page 1 of 1");
    assert_eq!(doc.title(), "QUOTATION Q-2026-0042");
}

#[test]
fn every_page_gets_one_correct_footer() {
    let model = sample_model(numbered_items("Alpha", 120));
    let result = layout(&model, &LayoutConfig::default(), &StandardFonts).unwrap();
    let doc = &result.document;
    let total = doc.page_count();
    assert!(total >= 3, "expected several pages, got {total}");

    let bottom = doc.geometry().content_bottom();
    for (i, page) in doc.pages().iter().enumerate() {
        let footer = page.footer().unwrap();
        assert_eq!(footer.page_label, format!("Page {} of {}", i + 1, total));
        assert_eq!(footer.notice, LayoutConfig::default().footer_notice);

        let labels: Vec<&str> = page
            .all_commands()
            .filter_map(DrawCommand::text)
            .filter(|t| t.starts_with("Page "))
            .collect();
        assert_eq!(labels, [footer.page_label.as_str()]);

        // Body stays above the band, the stamp stays inside it.
        for cmd in &page.commands {
            assert!(cmd.vertical_extent().1 <= bottom + 1e-3, "page {i}: {cmd:?}");
        }
        for cmd in &footer.commands {
            let (top, bot) = cmd.vertical_extent();
            assert!(top >= bottom && bot <= doc.geometry().height, "page {i}: {cmd:?}");
        }
    }
}

#[test]
fn item_table_repeats_header_on_each_page_it_touches() {
    let model = sample_model(numbered_items("Alpha", 120));
    let result = layout(&model, &LayoutConfig::default(), &StandardFonts).unwrap();
    let doc = &result.document;
    let margin = doc.geometry().margin;

    assert_eq!(result.table.rows.len(), 120);
    assert_eq!(result.table.header_pages, result.table.pages_touched());
    for &page in &result.table.header_pages[1..] {
        let first = &doc.pages()[page].commands[0];
        assert!(
            matches!(first, DrawCommand::FillRect { y, .. } if (*y - margin).abs() < 1e-3),
            "page {page} does not open with the header band: {first:?}"
        );
    }
    for (i, page) in doc.pages().iter().enumerate() {
        let headers = page.texts().filter(|t| *t == "Description").count();
        let expected = usize::from(result.table.header_pages.contains(&i));
        assert_eq!(headers, expected, "page {i}");
    }

    // Each item's description appears exactly once, on its row's page.
    for frame in &result.table.rows {
        let text = format!("Alpha item {}", frame.index);
        assert_eq!(page_of(doc, &text), Some(frame.page));
    }
}

#[test]
fn summary_block_stays_together_after_the_table() {
    // Grow the table until the summary no longer fits below the last row on
    // some page, and check it is moved as a whole.
    for count in 30..70 {
        let model = sample_model(numbered_items("Beta", count));
        let result = layout(&model, &LayoutConfig::default(), &StandardFonts).unwrap();
        let doc = &result.document;
        let subtotal = page_of(doc, "Subtotal").unwrap();
        let grand = page_of(doc, "Grand total").unwrap();
        assert_eq!(subtotal, grand, "{count} items");
        assert!(subtotal >= result.table.rows.last().unwrap().page);
    }
}

#[test]
fn secondary_fee_adds_two_summary_rows() {
    let mut model = sample_model(vec![item("Service visit", 1.0, 100.0, 10.0)]);
    model.secondary_fee = Some(SecondaryFee {
        label: "Call-out".into(),
        amount: 50.0,
        tax_rate: 5.0,
    });
    let result = layout(&model, &LayoutConfig::default(), &StandardFonts).unwrap();
    let texts = common::page_texts(&result.document.pages()[0]);

    // The table header also has a "Tax" column title; look at the summary only.
    let labels: Vec<&str> = texts
        .iter()
        .copied()
        .skip_while(|t| *t != "Subtotal")
        .filter(|t| ["Subtotal", "Tax", "Call-out", "Call-out tax", "Grand total"].contains(t))
        .collect();
    assert_eq!(labels, ["Subtotal", "Tax", "Call-out", "Call-out tax", "Grand total"]);
    assert!(texts.contains(&"$162.50"));
}

#[test]
fn long_terms_flow_onto_following_pages() {
    let mut model = sample_model(numbered_items("Gamma", 25));
    let words: Vec<String> = (0..1500).map(|i| format!("clause{i}")).collect();
    model.terms = Some(words.join(" "));
    let result = layout(&model, &LayoutConfig::default(), &StandardFonts).unwrap();
    let doc = &result.document;

    let heading = page_of(doc, "Terms and conditions").unwrap();
    assert!(doc.page_count() > heading + 1);

    let flowed: Vec<&str> = doc.pages()[heading..]
        .iter()
        .flat_map(|p| p.texts())
        .skip_while(|t| *t != "Terms and conditions")
        .skip(1)
        .flat_map(|l| l.split(' '))
        .collect();
    let expected: Vec<&str> = words.iter().map(String::as_str).collect();
    assert_eq!(flowed, expected);
}

#[test]
fn metadata_skips_empty_values_and_keeps_extras() {
    let mut model = sample_model(vec![]);
    model.meta.date = String::new();
    model.meta.extra = vec![
        MetaField {
            label: "Technician".into(),
            value: "R. Osei".into(),
        },
        MetaField {
            label: "Site ref".into(),
            value: " ".into(),
        },
    ];
    let result = layout(
        &model,
        &LayoutConfig::for_kind(DocumentKind::ServiceReport),
        &StandardFonts,
    )
    .unwrap();
    let texts = common::page_texts(&result.document.pages()[0]);
    assert!(texts.contains(&"SERVICE REPORT"));
    assert!(texts.contains(&"Technician"));
    assert!(texts.contains(&"R. Osei"));
    assert!(!texts.contains(&"Date"));
    assert!(!texts.contains(&"Site ref"));
    assert!(texts.contains(&"BILL TO"));
}

#[test]
fn preset_kinds_use_their_paper_sizes() {
    let report = LayoutConfig::for_kind(DocumentKind::ServiceReport);
    assert_eq!(report.geometry.width, 612.0);
    assert_eq!(report.geometry.height, 792.0);

    let quote = LayoutConfig::default().with_paper(PaperSize::Letter);
    assert_eq!(quote.geometry.height, 792.0);
    assert_eq!(quote.document_title, "QUOTATION");
    assert!(quote.validate().is_ok());
}

#[test]
fn invalid_configuration_is_rejected_before_layout() {
    let model = sample_model(numbered_items("Alpha", 3));

    let mut config = LayoutConfig::default();
    config.geometry = PageGeometry::new(200.0, 300.0, 20.0, 260.0);
    let err = layout(&model, &config, &StandardFonts).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)), "{err}");

    let mut config = LayoutConfig::default();
    config.geometry.margin = 400.0;
    assert!(matches!(config.validate(), Err(Error::Configuration(_))));

    let mut config = LayoutConfig::default();
    config.body_size = 0.0;
    assert!(matches!(
        layout(&model, &config, &StandardFonts),
        Err(Error::Configuration(_))
    ));

    let mut config = LayoutConfig::default();
    config.summary_label_width = 600.0;
    assert!(matches!(config.validate(), Err(Error::Configuration(_))));

    let mut config = LayoutConfig::default();
    config.geometry.width = f32::NAN;
    assert!(matches!(config.validate(), Err(Error::Configuration(_))));
}

#[test]
fn undersized_dimensions_are_rejected() {
    let rejected = |config: &LayoutConfig| {
        assert!(
            matches!(config.validate(), Err(Error::Configuration(_))),
            "{config:?}"
        );
    };

    let mut config = LayoutConfig::default();
    config.header_height = 900.0;
    rejected(&config);
    let err = layout(&sample_model(vec![]), &config, &StandardFonts).unwrap_err();
    assert!(err.to_string().contains("header_height"), "{err}");

    let mut config = LayoutConfig::default();
    config.header_height = config.geometry.content_height();
    rejected(&config);

    let mut config = LayoutConfig::default();
    config.header_height = f32::NAN;
    rejected(&config);

    let mut config = LayoutConfig::default();
    config.cell_padding = -2.0;
    rejected(&config);

    let mut config = LayoutConfig::default();
    config.table_row_height = -1.0;
    rejected(&config);

    let mut config = LayoutConfig::default();
    config.table_header_height = config.geometry.content_height();
    rejected(&config);
}

#[test]
fn footer_band_must_hold_the_stamp() {
    let model = sample_model(numbered_items("Alpha", 3));

    let mut config = LayoutConfig::default();
    config.geometry.footer_band = 12.0;
    assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    let err = layout(&model, &config, &StandardFonts).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)), "{err}");

    // Without a notice the stamp is a single line and a smaller band is enough.
    config.footer_notice = String::new();
    config.geometry.footer_band = 18.0;
    assert!(config.validate().is_ok());
}

#[test]
fn footer_stays_inside_a_tight_band() {
    let model = sample_model(numbered_items("Alpha", 90));
    let mut with_notice = LayoutConfig::default();
    with_notice.geometry.footer_band = 30.0;
    let mut label_only = LayoutConfig::default();
    label_only.footer_notice = " ".into();
    label_only.geometry.footer_band = 18.0;

    for config in [with_notice, label_only] {
        let result = layout(&model, &config, &StandardFonts).unwrap();
        let doc = &result.document;
        let bottom = doc.geometry().content_bottom();
        let height = doc.geometry().height;
        assert!(doc.page_count() > 1);
        for (i, page) in doc.pages().iter().enumerate() {
            let footer = page.footer().unwrap();
            for cmd in &footer.commands {
                let (top, bot) = cmd.vertical_extent();
                assert!(top >= bottom && bot <= height, "page {i}: {cmd:?}");
            }
            let expected_texts = if config.footer_notice.trim().is_empty() { 1 } else { 2 };
            let texts = footer.commands.iter().filter_map(DrawCommand::text).count();
            assert_eq!(texts, expected_texts, "page {i}");
        }
    }
}

#[test]
fn tabs_and_runs_of_spaces_in_single_lines_are_collapsed() {
    let mut model = sample_model(numbered_items("Alpha", 2));
    model.issuer.address_lines = vec![
        "12 Harbour Road\tUnit 4".into(),
        "  Portsmouth   PO1 2AB ".into(),
    ];
    let mut config = LayoutConfig::default();
    config.footer_notice = "Thank you\tfor your business".into();

    let result = layout(&model, &config, &StandardFonts).unwrap();
    let page = &result.document.pages()[0];
    let texts = common::page_texts(page);
    assert!(texts.contains(&"12 Harbour Road Unit 4"), "{texts:?}");
    assert!(texts.contains(&"Portsmouth PO1 2AB"), "{texts:?}");

    let footer_texts: Vec<&str> = page
        .footer()
        .unwrap()
        .commands
        .iter()
        .filter_map(DrawCommand::text)
        .collect();
    assert!(footer_texts.contains(&"Thank you for your business"));
}

#[test]
fn unmeasurable_text_fails_the_build() {
    let mut model = sample_model(numbered_items("Alpha", 2));
    model.counterparty.name = "\u{96ea}\u{5c71} Trading".into();
    let err = layout(&model, &LayoutConfig::default(), &StandardFonts).unwrap_err();
    match err {
        Error::MetricsUnavailable { font, text } => {
            assert_eq!(font, "Helvetica-Bold");
            assert!(text.contains('\u{96ea}'));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn layout_with_fixed_metrics_is_deterministic() {
    let model = sample_model(numbered_items("Delta", 80));
    let config = LayoutConfig::default();
    let a = layout(&model, &config, &FixedMetrics::new()).unwrap();
    let b = layout(&model, &config, &FixedMetrics::new()).unwrap();
    assert_eq!(a.document.page_count(), b.document.page_count());
    for (pa, pb) in a.document.pages().iter().zip(b.document.pages()) {
        assert_eq!(pa.commands, pb.commands);
        assert_eq!(pa.footer(), pb.footer());
    }
}
