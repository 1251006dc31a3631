use std::collections::{BTreeMap, HashSet};

use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::error::Error;
use crate::fonts::{FontEntry, FontId, FontMetrics, register_font};
use crate::model::{ImageFormat, Logo};

use super::surface::{DrawCommand, FinishedDocument};

const LOGO_NAME: &str = "Im1";

/// Write the logo as an image XObject. JPEG data is passed through; PNG is
/// decoded to RGB with an optional soft mask for transparency.
fn embed_logo(pdf: &mut Pdf, logo: &Logo, alloc: &mut impl FnMut() -> Ref) -> Option<Ref> {
    // Allocate only after the image proved usable; a skipped logo must not
    // leave a free entry in the xref table.
    let xobj_ref = match logo.format {
        ImageFormat::Jpeg => {
            let (w, h) = logo.dimensions()?;
            let xobj_ref = alloc();
            let mut xobj = pdf.image_xobject(xobj_ref, &logo.data);
            xobj.filter(Filter::DctDecode);
            xobj.width(w as i32);
            xobj.height(h as i32);
            xobj.color_space().device_rgb();
            xobj.bits_per_component(8);
            xobj_ref
        }
        ImageFormat::Png => {
            let reader = image::ImageReader::with_format(
                std::io::Cursor::new(&logo.data),
                image::ImageFormat::Png,
            );
            let decoded = match reader.decode() {
                Ok(img) => img,
                Err(e) => {
                    log::warn!("Skipping logo: {e}");
                    return None;
                }
            };
            let rgba: image::RgbaImage = decoded.to_rgba8();
            let (w, h) = (rgba.width(), rgba.height());
            let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);
            let xobj_ref = alloc();

            let rgb_data: Vec<u8> = rgba
                .pixels()
                .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
                .collect();
            let compressed_rgb = miniz_oxide::deflate::compress_to_vec_zlib(&rgb_data, 6);

            let smask_ref = if has_alpha {
                let alpha_data: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
                let compressed_alpha = miniz_oxide::deflate::compress_to_vec_zlib(&alpha_data, 6);
                let mask_ref = alloc();
                let mut mask = pdf.image_xobject(mask_ref, &compressed_alpha);
                mask.filter(Filter::FlateDecode);
                mask.width(w as i32);
                mask.height(h as i32);
                mask.color_space().device_gray();
                mask.bits_per_component(8);
                Some(mask_ref)
            } else {
                None
            };

            let mut xobj = pdf.image_xobject(xobj_ref, &compressed_rgb);
            xobj.filter(Filter::FlateDecode);
            xobj.width(w as i32);
            xobj.height(h as i32);
            xobj.color_space().device_rgb();
            xobj.bits_per_component(8);
            if let Some(mask_ref) = smask_ref {
                xobj.s_mask(mask_ref);
            }
            xobj_ref
        }
    };
    Some(xobj_ref)
}

fn write_command(
    content: &mut Content,
    command: &DrawCommand,
    page_height: f32,
    fonts: &BTreeMap<FontId, FontEntry>,
    has_logo: bool,
) {
    match command {
        DrawCommand::Text {
            x,
            baseline,
            text,
            style,
        } => {
            let Some(entry) = fonts.get(&style.font) else {
                return;
            };
            let (r, g, b) = style.color.rgb();
            content.begin_text();
            content.set_fill_rgb(r, g, b);
            content.set_font(Name(entry.pdf_name.as_bytes()), style.size);
            content.next_line(*x, page_height - baseline);
            content.show(Str(&entry.encode(text)));
            content.end_text();
        }
        DrawCommand::FillRect {
            x,
            y,
            width,
            height,
            color,
        } => {
            let (r, g, b) = color.rgb();
            content.save_state();
            content.set_fill_rgb(r, g, b);
            content.rect(*x, page_height - y - height, *width, *height);
            content.fill_nonzero();
            content.restore_state();
        }
        DrawCommand::Line {
            x1,
            y1,
            x2,
            y2,
            width,
            color,
        } => {
            let (r, g, b) = color.rgb();
            content.save_state();
            content.set_stroke_rgb(r, g, b);
            content.set_line_width(*width);
            content.move_to(*x1, page_height - y1);
            content.line_to(*x2, page_height - y2);
            content.stroke();
            content.restore_state();
        }
        DrawCommand::Image {
            x,
            y,
            width,
            height,
        } => {
            if !has_logo {
                return;
            }
            content.save_state();
            content.transform([*width, 0.0, 0.0, *height, *x, page_height - y - height]);
            content.x_object(Name(LOGO_NAME.as_bytes()));
            content.restore_state();
        }
    }
}

/// Serialize a finalized document to PDF bytes.
pub fn write_pdf(
    doc: &FinishedDocument,
    metrics: &dyn FontMetrics,
    logo: Option<&Logo>,
) -> Result<Vec<u8>, Error> {
    let t0 = std::time::Instant::now();
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let info_id = alloc();

    // Phase 1: fonts, subsetted to the characters each weight actually shows
    let mut used_chars: BTreeMap<FontId, HashSet<char>> = BTreeMap::new();
    for command in doc.pages.iter().flat_map(|p| p.all_commands()) {
        if let DrawCommand::Text { text, style, .. } = command {
            used_chars.entry(style.font).or_default().extend(text.chars());
        }
    }
    for chars in used_chars.values_mut() {
        chars.insert(' ');
    }

    let mut fonts: BTreeMap<FontId, FontEntry> = BTreeMap::new();
    for (i, (font, chars)) in used_chars.iter().enumerate() {
        let entry = register_font(
            &mut pdf,
            *font,
            metrics.program(*font),
            format!("F{}", i + 1),
            chars,
            &mut alloc,
        );
        fonts.insert(*font, entry);
    }

    let t_fonts = t0.elapsed();

    // Phase 2: logo
    let draws_image = doc
        .pages
        .iter()
        .flat_map(|p| p.all_commands())
        .any(|c| matches!(c, DrawCommand::Image { .. }));
    let logo_ref = match logo {
        Some(logo) if draws_image => embed_logo(&mut pdf, logo, &mut alloc),
        _ => None,
    };

    // Phase 3: page content streams
    let page_height = doc.geometry.height;
    let n = doc.pages.len();
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    for (i, page) in doc.pages.iter().enumerate() {
        let mut content = Content::new();
        for command in page.all_commands() {
            write_command(&mut content, command, page_height, &fonts, logo_ref.is_some());
        }
        let raw = content.finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        pdf.stream(content_ids[i], &compressed)
            .filter(Filter::FlateDecode);
    }

    let t_content = t0.elapsed();

    // Phase 4: document structure
    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(n as i32);

    let media_box = Rect::new(0.0, 0.0, doc.geometry.width, doc.geometry.height);
    for i in 0..n {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(media_box)
            .parent(pages_id)
            .contents(content_ids[i]);
        let mut resources = page.resources();
        {
            let mut font_dict = resources.fonts();
            for entry in fonts.values() {
                font_dict.pair(Name(entry.pdf_name.as_bytes()), entry.font_ref);
            }
        }
        if let Some(xobj_ref) = logo_ref {
            resources
                .x_objects()
                .pair(Name(LOGO_NAME.as_bytes()), xobj_ref);
        }
        resources.finish();
    }

    pdf.document_info(info_id)
        .title(TextStr(&doc.title))
        .producer(TextStr(concat!("docket-pdf ", env!("CARGO_PKG_VERSION"))));

    let bytes = pdf.finish();
    log::info!(
        "PDF phases: fonts={:.1}ms, content={:.1}ms, structure={:.1}ms ({} pages, {} bytes)",
        t_fonts.as_secs_f64() * 1000.0,
        (t_content - t_fonts).as_secs_f64() * 1000.0,
        (t0.elapsed() - t_content).as_secs_f64() * 1000.0,
        n,
        bytes.len(),
    );
    Ok(bytes)
}
