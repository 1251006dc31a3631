use std::collections::{HashMap, HashSet};
use std::path::Path;

use pdf_writer::{Name, Pdf, Rect, Ref};
use ttf_parser::Face;

use crate::error::Error;

/// The two weights every document uses. Draw commands carry one of these
/// explicitly; there is no "current font" state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontId {
    Regular,
    Bold,
}

impl FontId {
    pub fn name(self) -> &'static str {
        match self {
            FontId::Regular => "regular",
            FontId::Bold => "bold",
        }
    }

    fn standard_base_font(self) -> &'static str {
        match self {
            FontId::Regular => "Helvetica",
            FontId::Bold => "Helvetica-Bold",
        }
    }
}

/// How the PDF surface should reference a font.
pub enum FontProgram<'a> {
    /// One of the standard 14 Type1 fonts, WinAnsi encoded.
    Standard(&'static str),
    TrueType {
        name: &'a str,
        data: &'a [u8],
        face_index: u32,
    },
}

/// Measures rendered text. Implementations hold no mutable state, so one
/// provider can serve any number of concurrent document builds.
pub trait FontMetrics: Send + Sync {
    /// Advance width of `text` at `size` points.
    fn text_width(&self, font: FontId, size: f32, text: &str) -> Result<f32, Error>;

    /// Baseline offset below the top of a line box, as a fraction of size.
    fn ascender_ratio(&self, _font: FontId) -> f32 {
        0.75
    }

    /// Line pitch as a fraction of size.
    fn line_height_ratio(&self, _font: FontId) -> f32 {
        1.2
    }

    fn program(&self, font: FontId) -> FontProgram<'_> {
        FontProgram::Standard(font.standard_base_font())
    }
}

/// Helvetica and Helvetica-Bold from the base-14 set. Needs no font files.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardFonts;

impl FontMetrics for StandardFonts {
    fn text_width(&self, font: FontId, size: f32, text: &str) -> Result<f32, Error> {
        let mut w = 0.0f32;
        for ch in text.chars() {
            let byte = char_to_winansi(ch);
            if byte < 32 {
                return Err(Error::MetricsUnavailable {
                    font: font.standard_base_font().to_string(),
                    text: text.to_string(),
                });
            }
            w += standard_width_1000(font, byte);
        }
        Ok(w * size / 1000.0)
    }

    fn ascender_ratio(&self, _font: FontId) -> f32 {
        0.718
    }

    fn line_height_ratio(&self, _font: FontId) -> f32 {
        1.15
    }
}

// AFM advance widths for printable ASCII (32..=126).
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

const HELVETICA_BOLD_ASCII: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0..?
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // P.._
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // `..o
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // p..~
];

fn standard_width_1000(font: FontId, byte: u8) -> f32 {
    let table = match font {
        FontId::Regular => &HELVETICA_ASCII,
        FontId::Bold => &HELVETICA_BOLD_ASCII,
    };
    match byte {
        32..=126 => table[(byte - 32) as usize] as f32,
        0xA0 => 278.0, // nbsp
        0x85 => 1000.0, // ellipsis
        0x95 => 350.0,  // bullet
        0x96 => 556.0,  // en dash
        0x97 => 1000.0, // em dash
        0x80 | 0xA3 | 0xA5 => 556.0, // euro, pound, yen
        // Latin-1 letters are close to the average lowercase/uppercase width
        _ => 556.0,
    }
}

struct LoadedFace {
    name: String,
    data: Vec<u8>,
    face_index: u32,
    units_per_em: f32,
    ascender_ratio: f32,
    line_h_ratio: f32,
}

impl LoadedFace {
    fn parse(data: Vec<u8>, face_index: u32) -> Result<Self, Error> {
        let face = Face::parse(&data, face_index)
            .map_err(|e| Error::Font(format!("cannot parse font face {face_index}: {e}")))?;
        let units = face.units_per_em() as f32;
        let line_gap = face.line_gap() as f32;
        let ascender_ratio = face.ascender() as f32 / units;
        let line_h_ratio = (face.ascender() as f32 - face.descender() as f32 + line_gap) / units;
        let name = postscript_name(&face).unwrap_or_else(|| "EmbeddedFont".to_string());
        Ok(LoadedFace {
            name,
            units_per_em: units,
            ascender_ratio,
            line_h_ratio,
            data,
            face_index,
        })
    }
}

fn postscript_name(face: &Face) -> Option<String> {
    for name in face.names() {
        if name.name_id == ttf_parser::name_id::POST_SCRIPT_NAME
            && name.is_unicode()
            && let Some(s) = name.to_string()
        {
            return Some(s.replace(' ', ""));
        }
    }
    None
}

/// Regular and bold TrueType/OpenType faces. Fonts are embedded (subsetted)
/// into the output, so measured and rendered glyphs always match.
pub struct TrueTypeFonts {
    regular: LoadedFace,
    bold: LoadedFace,
}

impl TrueTypeFonts {
    pub fn from_bytes(regular: Vec<u8>, bold: Vec<u8>) -> Result<Self, Error> {
        Ok(TrueTypeFonts {
            regular: LoadedFace::parse(regular, 0)?,
            bold: LoadedFace::parse(bold, 0)?,
        })
    }

    pub fn from_files(regular: &Path, bold: &Path) -> Result<Self, Error> {
        let read = |path: &Path| {
            std::fs::read(path).map_err(|e| {
                Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())))
            })
        };
        let fonts = TrueTypeFonts::from_bytes(read(regular)?, read(bold)?)?;
        log::debug!(
            "Loaded fonts: regular={} bold={}",
            fonts.regular.name,
            fonts.bold.name
        );
        Ok(fonts)
    }

    fn face(&self, font: FontId) -> &LoadedFace {
        match font {
            FontId::Regular => &self.regular,
            FontId::Bold => &self.bold,
        }
    }
}

impl FontMetrics for TrueTypeFonts {
    fn text_width(&self, font: FontId, size: f32, text: &str) -> Result<f32, Error> {
        let loaded = self.face(font);
        let unavailable = || Error::MetricsUnavailable {
            font: loaded.name.clone(),
            text: text.to_string(),
        };
        let face = Face::parse(&loaded.data, loaded.face_index).map_err(|_| unavailable())?;
        let mut units = 0.0f32;
        for ch in text.chars() {
            let advance = face
                .glyph_index(ch)
                .and_then(|gid| face.glyph_hor_advance(gid))
                .ok_or_else(unavailable)?;
            units += advance as f32;
        }
        Ok(units / loaded.units_per_em * size)
    }

    fn ascender_ratio(&self, font: FontId) -> f32 {
        self.face(font).ascender_ratio
    }

    fn line_height_ratio(&self, font: FontId) -> f32 {
        self.face(font).line_h_ratio
    }

    fn program(&self, font: FontId) -> FontProgram<'_> {
        let face = self.face(font);
        FontProgram::TrueType {
            name: &face.name,
            data: &face.data,
            face_index: face.face_index,
        }
    }
}

/// Map a single Unicode char to its WinAnsi byte, or 0 if unmappable.
pub(crate) fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007E => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => 0,
    }
}

/// Convert a UTF-8 string to WinAnsi (Windows-1252) bytes for PDF Str encoding.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .map(char_to_winansi)
        .filter(|&b| b >= 32)
        .collect()
}

/// Encode UTF-8 text as big-endian 2-byte glyph IDs for CIDFont content streams.
pub(crate) fn encode_as_gids(text: &str, char_to_gid: &HashMap<char, u16>) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for ch in text.chars() {
        let gid = char_to_gid.get(&ch).copied().unwrap_or(0);
        out.push((gid >> 8) as u8);
        out.push((gid & 0xFF) as u8);
    }
    out
}

pub(crate) struct FontEntry {
    pub(crate) pdf_name: String,
    pub(crate) font_ref: Ref,
    /// Present for embedded fonts: text is written as subset glyph ids.
    pub(crate) char_to_gid: Option<HashMap<char, u16>>,
}

impl FontEntry {
    pub(crate) fn encode(&self, text: &str) -> Vec<u8> {
        match &self.char_to_gid {
            Some(map) => encode_as_gids(text, map),
            None => to_winansi_bytes(text),
        }
    }
}

/// Embed a TrueType/OpenType font as a CIDFont (Type0 composite) with Identity-H encoding.
/// The font data is subsetted to only include glyphs used in the document.
fn embed_truetype(
    pdf: &mut Pdf,
    font_ref: Ref,
    ps_name: &str,
    font_data: &[u8],
    face_index: u32,
    used_chars: &HashSet<char>,
    alloc: &mut impl FnMut() -> Ref,
) -> Option<HashMap<char, u16>> {
    let face = Face::parse(font_data, face_index).ok()?;

    let units = face.units_per_em() as f32;
    let to_1000 = |v: f32| v / units * 1000.0;
    let cap_height = face
        .capital_height()
        .map(|h| to_1000(h as f32))
        .unwrap_or(700.0);
    let bb = face.global_bounding_box();
    let bbox = Rect::new(
        to_1000(bb.x_min as f32),
        to_1000(bb.y_min as f32),
        to_1000(bb.x_max as f32),
        to_1000(bb.y_max as f32),
    );

    let mut remapper = subsetter::GlyphRemapper::new();
    let mut char_to_gid = HashMap::new();
    let mut gid_widths: Vec<(u16, f32)> = Vec::new();
    let mut chars: Vec<char> = used_chars.iter().copied().collect();
    chars.sort_unstable();
    for ch in chars {
        if let Some(gid) = face.glyph_index(ch) {
            let new_gid = remapper.remap(gid.0);
            char_to_gid.insert(ch, new_gid);
            let w = face
                .glyph_hor_advance(gid)
                .map(|adv| to_1000(adv as f32))
                .unwrap_or(0.0);
            gid_widths.push((new_gid, w));
        }
    }
    gid_widths.sort_by_key(|&(gid, _)| gid);
    gid_widths.dedup_by_key(|&mut (gid, _)| gid);

    let subset_data = subsetter::subset(font_data, face_index, &remapper).unwrap_or_else(|e| {
        log::warn!("Font subsetting failed for {ps_name}: {e}, embedding full font");
        font_data.to_vec()
    });

    let descriptor_ref = alloc();
    let data_ref = alloc();
    let cid_font_ref = alloc();
    let tounicode_ref = alloc();

    let data_len = i32::try_from(subset_data.len()).ok()?;
    pdf.stream(data_ref, &subset_data)
        .pair(Name(b"Length1"), data_len);

    pdf.font_descriptor(descriptor_ref)
        .name(Name(ps_name.as_bytes()))
        .flags(pdf_writer::types::FontFlags::NON_SYMBOLIC)
        .bbox(bbox)
        .italic_angle(0.0)
        .ascent(to_1000(face.ascender() as f32))
        .descent(to_1000(face.descender() as f32))
        .cap_height(cap_height)
        .stem_v(80.0)
        .font_file2(data_ref);

    let system_info = || pdf_writer::types::SystemInfo {
        registry: pdf_writer::Str(b"Adobe"),
        ordering: pdf_writer::Str(b"Identity"),
        supplement: 0,
    };
    {
        let mut cid = pdf.cid_font(cid_font_ref);
        cid.subtype(pdf_writer::types::CidFontType::Type2);
        cid.base_font(Name(ps_name.as_bytes()));
        cid.system_info(system_info());
        cid.font_descriptor(descriptor_ref);
        cid.default_width(0.0);
        cid.cid_to_gid_map_predefined(Name(b"Identity"));
        if !gid_widths.is_empty() {
            let mut w = cid.widths();
            for &(gid, width) in &gid_widths {
                w.consecutive(gid, [width]);
            }
        }
    }

    let cmap_name = format!("{ps_name}-UTF16");
    let mut cmap = pdf_writer::types::UnicodeCmap::new(Name(cmap_name.as_bytes()), system_info());
    for (&ch, &new_gid) in &char_to_gid {
        cmap.pair(new_gid, ch);
    }
    let cmap_data = cmap.finish();
    pdf.stream(tounicode_ref, cmap_data.as_slice());

    pdf.type0_font(font_ref)
        .base_font(Name(ps_name.as_bytes()))
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_font_ref)
        .to_unicode(tounicode_ref);

    Some(char_to_gid)
}

pub(crate) fn register_font(
    pdf: &mut Pdf,
    font: FontId,
    program: FontProgram<'_>,
    pdf_name: String,
    used_chars: &HashSet<char>,
    alloc: &mut impl FnMut() -> Ref,
) -> FontEntry {
    let t0 = std::time::Instant::now();
    let font_ref = alloc();

    let char_to_gid = match program {
        FontProgram::TrueType {
            name,
            data,
            face_index,
        } => {
            let embedded =
                embed_truetype(pdf, font_ref, name, data, face_index, used_chars, alloc);
            if embedded.is_none() {
                let base = font.standard_base_font();
                log::warn!(
                    "Embedding {name} failed, falling back to {base}; text was measured with \
                     {name} and may not fit its boxes"
                );
                write_standard_font(pdf, font_ref, base);
            }
            embedded
        }
        FontProgram::Standard(base) => {
            write_standard_font(pdf, font_ref, base);
            None
        }
    };

    log::debug!(
        "register_font: {pdf_name} embedded={} chars={} → {:.1}ms",
        char_to_gid.is_some(),
        used_chars.len(),
        t0.elapsed().as_secs_f64() * 1000.0,
    );

    FontEntry {
        pdf_name,
        font_ref,
        char_to_gid,
    }
}

fn write_standard_font(pdf: &mut Pdf, font_ref: Ref, base: &str) {
    pdf.type1_font(font_ref)
        .base_font(Name(base.as_bytes()))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
}
