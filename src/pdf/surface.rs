//! Page arena for one document build.
//!
//! Coordinates are top-down: `y = 0` is the top edge of the page and grows
//! towards the bottom. The PDF writer flips them into PDF user space.

use crate::config::PageGeometry;
use crate::fonts::FontId;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color(pub [u8; 3]);

impl Color {
    pub const BLACK: Color = Color([0, 0, 0]);
    pub const DARK_GRAY: Color = Color([64, 64, 64]);
    pub const MID_GRAY: Color = Color([128, 128, 128]);
    pub const RULE: Color = Color([190, 190, 190]);
    pub const HEADER_FILL: Color = Color([226, 230, 236]);
    pub const ROW_FILL: Color = Color([244, 245, 247]);

    pub(crate) fn rgb(self) -> (f32, f32, f32) {
        let [r, g, b] = self.0;
        (r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }
}

/// Font, size and color for a piece of text, passed with every text command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub font: FontId,
    pub size: f32,
    pub color: Color,
}

impl TextStyle {
    pub const fn new(font: FontId, size: f32) -> Self {
        TextStyle {
            font,
            size,
            color: Color::BLACK,
        }
    }

    pub const fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// `baseline` is the top-down y of the text baseline.
    Text {
        x: f32,
        baseline: f32,
        text: String,
        style: TextStyle,
    },
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: Color,
    },
    /// The document logo, scaled into the given box.
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

impl DrawCommand {
    pub fn text(&self) -> Option<&str> {
        match self {
            DrawCommand::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Top and bottom extent (top-down y) of the command's bounding box.
    /// Text uses a nominal 0.75/0.25 ascent/descent split of the font size.
    pub fn vertical_extent(&self) -> (f32, f32) {
        match *self {
            DrawCommand::Text {
                baseline, style, ..
            } => (baseline - 0.75 * style.size, baseline + 0.25 * style.size),
            DrawCommand::FillRect { y, height, .. } | DrawCommand::Image { y, height, .. } => {
                (y, y + height)
            }
            DrawCommand::Line { y1, y2, .. } => (y1.min(y2), y1.max(y2)),
        }
    }
}

/// Footer written by the finalizer once the page count is known.
#[derive(Clone, Debug, PartialEq)]
pub struct FooterStamp {
    pub page_label: String,
    pub notice: String,
    /// Commands drawing the two lines inside the footer band.
    pub commands: Vec<DrawCommand>,
}

#[derive(Clone, Debug)]
pub struct Page {
    pub index: usize,
    pub commands: Vec<DrawCommand>,
    pub(crate) footer: Option<FooterStamp>,
}

impl Page {
    fn new(index: usize) -> Self {
        Page {
            index,
            commands: Vec::new(),
            footer: None,
        }
    }

    pub fn footer(&self) -> Option<&FooterStamp> {
        self.footer.as_ref()
    }

    /// Body commands followed by the footer stamp, in drawing order.
    pub fn all_commands(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .chain(self.footer.iter().flat_map(|f| f.commands.iter()))
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(DrawCommand::text)
    }
}

/// Pass-one page list. Pages are only appended, never reordered or removed.
#[derive(Clone, Debug)]
pub struct Surface {
    geometry: PageGeometry,
    pages: Vec<Page>,
}

impl Surface {
    pub fn new(geometry: PageGeometry) -> Self {
        Surface {
            geometry,
            pages: vec![Page::new(0)],
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub(crate) fn push_page(&mut self) -> usize {
        let index = self.pages.len();
        self.pages.push(Page::new(index));
        index
    }

    pub(crate) fn draw(&mut self, page_index: usize, command: DrawCommand) {
        self.pages[page_index].commands.push(command);
    }

    pub(crate) fn into_pages(self) -> (PageGeometry, Vec<Page>) {
        (self.geometry, self.pages)
    }
}

/// A finalized document: every page carries exactly one footer stamp.
#[derive(Clone, Debug)]
pub struct FinishedDocument {
    pub(crate) geometry: PageGeometry,
    pub(crate) pages: Vec<Page>,
    pub(crate) title: String,
}

impl FinishedDocument {
    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}
