//! # PDF Generation Module
//!
//! Renders a bin layout to a printable PDF using Typst.
//!
//! ## Architecture
//!
//! - The Typst template is embedded as a string constant
//! - Data is injected via `{{PLACEHOLDER}}` replacement before compilation
//! - User text goes in as Typst string literals, never as markup
//! - Output is raw PDF bytes (`Vec<u8>`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use bolt_core::catalog::{BinSize, Item};
//! use bolt_core::fraction::parse;
//! use bolt_core::layout::BinLayoutModel;
//! use bolt_core::pdf::render_layout_pdf;
//!
//! let mut model = BinLayoutModel::new(BinSize::Slots56, "Grade 5 Zinc");
//! model.add_or_update_row(parse("1/4").unwrap(), &[parse("1/2").unwrap()], &[Item::Nut]).unwrap();
//!
//! let pdf_bytes = render_layout_pdf(&model).unwrap();
//! std::fs::write("bolt_bin.pdf", pdf_bytes).unwrap();
//! ```

use chrono::{Datelike, Local};
use once_cell::sync::Lazy;
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use crate::catalog::{Item, COLUMN_COUNT};
use crate::errors::{LayoutError, LayoutResult};
use crate::fraction;
use crate::layout::{BinLayoutModel, BinRow};

// ============================================================================
// Typst World Implementation
// ============================================================================

/// Fonts bundled with typst-assets, parsed once per process
static FONTS: Lazy<Vec<Font>> = Lazy::new(|| {
    typst_assets::fonts()
        .flat_map(|data| Font::iter(Bytes::new(data)))
        .collect()
});

/// A minimal Typst world for compiling documents without external files.
struct PdfWorld {
    main: Source,
    book: LazyHash<FontBook>,
    fonts: Vec<Font>,
    library: LazyHash<Library>,
}

impl PdfWorld {
    fn new(source: String) -> Self {
        let fonts = FONTS.clone();
        let book = FontBook::from_fonts(&fonts);

        PdfWorld {
            main: Source::detached(source),
            book: LazyHash::new(book),
            fonts,
            library: LazyHash::new(Library::default()),
        }
    }
}

impl World for PdfWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let now = Local::now();
        Datetime::from_ymd(now.year(), now.month() as u8, now.day() as u8)
    }
}

// ============================================================================
// PDF Template
// ============================================================================

const LAYOUT_TEMPLATE: &str = r##"
#set page(
  paper: "us-letter",
  margin: (top: 0.75in, bottom: 0.75in, left: 0.75in, right: 0.75in),
  footer: context [
    #line(length: 100%, stroke: 0.5pt + gray)
    #v(4pt)
    #grid(
      columns: (1fr, 1fr),
      align(left)[#text(size: 9pt)[{{DATE}}]],
      align(right)[#text(size: 9pt)[Page #counter(page).display()]],
    )
  ]
)

#set text(font: "Libertinus Serif", size: 11pt)

#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 12pt, radius: 4pt)[
    #text(size: 18pt, weight: "bold")[Bolt Bin Layout]
  ]
]

#v(12pt)

#table(
  columns: (auto, 1fr),
  stroke: none,
  row-gutter: 4pt,
  [*Customer:*], [#{{NAME}}],
  [*Phone:*], [#{{PHONE}}],
  [*Bin Size:*], [#{{BIN_SIZE}}],
  [*Material:*], [#{{MATERIAL}}],
)

#v(8pt)
#line(length: 100%, stroke: 0.5pt)
#v(8pt)

== Rows

{{SUMMARIES}}

#v(12pt)

== Bin Layout

#set text(font: "DejaVu Sans Mono", size: 9pt)
#table(
  columns: (auto,) + ({{COLUMN_COUNT}} * (1fr,)),
  inset: 6pt,
  stroke: 0.5pt,
  align: center + horizon,
{{GRID_ROWS}}
)
"##;

// ============================================================================
// PDF Rendering Functions
// ============================================================================

/// Render a bin layout to PDF.
///
/// The report lists the customer, bin size and material, one summary line per
/// diameter row, and a `max_rows x 8` table with the diameter down the left
/// edge. Items appear as short codes (`N`, `F`, `LN`, ...); `Blank` slots are
/// left empty.
///
/// Returns `LayoutError::InvalidInput` when the layout has no rows.
pub fn render_layout_pdf(model: &BinLayoutModel) -> LayoutResult<Vec<u8>> {
    if model.is_empty() {
        return Err(LayoutError::invalid_input(
            "rows",
            "empty",
            "No bolts or items to export",
        ));
    }

    let summaries = model
        .row_summaries()
        .iter()
        .map(|line| format!("- #{}", typst_str(line)))
        .collect::<Vec<_>>()
        .join("\n");

    let source = LAYOUT_TEMPLATE
        .replace("{{DATE}}", &Local::now().format("%Y-%m-%d").to_string())
        .replace("{{NAME}}", &typst_str(&model.customer().name))
        .replace("{{PHONE}}", &typst_str(&model.customer().phone))
        .replace("{{BIN_SIZE}}", &typst_str(&format!("{} slots", model.bin_size())))
        .replace("{{MATERIAL}}", &typst_str(model.material()))
        .replace("{{SUMMARIES}}", &summaries)
        .replace("{{COLUMN_COUNT}}", &COLUMN_COUNT.to_string())
        .replace("{{GRID_ROWS}}", &build_grid_rows(model));

    compile_pdf(source)
}

fn compile_pdf(source: String) -> LayoutResult<Vec<u8>> {
    let world = PdfWorld::new(source);
    let warned = typst::compile(&world);

    let document = warned.output.map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        LayoutError::RenderError {
            reason: format!("Typst compilation failed: {}", error_msgs.join("; ")),
        }
    })?;

    typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        LayoutError::RenderError {
            reason: format!("PDF rendering failed: {}", error_msgs.join("; ")),
        }
    })
}

/// Quote `s` as a Typst string literal
fn typst_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Printed cells for one row: item short codes, then lengths
fn printed_cells(row: &BinRow, max_denominator: u32) -> Vec<String> {
    let mut cells: Vec<String> = row
        .items()
        .iter()
        .map(|item| match item {
            Item::Blank => String::new(),
            other => other.short_code().to_string(),
        })
        .chain(
            row.lengths()
                .iter()
                .map(|l| fraction::format_with_bound(*l, max_denominator).into_string()),
        )
        .collect();
    cells.resize(COLUMN_COUNT, String::new());
    cells
}

/// Table body: one line per bin row, diameter label first
fn build_grid_rows(model: &BinLayoutModel) -> String {
    let max_denominator = model.max_denominator();
    (0..model.max_rows())
        .map(|index| {
            let (label, cells) = match model.rows().get(index) {
                Some(row) => (
                    format!("{}\"", fraction::format_with_bound(row.diameter(), max_denominator).text()),
                    printed_cells(row, max_denominator),
                ),
                None => (String::new(), vec![String::new(); COLUMN_COUNT]),
            };
            let body = std::iter::once(label)
                .chain(cells)
                .map(|cell| format!("[#{}]", typst_str(&cell)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("  {},", body)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
