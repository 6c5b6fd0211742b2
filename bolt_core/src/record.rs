//! # Persistent Record
//!
//! The JSON document written when a configuration is saved. Key names and
//! order are fixed so files stay interchangeable with existing
//! `bin_config.json` files:
//!
//! ```text
//! {
//!     "name": "Jane Doe",
//!     "phone": "555-123-4567",
//!     "bin_size": "56",
//!     "material": "Grade 5 Zinc",
//!     "bin_data": [
//!         { "diameter": "1/4", "lengths": ["1/2", "3/4"], "items": ["Nut"] }
//!     ]
//! }
//! ```
//!
//! Output is indented with four spaces and non-ASCII characters are written
//! as `\uXXXX` escapes, the same bytes Python's `json.dump(indent=4)` writes.

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::ser::{Formatter, PrettyFormatter};

use crate::catalog::BinSize;
use crate::errors::{LayoutError, LayoutResult};

/// Serializable snapshot of a layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistentRecord {
    pub name: String,
    pub phone: String,
    pub bin_size: BinSize,
    pub material: String,
    pub bin_data: Vec<RowRecord>,
}

/// One diameter row as saved on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRecord {
    pub diameter: String,
    #[serde(default)]
    pub lengths: Vec<String>,
    #[serde(default)]
    pub items: Vec<String>,
}

impl PersistentRecord {
    /// Serialize with four-space indentation.
    pub fn to_json(&self) -> LayoutResult<String> {
        let mut buf = Vec::new();
        let formatter = AsciiFormatter(PrettyFormatter::with_indent(b"    "));
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer).map_err(LayoutError::serialization)?;
        String::from_utf8(buf).map_err(LayoutError::serialization)
    }

    pub fn from_json(json: &str) -> LayoutResult<Self> {
        serde_json::from_str(json).map_err(LayoutError::serialization)
    }
}

/// Pretty formatter that escapes every non-ASCII character as `\uXXXX`
/// (UTF-16 surrogate pairs above the BMP).
struct AsciiFormatter<'a>(PrettyFormatter<'a>);

impl Formatter for AsciiFormatter<'_> {
    fn write_string_fragment<W: ?Sized + io::Write>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()> {
        let mut start = 0;
        for (index, c) in fragment.char_indices() {
            if c.is_ascii() {
                continue;
            }
            writer.write_all(fragment[start..index].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = index + c.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }

    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.0.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.0.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_value(writer)
    }
}
