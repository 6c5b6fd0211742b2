//! # Catalog
//!
//! Fixed vocabularies for bolt bins: the two bin sizes sold, the accessory
//! items a slot can hold, and the standard diameters, materials and stock
//! lengths offered at the counter.
//!
//! ## Example
//!
//! ```rust
//! use bolt_core::catalog::{BinSize, Item};
//!
//! assert_eq!(BinSize::Slots56.max_rows(), 7);
//! assert_eq!(BinSize::Slots72.max_rows(), 9);
//! assert_eq!("nylon locknut".parse::<Item>().unwrap(), Item::NylonLocknut);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{LayoutError, LayoutResult};
use crate::fraction::{self, Fraction};

/// Columns in every bin, regardless of size.
pub const COLUMN_COUNT: usize = 8;

/// Bin size in slots. Serializes as the slot count string ("56" / "72").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BinSize {
    /// 56 slots: 7 rows x 8 columns
    #[default]
    #[serde(rename = "56")]
    Slots56,
    /// 72 slots: 9 rows x 8 columns
    #[serde(rename = "72")]
    Slots72,
}

impl BinSize {
    pub const ALL: [BinSize; 2] = [BinSize::Slots56, BinSize::Slots72];

    /// Number of diameter rows the bin holds
    pub fn max_rows(&self) -> usize {
        match self {
            BinSize::Slots56 => 7,
            BinSize::Slots72 => 9,
        }
    }

    pub fn slot_count(&self) -> usize {
        self.max_rows() * COLUMN_COUNT
    }

    /// Wire value ("56" or "72")
    pub fn code(&self) -> &'static str {
        match self {
            BinSize::Slots56 => "56",
            BinSize::Slots72 => "72",
        }
    }
}

impl fmt::Display for BinSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for BinSize {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "56" => Ok(BinSize::Slots56),
            "72" => Ok(BinSize::Slots72),
            other => Err(LayoutError::invalid_input("bin_size", other, "Bin size must be 56 or 72")),
        }
    }
}

/// Accessory item that can occupy a slot.
///
/// Declaration order is the display order: items sort ahead of lengths in a
/// row and appear in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Item {
    Nut,
    Flatwasher,
    Lockwasher,
    Locknut,
    #[serde(rename = "Nylon Locknut")]
    NylonLocknut,
    /// Placeholder for a slot that is intentionally left empty
    Blank,
}

impl Item {
    /// All items in vocabulary order
    pub const ALL: [Item; 6] = [
        Item::Nut,
        Item::Flatwasher,
        Item::Lockwasher,
        Item::Locknut,
        Item::NylonLocknut,
        Item::Blank,
    ];

    /// Label used in cells and saved records
    pub fn label(&self) -> &'static str {
        match self {
            Item::Nut => "Nut",
            Item::Flatwasher => "Flatwasher",
            Item::Lockwasher => "Lockwasher",
            Item::Locknut => "Locknut",
            Item::NylonLocknut => "Nylon Locknut",
            Item::Blank => "Blank",
        }
    }

    /// Abbreviation for narrow printed cells
    pub fn short_code(&self) -> &'static str {
        match self {
            Item::Nut => "N",
            Item::Flatwasher => "F",
            Item::Lockwasher => "L",
            Item::Locknut => "LN",
            Item::NylonLocknut => "NL",
            Item::Blank => "",
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Item::Blank)
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Item {
    type Err = LayoutError;

    /// Case-insensitive; spaces, dashes and underscores are ignored, so
    /// "Nylon Locknut", "nylon-locknut" and "NYLONLOCKNUT" all match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        Item::ALL
            .iter()
            .copied()
            .find(|item| item.label().replace(' ', "").to_lowercase() == wanted)
            .ok_or_else(|| LayoutError::invalid_input("item", s, "Unknown item"))
    }
}

/// Diameters offered on the selection screen, smallest first
pub const STANDARD_DIAMETERS: [&str; 9] = ["1/4", "5/16", "3/8", "7/16", "1/2", "5/8", "3/4", "7/8", "1"];

/// Materials offered on the selection screen
pub const MATERIALS: [&str; 5] = [
    "Grade 5 Zinc",
    "Grade 5 Plain",
    "Grade 8 Yellow Zinc",
    "Grade 8 Plain",
    "Stainless Steel",
];

/// Stock lengths per diameter
const AVAILABLE_LENGTHS: [(&str, [&str; 12]); 9] = [
    ("1/4", ["3/8", "1/2", "3/4", "1", "1-1/4", "1-1/2", "2", "2-1/4", "2-1/2", "2-3/4", "3", "3-1/2"]),
    ("5/16", ["1/2", "3/4", "1", "1-1/4", "1-1/2", "2", "2-1/2", "2-3/4", "3", "3-1/4", "3-1/2", "4"]),
    ("3/8", ["1/2", "3/4", "1", "1-1/4", "1-1/2", "2", "2-1/2", "3", "3-1/2", "4", "4-1/2", "5"]),
    ("7/16", ["3/4", "1", "1-1/4", "1-1/2", "2", "2-1/2", "3", "3-1/2", "4", "4-1/2", "5", "5-1/2"]),
    ("1/2", ["1", "1-1/4", "1-1/2", "2", "2-1/2", "3", "4", "4-1/2", "5", "5-1/2", "6", "6-1/2"]),
    ("5/8", ["1", "1-1/2", "2", "2-1/2", "3", "4", "5", "5-1/2", "6", "6-1/2", "7", "7-1/2"]),
    ("3/4", ["1", "1-1/2", "2", "2-1/2", "3", "4", "5", "6", "6-1/2", "7", "7-1/2", "8"]),
    ("7/8", ["1-1/2", "2", "2-1/2", "3", "4", "5", "6", "6-1/2", "7", "7-1/2", "8", "8-1/2"]),
    ("1", ["2", "2-1/2", "3", "4", "5", "6", "8", "8-1/2", "9", "9-1/2", "10", "10-1/2"]),
];

/// UNC coarse threads per inch
const COARSE_THREAD_PITCH: [(&str, u32); 9] = [
    ("1/4", 20),
    ("5/16", 18),
    ("3/8", 16),
    ("7/16", 14),
    ("1/2", 13),
    ("5/8", 11),
    ("3/4", 10),
    ("7/8", 9),
    ("1", 8),
];

fn matches_diameter(label: &str, diameter: Fraction) -> bool {
    fraction::parse(label)
        .map(|d| d.approx_eq(diameter))
        .unwrap_or(false)
}

/// Stock lengths for a standard diameter; empty for anything else.
///
/// # Example
///
/// ```rust
/// use bolt_core::catalog::available_lengths;
/// use bolt_core::fraction::parse;
///
/// let lengths = available_lengths(parse("1/4").unwrap());
/// assert_eq!(lengths.first(), Some(&"3/8"));
/// assert!(available_lengths(parse("9/16").unwrap()).is_empty());
/// ```
pub fn available_lengths(diameter: Fraction) -> &'static [&'static str] {
    AVAILABLE_LENGTHS
        .iter()
        .find(|(label, _)| matches_diameter(label, diameter))
        .map(|(_, lengths)| lengths.as_slice())
        .unwrap_or(&[])
}

/// Coarse thread pitch (TPI) for a standard diameter
pub fn thread_pitch(diameter: Fraction) -> Option<u32> {
    COARSE_THREAD_PITCH
        .iter()
        .find(|(label, _)| matches_diameter(label, diameter))
        .map(|(_, tpi)| *tpi)
}

/// Standard diameters as parsed values
pub fn standard_diameters() -> LayoutResult<Vec<Fraction>> {
    STANDARD_DIAMETERS.iter().map(|d| fraction::parse(d)).collect()
}
