//! # bolt_core - Bolt Bin Layout Engine
//!
//! `bolt_core` models the configuration of a hardware-store bolt bin: a fixed
//! grid of slots where each row holds one bolt diameter and each slot holds a
//! bolt length or an accessory (nut, washer, ...). Every type is
//! JSON-serializable so layouts can be saved, reloaded, and exported.
//!
//! ## Design Philosophy
//!
//! - **Explicit state**: The layout is a plain value the caller owns
//! - **No partial updates**: An operation either applies fully or returns an error
//! - **Rich Errors**: Structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use bolt_core::catalog::{BinSize, Item};
//! use bolt_core::fraction::parse;
//! use bolt_core::layout::BinLayoutModel;
//!
//! let mut model = BinLayoutModel::new(BinSize::Slots56, "Grade 5 Zinc");
//! model.add_or_update_row(parse("3/8").unwrap(), &[parse("1").unwrap()], &[Item::Nut]).unwrap();
//!
//! let json = model.to_persistent_record().to_json().unwrap();
//! assert!(json.contains("\"bin_size\": \"56\""));
//! ```
//!
//! ## Modules
//!
//! - [`fraction`] - Parse and format imperial fractions (`1-1/2`, `3/8`)
//! - [`layout`] - The bin layout model, capacity rules, and undo
//! - [`grid`] - Rendered `rows x 8` cell matrix
//! - [`catalog`] - Bin sizes, item vocabulary, stock sizes and materials
//! - [`customer`] - Customer name and phone validation
//! - [`record`] - The saved JSON document
//! - [`file_io`] - File operations with atomic saves and locking
//! - [`pdf`] - Printable layout report
//! - [`settings`] - TOML settings
//! - [`errors`] - Structured error types

pub mod catalog;
pub mod customer;
pub mod errors;
pub mod file_io;
pub mod fraction;
pub mod grid;
pub mod layout;
pub mod pdf;
pub mod record;
pub mod settings;

// Re-export commonly used types at crate root for convenience
pub use catalog::{BinSize, Item};
pub use errors::{LayoutError, LayoutResult};
pub use file_io::{load_layout, save_layout};
pub use fraction::{Fraction, FormattedFraction};
pub use layout::{BinLayoutModel, RowLimits};
pub use record::PersistentRecord;
pub use settings::Settings;
