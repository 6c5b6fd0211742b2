//! # Bin Layout Model
//!
//! The configuration of one bin: its size, material, customer, and an ordered
//! set of diameter rows. Each row holds accessory items and bolt lengths, one
//! per slot.
//!
//! ## Structure
//!
//! ```text
//! BinLayoutModel
//! ├── bin_size / material / customer
//! ├── limits: RowLimits (per-row bounds)
//! ├── rows: Vec<BinRow>       sorted by ascending diameter
//! └── history: Vec<Contribution>  append-only, drives undo
//! ```
//!
//! ## Example
//!
//! ```rust
//! use bolt_core::catalog::{BinSize, Item};
//! use bolt_core::fraction::parse;
//! use bolt_core::layout::BinLayoutModel;
//!
//! let mut model = BinLayoutModel::new(BinSize::Slots56, "Grade 5 Zinc");
//! let quarter = parse("1/4").unwrap();
//! let lengths = [parse("1/2").unwrap(), parse("3/4").unwrap()];
//! model.add_or_update_row(quarter, &lengths, &[Item::Nut]).unwrap();
//!
//! let grid = model.render_grid();
//! assert_eq!(grid.row(0).unwrap()[..3], ["1/4 x Nut", "1/4 x 1/2", "1/4 x 3/4"]);
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::{BinSize, Item, COLUMN_COUNT};
use crate::customer::Customer;
use crate::errors::{LayoutError, LayoutResult};
use crate::fraction::{self, Fraction, DEFAULT_MAX_DENOMINATOR};
use crate::grid::BinGrid;
use crate::record::{PersistentRecord, RowRecord};

/// Per-row bounds on lengths and items.
///
/// The joint bound `lengths + items <= COLUMN_COUNT` always applies; these
/// narrow it further, e.g. `4 + 4` for the touch-screen counter layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowLimits {
    pub max_lengths: usize,
    pub max_items: usize,
}

impl Default for RowLimits {
    fn default() -> Self {
        RowLimits {
            max_lengths: COLUMN_COUNT,
            max_items: COLUMN_COUNT,
        }
    }
}

impl RowLimits {
    pub fn validate(&self) -> LayoutResult<()> {
        for (field, value) in [("max_lengths", self.max_lengths), ("max_items", self.max_items)] {
            if value == 0 || value > COLUMN_COUNT {
                return Err(LayoutError::invalid_input(
                    field,
                    value.to_string(),
                    format!("Must be between 1 and {}", COLUMN_COUNT),
                ));
            }
        }
        Ok(())
    }
}

/// A single slot value: a bolt length or an accessory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Entry {
    Length(Fraction),
    Item(Item),
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Length(length) => write!(f, "{}", length),
            Entry::Item(item) => write!(f, "{}", item),
        }
    }
}

/// One undoable addition: `entry` was added to the row for `diameter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub diameter: Fraction,
    pub entry: Entry,
}

/// One diameter row of the bin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinRow {
    diameter: Fraction,
    /// Ascending, no two within tolerance of each other
    lengths: Vec<Fraction>,
    items: BTreeSet<Item>,
}

impl BinRow {
    fn new(diameter: Fraction) -> Self {
        BinRow {
            diameter,
            lengths: Vec::new(),
            items: BTreeSet::new(),
        }
    }

    pub fn diameter(&self) -> Fraction {
        self.diameter
    }

    pub fn lengths(&self) -> &[Fraction] {
        &self.lengths
    }

    pub fn items(&self) -> &BTreeSet<Item> {
        &self.items
    }

    /// Occupied slots
    pub fn len(&self) -> usize {
        self.lengths.len() + self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty() && self.items.is_empty()
    }

    pub fn contains_length(&self, length: Fraction) -> bool {
        self.lengths.iter().any(|l| l.approx_eq(length))
    }

    /// Slot contents left to right: items in vocabulary order, then lengths
    /// ascending.
    pub fn entries(&self) -> Vec<Entry> {
        self.items
            .iter()
            .copied()
            .map(Entry::Item)
            .chain(self.lengths.iter().copied().map(Entry::Length))
            .collect()
    }

    /// Cell labels (`"{diameter} x {entry}"`) for the occupied slots
    pub fn cell_labels(&self, max_denominator: u32) -> Vec<String> {
        let diameter = fraction::format_with_bound(self.diameter, max_denominator).into_string();
        self.entries()
            .into_iter()
            .map(|entry| format!("{} x {}", diameter, entry_text(entry, max_denominator)))
            .collect()
    }

    /// One-line description, e.g. `1/4" (Nut, 1/2, 3/4)`
    pub fn summary(&self, max_denominator: u32) -> String {
        let contents: Vec<String> = self
            .entries()
            .into_iter()
            .map(|entry| entry_text(entry, max_denominator))
            .collect();
        format!(
            "{}\" ({})",
            fraction::format_with_bound(self.diameter, max_denominator).text(),
            contents.join(", ")
        )
    }

    fn insert_length(&mut self, length: Fraction) -> bool {
        if self.contains_length(length) {
            return false;
        }
        let position = self.lengths.partition_point(|l| *l < length);
        self.lengths.insert(position, length);
        true
    }

    fn extend(&mut self, items: &BTreeSet<Item>, lengths: &[Fraction]) {
        self.items.extend(items.iter().copied());
        for length in lengths {
            self.insert_length(*length);
        }
    }

    fn remove_entry(&mut self, entry: Entry) -> bool {
        match entry {
            Entry::Item(item) => self.items.remove(&item),
            Entry::Length(length) => match self.lengths.iter().position(|l| l.approx_eq(length)) {
                Some(index) => {
                    self.lengths.remove(index);
                    true
                }
                None => false,
            },
        }
    }
}

fn entry_text(entry: Entry, max_denominator: u32) -> String {
    match entry {
        Entry::Length(length) => fraction::format_with_bound(length, max_denominator).into_string(),
        Entry::Item(item) => item.label().to_string(),
    }
}

/// The bin being configured.
///
/// Owned by the front end and passed by reference to whatever handles user
/// input; there is no global session state.
#[derive(Debug, Clone)]
pub struct BinLayoutModel {
    bin_size: BinSize,
    material: String,
    customer: Customer,
    limits: RowLimits,
    max_denominator: u32,
    rows: Vec<BinRow>,
    history: Vec<Contribution>,
}

impl BinLayoutModel {
    /// Create an empty layout.
    pub fn new(bin_size: BinSize, material: impl Into<String>) -> Self {
        BinLayoutModel {
            bin_size,
            material: material.into(),
            customer: Customer::default(),
            limits: RowLimits::default(),
            max_denominator: DEFAULT_MAX_DENOMINATOR,
            rows: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Use narrower per-row bounds. Existing rows are not re-checked, so set
    /// this before adding rows.
    pub fn with_limits(mut self, limits: RowLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Largest denominator used when labelling cells
    pub fn with_max_denominator(mut self, max_denominator: u32) -> Self {
        self.max_denominator = max_denominator;
        self
    }

    pub fn with_customer(mut self, customer: Customer) -> Self {
        self.customer = customer;
        self
    }

    pub fn set_customer(&mut self, customer: Customer) {
        self.customer = customer;
    }

    pub fn bin_size(&self) -> BinSize {
        self.bin_size
    }

    pub fn max_rows(&self) -> usize {
        self.bin_size.max_rows()
    }

    pub fn material(&self) -> &str {
        &self.material
    }

    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    pub fn limits(&self) -> RowLimits {
        self.limits
    }

    pub fn max_denominator(&self) -> u32 {
        self.max_denominator
    }

    pub fn rows(&self) -> &[BinRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Additions in the order they were made, oldest first
    pub fn history(&self) -> &[Contribution] {
        &self.history
    }

    /// Find the row for `diameter` (within tolerance)
    pub fn row_for(&self, diameter: Fraction) -> Option<&BinRow> {
        self.rows.iter().find(|row| row.diameter.approx_eq(diameter))
    }

    /// Change the bin size. Any existing configuration is discarded.
    pub fn select_bin_size(&mut self, bin_size: BinSize) {
        if !self.rows.is_empty() {
            info!(from = %self.bin_size, to = %bin_size, rows = self.rows.len(), "bin size changed, clearing layout");
            self.clear();
        }
        self.bin_size = bin_size;
    }

    /// Change the material. Any existing configuration is discarded.
    pub fn select_material(&mut self, material: impl Into<String>) {
        let material = material.into();
        if !self.rows.is_empty() {
            info!(from = %self.material, to = %material, rows = self.rows.len(), "material changed, clearing layout");
            self.clear();
        }
        self.material = material;
    }

    /// Remove every row and forget the undo history.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.history.clear();
    }

    /// Add lengths and items to the row for `diameter`, creating the row if
    /// needed.
    ///
    /// Values already present are ignored. On any error the model is left
    /// unchanged.
    ///
    /// # Errors
    ///
    /// * `CapacityExceeded` - the row would hold more than 8 entries, or more
    ///   lengths/items than [`RowLimits`] allows
    /// * `RowLimitExceeded` - new diameter but the bin already has `max_rows` rows
    /// * `InvalidInput` - zero diameter or length, or a new row with nothing in it
    pub fn add_or_update_row(
        &mut self,
        diameter: Fraction,
        lengths_to_add: &[Fraction],
        items_to_add: &[Item],
    ) -> LayoutResult<()> {
        if diameter.is_zero() {
            return Err(LayoutError::invalid_input("diameter", diameter.to_string(), "Diameter must be greater than zero"));
        }
        if let Some(zero) = lengths_to_add.iter().find(|l| l.is_zero()) {
            return Err(LayoutError::invalid_input("length", zero.to_string(), "Length must be greater than zero"));
        }

        let position = self.rows.iter().position(|row| row.diameter.approx_eq(diameter));
        if position.is_none() && self.rows.len() >= self.max_rows() {
            return Err(LayoutError::RowLimitExceeded {
                max_rows: self.max_rows(),
            });
        }
        let existing = position.map(|index| &self.rows[index]);

        let new_items: BTreeSet<Item> = items_to_add
            .iter()
            .copied()
            .filter(|item| existing.map_or(true, |row| !row.items.contains(item)))
            .collect();

        let mut new_lengths: Vec<Fraction> = Vec::new();
        for &length in lengths_to_add {
            let present = existing.map_or(false, |row| row.contains_length(length));
            if !present && !new_lengths.iter().any(|l| l.approx_eq(length)) {
                new_lengths.push(length);
            }
        }
        new_lengths.sort();

        if new_lengths.is_empty() && new_items.is_empty() {
            if position.is_none() {
                return Err(LayoutError::invalid_input(
                    "selection",
                    diameter.to_string(),
                    "Select at least one length or item",
                ));
            }
            debug!(diameter = %diameter, "nothing new to add");
            return Ok(());
        }

        let (current_lengths, current_items) = existing.map_or((0, 0), |row| (row.lengths.len(), row.items.len()));
        let total = current_lengths + current_items + new_lengths.len() + new_items.len();
        let over = |requested: usize, capacity: usize| LayoutError::CapacityExceeded {
            diameter: diameter.to_string(),
            requested,
            capacity,
        };
        if total > COLUMN_COUNT {
            return Err(over(total, COLUMN_COUNT));
        }
        if current_lengths + new_lengths.len() > self.limits.max_lengths {
            return Err(over(current_lengths + new_lengths.len(), self.limits.max_lengths));
        }
        if current_items + new_items.len() > self.limits.max_items {
            return Err(over(current_items + new_items.len(), self.limits.max_items));
        }

        let row_diameter = match position {
            Some(index) => {
                let row = &mut self.rows[index];
                row.extend(&new_items, &new_lengths);
                row.diameter
            }
            None => {
                let mut row = BinRow::new(diameter);
                row.extend(&new_items, &new_lengths);
                self.rows.push(row);
                diameter
            }
        };

        let added = new_items
            .iter()
            .copied()
            .map(Entry::Item)
            .chain(new_lengths.iter().copied().map(Entry::Length));
        for entry in added {
            debug!(diameter = %row_diameter, entry = %entry, "added to history");
            self.history.push(Contribution {
                diameter: row_diameter,
                entry,
            });
        }

        if position.is_none() {
            self.rows.sort_by(|a, b| a.diameter.cmp(&b.diameter));
        }
        Ok(())
    }

    /// Reserve a slot in the row for `diameter` without putting anything in it.
    pub fn add_blank(&mut self, diameter: Fraction) -> LayoutResult<()> {
        self.add_or_update_row(diameter, &[], &[Item::Blank])
    }

    /// Undo the most recent single addition anywhere in the bin.
    ///
    /// A row left with no lengths and no items is removed.
    pub fn remove_last_contribution(&mut self) -> LayoutResult<Contribution> {
        let contribution = self.history.pop().ok_or(LayoutError::NothingToUndo)?;

        match self.rows.iter().position(|row| row.diameter.approx_eq(contribution.diameter)) {
            Some(index) => {
                let row = &mut self.rows[index];
                if !row.remove_entry(contribution.entry) {
                    warn!(diameter = %contribution.diameter, entry = %contribution.entry, "undo target missing from row");
                }
                if row.is_empty() {
                    self.rows.remove(index);
                    debug!(diameter = %contribution.diameter, "removed empty row");
                }
            }
            None => warn!(diameter = %contribution.diameter, "undo target row missing"),
        }

        debug!(diameter = %contribution.diameter, entry = %contribution.entry, "undid addition");
        Ok(contribution)
    }

    /// Render exactly `max_rows x 8` cells.
    ///
    /// Row `r` shows the `r`-th smallest diameter; cells past the row's
    /// entries, and rows past the configured diameters, are empty strings.
    pub fn render_grid(&self) -> BinGrid {
        let rows = (0..self.max_rows())
            .map(|index| match self.rows.get(index) {
                Some(row) => row.cell_labels(self.max_denominator),
                None => Vec::new(),
            })
            .collect();
        BinGrid::from_rows(rows)
    }

    /// Per-row summaries, e.g. `Row 1: 1/4" (Nut, 1/2, 3/4)`
    pub fn row_summaries(&self) -> Vec<String> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| format!("Row {}: {}", i + 1, row.summary(self.max_denominator)))
            .collect()
    }

    /// Snapshot for saving to disk.
    ///
    /// Sizes are written so they parse back to the same value; a size with no
    /// fraction within `max_denominator` is saved in a finer form rather than
    /// the rounded screen label.
    pub fn to_persistent_record(&self) -> PersistentRecord {
        PersistentRecord {
            name: self.customer.name.clone(),
            phone: self.customer.phone.clone(),
            bin_size: self.bin_size,
            material: self.material.clone(),
            bin_data: self
                .rows
                .iter()
                .map(|row| RowRecord {
                    diameter: fraction::to_lossless_string(row.diameter, self.max_denominator),
                    lengths: row
                        .lengths
                        .iter()
                        .map(|l| fraction::to_lossless_string(*l, self.max_denominator))
                        .collect(),
                    items: row.items.iter().map(|i| i.label().to_string()).collect(),
                })
                .collect(),
        }
    }

    /// Rebuild a model from a saved record.
    ///
    /// Rows are replayed through [`add_or_update_row`](Self::add_or_update_row),
    /// so a file that breaks the capacity rules is rejected. Rows with no
    /// lengths and no items are skipped.
    pub fn from_persistent_record(record: &PersistentRecord, limits: RowLimits) -> LayoutResult<Self> {
        limits.validate()?;
        let customer = Customer {
            name: record.name.clone(),
            phone: record.phone.clone(),
        };
        let mut model = BinLayoutModel::new(record.bin_size, record.material.clone())
            .with_limits(limits)
            .with_customer(customer);

        for row in &record.bin_data {
            let diameter = fraction::parse(&row.diameter)?;
            let lengths = row
                .lengths
                .iter()
                .map(|l| fraction::parse(l))
                .collect::<LayoutResult<Vec<_>>>()?;
            let items = row
                .items
                .iter()
                .map(|i| i.parse::<Item>())
                .collect::<LayoutResult<Vec<_>>>()?;
            if lengths.is_empty() && items.is_empty() {
                warn!(diameter = %row.diameter, "skipping empty row in record");
                continue;
            }
            model.add_or_update_row(diameter, &lengths, &items)?;
        }
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fraction::parse;

    fn f(text: &str) -> Fraction {
        parse(text).unwrap()
    }

    fn fs(texts: &[&str]) -> Vec<Fraction> {
        texts.iter().map(|t| f(t)).collect()
    }

    #[test]
    fn test_render_example_row() {
        let mut model = BinLayoutModel::new(BinSize::Slots56, "Grade 5 Zinc");
        model
            .add_or_update_row(f("1/4"), &fs(&["3/4", "1/2"]), &[Item::Nut])
            .unwrap();
        let grid = model.render_grid();
        assert_eq!(
            grid.row(0).unwrap(),
            ["1/4 x Nut", "1/4 x 1/2", "1/4 x 3/4", "", "", "", "", ""]
        );
    }

    #[test]
    fn test_grid_shape_and_empty_rows() {
        let mut model = BinLayoutModel::new(BinSize::Slots72, "Stainless Steel");
        assert_eq!(model.render_grid().row_count(), 9);
        model.add_or_update_row(f("3/8"), &fs(&["1"]), &[]).unwrap();
        let grid = model.render_grid();
        assert_eq!(grid.row_count(), 9);
        assert!(grid.cells().iter().all(|row| row.len() == COLUMN_COUNT));
        assert!(grid.cells()[1..].iter().flatten().all(String::is_empty));
    }

    #[test]
    fn test_rows_sorted_by_numeric_diameter() {
        let mut model = BinLayoutModel::new(BinSize::Slots72, "Grade 8 Plain");
        for d in ["1", "5/16", "1/4", "7/8", "3/8", "1/2"] {
            model.add_or_update_row(f(d), &fs(&["1"]), &[]).unwrap();
        }
        let diameters: Vec<String> = model.rows().iter().map(|r| r.diameter().to_string()).collect();
        assert_eq!(diameters, ["1/4", "5/16", "3/8", "1/2", "7/8", "1"]);

        let grid = model.render_grid();
        let firsts: Vec<&str> = grid.cells().iter().take(6).map(|row| row[0].as_str()).collect();
        assert_eq!(firsts, ["1/4 x 1", "5/16 x 1", "3/8 x 1", "1/2 x 1", "7/8 x 1", "1 x 1"]);
    }

    #[test]
    fn test_update_unions_and_dedupes() {
        let mut model = BinLayoutModel::new(BinSize::Slots56, "Grade 5 Zinc");
        model.add_or_update_row(f("1/4"), &fs(&["1/2", "1"]), &[Item::Nut]).unwrap();
        model
            .add_or_update_row(f("0.25"), &fs(&["1/2", "2/4", "3/4"]), &[Item::Nut, Item::Flatwasher])
            .unwrap();
        assert_eq!(model.row_count(), 1);
        let row = &model.rows()[0];
        assert_eq!(row.lengths(), fs(&["1/2", "3/4", "1"]).as_slice());
        assert_eq!(row.items().len(), 2);
        // Only genuinely new values are recorded: Nut, 1/2, 1, then Flatwasher, 3/4
        assert_eq!(model.history().len(), 5);
    }

    #[test]
    fn test_capacity_exceeded_leaves_model_unchanged() {
        let mut model = BinLayoutModel::new(BinSize::Slots56, "Grade 5 Zinc");
        model
            .add_or_update_row(f("1/2"), &fs(&["1", "2", "3", "4", "5"]), &[Item::Nut, Item::Flatwasher])
            .unwrap();
        let before_rows = model.rows().to_vec();
        let before_history = model.history().to_vec();

        let err = model
            .add_or_update_row(f("1/2"), &fs(&["6", "7"]), &[])
            .unwrap_err();
        assert_eq!(
            err,
            LayoutError::CapacityExceeded {
                diameter: "1/2".to_string(),
                requested: 9,
                capacity: 8
            }
        );
        assert_eq!(model.rows(), before_rows.as_slice());
        assert_eq!(model.history(), before_history.as_slice());

        // Exactly filling the row is fine
        model.add_or_update_row(f("1/2"), &fs(&["6"]), &[]).unwrap();
        assert_eq!(model.rows()[0].len(), COLUMN_COUNT);
    }

    #[test]
    fn test_new_row_over_capacity() {
        let mut model = BinLayoutModel::new(BinSize::Slots56, "Grade 5 Zinc");
        let lengths = fs(&["1", "2", "3", "4", "5", "6", "7", "8", "9"]);
        let err = model.add_or_update_row(f("5/8"), &lengths, &[]).unwrap_err();
        assert_eq!(err.error_code(), "CAPACITY_EXCEEDED");
        assert!(model.is_empty());
        assert!(model.history().is_empty());
    }

    #[test]
    fn test_per_kind_limits() {
        let limits = RowLimits {
            max_lengths: 4,
            max_items: 4,
        };
        let mut model = BinLayoutModel::new(BinSize::Slots56, "Grade 5 Zinc").with_limits(limits);
        model.add_or_update_row(f("3/8"), &fs(&["1", "2", "3", "4"]), &[]).unwrap();
        let err = model.add_or_update_row(f("3/8"), &fs(&["5"]), &[]).unwrap_err();
        assert!(matches!(err, LayoutError::CapacityExceeded { capacity: 4, requested: 5, .. }));
        model
            .add_or_update_row(f("3/8"), &[], &[Item::Nut, Item::Flatwasher, Item::Lockwasher, Item::Blank])
            .unwrap();
        assert_eq!(model.rows()[0].len(), 8);

        let mut items_only = BinLayoutModel::new(BinSize::Slots56, "Grade 5 Zinc").with_limits(RowLimits {
            max_lengths: 8,
            max_items: 2,
        });
        items_only.add_or_update_row(f("1/2"), &fs(&["1"]), &[Item::Nut, Item::Flatwasher]).unwrap();
        let before_rows = items_only.rows().to_vec();
        let before_history = items_only.history().to_vec();
        let err = items_only
            .add_or_update_row(f("1/2"), &fs(&["2"]), &[Item::Lockwasher])
            .unwrap_err();
        assert!(matches!(err, LayoutError::CapacityExceeded { capacity: 2, requested: 3, .. }));
        assert_eq!(items_only.rows(), before_rows.as_slice());
        assert_eq!(items_only.history(), before_history.as_slice());
    }

    #[test]
    fn test_row_limit_for_56_slot_bin() {
        let mut model = BinLayoutModel::new(BinSize::Slots56, "Grade 5 Zinc");
        assert_eq!(model.max_rows(), 7);
        for d in ["1/4", "5/16", "3/8", "7/16", "1/2", "5/8", "3/4"] {
            model.add_or_update_row(f(d), &fs(&["1"]), &[]).unwrap();
        }
        let before = model.rows().to_vec();
        let err = model.add_or_update_row(f("7/8"), &fs(&["2"]), &[]).unwrap_err();
        assert_eq!(err, LayoutError::RowLimitExceeded { max_rows: 7 });
        assert_eq!(model.rows(), before.as_slice());
        assert_eq!(model.history().len(), 7);

        // Existing diameters can still be extended
        model.add_or_update_row(f("3/4"), &fs(&["2"]), &[]).unwrap();
    }

    #[test]
    fn test_row_limit_for_72_slot_bin() {
        let mut model = BinLayoutModel::new(BinSize::Slots72, "Grade 5 Zinc");
        for d in ["1/4", "5/16", "3/8", "7/16", "1/2", "5/8", "3/4", "7/8", "1"] {
            model.add_or_update_row(f(d), &[], &[Item::Nut]).unwrap();
        }
        assert!(matches!(
            model.add_or_update_row(f("1-1/8"), &[], &[Item::Nut]),
            Err(LayoutError::RowLimitExceeded { max_rows: 9 })
        ));
    }

    #[test]
    fn test_new_row_needs_content() {
        let mut model = BinLayoutModel::new(BinSize::Slots56, "Grade 5 Zinc");
        let err = model.add_or_update_row(f("1/4"), &[], &[]).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(model.is_empty());

        model.add_or_update_row(f("1/4"), &fs(&["1"]), &[]).unwrap();
        // Nothing new on an existing row is a no-op
        model.add_or_update_row(f("1/4"), &fs(&["1"]), &[]).unwrap();
        assert_eq!(model.history().len(), 1);
    }

    #[test]
    fn test_zero_sizes_rejected() {
        let mut model = BinLayoutModel::new(BinSize::Slots56, "Grade 5 Zinc");
        assert!(model.add_or_update_row(f("0"), &fs(&["1"]), &[]).is_err());
        assert!(model.add_or_update_row(f("1/4"), &fs(&["0"]), &[]).is_err());
        assert!(model.is_empty());
    }

    #[test]
    fn test_undo_across_rows() {
        let mut model = BinLayoutModel::new(BinSize::Slots56, "Grade 5 Zinc");
        model.add_or_update_row(f("1/2"), &fs(&["1"]), &[]).unwrap();
        model.add_or_update_row(f("1/4"), &fs(&["2"]), &[Item::Nut]).unwrap();
        model.add_or_update_row(f("1/2"), &fs(&["3"]), &[]).unwrap();

        // History order, not row order
        let undone = model.remove_last_contribution().unwrap();
        assert_eq!(undone.entry, Entry::Length(f("3")));
        assert_eq!(model.row_for(f("1/2")).unwrap().lengths(), fs(&["1"]).as_slice());

        let undone = model.remove_last_contribution().unwrap();
        assert_eq!(undone.diameter, f("1/4"));
        assert_eq!(undone.entry, Entry::Length(f("2")));

        let undone = model.remove_last_contribution().unwrap();
        assert_eq!(undone.entry, Entry::Item(Item::Nut));
        assert!(model.row_for(f("1/4")).is_none(), "emptied row should be removed");
        assert_eq!(model.row_count(), 1);

        model.remove_last_contribution().unwrap();
        assert!(model.is_empty());
        assert_eq!(model.remove_last_contribution(), Err(LayoutError::NothingToUndo));
    }

    #[test]
    fn test_blank_occupies_a_slot() {
        let mut model = BinLayoutModel::new(BinSize::Slots56, "Grade 5 Zinc");
        model.add_or_update_row(f("5/16"), &fs(&["1"]), &[Item::Nut]).unwrap();
        model.add_blank(f("5/16")).unwrap();
        let row = model.render_grid().row(0).unwrap().to_vec();
        assert_eq!(row[..3], ["5/16 x Nut", "5/16 x Blank", "5/16 x 1"]);
        assert_eq!(model.row_summaries(), ["Row 1: 5/16\" (Nut, Blank, 1)"]);
    }

    #[test]
    fn test_render_is_deterministic() {
        let mut model = BinLayoutModel::new(BinSize::Slots56, "Grade 5 Zinc");
        model
            .add_or_update_row(f("3/8"), &fs(&["2", "1-1/2", "3/4"]), &[Item::Lockwasher, Item::Nut])
            .unwrap();
        model.add_or_update_row(f("1/4"), &fs(&["1"]), &[]).unwrap();
        let first = model.render_grid();
        let second = model.render_grid();
        assert_eq!(first, second);
        assert_eq!(
            first.row(1).unwrap()[..5],
            ["3/8 x Nut", "3/8 x Lockwasher", "3/8 x 3/4", "3/8 x 1-1/2", "3/8 x 2"]
        );
    }

    #[test]
    fn test_select_bin_size_resets() {
        let mut model = BinLayoutModel::new(BinSize::Slots56, "Grade 5 Zinc");
        model.add_or_update_row(f("1/4"), &fs(&["1"]), &[]).unwrap();
        model.select_bin_size(BinSize::Slots72);
        assert!(model.is_empty());
        assert!(model.history().is_empty());
        assert_eq!(model.max_rows(), 9);
        assert_eq!(model.render_grid().row_count(), 9);
    }

    #[test]
    fn test_select_material_resets() {
        let mut model = BinLayoutModel::new(BinSize::Slots56, "Grade 5 Zinc");
        model.add_or_update_row(f("1/4"), &fs(&["1"]), &[]).unwrap();
        model.select_material("Grade 8 Plain");
        assert_eq!(model.material(), "Grade 8 Plain");
        assert!(model.is_empty());
        assert_eq!(model.remove_last_contribution(), Err(LayoutError::NothingToUndo));
    }

    #[test]
    fn test_persistent_record() {
        let customer = Customer::new("Jane Doe", "5551234567").unwrap();
        let mut model = BinLayoutModel::new(BinSize::Slots56, "Grade 5 Zinc").with_customer(customer);
        model.add_or_update_row(f("3/8"), &fs(&["1"]), &[]).unwrap();
        model
            .add_or_update_row(f("1/4"), &fs(&["3/4", "1/2"]), &[Item::Flatwasher, Item::Nut])
            .unwrap();

        let record = model.to_persistent_record();
        assert_eq!(record.name, "Jane Doe");
        assert_eq!(record.phone, "555-123-4567");
        assert_eq!(record.bin_size, BinSize::Slots56);
        assert_eq!(record.bin_data.len(), 2);
        assert_eq!(record.bin_data[0].diameter, "1/4");
        assert_eq!(record.bin_data[0].lengths, ["1/2", "3/4"]);
        assert_eq!(record.bin_data[0].items, ["Nut", "Flatwasher"]);
        assert_eq!(record.bin_data[1].diameter, "3/8");

        let restored = BinLayoutModel::from_persistent_record(&record, RowLimits::default()).unwrap();
        assert_eq!(restored.render_grid(), model.render_grid());
        assert_eq!(restored.customer(), model.customer());
    }

    #[test]
    fn test_record_keeps_sizes_off_the_label_grid() {
        let mut model = BinLayoutModel::new(BinSize::Slots56, "Grade 5 Zinc");
        model.add_or_update_row(f("1/4"), &fs(&["5/32", "0.151", "0.153"]), &[]).unwrap();
        let record = model.to_persistent_record();
        assert_eq!(record.bin_data[0].lengths[2], "5/32");

        let restored = BinLayoutModel::from_persistent_record(&record, RowLimits::default()).unwrap();
        let before = model.rows()[0].lengths();
        let after = restored.rows()[0].lengths();
        assert_eq!(after.len(), 3);
        for (b, a) in before.iter().zip(after) {
            assert!(a.approx_eq(*b), "{} saved as {}", b.value(), a.value());
        }

        let mut coarse = BinLayoutModel::new(BinSize::Slots56, "Grade 5 Zinc").with_max_denominator(8);
        coarse.add_or_update_row(f("3/16"), &fs(&["1"]), &[]).unwrap();
        assert_eq!(coarse.render_grid().cell(0, 0), Some("0.19 x 1"));
        let record = coarse.to_persistent_record();
        assert_eq!(record.bin_data[0].diameter, "3/16");
        let restored = BinLayoutModel::from_persistent_record(&record, RowLimits::default()).unwrap();
        assert!(restored.rows()[0].diameter().approx_eq(f("3/16")));
    }

    #[test]
    fn test_from_record_rejects_overfull_rows() {
        let record = PersistentRecord {
            name: String::new(),
            phone: String::new(),
            bin_size: BinSize::Slots56,
            material: "Grade 5 Zinc".to_string(),
            bin_data: vec![
                RowRecord {
                    diameter: "1/4".to_string(),
                    lengths: vec![],
                    items: vec![],
                },
                RowRecord {
                    diameter: "1/2".to_string(),
                    lengths: (1..=9).map(|i| i.to_string()).collect(),
                    items: vec![],
                },
            ],
        };
        let err = BinLayoutModel::from_persistent_record(&record, RowLimits::default()).unwrap_err();
        assert_eq!(err.error_code(), "CAPACITY_EXCEEDED");

        let mut record = record;
        record.bin_data.truncate(1);
        let model = BinLayoutModel::from_persistent_record(&record, RowLimits::default()).unwrap();
        assert!(model.is_empty());
    }

    #[test]
    fn test_capacity_invariant_over_many_adds() {
        let mut model = BinLayoutModel::new(BinSize::Slots72, "Grade 5 Zinc");
        let lengths = fs(&["1/2", "3/4", "1", "1-1/4", "1-1/2", "2", "2-1/2", "3", "3-1/2", "4"]);
        for (i, d) in ["1/4", "5/16", "3/8"].iter().enumerate() {
            for chunk in lengths.chunks(i + 1) {
                let _ = model.add_or_update_row(f(d), chunk, &[]);
                let _ = model.add_or_update_row(f(d), &[], &Item::ALL[..i + 1]);
            }
        }
        assert!(model.rows().iter().all(|row| row.len() <= COLUMN_COUNT));
        assert_eq!(
            model.history().len(),
            model.rows().iter().map(BinRow::len).sum::<usize>()
        );
    }

    #[test]
    fn test_row_limits_validation() {
        assert!(RowLimits::default().validate().is_ok());
        assert!(RowLimits { max_lengths: 0, max_items: 4 }.validate().is_err());
        assert!(RowLimits { max_lengths: 4, max_items: 9 }.validate().is_err());
    }
}
