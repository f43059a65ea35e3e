//! Addressable cell storage for the merged archive.
//!
//! A *cell* is one `(initialization_year, lead_year, month)` combination and
//! holds a full `(lat, lon)` grid. Cells are addressed by a flat index in
//! `(initialization_year, lead_year, month)` order, so the cells of one
//! initialization year form a contiguous block.

use crate::error::ArchiveError;

/// Number of months in a lead year.
pub const MONTHS_PER_LEAD_YEAR: usize = 12;

/// Bitwise equality of float slices, so identical `NaN`s compare equal.
pub(crate) fn same_bits(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
}

/// Dimension lengths of an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArchiveShape {
    n_init: usize,
    n_lead: usize,
    n_lat: usize,
    n_lon: usize,
}

impl ArchiveShape {
    /// Creates a shape with `n_init` initialization years and `n_lead` lead
    /// years over an `n_lat` x `n_lon` grid.
    pub fn new(n_init: usize, n_lead: usize, n_lat: usize, n_lon: usize) -> Self {
        Self {
            n_init,
            n_lead,
            n_lat,
            n_lon,
        }
    }

    /// Number of initialization years.
    pub fn n_init(&self) -> usize {
        self.n_init
    }

    /// Number of lead years.
    pub fn n_lead(&self) -> usize {
        self.n_lead
    }

    /// Number of latitude points.
    pub fn n_lat(&self) -> usize {
        self.n_lat
    }

    /// Number of longitude points.
    pub fn n_lon(&self) -> usize {
        self.n_lon
    }

    /// Points per `(lat, lon)` grid.
    pub fn grid_len(&self) -> usize {
        self.n_lat * self.n_lon
    }

    /// Number of `(initialization_year, lead_year, month)` cells.
    pub fn n_cells(&self) -> usize {
        self.n_init * self.n_lead * MONTHS_PER_LEAD_YEAR
    }

    /// Full dimension lengths: `[init, lead, month, lat, lon]`.
    pub fn dims(&self) -> [usize; 5] {
        [
            self.n_init,
            self.n_lead,
            MONTHS_PER_LEAD_YEAR,
            self.n_lat,
            self.n_lon,
        ]
    }

    /// Flat index of the cell at initialization index `init_idx`, 1-based
    /// `lead_year` and 1-based `month`. `None` when out of range.
    pub fn cell_index(&self, init_idx: usize, lead_year: u32, month: u8) -> Option<usize> {
        let lead = usize::try_from(lead_year).ok()?.checked_sub(1)?;
        let month = usize::from(month).checked_sub(1)?;
        if init_idx >= self.n_init || lead >= self.n_lead || month >= MONTHS_PER_LEAD_YEAR {
            return None;
        }
        Some((init_idx * self.n_lead + lead) * MONTHS_PER_LEAD_YEAR + month)
    }

    /// Inverse of [`cell_index`](Self::cell_index).
    pub fn cell_position(&self, cell: usize) -> Option<(usize, u32, u8)> {
        if cell >= self.n_cells() {
            return None;
        }
        let month = cell % MONTHS_PER_LEAD_YEAR;
        let rest = cell / MONTHS_PER_LEAD_YEAR;
        let lead = rest % self.n_lead;
        let init_idx = rest / self.n_lead;
        Some((init_idx, lead as u32 + 1, month as u8 + 1))
    }
}

/// Write target of the merge engine.
///
/// Each cell starts missing and may be filled at most once.
pub trait CellStore {
    /// Dimensions of the store.
    fn shape(&self) -> ArchiveShape;

    /// Whether `cell` already holds a grid.
    fn is_filled(&self, cell: usize) -> bool;

    /// Stores `grid` in `cell`.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Store`] if the cell is out of range, already
    /// filled, or `grid` has the wrong length.
    fn fill(&mut self, cell: usize, grid: &[f64]) -> Result<(), ArchiveError>;
}

/// Eager in-memory store: one value buffer plus a filled mask.
///
/// Values of missing cells are `NaN`; equality compares values bit for bit.
#[derive(Debug, Clone)]
pub struct DenseStore {
    shape: ArchiveShape,
    values: Vec<f64>,
    filled: Vec<bool>,
}

impl DenseStore {
    /// Allocates a store with every cell missing.
    pub fn new(shape: ArchiveShape) -> Self {
        Self {
            shape,
            values: vec![f64::NAN; shape.n_cells() * shape.grid_len()],
            filled: vec![false; shape.n_cells()],
        }
    }

    /// The grid of `cell`, or `None` if it is missing or out of range.
    pub fn grid(&self, cell: usize) -> Option<&[f64]> {
        if !self.is_filled(cell) {
            return None;
        }
        let n = self.shape.grid_len();
        self.values.get(cell * n..(cell + 1) * n)
    }

    /// All values in `(init, lead, month, lat, lon)` order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Filled flag per cell.
    pub fn filled_mask(&self) -> &[bool] {
        &self.filled
    }

    /// Number of filled cells.
    pub fn n_filled(&self) -> usize {
        self.filled.iter().filter(|&&f| f).count()
    }
}

impl PartialEq for DenseStore {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape
            && self.filled == other.filled
            && same_bits(&self.values, &other.values)
    }
}

impl CellStore for DenseStore {
    fn shape(&self) -> ArchiveShape {
        self.shape
    }

    fn is_filled(&self, cell: usize) -> bool {
        self.filled.get(cell).copied().unwrap_or(false)
    }

    fn fill(&mut self, cell: usize, grid: &[f64]) -> Result<(), ArchiveError> {
        let n = self.shape.grid_len();
        if cell >= self.filled.len() {
            return Err(ArchiveError::Store {
                reason: format!("cell {cell} out of range ({} cells)", self.filled.len()),
            });
        }
        if grid.len() != n {
            return Err(ArchiveError::Store {
                reason: format!("grid has {} points, expected {n}", grid.len()),
            });
        }
        if self.filled[cell] {
            return Err(ArchiveError::Store {
                reason: format!("cell {cell} is already filled"),
            });
        }
        self.values[cell * n..(cell + 1) * n].copy_from_slice(grid);
        self.filled[cell] = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_bits_treats_identical_nan_as_equal() {
        assert!(same_bits(&[1.0, f64::NAN], &[1.0, f64::NAN]));
        assert!(!same_bits(&[1.0, f64::NAN], &[1.0, 2.0]));
        assert!(!same_bits(&[0.0], &[-0.0]));
        assert!(!same_bits(&[1.0], &[1.0, 1.0]));
    }

    #[test]
    fn stores_with_missing_cells_compare_equal() {
        let shape = ArchiveShape::new(1, 1, 1, 2);
        let mut a = DenseStore::new(shape);
        let mut b = DenseStore::new(shape);
        a.fill(0, &[f64::NAN, 1.0]).unwrap();
        b.fill(0, &[f64::NAN, 1.0]).unwrap();
        assert_eq!(a, b);
        b.fill(1, &[2.0, 3.0]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn cell_index_layout() {
        let shape = ArchiveShape::new(2, 3, 1, 1);
        assert_eq!(shape.n_cells(), 72);
        assert_eq!(shape.cell_index(0, 1, 1), Some(0));
        assert_eq!(shape.cell_index(0, 1, 12), Some(11));
        assert_eq!(shape.cell_index(0, 2, 1), Some(12));
        assert_eq!(shape.cell_index(1, 1, 1), Some(36));
        assert_eq!(shape.cell_index(1, 3, 12), Some(71));
    }

    #[test]
    fn cell_index_out_of_range() {
        let shape = ArchiveShape::new(2, 3, 1, 1);
        assert_eq!(shape.cell_index(2, 1, 1), None);
        assert_eq!(shape.cell_index(0, 0, 1), None);
        assert_eq!(shape.cell_index(0, 4, 1), None);
        assert_eq!(shape.cell_index(0, 1, 0), None);
        assert_eq!(shape.cell_index(0, 1, 13), None);
    }

    #[test]
    fn cell_position_inverts_index() {
        let shape = ArchiveShape::new(3, 4, 2, 2);
        for cell in 0..shape.n_cells() {
            let (i, lead, month) = shape.cell_position(cell).unwrap();
            assert_eq!(shape.cell_index(i, lead, month), Some(cell));
        }
        assert_eq!(shape.cell_position(shape.n_cells()), None);
    }

    #[test]
    fn new_store_is_all_missing() {
        let store = DenseStore::new(ArchiveShape::new(1, 2, 2, 3));
        assert_eq!(store.values().len(), 24 * 6);
        assert!(store.values().iter().all(|v| v.is_nan()));
        assert_eq!(store.n_filled(), 0);
        assert!(store.grid(0).is_none());
    }

    #[test]
    fn fill_once() {
        let mut store = DenseStore::new(ArchiveShape::new(1, 1, 1, 2));
        store.fill(3, &[1.0, 2.0]).unwrap();
        assert!(store.is_filled(3));
        assert_eq!(store.grid(3), Some(&[1.0, 2.0][..]));
        assert_eq!(store.n_filled(), 1);

        let err = store.fill(3, &[5.0, 6.0]).unwrap_err();
        assert!(matches!(err, ArchiveError::Store { .. }));
        assert_eq!(store.grid(3), Some(&[1.0, 2.0][..]));
    }

    #[test]
    fn fill_rejects_bad_writes() {
        let mut store = DenseStore::new(ArchiveShape::new(1, 1, 1, 2));
        assert!(store.fill(12, &[1.0, 2.0]).is_err());
        assert!(store.fill(0, &[1.0]).is_err());
        assert_eq!(store.n_filled(), 0);
        assert!(!store.is_filled(99));
    }
}
