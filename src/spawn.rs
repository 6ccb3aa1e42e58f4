//! Object and car spawn cells laid out over a detected table.
//!
//! The grid splits the table rectangle (shrunk by a margin) into
//! `columns × rows` cells. Two cells in the middle row, one centred in each
//! half of the table, are reserved for cars; every other cell holds objects.
//! This is the only randomized code in the crate and it never feeds the
//! track builder.
//!
//! # Example
//!
//! ```ignore
//! use rand::SeedableRng;
//! use table_track::spawn::{SpawnGrid, SpawnGridOptions};
//!
//! let grid = SpawnGrid::new(&table, &SpawnGridOptions::default())?;
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let mut occupied = std::collections::BTreeSet::new();
//! let cells = grid.pick_object_cells(2, &mut occupied, &mut rng);
//! ```

use std::collections::BTreeSet;

use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::geom::Point3;
use crate::track::SurfaceCandidate;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnGridOptions {
    pub columns: usize,
    pub rows: usize,
    /// Fraction of the surface extent covered by the grid, in `[0.5, 1]`.
    pub margin_factor: f64,
}

impl Default for SpawnGridOptions {
    fn default() -> Self {
        Self {
            columns: 6,
            rows: 3,
            margin_factor: 0.85,
        }
    }
}

impl SpawnGridOptions {
    /// # Errors
    /// Returns an error for an empty grid or a margin outside `[0.5, 1]`.
    pub fn validate(&self) -> Result<(), SpawnGridError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(SpawnGridError::EmptyGrid {
                columns: self.columns,
                rows: self.rows,
            });
        }
        if !(0.5..=1.0).contains(&self.margin_factor) {
            return Err(SpawnGridError::InvalidMarginFactor(self.margin_factor));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SpawnGridError {
    #[error("spawn grid needs at least one column and row, got {columns} x {rows}")]
    EmptyGrid { columns: usize, rows: usize },
    #[error("spawn grid margin must be in [0.5, 1], got {0}")]
    InvalidMarginFactor(f64),
    #[error("surface `{0}` has no plane extent")]
    MissingExtent(String),
    #[error("surface `{0}` has a degenerate right or forward axis")]
    DegenerateAxes(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Car,
    Object,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpawnCell {
    pub index: usize,
    pub row: usize,
    pub column: usize,
    pub center: Point3,
    pub kind: CellKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpawnGrid {
    columns: usize,
    rows: usize,
    cell_width: f64,
    cell_length: f64,
    cells: Vec<SpawnCell>,
    car_cells: Vec<usize>,
    object_cells: Vec<usize>,
}

impl SpawnGrid {
    /// Lays the grid over `surface`, row by row.
    ///
    /// # Errors
    /// Returns an error for invalid options, a surface without extent, or
    /// zero right/forward axes.
    pub fn new(surface: &SurfaceCandidate, options: &SpawnGridOptions) -> Result<Self, SpawnGridError> {
        options.validate()?;
        let rect = surface
            .extent
            .ok_or_else(|| SpawnGridError::MissingExtent(surface.name.clone()))?;
        let axes = surface
            .right_axis
            .normalized()
            .zip(surface.forward_axis.normalized());
        let Some((right, forward)) = axes else {
            return Err(SpawnGridError::DegenerateAxes(surface.name.clone()));
        };

        let used_width = rect.width * options.margin_factor;
        let used_length = rect.height * options.margin_factor;
        let cell_width = used_width / options.columns as f64;
        let cell_length = used_length / options.rows as f64;

        let half_columns = options.columns / 2;
        let left_car_column = half_columns / 2;
        let right_car_column = half_columns + left_car_column;
        let middle_row = options.rows / 2;

        let mut cells = Vec::with_capacity(options.columns * options.rows);
        for row in 0..options.rows {
            for column in 0..options.columns {
                let x = -used_width / 2.0 + cell_width * (column as f64 + 0.5);
                let z = -used_length / 2.0 + cell_length * (row as f64 + 0.5);
                let is_car = row == middle_row && (column == left_car_column || column == right_car_column);
                cells.push(SpawnCell {
                    index: cells.len(),
                    row,
                    column,
                    center: surface.center + right * x + forward * z,
                    kind: if is_car { CellKind::Car } else { CellKind::Object },
                });
            }
        }

        let (car_cells, object_cells): (Vec<usize>, Vec<usize>) = cells
            .iter()
            .map(|cell| cell.index)
            .partition(|&index| cells[index].kind == CellKind::Car);

        debug!(
            "spawn grid on `{}`: {} cells, cars at {:?}",
            surface.name,
            cells.len(),
            car_cells
        );

        Ok(Self {
            columns: options.columns,
            rows: options.rows,
            cell_width,
            cell_length,
            cells,
            car_cells,
            object_cells,
        })
    }

    #[must_use]
    pub fn cells(&self) -> &[SpawnCell] {
        &self.cells
    }

    #[must_use]
    pub fn cell(&self, index: usize) -> Option<&SpawnCell> {
        self.cells.get(index)
    }

    #[must_use]
    pub fn car_cells(&self) -> &[usize] {
        &self.car_cells
    }

    #[must_use]
    pub fn object_cells(&self) -> &[usize] {
        &self.object_cells
    }

    /// Size of one cell along the surface right and forward axes.
    #[must_use]
    pub const fn cell_size(&self) -> (f64, f64) {
        (self.cell_width, self.cell_length)
    }

    /// Picks up to `count` free object cells in random order and marks them
    /// occupied.
    pub fn pick_object_cells<R: Rng + ?Sized>(
        &self,
        count: usize,
        occupied: &mut BTreeSet<usize>,
        rng: &mut R,
    ) -> Vec<usize> {
        let mut free: Vec<usize> = self
            .object_cells
            .iter()
            .copied()
            .filter(|index| !occupied.contains(index))
            .collect();
        free.shuffle(rng);
        free.truncate(count);
        occupied.extend(free.iter().copied());
        free
    }

    /// A random car cell, or `None` when the grid has none.
    pub fn pick_car_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if self.car_cells.is_empty() {
            return None;
        }
        self.car_cells
            .get(rng.random_range(0..self.car_cells.len()))
            .copied()
    }
}
