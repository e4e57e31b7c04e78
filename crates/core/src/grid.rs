//! The flow field: a dense grid of cells whose acceleration vectors are
//! re-derived from noise every tick.
//!
//! Cells are stored row-major. The grid covers `floor(width / scale)` by
//! `floor(height / scale)` cells; particles in the sliver beyond the last
//! full cell find no cell and coast for that tick.

use crate::error::EngineError;
use crate::noise_field::NoiseField;
use crate::vector::{unit, Vector2};
use rayon::prelude::*;

/// Linearly rescales `val` from `[min, max]` to `[min_allow, max_allow]`.
pub fn scale_range(val: f64, min_allow: f64, max_allow: f64, min: f64, max: f64) -> f64 {
    (max_allow - min_allow) * (val - min) / (max - min) + min_allow
}

/// How noise samples become cell accelerations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowParams {
    /// Multiplier on cell coordinates before sampling; smaller is smoother.
    pub similarity: f64,
    /// Angle produced by a noise value of 0.
    pub min_angle: f64,
    /// Angle produced by a noise value of 1.
    pub max_angle: f64,
    /// Magnitude of every cell's acceleration.
    pub acceleration: f64,
}

/// One grid element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    /// Cell center in world coordinates. Fixed for the grid's lifetime.
    pub position: Vector2,
    pub acceleration: Vector2,
}

/// Dense 2-D array of [`Cell`]s.
#[derive(Debug, Clone)]
pub struct VectorGrid {
    cols: usize,
    rows: usize,
    scale: f64,
    cells: Vec<Cell>,
}

impl VectorGrid {
    /// Allocates the grid for a `world_width` by `world_height` world.
    ///
    /// Returns `EngineError::InvalidDimensions` if `scale` is not a positive
    /// finite number or the grid would have no cells.
    pub fn build(world_width: f64, world_height: f64, scale: f64) -> Result<Self, EngineError> {
        if !(scale.is_finite() && scale > 0.0) || !world_width.is_finite() || !world_height.is_finite() {
            return Err(EngineError::InvalidDimensions);
        }
        let cols = (world_width / scale).floor().max(0.0) as usize;
        let rows = (world_height / scale).floor().max(0.0) as usize;
        if cols == 0 || rows == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        let len = cols.checked_mul(rows).ok_or(EngineError::InvalidDimensions)?;

        let mut cells = Vec::with_capacity(len);
        for cy in 0..rows {
            for cx in 0..cols {
                cells.push(Cell {
                    position: Vector2::new(
                        cx as f64 * scale + scale / 2.0,
                        cy as f64 * scale + scale / 2.0,
                    ),
                    acceleration: Vector2::ZERO,
                });
            }
        }
        Ok(Self {
            cols,
            rows,
            scale,
            cells,
        })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Recomputes every cell's acceleration for the given depth.
    ///
    /// Returns only once all cells are written, so readers afterwards see a
    /// consistent field.
    pub fn tick(&mut self, noise: &NoiseField, depth: f64, flow: &FlowParams) {
        let scale = self.scale;
        self.cells.par_iter_mut().for_each(|cell| {
            let value = noise.evaluate(
                cell.position.x / scale * flow.similarity,
                cell.position.y / scale * flow.similarity,
                depth,
            );
            let angle = scale_range(value, flow.min_angle, flow.max_angle, 0.0, 1.0);
            cell.acceleration = unit(angle) * flow.acceleration;
        });
    }

    /// The cell containing world point `(x, y)`, or `None` outside the grid.
    pub fn cell_at(&self, x: f64, y: f64) -> Option<&Cell> {
        if !(x >= 0.0 && y >= 0.0) {
            return None;
        }
        let cx = (x / self.scale) as usize;
        let cy = (y / self.scale) as usize;
        if cx >= self.cols || cy >= self.rows {
            return None;
        }
        self.cells.get(cy * self.cols + cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn flow() -> FlowParams {
        FlowParams {
            similarity: 0.1,
            min_angle: -2.0 * PI,
            max_angle: 2.0 * PI,
            acceleration: 0.1,
        }
    }

    #[test]
    fn scale_range_maps_endpoints_and_midpoint() {
        assert_eq!(scale_range(0.0, -4.0, 4.0, 0.0, 1.0), -4.0);
        assert_eq!(scale_range(1.0, -4.0, 4.0, 0.0, 1.0), 4.0);
        assert_eq!(scale_range(0.5, -4.0, 4.0, 0.0, 1.0), 0.0);
        assert_eq!(scale_range(0.25, 0.0, 1200.0, 0.0, 1.0), 300.0);
    }

    #[test]
    fn build_floors_dimensions_and_centers_cells() {
        let grid = VectorGrid::build(1200.0, 803.0, 5.0).unwrap();
        assert_eq!(grid.cols(), 240);
        assert_eq!(grid.rows(), 160);
        assert_eq!(grid.cells().len(), 240 * 160);
        assert_eq!(grid.cells()[0].position, Vector2::new(2.5, 2.5));
        let last = grid.cells().last().unwrap();
        assert_eq!(last.position, Vector2::new(1197.5, 797.5));
        assert!(grid.cells().iter().all(|c| c.acceleration == Vector2::ZERO));
    }

    #[test]
    fn build_rejects_bad_scale_and_empty_grids() {
        assert!(VectorGrid::build(100.0, 100.0, 0.0).is_err());
        assert!(VectorGrid::build(100.0, 100.0, -1.0).is_err());
        assert!(VectorGrid::build(100.0, 100.0, f64::NAN).is_err());
        assert!(VectorGrid::build(3.0, 100.0, 5.0).is_err());
    }

    #[test]
    fn cell_at_finds_containing_cell() {
        let grid = VectorGrid::build(100.0, 50.0, 10.0).unwrap();
        let cell = grid.cell_at(37.0, 12.0).unwrap();
        assert_eq!(cell.position, Vector2::new(35.0, 15.0));
        assert_eq!(grid.cell_at(0.0, 0.0).unwrap().position, Vector2::new(5.0, 5.0));
    }

    #[test]
    fn cell_at_outside_is_none() {
        let grid = VectorGrid::build(100.0, 50.0, 10.0).unwrap();
        assert!(grid.cell_at(-0.1, 5.0).is_none());
        assert!(grid.cell_at(5.0, -3.0).is_none());
        assert!(grid.cell_at(100.0, 5.0).is_none());
        assert!(grid.cell_at(5.0, 50.0).is_none());
        assert!(grid.cell_at(f64::NAN, 5.0).is_none());
    }

    #[test]
    fn tick_sets_accelerations_of_fixed_magnitude() {
        let mut grid = VectorGrid::build(60.0, 40.0, 5.0).unwrap();
        grid.tick(&NoiseField::new(3), 0.25, &flow());
        for cell in grid.cells() {
            assert!((cell.acceleration.length() - 0.1).abs() < 1e-12);
        }
    }

    #[test]
    fn tick_is_a_pure_function_of_seed_and_depth() {
        let noise = NoiseField::new(42);
        let mut a = VectorGrid::build(120.0, 80.0, 5.0).unwrap();
        let mut b = VectorGrid::build(120.0, 80.0, 5.0).unwrap();
        a.tick(&noise, 1.5, &flow());
        b.tick(&NoiseField::new(7), 0.2, &flow());
        b.tick(&noise, 1.5, &flow());
        for (ca, cb) in a.cells().iter().zip(b.cells()) {
            assert_eq!(ca.acceleration.x.to_bits(), cb.acceleration.x.to_bits());
            assert_eq!(ca.acceleration.y.to_bits(), cb.acceleration.y.to_bits());
        }
    }

    #[test]
    fn tick_angle_follows_linear_rescaling() {
        let noise = NoiseField::new(11);
        let params = FlowParams {
            similarity: 0.1,
            min_angle: 0.0,
            max_angle: PI / 2.0,
            acceleration: 1.0,
        };
        let mut grid = VectorGrid::build(20.0, 20.0, 5.0).unwrap();
        grid.tick(&noise, 0.0, &params);
        for cell in grid.cells() {
            let v = noise.evaluate(cell.position.x / 5.0 * 0.1, cell.position.y / 5.0 * 0.1, 0.0);
            let expected = unit(v * PI / 2.0);
            assert!((cell.acceleration - expected).length() < 1e-12);
        }
    }
}
