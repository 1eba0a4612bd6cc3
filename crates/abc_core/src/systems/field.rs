use serde::{Deserialize, Serialize};

use crate::math::finite_or_zero;

/// Square grid of deformation magnitudes over `[-1, 1]²` visualising the
/// central mass as a gravity well.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DeformationField {
    resolution: usize,
    cells: Vec<f64>,
}

impl DeformationField {
    /// A field with `resolution + 1` samples per side, all zero.
    #[must_use]
    pub fn new(resolution: usize) -> Self {
        let resolution = resolution.max(1);
        let side = resolution + 1;
        Self {
            resolution,
            cells: vec![0.0; side * side],
        }
    }

    #[must_use]
    pub fn side(&self) -> usize {
        self.resolution + 1
    }

    /// Sample at column `i`, row `j`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        let side = self.side();
        (i < side && j < side).then(|| self.cells[i * side + j])
    }

    #[must_use]
    pub fn cells(&self) -> &[f64] {
        &self.cells
    }

    /// Recomputes every sample as `clamp(mass·0.1 / (r + 0.1), 0, 1)`.
    pub fn update(&mut self, central_mass: f64) {
        let side = self.side();
        let res = self.resolution as f64;
        for i in 0..side {
            for j in 0..side {
                let x = (i as f64 / res) * 2.0 - 1.0;
                let y = (j as f64 / res) * 2.0 - 1.0;
                let r = (x * x + y * y).sqrt();
                let deform = finite_or_zero(central_mass * 0.1 / (r + 0.1));
                self.cells[i * side + j] = deform.clamp(0.0, 1.0);
            }
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_decreases_with_distance() {
        let mut field = DeformationField::new(20);
        field.update(2.0);
        let center = field.get(10, 10).unwrap();
        let corner = field.get(0, 0).unwrap();
        assert_eq!(center, 1.0);
        assert!(corner < center);
        assert!(field.cells().iter().all(|c| (0.0..=1.0).contains(c)));
        assert!(field.get(21, 0).is_none());
    }

    #[test]
    fn test_negative_mass_clamps_to_zero() {
        let mut field = DeformationField::new(4);
        field.update(-5.0);
        assert!(field.cells().iter().all(|c| *c == 0.0));
    }
}
