use crate::qam::error::{QamError, Result};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported square QAM orders
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum ModulationOrder {
    Qpsk,
    Qam16,
    Qam64,
}

impl ModulationOrder {
    pub const ALL: [ModulationOrder; 3] =
        [ModulationOrder::Qpsk, ModulationOrder::Qam16, ModulationOrder::Qam64];

    /// Number of constellation points (M)
    pub fn points(self) -> usize {
        match self {
            ModulationOrder::Qpsk => 4,
            ModulationOrder::Qam16 => 16,
            ModulationOrder::Qam64 => 64,
        }
    }

    /// log2(M)
    pub fn bits_per_symbol(self) -> usize {
        self.points().trailing_zeros() as usize
    }

    /// sqrt(M), the lattice edge length
    pub fn side(self) -> usize {
        1 << (self.bits_per_symbol() / 2)
    }
}

impl TryFrom<usize> for ModulationOrder {
    type Error = QamError;

    fn try_from(m: usize) -> Result<Self> {
        match m {
            4 => Ok(ModulationOrder::Qpsk),
            16 => Ok(ModulationOrder::Qam16),
            64 => Ok(ModulationOrder::Qam64),
            other => Err(QamError::InvalidConfiguration(other)),
        }
    }
}

impl From<ModulationOrder> for usize {
    fn from(order: ModulationOrder) -> usize {
        order.points()
    }
}

impl fmt::Display for ModulationOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModulationOrder::Qpsk => write!(f, "QPSK"),
            ModulationOrder::Qam16 => write!(f, "QAM16"),
            ModulationOrder::Qam64 => write!(f, "QAM64"),
        }
    }
}

/// Ordered symbol table of a square QAM lattice.
///
/// Point `row * side + col` sits at `(2*row - (side-1), 2*col - (side-1))`,
/// so the index's high-order bits select the row (real axis) and the
/// low-order bits select the column (imaginary axis). Adjacent points are
/// 2 apart.
#[derive(Clone, Debug, PartialEq)]
pub struct Constellation {
    order: ModulationOrder,
    points: Vec<Complex64>,
}

impl Constellation {
    pub fn new(order: ModulationOrder) -> Self {
        let side = order.side();
        let offset = (side - 1) as f64;

        let mut points = Vec::with_capacity(order.points());
        for row in 0..side {
            for col in 0..side {
                points.push(Complex64::new(
                    2.0 * row as f64 - offset,
                    2.0 * col as f64 - offset,
                ));
            }
        }

        Self { order, points }
    }

    pub fn order(&self) -> ModulationOrder {
        self.order
    }

    pub fn bits_per_symbol(&self) -> usize {
        self.order.bits_per_symbol()
    }

    pub fn points(&self) -> &[Complex64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point(&self, index: usize) -> Option<Complex64> {
        self.points.get(index).copied()
    }

    /// Index of the closest point by squared Euclidean distance.
    ///
    /// Scans ascending and only replaces the current best on a strictly
    /// smaller distance, so exact ties resolve to the lowest index.
    pub fn nearest_index(&self, received: Complex64) -> usize {
        let mut min_distance = f64::INFINITY;
        let mut nearest = 0;

        for (i, &point) in self.points.iter().enumerate() {
            let distance = (received - point).norm_sqr();
            if distance < min_distance {
                min_distance = distance;
                nearest = i;
            }
        }

        nearest
    }
}

/// Builds the constellation for a raw order M.
pub fn build_constellation(m: usize) -> Result<Constellation> {
    let order = ModulationOrder::try_from(m)?;
    Ok(Constellation::new(order))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qpsk_table() {
        let constellation = build_constellation(4).unwrap();
        let expected = [
            Complex64::new(-1.0, -1.0),
            Complex64::new(-1.0, 1.0),
            Complex64::new(1.0, -1.0),
            Complex64::new(1.0, 1.0),
        ];
        assert_eq!(constellation.points(), &expected);
    }

    #[test]
    fn test_sizes_and_distinct_points() {
        for order in ModulationOrder::ALL {
            let constellation = Constellation::new(order);
            assert_eq!(constellation.len(), order.points());

            let points = constellation.points();
            for i in 0..points.len() {
                for j in (i + 1)..points.len() {
                    assert_ne!(points[i], points[j], "{} points {} and {} collide", order, i, j);
                }
            }
        }
    }

    #[test]
    fn test_coordinates_are_odd_and_bounded() {
        for order in ModulationOrder::ALL {
            let limit = (order.side() - 1) as f64;
            for p in Constellation::new(order).points() {
                for v in [p.re, p.im] {
                    assert_eq!(v.abs() % 2.0, 1.0);
                    assert!(v.abs() <= limit);
                }
            }
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        for m in [4, 16, 64] {
            assert_eq!(build_constellation(m).unwrap(), build_constellation(m).unwrap());
        }
    }

    #[test]
    fn test_unsupported_orders() {
        for m in [0, 1, 2, 8, 32, 128, 256] {
            assert_eq!(build_constellation(m), Err(QamError::InvalidConfiguration(m)));
        }
    }

    #[test]
    fn test_order_geometry() {
        assert_eq!(ModulationOrder::Qpsk.bits_per_symbol(), 2);
        assert_eq!(ModulationOrder::Qam16.bits_per_symbol(), 4);
        assert_eq!(ModulationOrder::Qam64.bits_per_symbol(), 6);
        assert_eq!(ModulationOrder::Qam64.side(), 8);
    }

    #[test]
    fn test_nearest_index_tie_goes_to_lowest() {
        let constellation = Constellation::new(ModulationOrder::Qpsk);
        // Origin is equidistant from all four points
        assert_eq!(constellation.nearest_index(Complex64::new(0.0, 0.0)), 0);
        // On the boundary between index 2 and 3
        assert_eq!(constellation.nearest_index(Complex64::new(1.0, 0.0)), 2);
        assert_eq!(constellation.nearest_index(Complex64::new(0.9, 1.2)), 3);
    }
}
