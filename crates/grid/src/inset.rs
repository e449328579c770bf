use flightlog_common::{Axis, BlockDescriptor, GridDimensions};
use serde::{Deserialize, Serialize};

use crate::coords::CellCoord;

const RATIOS: [f64; 4] = [0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0];

/// How quantized insets translate into fractions of a half cell.
///
/// Older logs used the raw value directly; current logs map it through a
/// ratio table. The version is chosen once per decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatVersion {
    /// Raw value 0..=3 used as the fraction itself.
    RawInset,
    /// Raw value mapped through `[0, 1/3, 2/3, 1]`.
    #[default]
    RatioInset,
}

impl FormatVersion {
    /// Fraction for one quantized inset value.
    pub fn fraction(self, raw: u8) -> f64 {
        let raw = raw.min(BlockDescriptor::MAX_INSET);
        match self {
            FormatVersion::RawInset => raw as f64,
            FormatVersion::RatioInset => RATIOS[raw as usize],
        }
    }
}

/// Zero the outward inset of every axis on which `coord` sits at the grid edge.
pub fn clamp_to_boundary(
    mut block: BlockDescriptor,
    coord: CellCoord,
    dims: GridDimensions,
) -> BlockDescriptor {
    let c = coord.as_array();
    for axis in Axis::ALL {
        let i = axis.index();
        if c[i] == 0 {
            block.neg[i] = 0;
        }
        if c[i] + 1 == dims.along(axis) {
            block.pos[i] = 0;
        }
    }
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use flightlog_common::BlockKind;

    #[test]
    fn fractions_per_version() {
        assert_eq!(FormatVersion::RatioInset.fraction(0), 0.0);
        assert_eq!(FormatVersion::RatioInset.fraction(3), 1.0);
        assert!((FormatVersion::RatioInset.fraction(1) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(FormatVersion::RawInset.fraction(2), 2.0);
    }

    #[test]
    fn clamp_min_and_max_edges() {
        let dims = GridDimensions::new(4, 4, 1).unwrap();
        let full = BlockDescriptor::full(BlockKind::Asteroid);

        let corner = clamp_to_boundary(full, CellCoord::new(0, 3, 0), dims);
        assert_eq!(corner.neg, [0, 3, 0]);
        assert_eq!(corner.pos, [3, 0, 0]);

        let inner = clamp_to_boundary(full, CellCoord::new(1, 2, 0), dims);
        assert_eq!(inner.pos, [3, 3, 0]);
        assert_eq!(inner.neg, [3, 3, 0]);
    }

    #[test]
    fn version_serde_names() {
        let v: FormatVersion = serde_json::from_str("\"raw_inset\"").unwrap();
        assert_eq!(v, FormatVersion::RawInset);
    }
}
