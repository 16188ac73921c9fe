//! Capacity allocation for display purposes.
//!
//! The solver reports continuous facility counts; visual consumers want
//! discrete facility instances with per-unit utilization, and per-consumer
//! demand slices within each unit. Nothing here feeds back into the solve.

use serde::{Deserialize, Serialize};

/// A discrete facility instance carved out of a fractional facility count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FacilityUnit {
    pub index: usize,
    /// Fraction of this unit's capacity in use, in `0.0..=1.0`.
    pub utilization: f64,
}

/// A slice of one unit's capacity assigned to one demand share.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitSlice {
    pub unit: usize,
    /// Capacity taken from this unit, in facility-count terms.
    pub amount: f64,
}

/// Split a fractional facility count into `ceil(count)` discrete units,
/// filling each unit completely before starting the next.
pub fn split_units(count: f64) -> Vec<FacilityUnit> {
    if count <= 0.0 {
        return Vec::new();
    }
    let full = count.floor() as usize;
    let remainder = count - full as f64;
    let mut units: Vec<FacilityUnit> = (0..full)
        .map(|index| FacilityUnit {
            index,
            utilization: 1.0,
        })
        .collect();
    if remainder > 1e-9 {
        units.push(FacilityUnit {
            index: full,
            utilization: remainder,
        });
    }
    units
}

/// Greedily pack per-consumer demand shares (in facility-count terms) into
/// unit-capacity bins. A share spanning a unit boundary is split across the
/// adjacent units.
pub fn allocate_demand(shares: &[f64]) -> Vec<Vec<UnitSlice>> {
    let mut assignments = Vec::with_capacity(shares.len());
    let mut unit = 0usize;
    let mut used = 0.0f64;

    for &share in shares {
        let mut slices = Vec::new();
        let mut remaining = share;
        while remaining > 1e-9 {
            let free = 1.0 - used;
            let taken = remaining.min(free);
            slices.push(UnitSlice {
                unit,
                amount: taken,
            });
            remaining -= taken;
            used += taken;
            if 1.0 - used <= 1e-9 {
                unit += 1;
                used = 0.0;
            }
        }
        assignments.push(slices);
    }
    assignments
}
