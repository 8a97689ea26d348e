//! Age binning
//!
//! Edges are {18, 30, 40, 50, 60, 100}. Bins are closed on the right, and
//! the first bin is also closed on the left, so 18 falls in the first bin
//! and every other edge belongs to the bin it closes. Ages outside
//! [18, 100] are left unbinned rather than clamped.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bin edges in years
pub const AGE_BIN_EDGES: [f64; 6] = [18.0, 30.0, 40.0, 50.0, 60.0, 100.0];

/// Ordered age category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeBin {
    #[serde(rename = "18-30")]
    Age18To30,
    #[serde(rename = "30-40")]
    Age30To40,
    #[serde(rename = "40-50")]
    Age40To50,
    #[serde(rename = "50-60")]
    Age50To60,
    #[serde(rename = "60-100")]
    Age60To100,
}

impl AgeBin {
    pub const ALL: [AgeBin; 5] = [
        AgeBin::Age18To30,
        AgeBin::Age30To40,
        AgeBin::Age40To50,
        AgeBin::Age50To60,
        AgeBin::Age60To100,
    ];

    /// Bin an age, or `None` when the age is missing or out of range
    pub fn from_age(age: Option<f64>) -> Option<AgeBin> {
        let age = age.filter(|a| !a.is_nan())?;
        if age < AGE_BIN_EDGES[0] {
            return None;
        }
        AGE_BIN_EDGES[1..]
            .iter()
            .position(|upper| age <= *upper)
            .map(|idx| Self::ALL[idx])
    }

    /// Category label
    pub fn label(&self) -> &'static str {
        match self {
            AgeBin::Age18To30 => "18-30",
            AgeBin::Age30To40 => "30-40",
            AgeBin::Age40To50 => "40-50",
            AgeBin::Age50To60 => "50-60",
            AgeBin::Age60To100 => "60-100",
        }
    }

    /// Lower and upper edge of the bin
    pub fn bounds(&self) -> (f64, f64) {
        let idx = *self as usize;
        (AGE_BIN_EDGES[idx], AGE_BIN_EDGES[idx + 1])
    }
}

impl fmt::Display for AgeBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_belong_to_lower_bin() {
        assert_eq!(AgeBin::from_age(Some(30.0)), Some(AgeBin::Age18To30));
        assert_eq!(AgeBin::from_age(Some(40.0)), Some(AgeBin::Age30To40));
        assert_eq!(AgeBin::from_age(Some(50.0)), Some(AgeBin::Age40To50));
        assert_eq!(AgeBin::from_age(Some(60.0)), Some(AgeBin::Age50To60));
        assert_eq!(AgeBin::from_age(Some(100.0)), Some(AgeBin::Age60To100));
    }

    #[test]
    fn test_lowest_edge_included() {
        assert_eq!(AgeBin::from_age(Some(18.0)), Some(AgeBin::Age18To30));
    }

    #[test]
    fn test_just_above_boundary() {
        assert_eq!(AgeBin::from_age(Some(30.0001)), Some(AgeBin::Age30To40));
        assert_eq!(AgeBin::from_age(Some(60.5)), Some(AgeBin::Age60To100));
    }

    #[test]
    fn test_out_of_range_unbinned() {
        assert_eq!(AgeBin::from_age(Some(17.0)), None);
        assert_eq!(AgeBin::from_age(Some(17.999)), None);
        assert_eq!(AgeBin::from_age(Some(100.01)), None);
        assert_eq!(AgeBin::from_age(None), None);
        assert_eq!(AgeBin::from_age(Some(f64::NAN)), None);
    }

    #[test]
    fn test_bounds_and_labels() {
        assert_eq!(AgeBin::Age18To30.bounds(), (18.0, 30.0));
        assert_eq!(AgeBin::Age60To100.bounds(), (60.0, 100.0));
        assert_eq!(AgeBin::Age40To50.to_string(), "40-50");
        assert!(AgeBin::Age18To30 < AgeBin::Age60To100);
    }
}
