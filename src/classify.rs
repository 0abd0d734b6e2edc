//! Outlier classification of footprint KPI values
//!
//! Values are banded around the population mean with an asymmetric inner band:
//! the "better than average" side gets half a spread, the "worse than average"
//! side a full spread. Beyond the inner band, severity rises by one level per
//! additional spread and saturates at level 4.
//!
//! ```text
//!   reversed = false (lower is better, e.g. lead time)
//!
//!   Improved L4 | L3 | L2 | L1 |  Neutral  | L1 | L2 | L3 | Degraded L4
//!   ------------+----+----+----+-----+-----+----+----+----+-------------
//!                         mean - sd/2  mean   mean + sd
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Green palette, light to dark (improvement)
pub const GREEN_PALETTE: [&str; 4] = ["#D0E7D2", "#B0D9B1", "#79AC78", "#618264"];

/// Red palette, light to dark (degradation)
pub const RED_PALETTE: [&str; 4] = ["#F15A59", "#ED2B2A", "#D21312", "#850000"];

/// Color of values inside the inner band
pub const NEUTRAL_COLOR: &str = "blue";

/// Which way a value deviates, judged by the KPI's direction policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Improved,
    Degraded,
}

/// Escalation level beyond the inner band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Level1,
    Level2,
    Level3,
    Level4,
}

impl Severity {
    /// 1-based level number
    pub fn level(self) -> u8 {
        match self {
            Severity::Level1 => 1,
            Severity::Level2 => 2,
            Severity::Level3 => 3,
            Severity::Level4 => 4,
        }
    }

    fn index(self) -> usize {
        usize::from(self.level() - 1)
    }
}

/// Classification result: neutral or a directed severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "band", rename_all = "lowercase")]
pub enum Band {
    Neutral,
    Outlier {
        direction: Direction,
        severity: Severity,
    },
}

impl Band {
    pub fn is_neutral(&self) -> bool {
        matches!(self, Band::Neutral)
    }

    pub fn severity(&self) -> Option<Severity> {
        match self {
            Band::Neutral => None,
            Band::Outlier { severity, .. } => Some(*severity),
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        match self {
            Band::Neutral => None,
            Band::Outlier { direction, .. } => Some(*direction),
        }
    }

    /// Palette color for this band
    pub fn color(&self) -> &'static str {
        match self {
            Band::Neutral => NEUTRAL_COLOR,
            Band::Outlier {
                direction: Direction::Improved,
                severity,
            } => GREEN_PALETTE[severity.index()],
            Band::Outlier {
                direction: Direction::Degraded,
                severity,
            } => RED_PALETTE[severity.index()],
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Band::Neutral => write!(f, "NEUTRAL"),
            Band::Outlier {
                direction,
                severity,
            } => {
                let dir = match direction {
                    Direction::Improved => "IMPROVED",
                    Direction::Degraded => "DEGRADED",
                };
                write!(f, "{} LEVEL_{}", dir, severity.level())
            }
        }
    }
}

/// Inner band limits around a mean
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub upper: f64,
    pub lower: f64,
}

impl Bounds {
    /// Asymmetric bounds; `reversed` marks KPIs where high values are good
    pub fn new(mean: f64, spread: f64, reversed: bool) -> Self {
        if reversed {
            Self {
                upper: mean + spread / 2.0,
                lower: mean - spread,
            }
        } else {
            Self {
                upper: mean + spread,
                lower: mean - spread / 2.0,
            }
        }
    }
}

/// Classify `value` against `mean` and `spread`
///
/// `reversed` is true for KPIs where a high value is good (OEE); it swaps
/// which side counts as improvement and which side gets the half-width band.
///
/// A zero spread collapses both bounds onto the mean: the mean itself is
/// neutral and any value strictly beyond it is `Level4`. Non-finite inputs
/// and negative spreads classify as `Neutral`.
///
/// # Example
/// ```
/// use huella::classify::{classify, Band, Direction, Severity};
///
/// let band = classify(0.8, 0.75, 0.05, true);
/// assert_eq!(
///     band,
///     Band::Outlier { direction: Direction::Improved, severity: Severity::Level1 }
/// );
/// ```
pub fn classify(value: f64, mean: f64, spread: f64, reversed: bool) -> Band {
    if !value.is_finite() || !mean.is_finite() || !spread.is_finite() || spread < 0.0 {
        return Band::Neutral;
    }

    let (high_side, low_side) = if reversed {
        (Direction::Improved, Direction::Degraded)
    } else {
        (Direction::Degraded, Direction::Improved)
    };

    if spread == 0.0 {
        return match value.partial_cmp(&mean) {
            Some(std::cmp::Ordering::Greater) => Band::Outlier {
                direction: high_side,
                severity: Severity::Level4,
            },
            Some(std::cmp::Ordering::Less) => Band::Outlier {
                direction: low_side,
                severity: Severity::Level4,
            },
            _ => Band::Neutral,
        };
    }

    let bounds = Bounds::new(mean, spread, reversed);

    if value > bounds.upper {
        Band::Outlier {
            direction: high_side,
            severity: escalate(value - bounds.upper, spread),
        }
    } else if value < bounds.lower {
        Band::Outlier {
            direction: low_side,
            severity: escalate(bounds.lower - value, spread),
        }
    } else {
        Band::Neutral
    }
}

/// Severity of an excursion `excess > 0` past the inner bound
fn escalate(excess: f64, spread: f64) -> Severity {
    if excess <= spread {
        Severity::Level1
    } else if excess <= 2.0 * spread {
        Severity::Level2
    } else if excess <= 3.0 * spread {
        Severity::Level3
    } else {
        Severity::Level4
    }
}
