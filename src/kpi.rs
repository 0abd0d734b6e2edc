//! KPI aggregation: per-contract means and the population baseline
//!
//! Duration KPIs are averaged as `chrono::Duration` and only converted to
//! seconds once the mean is known.

use crate::error::{AnalysisError, Result};
use crate::event::{duration_secs, EventRecord};
use crate::stats;
use chrono::Duration;
use clap::ValueEnum;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Key performance indicator scored per footprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Kpi {
    /// Overall equipment effectiveness
    Oee,
    /// Lead time in seconds
    LeadTime,
    /// Malfunction duration in seconds
    MalfunctionDuration,
    /// Rejected (scrap) quantity
    #[value(name = "rejected")]
    RejectedQuantity,
}

impl Kpi {
    pub const ALL: [Kpi; 4] = [
        Kpi::Oee,
        Kpi::LeadTime,
        Kpi::MalfunctionDuration,
        Kpi::RejectedQuantity,
    ];

    /// Direction policy: a high value is good only for OEE
    pub fn is_higher_better(self) -> bool {
        matches!(self, Kpi::Oee)
    }

    /// Flag handed to the outlier classifier
    pub fn reversed(self) -> bool {
        self.is_higher_better()
    }

    pub fn label(self) -> &'static str {
        match self {
            Kpi::Oee => "OEE",
            Kpi::LeadTime => "Lead Time",
            Kpi::MalfunctionDuration => "Malfunction Duration",
            Kpi::RejectedQuantity => "Rejected Materials",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Kpi::Oee => "ratio",
            Kpi::LeadTime | Kpi::MalfunctionDuration => "s",
            Kpi::RejectedQuantity => "pcs",
        }
    }
}

/// One scalar per KPI (means, sums, deltas or spreads)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiValues {
    pub oee: f64,
    pub lead_time: f64,
    pub malfunction_duration: f64,
    pub rejected_quantity: f64,
}

impl KpiValues {
    pub fn get(&self, kpi: Kpi) -> f64 {
        match kpi {
            Kpi::Oee => self.oee,
            Kpi::LeadTime => self.lead_time,
            Kpi::MalfunctionDuration => self.malfunction_duration,
            Kpi::RejectedQuantity => self.rejected_quantity,
        }
    }

    /// Build from a per-KPI function
    pub fn from_fn(mut f: impl FnMut(Kpi) -> f64) -> Self {
        Self {
            oee: f(Kpi::Oee),
            lead_time: f(Kpi::LeadTime),
            malfunction_duration: f(Kpi::MalfunctionDuration),
            rejected_quantity: f(Kpi::RejectedQuantity),
        }
    }

    /// Field-wise `self + other`
    pub fn add(&self, other: &KpiValues) -> KpiValues {
        KpiValues::from_fn(|k| self.get(k) + other.get(k))
    }

    /// Field-wise `self - other`
    pub fn sub(&self, other: &KpiValues) -> KpiValues {
        KpiValues::from_fn(|k| self.get(k) - other.get(k))
    }

    /// Field-wise division by a sample count
    pub fn div(&self, count: usize) -> KpiValues {
        let n = count as f64;
        KpiValues::from_fn(|k| self.get(k) / n)
    }
}

/// Mean KPI values of one contract
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractKpis {
    pub contract_id: String,
    pub means: KpiValues,
    /// Number of event rows averaged
    pub sample_count: usize,
}

/// Mean KPI values over `events`
///
/// # Errors
/// `AnalysisError::EmptyInput` if `events` is empty.
pub fn aggregate_baseline<'a, I>(events: I) -> Result<KpiValues>
where
    I: IntoIterator<Item = &'a EventRecord>,
{
    let (means, count) = mean_of(events);
    if count == 0 {
        return Err(AnalysisError::EmptyInput {
            what: "KPI baseline".to_string(),
        });
    }
    Ok(means)
}

/// Mean KPI values per contract, in first-seen contract order
///
/// # Errors
/// `AnalysisError::EmptyInput` if `events` is empty.
pub fn aggregate_by_contract<'a, I>(events: I) -> Result<IndexMap<String, ContractKpis>>
where
    I: IntoIterator<Item = &'a EventRecord>,
{
    let mut groups: IndexMap<&str, Vec<&EventRecord>> = IndexMap::new();
    for event in events {
        groups.entry(event.contract_id.as_str()).or_default().push(event);
    }

    if groups.is_empty() {
        return Err(AnalysisError::EmptyInput {
            what: "per-contract KPIs".to_string(),
        });
    }

    Ok(groups
        .into_iter()
        .map(|(contract, rows)| {
            let (means, sample_count) = mean_of(rows);
            (
                contract.to_string(),
                ContractKpis {
                    contract_id: contract.to_string(),
                    means,
                    sample_count,
                },
            )
        })
        .collect())
}

/// Population standard deviation of each KPI over footprint-level means
///
/// Returns `None` when `samples` is empty.
pub fn spread(samples: &[KpiValues]) -> Option<KpiValues> {
    if samples.is_empty() {
        return None;
    }

    let column = |kpi: Kpi| -> Vec<f64> { samples.iter().map(|s| s.get(kpi)).collect() };
    let mut out = KpiValues::default();
    for kpi in Kpi::ALL {
        let sd = stats::std_dev(&column(kpi))?;
        match kpi {
            Kpi::Oee => out.oee = sd,
            Kpi::LeadTime => out.lead_time = sd,
            Kpi::MalfunctionDuration => out.malfunction_duration = sd,
            Kpi::RejectedQuantity => out.rejected_quantity = sd,
        }
    }
    Some(out)
}

fn mean_of<'a, I>(events: I) -> (KpiValues, usize)
where
    I: IntoIterator<Item = &'a EventRecord>,
{
    let mut count = 0usize;
    let mut oee = 0.0;
    let mut rejected = 0.0;
    let mut lead_time = Duration::zero();
    let mut malfunction = Duration::zero();

    for event in events {
        count += 1;
        oee += event.oee;
        rejected += event.rejected_quantity;
        lead_time = lead_time + event.lead_time;
        malfunction = malfunction + event.malfunction_duration;
    }

    if count == 0 {
        return (KpiValues::default(), 0);
    }

    let n = count as f64;
    let values = KpiValues {
        oee: oee / n,
        lead_time: mean_duration_secs(lead_time, count),
        malfunction_duration: mean_duration_secs(malfunction, count),
        rejected_quantity: rejected / n,
    };
    (values, count)
}

fn mean_duration_secs(total: Duration, count: usize) -> f64 {
    match i32::try_from(count) {
        Ok(n) => duration_secs(total / n),
        Err(_) => duration_secs(total) / count as f64,
    }
}
