use crate::error::{Error, Result};
use crate::record::{Dataset, PortfolioId, Record, ReferencePair};
use log::debug;
use serde::Serialize;

/// Round to two decimals, halves to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// `num / den`, or `None` when the quotient is not finite.
pub fn ratio(num: f64, den: f64) -> Option<f64> {
    let value = num / den;
    value.is_finite().then_some(value)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    Mean,
    Median,
}

impl Stat {
    pub fn apply(&self, values: &[f64]) -> Option<f64> {
        match self {
            Stat::Mean => mean(values),
            Stat::Median => median(values),
        }
    }
}

/// How a comparison row relates the two reference portfolios.
///
/// The two directions are not interchangeable: debt-size tables report the
/// growth of the second portfolio over the first, balance and fee tables
/// report the gap of the first portfolio relative to the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Difference {
    /// `(second / first - 1) * 100`
    VsFirst,
    /// `(first - second) / second * 100`
    VsSecond,
}

impl Difference {
    pub fn label(&self) -> &'static str {
        match self {
            Difference::VsFirst => "% Difference (vs 1st)",
            Difference::VsSecond => "% Difference (vs 2nd)",
        }
    }

    /// Percentage rounded to two decimals, `None` when undefined.
    pub fn apply(&self, first: Option<f64>, second: Option<f64>) -> Option<f64> {
        let (first, second) = (first?, second?);
        let pct = match self {
            Difference::VsFirst => (second / first - 1.0) * 100.0,
            Difference::VsSecond => (first - second) / second * 100.0,
        };
        pct.is_finite().then(|| round2(pct))
    }
}

/// One numeric column of a summary table.
#[derive(Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub field: fn(&Record) -> Option<f64>,
    pub stat: Stat,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub portfolio: PortfolioId,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifferenceRow {
    pub label: &'static str,
    pub kind: Difference,
    pub pair: ReferencePair,
    pub values: Vec<Option<f64>>,
}

/// Per-portfolio statistics plus one reference-difference row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable {
    pub columns: Vec<&'static str>,
    pub rows: Vec<SummaryRow>,
    pub difference: DifferenceRow,
}

impl SummaryTable {
    pub fn row(&self, portfolio: &PortfolioId) -> Option<&SummaryRow> {
        self.rows.iter().find(|row| &row.portfolio == portfolio)
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| *c == column)
    }

    pub fn value(&self, portfolio: &PortfolioId, column: &str) -> Option<f64> {
        let idx = self.column_index(column)?;
        self.row(portfolio)?.values[idx]
    }

    pub fn difference(&self, column: &str) -> Option<f64> {
        let idx = self.column_index(column)?;
        self.difference.values[idx]
    }
}

fn find_row<'a>(rows: &'a [SummaryRow], id: &PortfolioId) -> Result<&'a SummaryRow> {
    rows.iter()
        .find(|row| &row.portfolio == id)
        .ok_or_else(|| Error::MissingPortfolio(id.clone()))
}

/// Group the dataset by portfolio, reduce every column with its statistic
/// and append the comparison row computed on the rounded values.
pub fn summarize(
    dataset: &Dataset,
    columns: &[Column],
    pair: &ReferencePair,
    kind: Difference,
) -> Result<SummaryTable> {
    let rows: Vec<SummaryRow> = dataset
        .groups()
        .into_iter()
        .map(|(portfolio, records)| {
            let values = columns
                .iter()
                .map(|column| {
                    let sample: Vec<f64> =
                        records.iter().filter_map(|r| (column.field)(*r)).collect();
                    column.stat.apply(&sample).map(round2)
                })
                .collect();
            SummaryRow {
                portfolio: portfolio.clone(),
                values,
            }
        })
        .collect();

    let first = find_row(&rows, &pair.first)?;
    let second = find_row(&rows, &pair.second)?;
    let values = first
        .values
        .iter()
        .zip(&second.values)
        .map(|(a, b)| kind.apply(*a, *b))
        .collect();
    let difference = DifferenceRow {
        label: kind.label(),
        kind,
        pair: pair.clone(),
        values,
    };
    debug!(
        "summarized {} columns over {} portfolios",
        columns.len(),
        rows.len()
    );

    Ok(SummaryTable {
        columns: columns.iter().map(|c| c.name).collect(),
        rows,
        difference,
    })
}
