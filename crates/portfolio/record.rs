use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Portfolio key as it appears in the `Portfolio #` column.
///
/// Numeric identifiers order numerically (`2 < 10`), anything else orders as
/// text after all numeric ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PortfolioId(String);

impl PortfolioId {
    pub fn new(id: impl Into<String>) -> Self {
        PortfolioId(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Integer value of the id, accepting integral floats such as `"10.0"`.
    fn numeric(&self) -> Option<i64> {
        if let Ok(n) = self.0.parse::<i64>() {
            return Some(n);
        }
        let value = self.0.parse::<f64>().ok()?;
        if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            Some(value as i64)
        } else {
            None
        }
    }
}

impl From<&str> for PortfolioId {
    fn from(s: &str) -> Self {
        PortfolioId::new(s)
    }
}

impl fmt::Display for PortfolioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Ord for PortfolioId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for PortfolioId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One row of the input file, before normalization.
///
/// Numeric cells that fail to parse are read as `None`, and so are cells
/// missing from a short row.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Portfolio #")]
    pub portfolio: String,
    #[serde(rename = "Date_of_birth")]
    pub date_of_birth: Option<String>,
    #[serde(rename = "Gender")]
    pub gender: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub duedate: Option<String>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub original_sum: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub principal: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub interest: Option<f64>,
    #[serde(rename = "current balance", deserialize_with = "csv::invalid_option")]
    pub current_balance: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub total_paid: Option<f64>,
    #[serde(rename = "fee 1", deserialize_with = "csv::invalid_option")]
    pub fee_1: Option<f64>,
    #[serde(rename = "fee 2", deserialize_with = "csv::invalid_option")]
    pub fee_2: Option<f64>,
    #[serde(rename = "fee 3", deserialize_with = "csv::invalid_option")]
    pub fee_3: Option<f64>,
    #[serde(rename = "fee 4", deserialize_with = "csv::invalid_option")]
    pub fee_4: Option<f64>,
}

/// A normalized record: parsed dates plus the derived `total_fees` and
/// `Customer_age` columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Record {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Portfolio #")]
    pub portfolio: PortfolioId,
    #[serde(rename = "Date_of_birth")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(rename = "Gender")]
    pub gender: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub duedate: Option<NaiveDate>,
    pub original_sum: Option<f64>,
    pub principal: Option<f64>,
    pub interest: Option<f64>,
    #[serde(rename = "current balance")]
    pub current_balance: Option<f64>,
    pub total_paid: Option<f64>,
    #[serde(rename = "fee 1")]
    pub fee_1: Option<f64>,
    #[serde(rename = "fee 2")]
    pub fee_2: Option<f64>,
    #[serde(rename = "fee 3")]
    pub fee_3: Option<f64>,
    #[serde(rename = "fee 4")]
    pub fee_4: Option<f64>,
    pub total_fees: Option<f64>,
    #[serde(rename = "Customer_age")]
    pub customer_age: Option<i64>,
}

impl Record {
    pub fn fees(&self) -> [Option<f64>; 4] {
        [self.fee_1, self.fee_2, self.fee_3, self.fee_4]
    }

    pub fn is_male(&self) -> bool {
        self.gender.as_deref() == Some("Male")
    }
}

/// The two portfolios every comparison row is computed between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferencePair {
    pub first: PortfolioId,
    pub second: PortfolioId,
}

/// Immutable, normalized dataset shared by all aggregations.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
    reference_date: NaiveDate,
}

impl Dataset {
    pub fn new(records: Vec<Record>, reference_date: NaiveDate) -> Self {
        Dataset {
            records,
            reference_date,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records grouped by portfolio, groups in ascending portfolio order and
    /// records in file order.
    pub fn groups(&self) -> BTreeMap<&PortfolioId, Vec<&Record>> {
        let mut grouped: BTreeMap<&PortfolioId, Vec<&Record>> = BTreeMap::new();
        for record in &self.records {
            grouped.entry(&record.portfolio).or_default().push(record);
        }
        grouped
    }

    /// Distinct portfolio ids in ascending order.
    pub fn portfolios(&self) -> Vec<&PortfolioId> {
        self.groups().into_keys().collect()
    }

    /// Resolve the comparison pair. Missing ids fall back to the first two
    /// portfolios in sorted order.
    pub fn reference_pair(
        &self,
        first: Option<PortfolioId>,
        second: Option<PortfolioId>,
    ) -> Result<ReferencePair> {
        if self.is_empty() {
            return Err(Error::EmptyDataset);
        }
        let portfolios = self.portfolios();
        let known = |id: PortfolioId| -> Result<PortfolioId> {
            if portfolios.contains(&&id) {
                Ok(id)
            } else {
                Err(Error::MissingPortfolio(id))
            }
        };

        let first = match first {
            Some(id) => known(id)?,
            None => portfolios[0].clone(),
        };
        let second = match second {
            Some(id) => known(id)?,
            None => portfolios
                .iter()
                .find(|id| ***id != first)
                .map(|id| (*id).clone())
                .ok_or(Error::NotEnoughPortfolios(portfolios.len()))?,
        };
        if first == second {
            return Err(Error::NotEnoughPortfolios(1));
        }
        Ok(ReferencePair { first, second })
    }
}
