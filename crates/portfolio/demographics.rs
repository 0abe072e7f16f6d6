use crate::record::{Dataset, PortfolioId, Record};
use crate::stats::{mean, median, round2};
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileRow {
    pub portfolio: PortfolioId,
    pub mean_age: Option<f64>,
    pub median_age: Option<f64>,
    pub male_ratio: f64,
}

/// Age and gender profile per portfolio. Unknown ages are left out of the
/// age statistics; every record counts towards the male ratio denominator.
pub fn profile_stats(dataset: &Dataset) -> Vec<ProfileRow> {
    dataset
        .groups()
        .into_iter()
        .map(|(portfolio, records)| {
            let ages: Vec<f64> = records
                .iter()
                .filter_map(|r| r.customer_age)
                .map(|age| age as f64)
                .collect();
            let males = records.iter().filter(|r| r.is_male()).count();
            ProfileRow {
                portfolio: portfolio.clone(),
                mean_age: mean(&ages).map(round2),
                median_age: median(&ages).map(round2),
                male_ratio: round2(males as f64 / records.len() as f64 * 100.0),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    City,
    County,
}

impl Location {
    fn of<'a>(&self, record: &'a Record) -> Option<&'a str> {
        match self {
            Location::City => record.city.as_deref(),
            Location::County => record.county.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationCount {
    pub portfolio: PortfolioId,
    pub location: String,
    pub count: usize,
    pub percent_in_portfolio: f64,
}

/// Record counts per (portfolio, location), portfolio ascending then count
/// descending. Equal counts keep (portfolio, location) key order. Records
/// without a location are not counted.
pub fn location_distribution(dataset: &Dataset, location: Location) -> Vec<LocationCount> {
    let mut counts: BTreeMap<(&PortfolioId, &str), usize> = BTreeMap::new();
    for record in dataset.records() {
        if let Some(place) = location.of(record) {
            *counts.entry((&record.portfolio, place)).or_insert(0) += 1;
        }
    }

    let mut totals: BTreeMap<&PortfolioId, usize> = BTreeMap::new();
    for ((portfolio, _), count) in &counts {
        *totals.entry(*portfolio).or_insert(0) += count;
    }

    let mut rows: Vec<LocationCount> = counts
        .iter()
        .map(|((portfolio, place), count)| LocationCount {
            portfolio: (*portfolio).clone(),
            location: place.to_string(),
            count: *count,
            percent_in_portfolio: round2(*count as f64 / totals[portfolio] as f64 * 100.0),
        })
        .collect();
    // stable: ties stay in key order
    rows.sort_by(|a, b| a.portfolio.cmp(&b.portfolio).then(b.count.cmp(&a.count)));
    debug!("{:?} distribution: {} rows", location, rows.len());
    rows
}

pub fn city_distribution(dataset: &Dataset) -> Vec<LocationCount> {
    location_distribution(dataset, Location::City)
}

pub fn county_distribution(dataset: &Dataset) -> Vec<LocationCount> {
    location_distribution(dataset, Location::County)
}

/// Keep the first `n` rows of every portfolio in a sorted distribution.
pub fn top_n(rows: &[LocationCount], n: usize) -> Vec<LocationCount> {
    let mut seen: BTreeMap<&PortfolioId, usize> = BTreeMap::new();
    rows.iter()
        .filter(|row| {
            let taken = seen.entry(&row.portfolio).or_insert(0);
            *taken += 1;
            *taken <= n
        })
        .cloned()
        .collect()
}
