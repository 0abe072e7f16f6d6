//! Descriptive statistics and KPIs over a debt portfolio dataset.
//!
//! Raw rows are normalized once into a [`Dataset`]; every table is then a
//! pure function of that dataset and can be computed on its own.

pub mod balance;
pub mod debt;
pub mod demographics;
pub mod error;
pub mod kpi;
pub mod normalize;
pub mod record;
pub mod source;
pub mod stats;

pub use error::{Error, Result};
pub use record::{Dataset, PortfolioId, RawRecord, Record, ReferencePair};

use chrono::NaiveDate;
use debt::TrendRow;
use demographics::{LocationCount, ProfileRow};
use kpi::KpiRow;
use log::info;
use serde::Serialize;
use stats::SummaryTable;

/// Knobs for a full report run.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub first: Option<PortfolioId>,
    pub second: Option<PortfolioId>,
    /// Rows per portfolio kept in the city and county tables.
    pub top: Option<usize>,
}

/// Every table of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub reference_date: NaiveDate,
    pub pair: ReferencePair,
    pub profile: Vec<ProfileRow>,
    pub cities: Vec<LocationCount>,
    pub counties: Vec<LocationCount>,
    pub debt_size: SummaryTable,
    pub default_trend: Vec<TrendRow>,
    pub balance: SummaryTable,
    pub fees: SummaryTable,
    pub kpi: Vec<KpiRow>,
}

impl Report {
    pub fn build(dataset: &Dataset, options: &Options) -> Result<Report> {
        let pair = dataset.reference_pair(options.first.clone(), options.second.clone())?;
        info!(
            "analyzing {} records, comparing portfolio {} with {}",
            dataset.len(),
            pair.first,
            pair.second
        );

        let mut cities = demographics::city_distribution(dataset);
        let mut counties = demographics::county_distribution(dataset);
        if let Some(n) = options.top {
            cities = demographics::top_n(&cities, n);
            counties = demographics::top_n(&counties, n);
        }

        Ok(Report {
            reference_date: dataset.reference_date(),
            profile: demographics::profile_stats(dataset),
            cities,
            counties,
            debt_size: debt::debt_size_stats(dataset, &pair)?,
            default_trend: debt::default_trend(dataset),
            balance: balance::balance_stats(dataset, &pair)?,
            fees: balance::fee_stats(dataset, &pair)?,
            kpi: kpi::kpis(dataset),
            pair,
        })
    }
}

/// Load, normalize and analyze a CSV file in one go.
pub fn analyze_csv<P: AsRef<std::path::Path>>(
    filename: P,
    reference_date: NaiveDate,
    options: &Options,
) -> Result<Report> {
    let raw = source::load_csv(filename)?;
    let dataset = normalize::normalize(&raw, reference_date);
    Report::build(&dataset, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
ID,Portfolio #,Date_of_birth,Gender,city,county,duedate,original_sum,principal,interest,current balance,total_paid,fee 1,fee 2,fee 3,fee 4
1,1,01/01/1980,Male,Riga,Riga,15/01/2023,100,80,20,50,50,1,1,1,1
2,1,,Female,Riga,Riga,20/02/2023,100,90,10,100,0,,,,
3,2,15/06/1990,Male,Liepaja,Kurzeme,03/01/2023,200,150,50,50,150,2,2,2,2
4,2,bad,Female,Ventspils,Kurzeme,,200,150,50,0,200,5,,,
";

    fn sample() -> Dataset {
        let raw = source::read_records(SAMPLE.as_bytes()).unwrap();
        normalize::normalize(&raw, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
    }

    #[test]
    fn test_report_build() {
        let ds = sample();
        let report = Report::build(&ds, &Options::default()).unwrap();
        let one = PortfolioId::from("1");

        assert_eq!(report.pair.first, one);
        assert_eq!(report.profile[0].mean_age, Some(44.0));
        assert_eq!(report.profile[1].male_ratio, 50.0);
        assert_eq!(report.cities.len(), 3);
        assert_eq!(report.counties.len(), 2);
        assert_eq!(report.default_trend.len(), 3);
        assert_eq!(
            report.debt_size.difference("Average_Sum_Borrowed"),
            Some(100.0)
        );
        assert_eq!(report.fees.value(&one, "total_fees mean"), Some(4.0));
        assert_eq!(report.kpi[0].recovery_rate, Some(25.0));
        assert_eq!(report.kpi[1].recovery_rate, Some(87.5));
    }

    #[test]
    fn test_report_is_idempotent() {
        let ds = sample();
        let a = Report::build(&ds, &Options::default()).unwrap();
        let b = Report::build(&sample(), &Options::default()).unwrap();
        assert_eq!(a, b);
        assert_eq!(format!("{:?}", a), format!("{:?}", b));
    }

    #[test]
    fn test_top_option() {
        let ds = sample();
        let options = Options {
            top: Some(1),
            ..Default::default()
        };
        let report = Report::build(&ds, &options).unwrap();
        assert_eq!(report.cities.len(), 2);
        assert_eq!(report.cities[0].location, "Riga");
    }

    #[test]
    fn test_missing_reference_portfolio() {
        let ds = sample();
        let options = Options {
            second: Some("3".into()),
            ..Default::default()
        };
        assert!(matches!(
            Report::build(&ds, &options),
            Err(Error::MissingPortfolio(_))
        ));
    }
}
