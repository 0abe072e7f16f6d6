use crate::error::Result;
use crate::record::{Dataset, PortfolioId, ReferencePair};
use crate::stats::{summarize, Column, Difference, Stat, SummaryTable};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

pub const DEBT_SIZE_COLUMNS: [Column; 6] = [
    Column {
        name: "Average_Sum_Borrowed",
        field: |r| r.original_sum,
        stat: Stat::Mean,
    },
    Column {
        name: "Average_Principal",
        field: |r| r.principal,
        stat: Stat::Mean,
    },
    Column {
        name: "Average_Interest",
        field: |r| r.interest,
        stat: Stat::Mean,
    },
    Column {
        name: "Median_Sum_Borrowed",
        field: |r| r.original_sum,
        stat: Stat::Median,
    },
    Column {
        name: "Median_Principal",
        field: |r| r.principal,
        stat: Stat::Median,
    },
    Column {
        name: "Median_Interest",
        field: |r| r.interest,
        stat: Stat::Median,
    },
];

/// Mean and median loan size per portfolio, with the growth of the second
/// reference portfolio over the first.
pub fn debt_size_stats(dataset: &Dataset, pair: &ReferencePair) -> Result<SummaryTable> {
    summarize(dataset, &DEBT_SIZE_COLUMNS, pair, Difference::VsFirst)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendRow {
    /// First day of the due-date month.
    pub month: NaiveDate,
    pub portfolio: PortfolioId,
    pub debtors: usize,
}

/// Distinct debtors per due-date month and portfolio. Records without a
/// due date are skipped.
pub fn default_trend(dataset: &Dataset) -> Vec<TrendRow> {
    let mut months: BTreeMap<(NaiveDate, &PortfolioId), BTreeSet<&str>> = BTreeMap::new();
    for record in dataset.records() {
        let Some(due) = record.duedate else {
            continue;
        };
        let Some(month) = due.with_day(1) else {
            continue;
        };
        months
            .entry((month, &record.portfolio))
            .or_default()
            .insert(record.id.as_str());
    }
    months
        .into_iter()
        .map(|((month, portfolio), ids)| TrendRow {
            month,
            portfolio: portfolio.clone(),
            debtors: ids.len(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    fn loan(id: &str, portfolio: &str, original_sum: f64, principal: f64, interest: f64) -> Record {
        Record {
            id: id.to_string(),
            portfolio: PortfolioId::from(portfolio),
            original_sum: Some(original_sum),
            principal: Some(principal),
            interest: Some(interest),
            ..Default::default()
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dataset(records: Vec<Record>) -> Dataset {
        Dataset::new(records, ymd(2024, 6, 30))
    }

    #[test]
    fn test_debt_size_stats() {
        let ds = dataset(vec![
            loan("a", "1", 100.0, 80.0, 20.0),
            loan("b", "1", 300.0, 240.0, 60.0),
            loan("c", "1", 110.0, 100.0, 10.0),
            loan("d", "2", 200.0, 150.0, 50.0),
            loan("e", "2", 600.0, 450.0, 150.0),
        ]);
        let pair = ds.reference_pair(None, None).unwrap();
        let table = debt_size_stats(&ds, &pair).unwrap();
        let one = PortfolioId::from("1");
        let two = PortfolioId::from("2");

        assert_eq!(table.columns.len(), 6);
        assert_eq!(table.value(&one, "Average_Sum_Borrowed"), Some(170.0));
        assert_eq!(table.value(&one, "Median_Sum_Borrowed"), Some(110.0));
        assert_eq!(table.value(&one, "Average_Interest"), Some(30.0));
        assert_eq!(table.value(&two, "Average_Sum_Borrowed"), Some(400.0));
        assert_eq!(table.value(&two, "Median_Principal"), Some(300.0));

        assert_eq!(table.difference.label, "% Difference (vs 1st)");
        assert_eq!(table.difference("Median_Sum_Borrowed"), Some(263.64));
        assert_eq!(table.difference("Median_Principal"), Some(200.0));
        assert_eq!(table.difference("Average_Principal"), Some(114.29));
        assert_eq!(table.difference("Average_Interest"), Some(233.33));
    }

    #[test]
    fn test_growth_on_original_sum() {
        let ds = dataset(vec![
            loan("a", "1", 100.0, 0.0, 0.0),
            loan("b", "2", 200.0, 0.0, 0.0),
        ]);
        let pair = ds.reference_pair(None, None).unwrap();
        let table = debt_size_stats(&ds, &pair).unwrap();
        assert_eq!(table.difference("Average_Sum_Borrowed"), Some(100.0));
        // 0 / 0
        assert_eq!(table.difference("Average_Principal"), None);
    }

    #[test]
    fn test_foreign_pair_is_rejected() {
        let ds = dataset(vec![loan("a", "1", 1.0, 1.0, 1.0), loan("b", "2", 1.0, 1.0, 1.0)]);
        let pair = ReferencePair {
            first: "1".into(),
            second: "9".into(),
        };
        assert!(debt_size_stats(&ds, &pair).is_err());
    }

    #[test]
    fn test_default_trend() {
        let due = |id: &str, portfolio: &str, date: Option<NaiveDate>| Record {
            id: id.to_string(),
            portfolio: PortfolioId::from(portfolio),
            duedate: date,
            ..Default::default()
        };
        let ds = dataset(vec![
            due("1", "2", Some(ymd(2023, 1, 20))),
            due("2", "1", Some(ymd(2023, 1, 3))),
            due("3", "1", Some(ymd(2023, 1, 31))),
            due("3", "1", Some(ymd(2023, 1, 15))),
            due("4", "1", Some(ymd(2022, 12, 1))),
            due("5", "1", None),
        ]);
        let rows = default_trend(&ds);
        let got: Vec<(NaiveDate, &str, usize)> = rows
            .iter()
            .map(|r| (r.month, r.portfolio.as_str(), r.debtors))
            .collect();
        assert_eq!(
            got,
            [
                (ymd(2022, 12, 1), "1", 1),
                (ymd(2023, 1, 1), "1", 2),
                (ymd(2023, 1, 1), "2", 1),
            ]
        );
    }
}
