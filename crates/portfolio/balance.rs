use crate::error::Result;
use crate::record::{Dataset, ReferencePair};
use crate::stats::{summarize, Column, Difference, Stat, SummaryTable};

pub const BALANCE_COLUMNS: [Column; 4] = [
    Column {
        name: "current balance mean",
        field: |r| r.current_balance,
        stat: Stat::Mean,
    },
    Column {
        name: "current balance median",
        field: |r| r.current_balance,
        stat: Stat::Median,
    },
    Column {
        name: "total_paid mean",
        field: |r| r.total_paid,
        stat: Stat::Mean,
    },
    Column {
        name: "total_paid median",
        field: |r| r.total_paid,
        stat: Stat::Median,
    },
];

pub const FEE_COLUMNS: [Column; 2] = [
    Column {
        name: "total_fees mean",
        field: |r| r.total_fees,
        stat: Stat::Mean,
    },
    Column {
        name: "total_fees median",
        field: |r| r.total_fees,
        stat: Stat::Median,
    },
];

/// Current balance and total paid per portfolio; the comparison row is the
/// first reference portfolio relative to the second.
pub fn balance_stats(dataset: &Dataset, pair: &ReferencePair) -> Result<SummaryTable> {
    summarize(dataset, &BALANCE_COLUMNS, pair, Difference::VsSecond)
}

pub fn fee_stats(dataset: &Dataset, pair: &ReferencePair) -> Result<SummaryTable> {
    summarize(dataset, &FEE_COLUMNS, pair, Difference::VsSecond)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{PortfolioId, Record};
    use chrono::NaiveDate;

    fn account(portfolio: &str, balance: Option<f64>, paid: Option<f64>, fees: Option<f64>) -> Record {
        Record {
            portfolio: PortfolioId::from(portfolio),
            current_balance: balance,
            total_paid: paid,
            total_fees: fees,
            ..Default::default()
        }
    }

    fn dataset(records: Vec<Record>) -> Dataset {
        Dataset::new(records, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
    }

    #[test]
    fn test_balance_stats() {
        let ds = dataset(vec![
            account("1", Some(100.0), Some(10.0), None),
            account("1", Some(300.0), None, None),
            account("2", Some(200.0), Some(40.0), None),
            account("2", Some(200.0), Some(60.0), None),
        ]);
        let pair = ds.reference_pair(None, None).unwrap();
        let table = balance_stats(&ds, &pair).unwrap();
        let one = PortfolioId::from("1");

        assert_eq!(table.value(&one, "current balance mean"), Some(200.0));
        assert_eq!(table.value(&one, "total_paid mean"), Some(10.0));
        assert_eq!(table.difference.label, "% Difference (vs 2nd)");
        assert_eq!(table.difference("current balance mean"), Some(0.0));
        assert_eq!(table.difference("total_paid mean"), Some(-80.0));
        assert_eq!(table.difference("total_paid median"), Some(-80.0));
    }

    #[test]
    fn test_zero_balance_gives_undefined_difference() {
        let ds = dataset(vec![
            account("1", Some(50.0), Some(5.0), Some(1.0)),
            account("2", Some(0.0), Some(5.0), Some(1.0)),
        ]);
        let pair = ds.reference_pair(None, None).unwrap();
        let table = balance_stats(&ds, &pair).unwrap();
        assert_eq!(table.difference("current balance mean"), None);
        assert_eq!(table.difference("current balance median"), None);
        assert_eq!(table.difference("total_paid mean"), Some(0.0));
    }

    #[test]
    fn test_fee_stats() {
        let ds = dataset(vec![
            account("1", None, None, Some(30.0)),
            account("1", None, None, None),
            account("1", None, None, Some(10.0)),
            account("2", None, None, Some(10.0)),
            account("2", None, None, Some(30.0)),
            account("2", None, None, Some(50.0)),
        ]);
        let pair = ds.reference_pair(None, None).unwrap();
        let table = fee_stats(&ds, &pair).unwrap();
        let one = PortfolioId::from("1");

        assert_eq!(table.columns, ["total_fees mean", "total_fees median"]);
        assert_eq!(table.value(&one, "total_fees mean"), Some(20.0));
        assert_eq!(table.difference("total_fees mean"), Some(-33.33));
        assert_eq!(table.difference("total_fees median"), Some(-33.33));
    }

    #[test]
    fn test_fee_stats_without_fees_are_undefined() {
        let ds = dataset(vec![
            account("1", None, None, Some(5.0)),
            account("2", None, None, None),
        ]);
        let pair = ds.reference_pair(None, None).unwrap();
        let table = fee_stats(&ds, &pair).unwrap();
        assert_eq!(table.value(&PortfolioId::from("2"), "total_fees mean"), None);
        assert_eq!(table.difference("total_fees mean"), None);
    }
}
