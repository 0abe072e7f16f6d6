pub mod data;

use data::{Cell, Table};
use polars::prelude::*;
use portfolio::debt::TrendRow;
use portfolio::demographics::{LocationCount, ProfileRow};
use portfolio::kpi::KpiRow;
use portfolio::stats::SummaryTable;
use portfolio::Report;

const PORTFOLIO: &str = "Portfolio #";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Profile,
    Cities,
    Counties,
    Debt,
    Trend,
    Balance,
    Fees,
    Kpi,
}

impl TableKind {
    pub const ALL: [TableKind; 8] = [
        TableKind::Profile,
        TableKind::Cities,
        TableKind::Counties,
        TableKind::Debt,
        TableKind::Trend,
        TableKind::Balance,
        TableKind::Fees,
        TableKind::Kpi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Profile => "profile",
            TableKind::Cities => "cities",
            TableKind::Counties => "counties",
            TableKind::Debt => "debt",
            TableKind::Trend => "trend",
            TableKind::Balance => "balance",
            TableKind::Fees => "fees",
            TableKind::Kpi => "kpi",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        TableKind::ALL.into_iter().find(|kind| kind.as_str() == s)
    }

    pub fn render(&self, report: &Report) -> Table {
        match self {
            TableKind::Profile => profile_table(&report.profile),
            TableKind::Cities => location_table("cities", "Top cities", "city", &report.cities),
            TableKind::Counties => {
                location_table("counties", "Top counties", "county", &report.counties)
            }
            TableKind::Debt => summary_table("debt", "Debt size", &report.debt_size),
            TableKind::Trend => trend_table(&report.default_trend),
            TableKind::Balance => summary_table("balance", "Balance", &report.balance),
            TableKind::Fees => summary_table("fees", "Fees", &report.fees),
            TableKind::Kpi => kpi_table(&report.kpi),
        }
    }
}

pub fn profile_table(rows: &[ProfileRow]) -> Table {
    let mut table = Table::new(
        "profile",
        "Borrower profile",
        &[PORTFOLIO, "Mean_Age", "Median_Age", "Male_Ratio"],
    );
    for row in rows {
        table.push(vec![
            row.portfolio.as_str().into(),
            row.mean_age.into(),
            row.median_age.into(),
            row.male_ratio.into(),
        ]);
    }
    table
}

pub fn location_table(name: &str, title: &str, column: &str, rows: &[LocationCount]) -> Table {
    let mut table = Table::new(
        name,
        title,
        &[PORTFOLIO, column, "Count", "Percent_in_Portfolio"],
    );
    for row in rows {
        table.push(vec![
            row.portfolio.as_str().into(),
            row.location.as_str().into(),
            row.count.into(),
            row.percent_in_portfolio.into(),
        ]);
    }
    table
}

/// Portfolio rows followed by the comparison row, whose cells are
/// percentages (`N/A` when undefined).
pub fn summary_table(name: &str, title: &str, summary: &SummaryTable) -> Table {
    let mut columns = vec![PORTFOLIO];
    columns.extend(summary.columns.iter().copied());
    let mut table = Table::new(name, title, &columns);
    for row in &summary.rows {
        let mut cells: Vec<Cell> = vec![row.portfolio.as_str().into()];
        cells.extend(row.values.iter().map(|v| Cell::from(*v)));
        table.push(cells);
    }
    let mut cells: Vec<Cell> = vec![summary.difference.label.into()];
    cells.extend(summary.difference.values.iter().map(|v| Cell::Percent(*v)));
    table.push(cells);
    table
}

pub fn trend_table(rows: &[TrendRow]) -> Table {
    let mut table = Table::new("trend", "Default trend", &["duedate", PORTFOLIO, "count"]);
    for row in rows {
        table.push(vec![
            row.month.format("%Y-%m-%d").to_string().into(),
            row.portfolio.as_str().into(),
            row.debtors.into(),
        ]);
    }
    table
}

pub fn kpi_table(rows: &[KpiRow]) -> Table {
    let mut table = Table::new(
        "kpi",
        "Financial KPIs",
        &[
            PORTFOLIO,
            "Recovery Rate (%)",
            "CER (%)",
            "DOR (%)",
            "Avg Payment per Debtor",
        ],
    );
    for row in rows {
        table.push(vec![
            row.portfolio.as_str().into(),
            row.recovery_rate.into(),
            row.collection_efficiency.into(),
            row.debt_to_original.into(),
            row.avg_payment_per_debtor.into(),
        ]);
    }
    table
}

pub fn render(report: &Report, kinds: &[TableKind]) -> Vec<Table> {
    kinds.iter().map(|kind| kind.render(report)).collect()
}

fn column_series(name: &str, cells: &[&Cell]) -> Series {
    if cells.iter().all(|c| matches!(c, Cell::Number(_))) {
        let values: Vec<Option<f64>> = cells.iter().map(|c| c.as_f64()).collect();
        Series::new(name, values)
    } else if cells.iter().all(|c| matches!(c, Cell::Int(_))) {
        let values: Vec<Option<i64>> = cells
            .iter()
            .map(|c| c.as_f64().map(|v| v as i64))
            .collect();
        Series::new(name, values)
    } else {
        let values: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
        Series::new(name, values)
    }
}

/// Columns holding only numbers become numeric series; any column mixing in
/// text (the comparison row) is rendered as strings.
pub fn to_dataframe(table: &Table) -> PolarsResult<DataFrame> {
    let series: Vec<Series> = table
        .columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells: Vec<&Cell> = table.rows.iter().map(|row| &row[idx]).collect();
            column_series(name, &cells)
        })
        .collect();
    DataFrame::new(series)
}

pub fn to_json(tables: &[Table]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use portfolio::stats::{Difference, SummaryRow};
    use portfolio::{PortfolioId, ReferencePair};

    fn balance() -> SummaryTable {
        SummaryTable {
            columns: vec!["current balance mean", "current balance median"],
            rows: vec![
                SummaryRow {
                    portfolio: "1".into(),
                    values: vec![Some(50.0), Some(40.0)],
                },
                SummaryRow {
                    portfolio: "2".into(),
                    values: vec![Some(0.0), None],
                },
            ],
            difference: portfolio::stats::DifferenceRow {
                label: Difference::VsSecond.label(),
                kind: Difference::VsSecond,
                pair: ReferencePair {
                    first: PortfolioId::from("1"),
                    second: PortfolioId::from("2"),
                },
                values: vec![None, None],
            },
        }
    }

    #[test]
    fn test_summary_table() {
        let table = summary_table("balance", "Balance", &balance());
        assert_eq!(
            table.columns,
            ["Portfolio #", "current balance mean", "current balance median"]
        );
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[2][0].to_string(), "% Difference (vs 2nd)");
        assert_eq!(table.rows[2][1].to_string(), "N/A");
        assert_eq!(table.rows[0][1].to_string(), "50.00");
    }

    #[test]
    fn test_to_dataframe() {
        let table = summary_table("balance", "Balance", &balance());
        let df = to_dataframe(&table).unwrap();
        assert_eq!(df.shape(), (3, 3));
        // the comparison row turns value columns into text
        assert_eq!(df.column("current balance mean").unwrap().dtype(), &DataType::String);

        let kpi = kpi_table(&[KpiRow {
            portfolio: "1".into(),
            original_sum: 100.0,
            total_paid: 50.0,
            current_balance: 50.0,
            unique_debtors: 1,
            recovery_rate: Some(50.0),
            collection_efficiency: Some(50.0),
            debt_to_original: Some(50.0),
            avg_payment_per_debtor: None,
        }]);
        let df = to_dataframe(&kpi).unwrap();
        assert_eq!(df.shape(), (1, 5));
        assert_eq!(df.column("Recovery Rate (%)").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("Avg Payment per Debtor").unwrap().null_count(), 1);
    }

    #[test]
    fn test_table_kind_names() {
        for kind in TableKind::ALL {
            assert_eq!(TableKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(TableKind::from_str("nope"), None);
    }

    #[test]
    fn test_to_json() {
        let table = location_table(
            "cities",
            "Top cities",
            "city",
            &[LocationCount {
                portfolio: "1".into(),
                location: "Riga".into(),
                count: 2,
                percent_in_portfolio: 100.0,
            }],
        );
        let json = to_json(&[table]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["name"], "cities");
        assert_eq!(value[0]["rows"][0][1], "Riga");
        assert_eq!(value[0]["rows"][0][2], 2);
    }
}
