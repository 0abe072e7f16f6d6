use crate::record::{Dataset, PortfolioId};
use crate::stats::{ratio, round2};
use serde::Serialize;
use std::collections::BTreeSet;

/// Financial KPIs of one portfolio together with the totals they come from.
///
/// A KPI is `None` when its denominator is zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiRow {
    pub portfolio: PortfolioId,
    pub original_sum: f64,
    pub total_paid: f64,
    pub current_balance: f64,
    pub unique_debtors: usize,
    pub recovery_rate: Option<f64>,
    pub collection_efficiency: Option<f64>,
    pub debt_to_original: Option<f64>,
    pub avg_payment_per_debtor: Option<f64>,
}

pub fn kpis(dataset: &Dataset) -> Vec<KpiRow> {
    dataset
        .groups()
        .into_iter()
        .map(|(portfolio, records)| {
            let original_sum: f64 = records.iter().filter_map(|r| r.original_sum).sum();
            let total_paid: f64 = records.iter().filter_map(|r| r.total_paid).sum();
            let current_balance: f64 = records.iter().filter_map(|r| r.current_balance).sum();
            let unique_debtors = records
                .iter()
                .map(|r| r.id.as_str())
                .collect::<BTreeSet<_>>()
                .len();

            let percent = |num: f64, den: f64| ratio(num, den).map(|v| round2(v * 100.0));
            KpiRow {
                portfolio: portfolio.clone(),
                original_sum,
                total_paid,
                current_balance,
                unique_debtors,
                recovery_rate: percent(total_paid, original_sum),
                collection_efficiency: percent(total_paid, total_paid + current_balance),
                debt_to_original: percent(current_balance, original_sum),
                avg_payment_per_debtor: ratio(total_paid, unique_debtors as f64).map(round2),
            }
        })
        .collect()
}
