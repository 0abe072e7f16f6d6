use crate::record::{Dataset, PortfolioId, RawRecord, Record};
use chrono::NaiveDate;
use log::{debug, warn};

// two-digit years first: `%Y` would happily read "20" as year 20
const DATE_FORMATS: [&str; 8] = [
    "%d/%m/%y", "%d-%m-%y", "%d.%m.%y", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d", "%Y/%m/%d",
];

const DAYS_PER_YEAR: i64 = 365;

/// Parse a day-first date, ignoring any trailing time component.
///
/// Returns `None` for empty or unparseable input.
pub fn parse_day_first(value: &str) -> Option<NaiveDate> {
    let date_part = value.trim().split([' ', 'T']).next()?;
    if date_part.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

/// Whole years between `date_of_birth` and `reference`, floor of days / 365.
pub fn age_in_years(date_of_birth: NaiveDate, reference: NaiveDate) -> i64 {
    (reference - date_of_birth)
        .num_days()
        .div_euclid(DAYS_PER_YEAR)
}

/// Sum of the known fees. A missing fee adds nothing; `None` only if every
/// fee is missing.
pub fn total_fees(fees: &[Option<f64>]) -> Option<f64> {
    fees.iter().flatten().copied().reduce(|acc, fee| acc + fee)
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn date(value: &Option<String>, bad_dates: &mut usize) -> Option<NaiveDate> {
    let raw = value.as_deref()?;
    let parsed = parse_day_first(raw);
    if parsed.is_none() && !raw.trim().is_empty() {
        *bad_dates += 1;
    }
    parsed
}

/// Build the normalized dataset. The raw rows are left untouched and never
/// rejected: anything malformed becomes unknown. Rows without a portfolio
/// belong to no group and are left out.
pub fn normalize(raw: &[RawRecord], reference_date: NaiveDate) -> Dataset {
    let mut bad_dates = 0;
    let records: Vec<Record> = raw
        .iter()
        .filter(|row| !row.portfolio.trim().is_empty())
        .map(|row| {
            let date_of_birth = date(&row.date_of_birth, &mut bad_dates);
            let fees = [
                finite(row.fee_1),
                finite(row.fee_2),
                finite(row.fee_3),
                finite(row.fee_4),
            ];
            Record {
                id: row.id.trim().to_string(),
                portfolio: PortfolioId::new(row.portfolio.as_str()),
                date_of_birth,
                gender: text(&row.gender),
                city: text(&row.city),
                county: text(&row.county),
                duedate: date(&row.duedate, &mut bad_dates),
                original_sum: finite(row.original_sum),
                principal: finite(row.principal),
                interest: finite(row.interest),
                current_balance: finite(row.current_balance),
                total_paid: finite(row.total_paid),
                fee_1: fees[0],
                fee_2: fees[1],
                fee_3: fees[2],
                fee_4: fees[3],
                total_fees: total_fees(&fees),
                customer_age: date_of_birth.map(|dob| age_in_years(dob, reference_date)),
            }
        })
        .collect();

    let unassigned = raw.len() - records.len();
    if unassigned > 0 {
        warn!("{} rows have no portfolio, skipped", unassigned);
    }
    if bad_dates > 0 {
        warn!("{} date values could not be parsed, treated as unknown", bad_dates);
    }
    debug!(
        "normalized {} records, reference date {}",
        records.len(),
        reference_date
    );
    Dataset::new(records, reference_date)
}
