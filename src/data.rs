//! Data loading and cleaning for the churn dataset using Polars

use std::collections::BTreeMap;

use ndarray::Array1;
use polars::prelude::*;

/// Service-subscription columns reported in the adoption-rate analysis
pub const SERVICE_COLUMNS: [&str; 5] = [
    "OnlineSecurity",
    "OnlineBackup",
    "TechSupport",
    "StreamingTV",
    "StreamingMovies",
];

/// Columns coerced to numeric during cleaning
pub const NUMERIC_COLUMNS: [&str; 3] = ["tenure", "MonthlyCharges", "TotalCharges"];

/// Cleaned churn table with numeric columns fully coerced
#[derive(Debug)]
pub struct ChurnData {
    /// Customer tenure in months
    pub tenure: Array1<f64>,
    /// Monthly charge per customer
    pub monthly_charges: Array1<f64>,
    /// Lifetime charge per customer
    pub total_charges: Array1<f64>,
    /// Payment method label per customer, if present
    pub payment_methods: Vec<Option<String>>,
    /// Service-subscription columns in `SERVICE_COLUMNS` order
    pub services: Vec<(String, Vec<Option<String>>)>,
    /// Row count of the raw file
    pub rows_loaded: usize,
    /// Rows discarded because a numeric column failed coercion
    pub rows_dropped: usize,
}

impl ChurnData {
    /// Number of rows surviving cleaning
    pub fn len(&self) -> usize {
        self.tenure.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tenure.is_empty()
    }

    /// Missing values remaining in the categorical columns
    pub fn missing_values(&self) -> usize {
        let in_payment = self.payment_methods.iter().filter(|v| v.is_none()).count();
        let in_services: usize = self
            .services
            .iter()
            .map(|(_, column)| column.iter().filter(|v| v.is_none()).count())
            .sum();
        in_payment + in_services
    }

    /// Monthly charges of customers using the given payment method
    pub fn monthly_charges_for(&self, method: &str) -> Vec<f64> {
        self.payment_methods
            .iter()
            .zip(self.monthly_charges.iter())
            .filter_map(|(label, &charge)| match label {
                Some(name) if name == method => Some(charge),
                _ => None,
            })
            .collect()
    }

    /// Monthly charges partitioned by payment method, sorted by label.
    /// Rows with a missing payment method are excluded.
    pub fn charges_by_payment_method(&self) -> Vec<(String, Vec<f64>)> {
        let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for (label, &charge) in self.payment_methods.iter().zip(self.monthly_charges.iter()) {
            if let Some(name) = label {
                groups.entry(name).or_default().push(charge);
            }
        }
        groups
            .into_iter()
            .map(|(name, charges)| (name.to_string(), charges))
            .collect()
    }

    /// Customer count per payment method, most frequent first
    pub fn payment_method_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = self
            .charges_by_payment_method()
            .into_iter()
            .map(|(name, charges)| (name, charges.len()))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts
    }

    /// Adoption rate in percent for each service column, in `SERVICE_COLUMNS` order
    pub fn adoption_rates(&self) -> Vec<(String, f64)> {
        self.services
            .iter()
            .map(|(name, column)| (name.clone(), crate::stats::adoption_rate(column)))
            .collect()
    }
}

/// Load the churn CSV, coerce the numeric columns, and drop incomplete rows
///
/// Unparseable numeric entries become null (the coercion never raises) and
/// any row null in one of `NUMERIC_COLUMNS` is removed from the working set.
///
/// # Arguments
/// * `file_path` - Path to the CSV file
///
/// # Returns
/// * `ChurnData` with fully numeric charge columns and cleaning counters
pub fn load_and_clean_data(file_path: &str) -> crate::Result<ChurnData> {
    // Read every column as a string so malformed numeric entries survive
    // to the non-strict cast instead of failing the scan.
    let raw = LazyCsvReader::new(file_path)
        .with_infer_schema_length(Some(0))
        .finish()?
        .with_columns(NUMERIC_COLUMNS.map(|name| col(name).cast(DataType::Float64)))
        .collect()?;

    let rows_loaded = raw.height();
    if rows_loaded == 0 {
        anyhow::bail!("no rows found in {}", file_path);
    }

    let clean = raw
        .lazy()
        .drop_nulls(Some(NUMERIC_COLUMNS.iter().map(|&name| col(name)).collect()))
        .collect()?;

    if clean.height() == 0 {
        anyhow::bail!("no rows left after numeric cleaning of {}", file_path);
    }
    let rows_dropped = rows_loaded - clean.height();

    let tenure = numeric_column(&clean, "tenure")?;
    let monthly_charges = numeric_column(&clean, "MonthlyCharges")?;
    let total_charges = numeric_column(&clean, "TotalCharges")?;
    let payment_methods = string_column(&clean, "PaymentMethod")?;

    let services = SERVICE_COLUMNS
        .iter()
        .map(|name| Ok(((*name).to_string(), string_column(&clean, name)?)))
        .collect::<crate::Result<Vec<_>>>()?;

    Ok(ChurnData {
        tenure,
        monthly_charges,
        total_charges,
        payment_methods,
        services,
        rows_loaded,
        rows_dropped,
    })
}

/// Extract a fully coerced numeric column as an ndarray vector
fn numeric_column(df: &DataFrame, name: &str) -> crate::Result<Array1<f64>> {
    let values: Vec<f64> = df.column(name)?.f64()?.into_no_null_iter().collect();
    Ok(Array1::from_vec(values))
}

/// Extract a categorical column, keeping missing entries as `None`
fn string_column(df: &DataFrame, name: &str) -> crate::Result<Vec<Option<String>>> {
    Ok(df
        .column(name)?
        .utf8()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}
