//! ChurnScope: A Rust CLI application for exploratory analysis of a customer churn dataset
//!
//! This library provides data cleaning, descriptive statistics, IQR outlier
//! detection, and classical hypothesis tests (one-way ANOVA, Welch's t-test)
//! over customer billing records, along with chart rendering.

pub mod cli;
pub mod data;
pub mod stats;
pub mod viz;

// Re-export public items for easier access
pub use cli::Args;
pub use data::{load_and_clean_data, ChurnData, SERVICE_COLUMNS};
pub use stats::{
    iqr_outliers, one_way_anova, pearson_correlation, summarize, welch_t_test, AnovaResult,
    OutlierSummary, SummaryStats, TTestResult,
};

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
