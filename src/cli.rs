//! Command-line interface definitions and argument parsing

use clap::Parser;

/// Customer churn exploratory analysis CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input CSV file
    #[arg(short, long, default_value = "churn.csv")]
    pub input: String,

    /// Directory where chart PNGs are written
    #[arg(short, long, default_value = "plots")]
    pub out_dir: String,

    /// First payment method for the two-sample t-test
    #[arg(long, default_value = "Electronic check")]
    pub group_a: String,

    /// Second payment method for the two-sample t-test
    #[arg(long, default_value = "Bank transfer (automatic)")]
    pub group_b: String,

    /// Skip chart rendering (console output only)
    #[arg(long)]
    pub skip_plots: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// The pair of payment methods compared by the t-test.
    /// Comparing a group against itself is rejected.
    pub fn comparison_groups(&self) -> crate::Result<(&str, &str)> {
        let a = self.group_a.trim();
        let b = self.group_b.trim();
        if a.is_empty() || b.is_empty() {
            anyhow::bail!("t-test group names must not be empty");
        }
        if a == b {
            anyhow::bail!("t-test groups must differ, got '{}' twice", a);
        }
        Ok((a, b))
    }
}
