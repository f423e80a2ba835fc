//! ChurnScope: Exploratory analysis CLI for a customer churn dataset
//!
//! This is the main entrypoint that orchestrates data loading and cleaning,
//! descriptive statistics, hypothesis tests, and chart rendering.

use anyhow::Result;
use churnscope::{data, stats, viz, Args};
use clap::Parser;
use std::time::Instant;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    if args.verbose {
        println!("ChurnScope - Customer Churn Exploratory Analysis");
        println!("================================================\n");
    }

    run_analysis(&args)
}

/// Run the full analysis pipeline
fn run_analysis(args: &Args) -> Result<()> {
    let (group_a, group_b) = args.comparison_groups()?;
    let start_time = Instant::now();

    // Step 1: Load and clean data
    if args.verbose {
        println!("Step 1: Loading and cleaning data");
        println!("  Input file: {}", args.input);
    }

    let data_start = Instant::now();
    let data = data::load_and_clean_data(&args.input)?;
    let data_time = data_start.elapsed();

    println!(
        "✓ Data loaded: {} rows ({} dropped during numeric cleaning)",
        data.len(),
        data.rows_dropped
    );
    println!(
        "Missing values remaining in cleaned dataset: {}",
        data.missing_values()
    );
    if args.verbose {
        println!("  Processing time: {:.2}s", data_time.as_secs_f64());
    }

    // Step 2: Tenure and revenue analysis
    println!("\n=== Tenure and Revenue ===");

    let tenure = data.tenure.to_vec();
    let totals = data.total_charges.to_vec();
    let correlation = stats::pearson_correlation(&tenure, &totals)?;
    println!(
        "Correlation between tenure and TotalCharges: {:.2}",
        correlation
    );

    let tenure_summary = stats::summarize(&tenure)?;
    print_summary("tenure", &tenure_summary);

    let total_outliers = stats::iqr_outliers(&totals)?;
    println!(
        "TotalCharges outliers: {} rows detected (bounds [{:.2}, {:.2}])",
        total_outliers.count(),
        total_outliers.lower_bound,
        total_outliers.upper_bound
    );

    // Step 3: Service adoption
    println!("\n=== Service Adoption ===");
    for (service, rate) in data.adoption_rates() {
        println!("  {}: {:.1}%", service, rate);
    }

    // Step 4: Payment method preferences and billing differences
    println!("\n=== Payment Methods ===");
    let counts = data.payment_method_counts();
    for (method, count) in &counts {
        println!("  {}: {} customers", method, count);
    }

    let groups = data.charges_by_payment_method();
    let samples: Vec<Vec<f64>> = groups.iter().map(|(_, charges)| charges.clone()).collect();
    let anova = stats::one_way_anova(&samples)?;
    println!("ANOVA test on MonthlyCharges by PaymentMethod:");
    println!(
        "F-statistic: {:.2}, p-value: {:.4}",
        anova.f_statistic, anova.p_value
    );
    if args.verbose {
        println!(
            "  Degrees of freedom: between = {}, within = {}",
            anova.df_between, anova.df_within
        );
    }

    let monthly = data.monthly_charges.to_vec();
    let monthly_outliers = stats::iqr_outliers(&monthly)?;
    println!(
        "MonthlyCharges outliers: {} rows detected (bounds [{:.2}, {:.2}])",
        monthly_outliers.count(),
        monthly_outliers.lower_bound,
        monthly_outliers.upper_bound
    );

    // Step 5: Billing comparison between two payment methods
    println!("\n=== Payment Method Comparison ===");
    let sample_a = data.monthly_charges_for(group_a);
    let sample_b = data.monthly_charges_for(group_b);
    if args.verbose {
        println!(
            "  Sample sizes: '{}' = {}, '{}' = {}",
            group_a,
            sample_a.len(),
            group_b,
            sample_b.len()
        );
    }

    let t_test = stats::welch_t_test(&sample_a, &sample_b)?;
    println!(
        "T-test comparing MonthlyCharges between '{}' and '{}':",
        group_a, group_b
    );
    println!(
        "t-statistic: {:.2}, p-value: {:.4}",
        t_test.t_statistic, t_test.p_value
    );

    // Step 6: Charts
    if args.skip_plots {
        println!("\nChart rendering skipped");
    } else {
        if args.verbose {
            println!("\nStep 6: Rendering charts");
            println!("  Output directory: {}", args.out_dir);
        }
        let viz_start = Instant::now();
        viz::render_report(&data, &args.out_dir)?;
        if args.verbose {
            println!("  Rendering time: {:.2}s", viz_start.elapsed().as_secs_f64());
        }
        println!("\n✓ Charts written to: {}", args.out_dir);
    }

    let total_time = start_time.elapsed();
    println!("\n=== Analysis Complete ===");
    println!("Total processing time: {:.2}s", total_time.as_secs_f64());

    Ok(())
}

/// Print a describe-style block for one numeric column
fn print_summary(name: &str, summary: &stats::SummaryStats) {
    println!("{} summary statistics:", name);
    println!("  count: {}", summary.count);
    println!("  mean:  {:.2}", summary.mean);
    println!("  std:   {:.2}", summary.std_dev);
    println!("  min:   {:.2}", summary.min);
    println!("  25%:   {:.2}", summary.q1);
    println!("  50%:   {:.2}", summary.median);
    println!("  75%:   {:.2}", summary.q3);
    println!("  max:   {:.2}", summary.max);
}
