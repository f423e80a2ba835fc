//! Descriptive statistics and hypothesis tests over cleaned churn columns
//!
//! Quantiles use linear interpolation on the sorted sample (position
//! `(n - 1) * q`), matching the convention of mainstream dataframe
//! libraries. Variances are sample variances (ddof = 1).
//!
//! P-values come from `statrs` distributions:
//! - Welch's t-test: two-sided, `p = 2 * P(T > |t|)` with T ~ t(df) and df
//!   from the Welch-Satterthwaite approximation.
//! - One-way ANOVA: upper tail of F(k - 1, N - k).

use ndarray::aview1;
use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};

/// Describe-style summary of a numeric column
#[derive(Debug, Clone)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; NaN when fewer than 2 observations
    pub std_dev: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// IQR outlier bounds and the rows falling outside them
#[derive(Debug, Clone)]
pub struct OutlierSummary {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    /// Q1 - 1.5 * IQR
    pub lower_bound: f64,
    /// Q3 + 1.5 * IQR
    pub upper_bound: f64,
    /// Indices of values outside the bounds, in input order
    pub indices: Vec<usize>,
}

impl OutlierSummary {
    pub fn count(&self) -> usize {
        self.indices.len()
    }
}

/// One-way ANOVA result
#[derive(Debug, Clone)]
pub struct AnovaResult {
    pub f_statistic: f64,
    pub p_value: f64,
    pub df_between: f64,
    pub df_within: f64,
}

/// Two-sample t-test result
#[derive(Debug, Clone)]
pub struct TTestResult {
    pub t_statistic: f64,
    pub p_value: f64,
    pub df: f64,
}

/// Ordinary least-squares line through a scatter
#[derive(Debug, Clone, Copy)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Compute the describe-set of a numeric column
pub fn summarize(values: &[f64]) -> crate::Result<SummaryStats> {
    if values.is_empty() {
        anyhow::bail!("cannot summarize an empty column");
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let view = aview1(values);
    let std_dev = if values.len() > 1 {
        view.std(1.0)
    } else {
        f64::NAN
    };

    Ok(SummaryStats {
        count: values.len(),
        mean: view.mean().unwrap_or(f64::NAN),
        std_dev,
        min: sorted[0],
        q1: quantile_sorted(&sorted, 0.25),
        median: quantile_sorted(&sorted, 0.5),
        q3: quantile_sorted(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    })
}

/// Linearly interpolated quantile of a column, `q` in [0, 1]
pub fn quantile(values: &[f64], q: f64) -> crate::Result<f64> {
    if values.is_empty() {
        anyhow::bail!("cannot take a quantile of an empty column");
    }
    if !(0.0..=1.0).contains(&q) {
        anyhow::bail!("quantile must be in [0, 1], got {}", q);
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Ok(quantile_sorted(&sorted, q))
}

fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let pos = (n - 1) as f64 * q;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + frac * (sorted[upper] - sorted[lower])
}

/// Pearson correlation coefficient between two equal-length columns.
/// Returns 0 when either column has zero variance.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> crate::Result<f64> {
    if x.len() != y.len() {
        anyhow::bail!(
            "correlation requires equal-length samples, got {} and {}",
            x.len(),
            y.len()
        );
    }
    if x.len() < 2 {
        anyhow::bail!("correlation requires at least 2 samples");
    }

    let mean_x = mean_of(x);
    let mean_y = mean_of(y);

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x > 0.0 && var_y > 0.0 {
        Ok(cov / (var_x * var_y).sqrt())
    } else {
        Ok(0.0)
    }
}

/// Classify outliers using the boxplot method: values outside
/// [Q1 - 1.5 * IQR, Q3 + 1.5 * IQR]
pub fn iqr_outliers(values: &[f64]) -> crate::Result<OutlierSummary> {
    if values.is_empty() {
        anyhow::bail!("cannot detect outliers in an empty column");
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let q1 = quantile_sorted(&sorted, 0.25);
    let q3 = quantile_sorted(&sorted, 0.75);
    let iqr = q3 - q1;
    let lower_bound = q1 - 1.5 * iqr;
    let upper_bound = q3 + 1.5 * iqr;

    let indices = values
        .iter()
        .enumerate()
        .filter(|(_, &v)| v < lower_bound || v > upper_bound)
        .map(|(i, _)| i)
        .collect();

    Ok(OutlierSummary {
        q1,
        q3,
        iqr,
        lower_bound,
        upper_bound,
        indices,
    })
}

/// Percentage of non-missing entries equal to "Yes", in [0, 100].
/// A column with no observed entries reports 0.
pub fn adoption_rate(values: &[Option<String>]) -> f64 {
    let observed = values.iter().flatten().count();
    if observed == 0 {
        return 0.0;
    }
    let adopted = values
        .iter()
        .flatten()
        .filter(|v| v.as_str() == "Yes")
        .count();
    100.0 * adopted as f64 / observed as f64
}

/// One-way ANOVA F-test for equality of group means
///
/// # Arguments
/// * `groups` - At least two non-empty samples, one per category
pub fn one_way_anova(groups: &[Vec<f64>]) -> crate::Result<AnovaResult> {
    if groups.len() < 2 {
        anyhow::bail!("ANOVA requires at least two groups, got {}", groups.len());
    }
    if groups.iter().any(|g| g.is_empty()) {
        anyhow::bail!("ANOVA groups must be non-empty");
    }

    let n_total: usize = groups.iter().map(Vec::len).sum();
    if n_total <= groups.len() {
        anyhow::bail!("ANOVA requires more observations than groups");
    }

    let k = groups.len() as f64;
    let n = n_total as f64;
    let grand_mean = groups.iter().flatten().sum::<f64>() / n;

    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for group in groups {
        let group_mean = mean_of(group);
        ss_between += group.len() as f64 * (group_mean - grand_mean).powi(2);
        ss_within += group.iter().map(|&v| (v - group_mean).powi(2)).sum::<f64>();
    }

    let df_between = k - 1.0;
    let df_within = n - k;
    let ms_within = ss_within / df_within;
    if ms_within == 0.0 {
        anyhow::bail!("zero within-group variance, F-statistic undefined");
    }
    let f_statistic = (ss_between / df_between) / ms_within;

    let f_dist = FisherSnedecor::new(df_between, df_within)
        .map_err(|e| anyhow::anyhow!("invalid F distribution ({}, {}): {}", df_between, df_within, e))?;
    let p_value = 1.0 - f_dist.cdf(f_statistic);

    Ok(AnovaResult {
        f_statistic,
        p_value,
        df_between,
        df_within,
    })
}

/// Welch's two-sample t-test (unequal variances)
///
/// # Arguments
/// * `a`, `b` - Independent samples with at least 2 observations each
pub fn welch_t_test(a: &[f64], b: &[f64]) -> crate::Result<TTestResult> {
    if a.len() < 2 || b.len() < 2 {
        anyhow::bail!("t-test requires at least 2 samples per group");
    }

    let n1 = a.len() as f64;
    let n2 = b.len() as f64;
    let mean1 = mean_of(a);
    let mean2 = mean_of(b);
    let var1 = sample_variance(a);
    let var2 = sample_variance(b);

    let se_sq = var1 / n1 + var2 / n2;
    if se_sq == 0.0 {
        anyhow::bail!("zero variance in both samples, t-statistic undefined");
    }
    let t_statistic = (mean1 - mean2) / se_sq.sqrt();

    // Welch-Satterthwaite degrees of freedom
    let df = se_sq.powi(2)
        / ((var1 / n1).powi(2) / (n1 - 1.0) + (var2 / n2).powi(2) / (n2 - 1.0));

    let t_dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| anyhow::anyhow!("invalid t distribution (df = {}): {}", df, e))?;
    let p_value = 2.0 * (1.0 - t_dist.cdf(t_statistic.abs()));

    Ok(TTestResult {
        t_statistic,
        p_value,
        df,
    })
}

/// Fit y = intercept + slope * x by ordinary least squares
pub fn linear_fit(x: &[f64], y: &[f64]) -> crate::Result<LinearFit> {
    if x.len() != y.len() {
        anyhow::bail!(
            "regression requires equal-length samples, got {} and {}",
            x.len(),
            y.len()
        );
    }
    if x.len() < 2 {
        anyhow::bail!("regression requires at least 2 samples");
    }

    let mean_x = mean_of(x);
    let mean_y = mean_of(y);

    let mut ss_xx = 0.0;
    let mut ss_xy = 0.0;
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        ss_xx += dx * dx;
        ss_xy += dx * (yi - mean_y);
    }

    if ss_xx == 0.0 {
        anyhow::bail!("x has zero variance, regression line undefined");
    }

    let slope = ss_xy / ss_xx;
    Ok(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

fn mean_of(values: &[f64]) -> f64 {
    aview1(values).mean().unwrap_or(f64::NAN)
}

fn sample_variance(values: &[f64]) -> f64 {
    aview1(values).var(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHARGES: [f64; 6] = [20.0, 22.0, 24.0, 26.0, 28.0, 100.0];

    #[test]
    fn test_quantile_interpolation() {
        assert!((quantile(&CHARGES, 0.25).unwrap() - 22.5).abs() < 1e-9);
        assert!((quantile(&CHARGES, 0.75).unwrap() - 27.5).abs() < 1e-9);
        assert!((quantile(&CHARGES, 0.5).unwrap() - 25.0).abs() < 1e-9);
        assert_eq!(quantile(&CHARGES, 0.0).unwrap(), 20.0);
        assert_eq!(quantile(&CHARGES, 1.0).unwrap(), 100.0);

        assert!(quantile(&[], 0.5).is_err());
        assert!(quantile(&CHARGES, 1.5).is_err());
    }

    #[test]
    fn test_iqr_outlier_bounds() {
        let outliers = iqr_outliers(&CHARGES).unwrap();

        assert!((outliers.iqr - 5.0).abs() < 1e-9);
        assert!((outliers.lower_bound - 15.0).abs() < 1e-9);
        assert!((outliers.upper_bound - 35.0).abs() < 1e-9);
        assert_eq!(outliers.indices, vec![5]);
        assert_eq!(outliers.count(), 1);

        // lower <= Q1 <= Q3 <= upper holds by construction
        assert!(outliers.lower_bound <= outliers.q1);
        assert!(outliers.q1 <= outliers.q3);
        assert!(outliers.q3 <= outliers.upper_bound);
    }

    #[test]
    fn test_summarize() {
        let stats = summarize(&CHARGES).unwrap();

        assert_eq!(stats.count, 6);
        assert!((stats.mean - 220.0 / 6.0).abs() < 1e-9);
        assert_eq!(stats.min, 20.0);
        assert_eq!(stats.max, 100.0);
        assert!((stats.q1 - 22.5).abs() < 1e-9);
        assert!((stats.q3 - 27.5).abs() < 1e-9);
        assert!(stats.std_dev > 0.0);

        assert!(summarize(&[]).is_err());
        assert!(summarize(&[42.0]).unwrap().std_dev.is_nan());
    }

    #[test]
    fn test_pearson_correlation() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let up = [2.0, 4.0, 6.0, 8.0];
        let down = [8.0, 6.0, 4.0, 2.0];
        let flat = [5.0, 5.0, 5.0, 5.0];

        assert!((pearson_correlation(&x, &up).unwrap() - 1.0).abs() < 1e-9);
        assert!((pearson_correlation(&x, &down).unwrap() + 1.0).abs() < 1e-9);
        assert_eq!(pearson_correlation(&x, &flat).unwrap(), 0.0);
        assert!(pearson_correlation(&x, &up[..3]).is_err());
    }

    #[test]
    fn test_adoption_rate() {
        let all_yes = vec![Some("Yes".to_string()); 4];
        assert!((adoption_rate(&all_yes) - 100.0).abs() < 1e-9);

        let mixed = vec![
            Some("Yes".to_string()),
            None,
            Some("No".to_string()),
            Some("Yes".to_string()),
        ];
        // Denominator is the 3 observed entries
        assert!((adoption_rate(&mixed) - 200.0 / 3.0).abs() < 1e-9);

        let unobserved: Vec<Option<String>> = vec![None, None];
        assert_eq!(adoption_rate(&unobserved), 0.0);
    }

    #[test]
    fn test_anova_equal_means() {
        let groups = vec![
            vec![1.0, 2.0, 3.0],
            vec![1.0, 2.0, 3.0],
            vec![1.0, 2.0, 3.0],
        ];
        let result = one_way_anova(&groups).unwrap();

        assert!(result.f_statistic.abs() < 1e-9);
        assert!((result.p_value - 1.0).abs() < 1e-9);
        assert_eq!(result.df_between, 2.0);
        assert_eq!(result.df_within, 6.0);
    }

    #[test]
    fn test_anova_separated_means() {
        let groups = vec![vec![0.9, 1.0, 1.1], vec![4.9, 5.0, 5.1]];
        let result = one_way_anova(&groups).unwrap();

        assert!((result.f_statistic - 2400.0).abs() < 1e-6);
        assert!(result.p_value < 0.01);
        assert!((0.0..=1.0).contains(&result.p_value));
    }

    #[test]
    fn test_anova_degenerate_inputs() {
        assert!(one_way_anova(&[vec![1.0, 2.0]]).is_err());
        assert!(one_way_anova(&[vec![1.0, 2.0], vec![]]).is_err());
        assert!(one_way_anova(&[vec![1.0], vec![2.0]]).is_err());
        // Identical values in every group leave the F-statistic undefined
        assert!(one_way_anova(&[vec![1.0, 1.0], vec![2.0, 2.0]]).is_err());
    }

    #[test]
    fn test_welch_t_test_known_value() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [2.0, 3.0, 4.0, 5.0];
        let result = welch_t_test(&a, &b).unwrap();

        assert!((result.t_statistic + 1.095445).abs() < 1e-5);
        assert!((result.df - 6.0).abs() < 1e-9);
        assert!((result.p_value - 0.315).abs() < 0.01);
    }

    #[test]
    fn test_welch_t_test_group_swap_symmetry() {
        let a = [12.5, 15.0, 9.75, 14.0, 11.25];
        let b = [20.0, 18.5, 22.25, 19.0];

        let forward = welch_t_test(&a, &b).unwrap();
        let reversed = welch_t_test(&b, &a).unwrap();

        assert!((forward.t_statistic + reversed.t_statistic).abs() < 1e-9);
        assert!((forward.p_value - reversed.p_value).abs() < 1e-9);
        assert!((forward.df - reversed.df).abs() < 1e-9);
        assert!((0.0..=1.0).contains(&forward.p_value));
    }

    #[test]
    fn test_welch_t_test_too_small() {
        assert!(welch_t_test(&[1.0], &[2.0, 3.0]).is_err());
    }

    #[test]
    fn test_linear_fit() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 3.0, 5.0, 7.0];
        let fit = linear_fit(&x, &y).unwrap();

        assert!((fit.slope - 2.0).abs() < 1e-9);
        assert!((fit.intercept - 1.0).abs() < 1e-9);
        assert!((fit.predict(10.0) - 21.0).abs() < 1e-9);

        assert!(linear_fit(&[1.0, 1.0], &[2.0, 3.0]).is_err());
    }
}
