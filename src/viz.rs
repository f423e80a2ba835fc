//! Visualization functions using Plotters for the churn analysis charts

use std::path::Path;

use plotters::prelude::*;

use crate::data::ChurnData;
use crate::stats;

/// Color palette for categorical series
const SERIES_COLORS: [RGBColor; 5] = [BLUE, RED, GREEN, MAGENTA, CYAN];

/// Five-number geometry of a single box in a box plot
struct BoxGeometry {
    lower_whisker: f64,
    q1: f64,
    median: f64,
    q3: f64,
    upper_whisker: f64,
    outliers: Vec<f64>,
}

fn box_geometry(values: &[f64]) -> crate::Result<BoxGeometry> {
    let summary = stats::iqr_outliers(values)?;
    let median = stats::quantile(values, 0.5)?;

    // Whiskers reach the most extreme data points still inside the bounds
    let lower_whisker = values
        .iter()
        .copied()
        .filter(|v| *v >= summary.lower_bound)
        .fold(f64::INFINITY, f64::min);
    let upper_whisker = values
        .iter()
        .copied()
        .filter(|v| *v <= summary.upper_bound)
        .fold(f64::NEG_INFINITY, f64::max);

    let outliers = summary.indices.iter().map(|&i| values[i]).collect();

    Ok(BoxGeometry {
        lower_whisker,
        q1: summary.q1,
        median,
        q3: summary.q3,
        upper_whisker,
        outliers,
    })
}

/// Scatter plot of tenure against total charges with a regression line
pub fn plot_tenure_scatter(data: &ChurnData, output_path: &str) -> crate::Result<()> {
    if data.is_empty() {
        anyhow::bail!("cannot plot an empty dataset");
    }

    let tenure = data.tenure.to_vec();
    let totals = data.total_charges.to_vec();

    let x_min = tenure.iter().fold(f64::INFINITY, |a, &b| a.min(b));
    let x_max = tenure.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let y_min = totals.iter().fold(f64::INFINITY, |a, &b| a.min(b));
    let y_max = totals.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let x_pad = (x_max - x_min) * 0.05 + 1.0;
    let y_pad = (y_max - y_min) * 0.05 + 1.0;

    let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Relationship between Tenure and TotalCharges",
            ("sans-serif", 30),
        )
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(
            (x_min - x_pad)..(x_max + x_pad),
            (y_min - y_pad)..(y_max + y_pad),
        )?;

    chart
        .configure_mesh()
        .x_desc("Tenure (months)")
        .y_desc("Total Charges")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(
        tenure
            .iter()
            .zip(totals.iter())
            .map(|(&x, &y)| Circle::new((x, y), 3, BLUE.mix(0.4).filled())),
    )?;

    // Regression overlay; skipped when tenure has no spread
    if let Ok(fit) = stats::linear_fit(&tenure, &totals) {
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x_min, fit.predict(x_min)), (x_max, fit.predict(x_max))],
            RED.stroke_width(2),
        )))?;
    }

    root.present()?;
    println!("Scatter plot saved to: {}", output_path);

    Ok(())
}

/// Side-by-side box plots, one per labeled group
pub fn plot_charge_boxes(
    title: &str,
    y_desc: &str,
    groups: &[(String, Vec<f64>)],
    output_path: &str,
) -> crate::Result<()> {
    if groups.is_empty() {
        anyhow::bail!("cannot plot box plots without groups");
    }

    let all_values: Vec<f64> = groups.iter().flat_map(|(_, v)| v.iter().copied()).collect();
    if all_values.is_empty() {
        anyhow::bail!("cannot plot box plots of empty groups");
    }

    let y_min = all_values.iter().fold(f64::INFINITY, |a, &b| a.min(b));
    let y_max = all_values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let y_pad = (y_max - y_min) * 0.05 + 1.0;

    let labels: Vec<String> = groups.iter().map(|(name, _)| name.clone()).collect();
    let n = groups.len();

    let root = BitMapBackend::new(output_path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), (y_min - y_pad)..(y_max + y_pad))?;

    chart
        .configure_mesh()
        .x_labels(n)
        .x_label_formatter(&|x| {
            let idx = x.round();
            if (x - idx).abs() < 0.25 && idx >= 0.0 && (idx as usize) < labels.len() {
                labels[idx as usize].clone()
            } else {
                String::new()
            }
        })
        .y_desc(y_desc)
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for (i, (_, values)) in groups.iter().enumerate() {
        let geometry = box_geometry(values)?;
        let x = i as f64;
        let half_width = 0.3;
        let color = if i < SERIES_COLORS.len() {
            &SERIES_COLORS[i]
        } else {
            &BLACK
        };

        // IQR box with median line
        chart.draw_series(std::iter::once(Rectangle::new(
            [(x - half_width, geometry.q1), (x + half_width, geometry.q3)],
            color.mix(0.25).filled(),
        )))?;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(x - half_width, geometry.q1), (x + half_width, geometry.q3)],
            color,
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![
                (x - half_width, geometry.median),
                (x + half_width, geometry.median),
            ],
            color.stroke_width(2),
        )))?;

        // Whisker stems and caps
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x, geometry.q3), (x, geometry.upper_whisker)],
            color,
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x, geometry.q1), (x, geometry.lower_whisker)],
            color,
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![
                (x - half_width / 2.0, geometry.upper_whisker),
                (x + half_width / 2.0, geometry.upper_whisker),
            ],
            color,
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![
                (x - half_width / 2.0, geometry.lower_whisker),
                (x + half_width / 2.0, geometry.lower_whisker),
            ],
            color,
        )))?;

        // Outliers beyond the whiskers
        chart.draw_series(
            geometry
                .outliers
                .iter()
                .map(|&y| Circle::new((x, y), 3, color.mix(0.8).filled())),
        )?;
    }

    root.present()?;
    println!("Box plot saved to: {}", output_path);

    Ok(())
}

/// Bar chart over labeled values
pub fn plot_bar_chart(
    title: &str,
    y_desc: &str,
    bars: &[(String, f64)],
    y_max: f64,
    output_path: &str,
) -> crate::Result<()> {
    if bars.is_empty() {
        anyhow::bail!("cannot plot an empty bar chart");
    }

    let labels: Vec<String> = bars.iter().map(|(name, _)| name.clone()).collect();
    let n = bars.len();

    let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_labels(n)
        .x_label_formatter(&|x| {
            let idx = x.round();
            if (x - idx).abs() < 0.25 && idx >= 0.0 && (idx as usize) < labels.len() {
                labels[idx as usize].clone()
            } else {
                String::new()
            }
        })
        .y_desc(y_desc)
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for (i, (_, value)) in bars.iter().enumerate() {
        let color = if i < SERIES_COLORS.len() {
            &SERIES_COLORS[i]
        } else {
            &BLACK
        };

        chart.draw_series(std::iter::once(Rectangle::new(
            [(i as f64 - 0.4, 0.0), (i as f64 + 0.4, *value)],
            color.filled(),
        )))?;
    }

    root.present()?;
    println!("Bar chart saved to: {}", output_path);

    Ok(())
}

/// Render the full chart set for one analysis run
pub fn render_report(data: &ChurnData, out_dir: &str) -> crate::Result<()> {
    std::fs::create_dir_all(out_dir)?;
    let chart_path = |name: &str| {
        Path::new(out_dir)
            .join(name)
            .to_string_lossy()
            .into_owned()
    };

    plot_tenure_scatter(data, &chart_path("tenure_vs_total_charges.png"))?;

    plot_charge_boxes(
        "Outlier Detection in Total Charges",
        "Total Charges",
        &[("TotalCharges".to_string(), data.total_charges.to_vec())],
        &chart_path("total_charges_box.png"),
    )?;

    plot_bar_chart(
        "Adoption Rates of Additional Services",
        "Adoption Rate (%)",
        &data.adoption_rates(),
        100.0,
        &chart_path("service_adoption.png"),
    )?;

    let counts: Vec<(String, f64)> = data
        .payment_method_counts()
        .into_iter()
        .map(|(name, count)| (name, count as f64))
        .collect();
    let count_max = counts.iter().map(|(_, c)| *c).fold(1.0, f64::max);
    plot_bar_chart(
        "Payment Method Distribution",
        "Number of Customers",
        &counts,
        count_max * 1.1,
        &chart_path("payment_methods.png"),
    )?;

    plot_charge_boxes(
        "Outlier Detection: Monthly Charges by Payment Method",
        "Monthly Charges",
        &data.charges_by_payment_method(),
        &chart_path("monthly_charges_by_payment.png"),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SERVICE_COLUMNS;
    use ndarray::Array1;
    use std::path::Path;
    use tempfile::tempdir;

    fn create_test_data() -> ChurnData {
        let methods = [
            "Electronic check",
            "Mailed check",
            "Electronic check",
            "Bank transfer (automatic)",
            "Mailed check",
            "Electronic check",
        ];
        let subscriptions = ["Yes", "No", "Yes", "No", "Yes", "No"];

        ChurnData {
            tenure: Array1::from_vec(vec![1.0, 5.0, 12.0, 24.0, 48.0, 60.0]),
            monthly_charges: Array1::from_vec(vec![29.85, 56.95, 53.85, 42.30, 70.70, 99.65]),
            total_charges: Array1::from_vec(vec![29.85, 284.75, 646.20, 1015.20, 3393.60, 5979.0]),
            payment_methods: methods.iter().map(|m| Some((*m).to_string())).collect(),
            services: SERVICE_COLUMNS
                .iter()
                .map(|name| {
                    (
                        (*name).to_string(),
                        subscriptions.iter().map(|s| Some((*s).to_string())).collect(),
                    )
                })
                .collect(),
            rows_loaded: 6,
            rows_dropped: 0,
        }
    }

    #[test]
    fn test_plot_tenure_scatter() {
        let data = create_test_data();
        let temp_dir = tempdir().unwrap();
        let output_path = temp_dir.path().join("scatter.png");
        let output_str = output_path.to_str().unwrap();

        let result = plot_tenure_scatter(&data, output_str);
        assert!(result.is_ok());
        assert!(Path::new(output_str).exists());
    }

    #[test]
    fn test_plot_charge_boxes() {
        let data = create_test_data();
        let temp_dir = tempdir().unwrap();
        let output_path = temp_dir.path().join("boxes.png");
        let output_str = output_path.to_str().unwrap();

        let groups = data.charges_by_payment_method();
        let result = plot_charge_boxes("Monthly Charges", "Charges", &groups, output_str);
        assert!(result.is_ok());
        assert!(Path::new(output_str).exists());
    }

    #[test]
    fn test_plot_bar_chart() {
        let data = create_test_data();
        let temp_dir = tempdir().unwrap();
        let output_path = temp_dir.path().join("bars.png");
        let output_str = output_path.to_str().unwrap();

        let result = plot_bar_chart(
            "Adoption",
            "Rate (%)",
            &data.adoption_rates(),
            100.0,
            output_str,
        );
        assert!(result.is_ok());
        assert!(Path::new(output_str).exists());
    }

    #[test]
    fn test_render_report() {
        let data = create_test_data();
        let temp_dir = tempdir().unwrap();
        let out_dir = temp_dir.path().join("charts");
        let out_str = out_dir.to_str().unwrap();

        let result = render_report(&data, out_str);
        assert!(result.is_ok());

        for name in [
            "tenure_vs_total_charges.png",
            "total_charges_box.png",
            "service_adoption.png",
            "payment_methods.png",
            "monthly_charges_by_payment.png",
        ] {
            assert!(out_dir.join(name).exists(), "missing chart {}", name);
        }
    }
}
