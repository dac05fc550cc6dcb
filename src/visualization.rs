//! SVG charts of option price and Greeks across spot.
//!
//! Curves are produced by the same pricing and Greeks functions as the rest of
//! the crate; this module only samples them on a spot grid and draws them.

use std::path::Path;

use plotters::prelude::*;

use crate::error::Result;
use crate::models::bs::Greeks;
use crate::models::utils::linspace;
use crate::option::EuropeanOption;

/// Greek plotted by [`plot_greek_profile`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GreekKind {
    Delta,
    Gamma,
    Vega,
    Theta,
    ThetaPerDay,
    Rho,
}

impl GreekKind {
    pub fn name(&self) -> &'static str {
        match self {
            GreekKind::Delta => "delta",
            GreekKind::Gamma => "gamma",
            GreekKind::Vega => "vega",
            GreekKind::Theta => "theta",
            GreekKind::ThetaPerDay => "theta_per_day",
            GreekKind::Rho => "rho",
        }
    }

    pub fn select(&self, greeks: &Greeks) -> f64 {
        match self {
            GreekKind::Delta => greeks.delta,
            GreekKind::Gamma => greeks.gamma,
            GreekKind::Vega => greeks.vega,
            GreekKind::Theta => greeks.theta,
            GreekKind::ThetaPerDay => greeks.theta_per_day,
            GreekKind::Rho => greeks.rho,
        }
    }
}

/// Chart layout and spot grid
#[derive(Debug, Clone)]
pub struct PlotConfig {
    /// Image size in pixels
    pub width: u32,
    pub height: u32,
    /// Number of spot samples
    pub points: usize,
    /// Spot range as multiples of the strike, e.g. (0.5, 1.5)
    pub spot_range: (f64, f64),
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 768,
            points: 200,
            spot_range: (0.5, 1.5),
        }
    }
}

impl PlotConfig {
    /// Spot grid for an option, spanning `spot_range` around its strike
    pub fn spot_grid(&self, option: &EuropeanOption) -> Vec<f64> {
        let (lo, hi) = self.spot_range;
        linspace(option.strike() * lo, option.strike() * hi, self.points)
    }
}

/// (spot, price) samples of the option with everything but spot held fixed.
pub fn price_profile(option: &EuropeanOption, spots: &[f64]) -> Result<Vec<(f64, f64)>> {
    spots
        .iter()
        .map(|&s| Ok((s, option.with_spot(s)?.price()?)))
        .collect()
}

/// (spot, discounted intrinsic value) samples, the zero-volatility price floor.
pub fn intrinsic_profile(option: &EuropeanOption, spots: &[f64]) -> Result<Vec<(f64, f64)>> {
    spots
        .iter()
        .map(|&s| Ok((s, option.with_spot(s)?.intrinsic_value()?)))
        .collect()
}

/// (spot, greek) samples. Fails at the expiry/zero-volatility boundary.
pub fn greek_profile(
    option: &EuropeanOption,
    kind: GreekKind,
    spots: &[f64],
) -> Result<Vec<(f64, f64)>> {
    spots
        .iter()
        .map(|&s| Ok((s, kind.select(&option.with_spot(s)?.greeks()?))))
        .collect()
}

fn y_range(series: &[&[(f64, f64)]]) -> (f64, f64) {
    let (min, max) = series
        .iter()
        .flat_map(|s| s.iter().map(|p| p.1))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
            (lo.min(y), hi.max(y))
        });
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let padding = if max > min { (max - min) * 0.05 } else { 1.0 };
    (min - padding, max + padding)
}

/// Draw model price and intrinsic value against spot into an SVG file.
pub fn plot_price_profile(
    option: &EuropeanOption,
    path: impl AsRef<Path>,
    config: &PlotConfig,
) -> anyhow::Result<()> {
    let spots = config.spot_grid(option);
    let model = price_profile(option, &spots)?;
    let intrinsic = intrinsic_profile(option, &spots)?;
    let (y_min, y_max) = y_range(&[model.as_slice(), intrinsic.as_slice()]);
    let x_min = spots.first().copied().unwrap_or(0.0);
    let x_max = spots.last().copied().unwrap_or(1.0);

    let root = SVGBackend::new(path.as_ref(), (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(format!("{}", option), ("sans-serif", 24))
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Spot")
        .y_desc("Option price")
        .draw()?;

    chart
        .draw_series(vec![PathElement::new(model, RED)])?
        .label("Black-Scholes price")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));

    chart
        .draw_series(vec![PathElement::new(intrinsic, BLUE)])?
        .label("Discounted intrinsic")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Draw one Greek against spot into an SVG file.
pub fn plot_greek_profile(
    option: &EuropeanOption,
    kind: GreekKind,
    path: impl AsRef<Path>,
    config: &PlotConfig,
) -> anyhow::Result<()> {
    let spots = config.spot_grid(option);
    let curve = greek_profile(option, kind, &spots)?;
    let (y_min, y_max) = y_range(&[curve.as_slice()]);
    let x_min = spots.first().copied().unwrap_or(0.0);
    let x_max = spots.last().copied().unwrap_or(1.0);

    let root = SVGBackend::new(path.as_ref(), (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(format!("{} | {}", kind.name(), option), ("sans-serif", 24))
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Spot")
        .y_desc(kind.name())
        .draw()?;

    chart.draw_series(vec![PathElement::new(curve, RED)])?;

    root.present()?;
    Ok(())
}
