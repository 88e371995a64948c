//! Exploratory analysis over downloaded day summaries.
//!
//! Mirrors the exploratory workflow around the public API: download a
//! window of daily summaries, persist/reload the series, fit a simple
//! linear model of the average price from the opening price and project
//! the next day(s). The series lives in memory as plain floats; nothing
//! here touches the trade API.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::{Duration, Local, NaiveDate};
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::public::{DaySummary, PublicClient};

/// Default length of the summary window, in days.
const DEFAULT_WINDOW_DAYS: i64 = 90;

/// A least-squares line fitted to `avg_price ~ opening`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearModel {
    /// Slope coefficient
    pub slope: f64,
    /// Intercept
    pub intercept: f64,
}

impl LinearModel {
    /// Fit by ordinary least squares.
    ///
    /// Returns None for fewer than two points or a degenerate x spread.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Option<Self> {
        if xs.len() != ys.len() || xs.len() < 2 {
            return None;
        }

        let n = xs.len() as f64;
        let mean_x = xs.iter().sum::<f64>() / n;
        let mean_y = ys.iter().sum::<f64>() / n;

        let mut sxx = 0.0;
        let mut sxy = 0.0;
        for (x, y) in xs.iter().zip(ys.iter()) {
            sxx += (x - mean_x) * (x - mean_x);
            sxy += (x - mean_x) * (y - mean_y);
        }

        if sxx == 0.0 {
            return None;
        }

        let slope = sxy / sxx;
        Some(Self {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }

    /// Predicted average price for an opening price.
    pub fn predict(&self, opening: f64) -> f64 {
        self.slope * opening + self.intercept
    }
}

/// Held-out evaluation of a trained model.
#[derive(Debug, Clone, Copy)]
pub struct TrainReport {
    /// Mean absolute error on the held-out tail
    pub mae: f64,
    /// Mean squared error on the held-out tail
    pub mse: f64,
    /// Root mean squared error on the held-out tail
    pub rmse: f64,
    /// The fitted line
    pub model: LinearModel,
}

/// One projected day.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictedDay {
    /// Projected date
    pub date: NaiveDate,
    /// Projected average price
    pub avg_price: f64,
}

/// Basic analysis over the public day-summary data.
pub struct SummaryAnalysis {
    /// Start of the download window (inclusive)
    pub initial_summary_date: NaiveDate,
    /// End of the download window (exclusive)
    pub end_summary_date: NaiveDate,
    summary_data: Vec<DaySummary>,
    model: Option<LinearModel>,
}

impl Default for SummaryAnalysis {
    fn default() -> Self {
        Self::new()
    }
}

impl SummaryAnalysis {
    /// Create an analysis with the default window: the last 90 days, end
    /// date (today) exclusive.
    pub fn new() -> Self {
        let today = Local::now().date_naive();
        Self {
            initial_summary_date: today - Duration::days(DEFAULT_WINDOW_DAYS),
            end_summary_date: today,
            summary_data: Vec::new(),
            model: None,
        }
    }

    /// Create an analysis over an explicit window (`end` exclusive).
    pub fn with_window(initial: NaiveDate, end: NaiveDate) -> Self {
        Self {
            initial_summary_date: initial,
            end_summary_date: end,
            summary_data: Vec::new(),
            model: None,
        }
    }

    /// The downloaded summary series.
    pub fn summary_data(&self) -> &[DaySummary] {
        &self.summary_data
    }

    /// The fitted model, if [`Self::train`] has run.
    pub fn model(&self) -> Option<LinearModel> {
        self.model
    }

    /// True when the average price is rising over the last three measures.
    pub fn summary_direction(&self) -> bool {
        let prices: Vec<f64> = self.summary_data.iter().map(|s| s.avg_price).collect();
        if prices.len() < 2 {
            return false;
        }

        let tail = &prices[prices.len().saturating_sub(3)..];
        let diffs: Vec<f64> = tail.windows(2).map(|w| w[1] - w[0]).collect();
        diffs.iter().sum::<f64>() / diffs.len() as f64 > 0.0
    }

    /// Download the configured window via the public client.
    ///
    /// With `concatenate` set the new data extends whatever was already
    /// downloaded or loaded; otherwise it replaces it.
    pub async fn download(
        &mut self,
        client: &PublicClient,
        coin: &str,
        concatenate: bool,
    ) -> ApiResult<()> {
        info!(
            "downloading daily summary data from {} to {}",
            self.initial_summary_date, self.end_summary_date
        );
        let downloaded = client
            .download_range(coin, self.initial_summary_date, self.end_summary_date)
            .await?;

        if concatenate {
            self.summary_data.extend(downloaded);
        } else {
            self.summary_data = downloaded;
        }
        Ok(())
    }

    /// Persist the summary series as JSON.
    ///
    /// Returns false without writing when there is nothing to save.
    pub fn save_json(&self, path: impl AsRef<Path>) -> ApiResult<bool> {
        info!("saving the summary data");
        if self.summary_data.is_empty() {
            warn!("no summary data to save, maybe it wasn't downloaded yet?");
            return Ok(false);
        }

        let file = File::create(path.as_ref())
            .map_err(|e| ApiError::Io(format!("failed to create summary file: {e}")))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &self.summary_data)
            .map_err(|e| ApiError::Io(format!("failed to write summary file: {e}")))?;
        Ok(true)
    }

    /// Reload a summary series persisted with [`Self::save_json`].
    pub fn load_json(&mut self, path: impl AsRef<Path>) -> ApiResult<()> {
        info!("reading a summary data file");
        let file = File::open(path.as_ref())
            .map_err(|e| ApiError::Io(format!("failed to open summary file: {e}")))?;
        self.summary_data = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| ApiError::Parse(format!("failed to parse summary file: {e}")))?;
        Ok(())
    }

    /// Fit the linear model of `avg_price` from `opening`, holding out the
    /// trailing `test_fraction` of the series for evaluation.
    pub fn train(&mut self, test_fraction: f64) -> ApiResult<TrainReport> {
        info!("training a linear model of the daily average price");
        let len = self.summary_data.len();
        if len < 4 {
            return Err(ApiError::DataNotAvailable(format!(
                "{len} summaries is not enough to train"
            )));
        }

        let xs: Vec<f64> = self.summary_data.iter().map(|s| s.opening).collect();
        let ys: Vec<f64> = self.summary_data.iter().map(|s| s.avg_price).collect();

        let test_len = ((len as f64) * test_fraction).round() as usize;
        let test_len = test_len.clamp(1, len - 2);
        let train_len = len - test_len;

        let model = LinearModel::fit(&xs[..train_len], &ys[..train_len]).ok_or_else(|| {
            ApiError::DataNotAvailable("summary data is degenerate, cannot fit".to_string())
        })?;

        let mut abs_sum = 0.0;
        let mut sq_sum = 0.0;
        for (x, y) in xs[train_len..].iter().zip(ys[train_len..].iter()) {
            let diff = y - model.predict(*x);
            abs_sum += diff.abs();
            sq_sum += diff * diff;
        }
        let mae = abs_sum / test_len as f64;
        let mse = sq_sum / test_len as f64;
        let rmse = mse.sqrt();

        info!("test results: mae={:.4} mse={:.4} rmse={:.4}", mae, mse, rmse);

        self.model = Some(model);
        Ok(TrainReport {
            mae,
            mse,
            rmse,
            model,
        })
    }

    /// Project the average price for the next `num_days`, seeded from the
    /// last known opening value.
    ///
    /// The model predicts from opening prices, which are unknown for
    /// future days, so each projected average feeds the next step —
    /// precision falls quickly past one day. With `use_std` set, a
    /// fraction (`pct_std_usage`) of the closing-price standard deviation
    /// is added or removed per step following [`Self::summary_direction`].
    pub fn predict(
        &self,
        num_days: u32,
        use_std: bool,
        pct_std_usage: f64,
    ) -> ApiResult<Vec<PredictedDay>> {
        let model = self.model.ok_or_else(|| {
            ApiError::DataNotAvailable("model not trained, call train first".to_string())
        })?;
        let last = self.summary_data.last().ok_or_else(|| {
            ApiError::DataNotAvailable("no summary data to project from".to_string())
        })?;

        if num_days > 1 {
            warn!("projections beyond one day lose precision quickly");
        }

        let closing_std = sample_std(&self.summary_data.iter().map(|s| s.closing).collect::<Vec<_>>());
        let rising = self.summary_direction();

        let mut projected = vec![PredictedDay {
            date: last.date,
            avg_price: last.opening,
        }];
        for day in 1..=num_days {
            let date = last.date + Duration::days(i64::from(day));
            let seed = projected[projected.len() - 1].avg_price;
            let mut avg_price = model.predict(seed);
            if use_std {
                if rising {
                    avg_price += closing_std * pct_std_usage;
                } else {
                    avg_price -= closing_std * pct_std_usage;
                }
            }
            projected.push(PredictedDay { date, avg_price });
        }

        Ok(projected)
    }
}

/// Sample standard deviation (n − 1 denominator); zero for short series.
fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1.0);
    var.sqrt()
}
