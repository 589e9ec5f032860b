//! Predict command implementation

use super::OutputFormat;
use crate::config::Config;
use crate::model::CalibratedModel;
use crate::service::{PredictionRequest, PredictionService};
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Home team Elo rating
    #[arg(long, allow_negative_numbers = true)]
    pub home_elo: f64,

    /// Away team Elo rating
    #[arg(long, allow_negative_numbers = true)]
    pub away_elo: f64,

    /// Decimal odds for a home win
    #[arg(long)]
    pub home_odds: f64,

    /// Decimal odds for a draw
    #[arg(long)]
    pub draw_odds: f64,

    /// Decimal odds for an away win
    #[arg(long)]
    pub away_odds: f64,

    /// Model artifact (defaults to data.model_path)
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl PredictArgs {
    pub fn request(&self) -> PredictionRequest {
        PredictionRequest {
            home_elo: self.home_elo,
            away_elo: self.away_elo,
            home_odds: self.home_odds,
            draw_odds: self.draw_odds,
            away_odds: self.away_odds,
        }
    }

    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let model_path = self
            .model
            .clone()
            .unwrap_or_else(|| config.data.model_path.clone());
        let model = CalibratedModel::load(&model_path)
            .with_context(|| format!("loading model from {}", model_path.display()))?;

        let service = PredictionService::new(Arc::new(model));
        let response = service.handle(&self.request())?;

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
            OutputFormat::Table => println!("{}", response.format_table()),
        }
        Ok(())
    }
}
