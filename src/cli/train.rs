//! Train command implementation

use crate::config::Config;
use crate::data::{load_matches, ParquetWriter};
use crate::features::engineer_features;
use crate::model::OutcomeModel;
use crate::rating::replay;
use anyhow::Context;
use chrono::Utc;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Match history CSV (defaults to data.matches_path)
    #[arg(long)]
    pub matches: Option<PathBuf>,

    /// Where to write the model artifact (defaults to data.model_path)
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Also write the rating history as Parquet into this directory
    /// (defaults to data.output_dir when given without a value)
    #[arg(long, value_name = "DIR", num_args = 0..=1)]
    pub export_history: Option<Option<PathBuf>>,
}

impl TrainArgs {
    /// Directory for the rating history export, if one was requested
    pub fn export_dir(&self, config: &Config) -> Option<PathBuf> {
        self.export_history
            .as_ref()
            .map(|dir| dir.clone().unwrap_or_else(|| config.data.output_dir.clone()))
    }

    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let matches_path = self
            .matches
            .clone()
            .unwrap_or_else(|| config.data.matches_path.clone());
        let model_path = self
            .model
            .clone()
            .unwrap_or_else(|| config.data.model_path.clone());

        let matches = load_matches(&matches_path)
            .with_context(|| format!("loading matches from {}", matches_path.display()))?;
        let (enriched, ratings) = replay(&matches, config.rating);
        tracing::info!(
            matches = enriched.len(),
            teams = ratings.len(),
            "Replayed ratings"
        );

        if let Some(dir) = self.export_dir(config) {
            let writer = ParquetWriter::new(dir);
            let path = writer.file_path("ratings", Utc::now());
            let rows = writer
                .write_enriched_matches(&path, &enriched)
                .context("exporting rating history")?;
            if rows > 0 {
                tracing::info!(path = %path.display(), rows, "Exported rating history");
            } else {
                tracing::warn!("No matches to export; rating history not written");
            }
        }

        let samples = engineer_features(&enriched);
        let mut model = OutcomeModel::new(config.model.clone());
        let fitted = tokio::task::spawn_blocking(move || {
            model.fit(&samples)?;
            model.fitted()
        })
        .await
        .context("training task panicked")??;

        fitted
            .save(&model_path)
            .with_context(|| format!("saving model to {}", model_path.display()))?;

        let meta = fitted.metadata();
        println!(
            "Trained model {} on {} matches ({} folds) -> {}",
            meta.id,
            meta.n_samples,
            meta.n_folds,
            model_path.display()
        );
        Ok(())
    }
}
