//! Ratings command implementation

use crate::config::Config;
use crate::data::load_matches;
use crate::rating::replay;
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct RatingsArgs {
    /// Match history CSV (defaults to data.matches_path)
    #[arg(long)]
    pub matches: Option<PathBuf>,

    /// Only show the highest rated N teams
    #[arg(long)]
    pub top: Option<usize>,
}

impl RatingsArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let path = self
            .matches
            .clone()
            .unwrap_or_else(|| config.data.matches_path.clone());
        let matches = load_matches(&path)
            .with_context(|| format!("loading matches from {}", path.display()))?;
        let (_, ratings) = replay(&matches, config.rating);

        let table = ratings.ranked();
        let shown = self.top.unwrap_or(table.len()).min(table.len());

        println!("{:>4}  {:<28} {:>8}", "#", "TEAM", "ELO");
        println!("───────────────────────────────────────────");
        for (rank, (team, rating)) in table.iter().take(shown).enumerate() {
            println!("{:>4}  {:<28} {:>8.1}", rank + 1, team, rating);
        }
        println!(
            "\n{} teams rated from {} matches (base {}, k {})",
            ratings.len(),
            matches.len(),
            config.rating.base,
            config.rating.k
        );
        Ok(())
    }
}
