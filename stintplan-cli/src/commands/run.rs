//! Run command - search for strategies and print the fastest ones.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use stintplan::config::ConfigFile;
use stintplan::{
    CompoundCatalog, RaceConfig, ResultStore, SearchMode, SequenceEnumerator, StrategyFilter,
};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::CliError;
use crate::output;

/// Highest stop count accepted on the command line.
pub const MAX_STOPS_LIMIT: u32 = 5;

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} sequences ({eta})";

/// Arguments for `stintplan run`.
///
/// Flags override the matching configuration file values.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Configuration file (defaults to ~/.stintplan/config.ini)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Race length in laps
    #[arg(long)]
    pub laps: Option<u32>,

    /// Time lost per pit stop, in seconds
    #[arg(long, value_name = "SECS")]
    pub pit_loss: Option<f64>,

    /// Laps one fuel load lasts
    #[arg(long, value_name = "LAPS")]
    pub fuel_range: Option<u32>,

    /// Largest number of pit stops to consider
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=MAX_STOPS_LIMIT as i64))]
    pub max_stops: Option<u32>,

    /// Number of strategies to show
    #[arg(long)]
    pub top: Option<usize>,

    /// Only show strategies with these stop counts (e.g. 1,2)
    #[arg(long, value_delimiter = ',')]
    pub stops: Vec<u32>,

    /// Only show strategies using at least one of these compounds (e.g. Soft,Hard)
    #[arg(long, value_delimiter = ',')]
    pub compounds: Vec<String>,

    /// Spread the search across all CPU cores
    #[arg(long)]
    pub parallel: bool,

    /// Cache scores of repeated stint layouts
    #[arg(long)]
    pub memo: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl RunArgs {
    /// Race configuration from the file with command-line overrides applied.
    ///
    /// The effective stop ceiling is capped at [`MAX_STOPS_LIMIT`] whichever
    /// source it came from.
    pub fn race_config(&self, file: &ConfigFile) -> Result<RaceConfig, CliError> {
        let mut config = file.race_config();
        if let Some(laps) = self.laps {
            config = config.with_total_laps(laps);
        }
        if let Some(pit_loss) = self.pit_loss {
            config = config.with_pit_loss_secs(pit_loss);
        }
        if let Some(fuel_range) = self.fuel_range {
            config = config.with_fuel_range_laps(fuel_range);
        }
        if let Some(max_stops) = self.max_stops {
            config = config.with_max_stops(max_stops);
        }
        if config.max_stops > MAX_STOPS_LIMIT {
            return Err(CliError::Config(format!(
                "max_stops = {} exceeds the limit of {}. Use --max-stops to lower it.",
                config.max_stops, MAX_STOPS_LIMIT
            )));
        }
        Ok(config)
    }

    /// Number of strategies to show.
    pub fn top(&self, file: &ConfigFile) -> usize {
        self.top.unwrap_or(file.output.top)
    }

    /// Result filter built from `--stops` and `--compounds`.
    ///
    /// Omitted flags admit everything in `store`.
    pub fn filter(
        &self,
        catalog: &CompoundCatalog,
        store: &ResultStore,
    ) -> Result<StrategyFilter, CliError> {
        if let Some(unknown) = self.compounds.iter().find(|c| catalog.get(c).is_none()) {
            return Err(CliError::Config(format!(
                "Unknown compound '{}'. Available compounds: {}",
                unknown,
                catalog.names().join(", ")
            )));
        }

        let mut filter = StrategyFilter::allow_all(store);
        if !self.stops.is_empty() {
            filter = filter.with_stops(self.stops.iter().copied());
        }
        if !self.compounds.is_empty() {
            filter = filter.with_compounds(self.compounds.iter().cloned());
        }
        Ok(filter)
    }

    fn mode(&self) -> SearchMode {
        if self.parallel {
            SearchMode::Parallel
        } else {
            SearchMode::Sequential
        }
    }

    fn show_progress(&self) -> bool {
        !self.no_progress && !self.json
    }
}

/// Run the search command.
pub fn run(args: RunArgs) -> Result<(), CliError> {
    let file = match &args.config {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };
    let catalog = file.catalog();
    let race = args.race_config(&file)?;
    let top = args.top(&file);

    // Reject bad parameters before touching the terminal.
    race.validate()?;
    catalog.validate()?;

    let token = CancellationToken::new();
    let handler_token = token.clone();
    ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("Received interrupt, stopping search...");
        handler_token.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let mut enumerator = SequenceEnumerator::new(&catalog, &race)
        .with_mode(args.mode())
        .with_cancellation(token);
    if args.memo {
        enumerator = enumerator.with_memo();
    }

    let bar = if args.show_progress() {
        let bar = progress_bar(enumerator.total_sequences().unwrap_or(0));
        let callback_bar = bar.clone();
        enumerator = enumerator.with_progress(Arc::new(move |done, _total| {
            callback_bar.set_position(done);
        }));
        Some(bar)
    } else {
        None
    };

    let outcome = enumerator.run();
    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }
    let outcome = outcome?;

    let cancelled = outcome.is_cancelled();
    if cancelled {
        warn!("Search cancelled, results are partial");
        if !args.json {
            eprintln!(
                "{}",
                style("Search cancelled. Showing strategies found so far.").yellow()
            );
        }
    }

    let stats = outcome.stats().clone();
    let store = outcome.into_store();
    let filter = args.filter(&catalog, &store)?;
    let filtered = store.filter(&filter);
    let ranked = filtered.top_k(top);

    if args.json {
        println!("{}", output::render_json(&ranked, &stats, cancelled)?);
        return Ok(());
    }

    if ranked.is_empty() {
        println!("{}", output::empty_message(&store));
        return Ok(());
    }

    println!("{}", race);
    println!();
    print!("{}", output::render_table(&ranked));
    println!();
    println!("{}", output::render_summary(&stats, ranked.len()));
    Ok(())
}

fn progress_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    match ProgressStyle::with_template(PROGRESS_TEMPLATE) {
        Ok(style) => bar.set_style(style.progress_chars("=> ")),
        Err(e) => warn!(error = %e, "Invalid progress template, using default style"),
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use stintplan::{Compound, Strategy, StintPlan};

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        args: RunArgs,
    }

    fn parse(argv: &[&str]) -> RunArgs {
        let mut full = vec!["run"];
        full.extend_from_slice(argv);
        TestCli::try_parse_from(full).unwrap().args
    }

    fn store_with(compounds: &[(&str, u32)]) -> ResultStore {
        let stints = compounds
            .iter()
            .map(|(name, laps)| StintPlan::new(Arc::new(Compound::new(*name, 40, 90.0)), *laps))
            .collect();
        let mut store = ResultStore::new();
        store.add(Strategy::new(stints, 1000.0));
        store
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let file = ConfigFile::default();
        let args = parse(&["--laps", "60", "--pit-loss", "21.5", "--max-stops", "2", "--top", "3"]);

        let race = args.race_config(&file).unwrap();
        assert_eq!(race.total_laps, 60);
        assert_eq!(race.pit_loss_secs, 21.5);
        assert_eq!(race.fuel_range_laps, file.race.fuel_range_laps);
        assert_eq!(race.max_stops, 2);
        assert_eq!(args.top(&file), 3);
    }

    #[test]
    fn test_file_values_used_without_flags() {
        let file = ConfigFile::default();
        let args = parse(&[]);
        assert_eq!(args.race_config(&file).unwrap(), file.race_config());
        assert_eq!(args.top(&file), file.output.top);
        assert_eq!(args.mode(), SearchMode::Sequential);
        assert!(args.show_progress());
    }

    #[test]
    fn test_max_stops_is_capped() {
        let result = TestCli::try_parse_from(["run", "--max-stops", "6"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_max_stops_from_file_is_capped() {
        let file = ConfigFile::from_ini_str("[race]\nmax_stops = 30\n").unwrap();

        let err = parse(&[]).race_config(&file).unwrap_err();
        assert!(err.to_string().contains("max_stops = 30"));

        let race = parse(&["--max-stops", "4"]).race_config(&file).unwrap();
        assert_eq!(race.max_stops, 4);
    }

    #[test]
    fn test_comma_separated_filters() {
        let args = parse(&["--stops", "1,2", "--compounds", "Soft,Hard", "--json"]);
        assert_eq!(args.stops, vec![1, 2]);
        assert_eq!(args.compounds, vec!["Soft", "Hard"]);
        assert!(!args.show_progress());
    }

    #[test]
    fn test_filter_defaults_to_store_contents() {
        let catalog = CompoundCatalog::standard();
        let store = store_with(&[("Soft", 10), ("Hard", 20)]);
        let filter = parse(&[]).filter(&catalog, &store).unwrap();
        assert_eq!(filter, StrategyFilter::allow_all(&store));
    }

    #[test]
    fn test_filter_rejects_unknown_compound() {
        let catalog = CompoundCatalog::standard();
        let store = ResultStore::new();
        let err = parse(&["--compounds", "Intermediate"])
            .filter(&catalog, &store)
            .unwrap_err();
        assert!(err.to_string().contains("Intermediate"));
    }

    #[test]
    fn test_filter_applies_flags() {
        let catalog = CompoundCatalog::standard();
        let store = store_with(&[("Soft", 10), ("Hard", 20)]);

        let filter = parse(&["--stops", "0", "--compounds", "Medium"])
            .filter(&catalog, &store)
            .unwrap();
        assert!(store.filter(&filter).is_empty());

        let filter = parse(&["--stops", "1", "--compounds", "Hard"])
            .filter(&catalog, &store)
            .unwrap();
        assert_eq!(store.filter(&filter).len(), 1);
    }

    #[test]
    fn test_config_flag_loads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[race]\ntotal_laps = 30\n\n[output]\ntop = 4").unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let args = parse(&["--config", &path]);
        let loaded = ConfigFile::load_from(args.config.as_deref().unwrap()).unwrap();

        assert_eq!(args.race_config(&loaded).unwrap().total_laps, 30);
        assert_eq!(args.top(&loaded), 4);
    }
}
