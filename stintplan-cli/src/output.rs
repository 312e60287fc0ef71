//! Result rendering for the run command.
//!
//! Strategies are shown either as an aligned table or as a JSON document
//! built from [`StrategyRow`].

use console::style;
use serde_json::json;
use stintplan::{ResultStore, SearchStats, Strategy, StrategyRow};

/// Message shown when the search found no feasible strategy.
pub const NO_RESULTS_MESSAGE: &str = "No viable strategies found. Adjust your parameters.";

/// Message shown when strategies exist but the filters removed all of them.
pub const NO_MATCHES_MESSAGE: &str =
    "No strategies match the selected stop counts and compounds. Widen the filters.";

const SEQUENCE_HEADER: &str = "Tire Sequence";
const STINTS_HEADER: &str = "Stint Laps";
const PITS_HEADER: &str = "Pit Stop Laps";
const STOPS_HEADER: &str = "Pit Stops";
const TIME_HEADER: &str = "Total Time (s)";

/// Message for an empty ranking, given the unfiltered search results.
pub fn empty_message(searched: &ResultStore) -> &'static str {
    if searched.is_empty() {
        NO_RESULTS_MESSAGE
    } else {
        NO_MATCHES_MESSAGE
    }
}

/// Render ranked strategies as a text table.
pub fn render_table(strategies: &[&Strategy]) -> String {
    let rows: Vec<StrategyRow> = strategies.iter().map(|s| s.to_row()).collect();

    let sequence_width = rows
        .iter()
        .map(|r| r.tire_sequence.chars().count())
        .chain(std::iter::once(SEQUENCE_HEADER.len()))
        .max()
        .unwrap_or(0);
    let stints_width = rows
        .iter()
        .map(|r| join_laps(&r.stint_laps).len())
        .chain(std::iter::once(STINTS_HEADER.len()))
        .max()
        .unwrap_or(0);
    let pits_width = rows
        .iter()
        .map(|r| join_laps(&r.pit_stop_laps).len())
        .chain(std::iter::once(PITS_HEADER.len()))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let header = format!(
        "{:>4}  {:<sw$}  {:<lw$}  {:<pw$}  {:>9}  {:>14}",
        "#",
        SEQUENCE_HEADER,
        STINTS_HEADER,
        PITS_HEADER,
        STOPS_HEADER,
        TIME_HEADER,
        sw = sequence_width,
        lw = stints_width,
        pw = pits_width,
    );
    out.push_str(&style(header).bold().to_string());
    out.push('\n');

    for (rank, row) in rows.iter().enumerate() {
        let padding = sequence_width - row.tire_sequence.chars().count();
        let line = format!(
            "{:>4}  {}{}  {:<lw$}  {:<pw$}  {:>9}  {:>14.2}",
            rank + 1,
            row.tire_sequence,
            " ".repeat(padding),
            join_laps(&row.stint_laps),
            join_laps(&row.pit_stop_laps),
            row.pit_stops,
            row.total_time_secs,
            lw = stints_width,
            pw = pits_width,
        );
        if rank == 0 {
            out.push_str(&style(line).green().to_string());
        } else {
            out.push_str(&line);
        }
        out.push('\n');
    }
    out
}

/// Render ranked strategies and search counters as pretty-printed JSON.
pub fn render_json(
    strategies: &[&Strategy],
    stats: &SearchStats,
    cancelled: bool,
) -> Result<String, serde_json::Error> {
    let rows: Vec<StrategyRow> = strategies.iter().map(|s| s.to_row()).collect();
    let document = json!({
        "strategies": rows,
        "cancelled": cancelled,
        "stats": {
            "sequences_total": stats.sequences_total,
            "sequences_processed": stats.sequences_processed,
            "partitions_scored": stats.partitions_scored,
            "strategies_found": stats.strategies_found,
            "elapsed_ms": stats.elapsed.as_millis() as u64,
            "memo": stats.memo.map(|m| json!({
                "hits": m.hits,
                "misses": m.misses,
                "entries": m.entries,
            })),
        },
    });
    serde_json::to_string_pretty(&document)
}

/// One-line summary of the search counters.
pub fn render_summary(stats: &SearchStats, shown: usize) -> String {
    let mut summary = format!(
        "{} strategies from {} of {} sequences in {:.2?} (showing {})",
        stats.strategies_found,
        stats.sequences_processed,
        stats.sequences_total,
        stats.elapsed,
        shown
    );
    if let Some(memo) = stats.memo {
        summary.push_str(&format!(
            ", memo {} hits / {} misses",
            memo.hits, memo.misses
        ));
    }
    summary
}

fn join_laps(laps: &[u32]) -> String {
    if laps.is_empty() {
        return "-".to_string();
    }
    laps.iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
