use iat_core::TrialResult;
use serde::Serialize;

/// Per-block accuracy and reaction times.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSummary {
    pub name: String,
    pub trials: usize,
    /// Share of trials answered correctly on the first try, `0.0..=1.0`.
    pub accuracy: f64,
    pub mean_rt: f64,
    pub min_rt: f64,
    pub max_rt: f64,
}

impl BlockSummary {
    fn from_rows(name: &str, rows: &[&TrialResult]) -> Self {
        let trials = rows.len();
        let correct = rows.iter().filter(|r| r.correct_on_first_try).count();
        let times: Vec<f64> = rows.iter().map(|r| r.reaction_time_secs).collect();

        let mean_rt = times.iter().sum::<f64>() / trials as f64;
        let min_rt = times.iter().copied().fold(f64::INFINITY, f64::min);
        let max_rt = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self {
            name: name.to_string(),
            trials,
            accuracy: correct as f64 / trials as f64,
            mean_rt,
            min_rt,
            max_rt,
        }
    }
}

/// One summary per block, in the order blocks first appear in `rows`.
pub fn summarize(rows: &[TrialResult]) -> Vec<BlockSummary> {
    let mut names: Vec<&str> = Vec::new();
    for row in rows {
        if !names.contains(&row.block_name.as_str()) {
            names.push(&row.block_name);
        }
    }

    names
        .into_iter()
        .map(|name| {
            let block: Vec<&TrialResult> = rows.iter().filter(|r| r.block_name == name).collect();
            let summary = BlockSummary::from_rows(name, &block);
            tracing::info!(
                block = name,
                trials = summary.trials,
                accuracy = format_args!("{:.1}%", summary.accuracy * 100.0),
                mean_rt = format_args!("{:.3}s", summary.mean_rt),
                "Block summary"
            );
            summary
        })
        .collect()
}
