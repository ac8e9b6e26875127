//! Stimulus table loading and the per-block selection pipeline:
//! filter → compensate → sample → deneighbor.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::io;
use std::path::Path;

use iat_core::{Atom, Label, Stimulus};
use rand::Rng;

use crate::error::PoolError;

/// All stimuli of the source table, in row order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StimulusPool {
    stimuli: Vec<Stimulus>,
}

impl StimulusPool {
    pub fn new(stimuli: Vec<Stimulus>) -> Self {
        Self { stimuli }
    }

    pub fn load(path: &Path) -> Result<Self, PoolError> {
        let file = std::fs::File::open(path).map_err(|source| PoolError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let pool = Self::from_reader(io::BufReader::new(file))?;
        tracing::info!(path = %path.display(), stimuli = pool.len(), "Loaded stimulus table");
        Ok(pool)
    }

    /// Parses a CSV table with a header row. `content` and `response` are
    /// required; every other column is kept on the stimulus as extra data.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, PoolError> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = rdr.headers()?.clone();
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or(PoolError::MissingColumn(name))
        };
        let content_col = column("content")?;
        let response_col = column("response")?;

        let mut stimuli = Vec::new();
        for (i, record) in rdr.records().enumerate() {
            let record = record?;
            let row = i + 1;
            let field = |col: usize, column: &'static str| {
                record
                    .get(col)
                    .ok_or(PoolError::MissingField { row, column })
            };
            let content = field(content_col, "content")?;
            let response = field(response_col, "response")?;

            let extra: BTreeMap<String, String> = headers
                .iter()
                .zip(record.iter())
                .enumerate()
                .filter(|(col, _)| *col != content_col && *col != response_col)
                .map(|(_, (h, v))| (h.to_string(), v.to_string()))
                .collect();

            stimuli.push(Stimulus {
                content: Atom::from(content),
                response: Label::from(response),
                extra,
            });
        }
        Ok(Self { stimuli })
    }

    pub fn filter<S: AsRef<str>>(&self, categories: &[S]) -> Vec<Stimulus> {
        filter(&self.stimuli, categories)
    }

    pub fn stimuli(&self) -> &[Stimulus] {
        &self.stimuli
    }

    pub fn len(&self) -> usize {
        self.stimuli.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stimuli.is_empty()
    }
}

/// Stimuli whose response category is one of `categories`, in pool order.
/// Unknown categories simply match nothing.
pub fn filter<S: AsRef<str>>(pool: &[Stimulus], categories: &[S]) -> Vec<Stimulus> {
    pool.iter()
        .filter(|s| categories.iter().any(|c| c.as_ref() == &*s.response))
        .cloned()
        .collect()
}

/// Tops `pool` up to `target` items by drawing from the original items in
/// rounds, each round without replacement, so no item is repeated more than
/// once beyond any other. The originals stay first and untouched. An empty
/// pool has nothing to draw from and comes back empty.
pub fn compensate<R: Rng + ?Sized>(mut pool: Vec<Stimulus>, target: usize, rng: &mut R) -> Vec<Stimulus> {
    let original = pool.len();
    if original == 0 || original >= target {
        return pool;
    }
    pool.reserve(target - original);
    while pool.len() < target {
        let round = sample_without_replacement(pool[..original].to_vec(), target - pool.len(), rng);
        pool.extend(round);
    }
    pool
}

/// `count` items without replacement: every item gets an independent uniform
/// key, the pool is sorted by it and the head is kept.
pub fn sample_without_replacement<T, R: Rng + ?Sized>(pool: Vec<T>, count: usize, rng: &mut R) -> Vec<T> {
    let mut keyed: Vec<(f64, T)> = pool.into_iter().map(|s| (rng.random::<f64>(), s)).collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    keyed.into_iter().take(count).map(|(_, s)| s).collect()
}

/// Some value occupies more slots than any no-repeat arrangement allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crowded {
    pub count: usize,
    pub len: usize,
}

/// Random permutation of `seq` with no two adjacent equal elements.
///
/// Items are grouped by value and the sequence is built one slot at a time,
/// picking a value at random (weighted by how many copies are left) among
/// those that keep the rest solvable. With `r` items left after a pick and
/// the picked value `v` as the new neighbour, the rest is solvable iff every
/// value has at most `⌈r/2⌉` copies and `v` has at most `⌊r/2⌋`. The most
/// frequent value other than the previous one always passes that test when
/// the current state is solvable, so every step succeeds and the loop ends
/// after exactly `seq.len()` picks.
///
/// The initial state is solvable iff no value fills more than `⌈n/2⌉`
/// slots; otherwise [`Crowded`] is returned without shuffling.
pub fn deneighbor<T, R>(seq: Vec<T>, rng: &mut R) -> Result<Vec<T>, Crowded>
where
    T: Eq + Hash + Clone,
    R: Rng + ?Sized,
{
    let len = seq.len();
    let mut index: HashMap<T, usize> = HashMap::new();
    let mut groups: Vec<(T, usize)> = Vec::new();
    for item in seq {
        match index.get(&item) {
            Some(&g) => groups[g].1 += 1,
            None => {
                index.insert(item.clone(), groups.len());
                groups.push((item, 1));
            }
        }
    }

    let max = groups.iter().map(|(_, c)| *c).max().unwrap_or(0);
    if max > len.div_ceil(2) {
        return Err(Crowded { count: max, len });
    }

    let mut out = Vec::with_capacity(len);
    let mut last: Option<usize> = None;
    for placed in 0..len {
        let rest = len - placed - 1;
        let solvable_after = |g: usize| {
            groups.iter().enumerate().all(|(j, (_, c))| {
                if j == g {
                    c - 1 <= rest / 2
                } else {
                    *c <= rest.div_ceil(2)
                }
            })
        };
        let candidates: Vec<usize> = (0..groups.len())
            .filter(|&g| groups[g].1 > 0 && Some(g) != last && solvable_after(g))
            .collect();

        let total: usize = candidates.iter().map(|&g| groups[g].1).sum();
        let mut ticket = rng.random_range(0..total);
        let mut chosen = candidates[0];
        for &g in &candidates {
            if ticket < groups[g].1 {
                chosen = g;
                break;
            }
            ticket -= groups[g].1;
        }

        groups[chosen].1 -= 1;
        out.push(groups[chosen].0.clone());
        last = Some(chosen);
    }
    Ok(out)
}
