//! Genetic band-assignment optimizer
//!
//! Evolves a fixed-size population of [`Candidate`]s for a fixed number of
//! generations:
//!
//! 1. Score every candidate and stable-sort descending (ties keep population order)
//! 2. Keep the top `max(2, population / 10)` as elites, unmutated
//! 3. Refill with single-point crossover of two distinct elites, mutating
//!    one gene with probability 0.2
//! 4. After the last generation return the first candidate with the highest fitness
//!
//! All randomness comes from the caller's [`Rng`], so a seeded generator
//! reproduces the whole run.

use crate::config::{EngineConfig, OptimizerConfig};
use crate::normalize::{RegionSignal, RegionSignals};
use crate::{Band, EngineError, Region, Result};
use rand::Rng;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

/// Demand counts 1.5x the other per-region terms
pub const DEMAND_WEIGHT: f64 = 1.5;

/// Sum of the per-region term weights (1.5 + 1 + 1 + 1)
pub const REGION_WEIGHT_TOTAL: f64 = 4.5;

/// One band index per region, in request region order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    genes: Vec<usize>,
}

impl Candidate {
    pub fn new(genes: Vec<usize>) -> Self {
        Self { genes }
    }

    /// Every region gets a uniformly random band
    pub fn random<R: Rng>(regions: usize, num_bands: usize, rng: &mut R) -> Self {
        Self {
            genes: (0..regions).map(|_| rng.gen_range(0..num_bands)).collect(),
        }
    }

    pub fn genes(&self) -> &[usize] {
        &self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Number of distinct band indices in use
    pub fn distinct_bands(&self) -> usize {
        self.genes.iter().collect::<HashSet<_>>().len()
    }

    /// `self[..cut]` followed by `other[cut..]`
    pub fn crossover(&self, other: &Candidate, cut: usize) -> Candidate {
        let cut = cut.min(self.genes.len());
        let mut genes = Vec::with_capacity(self.genes.len());
        genes.extend_from_slice(&self.genes[..cut]);
        genes.extend_from_slice(&other.genes[cut..]);
        Candidate { genes }
    }

    /// Replace one random gene with a random band
    pub fn mutate<R: Rng>(&mut self, num_bands: usize, rng: &mut R) {
        if self.genes.is_empty() {
            return;
        }
        let pos = rng.gen_range(0..self.genes.len());
        self.genes[pos] = rng.gen_range(0..num_bands);
    }
}

/// How close band `index` is to the real-valued ideal index (1.0 = exact)
pub fn band_match(index: usize, ideal: f64, num_bands: usize) -> f64 {
    if num_bands <= 1 {
        return 1.0;
    }
    let span = (num_bands - 1) as f64;
    (1.0 - (index as f64 - ideal).abs() / span).max(0.0)
}

/// Score contribution of one region, before the demand multiplier
fn region_score(signal: &RegionSignal, index: usize, num_bands: usize) -> f64 {
    let ideal = (signal.demand + signal.efficiency) / 2.0 * num_bands.saturating_sub(1) as f64;
    let matched = band_match(index, ideal, num_bands);

    (DEMAND_WEIGHT * signal.demand + signal.efficiency + signal.resource + matched)
        / REGION_WEIGHT_TOTAL
}

/// Result of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct Evolution {
    pub best: Candidate,
    pub fitness: f64,
    pub generations: usize,
}

#[derive(Debug, Clone)]
pub struct GeneticOptimizer {
    config: OptimizerConfig,
}

impl GeneticOptimizer {
    pub fn new(config: OptimizerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Composite fitness of a candidate; non-negative, higher is better
    pub fn fitness(&self, candidate: &Candidate, signals: &RegionSignals, num_bands: usize) -> f64 {
        let total: f64 = candidate
            .genes
            .iter()
            .zip(signals.as_slice())
            .map(|(&band, signal)| region_score(signal, band, num_bands) * (1.0 + signal.demand))
            .sum();

        let diversity = candidate.distinct_bands() as f64 / candidate.len().max(1) as f64;
        total * (1.0 + self.config.diversity_weight * diversity)
    }

    /// Run the full generational loop and return the best candidate
    pub fn evolve<R: Rng>(
        &self,
        signals: &RegionSignals,
        num_bands: usize,
        rng: &mut R,
    ) -> Result<Evolution> {
        if num_bands == 0 {
            return Err(EngineError::InvalidInput("no bands provided".to_string()));
        }
        if signals.is_empty() {
            return Err(EngineError::InvalidInput("no regions provided".to_string()));
        }

        let regions = signals.len();
        let pop_size = self.config.population_size;
        let elite_count = self.config.elite_count();
        let max_cut = (regions - 1).max(1);

        let mut population: Vec<Candidate> = (0..pop_size)
            .map(|_| Candidate::random(regions, num_bands, rng))
            .collect();

        let mut generations_run = 0;
        for generation in 0..self.config.generations {
            let mut scored: Vec<(f64, Candidate)> = population
                .into_iter()
                .map(|c| (self.fitness(&c, signals, num_bands), c))
                .collect();
            // sort_by is stable, so equal scores keep population order
            scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

            debug!("Generation {}: best fitness {:.4}", generation, scored[0].0);

            let elites: Vec<Candidate> = scored
                .into_iter()
                .take(elite_count)
                .map(|(_, c)| c)
                .collect();

            let mut next = Vec::with_capacity(pop_size);
            next.extend(elites.iter().cloned());

            while next.len() < pop_size {
                let (p1, p2) = pick_two(&elites, rng);
                let cut = rng.gen_range(1..=max_cut);
                let mut child = p1.crossover(p2, cut);
                if rng.gen::<f64>() < self.config.mutation_rate {
                    child.mutate(num_bands, rng);
                }
                next.push(child);
            }

            population = next;
            generations_run += 1;
        }

        let mut best: Option<(f64, Candidate)> = None;
        for candidate in population {
            let score = self.fitness(&candidate, signals, num_bands);
            // Strict comparison keeps the first of equal maxima
            if best.as_ref().map_or(true, |(top, _)| score > *top) {
                best = Some((score, candidate));
            }
        }

        let (fitness, best) = best.ok_or_else(|| {
            EngineError::InvalidInput("population is empty".to_string())
        })?;

        info!(
            "Evolved {} generations x {} candidates, best fitness {:.3}",
            generations_run, pop_size, fitness
        );

        Ok(Evolution {
            best,
            fitness,
            generations: generations_run,
        })
    }
}

/// Two distinct elites, uniformly at random
fn pick_two<'a, R: Rng>(elites: &'a [Candidate], rng: &mut R) -> (&'a Candidate, &'a Candidate) {
    let i = rng.gen_range(0..elites.len());
    let mut j = rng.gen_range(0..elites.len() - 1);
    if j >= i {
        j += 1;
    }
    (&elites[i], &elites[j])
}

/// Map winning genes back to regions.
///
/// Returns (region → display label, region → band token). Tokens missing
/// from the configured label table are displayed as-is.
pub fn decode(
    candidate: &Candidate,
    regions: &[Region],
    bands: &[Band],
    config: &EngineConfig,
) -> (BTreeMap<Region, String>, BTreeMap<Region, Band>) {
    let mut display = BTreeMap::new();
    let mut tokens = BTreeMap::new();

    for (region, &index) in regions.iter().zip(candidate.genes()) {
        if let Some(band) = bands.get(index) {
            display.insert(region.clone(), config.label_for(band));
            tokens.insert(region.clone(), band.clone());
        }
    }

    (display, tokens)
}
