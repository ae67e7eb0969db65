//! Benchmarking module.
//!
//! Sweeps the worker count over a fixed time budget and records what each run
//! achieved: best cost, number of trials, and throughput. Results can be
//! exported to CSV and summarised per thread count.

use crate::error::Result;
use crate::heuristics::start::StartStrategy;
use crate::instance::TspInstance;
use crate::search::{Diversification, MultiStartSearch, SearchConfig};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

/// Result of a single search run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    pub instance: String,
    pub dimension: usize,
    pub threads: usize,
    pub diversification: String,
    pub run: usize,
    pub cost: u64,
    pub rounds: usize,
    pub trials: usize,
    pub improvements: usize,
    /// Wall-clock time in seconds
    pub time: f64,
    pub trials_per_second: f64,
}

/// Aggregated statistics for one thread count on one instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadStatistics {
    pub instance: String,
    pub threads: usize,
    pub runs: usize,
    pub best_cost: u64,
    pub avg_cost: f64,
    pub std_cost: f64,
    pub avg_time: f64,
    pub avg_trials_per_second: f64,
    /// Throughput relative to the smallest thread count benchmarked
    pub speedup: f64,
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Worker counts to sweep
    pub thread_counts: Vec<usize>,
    /// Runs per thread count
    pub num_runs: usize,
    /// Time limit per run in seconds
    pub time_limit: f64,
    pub diversification: Diversification,
    pub start: StartStrategy,
    /// Seed of the first run; run `r` uses `seed + r`
    pub seed: u64,
    pub show_progress: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            thread_counts: vec![1, 2, 4, 8],
            num_runs: 3,
            time_limit: 5.0,
            diversification: Diversification::Fixed,
            start: StartStrategy::Densest,
            seed: 42,
            show_progress: true,
        }
    }
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    records: Vec<BenchmarkRecord>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Benchmark {
            config,
            records: Vec::new(),
        }
    }

    fn search_config(&self, threads: usize, run: usize) -> SearchConfig {
        SearchConfig {
            threads,
            time_limit: self.config.time_limit,
            start: self.config.start,
            diversification: self.config.diversification,
            seed: self.config.seed.wrapping_add(run as u64),
            ..Default::default()
        }
    }

    /// Run the full thread sweep on an instance
    pub fn run(&mut self, instance: &TspInstance) -> Result<()> {
        log::info!(
            "benchmarking {} with thread counts {:?}",
            instance.name,
            self.config.thread_counts
        );

        let total = (self.config.thread_counts.len() * self.config.num_runs) as u64;
        let progress = if self.config.show_progress {
            ProgressBar::new(total)
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) =
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
        {
            progress.set_style(style);
        }

        for threads in self.config.thread_counts.clone() {
            for run in 0..self.config.num_runs {
                progress.set_message(format!("{} threads, run {}", threads, run + 1));

                let search = MultiStartSearch::new(self.search_config(threads, run));
                let outcome = search.run(instance)?;
                let trials_per_second = if outcome.elapsed_secs > 0.0 {
                    outcome.trials as f64 / outcome.elapsed_secs
                } else {
                    0.0
                };

                self.records.push(BenchmarkRecord {
                    instance: instance.name.clone(),
                    dimension: instance.dimension,
                    threads,
                    diversification: self.config.diversification.to_string(),
                    run,
                    cost: outcome.best.cost,
                    rounds: outcome.rounds,
                    trials: outcome.trials,
                    improvements: outcome.improvements,
                    time: outcome.elapsed_secs,
                    trials_per_second,
                });
                progress.inc(1);
            }
        }

        progress.finish_and_clear();
        Ok(())
    }

    /// Compute statistics per instance and thread count
    pub fn compute_statistics(&self) -> Vec<ThreadStatistics> {
        let mut groups: BTreeMap<(String, usize), Vec<&BenchmarkRecord>> = BTreeMap::new();
        for record in &self.records {
            groups
                .entry((record.instance.clone(), record.threads))
                .or_default()
                .push(record);
        }

        let mut statistics: Vec<ThreadStatistics> = Vec::new();
        let mut baseline: Option<(String, f64)> = None;

        // BTreeMap order: per instance, ascending thread count
        for ((instance, threads), records) in groups {
            let costs: Vec<f64> = records.iter().map(|r| r.cost as f64).collect();
            let times: Vec<f64> = records.iter().map(|r| r.time).collect();
            let rates: Vec<f64> = records.iter().map(|r| r.trials_per_second).collect();

            let avg_trials_per_second = rates.iter().mean();
            let base_rate = match &baseline {
                Some((name, rate)) if *name == instance => *rate,
                _ => {
                    baseline = Some((instance.clone(), avg_trials_per_second));
                    avg_trials_per_second
                }
            };

            statistics.push(ThreadStatistics {
                threads,
                runs: records.len(),
                best_cost: records.iter().map(|r| r.cost).fold(u64::MAX, u64::min),
                avg_cost: costs.iter().mean(),
                std_cost: costs.iter().population_std_dev(),
                avg_time: times.iter().mean(),
                avg_trials_per_second,
                speedup: if base_rate > 0.0 {
                    avg_trials_per_second / base_rate
                } else {
                    0.0
                },
                instance,
            });
        }

        statistics
    }

    /// Export results to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for record in &self.records {
            writer.serialize(record)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export statistics to CSV
    pub fn export_statistics_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for stat in self.compute_statistics() {
            writer.serialize(stat)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("    Multi-start TSP Benchmark Report\n");
        report.push_str("========================================\n");
        report.push_str(&format!(
            "Generated: {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        report.push_str(&format!(
            "Time limit: {:.2}s | Runs: {} | Diversification: {}\n\n",
            self.config.time_limit, self.config.num_runs, self.config.diversification
        ));

        report.push_str(&format!(
            "{:<20} {:>8} {:>12} {:>12} {:>10} {:>14} {:>9}\n",
            "Instance", "Threads", "Best Cost", "Avg Cost", "Std", "Trials/s", "Speedup"
        ));
        report.push_str("-".repeat(91).as_str());
        report.push('\n');

        for stat in self.compute_statistics() {
            report.push_str(&format!(
                "{:<20} {:>8} {:>12} {:>12.2} {:>10.2} {:>14.1} {:>8.2}x\n",
                stat.instance,
                stat.threads,
                stat.best_cost,
                stat.avg_cost,
                stat.std_cost,
                stat.avg_trials_per_second,
                stat.speedup
            ));
        }

        report.push_str("-".repeat(91).as_str());
        report.push('\n');
        report
    }

    /// Get all results
    pub fn records(&self) -> &[BenchmarkRecord] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_instance() -> TspInstance {
        TspInstance::from_matrix(
            "four",
            vec![
                vec![0, 10, 15, 20],
                vec![10, 0, 35, 25],
                vec![15, 35, 0, 30],
                vec![20, 25, 30, 0],
            ],
        )
        .unwrap()
    }

    fn quick_config() -> BenchmarkConfig {
        BenchmarkConfig {
            thread_counts: vec![1, 2],
            num_runs: 2,
            time_limit: 0.01,
            show_progress: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_benchmark_config() {
        let config = BenchmarkConfig::default();
        assert_eq!(config.num_runs, 3);
        assert_eq!(config.thread_counts, vec![1, 2, 4, 8]);
    }

    #[test]
    fn test_sweep_records_every_run() {
        let mut benchmark = Benchmark::new(quick_config());
        benchmark.run(&small_instance()).unwrap();

        assert_eq!(benchmark.records().len(), 4);
        assert!(benchmark.records().iter().all(|r| r.cost == 80));

        let stats = benchmark.compute_statistics();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].threads, 1);
        assert_eq!(stats[1].threads, 2);
        assert_eq!(stats[0].best_cost, 80);
        assert!(stats[0].std_cost.abs() < 1e-9);
        assert!((stats[0].speedup - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_exports_and_report() {
        let mut benchmark = Benchmark::new(quick_config());
        benchmark.run(&small_instance()).unwrap();

        let dir = std::env::temp_dir();
        let results = dir.join(format!("nn-tsp-bench-{}-results.csv", std::process::id()));
        let stats = dir.join(format!("nn-tsp-bench-{}-stats.csv", std::process::id()));
        benchmark.export_to_csv(&results).unwrap();
        benchmark.export_statistics_csv(&stats).unwrap();

        let results_text = std::fs::read_to_string(&results).unwrap();
        let stats_text = std::fs::read_to_string(&stats).unwrap();
        std::fs::remove_file(&results).ok();
        std::fs::remove_file(&stats).ok();

        assert!(results_text.starts_with("instance,dimension,threads"));
        assert_eq!(results_text.lines().count(), 5);
        assert_eq!(stats_text.lines().count(), 3);

        let report = benchmark.generate_report();
        assert!(report.contains("Benchmark Report"));
        assert!(report.contains("four"));
    }
}
