//! Multi-start nearest-neighbor TSP solver - Command Line Interface
//!
//! `nn-tsp-solver <THREADS>` searches the default distance matrix for 60
//! seconds and prints the best tour found.

use clap::{Args, Parser, Subcommand, ValueEnum};
use nn_tsp_solver::benchmark::{Benchmark, BenchmarkConfig};
use nn_tsp_solver::error::{Result, SolverError};
use nn_tsp_solver::heuristics::construction::{ConstructionHeuristic, NearestNeighborHeuristic};
use nn_tsp_solver::heuristics::start::{select_start, StartStrategy};
use nn_tsp_solver::instance::{read_points, TspInstance};
use nn_tsp_solver::search::{Diversification, MultiStartSearch, SearchConfig};
use nn_tsp_solver::tour::Tour;
use nn_tsp_solver::visualization::Visualizer;

use std::path::{Path, PathBuf};

const DEFAULT_MATRIX: &str = "DistanceMatrix1000_v2.csv";

#[derive(Parser)]
#[command(name = "nn-tsp-solver")]
#[command(version = "1.0")]
#[command(about = "Time-bounded multi-threaded nearest-neighbor TSP solver")]
#[command(args_conflicts_with_subcommands = true)]
#[command(subcommand_negates_reqs = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    solve: SolveArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Sweep worker counts and report throughput and tour quality
    Benchmark(BenchmarkArgs),

    /// Print instance statistics and a single-trial estimate
    Analyze(InputArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Distance matrix CSV (N rows of N integers, no header)
    #[arg(short, long)]
    matrix: Option<PathBuf>,

    /// City coordinates CSV (`x,y` per row)
    #[arg(short, long)]
    coords: Option<PathBuf>,

    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Args, Debug)]
struct SolveArgs {
    /// Number of worker threads
    #[arg(required = true, value_parser = parse_thread_count)]
    threads: Option<usize>,

    #[command(flatten)]
    input: InputArgs,

    /// Time limit in seconds
    #[arg(short, long, default_value = "60")]
    time_limit: f64,

    /// Rounds between two clock checks
    #[arg(long, default_value = "1")]
    rounds_per_check: usize,

    /// Stop after this many rounds even if time remains
    #[arg(long)]
    max_rounds: Option<usize>,

    /// Anchor city (defaults to the densest city, or 0 without coordinates)
    #[arg(long)]
    start: Option<usize>,

    /// How trials differ from one another
    #[arg(short, long, value_enum, default_value = "fixed")]
    diversify: DiversifyArg,

    /// Candidate pool size for `--diversify perturbed`
    #[arg(long, default_value = "3")]
    top_k: usize,

    /// Random seed
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Write the search outcome as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write an SVG drawing of the best tour (needs coordinates)
    #[arg(long)]
    svg: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct BenchmarkArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Worker counts to sweep
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "1,2,4,8",
        value_parser = parse_thread_count
    )]
    threads: Vec<usize>,

    /// Number of runs per worker count
    #[arg(short, long, default_value = "3")]
    runs: usize,

    /// Time limit per run in seconds
    #[arg(short, long, default_value = "5")]
    time_limit: f64,

    #[arg(short, long, value_enum, default_value = "fixed")]
    diversify: DiversifyArg,

    #[arg(long, default_value = "3")]
    top_k: usize,

    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Output directory for results
    #[arg(short, long, default_value = "results")]
    output: PathBuf,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum DiversifyArg {
    /// Every worker rebuilds the same tour from the anchor city
    Fixed,
    /// Each trial starts from the next city after the anchor
    StartOffset,
    /// Ties between equally near cities are broken at random
    RandomTieBreak,
    /// The next city is drawn from the top-k nearest
    Perturbed,
}

impl DiversifyArg {
    fn resolve(self, top_k: usize) -> Diversification {
        match self {
            DiversifyArg::Fixed => Diversification::Fixed,
            DiversifyArg::StartOffset => Diversification::StartOffset,
            DiversifyArg::RandomTieBreak => Diversification::RandomTieBreak,
            DiversifyArg::Perturbed => Diversification::Perturbed { top_k },
        }
    }
}

fn parse_thread_count(s: &str) -> std::result::Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("thread count must be a positive integer".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("`{}` is not a valid thread count", s)),
    }
}

fn init_logger(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}

fn main() {
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Some(Commands::Benchmark(args)) => args.input.verbose,
        Some(Commands::Analyze(args)) => args.verbose,
        None => cli.solve.input.verbose,
    };
    init_logger(verbose);

    let result = match cli.command {
        Some(Commands::Benchmark(args)) => run_benchmark(args),
        Some(Commands::Analyze(args)) => analyze_instance(args),
        None => solve_instance(cli.solve),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

/// Matrix file if given, else coordinates if given, else the default matrix.
fn load_instance(input: &InputArgs) -> Result<TspInstance> {
    match (&input.matrix, &input.coords) {
        (None, Some(coords)) => TspInstance::from_coordinates_file(coords),
        (matrix, coords) => {
            let path = matrix
                .as_deref()
                .unwrap_or_else(|| Path::new(DEFAULT_MATRIX));
            let instance = TspInstance::from_csv_file(path)?;
            match coords {
                Some(coords) => instance.with_coordinates(read_points(coords)?),
                None => Ok(instance),
            }
        }
    }
}

fn report(best: &Tour) -> String {
    [
        format!("Minimum cost: {}", best.cost),
        format!("The number of cities traversed: {}", best.len()),
        format!("The list of cities traversed in order: {}", best),
    ]
    .join("\n")
}

fn solve_instance(args: SolveArgs) -> Result<()> {
    let threads = args
        .threads
        .ok_or_else(|| SolverError::invalid_config("missing thread count"))?;
    let instance = load_instance(&args.input)?;

    let config = SearchConfig {
        threads,
        time_limit: args.time_limit,
        rounds_per_check: args.rounds_per_check,
        max_rounds: args.max_rounds,
        start: args.start.map_or(StartStrategy::Densest, StartStrategy::Fixed),
        diversification: args.diversify.resolve(args.top_k),
        seed: args.seed,
    };

    let outcome = MultiStartSearch::new(config).run(&instance)?;

    println!("{}", report(&outcome.best));

    if args.input.verbose > 0 {
        println!("\n{}", outcome);
    }

    if let Some(out_path) = args.output {
        let json = serde_json::to_string_pretty(&outcome)?;
        std::fs::write(&out_path, json)?;
        log::info!("outcome saved to {}", out_path.display());
    }

    if let Some(svg_path) = args.svg {
        let viz = Visualizer::new();
        match viz.generate_svg(&instance, &outcome.best) {
            Some(svg) => {
                viz.save_svg(&svg, &svg_path)?;
                log::info!("visualization saved to {}", svg_path.display());
            }
            None => log::warn!("no coordinates available, skipping SVG output"),
        }
    }

    Ok(())
}

fn run_benchmark(args: BenchmarkArgs) -> Result<()> {
    let instance = load_instance(&args.input)?;
    std::fs::create_dir_all(&args.output)?;

    let config = BenchmarkConfig {
        thread_counts: args.threads,
        num_runs: args.runs,
        time_limit: args.time_limit,
        diversification: args.diversify.resolve(args.top_k),
        seed: args.seed,
        show_progress: !args.no_progress,
        ..Default::default()
    };

    let mut benchmark = Benchmark::new(config);
    benchmark.run(&instance)?;

    let results_path = args.output.join("results.csv");
    benchmark.export_to_csv(&results_path)?;
    println!("Results exported to {:?}", results_path);

    let stats_path = args.output.join("statistics.csv");
    benchmark.export_statistics_csv(&stats_path)?;
    println!("Statistics exported to {:?}", stats_path);

    let report = benchmark.generate_report();
    println!("\n{}", report);

    let report_path = args.output.join("report.txt");
    std::fs::write(&report_path, &report)?;
    println!("Report saved to {:?}", report_path);
    Ok(())
}

fn analyze_instance(args: InputArgs) -> Result<()> {
    let instance = load_instance(&args)?;

    println!("========== Instance Analysis ==========\n");
    println!("{}", instance.statistics());

    let anchor = select_start(&instance, StartStrategy::Densest)?;
    let nn = NearestNeighborHeuristic::new();
    let tour = nn.construct(&instance, anchor);

    println!("Quick Solution Estimate:");
    println!("  Anchor city: {}", anchor);
    println!("  {}: {}", nn.name(), tour.cost);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use nn_tsp_solver::instance::Point;

    fn write_fixture(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "nn-tsp-cli-{}-{}",
            std::process::id(),
            name
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn input(matrix: Option<&PathBuf>, coords: Option<&PathBuf>) -> InputArgs {
        InputArgs {
            matrix: matrix.cloned(),
            coords: coords.cloned(),
            verbose: 0,
        }
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_thread_count() {
        assert!(parse_thread_count("0").is_err());
        assert!(parse_thread_count("abc").is_err());
        assert!(parse_thread_count("-2").is_err());
        assert_eq!(parse_thread_count(" 4"), Ok(4));
        assert_eq!(parse_thread_count("16"), Ok(16));
    }

    #[test]
    fn test_thread_count_is_required_for_solving() {
        assert!(Cli::try_parse_from(["nn-tsp-solver"]).is_err());
        assert!(Cli::try_parse_from(["nn-tsp-solver", "0"]).is_err());
        assert!(Cli::try_parse_from(["nn-tsp-solver", "many"]).is_err());
    }

    #[test]
    fn test_solve_arguments() {
        let cli = Cli::try_parse_from(["nn-tsp-solver", "4", "--diversify", "perturbed"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.solve.threads, Some(4));
        assert_eq!(cli.solve.diversify, DiversifyArg::Perturbed);
        assert_eq!(
            cli.solve.diversify.resolve(cli.solve.top_k),
            Diversification::Perturbed { top_k: 3 }
        );
        assert_eq!(cli.solve.time_limit, 60.0);
        assert!(cli.solve.input.matrix.is_none());
    }

    #[test]
    fn test_subcommands_do_not_need_thread_count() {
        let cli = Cli::try_parse_from(["nn-tsp-solver", "analyze"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Analyze(_))));

        let cli = Cli::try_parse_from(["nn-tsp-solver", "benchmark", "--threads", "1,3"]).unwrap();
        match cli.command {
            Some(Commands::Benchmark(args)) => assert_eq!(args.threads, vec![1, 3]),
            _ => panic!("expected benchmark subcommand"),
        }

        assert!(Cli::try_parse_from(["nn-tsp-solver", "benchmark", "--threads", "1,0"]).is_err());
    }

    #[test]
    fn test_report_lines() {
        let tour = Tour::new(vec![0, 1, 3, 2], 80);
        let text = report(&tour);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines,
            vec![
                "Minimum cost: 80",
                "The number of cities traversed: 4",
                "The list of cities traversed in order: 0->1->3->2->0",
            ]
        );
    }

    #[test]
    fn test_load_matrix_then_coordinates() {
        let matrix = write_fixture("matrix.csv", "0,3,4\n3,0,5\n4,5,0\n");
        let coords = write_fixture("coords.csv", "0,0\n30,0\n0,40\n");
        let short_coords = write_fixture("short.csv", "0,0\n1,1\n");

        let from_matrix = load_instance(&input(Some(&matrix), None)).unwrap();
        let from_coords = load_instance(&input(None, Some(&coords))).unwrap();
        let both = load_instance(&input(Some(&matrix), Some(&coords))).unwrap();
        let mismatch = load_instance(&input(Some(&matrix), Some(&short_coords)));

        for path in [&matrix, &coords, &short_coords] {
            std::fs::remove_file(path).ok();
        }

        assert_eq!(from_matrix.distance(1, 2), 5);
        assert!(from_matrix.coordinates().is_none());

        // coordinates alone build the matrix
        assert_eq!(from_coords.distance(1, 2), 50);
        assert!(from_coords.coordinates().is_some());

        // a matrix wins; coordinates are only attached
        assert_eq!(both.distance(1, 2), 5);
        assert_eq!(both.coordinates().map(|p| p[1]), Some(Point::new(30.0, 0.0)));

        assert!(matches!(mismatch, Err(SolverError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_default_matrix_path() {
        match load_instance(&input(None, None)) {
            Ok(instance) => assert_eq!(instance.name, "DistanceMatrix1000_v2"),
            Err(e) => {
                assert!(matches!(e, SolverError::OpenFile { .. }));
                assert!(e.to_string().contains(DEFAULT_MATRIX));
            }
        }
    }
}
