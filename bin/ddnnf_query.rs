use std::{collections::HashMap, fs, time::Instant};

use clap::{Parser, ValueEnum};
use ddnnf::{
    engine::{Counter, Marginalizer, Optimizer},
    repr::{Circuit, LiteralWeights, VarLabel},
    sample::Sampler,
    util::semiring::Query,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Serialize, Deserialize)]
struct VariableWeight<T> {
    low: T,
    high: T,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Task {
    Count,
    Min,
    Max,
    Sample,
    Marginals,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    None,
}

impl LogLevel {
    fn to_trace(&self) -> Option<tracing::Level> {
        Some(match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::None => return None,
        })
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// input circuit in `.nnf` form
    #[arg(short, long, value_name = "circuit.nnf")]
    file: String,

    /// path to weights JSON file, mapping variable numbers (starting at 1) to
    /// `{"low": .., "high": ..}`; missing variables weigh 1 on both literals
    #[arg(short, long)]
    weights: Option<String>,

    /// query to answer
    #[arg(short, long, value_enum, default_value_t = Task::Count)]
    query: Task,

    /// number of models to draw with `--query sample`
    #[arg(short = 'n', long, default_value_t = 1)]
    samples: usize,

    /// seed of the random generator used for sampling
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// number of workers for sampling and marginals (default: one per thread)
    #[arg(long)]
    workers: Option<usize>,

    /// Verbosity level. See `tracing::Level` for more information.
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    verbosity: LogLevel,
}

fn read_weights(path: &str, num_vars: usize) -> Result<LiteralWeights, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("could not read {path}: {e}"))?;
    let weights = serde_json::from_str::<HashMap<String, VariableWeight<f64>>>(&text)
        .map_err(|e| format!("could not parse {path}: {e}"))?;
    let mut by_label = HashMap::new();
    for (name, w) in weights {
        let var = name
            .parse::<usize>()
            .ok()
            .filter(|&v| v >= 1 && v <= num_vars)
            .ok_or_else(|| format!("`{name}` is not a variable of the circuit"))?;
        by_label.insert(VarLabel::new_usize(var - 1), (w.low, w.high));
    }
    Ok(LiteralWeights::from_var_weights(&by_label, num_vars))
}

fn main() -> Result<(), String> {
    let args = Args::parse();

    if let Some(level) = args.verbosity.to_trace() {
        tracing_subscriber::fmt().with_max_level(level).init();
    }

    let circuit = Circuit::from_file(&args.file)
        .map_err(|e| format!("could not load circuit from {}: {e}", args.file))?;
    let weights = match &args.weights {
        Some(path) => read_weights(path, circuit.num_vars())?,
        None => LiteralWeights::uniform(circuit.num_vars()),
    };

    let start = Instant::now();
    match args.query {
        Task::Count => println!("{}", Counter::new(&circuit).count_weighted(&weights)),
        Task::Min | Task::Max => {
            let query = if let Task::Min = args.query {
                Query::Min
            } else {
                Query::Max
            };
            if Counter::new(&circuit).count() == 0.0 {
                return Err(String::from("the circuit has no model to optimize over"));
            }
            let mut optimizer = Optimizer::new(&circuit, query);
            let model = optimizer.optimize(&weights);
            println!("{}", model);
            println!("{}", optimizer.value(&model, &weights));
        }
        Task::Sample => {
            let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
            let mut sampler = Sampler::new(&circuit);
            if let Some(n) = args.workers.filter(|&n| n > 0) {
                sampler = sampler.with_workers(n);
            }
            for model in sampler.sample_many_weighted(&weights, args.samples, &mut rng) {
                println!("{}", model);
            }
        }
        Task::Marginals => {
            let mut marginalizer = Marginalizer::new(&circuit);
            if let Some(n) = args.workers.filter(|&n| n > 0) {
                marginalizer = marginalizer.with_workers(n);
            }
            let marginals = marginalizer.marginals_weighted(&weights);
            for (x, pair) in marginals.chunks(2).enumerate() {
                println!("{} {} {}", x + 1, pair[0], pair[1]);
            }
        }
    }
    info!(elapsed = ?start.elapsed(), "answered query");

    Ok(())
}
