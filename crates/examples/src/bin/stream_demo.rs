use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::{info, warn};
use tk_core::{BoundedTopK, CancelToken, Natural, TopKConfig, TopKError};
use tk_runtime::metrics::{MetricsRegistry, RunTimer};
use tk_runtime::{init_tracing, start_runtime};

/// Feeds a synthetic integer stream into a top-K set while observers poll it.
#[derive(Parser, Debug)]
#[command(name = "stream_demo")]
struct Args {
    /// Number of elements to retain; overrides the config file.
    #[arg(long)]
    capacity: Option<usize>,
    /// JSON file holding a `TopKConfig`.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 4)]
    producers: usize,
    /// Elements generated by each producer.
    #[arg(long, default_value_t = 250_000)]
    elements: u64,
    #[arg(long, default_value_t = 2)]
    observers: usize,
    /// Pause between observer snapshots, in milliseconds.
    #[arg(long, default_value_t = 50)]
    observe_every_ms: u64,
}

/// Deterministic xorshift stream so runs are reproducible.
struct Feed {
    state: u64,
}

impl Feed {
    fn new(seed: u64) -> Self {
        Self { state: seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1 }
    }

    fn next_value(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state % 10_000_000
    }
}

fn observe(
    id: usize,
    topk: BoundedTopK<u64>,
    metrics: MetricsRegistry,
    token: CancelToken,
    every: Duration,
) -> Result<()> {
    loop {
        let started = Instant::now();
        match topk.snapshot_cancellable(&token) {
            Ok(snapshot) => {
                metrics.inc_snapshots_taken(1);
                metrics.record_snapshot_wait(started.elapsed());
                info!(
                    observer = id,
                    len = snapshot.len(),
                    min = ?snapshot.min(),
                    max = ?snapshot.max(),
                    "observed top-k"
                );
            }
            Err(TopKError::Cancelled) => {
                metrics.inc_snapshots_cancelled(1);
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        }
        if token.is_cancelled() {
            return Ok(());
        }
        thread::sleep(every);
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    info!(?args, "stream_demo starting");

    let mut cfg = match &args.config {
        Some(path) => TopKConfig::from_json_file(path)?,
        None => TopKConfig::default(),
    };
    if let Some(capacity) = args.capacity {
        cfg.capacity = capacity;
    }
    let topk = BoundedTopK::<u64>::with_config(cfg, Natural)?;
    let metrics = MetricsRegistry::default();
    let token = CancelToken::new();
    let timer = RunTimer::start();

    let observers: Vec<_> = (0..args.observers)
        .map(|id| {
            let topk = topk.clone();
            let metrics = metrics.clone();
            let token = token.clone();
            let every = Duration::from_millis(args.observe_every_ms);
            thread::spawn(move || observe(id, topk, metrics, token, every))
        })
        .collect();

    let produced = start_runtime(args.producers, |index| {
        let mut feed = Feed::new(index as u64 + 1);
        for _ in 0..args.elements {
            topk.record(feed.next_value());
        }
        metrics.inc_elements_fed(args.elements);
        info!(producer = index, elements = args.elements, "producer finished");
        Ok(())
    });

    // Observers still waiting (the stream may have been shorter than capacity) are released.
    token.cancel();
    for handle in observers {
        handle.join().map_err(|_| anyhow!("observer panicked"))??;
    }
    produced?;

    match topk.try_snapshot() {
        Some(snapshot) => {
            let top: Vec<u64> = snapshot.iter_desc().take(10).copied().collect();
            info!(len = snapshot.len(), ?top, "final top-k");
        }
        None => warn!(
            len = topk.len(),
            capacity = topk.capacity(),
            "stream ended before the top-k set filled"
        ),
    }

    let final_metrics = metrics.snapshot();
    println!("{}", final_metrics.to_json_line("stream_demo", Some(topk.stats()), Some(timer.elapsed())));
    Ok(())
}
