use std::thread;

use anyhow::{anyhow, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tk_core::{BoundedTopK, ByKey};
use tk_runtime::init_tracing;
use tk_runtime::metrics::{MetricsRegistry, RunTimer};

type MoneyCents = i64;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
struct OrderLine {
    sku_id: u64,
    qty: u32,
    price_cents: MoneyCents,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
struct OrderPlaced {
    order_id: u64,
    customer_id: u64,
    lines: Vec<OrderLine>,
    ts_ms: u64,
}

impl OrderPlaced {
    fn total_cents(&self) -> MoneyCents {
        self.lines
            .iter()
            .map(|l| l.price_cents.saturating_mul(l.qty as i64))
            .sum()
    }
}

/// Keeps a leaderboard of the largest orders seen on a synthetic order feed.
#[derive(Parser, Debug)]
#[command(name = "orders_demo")]
struct Args {
    #[arg(long, default_value_t = 5)]
    top: usize,
    #[arg(long, default_value_t = 10)]
    batches: u64,
    #[arg(long, default_value_t = 200)]
    orders_per_batch: u64,
    #[arg(long, default_value_t = 50)]
    customers: u64,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    info!(?args, "orders_demo starting");

    // Ties on the total fall back to the order id so the leaderboard is stable.
    let leaderboard = BoundedTopK::new(
        args.top,
        ByKey::new(|order: &OrderPlaced| (order.total_cents(), order.order_id)),
    )?;
    let metrics = MetricsRegistry::default();
    let timer = RunTimer::start();

    let reporter = {
        let leaderboard = leaderboard.clone();
        let metrics = metrics.clone();
        thread::spawn(move || {
            let first = leaderboard.snapshot()?;
            metrics.inc_snapshots_taken(1);
            info!(
                leader = ?first.max().map(|o| (o.order_id, o.total_cents())),
                "leaderboard filled"
            );
            Ok::<_, anyhow::Error>(())
        })
    };

    for batch in 0..args.batches {
        for i in 0..args.orders_per_batch {
            let cust = (batch * 13 + i * 7) % args.customers;
            let base: i64 = 1000 + ((i % 10) as i64) * 250;
            let bonus: i64 = if cust % 7 == 0 { 2000 } else { 0 };
            let order = OrderPlaced {
                order_id: batch * 10_000 + i,
                customer_id: cust,
                lines: vec![OrderLine { sku_id: i % 100, qty: 1 + (i % 3) as u32, price_cents: base + bonus }],
                ts_ms: batch * 1000,
            };
            leaderboard.record(order);
            metrics.inc_elements_fed(1);
        }
        info!(batch, retained = leaderboard.len(), "batch recorded");
    }

    let final_board = match leaderboard.try_snapshot() {
        Some(board) => board,
        None => {
            return Err(anyhow!(
                "only {} orders seen, leaderboard needs {}",
                leaderboard.len(),
                leaderboard.capacity()
            ))
        }
    };
    reporter.join().map_err(|_| anyhow!("reporter panicked"))??;

    println!("{}", final_board.to_json_line("largest_orders"));
    println!("{}", metrics.snapshot().to_json_line("orders_demo", Some(leaderboard.stats()), Some(timer.elapsed())));
    Ok(())
}
