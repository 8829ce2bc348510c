//! Runtime bootstrap for top-K stream pipelines.

use anyhow::{anyhow, Result};
use tracing::{info, Level};

pub mod metrics;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_max_level(Level::INFO)
        .try_init();
}

/// Run the provided closure once per worker on scoped threads and wait for all of them.
///
/// The first worker error (or panic) is returned after every worker has finished.
pub fn start_runtime<F>(workers: usize, f: F) -> Result<()>
where
    F: Fn(usize) -> Result<()> + Sync,
{
    if workers == 0 {
        return Err(anyhow!("runtime needs at least one worker"));
    }
    info!(%workers, "starting worker runtime");
    let f = &f;
    std::thread::scope(|scope| -> Result<()> {
        let handles: Vec<_> = (0..workers)
            .map(|index| {
                std::thread::Builder::new()
                    .name(format!("tk-worker-{index}"))
                    .spawn_scoped(scope, move || f(index))
            })
            .collect::<std::io::Result<_>>()?;

        let mut first_err = None;
        for (index, handle) in handles.into_iter().enumerate() {
            let outcome = handle
                .join()
                .unwrap_or_else(|_| Err(anyhow!("worker {index} panicked")));
            if let Err(err) = outcome {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    })
}
