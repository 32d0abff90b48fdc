// EsoxSolutions.KeyedPool
// Keyed object pool registry with bounded free lists
// Version 1.0.0

// Small demo of the library; set RUST_LOG=debug to see pool events

use esox_keyedpool::{MetricsExporter, PoolConfiguration, PoolHooks, PoolRegistry};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== EsoxSolutions.KeyedPool v1.0.0 ===");
    println!();

    let mut registry = PoolRegistry::new();
    let config = PoolConfiguration::new().with_max_size(2);

    let ids: Vec<_> = match registry.get_or_create_pool("bullets", PoolHooks::new(|| [0.0f32; 2]), config) {
        Some(mut pool) => (0..3).map(|_| pool.acquire()).collect(),
        None => Vec::new(),
    };
    println!("  Acquired {} bullets", ids.len());

    for id in ids {
        if let Err(err) = registry.release(id, Some("demo")) {
            eprintln!("  Release failed: {}", err);
        }
    }

    if let Some(pool) = registry.pool("bullets") {
        println!("  Idle after release: {}", pool.idle_count());
        println!("  Destroyed on overflow: {}", pool.total_destroyed());
    }

    let removed = registry.release_and_destroy_unused(None);
    println!("  Pools removed by sweep: {}", removed.len());
    println!();

    for (name, value) in MetricsExporter::export(&registry.metrics()) {
        println!("  {} = {}", name, value);
    }

    registry.shutdown();
}
