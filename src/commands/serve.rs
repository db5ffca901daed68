use crate::engine::{PivotEngine, ResultCache};
use crate::server;
use crate::services::{RecordSource, TapeStore};
use std::sync::Arc;

pub async fn run(port: u16) {
    // Subscriber must be up before anything constructed below logs
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    println!("🚀 Starting tapepivot server on port {}", port);

    let tape_store = TapeStore::from_env();
    println!("📁 Tape directory: {}", tape_store.data_dir().display());
    let source: Arc<dyn RecordSource> = Arc::new(tape_store);

    let cache = ResultCache::from_env();
    println!("⏱️  Cache TTL: {}s", cache.ttl().as_secs());

    let engine = Arc::new(PivotEngine::new(source.clone(), cache));

    if let Err(e) = server::serve(engine, source, port).await {
        eprintln!("❌ Server error: {}", e);
        std::process::exit(1);
    }
}
