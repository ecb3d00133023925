//! Serves product details through an LRU cache in front of an in-memory catalog.
//!
//! Run with `RUST_LOG=lru_front=debug cargo run --example product_catalog` to watch hits,
//! misses and evictions.

use lru_front::config::CAPACITY_ENV;
use lru_front::{CacheConfig, CacheFront, FetchError, InMemoryStore};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug)]
struct ProductDetails {
    product_id: u32,
    product_name: String,
    description: String,
    image: Vec<u8>,
    comments: Vec<String>,
}

impl ProductDetails {
    fn new(product_id: u32) -> Self {
        Self {
            product_id,
            product_name: format!("name{product_id}"),
            description: format!("Description {product_id}"),
            image: vec![0],
            comments: vec![String::from("comm")],
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let database: Arc<InMemoryStore<u32, ProductDetails>> =
        Arc::new((1..=3).map(|id| (id, ProductDetails::new(id))).collect());

    let config = match std::env::var(CAPACITY_ENV) {
        Ok(_) => CacheConfig::from_env()?,
        Err(_) => CacheConfig { capacity: 2 },
    };
    let cache = CacheFront::from_config(&config, Arc::clone(&database))?;

    for product_id in [1, 2, 1, 3, 2, 4] {
        match cache.fetch_outcome(&product_id) {
            Ok(outcome) => {
                let source = if outcome.is_hit() { "cache" } else { "database" };
                let product = outcome.into_value();
                println!(
                    "ProductDetails ID {}: {} - {} ({} image bytes, {} comments, from {source})",
                    product.product_id,
                    product.product_name,
                    product.description,
                    product.image.len(),
                    product.comments.len(),
                );
            }
            Err(FetchError::NotFound) => println!("ProductDetails ID {product_id}: not found"),
            Err(FetchError::Source(err)) => match err {},
        }
    }

    println!("resident: {:?}", cache.keys());
    println!("stats: {:?}", cache.stats());
    println!("database lookups: {}", database.lookup_count());

    Ok(())
}
