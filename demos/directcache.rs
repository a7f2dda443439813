//! # directcache – Membership Cache Demo
//!
//! Builds an 8-shard [`DirectCache`], adds a handful of sample words and
//! prints the outcome of a few membership checks. Every line should print
//! `true`.
//!
//! # Running
//!
//! ```bash
//! RUST_LOG=direct_cache=debug cargo run --example directcache
//! ```

use std::thread;

use direct_cache::DirectCache;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let dc = DirectCache::new(8, |_| {
        thread::yield_now();
        false
    })?;

    dc.add("你好");
    dc.add("色情");
    dc.add("色情");
    dc.add("色情");
    dc.add("政治");
    dc.add("政治");

    println!("{}", !dc.contains("大家好"));
    println!("{}", dc.contains("色情"));

    println!("{}", !dc.remove("大家好"));
    println!("{}", dc.remove("色情"));

    println!("{}", !dc.contains("色情"));
    println!("{}", dc.contains("政治"));
    println!("{}", dc.contains("你好"));

    dc.stop();
    Ok(())
}
