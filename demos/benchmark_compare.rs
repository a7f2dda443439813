//! Throughput of membership checks (90%) and inserts (10%) against other
//! concurrent containers. DashSet never evicts and serves as a speed
//! baseline; the others are bounded.
//!
//! ```bash
//! cargo run --release --example benchmark_compare
//! ```

use dashmap::DashSet;
use direct_cache::{CacheConfig, DirectCache};
use lru::LruCache;
use moka::sync::Cache as MokaCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

const CACHE_CAPACITY: usize = 100_000;
const KEY_SPACE: usize = 200_000;
const RUN_FOR: Duration = Duration::from_secs(2);
const THREAD_COUNTS: [usize; 5] = [1, 4, 8, 16, 32];

/// The two operations every contender is measured on.
trait Membership: Sync {
    fn check(&self, key: &str);
    fn insert(&self, key: &str);
}

impl Membership for DirectCache {
    fn check(&self, key: &str) {
        self.contains(key);
    }

    fn insert(&self, key: &str) {
        self.add(key);
    }
}

impl Membership for DashSet<String> {
    fn check(&self, key: &str) {
        self.contains(key);
    }

    fn insert(&self, key: &str) {
        DashSet::insert(self, key.to_owned());
    }
}

impl Membership for MokaCache<String, ()> {
    fn check(&self, key: &str) {
        self.get(key);
    }

    fn insert(&self, key: &str) {
        MokaCache::insert(self, key.to_owned(), ());
    }
}

impl Membership for Mutex<LruCache<String, ()>> {
    fn check(&self, key: &str) {
        self.lock().get(key);
    }

    fn insert(&self, key: &str) {
        self.lock().put(key.to_owned(), ());
    }
}

fn main() {
    let keys: Vec<String> = (1..=KEY_SPACE).map(|i| format!("key-{i}")).collect();
    let capacity = NonZeroUsize::new(CACHE_CAPACITY).expect("capacity is non-zero");

    println!("Implementation,Threads,Throughput (Ops/sec)");
    for threads in THREAD_COUNTS {
        let narrow = DirectCache::new(8, |_| false).expect("valid config");
        run("DirectCache (8 shards)", threads, &narrow, &keys);
        narrow.stop();

        // more shards give each fingerprint more landing slots
        let config = CacheConfig::builder()
            .shard_count(32)
            .sweep_interval(Duration::from_secs(5))
            .build()
            .expect("valid config");
        let wide = DirectCache::with_config(config, |_| false).expect("valid config");
        run("DirectCache (32 shards)", threads, &wide, &keys);
        wide.stop();

        run("DashSet*", threads, &DashSet::<String>::new(), &keys);
        run(
            "Moka",
            threads,
            &MokaCache::<String, ()>::new(CACHE_CAPACITY as u64),
            &keys,
        );
        run(
            "MutexLRU",
            threads,
            &Mutex::new(LruCache::<String, ()>::new(capacity)),
            &keys,
        );
    }
}

/// Runs `threads` workers against `target` for [`RUN_FOR`] and prints one CSV row.
fn run(name: &str, threads: usize, target: &impl Membership, keys: &[String]) {
    let done = AtomicBool::new(false);

    let (ops, elapsed) = thread::scope(|s| {
        let workers: Vec<_> = (0..threads)
            .map(|t| {
                let done = &done;
                s.spawn(move || {
                    // xorshift, seeded per worker so threads walk different keys
                    let mut x = 0x9E37_79B9_7F4A_7C15_u64 ^ (t as u64 + 1);
                    let mut ops = 0usize;
                    while !done.load(Ordering::Relaxed) {
                        x ^= x << 13;
                        x ^= x >> 7;
                        x ^= x << 17;
                        let key = &keys[x as usize % keys.len()];
                        if x % 10 == 0 {
                            target.insert(key);
                        } else {
                            target.check(key);
                        }
                        ops += 1;
                    }
                    ops
                })
            })
            .collect();

        let started = Instant::now();
        thread::sleep(RUN_FOR);
        done.store(true, Ordering::Relaxed);
        let elapsed = started.elapsed();

        let ops: usize = workers
            .into_iter()
            .map(|w| w.join().expect("worker panicked"))
            .sum();
        (ops, elapsed)
    });

    println!("{name},{threads},{:.2}", ops as f64 / elapsed.as_secs_f64());
}
