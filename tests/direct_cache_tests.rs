use direct_cache::{
    CacheConfig, CacheError, DirectCache, Lifecycle, LifecycleState, Pacer, fingerprint,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Pacer that never sleeps and records every pause it is asked for.
#[derive(Clone, Default)]
struct RecordingPacer {
    pauses: Arc<Mutex<Vec<Duration>>>,
}

impl Pacer for RecordingPacer {
    fn pause(&mut self, duration: Duration, lifecycle: &Lifecycle) -> bool {
        self.pauses.lock().unwrap().push(duration);
        thread::yield_now();
        lifecycle.is_running()
    }
}

fn fast_config(shards: usize) -> CacheConfig {
    CacheConfig::builder()
        .shard_count(shards)
        .sweep_interval(Duration::ZERO)
        .shard_pause(Duration::ZERO)
        .thread_name("direct-cache-test-sweeper")
        .build()
        .unwrap()
}

fn wait_until(mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    done()
}

/// Waits for `n` complete sweep cycles that started after this call.
fn wait_for_cycles(cache: &DirectCache, n: u64) {
    // the cycle in flight may predate the caller's writes
    let target = cache.sweep_stats().cycles + n + 1;
    assert!(
        wait_until(|| cache.sweep_stats().cycles >= target),
        "sweeper did not reach {target} cycles"
    );
}

#[test]
fn end_to_end_scenario() {
    let cache = DirectCache::new(8, |_| false).unwrap();
    cache.add("hello");
    cache.add("x");
    cache.add("y");

    assert!(cache.contains("hello"));
    assert!(!cache.contains("z"));
    assert!(cache.remove("hello"));
    assert!(!cache.contains("hello"));
    assert!(cache.contains("x"));
    assert!(cache.contains("y"));
    cache.stop();
}

#[test]
fn multibyte_sample_strings() {
    let cache = DirectCache::new(8, |_| false).unwrap();
    cache.add("你好");
    cache.add("色情");
    cache.add("色情");
    cache.add("色情");
    cache.add("政治");
    cache.add("政治");

    assert!(!cache.contains("大家好"));
    assert!(cache.contains("色情"));
    assert!(!cache.remove("大家好"));
    assert!(cache.remove("色情"));
    assert!(!cache.contains("色情"));
    assert!(cache.contains("政治"));
    assert!(cache.contains("你好"));
    cache.stop();
}

#[test]
fn distinct_fingerprints_do_not_interfere() {
    let cache = DirectCache::new(1, |_| false).unwrap();
    assert_ne!(fingerprint(b"hello"), fingerprint(b"world"));

    cache.add("hello");
    cache.add("world");
    assert!(cache.remove("world"));
    assert!(cache.contains("hello"));
    cache.add("world");
    assert!(cache.contains("hello"));
    assert!(cache.contains("world"));
}

#[test]
fn same_fingerprint_overwrites_on_single_shard() {
    let cache = DirectCache::new(1, |_| false).unwrap();
    assert_eq!(fingerprint(b"listen"), fingerprint(b"silent"));

    cache.add("listen");
    cache.add("silent");
    assert!(!cache.contains("listen"));
    assert!(cache.contains("silent"));
}

#[test]
fn invalid_shard_counts_rejected() {
    assert!(matches!(
        DirectCache::new(0, |_| false),
        Err(CacheError::InvalidConfig(_))
    ));
    assert!(matches!(
        DirectCache::new(70_000, |_| false),
        Err(CacheError::InvalidConfig(_))
    ));
}

#[test]
fn sweeper_evicts_only_selected_values() {
    let cache =
        DirectCache::with_config(fast_config(16), |v: &[u8]| v.starts_with(b"drop-")).unwrap();

    for i in 0..20 {
        cache.add(format!("drop-{i}"));
        cache.add(format!("keep-{i}"));
    }
    wait_for_cycles(&cache, 2);

    for i in 0..20 {
        assert!(!cache.contains(format!("drop-{i}")), "drop-{i} survived");
        assert!(cache.contains(format!("keep-{i}")), "keep-{i} was evicted");
    }
    assert!(cache.sweep_stats().evicted >= 20);
    cache.stop();
}

#[test]
fn sweeper_follows_configured_cadence() {
    let pacer = RecordingPacer::default();
    let pauses = Arc::clone(&pacer.pauses);
    let config = CacheConfig::builder()
        .shard_count(2)
        .sweep_interval(Duration::from_millis(7))
        .shard_pause(Duration::from_millis(3))
        .build()
        .unwrap();

    let cache = DirectCache::with_pacer(config, pacer, |_| false).unwrap();
    assert!(wait_until(|| cache.sweep_stats().cycles >= 2));
    cache.stop();

    let recorded = pauses.lock().unwrap().clone();
    let cycle = [
        Duration::from_millis(7),
        Duration::from_millis(3),
        Duration::from_millis(3),
    ];
    assert!(recorded.len() >= 6);
    assert_eq!(&recorded[..3], &cycle);
    assert_eq!(&recorded[3..6], &cycle);
}

#[test]
fn no_sweeper_evictions_after_stop() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let cache = DirectCache::with_config(fast_config(4), move |_: &[u8]| {
        counter.fetch_add(1, Ordering::SeqCst);
        true
    })
    .unwrap();

    cache.stop();
    assert_eq!(cache.state(), LifecycleState::Stopped);
    let calls_at_stop = calls.load(Ordering::SeqCst);

    cache.add("survivor");
    thread::sleep(Duration::from_millis(50));

    assert!(cache.contains("survivor"));
    assert_eq!(calls.load(Ordering::SeqCst), calls_at_stop);
    assert!(cache.remove("survivor"));
}

#[test]
fn concurrent_stops_wait_for_scan_in_flight() {
    let entered = Arc::new(AtomicUsize::new(0));
    let finished = Arc::new(AtomicUsize::new(0));
    let (e, f) = (Arc::clone(&entered), Arc::clone(&finished));
    let cache = Arc::new(
        DirectCache::with_config(fast_config(1), move |_: &[u8]| {
            e.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(200));
            f.fetch_add(1, Ordering::SeqCst);
            false
        })
        .unwrap(),
    );

    cache.add("slow");
    assert!(wait_until(|| entered.load(Ordering::SeqCst) > 0));

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let c = Arc::clone(&cache);
            let b = Arc::clone(&barrier);
            let entered = Arc::clone(&entered);
            let finished = Arc::clone(&finished);
            thread::spawn(move || {
                b.wait();
                c.stop();
                (
                    entered.load(Ordering::SeqCst),
                    finished.load(Ordering::SeqCst),
                )
            })
        })
        .collect();

    for h in handles {
        let (entered, finished) = h.join().unwrap();
        assert_eq!(
            entered, finished,
            "stop() returned while the predicate was still running"
        );
    }
    assert_eq!(cache.state(), LifecycleState::Stopped);
}

#[test]
fn panicking_predicate_only_stops_the_sweeper() {
    let cache = DirectCache::with_config(fast_config(2), |v: &[u8]| {
        if v == b"poison" {
            panic!("predicate cannot handle poison");
        }
        false
    })
    .unwrap();

    cache.add("poison");
    cache.add("other");
    assert!(wait_until(|| cache.sweep_stats().faulted));

    // the failing slot was never cleared and the cache still serves callers
    assert!(cache.contains("poison"));
    assert!(cache.contains("other"));
    cache.add("late");
    assert!(cache.contains("late"));
    assert!(cache.remove("other"));
    assert!(!cache.contains("other"));

    // lifecycle is untouched by the fault; stop still works
    assert!(cache.is_running());
    cache.stop();
    assert!(!cache.is_running());
}

#[test]
fn manual_sweep_after_stop() {
    let cache = DirectCache::new(4, |_| false).unwrap();
    cache.stop();

    cache.add("a1");
    cache.add("b1");
    assert_eq!(cache.sweep_with(|v| v[0] == b'a'), 1);
    assert!(!cache.contains("a1"));
    assert!(cache.contains("b1"));
}

#[test]
fn drop_stops_the_sweeper() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    {
        let cache = DirectCache::with_config(fast_config(1), move |_: &[u8]| {
            counter.fetch_add(1, Ordering::SeqCst);
            false
        })
        .unwrap();
        cache.add("x");
        assert!(wait_until(|| calls.load(Ordering::SeqCst) > 0));
    }

    // drop joined the sweeper, so the predicate's captured Arc is gone
    assert_eq!(Arc::strong_count(&calls), 1);
}

#[test]
fn concurrent_callers_with_running_sweeper() {
    let cache = Arc::new(
        DirectCache::with_config(fast_config(8), |v: &[u8]| v.starts_with(b"tmp-")).unwrap(),
    );
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let mut handles = Vec::new();

    // keep values byte-sum far above any tmp value, so no collision overwrite
    for t in 0..threads {
        let c = Arc::clone(&cache);
        let b = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            b.wait();
            for i in 0..500 {
                c.add(format!("tmp-{t}-{i}"));
                let _ = c.contains(format!("tmp-{t}-{i}"));
                if i % 50 == 0 {
                    c.add(format!("keep-forever-{t}-{i}"));
                }
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    wait_for_cycles(&cache, 2);
    for t in 0..threads {
        for i in (0..500).step_by(50) {
            assert!(cache.contains(format!("keep-forever-{t}-{i}")));
        }
    }
    assert!(!cache.contains("tmp-0-0"));
    assert!(!cache.sweep_stats().faulted);
    cache.stop();
}
