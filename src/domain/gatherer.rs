//! Generic fan-out/fan-in aggregation.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use parking_lot::Mutex;

/// Thread-safe collector for fan-out operations where N independent
/// asynchronous sub-operations must all complete before a single aggregate
/// handler fires.
///
/// Constructed with the exact set of expected keys and a completion
/// handler. Each sub-operation reports through [`gather`](Self::gather)
/// exactly once; when the last expected key reports, the handler is
/// invoked with the accumulated results, exactly once.
///
/// Reporting a key that is not pending (never expected, or already
/// reported) is a programming-contract violation and panics rather than
/// silently corrupting state.
pub struct ResultsGatherer<K, V, H>
where
    K: Eq + Hash,
    H: FnOnce(HashMap<K, V>),
{
    inner: Mutex<Inner<K, V, H>>,
}

struct Inner<K, V, H> {
    pending: HashSet<K>,
    results: HashMap<K, V>,
    handler: Option<H>,
}

impl<K, V, H> ResultsGatherer<K, V, H>
where
    K: Eq + Hash,
    H: FnOnce(HashMap<K, V>),
{
    /// Create a gatherer expecting exactly `keys`.
    ///
    /// An empty key set completes immediately: the handler fires with an
    /// empty result map before `new` returns.
    pub fn new(keys: HashSet<K>, handler: H) -> Self {
        if keys.is_empty() {
            handler(HashMap::new());
            return Self {
                inner: Mutex::new(Inner {
                    pending: HashSet::new(),
                    results: HashMap::new(),
                    handler: None,
                }),
            };
        }

        Self {
            inner: Mutex::new(Inner {
                results: HashMap::with_capacity(keys.len()),
                pending: keys,
                handler: Some(handler),
            }),
        }
    }

    /// Record the result for `key`.
    ///
    /// May be called concurrently from multiple execution contexts. When
    /// the pending set empties, invokes the completion handler (outside
    /// the internal lock) with the accumulated key→value map.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not pending: callers must guarantee each
    /// expected key reports exactly once, and nothing reports after
    /// completion.
    pub fn gather(&self, key: K, value: V) {
        let fire = {
            let mut inner = self.inner.lock();

            assert!(
                inner.pending.remove(&key),
                "gather called with a key that is not pending"
            );

            inner.results.insert(key, value);

            if inner.pending.is_empty() {
                let handler = inner
                    .handler
                    .take()
                    .expect("completion handler already invoked");
                let results = std::mem::take(&mut inner.results);
                Some((handler, results))
            } else {
                None
            }
        };

        if let Some((handler, results)) = fire {
            handler(results);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn keys(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn handler_fires_exactly_once_after_all_keys_report() {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_in_handler = Arc::clone(&fired);

        let gatherer = ResultsGatherer::new(keys(&["a", "b", "c"]), move |results| {
            assert_eq!(results.len(), 3);
            assert_eq!(results["b"], 2);
            fired_in_handler.fetch_add(1, Ordering::SeqCst);
        });

        gatherer.gather("a".to_string(), 1);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        gatherer.gather("b".to_string(), 2);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        gatherer.gather("c".to_string(), 3);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn mixed_success_and_failure_values_are_all_collected() {
        let gatherer = ResultsGatherer::new(
            keys(&["p1", "p2", "p3"]),
            |results: HashMap<String, Result<(), &str>>| {
                let failures: Vec<_> = results.iter().filter(|(_, v)| v.is_err()).collect();
                assert_eq!(results.len(), 3);
                assert_eq!(failures.len(), 1);
            },
        );

        gatherer.gather("p1".to_string(), Ok(()));
        gatherer.gather("p2".to_string(), Err("unreachable"));
        gatherer.gather("p3".to_string(), Ok(()));
    }

    #[test]
    #[should_panic(expected = "not pending")]
    fn reporting_the_same_key_twice_panics() {
        let gatherer = ResultsGatherer::new(keys(&["a", "b"]), |_| {});
        gatherer.gather("a".to_string(), 1);
        gatherer.gather("a".to_string(), 1);
    }

    #[test]
    #[should_panic(expected = "not pending")]
    fn reporting_an_unexpected_key_panics() {
        let gatherer = ResultsGatherer::new(keys(&["a"]), |_| {});
        gatherer.gather("z".to_string(), 1);
    }

    #[test]
    #[should_panic(expected = "not pending")]
    fn reporting_after_completion_panics() {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_in_handler = Arc::clone(&fired);
        let gatherer = ResultsGatherer::new(keys(&["a"]), move |_| {
            fired_in_handler.fetch_add(1, Ordering::SeqCst);
        });

        gatherer.gather("a".to_string(), 1);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        gatherer.gather("a".to_string(), 1);
    }

    #[test]
    fn empty_key_set_completes_immediately() {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_in_handler = Arc::clone(&fired);
        let _gatherer: ResultsGatherer<String, u32, _> =
            ResultsGatherer::new(HashSet::new(), move |results| {
                assert!(results.is_empty());
                fired_in_handler.fetch_add(1, Ordering::SeqCst);
            });

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_gathers_fire_once() {
        let fired = Arc::new(AtomicUsize::new(0));
        let expected: HashSet<u32> = (0..64).collect();
        let fired_in_handler = Arc::clone(&fired);

        let gatherer = Arc::new(ResultsGatherer::new(expected, move |results| {
            assert_eq!(results.len(), 64);
            fired_in_handler.fetch_add(1, Ordering::SeqCst);
        }));

        let handles: Vec<_> = (0..64u32)
            .map(|key| {
                let gatherer = Arc::clone(&gatherer);
                std::thread::spawn(move || gatherer.gather(key, key * 2))
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
