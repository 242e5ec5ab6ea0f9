use std::collections::BTreeMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// A timer event as delivered to the owner of the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<K, T> {
    pub key: K,
    pub seq: u64,
    pub payload: T,
}

struct TimerEntry {
    seq: u64,
    token: CancellationToken,
    repeating: bool,
}

/// Keyed one-shot and repeating timers; at most one live timer per key.
///
/// Arming a key cancels its predecessor before the new timer is spawned. A
/// cancelled timer may already have queued an event, so every delivered
/// [`Fired`] must pass [`Scheduler::accept`] before it is acted on.
pub struct Scheduler<K, T> {
    timers: BTreeMap<K, TimerEntry>,
    last_seq: u64,
    fired_tx: mpsc::UnboundedSender<Fired<K, T>>,
}

impl<K, T> Scheduler<K, T>
where
    K: Ord + Clone + Send + 'static,
    T: Clone + Send + 'static,
{
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Fired<K, T>>) {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        (
            Self {
                timers: BTreeMap::new(),
                last_seq: 0,
                fired_tx,
            },
            fired_rx,
        )
    }

    /// Fires `payload` once after `after`. Must be called within a tokio runtime.
    pub fn once(&mut self, key: K, after: Duration, payload: T) -> u64 {
        let (seq, token) = self.arm(key.clone(), false);
        let tx = self.fired_tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = time::sleep(after) => {
                    let _ = tx.send(Fired { key, seq, payload });
                }
            }
        });
        seq
    }

    /// Fires `payload` every `period`, first after one full period.
    pub fn every(&mut self, key: K, period: Duration, payload: T) -> u64 {
        let (seq, token) = self.arm(key.clone(), true);
        let tx = self.fired_tx.clone();
        tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let fired = Fired { key: key.clone(), seq, payload: payload.clone() };
                        if tx.send(fired).is_err() {
                            break;
                        }
                    }
                }
            }
        });
        seq
    }

    /// Cancels the timer under `key`; returns false if none was live.
    pub fn cancel(&mut self, key: &K) -> bool {
        match self.timers.remove(key) {
            Some(entry) => {
                entry.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancels every timer whose key matches `predicate`.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&K) -> bool) {
        let keys: Vec<K> = self
            .timers
            .keys()
            .filter(|key| predicate(key))
            .cloned()
            .collect();
        for key in keys {
            self.cancel(&key);
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, entry) in std::mem::take(&mut self.timers) {
            entry.token.cancel();
        }
    }

    /// Returns true if `fired` belongs to the live timer of its key.
    ///
    /// Accepting a one-shot event retires its timer.
    pub fn accept(&mut self, fired: &Fired<K, T>) -> bool {
        let Some(entry) = self.timers.get(&fired.key) else {
            return false;
        };
        if entry.seq != fired.seq {
            return false;
        }
        if !entry.repeating {
            self.timers.remove(&fired.key);
        }
        true
    }

    pub fn is_active(&self, key: &K) -> bool {
        self.timers.contains_key(key)
    }

    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    pub fn is_idle(&self) -> bool {
        self.timers.is_empty()
    }

    fn arm(&mut self, key: K, repeating: bool) -> (u64, CancellationToken) {
        self.cancel(&key);
        self.last_seq += 1;
        let token = CancellationToken::new();
        self.timers.insert(
            key,
            TimerEntry {
                seq: self.last_seq,
                token: token.clone(),
                repeating,
            },
        );
        (self.last_seq, token)
    }
}

impl<K, T> Drop for Scheduler<K, T> {
    fn drop(&mut self) {
        for entry in self.timers.values() {
            entry.token.cancel();
        }
    }
}
