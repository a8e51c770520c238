//! Single-slot memoizer.
//!
//! Holds at most one (key, value) pair. A lookup with the stored key returns the
//! stored value; any other key runs the computation and, only on success,
//! replaces the pair. A failed computation leaves the previous pair in place.

use std::future::Future;

#[derive(Debug, Clone)]
enum Slot<K, V> {
    Empty,
    Populated { key: K, value: V },
}

/// Result of `ResultMemo::get_or_compute`.
#[derive(Debug, Clone, PartialEq)]
pub struct Memoized<V> {
    pub value: V,
    /// `true` when the value came from the slot without running the computation.
    pub cached: bool,
}

#[derive(Debug, Clone)]
pub struct ResultMemo<K, V> {
    slot: Slot<K, V>,
}

impl<K, V> Default for ResultMemo<K, V> {
    fn default() -> Self {
        Self { slot: Slot::Empty }
    }
}

impl<K: PartialEq, V: Clone> ResultMemo<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last successfully computed value.
    pub fn current(&self) -> Option<&V> {
        match &self.slot {
            Slot::Populated { value, .. } => Some(value),
            Slot::Empty => None,
        }
    }

    pub fn is_populated(&self) -> bool {
        matches!(self.slot, Slot::Populated { .. })
    }

    pub async fn get_or_compute<F, Fut, E>(&mut self, key: K, compute: F) -> Result<Memoized<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Slot::Populated {
            key: last_key,
            value,
        } = &self.slot
        {
            if *last_key == key {
                return Ok(Memoized {
                    value: value.clone(),
                    cached: true,
                });
            }
        }

        let value = compute().await?;
        self.slot = Slot::Populated {
            key,
            value: value.clone(),
        };

        Ok(Memoized {
            value,
            cached: false,
        })
    }
}
