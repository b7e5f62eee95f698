//! Sequence counters and the allocate-and-format surface.

use async_trait::async_trait;

use crate::error::{AllocationError, CounterStoreError};
use crate::format::IdentifierScheme;

/// Pluggable backend for named sequence counters.
///
/// Implementations must make the increment a single atomic round trip
/// against the backing store: find the counter by name, increment it by
/// one, create it if absent, and return the new value. Uniqueness under
/// concurrent callers rests entirely on this primitive - callers never
/// read a counter value and write it back.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically increment the named counter and return the new value.
    ///
    /// The counter is created implicitly on first use, so the first call
    /// for a given name returns 1. Values are strictly increasing with no
    /// repeats and no gaps.
    ///
    /// # Arguments
    /// * `name` - Counter key, e.g. `"loan-2025"`
    ///
    /// # Errors
    /// Returns an error if the store could not complete the increment.
    /// No value is reserved in that case.
    async fn atomic_increment(&self, name: &str) -> Result<u64, CounterStoreError>;
}

/// An identifier assigned to a new record.
///
/// Once attached to a record the display form is immutable for the life of
/// the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocatedIdentifier {
    /// The sequence value returned by the counter.
    pub sequence: u64,
    /// The canonical display identifier.
    pub display: String,
}

/// Allocates canonical record identifiers from a counter store.
pub struct IdentifierAllocator<S: CounterStore> {
    /// The counter store backend.
    store: S,
}

impl<S: CounterStore> IdentifierAllocator<S> {
    /// Create a new allocator over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Allocate the next sequence for the scheme's counter and render the
    /// canonical identifier.
    ///
    /// # Arguments
    /// * `scheme` - Identifier scheme naming the counter and format
    ///
    /// # Errors
    /// `AllocationError::AllocationFailed` when the increment could not
    /// complete. No identifier was assigned; the caller must not create
    /// the dependent record.
    pub async fn allocate(
        &self,
        scheme: &IdentifierScheme,
    ) -> Result<AllocatedIdentifier, AllocationError> {
        let name: String = scheme.counter_name();
        let sequence: u64 = self
            .store
            .atomic_increment(&name)
            .await
            .map_err(|source| AllocationError::AllocationFailed {
                name: name.clone(),
                source,
            })?;

        Ok(AllocatedIdentifier {
            sequence,
            display: scheme.render(sequence),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    /// In-memory counter store for testing.
    struct InMemoryCounterStore {
        counters: Mutex<HashMap<String, u64>>,
    }

    impl InMemoryCounterStore {
        fn new() -> Self {
            Self {
                counters: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl CounterStore for InMemoryCounterStore {
        async fn atomic_increment(&self, name: &str) -> Result<u64, CounterStoreError> {
            let mut counters = self.counters.lock().unwrap();
            let value: &mut u64 = counters.entry(name.to_string()).or_insert(0);
            *value += 1;
            Ok(*value)
        }
    }

    /// Counter store that always fails.
    struct UnavailableCounterStore;

    #[async_trait]
    impl CounterStore for UnavailableCounterStore {
        async fn atomic_increment(&self, _name: &str) -> Result<u64, CounterStoreError> {
            Err(CounterStoreError::Unavailable {
                message: "connection refused".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_first_allocation_starts_at_one() {
        let allocator = IdentifierAllocator::new(InMemoryCounterStore::new());
        let scheme: IdentifierScheme = IdentifierScheme::loan(2025);

        let allocated: AllocatedIdentifier = allocator.allocate(&scheme).await.unwrap();
        assert_eq!(allocated.sequence, 1);
        assert_eq!(allocated.display, "ZLID202500001");
    }

    #[tokio::test]
    async fn test_sequences_increase_per_counter() {
        let allocator = IdentifierAllocator::new(InMemoryCounterStore::new());
        let scheme: IdentifierScheme = IdentifierScheme::loan(2025);

        let first: AllocatedIdentifier = allocator.allocate(&scheme).await.unwrap();
        let second: AllocatedIdentifier = allocator.allocate(&scheme).await.unwrap();
        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
    }

    #[tokio::test]
    async fn test_counters_are_independent_per_bucket() {
        let allocator = IdentifierAllocator::new(InMemoryCounterStore::new());

        let loan_2025: AllocatedIdentifier = allocator
            .allocate(&IdentifierScheme::loan(2025))
            .await
            .unwrap();
        let loan_2026: AllocatedIdentifier = allocator
            .allocate(&IdentifierScheme::loan(2026))
            .await
            .unwrap();
        let membership: AllocatedIdentifier = allocator
            .allocate(&IdentifierScheme::membership(2025, 1, 15))
            .await
            .unwrap();

        // Each counter name starts from 1 independently.
        assert_eq!(loan_2025.sequence, 1);
        assert_eq!(loan_2026.sequence, 1);
        assert_eq!(membership.sequence, 1);
    }

    #[tokio::test]
    async fn test_concurrent_allocations_are_distinct_and_contiguous() {
        let allocator = Arc::new(IdentifierAllocator::new(InMemoryCounterStore::new()));
        let scheme: IdentifierScheme = IdentifierScheme::loan(2025);

        let mut handles = Vec::new();
        for _ in 0..50 {
            let allocator = Arc::clone(&allocator);
            let scheme = scheme.clone();
            handles.push(tokio::spawn(async move {
                allocator.allocate(&scheme).await.unwrap().sequence
            }));
        }

        let mut seen: HashSet<u64> = HashSet::new();
        for handle in handles {
            let sequence: u64 = handle.await.unwrap();
            assert!(seen.insert(sequence), "duplicate sequence {}", sequence);
        }

        // Order is unspecified, but the set is exactly 1..=50.
        let expected: HashSet<u64> = (1..=50).collect();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn test_allocation_failure_surfaces_counter_name() {
        let allocator = IdentifierAllocator::new(UnavailableCounterStore);
        let scheme: IdentifierScheme = IdentifierScheme::membership(2025, 1, 15);

        let err: AllocationError = allocator.allocate(&scheme).await.unwrap_err();
        assert_eq!(err.counter_name(), "membership-20250115");
    }
}
