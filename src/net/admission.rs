//! Admission control for concurrently handled connections.
//!
//! A fixed pool of slots backed by a semaphore. The accept loop takes a
//! slot before spawning a connection task; the task holds it until the
//! connection is closed. Dropping the slot (including during unwinding)
//! returns it to the pool.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Bounds how many connections may be in the handling state at once.
#[derive(Debug, Clone)]
pub struct AdmissionController {
    slots: Arc<Semaphore>,
    capacity: usize,
}

impl AdmissionController {
    /// Create a pool with `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Wait until a slot is free, then take it.
    pub async fn acquire(&self) -> AdmissionSlot {
        let permit = Arc::clone(&self.slots)
            .acquire_owned()
            .await
            .expect("admission semaphore is never closed");
        AdmissionSlot { _permit: permit }
    }

    /// Take a slot only if one is free right now.
    pub fn try_acquire(&self) -> Option<AdmissionSlot> {
        Arc::clone(&self.slots)
            .try_acquire_owned()
            .ok()
            .map(|permit| AdmissionSlot { _permit: permit })
    }

    /// Slots currently free.
    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }

    /// Slots currently held.
    pub fn held(&self) -> usize {
        self.capacity - self.available()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// A held admission slot. Released on drop.
#[derive(Debug)]
pub struct AdmissionSlot {
    _permit: OwnedSemaphorePermit,
}

impl AdmissionSlot {
    /// Return the slot to the pool.
    pub fn release(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn admits_up_to_capacity() {
        let admission = AdmissionController::new(3);
        let slots = vec![
            admission.acquire().await,
            admission.acquire().await,
            admission.acquire().await,
        ];
        assert_eq!(admission.held(), 3);
        assert!(admission.try_acquire().is_none());

        drop(slots);
        assert_eq!(admission.available(), 3);
    }

    #[tokio::test]
    async fn blocks_beyond_capacity_until_release() {
        let admission = AdmissionController::new(2);
        let first = admission.acquire().await;
        let _second = admission.acquire().await;

        let waiter = admission.clone();
        let blocked = tokio::spawn(async move { waiter.acquire().await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!blocked.is_finished(), "third acquire must wait");

        first.release();
        let third = tokio::time::timeout(Duration::from_secs(1), blocked)
            .await
            .expect("released slot should admit the waiter")
            .unwrap();
        assert_eq!(admission.held(), 2);
        drop(third);
        assert_eq!(admission.held(), 1);
    }

    #[tokio::test]
    async fn slot_released_when_task_panics() {
        let admission = AdmissionController::new(1);
        let slot = admission.acquire().await;

        let task = tokio::spawn(async move {
            let _slot = slot;
            panic!("handler failure");
        });
        assert!(task.await.is_err());
        assert_eq!(admission.available(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn steady_load_never_exceeds_capacity_or_deadlocks() {
        const CAPACITY: usize = 4;
        let admission = AdmissionController::new(CAPACITY);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for _ in 0..200 {
            let slot = admission.acquire().await;
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            tasks.push(tokio::spawn(async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(1)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                drop(slot);
            }));
        }

        tokio::time::timeout(Duration::from_secs(10), async {
            for task in tasks {
                task.await.unwrap();
            }
        })
        .await
        .expect("all tasks complete");

        assert!(peak.load(Ordering::SeqCst) <= CAPACITY);
        assert_eq!(admission.available(), CAPACITY);
    }
}
