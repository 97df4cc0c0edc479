// 🗄️ Receipt Store
// Append-only, process-lifetime collection of receipts keyed by id

use crate::error::StoreError;
use crate::receipt::{NewReceipt, Receipt};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

pub trait ReceiptStore: Send + Sync {
    /// Store a receipt under a fresh id and return that id.
    fn submit(&self, receipt: NewReceipt) -> Result<Uuid, StoreError>;

    /// Stored receipt with the given id, if any.
    fn lookup(&self, id: &Uuid) -> Result<Option<Receipt>, StoreError>;

    fn len(&self) -> Result<usize, StoreError>;

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

/// In-memory store shared across request handlers.
///
/// Writers take the lock exclusively, so an id check and its insert happen
/// atomically and no id is ever handed out twice.
#[derive(Default)]
pub struct InMemoryReceiptStore {
    receipts: RwLock<HashMap<Uuid, Receipt>>,
}

impl InMemoryReceiptStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReceiptStore for InMemoryReceiptStore {
    fn submit(&self, receipt: NewReceipt) -> Result<Uuid, StoreError> {
        let mut receipts = self.receipts.write().map_err(|_| StoreError::Poisoned)?;

        let mut id = Uuid::new_v4();
        while receipts.contains_key(&id) {
            id = Uuid::new_v4();
        }

        receipts.insert(id, Receipt::new(id, receipt));
        Ok(id)
    }

    fn lookup(&self, id: &Uuid) -> Result<Option<Receipt>, StoreError> {
        let receipts = self.receipts.read().map_err(|_| StoreError::Poisoned)?;
        Ok(receipts.get(id).cloned())
    }

    fn len(&self) -> Result<usize, StoreError> {
        let receipts = self.receipts.read().map_err(|_| StoreError::Poisoned)?;
        Ok(receipts.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::{Amount, Item};
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    fn sample() -> NewReceipt {
        NewReceipt {
            retailer: "Walgreens".to_string(),
            purchase_date: "2022-01-02".to_string(),
            purchase_time: "08:13".to_string(),
            total: Amount::new("2.65"),
            items: vec![
                Item::new("Pepsi - 12-oz", "1.25"),
                Item::new("Dasani", "1.40"),
            ],
        }
    }

    #[test]
    fn test_submit_then_lookup() {
        let store = InMemoryReceiptStore::new();
        assert!(store.is_empty().unwrap());

        let id = store.submit(sample()).unwrap();
        let stored = store.lookup(&id).unwrap().unwrap();

        assert_eq!(stored.id(), id);
        assert_eq!(stored.data(), &sample());
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_lookup_unknown_id() {
        let store = InMemoryReceiptStore::new();
        store.submit(sample()).unwrap();
        assert!(store.lookup(&Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_identical_receipts_get_distinct_ids() {
        let store = InMemoryReceiptStore::new();
        let a = store.submit(sample()).unwrap();
        let b = store.submit(sample()).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len().unwrap(), 2);
    }

    #[test]
    fn test_concurrent_submits() {
        let store = Arc::new(InMemoryReceiptStore::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    (0..50)
                        .map(|_| store.submit(sample()).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(ids.insert(id));
            }
        }

        assert_eq!(store.len().unwrap(), 400);
        for id in &ids {
            assert!(store.lookup(id).unwrap().is_some());
        }
    }
}
