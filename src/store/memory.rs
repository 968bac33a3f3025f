use std::{cell::RefCell, collections::HashMap, rc::Rc};

use super::{FlagStore, StoreError};

/// In-process store. Clones share the same map, so a test (or another part
/// of the host) can observe what the overlay wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryFlagStore {
    flags: Rc<RefCell<HashMap<String, bool>>>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flag(key: &str, value: bool) -> Self {
        let store = Self::new();
        store.flags.borrow_mut().insert(key.to_string(), value);
        store
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.flags.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FlagStore for MemoryFlagStore {
    fn get(&self, key: &str) -> Result<Option<bool>, StoreError> {
        Ok(self.flags.borrow().get(key).copied())
    }

    fn set(&mut self, key: &str, value: bool) -> Result<(), StoreError> {
        self.flags.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }

    fn clear(&mut self, key: &str) -> Result<(), StoreError> {
        self.flags.borrow_mut().remove(key);
        Ok(())
    }
}
