use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;

use super::error::{CarpError, CarpResult};

/// Byte budget shared by the working arrays of a search and the nodes of
/// the item set repository.
#[derive(Debug)]
pub struct MemoryBudget {
    max_bytes: usize,
    current_bytes: AtomicUsize,
    peak_bytes: AtomicUsize,
}

impl MemoryBudget {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            current_bytes: AtomicUsize::new(0),
            peak_bytes: AtomicUsize::new(0),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(usize::MAX)
    }

    pub fn allocate(&self, bytes: usize) -> Result<(), MemoryError> {
        let current = self.current_bytes.fetch_add(bytes, Ordering::SeqCst);
        match current.checked_add(bytes) {
            Some(total) if total <= self.max_bytes => {
                self.peak_bytes.fetch_max(total, Ordering::SeqCst);
                Ok(())
            }
            _ => {
                self.current_bytes.fetch_sub(bytes, Ordering::SeqCst);
                Err(MemoryError::BudgetExceeded {
                    requested: bytes,
                    available: self.max_bytes.saturating_sub(current),
                })
            }
        }
    }

    pub fn deallocate(&self, bytes: usize) {
        self.current_bytes.fetch_sub(bytes, Ordering::SeqCst);
    }

    pub fn current_usage(&self) -> usize {
        self.current_bytes.load(Ordering::SeqCst)
    }

    pub fn peak_usage(&self) -> usize {
        self.peak_bytes.load(Ordering::SeqCst)
    }
}

impl Default for MemoryBudget {
    fn default() -> Self {
        Self::unlimited()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("Memory budget exceeded: requested {requested} bytes, {available} available")]
    BudgetExceeded { requested: usize, available: usize },
}

/// Holds `bytes` of a budget until dropped.
pub struct MemoryGuard<'a> {
    budget: &'a MemoryBudget,
    bytes: usize,
}

impl<'a> MemoryGuard<'a> {
    pub fn new(budget: &'a MemoryBudget, bytes: usize) -> Result<Self, MemoryError> {
        budget.allocate(bytes)?;
        Ok(Self { budget, bytes })
    }

    pub fn bytes(&self) -> usize {
        self.bytes
    }
}

impl<'a> Drop for MemoryGuard<'a> {
    fn drop(&mut self) {
        self.budget.deallocate(self.bytes);
    }
}

/// Size of the single block the occurrence-table engine works in:
/// row table, multiplicities, item counters, the table itself and the
/// item set buffer.
pub fn estimate_table_size(
    items: usize,
    transactions: usize,
    extent: usize,
    weighted: bool,
) -> usize {
    let supp = std::mem::size_of::<usize>();
    let muls = if weighted { transactions } else { 0 };
    (muls + items + items.saturating_mul(transactions)) * supp + (items + extent) * supp
}

/// Size of the single block the tid-list engine works in.
pub fn estimate_tidlist_size(
    items: usize,
    transactions: usize,
    extent: usize,
    weighted: bool,
    list_size: usize,
) -> usize {
    let word = std::mem::size_of::<usize>();
    let muls = if weighted { transactions } else { 0 };
    (items + extent) * list_size + muls * word + 2 * items * word + (items + extent) * word
}

/// Vector of `len` copies of `value`, reporting allocation failure as an
/// error instead of aborting.
pub(crate) fn try_filled<T: Clone>(len: usize, value: T) -> CarpResult<Vec<T>> {
    let mut vec = Vec::new();
    vec.try_reserve_exact(len)
        .map_err(|_| CarpError::alloc_failed::<T>(len))?;
    vec.resize(len, value);
    Ok(vec)
}
