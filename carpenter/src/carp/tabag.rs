//! Transaction bag: the (recoded) transaction database the engines read.

use std::cmp::Ordering;
use std::collections::HashMap;

use ndarray::ArrayView2;

use super::config::ItemOrder;
use super::{Item, Supp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    items: Vec<Item>,
    weight: Supp,
}

impl Transaction {
    pub fn new(items: Vec<Item>, weight: Supp) -> Self {
        Self { items, weight }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn weight(&self) -> Supp {
        self.weight
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A multiset of transactions over item codes `0..item_count()`.
///
/// Items are coded in order of first appearance until `recode` renumbers
/// them; `item_name` maps a code back to the identifier it was built from.
#[derive(Debug, Clone, Default)]
pub struct TransactionBag {
    names: Vec<usize>,
    codes: HashMap<usize, Item>,
    transactions: Vec<Transaction>,
}

impl TransactionBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bag of unit-weight transactions.
    pub fn from_transactions<T, I>(transactions: T) -> Self
    where
        T: IntoIterator<Item = I>,
        I: IntoIterator<Item = usize>,
    {
        let mut bag = Self::new();
        for transaction in transactions {
            bag.add(transaction, 1);
        }
        bag
    }

    /// Bag of transactions with explicit multiplicities.
    pub fn from_weighted<T, I>(transactions: T) -> Self
    where
        T: IntoIterator<Item = (I, Supp)>,
        I: IntoIterator<Item = usize>,
    {
        let mut bag = Self::new();
        for (transaction, weight) in transactions {
            bag.add(transaction, weight);
        }
        bag
    }

    /// Bag from a dense 0/1 matrix: row `r` contains item `c` iff the
    /// entry is non-zero.
    pub fn from_dense(matrix: ArrayView2<i32>) -> Self {
        let mut bag = Self::new();
        for row in matrix.rows() {
            bag.add(
                row.iter()
                    .enumerate()
                    .filter(|&(_, &v)| v != 0)
                    .map(|(item, _)| item),
                1,
            );
        }
        bag
    }

    /// Append a transaction; repeated items are ignored.
    pub fn add<I>(&mut self, items: I, weight: Supp)
    where
        I: IntoIterator<Item = usize>,
    {
        let mut coded: Vec<Item> = Vec::new();
        for name in items {
            let next = self.names.len();
            let code = *self.codes.entry(name).or_insert(next);
            if code == next {
                self.names.push(name);
            }
            if !coded.contains(&code) {
                coded.push(code);
            }
        }
        self.transactions.push(Transaction::new(coded, weight));
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Total transaction weight.
    pub fn weight(&self) -> Supp {
        self.transactions.iter().map(|t| t.weight).sum()
    }

    pub fn item_count(&self) -> usize {
        self.names.len()
    }

    /// Size of the longest transaction.
    pub fn max_len(&self) -> usize {
        self.transactions.iter().map(Transaction::len).max().unwrap_or(0)
    }

    /// Total number of item occurrences.
    pub fn extent(&self) -> usize {
        self.transactions.iter().map(Transaction::len).sum()
    }

    pub fn has_unit_weights(&self) -> bool {
        self.transactions.iter().all(|t| t.weight == 1)
    }

    pub fn transaction(&self, index: usize) -> &Transaction {
        &self.transactions[index]
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn item_name(&self, code: Item) -> usize {
        self.names[code]
    }

    pub fn item_names(&self) -> &[usize] {
        &self.names
    }

    /// Weighted number of transactions containing each item.
    pub fn item_frequencies(&self) -> Vec<Supp> {
        let mut freqs = vec![0; self.names.len()];
        for t in &self.transactions {
            for &item in &t.items {
                freqs[item] += t.weight;
            }
        }
        freqs
    }

    /// Number of transactions containing each item, ignoring weights.
    pub fn item_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.names.len()];
        for t in &self.transactions {
            for &item in &t.items {
                counts[item] += 1;
            }
        }
        counts
    }

    /// Remove items with a weighted frequency below `smin` and renumber the
    /// rest in the given order. Returns the number of remaining items.
    pub fn recode(&mut self, smin: Supp, order: ItemOrder) -> usize {
        let freqs = self.item_frequencies();
        let mut keys = vec![0; self.names.len()];
        if matches!(order, ItemOrder::AscSizeSum | ItemOrder::DescSizeSum) {
            for t in &self.transactions {
                let size = t.weight * t.items.len();
                for &item in &t.items {
                    keys[item] += size;
                }
            }
        } else {
            keys.clone_from(&freqs);
        }

        let mut kept: Vec<Item> = (0..self.names.len()).filter(|&i| freqs[i] >= smin).collect();
        match order {
            ItemOrder::None => {}
            ItemOrder::AscFreq | ItemOrder::AscSizeSum => kept.sort_by_key(|&i| keys[i]),
            ItemOrder::DescFreq | ItemOrder::DescSizeSum => {
                kept.sort_by(|&a, &b| keys[b].cmp(&keys[a]))
            }
        }

        let mut map: Vec<Option<Item>> = vec![None; self.names.len()];
        for (code, &old) in kept.iter().enumerate() {
            map[old] = Some(code);
        }
        self.names = kept.iter().map(|&old| self.names[old]).collect();
        self.codes = self
            .names
            .iter()
            .enumerate()
            .map(|(code, &name)| (name, code))
            .collect();
        for t in &mut self.transactions {
            t.items = t.items.iter().filter_map(|&item| map[item]).collect();
        }
        self.names.len()
    }

    /// Clear the items of every transaction with fewer than `zmin` items.
    /// The transaction and its weight are kept.
    pub fn filter(&mut self, zmin: usize) {
        for t in &mut self.transactions {
            if t.items.len() < zmin {
                t.items.clear();
            }
        }
    }

    /// Sort the items inside each transaction (`dir < 0`: descending).
    pub fn sort_items(&mut self, dir: i32) {
        for t in &mut self.transactions {
            if dir < 0 {
                t.items.sort_unstable_by(|a, b| b.cmp(a));
            } else {
                t.items.sort_unstable();
            }
        }
    }

    /// Sort transactions by size, then lexicographically (`dir < 0`:
    /// descending).
    pub fn sort_transactions(&mut self, dir: i32) {
        self.transactions.sort_by(|a, b| {
            let ord = compare_by_size(&a.items, &b.items);
            if dir < 0 {
                ord.reverse()
            } else {
                ord
            }
        });
    }

    /// Merge runs of equal transactions into one, summing their weights.
    /// Expects the transactions to be sorted.
    pub fn reduce(&mut self) {
        let mut reduced: Vec<Transaction> = Vec::with_capacity(self.transactions.len());
        for t in self.transactions.drain(..) {
            match reduced.last_mut() {
                Some(last) if last.items == t.items => last.weight += t.weight,
                _ => reduced.push(t),
            }
        }
        self.transactions = reduced;
    }
}

fn compare_by_size(a: &[Item], b: &[Item]) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
