use super::Supp;

/// Flat storage of found item sets with their supports and evaluations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemsetStorage {
    items: Vec<usize>,
    offsets: Vec<(usize, usize)>,
    supports: Vec<Supp>,
    evals: Vec<f64>,
}

/// Item sets of one size.
#[derive(Debug, Clone)]
pub struct FrequentLevel {
    pub(crate) storage: ItemsetStorage,
    pub itemset_size: usize,
}

impl ItemsetStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(estimated_items: usize, estimated_itemsets: usize) -> Self {
        Self {
            items: Vec::with_capacity(estimated_items),
            offsets: Vec::with_capacity(estimated_itemsets),
            supports: Vec::with_capacity(estimated_itemsets),
            evals: Vec::with_capacity(estimated_itemsets),
        }
    }

    /// Store an item set (sorted ascending) and return its index.
    pub fn add_itemset(&mut self, mut items: Vec<usize>, supp: Supp, eval: f64) -> usize {
        items.sort_unstable();
        items.dedup();

        let start = self.items.len();
        self.items.extend_from_slice(&items);
        self.offsets.push((start, items.len()));
        self.supports.push(supp);
        self.evals.push(eval);

        self.offsets.len() - 1
    }

    pub fn get_itemset(&self, idx: usize) -> &[usize] {
        let (start, length) = self.offsets[idx];
        &self.items[start..start + length]
    }

    pub fn support(&self, idx: usize) -> Supp {
        self.supports[idx]
    }

    pub fn eval(&self, idx: usize) -> f64 {
        self.evals[idx]
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn itemset_len(&self, idx: usize) -> usize {
        self.offsets[idx].1
    }

    /// Item sets with their supports, in the order they were found.
    pub fn iter(&self) -> impl Iterator<Item = (&[usize], Supp)> + '_ {
        (0..self.len()).map(move |idx| (self.get_itemset(idx), self.supports[idx]))
    }

    /// Owned `(items, support)` pairs sorted by items.
    pub fn to_sorted_vec(&self) -> Vec<(Vec<usize>, Supp)> {
        let mut sets: Vec<_> = self.iter().map(|(items, supp)| (items.to_vec(), supp)).collect();
        sets.sort();
        sets
    }

    /// Split into levels by item set size, smallest first. Empty levels
    /// are skipped.
    pub fn levels(&self) -> Vec<FrequentLevel> {
        let max = (0..self.len()).map(|idx| self.itemset_len(idx)).max().unwrap_or(0);
        let mut levels: Vec<FrequentLevel> = (0..=max).map(FrequentLevel::new).collect();
        for idx in 0..self.len() {
            levels[self.itemset_len(idx)].add_itemset(
                self.get_itemset(idx).to_vec(),
                self.supports[idx],
                self.evals[idx],
            );
        }
        levels.retain(|level| !level.is_empty());
        levels
    }
}

impl FrequentLevel {
    pub fn new(itemset_size: usize) -> Self {
        Self {
            storage: ItemsetStorage::new(),
            itemset_size,
        }
    }

    pub fn add_itemset(&mut self, items: Vec<usize>, supp: Supp, eval: f64) -> usize {
        debug_assert_eq!(items.len(), self.itemset_size);
        self.storage.add_itemset(items, supp, eval)
    }

    pub fn get_itemset(&self, idx: usize) -> &[usize] {
        self.storage.get_itemset(idx)
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    pub fn supports(&self) -> &[Supp] {
        &self.storage.supports
    }

    pub fn iter_itemsets(&self) -> impl Iterator<Item = &[usize]> {
        (0..self.storage.len()).map(move |idx| self.get_itemset(idx))
    }
}
