//! Item set reporter: receives the item sets found by a repository
//! traversal one at a time and decides which of them to keep.

use std::sync::Arc;

use tracing::trace;

use super::config::EvalMeasure;
use super::error::CarpResult;
use super::memory::MemoryBudget;
use super::repo::{Direction, RepoTree};
use super::storage::ItemsetStorage;
use super::tabag::TransactionBag;
use super::{Item, Supp};

/// Stack-like builder of the item set currently being reported.
pub trait Reporter {
    /// Minimum size of a reported item set.
    fn zmin(&self) -> usize;

    /// Whether the current set may be extended by `n` more items.
    fn xable(&self, n: usize) -> bool;

    /// Push an item; `supp` is the support of the extended set.
    fn add(&mut self, item: Item, supp: Supp);

    /// Pop the last `n` items.
    fn remove(&mut self, n: usize);

    /// Support of the current set.
    fn supp(&self) -> Supp;

    /// Items of the current set, in the order they were added.
    fn items(&self) -> &[Item];

    /// Report the current set.
    fn report(&mut self) -> CarpResult<()>;
}

/// Reporter that filters item sets and collects the accepted ones,
/// translated to the original item identifiers.
#[derive(Debug)]
pub struct ItemSetReporter {
    names: Vec<usize>,
    base: Supp,
    zmin: usize,
    zmax: usize,
    smin: Supp,
    border: Vec<Supp>,
    eval: EvalMeasure,
    thresh: f64,
    freqs: Vec<Supp>,
    items: Vec<Item>,
    supps: Vec<Supp>,
    filter: Option<RepoTree>,
    found: ItemsetStorage,
}

impl ItemSetReporter {
    /// Reporter for items coded `0..names.len()`. `freqs` are the supports
    /// of the single items and `base` is the total transaction weight (the
    /// support of the empty set).
    pub fn new(names: Vec<usize>, freqs: Vec<Supp>, base: Supp) -> Self {
        Self {
            names,
            base,
            zmin: 0,
            zmax: usize::MAX,
            smin: 0,
            border: Vec::new(),
            eval: EvalMeasure::None,
            thresh: 0.0,
            freqs,
            items: Vec::new(),
            supps: Vec::new(),
            filter: None,
            found: ItemsetStorage::new(),
        }
    }

    pub fn set_size(&mut self, zmin: usize, zmax: usize) {
        self.zmin = zmin;
        self.zmax = zmax;
    }

    pub fn set_support(&mut self, smin: Supp) {
        self.smin = smin;
    }

    /// Minimum support per item set size; sizes beyond the border only
    /// need the general minimum support.
    pub fn set_border(&mut self, border: Vec<Supp>) {
        self.border = border;
    }

    /// Reporter for the (recoded) items of `bag`.
    pub fn for_bag(bag: &TransactionBag) -> Self {
        Self::new(bag.item_names().to_vec(), bag.item_frequencies(), bag.weight())
    }

    /// Evaluation measure with its threshold in percent.
    pub fn set_eval(&mut self, eval: EvalMeasure, thresh: f64) {
        self.eval = eval;
        self.thresh = thresh * 0.01;
    }

    /// Drop every set for which a superset was reported before. Requires
    /// supersets to be reported before their subsets.
    pub fn set_maximal_filter(
        &mut self,
        dir: Direction,
        budget: Arc<MemoryBudget>,
    ) -> CarpResult<()> {
        self.filter = Some(RepoTree::with_budget(self.names.len(), dir, budget)?);
        Ok(())
    }

    /// Number of item codes the reporter translates.
    pub fn item_count(&self) -> usize {
        self.names.len()
    }

    pub fn has_maximal_filter(&self) -> bool {
        self.filter.is_some()
    }

    pub fn found(&self) -> &ItemsetStorage {
        &self.found
    }

    pub fn into_found(self) -> ItemsetStorage {
        self.found
    }

    fn evaluate(&self, supp: Supp) -> f64 {
        match self.eval {
            EvalMeasure::None => 0.0,
            EvalMeasure::LdRatio => {
                if self.items.len() < 2 || self.base == 0 || supp == 0 {
                    return 0.0;
                }
                let base = self.base as f64;
                let mut ratio = (supp as f64 / base).log2();
                for &item in &self.items {
                    ratio -= (self.freqs[item] as f64 / base).log2();
                }
                ratio
            }
        }
    }
}

impl Reporter for ItemSetReporter {
    fn zmin(&self) -> usize {
        self.zmin
    }

    fn xable(&self, n: usize) -> bool {
        self.items.len().saturating_add(n) <= self.zmax
    }

    fn add(&mut self, item: Item, supp: Supp) {
        self.items.push(item);
        self.supps.push(supp);
    }

    fn remove(&mut self, n: usize) {
        let len = self.items.len().saturating_sub(n);
        self.items.truncate(len);
        self.supps.truncate(len);
    }

    fn supp(&self) -> Supp {
        self.supps.last().copied().unwrap_or(self.base)
    }

    fn items(&self) -> &[Item] {
        &self.items
    }

    fn report(&mut self) -> CarpResult<()> {
        let size = self.items.len();
        let supp = self.supp();
        if size < self.zmin || size > self.zmax || supp < self.smin {
            return Ok(());
        }
        // a maximal set blocks its subsets even if it fails the border or
        // the evaluation threshold itself
        if let Some(filter) = self.filter.as_mut() {
            if filter.has_superset(&self.items, self.smin.max(1)) {
                return Ok(());
            }
            filter.add(&self.items, supp)?;
        }
        if self.border.get(size).is_some_and(|&min| supp < min) {
            return Ok(());
        }
        let eval = self.evaluate(supp);
        if self.eval != EvalMeasure::None && eval < self.thresh {
            return Ok(());
        }
        let items = self.items.iter().map(|&code| self.names[code]).collect();
        trace!(size, supp, "item set reported");
        self.found.add_itemset(items, supp, eval);
        Ok(())
    }
}
