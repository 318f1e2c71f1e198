//! Brute-force reference for closed and maximal item sets over small item
//! universes (subsets are enumerated as bit masks).

#![allow(dead_code)]

use carpenter::TransactionBag;

/// Weighted transactions over items `0..items`.
pub type Db = Vec<(Vec<usize>, usize)>;

pub fn bag(db: &Db) -> TransactionBag {
    TransactionBag::from_weighted(db.iter().cloned())
}

/// Support of every item set, indexed by its bit mask.
pub fn supports(db: &Db, items: usize) -> Vec<usize> {
    let masks: Vec<(usize, usize)> = db
        .iter()
        .map(|(t, w)| (t.iter().fold(0, |m, &i| m | 1 << i), *w))
        .collect();
    (0..1usize << items)
        .map(|set| {
            masks
                .iter()
                .filter(|&&(t, _)| t & set == set)
                .map(|&(_, w)| w)
                .sum()
        })
        .collect()
}

fn items_of(set: usize, items: usize) -> Vec<usize> {
    (0..items).filter(|&i| set & 1 << i != 0).collect()
}

/// Non-empty closed item sets with a support of at least `smin`.
pub fn closed_sets(db: &Db, items: usize, smin: usize) -> Vec<(Vec<usize>, usize)> {
    let supp = supports(db, items);
    let mut sets: Vec<_> = (1..supp.len())
        .filter(|&set| supp[set] >= smin)
        .filter(|&set| {
            (0..items)
                .filter(|&i| set & 1 << i == 0)
                .all(|i| supp[set | 1 << i] < supp[set])
        })
        .map(|set| (items_of(set, items), supp[set]))
        .collect();
    sets.sort();
    sets
}

/// Non-empty item sets with a support of at least `smin` and no frequent
/// superset.
pub fn maximal_sets(db: &Db, items: usize, smin: usize) -> Vec<(Vec<usize>, usize)> {
    let supp = supports(db, items);
    let mut sets: Vec<_> = (1..supp.len())
        .filter(|&set| supp[set] >= smin)
        .filter(|&set| {
            (0..items)
                .filter(|&i| set & 1 << i == 0)
                .all(|i| supp[set | 1 << i] < smin)
        })
        .map(|set| (items_of(set, items), supp[set]))
        .collect();
    sets.sort();
    sets
}
