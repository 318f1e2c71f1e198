//! Carpenter on an item occurrence table.
//!
//! Row `j` of the table holds, for every item of transaction `j`, the
//! (weighted) number of transactions `0..=j` that contain the item, so
//! "does the item occur often enough in the rows still to be visited" is a
//! single comparison.

use std::sync::Arc;

use tracing::debug;

use super::config::Mode;
use super::error::CarpResult;
use super::memory::{estimate_table_size, try_filled, MemoryGuard};
use super::repo::{Direction, RepoTree};
use super::tabag::TransactionBag;
use super::{Item, Supp, Tid};

struct OccurrenceTable<'a> {
    rows: Vec<Supp>,
    width: usize,
    muls: Vec<Supp>,
    smin: Supp,
    zmin: usize,
    mode: Mode,
    rpt: &'a mut RepoTree,
}

impl OccurrenceTable<'_> {
    fn perfect_limit(&self, k: usize) -> usize {
        if self.mode.contains(Mode::PERFECT) {
            k
        } else {
            usize::MAX
        }
    }

    /// Intersect `set[..k]` with row `n` into `dst`, keeping the items that
    /// occur in more than `s` of the rows `0..=n`.
    fn intersect(&self, cur: &[Item], dst: &mut [Item], n: Tid, s: Supp) -> usize {
        let row = &self.rows[n * self.width..(n + 1) * self.width];
        let mut m = 0;
        for &item in cur {
            if row[item] > s {
                dst[m] = item;
                m += 1;
            }
        }
        m
    }

    #[inline]
    fn count(&self, n: Tid, item: Item) -> Supp {
        self.rows[n * self.width + item]
    }

    /// Unit weights. `set[..k]` is the current item set, the rest of `set`
    /// is scratch space for deeper levels. Returns the support of the
    /// current set including the perfect extensions found below `n`.
    fn rec_tab(
        &mut self,
        set: &mut [Item],
        k: usize,
        mut n: Tid,
        mut supp: Supp,
    ) -> CarpResult<Supp> {
        let (cur, dst) = set.split_at_mut(k);
        let pex = self.perfect_limit(k);
        let mut s = self.smin.saturating_sub(supp + 1);
        while n > s {
            n -= 1;
            let m = self.intersect(cur, dst, n, s);
            if m < self.zmin {
                continue;
            }
            if m <= 1 {
                let single = supp + self.count(n, dst[0]);
                self.rpt.add(&dst[..m], single)?;
                continue;
            }
            if m >= pex {
                supp += 1;
                s = s.saturating_sub(1);
                continue;
            }
            if self.mode.contains(Mode::MAXONLY) && self.rpt.has_superset(&dst[..m], self.smin) {
                continue;
            }
            if !self.rpt.add(&dst[..m], supp + 1)? {
                continue;
            }
            let r = self.rec_tab(dst, m, n, supp + 1)?;
            if r > supp + 1 {
                self.rpt.add(&dst[..m], r)?;
            }
        }
        Ok(supp)
    }

    /// Transactions with multiplicities.
    fn rec_mtb(
        &mut self,
        set: &mut [Item],
        k: usize,
        mut n: Tid,
        mut supp: Supp,
    ) -> CarpResult<Supp> {
        let (cur, dst) = set.split_at_mut(k);
        let pex = self.perfect_limit(k);
        while n > 0 {
            n -= 1;
            let s = self.smin.saturating_sub(supp + 1);
            let m = self.intersect(cur, dst, n, s);
            if m < self.zmin {
                continue;
            }
            if m <= 1 {
                let single = supp + self.count(n, dst[0]);
                self.rpt.add(&dst[..m], single)?;
                continue;
            }
            if m >= pex {
                supp += self.muls[n];
                continue;
            }
            if self.mode.contains(Mode::MAXONLY) && self.rpt.has_superset(&dst[..m], self.smin) {
                continue;
            }
            let with = supp + self.muls[n];
            if !self.rpt.add(&dst[..m], with)? {
                continue;
            }
            let r = self.rec_mtb(dst, m, n, with)?;
            if r > with {
                self.rpt.add(&dst[..m], r)?;
            }
        }
        Ok(supp)
    }
}

/// Insert the closed item sets of `bag` (recoded, sorted) into `rpt`,
/// intersecting transactions with an occurrence table.
pub fn carp_tab(
    bag: &TransactionBag,
    smin: Supp,
    zmin: usize,
    mode: Mode,
    rpt: &mut RepoTree,
) -> CarpResult<()> {
    let smin = smin.max(1);
    let zmin = zmin.max(1);
    let weight = bag.weight();
    if weight < smin || bag.max_len() < zmin {
        return Ok(());
    }
    let k = bag.item_count();
    let n = bag.len();
    let extent = bag.extent();
    rpt.add(&[], weight)?;
    if k == 0 {
        return Ok(());
    }

    let weighted = !bag.has_unit_weights();
    let budget = Arc::clone(rpt.budget());
    let guard = MemoryGuard::new(&budget, estimate_table_size(k, n, extent, weighted))?;
    debug!(
        items = k,
        transactions = n,
        weighted,
        bytes = guard.bytes(),
        "building occurrence table"
    );

    let mut rows = try_filled(n.saturating_mul(k), 0 as Supp)?;
    let mut muls = if weighted { try_filled(n, 0 as Supp)? } else { Vec::new() };
    let mut frqs = try_filled(k, 0 as Supp)?;
    for (j, t) in bag.transactions().iter().enumerate() {
        let row = &mut rows[j * k..(j + 1) * k];
        let w = t.weight();
        if weighted {
            muls[j] = w;
        }
        for &item in t.items() {
            frqs[item] += w;
            row[item] = frqs[item];
        }
    }

    let mut set = try_filled(k + extent, 0 as Item)?;
    for (i, slot) in set[..k].iter_mut().enumerate() {
        *slot = match rpt.dir() {
            Direction::Descending => k - 1 - i,
            Direction::Ascending => i,
        };
    }

    let mut table = OccurrenceTable {
        rows,
        width: k,
        muls,
        smin,
        zmin,
        mode,
        rpt,
    };
    let supp = if weighted {
        table.rec_mtb(&mut set, k, n, 0)?
    } else {
        table.rec_tab(&mut set, k, n, 0)?
    };
    if supp > 0 {
        table.rpt.add(&set[..k], supp)?;
    }
    Ok(())
}
