//! Carpenter on transaction identifier lists.

use std::sync::Arc;

use tracing::debug;

use super::config::Mode;
use super::error::CarpResult;
use super::memory::{estimate_tidlist_size, try_filled, MemoryGuard};
use super::repo::{Direction, RepoTree};
use super::tabag::TransactionBag;
use super::{Item, Supp, Tid};

/// Ends every item's run of transaction ids.
const SENTINEL: Tid = Tid::MAX;

/// An item with its remaining support and the position of the largest
/// transaction id not yet consumed.
#[derive(Debug, Clone, Copy, Default)]
struct TidList {
    item: Item,
    supp: Supp,
    head: usize,
}

struct TidSearch<'a> {
    /// Descending transaction ids per item, each run closed by `SENTINEL`.
    tids: Vec<Tid>,
    muls: Vec<Supp>,
    set: Vec<Item>,
    smin: Supp,
    zmin: usize,
    mode: Mode,
    rpt: &'a mut RepoTree,
}

impl TidSearch<'_> {
    fn perfect_limit(&self, k: usize) -> usize {
        if self.mode.contains(Mode::PERFECT) {
            k
        } else {
            usize::MAX
        }
    }

    /// Copy the items of `lists` into the set buffer.
    fn collect(&mut self, lists: &[TidList]) {
        for (slot, list) in self.set.iter_mut().zip(lists) {
            *slot = list.item;
        }
    }

    /// Unit weights. `lists[..k]` are the items of the current set, the
    /// rest of `lists` is scratch space for deeper levels.
    fn rec_tid(
        &mut self,
        lists: &mut [TidList],
        k: usize,
        mut n: Tid,
        mut supp: Supp,
    ) -> CarpResult<Supp> {
        let (cur, dst) = lists.split_at_mut(k);
        let pex = self.perfect_limit(k);
        let mut s = self.smin.saturating_sub(supp + 1);
        while n > s {
            n -= 1;
            let mut m = 0;
            for list in cur.iter_mut() {
                if self.tids[list.head] == n {
                    list.head += 1;
                    list.supp -= 1;
                    if list.supp >= s {
                        dst[m] = *list;
                        m += 1;
                    }
                }
            }
            if m < self.zmin {
                continue;
            }
            if m <= 1 {
                self.rpt.add(&[dst[0].item], supp + 1 + dst[0].supp)?;
                continue;
            }
            if m >= pex {
                supp += 1;
                s = s.saturating_sub(1);
                continue;
            }
            self.collect(&dst[..m]);
            if self.mode.contains(Mode::MAXONLY)
                && self.rpt.has_superset(&self.set[..m], self.smin)
            {
                continue;
            }
            if !self.rpt.add(&self.set[..m], supp + 1)? {
                continue;
            }
            let r = self.rec_tid(dst, m, n, supp + 1)?;
            if r > supp + 1 {
                self.collect(&dst[..m]);
                self.rpt.add(&self.set[..m], r)?;
            }
        }
        Ok(supp)
    }

    /// Transactions with multiplicities.
    fn rec_mti(
        &mut self,
        lists: &mut [TidList],
        k: usize,
        mut n: Tid,
        mut supp: Supp,
    ) -> CarpResult<Supp> {
        let (cur, dst) = lists.split_at_mut(k);
        let pex = self.perfect_limit(k);
        while n > 0 {
            n -= 1;
            let w = self.muls[n];
            let s = self.smin.saturating_sub(supp + w);
            let mut m = 0;
            for list in cur.iter_mut() {
                if self.tids[list.head] == n {
                    list.head += 1;
                    list.supp -= w;
                    if list.supp >= s {
                        dst[m] = *list;
                        m += 1;
                    }
                }
            }
            if m < self.zmin {
                continue;
            }
            if m <= 1 {
                self.rpt.add(&[dst[0].item], supp + w + dst[0].supp)?;
                continue;
            }
            if m >= pex {
                supp += w;
                continue;
            }
            self.collect(&dst[..m]);
            if self.mode.contains(Mode::MAXONLY)
                && self.rpt.has_superset(&self.set[..m], self.smin)
            {
                continue;
            }
            let with = supp + w;
            if !self.rpt.add(&self.set[..m], with)? {
                continue;
            }
            let r = self.rec_mti(dst, m, n, with)?;
            if r > with {
                self.collect(&dst[..m]);
                self.rpt.add(&self.set[..m], r)?;
            }
        }
        Ok(supp)
    }
}

/// Insert the closed item sets of `bag` (recoded, sorted) into `rpt`,
/// intersecting transactions through per-item transaction id lists.
pub fn carp_tid(
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
    let bytes = estimate_tidlist_size(k, n, extent, weighted, std::mem::size_of::<TidList>());
    let guard = MemoryGuard::new(&budget, bytes)?;
    debug!(items = k, transactions = n, weighted, bytes = guard.bytes(), "building tid lists");

    let descending = rpt.dir() == Direction::Descending;
    let slot = move |item: Item| if descending { k - 1 - item } else { item };
    let counts = bag.item_counts();
    let mut lists = try_filled(k + extent, TidList::default())?;
    let mut tids = try_filled(k + extent, SENTINEL)?;
    let mut next = try_filled(k, 0usize)?;
    let mut pos = 0;
    for (item, &count) in counts.iter().enumerate() {
        lists[slot(item)] = TidList {
            item,
            supp: 0,
            head: pos,
        };
        next[item] = pos;
        pos += count + 1;
    }
    let mut muls = if weighted { try_filled(n, 0 as Supp)? } else { Vec::new() };
    for j in (0..n).rev() {
        let t = bag.transaction(j);
        let w = t.weight();
        if weighted {
            muls[j] = w;
        }
        for &item in t.items() {
            lists[slot(item)].supp += w;
            tids[next[item]] = j;
            next[item] += 1;
        }
    }

    let mut search = TidSearch {
        tids,
        muls,
        set: try_filled(k, 0 as Item)?,
        smin,
        zmin,
        mode,
        rpt,
    };
    let supp = if weighted {
        search.rec_mti(&mut lists, k, n, 0)?
    } else {
        search.rec_tid(&mut lists, k, n, 0)?
    };
    if supp > 0 {
        search.collect(&lists[..k]);
        search.rpt.add(&search.set[..k], supp)?;
    }
    Ok(())
}
