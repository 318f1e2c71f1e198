use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use super::config::{CarpenterConfig, EvalMeasure, ItemOrder, Mode, Target, Variant};
use super::error::CarpResult;
use super::memory::MemoryBudget;
use super::repo::{Direction, RepoTree, ReportMode};
use super::reporter::{ItemSetReporter, Reporter};
use super::storage::ItemsetStorage;
use super::tabag::TransactionBag;
use super::table::carp_tab;
use super::tidlist::carp_tid;
use super::Supp;

/// Direction in which the engines visit items and the repository orders
/// its paths. Transactions are sorted to match.
const SEARCH_DIR: i32 = -1;

/// Prepare a transaction bag for the search: recode the frequent items,
/// drop the items of transactions shorter than `zmin`, sort, and collate
/// equal transactions if `mode` asks for it.
///
/// Returns the number of frequent items; with none there is nothing to
/// search.
pub fn carp_data(
    bag: &mut TransactionBag,
    smin: Supp,
    zmin: usize,
    mode: Mode,
    sort: ItemOrder,
) -> usize {
    let start = Instant::now();
    let items = bag.recode(smin, sort);
    debug!(items, elapsed = ?start.elapsed(), "filtered, sorted and recoded items");
    if items == 0 {
        return 0;
    }

    let start = Instant::now();
    bag.filter(zmin);
    // transaction ids are visited from the back in both engines
    bag.sort_items(SEARCH_DIR);
    bag.sort_transactions(SEARCH_DIR);
    if mode.contains(Mode::COLLATE) {
        bag.reduce();
    }
    debug!(
        transactions = bag.len(),
        weight = bag.weight(),
        elapsed = ?start.elapsed(),
        "filtered and sorted transactions"
    );
    items
}

/// Configure the reporter for a search: evaluation measure, and maximal
/// item set filtering in the reporter unless the repository does it.
///
/// The reporter only filters when every size can be reported; with a
/// `zmax` below the number of items, supersets beyond `zmax` never reach
/// it and `carpenter` checks maximality against the repository instead.
pub fn carp_repo(
    rep: &mut ItemSetReporter,
    target: Target,
    eval: EvalMeasure,
    thresh: f64,
    mode: Mode,
    budget: Arc<MemoryBudget>,
) -> CarpResult<()> {
    if eval == EvalMeasure::LdRatio {
        rep.set_eval(eval, thresh);
    }
    let unbounded = rep.xable(rep.item_count());
    if target == Target::Maximal && !mode.contains(Mode::FILTER) && unbounded {
        rep.set_maximal_filter(Direction::from_sign(SEARCH_DIR), budget)?;
    }
    Ok(())
}

/// Run Carpenter on a prepared bag and hand the closed (or maximal) item
/// sets to `rep`.
///
/// Maximal item sets are checked against the pruned repository when
/// `mode` contains `FILTER` or when `rep` cannot take sets of every size.
pub fn carpenter<R: Reporter + ?Sized>(
    bag: &TransactionBag,
    target: Target,
    smin: Supp,
    algo: Variant,
    mode: Mode,
    rep: &mut R,
    budget: Arc<MemoryBudget>,
) -> CarpResult<()> {
    let mut mode = mode;
    if mode.contains(Mode::MAXONLY) {
        mode.insert(Mode::PERFECT);
    }
    let items = bag.item_count();
    let transactions = bag.len();
    let variant = algo.resolve(items, transactions);
    debug!(?variant, items, transactions, "selected intersection engine");

    let start = Instant::now();
    let mut rpt = RepoTree::with_budget(items, Direction::from_sign(SEARCH_DIR), budget)?;
    let zmin = rep.zmin();
    match variant {
        Variant::TidList => carp_tid(bag, smin, zmin, mode, &mut rpt)?,
        Variant::Table | Variant::Auto => carp_tab(bag, smin, zmin, mode, &mut rpt)?,
    }
    info!(
        nodes = rpt.node_count(),
        peak = rpt.node_max(),
        elapsed = ?start.elapsed(),
        "enumerated transaction sets"
    );

    let start = Instant::now();
    let mut max = i32::from(target == Target::Maximal);
    if mode.contains(Mode::FILTER) || !rep.xable(items) {
        max = -max;
    }
    if max < 0 {
        rpt.prune(smin);
    }
    rpt.report(ReportMode::from_sign(max), smin, rep)?;
    info!(elapsed = ?start.elapsed(), "reported item sets");
    Ok(())
}

/// Mine the closed or maximal frequent item sets of `bag`.
///
/// Items of the returned sets are the identifiers the bag was built from.
pub fn mine(mut bag: TransactionBag, config: &CarpenterConfig) -> CarpResult<ItemsetStorage> {
    config.validate()?;
    let budget = Arc::new(match config.memory_limit {
        Some(limit) => MemoryBudget::new(limit),
        None => MemoryBudget::unlimited(),
    });
    let smin = config.min_support(bag.weight()).max(1);
    let zmax = config.zmax.unwrap_or(usize::MAX);
    info!(
        transactions = bag.len(),
        weight = bag.weight(),
        smin,
        target = ?config.target,
        "mining item sets"
    );

    if carp_data(&mut bag, smin, config.zmin, config.mode, config.sort) == 0 {
        return Ok(ItemsetStorage::new());
    }

    let mut rep = ItemSetReporter::for_bag(&bag);
    rep.set_size(config.zmin, zmax);
    rep.set_support(smin);
    rep.set_border(config.border.clone());
    carp_repo(
        &mut rep,
        config.target,
        config.eval,
        config.thresh,
        config.mode,
        Arc::clone(&budget),
    )?;
    carpenter(
        &bag,
        config.target,
        smin,
        config.algo,
        config.mode,
        &mut rep,
        Arc::clone(&budget),
    )?;

    let found = rep.into_found();
    info!(
        sets = found.len(),
        peak_bytes = budget.peak_usage(),
        "mining finished"
    );
    Ok(found)
}
