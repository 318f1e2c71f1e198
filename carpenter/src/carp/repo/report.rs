use super::tree::{NodeId, RepoTree};
use crate::carp::error::CarpResult;
use crate::carp::reporter::Reporter;
use crate::carp::Supp;

/// Which item sets `RepoTree::report` hands to the reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    /// Sets without a child of equal or higher support.
    Closed,
    /// Sets without a frequent child; cross-branch supersets are left to
    /// the reporter.
    Maximal,
    /// Sets without a frequent superset anywhere in the (pruned) tree.
    MaxOnly,
}

impl ReportMode {
    /// `0`: closed, positive: maximal, negative: maximal via superset query.
    pub fn from_sign(max: i32) -> Self {
        match max {
            0 => ReportMode::Closed,
            m if m > 0 => ReportMode::Maximal,
            _ => ReportMode::MaxOnly,
        }
    }
}

impl RepoTree {
    /// Report the closed or maximal item sets with a support of at least
    /// `min`, then the empty set if it qualifies.
    ///
    /// `MaxOnly` expects the tree to be pruned with `min` beforehand.
    pub fn report<R: Reporter + ?Sized>(
        &self,
        mode: ReportMode,
        min: Supp,
        rep: &mut R,
    ) -> CarpResult<()> {
        let mut blocked = false;
        if rep.xable(1) {
            for top in self.tops() {
                let supp = self.nodes[top].supp;
                if supp < min {
                    continue;
                }
                blocked |= mode != ReportMode::Closed || supp >= self.supp;
                rep.add(top, supp);
                let res = self.report_node(top, mode, min, rep);
                rep.remove(1);
                res?;
            }
        } else {
            blocked = self.tops().any(|top| match mode {
                ReportMode::Closed => self.nodes[top].supp >= self.supp,
                _ => self.nodes[top].supp >= min,
            });
        }
        if self.supp >= min && !blocked {
            rep.report()?;
        }
        Ok(())
    }

    fn report_node<R: Reporter + ?Sized>(
        &self,
        id: NodeId,
        mode: ReportMode,
        min: Supp,
        rep: &mut R,
    ) -> CarpResult<()> {
        let supp = rep.supp();
        let mut extended = false;
        if rep.xable(1) {
            for child in self.children(id) {
                let node = &self.nodes[child];
                if node.supp < min {
                    continue;
                }
                extended |= mode != ReportMode::Closed || node.supp >= supp;
                rep.add(node.item, node.supp);
                let res = self.report_node(child, mode, min, rep);
                rep.remove(1);
                res?;
            }
        } else {
            extended = self.children(id).any(|child| match mode {
                ReportMode::Closed => self.nodes[child].supp >= supp,
                _ => self.nodes[child].supp >= min,
            });
        }
        if extended {
            return Ok(());
        }
        if mode == ReportMode::MaxOnly && self.has_superset_excluding(rep.items(), min, Some(id)) {
            return Ok(());
        }
        rep.report()
    }
}
