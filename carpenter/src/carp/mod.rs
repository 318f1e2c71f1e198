pub mod config;
pub mod driver;
pub mod error;
pub mod memory;
pub mod repo;
pub mod reporter;
pub mod storage;
pub mod table;
pub mod tabag;
pub mod tidlist;


/// Item code (index into the recoded item base).
pub type Item = usize;
/// Support: a (weighted) transaction count.
pub type Supp = usize;
/// Transaction index.
pub type Tid = usize;

pub use config::{CarpenterConfig, EvalMeasure, ItemOrder, Mode, Target, Variant};
pub use driver::{carp_data, carp_repo, carpenter, mine};
pub use error::{CarpError, CarpResult};
pub use memory::{MemoryBudget, MemoryError, MemoryGuard};
pub use repo::{Direction, NodeId, RepoTree, ReportMode};
pub use reporter::{ItemSetReporter, Reporter};
pub use storage::{FrequentLevel, ItemsetStorage};
pub use tabag::{Transaction, TransactionBag};
