use std::str::FromStr;

use bitflags::bitflags;

use super::error::{CarpError, CarpResult};
use super::Supp;

/// Item sets to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    #[default]
    Closed,
    Maximal,
}

impl FromStr for Target {
    type Err = CarpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "c" | "closed" => Ok(Target::Closed),
            "m" | "maximal" => Ok(Target::Maximal),
            _ => Err(CarpError::invalid(format!("target type '{s}'"))),
        }
    }
}

/// Intersection engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// Tid lists when items x transactions exceeds [`Variant::AUTO_LIMIT`],
    /// the occurrence table otherwise.
    #[default]
    Auto,
    Table,
    TidList,
}

impl Variant {
    pub const AUTO_LIMIT: f64 = 1024.0 * 1024.0;

    pub fn resolve(self, items: usize, transactions: usize) -> Variant {
        match self {
            Variant::Auto if items as f64 * transactions as f64 > Self::AUTO_LIMIT => {
                Variant::TidList
            }
            Variant::Auto => Variant::Table,
            other => other,
        }
    }
}

impl FromStr for Variant {
    type Err = CarpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "a" | "auto" => Ok(Variant::Auto),
            "t" | "table" => Ok(Variant::Table),
            "l" | "tids" | "tidlist" | "list" => Ok(Variant::TidList),
            _ => Err(CarpError::invalid(format!("carpenter variant '{s}'"))),
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Mode: u32 {
        /// Fold perfect extensions instead of branching on them.
        const PERFECT = 0x0010;
        /// Filter maximal item sets with the repository (prune + superset query).
        const FILTER  = 0x0020;
        /// Only add maximal item sets to the repository.
        const MAXONLY = 0x0040;
        /// Collate equal transactions before the search.
        const COLLATE = 0x0080;
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::COLLATE | Mode::PERFECT
    }
}

impl Mode {
    /// Apply mode indicator characters to the default mode:
    /// `x` no perfect extension pruning, `z` filter maximal sets with the
    /// repository, `y` add only maximal sets, `p` do not collate.
    pub fn from_flags(flags: &str) -> CarpResult<Mode> {
        let mut mode = Mode::default();
        for c in flags.chars() {
            match c {
                'x' => mode.remove(Mode::PERFECT),
                'z' => mode.insert(Mode::FILTER),
                'y' => mode.insert(Mode::MAXONLY),
                'p' => mode.remove(Mode::COLLATE),
                _ => return Err(CarpError::invalid(format!("mode flag '{c}'"))),
            }
        }
        Ok(mode)
    }
}

/// Order in which `TransactionBag::recode` numbers the frequent items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemOrder {
    None,
    AscFreq,
    DescFreq,
    AscSizeSum,
    #[default]
    DescSizeSum,
}

impl ItemOrder {
    /// Numeric codes: 1/-1 frequency, 2/-2 transaction size sum, 0 none.
    pub fn from_code(code: i32) -> ItemOrder {
        match code {
            1 => ItemOrder::AscFreq,
            -1 => ItemOrder::DescFreq,
            c if c >= 2 => ItemOrder::AscSizeSum,
            c if c <= -2 => ItemOrder::DescSizeSum,
            _ => ItemOrder::None,
        }
    }
}

/// Additional evaluation measure for reported item sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvalMeasure {
    #[default]
    None,
    /// Binary logarithm of the support quotient.
    LdRatio,
}

impl FromStr for EvalMeasure {
    type Err = CarpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" | "none" => Ok(EvalMeasure::None),
            "b" | "ldratio" => Ok(EvalMeasure::LdRatio),
            _ => Err(CarpError::invalid(format!("evaluation measure '{s}'"))),
        }
    }
}

/// Parameters of a complete mining run.
#[derive(Debug, Clone, PartialEq)]
pub struct CarpenterConfig {
    pub target: Target,
    /// Minimum support; positive: percentage of the total weight,
    /// negative: absolute value.
    pub supp: f64,
    pub zmin: usize,
    pub zmax: Option<usize>,
    pub eval: EvalMeasure,
    /// Evaluation threshold in percent.
    pub thresh: f64,
    pub algo: Variant,
    pub mode: Mode,
    /// Minimum support per item set size (indexed by size).
    pub border: Vec<Supp>,
    pub sort: ItemOrder,
    pub memory_limit: Option<usize>,
}

impl Default for CarpenterConfig {
    fn default() -> Self {
        Self {
            target: Target::Closed,
            supp: 10.0,
            zmin: 1,
            zmax: None,
            eval: EvalMeasure::None,
            thresh: 10.0,
            algo: Variant::Auto,
            mode: Mode::default(),
            border: Vec::new(),
            sort: ItemOrder::default(),
            memory_limit: None,
        }
    }
}

impl CarpenterConfig {
    pub fn new(target: Target, supp: f64) -> Self {
        Self {
            target,
            supp,
            ..Self::default()
        }
    }

    pub fn with_size(mut self, zmin: usize, zmax: Option<usize>) -> Self {
        self.zmin = zmin;
        self.zmax = zmax;
        self
    }

    pub fn with_eval(mut self, eval: EvalMeasure, thresh: f64) -> Self {
        self.eval = eval;
        self.thresh = thresh;
        self
    }

    pub fn with_algo(mut self, algo: Variant) -> Self {
        self.algo = algo;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_border(mut self, border: Vec<Supp>) -> Self {
        self.border = border;
        self
    }

    pub fn with_sort(mut self, sort: ItemOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_memory_limit(mut self, limit_bytes: usize) -> Self {
        self.memory_limit = Some(limit_bytes);
        self
    }

    pub fn validate(&self) -> CarpResult<()> {
        if let Some(zmax) = self.zmax {
            if zmax < self.zmin {
                return Err(CarpError::invalid("zmax must not be less than zmin"));
            }
        }
        if self.supp > 100.0 {
            return Err(CarpError::invalid(format!("minimum support {}", self.supp)));
        }
        Ok(())
    }

    /// Absolute minimum support for a database of the given total weight.
    pub fn min_support(&self, weight: Supp) -> Supp {
        let supp = if self.supp >= 0.0 {
            0.01 * self.supp * weight as f64 * (1.0 - f64::EPSILON)
        } else {
            -self.supp
        };
        supp.ceil() as Supp
    }
}
