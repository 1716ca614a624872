use crate::models::Variable;
use std::collections::BTreeMap;

/// Per-day, per-variable record of values that were synthesized rather than observed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillMask {
    len: usize,
    flags: BTreeMap<Variable, Vec<bool>>,
}

impl FillMask {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            flags: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn mark(&mut self, variable: Variable, day: usize) {
        if day >= self.len {
            return;
        }
        let len = self.len;
        self.flags.entry(variable).or_insert_with(|| vec![false; len])[day] = true;
    }

    pub fn is_filled(&self, variable: Variable, day: usize) -> bool {
        self.flags
            .get(&variable)
            .and_then(|days| days.get(day).copied())
            .unwrap_or(false)
    }

    /// Flags for one variable, all false when nothing was filled.
    pub fn column(&self, variable: Variable) -> Vec<bool> {
        self.flags
            .get(&variable)
            .cloned()
            .unwrap_or_else(|| vec![false; self.len])
    }

    pub fn count(&self, variable: Variable) -> usize {
        self.flags
            .get(&variable)
            .map_or(0, |days| days.iter().filter(|&&f| f).count())
    }

    /// True when no position is marked for any variable.
    pub fn is_clear(&self) -> bool {
        self.flags.values().all(|days| days.iter().all(|&f| !f))
    }
}
