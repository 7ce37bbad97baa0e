use std::collections::BTreeMap;

#[cfg(test)]
mod tests;

/// A set of `u64`s stored as sorted, non-overlapping, non-adjacent closed
/// intervals. When members cluster into long runs (a work queue processed
/// roughly in order), memory is proportional to the number of runs rather
/// than the number of members.
///
/// All mutations preserve the canonical form, so two `RangeSet`s containing
/// the same members always compare equal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RangeSet {
    /// Map from each interval's lower bound to its inclusive upper bound.
    /// For consecutive entries `(a, b)` and `(c, d)`: `c > b + 1`.
    ranges: BTreeMap<u64, u64>,
    /// Cardinality, maintained incrementally.
    len: u64,
}

impl RangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: impl IntoIterator<Item = u64>) -> Self {
        let mut set = Self::new();
        for v in values {
            set.add(v);
        }
        set
    }

    /// Number of members (not intervals).
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn num_intervals(&self) -> usize {
        self.ranges.len()
    }

    /// Iterate the intervals as `(lo, hi)` pairs in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.ranges.iter().map(|(&lo, &hi)| (lo, hi))
    }

    pub fn contains(&self, v: u64) -> bool {
        match self.ranges.range(..=v).next_back() {
            Some((_, &hi)) => hi >= v,
            None => false,
        }
    }

    /// Insert a single value, merging with its neighbours where they touch.
    /// Inserting a present value is a no-op.
    pub fn add(&mut self, v: u64) {
        let prev = self
            .ranges
            .range(..=v)
            .next_back()
            .map(|(&lo, &hi)| (lo, hi));
        if let Some((_, prev_hi)) = prev {
            if prev_hi >= v {
                return;
            }
        }
        // `v` is not contained, so any interval at or after `v` starts
        // strictly above it.
        let next = self.ranges.range(v..).next().map(|(&lo, &hi)| (lo, hi));
        match (prev, next) {
            (Some((prev_lo, prev_hi)), Some((next_lo, next_hi)))
                if prev_hi + 1 == v && v + 1 == next_lo =>
            {
                self.ranges.remove(&next_lo);
                self.ranges.insert(prev_lo, next_hi);
            },
            (Some((prev_lo, prev_hi)), _) if prev_hi + 1 == v => {
                self.ranges.insert(prev_lo, v);
            },
            (_, Some((next_lo, next_hi))) if v + 1 == next_lo => {
                self.ranges.remove(&next_lo);
                self.ranges.insert(v, next_hi);
            },
            _ => {
                self.ranges.insert(v, v);
            },
        }
        self.len += 1;
    }

    /// Remove a single value, shrinking or splitting its interval. Removing
    /// an absent value is a no-op.
    pub fn discard(&mut self, v: u64) {
        let Some((&lo, &hi)) = self.ranges.range(..=v).next_back() else {
            return;
        };
        if hi < v {
            return;
        }
        if lo == hi {
            self.ranges.remove(&lo);
        } else if v == lo {
            self.ranges.remove(&lo);
            self.ranges.insert(v + 1, hi);
        } else if v == hi {
            self.ranges.insert(lo, v - 1);
        } else {
            self.ranges.insert(lo, v - 1);
            self.ranges.insert(v + 1, hi);
        }
        self.len -= 1;
    }

    /// Insert every integer in the closed range `[lo, hi]`, coalescing with
    /// everything it overlaps or touches.
    pub fn insert_range(&mut self, lo: u64, hi: u64) {
        if lo > hi {
            return;
        }
        // Leftmost existing interval that overlaps or touches [lo, hi].
        let merged_lo = match self.ranges.range(..=lo).next_back() {
            Some((&prev_lo, &prev_hi)) if prev_hi >= lo.saturating_sub(1) => prev_lo,
            _ => lo,
        };
        let mut merged_hi = hi;
        let mut absorbed = 0u64;
        let mut stale = Vec::new();
        for (&r_lo, &r_hi) in self.ranges.range(merged_lo..) {
            if r_lo > hi.saturating_add(1) {
                break;
            }
            stale.push(r_lo);
            merged_hi = merged_hi.max(r_hi);
            absorbed += r_hi - r_lo + 1;
        }
        for r_lo in stale {
            self.ranges.remove(&r_lo);
        }
        self.ranges.insert(merged_lo, merged_hi);
        self.len += (merged_hi - merged_lo + 1) - absorbed;
    }

    /// Union of two sets. The result is in canonical form, so the operation
    /// commutes.
    pub fn union(&self, other: &RangeSet) -> RangeSet {
        // Replay the shorter interval list onto a copy of the longer one.
        let (base, overlay) = if self.ranges.len() >= other.ranges.len() {
            (self, other)
        } else {
            (other, self)
        };
        let mut result = base.clone();
        for (lo, hi) in overlay.iter() {
            result.insert_range(lo, hi);
        }
        result
    }

    /// The sorted integers in `[lo, hi]` that are NOT members of this set.
    /// Empty when `lo > hi`.
    pub fn filter_range(&self, lo: u64, hi: u64) -> Vec<u64> {
        if lo > hi {
            return Vec::new();
        }
        let mut result = Vec::new();
        let mut cursor = lo;
        // First interval that could intersect [lo, hi]: either the one
        // containing `lo` or the first one starting after it.
        let first = match self.ranges.range(..=lo).next_back() {
            Some((&r_lo, &r_hi)) if r_hi >= lo => r_lo,
            _ => lo,
        };
        for (&r_lo, &r_hi) in self.ranges.range(first..) {
            if r_lo > hi {
                break;
            }
            result.extend(cursor..r_lo);
            cursor = match r_hi.checked_add(1) {
                Some(c) => c.max(cursor),
                // The interval reaches u64::MAX; nothing can lie above it.
                None => return result,
            };
            if cursor > hi {
                return result;
            }
        }
        result.extend(cursor..=hi);
        result
    }
}
