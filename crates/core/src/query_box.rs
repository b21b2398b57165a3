//! N-dimensional axis-aligned boxes
//!
//! A `QueryBox` describes a rectangular region of an array by its per-axis
//! `start` offset and `count` extent. Boxes are plain values: they are created
//! by callers for a query, derived during overlap and split computations, and
//! serialized into cache keys.

use crate::constants::{KEY_SECTION_SEPARATOR, KEY_VALUE_SEPARATOR};
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Axis-aligned N-dimensional region described by start offsets and extents
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawQueryBox")]
pub struct QueryBox {
    start: Vec<u64>,
    count: Vec<u64>,
}

/// Unvalidated wire form; deserialized boxes go through `QueryBox::new`
#[derive(Deserialize)]
struct RawQueryBox {
    start: Vec<u64>,
    count: Vec<u64>,
}

impl TryFrom<RawQueryBox> for QueryBox {
    type Error = Error;

    fn try_from(raw: RawQueryBox) -> Result<Self> {
        Self::new(raw.start, raw.count)
    }
}

impl QueryBox {
    /// Create a box from per-axis start offsets and extents.
    ///
    /// Fails when the two vectors differ in length, when the box has no axes,
    /// or when `start + count` does not fit in a `u64` on some axis.
    pub fn new(start: Vec<u64>, count: Vec<u64>) -> Result<Self> {
        if start.len() != count.len() {
            return Err(Error::invalid_box(format!(
                "start has {} dimensions but count has {}",
                start.len(),
                count.len()
            )));
        }
        if start.is_empty() {
            return Err(Error::invalid_box("a box needs at least one dimension"));
        }
        for (axis, (s, c)) in start.iter().zip(&count).enumerate() {
            if s.checked_add(*c).is_none() {
                return Err(Error::invalid_box(format!(
                    "upper bound overflows on axis {axis} ({s} + {c})"
                )));
            }
        }
        Ok(Self { start, count })
    }

    /// Create a box from inclusive lower and exclusive upper bounds
    pub fn from_bounds(lower: &[u64], upper: &[u64]) -> Result<Self> {
        if lower.len() != upper.len() {
            return Err(Error::invalid_box(format!(
                "lower has {} dimensions but upper has {}",
                lower.len(),
                upper.len()
            )));
        }
        let count = lower
            .iter()
            .zip(upper)
            .enumerate()
            .map(|(axis, (lo, hi))| {
                hi.checked_sub(*lo).ok_or_else(|| {
                    Error::invalid_box(format!("upper {hi} is below lower {lo} on axis {axis}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(lower.to_vec(), count)
    }

    /// The empty sentinel: zero start and zero extent on every axis
    #[must_use]
    pub fn empty(dim: usize) -> Self {
        Self {
            start: vec![0; dim],
            count: vec![0; dim],
        }
    }

    /// Number of axes
    #[must_use]
    pub fn dim(&self) -> usize {
        self.start.len()
    }

    /// Per-axis start offsets
    #[must_use]
    pub fn start(&self) -> &[u64] {
        &self.start
    }

    /// Per-axis extents
    #[must_use]
    pub fn count(&self) -> &[u64] {
        &self.count
    }

    /// Exclusive upper bound on `axis`, or `None` when the axis does not exist
    #[must_use]
    pub fn upper(&self, axis: usize) -> Option<u64> {
        let start = self.start.get(axis)?;
        let count = self.count.get(axis)?;
        Some(start + count)
    }

    /// Exclusive upper bounds on every axis
    pub fn uppers(&self) -> impl Iterator<Item = u64> + '_ {
        self.start.iter().zip(&self.count).map(|(s, c)| s + c)
    }

    /// Number of elements covered. Saturates at `u64::MAX`.
    #[must_use]
    pub fn volume(&self) -> u64 {
        self.count
            .iter()
            .try_fold(1u64, |acc, c| acc.checked_mul(*c))
            .unwrap_or(u64::MAX)
    }

    /// Whether the box covers no elements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count.iter().any(|c| *c == 0)
    }

    /// Whether `other` lies entirely within this box.
    ///
    /// Boxes of different dimensionality never contain each other. An empty
    /// `other` is contained in every box of the same dimensionality.
    #[must_use]
    pub fn contains(&self, other: &QueryBox) -> bool {
        if self.dim() != other.dim() {
            return false;
        }
        if other.is_empty() {
            return true;
        }
        self.start
            .iter()
            .zip(self.uppers())
            .zip(other.start.iter().zip(other.uppers()))
            .all(|((lo, hi), (olo, ohi))| *olo >= *lo && ohi <= hi)
    }

    fn ensure_same_dim(&self, other: &QueryBox, operation: &'static str) -> Result<()> {
        if self.dim() != other.dim() {
            return Err(Error::dimension_mismatch(self.dim(), other.dim(), operation));
        }
        Ok(())
    }

    /// Overlap of the two boxes, or the empty sentinel when they are disjoint
    /// on any axis.
    pub fn intersect(&self, other: &QueryBox) -> Result<QueryBox> {
        self.ensure_same_dim(other, "intersect")?;

        let dim = self.dim();
        let mut start = Vec::with_capacity(dim);
        let mut count = Vec::with_capacity(dim);
        for (((s, u), os), ou) in self
            .start
            .iter()
            .zip(self.uppers())
            .zip(&other.start)
            .zip(other.uppers())
        {
            let lo = (*s).max(*os);
            let hi = u.min(ou);
            if hi <= lo {
                return Ok(QueryBox::empty(dim));
            }
            start.push(lo);
            count.push(hi - lo);
        }
        Ok(QueryBox { start, count })
    }

    /// Decompose `self` minus `inner` into disjoint boxes.
    ///
    /// `inner` is clipped to `self` first. Axes are processed in order: for
    /// each one the slabs of the remaining region before and after `inner` are
    /// emitted, then the remaining region shrinks to `inner`'s span on that
    /// axis. The result holds at most `2 * dim` boxes; it is empty when
    /// `inner` covers `self` and is `[self]` when they do not overlap.
    pub fn complement_split(&self, inner: &QueryBox) -> Result<Vec<QueryBox>> {
        let inner = self.intersect(inner)?;
        if inner.is_empty() {
            return Ok(vec![self.clone()]);
        }

        let mut pieces = Vec::with_capacity(2 * self.dim());
        let mut remaining = self.clone();
        for axis in 0..self.dim() {
            let lo = inner.start[axis];
            let hi = lo + inner.count[axis];
            let rem_lo = remaining.start[axis];
            let rem_hi = rem_lo + remaining.count[axis];

            if lo > rem_lo {
                let mut before = remaining.clone();
                before.count[axis] = lo - rem_lo;
                pieces.push(before);
            }
            if hi < rem_hi {
                let mut after = remaining.clone();
                after.start[axis] = hi;
                after.count[axis] = rem_hi - hi;
                pieces.push(after);
            }

            remaining.start[axis] = lo;
            remaining.count[axis] = hi - lo;
        }
        Ok(pieces)
    }

    /// Canonical cache key text, e.g. `0,0|10,10`
    #[must_use]
    pub fn to_key_string(&self) -> String {
        self.to_string()
    }
}

fn write_values(f: &mut fmt::Formatter<'_>, values: &[u64]) -> fmt::Result {
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            write!(f, "{KEY_VALUE_SEPARATOR}")?;
        }
        write!(f, "{v}")?;
    }
    Ok(())
}

impl fmt::Display for QueryBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_values(f, &self.start)?;
        write!(f, "{KEY_SECTION_SEPARATOR}")?;
        write_values(f, &self.count)
    }
}

fn parse_values(key: &str, section: &str) -> Result<Vec<u64>> {
    section
        .split(KEY_VALUE_SEPARATOR)
        .map(|v| {
            v.parse::<u64>()
                .map_err(|e| Error::invalid_key(key, format!("'{v}' is not an offset: {e}")))
        })
        .collect()
}

impl FromStr for QueryBox {
    type Err = Error;

    fn from_str(key: &str) -> Result<Self> {
        let (start, count) = key.split_once(KEY_SECTION_SEPARATOR).ok_or_else(|| {
            Error::invalid_key(key, format!("missing '{KEY_SECTION_SEPARATOR}' separator"))
        })?;
        let start = parse_values(key, start)?;
        let count = parse_values(key, count)?;
        QueryBox::new(start, count).map_err(|e| Error::invalid_key(key, e.to_string()))
    }
}

#[cfg(test)]
mod tests;
