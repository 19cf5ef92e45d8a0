use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

use crate::DEFAULT_ORDER;

/// Splits a segment at a local offset. Called as `extract(segment, start, len)`, it returns
/// `(retained, removed)` where `removed` holds the `len` items starting at `start` and `retained`
/// holds everything else.
///
/// The tree never checks the lengths of the returned segments. It trusts the caller that
/// `len(retained) + len(removed) == len(segment)`.
pub type ExtractFn<T> = fn(T, usize, usize) -> (T, T);

/// Payload types can implement this trait to supply the empty sentinel and the split callback
/// themselves, instead of passing them to [`TreeConfig::new`].
pub trait Segment: Clone {
    /// The value written into unoccupied slots. The tree never calls `extract_range` on it.
    fn empty() -> Self;

    /// Remove `len` items starting at `start`. Returns (retained, removed).
    fn extract_range(self, start: usize, len: usize) -> (Self, Self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Nodes must be allowed to hold at least one child.
    ZeroOrder,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ZeroOrder => write!(f, "ConfigError: tree order must be at least 1"),
        }
    }
}

impl Error for ConfigError {}

/// Tree-wide configuration. This is fixed when the tree is created.
#[derive(Clone)]
pub struct TreeConfig<T> {
    order: usize,
    pub(crate) empty_segment: T,
    pub(crate) extract: ExtractFn<T>,
}

impl<T> TreeConfig<T> {
    pub fn new(order: usize, empty_segment: T, extract: ExtractFn<T>) -> Result<Self, ConfigError> {
        if order == 0 { return Err(ConfigError::ZeroOrder); }

        Ok(Self { order, empty_segment, extract })
    }

    /// Every node except the root holds between `order` and `2 * order` children.
    pub fn order(&self) -> usize { self.order }

    pub fn empty_segment(&self) -> &T { &self.empty_segment }

    #[inline]
    pub(crate) fn min_size(&self) -> usize { self.order }

    #[inline]
    pub(crate) fn max_size(&self) -> usize { self.order * 2 }

    /// Interior nodes get one spare slot for a child split which hasn't been pushed up yet.
    #[inline]
    pub(crate) fn interior_capacity(&self) -> usize { self.order * 2 + 1 }

    /// Leaves get two spare slots, because inserting into the middle of a segment adds two
    /// slots at once.
    #[inline]
    pub(crate) fn leaf_capacity(&self) -> usize { self.order * 2 + 2 }
}

impl<T: Segment> TreeConfig<T> {
    pub fn for_segment(order: usize) -> Result<Self, ConfigError> {
        Self::new(order, T::empty(), T::extract_range)
    }
}

impl<T: Segment> Default for TreeConfig<T> {
    fn default() -> Self {
        Self {
            order: DEFAULT_ORDER,
            empty_segment: T::empty(),
            extract: T::extract_range,
        }
    }
}

impl<T: Debug> Debug for TreeConfig<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeConfig")
            .field("order", &self.order)
            .field("empty_segment", &self.empty_segment)
            .finish()
    }
}
