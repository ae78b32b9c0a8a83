//! Tool subset selection
//!
//! Programs mostly use a handful of tools, occasionally many. Sizes 2-4 carry
//! ten times the weight of each size from 5 through 20.

use crate::tool_library::ToolCatalog;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::index;
use rand::Rng;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

pub const MIN_SELECTION: usize = 2;
pub const MAX_SELECTION: usize = 20;
const COMMON_SIZES: [usize; 3] = [2, 3, 4];
const COMMON_WEIGHT: u32 = 10;

#[derive(Error, Debug, PartialEq)]
pub enum SelectionError {
    #[error("tool catalog is empty, nothing to select from")]
    InsufficientCatalog,
}

/// Weight of one subset size in the size distribution
pub fn size_weight(size: usize) -> u32 {
    if COMMON_SIZES.contains(&size) {
        COMMON_WEIGHT
    } else {
        1
    }
}

/// Weighted distribution over subset sizes; index `i` is size `MIN_SELECTION + i`
fn size_distribution() -> &'static WeightedIndex<u32> {
    static SIZES: OnceLock<WeightedIndex<u32>> = OnceLock::new();
    SIZES.get_or_init(|| {
        WeightedIndex::new((MIN_SELECTION..=MAX_SELECTION).map(size_weight))
            .expect("size weights are positive constants")
    })
}

/// Draw a subset size from 2..=20 before clamping to the catalog
pub fn sample_size<R: Rng + ?Sized>(rng: &mut R) -> usize {
    MIN_SELECTION + size_distribution().sample(rng)
}

pub struct ToolSelector;

impl ToolSelector {
    /// Pick a random subset of the catalog, without replacement.
    ///
    /// The subset size is drawn from the weighted size distribution and
    /// clamped to the catalog size. Codes are sampled from the catalog in
    /// code order, so a fixed seed reproduces the same subset.
    pub fn select<R: Rng + ?Sized>(
        catalog: &ToolCatalog,
        rng: &mut R,
    ) -> Result<ToolCatalog, SelectionError> {
        if catalog.is_empty() {
            return Err(SelectionError::InsufficientCatalog);
        }

        let drawn = sample_size(rng);
        let count = drawn.min(catalog.len());
        let tools: Vec<_> = catalog.iter().collect();

        let selected: ToolCatalog = index::sample(rng, tools.len(), count)
            .into_iter()
            .map(|i| tools[i].clone())
            .collect();

        debug!(
            drawn,
            selected = selected.len(),
            catalog = catalog.len(),
            "selected tools"
        );
        Ok(selected)
    }
}
