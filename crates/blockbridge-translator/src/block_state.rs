//! Block state lookups needed by translators.

use std::collections::HashSet;

/// Block state facts gathered while loading the block palette.
#[derive(Debug, Clone, Default)]
pub struct BlockStateValues {
    horizontal_facing_jigsaws: HashSet<i32>,
}

impl BlockStateValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the Java states of jigsaw blocks facing north, east, south or
    /// west.
    pub fn with_horizontal_facing_jigsaws(mut self, states: impl IntoIterator<Item = i32>) -> Self {
        self.horizontal_facing_jigsaws.extend(states);
        self
    }

    pub fn is_horizontal_facing_jigsaw(&self, block_state: i32) -> bool {
        self.horizontal_facing_jigsaws.contains(&block_state)
    }

    pub fn horizontal_facing_jigsaws(&self) -> &HashSet<i32> {
        &self.horizontal_facing_jigsaws
    }
}
