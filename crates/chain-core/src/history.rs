use crate::block::Block;
use std::collections::HashMap;

/// Dense `height -> Block` mapping from 0 to `latest_height`.
#[derive(Debug, Clone, Default)]
pub struct BlockHistory {
    blocks: HashMap<u64, Block>,
}

impl BlockHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, height: u64) -> Option<&Block> {
        self.blocks.get(&height)
    }

    pub fn latest(&self) -> Option<&Block> {
        let max_height = self.blocks.keys().max()?;
        self.blocks.get(max_height)
    }

    pub fn append(&mut self, block: Block) {
        self.blocks.insert(block.header.height, block);
    }

    pub fn range(&self, start: u64, limit: usize) -> Vec<&Block> {
        (start..start + limit as u64)
            .filter_map(|h| self.blocks.get(&h))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
