//! 规则块存储
//!
//! 按插入顺序保存规则块，以 uuid 为键。同 uuid 重新插入时整体替换并保留原位置，
//! 因此遍历顺序是确定的。本结构本身不做同步，由 [`crate::engine::RuleEngine`] 加锁访问。

use crate::models::RuleBlock;
use std::collections::HashMap;

/// 规则块存储
#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    blocks: Vec<RuleBlock>,
    /// uuid -> blocks 下标
    index: HashMap<String, usize>,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取当前存储的规则块数量
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// 插入或整体替换规则块，返回被替换的旧块
    pub fn insert(&mut self, block: RuleBlock) -> Option<RuleBlock> {
        match self.index.get(&block.uuid) {
            Some(&pos) => Some(std::mem::replace(&mut self.blocks[pos], block)),
            None => {
                self.index.insert(block.uuid.clone(), self.blocks.len());
                self.blocks.push(block);
                None
            }
        }
    }

    /// 删除规则块
    pub fn remove(&mut self, id: &str) -> Option<RuleBlock> {
        let pos = self.index.remove(id)?;
        let removed = self.blocks.remove(pos);

        for block in &self.blocks[pos..] {
            if let Some(i) = self.index.get_mut(&block.uuid) {
                *i -= 1;
            }
        }

        Some(removed)
    }

    pub fn get(&self, id: &str) -> Option<&RuleBlock> {
        self.index.get(id).map(|&pos| &self.blocks[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// 按插入顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = &RuleBlock> {
        self.blocks.iter()
    }

    pub fn ids(&self) -> Vec<String> {
        self.blocks.iter().map(|b| b.uuid.clone()).collect()
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
        self.index.clear();
    }
}
