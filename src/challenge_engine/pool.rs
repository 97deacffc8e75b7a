use std::collections::HashSet;

use rand::Rng;
use crate::challenge_engine::models::{Category, ContentItem};

/// An immutable list of opaque content ids belonging to one category.
#[derive(Debug, Clone)]
pub struct ImagePool {
    category: Category,
    items: Vec<String>,
}

impl ImagePool {
    pub fn new(category: Category, items: Vec<String>) -> Self {
        ImagePool { category, items }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }
}

/// One pool plus the indices dispensed since its last reset.
#[derive(Debug, Clone)]
struct SamplerState {
    pool: ImagePool,
    used: HashSet<usize>,
}

impl SamplerState {
    fn new(pool: ImagePool) -> Self {
        SamplerState { pool, used: HashSet::new() }
    }

    fn draw<R: Rng>(&mut self, rng: &mut R) -> ContentItem {
        assert!(!self.pool.is_empty(), "cannot draw from an empty {} pool", self.pool.category);

        // Lazy reset: the cycle is only restarted when the next draw needs it.
        if self.used.len() >= self.pool.len() {
            self.used.clear();
        }

        let free: Vec<usize> = (0..self.pool.len()).filter(|i| !self.used.contains(i)).collect();
        let index = free[rng.gen_range(0..free.len())];
        self.used.insert(index);

        ContentItem {
            category: self.pool.category,
            index,
            id: self.pool.items[index].clone(),
        }
    }
}

/// Draws content per category without repeating an item until that
/// category's pool has been fully dispensed.
#[derive(Debug, Clone)]
pub struct PoolSampler {
    target: SamplerState,
    decoy: SamplerState,
}

impl PoolSampler {
    pub fn new(target: Vec<String>, decoy: Vec<String>) -> Self {
        PoolSampler {
            target: SamplerState::new(ImagePool::new(Category::Target, target)),
            decoy: SamplerState::new(ImagePool::new(Category::Decoy, decoy)),
        }
    }

    /// Draw one item; panics if the category's pool is empty (configuration
    /// validation rules that out before a session starts).
    pub fn draw<R: Rng>(&mut self, rng: &mut R, category: Category) -> ContentItem {
        self.state_mut(category).draw(rng)
    }

    /// Forget every dispensed index in both categories.
    pub fn reset(&mut self) {
        self.target.used.clear();
        self.decoy.used.clear();
    }

    pub fn pool(&self, category: Category) -> &ImagePool {
        match category {
            Category::Target => &self.target.pool,
            Category::Decoy  => &self.decoy.pool,
        }
    }

    /// Number of indices dispensed in the current cycle of `category`.
    pub fn used_count(&self, category: Category) -> usize {
        match category {
            Category::Target => self.target.used.len(),
            Category::Decoy  => self.decoy.used.len(),
        }
    }

    fn state_mut(&mut self, category: Category) -> &mut SamplerState {
        match category {
            Category::Target => &mut self.target,
            Category::Decoy  => &mut self.decoy,
        }
    }
}
