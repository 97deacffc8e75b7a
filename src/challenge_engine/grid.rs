use rand::Rng;
use crate::challenge_engine::{
    models::{Category, Cell},
    pool::PoolSampler,
};

/// Uniformly random set of `target_count` positions out of `grid_size`.
///
/// Fisher-Yates over all positions, then take the prefix.
pub fn target_positions<R: Rng>(rng: &mut R, grid_size: usize, target_count: usize) -> Vec<bool> {
    assert!(target_count <= grid_size, "target_count {target_count} exceeds grid size {grid_size}");

    let mut positions: Vec<usize> = (0..grid_size).collect();
    for i in (1..positions.len()).rev() {
        let j = rng.gen_range(0..=i);
        positions.swap(i, j);
    }

    let mut is_target = vec![false; grid_size];
    for &p in &positions[..target_count] {
        is_target[p] = true;
    }
    is_target
}

/// Build a fresh grid. Each cell's content is drawn independently from the
/// pool matching its category.
pub fn generate<R: Rng>(
    rng: &mut R,
    sampler: &mut PoolSampler,
    grid_size: usize,
    target_count: usize,
) -> Vec<Cell> {
    target_positions(rng, grid_size, target_count)
        .into_iter()
        .map(|is_target| {
            let category = if is_target { Category::Target } else { Category::Decoy };
            Cell::new(sampler.draw(rng, category))
        })
        .collect()
}
