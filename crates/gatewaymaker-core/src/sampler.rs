//! Seeded sampling without replacement.
//!
//! One `Sampler` owns the random stream of a whole generation run and is
//! passed by `&mut` to each set in turn. The same seed reproduces the same
//! draws.

use rand::seq::index;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::AssemblyError;
use crate::model::Question;
use crate::pool::SetPool;

/// A drawn question, tagged with where it came from.
#[derive(Debug, Clone, Copy)]
pub struct SampledQuestion<'a> {
    pub question: &'a Question,
    /// Index of the drawing set in the configuration.
    pub set_index: usize,
    /// Index of the origin file within that set.
    pub file_index: usize,
}

/// The per-run random stream.
pub struct Sampler {
    rng: ChaCha8Rng,
    seed: u64,
}

impl Sampler {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed a fresh stream from OS entropy.
    pub fn from_entropy() -> Self {
        Self::from_seed(rand::random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Fail if `pool` cannot satisfy its set's draw count.
    pub fn check(pool: &SetPool<'_>) -> Result<(), AssemblyError> {
        let requested = pool.set.draw_count;
        if requested > pool.len() {
            return Err(AssemblyError::InsufficientQuestions {
                set: pool.name().to_string(),
                requested,
                available: pool.len(),
            });
        }
        Ok(())
    }

    /// Draw the set's `draw_count` questions uniformly without replacement.
    ///
    /// The returned order is the draw order, not pool order.
    pub fn draw<'a>(
        &mut self,
        set_index: usize,
        pool: &SetPool<'a>,
    ) -> Result<Vec<SampledQuestion<'a>>, AssemblyError> {
        Self::check(pool)?;

        let amount = pool.set.draw_count;
        if amount == 0 {
            tracing::debug!("set '{}' draws nothing, skipping", pool.name());
            return Ok(Vec::new());
        }

        let picks = index::sample(&mut self.rng, pool.len(), amount)
            .into_iter()
            .map(|i| {
                let entry = pool.entries[i];
                SampledQuestion {
                    question: entry.question,
                    set_index,
                    file_index: entry.file_index,
                }
            })
            .collect();

        Ok(picks)
    }
}
