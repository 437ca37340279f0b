use rand::distributions::{WeightedError, WeightedIndex};
use rand::prelude::*;

pub trait Weighted<S> {
    fn s(&self) -> S;

    fn p(&self) -> f64;
}

impl<'a> Weighted<&'a str> for (&'a str, f64) {
    fn s(&self) -> &'a str {
        self.0
    }

    fn p(&self) -> f64 {
        self.1
    }
}

/// Draws one item with probability proportional to its weight.
pub fn pick_next<T, S, R>(rng: &mut R, ts: &[T]) -> Result<S, WeightedError>
where
    T: Weighted<S>,
    R: Rng + ?Sized,
{
    let dist = WeightedIndex::new(ts.iter().map(|item| item.p()))?;
    Ok(ts[dist.sample(rng)].s())
}

/// Seeded source when a seed is given, entropy otherwise.
pub fn build_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
