use crate::trials::trial_seed;

/// Hands out per-trial seeds.
///
/// With a fixed base seed the sequence depends only on the trial's position
/// since the last restart, so a run can be replayed. Without one every batch
/// draws a fresh base from OS entropy.
#[derive(Debug, Clone)]
pub(crate) struct BatchSeeder {
    fixed_base: Option<u64>,
    next_index: u64,
}

impl BatchSeeder {
    pub(crate) const fn new(fixed_base: Option<u64>) -> Self {
        Self { fixed_base, next_index: 0 }
    }

    pub(crate) fn restart(&mut self) {
        self.next_index = 0;
    }

    pub(crate) fn next_batch(&mut self, size: usize) -> Vec<u64> {
        let base = self.fixed_base.unwrap_or_else(rand::random);
        let start = self.next_index;
        self.next_index += size as u64;
        (start..self.next_index).map(|i| trial_seed(base, i)).collect()
    }
}
