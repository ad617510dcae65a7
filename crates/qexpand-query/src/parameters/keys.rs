//! Synthetic key suffixes for named expansion

/// Supplies suffixes for synthetic parameter keys.
///
/// A synthetic key is `{name}_{suffix}`. Suffixes must consist of word
/// characters so the key stays a valid `:name` placeholder. Uniqueness is
/// enforced by the expander, which asks again on collision.
pub trait KeySource {
    fn next_suffix(&mut self) -> String;
}

/// Random hex suffixes drawn from a v4 UUID.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomKeys;

const RANDOM_SUFFIX_LEN: usize = 12;

impl KeySource for RandomKeys {
    fn next_suffix(&mut self) -> String {
        let mut suffix = uuid::Uuid::new_v4().simple().to_string();
        suffix.truncate(RANDOM_SUFFIX_LEN);
        suffix
    }
}

/// Counting suffixes `0`, `1`, `2`, ... for reproducible output.
#[derive(Debug, Default, Clone)]
pub struct SequentialKeys {
    next: u64,
}

impl SequentialKeys {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeySource for SequentialKeys {
    fn next_suffix(&mut self) -> String {
        let suffix = self.next.to_string();
        self.next += 1;
        suffix
    }
}
