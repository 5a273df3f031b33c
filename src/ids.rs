//! Surrogate identifiers and generated names
//!
//! Every resource in the graph carries a [`ResourceId`]. Ids and the random
//! suffixes used for unnamed containers both come from an [`IdGenerator`]
//! owned by the registry, so tests can swap in [`SequentialIds`] and assert
//! exact values.

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of a generated resource id
pub const ID_LENGTH: usize = 12;

/// Length of a generated container name suffix
pub const SUFFIX_LENGTH: usize = 4;

/// Resource identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// Creates an id from a string
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the id as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Source of fresh ids and name suffixes
pub trait IdGenerator: Send {
    /// Returns an id never handed out before by this generator
    fn next_id(&mut self) -> ResourceId;

    /// Returns a short suffix for generated container names
    fn name_suffix(&mut self) -> String;
}

/// Random ids (uuid v4) and random base36 suffixes
#[derive(Debug, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> ResourceId {
        ResourceId(Uuid::new_v4().simple().to_string()[..ID_LENGTH].to_string())
    }

    fn name_suffix(&mut self) -> String {
        let mut rng = rand::thread_rng();
        (0..SUFFIX_LENGTH)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect()
    }
}

/// Deterministic counter-based ids
#[derive(Debug)]
pub struct SequentialIds {
    next: u64,
    next_suffix: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self {
            next: 1,
            next_suffix: 1,
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> ResourceId {
        let id = ResourceId(format!("{:0width$x}", self.next, width = ID_LENGTH));
        self.next += 1;
        id
    }

    fn name_suffix(&mut self) -> String {
        let suffix = to_base36(self.next_suffix, SUFFIX_LENGTH);
        self.next_suffix += 1;
        suffix
    }
}

/// Which generator a registry is built with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    #[default]
    Random,
    Sequential,
}

impl IdStrategy {
    /// Build a generator for this strategy
    pub fn generator(&self) -> Box<dyn IdGenerator> {
        match self {
            IdStrategy::Random => Box::new(RandomIds),
            IdStrategy::Sequential => Box::new(SequentialIds::new()),
        }
    }
}

/// Zero-padded lowercase base36; wraps once `width` digits are exhausted
fn to_base36(mut n: u64, width: usize) -> String {
    let mut digits = vec![b'0'; width];
    for slot in digits.iter_mut().rev() {
        *slot = BASE36[(n % 36) as usize];
        n /= 36;
    }
    String::from_utf8_lossy(&digits).into_owned()
}
