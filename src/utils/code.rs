use std::future::Future;
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};

use rand::{thread_rng, Rng};

use crate::error::{Error, Result};

pub const CODE_MIN: u32 = 100_000;
pub const CODE_MAX: u32 = 999_999;

/// Where candidate survey codes come from.
pub trait CodeSource: Send + Sync {
    fn next_code(&self) -> u32;
}

/// Uniform draws from `[CODE_MIN, CODE_MAX]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSource;

impl CodeSource for ThreadRngSource {
    fn next_code(&self) -> u32 {
        thread_rng().gen_range(CODE_MIN..=CODE_MAX)
    }
}

/// Replays a fixed list of codes, wrapping around at the end.
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct SequenceSource {
    codes: Vec<u32>,
    cursor: AtomicUsize,
}

#[cfg(test)]
impl SequenceSource {
    pub(crate) fn new(codes: Vec<u32>) -> Self {
        assert!(!codes.is_empty(), "sequence source needs at least one code");
        Self {
            codes,
            cursor: AtomicUsize::new(0),
        }
    }
}

#[cfg(test)]
impl CodeSource for SequenceSource {
    fn next_code(&self) -> u32 {
        let idx = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.codes[idx % self.codes.len()]
    }
}

/// Draws codes until `exists` reports one as free. Gives up with
/// `CodeSpaceExhausted` after `max_attempts` taken candidates.
///
/// Nothing is reserved here: the caller still has to insert the survey under
/// a uniqueness constraint and come back on conflict.
pub async fn generate_unique_code<S, F, Fut>(
    source: &S,
    max_attempts: u32,
    mut exists: F,
) -> Result<String>
where
    S: CodeSource + ?Sized,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    for attempt in 1..=max_attempts.max(1) {
        let candidate = source.next_code().to_string();
        if !exists(candidate.clone()).await? {
            return Ok(candidate);
        }
        tracing::warn!(attempt, code = %candidate, "survey code already taken, drawing again");
    }
    Err(Error::CodeSpaceExhausted(max_attempts))
}

/// Shape a student-entered code must have: 4 to 6 ASCII digits.
pub fn is_valid_code(code: &str) -> bool {
    (4..=6).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_digit())
}
