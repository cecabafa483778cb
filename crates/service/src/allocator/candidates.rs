use rand::Rng;

/// Source of candidate identifiers.
pub trait CandidateSource: Send + Sync {
    fn next_candidate(&self) -> u32;

    /// Inclusive bounds of the values this source draws from.
    fn bounds(&self) -> (u32, u32);
}

/// Uniform random draw over `min..=max`.
#[derive(Debug, Clone, Copy)]
pub struct RandomCandidates {
    min: u32,
    max: u32,
}

impl RandomCandidates {
    pub fn new(min: u32, max: u32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self { min, max }
    }
}

impl CandidateSource for RandomCandidates {
    fn next_candidate(&self) -> u32 {
        rand::thread_rng().gen_range(self.min..=self.max)
    }

    fn bounds(&self) -> (u32, u32) { (self.min, self.max) }
}

/// Replays a fixed script of candidates, wrapping around at the end.
#[cfg(test)]
pub(crate) struct ScriptedCandidates {
    script: Vec<u32>,
    next: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl ScriptedCandidates {
    pub(crate) fn new(script: Vec<u32>) -> Self {
        assert!(!script.is_empty(), "script must not be empty");
        Self { script, next: std::sync::atomic::AtomicUsize::new(0) }
    }
}

#[cfg(test)]
impl CandidateSource for ScriptedCandidates {
    fn next_candidate(&self) -> u32 {
        let i = self.next.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.script[i % self.script.len()]
    }

    fn bounds(&self) -> (u32, u32) {
        let min = self.script.iter().copied().min().unwrap_or(0);
        let max = self.script.iter().copied().max().unwrap_or(0);
        (min, max)
    }
}
