use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Señal de cancelación compartida entre el coordinador y los runners.
///
/// Con plazo (`with_deadline`) el token queda cancelado también cuando pasa
/// ese instante, sin que nadie llame a `cancel`.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self { cancelled: Arc::default(),
               deadline: Some(deadline) }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// `true` si el plazo ya pasó (independiente de `cancel`).
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst) || self.is_expired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn clones_share_the_signal() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
        assert!(!other.is_expired());
    }

    #[test]
    fn past_deadline_cancels_without_signal() {
        let token = CancelToken::with_deadline(Instant::now());
        assert!(token.is_expired());
        assert!(token.is_cancelled());

        let later = CancelToken::with_deadline(Instant::now() + Duration::from_secs(60));
        assert!(!later.is_cancelled());
        later.clone().cancel();
        assert!(later.is_cancelled());
        assert!(!later.is_expired());
    }
}
