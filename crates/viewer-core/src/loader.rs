//! Page load bookkeeping for paged mode.
//!
//! Every `show` issues a fresh [`LoadToken`]. Issuing a token makes every
//! earlier one stale, so the success, error, and timeout callbacks of an
//! older request fall through [`LoadController::resolve`] without touching
//! the surface. Nothing is cancelled explicitly; the fetch just runs to
//! completion and is ignored.

use crate::geometry::Size;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadToken(u64);

impl LoadToken {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadRequest {
    pub token: LoadToken,
    pub page_index: usize,
    pub resolved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadOutcome {
    /// Decode finished; carries the natural image size.
    Decoded(Size),
    Failed,
    TimedOut,
}

#[derive(Debug, Default)]
pub struct LoadController {
    generation: u64,
    active: Option<LoadRequest>,
}

impl LoadController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, page_index: usize) -> LoadToken {
        self.generation += 1;
        let token = LoadToken(self.generation);
        self.active = Some(LoadRequest { token, page_index, resolved: false });
        token
    }

    /// Makes every issued token stale without starting a new request.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.active = None;
    }

    pub fn is_current(&self, token: LoadToken) -> bool {
        token.0 == self.generation
    }

    pub fn active(&self) -> Option<&LoadRequest> {
        self.active.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.active.is_some_and(|request| !request.resolved)
    }

    /// Marks the request behind `token` resolved and returns its page index.
    /// Returns `None` for stale tokens and for requests that already resolved.
    pub fn resolve(&mut self, token: LoadToken) -> Option<usize> {
        if !self.is_current(token) {
            tracing::trace!(token = token.0, current = self.generation, "dropping stale load");
            return None;
        }

        let request = self.active.as_mut()?;
        if request.resolved {
            tracing::trace!(token = token.0, "load already resolved");
            return None;
        }

        request.resolved = true;
        Some(request.page_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_token_makes_older_one_stale() {
        let mut loader = LoadController::new();

        let first = loader.begin(0);
        let second = loader.begin(3);

        assert!(!loader.is_current(first));
        assert_eq!(loader.resolve(first), None);
        assert_eq!(loader.resolve(second), Some(3));
    }

    #[test]
    fn request_resolves_only_once() {
        let mut loader = LoadController::new();
        let token = loader.begin(1);

        assert!(loader.is_pending());
        assert_eq!(loader.resolve(token), Some(1));
        assert!(!loader.is_pending());
        assert_eq!(loader.resolve(token), None);
    }

    #[test]
    fn invalidate_drops_active_request() {
        let mut loader = LoadController::new();
        let token = loader.begin(2);

        loader.invalidate();

        assert!(loader.active().is_none());
        assert_eq!(loader.resolve(token), None);
    }

    #[test]
    fn tokens_are_monotonic() {
        let mut loader = LoadController::new();
        let tokens: Vec<LoadToken> = (0..5).map(|page| loader.begin(page)).collect();

        assert!(tokens.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
