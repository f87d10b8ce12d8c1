/// Generation counter that tells stale engine callbacks apart from live ones.
///
/// A callback captures [`RunGuard::generation`] before the engine is invoked and
/// may only touch batch state if [`RunGuard::is_current`] still holds when it
/// fires. Stopping or resetting a batch calls [`RunGuard::invalidate`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunGuard {
    generation: u64,
}

impl RunGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Bumps the generation, orphaning every outstanding callback.
    pub fn invalidate(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    pub fn is_current(&self, captured: u64) -> bool {
        self.generation == captured
    }
}
