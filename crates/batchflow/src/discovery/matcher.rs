use glob::Pattern;

use crate::config::SlotDefinition;

/// Binds content types to engine slots.
///
/// Slots are tried in order; the first one with an accept pattern matching the
/// content type wins.
pub struct SlotMatcher {
    slots: Vec<SlotDefinition>,
    /// Compiled accept patterns, parallel to `slots`
    compiled: Vec<Vec<Pattern>>,
}

impl SlotMatcher {
    /// Builds a matcher. Patterns that fail to compile are ignored; configs
    /// loaded through the loader have already been validated.
    pub fn new(slots: Vec<SlotDefinition>) -> Self {
        let compiled = slots
            .iter()
            .map(|slot| {
                slot.accept
                    .iter()
                    .filter_map(|p| Pattern::new(&p.to_ascii_lowercase()).ok())
                    .collect()
            })
            .collect();

        Self { slots, compiled }
    }

    pub fn match_to_slot(&self, content_type: &str) -> Option<&SlotDefinition> {
        let content_type = content_type.to_ascii_lowercase();
        self.slots
            .iter()
            .zip(&self.compiled)
            .find(|(_, patterns)| patterns.iter().any(|p| p.matches(&content_type)))
            .map(|(slot, _)| slot)
    }
}
