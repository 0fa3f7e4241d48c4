//! Ordered chain of inline rules.

use super::state::InlineState;

/// One inline grammar rule.
///
/// `parse` attempts a match at `state.pos`. On a match it returns `true`
/// and must have advanced `state.pos`; on no match it returns `false` and
/// leaves `state.pos` where it was. In `silent` mode the rule only
/// validates and must not push tokens.
pub trait InlineRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn parse(&self, state: &mut InlineState<'_>, silent: bool) -> bool;
}

/// Rules in priority order.
#[derive(Default)]
pub struct Ruler {
    rules: Vec<Box<dyn InlineRule>>,
}

impl Ruler {
    pub fn push<R: InlineRule + 'static>(&mut self, rule: R) {
        self.rules.push(Box::new(rule));
    }

    /// Insert `rule` right after the rule named `after`, or at the end if
    /// there is no such rule.
    pub fn insert_after<R: InlineRule + 'static>(&mut self, after: &str, rule: R) {
        let index = self
            .rules
            .iter()
            .position(|existing| existing.name() == after)
            .map_or(self.rules.len(), |index| index + 1);
        self.rules.insert(index, Box::new(rule));
    }

    /// Replace the rule named `name`. Returns `false` if it is not present.
    pub fn replace<R: InlineRule + 'static>(&mut self, name: &str, rule: R) -> bool {
        match self.rules.iter_mut().find(|existing| existing.name() == name) {
            Some(slot) => {
                *slot = Box::new(rule);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn InlineRule> {
        self.rules.iter().map(|rule| rule.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }
}
