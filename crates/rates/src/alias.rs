//! Alias resolution from free-text item names to canonical index keys.

use std::collections::HashMap;

/// Immutable lowercase alias -> canonical item table.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    aliases: HashMap<String, String>,
}

impl AliasTable {
    /// Build the table, lower-casing aliases and collapsing alias chains.
    ///
    /// When an alias points at another alias the chain is followed to its
    /// end, so resolving a resolved name is a no-op. Cycles keep the
    /// configured target.
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let raw: HashMap<String, String> = pairs
            .into_iter()
            .map(|(alias, item)| (alias.as_ref().trim().to_lowercase(), item.into()))
            .collect();

        let aliases = raw
            .iter()
            .map(|(alias, target)| (alias.clone(), follow_chain(&raw, alias, target)))
            .collect();

        Self { aliases }
    }

    /// Map free text to a canonical item name.
    ///
    /// # Arguments
    /// * `text` - Item phrase as typed; surrounding whitespace and case are ignored
    ///
    /// # Returns
    /// The configured canonical item, or the trimmed, lower-cased `text` when
    /// no alias matches. Feeding the result back in returns it unchanged.
    pub fn resolve(&self, text: &str) -> String {
        let key = text.trim().to_lowercase();
        match self.aliases.get(&key) {
            Some(item) => item.clone(),
            None => key,
        }
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

fn follow_chain(raw: &HashMap<String, String>, alias: &str, target: &str) -> String {
    let mut current = target.to_string();

    for _ in 0..raw.len() {
        match raw.get(&current.trim().to_lowercase()) {
            Some(next) if next != &current => current = next.clone(),
            _ => return current,
        }
    }

    tracing::warn!("Alias '{}' is part of a cycle; keeping '{}'", alias, target);
    target.to_string()
}
