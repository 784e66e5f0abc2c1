//! Grouped warning messages, keyed per destination

use std::collections::BTreeMap;

pub const NAME_COLLISION_WARNINGS: &str = "Token Name Collision Warnings";
pub const FILTERED_REFERENCE_WARNINGS: &str = "Filtered Output Reference Warnings";

/// Message store shared by the files of one platform build.
#[derive(Debug, Default)]
pub struct MessageGroups {
    groups: BTreeMap<String, Vec<String>>,
}

impl MessageGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group name for `kind` scoped to one destination.
    pub fn key(kind: &str, destination: &str) -> String {
        format!("{kind}:{destination}")
    }

    pub fn add(&mut self, group: &str, message: impl Into<String>) {
        self.groups
            .entry(group.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn fetch(&self, group: &str) -> &[String] {
        self.groups.get(group).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn count(&self, group: &str) -> usize {
        self.fetch(group).len()
    }

    pub fn clear(&mut self, group: &str) {
        self.groups.remove(group);
    }

    /// Remove and return a group's messages.
    pub fn flush(&mut self, group: &str) -> Vec<String> {
        self.groups.remove(group).unwrap_or_default()
    }
}
