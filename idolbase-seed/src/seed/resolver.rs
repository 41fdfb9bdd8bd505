//! Natural-key to surrogate-id resolution across stages

use std::collections::HashMap;
use tracing::warn;
use uuid::Uuid;

/// Entity kinds produced by the pipeline, in dependency order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Members,
    Eras,
    Albums,
    Songs,
    MusicVideos,
}

impl EntityKind {
    /// Target table for this kind (the idempotency gate counts its rows)
    pub fn table(self) -> &'static str {
        match self {
            Self::Members => "members",
            Self::Eras => "eras",
            Self::Albums => "albums",
            Self::Songs => "songs",
            Self::MusicVideos => "music_videos",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

/// Per-run mapping from natural key (name/title string) to newly assigned
/// surrogate id, one map per entity kind. Written by earlier stages, read by
/// later ones to resolve foreign references before real foreign keys exist.
/// Owned by the pipeline for the duration of one run; never shared globally.
#[derive(Debug, Default)]
pub struct EntityResolver {
    bindings: HashMap<EntityKind, HashMap<String, Uuid>>,
}

impl EntityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a natural key to an id. Write-once per (kind, key): when the key
    /// is already bound the existing binding is kept and false is returned.
    pub fn put(&mut self, kind: EntityKind, key: &str, id: Uuid) -> bool {
        let map = self.bindings.entry(kind).or_default();
        if map.contains_key(key) {
            warn!(kind = %kind, key, "Duplicate natural key; keeping first binding");
            return false;
        }
        map.insert(key.to_string(), id);
        true
    }

    /// Resolve a natural key to the id bound earlier in this run
    pub fn get(&self, kind: EntityKind, key: &str) -> Option<Uuid> {
        self.bindings.get(&kind).and_then(|map| map.get(key)).copied()
    }

    pub fn contains(&self, kind: EntityKind, key: &str) -> bool {
        self.get(kind, key).is_some()
    }

    /// Preload bindings from rows already in the store. Used when a stage is
    /// skipped but later stages still need its natural-key -> id mappings.
    /// Existing bindings are never overwritten.
    pub fn hydrate(&mut self, kind: EntityKind, pairs: Vec<(String, Uuid)>) {
        let map = self.bindings.entry(kind).or_default();
        for (key, id) in pairs {
            map.entry(key).or_insert(id);
        }
    }

    /// Number of bindings held for a kind
    pub fn len(&self, kind: EntityKind) -> usize {
        self.bindings.get(&kind).map_or(0, HashMap::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_round_trips() {
        let mut resolver = EntityResolver::new();
        let id = Uuid::new_v4();

        assert!(resolver.put(EntityKind::Eras, "Wings Era", id));
        assert_eq!(resolver.get(EntityKind::Eras, "Wings Era"), Some(id));
        assert_eq!(resolver.get(EntityKind::Eras, "Unknown Era"), None);
    }

    #[test]
    fn kinds_are_isolated() {
        let mut resolver = EntityResolver::new();
        let id = Uuid::new_v4();
        resolver.put(EntityKind::Eras, "Wings", id);

        assert_eq!(resolver.get(EntityKind::Albums, "Wings"), None);
    }

    #[test]
    fn first_writer_wins() {
        let mut resolver = EntityResolver::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        assert!(resolver.put(EntityKind::Songs, "Spring Day", first));
        assert!(!resolver.put(EntityKind::Songs, "Spring Day", second));
        assert_eq!(resolver.get(EntityKind::Songs, "Spring Day"), Some(first));
    }

    #[test]
    fn hydrate_does_not_overwrite_run_bindings() {
        let mut resolver = EntityResolver::new();
        let run_id = Uuid::new_v4();
        let stored_id = Uuid::new_v4();

        resolver.put(EntityKind::Members, "RM", run_id);
        resolver.hydrate(
            EntityKind::Members,
            vec![("RM".to_string(), stored_id), ("Suga".to_string(), stored_id)],
        );

        assert_eq!(resolver.get(EntityKind::Members, "RM"), Some(run_id));
        assert_eq!(resolver.get(EntityKind::Members, "Suga"), Some(stored_id));
        assert_eq!(resolver.len(EntityKind::Members), 2);
    }
}
