//! Authoritative store of live world objects
//!
//! Objects are partitioned the way they are looked up: characters in one
//! table, items and plain objects in another. Ids are unique within a
//! partition only. Terrain is never stored.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{Category, Cell};
use crate::world::objects::WorldObject;

/// Registry table an object lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    Characters,
    Objects,
}

impl Partition {
    pub fn of(category: Category) -> Option<Partition> {
        match category {
            Category::Character => Some(Partition::Characters),
            Category::Item | Category::Object => Some(Partition::Objects),
            Category::Terrain => None,
        }
    }

    /// Prefix for generated ids
    pub fn id_prefix(self) -> &'static str {
        match self {
            Partition::Characters => "character",
            Partition::Objects => "object",
        }
    }
}

/// Address of a registered object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectKey {
    pub partition: Partition,
    pub id: String,
}

impl ObjectKey {
    pub fn new(partition: Partition, id: impl Into<String>) -> Self {
        Self {
            partition,
            id: id.into(),
        }
    }

    pub fn character(id: impl Into<String>) -> Self {
        Self::new(Partition::Characters, id)
    }

    pub fn object(id: impl Into<String>) -> Self {
        Self::new(Partition::Objects, id)
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.partition.id_prefix(), self.id)
    }
}

/// Result of [`ObjectRegistry::insert`]
#[derive(Debug)]
pub enum Insertion {
    Added(ObjectKey),
    /// An object with the same id was displaced
    Replaced(ObjectKey, WorldObject),
    /// Terrain is not stored
    Rejected(WorldObject),
}

/// Storage for all non-terrain objects
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    characters: AHashMap<String, WorldObject>,
    objects: AHashMap<String, WorldObject>,
    generated: AHashMap<Partition, usize>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, partition: Partition) -> &AHashMap<String, WorldObject> {
        match partition {
            Partition::Characters => &self.characters,
            Partition::Objects => &self.objects,
        }
    }

    fn table_mut(&mut self, partition: Partition) -> &mut AHashMap<String, WorldObject> {
        match partition {
            Partition::Characters => &mut self.characters,
            Partition::Objects => &mut self.objects,
        }
    }

    /// Next free `<prefix>-<n>` id for a partition
    pub fn generate_id(&mut self, partition: Partition) -> String {
        loop {
            let counter = self.generated.entry(partition).or_insert(0);
            *counter += 1;
            let id = format!("{}-{}", partition.id_prefix(), counter);
            if !self.table(partition).contains_key(&id) {
                return id;
            }
        }
    }

    /// Store an object under its id
    ///
    /// An empty id is replaced with a generated one.
    pub fn insert(&mut self, mut object: WorldObject) -> Insertion {
        let Some(partition) = Partition::of(object.category) else {
            return Insertion::Rejected(object);
        };
        if object.id.is_empty() {
            object.id = self.generate_id(partition);
        }
        let key = ObjectKey::new(partition, object.id.clone());
        match self.table_mut(partition).insert(object.id.clone(), object) {
            Some(previous) => Insertion::Replaced(key, previous),
            None => Insertion::Added(key),
        }
    }

    pub fn get(&self, key: &ObjectKey) -> Option<&WorldObject> {
        self.table(key.partition).get(&key.id)
    }

    pub fn get_mut(&mut self, key: &ObjectKey) -> Option<&mut WorldObject> {
        self.table_mut(key.partition).get_mut(&key.id)
    }

    pub fn remove(&mut self, key: &ObjectKey) -> Option<WorldObject> {
        self.table_mut(key.partition).remove(&key.id)
    }

    pub fn contains(&self, key: &ObjectKey) -> bool {
        self.table(key.partition).contains_key(&key.id)
    }

    /// Look an id up in objects first, then characters
    pub fn find_by_id(&self, id: &str) -> Option<(ObjectKey, &WorldObject)> {
        [Partition::Objects, Partition::Characters]
            .into_iter()
            .find_map(|p| self.table(p).get(id).map(|o| (ObjectKey::new(p, id), o)))
    }

    /// Object whose footprint covers `cell`, objects before characters
    pub fn object_at(&self, cell: Cell) -> Option<(ObjectKey, &WorldObject)> {
        [Partition::Objects, Partition::Characters]
            .into_iter()
            .find_map(|p| {
                self.table(p)
                    .values()
                    .find(|o| o.covers(cell))
                    .map(|o| (ObjectKey::new(p, o.id.clone()), o))
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorldObject> {
        self.characters.values().chain(self.objects.values())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut WorldObject> {
        self.characters.values_mut().chain(self.objects.values_mut())
    }

    pub fn iter_partition(&self, partition: Partition) -> impl Iterator<Item = &WorldObject> {
        self.table(partition).values()
    }

    pub fn iter_partition_mut(
        &mut self,
        partition: Partition,
    ) -> impl Iterator<Item = &mut WorldObject> {
        self.table_mut(partition).values_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = ObjectKey> + '_ {
        self.characters
            .keys()
            .map(|id| ObjectKey::character(id.clone()))
            .chain(self.objects.keys().map(|id| ObjectKey::object(id.clone())))
    }

    /// Drop every object
    pub fn clear(&mut self) {
        self.characters.clear();
        self.objects.clear();
        self.generated.clear();
    }

    pub fn len(&self) -> usize {
        self.characters.len() + self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty() && self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::GridSize;
    use crate::world::model::ModelDescriptor;
    use std::sync::Arc;

    fn object(id: &str, kind: Category, pos: Cell) -> WorldObject {
        let model = Arc::new(ModelDescriptor::new("m", kind, GridSize::new(2, 2), true));
        WorldObject::new(id, model, pos)
    }

    #[test]
    fn test_insert_and_get() {
        let mut registry = ObjectRegistry::new();
        let inserted = registry.insert(object("npc-1", Category::Character, Cell::new(1, 1)));

        let Insertion::Added(key) = inserted else {
            panic!("expected Added");
        };
        assert_eq!(key, ObjectKey::character("npc-1"));
        assert!(registry.get(&key).is_some());
        assert!(registry.get(&ObjectKey::object("npc-1")).is_none());
    }

    #[test]
    fn test_items_share_object_partition() {
        let mut registry = ObjectRegistry::new();
        registry.insert(object("potion", Category::Item, Cell::new(0, 0)));
        assert!(registry.contains(&ObjectKey::object("potion")));
    }

    #[test]
    fn test_cross_partition_ids_may_collide() {
        let mut registry = ObjectRegistry::new();
        registry.insert(object("twin", Category::Character, Cell::new(0, 0)));
        let second = registry.insert(object("twin", Category::Object, Cell::new(5, 5)));

        assert!(matches!(second, Insertion::Added(_)));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_same_partition_id_replaces() {
        let mut registry = ObjectRegistry::new();
        registry.insert(object("box", Category::Object, Cell::new(0, 0)));
        let second = registry.insert(object("box", Category::Object, Cell::new(5, 5)));

        let Insertion::Replaced(_, previous) = second else {
            panic!("expected Replaced");
        };
        assert_eq!(previous.position, Cell::new(0, 0));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_terrain_is_rejected() {
        let mut registry = ObjectRegistry::new();
        let result = registry.insert(object("grass", Category::Terrain, Cell::new(0, 0)));
        assert!(matches!(result, Insertion::Rejected(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_generated_ids_skip_taken() {
        let mut registry = ObjectRegistry::new();
        registry.insert(object("object-1", Category::Object, Cell::new(0, 0)));

        let inserted = registry.insert(object("", Category::Object, Cell::new(3, 3)));
        let Insertion::Added(key) = inserted else {
            panic!("expected Added");
        };
        assert_eq!(key.id, "object-2");

        assert_eq!(registry.generate_id(Partition::Characters), "character-1");
    }

    #[test]
    fn test_object_at_covers_footprint() {
        let mut registry = ObjectRegistry::new();
        registry.insert(object("house", Category::Object, Cell::new(4, 4)));

        let (key, found) = registry.object_at(Cell::new(5, 5)).unwrap();
        assert_eq!(key, ObjectKey::object("house"));
        assert_eq!(found.id, "house");
        assert!(registry.object_at(Cell::new(6, 4)).is_none());
    }

    #[test]
    fn test_remove_unknown_is_none() {
        let mut registry = ObjectRegistry::new();
        registry.insert(object("npc-2", Category::Character, Cell::new(0, 0)));

        assert!(registry.remove(&ObjectKey::character("npc-1")).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_find_by_id_prefers_objects() {
        let mut registry = ObjectRegistry::new();
        registry.insert(object("twin", Category::Character, Cell::new(0, 0)));
        registry.insert(object("twin", Category::Object, Cell::new(5, 5)));

        let (key, _) = registry.find_by_id("twin").unwrap();
        assert_eq!(key.partition, Partition::Objects);
    }
}
