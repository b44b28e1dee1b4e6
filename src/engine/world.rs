//! World orchestration
//!
//! The world owns the object registry, the occupancy map, the path strategy
//! and the presentation sink. Every mutation goes through it so the
//! occupancy map and the sink stay in step with the registry.
//!
//! Steady-state operations never fail: unknown ids and missing models are a
//! normal negative result (`false` / `None` / empty), out-of-range positions
//! are clamped. Only construction can return an error.

use ahash::{AHashMap, AHashSet};
use uuid::Uuid;

use crate::compositing::pipeline::{CompositeSummary, CompositingPipeline};
use crate::compositing::sink::PresentationSink;
use crate::core::config::EngineConfig;
use crate::core::error::{EngineError, Result};
use crate::core::types::{Category, Cell, GridSize, LifecycleState};
use crate::engine::hooks::{Action, ActionEvent, HookContext, HookFlow, HookRegistry};
use crate::engine::messages::MessageLog;
use crate::spatial::occupancy::OccupancyMap;
use crate::spatial::pathfinding::PathStrategy;
use crate::world::level::{LevelData, LevelObject};
use crate::world::model::ModelCatalog;
use crate::world::objects::{EventKind, ObjectEvent, WorldObject};
use crate::world::registry::{Insertion, ObjectKey, ObjectRegistry, Partition};

/// Counts from a level or batch load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadSummary {
    pub characters: usize,
    pub objects: usize,
    pub terrain: usize,
    /// Entries whose model could not be resolved
    pub skipped: usize,
    pub composite: CompositeSummary,
}

/// Whether an object contributes to the occupancy map
fn contributes(object: &WorldObject, player_id: &str) -> bool {
    object.is_blocking() && !(object.category == Category::Character && object.id == player_id)
}

fn apply_occupancy(
    occupancy: &mut OccupancyMap,
    player_id: &str,
    object: &WorldObject,
    blocking: bool,
) {
    if !contributes(object, player_id) {
        return;
    }
    if let Some(footprint) = object.footprint() {
        occupancy.mark(footprint, blocking);
    }
}

/// Assembles a [`World`] from its collaborators
pub struct WorldBuilder<S: PresentationSink> {
    config: EngineConfig,
    catalog: Option<ModelCatalog>,
    sink: Option<S>,
    pathfinder: Option<Box<dyn PathStrategy>>,
}

impl<S: PresentationSink> WorldBuilder<S> {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            catalog: None,
            sink: None,
            pathfinder: None,
        }
    }

    pub fn catalog(mut self, catalog: ModelCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn sink(mut self, sink: S) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Override the strategy selected by the config
    pub fn pathfinder(mut self, strategy: Box<dyn PathStrategy>) -> Self {
        self.pathfinder = Some(strategy);
        self
    }

    /// Validate the config and refuse to start without a sink or catalog
    pub fn build(self) -> Result<World<S>> {
        self.config.validate()?;
        let sink = self
            .sink
            .ok_or(EngineError::MissingCollaborator("presentation sink"))?;
        let catalog = self
            .catalog
            .ok_or(EngineError::MissingCollaborator("model catalog"))?;
        let config = self.config;
        let pathfinder = self
            .pathfinder
            .unwrap_or_else(|| config.path_strategy.build(config.distance_metric));

        tracing::info!(
            "World ready: {}x{} grid, {} models, {} pathfinding",
            config.world_size.x,
            config.world_size.y,
            catalog.len(),
            pathfinder.name()
        );

        Ok(World {
            occupancy: OccupancyMap::with_policy(config.occupancy_policy),
            pipeline: CompositingPipeline::new(config.tile_size),
            messages: MessageLog::new(config.message_capacity),
            registry: ObjectRegistry::new(),
            hooks: HookRegistry::new(),
            terrain_seq: 0,
            level_name: None,
            clock: 0,
            config,
            catalog,
            pathfinder,
            sink,
        })
    }
}

/// The game world
pub struct World<S: PresentationSink> {
    config: EngineConfig,
    catalog: ModelCatalog,
    registry: ObjectRegistry,
    occupancy: OccupancyMap,
    pathfinder: Box<dyn PathStrategy>,
    pipeline: CompositingPipeline,
    sink: S,
    hooks: HookRegistry,
    messages: MessageLog,
    terrain_seq: usize,
    level_name: Option<String>,
    /// Milliseconds accumulated by `tick`
    clock: u64,
}

impl<S: PresentationSink> World<S> {
    pub fn builder(config: EngineConfig) -> WorldBuilder<S> {
        WorldBuilder::new(config)
    }

    pub fn new(config: EngineConfig, catalog: ModelCatalog, sink: S) -> Result<Self> {
        WorldBuilder::new(config).catalog(catalog).sink(sink).build()
    }

    // === LOADING ===

    /// Replace the current level with `level`
    ///
    /// Objects from a previous level are taken off the presentation first.
    pub fn load_level(&mut self, level: &LevelData) -> LoadSummary {
        if !self.registry.is_empty() {
            self.unload();
        }
        if level.size.is_degenerate() {
            tracing::warn!(
                "Ignoring degenerate level size {}x{}, keeping {}x{}",
                level.size.x,
                level.size.y,
                self.config.world_size.x,
                self.config.world_size.y
            );
        } else {
            self.config.world_size = level.size;
        }
        self.level_name = level.name.clone();

        let summary = self.load_objects(&level.objects);
        tracing::info!(
            "Loaded level {}: {} characters, {} objects, {} terrain, {} skipped",
            self.level_name.as_deref().unwrap_or("<unnamed>"),
            summary.characters,
            summary.objects,
            summary.terrain,
            summary.skipped
        );
        summary
    }

    /// Register a batch of objects and present them per category group
    pub fn load_objects(&mut self, entries: &[LevelObject]) -> LoadSummary {
        let mut summary = LoadSummary::default();
        let mut characters: Vec<Uuid> = Vec::new();
        let mut objects: Vec<Uuid> = Vec::new();
        let mut terrain: Vec<WorldObject> = Vec::new();

        for entry in entries {
            let Some(object) = self.instantiate(entry) else {
                summary.skipped += 1;
                continue;
            };
            let instance = object.instance;
            match Partition::of(object.category) {
                None => terrain.push(object),
                Some(partition) => {
                    if self.register(object).is_some() {
                        match partition {
                            Partition::Characters => characters.push(instance),
                            Partition::Objects => objects.push(instance),
                        }
                    }
                }
            }
        }

        // A later entry reusing an id displaces the earlier one
        let live: AHashSet<Uuid> = self.registry.iter().map(|o| o.instance).collect();
        characters.retain(|instance| live.contains(instance));
        objects.retain(|instance| live.contains(instance));

        summary.characters = characters.len();
        summary.objects = objects.len();
        summary.terrain = terrain.len();

        summary.composite += self.composite_instances(Partition::Characters, &characters);
        summary.composite += self.composite_instances(Partition::Objects, &objects);
        if !terrain.is_empty() {
            let mut batch: Vec<&mut WorldObject> = terrain.iter_mut().collect();
            summary.composite += self.pipeline.execute(&mut self.sink, &mut batch);
        }

        summary
    }

    /// Place a single object
    ///
    /// Returns the registry key, or `None` for terrain (presented but not
    /// stored) and unknown models.
    pub fn spawn(&mut self, entry: &LevelObject) -> Option<ObjectKey> {
        let mut object = self.instantiate(entry)?;
        if object.category.is_terrain() {
            self.pipeline.execute_one(&mut self.sink, &mut object);
            return None;
        }
        let key = self.register(object)?;
        if let Some(object) = self.registry.get_mut(&key) {
            self.pipeline.execute_one(&mut self.sink, object);
        }
        Some(key)
    }

    /// Take every registered object off the presentation and clear the grid
    pub fn unload(&mut self) -> usize {
        let keys: Vec<ObjectKey> = self.registry.keys().collect();
        let mut removed: Vec<WorldObject> = keys
            .iter()
            .filter_map(|key| self.registry.remove(key))
            .collect();
        for object in removed.iter_mut() {
            object.set_state(LifecycleState::Removed);
        }
        let mut batch: Vec<&mut WorldObject> = removed.iter_mut().collect();
        self.pipeline.execute(&mut self.sink, &mut batch);

        self.registry.clear();
        self.occupancy.reset();
        tracing::debug!("Unloaded {} objects", removed.len());
        removed.len()
    }

    fn instantiate(&mut self, entry: &LevelObject) -> Option<WorldObject> {
        let Some(model) = self.catalog.get(&entry.model) else {
            tracing::warn!("Model not found: {}", entry.model);
            return None;
        };
        let id = match (&entry.id, Partition::of(model.kind)) {
            (Some(id), _) if !id.is_empty() => id.clone(),
            (_, Some(partition)) => self.registry.generate_id(partition),
            (_, None) => {
                self.terrain_seq += 1;
                format!("terrain-{}", self.terrain_seq)
            }
        };

        let mut object = WorldObject::new(id, model, entry.position)
            .with_events(entry.events.clone())
            .with_victim(entry.victim);
        object.name = entry.name.clone();
        if entry.animation.is_some() {
            object.animation = entry.animation.clone();
        }
        Some(object)
    }

    /// Insert into the registry and mark its footprint
    fn register(&mut self, object: WorldObject) -> Option<ObjectKey> {
        let key = match self.registry.insert(object) {
            Insertion::Added(key) => key,
            Insertion::Replaced(key, mut previous) => {
                tracing::debug!("Replacing {} with a new spawn", key);
                apply_occupancy(&mut self.occupancy, &self.config.player_id, &previous, false);
                // Never presented, nothing to take off the sink
                if previous.handle.is_some() {
                    previous.set_state(LifecycleState::Removed);
                    self.pipeline.execute_one(&mut self.sink, &mut previous);
                }
                key
            }
            Insertion::Rejected(_) => return None,
        };
        if let Some(object) = self.registry.get(&key) {
            apply_occupancy(&mut self.occupancy, &self.config.player_id, object, true);
        }
        Some(key)
    }

    /// Run the pipeline over freshly registered objects in load order
    fn composite_instances(&mut self, partition: Partition, instances: &[Uuid]) -> CompositeSummary {
        if instances.is_empty() {
            return CompositeSummary::default();
        }
        let order: AHashMap<Uuid, usize> = instances
            .iter()
            .enumerate()
            .map(|(index, instance)| (*instance, index))
            .collect();
        let mut batch: Vec<&mut WorldObject> = self
            .registry
            .iter_partition_mut(partition)
            .filter(|object| order.contains_key(&object.instance))
            .collect();
        batch.sort_by_key(|object| order.get(&object.instance).copied().unwrap_or(usize::MAX));
        self.pipeline.execute(&mut self.sink, &mut batch)
    }

    // === MUTATION ===

    /// Move an object, clamping the target into the world
    pub fn move_object(&mut self, key: &ObjectKey, position: Cell) -> bool {
        if !self.registry.contains(key) {
            tracing::debug!("move: unknown object {}", key);
            return false;
        }
        let target = self.config.world_size.clamp(position);
        let event = ActionEvent::new(Action::Move, target)
            .with_actor(key.clone())
            .with_subject(Some(key.clone()));
        if self.run_before(&event) == HookFlow::Cancel {
            return false;
        }

        let Some(object) = self.registry.get_mut(key) else {
            return false;
        };
        apply_occupancy(&mut self.occupancy, &self.config.player_id, object, false);
        object.position = target;
        object.set_state(LifecycleState::Dirty);
        apply_occupancy(&mut self.occupancy, &self.config.player_id, object, true);
        self.pipeline.execute_one(&mut self.sink, object);

        self.run_after(&event);
        true
    }

    /// Swap an object's model in place
    ///
    /// The new model must keep the object in the same registry partition.
    pub fn swap_model(&mut self, key: &ObjectKey, model_name: &str) -> bool {
        let Some(model) = self.catalog.get(model_name) else {
            tracing::debug!("swap_model: model not found: {}", model_name);
            return false;
        };
        if Partition::of(model.kind) != Some(key.partition) {
            tracing::debug!("swap_model: {} cannot move {} across partitions", model_name, key);
            return false;
        }
        let Some(object) = self.registry.get_mut(key) else {
            tracing::debug!("swap_model: unknown object {}", key);
            return false;
        };

        apply_occupancy(&mut self.occupancy, &self.config.player_id, object, false);
        object.category = model.kind;
        object.animation = model.default_animation.clone();
        object.animation_clock = 0;
        object.frame = 1;
        object.model = Some(model);
        object.set_state(LifecycleState::Dirty);
        apply_occupancy(&mut self.occupancy, &self.config.player_id, object, true);
        self.pipeline.execute_one(&mut self.sink, object);
        true
    }

    /// Re-present an object without changing it
    pub fn update_object(&mut self, key: &ObjectKey) -> bool {
        let Some(object) = self.registry.get_mut(key) else {
            tracing::debug!("update: unknown object {}", key);
            return false;
        };
        object.set_state(LifecycleState::Dirty);
        self.pipeline.execute_one(&mut self.sink, object);
        true
    }

    /// Start an animation defined on the object's model
    pub fn play_animation(&mut self, key: &ObjectKey, animation: &str) -> bool {
        let Some(object) = self.registry.get_mut(key) else {
            return false;
        };
        let known = object
            .model
            .as_ref()
            .is_some_and(|m| m.animations.contains_key(animation));
        if !known {
            tracing::debug!("play_animation: {} has no animation {}", key, animation);
            return false;
        }
        object.animation = Some(animation.to_string());
        object.animation_clock = 0;
        object.frame = 1;
        object.set_state(LifecycleState::Dirty);
        self.pipeline.execute_one(&mut self.sink, object);
        true
    }

    /// Delete an object, clearing its footprint and presentation
    pub fn remove_object(&mut self, key: &ObjectKey) -> bool {
        let Some(position) = self.registry.get(key).map(|o| o.position) else {
            tracing::debug!("remove: unknown object {}", key);
            return false;
        };
        let event = ActionEvent::new(Action::Remove, position).with_subject(Some(key.clone()));
        if self.run_before(&event) == HookFlow::Cancel {
            return false;
        }

        let Some(mut object) = self.registry.remove(key) else {
            return false;
        };
        apply_occupancy(&mut self.occupancy, &self.config.player_id, &object, false);
        object.set_state(LifecycleState::Removed);
        self.pipeline.execute_one(&mut self.sink, &mut object);

        self.run_after(&event);
        true
    }

    /// Fire the object's current event if it matches `kind`
    pub fn fire_event(&mut self, key: &ObjectKey, kind: EventKind) -> Option<ObjectEvent> {
        self.registry.get_mut(key)?.fire_event(kind)
    }

    /// Advance animation clocks by `delta_ms`
    ///
    /// Returns how many objects changed frame. Finished non-repeating
    /// animations and animations missing from the model are stopped.
    /// Changed objects reach the sink as one update batch.
    pub fn tick(&mut self, delta_ms: u64) -> usize {
        self.clock += delta_ms;
        let mut changed: Vec<&mut WorldObject> = Vec::new();
        for object in self.registry.iter_mut() {
            let elapsed = object.animation_clock + delta_ms;
            let frame = match (&object.model, &object.animation) {
                (Some(model), Some(name)) => model.animations.get(name).map(|a| a.frame_at(elapsed)),
                _ => continue,
            };
            match frame {
                Some(Some(frame)) => {
                    object.animation_clock = elapsed;
                    if frame != object.frame {
                        object.frame = frame;
                        object.set_state(LifecycleState::Dirty);
                        changed.push(object);
                    }
                }
                _ => {
                    object.animation = None;
                    object.animation_clock = 0;
                    object.frame = 1;
                    object.set_state(LifecycleState::Dirty);
                    changed.push(object);
                }
            }
        }
        let count = changed.len();
        if count > 0 {
            self.pipeline.execute(&mut self.sink, &mut changed);
        }
        count
    }

    // === HOOKS ===

    pub fn hooks_mut(&mut self) -> &mut HookRegistry {
        &mut self.hooks
    }

    pub(crate) fn run_before(&mut self, event: &ActionEvent) -> HookFlow {
        let mut ctx = HookContext {
            registry: &self.registry,
            messages: &mut self.messages,
        };
        self.hooks.run_before(event, &mut ctx)
    }

    pub(crate) fn run_after(&mut self, event: &ActionEvent) {
        let mut ctx = HookContext {
            registry: &self.registry,
            messages: &mut self.messages,
        };
        self.hooks.run_after(event, &mut ctx);
    }

    // === QUERIES ===

    /// Path between two cells through the configured strategy
    pub fn find_path(&self, start: Cell, goal: Cell) -> Vec<Cell> {
        self.pathfinder
            .find_path(start, goal, &self.occupancy, self.config.world_size)
    }

    /// Path from an object's position to `goal`
    pub fn path_for(&self, key: &ObjectKey, goal: Cell) -> Vec<Cell> {
        match self.registry.get(key) {
            Some(object) => self.find_path(object.position, goal),
            None => Vec::new(),
        }
    }

    pub fn is_blocked(&self, cell: Cell) -> bool {
        self.occupancy.is_blocked(cell)
    }

    pub fn object(&self, key: &ObjectKey) -> Option<&WorldObject> {
        self.registry.get(key)
    }

    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    pub fn occupancy(&self) -> &OccupancyMap {
        &self.occupancy
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn world_size(&self) -> GridSize {
        self.config.world_size
    }

    pub fn player_key(&self) -> ObjectKey {
        ObjectKey::character(self.config.player_id.clone())
    }

    pub fn level_name(&self) -> Option<&str> {
        self.level_name.as_deref()
    }

    pub fn clock(&self) -> u64 {
        self.clock
    }

    pub fn pathfinder_name(&self) -> &'static str {
        self.pathfinder.name()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    pub fn messages_mut(&mut self) -> &mut MessageLog {
        &mut self.messages
    }
}
