//! Level layouts and the live entity registry built from them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::ability::Ability;
use crate::obstacles::{
    Fountain, FountainId, GoalDoor, MoonShard, Obstacle, ObstacleId, ObstacleKind, Patrol,
    RockState, ShardId, SpikeDirection,
};
use crate::world::{BodyDef, BodyId, BodyKind, BodySet, FixtureDef, FixtureTag, World};

const FOUNTAIN_HALF_EXTENTS: Vec2 = Vec2::new(0.5, 0.75);
const SHARD_HALF_EXTENTS: Vec2 = Vec2::new(0.3, 0.3);
const GOAL_HALF_EXTENTS: Vec2 = Vec2::new(0.6, 1.0);
/// Respawn offset above a restore fountain.
const CHECKPOINT_LIFT: f32 = 0.5;

/// Platform variants as written in level files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformStyle {
    #[default]
    Regular,
    Cloud,
    Spiked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonsterStyle {
    #[default]
    Crocodile,
    Flying,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSpec {
    pub velocity: Vec2,
    #[serde(default)]
    pub range: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformSpec {
    pub position: Vec2,
    pub size: Vec2,
    #[serde(default)]
    pub style: PlatformStyle,
    /// Only meaningful for spiked platforms.
    #[serde(default)]
    pub spikes: SpikeDirection,
    #[serde(default)]
    pub motion: Option<MotionSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterSpec {
    pub position: Vec2,
    pub size: Vec2,
    #[serde(default)]
    pub style: MonsterStyle,
    pub motion: MotionSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RockSpec {
    pub position: Vec2,
    pub size: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FountainSpec {
    pub position: Vec2,
    pub ability: Ability,
}

/// Static description of a level, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelLayout {
    pub name: String,
    pub spawn: Vec2,
    /// Falling below this height costs serenity and respawns the player.
    pub kill_plane_y: f32,
    pub platforms: Vec<PlatformSpec>,
    pub monsters: Vec<MonsterSpec>,
    pub rocks: Vec<RockSpec>,
    pub fountains: Vec<FountainSpec>,
    pub shards: Vec<Vec2>,
    pub goal: Option<Vec2>,
}

impl Default for LevelLayout {
    fn default() -> Self {
        Self {
            name: "untitled".to_string(),
            spawn: Vec2::new(0.0, 2.0),
            kill_plane_y: -20.0,
            platforms: Vec::new(),
            monsters: Vec::new(),
            rocks: Vec::new(),
            fountains: Vec::new(),
            shards: Vec::new(),
            goal: None,
        }
    }
}

impl LevelLayout {
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Live level entities and their progress state.
#[derive(Debug)]
pub struct Level {
    pub name: String,
    pub spawn: Vec2,
    pub kill_plane_y: f32,
    obstacles: Vec<Obstacle>,
    fountains: Vec<Fountain>,
    shards: Vec<MoonShard>,
    goal: Option<GoalDoor>,
    checkpoints: Vec<FountainId>,
    /// Bodies to disable once the current step is over.
    pending_removal: Vec<BodyId>,
}

impl Level {
    /// Create every level body in `world`.
    pub fn build(layout: &LevelLayout, world: &mut World) -> Self {
        let mut obstacles = Vec::new();

        for spec in &layout.platforms {
            let kind = match spec.style {
                PlatformStyle::Regular => ObstacleKind::RegularPlatform,
                PlatformStyle::Cloud => ObstacleKind::CloudPlatform,
                PlatformStyle::Spiked => ObstacleKind::SpikedPlatform {
                    direction: spec.spikes,
                },
            };
            let id = ObstacleId(obstacles.len() as u32);
            obstacles.push(spawn_mover(world, id, kind, spec.position, spec.size, spec.motion));
        }

        for spec in &layout.monsters {
            let kind = match spec.style {
                MonsterStyle::Crocodile => ObstacleKind::Crocodile,
                MonsterStyle::Flying => ObstacleKind::FlyingMonster,
            };
            let id = ObstacleId(obstacles.len() as u32);
            obstacles.push(spawn_mover(world, id, kind, spec.position, spec.size, Some(spec.motion)));
        }

        for spec in &layout.rocks {
            let id = ObstacleId(obstacles.len() as u32);
            let half = spec.size * 0.5;
            let body = world.create_body(
                BodyDef::new(BodyKind::Dynamic, spec.position).with_gravity_scale(0.0),
            );
            let fixture = world.add_fixture(body, FixtureDef::sensor(half, FixtureTag::Obstacle(id)));
            obstacles.push(Obstacle {
                id,
                kind: ObstacleKind::Rock(RockState {
                    origin: spec.position,
                    released: false,
                    landed: false,
                }),
                body,
                fixture,
                half_extents: half,
                patrol: None,
            });
        }

        let fountains = layout
            .fountains
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let id = FountainId(i as u32);
                let body = world.create_body(BodyDef::new(BodyKind::Static, spec.position));
                world.add_fixture(
                    body,
                    FixtureDef::sensor(FOUNTAIN_HALF_EXTENTS, FixtureTag::Fountain(id)),
                );
                Fountain {
                    id,
                    ability: spec.ability,
                    body,
                    position: spec.position,
                    available: true,
                }
            })
            .collect();

        let shards = layout
            .shards
            .iter()
            .enumerate()
            .map(|(i, &position)| {
                let id = ShardId(i as u32);
                let body = world.create_body(BodyDef::new(BodyKind::Static, position));
                world.add_fixture(body, FixtureDef::sensor(SHARD_HALF_EXTENTS, FixtureTag::Shard(id)));
                MoonShard {
                    id,
                    body,
                    position,
                    claimed: false,
                }
            })
            .collect();

        let goal = layout.goal.map(|position| {
            let body = world.create_body(BodyDef::new(BodyKind::Static, position));
            world.add_fixture(body, FixtureDef::sensor(GOAL_HALF_EXTENTS, FixtureTag::Goal));
            GoalDoor { body, position }
        });

        tracing::debug!(
            level = %layout.name,
            obstacles = obstacles.len(),
            shards = layout.shards.len(),
            "Level built"
        );

        Self {
            name: layout.name.clone(),
            spawn: layout.spawn,
            kill_plane_y: layout.kill_plane_y,
            obstacles,
            fountains,
            shards,
            goal,
            checkpoints: Vec::new(),
            pending_removal: Vec::new(),
        }
    }

    pub fn obstacle(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.get(id.0 as usize)
    }

    pub fn obstacle_mut(&mut self, id: ObstacleId) -> Option<&mut Obstacle> {
        self.obstacles.get_mut(id.0 as usize)
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn fountain(&self, id: FountainId) -> Option<&Fountain> {
        self.fountains.get(id.0 as usize)
    }

    pub fn fountain_mut(&mut self, id: FountainId) -> Option<&mut Fountain> {
        self.fountains.get_mut(id.0 as usize)
    }

    pub fn fountains(&self) -> &[Fountain] {
        &self.fountains
    }

    /// Make a fountain's grant collectible again.
    pub fn return_fountain(&mut self, id: FountainId) {
        if let Some(f) = self.fountain_mut(id)
            && f.ability.is_queueable()
        {
            f.available = true;
        }
    }

    pub fn shard(&self, id: ShardId) -> Option<&MoonShard> {
        self.shards.get(id.0 as usize)
    }

    pub fn shards(&self) -> &[MoonShard] {
        &self.shards
    }

    /// Claim a shard. Returns false if it was already claimed or unknown.
    pub fn claim_shard(&mut self, id: ShardId) -> bool {
        let Some(shard) = self.shards.get_mut(id.0 as usize) else {
            return false;
        };
        if shard.claimed {
            return false;
        }
        shard.claimed = true;
        self.pending_removal.push(shard.body);
        true
    }

    pub fn shards_claimed(&self) -> usize {
        self.shards.iter().filter(|s| s.claimed).count()
    }

    pub fn all_shards_claimed(&self) -> bool {
        self.shards.iter().all(|s| s.claimed)
    }

    pub fn goal(&self) -> Option<&GoalDoor> {
        self.goal.as_ref()
    }

    pub fn record_checkpoint(&mut self, id: FountainId) {
        if !self.checkpoints.contains(&id) {
            self.checkpoints.push(id);
        }
    }

    pub fn checkpoints(&self) -> &[FountainId] {
        &self.checkpoints
    }

    /// Where the player reappears after falling out of the level.
    pub fn respawn_point(&self) -> Vec2 {
        self.checkpoints
            .last()
            .and_then(|&id| self.fountain(id))
            .map(|f| f.position + Vec2::new(0.0, CHECKPOINT_LIFT))
            .unwrap_or(self.spawn)
    }

    /// Steer patrolling obstacles for the coming step.
    pub fn update_motion(&self, bodies: &mut BodySet) {
        for obstacle in &self.obstacles {
            if let Some(patrol) = &obstacle.patrol {
                let position = bodies.position(obstacle.body);
                let current = bodies.velocity(obstacle.body);
                bodies.set_velocity(obstacle.body, patrol.next_velocity(position, current));
            }
        }
    }

    /// Drop any hanging rock the player is underneath.
    pub fn release_rocks(&mut self, player: Vec2, trigger_distance: f32, bodies: &mut BodySet) {
        for obstacle in &mut self.obstacles {
            let body = obstacle.body;
            let Some(rock) = obstacle.rock_mut() else {
                continue;
            };
            if rock.released {
                continue;
            }
            let origin = rock.origin;
            if (player.x - origin.x).abs() <= trigger_distance && player.y < origin.y {
                rock.released = true;
                if let Some(b) = bodies.body_mut(body) {
                    b.gravity_scale = 1.0;
                }
                tracing::debug!(rock = obstacle.id.0, "Rock released");
            }
        }
    }

    /// Mark a rock as landed so it resets after the step.
    pub fn land_rock(&mut self, id: ObstacleId) -> bool {
        match self.obstacle_mut(id).and_then(Obstacle::rock_mut) {
            Some(rock) if rock.released && !rock.landed => {
                rock.landed = true;
                true
            },
            _ => false,
        }
    }

    /// Apply structural changes requested during the step. Returns the impact
    /// points of rocks that shattered and were reset.
    pub fn reconcile(&mut self, world: &mut World) -> Vec<Vec2> {
        for body in self.pending_removal.drain(..) {
            world.set_enabled(body, false);
        }

        let mut impacts = Vec::new();
        for obstacle in &mut self.obstacles {
            let body = obstacle.body;
            let Some(rock) = obstacle.rock_mut() else {
                continue;
            };
            if !rock.landed {
                continue;
            }
            impacts.push(world.bodies().position(body));
            rock.landed = false;
            rock.released = false;
            let origin = rock.origin;
            let bodies = world.bodies_mut();
            bodies.set_position(body, origin);
            bodies.set_velocity(body, Vec2::ZERO);
            if let Some(b) = bodies.body_mut(body) {
                b.gravity_scale = 0.0;
            }
        }
        impacts
    }
}

fn spawn_mover(
    world: &mut World,
    id: ObstacleId,
    kind: ObstacleKind,
    position: Vec2,
    size: Vec2,
    motion: Option<MotionSpec>,
) -> Obstacle {
    let half = size * 0.5;
    let patrol = motion.map(|m| Patrol {
        origin: position,
        velocity: m.velocity,
        range: m.range,
    });
    let def = match &patrol {
        Some(p) => BodyDef::new(BodyKind::Kinematic, position).with_velocity(p.velocity),
        None => BodyDef::new(BodyKind::Static, position),
    };
    let body = world.create_body(def);
    let fixture = world.add_fixture(body, FixtureDef::solid(half, FixtureTag::Obstacle(id)));
    Obstacle {
        id,
        kind,
        body,
        fixture,
        half_extents: half,
        patrol,
    }
}
