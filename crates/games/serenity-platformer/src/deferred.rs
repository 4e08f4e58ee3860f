//! Body translations requested from inside the solver and applied at the start
//! of the next tick.

use glam::Vec2;

use crate::world::{BodyId, BodySet};

#[derive(Debug, Clone, Copy)]
struct PendingTranslation {
    generation: u64,
    target: BodyId,
    source: BodyId,
    delta: Vec2,
}

/// Queue of deferred translations.
///
/// Requests are keyed by `(target, source)` so a solver that reports the same
/// carrier contact several times in one step still moves the rider once.
/// `cancel_all` bumps the generation; anything scheduled under an older
/// generation is dropped instead of applied.
#[derive(Debug, Default)]
pub struct DeferredQueue {
    generation: u64,
    pending: Vec<PendingTranslation>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Schedule `target` to move by `delta` next tick because it rides `source`.
    pub fn schedule_carry(&mut self, generation: u64, target: BodyId, source: BodyId, delta: Vec2) {
        if let Some(existing) = self
            .pending
            .iter_mut()
            .find(|p| p.target == target && p.source == source)
        {
            existing.delta = delta;
            existing.generation = generation;
            return;
        }
        self.pending.push(PendingTranslation {
            generation,
            target,
            source,
            delta,
        });
    }

    /// Apply every current-generation request. Returns how many were applied.
    pub fn drain_into(&mut self, bodies: &mut BodySet) -> usize {
        let mut applied = 0;
        for p in self.pending.drain(..) {
            if p.generation != self.generation {
                tracing::debug!(target_body = p.target.0, "Dropping stale deferred translation");
                continue;
            }
            bodies.translate(p.target, p.delta);
            applied += 1;
        }
        applied
    }

    /// Drop everything pending and invalidate requests issued before now.
    pub fn cancel_all(&mut self) {
        self.pending.clear();
        self.generation += 1;
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{BodyDef, BodyKind, World};

    fn world_with_rider() -> (World, BodyId, BodyId) {
        let mut world = World::new(0.0);
        let rider = world.create_body(BodyDef::new(BodyKind::Dynamic, Vec2::ZERO));
        let carrier = world.create_body(BodyDef::new(BodyKind::Kinematic, Vec2::ZERO));
        (world, rider, carrier)
    }

    #[test]
    fn carry_is_applied_once_per_tick() {
        let (mut world, rider, carrier) = world_with_rider();
        let mut q = DeferredQueue::new();
        let g = q.generation();
        q.schedule_carry(g, rider, carrier, Vec2::new(0.1, 0.0));
        q.schedule_carry(g, rider, carrier, Vec2::new(0.1, 0.0));
        assert_eq!(q.len(), 1);

        assert_eq!(q.drain_into(world.bodies_mut()), 1);
        assert!((world.bodies().position(rider).x - 0.1).abs() < 1e-6);
        assert!(q.is_empty());
        assert_eq!(q.drain_into(world.bodies_mut()), 0);
    }

    #[test]
    fn distinct_carriers_both_apply() {
        let (mut world, rider, carrier) = world_with_rider();
        let other = world.create_body(BodyDef::new(BodyKind::Kinematic, Vec2::ZERO));
        let mut q = DeferredQueue::new();
        let g = q.generation();
        q.schedule_carry(g, rider, carrier, Vec2::new(0.1, 0.0));
        q.schedule_carry(g, rider, other, Vec2::new(0.0, 0.2));
        q.drain_into(world.bodies_mut());
        let pos = world.bodies().position(rider);
        assert!((pos - Vec2::new(0.1, 0.2)).length() < 1e-6);
    }

    #[test]
    fn cancel_drops_pending_work() {
        let (mut world, rider, carrier) = world_with_rider();
        let mut q = DeferredQueue::new();
        q.schedule_carry(q.generation(), rider, carrier, Vec2::ONE);
        q.cancel_all();
        assert_eq!(q.drain_into(world.bodies_mut()), 0);
        assert_eq!(world.bodies().position(rider), Vec2::ZERO);
    }

    #[test]
    fn stale_generation_is_ignored() {
        let (mut world, rider, carrier) = world_with_rider();
        let mut q = DeferredQueue::new();
        let stale = q.generation();
        q.cancel_all();
        q.schedule_carry(stale, rider, carrier, Vec2::ONE);
        assert_eq!(q.drain_into(world.bodies_mut()), 0);
        assert_eq!(world.bodies().position(rider), Vec2::ZERO);
    }
}
