/// Horizontal position past which a target is lost and costs a life.
pub const LEFT_BOUNDARY: f64 = -200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(u64);

impl TargetId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A falling word the player has to type.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub id: TargetId,
    pub text: String,
    pub speed: u32,
    pub y: f64,
    pub x: f64,
    pub lane: usize,
}

impl Target {
    /// Move one tick to the left.
    pub fn advance(&mut self) {
        self.x -= f64::from(self.speed);
    }

    pub fn has_expired(&self) -> bool {
        self.x < LEFT_BOUNDARY
    }

    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A target as produced by the spawner, before it is given an id.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSpec {
    pub text: String,
    pub speed: u32,
    pub y: f64,
    pub x: f64,
    pub lane: usize,
}

#[derive(Debug, Clone)]
struct Slot {
    target: Target,
    alive: bool,
}

/// The active target set.
///
/// Targets keep their insertion order and a stable id. Removing a target only
/// marks it dead, so it is safe to remove while walking the set; dead slots are
/// dropped by [`TargetArena::compact`], which the session calls once per tick.
#[derive(Debug, Clone, Default)]
pub struct TargetArena {
    slots: Vec<Slot>,
    next_id: u64,
}

impl TargetArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, spec: TargetSpec) -> TargetId {
        let id = TargetId(self.next_id);
        self.next_id += 1;
        self.slots.push(Slot {
            target: Target {
                id,
                text: spec.text,
                speed: spec.speed,
                y: spec.y,
                x: spec.x,
                lane: spec.lane,
            },
            alive: true,
        });
        id
    }

    pub fn extend<I: IntoIterator<Item = TargetSpec>>(&mut self, specs: I) -> Vec<TargetId> {
        specs.into_iter().map(|spec| self.insert(spec)).collect()
    }

    /// Live targets in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.slots.iter().filter(|s| s.alive).map(|s| &s.target)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Target> {
        self.slots
            .iter_mut()
            .filter(|s| s.alive)
            .map(|s| &mut s.target)
    }

    /// Ids of the live targets, in insertion order.
    pub fn ids(&self) -> Vec<TargetId> {
        self.iter().map(|t| t.id).collect()
    }

    pub fn get(&self, id: TargetId) -> Option<&Target> {
        self.slots
            .iter()
            .find(|s| s.alive && s.target.id == id)
            .map(|s| &s.target)
    }

    pub fn get_mut(&mut self, id: TargetId) -> Option<&mut Target> {
        self.slots
            .iter_mut()
            .find(|s| s.alive && s.target.id == id)
            .map(|s| &mut s.target)
    }

    /// Mark a target dead and hand back a copy of it.
    pub fn remove(&mut self, id: TargetId) -> Option<Target> {
        let slot = self
            .slots
            .iter_mut()
            .find(|s| s.alive && s.target.id == id)?;
        slot.alive = false;
        Some(slot.target.clone())
    }

    /// Drop dead slots.
    pub fn compact(&mut self) {
        self.slots.retain(|s| s.alive);
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.alive).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slots held, dead ones included.
    pub fn capacity_used(&self) -> usize {
        self.slots.len()
    }
}
