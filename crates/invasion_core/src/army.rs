//! Per-faction unit containers and their selection policies.
//!
//! An [`Army`] keeps one roster per unit kind of its faction. The roster's
//! container type is chosen by the kind's [`Discipline`], and it decides
//! both who attacks next and who is handed out as a target:
//!
//! | Discipline    | Container       | Next unit                          |
//! |---------------|-----------------|------------------------------------|
//! | `Fifo`        | [`Queue`]       | longest-serving                    |
//! | `Lifo`        | [`Stack`]       | most recently (re)joined           |
//! | `Strongest`   | [`PriorityQueue`] | highest `health + power`         |
//! | `Random`      | [`Bag`]         | uniformly random, seeded           |
//! | `Alternating` | [`Deque`]       | front, then back, then front, ...  |
//!
//! Live counts are the roster lengths, so they cannot drift from the
//! containers.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::containers::{Bag, CapacityError, Deque, PriorityQueue, Queue, Stack};
use crate::factions::Faction;
use crate::math::Fixed;
use crate::pool::UnitHandle;
use crate::unit::{Unit, UnitId, UnitKind};

/// Container discipline for a unit kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Discipline {
    /// First in, first out.
    Fifo,
    /// Last in, first out.
    Lifo,
    /// Highest `health + power` first; ties by arrival.
    Strongest,
    /// Uniformly random.
    Random,
    /// Alternately from the front and the back.
    Alternating,
}

#[derive(Debug)]
enum Roster {
    Fifo(Queue<UnitHandle>),
    Lifo(Stack<UnitHandle>),
    Strongest(PriorityQueue<UnitHandle, Fixed>),
    Random(Bag<UnitHandle>),
    Alternating {
        units: Deque<UnitHandle>,
        from_back: bool,
    },
}

impl Roster {
    fn new(discipline: Discipline, stack_limit: Option<usize>) -> Self {
        match discipline {
            Discipline::Fifo => Self::Fifo(Queue::new()),
            Discipline::Lifo => Self::Lifo(stack_limit.map_or_else(Stack::new, Stack::bounded)),
            Discipline::Strongest => Self::Strongest(PriorityQueue::new()),
            Discipline::Random => Self::Random(Bag::new()),
            Discipline::Alternating => Self::Alternating {
                units: Deque::new(),
                from_back: false,
            },
        }
    }

    fn insert(&mut self, handle: UnitHandle, unit: &Unit) -> Result<(), CapacityError<UnitHandle>> {
        match self {
            Self::Fifo(queue) => queue.enqueue(handle),
            Self::Lifo(stack) => stack.push(handle)?,
            Self::Strongest(pq) => pq.enqueue(handle, unit.health().saturating_add(unit.power())),
            Self::Random(bag) => bag.insert(handle),
            Self::Alternating { units, .. } => units.push_back(handle),
        }
        Ok(())
    }

    fn remove(&mut self, rng: &mut ChaCha8Rng) -> Option<UnitHandle> {
        match self {
            Self::Fifo(queue) => queue.dequeue(),
            Self::Lifo(stack) => stack.pop(),
            Self::Strongest(pq) => pq.dequeue().map(|(handle, _)| handle),
            Self::Random(bag) => {
                if bag.is_empty() {
                    return None;
                }
                let index = rng.gen_range(0..bag.len());
                bag.remove_at(index)
            }
            Self::Alternating { units, from_back } => {
                let taken = if *from_back {
                    units.pop_back()
                } else {
                    units.pop_front()
                };
                if taken.is_some() {
                    *from_back = !*from_back;
                }
                taken
            }
        }
    }

    fn pick(&self, rng: &mut ChaCha8Rng) -> Option<UnitId> {
        match self {
            Self::Fifo(queue) => queue.peek().map(UnitHandle::id),
            Self::Lifo(stack) => stack.peek().map(UnitHandle::id),
            Self::Strongest(pq) => pq.peek().map(|(handle, _)| handle.id()),
            Self::Random(bag) => {
                if bag.is_empty() {
                    return None;
                }
                bag.get(rng.gen_range(0..bag.len())).map(UnitHandle::id)
            }
            Self::Alternating { units, .. } => units.peek_front().map(UnitHandle::id),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Fifo(queue) => queue.len(),
            Self::Lifo(stack) => stack.len(),
            Self::Strongest(pq) => pq.len(),
            Self::Random(bag) => bag.len(),
            Self::Alternating { units, .. } => units.len(),
        }
    }

    fn ids(&self) -> Vec<UnitId> {
        match self {
            Self::Fifo(queue) => queue.iter().map(UnitHandle::id).collect(),
            Self::Lifo(stack) => stack.iter().map(UnitHandle::id).collect(),
            Self::Strongest(pq) => pq.iter().map(|(handle, _)| handle.id()).collect(),
            Self::Random(bag) => bag.iter().map(UnitHandle::id).collect(),
            Self::Alternating { units, .. } => units.iter().map(UnitHandle::id).collect(),
        }
    }
}

/// A faction's live units, one roster per kind.
#[derive(Debug)]
pub struct Army {
    faction: Faction,
    rosters: Vec<(UnitKind, Roster)>,
    rng: ChaCha8Rng,
}

impl Army {
    /// Create an empty army.
    ///
    /// `seed` drives the random selection of `Random` rosters. A
    /// `stack_limit` bounds the `Lifo` rosters.
    #[must_use]
    pub fn new(faction: Faction, seed: u64, stack_limit: Option<usize>) -> Self {
        let rosters = faction
            .kinds()
            .iter()
            .map(|&kind| (kind, Roster::new(kind.discipline(), stack_limit)))
            .collect();
        Self {
            faction,
            rosters,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// The faction this army fights for.
    #[must_use]
    pub const fn faction(&self) -> Faction {
        self.faction
    }

    /// Unit kinds in attack order.
    #[must_use]
    pub fn kinds(&self) -> &'static [UnitKind] {
        self.faction.kinds()
    }

    fn roster(&self, kind: UnitKind) -> Option<&Roster> {
        self.rosters
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, roster)| roster)
    }

    fn roster_mut(&mut self, kind: UnitKind) -> Option<&mut Roster> {
        self.rosters
            .iter_mut()
            .find(|(k, _)| *k == kind)
            .map(|(_, roster)| roster)
    }

    /// File a unit into the roster for its kind.
    ///
    /// Fails, handing the handle back, when the unit belongs to another
    /// faction or its bounded roster is full.
    pub fn add_unit(&mut self, handle: UnitHandle, unit: &Unit) -> Result<(), CapacityError<UnitHandle>> {
        debug_assert_eq!(handle.id(), unit.id());
        let Some(roster) = self.roster_mut(unit.kind()) else {
            return Err(CapacityError(handle));
        };
        roster.insert(handle, unit)?;
        tracing::trace!(faction = %self.faction, unit = %unit.id(), kind = %unit.kind(), "unit filed");
        Ok(())
    }

    /// Remove the next unit of `kind` according to its discipline.
    pub fn remove_unit(&mut self, kind: UnitKind) -> Option<UnitHandle> {
        let Self { rosters, rng, .. } = self;
        rosters
            .iter_mut()
            .find(|(k, _)| *k == kind)
            .and_then(|(_, roster)| roster.remove(rng))
    }

    /// Choose the unit of `kind` that attacks this timestep, without
    /// removing it.
    pub fn pick_attacker(&mut self, kind: UnitKind) -> Option<UnitId> {
        let Self { rosters, rng, .. } = self;
        rosters
            .iter()
            .find(|(k, _)| *k == kind)
            .and_then(|(_, roster)| roster.pick(rng))
    }

    /// Remove every unit, kind by kind in attack order.
    pub fn drain(&mut self) -> Vec<UnitHandle> {
        let kinds = self.kinds();
        let mut drained = Vec::new();
        for &kind in kinds {
            while let Some(handle) = self.remove_unit(kind) {
                drained.push(handle);
            }
        }
        drained
    }

    /// Live units of `kind`.
    #[must_use]
    pub fn live_count(&self, kind: UnitKind) -> usize {
        self.roster(kind).map_or(0, Roster::len)
    }

    /// Live units across all kinds.
    #[must_use]
    pub fn total_live(&self) -> usize {
        self.rosters.iter().map(|(_, roster)| roster.len()).sum()
    }

    /// An army with no live units is dead.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.total_live() == 0
    }

    /// Ids of live units of `kind`, in selection order.
    ///
    /// `Random` rosters list storage order.
    #[must_use]
    pub fn unit_ids(&self, kind: UnitKind) -> Vec<UnitId> {
        self.roster(kind).map(Roster::ids).unwrap_or_default()
    }

    /// Check whether a unit is currently filed in this army.
    #[must_use]
    pub fn contains(&self, id: UnitId) -> bool {
        self.rosters
            .iter()
            .any(|(_, roster)| roster.ids().contains(&id))
    }
}
