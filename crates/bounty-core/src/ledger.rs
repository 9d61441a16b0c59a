//! Per-player ledgers and the action accumulator.
//!
//! A hand is scanned line by line; [`ActionAccumulator`] turns the betting
//! lines into each player's net chips committed to the pot.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::lexer::{ActionKind, HandLine};

/// Key-unique mapping from player name to a value, kept in first-seen order.
///
/// Hands seat at most a handful of players, so lookups are linear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for PlayerMap<V> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<V: Copy + Default> PlayerMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for `name`, or the default when absent.
    pub fn get(&self, name: &str) -> V {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
            .unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Mutable slot for `name`, inserting the default first if needed.
    pub fn slot(&mut self, name: &str) -> &mut V {
        let idx = match self.entries.iter().position(|(n, _)| n == name) {
            Some(idx) => idx,
            None => {
                self.entries.push((name.to_string(), V::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    pub fn insert(&mut self, name: &str, value: V) {
        *self.slot(name) = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, V)> + '_ {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Copy + Default> FromIterator<(String, V)> for PlayerMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        let mut map = PlayerMap::new();
        for (name, value) in iter {
            map.insert(&name, value);
        }
        map
    }
}

impl<V: Serialize> Serialize for PlayerMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Starting stacks for one hand.
pub type SeatSnapshot = PlayerMap<u64>;
/// Net chips committed to the pot. An uncalled-bet return with nothing
/// recorded before it leaves a negative entry.
pub type Contributions = PlayerMap<i64>;
/// Chips collected from any pot this hand.
pub type Collections = PlayerMap<u64>;

/// Accumulates betting lines into final contributions.
///
/// `committed` tracks the running total a `raises X to Y` line refers to.
/// Exporters restate that total per street, so it resets at each street
/// separator; antes are dead money and never count toward it.
#[derive(Debug, Default)]
pub struct ActionAccumulator {
    contributed: Contributions,
    committed: PlayerMap<i64>,
}

impl ActionAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one classified line. Lines that are not betting lines are ignored.
    pub fn apply(&mut self, line: &HandLine<'_>) {
        match *line {
            HandLine::Action {
                player,
                kind,
                amount,
                raise_to,
            } => self.action(player, kind, amount, raise_to),
            HandLine::Uncalled { player, amount } => {
                let amount = to_signed(amount);
                sub(self.contributed.slot(player), amount);
                sub(self.committed.slot(player), amount);
            }
            HandLine::Street => self.street(),
            _ => {}
        }
    }

    fn action(&mut self, player: &str, kind: ActionKind, amount: u64, raise_to: Option<u64>) {
        let amount = to_signed(amount);
        match kind {
            ActionKind::Ante => add(self.contributed.slot(player), amount),
            ActionKind::Post | ActionKind::Bet | ActionKind::Call | ActionKind::AllIn => {
                add(self.contributed.slot(player), amount);
                add(self.committed.slot(player), amount);
            }
            ActionKind::Raise => {
                let Some(total) = raise_to else {
                    tracing::debug!(player, "raise without a `to` amount, skipped");
                    return;
                };
                let total = to_signed(total);
                let delta = total.saturating_sub(self.committed.get(player));
                add(self.contributed.slot(player), delta);
                self.committed.insert(player, total);
            }
            ActionKind::Check | ActionKind::Fold => {}
        }
    }

    /// A new betting round starts; raise totals are restated from zero.
    pub fn street(&mut self) {
        self.committed = PlayerMap::new();
    }

    pub fn finish(self) -> Contributions {
        self.contributed
    }
}

fn to_signed(amount: u64) -> i64 {
    i64::try_from(amount).unwrap_or(i64::MAX)
}

// Chip totals saturate; a garbled line must not panic or wrap.
fn add(slot: &mut i64, amount: i64) {
    *slot = slot.saturating_add(amount);
}

fn sub(slot: &mut i64, amount: i64) {
    *slot = slot.saturating_sub(amount);
}
