//! Authoritative unit state and team membership.

use std::collections::{BTreeMap, VecDeque};

use skirmish_core::{
    CellCoord, Health, MovementState, TeamId, UnitId, UnitSnapshot, UnitStats, TEAM_COUNT,
};
use skirmish_system_combat::Combatant;

/// Live unit stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Unit {
    pub(crate) id: UnitId,
    pub(crate) team: TeamId,
    /// Committed cell; the only cell the unit occupies in the grid.
    pub(crate) cell: CellCoord,
    /// Cell the presentation layer should draw the unit on.
    pub(crate) display_cell: CellCoord,
    pub(crate) stats: UnitStats,
    pub(crate) health: Health,
    pub(crate) state: MovementState,
    pub(crate) movement_queue: VecDeque<CellCoord>,
    /// Targets of attacks whose presentation has not finished.
    pub(crate) combat_queue: VecDeque<UnitId>,
    /// Cell held before the current move, kept until the turn is committed.
    pub(crate) pre_move_cell: Option<CellCoord>,
}

impl Unit {
    fn new(id: UnitId, team: TeamId, cell: CellCoord, stats: UnitStats) -> Self {
        Self {
            id,
            team,
            cell,
            display_cell: cell,
            stats,
            health: stats.max_health,
            state: MovementState::Unselected,
            movement_queue: VecDeque::new(),
            combat_queue: VecDeque::new(),
            pre_move_cell: None,
        }
    }

    pub(crate) fn is_busy(&self) -> bool {
        !self.movement_queue.is_empty() || !self.combat_queue.is_empty()
    }

    pub(crate) fn combatant(&self) -> Combatant {
        Combatant {
            unit: self.id,
            health: self.health,
            attack_damage: self.stats.attack_damage,
            attack_range: self.stats.attack_range,
        }
    }

    pub(crate) fn snapshot(&self) -> UnitSnapshot {
        UnitSnapshot {
            id: self.id,
            team: self.team,
            cell: self.cell,
            stats: self.stats,
            health: self.health,
            state: self.state,
            pending_steps: self.movement_queue.len(),
            pending_combat: self.combat_queue.len(),
        }
    }
}

/// Registry that stores units, their teams, and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct Roster {
    units: BTreeMap<UnitId, Unit>,
    teams: [Vec<UnitId>; TEAM_COUNT],
    next_unit_id: UnitId,
}

impl Roster {
    pub(crate) fn new() -> Self {
        Self {
            units: BTreeMap::new(),
            teams: [Vec::new(), Vec::new()],
            next_unit_id: UnitId::new(0),
        }
    }

    pub(crate) fn spawn(&mut self, team: TeamId, cell: CellCoord, stats: UnitStats) -> UnitId {
        let id = self.next_unit_id;
        self.next_unit_id = UnitId::new(id.get().saturating_add(1));
        let _ = self.units.insert(id, Unit::new(id, team, cell, stats));
        if let Some(members) = self.teams.get_mut(usize::from(team.get())) {
            members.push(id);
        }
        id
    }

    pub(crate) fn remove(&mut self, id: UnitId) -> Option<Unit> {
        let unit = self.units.remove(&id)?;
        if let Some(members) = self.teams.get_mut(usize::from(unit.team.get())) {
            members.retain(|member| *member != id);
        }
        Some(unit)
    }

    pub(crate) fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    /// Unit identifiers of a team in placement order.
    pub(crate) fn team(&self, team: TeamId) -> &[UnitId] {
        self.teams
            .get(usize::from(team.get()))
            .map_or(&[], Vec::as_slice)
    }

    pub(crate) fn team_units(&self, team: TeamId) -> impl Iterator<Item = &Unit> {
        self.team(team).iter().filter_map(|id| self.units.get(id))
    }

    pub(crate) fn team_units_mut(&mut self, team: TeamId) -> impl Iterator<Item = &mut Unit> {
        self.units.values_mut().filter(move |unit| unit.team == team)
    }
}
