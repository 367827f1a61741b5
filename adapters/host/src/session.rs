//! Host-facing façade over the world's command and query surface.

use std::collections::BTreeSet;

use skirmish_core::{
    CellCoord, CombatOutcome, Command, CommandError, Event, GameStatus, Path, TeamId, UnitId,
};
use skirmish_world::{apply, query, World};
use tracing::debug;

/// Interactive match driven by a presentation layer.
///
/// Every operation submits exactly one command to the world and records the
/// resulting events until [`Session::drain_events`] hands them out.
#[derive(Debug)]
pub struct Session {
    world: World,
    pending: Vec<Event>,
}

impl Session {
    /// Wraps an already configured world.
    #[must_use]
    pub fn new(world: World) -> Self {
        Self {
            world,
            pending: Vec::new(),
        }
    }

    /// Read-only access to the world for queries the session does not wrap.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Applies a raw command, reporting the rejection reason if it failed.
    pub fn submit(&mut self, command: Command) -> Result<(), CommandError> {
        self.dispatch(command).map(|_| ())
    }

    /// Selects the active-team unit standing on `(x, z)`.
    pub fn select_unit(&mut self, x: u32, z: u32) -> Result<UnitId, CommandError> {
        let _ = self.dispatch(Command::SelectUnit {
            cell: CellCoord::new(x, z),
        })?;
        query::selected_unit(&self.world).ok_or(CommandError::IllegalTransition)
    }

    /// Cells the selected unit may move to.
    #[must_use]
    pub fn movement_range(&self) -> BTreeSet<CellCoord> {
        query::movement_range(&self.world).clone()
    }

    /// Cells the selected unit may attack.
    #[must_use]
    pub fn attack_range(&self) -> BTreeSet<CellCoord> {
        query::attack_range(&self.world).clone()
    }

    /// Commits the selected unit to travel to `(x, z)`, returning the planned route.
    pub fn confirm_destination(&mut self, x: u32, z: u32) -> Result<Path, CommandError> {
        let batch = self.dispatch(Command::ConfirmDestination {
            cell: CellCoord::new(x, z),
        })?;
        batch
            .iter()
            .find_map(|event| match event {
                Event::PathPlanned { path, .. } => Some(path.clone()),
                _ => None,
            })
            .ok_or(CommandError::NoRoute)
    }

    /// Advances the moving unit by one cell. Returns the cell it entered.
    pub fn step(&mut self) -> Option<CellCoord> {
        let unit = query::unit_view(&self.world)
            .iter()
            .find(|snapshot| snapshot.pending_steps > 0)
            .map(|snapshot| snapshot.id)?;
        let batch = self.dispatch(Command::StepUnit { unit }).ok()?;
        batch.iter().find_map(|event| match event {
            Event::UnitStepped { to, .. } => Some(*to),
            _ => None,
        })
    }

    /// Marks the oldest pending combat action as presented. Returns its target.
    pub fn finish_combat_action(&mut self) -> Option<UnitId> {
        let unit = query::unit_view(&self.world)
            .iter()
            .find(|snapshot| snapshot.pending_combat > 0)
            .map(|snapshot| snapshot.id)?;
        let batch = self
            .dispatch(Command::CompleteCombatAction { unit })
            .ok()?;
        batch.iter().find_map(|event| match event {
            Event::CombatActionCompleted { target, .. } => Some(*target),
            _ => None,
        })
    }

    /// Attacks the enemy standing on `(x, z)` with the selected unit.
    pub fn confirm_attack(&mut self, x: u32, z: u32) -> Result<CombatOutcome, CommandError> {
        let batch = self.dispatch(Command::ConfirmAttack {
            cell: CellCoord::new(x, z),
        })?;
        batch
            .iter()
            .find_map(|event| match event {
                Event::CombatResolved { outcome, .. } => Some(*outcome),
                _ => None,
            })
            .ok_or(CommandError::IllegalTransition)
    }

    /// Ends the selected unit's activity without attacking.
    pub fn confirm_wait(&mut self) -> Result<(), CommandError> {
        self.submit(Command::ConfirmWait)
    }

    /// Clears the selection, rolling back an uncommitted move.
    pub fn deselect(&mut self) {
        let _ = self.dispatch(Command::Deselect);
    }

    /// Passes the turn to the other team, returning the team now active.
    pub fn end_turn(&mut self) -> Result<TeamId, CommandError> {
        self.submit(Command::EndTurn)?;
        Ok(query::active_team(&self.world))
    }

    /// Progress of the match.
    #[must_use]
    pub fn game_status(&self) -> GameStatus {
        query::game_status(&self.world)
    }

    /// Reports whether movement or combat presentation is still outstanding.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        query::is_busy(&self.world)
    }

    /// Events produced since the previous drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.pending)
    }

    fn dispatch(&mut self, command: Command) -> Result<&[Event], CommandError> {
        let start = self.pending.len();
        debug!(?command, "dispatching command");
        apply(&mut self.world, command, &mut self.pending);
        let batch = &self.pending[start..];
        let rejection = batch.iter().find_map(|event| match event {
            Event::CommandRejected { reason } => Some(*reason),
            _ => None,
        });
        match rejection {
            Some(reason) => Err(reason),
            None => Ok(batch),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(World::new())
    }
}
