//! Unit turn state machine: selection, movement, attacks and turn rotation.
//!
//! Every handler validates the command completely before touching the world,
//! so a returned error always means nothing changed.

use std::collections::BTreeSet;

use skirmish_core::{
    CellCoord, CommandError, Event, GameStatus, MovementState, TeamId, UnitId, UnitStats,
};
use skirmish_system_pathfinding::shortest_path;
use tracing::{debug, info};

use crate::{movement_cost, World};

pub(crate) fn place_unit(
    world: &mut World,
    team: TeamId,
    cell: CellCoord,
    stats: UnitStats,
    out_events: &mut Vec<Event>,
) -> Result<(), CommandError> {
    world.ensure_in_progress()?;
    world.ensure_in_bounds(cell)?;
    world.ensure_no_selection()?;
    if world.roster.iter().any(|unit| unit.is_busy()) {
        return Err(CommandError::IllegalTransition);
    }
    if !team.is_valid() || !stats.is_valid() {
        return Err(CommandError::IllegalTransition);
    }
    let terrain = world
        .grid
        .terrain(cell)
        .ok_or(CommandError::OutOfBounds { cell })?;
    if !world.terrain.is_walkable(terrain) {
        return Err(CommandError::IllegalTransition);
    }
    ensure_vacant_for(world, team, cell, None)?;

    let unit = world.roster.spawn(team, cell, stats);
    world.grid.occupy(unit, cell);
    debug!(unit = unit.get(), %team, %cell, "unit placed");
    out_events.push(Event::UnitPlaced { unit, team, cell });
    Ok(())
}

pub(crate) fn select(
    world: &mut World,
    cell: CellCoord,
    out_events: &mut Vec<Event>,
) -> Result<(), CommandError> {
    world.ensure_in_progress()?;
    world.ensure_in_bounds(cell)?;
    let unit_id = world
        .grid
        .occupant(cell)
        .ok_or(CommandError::IllegalTransition)?;
    let unit = world
        .roster
        .get(unit_id)
        .ok_or(CommandError::IllegalTransition)?;
    if unit.team != world.active_team || unit.state != MovementState::Unselected {
        return Err(CommandError::IllegalTransition);
    }
    if active_team_busy(world) {
        return Err(CommandError::IllegalTransition);
    }

    let previous = match world.selection.and_then(|id| world.roster.get(id)) {
        Some(current) if current.state == MovementState::Moved => {
            return Err(CommandError::IllegalTransition);
        }
        Some(current) => Some((current.id, current.state)),
        None => None,
    };

    let (movement, attack) = preview_ranges(world, unit_id)?;

    if let Some((previous_id, previous_state)) = previous {
        if previous_state == MovementState::Selected {
            release(world, previous_id);
        }
        announce_deselection(world, previous_id, out_events);
    }

    if let Some(unit) = world.roster.get_mut(unit_id) {
        unit.state = MovementState::Selected;
    }
    world.selection = Some(unit_id);
    debug!(unit = unit_id.get(), %cell, "unit selected");
    out_events.push(Event::UnitSelected {
        unit: unit_id,
        cell,
    });
    out_events.push(Event::RangesUpdated {
        unit: unit_id,
        movement_cells: movement.len(),
        attack_cells: attack.len(),
    });
    world.highlights.movement = movement;
    world.highlights.attack = attack;
    Ok(())
}

pub(crate) fn confirm_destination(
    world: &mut World,
    cell: CellCoord,
    out_events: &mut Vec<Event>,
) -> Result<(), CommandError> {
    world.ensure_in_progress()?;
    let unit_id = world.selection.ok_or(CommandError::IllegalTransition)?;
    let unit = world
        .roster
        .get(unit_id)
        .ok_or(CommandError::IllegalTransition)?;
    if unit.state != MovementState::Selected || unit.is_busy() {
        return Err(CommandError::IllegalTransition);
    }
    let (origin, team, reach) = (unit.cell, unit.team, unit.stats.attack_range);
    world.ensure_in_bounds(cell)?;
    ensure_vacant_for(world, team, cell, Some(unit_id))?;
    if !world.highlights.movement.contains(&cell) {
        return Err(CommandError::IllegalTransition);
    }

    let path = shortest_path(
        &world.graph,
        origin,
        cell,
        movement_cost(&world.grid, &world.terrain, &world.roster, team),
    )?;
    let arrival_attack = if path.len() == 1 {
        Some(world.ranges.attack_range_after_moving(&world.graph, cell, reach)?)
    } else {
        None
    };

    if let Some(unit) = world.roster.get_mut(unit_id) {
        unit.pre_move_cell = Some(origin);
        unit.movement_queue.extend(path.steps());
    }
    world.highlights.clear();
    debug!(
        unit = unit_id.get(),
        from = %origin,
        to = %cell,
        cost = path.total_cost(),
        "path planned"
    );
    out_events.push(Event::PathPlanned {
        unit: unit_id,
        path,
    });

    if let Some(attack) = arrival_attack {
        commit_move(world, unit_id, attack, out_events);
    }
    Ok(())
}

pub(crate) fn step(
    world: &mut World,
    unit_id: UnitId,
    out_events: &mut Vec<Event>,
) -> Result<(), CommandError> {
    let unit = world
        .roster
        .get(unit_id)
        .ok_or(CommandError::IllegalTransition)?;
    let next = *unit
        .movement_queue
        .front()
        .ok_or(CommandError::IllegalTransition)?;
    let arrival_attack = if unit.movement_queue.len() == 1 {
        let reach = unit.stats.attack_range;
        Some(world.ranges.attack_range_after_moving(&world.graph, next, reach)?)
    } else {
        None
    };

    let Some(unit) = world.roster.get_mut(unit_id) else {
        return Err(CommandError::IllegalTransition);
    };
    let _ = unit.movement_queue.pop_front();
    let from = unit.display_cell;
    unit.display_cell = next;
    out_events.push(Event::UnitStepped {
        unit: unit_id,
        from,
        to: next,
        remaining: unit.movement_queue.len(),
    });

    if let Some(attack) = arrival_attack {
        commit_move(world, unit_id, attack, out_events);
    }
    Ok(())
}

pub(crate) fn confirm_attack(
    world: &mut World,
    cell: CellCoord,
    out_events: &mut Vec<Event>,
) -> Result<(), CommandError> {
    world.ensure_in_progress()?;
    let attacker_id = world.selection.ok_or(CommandError::IllegalTransition)?;
    let attacker = world
        .roster
        .get(attacker_id)
        .ok_or(CommandError::IllegalTransition)?;
    if attacker.state != MovementState::Moved || attacker.is_busy() {
        return Err(CommandError::IllegalTransition);
    }
    world.ensure_in_bounds(cell)?;
    if !world.highlights.attack.contains(&cell) {
        return Err(CommandError::IllegalTransition);
    }
    let defender = world
        .grid
        .occupant(cell)
        .and_then(|id| world.roster.get(id))
        .ok_or(CommandError::IllegalTransition)?;
    if defender.team == attacker.team {
        return Err(CommandError::OccupiedByAlly);
    }
    if defender.health.is_depleted() {
        return Err(CommandError::IllegalTransition);
    }

    let defender_id = defender.id;
    let report = world
        .combat
        .resolve(&attacker.combatant(), &defender.combatant());

    for strike in &report.strikes {
        if let Some(target) = world.roster.get_mut(strike.target) {
            target.health = strike.remaining;
        }
        out_events.push(Event::UnitDamaged {
            unit: strike.target,
            damage: strike.damage,
            health: strike.remaining,
        });
    }
    debug!(
        attacker = attacker_id.get(),
        defender = defender_id.get(),
        outcome = ?report.outcome,
        "combat resolved"
    );
    out_events.push(Event::CombatResolved {
        attacker: attacker_id,
        defender: defender_id,
        outcome: report.outcome,
    });

    world.highlights.clear();
    if !report.outcome.defender_survived {
        remove_dead(world, defender_id, out_events);
    }
    if report.outcome.attacker_survived {
        if let Some(attacker) = world.roster.get_mut(attacker_id) {
            attacker.state = MovementState::Waiting;
            attacker.pre_move_cell = None;
            attacker.combat_queue.push_back(defender_id);
        }
        out_events.push(Event::UnitWaiting { unit: attacker_id });
    } else {
        remove_dead(world, attacker_id, out_events);
        world.selection = None;
    }

    if !declare_victor(world, out_events) {
        complete_turn_if_settled(world, out_events);
    }
    Ok(())
}

pub(crate) fn complete_combat_action(
    world: &mut World,
    unit_id: UnitId,
    out_events: &mut Vec<Event>,
) -> Result<(), CommandError> {
    let unit = world
        .roster
        .get_mut(unit_id)
        .ok_or(CommandError::IllegalTransition)?;
    let target = unit
        .combat_queue
        .pop_front()
        .ok_or(CommandError::IllegalTransition)?;
    out_events.push(Event::CombatActionCompleted {
        unit: unit_id,
        target,
        remaining: unit.combat_queue.len(),
    });
    complete_turn_if_settled(world, out_events);
    Ok(())
}

pub(crate) fn confirm_wait(
    world: &mut World,
    out_events: &mut Vec<Event>,
) -> Result<(), CommandError> {
    world.ensure_in_progress()?;
    let unit_id = world.selection.ok_or(CommandError::IllegalTransition)?;
    let unit = world
        .roster
        .get_mut(unit_id)
        .ok_or(CommandError::IllegalTransition)?;
    if unit.state != MovementState::Moved || unit.is_busy() {
        return Err(CommandError::IllegalTransition);
    }

    unit.state = MovementState::Waiting;
    unit.pre_move_cell = None;
    world.highlights.clear();
    debug!(unit = unit_id.get(), "unit waiting");
    out_events.push(Event::UnitWaiting { unit: unit_id });
    complete_turn_if_settled(world, out_events);
    Ok(())
}

/// Clears the selection. Doing so without a selection is a no-op.
pub(crate) fn deselect(world: &mut World, out_events: &mut Vec<Event>) {
    let Some(unit_id) = world.selection else {
        return;
    };
    release(world, unit_id);
    announce_deselection(world, unit_id, out_events);
}

pub(crate) fn end_turn(world: &mut World, out_events: &mut Vec<Event>) -> Result<(), CommandError> {
    world.ensure_in_progress()?;
    if active_team_busy(world) {
        return Err(CommandError::IllegalTransition);
    }
    rotate(world, out_events);
    Ok(())
}

/// Rejects `cell` when a unit other than `mover` holds it.
fn ensure_vacant_for(
    world: &World,
    team: TeamId,
    cell: CellCoord,
    mover: Option<UnitId>,
) -> Result<(), CommandError> {
    let Some(occupant) = world.grid.occupant(cell) else {
        return Ok(());
    };
    if Some(occupant) == mover {
        return Ok(());
    }
    match world.roster.get(occupant) {
        Some(unit) if unit.team != team => Err(CommandError::OccupiedByEnemy),
        _ => Err(CommandError::OccupiedByAlly),
    }
}

fn active_team_busy(world: &World) -> bool {
    world
        .roster
        .team_units(world.active_team)
        .any(|unit| unit.is_busy())
}

fn preview_ranges(
    world: &mut World,
    unit_id: UnitId,
) -> Result<(BTreeSet<CellCoord>, BTreeSet<CellCoord>), CommandError> {
    let unit = world
        .roster
        .get(unit_id)
        .ok_or(CommandError::IllegalTransition)?;
    let (start, team, stats) = (unit.cell, unit.team, unit.stats);

    let movement = world.ranges.movement_range(
        &world.graph,
        start,
        stats.move_allowance,
        world.accounting,
        movement_cost(&world.grid, &world.terrain, &world.roster, team),
    )?;
    let attack = world.ranges.attack_range_from_movement(
        &world.graph,
        &movement,
        stats.attack_range,
        start,
    )?;
    Ok((movement, attack))
}

/// Moves the committed position of a unit onto the cell it walked to.
fn commit_move(
    world: &mut World,
    unit_id: UnitId,
    attack: BTreeSet<CellCoord>,
    out_events: &mut Vec<Event>,
) {
    let Some(unit) = world.roster.get_mut(unit_id) else {
        return;
    };
    let origin = unit.cell;
    let destination = unit.display_cell;
    unit.cell = destination;
    unit.state = MovementState::Moved;

    world.grid.vacate(origin);
    world.grid.occupy(unit_id, destination);
    debug!(unit = unit_id.get(), cell = %destination, "movement committed");
    out_events.push(Event::MovementCompleted {
        unit: unit_id,
        cell: destination,
    });

    world.highlights.movement.clear();
    out_events.push(Event::RangesUpdated {
        unit: unit_id,
        movement_cells: 0,
        attack_cells: attack.len(),
    });
    world.highlights.attack = attack;
}

/// Returns a selected or moved unit to where it stood before moving.
fn release(world: &mut World, unit_id: UnitId) {
    let Some(unit) = world.roster.get_mut(unit_id) else {
        return;
    };
    match unit.state {
        MovementState::Selected => {
            unit.movement_queue.clear();
            unit.display_cell = unit.cell;
            unit.pre_move_cell = None;
            unit.state = MovementState::Unselected;
        }
        MovementState::Moved => {
            let current = unit.cell;
            let previous = unit.pre_move_cell.take().unwrap_or(current);
            unit.cell = previous;
            unit.display_cell = previous;
            unit.state = MovementState::Unselected;
            world.grid.vacate(current);
            world.grid.occupy(unit_id, previous);
            debug!(unit = unit_id.get(), from = %current, to = %previous, "movement rolled back");
        }
        MovementState::Unselected | MovementState::Waiting => {}
    }
}

fn announce_deselection(world: &mut World, unit_id: UnitId, out_events: &mut Vec<Event>) {
    world.selection = None;
    world.highlights.clear();
    if let Some(unit) = world.roster.get(unit_id) {
        out_events.push(Event::UnitDeselected {
            unit: unit_id,
            cell: unit.cell,
        });
    }
}

fn remove_dead(world: &mut World, unit_id: UnitId, out_events: &mut Vec<Event>) {
    let Some(unit) = world.roster.remove(unit_id) else {
        return;
    };
    world.grid.vacate(unit.cell);
    info!(unit = unit_id.get(), team = %unit.team, cell = %unit.cell, "unit died");
    out_events.push(Event::UnitDied {
        unit: unit_id,
        team: unit.team,
        cell: unit.cell,
    });
}

/// Ends the match when a team has no units left. Returns whether it did.
fn declare_victor(world: &mut World, out_events: &mut Vec<Event>) -> bool {
    let Some(loser) = TeamId::ALL
        .into_iter()
        .find(|team| world.roster.team(*team).is_empty())
    else {
        return false;
    };
    let winner = loser.opponent();
    world.status = GameStatus::Victory(winner);
    info!(%winner, "match decided");
    out_events.push(Event::GameOver { winner });
    true
}

fn complete_turn_if_settled(world: &mut World, out_events: &mut Vec<Event>) {
    if world.status != GameStatus::InProgress {
        return;
    }
    if world.roster.team(world.active_team).is_empty() {
        return;
    }
    let settled = world
        .roster
        .team_units(world.active_team)
        .all(|unit| unit.state == MovementState::Waiting && !unit.is_busy());
    if settled {
        rotate(world, out_events);
    }
}

fn rotate(world: &mut World, out_events: &mut Vec<Event>) {
    let departing = world.active_team;
    let next = departing.opponent();

    for unit in world.roster.team_units_mut(departing) {
        unit.state = MovementState::Unselected;
        unit.pre_move_cell = None;
    }
    world.selection = None;
    world.highlights.clear();
    world.active_team = next;
    world.turn = world.turn.saturating_add(1);

    debug!(%departing, %next, turn = world.turn, "turn ended");
    out_events.push(Event::TurnEnded {
        team: departing,
        next,
        turn: world.turn,
    });

    if world.roster.team(next).is_empty() {
        let _ = declare_victor(world, out_events);
    }
}
