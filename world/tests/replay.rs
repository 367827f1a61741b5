use skirmish_core::{
    CellCoord, Command, Connectivity, Event, Health, RangeAccounting, TeamId, TerrainId, UnitId,
    UnitStats,
};
use skirmish_world::{apply, query, World};

fn soldier() -> UnitStats {
    UnitStats {
        max_health: Health::new(12),
        attack_damage: 4,
        attack_range: 1,
        move_allowance: 4.0,
    }
}

fn archer() -> UnitStats {
    UnitStats {
        max_health: Health::new(8),
        attack_damage: 3,
        attack_range: 2,
        move_allowance: 3.0,
    }
}

fn script() -> Vec<Command> {
    let mut commands = vec![Command::ConfigureGrid {
        columns: 8,
        rows: 6,
        connectivity: Connectivity::Eight,
        accounting: RangeAccounting::Cheapest,
    }];
    for (x, z, terrain) in [
        (3, 0, TerrainId::WALL),
        (3, 1, TerrainId::WALL),
        (3, 2, TerrainId::FOREST),
        (4, 4, TerrainId::HILLS),
        (5, 2, TerrainId::WATER),
    ] {
        commands.push(Command::SetTerrain {
            cell: CellCoord::new(x, z),
            terrain,
        });
    }
    commands.extend([
        Command::PlaceUnit {
            team: TeamId::FIRST,
            cell: CellCoord::new(0, 1),
            stats: soldier(),
        },
        Command::PlaceUnit {
            team: TeamId::FIRST,
            cell: CellCoord::new(1, 4),
            stats: archer(),
        },
        Command::PlaceUnit {
            team: TeamId::SECOND,
            cell: CellCoord::new(6, 1),
            stats: soldier(),
        },
        Command::PlaceUnit {
            team: TeamId::SECOND,
            cell: CellCoord::new(6, 4),
            stats: archer(),
        },
        Command::SelectUnit {
            cell: CellCoord::new(0, 1),
        },
        Command::ConfirmDestination {
            cell: CellCoord::new(2, 3),
        },
        Command::StepUnit { unit: UnitId::new(0) },
        Command::StepUnit { unit: UnitId::new(0) },
        Command::ConfirmWait,
        Command::SelectUnit {
            cell: CellCoord::new(1, 4),
        },
        Command::ConfirmDestination {
            cell: CellCoord::new(3, 4),
        },
        Command::StepUnit { unit: UnitId::new(1) },
        Command::StepUnit { unit: UnitId::new(1) },
        Command::ConfirmWait,
        Command::SelectUnit {
            cell: CellCoord::new(6, 4),
        },
        Command::ConfirmDestination {
            cell: CellCoord::new(5, 4),
        },
        Command::StepUnit { unit: UnitId::new(3) },
        Command::ConfirmAttack {
            cell: CellCoord::new(3, 4),
        },
        Command::CompleteCombatAction { unit: UnitId::new(3) },
        Command::EndTurn,
    ]);
    commands
}

fn replay(commands: &[Command]) -> (World, Vec<Event>) {
    let mut world = World::new();
    let mut events = Vec::new();
    for command in commands {
        apply(&mut world, command.clone(), &mut events);
    }
    (world, events)
}

#[test]
fn identical_scripts_produce_identical_event_logs() {
    let commands = script();

    let (first_world, first_events) = replay(&commands);
    let (second_world, second_events) = replay(&commands);

    assert_eq!(first_events, second_events);
    assert_eq!(
        query::unit_view(&first_world).into_vec(),
        query::unit_view(&second_world).into_vec()
    );
    assert_eq!(
        query::turn_number(&first_world),
        query::turn_number(&second_world)
    );
}

#[test]
fn scripted_skirmish_reaches_expected_state() {
    let (world, events) = replay(&script());

    let rejections: Vec<&Event> = events
        .iter()
        .filter(|event| matches!(event, Event::CommandRejected { .. }))
        .collect();
    assert!(rejections.is_empty(), "unexpected rejections: {rejections:?}");

    assert_eq!(query::turn_number(&world), 3);
    assert_eq!(query::active_team(&world), TeamId::FIRST);
    assert_eq!(query::occupant(&world, CellCoord::new(2, 3)), Some(UnitId::new(0)));
    assert_eq!(query::occupant(&world, CellCoord::new(5, 4)), Some(UnitId::new(3)));

    let view = query::unit_view(&world);
    let wounded_archer = view.get(UnitId::new(1)).expect("archer alive");
    assert_eq!(wounded_archer.health, Health::new(5));
    let enemy_archer = view.get(UnitId::new(3)).expect("archer alive");
    assert_eq!(enemy_archer.health, Health::new(5));
}
