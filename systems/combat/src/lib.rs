#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure combat system that resolves damage exchanges between two units.
//!
//! The resolver never touches the world. It reports the strikes that landed
//! and who survived; the world applies the strikes and removes the dead.

use skirmish_core::{CombatOutcome, Health, UnitId};

/// Combat-relevant slice of a unit's state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Combatant {
    /// Identifier of the unit.
    pub unit: UnitId,
    /// Health before the exchange.
    pub health: Health,
    /// Damage dealt by each strike.
    pub attack_damage: u32,
    /// Reach of the unit's attacks measured in graph hops.
    pub attack_range: u32,
}

/// Single blow landed during an exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Strike {
    /// Unit that dealt the blow.
    pub striker: UnitId,
    /// Unit that received the blow.
    pub target: UnitId,
    /// Damage dealt.
    pub damage: u32,
    /// Health the target is left with.
    pub remaining: Health,
}

/// Full account of an exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CombatReport {
    /// Blows in the order they landed.
    pub strikes: Vec<Strike>,
    /// Survival of both participants.
    pub outcome: CombatOutcome,
}

/// Stateless resolver for attacker/defender exchanges.
#[derive(Clone, Copy, Debug, Default)]
pub struct CombatResolver;

impl CombatResolver {
    /// Creates a new combat resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Resolves an attack of `attacker` against `defender`.
    ///
    /// The defender is always struck first. It answers with a counter-strike
    /// only when both units share the same attack range and it survived the
    /// first blow.
    #[must_use]
    pub fn resolve(&self, attacker: &Combatant, defender: &Combatant) -> CombatReport {
        let mut strikes = Vec::with_capacity(2);

        let defender_health = defender.health.after_damage(attacker.attack_damage);
        strikes.push(Strike {
            striker: attacker.unit,
            target: defender.unit,
            damage: attacker.attack_damage,
            remaining: defender_health,
        });

        let mut attacker_health = attacker.health;
        let counters = attacker.attack_range == defender.attack_range;
        if counters && !defender_health.is_depleted() {
            attacker_health = attacker_health.after_damage(defender.attack_damage);
            strikes.push(Strike {
                striker: defender.unit,
                target: attacker.unit,
                damage: defender.attack_damage,
                remaining: attacker_health,
            });
        }

        CombatReport {
            strikes,
            outcome: CombatOutcome {
                attacker_survived: !attacker_health.is_depleted(),
                defender_survived: !defender_health.is_depleted(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn combatant(unit: u32, health: u32, attack_damage: u32, attack_range: u32) -> Combatant {
        Combatant {
            unit: UnitId::new(unit),
            health: Health::new(health),
            attack_damage,
            attack_range,
        }
    }

    #[test]
    fn equal_ranges_exchange_blows() {
        let attacker = combatant(1, 10, 5, 1);
        let defender = combatant(2, 10, 3, 1);

        let report = CombatResolver::new().resolve(&attacker, &defender);

        assert_eq!(report.strikes.len(), 2);
        assert_eq!(report.strikes[0].remaining, Health::new(5));
        assert_eq!(report.strikes[1].remaining, Health::new(7));
        assert_eq!(
            report.outcome,
            CombatOutcome {
                attacker_survived: true,
                defender_survived: true,
            }
        );
    }

    #[test]
    fn killing_blow_prevents_counter() {
        let attacker = combatant(1, 2, 8, 1);
        let defender = combatant(2, 8, 50, 1);

        let report = CombatResolver::new().resolve(&attacker, &defender);

        assert_eq!(report.strikes.len(), 1);
        assert!(report.outcome.attacker_survived);
        assert!(!report.outcome.defender_survived);
    }

    #[test]
    fn counter_can_kill_attacker() {
        let attacker = combatant(1, 3, 2, 1);
        let defender = combatant(2, 9, 4, 1);

        let report = CombatResolver::new().resolve(&attacker, &defender);

        assert_eq!(report.strikes[1].target, UnitId::new(1));
        assert!(!report.outcome.attacker_survived);
        assert!(report.outcome.defender_survived);
    }

    #[test]
    fn range_mismatch_is_one_sided() {
        let archer = combatant(1, 4, 3, 2);
        let swordsman = combatant(2, 10, 9, 1);

        let report = CombatResolver::new().resolve(&archer, &swordsman);
        assert_eq!(report.strikes.len(), 1);
        assert_eq!(report.strikes[0].target, UnitId::new(2));
        assert!(report.outcome.attacker_survived);
        assert!(report.outcome.defender_survived);

        let report = CombatResolver::new().resolve(&swordsman, &archer);
        assert_eq!(report.strikes.len(), 1);
        assert!(!report.outcome.defender_survived);
    }
}
