//! Attack resolution.

use crate::state::{CombatantState, TurnState};
use crate::status::{
    SpendContext, SpendPhase, SpendTotals, StatusRuntime, StatusSpendSummary,
};

use super::damage::{apply_damage, apply_heal, mitigated_damage, retaliation};
use super::defense::{DefenseResolution, SpendRequest};
use super::events::EffectEvent;

/// Everything one attack resolves from.
#[derive(Clone, Copy, Debug)]
pub struct AttackInput<'a> {
    pub turn: &'a TurnState,
    pub attacker: &'a CombatantState,
    pub defender: &'a CombatantState,
    /// Ability damage after passive modifiers.
    pub base_damage: i32,
    /// Attacker status spends made in the attack roll.
    pub attack_spends: &'a [StatusSpendSummary],
    pub defense: &'a DefenseResolution,
}

/// Numbers behind one resolved attack.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatSummary {
    pub base_damage: i32,
    pub bonus_damage: i32,
    pub base_block: i32,
    pub bonus_block: i32,
    pub damage_dealt: i32,
    /// Total block applied, even when it exceeds the incoming damage.
    pub blocked: i32,
    pub reflected: i32,
    pub retaliated: i32,
    pub healed: i32,
    pub negated: bool,
    pub attacker_defeated: bool,
    pub defender_defeated: bool,
}

/// Result of [`resolve_attack`]: updated combatants, summary and events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackResolution {
    pub attacker: CombatantState,
    pub defender: CombatantState,
    pub summary: CombatSummary,
    pub events: Vec<EffectEvent>,
}

/// Resolves one attack.
///
/// # Order
///
/// 1. Attacker bonus damage and defender bonus block are summed across spends.
/// 2. `damage_dealt = max(0, attack - block)`; `blocked` is the full block.
/// 3. A defender negate zeroes `damage_dealt`; reflect still lands.
/// 4. Reflect and retaliation hit the attacker regardless of block.
/// 5. HP is floored at zero; heal applies to a defender still standing.
///
/// Emits `hit`, then `reflect`/`retaliate`/`heal` when non-zero, then
/// `TURN_END` carrying the next side and the phase resolution ran in.
pub fn resolve_attack(input: &AttackInput<'_>) -> AttackResolution {
    let offense = SpendTotals::from_summaries(input.attack_spends);
    let defense = input.defense.totals();

    let attack = input.base_damage.saturating_add(offense.bonus_damage);
    let blocked = input.defense.base_block.saturating_add(defense.bonus_block);
    let negated = defense.negate_incoming;
    let damage_dealt = if negated {
        0
    } else {
        mitigated_damage(attack, blocked)
    };

    let reflected = input.defense.reflect.max(0);
    let retaliated = retaliation(damage_dealt, input.defense.retaliate_percent);

    let attacker_side = input.attacker.side;
    let defender_side = input.defender.side;

    let attacker_hp = apply_damage(input.attacker.hp, reflected.saturating_add(retaliated));
    let defender_hp_after_hit = apply_damage(input.defender.hp, damage_dealt);
    let defender_hp = apply_heal(
        defender_hp_after_hit,
        input.defender.max_hp,
        input.defense.heal,
    );
    let healed = defender_hp - defender_hp_after_hit;

    let attacker = input.attacker.clone().with_hp(attacker_hp);
    let defender = input.defender.clone().with_hp(defender_hp);

    let mut events = vec![EffectEvent::Hit {
        target: defender_side,
        amount: damage_dealt,
    }];
    if reflected > 0 {
        events.push(EffectEvent::Reflect {
            target: attacker_side,
            amount: reflected,
        });
    }
    if retaliated > 0 {
        events.push(EffectEvent::Retaliate {
            target: attacker_side,
            amount: retaliated,
        });
    }
    if healed > 0 {
        events.push(EffectEvent::Heal {
            target: defender_side,
            amount: healed,
        });
    }
    events.push(EffectEvent::TurnEnd {
        next: input.turn.active.opposite(),
        prev_phase: input.turn.phase,
    });

    let summary = CombatSummary {
        base_damage: input.base_damage,
        bonus_damage: offense.bonus_damage,
        base_block: input.defense.base_block,
        bonus_block: defense.bonus_block,
        damage_dealt,
        blocked,
        reflected,
        retaliated,
        healed,
        negated,
        attacker_defeated: attacker.is_defeated(),
        defender_defeated: defender.is_defeated(),
    };

    AttackResolution {
        attacker,
        defender,
        summary,
        events,
    }
}

/// Attacker spends made in the attack roll.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OffensePlan {
    pub attacker: CombatantState,
    pub spends: Vec<StatusSpendSummary>,
}

/// Spends each requested status in the attack roll against `base_damage`.
pub fn plan_offense(
    runtime: &StatusRuntime<'_>,
    attacker: &CombatantState,
    base_damage: i32,
    requests: &[SpendRequest],
) -> OffensePlan {
    let runtime = runtime.for_side(attacker.side);
    let initial = SpendContext::new().with_base_damage(base_damage);
    let mut stacks = attacker.stacks.clone();
    let mut spends = Vec::new();

    for request in requests {
        let outcome = runtime.spend_status_many(
            &stacks,
            request.status.as_str(),
            request.attempts,
            SpendPhase::AttackRoll,
            |progress| {
                let mut context = progress.initial.clone();
                context.accumulated_damage = progress.accumulated_damage;
                context.roll = request.rolls.get(progress.attempt as usize).copied();
                context
            },
            &initial,
        );
        if let Some(outcome) = outcome {
            stacks = outcome.stacks;
            spends.push(outcome.summary);
        }
    }

    OffensePlan {
        attacker: attacker.clone().with_stacks(stacks),
        spends,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{HeroId, Side, TurnPhase};
    use crate::status::SpendResult;

    fn combatants() -> (CombatantState, CombatantState) {
        (
            CombatantState::new(Side::Player, HeroId::new("monk"), 50),
            CombatantState::new(Side::Ai, HeroId::new("pyro"), 50),
        )
    }

    fn summary(status: &str, phase: SpendPhase, result: SpendResult) -> StatusSpendSummary {
        let mut summary = StatusSpendSummary::new(status.into(), phase);
        summary.record(1, result);
        summary
    }

    #[test]
    fn block_and_reflect_follow_the_formula() {
        let (attacker, defender) = combatants();
        let turn = TurnState::new(Side::Player).at_phase(TurnPhase::Defense);
        let chi = summary(
            "chi",
            SpendPhase::AttackRoll,
            SpendResult::succeeded().with_bonus_damage(3),
        );
        let defense = DefenseResolution {
            base_block: 5,
            reflect: 2,
            spends: vec![summary(
                "icewall",
                SpendPhase::DefenseRoll,
                SpendResult::succeeded().with_bonus_block(2),
            )],
            ..DefenseResolution::default()
        };

        let resolution = resolve_attack(&AttackInput {
            turn: &turn,
            attacker: &attacker,
            defender: &defender,
            base_damage: 10,
            attack_spends: &[chi],
            defense: &defense,
        });

        assert_eq!(resolution.summary.damage_dealt, 6);
        assert_eq!(resolution.summary.blocked, 7);
        assert_eq!(resolution.summary.reflected, 2);
        assert_eq!(resolution.attacker.hp, 48);
        assert_eq!(resolution.defender.hp, 44);
        assert!(!resolution.summary.attacker_defeated);
        assert!(!resolution.summary.defender_defeated);

        let kinds: Vec<_> = resolution.events.iter().map(EffectEvent::kind).collect();
        assert_eq!(kinds, ["hit", "reflect", "TURN_END"]);
        assert_eq!(
            resolution.events.last(),
            Some(&EffectEvent::TurnEnd {
                next: Side::Ai,
                prev_phase: TurnPhase::Defense,
            })
        );
    }

    #[test]
    fn overkill_block_is_reported_in_full() {
        let (attacker, defender) = combatants();
        let turn = TurnState::new(Side::Player);
        let defense = DefenseResolution {
            base_block: 9,
            ..DefenseResolution::default()
        };

        let resolution = resolve_attack(&AttackInput {
            turn: &turn,
            attacker: &attacker,
            defender: &defender,
            base_damage: 4,
            attack_spends: &[],
            defense: &defense,
        });

        assert_eq!(resolution.summary.damage_dealt, 0);
        assert_eq!(resolution.summary.blocked, 9);
        assert_eq!(
            resolution.events[0],
            EffectEvent::Hit {
                target: Side::Ai,
                amount: 0
            }
        );
    }

    #[test]
    fn negate_zeroes_damage_but_reflect_still_lands() {
        let (attacker, defender) = combatants();
        let turn = TurnState::new(Side::Player);
        let defense = DefenseResolution {
            reflect: 3,
            spends: vec![summary(
                "evasive",
                SpendPhase::DefenseRoll,
                SpendResult::succeeded().negating(),
            )],
            ..DefenseResolution::default()
        };

        let resolution = resolve_attack(&AttackInput {
            turn: &turn,
            attacker: &attacker,
            defender: &defender,
            base_damage: 20,
            attack_spends: &[],
            defense: &defense,
        });

        assert!(resolution.summary.negated);
        assert_eq!(resolution.summary.damage_dealt, 0);
        assert_eq!(resolution.defender.hp, 50);
        assert_eq!(resolution.attacker.hp, 47);
    }

    #[test]
    fn lethal_damage_floors_hp_and_skips_heal() {
        let (attacker, defender) = combatants();
        let defender = defender.with_hp(5);
        let turn = TurnState::new(Side::Player);
        let defense = DefenseResolution {
            heal: 10,
            ..DefenseResolution::default()
        };

        let resolution = resolve_attack(&AttackInput {
            turn: &turn,
            attacker: &attacker,
            defender: &defender,
            base_damage: 12,
            attack_spends: &[],
            defense: &defense,
        });

        assert_eq!(resolution.defender.hp, 0);
        assert!(resolution.summary.defender_defeated);
        assert_eq!(resolution.summary.healed, 0);
    }

    #[test]
    fn heal_and_retaliate_emit_their_own_events() {
        let (attacker, defender) = combatants();
        let defender = defender.with_hp(40);
        let turn = TurnState::new(Side::Player);
        let defense = DefenseResolution {
            base_block: 2,
            heal: 4,
            retaliate_percent: 50,
            ..DefenseResolution::default()
        };

        let resolution = resolve_attack(&AttackInput {
            turn: &turn,
            attacker: &attacker,
            defender: &defender,
            base_damage: 9,
            attack_spends: &[],
            defense: &defense,
        });

        assert_eq!(resolution.summary.damage_dealt, 7);
        assert_eq!(resolution.summary.retaliated, 3);
        assert_eq!(resolution.attacker.hp, 47);
        assert_eq!(resolution.defender.hp, 37);
        let kinds: Vec<_> = resolution.events.iter().map(EffectEvent::kind).collect();
        assert_eq!(kinds, ["hit", "retaliate", "heal", "TURN_END"]);
    }

    #[test]
    fn already_defeated_combatants_resolve_cleanly() {
        let (attacker, defender) = combatants();
        let defender = defender.with_hp(0);
        let turn = TurnState::new(Side::Player);

        let resolution = resolve_attack(&AttackInput {
            turn: &turn,
            attacker: &attacker,
            defender: &defender,
            base_damage: 0,
            attack_spends: &[],
            defense: &DefenseResolution::default(),
        });

        assert_eq!(resolution.defender.hp, 0);
        assert!(resolution.summary.defender_defeated);
    }
}
