//! Which statuses the session spends, and how often.

use duel_core::combat::SpendRequest;
use duel_core::{DiceRoller, SpendPhase, StatusRegistry, StatusStacks};

/// Spend requests for every held status whose rule allows `phase`.
///
/// Statuses usable in both roll phases are split: offense spends half the
/// affordable attempts (rounded down) and keeps the rest for defense.
/// Roll-gated statuses get one fresh die per attempt.
pub fn spend_requests(
    registry: &StatusRegistry,
    stacks: &StatusStacks,
    phase: SpendPhase,
    dice: &mut dyn DiceRoller,
    sides: u8,
) -> Vec<SpendRequest> {
    let mut requests = Vec::new();

    for (id, count) in stacks.iter() {
        let Some(rule) = registry
            .get_status(id.as_str())
            .and_then(|definition| definition.spend.as_ref())
        else {
            continue;
        };
        if !rule.phases.allows(phase) || rule.cost == 0 {
            continue;
        }

        let affordable = count / rule.cost;
        let attempts = match phase {
            SpendPhase::AttackRoll if rule.phases.allows(SpendPhase::DefenseRoll) => affordable / 2,
            _ => affordable,
        };
        if attempts == 0 {
            continue;
        }

        let mut request = SpendRequest::new(id.clone(), attempts);
        if rule.requires_roll {
            request = request.with_rolls((0..attempts).map(|_| u32::from(dice.roll_die(sides))));
        }
        requests.push(request);
    }

    requests
}
