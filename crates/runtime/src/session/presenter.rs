//! Maps duel outcomes to presentation cues.

use duel_core::combat::EffectEvent;
use duel_core::{AbilityProfile, Side, StatusId};

use crate::cue::{Cue, CueDuration, CuePriority};

pub fn ability_cue(side: Side, ability: &AbilityProfile) -> Cue {
    Cue::new("ability", ability.name.clone())
        .with_subtitle(format!("{} damage", ability.base_damage))
        .for_side(side)
        .with_priority(CuePriority::High)
}

/// Cue for a resolution effect. Repeated hits on the same side merge.
pub fn effect_cue(event: &EffectEvent) -> Option<Cue> {
    let cue = match *event {
        EffectEvent::Hit { target, amount } => Cue::new("hit", format!("-{amount}"))
            .for_side(target)
            .merging(format!("hit:{target}")),
        EffectEvent::Reflect { target, amount } => Cue::new("reflect", format!("-{amount}"))
            .with_subtitle("reflected")
            .for_side(target)
            .merging(format!("reflect:{target}")),
        EffectEvent::Retaliate { target, amount } => Cue::new("retaliate", format!("-{amount}"))
            .with_subtitle("retaliation")
            .for_side(target),
        EffectEvent::Heal { target, amount } => Cue::new("heal", format!("+{amount}"))
            .for_side(target)
            .with_priority(CuePriority::Low),
        EffectEvent::TurnEnd { .. } => return None,
    };
    Some(cue)
}

/// Banner announcing the side about to act. Shown even while cues are
/// deferred for the handover, and cuts off whatever lesser cue is showing.
pub fn turn_cue(next: Side, round: u32) -> Cue {
    Cue::new("turn", format!("{next} to act"))
        .with_subtitle(format!("round {round}"))
        .with_priority(CuePriority::Critical)
        .preempting()
        .bypassing_deferral()
}

/// Upkeep damage; a ticker line that never holds the queue.
pub fn tick_cue(side: Side, damage: u32) -> Cue {
    Cue::new("tick", format!("-{damage}"))
        .with_subtitle("upkeep")
        .for_side(side)
        .with_duration(CueDuration::Instant)
}

pub fn status_cue(side: Side, status: &StatusId, stacks: u32) -> Cue {
    Cue::new("status", format!("{status} x{stacks}"))
        .for_side(side)
        .with_icon(status.as_str())
        .merging(format!("status:{side}:{status}"))
        .with_priority(CuePriority::Low)
}

#[cfg(test)]
mod tests {
    use super::*;
    use duel_core::TurnPhase;

    #[test]
    fn hits_merge_per_side() {
        let first = effect_cue(&EffectEvent::Hit {
            target: Side::Ai,
            amount: 4,
        })
        .unwrap();
        assert_eq!(first.merge_key.as_deref(), Some("hit:ai"));
        assert_eq!(first.title, "-4");
    }

    #[test]
    fn turn_end_has_no_effect_cue() {
        let event = EffectEvent::TurnEnd {
            next: Side::Player,
            prev_phase: TurnPhase::Defense,
        };
        assert!(effect_cue(&event).is_none());
        let banner = turn_cue(Side::Player, 2);
        assert!(banner.preempt && banner.bypass_deferral);
    }
}
