//! Damage arithmetic shared by attack resolution.

/// Damage left after block: `max(0, attack - block)`.
///
/// # Formula
///
/// ```text
/// attack = base_damage + bonus_damage
/// block  = base_block + bonus_block
/// dealt  = max(0, attack - block)
/// ```
#[inline]
pub fn mitigated_damage(attack: i32, block: i32) -> i32 {
    attack.saturating_sub(block).max(0)
}

/// Damage returned to the attacker by a retaliate percentage, rounded down.
#[inline]
pub fn retaliation(damage_dealt: i32, percent: u32) -> i32 {
    if damage_dealt <= 0 || percent == 0 {
        return 0;
    }
    let scaled = i64::from(damage_dealt) * i64::from(percent) / 100;
    i32::try_from(scaled).unwrap_or(i32::MAX)
}

/// HP after taking `amount` damage, floored at zero.
#[inline]
pub fn apply_damage(hp: i32, amount: i32) -> i32 {
    hp.saturating_sub(amount.max(0)).max(0)
}

/// HP after healing `amount`, capped at `max_hp`. Defeated combatants stay down.
#[inline]
pub fn apply_heal(hp: i32, max_hp: i32, amount: i32) -> i32 {
    if hp <= 0 || amount <= 0 {
        return hp;
    }
    hp.saturating_add(amount).min(max_hp).max(hp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mitigation_never_goes_negative() {
        assert_eq!(mitigated_damage(13, 7), 6);
        assert_eq!(mitigated_damage(3, 9), 0);
    }

    #[test]
    fn retaliation_rounds_down() {
        assert_eq!(retaliation(7, 50), 3);
        assert_eq!(retaliation(0, 50), 0);
        assert_eq!(retaliation(10, 0), 0);
    }

    #[test]
    fn hp_is_floored_and_heal_capped() {
        assert_eq!(apply_damage(4, 10), 0);
        assert_eq!(apply_heal(45, 50, 10), 50);
        assert_eq!(apply_heal(0, 50, 10), 0);
    }
}
