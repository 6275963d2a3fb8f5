//! Fixed-point math utilities for deterministic combat.
//!
//! Health, power and damage all use fixed-point arithmetic, so a seeded run
//! produces bit-identical results on every platform. Only the report layer
//! converts to floating point, for display.

use fixed::types::I32F32;

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = I32F32;

/// One hundred, the health scale used by every formula.
pub const HUNDRED: Fixed = Fixed::from_bits(100 << 32);

/// Computes the square root of a fixed-point number using binary search.
///
/// Returns zero for non-positive input.
#[must_use]
pub fn fixed_sqrt(value: Fixed) -> Fixed {
    if value <= Fixed::ZERO {
        return Fixed::ZERO;
    }

    let mut low = Fixed::ZERO;
    let mut high = if value > Fixed::ONE { value } else { Fixed::ONE };

    // 48 halvings resolve anything up to 2^16 to full precision.
    for _ in 0..48 {
        let mid = low + (high - low) / Fixed::from_num(2);
        let mid_sq = mid.saturating_mul(mid);

        if mid_sq <= value {
            low = mid;
        } else {
            high = mid;
        }
    }

    low
}

/// Shared shape of the attack and heal formulas:
/// `(power * health / 100) / sqrt(target_health)`.
///
/// A target with no health left takes nothing.
#[must_use]
pub fn scaled_strike(power: Fixed, health: Fixed, target_health: Fixed) -> Fixed {
    let root = fixed_sqrt(target_health);
    if root == Fixed::ZERO {
        return Fixed::ZERO;
    }
    let strength = power.saturating_mul(health) / HUNDRED;
    strength.checked_div(root).unwrap_or(Fixed::MAX)
}

/// Convert a fixed-point value to `f64` for display and statistics.
#[must_use]
pub fn to_f64(value: Fixed) -> f64 {
    value.to_num::<f64>()
}
