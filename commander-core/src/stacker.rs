//! Stack combination and decombination.
//!
//! Every carrier role has a blueprint: an ordered list of slots, each slot
//! accepting a set of passenger roles. Combining a group of units means finding
//! the highest-precedence carrier among them whose slots can take all of the
//! others, one unit per slot.
//!
//! | carrier     | slot 1                      | slot 2                           |
//! |-------------|-----------------------------|----------------------------------|
//! | Navy        | Air Force                   | Commander, Infantry, Militia, Tank |
//! | Air Force   | Tank                        | Commander, Infantry, Militia     |
//! | Tank        | Commander, Infantry, Militia|                                  |
//! | Engineer    | Artillery, Anti-Air, Missile|                                  |
//! | Headquarter | Commander                   |                                  |

use crate::error::StackError;
use crate::piece::{Piece, Role};

/// Carrier precedence, highest first.
pub const CARRIER_PRECEDENCE: [Role; 5] = [
    Role::Navy,
    Role::AirForce,
    Role::Tank,
    Role::Engineer,
    Role::Headquarter,
];

const HUMANLIKE: &[Role] = &[Role::Commander, Role::Infantry, Role::Militia];
const HUMANLIKE_OR_TANK: &[Role] = &[Role::Commander, Role::Infantry, Role::Militia, Role::Tank];
const HEAVY: &[Role] = &[Role::Artillery, Role::AntiAir, Role::Missile];

/// Largest legal stack: a carrier with both slots filled.
pub const MAX_STACK: usize = 3;

/// Slot layout for a carrier role; empty for roles that cannot carry.
pub fn blueprint(carrier: Role) -> &'static [&'static [Role]] {
    match carrier {
        Role::Navy => &[&[Role::AirForce], HUMANLIKE_OR_TANK],
        Role::AirForce => &[&[Role::Tank], HUMANLIKE],
        Role::Tank => &[HUMANLIKE],
        Role::Engineer => &[HEAVY],
        Role::Headquarter => &[&[Role::Commander]],
        _ => &[],
    }
}

/// Whether any slot of `carrier` accepts `passenger`.
pub fn can_carry(carrier: Role, passenger: Role) -> bool {
    blueprint(carrier).iter().any(|slot| slot.contains(&passenger))
}

/// Combine pieces (lone or stacked) into a single stack.
///
/// Returns `None` when the units do not share a color or no carrier among
/// them can seat every other unit.
pub fn combine(pieces: &[Piece]) -> Option<Piece> {
    let units: Vec<Piece> = pieces.iter().flat_map(Piece::flatten).collect();
    combine_units(units)
}

fn combine_units(units: Vec<Piece>) -> Option<Piece> {
    let first = units.first()?;
    if units.iter().any(|u| u.color != first.color) || units.len() > MAX_STACK {
        return None;
    }
    if units.len() == 1 {
        return units.into_iter().next();
    }

    for carrier_role in CARRIER_PRECEDENCE {
        let Some(carrier_idx) = units.iter().position(|u| u.role == carrier_role) else {
            continue;
        };
        let passengers: Vec<&Piece> = units
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != carrier_idx)
            .map(|(_, u)| u)
            .collect();
        if let Some(seated) = seat(blueprint(carrier_role), &passengers) {
            let mut carrier = units[carrier_idx].clone();
            carrier.carrying = seated;
            return Some(carrier);
        }
    }
    None
}

/// Assign each passenger to a distinct slot; returns passengers in slot order.
fn seat(slots: &[&[Role]], passengers: &[&Piece]) -> Option<Vec<Piece>> {
    if passengers.len() > slots.len() {
        return None;
    }
    let mut assignment: Vec<Option<usize>> = vec![None; slots.len()];
    if !seat_from(slots, passengers, 0, &mut assignment) {
        return None;
    }
    Some(
        assignment
            .into_iter()
            .flatten()
            .map(|i| passengers[i].clone())
            .collect(),
    )
}

fn seat_from(
    slots: &[&[Role]],
    passengers: &[&Piece],
    next: usize,
    assignment: &mut [Option<usize>],
) -> bool {
    if next == passengers.len() {
        return true;
    }
    for slot in 0..slots.len() {
        if assignment[slot].is_none() && slots[slot].contains(&passengers[next].role) {
            assignment[slot] = Some(next);
            if seat_from(slots, passengers, next + 1, assignment) {
                return true;
            }
            assignment[slot] = None;
        }
    }
    false
}

/// Remove the unit with `role` from a stack.
///
/// Returns the removed unit and whatever remains (recombined), or
/// [`StackError::Unrecombinable`] when the remainder cannot form one stack.
/// Splits are never degraded into loose pieces sharing a square.
pub fn decombine(stack: &Piece, role: Role) -> Result<(Piece, Option<Piece>), StackError> {
    let mut units = stack.flatten();
    let idx = units
        .iter()
        .position(|u| u.role == role)
        .ok_or(StackError::MissingRole(role))?;
    let removed = units.remove(idx);
    if units.is_empty() {
        return Ok((removed, None));
    }
    match combine_units(units) {
        Some(rest) => Ok((removed, Some(rest))),
        None => Err(StackError::Unrecombinable(role)),
    }
}

/// Remove several units at once (by role) and recombine the rest.
pub fn remainder_without(stack: &Piece, roles: &[Role]) -> Result<Option<Piece>, StackError> {
    let units: Vec<Piece> = stack
        .flatten()
        .into_iter()
        .filter(|u| !roles.contains(&u.role))
        .collect();
    if units.is_empty() {
        return Ok(None);
    }
    combine_units(units)
        .map(Some)
        .ok_or(StackError::Incompatible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Color;

    fn red(role: Role) -> Piece {
        Piece::new(Color::Red, role)
    }

    #[test]
    fn test_pair_soundness_over_all_roles() {
        for a in Role::ALL {
            for b in Role::ALL {
                let expected = can_carry(a, b) || can_carry(b, a);
                let result = combine(&[red(a), red(b)]);
                assert_eq!(result.is_some(), expected, "{a:?} + {b:?}");
                if let Some(stack) = result {
                    assert_eq!(stack.carrying.len(), 1);
                }
            }
        }
    }

    #[test]
    fn test_precedence_picks_navy() {
        let stack = combine(&[red(Role::Tank), red(Role::AirForce), red(Role::Navy)]).unwrap();
        assert_eq!(stack.role, Role::Navy);
        let carried: Vec<Role> = stack.carrying.iter().map(|p| p.role).collect();
        assert_eq!(carried, vec![Role::AirForce, Role::Tank]);
    }

    #[test]
    fn test_air_force_carries_tank_and_infantry() {
        let stack = combine(&[red(Role::Infantry), red(Role::Tank), red(Role::AirForce)]).unwrap();
        assert_eq!(stack.role, Role::AirForce);
        let carried: Vec<Role> = stack.carrying.iter().map(|p| p.role).collect();
        assert_eq!(carried, vec![Role::Tank, Role::Infantry]);
    }

    #[test]
    fn test_rejects_mixed_colors_and_overflow() {
        let blue_tank = Piece::new(Color::Blue, Role::Tank);
        assert!(combine(&[red(Role::Infantry), blue_tank]).is_none());
        assert!(combine(&[
            red(Role::Navy),
            red(Role::AirForce),
            red(Role::Tank),
            red(Role::Infantry)
        ])
        .is_none());
        // Two passengers competing for the same single slot.
        assert!(combine(&[red(Role::Tank), red(Role::Infantry), red(Role::Militia)]).is_none());
    }

    #[test]
    fn test_combine_flattens_existing_stacks() {
        let tank_stack = combine(&[red(Role::Tank), red(Role::Militia)]).unwrap();
        let merged = combine(&[red(Role::AirForce), tank_stack]).unwrap();
        assert_eq!(merged.role, Role::AirForce);
        assert_eq!(merged.size(), 3);
        assert!(merged.carrying.iter().all(|p| !p.is_stack()));
    }

    #[test]
    fn test_heroic_flag_survives() {
        let stack = combine(&[red(Role::Tank).heroic(), red(Role::Infantry)]).unwrap();
        assert!(stack.heroic);
        assert!(!stack.carrying[0].heroic);
    }

    #[test]
    fn test_decombine() {
        let stack = combine(&[red(Role::Navy), red(Role::AirForce), red(Role::Infantry)]).unwrap();
        let (navy, rest) = decombine(&stack, Role::Navy).unwrap();
        assert_eq!(navy.role, Role::Navy);
        let rest = rest.unwrap();
        assert_eq!(rest.role, Role::AirForce);
        assert_eq!(rest.carrying[0].role, Role::Infantry);

        let single = combine(&[red(Role::Tank), red(Role::Militia)]).unwrap();
        let (_, rest) = decombine(&single, Role::Tank).unwrap();
        assert_eq!(rest, Some(red(Role::Militia)));

        assert_eq!(
            decombine(&single, Role::Navy),
            Err(StackError::MissingRole(Role::Navy))
        );
    }

    #[test]
    fn test_decombine_refuses_loose_remainder() {
        let mut navy = red(Role::Navy);
        navy.carrying = vec![red(Role::AirForce), red(Role::Commander)];
        let (_, rest) = decombine(&navy, Role::Navy).unwrap();
        assert_eq!(rest.map(|p| p.role), Some(Role::AirForce));

        // Artillery and Commander have no common carrier once the
        // Headquarter leaves.
        let loose = Piece {
            carrying: vec![red(Role::Artillery), red(Role::Commander)],
            ..red(Role::Headquarter)
        };
        assert_eq!(
            decombine(&loose, Role::Headquarter),
            Err(StackError::Unrecombinable(Role::Headquarter))
        );
    }
}
