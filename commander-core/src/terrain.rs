//! Terrain zones: water, land, the river and its bridges.
//!
//! ```text
//!        a b c d e f g h i j k
//!   12   ~ ~ = . . . . . . . .
//!   ...
//!    7   ~ ~ = = = # . # . . .      ~  navy only
//!    6   ~ ~ = = = # . # . . .      =  mixed (navy and land)
//!   ...                              .  land only
//!    1   ~ ~ = . . . . . . . .      #  bridge file at the river
//! ```
//!
//! Heavy pieces may only cross between the upper half (ranks 7-12) and the
//! lower half (ranks 1-6) along a bridge file.

use std::sync::OnceLock;

use crate::piece::{Piece, Role};
use crate::square::{Square, SquareSet};

/// Files a and b are open water, file c is the coastline.
const COAST_FILE: u8 = 2;
/// Files holding a bridge across the river (f and h).
const BRIDGE_FILES: [u8; 2] = [5, 7];
/// Internal ranks of displayed ranks 7 and 6, either side of the river.
const RIVER_RANKS: [u8; 2] = [5, 6];
/// River files d and e that are navigable.
const RIVER_FILES: [u8; 2] = [3, 4];

struct Masks {
    navy: SquareSet,
    land: SquareSet,
}

fn masks() -> &'static Masks {
    static MASKS: OnceLock<Masks> = OnceLock::new();
    MASKS.get_or_init(|| {
        let mut navy = SquareSet::new();
        let mut land = SquareSet::new();
        for sq in Square::all() {
            let river = RIVER_RANKS.contains(&sq.rank()) && RIVER_FILES.contains(&sq.file());
            if sq.file() <= COAST_FILE || river {
                navy.insert(sq);
            }
            if sq.file() >= COAST_FILE {
                land.insert(sq);
            }
        }
        Masks { navy, land }
    })
}

/// Water a Navy may occupy or sail through.
#[inline]
pub fn is_navy_passable(sq: Square) -> bool {
    masks().navy.contains(sq)
}

/// Ground any non-naval piece may occupy.
#[inline]
pub fn is_land_passable(sq: Square) -> bool {
    masks().land.contains(sq)
}

#[inline]
pub fn is_bridge_file(file: u8) -> bool {
    BRIDGE_FILES.contains(&file)
}

/// Bridge squares sit on a bridge file directly beside the river.
#[inline]
pub fn is_bridge_square(sq: Square) -> bool {
    is_bridge_file(sq.file()) && RIVER_RANKS.contains(&sq.rank())
}

/// True for displayed ranks 7-12.
#[inline]
pub fn in_upper_half(sq: Square) -> bool {
    sq.rank() <= RIVER_RANKS[0]
}

/// Heavy relocations between halves must run straight down a bridge file.
pub fn heavy_crossing_ok(from: Square, to: Square) -> bool {
    if in_upper_half(from) == in_upper_half(to) {
        return true;
    }
    from.file() == to.file() && is_bridge_file(from.file())
}

/// Whether a lone piece of `role` may stand on `sq`.
#[inline]
pub fn can_place_on_square(role: Role, sq: Square) -> bool {
    if role == Role::Navy {
        is_navy_passable(sq)
    } else {
        is_land_passable(sq)
    }
}

/// Whether `piece` (a stack stands where its carrier stands) may end a
/// relocation from `from` on `to`.
pub fn can_stand_on(piece: &Piece, from: Square, to: Square) -> bool {
    if !can_place_on_square(piece.role, to) {
        return false;
    }
    !piece.role.is_heavy() || heavy_crossing_ok(from, to)
}
