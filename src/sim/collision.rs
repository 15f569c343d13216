//! Collision detection and resolution
//!
//! Broad box test only: two entities collide when their axis-aligned boxes
//! overlap on both axes. Every overlapping rock in a tick counts.

use super::geometry::Collidable;
use super::state::{Player, Rock};

/// Whether two collidables' boxes overlap (closed intervals)
#[inline]
pub fn boxes_collide(a: &impl Collidable, b: &impl Collidable) -> bool {
    a.bounding_box().overlaps(&b.bounding_box())
}

/// Indices of every entry in `others` overlapping `subject`
pub fn overlapping<C: Collidable>(subject: &impl Collidable, others: &[C]) -> Vec<usize> {
    others
        .iter()
        .enumerate()
        .filter(|(_, other)| boxes_collide(subject, *other))
        .map(|(i, _)| i)
        .collect()
}

/// Remove every rock touching the player and take one life per rock.
///
/// Returns the ids of the removed rocks in their original order.
pub fn resolve_player_hits(player: &mut Player, rocks: &mut Vec<Rock>) -> Vec<u32> {
    let hit_indices = overlapping(&*player, rocks.as_slice());
    let hits: Vec<u32> = hit_indices.iter().map(|&i| rocks[i].id).collect();
    for &i in hit_indices.iter().rev() {
        rocks.remove(i);
    }

    for id in &hits {
        if !player.is_alive() {
            log::debug!("Rock {} hit a player with no lives left", id);
            continue;
        }
        let last = player.lose_life();
        log::info!("Hit by rock {}, {} lives left", id, player.lives);
        if last {
            log::info!("Player out of lives");
        }
    }

    hits
}
