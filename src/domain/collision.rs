/// Player-vs-monster contact.
///
/// One touch is fatal, so the resolver only answers "which monster, if any".
/// Invisibility short-circuits before any geometry is tested.

use super::monster::Monster;
use super::player::Player;

/// Index of the first monster on the player's floor whose hitbox overlaps
/// the player's hitbox.
pub fn find_contact(player: &Player, monsters: &[Monster]) -> Option<usize> {
    if player.is_invisible() {
        return None;
    }
    let hitbox = player.hitbox();
    monsters.iter().position(|m| {
        m.floor == player.current_floor && hitbox.overlaps(&m.hitbox())
    })
}
