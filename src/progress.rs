//! Win detection and star rating.

use crate::collision::DestructionLog;
use crate::launch::LaunchSession;
use crate::level::Target;
use bevy::prelude::*;

/// Per-attempt progress, reset only by loading a level.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct Progress {
    /// Index into the level catalog.
    pub level: usize,
    /// Projectiles created this attempt, staged ones included.
    pub projectiles_used: u32,
    /// Target count of the level.
    pub par: u32,
    /// Set once the level is won.
    pub stars: Option<u8>,
    /// `false` until a level has been built successfully.
    pub loaded: bool,
}

impl Progress {
    pub fn is_won(&self) -> bool {
        self.stars.is_some()
    }
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelWon {
    pub level: usize,
    pub stars: u8,
    pub projectiles_used: u32,
}

/// Stars for finishing a level of `par` targets with `used` projectiles.
///
/// | used      | stars |
/// |-----------|-------|
/// | ≤ par     | 3     |
/// | par + 1   | 2     |
/// | par + 2   | 1     |
/// | > par + 2 | 0     |
pub fn star_rating(used: u32, par: u32) -> u8 {
    match used.saturating_sub(par) {
        0 => 3,
        1 => 2,
        2 => 1,
        _ => 0,
    }
}

/// The attempt is won the step no live target remains.
pub fn win_detection_system(
    mut progress: ResMut<Progress>,
    mut session: ResMut<LaunchSession>,
    log: Res<DestructionLog>,
    targets: Query<Entity, With<Target>>,
    mut won: MessageWriter<LevelWon>,
) {
    if !progress.loaded || progress.is_won() {
        return;
    }
    if targets.iter().any(|t| !log.contains(t)) {
        return;
    }
    let stars = star_rating(progress.projectiles_used, progress.par);
    progress.stars = Some(stars);
    session.freeze();
    won.write(LevelWon {
        level: progress.level,
        stars,
        projectiles_used: progress.projectiles_used,
    });
    info!(
        "level {} won with {} projectile(s): {} star(s)",
        progress.level + 1,
        progress.projectiles_used,
        stars
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_table() {
        assert_eq!(star_rating(0, 1), 3);
        assert_eq!(star_rating(1, 1), 3);
        assert_eq!(star_rating(2, 1), 2);
        assert_eq!(star_rating(3, 1), 1);
        assert_eq!(star_rating(4, 1), 0);
        assert_eq!(star_rating(40, 1), 0);
        assert_eq!(star_rating(5, 5), 3);
        assert_eq!(star_rating(7, 5), 1);
    }
}
