//! Merging scan results into the library

use crate::game::{Game, GameKey};
use std::collections::{HashMap, HashSet};

/// What happens to user edits on scanned games when their folder is re-scanned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcilePolicy {
    /// Rebuild scanned entries from scratch; favorites on them are lost
    #[default]
    Replace,
    /// Keep the prior entry's id, favorite flag and emulator override
    CarryForward,
}

impl ReconcilePolicy {
    pub fn from_preserve_edits(preserve: bool) -> Self {
        if preserve {
            ReconcilePolicy::CarryForward
        } else {
            ReconcilePolicy::Replace
        }
    }
}

/// Keep the first game for each identity key, in order
pub fn dedup_by_identity(games: Vec<Game>) -> Vec<Game> {
    let mut seen = HashSet::new();
    games
        .into_iter()
        .filter(|game| seen.insert(game.identity_key()))
        .collect()
}

/// Next game list from the current one plus a fresh scan.
///
/// Entries without a ROM path (Steam and other manual entries) are kept
/// unchanged and in order. Every entry with a ROM path is dropped and the
/// deduplicated fresh entries follow in scan order.
pub fn reconcile(existing: &[Game], fresh: Vec<Game>, policy: ReconcilePolicy) -> Vec<Game> {
    let fresh = dedup_by_identity(fresh);

    let fresh = match policy {
        ReconcilePolicy::Replace => fresh,
        ReconcilePolicy::CarryForward => carry_forward(existing, fresh),
    };

    existing
        .iter()
        .filter(|game| !game.is_scanned())
        .cloned()
        .chain(fresh)
        .collect()
}

fn carry_forward(existing: &[Game], fresh: Vec<Game>) -> Vec<Game> {
    let mut prior: HashMap<GameKey, &Game> = HashMap::new();
    for game in existing.iter().filter(|g| g.is_scanned()) {
        prior.entry(game.identity_key()).or_insert(game);
    }

    fresh
        .into_iter()
        .map(|mut game| {
            if let Some(old) = prior.get(&game.identity_key()) {
                game.id = old.id.clone();
                game.favorite = old.favorite;
                if old.emulator_id.is_some() {
                    game.emulator_id = old.emulator_id.clone();
                }
            }
            game
        })
        .collect()
}
