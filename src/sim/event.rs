/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound and logging.

use crate::domain::entity::PowerUpKind;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Jumped,
    MusicStarted,
    PlatformReached { index: usize },
    PlatformCracked { index: usize },
    PlatformCollapsed { index: usize },
    HazardStomped,
    PlayerHurt { lives_left: u32 },
    PowerUpCollected { kind: PowerUpKind },
    CoinCollected,
    GameOver,
    Victory,
    Restarted,
}
