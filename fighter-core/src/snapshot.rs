use serde::{Deserialize, Serialize};

use crate::decision::FeatureVector;
use crate::error::TickError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: u32,
    pub health: i32,
    pub x: i32,
    pub y: i32,
    pub is_jumping: bool,
    pub is_crouching: bool,
}

/// Read-only per-tick input produced by the emulator bridge. Consumed, never
/// mutated, by the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub player1: PlayerSnapshot,
    pub player2: PlayerSnapshot,
    pub timer: i32,
    pub has_round_started: bool,
    pub is_round_over: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerSide {
    One,
    Two,
}

/// One player's perspective on a snapshot, handed to decision sources.
#[derive(Clone, Copy, Debug)]
pub struct PlayerView<'a> {
    pub snapshot: &'a GameStateSnapshot,
    pub side: PlayerSide,
}

impl<'a> PlayerView<'a> {
    pub fn own(&self) -> &'a PlayerSnapshot {
        match self.side {
            PlayerSide::One => &self.snapshot.player1,
            PlayerSide::Two => &self.snapshot.player2,
        }
    }

    pub fn opponent(&self) -> &'a PlayerSnapshot {
        match self.side {
            PlayerSide::One => &self.snapshot.player2,
            PlayerSide::Two => &self.snapshot.player1,
        }
    }

    /// Signed horizontal distance to the opponent; positive means the
    /// opponent is to the right.
    pub fn distance_x(&self) -> i32 {
        self.opponent().x - self.own().x
    }
}

/// Builds the 13-value feature vector the classifier consumes, validating
/// the snapshot first. Order matches the trained model's feature columns.
pub fn extract_features(snapshot: &GameStateSnapshot) -> Result<FeatureVector, TickError> {
    if snapshot.player1.health < 0 {
        return Err(TickError::FeatureExtraction {
            field: "p1_health",
            value: snapshot.player1.health as i64,
        });
    }
    if snapshot.player2.health < 0 {
        return Err(TickError::FeatureExtraction {
            field: "p2_health",
            value: snapshot.player2.health as i64,
        });
    }
    if snapshot.timer < 0 {
        return Err(TickError::FeatureExtraction {
            field: "timer",
            value: snapshot.timer as i64,
        });
    }

    let p1 = &snapshot.player1;
    let p2 = &snapshot.player2;
    Ok([
        p1.id as f64,
        p1.health as f64,
        p1.x as f64,
        p1.y as f64,
        f64::from(u8::from(p1.is_jumping)),
        f64::from(u8::from(p1.is_crouching)),
        p2.id as f64,
        p2.health as f64,
        p2.x as f64,
        p2.y as f64,
        f64::from(u8::from(p2.is_jumping)),
        f64::from(u8::from(p2.is_crouching)),
        snapshot.timer as f64,
    ])
}

#[cfg(test)]
pub(crate) fn test_snapshot(p1_x: i32, p2_x: i32) -> GameStateSnapshot {
    GameStateSnapshot {
        player1: PlayerSnapshot {
            id: 1,
            health: 176,
            x: p1_x,
            y: 0,
            is_jumping: false,
            is_crouching: false,
        },
        player2: PlayerSnapshot {
            id: 2,
            health: 176,
            x: p2_x,
            y: 0,
            is_jumping: false,
            is_crouching: false,
        },
        timer: 99,
        has_round_started: true,
        is_round_over: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_vector_order_matches_the_model_columns() {
        let snapshot = test_snapshot(100, 260);
        let features = extract_features(&snapshot).unwrap();
        assert_eq!(features[0], 1.0);
        assert_eq!(features[1], 176.0);
        assert_eq!(features[2], 100.0);
        assert_eq!(features[6], 2.0);
        assert_eq!(features[8], 260.0);
        assert_eq!(features[12], 99.0);
    }

    #[test]
    fn negative_health_is_an_extraction_error() {
        let mut snapshot = test_snapshot(100, 260);
        snapshot.player2.health = -5;
        assert_eq!(
            extract_features(&snapshot).unwrap_err(),
            TickError::FeatureExtraction {
                field: "p2_health",
                value: -5,
            }
        );
    }

    #[test]
    fn negative_timer_is_an_extraction_error() {
        let mut snapshot = test_snapshot(100, 260);
        snapshot.timer = -1;
        assert!(matches!(
            extract_features(&snapshot),
            Err(TickError::FeatureExtraction { field: "timer", .. })
        ));
    }

    #[test]
    fn distance_is_signed_from_the_viewer_side() {
        let snapshot = test_snapshot(100, 260);
        let view_p1 = PlayerView {
            snapshot: &snapshot,
            side: PlayerSide::One,
        };
        let view_p2 = PlayerView {
            snapshot: &snapshot,
            side: PlayerSide::Two,
        };
        assert_eq!(view_p1.distance_x(), 160);
        assert_eq!(view_p2.distance_x(), -160);
    }

    #[test]
    fn snapshot_json_roundtrips_snake_case() {
        let snapshot = test_snapshot(100, 260);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"is_jumping\""));
        let back: GameStateSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
