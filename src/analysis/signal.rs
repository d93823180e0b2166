//! Zone-transition events and replay dedup.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::analysis::classifier::Zone;
use crate::analysis::wave::WavePoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum SignalSide {
    #[strum(to_string = "BUY")]
    Buy,
    #[strum(to_string = "SELL")]
    Sell,
}

/// One zone flip: BUY on entering BLUE, SELL on entering ORANGE.
/// Stamped with the wave point where the flip happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalEvent {
    pub time: i64,
    pub side: SignalSide,
}

/// Walk the classified history and emit one event per zone change.
/// The seed point never emits; only actual transitions do. Because zones
/// alternate by construction, so do the emitted sides.
pub(crate) fn emit(points: &[WavePoint], zones: &[Zone]) -> Vec<SignalEvent> {
    debug_assert_eq!(points.len(), zones.len());

    let mut events = Vec::new();
    let mut prev: Option<Zone> = None;

    for (point, &zone) in points.iter().zip(zones) {
        if let Some(p) = prev {
            if p != zone {
                events.push(SignalEvent {
                    time: point.time,
                    side: match zone {
                        Zone::Blue => SignalSide::Buy,
                        Zone::Orange => SignalSide::Sell,
                    },
                });
            }
        }
        prev = Some(zone);
    }
    events
}

/// Replay guard for downstream listeners.
///
/// Every pass re-derives the full signal history from scratch, so the same
/// events come around again and again. The ledger remembers what has been
/// surfaced and hands back only the genuinely new ones.
#[derive(Debug, Default, Clone)]
pub struct SignalLedger {
    seen: HashSet<(i64, SignalSide)>,
}

impl SignalLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb a freshly derived history; returns the never-seen subset in
    /// input order.
    pub fn absorb(&mut self, events: &[SignalEvent]) -> Vec<SignalEvent> {
        events
            .iter()
            .filter(|e| self.seen.insert((e.time, e.side)))
            .copied()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(time: i64) -> WavePoint {
        WavePoint {
            time,
            value: 0.0,
            ratio: 0.5,
        }
    }

    #[test]
    fn test_emit_on_transitions_only() {
        let points: Vec<WavePoint> = (0..5).map(|i| point(i * 300)).collect();
        let zones = [
            Zone::Orange, // seed, no event
            Zone::Orange,
            Zone::Blue, // BUY
            Zone::Blue,
            Zone::Orange, // SELL
        ];
        let events = emit(&points, &zones);
        assert_eq!(
            events,
            vec![
                SignalEvent {
                    time: 600,
                    side: SignalSide::Buy
                },
                SignalEvent {
                    time: 1200,
                    side: SignalSide::Sell
                },
            ]
        );
    }

    #[test]
    fn test_emitted_sides_alternate() {
        let zones = [
            Zone::Blue,
            Zone::Orange,
            Zone::Blue,
            Zone::Orange,
            Zone::Orange,
            Zone::Blue,
        ];
        let points: Vec<WavePoint> = (0..zones.len()).map(|i| point(i as i64 * 60)).collect();
        let events = emit(&points, &zones);

        assert_eq!(events.len(), 4);
        for pair in events.windows(2) {
            assert_ne!(pair[0].side, pair[1].side);
            assert!(pair[0].time < pair[1].time);
        }
    }

    #[test]
    fn test_ledger_dedups_replays() {
        let mut ledger = SignalLedger::new();
        let history = vec![
            SignalEvent {
                time: 600,
                side: SignalSide::Buy,
            },
            SignalEvent {
                time: 1200,
                side: SignalSide::Sell,
            },
        ];

        assert_eq!(ledger.absorb(&history), history);

        // Replaying the identical derivation surfaces nothing
        assert!(ledger.absorb(&history).is_empty());

        // A longer re-derivation surfaces only the new tail
        let mut longer = history.clone();
        longer.push(SignalEvent {
            time: 1800,
            side: SignalSide::Buy,
        });
        assert_eq!(ledger.absorb(&longer), vec![longer[2]]);
        assert_eq!(ledger.len(), 3);
    }
}
