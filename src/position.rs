//! Position feed boundary.
//!
//! The core consumes periodic location samples produced elsewhere (GPS,
//! simulator) and hands them to the external navigation collaborator. No
//! validation or rate limiting happens here — that belongs to whoever
//! produces the samples.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::state_machine::Location;

/// One worker-location reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub latitude: f64,
    pub longitude: f64,
    pub recorded_at: DateTime<Utc>,
}

impl PositionSample {
    pub fn now(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            recorded_at: Utc::now(),
        }
    }

    pub fn location(&self) -> Location {
        Location::new(self.latitude, self.longitude)
    }
}

/// What the navigation collaborator reports back for a leg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteMetrics {
    pub distance_km: f64,
    pub eta_minutes: f64,
}

// Typical urban scooter pace, used only for the straight-line fallback.
const AVERAGE_SPEED_KMH: f64 = 18.0;

impl RouteMetrics {
    /// Straight-line fallback estimate. The real collaborator reports
    /// routed values; this stands in when none is connected.
    pub fn estimate(from: Location, to: Location) -> Self {
        let distance = distance_km(from, to);
        Self {
            distance_km: distance,
            eta_minutes: distance / AVERAGE_SPEED_KMH * 60.0,
        }
    }
}

/// Fans position samples out to any number of subscribers (navigation,
/// watch-mode display). Samples from a lagging subscriber are dropped, not
/// queued; only the freshest positions matter.
pub struct PositionFeed {
    tx: broadcast::Sender<PositionSample>,
}

impl PositionFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PositionSample> {
        self.tx.subscribe()
    }

    /// Publish a sample. The number of current subscribers is returned;
    /// zero subscribers is not an error.
    pub fn publish(&self, sample: PositionSample) -> usize {
        self.tx.send(sample).unwrap_or(0)
    }
}

impl Default for PositionFeed {
    fn default() -> Self {
        Self::new(16)
    }
}

/// Great-circle distance between two points, in kilometers. Used only for
/// display ordering hints; routing proper lives in the navigation
/// collaborator.
pub fn distance_km(a: Location, b: Location) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;

    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}
