use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A geographic coordinate pair, consumed by the external navigation
/// collaborator. The core never interprets these values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// How the customer pays for the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Prepaid,
    Cash,
    Card,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Prepaid => write!(f, "prepaid"),
            PaymentMethod::Cash => write!(f, "cash"),
            PaymentMethod::Card => write!(f, "card"),
        }
    }
}

/// A single delivery job offered to the courier.
///
/// Immutable once created: acceptance and completion wrap a `Job` in
/// [`ActiveJob`]/[`CompletedJob`] instead of mutating it. Fees are integer
/// centavos so earnings sums stay exact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub shop_name: String,
    pub shop_address: String,
    pub customer_name: String,
    pub customer_address: String,
    pub pickup: Location,
    pub dropoff: Location,
    pub fee_cents: i64,
    pub item_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deliver_by: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        shop_name: impl Into<String>,
        shop_address: impl Into<String>,
        customer_name: impl Into<String>,
        customer_address: impl Into<String>,
        pickup: Location,
        dropoff: Location,
        fee_cents: i64,
        item_count: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            shop_name: shop_name.into(),
            shop_address: shop_address.into(),
            customer_name: customer_name.into(),
            customer_address: customer_address.into(),
            pickup,
            dropoff,
            fee_cents,
            item_count,
            note: None,
            deliver_by: None,
            payment: None,
            shop_phone: None,
            customer_phone: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_payment(mut self, payment: PaymentMethod) -> Self {
        self.payment = Some(payment);
        self
    }

    pub fn with_deliver_by(mut self, deadline: DateTime<Utc>) -> Self {
        self.deliver_by = Some(deadline);
        self
    }

    pub fn with_phones(
        mut self,
        shop_phone: impl Into<String>,
        customer_phone: impl Into<String>,
    ) -> Self {
        self.shop_phone = Some(shop_phone.into());
        self.customer_phone = Some(customer_phone.into());
        self
    }
}

/// The two stages of an accepted delivery.
///
/// A job flows through: PICKING_UP → DELIVERING → (archived)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    PickingUp,
    Delivering,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::PickingUp => write!(f, "PICKING_UP"),
            Stage::Delivering => write!(f, "DELIVERING"),
        }
    }
}

/// The single in-progress delivery, if any. At most one exists system-wide;
/// [`LifecycleManager::accept`](crate::state_machine::LifecycleManager::accept)
/// is the only place one is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveJob {
    pub job: Job,
    pub stage: Stage,
}

impl ActiveJob {
    /// Wrap a freshly accepted job. Every delivery starts at pickup.
    pub fn start(job: Job) -> Self {
        Self {
            job,
            stage: Stage::PickingUp,
        }
    }
}

/// A finished delivery, archived for earnings accounting. Never mutated
/// after insertion into the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedJob {
    pub job: Job,
    pub completed_at: DateTime<Utc>,
}

impl CompletedJob {
    /// Archive a delivered job, stamping the completion moment.
    pub fn from_job(job: Job) -> Self {
        Self {
            job,
            completed_at: Utc::now(),
        }
    }
}

/// Derived earnings aggregate. Always recomputed from the history, never
/// stored, so it cannot drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub count: usize,
    pub sum_cents: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_job() -> Job {
        Job::new(
            "Padaria Estrela",
            "Rua Augusta 901",
            "Ana Lima",
            "Alameda Santos 45, ap 72",
            Location::new(-23.5531, -46.6565),
            Location::new(-23.5629, -46.6544),
            1250,
            3,
        )
    }

    #[test]
    fn job_creation_defaults() {
        let job = sample_job();
        assert!(!job.id.is_empty());
        assert_eq!(job.fee_cents, 1250);
        assert_eq!(job.item_count, 3);
        assert!(job.note.is_none());
        assert!(job.payment.is_none());
        assert!(job.deliver_by.is_none());
    }

    #[test]
    fn job_ids_are_unique() {
        assert_ne!(sample_job().id, sample_job().id);
    }

    #[test]
    fn builder_helpers_set_optionals() {
        let job = sample_job()
            .with_note("portão azul, interfone 72")
            .with_payment(PaymentMethod::Cash)
            .with_phones("+55 11 3333-1111", "+55 11 99999-0000");
        assert_eq!(job.note.as_deref(), Some("portão azul, interfone 72"));
        assert_eq!(job.payment, Some(PaymentMethod::Cash));
        assert_eq!(job.shop_phone.as_deref(), Some("+55 11 3333-1111"));
    }

    #[test]
    fn active_job_starts_at_pickup() {
        let active = ActiveJob::start(sample_job());
        assert_eq!(active.stage, Stage::PickingUp);
    }

    #[test]
    fn completed_job_stamps_time() {
        let before = Utc::now();
        let done = CompletedJob::from_job(sample_job());
        assert!(done.completed_at >= before);
        assert!(done.completed_at <= Utc::now());
    }

    #[test]
    fn stage_display() {
        assert_eq!(Stage::PickingUp.to_string(), "PICKING_UP");
        assert_eq!(Stage::Delivering.to_string(), "DELIVERING");
    }

    #[test]
    fn job_serialization_roundtrip() {
        let job = sample_job().with_payment(PaymentMethod::Card);
        let json = serde_json::to_string(&job).unwrap();
        let back: Job = serde_json::from_str(&json).unwrap();
        assert_eq!(back, job);
    }

    #[test]
    fn job_without_note_omits_field() {
        let json = serde_json::to_string(&sample_job()).unwrap();
        assert!(!json.contains("note"));
    }
}
