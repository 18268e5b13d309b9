//! Boot-state catalog.
//!
//! A first launch (or a lost/corrupt snapshot) hydrates around these jobs
//! rather than an empty pool — an empty catalog reads as an outage, not a
//! fresh session. The surrounding application can swap in its own pool via
//! a JSON seed file.

use std::collections::HashSet;
use std::path::Path;

use crate::error::{EntregaError, LifecycleError};
use crate::state_machine::{Job, Location, PaymentMethod};

/// Built-in demo catalog: a plausible lunch-hour pool around Pinheiros.
pub fn seed_catalog() -> Vec<Job> {
    let mut jobs = vec![
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
        .with_note("portão azul, interfone 72")
        .with_payment(PaymentMethod::Prepaid),
        Job::new(
            "Cantina da Vila",
            "Rua Harmonia 12",
            "Bruno Costa",
            "Rua Girassol 310",
            Location::new(-23.5505, -46.6890),
            Location::new(-23.5533, -46.6921),
            980,
            1,
        )
        .with_payment(PaymentMethod::Cash)
        .with_phones("+55 11 3812-4455", "+55 11 98877-1122"),
        Job::new(
            "Sushi Kenzo",
            "Rua dos Pinheiros 88",
            "Clara Nunes",
            "Av. Rebouças 1500",
            Location::new(-23.5660, -46.6822),
            Location::new(-23.5701, -46.6743),
            2100,
            2,
        )
        .with_payment(PaymentMethod::Card)
        .with_deliver_by(chrono::Utc::now() + chrono::Duration::minutes(45)),
        Job::new(
            "Empada da Praça",
            "Praça Pôr do Sol 3",
            "Diego Ramos",
            "Rua Cardeal Arcoverde 2200",
            Location::new(-23.5589, -46.7011),
            Location::new(-23.5612, -46.6899),
            750,
            6,
        ),
    ];

    // Stable, human-readable ids so the CLI stays usable across restarts.
    for (i, job) in jobs.iter_mut().enumerate() {
        job.id = format!("pedido-{:03}", i + 1);
    }
    jobs
}

/// Load a catalog from a JSON array of jobs. Rejects empty pools and
/// duplicate ids up front, before they can corrupt the session.
pub fn load_seed_file(path: &Path) -> Result<Vec<Job>, EntregaError> {
    let contents = std::fs::read_to_string(path)?;
    let jobs: Vec<Job> = serde_json::from_str(&contents)?;

    if jobs.is_empty() {
        return Err(EntregaError::EmptySeed(path.display().to_string()));
    }
    let mut seen = HashSet::new();
    for job in &jobs {
        if !seen.insert(job.id.as_str()) {
            return Err(LifecycleError::DuplicateJob(job.id.clone()).into());
        }
    }
    Ok(jobs)
}
