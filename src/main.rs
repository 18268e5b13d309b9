mod auto_accept;
mod cli;
mod config;
mod error;
mod position;
mod seed;
mod state_machine;
mod store;
mod ui;

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use console::Style;

use auto_accept::AutoAcceptController;
use cli::{Cli, Command};
use config::EntregaConfig;
use error::LifecycleError;
use position::{PositionFeed, PositionSample, RouteMetrics};
use state_machine::{LifecycleManager, Stage};
use store::JsonFileStore;
use ui::{Screen, WatchSpinner};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = EntregaConfig::load()?;

    let store_path = cli.store.unwrap_or_else(|| config.store_path.clone());
    let seed = match &config.seed_file {
        Some(path) => seed::load_seed_file(Path::new(path))?,
        None => seed::seed_catalog(),
    };
    let mut manager = LifecycleManager::hydrate(Box::new(JsonFileStore::new(store_path)), seed);
    let screen = Screen::new(&config.currency_symbol);

    match cli.command {
        Command::Jobs => screen.print_catalog(manager.available()),

        Command::Accept { id } => match manager.accept(&id) {
            Ok(active) => {
                println!("Pedido aceito:");
                screen.print_active(Some(&active));
            }
            Err(e) => fail(e),
        },

        Command::Decline { id } => {
            manager.decline(&id);
            println!("Pedido {id} recusado.");
        }

        Command::Advance => match manager.advance() {
            Ok(active) => {
                println!("Coleta confirmada:");
                screen.print_active(Some(&active));
            }
            Err(e) => fail(e),
        },

        Command::Complete => match manager.complete() {
            Ok(done) => {
                println!(
                    "Entrega concluída: {} ({})",
                    done.job.id,
                    screen.fee(done.job.fee_cents)
                );
                let totals = manager.totals();
                screen.print_history(manager.history(), totals);
            }
            Err(e) => fail(e),
        },

        Command::Status => {
            screen.print_status(
                manager.online(),
                manager.auto_accept(),
                manager.available().len(),
                manager.history().len(),
            );
            screen.print_active(manager.active());
        }

        Command::History => {
            let totals = manager.totals();
            screen.print_history(manager.history(), totals);
        }

        Command::ClearHistory => {
            manager.clear_history();
            println!("Histórico esvaziado.");
        }

        Command::Online { value } => {
            manager.set_online(value.into());
            println!("online: {}", if bool::from(value) { "on" } else { "off" });
        }

        Command::AutoAccept { value } => {
            manager.set_auto_accept(value.into());
            println!(
                "auto-accept: {}",
                if bool::from(value) { "on" } else { "off" }
            );
        }

        Command::Watch => watch(manager, &screen).await,
    }

    Ok(())
}

/// Modo watch: mantém o controlador de aceite automático rodando e
/// acompanha o feed de posição até Ctrl-C.
async fn watch(manager: LifecycleManager, screen: &Screen) {
    let shared = manager.into_shared();
    let controller = AutoAcceptController::attach(shared.clone()).await;
    let runner = tokio::spawn(controller.run());

    // Feed simulado: uma amostra a cada 2s, derivando lentamente. Numa
    // instalação real, o GPS do aparelho publica no mesmo canal.
    let feed = PositionFeed::default();
    let mut positions = feed.subscribe();
    let simulator = tokio::spawn(async move {
        let (mut lat, mut lon) = (-23.5589, -46.7011);
        loop {
            feed.publish(PositionSample::now(lat, lon));
            lat += 0.0004;
            lon += 0.0003;
            tokio::time::sleep(Duration::from_secs(2)).await;
        }
    });

    let spinner = WatchSpinner::start();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            sample = positions.recv() => {
                let Ok(sample) = sample else { break };
                let m = shared.lock().await;
                if let Some(active) = m.active() {
                    let target = match active.stage {
                        Stage::PickingUp => active.job.pickup,
                        Stage::Delivering => active.job.dropoff,
                    };
                    let route = RouteMetrics::estimate(sample.location(), target);
                    spinner.note(format!(
                        "  [{}] {} — {:.1} km até o destino (~{:.0} min)",
                        active.job.id, active.stage, route.distance_km, route.eta_minutes
                    ));
                }
            }
        }
    }

    simulator.abort();
    runner.abort();
    spinner.finish();

    let m = shared.lock().await;
    screen.print_status(
        m.online(),
        m.auto_accept(),
        m.available().len(),
        m.history().len(),
    );
}

/// Imprime um erro de ciclo de vida e encerra com código 1.
fn fail(e: LifecycleError) -> ! {
    let red = Style::new().red().bold();
    eprintln!("{} {e}", red.apply_to("✗"));
    std::process::exit(1);
}
