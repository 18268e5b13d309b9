//! Interface de terminal do entrega — saída colorida e spinner.
//!
//! Usa a crate `console` para estilização com cores e `indicatif` para o
//! spinner do modo `watch`. O [`Screen`] renderiza o catálogo, a entrega
//! ativa e o histórico de ganhos.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::position::distance_km;
use crate::state_machine::{ActiveJob, CompletedJob, Job, Stage, Totals};

/// Renderizador de terminal para o estado da sessão.
pub struct Screen {
    // Estilo ciano para identificadores de pedido.
    cyan: Style,
    // Estilo verde para valores e confirmações.
    green: Style,
    // Estilo amarelo para a entrega em andamento.
    yellow: Style,
    // Estilo fraco para detalhes secundários.
    dim: Style,
    // Símbolo de moeda vindo da configuração.
    currency: String,
}

impl Screen {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            cyan: Style::new().cyan().bold(),
            green: Style::new().green().bold(),
            yellow: Style::new().yellow().bold(),
            dim: Style::new().dim(),
            currency: currency.into(),
        }
    }

    /// Formata centavos como valor monetário ("R$ 12,50").
    pub fn fee(&self, cents: i64) -> String {
        let sign = if cents < 0 { "-" } else { "" };
        let abs = cents.abs();
        format!("{}{} {},{:02}", sign, self.currency, abs / 100, abs % 100)
    }

    /// Lista o catálogo de pedidos disponíveis, na ordem de chegada.
    pub fn print_catalog(&self, jobs: &[Job]) {
        if jobs.is_empty() {
            println!("{}", self.dim.apply_to("Nenhum pedido disponível."));
            return;
        }
        println!("Pedidos disponíveis ({}):", jobs.len());
        for job in jobs {
            let leg = distance_km(job.pickup, job.dropoff);
            println!(
                "  {}  {} → {}  {}  {}",
                self.cyan.apply_to(&job.id),
                job.shop_name,
                job.customer_name,
                self.green.apply_to(self.fee(job.fee_cents)),
                self.dim.apply_to(format!(
                    "{} item(s), ~{leg:.1} km",
                    job.item_count
                )),
            );
        }
    }

    /// Mostra o cartão da entrega ativa, se houver.
    pub fn print_active(&self, active: Option<&ActiveJob>) {
        let Some(active) = active else {
            println!("{}", self.dim.apply_to("Nenhuma entrega em andamento."));
            return;
        };
        let stage = match active.stage {
            Stage::PickingUp => self.yellow.apply_to("COLETANDO".to_string()),
            Stage::Delivering => self.yellow.apply_to("ENTREGANDO".to_string()),
        };
        println!(
            "{} [{}] {} ({}) → {} ({})",
            stage,
            self.cyan.apply_to(&active.job.id),
            active.job.shop_name,
            active.job.shop_address,
            active.job.customer_name,
            active.job.customer_address,
        );
        if let Some(note) = &active.job.note {
            println!("  {}", self.dim.apply_to(format!("obs: {note}")));
        }
        if let Some(payment) = &active.job.payment {
            println!("  {}", self.dim.apply_to(format!("pagamento: {payment}")));
        }
    }

    /// Histórico de entregas (mais recente primeiro) com o total de ganhos.
    pub fn print_history(&self, history: &[CompletedJob], totals: Totals) {
        if history.is_empty() {
            println!("{}", self.dim.apply_to("Histórico vazio."));
            return;
        }
        for done in history {
            println!(
                "  {}  {}  {}  {}",
                self.dim
                    .apply_to(done.completed_at.format("%d/%m %H:%M").to_string()),
                self.cyan.apply_to(&done.job.id),
                done.job.shop_name,
                self.green.apply_to(self.fee(done.job.fee_cents)),
            );
        }
        println!(
            "Total: {} entrega(s), {}",
            totals.count,
            self.green.apply_to(self.fee(totals.sum_cents))
        );
    }

    /// Linha de status: flags e contagens da sessão.
    pub fn print_status(&self, online: bool, auto_accept: bool, available: usize, done: usize) {
        let flag = |on: bool| {
            if on {
                self.green.apply_to("on".to_string())
            } else {
                self.dim.apply_to("off".to_string())
            }
        };
        println!(
            "online: {}  auto-accept: {}  pedidos: {}  entregas: {}",
            flag(online),
            flag(auto_accept),
            available,
            done
        );
    }
}

/// Spinner exibido durante o modo `watch`.
pub struct WatchSpinner {
    pb: ProgressBar,
}

impl WatchSpinner {
    pub fn start() -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("invalid template"),
        );
        pb.set_message("Aguardando pedidos... (Ctrl-C para sair)");
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { pb }
    }

    pub fn note(&self, msg: impl Into<String>) {
        self.pb.println(msg.into());
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}
