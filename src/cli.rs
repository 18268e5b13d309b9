//! Interface de linha de comando do entrega baseada em clap.
//!
//! Define a struct [`Cli`] com os subcomandos de leitura (jobs, status,
//! history) e de comando (accept, decline, advance, complete, online,
//! auto-accept, watch), além da flag global `--store`.

use clap::{Parser, Subcommand, ValueEnum};

/// entrega — gerenciador do ciclo de vida de entregas para um entregador.
#[derive(Debug, Parser)]
#[command(name = "entrega", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho do arquivo de estado (sobrepõe entrega.toml).
    #[arg(long, global = true)]
    pub store: Option<String>,
}

/// Valor de liga/desliga aceito pelos subcomandos de flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl From<Toggle> for bool {
    fn from(t: Toggle) -> bool {
        matches!(t, Toggle::On)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Lista os pedidos disponíveis para aceite.
    Jobs,

    /// Aceita um pedido do catálogo e inicia a coleta.
    Accept {
        /// Identificador do pedido.
        id: String,
    },

    /// Recusa um pedido, removendo-o do catálogo.
    Decline {
        /// Identificador do pedido.
        id: String,
    },

    /// Confirma a coleta da entrega em andamento.
    Advance,

    /// Confirma a entrega e arquiva o pedido no histórico.
    Complete,

    /// Mostra o status atual da sessão.
    Status,

    /// Mostra o histórico de entregas e o total de ganhos.
    History,

    /// Esvazia o histórico de entregas.
    ClearHistory,

    /// Liga ou desliga o modo online.
    Online { value: Toggle },

    /// Liga ou desliga o aceite automático de pedidos.
    AutoAccept { value: Toggle },

    /// Fica aguardando: aceita pedidos automaticamente conforme as flags.
    Watch,
}
