//! Configuração do entrega carregada a partir de `entrega.toml`.
//!
//! A struct [`EntregaConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! A variável de ambiente `ENTREGA_STORE` tem precedência sobre o arquivo.

use serde::Deserialize;
use std::path::Path;

use crate::error::EntregaError;

/// Configuração de nível superior carregada de `entrega.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct EntregaConfig {
    /// Caminho do arquivo de estado persistido.
    #[serde(default = "default_store_path")]
    pub store_path: String,

    /// Arquivo JSON com o catálogo inicial de pedidos. Quando ausente,
    /// usa o catálogo embutido.
    #[serde(default)]
    pub seed_file: Option<String>,

    /// Símbolo de moeda usado na exibição de valores.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

// Valor padrão para o caminho do estado: ".entrega/state.json".
fn default_store_path() -> String {
    ".entrega/state.json".to_string()
}

// Valor padrão para o símbolo de moeda: "R$".
fn default_currency_symbol() -> String {
    "R$".to_string()
}

impl Default for EntregaConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            seed_file: None,
            currency_symbol: default_currency_symbol(),
        }
    }
}

impl EntregaConfig {
    /// Carrega a configuração de `entrega.toml` no diretório atual.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load() -> Result<Self, EntregaError> {
        let path = Path::new("entrega.toml");
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<EntregaConfig>(&contents)?
        } else {
            Self::default()
        };

        // Variável de ambiente tem precedência sobre o arquivo de configuração.
        if let Ok(store) = std::env::var("ENTREGA_STORE")
            && !store.is_empty()
        {
            config.store_path = store;
        }

        Ok(config)
    }
}
