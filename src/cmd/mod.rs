//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module    | Commands handled                                  |
//! |-----------|---------------------------------------------------|
//! | `board`   | `Board`, `Move`, `Add`, `Edit`, `Delete`, `Summary` |
//! | `watch`   | `Watch`                                           |
//! | `loyalty` | `Customers`, `Loyalty`                            |
//! | `config`  | `Config`                                          |

pub mod board;
pub mod config;
pub mod loyalty;
pub mod watch;

pub use board::{cmd_add, cmd_board, cmd_delete, cmd_edit, cmd_move, cmd_summary};
pub use config::cmd_config;
pub use loyalty::{cmd_customers, cmd_loyalty};
pub use watch::cmd_watch;

use std::sync::Arc;

use anyhow::{Context, Result};
use suds::api::RestClient;
use suds::config::SudsConfig;
use suds::session::BoardSession;

/// REST client for the configured backend.
pub fn client(config: &SudsConfig) -> Result<Arc<RestClient>> {
    let client = RestClient::new(&config.api_settings())
        .with_context(|| format!("Invalid API settings for {}", config.base_url))?;
    Ok(Arc::new(client))
}

/// Session with the board already fetched.
pub async fn open_session(config: &SudsConfig) -> Result<BoardSession<RestClient>> {
    let mut session = BoardSession::new(client(config)?);
    session
        .load()
        .await
        .with_context(|| format!("Failed to load board from {}", config.base_url))?;
    Ok(session)
}
