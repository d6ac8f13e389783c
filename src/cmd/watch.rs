//! Live board: `suds watch`.

use anyhow::{Context, Result, bail};
use chrono::Utc;
use suds::board::{FilterCriteria, TASK_MOVED, project};
use suds::config::SudsConfig;
use suds::push::PushChannel;
use suds::ui::icons::LIVE;
use suds::ui::{render_board, render_outcome};

use super::open_session;

pub async fn cmd_watch(config: &SudsConfig, show_board: bool) -> Result<()> {
    if !config.push_enabled() {
        bail!("Live updates are disabled ([push] enabled = false in suds.toml)");
    }

    let push = PushChannel::init(&config.api_settings(), &config.push_settings())
        .context("Failed to open push channel")?;
    let pushes = push.subscribe(TASK_MOVED);

    let mut session = open_session(config).await?;
    if show_board {
        print!("{}", render_board(&session.view(&FilterCriteria::default()), Utc::now()));
    }
    println!("{}Watching {} (Ctrl-C to stop)", LIVE, push.url());

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    let applied = session
        .run(pushes, shutdown, |outcome, store| {
            println!("{}", render_outcome(outcome));
            if show_board {
                print!("{}", render_board(&project(store, &FilterCriteria::default()), Utc::now()));
            }
        })
        .await;

    push.shutdown().await;
    println!("Stopped after {} update{}", applied, if applied == 1 { "" } else { "s" });
    Ok(())
}
