//! Customer lookup commands: `suds customers` and `suds loyalty`.

use anyhow::{Context, Result, bail};
use console::style;
use suds::api::CustomerApi;
use suds::config::SudsConfig;
use suds::ui::icons::CHECK;
use suds::ui::render_loyalty;

use super::client;

pub async fn cmd_customers(config: &SudsConfig) -> Result<()> {
    let api = client(config)?;
    let customers = api.list_customers().await.context("Failed to list customers")?;

    if customers.is_empty() {
        println!("No customers yet.");
        return Ok(());
    }
    for customer in &customers {
        let mut line = format!("{}  {}", style(&customer.id).dim(), style(&customer.name).bold());
        if let Some(room) = &customer.room_number {
            line.push_str(&format!(" (room {})", room));
        }
        if let Some(phone) = &customer.phone {
            line.push_str(&format!(" · {}", phone));
        }
        if let Some(points) = customer.loyalty_points {
            line.push_str(&format!(" · {} points", points));
        }
        println!("{}", line);
    }
    Ok(())
}

pub async fn cmd_loyalty(config: &SudsConfig, customer_id: &str, redeem: Option<&str>) -> Result<()> {
    let api = client(config)?;
    let customer = api
        .get_customer(customer_id)
        .await
        .with_context(|| format!("Failed to look up customer {}", customer_id))?;
    let rewards = api.list_rewards().await.context("Failed to list rewards")?;
    let mut account = api
        .get_loyalty(customer_id)
        .await
        .with_context(|| format!("Failed to load loyalty account of {}", customer.name))?;

    if let Some(reward_id) = redeem {
        let Some(reward) = rewards.iter().find(|r| r.id == reward_id) else {
            bail!("Unknown reward '{}'", reward_id);
        };
        if !account.can_redeem(reward) {
            bail!(
                "{} has {} points; '{}' costs {}",
                customer.name,
                account.points,
                reward.name,
                reward.points_cost
            );
        }
        account = api
            .redeem(customer_id, reward)
            .await
            .with_context(|| format!("Failed to redeem '{}'", reward.name))?;
        println!("{}Redeemed {} for {}", CHECK, style(&reward.name).bold(), customer.name);
    }

    println!("{}", style(&customer.name).bold());
    print!("{}", render_loyalty(&account, &rewards));
    Ok(())
}
