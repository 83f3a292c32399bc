//! Scripted walk-through of the shop flow.
//!
//! Exercises the whole lifecycle end to end: stock an item, fill a cart
//! past the stock limit, clamp it back down with a stock update, check
//! out into a ticket, and watch the deferred teardown fire.

use std::time::Duration;

use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::time::timeout;

use till_service::authz::Actor;
use till_service::command::{Reply, ShopCommand};
use till_service::config::ShopConfig;
use till_service::render::RenderRequest;
use till_service::service::ShopService;

use super::DemoArgs;
use crate::context::Context;

const STEPS: usize = 7;

/// Run the demo command.
pub async fn run(args: DemoArgs, ctx: &Context) -> Result<()> {
    let config = ShopConfig {
        ticket_grace_secs: args.grace,
        ..ctx.config.shop.clone()
    };
    let service = ShopService::new(config);
    let mut renders = service.subscribe_renders();

    let staff = Actor::staff(ctx.config.session.user.as_str());
    let shopper = Actor::member("py");
    let out = &ctx.output;

    out.header("till demo");

    out.step(1, STEPS, "Stock the shop: Potion at $5.00, 3 in stock");
    service.execute(
        &staff,
        ShopCommand::AddItem {
            name: "Potion".to_string(),
            price: 5.0,
            stock: 3,
        },
    )?;
    out.item_card("Potion", "$5.00", 3, Some(staff.user.as_str()));

    out.step(2, STEPS, "py mashes the add-to-cart button four times");
    for _ in 0..3 {
        service.execute(
            &shopper,
            ShopCommand::AddToCart {
                item: "Potion".to_string(),
            },
        )?;
    }
    match service.execute(
        &shopper,
        ShopCommand::AddToCart {
            item: "Potion".to_string(),
        },
    ) {
        Err(err) => out.info(&format!("Fourth click refused: {}", err)),
        Ok(_) => bail!("expected the fourth add to be refused"),
    }

    out.step(3, STEPS, "Stock drops to 1; py's cart clamps down");
    service.execute(
        &staff,
        ShopCommand::SetStock {
            name: "Potion".to_string(),
            stock: 1,
        },
    )?;
    match service.execute(&shopper, ShopCommand::ViewCart)? {
        Reply::CartView { lines, total } => out.cart(&lines, &total.display()),
        other => bail!("expected a cart view, got {:?}", other),
    }

    out.step(4, STEPS, "Checkout opens a private ticket");
    let ticket = match service.execute(&shopper, ShopCommand::Checkout)? {
        Reply::CheckoutStarted { ticket, order } => {
            out.order_summary(&order);
            ticket
        }
        other => bail!("expected checkout to start, got {:?}", other),
    };

    out.step(5, STEPS, "A second checkout is refused while the ticket is open");
    match service.execute(&shopper, ShopCommand::Checkout) {
        Err(err) => out.info(&format!("Refused: {}", err)),
        Ok(_) => bail!("expected the second checkout to be refused"),
    }

    out.step(6, STEPS, "Close the ticket");
    service.execute(&shopper, ShopCommand::CloseTicket { owner: None })?;

    out.step(
        7,
        STEPS,
        &format!("Ticket resource disappears after {}s", args.grace),
    );
    wait_for_deletion(&mut renders, &ticket.to_string(), args.grace, ctx).await?;

    out.success("Demo complete.");
    Ok(())
}

/// Watch the render stream until the ticket deletion arrives.
async fn wait_for_deletion(
    renders: &mut tokio::sync::broadcast::Receiver<RenderRequest>,
    ticket: &str,
    grace_secs: u64,
    ctx: &Context,
) -> Result<()> {
    let spinner = spinner(ctx, &format!("waiting out the {}s grace period", grace_secs));
    let deadline = Duration::from_secs(grace_secs + 5);

    let wait = async {
        loop {
            match renders.recv().await {
                Ok(RenderRequest::DeleteTicket { ticket: deleted }) => {
                    if deleted.as_str() == ticket {
                        return Ok(());
                    }
                }
                Ok(_) => {}
                Err(e) => return Err(e),
            }
        }
    };

    match timeout(deadline, wait).await {
        Ok(Ok(())) => {
            spinner.finish_and_clear();
            ctx.output.info(&format!("Ticket {} deleted", ticket));
            Ok(())
        }
        Ok(Err(e)) => {
            spinner.finish_and_clear();
            bail!("render stream ended early: {}", e)
        }
        Err(_) => {
            spinner.finish_and_clear();
            bail!("ticket was not deleted within {:?}", deadline)
        }
    }
}

fn spinner(ctx: &Context, msg: &str) -> ProgressBar {
    if ctx.output.is_json() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
