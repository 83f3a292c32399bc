//! Interactive shop session.
//!
//! The REPL plays both roles of the chat platform: it dispatches typed
//! commands into the service and it is the rendering collaborator that
//! draws item cards, cart buttons, and tickets as styled text.

use anyhow::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use tokio::sync::broadcast::error::RecvError;

use till_core::ids::UserId;
use till_service::authz::Actor;
use till_service::command::{Reply, ShopCommand};
use till_service::render::RenderRequest;
use till_service::service::ShopService;

use super::ReplArgs;
use crate::context::Context;
use crate::output::Output;

/// What one input line asks for.
#[derive(Debug, PartialEq)]
enum ReplAction {
    Command(ShopCommand),
    SwitchUser(String),
    Quit,
    Empty,
}

/// Run the repl command.
pub async fn run(args: ReplArgs, ctx: &Context) -> Result<()> {
    let service = ShopService::new(ctx.config.shop.clone());

    // Drain render requests on a separate task so cards and tickets
    // appear even while the prompt is waiting for input.
    let mut renders = service.subscribe_renders();
    let render_output = ctx.output.clone();
    tokio::spawn(async move {
        loop {
            match renders.recv().await {
                Ok(request) => print_render(&render_output, &request),
                Err(RecvError::Lagged(missed)) => {
                    render_output.debug(&format!("renderer lagged, skipped {} updates", missed));
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut user = args
        .user
        .unwrap_or_else(|| ctx.config.session.user.clone());
    ctx.output.info(&format!(
        "Shopping as {}. Type `help` for commands, `quit` to leave.",
        user
    ));

    loop {
        let line: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(user.clone())
            .allow_empty(true)
            .interact_text()?;

        match parse_line(&line) {
            Ok(ReplAction::Empty) => {}
            Ok(ReplAction::Quit) => break,
            Ok(ReplAction::SwitchUser(next)) => {
                ctx.output.info(&format!("Now shopping as {}", next));
                user = next;
            }
            Ok(ReplAction::Command(command)) => {
                let actor = actor_for(ctx, &user);
                match service.execute(&actor, command) {
                    Ok(reply) => print_reply(&ctx.output, &reply),
                    Err(err) => ctx.output.error(&err.to_string()),
                }
            }
            Err(usage) => ctx.output.warn(&usage),
        }
    }

    service.shutdown();
    ctx.output.info("Shop closed.");
    Ok(())
}

/// Build the actor for the current identity; role comes from the roster.
fn actor_for(ctx: &Context, user: &str) -> Actor {
    if ctx.config.session.is_staff(user) {
        Actor::staff(user)
    } else {
        Actor::member(user)
    }
}

/// Parse one input line.
fn parse_line(line: &str) -> Result<ReplAction, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, rest)) = tokens.split_first() else {
        return Ok(ReplAction::Empty);
    };

    let action = match head {
        "quit" | "exit" => ReplAction::Quit,
        "help" | "setup" => ReplAction::Command(ShopCommand::Setup),
        "shop" | "items" => ReplAction::Command(ShopCommand::ViewCatalog),
        "cart" => ReplAction::Command(ShopCommand::ViewCart),
        "checkout" => ReplAction::Command(ShopCommand::Checkout),
        "as" => match rest {
            [user] => ReplAction::SwitchUser(user.to_string()),
            _ => return Err("usage: as <user>".to_string()),
        },
        "close" => ReplAction::Command(ShopCommand::CloseTicket {
            owner: rest.first().map(|u| UserId::new(*u)),
        }),
        "+" => ReplAction::Command(ShopCommand::AddToCart {
            item: join_name(rest, "usage: + <item>")?,
        }),
        "-" => ReplAction::Command(ShopCommand::RemoveFromCart {
            item: join_name(rest, "usage: - <item>")?,
        }),
        "add" => {
            // Last two tokens are price and stock; the rest is the name.
            if rest.len() < 3 {
                return Err("usage: add <name> <price> <stock>".to_string());
            }
            let stock = parse_stock(rest[rest.len() - 1])?;
            let price: f64 = rest[rest.len() - 2]
                .parse()
                .map_err(|_| format!("not a price: {}", rest[rest.len() - 2]))?;
            let name = rest[..rest.len() - 2].join(" ");
            ReplAction::Command(ShopCommand::AddItem { name, price, stock })
        }
        "remove" => ReplAction::Command(ShopCommand::RemoveItem {
            name: join_name(rest, "usage: remove <name>")?,
        }),
        "stock" => {
            if rest.len() < 2 {
                return Err("usage: stock <name> <count>".to_string());
            }
            let stock = parse_stock(rest[rest.len() - 1])?;
            let name = rest[..rest.len() - 1].join(" ");
            ReplAction::Command(ShopCommand::SetStock { name, stock })
        }
        other => return Err(format!("unknown command: {} (try `help`)", other)),
    };
    Ok(action)
}

fn join_name(tokens: &[&str], usage: &str) -> Result<String, String> {
    if tokens.is_empty() {
        return Err(usage.to_string());
    }
    Ok(tokens.join(" "))
}

fn parse_stock(token: &str) -> Result<i64, String> {
    token
        .parse()
        .map_err(|_| format!("not a stock count: {}", token))
}

/// Print the direct acknowledgement for a reply. World-side effects
/// (cards, tickets) arrive separately through the render drain.
fn print_reply(output: &Output, reply: &Reply) {
    match reply {
        Reply::Welcome { text } => output.info(text),
        Reply::ItemAdded { name, .. } => output.success(&format!("Added {} to the shop", name)),
        Reply::ItemRemoved {
            name,
            carts_touched,
        } => {
            output.success(&format!(
                "Removed {} (cleared from {} cart(s))",
                name, carts_touched
            ));
        }
        Reply::StockSet {
            name,
            stock,
            carts_clamped,
        } => {
            output.success(&format!(
                "{} now has {} in stock ({} cart(s) clamped)",
                name, stock, carts_clamped
            ));
        }
        Reply::CatalogView { items } => output.catalog(items),
        Reply::CartView { lines, total } => output.cart(lines, &total.display()),
        Reply::CartUpdated { item, quantity } => {
            if *quantity == 0 {
                output.success(&format!("{} removed from your cart", item));
            } else {
                output.success(&format!("{} x{} in your cart", item, quantity));
            }
        }
        Reply::CheckoutStarted { ticket, .. } => {
            output.success(&format!("Checkout started, ticket {} opened", ticket));
        }
        Reply::TicketClosed {
            ticket,
            teardown_secs,
        } => {
            output.success(&format!(
                "Ticket {} closed, removing in {}s",
                ticket, teardown_secs
            ));
        }
    }
}

/// Draw a render request the way the chat platform would.
fn print_render(output: &Output, request: &RenderRequest) {
    match request {
        RenderRequest::ShowItemCard {
            name,
            price,
            stock,
            requested_by,
        } => {
            output.item_card(name, &price.display(), *stock, Some(requested_by.as_str()));
        }
        RenderRequest::UpdateItemCard { name, price, stock } => {
            output.item_card(name, &price.display(), *stock, None);
        }
        RenderRequest::RetireItemCard { name, .. } => {
            output.debug(&format!("card for {} retired", name));
        }
        RenderRequest::UpdateCartButtons {
            user,
            item,
            quantity,
        } => {
            output.debug(&format!("cart buttons: {} has {} x{}", user, item, quantity));
        }
        RenderRequest::OpenTicket { user, ticket } => {
            output.info(&format!("Opened private ticket {} for {}", ticket, user));
        }
        RenderRequest::PostOrderSummary { order, .. } => output.order_summary(order),
        RenderRequest::DeleteTicket { ticket } => {
            output.info(&format!("Ticket {} deleted", ticket));
        }
        RenderRequest::Notice { user, text } => {
            output.info(&format!("[{}] {}", user, text));
        }
    }
}
