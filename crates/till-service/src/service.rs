//! The shop service: state ownership and the command facade.

use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast;

use till_core::cart::CartStore;
use till_core::catalog::Catalog;
use till_core::checkout::CheckoutProcess;
use till_core::error::ShopError;
use till_core::ids::UserId;
use till_core::money::Money;

use crate::authz::Actor;
use crate::command::{CartLineView, ItemSummary, Reply, ShopCommand};
use crate::config::ShopConfig;
use crate::render::RenderRequest;
use crate::teardown::TicketTeardown;

/// Render broadcast channel capacity.
const RENDER_CHANNEL_CAPACITY: usize = 256;

/// Everything the shop owns, guarded as one unit.
#[derive(Debug, Default)]
struct ShopState {
    catalog: Catalog,
    carts: CartStore,
    checkout: CheckoutProcess,
}

/// The single owner of all shop state.
///
/// Commands enter through [`ShopService::execute`]; every mutation takes
/// the write lock for its whole read-modify-write sequence, so catalog,
/// cart, and checkout updates never interleave. Rendering requests go
/// out over a broadcast channel after the lock is released; a failed or
/// absent renderer cannot corrupt state. Cloning the service shares the
/// same state.
#[derive(Debug, Clone)]
pub struct ShopService {
    state: Arc<RwLock<ShopState>>,
    render_tx: broadcast::Sender<RenderRequest>,
    teardown: TicketTeardown,
    config: ShopConfig,
}

impl ShopService {
    /// Create a service with the given configuration.
    pub fn new(config: ShopConfig) -> Self {
        let (render_tx, _) = broadcast::channel(RENDER_CHANNEL_CAPACITY);
        let teardown = TicketTeardown::new(render_tx.clone());
        Self {
            state: Arc::new(RwLock::new(ShopState::default())),
            render_tx,
            teardown,
            config,
        }
    }

    /// Subscribe to rendering requests.
    pub fn subscribe_renders(&self) -> broadcast::Receiver<RenderRequest> {
        self.render_tx.subscribe()
    }

    /// The active configuration.
    pub fn config(&self) -> &ShopConfig {
        &self.config
    }

    /// Cancel all pending ticket teardowns (process shutdown).
    pub fn shutdown(&self) {
        self.teardown.shutdown();
    }

    /// Record the rendered card handle for an item.
    ///
    /// Called by the rendering collaborator once it has materialized an
    /// item card, so later updates can address the same message.
    pub fn attach_display_ref(
        &self,
        name: &str,
        display_ref: till_core::ids::DisplayRef,
    ) -> Result<(), ShopError> {
        let mut state = self.state.write();
        state.catalog.set_display_ref(name, display_ref)
    }

    /// Execute a command on behalf of an actor.
    ///
    /// All validation happens before any state is touched; a returned
    /// error means nothing changed. The ticket-teardown path spawns a
    /// timer task, so commands must run inside a tokio runtime.
    pub fn execute(&self, actor: &Actor, command: ShopCommand) -> Result<Reply, ShopError> {
        tracing::debug!(
            command = command.name(),
            user = %actor.user,
            role = actor.role.as_str(),
            "executing shop command"
        );

        let result = match command {
            ShopCommand::Setup => self.setup(),
            ShopCommand::AddItem { name, price, stock } => {
                self.add_item(actor, &name, price, stock)
            }
            ShopCommand::RemoveItem { name } => self.remove_item(actor, &name),
            ShopCommand::SetStock { name, stock } => self.set_stock(actor, &name, stock),
            ShopCommand::ViewCatalog => self.view_catalog(),
            ShopCommand::ViewCart => self.view_cart(actor),
            ShopCommand::AddToCart { item } => self.add_to_cart(actor, &item),
            ShopCommand::RemoveFromCart { item } => self.remove_from_cart(actor, &item),
            ShopCommand::Checkout => self.checkout(actor),
            ShopCommand::CloseTicket { owner } => self.close_ticket(actor, owner),
        };

        if let Err(err) = &result {
            tracing::debug!(user = %actor.user, error = %err, "shop command refused");
        }
        result
    }

    fn render(&self, request: RenderRequest) {
        tracing::trace!(kind = request.kind(), "render request");
        // Fire and forget: no subscriber just means nothing to draw.
        let _ = self.render_tx.send(request);
    }

    fn setup(&self) -> Result<Reply, ShopError> {
        let text = "Welcome to the shop! Browse items with `shop`, add one to your cart \
                    with `+ <item>`, drop one with `- <item>`, review with `cart`, and \
                    `checkout` to open a private ticket with your order. Staff manage the \
                    catalog with `add`, `remove`, and `stock`."
            .to_string();
        Ok(Reply::Welcome { text })
    }

    fn add_item(
        &self,
        actor: &Actor,
        name: &str,
        price: f64,
        stock: i64,
    ) -> Result<Reply, ShopError> {
        actor.require_staff("add item")?;
        if !price.is_finite() || price < 0.0 {
            return Err(ShopError::InvalidPrice(price));
        }
        let stock = validate_stock(stock)?;
        let unit_price = Money::from_decimal(price, self.config.currency);

        let (name, price, stock) = {
            let mut state = self.state.write();
            let item = state.catalog.add_item(name, unit_price, stock)?;
            (item.name.clone(), item.unit_price, item.stock)
        };

        tracing::info!(item = %name, price = %price, stock, "item added");
        self.render(RenderRequest::ShowItemCard {
            name: name.clone(),
            price,
            stock,
            requested_by: actor.user.clone(),
        });
        Ok(Reply::ItemAdded { name, price, stock })
    }

    fn remove_item(&self, actor: &Actor, name: &str) -> Result<Reply, ShopError> {
        actor.require_staff("remove item")?;

        let (item, carts_touched) = {
            let mut state = self.state.write();
            let (item, cascade) = state.catalog.remove_item(name)?;
            let touched = state.carts.apply(&cascade);
            (item, touched)
        };

        tracing::info!(item = %item.name, carts_touched, "item removed");
        self.render(RenderRequest::RetireItemCard {
            name: item.name.clone(),
            display_ref: item.display_ref,
        });
        Ok(Reply::ItemRemoved {
            name: item.name,
            carts_touched,
        })
    }

    fn set_stock(&self, actor: &Actor, name: &str, stock: i64) -> Result<Reply, ShopError> {
        actor.require_staff("set stock")?;
        let stock = validate_stock(stock)?;

        let (name, price, carts_clamped) = {
            let mut state = self.state.write();
            let cascade = state.catalog.set_stock(name, stock)?;
            let clamped = state.carts.apply(&cascade);
            let item = state
                .catalog
                .get(name)
                .ok_or_else(|| ShopError::ItemNotFound(name.to_string()))?;
            (item.name.clone(), item.unit_price, clamped)
        };

        tracing::info!(item = %name, stock, carts_clamped, "stock updated");
        self.render(RenderRequest::UpdateItemCard {
            name: name.clone(),
            price,
            stock,
        });
        Ok(Reply::StockSet {
            name,
            stock,
            carts_clamped,
        })
    }

    fn view_catalog(&self) -> Result<Reply, ShopError> {
        let state = self.state.read();
        let items = state
            .catalog
            .iter()
            .map(|i| ItemSummary {
                name: i.name.clone(),
                price: i.unit_price,
                stock: i.stock,
            })
            .collect();
        Ok(Reply::CatalogView { items })
    }

    fn view_cart(&self, actor: &Actor) -> Result<Reply, ShopError> {
        let state = self.state.read();
        let snapshot = state.carts.snapshot(&actor.user);

        let mut lines = Vec::with_capacity(snapshot.len());
        for cart_line in &snapshot {
            let Some(item) = state.catalog.get_by_key(&cart_line.key) else {
                continue;
            };
            let line_total = item
                .unit_price
                .try_multiply(cart_line.quantity as i64)
                .ok_or(ShopError::Overflow)?;
            lines.push(CartLineView {
                name: item.name.clone(),
                quantity: cart_line.quantity,
                unit_price: item.unit_price,
                line_total,
            });
        }
        let total = Money::try_sum(lines.iter().map(|l| &l.line_total), self.config.currency)
            .ok_or(ShopError::Overflow)?;

        Ok(Reply::CartView { lines, total })
    }

    fn add_to_cart(&self, actor: &Actor, item_name: &str) -> Result<Reply, ShopError> {
        let (name, quantity) = {
            let mut state = self.state.write();
            let item = state
                .catalog
                .get(item_name)
                .ok_or_else(|| ShopError::ItemNotFound(item_name.to_string()))?
                .clone();
            let current = state.carts.quantity(&actor.user, &item.key);
            if current >= self.config.max_quantity_per_line {
                return Err(ShopError::QuantityExceedsLimit(
                    current.saturating_add(1),
                    self.config.max_quantity_per_line,
                ));
            }
            let quantity = state.carts.increment(&actor.user, &item)?;
            (item.name, quantity)
        };

        self.render(RenderRequest::UpdateCartButtons {
            user: actor.user.clone(),
            item: name.clone(),
            quantity,
        });
        Ok(Reply::CartUpdated {
            item: name,
            quantity,
        })
    }

    fn remove_from_cart(&self, actor: &Actor, item_name: &str) -> Result<Reply, ShopError> {
        let key = till_core::ids::ItemKey::new(item_name);
        let quantity = {
            let mut state = self.state.write();
            state.carts.decrement(&actor.user, &key)
        };

        self.render(RenderRequest::UpdateCartButtons {
            user: actor.user.clone(),
            item: item_name.to_string(),
            quantity,
        });
        Ok(Reply::CartUpdated {
            item: item_name.to_string(),
            quantity,
        })
    }

    fn checkout(&self, actor: &Actor) -> Result<Reply, ShopError> {
        let mut card_updates = Vec::new();
        let (order, ticket) = {
            let mut guard = self.state.write();
            let state = &mut *guard;
            let snapshot = state.carts.snapshot(&actor.user);
            let (order, ticket) = state.checkout.begin_checkout(
                &actor.user,
                &snapshot,
                &state.catalog,
                self.config.currency,
            )?;
            state.carts.clear(&actor.user);

            if self.config.deduct_stock_on_checkout {
                for line in &order.lines {
                    if let Some(item) = state.catalog.get_by_key(&line.key) {
                        let remaining = item.stock.saturating_sub(line.quantity);
                        let cascade = state.catalog.set_stock_by_key(&line.key, remaining)?;
                        state.carts.apply(&cascade);
                        card_updates.push(RenderRequest::UpdateItemCard {
                            name: line.name.clone(),
                            price: line.unit_price,
                            stock: remaining,
                        });
                    }
                }
            }
            (order, ticket)
        };
        for update in card_updates {
            self.render(update);
        }

        tracing::info!(
            user = %actor.user,
            ticket = %ticket,
            total = %order.total,
            lines = order.lines.len(),
            "checkout started"
        );
        self.render(RenderRequest::OpenTicket {
            user: actor.user.clone(),
            ticket: ticket.clone(),
        });
        self.render(RenderRequest::PostOrderSummary {
            ticket: ticket.clone(),
            order: order.clone(),
        });
        Ok(Reply::CheckoutStarted { ticket, order })
    }

    fn close_ticket(&self, actor: &Actor, owner: Option<UserId>) -> Result<Reply, ShopError> {
        let target = owner.unwrap_or_else(|| actor.user.clone());
        if target != actor.user {
            actor.require_staff("closing another user's ticket")?;
        }

        let ticket = {
            let mut state = self.state.write();
            state.checkout.close_ticket(&target)?
        };

        let grace = self.config.ticket_grace();
        tracing::info!(
            user = %target,
            ticket = %ticket,
            grace_secs = grace.as_secs(),
            "ticket closed"
        );
        self.teardown.schedule(ticket.clone(), grace);
        self.render(RenderRequest::Notice {
            user: target,
            text: format!(
                "Ticket closed. The channel disappears in {}s.",
                grace.as_secs()
            ),
        });
        Ok(Reply::TicketClosed {
            ticket,
            teardown_secs: grace.as_secs(),
        })
    }
}

impl Default for ShopService {
    fn default() -> Self {
        Self::new(ShopConfig::default())
    }
}

/// Validate operator-entered stock before it reaches the core.
fn validate_stock(stock: i64) -> Result<u32, ShopError> {
    if stock < 0 {
        return Err(ShopError::NegativeStock(stock));
    }
    u32::try_from(stock).map_err(|_| ShopError::InvalidQuantity(stock))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use till_core::ids::UserId;

    fn staff() -> Actor {
        Actor::staff("admin")
    }

    fn member(id: &str) -> Actor {
        Actor::member(id)
    }

    fn service_with_potion(stock: i64) -> ShopService {
        let service = ShopService::default();
        service
            .execute(
                &staff(),
                ShopCommand::AddItem {
                    name: "Potion".to_string(),
                    price: 5.0,
                    stock,
                },
            )
            .unwrap();
        service
    }

    fn add_to_cart(service: &ShopService, actor: &Actor) -> Result<Reply, ShopError> {
        service.execute(
            actor,
            ShopCommand::AddToCart {
                item: "Potion".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_member_cannot_manage_catalog() {
        let service = ShopService::default();
        let err = service
            .execute(
                &member("u1"),
                ShopCommand::AddItem {
                    name: "Potion".to_string(),
                    price: 5.0,
                    stock: 3,
                },
            )
            .unwrap_err();
        assert!(matches!(err, ShopError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_add_item_rejects_bad_input() {
        let service = ShopService::default();
        assert_eq!(
            service
                .execute(
                    &staff(),
                    ShopCommand::AddItem {
                        name: "Potion".to_string(),
                        price: 5.0,
                        stock: -1,
                    },
                )
                .unwrap_err(),
            ShopError::NegativeStock(-1)
        );
        assert_eq!(
            service
                .execute(
                    &staff(),
                    ShopCommand::AddItem {
                        name: "Potion".to_string(),
                        price: -0.5,
                        stock: 3,
                    },
                )
                .unwrap_err(),
            ShopError::InvalidPrice(-0.5)
        );
    }

    #[tokio::test]
    async fn test_duplicate_item_rejected() {
        let service = service_with_potion(3);
        let err = service
            .execute(
                &staff(),
                ShopCommand::AddItem {
                    name: "potion".to_string(),
                    price: 1.0,
                    stock: 1,
                },
            )
            .unwrap_err();
        assert!(matches!(err, ShopError::DuplicateItem(_)));
    }

    #[tokio::test]
    async fn test_potion_scenario() {
        // add Potion price 5 stock 3, increment x4: third succeeds at
        // qty 3, fourth fails; set stock 1 clamps the cart line to 1.
        let service = service_with_potion(3);
        let u1 = member("u1");

        for expected in 1..=3 {
            let reply = add_to_cart(&service, &u1).unwrap();
            assert_eq!(
                reply,
                Reply::CartUpdated {
                    item: "Potion".to_string(),
                    quantity: expected,
                }
            );
        }
        let err = add_to_cart(&service, &u1).unwrap_err();
        assert_eq!(
            err,
            ShopError::StockExceeded {
                item: "Potion".to_string(),
                requested: 4,
                available: 3,
            }
        );

        let reply = service
            .execute(
                &staff(),
                ShopCommand::SetStock {
                    name: "Potion".to_string(),
                    stock: 1,
                },
            )
            .unwrap();
        assert_eq!(
            reply,
            Reply::StockSet {
                name: "Potion".to_string(),
                stock: 1,
                carts_clamped: 1,
            }
        );

        match service.execute(&u1, ShopCommand::ViewCart).unwrap() {
            Reply::CartView { lines, total } => {
                assert_eq!(lines.len(), 1);
                assert_eq!(lines[0].quantity, 1);
                assert_eq!(total.amount_cents, 500);
            }
            other => panic!("expected CartView, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_remove_item_empties_carts() {
        let service = service_with_potion(3);
        let u1 = member("u1");
        add_to_cart(&service, &u1).unwrap();

        let reply = service
            .execute(
                &staff(),
                ShopCommand::RemoveItem {
                    name: "Potion".to_string(),
                },
            )
            .unwrap();
        assert_eq!(
            reply,
            Reply::ItemRemoved {
                name: "Potion".to_string(),
                carts_touched: 1,
            }
        );

        match service.execute(&u1, ShopCommand::ViewCart).unwrap() {
            Reply::CartView { lines, .. } => assert!(lines.is_empty()),
            other => panic!("expected CartView, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_fails() {
        let service = service_with_potion(3);
        let err = service
            .execute(&member("u1"), ShopCommand::Checkout)
            .unwrap_err();
        assert_eq!(err, ShopError::EmptyCart);
    }

    #[tokio::test]
    async fn test_checkout_and_double_checkout() {
        let service = service_with_potion(3);
        let u1 = member("u1");
        add_to_cart(&service, &u1).unwrap();
        add_to_cart(&service, &u1).unwrap();

        let (ticket, order) = match service.execute(&u1, ShopCommand::Checkout).unwrap() {
            Reply::CheckoutStarted { ticket, order } => (ticket, order),
            other => panic!("expected CheckoutStarted, got {:?}", other),
        };
        assert_eq!(order.total.amount_cents, 1000);
        assert_eq!(order.lines[0].quantity, 2);

        // Cart was cleared, so a second checkout finds it empty, but an
        // open ticket is reported first.
        add_to_cart(&service, &u1).unwrap();
        let err = service.execute(&u1, ShopCommand::Checkout).unwrap_err();
        assert_eq!(err, ShopError::TicketAlreadyOpen("u1".to_string()));

        service
            .execute(&u1, ShopCommand::CloseTicket { owner: None })
            .unwrap();
        // After closing, checkout works again with the fresh cart line.
        match service.execute(&u1, ShopCommand::Checkout).unwrap() {
            Reply::CheckoutStarted { ticket: second, .. } => assert_ne!(second, ticket),
            other => panic!("expected CheckoutStarted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_checkout_does_not_touch_stock_by_default() {
        let service = service_with_potion(3);
        let u1 = member("u1");
        add_to_cart(&service, &u1).unwrap();
        service.execute(&u1, ShopCommand::Checkout).unwrap();

        match service.execute(&u1, ShopCommand::ViewCatalog).unwrap() {
            Reply::CatalogView { items } => assert_eq!(items[0].stock, 3),
            other => panic!("expected CatalogView, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_checkout_deducts_stock_when_enabled() {
        let service = ShopService::new(ShopConfig::new().with_stock_deduction(true));
        service
            .execute(
                &staff(),
                ShopCommand::AddItem {
                    name: "Potion".to_string(),
                    price: 5.0,
                    stock: 3,
                },
            )
            .unwrap();
        let u1 = member("u1");
        add_to_cart(&service, &u1).unwrap();
        add_to_cart(&service, &u1).unwrap();
        service.execute(&u1, ShopCommand::Checkout).unwrap();

        match service.execute(&u1, ShopCommand::ViewCatalog).unwrap() {
            Reply::CatalogView { items } => assert_eq!(items[0].stock, 1),
            other => panic!("expected CatalogView, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_member_cannot_close_others_ticket() {
        let service = service_with_potion(3);
        let u1 = member("u1");
        add_to_cart(&service, &u1).unwrap();
        service.execute(&u1, ShopCommand::Checkout).unwrap();

        let err = service
            .execute(
                &member("u2"),
                ShopCommand::CloseTicket {
                    owner: Some(UserId::new("u1")),
                },
            )
            .unwrap_err();
        assert!(matches!(err, ShopError::Unauthorized(_)));

        // Staff can.
        service
            .execute(
                &staff(),
                ShopCommand::CloseTicket {
                    owner: Some(UserId::new("u1")),
                },
            )
            .unwrap();
    }

    #[tokio::test]
    async fn test_close_without_ticket() {
        let service = ShopService::default();
        let err = service
            .execute(&member("u1"), ShopCommand::CloseTicket { owner: None })
            .unwrap_err();
        assert_eq!(err, ShopError::NoOpenTicket);
    }

    #[tokio::test]
    async fn test_line_cap_is_enforced() {
        let service = ShopService::new(ShopConfig::new().with_line_cap(2));
        service
            .execute(
                &staff(),
                ShopCommand::AddItem {
                    name: "Potion".to_string(),
                    price: 5.0,
                    stock: 10,
                },
            )
            .unwrap();
        let u1 = member("u1");
        add_to_cart(&service, &u1).unwrap();
        add_to_cart(&service, &u1).unwrap();
        let err = add_to_cart(&service, &u1).unwrap_err();
        assert_eq!(err, ShopError::QuantityExceedsLimit(3, 2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticket_deletion_is_deferred() {
        let service = service_with_potion(3);
        let u1 = member("u1");
        let mut renders = service.subscribe_renders();

        add_to_cart(&service, &u1).unwrap();
        service.execute(&u1, ShopCommand::Checkout).unwrap();
        let ticket = match service
            .execute(&u1, ShopCommand::CloseTicket { owner: None })
            .unwrap()
        {
            Reply::TicketClosed { ticket, .. } => ticket,
            other => panic!("expected TicketClosed, got {:?}", other),
        };

        tokio::time::sleep(Duration::from_secs(6)).await;
        let mut deleted = false;
        while let Ok(request) = renders.try_recv() {
            if request == (RenderRequest::DeleteTicket { ticket: ticket.clone() }) {
                deleted = true;
            }
        }
        assert!(deleted, "DeleteTicket should fire after the grace period");
    }

    #[tokio::test]
    async fn test_attach_display_ref_travels_with_removal() {
        use till_core::ids::DisplayRef;

        let service = service_with_potion(3);
        let mut renders = service.subscribe_renders();
        service
            .attach_display_ref("potion", DisplayRef::new("msg-42"))
            .unwrap();

        service
            .execute(
                &staff(),
                ShopCommand::RemoveItem {
                    name: "Potion".to_string(),
                },
            )
            .unwrap();

        let mut retired = None;
        while let Ok(request) = renders.try_recv() {
            if let RenderRequest::RetireItemCard { display_ref, .. } = request {
                retired = display_ref;
            }
        }
        assert_eq!(retired, Some(DisplayRef::new("msg-42")));
    }

    #[tokio::test]
    async fn test_render_requests_for_item_lifecycle() {
        let service = ShopService::default();
        let mut renders = service.subscribe_renders();

        service
            .execute(
                &staff(),
                ShopCommand::AddItem {
                    name: "Potion".to_string(),
                    price: 5.0,
                    stock: 3,
                },
            )
            .unwrap();

        match renders.try_recv().unwrap() {
            RenderRequest::ShowItemCard {
                name,
                price,
                stock,
                requested_by,
            } => {
                assert_eq!(name, "Potion");
                assert_eq!(price.display(), "$5.00");
                assert_eq!(stock, 3);
                assert_eq!(requested_by, UserId::new("admin"));
            }
            other => panic!("expected ShowItemCard, got {:?}", other),
        }
    }
}
