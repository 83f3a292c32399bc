//! Output formatting for the CLI.

use console::style;

use till_service::command::{CartLineView, ItemSummary};
use till_core::checkout::Order;

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    /// Create a new output handler.
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    /// Print an info message.
    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: &str) {
        if self.json {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow(), msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!(r#"{{"error": "{}"}}"#, msg.replace('"', "\\\""));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    /// Print a header/title.
    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a step in a process.
    pub fn step(&self, num: usize, total: usize, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style(format!("[{}/{}]", num, total)).dim(), msg);
    }

    /// Print JSON output.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// Print a key-value pair.
    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(&self, item: &str) {
        if self.json {
            return;
        }
        println!("  {} {}", style("•").dim(), item);
    }

    /// Check if verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Render an item card the way the bot would render an embed.
    pub fn item_card(&self, name: &str, price: &str, stock: u32, requested_by: Option<&str>) {
        if self.json {
            return;
        }
        println!();
        println!("  {}", style(name).bold().green());
        println!("  Price: {}", price);
        println!("  Stock: {}", stock_badge(stock));
        if let Some(user) = requested_by {
            println!("  {}", style(format!("Requested by {}", user)).dim());
        }
        println!();
    }

    /// Render a catalog listing.
    pub fn catalog(&self, items: &[ItemSummary]) {
        if self.json {
            self.json(&items);
            return;
        }
        if items.is_empty() {
            self.info("The shop is empty.");
            return;
        }
        self.header("Shop");
        for item in items {
            println!(
                "  {:<20} {:>10}  {}",
                style(&item.name).bold(),
                item.price.display(),
                stock_badge(item.stock)
            );
        }
    }

    /// Render a cart listing with a total line.
    pub fn cart(&self, lines: &[CartLineView], total: &str) {
        if self.json {
            self.json(&lines);
            return;
        }
        if lines.is_empty() {
            self.info("Your cart is empty.");
            return;
        }
        self.header("Cart");
        for line in lines {
            println!(
                "  {:<20} x{:<3} {:>10}",
                style(&line.name).bold(),
                line.quantity,
                line.line_total.display()
            );
        }
        println!("  {:<25} {:>10}", style("Total").bold(), style(total).bold());
    }

    /// Render an order summary the way it would appear in a ticket.
    pub fn order_summary(&self, order: &Order) {
        if self.json {
            self.json(order);
            return;
        }
        self.header(&format!("Order {}", order.id));
        for line in &order.lines {
            println!(
                "  {:<20} x{:<3} {:>10}",
                line.name,
                line.quantity,
                line.line_total.display()
            );
        }
        println!(
            "  {:<25} {:>10}",
            style("Total").bold(),
            style(order.total.display()).bold()
        );
    }
}

/// Colored stock count: green in stock, red when sold out.
fn stock_badge(stock: u32) -> String {
    if stock == 0 {
        style("sold out").red().to_string()
    } else {
        style(format!("{} in stock", stock)).green().to_string()
    }
}
