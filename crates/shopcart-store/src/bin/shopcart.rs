//! # Cart Command-Line Tool
//!
//! Drives a configured cart store from the shell, one command per run.
//!
//! ## Usage
//! ```bash
//! # Show the persisted cart and totals
//! cargo run -p shopcart-store --bin shopcart -- show
//!
//! # Add 3 units of product 1 ("Mug", $10.00, 5 in stock)
//! cargo run -p shopcart-store --bin shopcart -- add 1 Mug 1000 5 3
//!
//! # Use a specific config file
//! cargo run -p shopcart-store --bin shopcart -- --config ./cart.toml checkout 42
//! ```
//!
//! Output is pretty-printed JSON on stdout; logs go to stderr.
//!
//! ## Exit Codes
//! - `0` success
//! - `1` the command was rejected (e.g. out of stock, empty cart)
//! - `2` usage error

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use serde_json::json;
use shopcart_core::{Money, OrderDraft, ProductId, ProductRef, DEFAULT_ADD_QUANTITY};
use shopcart_store::{init_tracing, CartStore, StoreConfig, StoreResult};
use tracing::info;

const USAGE: &str = "\
Usage: shopcart [--config <PATH>] <COMMAND>

Commands:
  show                                         Print the cart and totals
  add <id> <name> <price_cents> <stock> [qty]  Add a product (qty defaults to 1)
  remove <id>                                  Remove a product's line item
  clear                                        Empty the cart
  checkout <user_id>                           Print an order draft for the cart
  forget                                       Delete the persisted cart

Options:
  -c, --config <PATH>  Config file (default: platform config dir cart.toml)
  -h, --help           Show this help message";

#[derive(Debug, PartialEq)]
enum Command {
    Show,
    Add { product: ProductRef, quantity: u32 },
    Remove(ProductId),
    Clear,
    Checkout(u64),
    Forget,
}

#[derive(Debug, PartialEq)]
struct Invocation {
    config_path: Option<PathBuf>,
    command: Command,
}

/// Parses arguments (without the program name). `Ok(None)` means help.
fn parse_args(args: &[String]) -> Result<Option<Invocation>, String> {
    let mut config_path = None;
    let mut rest = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                let path = args.get(i + 1).ok_or("--config needs a path")?;
                config_path = Some(PathBuf::from(path));
                i += 1;
            }
            "--help" | "-h" => return Ok(None),
            _ => rest.push(args[i].as_str()),
        }
        i += 1;
    }

    let command = match rest.as_slice() {
        ["show"] => Command::Show,
        ["add", id, name, price, stock] => Command::Add {
            product: parse_product(id, name, price, stock)?,
            quantity: DEFAULT_ADD_QUANTITY,
        },
        ["add", id, name, price, stock, qty] => Command::Add {
            product: parse_product(id, name, price, stock)?,
            quantity: parse_number(qty, "qty")?,
        },
        ["remove", id] => Command::Remove(parse_id(id)?),
        ["clear"] => Command::Clear,
        ["checkout", user_id] => Command::Checkout(parse_number(user_id, "user_id")?),
        ["forget"] => Command::Forget,
        [] => return Err("missing command".to_string()),
        [other, ..] => return Err(format!("unknown command or wrong arguments: '{}'", other)),
    };

    Ok(Some(Invocation {
        config_path,
        command,
    }))
}

fn parse_product(id: &str, name: &str, price: &str, stock: &str) -> Result<ProductRef, String> {
    Ok(ProductRef::new(
        parse_id(id)?,
        name,
        Money::from_cents(parse_number(price, "price_cents")?),
        parse_number(stock, "stock")?,
    ))
}

fn parse_id(raw: &str) -> Result<ProductId, String> {
    raw.parse()
        .map_err(|_| format!("product id must be a non-negative integer, got '{}'", raw))
}

fn parse_number<T: std::str::FromStr>(raw: &str, field: &str) -> Result<T, String> {
    raw.parse()
        .map_err(|_| format!("{} must be a number, got '{}'", field, raw))
}

fn cart_view(store: &CartStore) -> serde_json::Value {
    json!({
        "items": store.items(),
        "totals": store.totals(),
        "persisted": store.is_persisted(),
        "persistError": store.last_persist_error(),
    })
}

fn execute(store: &mut CartStore, command: Command) -> StoreResult<serde_json::Value> {
    let output = match command {
        Command::Show => cart_view(store),
        Command::Add { product, quantity } => {
            let outcome = store.add_to_cart(&product, quantity)?;
            json!({ "outcome": outcome, "cart": cart_view(store) })
        }
        Command::Remove(product_id) => {
            let removed = store.remove_from_cart(product_id);
            json!({ "removed": removed, "cart": cart_view(store) })
        }
        Command::Clear => {
            store.clear_cart();
            cart_view(store)
        }
        Command::Checkout(user_id) => {
            let draft = OrderDraft::from_cart(user_id, store.cart())?;
            info!(
                reference = %draft.reference,
                lines = draft.order_items.len(),
                "Order draft built"
            );
            json!({ "draft": draft, "request": draft.to_request() })
        }
        Command::Forget => {
            store.forget();
            cart_view(store)
        }
    };
    Ok(output)
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();

    let invocation = match parse_args(&args) {
        Ok(Some(invocation)) => invocation,
        Ok(None) => {
            println!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("error: {}\n\n{}", e, USAGE);
            return ExitCode::from(2);
        }
    };

    init_tracing();

    let config = StoreConfig::load_or_default(invocation.config_path);
    let mut store = match CartStore::from_config(&config) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = execute(&mut store, invocation.command).and_then(|output| {
        let rendered = serde_json::to_string_pretty(&output)?;
        println!("{}", rendered);
        Ok(())
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
