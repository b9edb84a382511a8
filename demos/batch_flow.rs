//! Batch dispatch demonstration.
//!
//! This example runs one batch through an in-process application:
//! 1. Install a `tracing` subscriber so audit records are printed
//! 2. Build a base context as the batch request's server would
//! 3. Dispatch a mix of good, failing, panicking and malformed operations
//! 4. Print each normalized response
//!
//! Run with: `cargo run --example batch_flow`
//! Set `RUST_LOG=debug` to also see per-operation dispatch events.

use batch_dispatch::context::keys;
use batch_dispatch::logging::{init_logging, LoggingConfig};
use batch_dispatch::{BatchConfig, BatchDispatcher, Context, Fault, RawResult};
use serde_json::json;

fn app(ctx: &mut Context) -> Result<RawResult, Fault> {
    let method = ctx.get_str(keys::REQUEST_METHOD).unwrap_or("GET").to_string();
    let path = ctx.get_str(keys::PATH_INFO).unwrap_or("/").to_string();

    match (method.as_str(), path.as_str()) {
        ("GET", "/me") => {
            let token = ctx.get_str("HTTP_AUTHORIZATION").unwrap_or("anonymous");
            Ok(RawResult::json(200, json!({"name": "Ann", "token": token})))
        }
        ("GET", "/widgets") => Ok(RawResult::json(
            200,
            json!({"widgets": [], "query": ctx.get(keys::REQUEST_QUERY_HASH)}),
        )),
        ("POST", "/sessions") => Err(Fault::with_status(401, "invalid credentials")),
        ("GET", "/reports") => panic!("report cache corrupted"),
        _ => Err(Fault::with_status(404, format!("no route for {method} {path}"))),
    }
}

fn main() {
    init_logging(LoggingConfig::text());

    println!("=== Batch Flow Example ===\n");

    let mut base = Context::new();
    base.insert(keys::REQUEST_METHOD, "POST");
    base.insert(keys::REQUEST_URI, "https://api.example.com/batch");
    base.insert(keys::PATH_INFO, "/batch");
    base.insert("HTTP_AUTHORIZATION", "Bearer batch-token");

    let config = BatchConfig::from_env();
    let dispatcher = match BatchDispatcher::new(&config, app) {
        Ok(dispatcher) => dispatcher,
        Err(error) => {
            eprintln!("cannot build dispatcher: {error}");
            return;
        }
    };

    let operations = [
        json!({"method": "get", "url": "/me"}),
        json!({"method": "get", "url": "/widgets?color=red", "params": {"color": "red"}}),
        json!({
            "method": "post",
            "url": "/sessions",
            "params": {"email": "ann@example.com", "password": "hunter2"}
        }),
        json!({"url": "/reports"}),
        json!({"method": "get"}),
    ];

    for (index, result) in dispatcher.dispatch_all(&operations, &base).iter().enumerate() {
        match result {
            Ok(response) => println!(
                "#{index} -> {} {}",
                response.status,
                serde_json::to_string(&response.body).unwrap_or_default()
            ),
            Err(error) => println!("#{index} -> rejected ({}): {error}", error.status_code()),
        }
    }

    println!("\nThe base context is untouched:");
    println!(
        "  PATH_INFO = {}",
        base.get_str(keys::PATH_INFO).unwrap_or_default()
    );

    println!("\n=== Example Complete ===");
}
