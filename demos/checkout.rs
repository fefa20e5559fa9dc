//! Checkout Flow
//!
//! This demo walks a shopping cart through a guarded checkout.
//!
//! Key concepts:
//! - Lazily constructed states (Cart -> Shipping -> Payment -> Receipt)
//! - Entry guards over the activation arguments
//! - A state that refuses to be left while work is unfinished
//! - Lifecycle events and the `state-done` signal
//!
//! Run with: RUST_LOG=stagehand=debug cargo run --example checkout

use async_trait::async_trait;
use stagehand::core::{Guard, ManagedState, StateError};
use stagehand::events::{ControllerEvent, StateSignal, StateSignals};
use stagehand::{transition_table, ControllerBuilder, ControllerError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug, Default)]
struct Order {
    items: Vec<String>,
    address: Option<String>,
}

// Pure guards
fn has_items(order: &Order) -> bool {
    !order.items.is_empty()
}

fn has_address(order: &Order) -> bool {
    order.address.is_some()
}

#[derive(Default)]
struct Cart {
    signals: StateSignals,
}

#[async_trait]
impl ManagedState<Order> for Cart {
    async fn activate(&self, order: &Order) -> Result<(), StateError> {
        println!("  cart holds {} item(s)", order.items.len());
        Ok(())
    }

    fn signals(&self) -> &StateSignals {
        &self.signals
    }
}

#[derive(Default)]
struct Shipping {
    signals: StateSignals,
}

#[async_trait]
impl ManagedState<Order> for Shipping {
    async fn activate(&self, order: &Order) -> Result<(), StateError> {
        println!("  shipping to {}", order.address.as_deref().unwrap_or("?"));
        Ok(())
    }

    fn signals(&self) -> &StateSignals {
        &self.signals
    }
}

/// Charges the card and refuses to be left until the charge settles.
#[derive(Default)]
struct Payment {
    settled: AtomicBool,
    signals: StateSignals,
}

#[async_trait]
impl ManagedState<Order> for Payment {
    async fn activate(&self, _order: &Order) -> Result<(), StateError> {
        tokio::time::sleep(Duration::from_millis(10)).await;
        self.settled.store(true, Ordering::SeqCst);
        println!("  payment settled");
        self.signals.emit(StateSignal::Done, &());
        Ok(())
    }

    fn signals(&self) -> &StateSignals {
        &self.signals
    }

    async fn can_deactivate(&self, _next: &str) -> Result<bool, StateError> {
        Ok(self.settled.load(Ordering::SeqCst))
    }
}

#[derive(Default)]
struct Receipt {
    signals: StateSignals,
}

#[async_trait]
impl ManagedState<Order> for Receipt {
    async fn activate(&self, order: &Order) -> Result<(), StateError> {
        println!("  receipt for {:?}", order.items);
        Ok(())
    }

    fn signals(&self) -> &StateSignals {
        &self.signals
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Checkout Flow ===\n");

    let controller = ControllerBuilder::<Order>::new()
        .state("cart", Cart::default)
        .guarded_state("shipping", Shipping::default, Guard::new(has_items))
        .guarded_state("payment", Payment::default, Guard::new(has_address))
        .state("receipt", Receipt::default)
        .table(transition_table! {
            "cart" <= [initial, "shipping"],
            "shipping" <= ["cart"],
            "payment" <= ["shipping"],
            "receipt" <= ["payment"],
        })
        .phase_timeout(Duration::from_secs(1))
        .build()?;

    for event in ControllerEvent::ALL {
        controller.on(event, move |handle| {
            println!("  [{event}] {}", handle.name());
        });
    }

    let mut order = Order::default();

    println!("Opening the cart");
    controller.activate("cart", order.clone()).await?;

    println!("\nTrying to ship an empty cart");
    match controller.activate("shipping", order.clone()).await {
        Err(err @ ControllerError::GuardRejected { .. }) => println!("  refused: {err}"),
        other => println!("  unexpected: {other:?}"),
    }

    order.items.push("teapot".to_string());
    order.items.push("two cups".to_string());

    println!("\nShipping a filled cart");
    controller.activate("shipping", order.clone()).await?;

    println!("\nSkipping straight to the receipt");
    if let Err(err) = controller.activate("receipt", order.clone()).await {
        println!("  refused: {err}");
    }

    order.address = Some("221B Baker Street".to_string());

    println!("\nPaying");
    controller.activate("payment", order.clone()).await?;

    println!("\nPrinting the receipt");
    controller.activate("receipt", order).await?;

    println!("\nVisited:");
    for record in controller.history().records() {
        println!(
            "  {} -> {}",
            record.from.as_deref().unwrap_or("<initial>"),
            record.to
        );
    }

    println!("\nTearing down");
    controller.destroy();

    Ok(())
}
