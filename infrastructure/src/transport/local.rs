//! In-process transport with registered handlers.
//!
//! Used for development and for the built-in demo storefront: four
//! capability handlers answering over a small canned catalog, so every
//! orchestration pattern can be exercised end-to-end without network
//! dependencies.

use super::{AgentTransport, TransportError};
use async_trait::async_trait;
use concierge_domain::{AgentDescriptor, Capability, WorkingMode};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

type LocalHandler = Arc<dyn Fn(&Value) -> Result<Value, TransportError> + Send + Sync>;

/// The demo catalog: (product, price, stock, aisle).
const CATALOG: [(&str, f64, u32, &str); 5] = [
    ("turbo paint sprayer", 749.0, 6, "aisle 7"),
    ("compact paint sprayer", 299.0, 14, "aisle 7"),
    ("airless spray tips", 39.0, 52, "aisle 8"),
    ("paint thinner 5l", 24.0, 31, "aisle 9"),
    ("half-mask respirator", 59.0, 18, "aisle 9"),
];

/// Transport that dispatches to in-process handler closures.
#[derive(Default)]
pub struct LocalTransport {
    handlers: HashMap<Capability, LocalHandler>,
}

impl LocalTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one capability, replacing any existing one.
    pub fn register(
        mut self,
        capability: Capability,
        handler: impl Fn(&Value) -> Result<Value, TransportError> + Send + Sync + 'static,
    ) -> Self {
        self.handlers.insert(capability, Arc::new(handler));
        self
    }

    /// The built-in demo storefront: inventory, matchmaking, location, and
    /// navigation handlers over the canned catalog.
    pub fn with_demo_agents() -> Self {
        Self::new()
            .register(Capability::new("inventory"), |payload| {
                let items: Vec<Value> = matching_products(payload)
                    .map(|(product, price, stock, _)| {
                        json!({"product": product, "price": price, "inStock": stock})
                    })
                    .collect();
                Ok(json!({ "items": items }))
            })
            .register(Capability::new("matchmaking"), |payload| {
                let matched: Vec<&str> =
                    matching_products(payload).map(|(product, ..)| product).collect();
                let recommended: Vec<&str> = CATALOG
                    .iter()
                    .map(|(product, ..)| *product)
                    .filter(|product| !matched.contains(product))
                    .take(2)
                    .collect();
                Ok(json!({ "recommended": recommended }))
            })
            .register(Capability::new("location"), |payload| {
                let placements: Vec<Value> = matching_products(payload)
                    .map(|(product, _, _, aisle)| json!({"product": product, "aisle": aisle}))
                    .collect();
                Ok(json!({ "placements": placements }))
            })
            .register(Capability::new("navigation"), |payload| {
                let mut aisles: Vec<&str> = matching_products(payload)
                    .map(|(_, _, _, aisle)| aisle)
                    .collect();
                aisles.dedup();
                let route = if aisles.is_empty() {
                    "ask at the service desk by the entrance".to_string()
                } else {
                    format!("from the entrance, head right and follow {}", aisles.join(", then "))
                };
                Ok(json!({ "route": route }))
            })
    }

    /// Descriptors matching the demo handlers, for building a registry.
    pub fn demo_descriptors() -> Vec<AgentDescriptor> {
        vec![
            AgentDescriptor::new(
                Capability::new("inventory"),
                "checks stock levels and price for products",
                "local://inventory",
            )
            .with_mode(WorkingMode::Local),
            AgentDescriptor::new(
                Capability::new("matchmaking"),
                "recommends alternative and related products",
                "local://matchmaking",
            )
            .with_mode(WorkingMode::Local),
            AgentDescriptor::new(
                Capability::new("location"),
                "finds the aisle and shelf where items are stocked",
                "local://location",
            )
            .with_mode(WorkingMode::Local),
            AgentDescriptor::new(
                Capability::new("navigation"),
                "gives walking directions to a shelf in the store",
                "local://navigation",
            )
            .with_mode(WorkingMode::Local),
        ]
    }
}

/// Catalog rows whose product name shares a term with the query.
fn matching_products(payload: &Value) -> impl Iterator<Item = (&'static str, f64, u32, &'static str)> {
    let query = payload
        .get("query")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_lowercase();
    let terms: Vec<String> = query.split_whitespace().map(str::to_string).collect();

    CATALOG.into_iter().filter(move |(product, ..)| {
        terms
            .iter()
            .any(|term| term.len() > 2 && product.contains(term.as_str()))
    })
}

#[async_trait]
impl AgentTransport for LocalTransport {
    fn mode(&self) -> WorkingMode {
        WorkingMode::Local
    }

    async fn send(
        &self,
        descriptor: &AgentDescriptor,
        payload: &Value,
    ) -> Result<String, TransportError> {
        let handler = self.handlers.get(descriptor.capability()).ok_or_else(|| {
            TransportError::Request(format!(
                "no local handler for capability {}",
                descriptor.capability()
            ))
        })?;

        let mut output = handler(payload)?;
        // Stamp the schema tag the descriptor promises, so local agents
        // pass the same validation as remote ones.
        if let Value::Object(map) = &mut output {
            map.entry("schema".to_string())
                .or_insert_with(|| Value::String(descriptor.schema().to_string()));
        }

        serde_json::to_string(&output)
            .map_err(|e| TransportError::Request(format!("unserializable handler output: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(query: &str) -> Value {
        json!({"query": query, "userId": "user-1"})
    }

    #[tokio::test]
    async fn test_demo_inventory_finds_catalog_products() {
        let transport = LocalTransport::with_demo_agents();
        let descriptor = &LocalTransport::demo_descriptors()[0];

        let body = transport
            .send(descriptor, &payload("paint sprayer turbo price 750"))
            .await
            .unwrap();
        let value: Value = serde_json::from_str(&body).unwrap();

        assert_eq!(value["schema"], json!("inventory.v1"));
        let items = value["items"].as_array().unwrap();
        assert!(items
            .iter()
            .any(|i| i["product"] == json!("turbo paint sprayer")));
    }

    #[tokio::test]
    async fn test_unregistered_capability_is_request_error() {
        let transport = LocalTransport::new();
        let descriptor = &LocalTransport::demo_descriptors()[0];

        let err = transport.send(descriptor, &payload("x y z")).await.unwrap_err();
        assert!(matches!(err, TransportError::Request(_)));
    }

    #[tokio::test]
    async fn test_navigation_builds_a_route() {
        let transport = LocalTransport::with_demo_agents();
        let descriptor = &LocalTransport::demo_descriptors()[3];

        let body = transport
            .send(descriptor, &payload("paint sprayer"))
            .await
            .unwrap();
        let value: Value = serde_json::from_str(&body).unwrap();
        assert!(value["route"].as_str().unwrap().contains("aisle 7"));
    }
}
