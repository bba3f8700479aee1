// src/catalog.rs
//
// Static registry of purchasable workflow templates. Loaded once at process
// start; price and title are always resolved here, never taken from the
// client.

use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::artifact::{
    ConnectionMap, ConnectionTarget, NodeConnections, WorkflowDefinition, WorkflowNode,
};

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub version: String,
    /// Price in minor currency units (cents).
    pub price_cents: i64,
    pub image: String,
    pub includes: Vec<String>,
    #[serde(skip)]
    pub workflow: WorkflowDefinition,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    pub fn get(&self, id: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// The shipped template set.
    pub fn seed() -> Self {
        Catalog {
            items: vec![order_processing(), content_pipeline()],
        }
    }
}

fn edge(node: &str) -> ConnectionTarget {
    ConnectionTarget {
        node: node.to_string(),
        connection_type: "main".to_string(),
        index: 0,
    }
}

fn order_processing() -> CatalogItem {
    let nodes = vec![
        WorkflowNode {
            id: "webhook-trigger".to_string(),
            name: "Order Webhook".to_string(),
            node_type: "n8n-nodes-base.webhook".to_string(),
            type_version: 1,
            parameters: json!({
                "path": "order-received",
                "httpMethod": "POST",
            }),
            position: [250, 300],
        },
        WorkflowNode {
            id: "validate-order".to_string(),
            name: "Validate Order Data".to_string(),
            node_type: "n8n-nodes-base.function".to_string(),
            type_version: 1,
            parameters: json!({
                "functionCode": "const order = items[0].json;\nif (!order.customer_email || !order.items || !order.total) {\n  throw new Error('Missing required order fields');\n}\nreturn items.map(item => ({\n  json: { ...item.json, validated: true, processing_date: new Date().toISOString() }\n}));",
            }),
            position: [450, 300],
        },
        WorkflowNode {
            id: "update-inventory".to_string(),
            name: "Update Inventory".to_string(),
            node_type: "n8n-nodes-base.httpRequest".to_string(),
            type_version: 4,
            parameters: json!({
                "url": "https://api.shopify.com/admin/api/2023-01/inventory_levels.json",
                "method": "PUT",
                "headers": {
                    "X-Shopify-Access-Token": "={{$env.SHOPIFY_ACCESS_TOKEN}}",
                },
            }),
            position: [650, 200],
        },
        WorkflowNode {
            id: "send-confirmation".to_string(),
            name: "Send Order Confirmation".to_string(),
            node_type: "n8n-nodes-base.gmail".to_string(),
            type_version: 2,
            parameters: json!({
                "operation": "send",
                "subject": "Order Confirmation - {{$json.order_number}}",
                "toList": "={{$json.customer_email}}",
                "message": "Thank you for your order! Your order #{{$json.order_number}} has been received and is being processed.",
            }),
            position: [650, 400],
        },
    ];

    let mut connections = ConnectionMap::new();
    connections.insert(
        "webhook-trigger".to_string(),
        NodeConnections {
            main: vec![vec![edge("validate-order")]],
        },
    );
    connections.insert(
        "validate-order".to_string(),
        NodeConnections {
            main: vec![vec![edge("update-inventory"), edge("send-confirmation")]],
        },
    );

    CatalogItem {
        id: "1".to_string(),
        title: "E-commerce Order Processing".to_string(),
        description: "Complete automation for order processing, inventory updates, and customer notifications across multiple platforms.".to_string(),
        category: "E-commerce".to_string(),
        version: "2.1".to_string(),
        price_cents: 4900,
        image: "/e-commerce-automation-dashboard.png".to_string(),
        includes: vec![
            "Complete n8n workflow JSON".to_string(),
            "Setup documentation".to_string(),
            "Configuration guide".to_string(),
            "Sample data for testing".to_string(),
            "Video walkthrough".to_string(),
        ],
        workflow: WorkflowDefinition {
            name: "E-commerce Order Processing".to_string(),
            nodes,
            connections,
        },
    }
}

fn content_pipeline() -> CatalogItem {
    let nodes = vec![
        WorkflowNode {
            id: "schedule-trigger".to_string(),
            name: "Daily Content Schedule".to_string(),
            node_type: "n8n-nodes-base.cron".to_string(),
            type_version: 1,
            parameters: json!({
                "rule": { "hour": 9, "minute": 0 },
            }),
            position: [250, 300],
        },
        WorkflowNode {
            id: "generate-content".to_string(),
            name: "Generate Content Ideas".to_string(),
            node_type: "n8n-nodes-base.openAi".to_string(),
            type_version: 1,
            parameters: json!({
                "operation": "text",
                "model": "gpt-4",
                "prompt": "Generate 3 engaging social media post ideas for a tech company, including hashtags",
            }),
            position: [450, 300],
        },
        WorkflowNode {
            id: "post-twitter".to_string(),
            name: "Post to Twitter".to_string(),
            node_type: "n8n-nodes-base.twitter".to_string(),
            type_version: 2,
            parameters: json!({
                "operation": "tweet",
                "text": "={{$json.content}}",
            }),
            position: [650, 200],
        },
        WorkflowNode {
            id: "post-linkedin".to_string(),
            name: "Post to LinkedIn".to_string(),
            node_type: "n8n-nodes-base.linkedIn".to_string(),
            type_version: 1,
            parameters: json!({
                "operation": "create",
                "text": "={{$json.content}}",
            }),
            position: [650, 400],
        },
    ];

    let mut connections = ConnectionMap::new();
    connections.insert(
        "schedule-trigger".to_string(),
        NodeConnections {
            main: vec![vec![edge("generate-content")]],
        },
    );
    connections.insert(
        "generate-content".to_string(),
        NodeConnections {
            main: vec![vec![edge("post-twitter"), edge("post-linkedin")]],
        },
    );

    CatalogItem {
        id: "2".to_string(),
        title: "Social Media Content Pipeline".to_string(),
        description: "Automated content creation, scheduling, and performance tracking across all major social platforms.".to_string(),
        category: "Marketing".to_string(),
        version: "1.8".to_string(),
        price_cents: 3900,
        image: "/social-media-automation.png".to_string(),
        includes: vec![
            "Multi-platform workflow JSON".to_string(),
            "API setup guide".to_string(),
            "Content templates".to_string(),
            "Analytics dashboard setup".to_string(),
            "Best practices guide".to_string(),
        ],
        workflow: WorkflowDefinition {
            name: "Social Media Content Pipeline".to_string(),
            nodes,
            connections,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_contains_both_templates() {
        let catalog = Catalog::seed();
        assert_eq!(catalog.items().len(), 2);

        let item = catalog.get("1").unwrap();
        assert_eq!(item.title, "E-commerce Order Processing");
        assert_eq!(item.price_cents, 4900);
        assert_eq!(item.workflow.nodes.len(), 4);

        let item = catalog.get("2").unwrap();
        assert_eq!(item.price_cents, 3900);
    }

    #[test]
    fn unknown_id_is_absent() {
        assert!(Catalog::seed().get("999").is_none());
    }
}
