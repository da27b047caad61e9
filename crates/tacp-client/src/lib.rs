//! ThinkAgile CP REST API Client
//!
//! A Rust client library for the Lenovo ThinkAgile CP cloud platform portal.
//! Provides type-safe models and methods for application instances, networks,
//! virtual datacenters, and inventory queries.
//!
//! # Example
//!
//! ```no_run
//! use tacp_client::{PowerAction, TacpClient, TacpClientTrait};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Create a client
//! let client = TacpClient::new(
//!     "https://manage.cp.lenovo.com".to_string(),
//!     "your-api-key".to_string(),
//! )?;
//!
//! // Look up an application instance by name
//! if let Some(instance) = client.find_instance_by_name("Web Server 1").await? {
//!     // Issue a power action and poll the returned action UUID
//!     let response = client.power_instance(&instance.uuid, PowerAction::Shutdown).await?;
//!     if let Some(action_uuid) = response.action_uuid {
//!         let action = client.get_action(&action_uuid).await?;
//!         println!("action {} is {:?}", action.uuid, action.status);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Instances**: Create, delete, power, and reshape application instances
//! - **Networks**: VLAN and VNET management including NFV routing services
//! - **Datacenters**: Virtual datacenter creation with resource allocations
//! - **Inventory**: Migration zones, storage pools, templates, sites, categories

pub mod client;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod tacp_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::TacpClient;
pub use error::TacpError;
pub use models::*;
pub use tacp_trait::TacpClientTrait;
#[cfg(feature = "test-util")]
pub use mock::MockTacpClient;
