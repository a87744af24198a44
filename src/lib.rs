//! Discovery and event streaming for PlayStation 4 controllers on Linux.
//!
//! ```rust,no_run
//! use ps4_input::controller::{discover, watch, ControllerEvent, DeviceRole};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let input = discover()?
//!     .into_iter()
//!     .find(|input| input.role == DeviceRole::Controller)
//!     .ok_or("no controller node")?;
//!
//! let token = CancellationToken::new();
//! let mut events = watch(token.clone(), input)?;
//! while let Some(event) = events.recv().await {
//!     if let ControllerEvent::Key(key) = event {
//!         println!("{} {:?}", key.button, key.state);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controller;

pub use config::Settings;
