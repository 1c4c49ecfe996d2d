//! Colony Actor Network
//!
//! A population of message-driven ants for measuring actor throughput and
//! round-trip latency. Each ant owns a bounded inbox and a private random
//! source; outgoing messages travel in their own spawned tasks, so receive
//! loops never wait on a peer.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐  Schedule   ┌───────────────────────────────────────┐
//! │  Driver  │────────────▶│               Directory               │
//! └──────────┘             │  ant-0 inbox │ ant-1 inbox │ ... │ N  │
//!                          └──────┬────────────▲──────────────────┘
//!                                 │            │ Greeting / Ack
//!                                 ▼            │ (spawned send task)
//!                          ┌──────────────┐    │
//!                          │  Ant receive │────┘
//!                          │     loop     │
//!                          └──────┬───────┘
//!                                 │ Inspect (in inbox order)
//!                                 ▼
//!                          ┌──────────────┐
//!                          │  Collector   │──▶ Report
//!                          └──────────────┘
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use colony_actors::run;
//! use colony_config::ColonyConfig;
//!
//! # async fn demo() -> colony_actors::Result<()> {
//! let config = ColonyConfig { population: 1_000, duration_secs: 1.0, ..Default::default() };
//! let outcome = run(&config).await?;
//! println!("{} messages", outcome.report.total_messages);
//! # Ok(())
//! # }
//! ```

pub mod ant;
pub mod collector;
pub mod colony;
pub mod directory;
pub mod driver;
pub mod error;
pub mod message;
pub mod metrics;
pub mod network;

pub use ant::{select_peer, Ant, AntSnapshot};
pub use collector::{reduce, Collector, Report};
pub use colony::{run, Colony, Quiescence, RunOutcome, RunWindow};
pub use directory::{AntRef, Directory};
pub use driver::{inject_schedule, Driver, DriverStop, DriverSummary};
pub use error::{ColonyError, Result};
pub use message::{AntId, Envelope, Message, MessageKind};
pub use metrics::{ColonyMetrics, MetricsSnapshot};
pub use network::{AntSettings, Network};
