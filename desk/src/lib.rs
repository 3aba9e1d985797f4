//! # Stockroom Desk
//!
//! Component lending desk built on the Stockroom reducer runtime.
//!
//! Members browse the catalog and submit requests; administrators approve or
//! reject them, register returns, and edit the catalog and user directory.
//! Every mutation is one reducer call under the store's write lock, so no
//! interleaving of approvals and returns can push stock below zero.
//!
//! - [`lifecycle`]: submission, approval, rejection, returns
//! - [`reducer`]: commands in, outcome events and notifications out
//! - [`desk`]: `LendingDesk`, the request/response facade
//! - [`server`]: Axum router over the facade
//!
//! ## Example
//!
//! ```ignore
//! use stockroom_desk::{DeskConfig, DeskEnvironment, LendingDesk, seed};
//!
//! let desk = LendingDesk::new(
//!     seed::demo_state(chrono::Utc::now()),
//!     DeskEnvironment::production(),
//!     &DeskConfig::default(),
//! );
//! let approval = desk.approve("req-1".into()).await?;
//! ```

pub mod actions;
pub mod advisor;
pub mod api;
pub mod cart;
pub mod config;
pub mod desk;
pub mod environment;
pub mod error;
pub mod lifecycle;
pub mod notify;
pub mod reducer;
pub mod reports;
pub mod seed;
pub mod server;
pub mod state;
pub mod types;

pub use actions::DeskAction;
pub use advisor::{OverdraftAdvisor, OverdraftVerdict, StockLevelAdvisor};
pub use cart::{Cart, CartItem};
pub use config::{Config, DeskConfig, ServerConfig};
pub use desk::{DeskStore, LendingDesk};
pub use environment::DeskEnvironment;
pub use error::{Entity, LifecycleError};
pub use lifecycle::{Approval, ReturnReceipt, Submission};
pub use notify::{
    Notification, NotificationKind, NotificationSink, RecordingNotifier, TracingNotifier,
};
pub use reducer::DeskReducer;
pub use reports::{ReportRow, WeeklyReport};
pub use state::DeskState;
pub use types::{
    Component, ComponentId, ComponentRequest, CorrelationId, NewComponent, Operation, RequestId,
    RequestLine, RequestStatus, User, UserDetails, UserId,
};
