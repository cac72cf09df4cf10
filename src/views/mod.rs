//! View models for the three panel screens.
//!
//! Each view turns connection-manager state into what a front end draws and
//! turns button presses back into intents. Views never talk to each other;
//! the controller routes everything.

pub mod advanced;
pub mod detail;
pub mod list;

pub use advanced::AdvancedSettingsView;
pub use detail::{DetailFields, DetailIntent, NetworkDetailView};
pub use list::{ListIntent, NetworkListView, NetworkRow, StatusIcon};
