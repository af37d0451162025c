//! REST API handlers

mod admin;
mod auth;
mod logs;
mod protocols;
mod scoring;
mod sessions;
mod system;
mod users;

pub use admin::admin_stats;
pub use auth::{login, logout, verify_token};
pub use logs::list_coherence_logs;
pub use protocols::{create_protocol, delete_protocol, get_protocol, list_protocols};
pub use scoring::calculate_sfrc;
pub use sessions::{complete_session, get_session, list_sessions, start_session};
pub use system::{health_check, platform_info};
pub use users::{create_user, delete_user, get_user, list_users};
