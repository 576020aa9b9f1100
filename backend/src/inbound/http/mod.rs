//! HTTP inbound adapter exposing the REST API.
//!
//! Handlers translate requests into driving-port calls and port results into
//! JSON views. Every route below lives under `/api/v1`.

pub mod actor;
pub mod admin;
pub mod error;
pub mod health;
pub mod messages;
pub mod schemas;
pub mod session;
pub mod skills;
pub mod state;
pub mod swaps;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;
pub mod views;

use actix_web::web;

pub use error::ApiResult;

/// Register every API handler on `cfg`.
///
/// Actix matches resources in registration order, so each module registers
/// its literal segments (`my-swaps`, `search`, `public`) before `{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(users::configure)
        .configure(skills::configure)
        .configure(swaps::configure)
        .configure(messages::configure)
        .configure(admin::configure);
}
