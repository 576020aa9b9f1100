//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AdminConsole, PlatformMessages, SkillCommand, SkillModeration, SkillQuery, SwapCommand,
    SwapQuery, UserDirectory,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UserDirectory>,
    pub skills: Arc<dyn SkillCommand>,
    pub skills_query: Arc<dyn SkillQuery>,
    pub moderation: Arc<dyn SkillModeration>,
    pub swaps: Arc<dyn SwapCommand>,
    pub swaps_query: Arc<dyn SwapQuery>,
    pub admin: Arc<dyn AdminConsole>,
    pub messages: Arc<dyn PlatformMessages>,
}
