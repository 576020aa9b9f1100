//! Builders for the HTTP state from repository adapters.

use std::sync::Arc;

use mockable::Clock;
use tracing::warn;

use crate::domain::ports::{
    AdminMessageRepository, SkillRepository, SwapNotifier, SwapRepository, UserRepository,
};
use crate::domain::{
    AdminService, PlatformMessageService, SkillModerationPolicy, SkillService, SwapService,
    UserService,
};
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::{
    InMemoryAdminMessageRepository, InMemorySkillRepository, InMemorySwapRepository,
    InMemoryUserRepository,
};
use crate::outbound::notify::LoggingSwapNotifier;
use crate::outbound::persistence::{
    DbPool, DieselAdminMessageRepository, DieselSkillRepository, DieselSwapRepository,
    DieselUserRepository,
};

use super::ServerConfig;

/// Driven ports shared by every service.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub skills: Arc<dyn SkillRepository>,
    pub swaps: Arc<dyn SwapRepository>,
    pub messages: Arc<dyn AdminMessageRepository>,
}

impl Repositories {
    /// PostgreSQL adapters sharing one pool.
    pub fn diesel(pool: &DbPool) -> Self {
        Self {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            skills: Arc::new(DieselSkillRepository::new(pool.clone())),
            swaps: Arc::new(DieselSwapRepository::new(pool.clone())),
            messages: Arc::new(DieselAdminMessageRepository::new(pool.clone())),
        }
    }

    /// Empty process-local adapters.
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            skills: Arc::new(InMemorySkillRepository::new()),
            swaps: Arc::new(InMemorySwapRepository::new()),
            messages: Arc::new(InMemoryAdminMessageRepository::new()),
        }
    }

    fn for_config(config: &ServerConfig) -> Self {
        match &config.db_pool {
            Some(pool) => Self::diesel(pool),
            None => {
                warn!("no database configured; data is kept in memory and lost on exit");
                Self::in_memory()
            }
        }
    }
}

/// Wire the domain services over `repos` and expose them as driving ports.
pub fn build_http_state(
    repos: &Repositories,
    notifier: Arc<dyn SwapNotifier>,
    clock: Arc<dyn Clock>,
    policy: SkillModerationPolicy,
) -> HttpState {
    let Repositories {
        users,
        skills,
        swaps,
        messages,
    } = repos;

    let skill_service = Arc::new(SkillService::new(
        Arc::clone(users),
        Arc::clone(skills),
        Arc::clone(&clock),
        policy,
    ));
    let swap_service = Arc::new(SwapService::new(
        Arc::clone(users),
        Arc::clone(skills),
        Arc::clone(swaps),
        notifier,
        Arc::clone(&clock),
    ));

    HttpState {
        users: Arc::new(UserService::new(
            Arc::clone(users),
            Arc::clone(skills),
            Arc::clone(swaps),
            Arc::clone(&clock),
        )),
        skills: skill_service.clone(),
        skills_query: skill_service.clone(),
        moderation: skill_service,
        swaps: swap_service.clone(),
        swaps_query: swap_service,
        admin: Arc::new(AdminService::new(
            Arc::clone(users),
            Arc::clone(skills),
            Arc::clone(swaps),
            Arc::clone(&clock),
        )),
        messages: Arc::new(PlatformMessageService::new(Arc::clone(messages), clock)),
    }
}

/// Build the server's state, selecting adapters from the configuration.
pub(super) fn state_for_config(config: &ServerConfig) -> HttpState {
    build_http_state(
        &Repositories::for_config(config),
        Arc::new(LoggingSwapNotifier),
        Arc::new(mockable::DefaultClock),
        config.moderation,
    )
}
