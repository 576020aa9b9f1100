//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, notifier) are implemented by outbound
//! adapters. Driving ports (commands and queries) are implemented by the
//! domain services and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod admin_console;
mod admin_message_repository;
mod platform_messages;
mod skill_command;
mod skill_moderation;
mod skill_query;
mod skill_repository;
mod swap_command;
mod swap_notifier;
mod swap_query;
mod swap_repository;
mod user_directory;
mod user_repository;

#[cfg(test)]
pub use admin_console::MockAdminConsole;
pub use admin_console::{AdminConsole, AdminUserSearch};
#[cfg(test)]
pub use admin_message_repository::MockAdminMessageRepository;
pub use admin_message_repository::{
    AdminMessageRepository, AdminMessageRepositoryError, MessageFilter,
};
#[cfg(test)]
pub use platform_messages::MockPlatformMessages;
pub use platform_messages::PlatformMessages;
#[cfg(test)]
pub use skill_command::MockSkillCommand;
pub use skill_command::SkillCommand;
#[cfg(test)]
pub use skill_moderation::MockSkillModeration;
pub use skill_moderation::SkillModeration;
#[cfg(test)]
pub use skill_query::MockSkillQuery;
pub use skill_query::{OwnedSkills, OwnerSummary, SkillListing, SkillQuery, SkillSearch};
#[cfg(test)]
pub use skill_repository::MockSkillRepository;
pub use skill_repository::{
    ModerationFilter, SkillFilter, SkillRepository, SkillRepositoryError,
};
#[cfg(test)]
pub use swap_command::MockSwapCommand;
pub use swap_command::{CreateSwapRequest, SwapCommand};
#[cfg(test)]
pub use swap_notifier::MockSwapNotifier;
pub use swap_notifier::{
    NoOpSwapNotifier, SwapEvent, SwapNotification, SwapNotifier, SwapNotifierError,
};
#[cfg(test)]
pub use swap_query::MockSwapQuery;
pub use swap_query::{PartySummary, SkillSummary, SwapDetails, SwapQuery};
#[cfg(test)]
pub use swap_repository::MockSwapRepository;
pub use swap_repository::{SwapFilter, SwapRepository, SwapRepositoryError};
#[cfg(test)]
pub use user_directory::MockUserDirectory;
pub use user_directory::{BrowseUsers, SkillHolderSearch, UserDirectory, UserProfile};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserFilter, UserRepository, UserRepositoryError};
