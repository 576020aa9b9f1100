//! Domain primitives, aggregates, and services.
//!
//! Purpose: Define strongly typed domain entities and the services that
//! enforce the swap lifecycle, rating aggregation, and moderation rules.
//! Nothing here knows about HTTP or SQL; adapters reach the domain through
//! the traits in [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`) — transport-agnostic error payload.
//! - User, Skill, Swap, AdminMessage — the aggregates.
//! - SwapService, SkillService, UserService, AdminService,
//!   PlatformMessageService — driving port implementations.

pub mod actor;
pub mod admin_message;
pub mod admin_service;
pub mod error;
pub mod ids;
pub mod platform_message_service;
pub mod ports;
pub mod rating;
pub mod reports;
pub mod skill;
pub mod skill_service;
pub mod swap;
pub mod swap_details;
pub mod swap_service;
pub mod trace_id;
pub mod user;
pub mod user_service;

pub use self::actor::Actor;
pub use self::admin_message::{
    AdminMessage, AdminMessageUpdate, AdminMessageValidationError, MessageContent, MessageTitle,
    MessageType, NewAdminMessage,
};
pub use self::admin_service::AdminService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{IdValidationError, MessageId, SkillId, SwapId, UserId};
pub use self::platform_message_service::PlatformMessageService;
pub use self::rating::{Rating, RatingAggregate, RatingValidationError, SwapRating};
pub use self::skill::{
    ModerationState, NewSkill, RejectionReason, Skill, SkillLevel, SkillModerationPolicy,
    SkillName, SkillType, SkillUpdate, SkillValidationError,
};
pub use self::skill_service::SkillService;
pub use self::swap::{
    StatusChange, Swap, SwapAction, SwapParty, SwapProposal, SwapRecord, SwapStatus,
    SwapTransitionError, SwapValidationError,
};
pub use self::swap_details::SwapDetailsLoader;
pub use self::swap_service::SwapService;
pub use self::trace_id::TraceId;
pub use self::user::{
    BanRequest, CredentialHash, DisplayName, EmailAddress, ProfileUpdate, User, UserRole,
    UserValidationError,
};
pub use self::user_service::UserService;
