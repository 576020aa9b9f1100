//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint under `/api/v1`, the view and
//! request body schemas, and the session cookie security scheme. Domain
//! types stay free of utoipa; the schemas live in the inbound layer.
//!
//! The generated document backs Swagger UI (debug builds) and is printed by
//! `cargo run --bin openapi-dump`.

use crate::inbound::http::admin::{
    BanBody, CategoryCountView, DailyCountView, PlatformStatsView, RatedUserView, ReportRowsView,
    ReportView, SkillCountsView, StatusCountView, SwapCountsView, UserCountsView,
};
use crate::inbound::http::messages::{CreateMessageBody, UpdateMessageBody};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::skills::{
    CreateSkillBody, MySkillsView, RejectSkillBody, UpdateSkillBody,
};
use crate::inbound::http::swaps::{CreateSwapBody, RateSwapBody};
use crate::inbound::http::users::{UpdateProfileBody, UserProfileView, UserStatsView};
use crate::inbound::http::views::{
    AdminMessageView, OwnerView, PartyView, RatingView, SkillListingView, SkillSummaryView,
    SkillView, SwapRatingView, SwapRatingsView, SwapView, UserView,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie carrying the identity issued by the authentication service.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "SkillSwap backend API",
        description = "Skill catalogue, swap workflow, ratings, and platform moderation.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_current_user,
        crate::inbound::http::users::browse_users,
        crate::inbound::http::users::search_by_skill,
        crate::inbound::http::users::user_profile,
        crate::inbound::http::users::user_stats,
        crate::inbound::http::skills::my_skills,
        crate::inbound::http::skills::create_skill,
        crate::inbound::http::skills::search_skills,
        crate::inbound::http::skills::update_skill,
        crate::inbound::http::skills::delete_skill,
        crate::inbound::http::skills::pending_skills,
        crate::inbound::http::skills::approve_skill,
        crate::inbound::http::skills::reject_skill,
        crate::inbound::http::swaps::create_swap,
        crate::inbound::http::swaps::my_swaps,
        crate::inbound::http::swaps::get_swap,
        crate::inbound::http::swaps::accept_swap,
        crate::inbound::http::swaps::reject_swap,
        crate::inbound::http::swaps::cancel_swap,
        crate::inbound::http::swaps::complete_swap,
        crate::inbound::http::swaps::rate_swap,
        crate::inbound::http::messages::public_messages,
        crate::inbound::http::messages::create_message,
        crate::inbound::http::messages::list_messages,
        crate::inbound::http::messages::update_message,
        crate::inbound::http::messages::delete_message,
        crate::inbound::http::admin::platform_stats,
        crate::inbound::http::admin::list_users,
        crate::inbound::http::admin::set_ban,
        crate::inbound::http::admin::list_swaps,
        crate::inbound::http::admin::get_report,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RatingView,
        UserView,
        UserProfileView,
        UserStatsView,
        UpdateProfileBody,
        SkillView,
        OwnerView,
        SkillListingView,
        MySkillsView,
        CreateSkillBody,
        UpdateSkillBody,
        RejectSkillBody,
        PartyView,
        SkillSummaryView,
        SwapRatingView,
        SwapRatingsView,
        SwapView,
        CreateSwapBody,
        RateSwapBody,
        AdminMessageView,
        CreateMessageBody,
        UpdateMessageBody,
        BanBody,
        UserCountsView,
        SkillCountsView,
        SwapCountsView,
        PlatformStatsView,
        DailyCountView,
        StatusCountView,
        CategoryCountView,
        RatedUserView,
        ReportRowsView,
        ReportView,
    )),
    tags(
        (name = "users", description = "Profiles and the member directory"),
        (name = "skills", description = "Offered and wanted skills"),
        (name = "moderation", description = "Admin review of listed skills"),
        (name = "swaps", description = "Skill swap proposals, lifecycle, and ratings"),
        (name = "messages", description = "Platform announcements"),
        (name = "admin", description = "Platform statistics, users, and reports"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
