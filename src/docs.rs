use crate::api::presence::{
    AnalysisRequest, AnalysisResponse, HistoryResponse, RecordPresence, RecordResponse,
    SummaryResponse,
};
use crate::model::presence::{PresenceRecord, PresenceStatus, StatusCounts};
use crate::service::aggregation::{
    AnalysisPeriod, GroupBy, GroupSummary, MonthlySummary, PresenceAnalysis,
};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Presence API",
        version = "1.0.0",
        description = r#"
## Attendance Tracking

Authenticated users record their daily presence; administrators query and
aggregate historical records.

### Key Features
- **Recording**: one record per user per day, status `present`, `excused`, `sick` or `absent`
- **History**: students see their own records, admins see everyone's
- **Monthly summary**: per-status counts of the current month
- **Analysis**: attendance rates grouped by class or position

### Security
All endpoints require a **JWT Bearer** access token issued by the identity provider.
"#,
    ),
    paths(
        crate::api::presence::record_presence,
        crate::api::presence::history,
        crate::api::presence::history_by_user_id,
        crate::api::presence::monthly_summary,
        crate::api::presence::analyze_presence,
    ),
    components(
        schemas(
            PresenceStatus,
            PresenceRecord,
            StatusCounts,
            RecordPresence,
            RecordResponse,
            HistoryResponse,
            SummaryResponse,
            MonthlySummary,
            AnalysisRequest,
            AnalysisResponse,
            AnalysisPeriod,
            GroupBy,
            GroupSummary,
            PresenceAnalysis
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Presence", description = "Attendance recording and reporting APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
