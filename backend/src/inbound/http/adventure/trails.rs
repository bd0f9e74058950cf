//! Trail catalogue handlers.
//!
//! Reads are public; writes require an administrator session.

use actix_web::{delete, get, post, put, web};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use super::{CreatedResponse, MessageResponse};
use crate::domain::{
    Difficulty, LocalizedText, Pricing, Trail, TrailContact, TrailDraft, TrailFilter, TrailId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, TrailContactSchema, TrailSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::AdventureState;
use crate::inbound::http::validation::{
    FieldName, field_error, missing_field_error, parse_optional_vocabulary, parse_record_id,
    parse_vocabulary,
};

/// Accept `true`/`false`, `0`/`1` and their string forms.
fn flexible_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(flag)),
        Some(Value::Number(n)) => Ok(Some(n.as_f64().is_some_and(|n| n != 0.0))),
        Some(Value::String(raw)) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(Some(true)),
            "false" | "0" | "" => Ok(Some(false)),
            other => Err(D::Error::custom(format!("expected a boolean, got '{other}'"))),
        },
        Some(other) => Err(D::Error::custom(format!("expected a boolean, got {other}"))),
    }
}

/// Trilingual text where only English is required.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct LocalizedTextBody {
    pub en: String,
    pub lv: String,
    pub ru: String,
}

impl From<LocalizedTextBody> for LocalizedText {
    fn from(value: LocalizedTextBody) -> Self {
        Self::new(value.en, value.lv, value.ru)
    }
}

/// Trail fields accepted by create and update.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrailRequest {
    pub name: Option<LocalizedTextBody>,
    pub description: Option<LocalizedTextBody>,
    #[schema(example = "Vidzeme")]
    pub region: Option<String>,
    /// One of `easy`, `moderate`, `hard`, `expert`.
    #[schema(example = "moderate")]
    pub difficulty: Option<String>,
    pub distance: Option<String>,
    pub duration: Option<String>,
    pub elevation: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_url: Option<String>,
    pub features: Option<Vec<String>>,
    pub accessibility: Option<String>,
    pub best_time_to_visit: Option<String>,
    pub trail_condition: Option<String>,
    #[serde(default, deserialize_with = "flexible_bool")]
    #[schema(value_type = Option<bool>)]
    pub parking_available: Option<bool>,
    #[serde(default, deserialize_with = "flexible_bool")]
    #[schema(value_type = Option<bool>)]
    pub guided_tours_available: Option<bool>,
    /// Defaults to `true`.
    #[serde(default, deserialize_with = "flexible_bool")]
    #[schema(value_type = Option<bool>)]
    pub free_entry: Option<bool>,
    pub adult_price: Option<f64>,
    pub child_price: Option<f64>,
    #[schema(value_type = Option<TrailContactSchema>)]
    pub contact: Option<TrailContact>,
}

impl TrailRequest {
    fn into_draft(self) -> ApiResult<TrailDraft> {
        let difficulty: Difficulty = match self.difficulty.as_deref() {
            Some(raw) => parse_vocabulary(raw, FieldName::new("difficulty"))?,
            None => return Err(missing_field_error(FieldName::new("difficulty"))),
        };
        let draft = TrailDraft {
            name: self.name.unwrap_or_default().into(),
            description: self.description.unwrap_or_default().into(),
            region: self.region.unwrap_or_default(),
            difficulty,
            distance: self.distance,
            duration: self.duration,
            elevation: self.elevation,
            latitude: self.latitude,
            longitude: self.longitude,
            image_url: self.image_url,
            features: self.features.unwrap_or_default(),
            accessibility: self.accessibility,
            best_time_to_visit: self.best_time_to_visit,
            trail_condition: self.trail_condition,
            parking_available: self.parking_available.unwrap_or(false),
            guided_tours_available: self.guided_tours_available.unwrap_or(false),
            pricing: Pricing {
                free_entry: self.free_entry.unwrap_or(true),
                adult_price: self.adult_price.unwrap_or(0.0),
                child_price: self.child_price.unwrap_or(0.0),
            },
            contact: self.contact.unwrap_or_default(),
        };
        draft.validate().map_err(|err| field_error(err.field(), &err))
    }
}

/// Optional list filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TrailQuery {
    /// Only trails of this difficulty.
    pub difficulty: Option<String>,
    /// Only trails in this region, ignoring case.
    pub region: Option<String>,
}

impl TrailQuery {
    fn into_filter(self) -> ApiResult<TrailFilter> {
        Ok(TrailFilter {
            difficulty: parse_optional_vocabulary(
                self.difficulty.as_deref(),
                FieldName::new("difficulty"),
            )?,
            region: self.region.filter(|region| !region.trim().is_empty()),
        })
    }
}

fn trail_id_from_path(raw: String) -> ApiResult<TrailId> {
    parse_record_id(raw, FieldName::new("id"))
}

/// List trails, newest first.
#[utoipa::path(
    get,
    path = "/api/trails",
    params(TrailQuery),
    responses(
        (status = 200, description = "Trails", body = [TrailSchema]),
        (status = 400, description = "Unknown difficulty", body = ErrorSchema)
    ),
    tags = ["trails"],
    operation_id = "listTrails"
)]
#[get("/trails")]
pub async fn list_trails(
    state: web::Data<AdventureState>,
    query: web::Query<TrailQuery>,
) -> ApiResult<web::Json<Vec<Trail>>> {
    let filter = query.into_inner().into_filter()?;
    Ok(web::Json(state.trails.list(&filter).await?))
}

/// Fetch one trail.
#[utoipa::path(
    get,
    path = "/api/trails/{id}",
    params(("id" = String, Path, description = "Trail id")),
    responses(
        (status = 200, description = "Trail", body = TrailSchema),
        (status = 404, description = "Trail not found", body = ErrorSchema)
    ),
    tags = ["trails"],
    operation_id = "getTrail"
)]
#[get("/trails/{id}")]
pub async fn get_trail(
    state: web::Data<AdventureState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Trail>> {
    let id = trail_id_from_path(path.into_inner())?;
    Ok(web::Json(state.trails.get(&id).await?))
}

/// Publish a trail.
#[utoipa::path(
    post,
    path = "/api/trails",
    request_body = TrailRequest,
    responses(
        (status = 200, description = "Trail created", body = CreatedResponse),
        (status = 400, description = "Invalid trail", body = ErrorSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 403, description = "Not an administrator", body = ErrorSchema)
    ),
    tags = ["trails"],
    operation_id = "createTrail",
    security(("SessionCookie" = []))
)]
#[post("/trails")]
pub async fn create_trail(
    state: web::Data<AdventureState>,
    session: SessionContext,
    payload: web::Json<TrailRequest>,
) -> ApiResult<web::Json<CreatedResponse>> {
    let actor = session.require_user()?;
    let draft = payload.into_inner().into_draft()?;
    let id = state.trails.create(&actor, draft).await?;
    Ok(web::Json(CreatedResponse::new(
        id.to_string(),
        "Trail created successfully",
    )))
}

/// Replace a trail's fields.
#[utoipa::path(
    put,
    path = "/api/trails/{id}",
    params(("id" = String, Path, description = "Trail id")),
    request_body = TrailRequest,
    responses(
        (status = 200, description = "Trail updated", body = MessageResponse),
        (status = 400, description = "Invalid trail", body = ErrorSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 403, description = "Not an administrator", body = ErrorSchema),
        (status = 404, description = "Trail not found", body = ErrorSchema)
    ),
    tags = ["trails"],
    operation_id = "updateTrail",
    security(("SessionCookie" = []))
)]
#[put("/trails/{id}")]
pub async fn update_trail(
    state: web::Data<AdventureState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<TrailRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let actor = session.require_user()?;
    let id = trail_id_from_path(path.into_inner())?;
    let draft = payload.into_inner().into_draft()?;
    state.trails.update(&actor, &id, draft).await?;
    Ok(web::Json(MessageResponse::new("Trail updated successfully")))
}

/// Remove a trail.
#[utoipa::path(
    delete,
    path = "/api/trails/{id}",
    params(("id" = String, Path, description = "Trail id")),
    responses(
        (status = 200, description = "Trail deleted", body = MessageResponse),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 403, description = "Not an administrator", body = ErrorSchema),
        (status = 404, description = "Trail not found", body = ErrorSchema)
    ),
    tags = ["trails"],
    operation_id = "deleteTrail",
    security(("SessionCookie" = []))
)]
#[delete("/trails/{id}")]
pub async fn delete_trail(
    state: web::Data<AdventureState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageResponse>> {
    let actor = session.require_user()?;
    let id = trail_id_from_path(path.into_inner())?;
    state.trails.delete(&actor, &id).await?;
    Ok(web::Json(MessageResponse::new("Trail deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use chrono::Utc;
    use rstest::rstest;
    use serde_json::json;

    use crate::inbound::http::test_utils::{
        AdventureMocks, SIGN_IN_PATH, sample_user, sign_in, sign_in_handler,
        test_session_middleware,
    };

    fn trail(id: &str, difficulty: Difficulty, region: &str) -> Trail {
        let draft = TrailDraft {
            name: LocalizedText::new("Gauja National Park Trail", "", ""),
            description: LocalizedText::default(),
            region: region.to_owned(),
            difficulty,
            distance: Some("12 km".to_owned()),
            duration: None,
            elevation: None,
            latitude: Some(57.3),
            longitude: Some(24.8),
            image_url: None,
            features: vec!["river views".to_owned()],
            accessibility: None,
            best_time_to_visit: None,
            trail_condition: None,
            parking_available: true,
            guided_tours_available: false,
            pricing: Pricing {
                free_entry: true,
                ..Pricing::default()
            },
            contact: TrailContact::default(),
        };
        Trail::from_draft(TrailId::new(id).expect("id"), draft, Utc::now())
    }

    macro_rules! app {
        ($mocks:expr) => {
            test::init_service(
                App::new()
                    .wrap(test_session_middleware())
                    .app_data(web::Data::new($mocks.into_state()))
                    .route(SIGN_IN_PATH, web::post().to(sign_in_handler))
                    .service(
                        web::scope("/api")
                            .service(list_trails)
                            .service(get_trail)
                            .service(create_trail)
                            .service(update_trail)
                            .service(delete_trail),
                    ),
            )
            .await
        };
    }

    #[rstest]
    #[actix_web::test]
    async fn list_filters_by_difficulty_and_region() {
        let mut mocks = AdventureMocks::default();
        mocks.trails.expect_list().returning(|| {
            Ok(vec![
                trail("trail-1", Difficulty::Hard, "Vidzeme"),
                trail("trail-2", Difficulty::Easy, "Vidzeme"),
                trail("trail-3", Difficulty::Hard, "Kurzeme"),
            ])
        });
        let app = app!(mocks);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/trails?difficulty=hard&region=vidzeme")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        let trails = body.as_array().expect("array");
        assert_eq!(trails.len(), 1);
        assert_eq!(trails[0]["id"], "trail-1");
        assert_eq!(trails[0]["freeEntry"], true);
        assert_eq!(trails[0]["features"], json!(["river views"]));
        assert_eq!(trails[0]["trailCondition"], "good");
    }

    #[rstest]
    #[actix_web::test]
    async fn unknown_difficulty_filter_is_rejected() {
        let app = app!(AdventureMocks::default());
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/trails?difficulty=extreme")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], "difficulty");
        assert_eq!(body["details"]["value"], "extreme");
    }

    #[rstest]
    #[actix_web::test]
    async fn admin_creates_trail_with_defaults() {
        let mut mocks = AdventureMocks::default();
        mocks
            .users
            .expect_find_by_id()
            .returning(|_| Ok(Some(sample_user("admin-1", "emalinovskis@me.com", true))));
        mocks
            .trails
            .expect_upsert()
            .withf(|trail| {
                trail.pricing.free_entry
                    && trail.pricing.adult_price == 0.0
                    && trail.features.is_empty()
                    && trail.parking_available
            })
            .times(1)
            .returning(|_| Ok(()));
        let app = app!(mocks);
        let cookie = sign_in(&app, "admin-1").await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/trails")
                .cookie(cookie)
                .set_json(json!({
                    "name": {"en": "Kemeri Bog Boardwalk"},
                    "region": "Kurzeme",
                    "difficulty": "easy",
                    "parkingAvailable": "1"
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Trail created successfully");
        assert!(body["id"].is_string());
    }

    #[rstest]
    #[actix_web::test]
    async fn non_admin_cannot_create() {
        let mut mocks = AdventureMocks::default();
        mocks
            .users
            .expect_find_by_id()
            .returning(|_| Ok(Some(sample_user("user-2", "liga@example.lv", false))));
        let app = app!(mocks);
        let cookie = sign_in(&app, "user-2").await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/trails")
                .cookie(cookie)
                .set_json(json!({"name": {"en": "x"}, "region": "Latgale", "difficulty": "hard"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Admin access required");
    }

    #[rstest]
    #[case(json!({"name": {"en": "x"}, "region": "Latgale", "difficulty": "extreme"}), "difficulty")]
    #[case(json!({"name": {"en": "x"}, "region": "Latgale"}), "difficulty")]
    #[case(json!({"name": {"en": " "}, "region": "Latgale", "difficulty": "easy"}), "name.en")]
    #[case(json!({"name": {"en": "x"}, "region": "Latgale", "difficulty": "easy", "latitude": 91.0}), "latitude")]
    #[case(json!({"name": {"en": "x"}, "region": "Latgale", "difficulty": "easy", "adultPrice": -1.0}), "adultPrice")]
    #[actix_web::test]
    async fn invalid_bodies_name_the_field(#[case] body: Value, #[case] field: &str) {
        let app = app!(AdventureMocks::default());
        let cookie = sign_in(&app, "admin-1").await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/trails")
                .cookie(cookie)
                .set_json(body)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], field);
    }

    #[rstest]
    #[actix_web::test]
    async fn deleting_unknown_trail_is_not_found() {
        let mut mocks = AdventureMocks::default();
        mocks
            .users
            .expect_find_by_id()
            .returning(|_| Ok(Some(sample_user("admin-1", "emalinovskis@me.com", true))));
        mocks.trails.expect_delete().returning(|_| Ok(false));
        let app = app!(mocks);
        let cookie = sign_in(&app, "admin-1").await;

        let res = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri("/api/trails/trail-404")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[case(json!(true), Some(true))]
    #[case(json!(0), Some(false))]
    #[case(json!("true"), Some(true))]
    #[case(json!(null), None)]
    #[actix_web::test]
    async fn booleans_are_coerced(#[case] raw: Value, #[case] expected: Option<bool>) {
        let request: TrailRequest =
            serde_json::from_value(json!({"parkingAvailable": raw})).expect("deserialise");
        assert_eq!(request.parking_available, expected);
    }
}
