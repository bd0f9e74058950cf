//! Community feed handlers: posts, likes and comments.
//!
//! The author of every write is the session user.

use actix_web::{get, post, web};
use pagination::{PageLimits, Paginated};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::CreatedResponse;
use crate::domain::{
    Comment, CommunityValidationError, LikeOutcome, NewPost, PostContent, PostId,
    PostType, PostView,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    CommentSchema, ErrorSchema, LikeOutcomeSchema, PostPageSchema,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::AdventureState;
use crate::inbound::http::validation::{
    FieldName, field_error, missing_field_error, parse_page, parse_record_id, parse_vocabulary,
};

const POST_PAGE_LIMITS: PageLimits = PageLimits::new(20, 100);

/// Raw `limit`/`offset` query values.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PostListQuery {
    /// Page size, 1 to 100. Defaults to 20.
    pub limit: Option<String>,
    /// Posts to skip. Defaults to 0.
    pub offset: Option<String>,
}

/// Body of `POST /api/community-posts`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    /// One of `photo`, `story`, `tip`, `question`.
    #[serde(rename = "type")]
    #[schema(example = "photo")]
    pub post_type: Option<String>,
    #[schema(example = "Sunrise over the Gauja valley")]
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub location: Option<String>,
}

/// Body of `POST /api/community-posts/{id}/comments`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CommentRequest {
    #[schema(example = "Beautiful spot!")]
    pub content: Option<String>,
}

fn content_from(raw: Option<String>) -> ApiResult<PostContent> {
    let raw = raw.ok_or_else(|| missing_field_error(FieldName::new("content")))?;
    PostContent::new(raw).map_err(|err: CommunityValidationError| field_error("content", err))
}

fn post_id_from_path(raw: String) -> ApiResult<PostId> {
    parse_record_id(raw, FieldName::new("id"))
}

impl CreatePostRequest {
    fn into_new_post(self) -> ApiResult<NewPost> {
        let post_type: PostType = match self.post_type.as_deref() {
            Some(raw) => parse_vocabulary(raw, FieldName::new("type"))?,
            None => return Err(missing_field_error(FieldName::new("type"))),
        };
        Ok(NewPost {
            post_type,
            content: content_from(self.content)?,
            image_url: self.image_url.filter(|url| !url.trim().is_empty()),
            location: self.location.filter(|location| !location.trim().is_empty()),
        })
    }
}

/// One page of posts, newest first.
#[utoipa::path(
    get,
    path = "/api/community-posts",
    params(PostListQuery),
    responses(
        (status = 200, description = "Posts", body = PostPageSchema),
        (status = 400, description = "Invalid pagination", body = ErrorSchema)
    ),
    tags = ["community"],
    operation_id = "listPosts"
)]
#[get("/community-posts")]
pub async fn list_posts(
    state: web::Data<AdventureState>,
    query: web::Query<PostListQuery>,
) -> ApiResult<web::Json<Paginated<PostView>>> {
    let page = parse_page(
        query.limit.as_deref(),
        query.offset.as_deref(),
        POST_PAGE_LIMITS,
    )?;
    Ok(web::Json(state.community.list(page).await?))
}

/// Publish a post as the session user.
#[utoipa::path(
    post,
    path = "/api/community-posts",
    request_body = CreatePostRequest,
    responses(
        (status = 200, description = "Post created", body = CreatedResponse),
        (status = 400, description = "Invalid post", body = ErrorSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema)
    ),
    tags = ["community"],
    operation_id = "createPost",
    security(("SessionCookie" = []))
)]
#[post("/community-posts")]
pub async fn create_post(
    state: web::Data<AdventureState>,
    session: SessionContext,
    payload: web::Json<CreatePostRequest>,
) -> ApiResult<web::Json<CreatedResponse>> {
    let author = session.require_user()?;
    let draft = payload.into_inner().into_new_post()?;
    state.presence.touch(&author);
    let id = state.community.create(&author, draft).await?;
    Ok(web::Json(CreatedResponse::new(
        id.to_string(),
        "Post created successfully",
    )))
}

/// Like a post, or remove an existing like.
#[utoipa::path(
    post,
    path = "/api/community-posts/{id}/like",
    params(("id" = String, Path, description = "Post id")),
    responses(
        (status = 200, description = "Like toggled", body = LikeOutcomeSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 404, description = "Post not found", body = ErrorSchema)
    ),
    tags = ["community"],
    operation_id = "togglePostLike",
    security(("SessionCookie" = []))
)]
#[post("/community-posts/{id}/like")]
pub async fn toggle_like(
    state: web::Data<AdventureState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<LikeOutcome>> {
    let user = session.require_user()?;
    let post = post_id_from_path(path.into_inner())?;
    state.presence.touch(&user);
    Ok(web::Json(state.community.toggle_like(&post, &user).await?))
}

/// Comment on a post as the session user.
#[utoipa::path(
    post,
    path = "/api/community-posts/{id}/comments",
    params(("id" = String, Path, description = "Post id")),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Comment created", body = CommentSchema),
        (status = 400, description = "Empty comment", body = ErrorSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 404, description = "Post not found", body = ErrorSchema)
    ),
    tags = ["community"],
    operation_id = "addComment",
    security(("SessionCookie" = []))
)]
#[post("/community-posts/{id}/comments")]
pub async fn add_comment(
    state: web::Data<AdventureState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CommentRequest>,
) -> ApiResult<web::Json<Comment>> {
    let author = session.require_user()?;
    let post = post_id_from_path(path.into_inner())?;
    let content = content_from(payload.into_inner().content)?;
    state.presence.touch(&author);
    Ok(web::Json(
        state.community.add_comment(&post, &author, content).await?,
    ))
}

/// Comments on a post, oldest first.
#[utoipa::path(
    get,
    path = "/api/community-posts/{id}/comments",
    params(("id" = String, Path, description = "Post id")),
    responses(
        (status = 200, description = "Comments", body = [CommentSchema]),
        (status = 404, description = "Post not found", body = ErrorSchema)
    ),
    tags = ["community"],
    operation_id = "listComments"
)]
#[get("/community-posts/{id}/comments")]
pub async fn list_comments(
    state: web::Data<AdventureState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<Comment>>> {
    let post = post_id_from_path(path.into_inner())?;
    Ok(web::Json(state.community.comments(&post).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use chrono::Utc;
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::domain::{CommunityPost, UserId};
    use crate::inbound::http::test_utils::{
        AdventureMocks, SIGN_IN_PATH, sample_user, sign_in, sign_in_handler,
        test_session_middleware,
    };

    fn post(id: &str, author: &str) -> CommunityPost {
        CommunityPost {
            id: PostId::new(id).expect("post id"),
            user_id: UserId::new(author).expect("user id"),
            post_type: PostType::Story,
            content: "Walked the Kemeri boardwalk".to_owned(),
            image_url: None,
            location: Some("Jūrmala".to_owned()),
            created_at: Utc::now(),
        }
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
                            .service(list_posts)
                            .service(create_post)
                            .service(toggle_like)
                            .service(add_comment)
                            .service(list_comments),
                    ),
            )
            .await
        };
    }

    #[rstest]
    #[actix_web::test]
    async fn list_joins_author_and_paginates() {
        let mut mocks = AdventureMocks::default();
        mocks
            .community
            .expect_list_posts()
            .returning(|| Ok(vec![post("post-2", "user-2"), post("post-1", "user-2")]));
        mocks
            .users
            .expect_find_by_id()
            .returning(|_| Ok(Some(sample_user("user-2", "liga@example.lv", false))));
        mocks.community.expect_like_count().returning(|_| Ok(3));
        mocks.community.expect_comments().returning(|_| Ok(Vec::new()));
        let app = app!(mocks);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/community-posts?limit=1&offset=1")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["pagination"], json!({"limit": 1, "offset": 1, "total": 2}));
        let item = &body["items"][0];
        assert_eq!(item["id"], "post-1");
        assert_eq!(item["type"], "story");
        assert_eq!(item["userName"], "Anna Bērziņa");
        assert_eq!(item["likesCount"], 3);
    }

    #[rstest]
    #[case("limit=0")]
    #[case("limit=101")]
    #[case("offset=-3")]
    #[actix_web::test]
    async fn bad_pagination_is_rejected(#[case] query: &str) {
        let app = app!(AdventureMocks::default());
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/community-posts?{query}"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[actix_web::test]
    async fn create_uses_session_author() {
        let mut mocks = AdventureMocks::default();
        mocks
            .users
            .expect_find_by_id()
            .withf(|id| id.as_str() == "user-2")
            .returning(|_| Ok(Some(sample_user("user-2", "liga@example.lv", false))));
        mocks
            .community
            .expect_insert_post()
            .withf(|post| post.user_id.as_str() == "user-2" && post.post_type == PostType::Tip)
            .times(1)
            .returning(|_| Ok(()));
        let app = app!(mocks);
        let cookie = sign_in(&app, "user-2").await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/community-posts")
                .cookie(cookie)
                .set_json(json!({"type": "tip", "content": "Bring mosquito spray", "userId": "admin-1"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Post created successfully");
    }

    #[rstest]
    #[case(json!({"type": "rant", "content": "x"}), "type")]
    #[case(json!({"type": "tip", "content": "   "}), "content")]
    #[case(json!({"content": "x"}), "type")]
    #[actix_web::test]
    async fn invalid_posts_name_the_field(#[case] body: Value, #[case] field: &str) {
        let app = app!(AdventureMocks::default());
        let cookie = sign_in(&app, "user-2").await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/community-posts")
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
    async fn like_requires_session() {
        let app = app!(AdventureMocks::default());
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/community-posts/post-1/like")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn like_toggles_and_reports_count() {
        let mut mocks = AdventureMocks::default();
        mocks
            .community
            .expect_find_post()
            .returning(|_| Ok(Some(post("post-1", "user-3"))));
        mocks.community.expect_toggle_like().returning(|_, _| Ok(true));
        mocks.community.expect_like_count().returning(|_| Ok(1));
        let app = app!(mocks);
        let cookie = sign_in(&app, "user-2").await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/community-posts/post-1/like")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body, json!({"liked": true, "likesCount": 1}));
    }

    #[rstest]
    #[actix_web::test]
    async fn comments_on_unknown_post_are_not_found() {
        let mut mocks = AdventureMocks::default();
        mocks.community.expect_find_post().returning(|_| Ok(None));
        let app = app!(mocks);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/community-posts/post-404/comments")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Post not found");
    }

    #[rstest]
    #[actix_web::test]
    async fn comment_is_returned_with_author() {
        let mut mocks = AdventureMocks::default();
        mocks
            .community
            .expect_find_post()
            .returning(|_| Ok(Some(post("post-1", "user-3"))));
        mocks
            .community
            .expect_insert_comment()
            .times(1)
            .returning(|_| Ok(()));
        let app = app!(mocks);
        let cookie = sign_in(&app, "user-2").await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/community-posts/post-1/comments")
                .cookie(cookie)
                .set_json(json!({"content": "Beautiful spot!"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["userId"], "user-2");
        assert_eq!(body["postId"], "post-1");
        assert_eq!(body["content"], "Beautiful spot!");
    }
}
