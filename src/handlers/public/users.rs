// handlers/public/users.rs - User directory and public profiles

use axum::extract::{Path, Query};
use serde::{Deserialize, Serialize};

use crate::api::{PageParams, Pagination, PublicUser, UserSummary};
use crate::config::config;
use crate::database::{UserFilter, UserRepository};
use crate::handlers::utils::{parse_id, user_with_summaries};
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub year: Option<String>,
    pub branch: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserList {
    pub users: Vec<PublicUser>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct ProfilePayload {
    pub user: PublicUser<UserSummary>,
}

/// GET /api/users - Paginated user directory, newest first
pub async fn list(Query(query): Query<UserListQuery>) -> ApiResult<UserList> {
    let api = &config().api;
    let params = PageParams::resolve(
        query.page.as_deref(),
        query.limit.as_deref(),
        api.default_user_page_size,
        api.max_page_size,
    );
    let filter = UserFilter {
        search: query.search,
        year: query.year,
        branch: query.branch,
    };

    let users = UserRepository::shared().await?;
    let (rows, total) = users.list(&filter, params.limit, params.offset()).await?;

    let ids: Vec<_> = rows.iter().map(|u| u.id).collect();
    let graph = users.follow_graph(&ids).await?;

    let views = rows
        .into_iter()
        .map(|user| {
            let (followers, following) = (graph.followers_of(user.id), graph.following_of(user.id));
            PublicUser::new(user, followers, following)
        })
        .collect();

    Ok(ApiResponse::success(UserList {
        users: views,
        pagination: Pagination::users(params, total),
    }))
}

/// GET /api/users/profile/:id - Public profile with follower summaries
pub async fn profile_by_id(Path(id): Path<String>) -> ApiResult<ProfilePayload> {
    let id = parse_id(&id, "User not found")?;
    let users = UserRepository::shared().await?;
    let user = users.get(id).await?;

    Ok(ApiResponse::success(ProfilePayload {
        user: user_with_summaries(&users, user).await?,
    }))
}
