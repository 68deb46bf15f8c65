//! 轴体控制器

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, Json};
use mongodb::bson::oid::ObjectId;
use serde::Serialize;
use utoipa::ToSchema;

use common::errors::AppError;
use common::models::{KeyboardInstanceItem, KeyboardSwitchForm, KeyboardSwitchItem};
use common::response::ApiResponse;
use common::utils::Violations;

use crate::service::{DeleteOutcome, InstanceService, SwitchService};
use crate::state::AppState;

use super::parse_id;

/// 轴体列表视图
#[derive(Serialize, ToSchema)]
pub struct SwitchListView {
    pub title: String,
    pub switch_list: Vec<KeyboardSwitchItem>,
}

/// 轴体详情视图
#[derive(Serialize, ToSchema)]
pub struct SwitchDetailView {
    pub title: String,
    pub switch: KeyboardSwitchItem,
    pub switch_instances: Vec<KeyboardInstanceItem>,
}

/// 轴体表单视图（创建/更新；校验失败时带净化值与错误重新渲染）
#[derive(Serialize, ToSchema)]
pub struct SwitchFormView {
    pub title: String,
    pub switch: KeyboardSwitchForm,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// 轴体删除确认视图（存在依赖实例时列出阻塞项）
#[derive(Serialize, ToSchema)]
pub struct SwitchDeleteView {
    pub title: String,
    pub switch: KeyboardSwitchItem,
    pub switch_instances: Vec<KeyboardInstanceItem>,
}

/// 轴体列表
#[utoipa::path(
    get,
    path = "/inventory/keyboardswitchs",
    tag = "switches",
    responses(
        (status = 200, description = "轴体列表", body = ApiResponse<SwitchListView>)
    )
)]
pub async fn switch_list(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SwitchListView>>, AppError> {
    let service = SwitchService::new(&state.db);
    let switches = service.list().await?;
    Ok(Json(ApiResponse::ok(SwitchListView {
        title: "Switch List".to_string(),
        switch_list: switches.into_iter().map(KeyboardSwitchItem::from).collect(),
    })))
}

/// 轴体详情：并发取轴体与其实例（实例解析到键盘名）
#[utoipa::path(
    get,
    path = "/inventory/keyboardswitch/{id}",
    tag = "switches",
    params(("id" = String, Path, description = "轴体 ID")),
    responses(
        (status = 200, description = "轴体详情", body = ApiResponse<SwitchDetailView>),
        (status = 404, description = "轴体未找到")
    )
)]
pub async fn switch_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SwitchDetailView>>, AppError> {
    let id = parse_id(&id)?;
    let switches = SwitchService::new(&state.db);
    let instances = InstanceService::new(&state.db);

    let (switch, switch_instances) =
        tokio::try_join!(switches.get(id), instances.list_by_switch_resolved(id))?;

    Ok(Json(ApiResponse::ok(SwitchDetailView {
        title: "Switch Detail".to_string(),
        switch: switch.into(),
        switch_instances,
    })))
}

/// 轴体创建表单
#[utoipa::path(
    get,
    path = "/inventory/keyboardswitch/create",
    tag = "switches",
    responses(
        (status = 200, description = "空白创建表单", body = ApiResponse<SwitchFormView>)
    )
)]
pub async fn switch_create_get() -> Json<ApiResponse<SwitchFormView>> {
    Json(ApiResponse::ok(SwitchFormView {
        title: "Create Switch".to_string(),
        switch: KeyboardSwitchForm::default(),
        errors: vec![],
    }))
}

/// 轴体创建。规范名已存在时不插入，重定向到现有记录。
#[utoipa::path(
    post,
    path = "/inventory/keyboardswitch/create",
    tag = "switches",
    request_body = KeyboardSwitchForm,
    responses(
        (status = 303, description = "创建成功（或已存在），重定向到详情页"),
        (status = 200, description = "校验失败，带错误重新渲染表单", body = ApiResponse<SwitchFormView>)
    )
)]
pub async fn switch_create_post(
    State(state): State<AppState>,
    Form(form): Form<KeyboardSwitchForm>,
) -> Result<Response, AppError> {
    let form = form.sanitized();
    let mut violations = Violations::new();
    violations.check(&form);

    if !violations.is_empty() {
        let view = SwitchFormView {
            title: "Create Switch".to_string(),
            switch: form,
            errors: violations.into_messages(),
        };
        return Ok(Json(ApiResponse::ok(view)).into_response());
    }

    let service = SwitchService::new(&state.db);
    let switch = service.create(form.into_switch(ObjectId::new())).await?;
    Ok(Redirect::to(&switch.url()).into_response())
}

/// 轴体删除确认：并发取轴体与其实例；轴体不存在则回到列表
#[utoipa::path(
    get,
    path = "/inventory/keyboardswitch/{id}/delete",
    tag = "switches",
    params(("id" = String, Path, description = "轴体 ID")),
    responses(
        (status = 200, description = "删除确认视图", body = ApiResponse<SwitchDeleteView>),
        (status = 303, description = "轴体不存在，重定向到列表")
    )
)]
pub async fn switch_delete_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let switches = SwitchService::new(&state.db);
    let instances = InstanceService::new(&state.db);

    let (switch, switch_instances) =
        tokio::try_join!(switches.find(id), instances.list_by_switch_resolved(id))?;

    let Some(switch) = switch else {
        return Ok(Redirect::to("/inventory/keyboardswitchs").into_response());
    };

    Ok(Json(ApiResponse::ok(SwitchDeleteView {
        title: "Delete Switch".to_string(),
        switch: switch.into(),
        switch_instances,
    }))
    .into_response())
}

/// 轴体删除。存在依赖实例时拒绝并重新渲染确认视图。
#[utoipa::path(
    post,
    path = "/inventory/keyboardswitch/{id}/delete",
    tag = "switches",
    params(("id" = String, Path, description = "轴体 ID")),
    responses(
        (status = 303, description = "删除成功，重定向到列表"),
        (status = 200, description = "存在依赖，重新渲染确认视图", body = ApiResponse<SwitchDeleteView>)
    )
)]
pub async fn switch_delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let switches = SwitchService::new(&state.db);
    let instances = InstanceService::new(&state.db);

    match switches.delete(id).await? {
        DeleteOutcome::Deleted => {
            Ok(Redirect::to("/inventory/keyboardswitchs").into_response())
        }
        DeleteOutcome::Blocked(_) => {
            // 阻塞项解析到键盘名后展示
            let (switch, switch_instances) =
                tokio::try_join!(switches.get(id), instances.list_by_switch_resolved(id))?;
            Ok(Json(ApiResponse::ok(SwitchDeleteView {
                title: "Delete Switch".to_string(),
                switch: switch.into(),
                switch_instances,
            }))
            .into_response())
        }
    }
}

/// 轴体更新表单（预填当前值）
#[utoipa::path(
    get,
    path = "/inventory/keyboardswitch/{id}/update",
    tag = "switches",
    params(("id" = String, Path, description = "轴体 ID")),
    responses(
        (status = 200, description = "预填更新表单", body = ApiResponse<SwitchFormView>),
        (status = 404, description = "轴体未找到")
    )
)]
pub async fn switch_update_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SwitchFormView>>, AppError> {
    let id = parse_id(&id)?;
    let service = SwitchService::new(&state.db);
    let switch = service.get(id).await?;
    Ok(Json(ApiResponse::ok(SwitchFormView {
        title: "Update Switch".to_string(),
        switch: switch.into(),
        errors: vec![],
    })))
}

/// 轴体更新：整体替换可变字段，保留标识
#[utoipa::path(
    post,
    path = "/inventory/keyboardswitch/{id}/update",
    tag = "switches",
    params(("id" = String, Path, description = "轴体 ID")),
    request_body = KeyboardSwitchForm,
    responses(
        (status = 303, description = "更新成功，重定向到详情页"),
        (status = 200, description = "校验失败，带错误重新渲染表单", body = ApiResponse<SwitchFormView>),
        (status = 404, description = "轴体未找到")
    )
)]
pub async fn switch_update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<KeyboardSwitchForm>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let form = form.sanitized();
    let mut violations = Violations::new();
    violations.check(&form);

    if !violations.is_empty() {
        let view = SwitchFormView {
            title: "Update Switch".to_string(),
            switch: form,
            errors: violations.into_messages(),
        };
        return Ok(Json(ApiResponse::ok(view)).into_response());
    }

    let service = SwitchService::new(&state.db);
    let switch = service.update(form.into_switch(id)).await?;
    Ok(Redirect::to(&switch.url()).into_response())
}
