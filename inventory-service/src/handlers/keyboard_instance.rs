//! 键盘实例控制器

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, Json};
use mongodb::bson::oid::ObjectId;
use serde::Serialize;
use utoipa::ToSchema;

use common::errors::AppError;
use common::models::{
    InstanceStatus, KeyboardInstanceForm, KeyboardInstanceItem, KeyboardItem, KeyboardSwitchItem,
};
use common::response::ApiResponse;
use common::utils::Violations;

use crate::service::{InstanceService, KeyboardService, SwitchService};
use crate::state::AppState;

use super::parse_id;

/// 实例列表视图
#[derive(Serialize, ToSchema)]
pub struct InstanceListView {
    pub title: String,
    pub instance_list: Vec<KeyboardInstanceItem>,
}

/// 实例详情视图
#[derive(Serialize, ToSchema)]
pub struct InstanceDetailView {
    pub title: String,
    pub instance: KeyboardInstanceItem,
}

/// 实例表单视图，带键盘与轴体下拉列表
#[derive(Serialize, ToSchema)]
pub struct InstanceFormView {
    pub title: String,
    pub instance: KeyboardInstanceForm,
    pub keyboard_list: Vec<KeyboardItem>,
    pub switch_list: Vec<KeyboardSwitchItem>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// 实例删除确认视图（叶子实体，永无阻塞项）
#[derive(Serialize, ToSchema)]
pub struct InstanceDeleteView {
    pub title: String,
    pub instance: KeyboardInstanceItem,
}

/// 实例列表：键盘、品牌（二跳）、轴体均已解析，按状态、品牌名升序
#[utoipa::path(
    get,
    path = "/inventory/keyboardinstances",
    tag = "instances",
    responses(
        (status = 200, description = "实例列表", body = ApiResponse<InstanceListView>)
    )
)]
pub async fn instance_list(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<InstanceListView>>, AppError> {
    let service = InstanceService::new(&state.db);
    let instance_list = service.list_resolved().await?;
    Ok(Json(ApiResponse::ok(InstanceListView {
        title: "Keyboard Instance List".to_string(),
        instance_list,
    })))
}

/// 实例详情：键盘、品牌与轴体逐跳解析
#[utoipa::path(
    get,
    path = "/inventory/keyboardinstance/{id}",
    tag = "instances",
    params(("id" = String, Path, description = "实例 ID")),
    responses(
        (status = 200, description = "实例详情", body = ApiResponse<InstanceDetailView>),
        (status = 404, description = "实例未找到")
    )
)]
pub async fn instance_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<InstanceDetailView>>, AppError> {
    let id = parse_id(&id)?;
    let service = InstanceService::new(&state.db);
    let instance = service.get_resolved(id).await?;
    Ok(Json(ApiResponse::ok(InstanceDetailView {
        title: "Keyboard Instance Detail".to_string(),
        instance,
    })))
}

/// 取下拉列表数据：键盘与轴体互相独立，并发取
async fn dropdown_lists(
    state: &AppState,
) -> Result<(Vec<KeyboardItem>, Vec<KeyboardSwitchItem>), AppError> {
    let keyboards = KeyboardService::new(&state.db);
    let switches = SwitchService::new(&state.db);
    let (keyboard_list, switch_list) = tokio::try_join!(keyboards.list(), switches.list())?;
    Ok((
        keyboard_list
            .into_iter()
            .map(|k| KeyboardItem::new(k, None))
            .collect(),
        switch_list.into_iter().map(KeyboardSwitchItem::from).collect(),
    ))
}

/// 实例创建表单（带键盘与轴体下拉列表）
#[utoipa::path(
    get,
    path = "/inventory/keyboardinstance/create",
    tag = "instances",
    responses(
        (status = 200, description = "空白创建表单", body = ApiResponse<InstanceFormView>)
    )
)]
pub async fn instance_create_get(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<InstanceFormView>>, AppError> {
    let (keyboard_list, switch_list) = dropdown_lists(&state).await?;
    Ok(Json(ApiResponse::ok(InstanceFormView {
        title: "Create Keyboard Instance".to_string(),
        instance: KeyboardInstanceForm::default(),
        keyboard_list,
        switch_list,
        errors: vec![],
    })))
}

/// 校验并装配实例字段。状态缺省为 In-stock；进入 Sold 之外的
/// 状态时清除销售日期。
fn coerce_instance(
    form: &KeyboardInstanceForm,
    violations: &mut Violations,
) -> Option<(ObjectId, ObjectId, InstanceStatus, Option<chrono::NaiveDate>)> {
    let keyboard = violations.object_id("keyboard", &form.keyboard);
    let keyboard_switch = violations.object_id("keyboard_switch", &form.keyboard_switch);

    let status = if form.status.is_empty() {
        Some(InstanceStatus::default())
    } else {
        let parsed = InstanceStatus::from_label(&form.status);
        if parsed.is_none() {
            violations.push("status must be one of In-stock, Sold, Returned");
        }
        parsed
    };

    let date_sold = violations.iso_date("date_sold", &form.date_sold);

    match (keyboard, keyboard_switch, status) {
        (Some(keyboard), Some(keyboard_switch), Some(status)) if violations.is_empty() => {
            Some((keyboard, keyboard_switch, status, date_sold))
        }
        _ => None,
    }
}

/// 实例创建：总是插入，无唯一性检查
#[utoipa::path(
    post,
    path = "/inventory/keyboardinstance/create",
    tag = "instances",
    request_body = KeyboardInstanceForm,
    responses(
        (status = 303, description = "创建成功，重定向到详情页"),
        (status = 200, description = "校验失败，带错误重新渲染表单", body = ApiResponse<InstanceFormView>)
    )
)]
pub async fn instance_create_post(
    State(state): State<AppState>,
    Form(form): Form<KeyboardInstanceForm>,
) -> Result<Response, AppError> {
    let form = form.sanitized();
    let mut violations = Violations::new();

    match coerce_instance(&form, &mut violations) {
        Some((keyboard, keyboard_switch, status, date_sold)) => {
            let service = InstanceService::new(&state.db);
            let instance = form.into_instance(
                ObjectId::new(),
                keyboard,
                keyboard_switch,
                status,
                date_sold,
            );
            let instance = service.create(instance).await?;
            Ok(Redirect::to(&instance.url()).into_response())
        }
        None => {
            let (keyboard_list, switch_list) = dropdown_lists(&state).await?;
            let view = InstanceFormView {
                title: "Create Keyboard Instance".to_string(),
                instance: form,
                keyboard_list,
                switch_list,
                errors: violations.into_messages(),
            };
            Ok(Json(ApiResponse::ok(view)).into_response())
        }
    }
}

/// 实例删除确认；实例不存在则回到列表
#[utoipa::path(
    get,
    path = "/inventory/keyboardinstance/{id}/delete",
    tag = "instances",
    params(("id" = String, Path, description = "实例 ID")),
    responses(
        (status = 200, description = "删除确认视图", body = ApiResponse<InstanceDeleteView>),
        (status = 303, description = "实例不存在，重定向到列表")
    )
)]
pub async fn instance_delete_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let service = InstanceService::new(&state.db);

    match service.find(id).await? {
        Some(_) => {
            let instance = service.get_resolved(id).await?;
            Ok(Json(ApiResponse::ok(InstanceDeleteView {
                title: "Delete Keyboard Instance".to_string(),
                instance,
            }))
            .into_response())
        }
        None => Ok(Redirect::to("/inventory/keyboardinstances").into_response()),
    }
}

/// 实例删除：叶子实体，总是放行
#[utoipa::path(
    post,
    path = "/inventory/keyboardinstance/{id}/delete",
    tag = "instances",
    params(("id" = String, Path, description = "实例 ID")),
    responses(
        (status = 303, description = "删除成功，重定向到列表")
    )
)]
pub async fn instance_delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let service = InstanceService::new(&state.db);
    service.delete(id).await?;
    Ok(Redirect::to("/inventory/keyboardinstances").into_response())
}

/// 实例更新表单：并发取实例与下拉列表，预填当前值
#[utoipa::path(
    get,
    path = "/inventory/keyboardinstance/{id}/update",
    tag = "instances",
    params(("id" = String, Path, description = "实例 ID")),
    responses(
        (status = 200, description = "预填更新表单", body = ApiResponse<InstanceFormView>),
        (status = 404, description = "实例未找到")
    )
)]
pub async fn instance_update_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<InstanceFormView>>, AppError> {
    let id = parse_id(&id)?;
    let service = InstanceService::new(&state.db);

    let (instance, lists) = tokio::try_join!(service.get(id), dropdown_lists(&state))?;
    let (keyboard_list, switch_list) = lists;

    Ok(Json(ApiResponse::ok(InstanceFormView {
        title: "Update Keyboard Instance".to_string(),
        instance: instance.into(),
        keyboard_list,
        switch_list,
        errors: vec![],
    })))
}

/// 实例更新：整体替换可变字段，保留标识；
/// 离开 Sold 状态时销售日期被清除
#[utoipa::path(
    post,
    path = "/inventory/keyboardinstance/{id}/update",
    tag = "instances",
    params(("id" = String, Path, description = "实例 ID")),
    request_body = KeyboardInstanceForm,
    responses(
        (status = 303, description = "更新成功，重定向到详情页"),
        (status = 200, description = "校验失败，带错误重新渲染表单", body = ApiResponse<InstanceFormView>),
        (status = 404, description = "实例未找到")
    )
)]
pub async fn instance_update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<KeyboardInstanceForm>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let form = form.sanitized();
    let mut violations = Violations::new();

    match coerce_instance(&form, &mut violations) {
        Some((keyboard, keyboard_switch, status, date_sold)) => {
            let service = InstanceService::new(&state.db);
            let instance =
                form.into_instance(id, keyboard, keyboard_switch, status, date_sold);
            let instance = service.update(instance).await?;
            Ok(Redirect::to(&instance.url()).into_response())
        }
        None => {
            let (keyboard_list, switch_list) = dropdown_lists(&state).await?;
            let view = InstanceFormView {
                title: "Update Keyboard Instance".to_string(),
                instance: form,
                keyboard_list,
                switch_list,
                errors: violations.into_messages(),
            };
            Ok(Json(ApiResponse::ok(view)).into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_defaults_status_to_in_stock() {
        let form = KeyboardInstanceForm {
            keyboard: ObjectId::new().to_hex(),
            status: String::new(),
            keyboard_switch: ObjectId::new().to_hex(),
            date_sold: String::new(),
        };
        let mut violations = Violations::new();
        let (_, _, status, date_sold) = coerce_instance(&form, &mut violations).unwrap();
        assert_eq!(status, InstanceStatus::InStock);
        assert_eq!(date_sold, None);
    }

    #[test]
    fn test_coerce_rejects_unknown_status() {
        let form = KeyboardInstanceForm {
            keyboard: ObjectId::new().to_hex(),
            status: "Lost".into(),
            keyboard_switch: ObjectId::new().to_hex(),
            date_sold: String::new(),
        };
        let mut violations = Violations::new();
        assert!(coerce_instance(&form, &mut violations).is_none());
        assert!(!violations.is_empty());
    }

    #[test]
    fn test_coerce_collects_every_violation() {
        let form = KeyboardInstanceForm {
            keyboard: "bad".into(),
            status: "Lost".into(),
            keyboard_switch: "worse".into(),
            date_sold: "04/03/2026".into(),
        };
        let mut violations = Violations::new();
        assert!(coerce_instance(&form, &mut violations).is_none());
        assert_eq!(violations.into_messages().len(), 4);
    }

    #[test]
    fn test_coerce_sold_keeps_submitted_date() {
        let form = KeyboardInstanceForm {
            keyboard: ObjectId::new().to_hex(),
            status: "Sold".into(),
            keyboard_switch: ObjectId::new().to_hex(),
            date_sold: "2026-03-04".into(),
        };
        let mut violations = Violations::new();
        let (_, _, status, date_sold) = coerce_instance(&form, &mut violations).unwrap();
        assert_eq!(status, InstanceStatus::Sold);
        assert!(date_sold.is_some());
    }
}
