//! 品牌控制器

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, Json};
use mongodb::bson::oid::ObjectId;
use serde::Serialize;
use utoipa::ToSchema;

use common::errors::AppError;
use common::models::{BrandForm, BrandItem, KeyboardItem};
use common::response::ApiResponse;
use common::utils::Violations;

use crate::service::brand::BrandServiceTrait;
use crate::service::{BrandService, DeleteOutcome, KeyboardService};
use crate::state::AppState;

use super::parse_id;

/// 品牌列表视图
#[derive(Serialize, ToSchema)]
pub struct BrandListView {
    pub title: String,
    pub brand_list: Vec<BrandItem>,
}

/// 品牌详情视图
#[derive(Serialize, ToSchema)]
pub struct BrandDetailView {
    pub title: String,
    pub brand: BrandItem,
    pub brand_keyboards: Vec<KeyboardItem>,
}

/// 品牌表单视图（创建/更新；校验失败时带净化值与错误重新渲染）
#[derive(Serialize, ToSchema)]
pub struct BrandFormView {
    pub title: String,
    pub brand: BrandForm,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// 品牌删除确认视图（存在依赖键盘时列出阻塞项）
#[derive(Serialize, ToSchema)]
pub struct BrandDeleteView {
    pub title: String,
    pub brand: BrandItem,
    pub brand_keyboards: Vec<KeyboardItem>,
}

/// 品牌列表
#[utoipa::path(
    get,
    path = "/inventory/brands",
    tag = "brands",
    responses(
        (status = 200, description = "品牌列表", body = ApiResponse<BrandListView>)
    )
)]
pub async fn brand_list(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<BrandListView>>, AppError> {
    let service = BrandService::new(&state.db);
    let brands = service.list().await?;
    Ok(Json(ApiResponse::ok(BrandListView {
        title: "Brand List".to_string(),
        brand_list: brands.into_iter().map(BrandItem::from).collect(),
    })))
}

/// 品牌详情：并发取品牌与其键盘
#[utoipa::path(
    get,
    path = "/inventory/brand/{id}",
    tag = "brands",
    params(("id" = String, Path, description = "品牌 ID")),
    responses(
        (status = 200, description = "品牌详情", body = ApiResponse<BrandDetailView>),
        (status = 404, description = "品牌未找到")
    )
)]
pub async fn brand_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<BrandDetailView>>, AppError> {
    let id = parse_id(&id)?;
    let brands = BrandService::new(&state.db);
    let keyboards = KeyboardService::new(&state.db);

    let (brand, brand_keyboards) = tokio::try_join!(brands.get(id), keyboards.list_by_brand(id))?;

    let brand_name = brand.display_name.clone();
    Ok(Json(ApiResponse::ok(BrandDetailView {
        title: "Brand Detail".to_string(),
        brand: BrandItem::from(brand),
        brand_keyboards: brand_keyboards
            .into_iter()
            .map(|k| KeyboardItem::new(k, Some(brand_name.clone())))
            .collect(),
    })))
}

/// 品牌创建表单
#[utoipa::path(
    get,
    path = "/inventory/brand/create",
    tag = "brands",
    responses(
        (status = 200, description = "空白创建表单", body = ApiResponse<BrandFormView>)
    )
)]
pub async fn brand_create_get() -> Json<ApiResponse<BrandFormView>> {
    Json(ApiResponse::ok(BrandFormView {
        title: "Create Brand".to_string(),
        brand: BrandForm::default(),
        errors: vec![],
    }))
}

/// 品牌创建。规范名已存在时不插入，重定向到现有记录。
#[utoipa::path(
    post,
    path = "/inventory/brand/create",
    tag = "brands",
    request_body = BrandForm,
    responses(
        (status = 303, description = "创建成功（或已存在），重定向到详情页"),
        (status = 200, description = "校验失败，带错误重新渲染表单", body = ApiResponse<BrandFormView>)
    )
)]
pub async fn brand_create_post(
    State(state): State<AppState>,
    Form(form): Form<BrandForm>,
) -> Result<Response, AppError> {
    let form = form.sanitized();
    let mut violations = Violations::new();
    violations.check(&form);

    if !violations.is_empty() {
        let view = BrandFormView {
            title: "Create Brand".to_string(),
            brand: form,
            errors: violations.into_messages(),
        };
        return Ok(Json(ApiResponse::ok(view)).into_response());
    }

    let service = BrandService::new(&state.db);
    let brand = service.create(form.into_brand(ObjectId::new())).await?;
    Ok(Redirect::to(&brand.url()).into_response())
}

/// 品牌删除确认：并发取品牌与其键盘；品牌不存在则回到列表
#[utoipa::path(
    get,
    path = "/inventory/brand/{id}/delete",
    tag = "brands",
    params(("id" = String, Path, description = "品牌 ID")),
    responses(
        (status = 200, description = "删除确认视图", body = ApiResponse<BrandDeleteView>),
        (status = 303, description = "品牌不存在，重定向到列表")
    )
)]
pub async fn brand_delete_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let brands = BrandService::new(&state.db);
    let keyboards = KeyboardService::new(&state.db);

    let (brand, brand_keyboards) = tokio::try_join!(brands.find(id), keyboards.list_by_brand(id))?;

    let Some(brand) = brand else {
        return Ok(Redirect::to("/inventory/brands").into_response());
    };

    Ok(Json(ApiResponse::ok(delete_view(brand.into(), brand_keyboards))).into_response())
}

/// 品牌删除。存在依赖键盘时拒绝并重新渲染确认视图。
#[utoipa::path(
    post,
    path = "/inventory/brand/{id}/delete",
    tag = "brands",
    params(("id" = String, Path, description = "品牌 ID")),
    responses(
        (status = 303, description = "删除成功，重定向到列表"),
        (status = 200, description = "存在依赖，重新渲染确认视图", body = ApiResponse<BrandDeleteView>)
    )
)]
pub async fn brand_delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let service = BrandService::new(&state.db);

    match service.delete(id).await? {
        DeleteOutcome::Deleted => Ok(Redirect::to("/inventory/brands").into_response()),
        DeleteOutcome::Blocked(dependents) => {
            let brand = service.get(id).await?;
            Ok(Json(ApiResponse::ok(delete_view(brand.into(), dependents))).into_response())
        }
    }
}

fn delete_view(brand: BrandItem, dependents: Vec<common::models::Keyboard>) -> BrandDeleteView {
    let brand_name = brand.display_name.clone();
    BrandDeleteView {
        title: "Delete Brand".to_string(),
        brand,
        brand_keyboards: dependents
            .into_iter()
            .map(|k| KeyboardItem::new(k, Some(brand_name.clone())))
            .collect(),
    }
}

/// 品牌更新表单（预填当前值）
#[utoipa::path(
    get,
    path = "/inventory/brand/{id}/update",
    tag = "brands",
    params(("id" = String, Path, description = "品牌 ID")),
    responses(
        (status = 200, description = "预填更新表单", body = ApiResponse<BrandFormView>),
        (status = 404, description = "品牌未找到")
    )
)]
pub async fn brand_update_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<BrandFormView>>, AppError> {
    let id = parse_id(&id)?;
    let service = BrandService::new(&state.db);
    let brand = service.get(id).await?;
    Ok(Json(ApiResponse::ok(BrandFormView {
        title: "Update Brand".to_string(),
        brand: brand.into(),
        errors: vec![],
    })))
}

/// 品牌更新：整体替换可变字段，保留标识
#[utoipa::path(
    post,
    path = "/inventory/brand/{id}/update",
    tag = "brands",
    params(("id" = String, Path, description = "品牌 ID")),
    request_body = BrandForm,
    responses(
        (status = 303, description = "更新成功，重定向到详情页"),
        (status = 200, description = "校验失败，带错误重新渲染表单", body = ApiResponse<BrandFormView>),
        (status = 404, description = "品牌未找到")
    )
)]
pub async fn brand_update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<BrandForm>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let form = form.sanitized();
    let mut violations = Violations::new();
    violations.check(&form);

    if !violations.is_empty() {
        let view = BrandFormView {
            title: "Update Brand".to_string(),
            brand: form,
            errors: violations.into_messages(),
        };
        return Ok(Json(ApiResponse::ok(view)).into_response());
    }

    let service = BrandService::new(&state.db);
    let brand = service.update(form.into_brand(id)).await?;
    Ok(Redirect::to(&brand.url()).into_response())
}
