//! 键盘控制器
//!
//! 创建与更新走 multipart 表单，以便附带可选的产品图片。

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use mongodb::bson::oid::ObjectId;
use serde::Serialize;
use utoipa::ToSchema;

use common::errors::{AppError, AppResult};
use common::models::{
    BrandItem, ImageUpload, KeyboardForm, KeyboardInstanceItem, KeyboardItem,
};
use common::response::ApiResponse;
use common::utils::Violations;

use crate::service::brand::BrandServiceTrait;
use crate::service::{BrandService, DeleteOutcome, InstanceService, KeyboardService};
use crate::state::AppState;

use super::parse_id;

/// 键盘列表视图
#[derive(Serialize, ToSchema)]
pub struct KeyboardListView {
    pub title: String,
    pub keyboard_list: Vec<KeyboardItem>,
}

/// 键盘详情视图
#[derive(Serialize, ToSchema)]
pub struct KeyboardDetailView {
    pub title: String,
    pub keyboard: KeyboardItem,
    pub keyboard_instances: Vec<KeyboardInstanceItem>,
}

/// 键盘表单视图，带品牌下拉列表
#[derive(Serialize, ToSchema)]
pub struct KeyboardFormView {
    pub title: String,
    pub keyboard: KeyboardForm,
    pub brand_list: Vec<BrandItem>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// 键盘删除确认视图（存在依赖实例时列出阻塞项）
#[derive(Serialize, ToSchema)]
pub struct KeyboardDeleteView {
    pub title: String,
    pub keyboard: KeyboardItem,
    pub keyboard_instances: Vec<KeyboardInstanceItem>,
}

fn multipart_error(_: MultipartError) -> AppError {
    AppError::Validation(vec!["Malformed form submission".to_string()])
}

/// 读取 multipart 表单：文本字段进 KeyboardForm，图片附件单独返回。
/// 图片的声明类型不在允许清单内时记为一条校验错误。
async fn read_keyboard_form(
    mut multipart: Multipart,
    violations: &mut Violations,
) -> AppResult<(KeyboardForm, Option<ImageUpload>)> {
    let mut form = KeyboardForm::default();
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "name" => form.name = field.text().await.map_err(multipart_error)?,
            "brand" => form.brand = field.text().await.map_err(multipart_error)?,
            "description" => form.description = field.text().await.map_err(multipart_error)?,
            "price" => form.price = field.text().await.map_err(multipart_error)?,
            "image" => {
                let content_type = field.content_type().map(String::from).unwrap_or_default();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                if bytes.is_empty() {
                    // 未选择文件
                    continue;
                }
                if ImageUpload::is_allowed_type(&content_type) {
                    image = Some(ImageUpload {
                        bytes: bytes.to_vec(),
                        content_type,
                    });
                } else {
                    violations.push("Image must be a PNG or JPEG");
                }
            }
            _ => {}
        }
    }

    Ok((form, image))
}

/// 键盘列表：品牌显示名已解析，按品牌显示名升序
#[utoipa::path(
    get,
    path = "/inventory/keyboards",
    tag = "keyboards",
    responses(
        (status = 200, description = "键盘列表", body = ApiResponse<KeyboardListView>)
    )
)]
pub async fn keyboard_list(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<KeyboardListView>>, AppError> {
    let service = KeyboardService::new(&state.db);
    let keyboard_list = service.list_with_brands().await?;
    Ok(Json(ApiResponse::ok(KeyboardListView {
        title: "Keyboard List".to_string(),
        keyboard_list,
    })))
}

/// 键盘详情：并发取（键盘+品牌）与其实例（实例解析到轴体名）
#[utoipa::path(
    get,
    path = "/inventory/keyboard/{id}",
    tag = "keyboards",
    params(("id" = String, Path, description = "键盘 ID")),
    responses(
        (status = 200, description = "键盘详情", body = ApiResponse<KeyboardDetailView>),
        (status = 404, description = "键盘未找到")
    )
)]
pub async fn keyboard_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<KeyboardDetailView>>, AppError> {
    let id = parse_id(&id)?;
    let keyboards = KeyboardService::new(&state.db);
    let instances = InstanceService::new(&state.db);

    let ((keyboard, brand), keyboard_instances) = tokio::try_join!(
        keyboards.get_with_brand(id),
        instances.list_by_keyboard_resolved(id)
    )?;

    Ok(Json(ApiResponse::ok(KeyboardDetailView {
        title: "Keyboard Detail".to_string(),
        keyboard: KeyboardItem::new(keyboard, brand.map(|b| b.display_name)),
        keyboard_instances,
    })))
}

/// 键盘创建表单（带品牌下拉列表）
#[utoipa::path(
    get,
    path = "/inventory/keyboard/create",
    tag = "keyboards",
    responses(
        (status = 200, description = "空白创建表单", body = ApiResponse<KeyboardFormView>)
    )
)]
pub async fn keyboard_create_get(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<KeyboardFormView>>, AppError> {
    let brands = BrandService::new(&state.db);
    let brand_list = brands.list().await?;
    Ok(Json(ApiResponse::ok(KeyboardFormView {
        title: "Create Keyboard".to_string(),
        keyboard: KeyboardForm::default(),
        brand_list: brand_list.into_iter().map(BrandItem::from).collect(),
        errors: vec![],
    })))
}

/// 键盘创建：multipart 表单，含可选图片；无唯一性检查，总是插入
#[utoipa::path(
    post,
    path = "/inventory/keyboard/create",
    tag = "keyboards",
    responses(
        (status = 303, description = "创建成功，重定向到详情页"),
        (status = 200, description = "校验失败，带错误重新渲染表单", body = ApiResponse<KeyboardFormView>)
    )
)]
pub async fn keyboard_create_post(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut violations = Violations::new();
    let (form, image) = read_keyboard_form(multipart, &mut violations).await?;

    let form = form.sanitized();
    violations.check(&form);
    let brand = violations.object_id("brand", &form.brand);
    let price = violations.integer_min("price", &form.price, 1);

    let (brand, price) = match (brand, price) {
        (Some(brand), Some(price)) if violations.is_empty() => (brand, price),
        _ => return form_view_response(&state, "Create Keyboard", form, violations).await,
    };

    let service = KeyboardService::new(&state.db);
    let keyboard = service
        .create(form.into_keyboard(ObjectId::new(), brand, price, image))
        .await?;
    Ok(Redirect::to(&keyboard.url()).into_response())
}

/// 校验失败：重新取品牌列表，连同净化值与全部错误重新渲染表单
async fn form_view_response(
    state: &AppState,
    title: &str,
    form: KeyboardForm,
    violations: Violations,
) -> Result<Response, AppError> {
    let brands = BrandService::new(&state.db);
    let brand_list = brands.list().await?;
    let view = KeyboardFormView {
        title: title.to_string(),
        keyboard: form,
        brand_list: brand_list.into_iter().map(BrandItem::from).collect(),
        errors: violations.into_messages(),
    };
    Ok(Json(ApiResponse::ok(view)).into_response())
}

/// 键盘删除确认：并发取键盘与其实例；键盘不存在则回到列表
#[utoipa::path(
    get,
    path = "/inventory/keyboard/{id}/delete",
    tag = "keyboards",
    params(("id" = String, Path, description = "键盘 ID")),
    responses(
        (status = 200, description = "删除确认视图", body = ApiResponse<KeyboardDeleteView>),
        (status = 303, description = "键盘不存在，重定向到列表")
    )
)]
pub async fn keyboard_delete_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let keyboards = KeyboardService::new(&state.db);
    let instances = InstanceService::new(&state.db);

    let (keyboard, keyboard_instances) = tokio::try_join!(
        keyboards.find(id),
        instances.list_by_keyboard_resolved(id)
    )?;

    let Some(keyboard) = keyboard else {
        return Ok(Redirect::to("/inventory/keyboards").into_response());
    };

    Ok(Json(ApiResponse::ok(KeyboardDeleteView {
        title: "Delete Keyboard".to_string(),
        keyboard: KeyboardItem::new(keyboard, None),
        keyboard_instances,
    }))
    .into_response())
}

/// 键盘删除。存在依赖实例时拒绝并重新渲染确认视图。
#[utoipa::path(
    post,
    path = "/inventory/keyboard/{id}/delete",
    tag = "keyboards",
    params(("id" = String, Path, description = "键盘 ID")),
    responses(
        (status = 303, description = "删除成功，重定向到列表"),
        (status = 200, description = "存在依赖，重新渲染确认视图", body = ApiResponse<KeyboardDeleteView>)
    )
)]
pub async fn keyboard_delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let keyboards = KeyboardService::new(&state.db);
    let instances = InstanceService::new(&state.db);

    match keyboards.delete(id).await? {
        DeleteOutcome::Deleted => Ok(Redirect::to("/inventory/keyboards").into_response()),
        DeleteOutcome::Blocked(_) => {
            let (keyboard, keyboard_instances) = tokio::try_join!(
                keyboards.get(id),
                instances.list_by_keyboard_resolved(id)
            )?;
            Ok(Json(ApiResponse::ok(KeyboardDeleteView {
                title: "Delete Keyboard".to_string(),
                keyboard: KeyboardItem::new(keyboard, None),
                keyboard_instances,
            }))
            .into_response())
        }
    }
}

/// 键盘更新表单：并发取键盘与品牌下拉列表，预填当前值
#[utoipa::path(
    get,
    path = "/inventory/keyboard/{id}/update",
    tag = "keyboards",
    params(("id" = String, Path, description = "键盘 ID")),
    responses(
        (status = 200, description = "预填更新表单", body = ApiResponse<KeyboardFormView>),
        (status = 404, description = "键盘未找到")
    )
)]
pub async fn keyboard_update_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<KeyboardFormView>>, AppError> {
    let id = parse_id(&id)?;
    let keyboards = KeyboardService::new(&state.db);
    let brands = BrandService::new(&state.db);

    let (keyboard, brand_list) = tokio::try_join!(keyboards.get(id), brands.list())?;

    Ok(Json(ApiResponse::ok(KeyboardFormView {
        title: "Update Keyboard".to_string(),
        keyboard: keyboard.into(),
        brand_list: brand_list.into_iter().map(BrandItem::from).collect(),
        errors: vec![],
    })))
}

/// 键盘更新：整体替换可变字段；未提交新图片时保留原图
#[utoipa::path(
    post,
    path = "/inventory/keyboard/{id}/update",
    tag = "keyboards",
    params(("id" = String, Path, description = "键盘 ID")),
    responses(
        (status = 303, description = "更新成功，重定向到详情页"),
        (status = 200, description = "校验失败，带错误重新渲染表单", body = ApiResponse<KeyboardFormView>),
        (status = 404, description = "键盘未找到")
    )
)]
pub async fn keyboard_update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let mut violations = Violations::new();
    let (form, image) = read_keyboard_form(multipart, &mut violations).await?;

    let form = form.sanitized();
    violations.check(&form);
    let brand = violations.object_id("brand", &form.brand);
    let price = violations.integer_min("price", &form.price, 1);

    let (brand, price) = match (brand, price) {
        (Some(brand), Some(price)) if violations.is_empty() => (brand, price),
        _ => return form_view_response(&state, "Update Keyboard", form, violations).await,
    };

    let service = KeyboardService::new(&state.db);
    let existing = service.get(id).await?;

    let mut keyboard = form.into_keyboard(id, brand, price, image);
    if keyboard.image.is_none() {
        // 未提交新图片时保留原图
        keyboard.image = existing.image;
        keyboard.image_content_type = existing.image_content_type;
    }

    let keyboard = service.update(keyboard).await?;
    Ok(Redirect::to(&keyboard.url()).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::models::Keyboard;

    #[test]
    fn test_price_and_brand_coercion_collects_all_violations() {
        let mut violations = Violations::new();
        let form = KeyboardForm {
            name: "One 2".into(),
            brand: "bogus".into(),
            description: String::new(),
            price: "0".into(),
        }
        .sanitized();
        violations.check(&form);
        assert!(violations.object_id("brand", &form.brand).is_none());
        assert!(violations.integer_min("price", &form.price, 1).is_none());
        // 两条违规都要收集到，而不是在第一条就短路
        assert_eq!(violations.into_messages().len(), 2);
    }

    #[test]
    fn test_keyboard_form_prefill_round_trip() {
        let kb = Keyboard {
            id: ObjectId::new(),
            name: "Race 3".into(),
            brand: ObjectId::new(),
            description: Some("75% layout".into()),
            price: 110,
            image: None,
            image_content_type: None,
        };
        let form = KeyboardForm::from(kb.clone());
        assert_eq!(form.name, "Race 3");
        assert_eq!(form.brand, kb.brand.to_hex());
        assert_eq!(form.price, "110");
    }
}
