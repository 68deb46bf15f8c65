//! Handler 模块
//!
//! 每个实体一个控制器模块；视图结构体与对应 handler 放在一起。

pub mod brand;
pub mod keyboard;
pub mod keyboard_instance;
pub mod keyboard_switch;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::Serialize;
use utoipa::ToSchema;

use common::errors::{AppError, AppResult};
use common::response::ApiResponse;

use crate::service::brand::BrandServiceTrait;
use crate::service::{BrandService, InstanceService, KeyboardService, SwitchService};
use crate::state::AppState;

/// 将路径参数解析为 ObjectId。非法 id 不可能命中任何文档，视同未找到。
pub(crate) fn parse_id(id: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| AppError::InvalidId(id.to_string()))
}

/// 首页视图：各集合数量统计
#[derive(Serialize, ToSchema)]
pub struct IndexView {
    pub title: String,
    pub keyboard_count: u64,
    pub keyboard_instance_count: u64,
    pub keyboard_instance_in_stock_count: u64,
    pub brand_count: u64,
    pub switch_count: u64,
}

/// 库存首页：并发统计各集合数量
#[utoipa::path(
    get,
    path = "/inventory",
    tag = "inventory",
    responses(
        (status = 200, description = "首页统计", body = ApiResponse<IndexView>)
    )
)]
pub async fn index(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<IndexView>>, AppError> {
    let brands = BrandService::new(&state.db);
    let keyboards = KeyboardService::new(&state.db);
    let switches = SwitchService::new(&state.db);
    let instances = InstanceService::new(&state.db);

    // 五个计数互相独立，一并发出，任一失败则整体失败
    let (keyboard_count, instance_count, in_stock_count, brand_count, switch_count) = tokio::try_join!(
        keyboards.count(),
        instances.count(),
        instances.count_in_stock(),
        brands.count(),
        switches.count(),
    )?;

    Ok(Json(ApiResponse::ok(IndexView {
        title: "Keyboard Inventory Home".to_string(),
        keyboard_count,
        keyboard_instance_count: instance_count,
        keyboard_instance_in_stock_count: in_stock_count,
        brand_count,
        switch_count,
    })))
}

/// 健康检查响应
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// 服务状态
    pub status: String,
    /// 服务名称
    pub service: String,
    /// 服务版本
    pub version: String,
    /// 当前时间戳
    pub timestamp: DateTime<Utc>,
}

/// 健康检查端点
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "服务运行正常", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "inventory-service".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_rejects_garbage() {
        assert!(parse_id("not-an-id").is_err());
        let id = ObjectId::new();
        assert_eq!(parse_id(&id.to_hex()).unwrap(), id);
    }
}
