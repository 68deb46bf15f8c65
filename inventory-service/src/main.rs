//! 键盘库存管理服务
//!
//! 面向键盘零售场景的库存管理，提供以下功能：
//! - 品牌、键盘、轴体、键盘实例的增删改查
//! - 表单校验与净化（全部违规一次性收集）
//! - 删除守卫：存在依赖记录时拒绝删除并列出阻塞项

mod handlers;
mod routes;
mod service;
mod state;

use axum::{middleware, routing::get, Json, Router};
use common::config::AppConfig;
use common::middleware::request_id::request_id_middleware;
use state::AppState;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

const SERVICE_NAME: &str = "inventory-service";
const DEFAULT_PORT: u16 = 8080;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "键盘库存 API",
        version = "0.1.0",
        description = "键盘零售库存管理服务"
    ),
    paths(
        handlers::index,
        handlers::health_check,
        handlers::brand::brand_list,
        handlers::brand::brand_detail,
        handlers::brand::brand_create_get,
        handlers::brand::brand_create_post,
        handlers::brand::brand_delete_get,
        handlers::brand::brand_delete_post,
        handlers::brand::brand_update_get,
        handlers::brand::brand_update_post,
        handlers::keyboard::keyboard_list,
        handlers::keyboard::keyboard_detail,
        handlers::keyboard::keyboard_create_get,
        handlers::keyboard::keyboard_create_post,
        handlers::keyboard::keyboard_delete_get,
        handlers::keyboard::keyboard_delete_post,
        handlers::keyboard::keyboard_update_get,
        handlers::keyboard::keyboard_update_post,
        handlers::keyboard_switch::switch_list,
        handlers::keyboard_switch::switch_detail,
        handlers::keyboard_switch::switch_create_get,
        handlers::keyboard_switch::switch_create_post,
        handlers::keyboard_switch::switch_delete_get,
        handlers::keyboard_switch::switch_delete_post,
        handlers::keyboard_switch::switch_update_get,
        handlers::keyboard_switch::switch_update_post,
        handlers::keyboard_instance::instance_list,
        handlers::keyboard_instance::instance_detail,
        handlers::keyboard_instance::instance_create_get,
        handlers::keyboard_instance::instance_create_post,
        handlers::keyboard_instance::instance_delete_get,
        handlers::keyboard_instance::instance_delete_post,
        handlers::keyboard_instance::instance_update_get,
        handlers::keyboard_instance::instance_update_post,
    ),
    components(schemas(
        common::models::BrandForm,
        common::models::BrandItem,
        common::models::KeyboardForm,
        common::models::KeyboardItem,
        common::models::KeyboardSwitchForm,
        common::models::KeyboardSwitchItem,
        common::models::KeyboardInstanceForm,
        common::models::KeyboardInstanceItem,
        common::models::InstanceStatus,
        handlers::IndexView,
        handlers::HealthResponse,
        handlers::brand::BrandListView,
        handlers::brand::BrandDetailView,
        handlers::brand::BrandFormView,
        handlers::brand::BrandDeleteView,
        handlers::keyboard::KeyboardListView,
        handlers::keyboard::KeyboardDetailView,
        handlers::keyboard::KeyboardFormView,
        handlers::keyboard::KeyboardDeleteView,
        handlers::keyboard_switch::SwitchListView,
        handlers::keyboard_switch::SwitchDetailView,
        handlers::keyboard_switch::SwitchFormView,
        handlers::keyboard_switch::SwitchDeleteView,
        handlers::keyboard_instance::InstanceListView,
        handlers::keyboard_instance::InstanceDetailView,
        handlers::keyboard_instance::InstanceFormView,
        handlers::keyboard_instance::InstanceDeleteView,
    )),
    tags(
        (name = "inventory", description = "库存首页"),
        (name = "brands", description = "品牌管理端点"),
        (name = "keyboards", description = "键盘管理端点"),
        (name = "switches", description = "轴体管理端点"),
        (name = "instances", description = "键盘实例管理端点"),
        (name = "health", description = "健康检查端点")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Load .env file (if present) before anything else
    load_dotenv();

    // 初始化日志追踪
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // 加载配置
    let mut config = AppConfig::load_with_service(SERVICE_NAME);
    config.port = std::env::var("SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    // 创建应用状态（连接 MongoDB）
    let state = AppState::new(config.clone())
        .await
        .expect("Failed to initialize application state (check MONGODB_URI)");

    // 创建路由
    let app = create_router(state);

    // 启动服务
    let addr = format!("{}:{}", config.host, config.port);
    info!(service = SERVICE_NAME, address = %addr, "启动服务");

    let listener = TcpListener::bind(&addr).await.expect("绑定地址失败");
    axum::serve(listener, app).await.expect("服务启动失败");
}

fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::router())
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Load .env file from the working directory (best-effort, no error if missing).
fn load_dotenv() {
    let env_path = std::path::Path::new(".env");
    if env_path.exists() {
        if let Ok(content) = std::fs::read_to_string(env_path) {
            for line in content.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    let key = key.trim();
                    let value = value.trim();
                    // Only set if not already set by the environment
                    if std::env::var(key).is_err() {
                        std::env::set_var(key, value);
                    }
                }
            }
        }
    }
}
