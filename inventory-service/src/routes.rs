//! 库存路由表
//!
//! 全部挂在 /inventory 前缀下。create 路由必须注册在 {id} 路由之前。

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::handlers::{brand, keyboard, keyboard_instance, keyboard_switch};
use crate::state::AppState;

/// 创建库存路由
pub fn router() -> Router<AppState> {
    Router::new()
        // 首页
        .route("/inventory", get(handlers::index))
        // 键盘
        .route(
            "/inventory/keyboard/create",
            get(keyboard::keyboard_create_get).post(keyboard::keyboard_create_post),
        )
        .route(
            "/inventory/keyboard/{id}/delete",
            get(keyboard::keyboard_delete_get).post(keyboard::keyboard_delete_post),
        )
        .route(
            "/inventory/keyboard/{id}/update",
            get(keyboard::keyboard_update_get).post(keyboard::keyboard_update_post),
        )
        .route("/inventory/keyboard/{id}", get(keyboard::keyboard_detail))
        .route("/inventory/keyboards", get(keyboard::keyboard_list))
        // 品牌
        .route(
            "/inventory/brand/create",
            get(brand::brand_create_get).post(brand::brand_create_post),
        )
        .route(
            "/inventory/brand/{id}/delete",
            get(brand::brand_delete_get).post(brand::brand_delete_post),
        )
        .route(
            "/inventory/brand/{id}/update",
            get(brand::brand_update_get).post(brand::brand_update_post),
        )
        .route("/inventory/brand/{id}", get(brand::brand_detail))
        .route("/inventory/brands", get(brand::brand_list))
        // 轴体
        .route(
            "/inventory/keyboardswitch/create",
            get(keyboard_switch::switch_create_get).post(keyboard_switch::switch_create_post),
        )
        .route(
            "/inventory/keyboardswitch/{id}/delete",
            get(keyboard_switch::switch_delete_get).post(keyboard_switch::switch_delete_post),
        )
        .route(
            "/inventory/keyboardswitch/{id}/update",
            get(keyboard_switch::switch_update_get).post(keyboard_switch::switch_update_post),
        )
        .route(
            "/inventory/keyboardswitch/{id}",
            get(keyboard_switch::switch_detail),
        )
        .route(
            "/inventory/keyboardswitchs",
            get(keyboard_switch::switch_list),
        )
        // 键盘实例
        .route(
            "/inventory/keyboardinstance/create",
            get(keyboard_instance::instance_create_get)
                .post(keyboard_instance::instance_create_post),
        )
        .route(
            "/inventory/keyboardinstance/{id}/delete",
            get(keyboard_instance::instance_delete_get)
                .post(keyboard_instance::instance_delete_post),
        )
        .route(
            "/inventory/keyboardinstance/{id}/update",
            get(keyboard_instance::instance_update_get)
                .post(keyboard_instance::instance_update_post),
        )
        .route(
            "/inventory/keyboardinstance/{id}",
            get(keyboard_instance::instance_detail),
        )
        .route(
            "/inventory/keyboardinstances",
            get(keyboard_instance::instance_list),
        )
        // 健康检查
        .route("/api/health", get(handlers::health_check))
}
