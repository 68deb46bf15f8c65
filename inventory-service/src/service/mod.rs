//! 数据访问层
//!
//! 每个实体一个服务模块。存储层无法按联接字段排序，列表联接与排序
//! 在内存中完成，相关纯函数与服务放在同一模块便于测试。

pub mod brand;
pub mod keyboard;
pub mod keyboard_instance;
pub mod keyboard_switch;

pub use brand::BrandService;
pub use keyboard::KeyboardService;
pub use keyboard_instance::InstanceService;
pub use keyboard_switch::SwitchService;

/// Outcome of a guarded delete.
#[derive(Debug)]
pub enum DeleteOutcome<T> {
    /// The entity was removed (or was already gone).
    Deleted,
    /// Live dependents block the delete; the caller re-renders the
    /// confirmation view listing them instead of deleting.
    Blocked(Vec<T>),
}
