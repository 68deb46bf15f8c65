//! Shared data models for the inventory service.

pub mod brand;
pub mod keyboard;
pub mod keyboard_instance;
pub mod keyboard_switch;

// Re-export commonly used types
pub use brand::{Brand, BrandForm, BrandItem};
pub use keyboard::{ImageUpload, Keyboard, KeyboardForm, KeyboardItem};
pub use keyboard_instance::{
    InstanceStatus, KeyboardInstance, KeyboardInstanceForm, KeyboardInstanceItem,
};
pub use keyboard_switch::{KeyboardSwitch, KeyboardSwitchForm, KeyboardSwitchItem};
