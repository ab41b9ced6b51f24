//! Release settings: types, the project file loader and the manager.
/// 設定ファイルローダー
mod loader;
/// 設定マネージャー
mod manager;
/// 設定の型定義
mod types;

pub use loader::CONFIG_FILE_NAME;
pub use manager::ConfigManager;
pub use types::{
    ConfigError,
    Settings,
    ValidationError,
};
