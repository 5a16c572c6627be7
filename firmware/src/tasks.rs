//! タスクモジュール
//!
//! 各タスクの実装を分離して管理します。

pub mod can;
pub mod commutation;
pub mod control;
pub mod led;
pub mod voltage_monitor;

// タスク関数を再エクスポート
pub use can::can_task;
pub use commutation::commutation_task;
pub use control::control_task;
pub use led::led_task;
pub use voltage_monitor::voltage_monitor_task;
