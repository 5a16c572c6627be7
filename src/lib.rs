//! センサレスBLDC 6ステップ転流コントローラー
//!
//! 制御周期で動く運転状態機械（[`MotorController`]）と、
//! 転流イベントで動くシーケンサー（[`CommutationSequencer`]）を提供します。
//! ハードウェア依存部分は [`driver`] のトレイト越しに扱うので、ホスト上でテストできます。
#![cfg_attr(not(test), no_std)]

// fmtは他のモジュールより先に宣言する（マクロのため）
mod fmt;

pub mod can_protocol;
pub mod command;
pub mod commutation;
pub mod config;
pub mod controller;
pub mod driver;
pub mod fault;
pub mod ramp;
pub mod shared;
pub mod state;
pub mod timing_table;
pub mod voltage_monitor;

pub use command::{Command, SpeedInput};
pub use commutation::{CommutationSequencer, PhaseDrive, Sector};
pub use config::ControlConfig;
pub use controller::MotorController;
pub use driver::{FaultMonitor, OpenLoopTiming, PhaseDriver};
pub use fault::{Fault, FaultRegister};
pub use ramp::ramp_step;
pub use shared::Shared;
pub use state::{CommutationLink, OperatingState, RunState};
pub use timing_table::OpenLoopTable;
pub use voltage_monitor::{VoltageMonitor, VoltageMonitorConfig, VoltageMonitorState};
