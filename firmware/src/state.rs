//! グローバル共有状態管理
//!
//! - コントローラーと相ドライバー: クリティカルセクションで保護（転流タスクは割り込み優先度で動くため）
//! - 転流タスクへ公開する運転状態・転流周期とフォルト: アトミック
//! - CAN送信用のスナップショット: スレッドモードのMutex

use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::mutex::Mutex;
use sensorless_bldc::can_protocol::MotorStatus;
use sensorless_bldc::{
    CommutationLink, FaultRegister, MotorController, OpenLoopTable, Shared, VoltageMonitorState,
};

use crate::motor_driver::MotorDriver;

/// ファームウェアで使うコントローラーの型
pub type Controller = MotorController<
    'static,
    &'static Shared<MotorDriver>,
    &'static FaultRegister,
    OpenLoopTable,
>;

/// 運転状態と転流周期（制御タスクが書き、転流タスクが読む）
pub static LINK: CommutationLink = CommutationLink::new();

/// フォルトレジスタ
pub static FAULTS: FaultRegister = FaultRegister::new();

/// TIM1相ドライバー
pub static PHASE_DRIVER: Shared<MotorDriver> = Shared::new();

/// 運転状態機械
pub static CONTROLLER: Shared<Controller> = Shared::new();

/// モーターステータス（CAN送信用）
pub static MOTOR_STATUS: Mutex<ThreadModeRawMutex, MotorStatus> = Mutex::new(MotorStatus::new());

/// 電圧監視ステータス（CAN送信用）
pub static VOLTAGE_STATE: Mutex<ThreadModeRawMutex, VoltageMonitorState> =
    Mutex::new(VoltageMonitorState::new());
