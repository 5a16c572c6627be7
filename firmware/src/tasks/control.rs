//! 制御タスク
//!
//! 1kHzで運転状態機械を評価し、CAN送信用のステータスを更新します。

use embassy_time::{Duration, Ticker};
use sensorless_bldc::can_protocol::MotorStatus;

use crate::config::{CONTROL_PERIOD_US, CONTROL_RATE_HZ};
use crate::fmt::*;
use crate::state::{CONTROLLER, MOTOR_STATUS};

/// 制御タスク（1kHz）
#[embassy_executor::task]
pub async fn control_task() {
    info!("Control task started ({}Hz)", CONTROL_RATE_HZ);

    let mut ticker = Ticker::every(Duration::from_micros(CONTROL_PERIOD_US));

    // デバッグログ用カウンタ（1秒ごとにログ）
    let mut log_counter = 0u32;

    loop {
        ticker.next().await;

        // tickとステータス取得を同じクリティカルセクションで行う
        let status = CONTROLLER.with(|c| {
            let duty = c.tick();
            MotorStatus {
                state: c.operating_state(),
                run_state: c.run_state(),
                commutation_period: c.commutation_period(),
                commanded_speed: c.commanded_speed(),
                duty,
            }
        });

        let Some(status) = status else {
            error!("Controller not initialized");
            continue;
        };

        *MOTOR_STATUS.lock().await = status;

        log_counter += 1;
        if log_counter >= CONTROL_RATE_HZ {
            log_counter = 0;
            debug!(
                "[Control] state={:?}, period={}, speed={}, duty={}",
                status.state, status.commutation_period, status.commanded_speed, status.duty
            );
        }
    }
}
