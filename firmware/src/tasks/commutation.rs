//! 転流タスク
//!
//! 割り込みエグゼキューター上で動き、制御タスクより優先されます。
//! 公開された転流周期だけ待ってからシーケンサーを1ステップ進めます。
//! 停止中は周期が最大値になるので、ほぼ何もしないループになります。

use embassy_time::{Duration, Timer};
use sensorless_bldc::{CommutationSequencer, Shared};

use crate::config::COMMUTATION_TICK_US;
use crate::fmt::*;
use crate::motor_driver::MotorDriver;
use crate::state::LINK;

pub type Sequencer = CommutationSequencer<'static, &'static Shared<MotorDriver>>;

#[embassy_executor::task]
pub async fn commutation_task(mut sequencer: Sequencer) {
    info!("Commutation task started");

    loop {
        let period = LINK.commutation_period();
        Timer::after(Duration::from_micros(period as u64 * COMMUTATION_TICK_US)).await;
        sequencer.on_commutation();
    }
}
