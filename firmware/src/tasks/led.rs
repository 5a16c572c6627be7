//! LED制御タスク
//!
//! - LED1: 運転状態ごとの点滅周期
//! - LED2: フォルト中に点灯
//! - LED3: 速度指令が運転しきい値を超えている間点灯

use embassy_stm32::gpio::Output;
use embassy_time::{Duration, Timer};
use sensorless_bldc::{OperatingState, RunState};

use crate::config::led;
use crate::fmt::*;
use crate::state::{CONTROLLER, FAULTS, LINK};

fn blink_period_ms(state: OperatingState) -> u64 {
    match state {
        OperatingState::Stopped => led::STOPPED_PERIOD_MS,
        OperatingState::Align | OperatingState::RampUp => led::STARTING_PERIOD_MS,
        OperatingState::OpenLoop | OperatingState::ClosedLoop => led::RUNNING_PERIOD_MS,
        OperatingState::Manual => led::MANUAL_PERIOD_MS,
    }
}

#[embassy_executor::task]
pub async fn led_task(
    mut led1: Output<'static>,
    mut led2: Output<'static>,
    mut led3: Output<'static>,
) {
    info!("LED task started");

    loop {
        let half_period = Duration::from_millis(blink_period_ms(LINK.operating_state()) / 2);

        if FAULTS.status() != 0 {
            led2.set_high();
        } else {
            led2.set_low();
        }

        let running = CONTROLLER.with(|c| c.run_state()) == Some(RunState::Running);
        if running {
            led3.set_high();
        } else {
            led3.set_low();
        }

        led1.set_high();
        Timer::after(half_period).await;
        led1.set_low();
        Timer::after(half_period).await;
    }
}
