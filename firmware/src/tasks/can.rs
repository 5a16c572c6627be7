//! CAN通信タスク
//!
//! UI指令の受信、UI周期（約60Hz）での速度指令の反映、ステータス送信を行います。

use embassy_futures::select::{select3, Either3};
use embassy_stm32::can;
use embassy_time::{Duration, Ticker};
use embedded_can::{Id, StandardId};
use sensorless_bldc::can_protocol::{can_ids, encode_fault_status, encode_status, parse_command};
use sensorless_bldc::SpeedInput;

use crate::config::{self, UI_PERIOD_MS};
use crate::fmt::*;
use crate::state::{CONTROLLER, FAULTS, MOTOR_STATUS, VOLTAGE_STATE};

/// 標準IDのデータフレームを送信
async fn send_frame(tx: &mut can::CanTx<'static>, id: u32, data: &[u8]) {
    if let Some(std_id) = StandardId::new(id as u16) {
        if let Ok(frame) = can::frame::Frame::new_data(Id::Standard(std_id), data) {
            let _ = tx.write(&frame).await;
        }
    }
}

/// CAN通信タスク - UI指令処理とステータス送信
#[embassy_executor::task]
pub async fn can_task(can: can::Can<'static>) {
    let (mut tx, mut rx, _properties) = can.split();

    info!("CAN task started");

    let mut input = SpeedInput::new();
    let mut ui_ticker = Ticker::every(Duration::from_millis(UI_PERIOD_MS));
    let mut status_ticker = Ticker::every(Duration::from_millis(config::can::STATUS_PERIOD_MS));

    loop {
        match select3(rx.read(), ui_ticker.next(), status_ticker.next()).await {
            Either3::First(Ok(envelope)) => {
                let frame = envelope.frame;
                let id_raw = match frame.header().id() {
                    Id::Standard(std_id) => std_id.as_raw() as u32,
                    Id::Extended(ext_id) => ext_id.as_raw(),
                };

                match parse_command(id_raw, frame.data()) {
                    Some(command) => {
                        CONTROLLER.with(|c| input.apply(command, c));
                    }
                    None => {
                        debug!("Ignored CAN ID: 0x{:03X}", id_raw);
                    }
                }
            }
            Either3::First(Err(_e)) => {
                // バスエラーは次の受信で回復する
            }
            Either3::Second(()) => {
                // UI速度をコントローラーへ反映（tickと同じ排他区間）
                CONTROLLER.with(|c| input.service(c));
            }
            Either3::Third(()) => {
                let status = *MOTOR_STATUS.lock().await;
                send_frame(&mut tx, can_ids::STATUS, &encode_status(&status)).await;

                let voltage_state = *VOLTAGE_STATE.lock().await;
                let data = encode_fault_status(voltage_state.voltage, FAULTS.status());
                send_frame(&mut tx, can_ids::FAULT_STATUS, &data).await;
            }
        }
    }
}
