//! 電圧監視タスク
//!
//! DCバス電圧を監視し、運転中の過電圧/低電圧をフォルトとして登録します。
//! フォルト中は制御タスクが出力を止めます（解除は停止指令によるリセット）。

use embassy_stm32::{adc::Adc, peripherals};
use embassy_time::{Duration, Ticker};
use sensorless_bldc::fault::supervise_voltage;
use sensorless_bldc::{RunState, VoltageMonitor, VoltageMonitorConfig};

use crate::config::voltage;
use crate::fmt::*;
use crate::state::{CONTROLLER, FAULTS, VOLTAGE_STATE};

#[embassy_executor::task]
pub async fn voltage_monitor_task(
    mut adc: Adc<'static, peripherals::ADC2>,
    mut voltage_pin: embassy_stm32::adc::AnyAdcChannel<peripherals::ADC2>,
) {
    info!("Voltage monitor task started");

    let config = VoltageMonitorConfig::default();
    info!(
        "Voltage monitor initialized: OV={}V, UV={}V",
        config.overvoltage_threshold, config.undervoltage_threshold
    );
    let mut monitor = VoltageMonitor::new(config);

    // 初回ADC読み取りでフィルタを初期化（起動時のUNDERVOLTAGE誤検出を防ぐ）
    let initial_adc = adc.blocking_read(&mut voltage_pin);
    monitor.initialize_with_adc(initial_adc);
    let state = monitor.state();
    info!(
        "Initial voltage: {}V (ADC raw: {}), OV={}, UV={}",
        state.voltage, initial_adc, state.overvoltage, state.undervoltage
    );

    let mut ticker = Ticker::every(Duration::from_millis(voltage::PERIOD_MS));

    // デバッグログ用カウンタ（1秒ごとにログ）
    let mut log_counter = 0u32;

    loop {
        ticker.next().await;

        let adc_raw = adc.blocking_read(&mut voltage_pin);
        let state = monitor.update(adc_raw);

        // グローバル状態を更新（CAN送信用）
        *VOLTAGE_STATE.lock().await = state;

        let run_state = CONTROLLER
            .with(|c| c.run_state())
            .unwrap_or(RunState::NotRunning);
        supervise_voltage(run_state, &state, &FAULTS);

        log_counter += 1;
        if log_counter >= 10 {
            log_counter = 0;
            debug!(
                "[Voltage] ADC_raw={}, V_filtered={}V, OV={}, UV={}, faults={}",
                adc_raw,
                state.voltage,
                state.overvoltage,
                state.undervoltage,
                FAULTS.status()
            );
        }
    }
}
