#![no_std]
#![no_main]

mod config;
mod fmt;
mod hardware;
mod motor_driver;
mod state;
mod tasks;

#[cfg(not(feature = "defmt"))]
use panic_halt as _;
#[cfg(feature = "defmt")]
use {defmt_rtt as _, panic_probe as _};

use embassy_executor::{InterruptExecutor, Spawner};
use embassy_stm32::{
    adc::{Adc, AdcChannel, SampleTime},
    gpio::{Level, Output, Speed},
    interrupt,
    interrupt::{InterruptExt, Priority},
};
use embassy_time::{Duration, Timer};
use sensorless_bldc::{CommutationSequencer, ControlConfig, MotorController, OpenLoopTable};

use fmt::*;
use motor_driver::MotorDriver;
use state::{CONTROLLER, FAULTS, LINK, PHASE_DRIVER};
use tasks::{can_task, commutation_task, control_task, led_task, voltage_monitor_task};

/// 転流タスク用の高優先度エグゼキューター
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn LPUART1() {
    EXECUTOR_HIGH.on_interrupt()
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    // ハードウェア初期化
    let config = hardware::create_clock_config();
    let p = embassy_stm32::init(config);

    info!("═══════════════════════════════════════════════════════════════════");
    info!("     Sensorless BLDC six-step controller • STM32G431VB @ 170MHz");
    info!("═══════════════════════════════════════════════════════════════════");

    // PWM初期化（TIM1、3相相補PWM）→ 相ドライバー
    let pwm = hardware::init_pwm(p.TIM1, p.PE9, p.PE8, p.PE11, p.PE10, p.PE13, p.PE12);
    PHASE_DRIVER.init(MotorDriver::new(pwm));

    // 運転状態機械（停止状態で開始）
    let control_config = ControlConfig::default();
    info!(
        "Control config: align={} rampup={} startup={} shutoff={} frames={}",
        control_config.align_duty,
        control_config.rampup_duty,
        control_config.startup_duty,
        control_config.shutoff_duty,
        control_config.align_frames
    );
    CONTROLLER.init(MotorController::new(
        &LINK,
        &PHASE_DRIVER,
        &FAULTS,
        OpenLoopTable::DEFAULT,
        control_config,
    ));

    // 転流タスクを高優先度エグゼキューターで起動
    interrupt::LPUART1.set_priority(Priority::P6);
    let high_spawner = EXECUTOR_HIGH.start(interrupt::LPUART1);
    high_spawner
        .spawn(commutation_task(CommutationSequencer::new(&LINK, &PHASE_DRIVER)))
        .unwrap();

    spawner.spawn(control_task()).unwrap();

    // LED初期化＆タスク起動
    let led1 = Output::new(p.PC13, Level::Low, Speed::Low);
    let led2 = Output::new(p.PC14, Level::Low, Speed::Low);
    let led3 = Output::new(p.PC15, Level::Low, Speed::Low);
    spawner.spawn(led_task(led1, led2, led3)).unwrap();

    // CAN初期化＆タスク起動
    let can = hardware::init_can(p.FDCAN1, p.PA11, p.PA12);
    spawner.spawn(can_task(can)).unwrap();

    // 電圧監視タスク起動（PC1 = ADC2_IN7）
    let mut adc2 = Adc::new(p.ADC2);
    adc2.set_sample_time(SampleTime::CYCLES640_5);
    let voltage_pin = p.PC1.degrade_adc();
    spawner
        .spawn(voltage_monitor_task(adc2, voltage_pin))
        .unwrap();
    info!("Voltage monitoring started on PC1 (ADC2_IN7)");

    info!("All tasks spawned, motor stopped");

    loop {
        Timer::after(Duration::from_secs(1)).await;
    }
}
