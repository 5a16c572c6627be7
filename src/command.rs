//! UI指令
//!
//! CANなどで受けた指令を保持し、UI周期（約60Hz）でコントローラーへ渡します。
//! `apply` と `service` はどちらも制御tickと同じ排他区間内で呼ぶこと。

use crate::config::{PWM_PERIOD_COUNTS, SPEED_INPUT_STEP};
use crate::controller::MotorController;
use crate::driver::{FaultMonitor, OpenLoopTiming, PhaseDriver};
use crate::fmt::*;

/// UI指令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// 速度指令 [PWMカウント]
    SetSpeed(u16),
    SpeedUp,
    SpeedDown,
    /// 停止してリセット
    Stop,
    /// 始動（速度指令で始動するので何もしない）
    Start,
    /// 診断用: 転流周期を遅く
    TimingSlower,
    /// 診断用: 転流周期を速く
    TimingFaster,
}

/// UI側の速度入力
pub struct SpeedInput {
    speed: u16,
    step: u16,
}

impl SpeedInput {
    pub const fn new() -> Self {
        Self::with_step(SPEED_INPUT_STEP)
    }

    pub const fn with_step(step: u16) -> Self {
        Self { speed: 0, step }
    }

    /// 現在のUI速度 [PWMカウント]
    pub fn speed(&self) -> u16 {
        self.speed
    }

    /// 指令を適用
    pub fn apply<D, F, T>(&mut self, command: Command, controller: &mut MotorController<'_, D, F, T>)
    where
        D: PhaseDriver,
        F: FaultMonitor,
        T: OpenLoopTiming,
    {
        match command {
            Command::SetSpeed(speed) => {
                self.speed = speed.min(PWM_PERIOD_COUNTS);
            }
            Command::SpeedUp => {
                self.speed = self.speed.saturating_add(self.step).min(PWM_PERIOD_COUNTS);
            }
            Command::SpeedDown => {
                self.speed = self.speed.saturating_sub(self.step);
            }
            Command::Stop => {
                info!("stop command");
                controller.reset();
                self.speed = 0;
            }
            Command::Start => {}
            Command::TimingSlower | Command::TimingFaster => {
                if !controller.config().manual_timing {
                    error!("manual timing disabled, ignoring {:?}", command);
                    return;
                }
                if command == Command::TimingSlower {
                    controller.timing_step_slower();
                } else {
                    controller.timing_step_faster();
                }
            }
        }
    }

    /// UI周期処理: UI速度をコントローラーへ渡す
    pub fn service<D, F, T>(&self, controller: &mut MotorController<'_, D, F, T>)
    where
        D: PhaseDriver,
        F: FaultMonitor,
        T: OpenLoopTiming,
    {
        controller.set_commanded_speed(self.speed);
    }
}

impl Default for SpeedInput {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commutation::PhaseDrive;
    use crate::config::{ControlConfig, RAMP_START_PERIOD, RAMP_UNIT, STARTUP_DUTY};
    use crate::fault::FaultRegister;
    use crate::state::{CommutationLink, OperatingState};
    use crate::timing_table::OpenLoopTable;

    struct NullDriver;

    impl PhaseDriver for NullDriver {
        fn set_phase_outputs(&mut self, _outputs: [PhaseDrive; 3]) {}
        fn set_duty_cycle(&mut self, _duty: u16) {}
        fn all_off(&mut self) {}
    }

    fn setup<'a>(
        link: &'a CommutationLink,
        faults: &'a FaultRegister,
        config: ControlConfig,
    ) -> MotorController<'a, NullDriver, &'a FaultRegister, OpenLoopTable> {
        MotorController::new(link, NullDriver, faults, OpenLoopTable::DEFAULT, config)
    }

    #[test]
    fn test_speed_steps_saturate() {
        let link = CommutationLink::new();
        let faults = FaultRegister::new();
        let mut ctrl = setup(&link, &faults, ControlConfig::default());
        let mut input = SpeedInput::with_step(10);

        input.apply(Command::SpeedDown, &mut ctrl);
        assert_eq!(input.speed(), 0);

        input.apply(Command::SetSpeed(245), &mut ctrl);
        input.apply(Command::SpeedUp, &mut ctrl);
        assert_eq!(input.speed(), PWM_PERIOD_COUNTS);

        input.apply(Command::SetSpeed(1000), &mut ctrl);
        assert_eq!(input.speed(), PWM_PERIOD_COUNTS);
    }

    #[test]
    fn test_service_forwards_speed() {
        let link = CommutationLink::new();
        let faults = FaultRegister::new();
        let mut ctrl = setup(&link, &faults, ControlConfig::default());
        let mut input = SpeedInput::new();

        input.apply(Command::SetSpeed(STARTUP_DUTY + 4), &mut ctrl);
        assert_eq!(ctrl.commanded_speed(), 0);
        input.service(&mut ctrl);
        assert_eq!(ctrl.commanded_speed(), STARTUP_DUTY + 4);
    }

    #[test]
    fn test_stop_resets_controller_and_input() {
        let link = CommutationLink::new();
        let faults = FaultRegister::new();
        let mut ctrl = setup(&link, &faults, ControlConfig::default());
        let mut input = SpeedInput::new();

        input.apply(Command::SetSpeed(80), &mut ctrl);
        input.service(&mut ctrl);
        ctrl.tick();
        assert_eq!(ctrl.operating_state(), OperatingState::Align);

        input.apply(Command::Stop, &mut ctrl);
        assert_eq!(input.speed(), 0);
        assert_eq!(ctrl.operating_state(), OperatingState::Stopped);
        assert_eq!(ctrl.commanded_speed(), 0);

        // 次のUI周期でも停止のまま
        input.service(&mut ctrl);
        ctrl.tick();
        assert_eq!(ctrl.operating_state(), OperatingState::Stopped);
    }

    #[test]
    fn test_start_is_noop() {
        let link = CommutationLink::new();
        let faults = FaultRegister::new();
        let mut ctrl = setup(&link, &faults, ControlConfig::default());
        let mut input = SpeedInput::new();

        input.apply(Command::Start, &mut ctrl);
        input.service(&mut ctrl);
        ctrl.tick();
        assert_eq!(ctrl.operating_state(), OperatingState::Stopped);
    }

    #[test]
    fn test_timing_steps_gated_by_config() {
        let link = CommutationLink::new();
        let faults = FaultRegister::new();
        let mut ctrl = setup(&link, &faults, ControlConfig::default());
        let mut input = SpeedInput::new();
        input.apply(Command::SetSpeed(80), &mut ctrl);
        input.service(&mut ctrl);
        ctrl.tick();

        input.apply(Command::TimingFaster, &mut ctrl);
        assert_eq!(ctrl.operating_state(), OperatingState::Align);
        assert_eq!(ctrl.commutation_period(), RAMP_START_PERIOD);

        let config = ControlConfig {
            manual_timing: true,
            ..ControlConfig::default()
        };
        let mut ctrl = setup(&link, &faults, config);
        ctrl.set_commutation_period(RAMP_START_PERIOD);
        input.apply(Command::TimingFaster, &mut ctrl);
        assert_eq!(ctrl.operating_state(), OperatingState::Manual);
        assert_eq!(ctrl.commutation_period(), RAMP_START_PERIOD - RAMP_UNIT);

        input.apply(Command::TimingSlower, &mut ctrl);
        assert_eq!(ctrl.commutation_period(), RAMP_START_PERIOD);
    }
}
