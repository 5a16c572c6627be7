//! モータードライバー（TIM1相補PWM）
//!
//! 6ステップ転流の相駆動状態をTIM1の3チャネルに割り当てます。
//! - フローティング: チャネル無効（High/Low両方オフ）
//! - Low固定: チャネル有効、Duty 0（ローサイドON）
//! - High固定: チャネル有効、Duty最大
//! - PWM: チャネル有効、デューティ指令をタイマーの最大Dutyにスケール
//! - デューティ指令0: パターンに関係なく全チャネル無効

use embassy_stm32::{
    peripherals,
    timer::{complementary_pwm::ComplementaryPwm, Channel},
};
use sensorless_bldc::{
    commutation::channel_pulses, config::PWM_PERIOD_COUNTS, PhaseDrive, PhaseDriver,
};

const CHANNELS: [Channel; 3] = [Channel::Ch1, Channel::Ch2, Channel::Ch3];

pub struct MotorDriver {
    pwm: ComplementaryPwm<'static, peripherals::TIM1>,
    max_duty: u16,
    /// 次の転流で反映するデューティ指令 [PWMカウント]
    duty: u16,
}

impl MotorDriver {
    /// 全チャネル無効の状態で作成
    ///
    /// # 引数
    /// * `pwm` - PWMペリフェラル（TIM1）
    pub fn new(pwm: ComplementaryPwm<'static, peripherals::TIM1>) -> Self {
        let max_duty = pwm.get_max_duty();
        let mut driver = Self {
            pwm,
            max_duty,
            duty: 0,
        };
        driver.all_off();
        driver
    }

    /// PWMカウント（フルスケール `PWM_PERIOD_COUNTS`）をタイマーのDutyに変換
    fn scale(&self, pulse: u16) -> u16 {
        (pulse as u32 * self.max_duty as u32 / PWM_PERIOD_COUNTS as u32) as u16
    }
}

impl PhaseDriver for MotorDriver {
    fn set_phase_outputs(&mut self, outputs: [PhaseDrive; 3]) {
        // デューティ0（停止・フォルト・アライメント保持）では全チャネル無効
        let pulses = channel_pulses(outputs, self.duty, PWM_PERIOD_COUNTS);
        for (channel, pulse) in CHANNELS.into_iter().zip(pulses) {
            match pulse {
                None => self.pwm.disable(channel),
                Some(pulse) => {
                    let duty = self.scale(pulse);
                    self.pwm.set_duty(channel, duty);
                    self.pwm.enable(channel);
                }
            }
        }
    }

    fn set_duty_cycle(&mut self, duty: u16) {
        self.duty = duty;
    }

    fn all_off(&mut self) {
        self.duty = 0;
        for channel in CHANNELS {
            self.pwm.set_duty(channel, 0);
            self.pwm.disable(channel);
        }
    }
}
