//! 運転状態機械
//!
//! 制御周期（1kHz）ごとに [`MotorController::tick`] を呼び出します。
//! 指令速度・転流周期・運転状態はこの構造体だけが持ち、
//! 運転状態と転流周期は書き込むたびに [`CommutationLink`] へ公開します。
//!
//! 始動シーケンス:
//! 停止 → アライメント（セクター0固定）→ ランプアップ → オープンループ
//!
//! UIからの `set_commanded_speed` / `reset` は `tick` と同じ排他区間内で呼ぶこと。

use crate::config::{ControlConfig, MAX_COMMUTATION_PERIOD, RAMP_UNIT};
use crate::driver::{FaultMonitor, OpenLoopTiming, PhaseDriver};
use crate::fmt::*;
use crate::ramp::ramp_step;
use crate::state::{CommutationLink, OperatingState, RunState};

pub struct MotorController<'a, D, F, T>
where
    D: PhaseDriver,
    F: FaultMonitor,
    T: OpenLoopTiming,
{
    link: &'a CommutationLink,
    driver: D,
    faults: F,
    timing: T,
    config: ControlConfig,
    state: OperatingState,
    period: u16,
    commanded_speed: u16,
    align_timer: u16,
    duty_command: u16,
    /// フォルトログを1回だけ出すためのフラグ
    fault_reported: bool,
}

impl<'a, D, F, T> MotorController<'a, D, F, T>
where
    D: PhaseDriver,
    F: FaultMonitor,
    T: OpenLoopTiming,
{
    /// コントローラーを作成し、停止状態に初期化
    ///
    /// # 引数
    /// * `link` - 転流タスクへの公開先
    /// * `driver` - 相出力ドライバー
    /// * `faults` - フォルト監視
    /// * `timing` - オープンループ転流周期テーブル
    /// * `config` - 状態機械の設定
    pub fn new(
        link: &'a CommutationLink,
        driver: D,
        faults: F,
        timing: T,
        config: ControlConfig,
    ) -> Self {
        let mut controller = Self {
            link,
            driver,
            faults,
            timing,
            config,
            state: OperatingState::Stopped,
            period: MAX_COMMUTATION_PERIOD,
            commanded_speed: 0,
            align_timer: 0,
            duty_command: 0,
            fault_reported: false,
        };
        controller.reset();
        controller
    }

    /// 停止・再始動準備
    ///
    /// 起動時とフォルト後の両方で呼びます。出力を止め、転流周期を最大値にして
    /// （転流クロックは動かしたまま転流処理を実質無効化）、フォルトをクリアします。
    pub fn reset(&mut self) {
        self.stop();
        self.set_commutation_period(MAX_COMMUTATION_PERIOD);
        self.faults.clear();
        self.fault_reported = false;
        self.align_timer = 0;
        self.set_operating_state(OperatingState::Stopped);
    }

    /// 停止とフォルト共通の出力停止
    ///
    /// 運転状態・フォルト状態は変更しない（フォルト時の状態を後から確認できるように）。
    fn stop(&mut self) {
        // 停止→アライメントの遷移条件なので指令速度もクリア
        self.commanded_speed = 0;
        self.duty_command = 0;
        self.driver.set_duty_cycle(0);
        self.driver.all_off();
    }

    /// UIからの速度指令 [PWMカウント]
    ///
    /// 停止しきい値以下なら `reset` し、次回は再度アライメントから始動します。
    /// 停止中は始動しきい値を超える指令だけを受け付け、回転中は始動しきい値未満への
    /// 減速も許可します。
    pub fn set_commanded_speed(&mut self, speed: u16) {
        if speed > self.config.shutoff_duty {
            if speed > self.config.startup_duty || self.commanded_speed != 0 {
                self.commanded_speed = speed;
            }
        } else {
            if self.commanded_speed != 0 {
                info!("speed {} at or below shutoff, stopping", speed);
            }
            self.reset();
        }
    }

    /// 指令速度 [PWMカウント]
    pub fn commanded_speed(&self) -> u16 {
        self.commanded_speed
    }

    /// 制御周期処理
    ///
    /// # 戻り値
    /// 相ドライバーに渡したデューティ指令
    pub fn tick(&mut self) -> u16 {
        let duty = if self.faults.is_faulted() {
            self.tick_faulted()
        } else {
            if self.fault_reported {
                info!("fault cleared, resuming in {:?}", self.state);
                self.fault_reported = false;
            }
            match self.state {
                OperatingState::Stopped => self.tick_stopped(),
                OperatingState::Align => self.tick_align(),
                OperatingState::RampUp => self.tick_ramp_up(),
                OperatingState::OpenLoop => self.tick_open_loop(),
                OperatingState::ClosedLoop => self.tick_closed_loop(),
                OperatingState::Manual => self.commanded_speed,
            }
        };

        // 相ドライバーは次の転流タイミングで反映する
        self.duty_command = duty;
        self.driver.set_duty_cycle(duty);
        duty
    }

    fn tick_faulted(&mut self) -> u16 {
        if !self.fault_reported {
            error!(
                "fault {:#x} in {:?}, outputs off",
                self.faults.status(),
                self.state
            );
            self.fault_reported = true;
        }
        self.stop();
        0
    }

    fn tick_stopped(&mut self) -> u16 {
        if self.commanded_speed > 0 {
            self.align_timer = self.config.align_frames;
            self.set_commutation_period(self.config.ramp_start_period);
            self.set_operating_state(OperatingState::Align);
        }
        self.commanded_speed
    }

    fn tick_align(&mut self) -> u16 {
        if self.align_timer > 0 {
            self.align_timer -= 1;
            return self.config.align_duty;
        }

        if self.config.align_hold {
            // 診断用: アライメントに留まり出力だけ止める
            return 0;
        }

        self.set_operating_state(OperatingState::RampUp);
        self.commanded_speed
    }

    fn tick_ramp_up(&mut self) -> u16 {
        let target = self.timing.lookup(self.config.startup_duty);

        // ランプアップ中は転流周期を短くする方向にだけ動かす
        self.set_commutation_period(self.period.saturating_sub(RAMP_UNIT));

        if self.period > target {
            self.set_operating_state(OperatingState::OpenLoop);
        }
        self.config.rampup_duty
    }

    fn tick_open_loop(&mut self) -> u16 {
        let target = self.timing.lookup(self.commanded_speed);
        self.set_commutation_period(ramp_step(self.period, target));
        // OpenLoop -> ClosedLoop の遷移条件は未定義（転流タイミングの妥当性判定が必要）
        self.commanded_speed
    }

    fn tick_closed_loop(&mut self) -> u16 {
        self.commanded_speed
    }

    /// 現在の運転状態
    pub fn operating_state(&self) -> OperatingState {
        self.state
    }

    /// 運転状態を設定して公開
    pub fn set_operating_state(&mut self, state: OperatingState) {
        if state != self.state {
            info!("state: {:?} -> {:?}", self.state, state);
        }
        self.state = state;
        self.link.publish_state(state);
    }

    /// 現在の転流周期 [転流クロックカウント]
    pub fn commutation_period(&self) -> u16 {
        self.period
    }

    /// 転流周期を設定して公開（高速側の下限でクランプ）
    pub fn set_commutation_period(&mut self, period: u16) {
        self.period = period.max(self.config.min_period);
        self.link.publish_period(self.period);
    }

    /// 指令速度から見た運転/停止（運転状態とは独立）
    pub fn run_state(&self) -> RunState {
        if self.commanded_speed > self.config.shutoff_duty {
            RunState::Running
        } else {
            RunState::NotRunning
        }
    }

    /// 診断用: 転流周期を1ランプ単位遅くし、手動状態にする
    pub fn timing_step_slower(&mut self) {
        self.set_operating_state(OperatingState::Manual);
        self.set_commutation_period(self.period.saturating_add(RAMP_UNIT));
        debug!("manual timing: period={}", self.period);
    }

    /// 診断用: 転流周期を1ランプ単位速くし、手動状態にする
    pub fn timing_step_faster(&mut self) {
        self.set_operating_state(OperatingState::Manual);
        self.set_commutation_period(self.period.saturating_sub(RAMP_UNIT));
        debug!("manual timing: period={}", self.period);
    }

    /// アライメント残りフレーム数
    pub fn alignment_timer(&self) -> u16 {
        self.align_timer
    }

    /// 最後に相ドライバーへ渡したデューティ指令
    pub fn duty_command(&self) -> u16 {
        self.duty_command
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }
}
