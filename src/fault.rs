//! フォルト管理
//!
//! フォルト要因ごとのビットをアトミックに保持します。
//! 一度立ったビットは `clear`（コントローラーの `reset`）まで保持されます。

use core::sync::atomic::{AtomicU8, Ordering};

use crate::driver::FaultMonitor;
use crate::fmt::*;
use crate::state::RunState;
use crate::voltage_monitor::VoltageMonitorState;

/// フォルト要因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Fault {
    /// DCバス電圧異常（過電圧・低電圧）
    Voltage = 0x01,
}

impl Fault {
    pub const fn bit(self) -> u8 {
        self as u8
    }
}

pub struct FaultRegister {
    bits: AtomicU8,
}

impl FaultRegister {
    pub const fn new() -> Self {
        Self {
            bits: AtomicU8::new(0),
        }
    }

    /// フォルト要因を更新
    ///
    /// # 引数
    /// * `fault` - フォルト要因
    /// * `asserted` - 異常ならtrue（falseでは既存のビットを落とさない）
    pub fn update(&self, fault: Fault, asserted: bool) {
        if asserted {
            let prev = self.bits.fetch_or(fault.bit(), Ordering::AcqRel);
            if prev & fault.bit() == 0 {
                error!("fault asserted: {:?}", fault);
            }
        }
    }

    /// フォルトビット（0で正常）
    pub fn status(&self) -> u8 {
        self.bits.load(Ordering::Acquire)
    }

    pub fn is_set(&self, fault: Fault) -> bool {
        self.status() & fault.bit() != 0
    }

    pub fn clear(&self) {
        if self.bits.swap(0, Ordering::AcqRel) != 0 {
            info!("faults cleared");
        }
    }
}

impl Default for FaultRegister {
    fn default() -> Self {
        Self::new()
    }
}

impl FaultMonitor for &FaultRegister {
    fn status(&self) -> u8 {
        FaultRegister::status(self)
    }

    fn clear(&mut self) {
        FaultRegister::clear(self)
    }
}

/// 電圧監視結果をフォルトに反映
///
/// 運転中で、かつ電圧が読めている（0より大きい）ときだけ判定します。
/// 停止中や起動直後のADC未確定状態では何もしません。
pub fn supervise_voltage(run_state: RunState, voltage: &VoltageMonitorState, faults: &FaultRegister) {
    if run_state == RunState::Running && voltage.voltage > 0.0 {
        faults.update(Fault::Voltage, !voltage.is_voltage_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voltage(v: f32, ok: bool) -> VoltageMonitorState {
        VoltageMonitorState {
            voltage: v,
            overvoltage: false,
            undervoltage: !ok,
        }
    }

    #[test]
    fn test_fault_latches_until_clear() {
        let faults = FaultRegister::new();
        assert_eq!(faults.status(), 0);

        faults.update(Fault::Voltage, true);
        assert!(faults.is_set(Fault::Voltage));

        faults.update(Fault::Voltage, false);
        assert_eq!(faults.status(), Fault::Voltage.bit());

        faults.clear();
        assert_eq!(faults.status(), 0);
    }

    #[test]
    fn test_monitor_trait_on_shared_ref() {
        let faults = FaultRegister::new();
        let mut monitor = &faults;
        faults.update(Fault::Voltage, true);
        assert!(FaultMonitor::is_faulted(&monitor));
        FaultMonitor::clear(&mut monitor);
        assert!(!faults.is_set(Fault::Voltage));
    }

    #[test]
    fn test_supervision_only_while_running() {
        let faults = FaultRegister::new();

        supervise_voltage(RunState::NotRunning, &voltage(5.0, false), &faults);
        assert_eq!(faults.status(), 0);

        // 電圧未確定（0V）は無視
        supervise_voltage(RunState::Running, &voltage(0.0, false), &faults);
        assert_eq!(faults.status(), 0);

        supervise_voltage(RunState::Running, &voltage(12.0, true), &faults);
        assert_eq!(faults.status(), 0);

        supervise_voltage(RunState::Running, &voltage(5.0, false), &faults);
        assert!(faults.is_set(Fault::Voltage));
    }

    #[test]
    fn test_overvoltage_counts() {
        let faults = FaultRegister::new();
        let state = VoltageMonitorState {
            voltage: 20.0,
            overvoltage: true,
            undervoltage: false,
        };
        supervise_voltage(RunState::Running, &state, &faults);
        assert!(faults.is_set(Fault::Voltage));
    }
}
