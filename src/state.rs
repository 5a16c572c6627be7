//! 運転状態と、制御タスク/転流タスク間で共有する公開状態
//!
//! 運転状態と転流周期の書き込みは制御タスクだけが行い、
//! 転流タスクは [`CommutationLink`] 経由で読むだけです。

use core::sync::atomic::{AtomicU16, AtomicU8, Ordering};

use crate::config::MAX_COMMUTATION_PERIOD;

/// 運転状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum OperatingState {
    /// 診断用の手動転流タイミング調整
    Manual = 0,
    /// ロータをセクター0に固定
    Align = 1,
    /// 強制転流で加速
    RampUp = 2,
    /// テーブル駆動のオープンループ運転
    OpenLoop = 3,
    /// クローズドループ運転（予約）
    ClosedLoop = 4,
    /// 停止
    Stopped = 5,
}

impl OperatingState {
    /// 生値から復元（範囲外は停止扱い）
    pub const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Manual,
            1 => Self::Align,
            2 => Self::RampUp,
            3 => Self::OpenLoop,
            4 => Self::ClosedLoop,
            _ => Self::Stopped,
        }
    }

    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// 転流タスクがセクターを進める状態か
    pub const fn is_commutating(self) -> bool {
        matches!(self, Self::RampUp | Self::OpenLoop | Self::ClosedLoop)
    }
}

/// 指令速度から見た運転/停止
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunState {
    Running,
    NotRunning,
}

/// 制御タスクが公開する運転状態と転流周期のスナップショット
///
/// 書き込みは制御タスク（[`crate::MotorController`]）のみ。
/// 転流タスクと転流クロックは読むだけで、ロック無しで参照できます。
pub struct CommutationLink {
    state: AtomicU8,
    period: AtomicU16,
}

impl CommutationLink {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(OperatingState::Stopped as u8),
            period: AtomicU16::new(MAX_COMMUTATION_PERIOD),
        }
    }

    /// 現在の運転状態
    pub fn operating_state(&self) -> OperatingState {
        OperatingState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// 現在の転流周期 [転流クロックカウント]
    pub fn commutation_period(&self) -> u16 {
        self.period.load(Ordering::Acquire)
    }

    pub(crate) fn publish_state(&self, state: OperatingState) {
        self.state.store(state as u8, Ordering::Release);
    }

    pub(crate) fn publish_period(&self, period: u16) {
        self.period.store(period, Ordering::Release);
    }
}

impl Default for CommutationLink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_round_trip_raw() {
        for state in [
            OperatingState::Manual,
            OperatingState::Align,
            OperatingState::RampUp,
            OperatingState::OpenLoop,
            OperatingState::ClosedLoop,
            OperatingState::Stopped,
        ] {
            assert_eq!(OperatingState::from_u8(state.as_u8()), state);
        }
        assert_eq!(OperatingState::from_u8(200), OperatingState::Stopped);
    }

    #[test]
    fn test_link_starts_stopped_at_max_period() {
        let link = CommutationLink::new();
        assert_eq!(link.operating_state(), OperatingState::Stopped);
        assert_eq!(link.commutation_period(), u16::MAX);
    }

    #[test]
    fn test_commutating_states() {
        assert!(!OperatingState::Align.is_commutating());
        assert!(!OperatingState::Manual.is_commutating());
        assert!(!OperatingState::Stopped.is_commutating());
        assert!(OperatingState::RampUp.is_commutating());
        assert!(OperatingState::OpenLoop.is_commutating());
        assert!(OperatingState::ClosedLoop.is_commutating());
    }
}
