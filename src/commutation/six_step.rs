//! 6ステップ（台形波）転流テーブル
//!
//! 各セクターで1相がPWM、1相がLow固定、1相がフローティングになります。
//! テーブルの並びが回転方向を決めるので、順序を変えないこと。

/// 1相の駆動状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhaseDrive {
    /// フローティング（ハイインピーダンス）
    Float,
    /// High固定
    DrivenHigh,
    /// Low固定
    DrivenLow,
    /// PWM（デューティ = 指令値）
    PwmPositive,
    /// 相補PWM（デューティ = 周期 - 指令値）
    PwmNegative,
}

impl PhaseDrive {
    /// デューティ指令から相のパルス幅を求める
    ///
    /// # 戻り値
    /// * `Some(pulse)` - 駆動する相のパルス幅 [カウント]
    /// * `None` - フローティング
    pub const fn pulse(self, duty: u16, period: u16) -> Option<u16> {
        match self {
            Self::Float => None,
            Self::DrivenHigh => Some(period),
            Self::DrivenLow => Some(0),
            Self::PwmPositive => Some(if duty > period { period } else { duty }),
            Self::PwmNegative => Some(period.saturating_sub(duty)),
        }
    }

    pub const fn is_pwm(self) -> bool {
        matches!(self, Self::PwmPositive | Self::PwmNegative)
    }

    pub const fn is_driven(self) -> bool {
        matches!(self, Self::DrivenHigh | Self::DrivenLow)
    }
}

/// セクター数
pub const SECTOR_COUNT: u8 = 6;

/// 転流セクター (0-5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sector(u8);

impl Sector {
    /// アライメント用のセクター
    pub const ALIGN: Self = Self(0);

    pub const fn new(index: u8) -> Option<Self> {
        if index < SECTOR_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// 次のセクター（電気角 +60°）
    pub const fn next(self) -> Self {
        Self((self.0 + 1) % SECTOR_COUNT)
    }

    pub const fn index(self) -> u8 {
        self.0
    }

    /// このセクターの相駆動パターン (A, B, C)
    pub const fn pattern(self) -> [PhaseDrive; 3] {
        SIX_STEP_TABLE[self.0 as usize]
    }
}

/// 相駆動パターンを各チャネルのパルス幅に変換
///
/// デューティ0では駆動相も含めて全チャネル `None`（全相オフ）。
/// Low固定相だけを有効にして短絡制動にならないようにします。
pub const fn channel_pulses(
    pattern: [PhaseDrive; 3],
    duty: u16,
    period: u16,
) -> [Option<u16>; 3] {
    if duty == 0 {
        return [None; 3];
    }
    [
        pattern[0].pulse(duty, period),
        pattern[1].pulse(duty, period),
        pattern[2].pulse(duty, period),
    ]
}

use PhaseDrive::{DrivenLow as LO, Float as FL, PwmPositive as PWM};

/// 6セクター相駆動テーブル (A, B, C)
pub const SIX_STEP_TABLE: [[PhaseDrive; 3]; SECTOR_COUNT as usize] = [
    // A+, B-, C floating
    [PWM, LO, FL],
    // A+, C-, B floating
    [PWM, FL, LO],
    // B+, C-, A floating
    [FL, PWM, LO],
    // B+, A-, C floating
    [LO, PWM, FL],
    // C+, A-, B floating
    [LO, FL, PWM],
    // C+, B-, A floating
    [FL, LO, PWM],
];
