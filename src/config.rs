//! Configuration module
//!
//! コンパイル時定数（params）と、コントローラーに渡す実行時設定を提供します。

pub mod params;

pub use params::*;

/// 状態機械の実行時設定
///
/// デフォルト値は [`params`] の定数です。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlConfig {
    /// アライメント中のデューティ [カウント]
    pub align_duty: u16,
    /// ランプアップ中のデューティ [カウント]
    pub rampup_duty: u16,
    /// 始動しきい値 [カウント]
    pub startup_duty: u16,
    /// 停止しきい値 [カウント]
    pub shutoff_duty: u16,
    /// アライメント時間 [フレーム]
    pub align_frames: u16,
    /// ランプ開始時の転流周期
    pub ramp_start_period: u16,
    /// 転流周期の下限
    pub min_period: u16,
    /// 診断用: アライメント終了後もアライメントに留まり出力を0にする
    pub align_hold: bool,
    /// 診断用: UIからの転流周期の手動ステップを許可
    pub manual_timing: bool,
}

impl ControlConfig {
    pub const fn new() -> Self {
        Self {
            align_duty: ALIGN_DUTY,
            rampup_duty: RAMPUP_DUTY,
            startup_duty: STARTUP_DUTY,
            shutoff_duty: SHUTOFF_DUTY,
            align_frames: ALIGN_FRAMES,
            ramp_start_period: RAMP_START_PERIOD,
            min_period: MIN_COMMUTATION_PERIOD,
            align_hold: false,
            manual_timing: false,
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self::new()
    }
}
