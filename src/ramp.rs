//! 転流タイミングのランプ制御
//!
//! 制御周期ごとに転流周期を目標値へ1ランプ単位ずつ近づけます。
//! 1ステップで目標を越えないようにクランプします。

use crate::config::RAMP_UNIT;

/// 1ランプ単位で `current` を `target` に近づける
pub fn ramp_step(current: u16, target: u16) -> u16 {
    ramp_step_by(current, target, RAMP_UNIT)
}

/// 任意のステップ幅でのランプ
///
/// # 引数
/// * `current` - 現在の転流周期
/// * `target` - 目標転流周期
/// * `unit` - 1回あたりの最大変化量
pub fn ramp_step_by(current: u16, target: u16, unit: u16) -> u16 {
    if current > target {
        current.saturating_sub(unit).max(target)
    } else if current < target {
        current.saturating_add(unit).min(target)
    } else {
        current
    }
}
