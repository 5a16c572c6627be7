//! モータードライバー抽象化レイヤー
//!
//! 制御コアが外部に依存する3つの相手（相出力、フォルト監視、オープンループ周期テーブル）を
//! トレイトとして定義します。実ハードウェアの実装はファームウェア側にあります。

use crate::commutation::PhaseDrive;

/// 3相の出力ドライバー
pub trait PhaseDriver {
    /// 各相（A, B, C）の駆動状態を設定
    fn set_phase_outputs(&mut self, outputs: [PhaseDrive; 3]);

    /// デューティ指令を設定 [カウント、フルスケールは `PWM_PERIOD_COUNTS`]
    ///
    /// 反映は次の転流タイミング（`set_phase_outputs`）で行われます。
    fn set_duty_cycle(&mut self, duty: u16);

    /// 全相を即座に停止（フローティング）
    fn all_off(&mut self);
}

/// フォルト監視
pub trait FaultMonitor {
    /// フォルト状態（0以外でフォルト）
    fn status(&self) -> u8;

    /// フォルトをクリア
    fn clear(&mut self);

    fn is_faulted(&self) -> bool {
        self.status() != 0
    }
}

/// オープンループ転流周期テーブル
pub trait OpenLoopTiming {
    /// デューティ [カウント] から目標転流周期を引く（デューティに対して単調非増加）
    fn lookup(&self, duty: u16) -> u16;
}
