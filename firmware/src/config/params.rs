//! ハードウェア設定パラメータ

/// PWM設定
pub mod pwm {
    use embassy_stm32::time::Hertz;

    /// PWM周波数（20kHz）
    pub const DEFAULT_FREQUENCY: Hertz = Hertz(20_000);

    /// デッドタイム
    pub const DEFAULT_DEAD_TIME: u16 = 1;
}

/// ステータスLEDの点滅周期 [ms]
pub mod led {
    /// 停止中（ゆっくり点滅）
    pub const STOPPED_PERIOD_MS: u64 = 1_000;

    /// アライメント・ランプアップ中
    pub const STARTING_PERIOD_MS: u64 = 250;

    /// オープンループ・クローズドループ中
    pub const RUNNING_PERIOD_MS: u64 = 100;

    /// 手動タイミング（診断）中
    pub const MANUAL_PERIOD_MS: u64 = 50;
}
