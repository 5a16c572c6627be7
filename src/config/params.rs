//! モーター制御とタイミングの設定パラメータ
//!
//! 12V前後・1100KVクラスのモーターで実験的に決めた値です。
//! 別のモーター/電圧で使う場合はここを再調整します（制御ロジックは触らない）。

/// PWMフルスケール周期 [カウント]（デューティ指令の分母）
pub const PWM_PERIOD_COUNTS: u16 = 250;

/// デューティ比 [0.1%単位] をPWMカウントに変換
pub const fn pulse_counts(duty_permille: u32) -> u16 {
    (duty_permille * PWM_PERIOD_COUNTS as u32 / 1000) as u16
}

/// アライメント中のデューティ（25.0%）
pub const ALIGN_DUTY: u16 = pulse_counts(250);

/// ランプアップ中のデューティ（15.0%）
pub const RAMPUP_DUTY: u16 = pulse_counts(150);

/// 始動しきい値（14.4%）。停止状態からはこれを超える指令でのみ始動する
pub const STARTUP_DUTY: u16 = pulse_counts(144);

/// 停止しきい値（7.2%）。これ以下では脱調するので停止扱い
pub const SHUTOFF_DUTY: u16 = pulse_counts(72);

/// 制御周期 [μs]（1kHz）
pub const CONTROL_PERIOD_US: u64 = 1_000;

/// 制御レート [Hz]
pub const CONTROL_RATE_HZ: u32 = (1_000_000 / CONTROL_PERIOD_US) as u32;

/// 制御レート係数（1kHzで4）
pub const CTRL_RATE_M: u16 = (4_000 / CONTROL_RATE_HZ) as u16;

/// 転流クロックのスケール係数
pub const CTIME_SCALAR: u16 = 1;

/// 転流クロック1カウントの時間 [μs]
pub const COMMUTATION_TICK_US: u64 = 1;

/// 1ランプ単位 = 1.5 × 制御レート係数 × クロック係数
/// 制御レートを変えてもランプ時間が変わらないよう制御レート係数を掛ける
pub const RAMP_UNIT: u16 = 3 * CTRL_RATE_M * CTIME_SCALAR / 2;

/// ランプ開始時の転流周期（$1600、12V時の定常オープンループ周波数の推定値）
pub const RAMP_START_PERIOD: u16 = 0x1600 * CTIME_SCALAR;

/// アライメント時間 [フレーム]（1ms/フレーム）
pub const ALIGN_FRAMES: u16 = 200;

/// 転流周期の下限（高速側の限界、これ以上速くすると同期が外れて復帰できない）
pub const MIN_COMMUTATION_PERIOD: u16 = 0x0068 * CTIME_SCALAR;

/// 転流周期の上限。転流クロックは止めずに、転流処理だけを実質無効化する
pub const MAX_COMMUTATION_PERIOD: u16 = u16::MAX;

/// UI速度入力の1ステップ [カウント]
pub const SPEED_INPUT_STEP: u16 = 1;

/// UI処理周期 [ms]（約60Hz）
pub const UI_PERIOD_MS: u64 = 16;

/// 電圧監視パラメータ
pub mod voltage {
    /// 分圧抵抗の上側 [Ω]
    pub const R_UPPER: f32 = 33_000.0;

    /// 分圧抵抗の下側 [Ω]
    pub const R_LOWER: f32 = 10_000.0;

    /// ADC分解能（12ビット）
    pub const ADC_MAX: u16 = 4096;

    /// ADC基準電圧 [V]
    pub const VREF: f32 = 3.3;

    /// ローパスフィルタ係数
    pub const FILTER_ALPHA: f32 = 0.1;

    /// 過電圧しきい値 [V]
    pub const OVERVOLTAGE: f32 = 16.8;

    /// 低電圧しきい値 [V]（負荷で脱調しない程度に低め）
    pub const UNDERVOLTAGE: f32 = 9.0;

    /// 監視周期 [ms]
    pub const PERIOD_MS: u64 = 100;
}

/// CAN設定
pub mod can {
    /// CANビットレート（250kbps）
    pub const DEFAULT_BITRATE: u32 = 250_000;

    /// ステータス送信周期 [ms]
    pub const STATUS_PERIOD_MS: u64 = 100;
}
