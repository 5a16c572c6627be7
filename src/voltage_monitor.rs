//! DC Bus Voltage Monitoring
//!
//! 分圧抵抗経由のADC値からDCバス電圧を求め、過電圧/低電圧を判定します。

use crate::config::voltage;
use crate::fmt::*;

/// 電圧監視パラメータ
#[derive(Debug, Clone, Copy)]
pub struct VoltageMonitorConfig {
    /// 分圧抵抗の上側 [Ω]
    pub r_upper: f32,
    /// 分圧抵抗の下側 [Ω]
    pub r_lower: f32,
    /// ADC分解能
    pub adc_max: u16,
    /// ADC基準電圧 [V]
    pub vref: f32,
    /// ローパスフィルタ係数（0.0-1.0、大きいほど応答速度が速い）
    pub filter_alpha: f32,
    /// 過電圧しきい値 [V]
    pub overvoltage_threshold: f32,
    /// 低電圧しきい値 [V]
    pub undervoltage_threshold: f32,
}

impl Default for VoltageMonitorConfig {
    fn default() -> Self {
        Self {
            // V_bus = V_adc * (R_upper + R_lower) / R_lower
            r_upper: voltage::R_UPPER,
            r_lower: voltage::R_LOWER,
            adc_max: voltage::ADC_MAX,
            vref: voltage::VREF,
            filter_alpha: voltage::FILTER_ALPHA,
            overvoltage_threshold: voltage::OVERVOLTAGE,
            undervoltage_threshold: voltage::UNDERVOLTAGE,
        }
    }
}

/// 電圧監視状態
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VoltageMonitorState {
    /// 現在の電圧 [V]（フィルタ済み）
    pub voltage: f32,
    pub overvoltage: bool,
    pub undervoltage: bool,
}

impl VoltageMonitorState {
    pub const fn new() -> Self {
        Self {
            voltage: 0.0,
            overvoltage: false,
            undervoltage: false,
        }
    }

    /// 電圧が正常範囲内かチェック
    pub fn is_voltage_ok(&self) -> bool {
        !self.overvoltage && !self.undervoltage
    }
}

impl Default for VoltageMonitorState {
    fn default() -> Self {
        Self::new()
    }
}

pub struct VoltageMonitor {
    config: VoltageMonitorConfig,
    state: VoltageMonitorState,
    /// 異常ログの連続出力を抑えるため前回の判定を保持
    was_ok: bool,
}

impl VoltageMonitor {
    pub fn new(config: VoltageMonitorConfig) -> Self {
        Self {
            config,
            state: VoltageMonitorState::new(),
            was_ok: true,
        }
    }

    /// ADC生値から実電圧を計算 [V]
    fn adc_to_voltage(&self, adc_raw: u16) -> f32 {
        let v_adc = (adc_raw as f32 / self.config.adc_max as f32) * self.config.vref;
        let divider_ratio = (self.config.r_upper + self.config.r_lower) / self.config.r_lower;
        v_adc * divider_ratio
    }

    fn check_thresholds(&mut self) {
        self.state.overvoltage = self.state.voltage > self.config.overvoltage_threshold;
        self.state.undervoltage = self.state.voltage < self.config.undervoltage_threshold;
    }

    /// 電圧を更新し、過電圧/低電圧をチェック
    ///
    /// # 引数
    /// * `adc_raw` - ADC生値
    pub fn update(&mut self, adc_raw: u16) -> VoltageMonitorState {
        let voltage_raw = self.adc_to_voltage(adc_raw);

        // filtered = alpha * raw + (1 - alpha) * filtered_prev
        self.state.voltage = self.config.filter_alpha * voltage_raw
            + (1.0 - self.config.filter_alpha) * self.state.voltage;
        self.check_thresholds();

        let ok = self.state.is_voltage_ok();
        if self.was_ok && !ok {
            if self.state.overvoltage {
                error!(
                    "OVERVOLTAGE detected! Bus voltage: {}V (threshold: {}V)",
                    self.state.voltage, self.config.overvoltage_threshold
                );
            } else {
                error!(
                    "UNDERVOLTAGE detected! Bus voltage: {}V (threshold: {}V)",
                    self.state.voltage, self.config.undervoltage_threshold
                );
            }
        } else if !self.was_ok && ok {
            info!("Bus voltage back in range: {}V", self.state.voltage);
        }
        self.was_ok = ok;

        self.state
    }

    pub fn state(&self) -> VoltageMonitorState {
        self.state
    }

    /// フィルタを初期電圧で初期化（起動時の誤検出防止用）
    pub fn initialize_with_adc(&mut self, adc_raw: u16) {
        self.state.voltage = self.adc_to_voltage(adc_raw);
        self.check_thresholds();
        self.was_ok = self.state.is_voltage_ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 指定電圧になるADC値
    fn adc_for(volts: f32) -> u16 {
        let c = VoltageMonitorConfig::default();
        let ratio = (c.r_upper + c.r_lower) / c.r_lower;
        (volts / ratio / c.vref * c.adc_max as f32) as u16
    }

    #[test]
    fn test_adc_conversion() {
        let monitor = VoltageMonitor::new(VoltageMonitorConfig::default());
        let v = monitor.adc_to_voltage(adc_for(12.0));
        assert!((v - 12.0).abs() < 0.05, "v = {}", v);
    }

    #[test]
    fn test_initialize_avoids_startup_undervoltage() {
        let mut monitor = VoltageMonitor::new(VoltageMonitorConfig::default());
        monitor.initialize_with_adc(adc_for(12.0));
        let state = monitor.update(adc_for(12.0));
        assert!(state.is_voltage_ok());
        assert!((state.voltage - 12.0).abs() < 0.1);
    }

    #[test]
    fn test_filter_converges_to_undervoltage() {
        let mut monitor = VoltageMonitor::new(VoltageMonitorConfig::default());
        monitor.initialize_with_adc(adc_for(12.0));

        // 1サンプルではフィルタで抑えられる
        let state = monitor.update(adc_for(5.0));
        assert!(!state.undervoltage);

        let mut state = state;
        for _ in 0..100 {
            state = monitor.update(adc_for(5.0));
        }
        assert!(state.undervoltage);
        assert!(!state.is_voltage_ok());
    }

    #[test]
    fn test_overvoltage_on_init() {
        let mut monitor = VoltageMonitor::new(VoltageMonitorConfig::default());
        monitor.initialize_with_adc(adc_for(20.0));
        assert!(monitor.state().overvoltage);
    }

    #[test]
    fn test_uninitialized_reads_zero() {
        let monitor = VoltageMonitor::new(VoltageMonitorConfig::default());
        assert_eq!(monitor.state().voltage, 0.0);
    }
}
