// CAN communication protocol definitions for the six-step controller

use crate::command::Command;
use crate::fmt::*;
use crate::state::{OperatingState, RunState};

/// CAN message IDs
pub mod can_ids {
    /// Emergency stop (any data length)
    pub const EMERGENCY_STOP: u32 = 0x000;

    /// Speed command (u16 PWM counts, 2 bytes)
    pub const SPEED_CMD: u32 = 0x100;

    /// Speed step (u8, 1 byte: 0=down, otherwise up)
    pub const SPEED_STEP: u32 = 0x101;

    /// Start command (no data)
    pub const START_CMD: u32 = 0x102;

    /// Manual timing step (u8, 1 byte: 0=faster, otherwise slower)
    pub const TIMING_STEP: u32 = 0x103;

    /// Controller status (state, run, period, commanded, duty: 8 bytes)
    pub const STATUS: u32 = 0x200;

    /// Fault status (voltage: f32, fault bits: u8, 5 bytes)
    pub const FAULT_STATUS: u32 = 0x201;
}

/// Controller status snapshot sent on `can_ids::STATUS`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorStatus {
    pub state: OperatingState,
    pub run_state: RunState,
    pub commutation_period: u16,
    pub commanded_speed: u16,
    pub duty: u16,
}

impl MotorStatus {
    pub const fn new() -> Self {
        Self {
            state: OperatingState::Stopped,
            run_state: RunState::NotRunning,
            commutation_period: u16::MAX,
            commanded_speed: 0,
            duty: 0,
        }
    }
}

impl Default for MotorStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse speed command from CAN data
///
/// # Arguments
/// * `data` - CAN frame data (should be 2 bytes)
///
/// # Returns
/// * `Some(speed)` in PWM counts if parsing successful
/// * `None` if data length is incorrect
pub fn parse_speed_command(data: &[u8]) -> Option<u16> {
    if data.len() < 2 {
        error!("Speed command: invalid data length {}", data.len());
        return None;
    }

    let speed = u16::from_le_bytes([data[0], data[1]]);
    debug!("Speed command received: {} counts", speed);
    Some(speed)
}

/// Parse a one-byte step direction
///
/// # Returns
/// * `Some(true)` if data[0] != 0
/// * `None` if no data
fn parse_step(name: &str, data: &[u8]) -> Option<bool> {
    if data.is_empty() {
        error!("{}: no data", name);
        return None;
    }
    Some(data[0] != 0)
}

/// Map a received frame to a UI command
///
/// # Arguments
/// * `id` - Raw CAN identifier
/// * `data` - CAN frame data
///
/// # Returns
/// * `Some(command)` for a known id with a valid payload
/// * `None` for unknown ids or short payloads
pub fn parse_command(id: u32, data: &[u8]) -> Option<Command> {
    match id {
        can_ids::EMERGENCY_STOP => {
            info!("EMERGENCY STOP received");
            Some(Command::Stop)
        }
        can_ids::SPEED_CMD => parse_speed_command(data).map(Command::SetSpeed),
        can_ids::SPEED_STEP => parse_step("Speed step", data).map(|up| {
            if up {
                Command::SpeedUp
            } else {
                Command::SpeedDown
            }
        }),
        can_ids::START_CMD => {
            info!("Start command received");
            Some(Command::Start)
        }
        can_ids::TIMING_STEP => parse_step("Timing step", data).map(|slower| {
            if slower {
                Command::TimingSlower
            } else {
                Command::TimingFaster
            }
        }),
        _ => None,
    }
}

/// Encode controller status into CAN data
///
/// # Returns
/// 8-byte array: state u8, run flag u8, period u16, commanded u16, duty u16 (LE)
pub fn encode_status(status: &MotorStatus) -> [u8; 8] {
    let mut data = [0u8; 8];

    data[0] = status.state.as_u8();
    data[1] = (status.run_state == RunState::Running) as u8;
    data[2..4].copy_from_slice(&status.commutation_period.to_le_bytes());
    data[4..6].copy_from_slice(&status.commanded_speed.to_le_bytes());
    data[6..8].copy_from_slice(&status.duty.to_le_bytes());

    data
}

/// Decode controller status from CAN data
///
/// # Returns
/// * `Some(MotorStatus)` if parsing successful
/// * `None` if data length is incorrect
pub fn decode_status(data: &[u8]) -> Option<MotorStatus> {
    if data.len() < 8 {
        return None;
    }

    Some(MotorStatus {
        state: OperatingState::from_u8(data[0]),
        run_state: if data[1] != 0 {
            RunState::Running
        } else {
            RunState::NotRunning
        },
        commutation_period: u16::from_le_bytes([data[2], data[3]]),
        commanded_speed: u16::from_le_bytes([data[4], data[5]]),
        duty: u16::from_le_bytes([data[6], data[7]]),
    })
}

/// Encode fault status into CAN data
///
/// # Arguments
/// * `voltage` - DC bus voltage in volts
/// * `faults` - Fault register bits
///
/// # Returns
/// 5-byte array containing encoded fault status
pub fn encode_fault_status(voltage: f32, faults: u8) -> [u8; 5] {
    let mut data = [0u8; 5];
    data[0..4].copy_from_slice(&voltage.to_le_bytes());
    data[4] = faults;
    data
}

/// Decode fault status from CAN data
///
/// # Returns
/// * `Some((voltage, faults))` if parsing successful
/// * `None` if data length is incorrect
pub fn decode_fault_status(data: &[u8]) -> Option<(f32, u8)> {
    if data.len() < 5 {
        return None;
    }

    let voltage = f32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    Some((voltage, data[4]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_speed_command() {
        let data = 120u16.to_le_bytes();
        assert_eq!(parse_speed_command(&data), Some(120));
        assert_eq!(
            parse_command(can_ids::SPEED_CMD, &data),
            Some(Command::SetSpeed(120))
        );
    }

    #[test]
    fn test_short_payloads_rejected() {
        assert_eq!(parse_command(can_ids::SPEED_CMD, &[1]), None);
        assert_eq!(parse_command(can_ids::SPEED_STEP, &[]), None);
        assert_eq!(parse_command(can_ids::TIMING_STEP, &[]), None);
    }

    #[test]
    fn test_step_directions() {
        assert_eq!(parse_command(can_ids::SPEED_STEP, &[1]), Some(Command::SpeedUp));
        assert_eq!(parse_command(can_ids::SPEED_STEP, &[0]), Some(Command::SpeedDown));
        assert_eq!(
            parse_command(can_ids::TIMING_STEP, &[0]),
            Some(Command::TimingFaster)
        );
        assert_eq!(
            parse_command(can_ids::TIMING_STEP, &[7]),
            Some(Command::TimingSlower)
        );
    }

    #[test]
    fn test_stop_and_start_ignore_payload() {
        assert_eq!(parse_command(can_ids::EMERGENCY_STOP, &[]), Some(Command::Stop));
        assert_eq!(
            parse_command(can_ids::EMERGENCY_STOP, &[1, 2, 3]),
            Some(Command::Stop)
        );
        assert_eq!(parse_command(can_ids::START_CMD, &[]), Some(Command::Start));
    }

    #[test]
    fn test_unknown_id_ignored() {
        assert_eq!(parse_command(0x7FF, &[1, 2]), None);
        assert_eq!(parse_command(can_ids::STATUS, &[0; 8]), None);
    }

    #[test]
    fn test_status_layout() {
        let status = MotorStatus {
            state: OperatingState::OpenLoop,
            run_state: RunState::Running,
            commutation_period: 0x1234,
            commanded_speed: 80,
            duty: 0x0102,
        };
        let encoded = encode_status(&status);
        assert_eq!(encoded, [3, 1, 0x34, 0x12, 80, 0, 0x02, 0x01]);
        assert_eq!(decode_status(&encoded), Some(status));
    }

    #[test]
    fn test_fault_status_layout() {
        let encoded = encode_fault_status(12.5, 0x01);
        assert_eq!(encoded[0..4], 12.5f32.to_le_bytes());
        assert_eq!(encoded[4], 0x01);
        assert_eq!(decode_fault_status(&encoded), Some((12.5, 0x01)));
        assert_eq!(decode_fault_status(&encoded[..4]), None);
    }
}
