//! 6ステップ転流
//!
//! - `six_step`: セクターと相駆動テーブル
//! - `sequencer`: 転流イベントごとにセクターを進める

pub mod sequencer;
pub mod six_step;

pub use sequencer::CommutationSequencer;
pub use six_step::{channel_pulses, PhaseDrive, Sector, SECTOR_COUNT, SIX_STEP_TABLE};
