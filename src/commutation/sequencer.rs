//! 転流シーケンサー
//!
//! 転流クロック（制御周期とは非同期）から1イベントごとに呼ばれ、
//! 公開された運転状態だけを見てセクターを決めます。
//! セクターを書き換えるのはこのシーケンサーだけです。

use crate::commutation::Sector;
use crate::driver::PhaseDriver;
use crate::fmt::*;
use crate::state::{CommutationLink, OperatingState};

pub struct CommutationSequencer<'a, D: PhaseDriver> {
    link: &'a CommutationLink,
    driver: D,
    sector: Sector,
}

impl<'a, D: PhaseDriver> CommutationSequencer<'a, D> {
    /// # 引数
    /// * `link` - 制御タスクが公開する運転状態
    /// * `driver` - 相出力ドライバー
    pub fn new(link: &'a CommutationLink, driver: D) -> Self {
        Self {
            link,
            driver,
            sector: Sector::ALIGN,
        }
    }

    /// 転流イベント処理
    ///
    /// # 戻り値
    /// 出力したセクター（出力を変更しなかった場合は `None`）
    pub fn on_commutation(&mut self) -> Option<Sector> {
        match self.link.operating_state() {
            // アライメント中はセクター0に固定
            OperatingState::Align => self.sector = Sector::ALIGN,
            state if state.is_commutating() => self.sector = self.sector.next(),
            _ => return None,
        }

        trace!("commutate: sector={}", self.sector.index());
        self.driver.set_phase_outputs(self.sector.pattern());
        Some(self.sector)
    }

    /// 現在のセクター
    pub fn sector(&self) -> Sector {
        self.sector
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commutation::{PhaseDrive, SIX_STEP_TABLE};

    #[derive(Default)]
    struct RecordingDriver {
        outputs: Vec<[PhaseDrive; 3]>,
    }

    impl PhaseDriver for RecordingDriver {
        fn set_phase_outputs(&mut self, outputs: [PhaseDrive; 3]) {
            self.outputs.push(outputs);
        }

        fn set_duty_cycle(&mut self, _duty: u16) {}

        fn all_off(&mut self) {}
    }

    #[test]
    fn test_align_holds_sector_zero() {
        let link = CommutationLink::new();
        link.publish_state(OperatingState::Align);
        let mut seq = CommutationSequencer::new(&link, RecordingDriver::default());

        for _ in 0..20 {
            assert_eq!(seq.on_commutation(), Some(Sector::ALIGN));
        }
        assert_eq!(seq.driver().outputs.len(), 20);
        assert!(seq.driver().outputs.iter().all(|o| *o == SIX_STEP_TABLE[0]));
    }

    #[test]
    fn test_align_resets_sector_after_running() {
        let link = CommutationLink::new();
        link.publish_state(OperatingState::OpenLoop);
        let mut seq = CommutationSequencer::new(&link, RecordingDriver::default());
        seq.on_commutation();
        seq.on_commutation();
        assert_eq!(seq.sector().index(), 2);

        link.publish_state(OperatingState::Align);
        seq.on_commutation();
        assert_eq!(seq.sector(), Sector::ALIGN);
    }

    #[test]
    fn test_running_states_advance_one_sector_per_event() {
        for state in [
            OperatingState::RampUp,
            OperatingState::OpenLoop,
            OperatingState::ClosedLoop,
        ] {
            let link = CommutationLink::new();
            link.publish_state(state);
            let mut seq = CommutationSequencer::new(&link, RecordingDriver::default());

            for i in 1..=12usize {
                let sector = seq.on_commutation().unwrap();
                assert_eq!(sector.index() as usize, i % 6);
            }
            let outputs = &seq.driver().outputs;
            for (i, out) in outputs.iter().enumerate() {
                assert_eq!(*out, SIX_STEP_TABLE[(i + 1) % 6]);
            }
        }
    }

    #[test]
    fn test_stopped_and_manual_leave_outputs_alone() {
        for state in [OperatingState::Stopped, OperatingState::Manual] {
            let link = CommutationLink::new();
            link.publish_state(OperatingState::RampUp);
            let mut seq = CommutationSequencer::new(&link, RecordingDriver::default());
            seq.on_commutation();

            link.publish_state(state);
            for _ in 0..5 {
                assert_eq!(seq.on_commutation(), None);
            }
            assert_eq!(seq.sector().index(), 1);
            assert_eq!(seq.driver().outputs.len(), 1);
        }
    }
}
