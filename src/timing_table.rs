//! オープンループ転流周期テーブル
//!
//! デューティ [PWMカウント] → 転流周期 [転流クロックカウント] の折れ線テーブル。
//! 点の間は直線補間し、範囲外は端の値で飽和します。

use crate::driver::OpenLoopTiming;

/// 12V・1100KVクラスで実測した点（デューティ昇順、周期は単調非増加）
const DEFAULT_POINTS: [(u16, u16); 7] = [
    (0, 0x1600),
    (36, 0x0E00),
    (62, 0x0900),
    (100, 0x0600),
    (150, 0x0400),
    (200, 0x0300),
    (250, 0x0280),
];

#[derive(Debug, Clone, Copy)]
pub struct OpenLoopTable {
    points: &'static [(u16, u16)],
}

impl OpenLoopTable {
    pub const DEFAULT: Self = Self {
        points: &DEFAULT_POINTS,
    };

    /// 任意の点列からテーブルを作成
    ///
    /// 点列が空、デューティが昇順でない、または周期が増加する場合は `None`。
    pub const fn new(points: &'static [(u16, u16)]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut i = 1;
        while i < points.len() {
            if points[i].0 <= points[i - 1].0 || points[i].1 > points[i - 1].1 {
                return None;
            }
            i += 1;
        }
        Some(Self { points })
    }
}

impl Default for OpenLoopTable {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl OpenLoopTiming for OpenLoopTable {
    fn lookup(&self, duty: u16) -> u16 {
        let points = self.points;
        let (first_duty, first_period) = points[0];
        if duty <= first_duty {
            return first_period;
        }

        for pair in points.windows(2) {
            let (d0, p0) = pair[0];
            let (d1, p1) = pair[1];
            if duty <= d1 {
                // p0 >= p1 なので減算側で補間
                let span = (p0 - p1) as u32;
                let offset = span * (duty - d0) as u32 / (d1 - d0) as u32;
                return p0 - offset as u16;
            }
        }

        points[points.len() - 1].1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RAMP_START_PERIOD, STARTUP_DUTY};

    #[test]
    fn test_breakpoints_exact() {
        let table = OpenLoopTable::DEFAULT;
        for (duty, period) in DEFAULT_POINTS {
            assert_eq!(table.lookup(duty), period);
        }
    }

    #[test]
    fn test_interpolation_midpoint() {
        let table = OpenLoopTable::DEFAULT;
        // (100, 0x600) - (150, 0x400) の中点
        assert_eq!(table.lookup(125), 0x0500);
    }

    #[test]
    fn test_saturates_outside_table() {
        let table = OpenLoopTable::DEFAULT;
        assert_eq!(table.lookup(250), 0x0280);
        assert_eq!(table.lookup(u16::MAX), 0x0280);
    }

    #[test]
    fn test_monotonic_non_increasing() {
        let table = OpenLoopTable::DEFAULT;
        let mut prev = table.lookup(0);
        for duty in 1..=400u16 {
            let period = table.lookup(duty);
            assert!(period <= prev, "duty {} period {} > {}", duty, period, prev);
            prev = period;
        }
    }

    #[test]
    fn test_startup_target_below_ramp_start() {
        // ランプ開始周期は始動デューティの目標より長い
        assert!(OpenLoopTable::DEFAULT.lookup(STARTUP_DUTY) < RAMP_START_PERIOD);
    }

    #[test]
    fn test_rejects_invalid_points() {
        static EMPTY: [(u16, u16); 0] = [];
        static UNSORTED: [(u16, u16); 2] = [(10, 100), (5, 50)];
        static RISING: [(u16, u16); 2] = [(0, 100), (10, 200)];
        static SINGLE: [(u16, u16); 1] = [(0, 100)];

        assert!(OpenLoopTable::new(&EMPTY).is_none());
        assert!(OpenLoopTable::new(&UNSORTED).is_none());
        assert!(OpenLoopTable::new(&RISING).is_none());

        let single = OpenLoopTable::new(&SINGLE).unwrap();
        assert_eq!(single.lookup(0), 100);
        assert_eq!(single.lookup(500), 100);
    }
}
