//! タスク間で共有するオブジェクトのセル
//!
//! クリティカルセクション（割り込み禁止）内でだけ中身に触れます。
//! 制御タスクと転流タスクのように、別の優先度で動くコンテキスト間で使います。

use core::cell::RefCell;

use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

use crate::commutation::PhaseDrive;
use crate::driver::PhaseDriver;

pub struct Shared<T> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Option<T>>>,
}

impl<T> Shared<T> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// 中身を設定（既存の値は置き換え）
    pub fn init(&self, value: T) {
        self.inner.lock(|cell| {
            cell.replace(Some(value));
        });
    }

    /// クリティカルセクション内で中身を操作
    ///
    /// # 戻り値
    /// 未初期化、または同じセルへの再入時は `None`
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.inner.lock(|cell| {
            let mut value = cell.try_borrow_mut().ok()?;
            value.as_mut().map(f)
        })
    }
}

impl<T> Default for Shared<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// 共有セル越しの相ドライバー（制御タスクと転流タスクで同じドライバーを使う）
impl<D: PhaseDriver> PhaseDriver for &Shared<D> {
    fn set_phase_outputs(&mut self, outputs: [PhaseDrive; 3]) {
        self.with(|d| d.set_phase_outputs(outputs));
    }

    fn set_duty_cycle(&mut self, duty: u16) {
        self.with(|d| d.set_duty_cycle(duty));
    }

    fn all_off(&mut self) {
        self.with(|d| d.all_off());
    }
}
