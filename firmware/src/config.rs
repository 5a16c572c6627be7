//! Configuration module
//!
//! 制御パラメータはライブラリ側（`sensorless_bldc::config`）のものを使い、
//! ここにはハードウェア固有の設定だけを置きます。

pub mod params;

pub use params::*;
pub use sensorless_bldc::config::*;
