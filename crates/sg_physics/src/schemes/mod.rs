// crates/sg_physics/src/schemes/mod.rs

//! 数值格式：界面 Riemann 求解器
//!
//! 格式层只关心单个界面的局部问题，不持有场数据，
//! 由引擎层在扫掠时对每个界面调用。

mod fwave;

pub use fwave::{FWaveSolver, NetUpdates};
