// crates/sg_foundation/src/lib.rs

//! SurgeLab 基础层 (Layer 1)
//!
//! 提供整个项目共用的基础设施：
//! - [`error`]: 统一错误类型 `SgError` 和结果别名 `SgResult`
//! - [`tolerance`]: 浮点容差比较
//! - `ensure!` / `require!` 验证宏
//!
//! # 层级架构
//!
//! ```text
//! Layer 5: sg_cli        ─> 命令行前端
//! Layer 4: sg_sim        ─> 模拟实例、后台工作线程、配置
//! Layer 3: sg_physics    ─> 数值引擎（黎曼求解、扫掠、时间步控制）
//! Layer 1: sg_foundation ─> 错误、容差（本层）
//! ```
//!
//! 本层不依赖任何上层 crate，也不包含物理语义。

#![warn(missing_docs)]

pub mod error;
pub mod tolerance;

pub use error::{SgError, SgResult};
pub use tolerance::Tolerance;

/// 条件验证宏：条件不满足时返回指定错误
///
/// # 示例
///
/// ```
/// use sg_foundation::{ensure, SgError, SgResult};
///
/// fn check(v: f64) -> SgResult<()> {
///     ensure!(v > 0.0, SgError::invalid_input("必须为正数"));
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err);
        }
    };
}

/// Option 解包宏：为 None 时返回指定错误
///
/// # 示例
///
/// ```
/// use sg_foundation::{require, SgError, SgResult};
///
/// fn first(values: &[f64]) -> SgResult<f64> {
///     let v = require!(values.first(), SgError::not_found("values"));
///     Ok(*v)
/// }
/// ```
#[macro_export]
macro_rules! require {
    ($opt:expr, $err:expr) => {
        match $opt {
            Some(v) => v,
            None => return Err($err),
        }
    };
}
