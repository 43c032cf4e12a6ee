// crates/sg_physics/src/types.rs

//! 数值参数与物理常数
//!
//! 本模块提供引擎层的参数类型：
//! - [`NumericalParams`]: 数值参数（重力、单元尺寸、CFL 数、重扫间隔）
//! - [`NumericalParamsBuilder`]: 构建器，带验证
//! - [`ParamsValidationError`]: 参数验证错误
//!
//! # 使用规范
//!
//! 参数在配置边界处验证一次（`build()` / `validate()`），
//! 引擎热路径不再做防御性检查。

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 默认重力加速度 [m/s²]
pub const DEFAULT_GRAVITY: f64 = 9.81;

/// 二维网格的默认 CFL 数
pub const DEFAULT_CFL_2D: f64 = 0.45;

/// 一维退化网格（1×N 或 N×1）的 CFL 数，即一维稳定性上限
pub const DEFAULT_CFL_1D: f64 = 0.5;

/// 参数验证错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamsValidationError {
    /// 数值必须为正且有限
    #[error("参数 {name} 必须为正且有限, 实际 {value}")]
    NotPositive {
        /// 参数名
        name: &'static str,
        /// 实际值
        value: f64,
    },

    /// CFL 数超出稳定范围
    #[error("CFL 数 {name}={value} 超出范围 (0, 1]")]
    CflOutOfRange {
        /// 出错的字段名
        name: &'static str,
        /// 实际值
        value: f64,
    },

    /// 重扫间隔必须至少为 1
    #[error("时间步重算间隔必须 >= 1")]
    ZeroRecomputeInterval,
}

/// 数值参数
///
/// 引擎推进所需的全部标量参数。单元尺寸与重力在模拟实例
/// 生命周期内不变；CFL 数按网格维度在推进时选择。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericalParams {
    /// 重力加速度 [m/s²]
    pub gravity: f64,
    /// 单元边长 [m]
    pub cell_size: f64,
    /// 二维网格 CFL 数
    pub cfl_2d: f64,
    /// 一维退化网格 CFL 数
    pub cfl_1d: f64,
    /// 每隔多少个子步重算一次最大波速（全场扫描开销大）
    pub recompute_interval: u32,
    /// 并行任务的最小行数
    pub min_rows_per_task: usize,
}

impl NumericalParams {
    /// 按网格维度选择 CFL 数
    #[inline]
    pub fn cfl_for(&self, one_dimensional: bool) -> f64 {
        if one_dimensional {
            self.cfl_1d
        } else {
            self.cfl_2d
        }
    }

    /// 验证参数
    pub fn validate(&self) -> Result<(), ParamsValidationError> {
        check_positive("gravity", self.gravity)?;
        check_positive("cell_size", self.cell_size)?;
        for &(name, cfl) in &[("cfl_2d", self.cfl_2d), ("cfl_1d", self.cfl_1d)] {
            if !(cfl > 0.0 && cfl <= 1.0) {
                return Err(ParamsValidationError::CflOutOfRange { name, value: cfl });
            }
        }
        if self.recompute_interval == 0 {
            return Err(ParamsValidationError::ZeroRecomputeInterval);
        }
        Ok(())
    }

    /// 创建构建器
    pub fn builder() -> NumericalParamsBuilder {
        NumericalParamsBuilder::default()
    }
}

impl From<ParamsValidationError> for sg_foundation::SgError {
    fn from(err: ParamsValidationError) -> Self {
        sg_foundation::SgError::invalid_input(err.to_string())
    }
}

fn check_positive(name: &'static str, value: f64) -> Result<(), ParamsValidationError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ParamsValidationError::NotPositive { name, value })
    }
}

impl Default for NumericalParams {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            cell_size: 1.0,
            cfl_2d: DEFAULT_CFL_2D,
            cfl_1d: DEFAULT_CFL_1D,
            recompute_interval: 4,
            min_rows_per_task: 8,
        }
    }
}

/// 数值参数构建器
#[derive(Debug, Clone, Default)]
pub struct NumericalParamsBuilder {
    params: NumericalParams,
}

impl NumericalParamsBuilder {
    /// 设置重力加速度
    pub fn with_gravity(mut self, gravity: f64) -> Self {
        self.params.gravity = gravity;
        self
    }

    /// 设置单元边长
    pub fn with_cell_size(mut self, cell_size: f64) -> Self {
        self.params.cell_size = cell_size;
        self
    }

    /// 设置二维 CFL 数
    pub fn with_cfl(mut self, cfl: f64) -> Self {
        self.params.cfl_2d = cfl;
        self
    }

    /// 设置重扫间隔
    pub fn with_recompute_interval(mut self, interval: u32) -> Self {
        self.params.recompute_interval = interval;
        self
    }

    /// 设置并行最小行数
    pub fn with_min_rows_per_task(mut self, rows: usize) -> Self {
        self.params.min_rows_per_task = rows;
        self
    }

    /// 构建并验证
    pub fn build(self) -> Result<NumericalParams, ParamsValidationError> {
        self.params.validate()?;
        Ok(self.params)
    }
}
