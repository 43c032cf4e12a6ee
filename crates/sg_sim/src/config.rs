// crates/sg_sim/src/config.rs

//! 模拟配置
//!
//! 宿主可见的全部可调参数，支持 JSON 反序列化（缺省字段
//! 取默认值）。配置在进入引擎前验证一次并映射为
//! [`NumericalParams`]，引擎内部不再重复校验。

use std::path::Path;

use serde::{Deserialize, Serialize};

use sg_foundation::{SgError, SgResult};
use sg_physics::{NumericalParams, DEFAULT_GRAVITY};

/// 默认帧预算 [s]（60 fps）
pub const DEFAULT_TICK_BUDGET_SECS: f64 = 1.0 / 60.0;

/// 模拟配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// 重力加速度 [m/s²]
    pub gravity: f64,
    /// 单元尺寸覆盖 [m]；`None` 时采用场景提供者的建议值
    pub cell_size: Option<f64>,
    /// 二维网格的 CFL 数（一维退化网格固定用 0.5）
    pub cfl: f64,
    /// 两次稳定时间步重算之间的子步数
    pub recompute_every_n_substeps: u32,
    /// 时间缩放：每真实秒推进的模拟秒数
    pub simulated_time_per_real_second: f64,
    /// 每个 tick 的最大子步数
    pub max_substeps_per_tick: u32,
    /// 每个 tick 的墙钟预算 [s]；`0` 表示不限
    pub tick_budget_secs: f64,
    /// 工作线程数；`0` 表示使用硬件并行度
    pub num_threads: usize,
    /// 每个并行任务至少处理的行数
    pub min_rows_per_task: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            cell_size: None,
            cfl: 0.45,
            recompute_every_n_substeps: 4,
            simulated_time_per_real_second: 1.0,
            max_substeps_per_tick: 64,
            tick_budget_secs: DEFAULT_TICK_BUDGET_SECS,
            num_threads: 0,
            min_rows_per_task: 8,
        }
    }
}

impl SimulationConfig {
    /// 从 JSON 文件加载
    pub fn from_json_file(path: impl AsRef<Path>) -> SgResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SgError::config(format!("读取配置 {} 失败: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| SgError::config(format!("解析配置 {} 失败: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// 验证配置
    pub fn validate(&self) -> SgResult<()> {
        sg_foundation::ensure!(
            self.simulated_time_per_real_second > 0.0
                && self.simulated_time_per_real_second.is_finite(),
            SgError::invalid_config(
                "simulated_time_per_real_second",
                self.simulated_time_per_real_second.to_string(),
                "必须为正且有限",
            )
        );
        sg_foundation::ensure!(
            self.tick_budget_secs >= 0.0 && self.tick_budget_secs.is_finite(),
            SgError::invalid_config(
                "tick_budget_secs",
                self.tick_budget_secs.to_string(),
                "必须非负且有限",
            )
        );
        sg_foundation::ensure!(
            self.max_substeps_per_tick >= 1,
            SgError::invalid_config(
                "max_substeps_per_tick",
                self.max_substeps_per_tick.to_string(),
                "必须 >= 1",
            )
        );
        // 其余数值参数由构建器统一校验
        self.to_numerical_params()?;
        Ok(())
    }

    /// 映射为引擎的数值参数
    ///
    /// 单元尺寸此时取覆盖值或占位 1.0；引擎初始化时会按
    /// 场景提供者的建议更新。
    pub fn to_numerical_params(&self) -> SgResult<NumericalParams> {
        let params = NumericalParams::builder()
            .with_gravity(self.gravity)
            .with_cell_size(self.cell_size.unwrap_or(1.0))
            .with_cfl(self.cfl)
            .with_recompute_interval(self.recompute_every_n_substeps)
            .with_min_rows_per_task(self.min_rows_per_task)
            .build()?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimulationConfig::default();
        config.validate().unwrap();
        let params = config.to_numerical_params().unwrap();
        assert_eq!(params.gravity, DEFAULT_GRAVITY);
        assert_eq!(params.cfl_2d, 0.45);
        assert_eq!(params.recompute_interval, 4);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{"cfl": 0.4, "num_threads": 2}"#).unwrap();
        assert_eq!(config.cfl, 0.4);
        assert_eq!(config.num_threads, 2);
        assert_eq!(config.gravity, DEFAULT_GRAVITY);
        assert_eq!(config.cell_size, None);
    }

    #[test]
    fn test_rejects_zero_time_scale() {
        let config = SimulationConfig {
            simulated_time_per_real_second: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_cfl() {
        let config = SimulationConfig {
            cfl: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
