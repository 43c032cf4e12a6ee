// crates/sg_physics/src/lib.rs

//! 数值引擎模块 (Layer 3)
//!
//! 提供浅水方程数值求解功能，面向交互式海啸/洪水可视化：
//! - 结构化网格与幽灵边界 (grid / boundary)
//! - 双缓冲场存储 (field)
//! - 初始条件提供者 (provider)
//! - f-wave 黎曼求解器 (schemes)
//! - 引擎核心 (engine) - 并行执行、维度分裂扫掠、CFL 时间步控制、推进循环
//!
//! # 数值格式
//!
//! 界面更新采用 Roe 线性化的双波 f-wave 分解，含地形源项，
//! 静水状态（lake at rest）下严格良平衡。时间推进为 Godunov
//! 算子分裂：每个子步先 x 扫掠、后 y 扫掠，同一缩放因子。
//!
//! # 后端抽象
//!
//! [`SimulationBackend`] 定义推进能力接口，[`CpuEngine`] 为参考实现；
//! GPU 变体可作为同一契约的可选高性能实现接入。

pub mod boundary;
pub mod engine;
pub mod field;
pub mod grid;
pub mod provider;
pub mod schemes;
pub mod types;

// 重导出常用类型
pub use engine::{
    AdvanceOutcome, CancelToken, CpuEngine, ParallelExecutor, SimulationBackend, Stepper,
    SweepAxis, SweepStats, TickLimits, TimeStepController,
};
pub use field::{DoubleBuffer, FieldSet, FieldSnapshot};
pub use grid::Grid;
pub use provider::{CircularDamBreak, DamBreak1d, LakeAtRest, ScenarioProvider};
pub use schemes::{FWaveSolver, NetUpdates};
pub use types::{NumericalParams, NumericalParamsBuilder, ParamsValidationError, DEFAULT_GRAVITY};
