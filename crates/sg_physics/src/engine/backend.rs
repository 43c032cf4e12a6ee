// crates/sg_physics/src/engine/backend.rs

//! 后端能力接口
//!
//! 把"一个子步需要后端做什么"收敛为一个最小契约：初始化、
//! 单轴扫掠、波速扫描、场访问。CPU 实现是语义参考；GPU 等
//! 面向性能的变体实现同一契约即可接入步进循环，正确性不
//! 依赖具体后端。

use sg_foundation::SgResult;

use crate::engine::sweep::{SweepAxis, SweepStats};
use crate::field::FieldSet;
use crate::provider::ScenarioProvider;

/// 模拟后端
pub trait SimulationBackend: Send {
    /// 后端名称（日志与诊断）
    fn name(&self) -> &str;

    /// 按提供者的尺寸建议分配网格并填充初始场
    fn init(&mut self, provider: &dyn ScenarioProvider) -> SgResult<()>;

    /// 执行一次单轴扫掠，`scale = dt / cellSize`
    fn half_step(&mut self, axis: SweepAxis, scale: f64) -> SweepStats;

    /// 扫描当前场的最大波速
    fn max_wave_speed(&self) -> f64;

    /// 场数据是否可被宿主直接读取（GPU 后端可能需要回读）
    fn supports_direct_field_access(&self) -> bool {
        true
    }

    /// 当前场集合
    fn fields(&self) -> &FieldSet;
}
