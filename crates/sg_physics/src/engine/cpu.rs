// crates/sg_physics/src/engine/cpu.rs

//! CPU 后端
//!
//! 参考实现：f-wave 求解器 + 条带并行扫掠，场数据常驻
//! 主存，宿主可直接读取。

use std::sync::Arc;

use tracing::info;

use sg_foundation::SgResult;

use crate::engine::backend::SimulationBackend;
use crate::engine::parallel::ParallelExecutor;
use crate::engine::sweep::{self, SweepAxis, SweepStats};
use crate::engine::timestep;
use crate::field::FieldSet;
use crate::grid::Grid;
use crate::provider::ScenarioProvider;
use crate::schemes::FWaveSolver;
use crate::types::NumericalParams;

/// CPU 模拟后端
#[derive(Debug)]
pub struct CpuEngine {
    fields: FieldSet,
    solver: FWaveSolver,
    executor: Arc<ParallelExecutor>,
    params: NumericalParams,
}

impl CpuEngine {
    /// 创建后端；网格尺寸由之后的 [`SimulationBackend::init`]
    /// 按提供者建议确定，这里先占位 1×1
    pub fn new(params: NumericalParams, executor: Arc<ParallelExecutor>) -> SgResult<Self> {
        params.validate()?;
        Ok(Self {
            fields: FieldSet::new(Grid::new(1, 1)?),
            solver: FWaveSolver::new(params.gravity),
            executor,
            params,
        })
    }

    /// 数值参数
    pub fn params(&self) -> &NumericalParams {
        &self.params
    }

    /// 覆盖单元尺寸（初始化时默认采用提供者的建议值）
    pub fn override_cell_size(&mut self, cell_size: f64) -> SgResult<()> {
        self.params.cell_size = cell_size;
        self.params.validate()?;
        Ok(())
    }

    /// 并行执行器
    pub fn executor(&self) -> &Arc<ParallelExecutor> {
        &self.executor
    }
}

impl SimulationBackend for CpuEngine {
    fn name(&self) -> &str {
        "cpu"
    }

    fn init(&mut self, provider: &dyn ScenarioProvider) -> SgResult<()> {
        let width = provider.preferred_cells_x();
        let height = provider.preferred_cells_y();
        let grid = Grid::new(width, height)?;

        self.params.cell_size = provider.preferred_cell_size();
        self.params.validate()?;

        self.fields = FieldSet::new(grid);
        self.fields.populate(provider);

        info!(
            width,
            height,
            cell_size = self.params.cell_size,
            threads = self.executor.num_threads(),
            "CPU 后端初始化完成"
        );
        Ok(())
    }

    fn half_step(&mut self, axis: SweepAxis, scale: f64) -> SweepStats {
        sweep::half_step(
            &mut self.fields,
            &self.solver,
            &self.executor,
            scale,
            axis,
            self.params.min_rows_per_task,
        )
    }

    fn max_wave_speed(&self) -> f64 {
        timestep::max_wave_speed(
            &self.fields,
            &self.executor,
            self.params.gravity,
            self.params.min_rows_per_task,
        )
    }

    fn fields(&self) -> &FieldSet {
        &self.fields
    }
}
