// crates/sg_physics/tests/dam_break_test.rs

//! 端到端回归测试
//!
//! 以经典一维溃坝为基准锁定推进链路的数值行为：求解器、
//! 边界填充、扫掠、CFL 控制与子步循环的任何语义变化都会
//! 在这里暴露。

use std::sync::Arc;

use sg_physics::{
    CancelToken, CircularDamBreak, CpuEngine, DamBreak1d, LakeAtRest, NumericalParams,
    ParallelExecutor, ScenarioProvider, SimulationBackend, Stepper, TickLimits,
};

fn make(provider: &dyn ScenarioProvider, threads: usize) -> (CpuEngine, Stepper) {
    let exec = Arc::new(ParallelExecutor::new(threads).unwrap());
    let mut engine = CpuEngine::new(NumericalParams::default(), exec).unwrap();
    engine.init(provider).unwrap();
    let stepper = Stepper::new(*engine.params());
    (engine, stepper)
}

fn unlimited() -> TickLimits {
    TickLimits {
        max_substeps: 10_000,
        budget: None,
    }
}

/// 一维溃坝推进 0.1 s 后的场分布
///
/// 波前以 √(g·hRoe)≈9.39 m/s 扩张, 0.1 s 内只触及间断两侧
/// 各一个单元；远处单元保持初值。
#[test]
fn test_dam_break_reference_values() {
    let (mut engine, mut stepper) = make(&DamBreak1d::standard(), 2);
    let outcome = stepper.advance(&mut engine, 0.1, unlimited(), &CancelToken::new());
    assert!((outcome.advanced - 0.1).abs() < 1e-12);
    assert_eq!(outcome.zeroed_interfaces, 0);

    let fields = engine.fields();
    let grid = *fields.grid();
    let wave_speed = 9.394671362;
    let momentum = 88.25985;

    for x in 0..=48_i64 {
        let i = grid.index(x, 0);
        assert!((fields.h()[i] - 10.0).abs() < 1e-12, "cell {x}");
        assert!(fields.hu()[i].abs() < 1e-12, "cell {x}");
    }
    let c49 = grid.index(49, 0);
    assert!((fields.h()[c49] - (10.0 - 0.1 * wave_speed)).abs() < 0.01);
    assert!((fields.hu()[c49] - 0.1 * momentum).abs() < 0.01);

    let c50 = grid.index(50, 0);
    assert!((fields.h()[c50] - (8.0 + 0.1 * wave_speed)).abs() < 0.01);
    assert!((fields.hu()[c50] - 0.1 * momentum).abs() < 0.01);

    for x in 51..100_i64 {
        let i = grid.index(x, 0);
        assert!((fields.h()[i] - 8.0).abs() < 1e-5, "cell {x}");
        assert!(fields.hu()[i].abs() < 1e-5, "cell {x}");
    }
}

/// 水深非负性：稳定时间步内多次推进不产生负水深
#[test]
fn test_depth_stays_non_negative() {
    let (mut engine, mut stepper) = make(&CircularDamBreak::standard(), 4);
    for _ in 0..25 {
        stepper.advance(&mut engine, 0.04, unlimited(), &CancelToken::new());
    }
    for (i, h) in engine.fields().h().iter().enumerate() {
        assert!(*h >= 0.0, "cell {i}: h = {h}");
        assert!(h.is_finite(), "cell {i}: h = {h}");
    }
}

/// 静水湖在起伏地形上长时间保持静止（良平衡）
#[test]
fn test_lake_at_rest_is_preserved() {
    let provider = LakeAtRest::standard();
    let (mut engine, mut stepper) = make(&provider, 2);
    for _ in 0..10 {
        stepper.advance(&mut engine, 0.1, unlimited(), &CancelToken::new());
    }

    let tol = sg_foundation::Tolerance::new(1e-8, 0.0);
    let fields = engine.fields();
    let grid = *fields.grid();
    for y in 0..grid.height() as i64 {
        for x in 0..grid.width() as i64 {
            let i = grid.index(x, y);
            let surface = fields.h()[i] + fields.b()[i];
            assert!(tol.approx_eq(surface, provider.surface), "cell ({x},{y})");
            assert!(tol.approx_zero(fields.hu()[i]));
            assert!(tol.approx_zero(fields.hv()[i]));
        }
    }
}

/// 并行确定性：相同初态与时间步序列, 1 线程与 4 线程逐位一致
#[test]
fn test_parallelism_is_deterministic() {
    let (mut serial_engine, mut serial_stepper) = make(&CircularDamBreak::standard(), 1);
    let (mut parallel_engine, mut parallel_stepper) = make(&CircularDamBreak::standard(), 4);

    for _ in 0..5 {
        serial_stepper.advance(&mut serial_engine, 0.05, unlimited(), &CancelToken::new());
        parallel_stepper.advance(&mut parallel_engine, 0.05, unlimited(), &CancelToken::new());
    }
    assert_eq!(serial_engine.fields().h(), parallel_engine.fields().h());
    assert_eq!(serial_engine.fields().hu(), parallel_engine.fields().hu());
    assert_eq!(serial_engine.fields().hv(), parallel_engine.fields().hv());
}

/// 流出边界幂等：重复施加不改变任何单元
#[test]
fn test_outflow_boundary_is_idempotent() {
    let provider = CircularDamBreak::standard();
    let grid = sg_physics::Grid::new(provider.cells, provider.cells).unwrap();
    let mut field = vec![0.0; grid.total_cells()];
    provider.fill_depth(&grid, &mut field);

    sg_physics::boundary::apply_outflow(&grid, &mut field);
    let once = field.clone();
    sg_physics::boundary::apply_outflow(&grid, &mut field);
    assert_eq!(once, field);

    // 每个幽灵单元等于相邻内部单元
    for x in 0..grid.width() as i64 {
        assert_eq!(field[grid.index(x, -1)], field[grid.index(x, 0)]);
    }
    for y in 0..grid.height() as i64 {
        assert_eq!(
            field[grid.index(grid.width() as i64, y)],
            field[grid.index(grid.width() as i64 - 1, y)]
        );
    }
}
