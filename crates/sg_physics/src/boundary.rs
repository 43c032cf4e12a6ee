// crates/sg_physics/src/boundary.rs

//! 边界条件：幽灵圈填充
//!
//! 所有边界通过宽度为 1 的幽灵圈实现。每次扫掠前对参与
//! 扫掠的场施加开边界（零梯度流出）；需要封闭域的场景在
//! 初始化时额外做一次固壁覆盖。

use crate::field::FieldSet;
use crate::grid::Grid;

/// 零梯度流出边界：幽灵单元复制最近内部单元的值
///
/// 四条边加四个角全部覆盖（角由侧边循环的扩展范围处理）。
pub fn apply_outflow(grid: &Grid, field: &mut [f64]) {
    let w = grid.width() as i64;
    let h = grid.height() as i64;

    // 上下边
    for x in 0..w {
        field[grid.index(x, -1)] = field[grid.index(x, 0)];
        field[grid.index(x, h)] = field[grid.index(x, h - 1)];
    }
    // 左右边（含角：y 范围扩展到幽灵行）
    for y in -1..=h {
        field[grid.index(-1, y)] = field[grid.index(0, y)];
        field[grid.index(w, y)] = field[grid.index(w - 1, y)];
    }
}

/// 固壁（反射）边界：幽灵动量取内部相邻值的相反数
///
/// 水深保持零梯度复制，法向动量取反，使边界界面上的
/// Riemann 问题给出零穿透通量。仅在初始化的场填充之后
/// 施加一次（[`crate::provider::ScenarioProvider::apply_border`]
/// 的默认实现），之后的扫掠恢复流出填充。
pub fn apply_wall_border(fields: &mut FieldSet) {
    let grid = *fields.grid();
    let w = grid.width() as i64;
    let h = grid.height() as i64;

    apply_outflow(&grid, fields.h.current_mut());

    let hu = fields.hu.current_mut();
    for y in -1..=h {
        hu[grid.index(-1, y)] = -hu[grid.index(0, y)];
        hu[grid.index(w, y)] = -hu[grid.index(w - 1, y)];
    }
    let hv = fields.hv.current_mut();
    for x in 0..w {
        hv[grid.index(x, -1)] = -hv[grid.index(x, 0)];
        hv[grid.index(x, h)] = -hv[grid.index(x, h - 1)];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outflow_copies_nearest_interior() {
        let grid = Grid::new(3, 2).unwrap();
        let mut f = vec![0.0; grid.total_cells()];
        for y in 0..2_i64 {
            for x in 0..3_i64 {
                f[grid.index(x, y)] = (x + 10 * y) as f64;
            }
        }
        apply_outflow(&grid, &mut f);

        assert_eq!(f[grid.index(1, -1)], f[grid.index(1, 0)]);
        assert_eq!(f[grid.index(1, 2)], f[grid.index(1, 1)]);
        assert_eq!(f[grid.index(-1, 0)], f[grid.index(0, 0)]);
        assert_eq!(f[grid.index(3, 1)], f[grid.index(2, 1)]);
        // 角单元
        assert_eq!(f[grid.index(-1, -1)], f[grid.index(0, 0)]);
        assert_eq!(f[grid.index(3, 2)], f[grid.index(2, 1)]);
    }

    #[test]
    fn test_wall_border_negates_normal_momentum() {
        let grid = Grid::new(2, 2).unwrap();
        let mut fields = FieldSet::new(grid);
        fields.hu.current_mut()[grid.index(0, 0)] = 3.0;
        fields.hv.current_mut()[grid.index(0, 0)] = -2.0;
        apply_wall_border(&mut fields);
        assert_eq!(fields.hu()[grid.index(-1, 0)], -3.0);
        assert_eq!(fields.hv()[grid.index(0, -1)], 2.0);
    }
}
