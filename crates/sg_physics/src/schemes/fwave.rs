// crates/sg_physics/src/schemes/fwave.rs

//! f-wave 两波 Riemann 求解器
//!
//! 将界面上的通量跳跃（含地形源项）分解为两个以 Roe 特征
//! 速度传播的波，按波速符号分别归入左右单元的净更新。
//! 地形源项并入通量差使格式良平衡：静水状态（水面高程
//! 相等、动量为零）下两波幅值精确为零。
//!
//! # 干湿处理
//!
//! 有负水深一侧按固壁镜像处理（复制对侧水深与地形、动量
//! 取反），两侧均干时直接返回零更新。零水深本身走湿路径，
//! 速度取零。
//!
//! # 鲁棒性
//!
//! 退化界面（残余动量除以接近零的水深）会产生非有限的波
//! 幅值；此时更新置零并上报，由引擎层计数诊断。

use serde::Serialize;

// ============================================================
// 净更新
// ============================================================

/// 一个界面求解产生的四个净更新分量
///
/// 扫掠时从左右单元的对应分量中按 `dt/dx` 比例扣减。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NetUpdates {
    /// 左单元水深净更新
    pub h_left: f64,
    /// 左单元动量净更新
    pub hu_left: f64,
    /// 右单元水深净更新
    pub h_right: f64,
    /// 右单元动量净更新
    pub hu_right: f64,
}

impl NetUpdates {
    /// 全零更新（干界面、静水界面）
    pub const ZERO: Self = Self {
        h_left: 0.0,
        hu_left: 0.0,
        h_right: 0.0,
        hu_right: 0.0,
    };

    /// 四个分量是否全部有限
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.h_left.is_finite()
            && self.hu_left.is_finite()
            && self.h_right.is_finite()
            && self.hu_right.is_finite()
    }
}

// ============================================================
// 求解器
// ============================================================

/// f-wave 求解器
///
/// 无状态（仅持有重力加速度），可在线程间共享。
#[derive(Debug, Clone, Copy)]
pub struct FWaveSolver {
    gravity: f64,
}

impl FWaveSolver {
    /// 创建求解器
    pub fn new(gravity: f64) -> Self {
        Self { gravity }
    }

    /// 重力加速度 [m/s²]
    #[inline]
    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    /// 求解一个界面的 Riemann 问题
    ///
    /// 参数为左右单元的水深、法向动量与地形高程；返回净更新
    /// 与"更新被置零"标志（非有限结果被清零时为 `true`）。
    pub fn solve(
        &self,
        mut h_left: f64,
        mut h_right: f64,
        mut hu_left: f64,
        mut hu_right: f64,
        mut b_left: f64,
        mut b_right: f64,
    ) -> (NetUpdates, bool) {
        // 两侧均干：界面无通量
        if h_left <= 0.0 && h_right <= 0.0 {
            return (NetUpdates::ZERO, false);
        }

        // 负深一侧镜像为固壁（严格小于零才触发，零深走湿路径）
        if h_left < 0.0 {
            h_left = h_right;
            b_left = b_right;
            hu_left = -hu_right;
        } else if h_right < 0.0 {
            h_right = h_left;
            b_right = b_left;
            hu_right = -hu_left;
        }

        let u_left = if h_left > 0.0 { hu_left / h_left } else { 0.0 };
        let u_right = if h_right > 0.0 { hu_right / h_right } else { 0.0 };

        // Roe 平均与特征速度
        let h_roe = 0.5 * (h_left + h_right);
        let sqrt_hl = h_left.sqrt();
        let sqrt_hr = h_right.sqrt();
        let u_roe = (u_left * sqrt_hl + u_right * sqrt_hr) / (sqrt_hl + sqrt_hr);
        let c_roe = (self.gravity * h_roe).sqrt();
        let lambda0 = u_roe - c_roe;
        let lambda1 = u_roe + c_roe;

        // 通量跳跃（动量分量并入良平衡地形源项）
        let df0 = hu_right - hu_left;
        let df1 = hu_right * u_right - hu_left * u_left
            + self.gravity
                * (0.5 * (h_right * h_right - h_left * h_left) + h_roe * (b_right - b_left));

        // 按特征方向分解为两波
        let inv = lambda1 - lambda0;
        let dh0 = (df0 * lambda1 - df1) / inv;
        let dh1 = -(df0 * lambda0 - df1) / inv;
        let dhu0 = dh0 * lambda0;
        let dhu1 = dh1 * lambda1;

        let mut updates = NetUpdates::ZERO;
        if lambda0 < 0.0 {
            updates.h_left += dh0;
            updates.hu_left += dhu0;
        } else {
            updates.h_right += dh0;
            updates.hu_right += dhu0;
        }
        if lambda1 < 0.0 {
            updates.h_left += dh1;
            updates.hu_left += dhu1;
        } else {
            updates.h_right += dh1;
            updates.hu_right += dhu1;
        }

        if updates.is_finite() {
            (updates, false)
        } else {
            (NetUpdates::ZERO, true)
        }
    }
}
