// crates/sg_foundation/src/tolerance.rs

//! 浮点容差比较
//!
//! 数值测试与静水校验需要统一的容差语义：
//! 绝对容差用于接近零的量，相对容差用于大数量级的量。

/// 容差配置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// 绝对容差
    pub abs: f64,
    /// 相对容差
    pub rel: f64,
}

impl Tolerance {
    /// 创建容差配置
    pub const fn new(abs: f64, rel: f64) -> Self {
        Self { abs, rel }
    }

    /// 严格容差（接近机器精度）
    pub const STRICT: Self = Self::new(1e-12, 1e-12);

    /// 默认容差
    pub const DEFAULT: Self = Self::new(1e-9, 1e-9);

    /// 判断两值在容差内相等
    #[inline]
    pub fn approx_eq(&self, a: f64, b: f64) -> bool {
        let diff = (a - b).abs();
        if diff <= self.abs {
            return true;
        }
        diff <= self.rel * a.abs().max(b.abs())
    }

    /// 判断值在容差内为零
    #[inline]
    pub fn approx_zero(&self, a: f64) -> bool {
        a.abs() <= self.abs
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// 便捷函数：默认容差下的近似相等
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    Tolerance::DEFAULT.approx_eq(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approx_eq_absolute() {
        let tol = Tolerance::new(1e-6, 0.0);
        assert!(tol.approx_eq(1.0, 1.0 + 1e-7));
        assert!(!tol.approx_eq(1.0, 1.0 + 1e-5));
    }

    #[test]
    fn test_approx_eq_relative() {
        let tol = Tolerance::new(0.0, 1e-6);
        assert!(tol.approx_eq(1e9, 1e9 + 100.0));
        assert!(!tol.approx_eq(1.0, 1.1));
    }

    #[test]
    fn test_approx_zero() {
        assert!(Tolerance::DEFAULT.approx_zero(1e-12));
        assert!(!Tolerance::DEFAULT.approx_zero(1e-3));
    }
}
