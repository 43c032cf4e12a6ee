// crates/sg_physics/src/engine/parallel.rs

//! 并行执行器
//!
//! 在自有的 rayon 线程池上提供阻塞式 fork-join 并行：
//! 把 `[start, end)` 的行（或列）区间切成连续条带，每个
//! 任务携带一份自己的暂存状态，调用方阻塞到全部完成。
//! 归约（最大波速）由各任务的局部结果在单个临界区内合并。
//!
//! 执行器由模拟实例显式构造并注入引擎，不依赖全局线程池，
//! 多个实例可各持一个池而互不干扰。

use std::marker::PhantomData;
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use rayon::{ThreadPool, ThreadPoolBuilder};

use sg_foundation::{SgError, SgResult};

/// 固定线程池上的 fork-join 并行执行器
pub struct ParallelExecutor {
    pool: ThreadPool,
    tasks_spawned: AtomicU64,
}

impl std::fmt::Debug for ParallelExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelExecutor")
            .field("threads", &self.pool.current_num_threads())
            .field("tasks_spawned", &self.tasks_spawned.load(Ordering::Relaxed))
            .finish()
    }
}

impl ParallelExecutor {
    /// 创建执行器；`num_threads == 0` 表示使用硬件并行度
    pub fn new(num_threads: usize) -> SgResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("sg-worker-{i}"))
            .build()
            .map_err(|e| SgError::runtime(format!("创建线程池失败: {e}")))?;
        Ok(Self {
            pool,
            tasks_spawned: AtomicU64::new(0),
        })
    }

    /// 线程数
    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// 累计派发的任务数（诊断用）
    pub fn tasks_spawned(&self) -> u64 {
        self.tasks_spawned.load(Ordering::Relaxed)
    }

    /// 把 `[start, end)` 切成连续条带
    ///
    /// 条带数为 `len / min_per_task`，钳制到 `[1, 线程数]`；
    /// 条带长度向上取整，最后一条可能较短。
    pub fn partition(&self, start: usize, end: usize, min_per_task: usize) -> Vec<Range<usize>> {
        let len = end.saturating_sub(start);
        if len == 0 {
            return Vec::new();
        }
        let min = min_per_task.max(1);
        let tasks = (len / min).clamp(1, self.num_threads());
        let chunk = len.div_ceil(tasks);
        (0..tasks)
            .map(|i| {
                let lo = start + i * chunk;
                let hi = (lo + chunk).min(end);
                lo..hi
            })
            .filter(|r| !r.is_empty())
            .collect()
    }

    /// 对每个条带并行执行 `body`，阻塞到全部完成
    ///
    /// 每个任务通过 `make_scratch` 获得自己的暂存状态，
    /// 避免逐界面分配。
    pub fn for_each_stripe<S, F, B>(
        &self,
        start: usize,
        end: usize,
        min_per_task: usize,
        make_scratch: F,
        body: B,
    ) where
        S: Send,
        F: Fn() -> S + Sync,
        B: Fn(Range<usize>, &mut S) + Sync,
    {
        let ranges = self.partition(start, end, min_per_task);
        self.tasks_spawned
            .fetch_add(ranges.len() as u64, Ordering::Relaxed);
        self.pool.scope(|scope| {
            for range in ranges {
                let body = &body;
                let make_scratch = &make_scratch;
                scope.spawn(move |_| {
                    let mut scratch = make_scratch();
                    body(range, &mut scratch);
                });
            }
        });
    }

    /// 并行归约：对每个条带求局部最大值，在单个临界区内合并
    pub fn max_over_stripes<B>(&self, start: usize, end: usize, min_per_task: usize, body: B) -> f64
    where
        B: Fn(Range<usize>) -> f64 + Sync,
    {
        let ranges = self.partition(start, end, min_per_task);
        self.tasks_spawned
            .fetch_add(ranges.len() as u64, Ordering::Relaxed);
        let global = Mutex::new(0.0_f64);
        self.pool.scope(|scope| {
            for range in ranges {
                let body = &body;
                let global = &global;
                scope.spawn(move |_| {
                    let local = body(range);
                    let mut g = global.lock();
                    if local > *g {
                        *g = local;
                    }
                });
            }
        });
        global.into_inner()
    }
}

// ============================================================
// 条带写入
// ============================================================

/// 跨任务共享的可变场视图
///
/// 扫掠把目标场按条带划分给各任务；条带互不相交，因此
/// 裸指针写入不构成数据竞争。
///
/// # Safety
///
/// 调用方必须保证：同一索引在一次 fork-join 内只被一个
/// 任务写入，且指针在 `'a` 内有效。扫掠的条带划分（x 扫掠
/// 按行、y 扫掠按列）静态满足这一点。
pub struct StripeWriter<'a> {
    ptr: *mut f64,
    len: usize,
    _marker: PhantomData<&'a mut [f64]>,
}

unsafe impl Send for StripeWriter<'_> {}
unsafe impl Sync for StripeWriter<'_> {}

impl<'a> StripeWriter<'a> {
    /// 包装目标切片
    pub fn new(slice: &'a mut [f64]) -> Self {
        Self {
            ptr: slice.as_mut_ptr(),
            len: slice.len(),
            _marker: PhantomData,
        }
    }

    /// 从 `idx` 处的值中扣减 `value`
    ///
    /// # Safety
    ///
    /// `idx` 必须属于本任务独占的条带。
    #[inline]
    pub unsafe fn sub(&self, idx: usize, value: f64) {
        debug_assert!(idx < self.len);
        *self.ptr.add(idx) -= value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_respects_min_per_task() {
        let exec = ParallelExecutor::new(4).unwrap();
        // 10 行、每任务至少 8 行 → 单任务
        let ranges = exec.partition(0, 10, 8);
        assert_eq!(ranges, vec![0..10]);
        // 100 行 → 4 个任务（受线程数钳制）
        let ranges = exec.partition(0, 100, 8);
        assert_eq!(ranges.len(), 4);
        assert_eq!(ranges.first().unwrap().start, 0);
        assert_eq!(ranges.last().unwrap().end, 100);
    }

    #[test]
    fn test_partition_covers_without_overlap() {
        let exec = ParallelExecutor::new(3).unwrap();
        let ranges = exec.partition(5, 47, 1);
        let mut next = 5;
        for r in &ranges {
            assert_eq!(r.start, next);
            next = r.end;
        }
        assert_eq!(next, 47);
    }

    #[test]
    fn test_partition_empty_range() {
        let exec = ParallelExecutor::new(2).unwrap();
        assert!(exec.partition(3, 3, 1).is_empty());
    }

    #[test]
    fn test_for_each_stripe_writes_all_rows() {
        let exec = ParallelExecutor::new(4).unwrap();
        let n = 64;
        let mut data = vec![0.0_f64; n];
        {
            let writer = StripeWriter::new(&mut data);
            exec.for_each_stripe(0, n, 4, || (), |range, _| {
                for i in range {
                    // 每个索引恰好属于一个条带
                    unsafe { writer.sub(i, -(i as f64)) };
                }
            });
        }
        for (i, v) in data.iter().enumerate() {
            assert_eq!(*v, i as f64);
        }
    }

    #[test]
    fn test_max_over_stripes() {
        let exec = ParallelExecutor::new(4).unwrap();
        let data: Vec<f64> = (0..1000).map(|i| (i as f64 * 17.0) % 997.0).collect();
        let expected = data.iter().cloned().fold(0.0_f64, f64::max);
        let got = exec.max_over_stripes(0, data.len(), 16, |range| {
            range.map(|i| data[i]).fold(0.0_f64, f64::max)
        });
        assert_eq!(got, expected);
    }
}
