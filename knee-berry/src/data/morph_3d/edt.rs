//! 可分离的精确欧氏距离变换.
//!
//! 对每个轴依次做一维平方距离变换 (下包络抛物线法, Felzenszwalb & Huttenlocher),
//! 三遍之后即得到到最近前景体素的精确平方距离.

use crate::consts::gray::is_foreground;
use ndarray::{Array3, ArrayView3, ArrayViewMut1, Axis, Zip};

/// 计算每个体素到最近前景体素的平方欧氏距离.
///
/// `weights` 为 \[z, h, w\] 三个轴相邻体素的间距. 传入体素分辨率 (毫米)
/// 即得到物理距离的平方; 前景体素的距离为 0.
///
/// # 注意
///
/// 1. `weights` 必须都是正的有限值.
/// 2. 若掩码不含任何前景, 则所有距离都是 `f64::INFINITY`.
pub fn squared_edt(mask: ArrayView3<u8>, weights: [f64; 3]) -> Array3<f64> {
    debug_assert!(weights.iter().all(|w| w.is_finite() && *w > 0.0));
    let mut dist = mask.mapv(|p| if is_foreground(p) { 0.0 } else { f64::INFINITY });
    // w -> h -> z
    for axis in (0..3).rev() {
        let weight = weights[axis];
        for_each_lane(&mut dist, Axis(axis), move |lane| transform_lane(lane, weight));
    }
    dist
}

/// 对 `dist` 沿 `axis` 的每一条一维数据执行 `op`.
fn for_each_lane<F>(dist: &mut Array3<f64>, axis: Axis, op: F)
where
    F: Fn(ArrayViewMut1<f64>) + Send + Sync,
{
    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            Zip::from(dist.lanes_mut(axis)).par_for_each(op);
        } else {
            Zip::from(dist.lanes_mut(axis)).for_each(op);
        }
    }
}

/// 一维平方距离变换, 原地更新 `lane`.
///
/// 第 `q` 个元素位于 `q * weight` 处. 结果为
/// `min_p ((q - p) * weight)^2 + f(p)`, 其中 `f` 为 `lane` 的原值.
/// 非有限值 (无穷远) 不参与下包络.
fn transform_lane(mut lane: ArrayViewMut1<f64>, weight: f64) {
    let f = lane.to_vec();
    let n = f.len();
    let Some(first) = f.iter().position(|d| d.is_finite()) else {
        return;
    };
    let pos = |q: usize| q as f64 * weight;
    // 抛物线 q 与 p 的交点横坐标.
    let meet = |q: usize, p: usize| {
        let (xq, xp) = (pos(q), pos(p));
        ((f[q] + xq * xq) - (f[p] + xp * xp)) / (2.0 * (xq - xp))
    };

    // 下包络中的抛物线顶点, 以及各自的管辖区间边界.
    let mut v = Vec::with_capacity(n);
    let mut z = Vec::with_capacity(n + 1);
    v.push(first);
    z.push(f64::NEG_INFINITY);
    z.push(f64::INFINITY);
    for q in first + 1..n {
        if !f[q].is_finite() {
            continue;
        }
        let mut s = meet(q, v[v.len() - 1]);
        // z[0] 为负无穷, 因此 v 不会被弹空.
        while s <= z[v.len() - 1] {
            v.pop();
            z.pop();
            s = meet(q, v[v.len() - 1]);
        }
        let last = z.len() - 1;
        z[last] = s;
        v.push(q);
        z.push(f64::INFINITY);
    }

    let mut k = 0;
    for (p, out) in lane.iter_mut().enumerate() {
        let xp = pos(p);
        while z[k + 1] < xp {
            k += 1;
        }
        let d = xp - pos(v[k]);
        *out = d * d + f[v[k]];
    }
}
