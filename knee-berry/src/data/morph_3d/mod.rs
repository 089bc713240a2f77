//! 3D 形态学操作.
//!
//! 结构元为 (可各向异性的) 球体: 半径为 `[rz, rh, rw]` 时, 偏移 `(dz, dh, dw)`
//! 属于结构元当且仅当 `Σ (d_i / (r_i + 0.5))² <= 1`. 膨胀借助加权的精确距离变换实现,
//! 腐蚀为补集膨胀的补集. 闭运算在补齐背景边界的体数据上进行.

use crate::consts::gray::*;
use crate::error::{BoneError, BoneResult};
use crate::BinaryMask;
use ndarray::{s, Array3, ArrayView3};

pub use edt::squared_edt;

mod edt;

/// 浮点比较容差.
const BALL_EPS: f64 = 1e-9;

/// 球形结构元三个轴 (z, h, w) 上的体素半径.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BallRadius(pub [usize; 3]);

impl BallRadius {
    /// 各向同性球.
    #[inline]
    pub const fn isotropic(r: usize) -> Self {
        Self([r; 3])
    }

    /// 将物理距离 `mm` 按分辨率 `spacing` (\[z, h, w\], 毫米) 换算为体素半径,
    /// 每个轴取 `ceil(mm / spacing)`.
    ///
    /// # 注意
    ///
    /// 1. `mm` 为负数或非有限值时返回 `Err(BoneError::InvalidDistance)`.
    /// 2. `spacing` 存在非正分量时返回 `Err(BoneError::NonPositiveSpacing)`.
    pub fn from_mm(mm: f64, spacing: [f64; 3]) -> BoneResult<Self> {
        if !(mm.is_finite() && mm >= 0.0) {
            return Err(BoneError::InvalidDistance(mm));
        }
        if !spacing.iter().all(|s| s.is_finite() && *s > 0.0) {
            return Err(BoneError::NonPositiveSpacing(spacing));
        }
        Ok(Self(spacing.map(|s| (mm / s).ceil() as usize)))
    }

    /// 三个轴的半径.
    #[inline]
    pub const fn radii(&self) -> [usize; 3] {
        self.0
    }

    /// 是否为单点结构元?
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|r| *r == 0)
    }

    /// 距离变换的各轴权重. 将结构元映射为加权空间中的单位球.
    #[inline]
    fn weights(&self) -> [f64; 3] {
        self.0.map(|r| 1.0 / (r as f64 + 0.5))
    }
}

/// 以球形结构元 `radius` 膨胀 `mask`. 输出值只有 0 和 1.
pub fn dilate(mask: ArrayView3<u8>, radius: BallRadius) -> Array3<u8> {
    if radius.is_zero() {
        return mask.mapv(|p| u8::from(is_foreground(p)));
    }
    squared_edt(mask, radius.weights()).mapv(|d| u8::from(d <= 1.0 + BALL_EPS))
}

/// 以球形结构元 `radius` 腐蚀 `mask`. 输出值只有 0 和 1.
///
/// 体数据之外视为前景, 因此贴边的前景不会被边界腐蚀.
pub fn erode(mask: ArrayView3<u8>, radius: BallRadius) -> Array3<u8> {
    let complement = mask.mapv(|p| u8::from(is_background(p)));
    dilate(complement.view(), radius).mapv(|p| u8::from(is_background(p)))
}

/// 闭运算: 先膨胀后腐蚀. 结果总是包含原前景.
///
/// 运算前在每个轴两端各补 `radius` 层背景, 结束后裁回原形状.
/// 因此靠近边界的前景不会被一路延伸到体数据边缘.
pub fn close(mask: ArrayView3<u8>, radius: BallRadius) -> Array3<u8> {
    let [rz, rh, rw] = radius.radii();
    let (z, h, w) = mask.dim();
    let mut padded = Array3::<u8>::zeros((z + 2 * rz, h + 2 * rh, w + 2 * rw));
    padded
        .slice_mut(s![rz..rz + z, rh..rh + h, rw..rw + w])
        .assign(&mask);
    let closed = erode(dilate(padded.view(), radius).view(), radius);
    closed
        .slice(s![rz..rz + z, rh..rh + h, rw..rw + w])
        .to_owned()
}

impl BinaryMask {
    /// 以球形结构元 `radius` 膨胀, 空间信息不变.
    #[inline]
    pub fn dilate(&self, radius: BallRadius) -> BinaryMask {
        self.with_data(dilate(self.data(), radius))
    }

    /// 以球形结构元 `radius` 做闭运算, 空间信息不变.
    #[inline]
    pub fn close(&self, radius: BallRadius) -> BinaryMask {
        self.with_data(close(self.data(), radius))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 偏移 `[dz, dh, dw]` 是否属于结构元?
    fn in_ball(radius: BallRadius, offset: [isize; 3]) -> bool {
        let sum: f64 = offset
            .iter()
            .zip(radius.weights())
            .map(|(d, w)| {
                let d = *d as f64 * w;
                d * d
            })
            .sum();
        sum <= 1.0 + BALL_EPS
    }

    fn brute_dilate(mask: &Array3<u8>, radius: BallRadius) -> Array3<u8> {
        let (nz, nh, nw) = mask.dim();
        let [rz, rh, rw] = radius.radii().map(|r| r as isize);
        let mut out = Array3::<u8>::zeros(mask.dim());
        for ((z, h, w), _) in mask.indexed_iter().filter(|&(_, &p)| p != 0) {
            for dz in -rz..=rz {
                for dh in -rh..=rh {
                    for dw in -rw..=rw {
                        if !in_ball(radius, [dz, dh, dw]) {
                            continue;
                        }
                        let (tz, th, tw) = (z as isize + dz, h as isize + dh, w as isize + dw);
                        if (0..nz as isize).contains(&tz)
                            && (0..nh as isize).contains(&th)
                            && (0..nw as isize).contains(&tw)
                        {
                            out[(tz as usize, th as usize, tw as usize)] = 1;
                        }
                    }
                }
            }
        }
        out
    }

    #[test]
    fn test_from_mm() {
        let r = BallRadius::from_mm(2.0, [3.0, 0.5, 0.7]).unwrap();
        assert_eq!(r.radii(), [1, 4, 3]);
        assert_eq!(BallRadius::from_mm(0.0, [1.0; 3]).unwrap(), BallRadius::default());
        assert!(matches!(
            BallRadius::from_mm(-1.0, [1.0; 3]),
            Err(BoneError::InvalidDistance(_))
        ));
        assert!(matches!(
            BallRadius::from_mm(1.0, [1.0, -1.0, 1.0]),
            Err(BoneError::NonPositiveSpacing(_))
        ));
    }

    #[test]
    fn test_ball_shape() {
        let r = BallRadius::isotropic(2);
        assert!(in_ball(r, [0, 0, 2]));
        assert!(in_ball(r, [1, 1, 1]));
        assert!(!in_ball(r, [0, 0, 3]));
        assert!(!in_ball(r, [2, 2, 0]));

        // 半径为 0 的轴上不允许偏移.
        let flat = BallRadius([0, 1, 1]);
        assert!(in_ball(flat, [0, 1, 0]));
        assert!(!in_ball(flat, [1, 0, 0]));
    }

    #[test]
    fn test_dilate_matches_brute_force() {
        let mut mask = Array3::<u8>::zeros((7, 9, 8));
        mask[(3, 4, 4)] = 1;
        mask[(0, 0, 7)] = 1;
        mask.slice_mut(s![5, 6..8, 1..3]).fill(1);
        for radius in [
            BallRadius::isotropic(1),
            BallRadius::isotropic(2),
            BallRadius([1, 3, 2]),
            BallRadius([0, 2, 1]),
        ] {
            assert_eq!(dilate(mask.view(), radius), brute_dilate(&mask, radius));
        }
    }

    #[test]
    fn test_close_fills_gap() {
        // 两块被一层空隙隔开的实心块.
        let mut mask = Array3::<u8>::zeros((9, 9, 9));
        mask.slice_mut(s![2..7, 2..7, 2..4]).fill(1);
        mask.slice_mut(s![2..7, 2..7, 5..7]).fill(1);
        let closed = close(mask.view(), BallRadius::isotropic(2));
        assert_eq!(closed[(4, 4, 4)], 1);
        // 闭运算是扩张性的.
        assert!(mask.iter().zip(closed.iter()).all(|(&a, &b)| a == 0 || b == 1));
        // 远离前景的背景保持不变.
        assert_eq!(closed[(0, 0, 0)], 0);
        assert_eq!(closed[(8, 8, 8)], 0);
    }

    #[test]
    fn test_close_near_border_adds_nothing() {
        let mut edge = Array3::<u8>::zeros((12, 12, 12));
        edge.slice_mut(s![.., 5, 1]).fill(1);
        let closed = close(edge.view(), BallRadius::isotropic(2));
        assert_eq!(closed, edge);
        assert_eq!(closed[(6, 5, 0)], 0);

        let mut inner = Array3::<u8>::zeros((12, 12, 12));
        inner.slice_mut(s![.., 5, 6]).fill(1);
        assert_eq!(close(inner.view(), BallRadius::isotropic(2)), inner);
    }

    #[test]
    fn test_close_anisotropic_radius_keeps_shape() {
        let mut mask = Array3::<u8>::zeros((4, 7, 9));
        mask.slice_mut(s![1..3, 2..5, 0..3]).fill(1);
        let closed = close(mask.view(), BallRadius([0, 1, 2]));
        assert_eq!(closed.dim(), mask.dim());
        assert!(mask.iter().zip(closed.iter()).all(|(&a, &b)| a == 0 || b == 1));
    }

    #[test]
    fn test_erode_border_is_foreground() {
        let mask = Array3::<u8>::ones((3, 3, 3));
        assert_eq!(erode(mask.view(), BallRadius::isotropic(2)), mask);

        let mut hollow = mask.clone();
        hollow[(1, 1, 1)] = 0;
        let eroded = erode(hollow.view(), BallRadius::isotropic(1));
        // 半径 1 的球为 18-邻域加中心.
        assert_eq!(eroded.iter().filter(|p| **p == 0).count(), 19);
    }

    #[test]
    fn test_zero_radius_is_identity() {
        let mut mask = Array3::<u8>::zeros((2, 2, 2));
        mask[(1, 0, 1)] = 5;
        let out = dilate(mask.view(), BallRadius::default());
        assert_eq!(out[(1, 0, 1)], 1);
        assert_eq!(out.iter().filter(|p| **p != 0).count(), 1);
    }
}
