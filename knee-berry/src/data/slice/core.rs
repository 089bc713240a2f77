use crate::consts::gray::*;
use crate::Idx2d;
use ndarray::ArrayView2;
use std::ops::Index;

/// 不可变、借用的二维掩码/标签切片. 可以是水平切片, 也可以是冠状面.
#[derive(Clone, Debug)]
pub struct MaskSlice<'a> {
    /// 底层数据的轻量级视图, 借用于 [`crate::BinaryMask`] 或 [`crate::BoneLabel`].
    data: ArrayView2<'a, u8>,
}

impl Index<Idx2d> for MaskSlice<'_> {
    type Output = u8;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

impl<'a> MaskSlice<'a> {
    /// 直接初始化.
    #[inline]
    pub(crate) fn new(data: ArrayView2<'a, u8>) -> Self {
        Self { data }
    }

    /// 该图是否为全背景图?
    #[inline]
    pub fn is_background(&self) -> bool {
        self.data.iter().copied().all(is_background)
    }

    /// 图像的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 以行优先规则, 获取能迭代图像所有 `(索引, 像素值)` 的迭代器.
    #[inline]
    pub fn indexed_iter(&self) -> impl Iterator<Item = (Idx2d, &u8)> {
        self.data.indexed_iter()
    }

    /// 以行优先规则, 获取能迭代所有前景像素位置的迭代器.
    #[inline]
    pub fn foreground_pos(&self) -> impl Iterator<Item = Idx2d> + '_ {
        self.indexed_iter()
            .filter(|&(_, &p)| is_foreground(p))
            .map(|(pos, _)| pos)
    }
}

/// 不可变、借用的二维 CT 扫描切片 (HU). 可以是水平切片, 也可以是冠状面.
#[derive(Clone, Debug)]
pub struct ScanSlice<'a> {
    /// 底层数据的轻量级视图, 借用于 [`crate::CtScan`].
    data: ArrayView2<'a, f32>,
}

impl<'a> ScanSlice<'a> {
    /// 直接初始化.
    #[inline]
    pub(crate) fn new(data: ArrayView2<'a, f32>) -> Self {
        Self { data }
    }

    /// 图像的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 以行优先规则, 获取能迭代图像所有 `(索引, CT HU 值)` 的迭代器.
    #[inline]
    pub fn indexed_iter(&self) -> impl Iterator<Item = (Idx2d, &f32)> {
        self.data.indexed_iter()
    }

    /// 有限 HU 值的 (最小值, 最大值). 若不存在有限值, 则返回 `None`.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
