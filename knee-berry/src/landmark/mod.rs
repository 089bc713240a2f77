//! 胫骨远端标志点.
//!
//! 在掩码最低 (z 索引最大) 的前景切片上, 取列索引最小的前景体素作为外侧点,
//! 列索引最大的作为内侧点. 列相同时取行索引最小者.

use crate::error::{BoneError, BoneResult};
use crate::{BinaryMask, Idx2d, MaskSlice, NiftiHeaderAttr, VoxelTransform};
use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod table;

pub use table::LandmarkTable;

/// 单个标志点.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Landmark {
    /// 体素索引 `[x, y, z]`, 即 (列, 行, 切片).
    pub voxel: [usize; 3],

    /// 物理坐标 (LPS+), 毫米.
    pub physical: [f64; 3],
}

impl Landmark {
    /// 由切片 `z` 上的 `(行, 列)` 位置构造.
    #[inline]
    fn at(z: usize, (row, col): Idx2d, transform: &VoxelTransform) -> Self {
        let voxel = [col, row, z];
        Self {
            voxel,
            physical: transform.apply(voxel),
        }
    }
}

/// 内侧点与外侧点.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LandmarkPair {
    /// 内侧点 (列索引最大).
    pub medial: Landmark,

    /// 外侧点 (列索引最小).
    pub lateral: Landmark,
}

/// 行优先扫描, 返回 (列最小, 列最大) 的前景位置. 只在严格更优时更新,
/// 因此列相同时保留行最小者.
fn extreme_columns(slice: &MaskSlice) -> Option<(Idx2d, Idx2d)> {
    let mut iter = slice.foreground_pos();
    let first = iter.next()?;
    let (mut lateral, mut medial) = (first, first);
    for pos in iter {
        if pos.1 < lateral.1 {
            lateral = pos;
        }
        if pos.1 > medial.1 {
            medial = pos;
        }
    }
    Some((lateral, medial))
}

impl BinaryMask {
    /// 含有前景的最低切片 (z 索引最大). 掩码为空时返回 `None`.
    pub fn lowest_slice(&self) -> Option<usize> {
        (0..self.len_z())
            .rev()
            .find(|z| !self.axial_at(*z).is_background())
    }

    /// 提取最低切片上的内侧/外侧标志点. 物理坐标由掩码自身的仿射 (LPS+) 换算.
    ///
    /// 掩码为空时返回 `Err(BoneError::EmptyMask)`.
    pub fn medial_lateral_lowest(&self) -> BoneResult<LandmarkPair> {
        let z = self.lowest_slice().ok_or(BoneError::EmptyMask)?;
        let (lateral, medial) =
            extreme_columns(&self.axial_at(z)).ok_or(BoneError::EmptyMask)?;
        let transform = self.lps_transform();
        let pair = LandmarkPair {
            medial: Landmark::at(z, medial, &transform),
            lateral: Landmark::at(z, lateral, &transform),
        };
        debug!(
            "Lowest slice {z}: medial {:?}, lateral {:?}",
            pair.medial.voxel, pair.lateral.voxel
        );
        Ok(pair)
    }
}
