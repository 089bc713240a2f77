//! 膝关节骨骼阈值分割.
//!
//! 流程: HU 阈值 -> 球形结构元闭运算 -> 沿 z 轴切分为胫骨 (远端) 与股骨 (近端).

use crate::consts::gray::*;
use crate::consts::{BONE_HU_LOWER, BONE_HU_UPPER, CLOSING_RADIUS, SPLIT_OFFSET};
use crate::error::{BoneError, BoneResult};
use crate::morph_3d::BallRadius;
use crate::{BinaryMask, BoneLabel, CtScan, NiftiHeaderAttr};
use log::{debug, info, warn};
use ndarray::s;
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 胫骨/股骨的切分位置. 索引 `>= split` 的切片属于胫骨, 其余属于股骨.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SliceSplit {
    /// `len_z / 2 - offset`, 在 0 处截断.
    HalfMinus(usize),

    /// 固定切片索引, 超出切片个数时截断为切片个数.
    At(usize),
}

impl Default for SliceSplit {
    #[inline]
    fn default() -> Self {
        Self::HalfMinus(SPLIT_OFFSET)
    }
}

impl SliceSplit {
    /// 对于 `len_z` 个切片的体数据, 求切分索引.
    #[inline]
    pub fn index(&self, len_z: usize) -> usize {
        match *self {
            Self::HalfMinus(offset) => (len_z / 2).saturating_sub(offset),
            Self::At(index) => index.min(len_z),
        }
    }
}

/// 分割参数.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SegmentParams {
    /// HU 阈值下限 (含).
    pub lower_hu: f64,

    /// HU 阈值上限 (含).
    pub upper_hu: f64,

    /// 闭运算球形结构元半径 (体素).
    pub closing_radius: usize,

    /// 胫骨/股骨切分位置.
    pub split: SliceSplit,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self {
            lower_hu: BONE_HU_LOWER,
            upper_hu: BONE_HU_UPPER,
            closing_radius: CLOSING_RADIUS,
            split: SliceSplit::default(),
        }
    }
}

/// 分割结果. 三者共享源 CT 的空间信息.
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// 组合标签: 胫骨为 `TIBIA`, 股骨为 `FEMUR`.
    pub label: BoneLabel,

    /// 胫骨掩码.
    pub tibia: BinaryMask,

    /// 股骨掩码.
    pub femur: BinaryMask,

    /// 实际使用的切分索引.
    pub split_index: usize,
}

impl Segmentation {
    /// 组合标签的文件名.
    pub const LABEL_FILE: &'static str = "bone_segmented.nii.gz";

    /// 胫骨掩码的文件名.
    pub const TIBIA_FILE: &'static str = "mask_tibia.nii.gz";

    /// 股骨掩码的文件名.
    pub const FEMUR_FILE: &'static str = "mask_femur.nii.gz";

    /// 将组合标签、胫骨掩码、股骨掩码依次保存到 `dir` 目录下. 目录不存在时会被创建.
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> BoneResult<()> {
        let dir = dir.as_ref();
        self.label.save(dir.join(Self::LABEL_FILE))?;
        self.tibia.save(dir.join(Self::TIBIA_FILE))?;
        self.femur.save(dir.join(Self::FEMUR_FILE))?;
        info!("Segmentation saved to `{}`", dir.display());
        Ok(())
    }
}

impl CtScan {
    /// HU 值位于 `[lower, upper]` (两端都含) 的体素记为前景. NaN 记为背景.
    ///
    /// `lower > upper` 或任一端为 NaN 时返回 `Err(BoneError::InvalidThreshold)`.
    pub fn threshold(&self, lower: f64, upper: f64) -> BoneResult<BinaryMask> {
        if lower.is_nan() || upper.is_nan() || lower > upper {
            return Err(BoneError::InvalidThreshold(lower, upper));
        }
        let range = lower..=upper;
        let data = self.data().mapv(|hu| u8::from(range.contains(&(hu as f64))));
        Ok(BinaryMask::from_parts(self.header(), data))
    }
}

/// 分割膝关节 CT 中的胫骨与股骨.
///
/// # 注意
///
/// 任一骨骼为空不是错误, 只会产生一条警告. 调用者需要自行检查.
pub fn segment_bones(scan: &CtScan, params: &SegmentParams) -> BoneResult<Segmentation> {
    let bone = scan.threshold(params.lower_hu, params.upper_hu)?;
    debug!(
        "Threshold [{}, {}] HU: {} voxels",
        params.lower_hu,
        params.upper_hu,
        bone.foreground_len()
    );
    let closed = bone.close(BallRadius::isotropic(params.closing_radius));

    let split_index = params.split.index(scan.len_z());
    info!("Splitting at slice {split_index} of {}", scan.len_z());

    let mut tibia = closed.data().to_owned();
    let mut femur = closed.data().to_owned();
    femur.slice_mut(s![split_index.., .., ..]).fill(BACKGROUND);
    tibia.slice_mut(s![..split_index, .., ..]).fill(BACKGROUND);

    let tibia = closed.with_data(tibia);
    let femur = closed.with_data(femur);
    let label = BoneLabel::compose(scan.header(), &tibia, &femur)?;

    let [_, n_tibia, n_femur] = label.numeric_statistics();
    info!("Segmented tibia: {n_tibia} voxels, femur: {n_femur} voxels");
    if tibia.is_empty() {
        warn!("Tibia mask is empty");
    }
    if femur.is_empty() {
        warn!("Femur mask is empty");
    }
    Ok(Segmentation {
        label,
        tibia,
        femur,
        split_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    /// 20 层, 中间一根 HU 为 700 的"骨柱", 第 12 层留有一个空洞.
    fn column_scan() -> CtScan {
        let mut data = Array3::<f32>::from_elem((20, 8, 8), -1000.0);
        data.slice_mut(s![.., 3..5, 3..5]).fill(700.0);
        data[(12, 3, 3)] = 0.0;
        CtScan::fake(data, [1.0, 0.8, 0.8])
    }

    #[test]
    fn test_split_index() {
        assert_eq!(SliceSplit::default().index(20), 5);
        assert_eq!(SliceSplit::HalfMinus(5).index(8), 0);
        assert_eq!(SliceSplit::HalfMinus(0).index(7), 3);
        assert_eq!(SliceSplit::At(3).index(20), 3);
        assert_eq!(SliceSplit::At(30).index(20), 20);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let data = Array3::from_shape_vec((1, 1, 5), vec![259.9, 260.0, 1000.0, 3000.0, 3000.1])
            .unwrap();
        let scan = CtScan::fake(data, [1.0; 3]);
        let mask = scan.threshold(BONE_HU_LOWER, BONE_HU_UPPER).unwrap();
        assert_eq!(mask.data().as_slice().unwrap(), &[0, 1, 1, 1, 0]);

        assert!(matches!(
            scan.threshold(10.0, 5.0),
            Err(BoneError::InvalidThreshold(..))
        ));
        assert!(scan.threshold(f64::NAN, 5.0).is_err());
    }

    #[test]
    fn test_segment_bones() {
        let scan = column_scan();
        let seg = segment_bones(&scan, &SegmentParams::default()).unwrap();
        assert_eq!(seg.split_index, 5);

        // 闭运算填补了空洞.
        assert_eq!(seg.tibia[(12, 3, 3)], FOREGROUND);

        // 切分: 近端 (< split) 为股骨, 远端为胫骨, 两者互斥.
        for z in 0..20 {
            let t = seg.tibia.axial_at(z).foreground_pos().count();
            let f = seg.femur.axial_at(z).foreground_pos().count();
            if z < 5 {
                assert_eq!((t, f), (0, 4));
            } else {
                assert_eq!((t, f), (4, 0));
            }
        }
        assert_eq!(seg.label.numeric_statistics(), [20 * 64 - 80, 60, 20]);
        assert_eq!(seg.label.pix_dim(), scan.pix_dim());
        assert_eq!(seg.tibia.lps_transform(), scan.lps_transform());
    }

    #[test]
    fn test_segment_without_bone() {
        let scan = CtScan::fake(Array3::from_elem((4, 4, 4), -1000.0), [1.0; 3]);
        let seg = segment_bones(&scan, &SegmentParams::default()).unwrap();
        assert!(seg.tibia.is_empty());
        assert!(seg.femur.is_empty());
    }

    #[test]
    fn test_segmentation_save() {
        let scan = column_scan();
        let seg = segment_bones(&scan, &SegmentParams::default()).unwrap();
        let dir = std::env::temp_dir().join(format!("knee-berry-seg-{}", std::process::id()));
        seg.save(&dir).unwrap();

        let label = BoneLabel::open(dir.join(Segmentation::LABEL_FILE)).unwrap();
        assert_eq!(label.data(), seg.label.data());
        let tibia = BinaryMask::open(dir.join(Segmentation::TIBIA_FILE)).unwrap();
        assert_eq!(tibia.data(), seg.tibia.data());
        std::fs::remove_dir_all(dir).ok();
    }
}
