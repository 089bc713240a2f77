//! 确定性扩张.

use crate::error::BoneResult;
use crate::morph_3d::BallRadius;
use crate::{BinaryMask, NiftiHeaderAttr};
use log::debug;

impl BinaryMask {
    /// 以物理距离 `mm` 膨胀掩码. 各轴体素半径为 `ceil(mm / spacing)`, 结构元为球.
    ///
    /// 结果总是包含原掩码, 且与原掩码共享空间信息.
    ///
    /// # 注意
    ///
    /// 1. 分辨率存在非正分量时返回 `Err(BoneError::NonPositiveSpacing)`.
    /// 2. `mm` 为负数或非有限值时返回 `Err(BoneError::InvalidDistance)`.
    pub fn expand_mm(&self, mm: f64) -> BoneResult<BinaryMask> {
        let spacing = self.checked_spacing()?;
        let radius = BallRadius::from_mm(mm, spacing)?;
        debug!("Expand by {mm} mm, voxel radius (z, h, w) = {:?}", radius.radii());
        Ok(self.dilate(radius))
    }
}
