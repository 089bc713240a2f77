//! 可复现的随机扩张.

use crate::consts::gray::is_foreground;
use crate::error::{BoneError, BoneResult};
use crate::morph_3d::squared_edt;
use crate::{BinaryMask, NiftiHeaderAttr};
use log::debug;
use ndarray::Zip;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 检查扩张距离是否为非负有限值.
#[inline]
pub(crate) fn check_distance(mm: f64) -> BoneResult<f64> {
    if mm.is_finite() && mm >= 0.0 {
        Ok(mm)
    } else {
        Err(BoneError::InvalidDistance(mm))
    }
}

/// 从 `[0, max_mm)` 中均匀抽取一个半径. `max_mm` 为 0 时总是返回 0.
///
/// 每次调用都会新建局部的随机数生成器: `seed` 为 `Some` 时结果可复现,
/// 为 `None` 时从系统熵源初始化.
///
/// # 注意
///
/// `StdRng` 的算法不保证在 `rand` 的不同版本之间一致:
/// 同一 `seed` 只在锁定的 `rand` 版本 (`Cargo.lock`) 下给出相同半径.
pub fn draw_radius(max_mm: f64, seed: Option<u64>) -> BoneResult<f64> {
    let max_mm = check_distance(max_mm)?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    Ok(rng.gen::<f64>() * max_mm)
}

impl BinaryMask {
    /// 将所有到前景的物理距离不超过 `radius_mm` 的背景体素并入前景.
    ///
    /// 距离为体素中心之间的欧氏距离, 按分辨率换算为毫米.
    pub fn expand_within(&self, radius_mm: f64) -> BoneResult<BinaryMask> {
        let spacing = self.checked_spacing()?;
        let radius_mm = check_distance(radius_mm)?;
        let limit = radius_mm * radius_mm;
        let dist = squared_edt(self.data(), spacing);
        let data = Zip::from(self.data())
            .and(&dist)
            .map_collect(|&p, &d| u8::from(is_foreground(p) || d <= limit));
        Ok(self.with_data(data))
    }

    /// 随机扩张: 从 `[0, max_mm)` 抽取半径 `r` (见 [`draw_radius`]), 然后执行
    /// [`Self::expand_within`]. 相同 `seed` 总是得到相同的结果.
    ///
    /// # 注意
    ///
    /// 结果总是包含原掩码, 并且被 `self.expand_mm(max_mm)` 包含.
    pub fn randomize(&self, max_mm: f64, seed: Option<u64>) -> BoneResult<BinaryMask> {
        self.checked_spacing()?;
        let r = draw_radius(max_mm, seed)?;
        debug!("Randomized expansion: r = {r:.4} mm (max {max_mm} mm, seed {seed:?})");
        self.expand_within(r)
    }
}
