//! 两个掩码组合为骨骼标签.

use crate::error::BoneResult;
use crate::{BinaryMask, BoneLabel, NiftiHeaderAttr};
use log::info;
use std::path::Path;

/// 以 `reference` 的空间信息组合两个掩码: `first` 的前景标为 `TIBIA` (1),
/// `second` 的前景标为 `FEMUR` (2), 重叠处以 `second` 为准.
///
/// 三者形状不一致时返回 `Err(BoneError::ShapeMismatch)`.
#[inline]
pub fn combine<R: NiftiHeaderAttr>(
    reference: &R,
    first: &BinaryMask,
    second: &BinaryMask,
) -> BoneResult<BoneLabel> {
    BoneLabel::compose(reference.header(), first, second)
}

/// 同 [`combine`], 并将结果保存到 `path`.
pub fn combine_and_save<R: NiftiHeaderAttr, P: AsRef<Path>>(
    reference: &R,
    first: &BinaryMask,
    second: &BinaryMask,
    path: P,
) -> BoneResult<BoneLabel> {
    let label = combine(reference, first, second)?;
    label.save(path.as_ref())?;
    info!("Combined label saved to `{}`", path.as_ref().display());
    Ok(label)
}
