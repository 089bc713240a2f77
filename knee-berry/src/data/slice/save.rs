//! 图像的持久化存储.

use crate::consts::gray::*;
use crate::MaskSlice;
use image::{GrayImage, ImageResult, Luma};
use std::path::Path;

/// 表明一个可以通过 **可视化友好** 模式持久化存储的图像对象.
///
/// `ImgWriteVis` trait 的意图是, 图像将以 "可视化友好"
/// 的方式保存, 而不是 "as is" 的方式. 对于 `MaskSlice`
/// 这类仅存在少数像素值的图像, 在保存时会映射到肉眼较易能区分的形式.
pub trait ImgWriteVis {
    /// 转化为可视化友好的单通道图像.
    fn to_gray_image(&self) -> GrayImage;

    /// 按照一定的可视化规则将图片保存到 `path` 路径.
    #[inline]
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        self.to_gray_image().save(path)
    }
}

/// 使像素更有利于单通道可视化.
#[inline]
pub(crate) fn pretty(label: u8) -> u8 {
    match label {
        BACKGROUND => BLACK,
        TIBIA => WHITE,
        // 股骨与胫骨区分开
        FEMUR => GRAY,
        _ => WHITE,
    }
}

/// 背景/胫骨 (或二值前景)/股骨分别映射为黑色/白色/灰色.
impl ImgWriteVis for MaskSlice<'_> {
    fn to_gray_image(&self) -> GrayImage {
        let (height, width) = self.shape();
        let mut buf = GrayImage::new(width as u32, height as u32);
        for ((h, w), &pix) in self.indexed_iter() {
            buf.put_pixel(w as u32, h as u32, Luma([pretty(pix)]));
        }
        buf
    }
}
