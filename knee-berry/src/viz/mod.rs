//! 冠状面可视化.
//!
//! 所有图像都取自体数据中间行 `h = H / 2` 的冠状面, 图像的行对应切片 (z), 列对应宽 (w).
//! CT 先做 min-max 规范化, 再与标签颜色各按 50% 混合.

use crate::consts::gray::*;
use crate::error::{BoneError, BoneResult};
use crate::{BinaryMask, BoneLabel, CtScan, CtWindow, ImgWriteVis, NiftiHeaderAttr, ScanSlice};
use image::{GrayImage, Luma, Rgb, RgbImage};

mod palette;

pub use palette::Palette;

/// 标签颜色的混合权重.
pub const OVERLAY_ALPHA: f32 = 0.5;

/// 掩码叠加的默认颜色 (黄).
pub const MASK_COLOR: [f32; 3] = [1.0, 1.0, 0.0];

/// 并排展示时, 相邻面板之间的间隔 (像素).
pub const STRIP_GAP: u32 = 4;

/// 冠状面中间行.
#[inline]
fn mid_row<T: NiftiHeaderAttr>(volume: &T) -> usize {
    volume.shape().1 / 2
}

/// min-max 规范化后的单位灰度. 图像恒定或无有限值时全为 0.
fn unit_gray(slice: &ScanSlice) -> impl Fn(f32) -> f32 {
    let window = slice
        .min_max()
        .and_then(|(lo, hi)| CtWindow::from_range(lo, hi));
    move |hu| {
        window
            .and_then(|w| w.eval_unit(hu))
            .unwrap_or(0.0)
    }
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[inline]
fn blend(gray: f32, color: [f32; 3]) -> Rgb<u8> {
    Rgb(color.map(|c| to_u8((1.0 - OVERLAY_ALPHA) * gray + OVERLAY_ALPHA * c)))
}

/// CT 冠状面与骨骼标签的叠加图. 整幅图都参与混合, 因而背景区域会变暗.
///
/// 形状不一致时返回 `Err(BoneError::ShapeMismatch)`.
pub fn label_overlay(scan: &CtScan, label: &BoneLabel, palette: &Palette) -> BoneResult<RgbImage> {
    scan.ensure_same_shape(label)?;
    let h = mid_row(scan);
    let ct = scan.coronal_at(h);
    let lab = label.coronal_at(h);
    let gray = unit_gray(&ct);

    let (rows, cols) = ct.shape();
    let mut buf = RgbImage::new(cols as u32, rows as u32);
    for ((r, c), &hu) in ct.indexed_iter() {
        let px = blend(gray(hu), palette.color_of(lab[(r, c)]));
        buf.put_pixel(c as u32, r as u32, px);
    }
    Ok(buf)
}

/// CT 冠状面与单个掩码的叠加图. 只有前景处与 `color` 混合, 其余为原灰度.
///
/// 形状不一致时返回 `Err(BoneError::ShapeMismatch)`.
pub fn mask_overlay(scan: &CtScan, mask: &BinaryMask, color: [f32; 3]) -> BoneResult<RgbImage> {
    scan.ensure_same_shape(mask)?;
    let h = mid_row(scan);
    let ct = scan.coronal_at(h);
    let fg = mask.coronal_at(h);
    let gray = unit_gray(&ct);

    let (rows, cols) = ct.shape();
    let mut buf = RgbImage::new(cols as u32, rows as u32);
    for ((r, c), &hu) in ct.indexed_iter() {
        let g = gray(hu);
        let px = if is_foreground(fg[(r, c)]) {
            blend(g, color)
        } else {
            Rgb([to_u8(g); 3])
        };
        buf.put_pixel(c as u32, r as u32, px);
    }
    Ok(buf)
}

/// 掩码冠状面本身: 前景白色, 背景黑色.
#[inline]
pub fn mask_only(mask: &BinaryMask) -> GrayImage {
    mask.coronal_at(mid_row(mask)).to_gray_image()
}

/// 多个掩码的冠状面从左到右并排, 中间以灰色间隔分开.
///
/// `masks` 为空时返回 0x0 图像; 形状不一致时返回 `Err(BoneError::ShapeMismatch)`.
pub fn mask_strip(masks: &[&BinaryMask]) -> BoneResult<GrayImage> {
    let Some(first) = masks.first() else {
        return Ok(GrayImage::new(0, 0));
    };
    for mask in &masks[1..] {
        first.ensure_same_shape(*mask)?;
    }
    let panels: Vec<_> = masks.iter().map(|m| mask_only(m)).collect();
    let (w, h) = panels[0].dimensions();
    let n = panels.len() as u32;
    let mut buf = GrayImage::from_pixel(n * w + (n - 1) * STRIP_GAP, h, Luma([GRAY]));
    for (i, panel) in panels.iter().enumerate() {
        let x0 = i as u32 * (w + STRIP_GAP);
        for (x, y, px) in panel.enumerate_pixels() {
            buf.put_pixel(x0 + x, y, *px);
        }
    }
    Ok(buf)
}

/// 保存 RGB 图像. 父目录不存在时会被创建.
pub fn save_rgb<P: AsRef<std::path::Path>>(img: &RgbImage, path: P) -> BoneResult<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    img.save(path).map_err(BoneError::from)
}

/// 保存单通道图像. 父目录不存在时会被创建.
pub fn save_gray<P: AsRef<std::path::Path>>(img: &GrayImage, path: P) -> BoneResult<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    img.save(path).map_err(BoneError::from)
}
