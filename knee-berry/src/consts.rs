//! 通用常量.

/// 单通道颜色.
pub mod gray {
    /// 标签/掩码中, 背景的体素值.
    pub const BACKGROUND: u8 = 0;

    /// 二值掩码中, 前景的体素值.
    pub const FOREGROUND: u8 = 1;

    /// 骨骼标签中, 胫骨的体素值.
    pub const TIBIA: u8 = 1;

    /// 骨骼标签中, 股骨的体素值.
    pub const FEMUR: u8 = 2;

    /// 单通道黑色.
    pub const BLACK: u8 = 0b_0000_0000;

    /// 单通道灰色.
    pub const GRAY: u8 = 0b_1000_0000;

    /// 单通道白色.
    pub const WHITE: u8 = 0b_1111_1111;

    /// 体素是否是背景?
    #[inline]
    pub const fn is_background(p: u8) -> bool {
        matches!(p, BACKGROUND)
    }

    /// 体素是否是前景? 任意非零值都视为前景.
    #[inline]
    pub const fn is_foreground(p: u8) -> bool {
        !is_background(p)
    }
}

/// 骨骼 CT HU 阈值下限 (含).
pub const BONE_HU_LOWER: f64 = 260.0;

/// 骨骼 CT HU 阈值上限 (含).
pub const BONE_HU_UPPER: f64 = 3000.0;

/// 形态学闭运算的球形结构元半径, 以体素为单位.
pub const CLOSING_RADIUS: usize = 2;

/// 胫骨/股骨切分位置相对于 `len_z / 2` 的默认偏移 (向近端方向).
pub const SPLIT_OFFSET: usize = 5;
