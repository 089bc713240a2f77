use crate::consts::gray::{FEMUR, TIBIA};

/// 骨骼标签的叠加配色, 分量取值 `[0, 1]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Palette {
    /// 胫骨颜色.
    pub tibia: [f32; 3],

    /// 股骨颜色.
    pub femur: [f32; 3],
}

impl Palette {
    /// 分割结果配色: 胫骨浅红, 股骨浅绿.
    pub const SEGMENTED: Palette = Palette {
        tibia: [1.0, 0.5, 0.5],
        femur: [0.5, 1.0, 0.5],
    };

    /// 随机扩张结果配色: 胫骨蓝, 股骨绿.
    pub const RANDOMIZED: Palette = Palette {
        tibia: [0.4, 0.8, 1.0],
        femur: [0.5, 1.0, 0.5],
    };

    /// 标签 `label` 的颜色. 背景及未知标签为黑色.
    #[inline]
    pub fn color_of(&self, label: u8) -> [f32; 3] {
        match label {
            TIBIA => self.tibia,
            FEMUR => self.femur,
            _ => [0.0; 3],
        }
    }
}

impl Default for Palette {
    #[inline]
    fn default() -> Self {
        Self::SEGMENTED
    }
}
