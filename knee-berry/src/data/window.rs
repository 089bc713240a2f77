/// CT 窗口, 包含窗位 (window level) 和窗宽 (window width).
///
/// 该窗口是只读的. 若要修改窗口参数, 你应该创建新的实例.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CtWindow {
    level: f32,
    width: f32,
}

impl CtWindow {
    /// 构建一个恰好覆盖 `[min, max]` 的 CT 窗口, 即 min-max 规范化.
    ///
    /// 若 `min`, `max` 不是有限值或 `max <= min`, 则返回 `None`.
    pub fn from_range(min: f32, max: f32) -> Option<CtWindow> {
        if !(min.is_finite() && max.is_finite()) || max <= min {
            return None;
        }
        Some(Self {
            level: (min + max) / 2.0,
            width: max - min,
        })
    }

    /// 窗下限.
    #[inline]
    pub fn lower_bound(&self) -> f32 {
        self.level - self.width / 2.0
    }

    /// 窗上限.
    #[inline]
    pub fn upper_bound(&self) -> f32 {
        self.level + self.width / 2.0
    }

    /// 窗宽.
    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    /// 求在当前 CT 窗设置下, `ct` HU 值对应的单位灰度 (0.0 <= value <= 1.0).
    ///
    /// 如果 `ct` 无意义 (如 inf, NaN), 则返回 `None`.
    pub fn eval_unit(&self, ct: f32) -> Option<f32> {
        if !ct.is_finite() {
            return None;
        }
        let lb = self.lower_bound();
        if ct <= lb {
            Some(0.0)
        } else if ct >= self.upper_bound() {
            Some(1.0)
        } else {
            Some((ct - lb) / self.width())
        }
    }
}
