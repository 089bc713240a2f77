//! 运行结果.

use knee_berry::landmark::{Landmark, LandmarkTable};
use std::io::{self, Write};
use std::path::PathBuf;

/// 将单个标志点写进 `w` 中.
fn describe_landmark<W: Write>(side: &str, lm: &Landmark, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";
    let [x, y, z] = lm.voxel;
    let [px, py, pz] = lm.physical;
    writeln!(
        w,
        "{S4}{side}: voxel ({x}, {y}, {z}), physical ({px:.2}, {py:.2}, {pz:.2}) mm"
    )
}

/// 流水线最终结果.
#[derive(Debug, Default)]
pub struct PipelineResult {
    /// 胫骨/股骨切分索引. 只做标志点时为 `None`.
    pub split_index: Option<usize>,

    /// 所有写入的文件, 按写入顺序.
    pub written: Vec<PathBuf>,

    /// 各变体的标志点.
    pub landmarks: LandmarkTable,
}

impl PipelineResult {
    /// 将运行结果写进 `w` 中.
    pub fn describe_into<W: Write>(&self, w: &mut W) -> io::Result<()> {
        if let Some(split) = self.split_index {
            writeln!(w, "Tibia/femur split at slice {split}")?;
        }
        utils::sep_to(&mut *w)?;
        for (name, pair) in self.landmarks.rows() {
            writeln!(w, "Landmarks `{name}`:")?;
            describe_landmark("medial", &pair.medial, w)?;
            describe_landmark("lateral", &pair.lateral, w)?;
        }
        utils::sep_to(&mut *w)?;
        writeln!(w, "{} files written:", self.written.len())?;
        for path in &self.written {
            writeln!(w, "    {}", path.display())?;
        }
        Ok(())
    }

    /// 分析运行结果.
    pub fn analyze(&self) -> io::Result<()> {
        utils::sep();
        let stdout = io::stdout();
        self.describe_into(&mut stdout.lock())?;
        utils::sep();
        Ok(())
    }
}
