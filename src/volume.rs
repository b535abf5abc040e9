//! NIfTI ボリュームの読み込み
//!
//! 配列は NIfTI の格納順 `[x, y, z]` のまま保持する。

use crate::error::{QcError, Result};
use ndarray::{s, Array3, ArrayD, Axis, Ix3};
use nifti::{IntoNdArray, NiftiObject, ReaderOptions};
use std::path::Path;

/// 3D 画像ボリューム
#[derive(Debug, Clone)]
pub struct Volume {
    data: Array3<f32>,
    /// ボクセルサイズ (mm) `[x, y, z]`
    voxel_mm: [f32; 3],
}

/// 2値マスク
#[derive(Debug, Clone)]
pub struct Mask {
    data: Array3<bool>,
    voxel_mm: [f32; 3],
}

/// 各軸の閉区間 `[lo, hi]`
pub type BoundingBox = [(usize, usize); 3];

fn load_error(path: &Path, reason: impl ToString) -> QcError {
    QcError::VolumeLoad {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// 4次元目が 1 のボリュームは 3D に落とす
fn squeeze_to_3d(data: ArrayD<f32>) -> std::result::Result<Array3<f32>, String> {
    let data = match data.ndim() {
        3 => data,
        4 if data.shape()[3] == 1 => data.index_axis_move(Axis(3), 0),
        _ => return Err(format!("3D ボリュームではありません: shape {:?}", data.shape())),
    };
    data.into_dimensionality::<Ix3>().map_err(|e| e.to_string())
}

impl Volume {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(QcError::FileNotFound(path.display().to_string()));
        }
        let obj = ReaderOptions::new()
            .read_file(path)
            .map_err(|e| load_error(path, e))?;

        let pixdim = obj.header().pixdim;
        let voxel_mm = [pixdim[1], pixdim[2], pixdim[3]].map(|d| {
            let d = d.abs();
            if d.is_finite() && d > 0.0 {
                d
            } else {
                1.0
            }
        });

        let data = obj
            .into_volume()
            .into_ndarray::<f32>()
            .map_err(|e| load_error(path, e))?;
        let data = squeeze_to_3d(data).map_err(|e| load_error(path, e))?;

        Ok(Self { data, voxel_mm })
    }

    pub fn from_array(data: Array3<f32>, voxel_mm: [f32; 3]) -> Self {
        Self { data, voxel_mm }
    }

    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    pub fn voxel_mm(&self) -> [f32; 3] {
        self.voxel_mm
    }

    pub fn shape(&self) -> [usize; 3] {
        let (x, y, z) = self.data.dim();
        [x, y, z]
    }

    pub fn crop(&self, bbox: &BoundingBox) -> Self {
        let [(x0, x1), (y0, y1), (z0, z1)] = *bbox;
        Self {
            data: self.data.slice(s![x0..=x1, y0..=y1, z0..=z1]).to_owned(),
            voxel_mm: self.voxel_mm,
        }
    }
}

impl Mask {
    /// 0 より大きいボクセルを前景とする
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_volume(&Volume::open(path)?))
    }

    pub fn from_volume(volume: &Volume) -> Self {
        Self {
            data: volume.data.mapv(|v| v > 0.0),
            voxel_mm: volume.voxel_mm,
        }
    }

    pub fn data(&self) -> &Array3<bool> {
        &self.data
    }

    pub fn shape(&self) -> [usize; 3] {
        let (x, y, z) = self.data.dim();
        [x, y, z]
    }

    pub fn voxel_count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// マスク体積 (mL)
    pub fn volume_ml(&self) -> f64 {
        let voxel: f64 = self.voxel_mm.iter().map(|&d| d as f64).product();
        self.voxel_count() as f64 * voxel / 1000.0
    }

    /// 前景の外接直方体。空マスクなら None。
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut bbox: Option<BoundingBox> = None;
        for ((x, y, z), &v) in self.data.indexed_iter() {
            if !v {
                continue;
            }
            let b = bbox.get_or_insert([(x, x), (y, y), (z, z)]);
            for (axis, i) in [x, y, z].into_iter().enumerate() {
                b[axis].0 = b[axis].0.min(i);
                b[axis].1 = b[axis].1.max(i);
            }
        }
        bbox
    }

    /// 外接直方体を `boundary_mm` だけ広げる（ボリューム範囲でクリップ）
    pub fn padded_bounding_box(&self, boundary_mm: f32) -> Option<BoundingBox> {
        let mut bbox = self.bounding_box()?;
        let shape = self.shape();
        for axis in 0..3 {
            // 極端な値は `as usize` で飽和するので加算も飽和させる
            let pad = (boundary_mm.max(0.0) / self.voxel_mm[axis]).ceil() as usize;
            let pad = pad.min(shape[axis]);
            bbox[axis].0 = bbox[axis].0.saturating_sub(pad);
            bbox[axis].1 = bbox[axis].1.saturating_add(pad).min(shape[axis] - 1);
        }
        Some(bbox)
    }

    pub fn crop(&self, bbox: &BoundingBox) -> Self {
        let [(x0, x1), (y0, y1), (z0, z1)] = *bbox;
        Self {
            data: self.data.slice(s![x0..=x1, y0..=y1, z0..=z1]).to_owned(),
            voxel_mm: self.voxel_mm,
        }
    }
}
