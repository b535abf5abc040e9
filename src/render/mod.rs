//! スナップショット描画
//!
//! マスク周辺を切り出し、3断面それぞれについて等間隔のスライスを
//! 素の画像とマスク輪郭付き画像の2枚ずつ PNG (base64) にする。

pub mod window;

pub use window::IntensityWindow;

use crate::error::{QcError, Result};
use crate::volume::{Mask, Volume};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgb, RgbImage};
use ndarray::{ArrayView2, Axis};
use std::io::Cursor;

/// 輝度窓に使う百分位数
const WINDOW_PERCENTILES: (f32, f32) = (0.5, 99.5);
/// 長辺のピクセル数
const TARGET_SIZE: f32 = 256.0;
const CONTOUR_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    Axial,
    Coronal,
    Sagittal,
}

impl Plane {
    pub const ALL: [Plane; 3] = [Plane::Axial, Plane::Coronal, Plane::Sagittal];

    pub fn name(&self) -> &'static str {
        match self {
            Plane::Axial => "axial",
            Plane::Coronal => "coronal",
            Plane::Sagittal => "sagittal",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Plane::Axial => "Axial",
            Plane::Coronal => "Coronal",
            Plane::Sagittal => "Sagittal",
        }
    }

    /// 断面の法線軸
    fn normal_axis(&self) -> usize {
        match self {
            Plane::Axial => 2,
            Plane::Coronal => 1,
            Plane::Sagittal => 0,
        }
    }

    /// (横, 縦) の軸
    fn in_plane_axes(&self) -> (usize, usize) {
        match self {
            Plane::Axial => (0, 1),
            Plane::Coronal => (0, 2),
            Plane::Sagittal => (1, 2),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub n_slices: usize,
    pub boundary_mm: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            n_slices: 7,
            boundary_mm: 15.0,
        }
    }
}

/// 1スライス分の画像（base64 PNG）
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// 元ボリューム上のスライス番号
    pub index: usize,
    pub plain: String,
    pub overlay: String,
}

#[derive(Debug, Clone)]
pub struct PlaneSnapshots {
    pub plane: Plane,
    pub snapshots: Vec<Snapshot>,
}

/// `[lo, hi]` の範囲から `n` 枚を等間隔に選ぶ（重複は除く）
pub fn slice_positions(lo: usize, hi: usize, n: usize) -> Vec<usize> {
    if n == 0 || hi < lo {
        return Vec::new();
    }
    if n == 1 {
        return vec![lo + (hi - lo) / 2];
    }
    let span = (hi - lo) as f64;
    let mut positions: Vec<usize> = (0..n)
        .map(|k| lo + (span * k as f64 / (n - 1) as f64).round() as usize)
        .collect();
    positions.dedup();
    positions
}

/// 前景画素のうち、4近傍に背景（または画像端）を持つもの
fn is_contour(mask: &ArrayView2<bool>, i: usize, j: usize) -> bool {
    if !mask[[i, j]] {
        return false;
    }
    let (w, h) = mask.dim();
    if i == 0 || j == 0 || i + 1 == w || j + 1 == h {
        return true;
    }
    !(mask[[i - 1, j]] && mask[[i + 1, j]] && mask[[i, j - 1]] && mask[[i, j + 1]])
}

/// 2D スライスを RGB 画像にする。上が頭側（前側）になるよう縦を反転する。
fn slice_to_image(
    image: &ArrayView2<f32>,
    mask: Option<&ArrayView2<bool>>,
    window: &IntensityWindow,
) -> RgbImage {
    let (w, h) = image.dim();
    let mut buf = RgbImage::new(w as u32, h as u32);
    for ((i, j), &v) in image.indexed_iter() {
        let pixel = match mask {
            Some(m) if is_contour(m, i, j) => CONTOUR_COLOR,
            _ => {
                let g = window.eval(v);
                Rgb([g, g, g])
            }
        };
        buf.put_pixel(i as u32, (h - 1 - j) as u32, pixel);
    }
    buf
}

/// ボクセルの縦横比を反映して正方ピクセルにリサイズする
fn resize_to_square_pixels(img: &RgbImage, spacing: (f32, f32)) -> RgbImage {
    let phys_w = img.width() as f32 * spacing.0;
    let phys_h = img.height() as f32 * spacing.1;
    let scale = TARGET_SIZE / phys_w.max(phys_h);
    let w = ((phys_w * scale).round() as u32).max(1);
    let h = ((phys_h * scale).round() as u32).max(1);
    imageops::resize(img, w, h, FilterType::Nearest)
}

fn encode_png(img: &RgbImage) -> Result<String> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(STANDARD.encode(buf.into_inner()))
}

/// 画像とマスクから全断面のスナップショットを作る
pub fn render_volume(
    image: &Volume,
    mask: &Mask,
    options: &RenderOptions,
) -> Result<Vec<PlaneSnapshots>> {
    if image.shape() != mask.shape() {
        return Err(QcError::ShapeMismatch {
            image: image.shape(),
            mask: mask.shape(),
        });
    }
    if options.n_slices == 0 {
        return Err(QcError::Render("n_slices は 1 以上が必要です".into()));
    }
    let crop = mask
        .padded_bounding_box(options.boundary_mm)
        .ok_or(QcError::EmptyMask)?;

    let image = image.crop(&crop);
    let mask = mask.crop(&crop);
    let extent = mask.bounding_box().ok_or(QcError::EmptyMask)?;

    let (lo, hi) = WINDOW_PERCENTILES;
    let window = IntensityWindow::from_percentiles(image.data().iter().copied(), lo, hi);
    let voxel_mm = image.voxel_mm();

    let mut planes = Vec::with_capacity(Plane::ALL.len());
    for plane in Plane::ALL {
        let axis = plane.normal_axis();
        let (h_axis, v_axis) = plane.in_plane_axes();
        let spacing = (voxel_mm[h_axis], voxel_mm[v_axis]);

        let mut snapshots = Vec::with_capacity(options.n_slices);
        for idx in slice_positions(extent[axis].0, extent[axis].1, options.n_slices) {
            let img_slice = image.data().index_axis(Axis(axis), idx);
            let mask_slice = mask.data().index_axis(Axis(axis), idx);

            let plain = slice_to_image(&img_slice, None, &window);
            let overlay = slice_to_image(&img_slice, Some(&mask_slice), &window);

            snapshots.push(Snapshot {
                index: crop[axis].0 + idx,
                plain: encode_png(&resize_to_square_pixels(&plain, spacing))?,
                overlay: encode_png(&resize_to_square_pixels(&overlay, spacing))?,
            });
        }
        planes.push(PlaneSnapshots { plane, snapshots });
    }

    Ok(planes)
}
