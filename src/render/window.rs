/// 表示用の輝度窓。下限以下は黒、上限以上は白。
///
/// MRI は CT のような絶対値を持たないので、窓は画像ごとに百分位数から決める。
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntensityWindow {
    lower: f32,
    upper: f32,
}

impl IntensityWindow {
    /// `lower < upper` で、両方とも有限値でなければ `None`.
    pub fn new(lower: f32, upper: f32) -> Option<Self> {
        if lower.is_finite() && upper.is_finite() && lower < upper {
            Some(Self { lower, upper })
        } else {
            None
        }
    }

    /// `values` の `low_pct`〜`high_pct` 百分位数（0〜100）から窓を作る。
    ///
    /// 有限値がない、または一定値の場合は幅 1 の窓になる。
    pub fn from_percentiles<I: IntoIterator<Item = f32>>(
        values: I,
        low_pct: f32,
        high_pct: f32,
    ) -> Self {
        let mut sorted: Vec<f32> = values.into_iter().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return Self {
                lower: 0.0,
                upper: 1.0,
            };
        }
        sorted.sort_by(|a, b| a.total_cmp(b));

        let at = |pct: f32| {
            let pos = (pct.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f32;
            sorted[pos.round() as usize]
        };
        let lower = at(low_pct);
        let upper = at(high_pct);
        Self::new(lower, upper).unwrap_or(Self {
            lower,
            upper: lower + 1.0,
        })
    }

    #[inline]
    pub fn lower(&self) -> f32 {
        self.lower
    }

    #[inline]
    pub fn upper(&self) -> f32 {
        self.upper
    }

    /// 0..=255 の灰色値。NaN は黒。
    pub fn eval(&self, value: f32) -> u8 {
        if !value.is_finite() || value <= self.lower {
            u8::MIN
        } else if value >= self.upper {
            u8::MAX
        } else {
            // 255, not 256.
            (((value - self.lower) / (self.upper - self.lower)) * 255.0) as u8
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_window() {
        assert!(IntensityWindow::new(1.0, 1.0).is_none());
        assert!(IntensityWindow::new(2.0, 1.0).is_none());
        assert!(IntensityWindow::new(f32::NAN, 1.0).is_none());
    }

    #[test]
    fn test_eval() {
        let w = IntensityWindow::new(100.0, 200.0).unwrap();
        assert_eq!(w.eval(f32::NAN), 0);
        assert_eq!(w.eval(50.0), 0);
        assert_eq!(w.eval(100.0), 0);
        assert_eq!(w.eval(150.0), (255.0 * 0.5) as u8);
        assert_eq!(w.eval(200.0), 255);
        assert_eq!(w.eval(1e9), 255);
    }

    #[test]
    fn test_percentiles() {
        let values = (0..=100).map(|v| v as f32);
        let w = IntensityWindow::from_percentiles(values, 10.0, 90.0);
        assert_eq!(w.lower(), 10.0);
        assert_eq!(w.upper(), 90.0);
    }

    #[test]
    fn test_constant_image_gets_unit_width() {
        let w = IntensityWindow::from_percentiles(vec![5.0; 20], 0.5, 99.5);
        assert_eq!(w.lower(), 5.0);
        assert_eq!(w.upper(), 6.0);
    }

    #[test]
    fn test_non_finite_values_ignored() {
        let w = IntensityWindow::from_percentiles(vec![f32::NAN, f32::INFINITY], 0.0, 100.0);
        assert_eq!((w.lower(), w.upper()), (0.0, 1.0));
    }
}
