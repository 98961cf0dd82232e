//! OODスコアの色エンコードモジュール
//!
//! スコアを[min,max]で正規化し、異常側を赤、分布内側を緑に寄せた
//! 半透明ティントへ写像する。描画側でカードの背景色として使う。

/// カード背景用の半透明ティント
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OodTint {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl OodTint {
    /// CSS互換の`rgba(...)`文字列
    pub fn to_css(&self) -> String {
        format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }
}

/// OODスコアをティントへ変換する純関数
///
/// - `normalized` が大きい（分布外）ほど赤が強くなる
/// - `proximity = 1 - normalized` が大きい（分布内）ほど緑が強くなる
/// - `min == max` の退化レンジは `normalized = 0` として扱う（ゼロ除算回避）
pub fn colorize(score: f64, min: f64, max: f64) -> OodTint {
    let range = max - min;
    let normalized = if range.abs() < f64::EPSILON {
        0.0
    } else {
        ((score - min) / range).clamp(0.0, 1.0)
    };
    let proximity = 1.0 - normalized;

    OodTint {
        r: (255.0 * normalized).round() as u8,
        g: (180.0 * proximity + 75.0 * normalized).round() as u8,
        b: 120,
        a: 0.15,
    }
}
