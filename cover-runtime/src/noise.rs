//! # Noise 模块
//!
//! 带种子的二维值噪声（value noise），用于抖动效果。
//!
//! 晶格点上的值由 SplitMix64 哈希得到，格内用五次平滑插值混合，
//! 结果连续、平滑，且同一种子下完全确定。输出范围为 [0, 1]。

/// SplitMix64 一步
fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// 五次平滑（6t⁵ - 15t⁴ + 10t³）
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// 二维值噪声
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueNoise2D {
    seed: u64,
}

impl ValueNoise2D {
    /// 创建噪声源
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// 种子
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// 晶格点的值，范围 [0, 1)
    fn lattice(&self, ix: i64, iy: i64) -> f32 {
        let h = splitmix64(
            self.seed
                ^ (ix as u64).wrapping_mul(0xD6E8_FEB8_6659_FD93)
                ^ (iy as u64).wrapping_mul(0xA076_1D64_78BD_642F),
        );
        // 取高 24 位，保证在 f32 中精确
        (h >> 40) as f32 / (1u64 << 24) as f32
    }

    /// 采样，范围 [0, 1]
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let x0 = x.floor();
        let y0 = y.floor();
        let tx = fade(x - x0);
        let ty = fade(y - y0);
        let ix = x0 as i64;
        let iy = y0 as i64;

        let v00 = self.lattice(ix, iy);
        let v10 = self.lattice(ix + 1, iy);
        let v01 = self.lattice(ix, iy + 1);
        let v11 = self.lattice(ix + 1, iy + 1);

        let a = v00 + (v10 - v00) * tx;
        let b = v01 + (v11 - v01) * tx;
        (a + (b - a) * ty).clamp(0.0, 1.0)
    }

    /// 采样并重映射到 [-1, 1]
    pub fn sample_signed(&self, x: f32, y: f32) -> f32 {
        self.sample(x, y) * 2.0 - 1.0
    }
}
