//! シード固定シャッフル
//!
//! 同じシードなら実装言語に依らず同じ並びを再現できるよう、
//! 生成器・範囲抽出・シャッフル手順をすべて固定している。
//!
//! 1. 生成器: `ChaCha8Rng::seed_from_u64(seed)`（rand_core 0.6 の PCG32 によるシード展開）
//! 2. 範囲抽出 `below(n)`: `x = next_u64()`、`r = 2^64 mod n` として
//!    `x <= u64::MAX - r` なら `x % n`、そうでなければ引き直す
//! 3. Fisher–Yates: `i = len-1 ..= 1` の降順に `j = below(i + 1)` と交換
//! 4. 段階ごとのストリーム: 匿名化・マニフェスト順・評価者割り当ては
//!    同じシードの別ストリーム（`ChaCha8Rng::set_stream`）を使う

use rand_chacha::ChaCha8Rng;
use rand_core::{RngCore, SeedableRng};

/// 匿名ラベルの割り当て
pub const STREAM_ANONYMIZE: u64 = 1;
/// マニフェスト行の並べ替え
pub const STREAM_MANIFEST_ORDER: u64 = 2;
/// 評価者への割り当て
pub const STREAM_ASSIGNMENT: u64 = 3;

/// シード固定のシャッフラー。呼び出しをまたいで乱数列は継続する。
#[derive(Debug, Clone)]
pub struct SeededShuffler {
    rng: ChaCha8Rng,
}

impl SeededShuffler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// 指定ストリームから始める。ストリームが違えば同じシードでも独立した列になる。
    pub fn with_stream(seed: u64, stream: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(stream);
        Self { rng }
    }

    /// `[0, bound)` の一様な整数。`bound` は 1 以上。
    pub fn below(&mut self, bound: u64) -> u64 {
        assert!(bound > 0, "bound must be positive");
        // 2^64 mod bound
        let rem = (u64::MAX % bound + 1) % bound;
        loop {
            let x = self.rng.next_u64();
            if x <= u64::MAX - rem {
                return x % bound;
            }
        }
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.below(i as u64 + 1) as usize;
            items.swap(i, j);
        }
    }

    /// `0..len` の置換を返す
    pub fn permutation(&mut self, len: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..len).collect();
        self.shuffle(&mut indices);
        indices
    }
}
