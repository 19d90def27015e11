// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// A minimal, zero-dependency, completely insecure PRNG for shuffling words
/// and picking distractors. Seed it explicitly to get reproducible sessions.
#[derive(Clone, Debug)]
pub struct TinyRng {
    state: u64,
}

const A: u64 = 6364136223846793005;
const C: u64 = 1442695040888963407;

impl TinyRng {
    /// Initialize the RNG from a seed.
    pub fn from_seed(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        let new = self.state.wrapping_mul(A).wrapping_add(C);
        self.state = new;
        (new >> 32) as u32
    }

    /// Generate a random number in the range [0, max). Draws that would
    /// favour the low end of the range are rejected.
    ///
    /// Panics if `max` is zero.
    pub fn generate(&mut self, max: u32) -> u32 {
        assert!(max > 0, "cannot generate a number in an empty range");
        // 2^32 mod max: the number of values at the bottom of the u32 range
        // that would make `% max` uneven.
        let threshold = max.wrapping_neg() % max;
        loop {
            let x = self.next_u32();
            if x >= threshold {
                return x % max;
            }
        }
    }

    /// An index in [0, len).
    pub fn index(&mut self, len: usize) -> usize {
        self.generate(len as u32) as usize
    }

    pub fn coin_flip(&mut self) -> bool {
        self.generate(2) == 0
    }
}

/// Fisher-Yates shuffle: every permutation is equally likely.
pub fn shuffle<T>(v: Vec<T>, rng: &mut TinyRng) -> Vec<T> {
    let mut v = v;
    for i in (1..v.len()).rev() {
        let j = rng.index(i + 1);
        v.swap(i, j);
    }
    v
}

/// Pick up to `count` elements uniformly at random, without replacement.
/// The order of the result is random too.
pub fn sample<T>(v: Vec<T>, count: usize, rng: &mut TinyRng) -> Vec<T> {
    let mut v = v;
    let count = count.min(v.len());
    // Partial Fisher-Yates: only the first `count` slots need settling.
    for i in 0..count {
        let j = i + rng.index(v.len() - i);
        v.swap(i, j);
    }
    v.truncate(count);
    v
}
