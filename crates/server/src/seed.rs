//! Built-in puzzles, so the server is playable without an external store.

use nonet::MemoryStore;

const CLASSIC_GIVENS: &str = "\
    u5 u3 0 0 u7 0 0 0 0 \
    u6 0 0 u1 u9 u5 0 0 0 \
    0 u9 u8 0 0 0 0 u6 0 \
    u8 0 0 0 u6 0 0 0 u3 \
    u4 0 0 u8 0 u3 0 0 u1 \
    u7 0 0 0 u2 0 0 0 u6 \
    0 u6 0 0 0 0 u2 u8 0 \
    0 0 0 u4 u1 u9 0 0 u5 \
    0 0 0 0 u8 0 0 u7 u9";

const CLASSIC_SOLUTION: &str = "\
    u5 u3 u4 u6 u7 u8 u9 u1 u2 \
    u6 u7 u2 u1 u9 u5 u3 u4 u8 \
    u1 u9 u8 u3 u4 u2 u5 u6 u7 \
    u8 u5 u9 u7 u6 u1 u4 u2 u3 \
    u4 u2 u6 u8 u5 u3 u7 u9 u1 \
    u7 u1 u3 u9 u2 u4 u8 u5 u6 \
    u9 u6 u1 u5 u3 u7 u2 u8 u4 \
    u2 u8 u7 u4 u1 u9 u6 u3 u5 \
    u3 u4 u5 u2 u8 u6 u1 u7 u9";

// Same solution with the first and last rows blanked out of the given mask.
const SPARSE_GIVENS: &str = "\
    0 0 0 0 0 0 0 0 0 \
    u6 0 0 u1 u9 u5 0 0 0 \
    0 u9 u8 0 0 0 0 u6 0 \
    u8 0 0 0 u6 0 0 0 u3 \
    u4 0 0 u8 0 u3 0 0 u1 \
    u7 0 0 0 u2 0 0 0 u6 \
    0 u6 0 0 0 0 u2 u8 0 \
    0 0 0 u4 u1 u9 0 0 u5 \
    0 0 0 0 0 0 0 0 0";

pub fn populate(store: &MemoryStore) {
    store.insert_puzzle(1, "Daily Classic", "medium", CLASSIC_GIVENS, CLASSIC_SOLUTION);
    store.insert_puzzle(2, "Evening Challenge", "hard", SPARSE_GIVENS, CLASSIC_SOLUTION);
}
