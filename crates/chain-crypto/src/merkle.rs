use crate::hash::Hash256;

/// Computes the binary Merkle root over a list of leaf hashes.
///
/// Pairs of adjacent hashes at each level are combined as
/// `SHA-256(left || right)`; a trailing odd element is carried to the next
/// level unchanged. An empty list hashes to `SHA-256("")`; a single-element
/// list's root is that element itself.
pub fn merkle_root(leaves: &[Hash256]) -> Hash256 {
    if leaves.is_empty() {
        return Hash256::digest(b"");
    }
    if leaves.len() == 1 {
        return leaves[0];
    }

    let mut level: Vec<Hash256> = leaves.to_vec();
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        let mut iter = level.chunks(2);
        while let Some(pair) = iter.next() {
            if pair.len() == 2 {
                next.push(Hash256::combine(&pair[0], &pair[1]));
            } else {
                next.push(pair[0]);
            }
        }
        level = next;
    }
    level[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_hashes_empty_string() {
        assert_eq!(merkle_root(&[]), Hash256::digest(b""));
    }

    #[test]
    fn single_leaf_is_root() {
        let h = Hash256::digest(b"tx");
        assert_eq!(merkle_root(&[h]), h);
    }

    #[test]
    fn odd_leaf_is_carried_unchanged() {
        let a = Hash256::digest(b"a");
        let b = Hash256::digest(b"b");
        let c = Hash256::digest(b"c");
        // level 1: [hash(a,b), c]  level 2: [hash(hash(a,b), c)]
        let expected = Hash256::combine(&Hash256::combine(&a, &b), &c);
        assert_eq!(merkle_root(&[a, b, c]), expected);
    }

    #[test]
    fn deterministic_across_calls() {
        let leaves: Vec<Hash256> = (0..7u8).map(|i| Hash256::digest(&[i])).collect();
        assert_eq!(merkle_root(&leaves), merkle_root(&leaves));
    }
}
