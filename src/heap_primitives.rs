// Index arithmetic for implicit d-ary heaps.
//
// A heap keeps every subtree's root ranked no worse than the rest of the
// subtree. Laid out on an array, a node at `i` has its children in the
// contiguous range `[D*i + 1, D*(i + 1)]`. For `D = 4`,
//
// ```text
//                                   0
//          1              2                    3                  4
//   5  6  7  8     9 10 11 12          13 14 15 16        17 18 19 20
// ```
//
// The last level is usually incomplete.

/// The parent of a non-root node
///
/// ```
/// use route_search::heap_primitives::index_parent;
/// assert_eq!(index_parent::<2>(1), 0);
/// assert_eq!(index_parent::<2>(2), 0);
/// assert_eq!(index_parent::<2>(25), 12);
/// assert_eq!(index_parent::<4>(4), 0);
/// assert_eq!(index_parent::<4>(5), 1);
/// assert_eq!(index_parent::<4>(20), 4);
/// ```
#[inline(always)]
#[must_use]
pub fn index_parent<const D: usize>(i: usize) -> usize {
    debug_assert!(i > 0, "The root has no parent");
    (i - 1) / D
}

/// The first (left-most) child
///
/// ```
/// use route_search::heap_primitives::index_first_child;
/// assert_eq!(index_first_child::<2>(0), 1);
/// assert_eq!(index_first_child::<2>(11), 23);
/// assert_eq!(index_first_child::<4>(0), 1);
/// assert_eq!(index_first_child::<4>(1), 5);
/// assert_eq!(index_first_child::<4>(4), 17);
/// ```
#[inline(always)]
#[must_use]
pub fn index_first_child<const D: usize>(i: usize) -> usize {
    (D * i) + 1
}

/// One past the last (right-most) child, clamped to `len`
///
/// ```
/// use route_search::heap_primitives::index_children_end;
/// assert_eq!(index_children_end::<4>(0, 100), 5);
/// assert_eq!(index_children_end::<4>(1, 100), 9);
/// assert_eq!(index_children_end::<4>(1, 7), 7);
/// assert_eq!(index_children_end::<2>(6, 100), 15);
/// ```
#[inline(always)]
#[must_use]
pub fn index_children_end<const D: usize>(i: usize, len: usize) -> usize {
    std::cmp::min(D * (i + 1) + 1, len)
}
