use std::ops::Range;

/// Partition of input and output channels into equal-sized groups.
///
/// Weight tensors store input channels group-relative: the weight depth index
/// for absolute input channel `i` is `i - in_range(group_of(i)).start`. Both
/// the loader and the kernels go through this type for that translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupLayout {
    pub group: usize,
    pub in_per_group: usize,
    pub out_per_group: usize,
}

impl GroupLayout {
    /// Caller guarantees both channel counts divide evenly by `group`.
    pub fn new(in_channels: usize, out_channels: usize, group: usize) -> Self {
        debug_assert!(group > 0 && in_channels % group == 0 && out_channels % group == 0);
        GroupLayout {
            group,
            in_per_group: in_channels / group,
            out_per_group: out_channels / group,
        }
    }

    /// Absolute input channel -> (group id, group-relative index).
    #[inline(always)]
    pub fn locate(&self, absolute: usize) -> (usize, usize) {
        (absolute / self.in_per_group, absolute % self.in_per_group)
    }

    /// Group that owns an absolute output channel.
    #[inline(always)]
    pub fn group_of_output(&self, oc: usize) -> usize {
        oc / self.out_per_group
    }

    pub fn in_range(&self, g: usize) -> Range<usize> {
        g * self.in_per_group..(g + 1) * self.in_per_group
    }

    pub fn out_range(&self, g: usize) -> Range<usize> {
        g * self.out_per_group..(g + 1) * self.out_per_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_is_group_relative() {
        let l = GroupLayout::new(12, 6, 3);
        assert_eq!(l.locate(0), (0, 0));
        assert_eq!(l.locate(3), (0, 3));
        assert_eq!(l.locate(4), (1, 0));
        assert_eq!(l.locate(11), (2, 3));
    }

    #[test]
    fn locate_inverts_ranges() {
        let l = GroupLayout::new(8, 4, 2);
        for g in 0..l.group {
            for (rel, abs) in l.in_range(g).enumerate() {
                assert_eq!(l.locate(abs), (g, rel));
            }
        }
    }

    #[test]
    fn output_ranges_partition_channels() {
        let l = GroupLayout::new(4, 6, 2);
        assert_eq!(l.out_range(0), 0..3);
        assert_eq!(l.out_range(1), 3..6);
        assert_eq!(l.group_of_output(2), 0);
        assert_eq!(l.group_of_output(3), 1);
    }

    #[test]
    fn single_group_is_identity() {
        let l = GroupLayout::new(5, 7, 1);
        assert_eq!(l.locate(4), (0, 4));
        assert_eq!(l.in_range(0), 0..5);
    }
}
