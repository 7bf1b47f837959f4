//! Image stacks for intersection coverage.
//!
//! A stack groups images that stand in for one virtual image, such as the
//! frames of an exposure bracket. Under intersection coverage a pixel counts
//! when every stack has at least one member covering it.

use crate::error::{Error, Result};

/// Indices into the footprint list that form one stack.
pub type Stack = Vec<usize>;

/// Group images by a per-image stack id.
///
/// Images sharing an id form one stack. Stacks are ordered by the first
/// image that carries their id, members keep their image order.
pub fn stacks_from_groups(group_of_image: &[usize]) -> Vec<Stack> {
    let mut group_ids: Vec<usize> = Vec::new();
    let mut stacks: Vec<Stack> = Vec::new();

    for (image, &group) in group_of_image.iter().enumerate() {
        match group_ids.iter().position(|&id| id == group) {
            Some(slot) => stacks[slot].push(image),
            None => {
                group_ids.push(group);
                stacks.push(vec![image]);
            }
        }
    }

    stacks
}

/// One singleton stack per image.
pub fn singleton_stacks(image_count: usize) -> Vec<Stack> {
    (0..image_count).map(|image| vec![image]).collect()
}

/// Check that every stack member names an existing image.
pub(crate) fn validate_stacks(stacks: &[Stack], image_count: usize) -> Result<()> {
    for (stack_index, stack) in stacks.iter().enumerate() {
        if let Some(&member) = stack.iter().find(|&&member| member >= image_count) {
            return Err(Error::StackMemberOutOfRange {
                stack: stack_index,
                member,
                image_count,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_by_first_appearance() {
        let stacks = stacks_from_groups(&[7, 3, 7, 3, 9]);
        assert_eq!(stacks, vec![vec![0, 2], vec![1, 3], vec![4]]);
    }

    #[test]
    fn test_no_images_no_stacks() {
        assert!(stacks_from_groups(&[]).is_empty());
        assert!(singleton_stacks(0).is_empty());
    }

    #[test]
    fn test_singletons() {
        assert_eq!(singleton_stacks(3), vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn test_validate_rejects_unknown_member() {
        let stacks = vec![vec![0, 1], vec![2, 5]];
        assert_eq!(
            validate_stacks(&stacks, 3),
            Err(Error::StackMemberOutOfRange {
                stack: 1,
                member: 5,
                image_count: 3,
            })
        );
        assert_eq!(validate_stacks(&stacks, 6), Ok(()));
    }
}
