use super::{KernelArgs, Resources};

/// Single work item: turn the tile counter into the next level's record.
/// The leaf level has no next level.
pub(super) fn derive(res: &Resources<'_>, args: &KernelArgs) {
  if args.level >= res.layout.max_level {
    return;
  }
  let current = res.nodes.params(args.level);
  let next = current.next_level(res.nodes.tiles().allocated());
  res.nodes.store_params(args.level + 1, next);
}
