// Cross-season aggregation. Every function here is a pure fold over an
// explicit slice of season records: nothing is cached between calls, so
// re-running over the same seasons always yields the same output.

pub mod head_to_head;
pub mod identity;
pub mod managers;
pub mod overview;
