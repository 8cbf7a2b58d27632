pub mod task;

pub use task::{Roster, Task, TaskId, TaskState};
