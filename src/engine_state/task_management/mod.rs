//! # Task Management System
//!
//! This module provides the worker pool that runs chunk population, modification
//! routing, mesh building and saving off the frame thread.
//!
//! ## Architecture Overview
//!
//! The task management system consists of several key components:
//! - `TaskManager`: Central coordinator for task distribution and worker management
//! - `Task`: A unit of work that can be executed asynchronously
//! - `TaskResult`: The result of a completed task, which can spawn additional tasks
//! - `TaskChannel`: Communication channel between the frame thread and one worker
//!
//! ## Execution Modes
//!
//! ### Threaded
//! - A fixed pool of `std::thread` workers, each with a dedicated channel
//! - Tasks are distributed round-robin, at most `MAX_TASKS_IN_FLIGHT` per worker
//! - Shutdown is a message: each worker finishes its current task, reads the
//!   `Shutdown` message and exits, so no task is interrupted mid-mutation
//!
//! ### Inline
//! - With zero workers, queued tasks run on the frame thread inside
//!   `process_queued_tasks()` and their results are handled in the same frame by
//!   `process_completed_tasks()`
//!
//! ## Task Lifecycle
//! 1. Tasks are created and published via `TaskManager::publish_task()`
//! 2. The manager hands tasks to free workers, queueing the rest
//! 3. Workers process tasks and return results
//! 4. Results are processed on the frame thread in `process_completed_tasks()`
//! 5. Results can spawn new tasks, which are published in turn
//!
//! ## Failure Handling
//! A panicking task is caught on its worker and reported as a failed task of its
//! kind; the worker keeps serving.
//!
//! ## Example Usage
//! ```ignore
//! let mut task_manager = TaskManager::new(settings.effective_worker_count());
//!
//! task_manager.publish_task(Box::new(ChunkPopulationTask::new(world.clone(), coord)));
//!
//! // once per frame:
//! task_manager.process_queued_tasks();
//! task_manager.process_completed_tasks(&world);
//! ```

pub mod task;

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{error, info, warn};

use task::{Task, TaskKind, TaskResult};

use super::voxels::world::World;

/// Messages sent from the frame thread to a worker.
enum WorkerMessage {
    Run(Box<dyn Task + Send>),
    Shutdown,
}

/// Messages sent from a worker back to the frame thread.
enum WorkerReply {
    Completed(TaskKind, Box<dyn TaskResult + Send>),
    Panicked(TaskKind),
}

/// A communication channel between the frame thread and a worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks from the frame thread to the worker
/// - `result_receiver`: Receives task results from the worker
/// - `num_tasks_in_flight`: Tracks number of tasks currently being processed
/// - `worker`: Handle to the worker thread, joined on shutdown
struct TaskChannel {
    task_sender: Sender<WorkerMessage>,
    result_receiver: Receiver<WorkerReply>,
    num_tasks_in_flight: usize,
    worker: Option<JoinHandle<()>>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// # Fields
/// - `channels`: Set of active worker channels; empty in inline mode
/// - `queued_tasks`: Tasks waiting for an available worker
/// - `current_channel`: Index for round-robin scheduling
/// - `inline_results`: Results of tasks run on the frame thread
/// - `pending`: Published but not yet handled tasks, per kind
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task + Send>>,
    current_channel: usize,
    inline_results: Vec<WorkerReply>,
    pending: [usize; TaskKind::ALL.len()],
}

/// Maximum number of tasks that can be in flight per worker channel.
///
/// This is set to 1 so a busy worker never holds a backlog while another sits idle.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

fn run_task(task: &dyn Task) -> WorkerReply {
    let kind = task.kind();
    match catch_unwind(AssertUnwindSafe(|| task.process())) {
        Ok(result) => WorkerReply::Completed(kind, result),
        Err(_) => WorkerReply::Panicked(kind),
    }
}

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to create; 0 runs every task inline
    ///
    /// Workers that fail to spawn are skipped. If none start, the manager runs inline.
    pub fn new(num_workers: usize) -> Self {
        let mut channels = Vec::with_capacity(num_workers);

        for index in 0..num_workers {
            let (task_tx, task_rx) = channel::<WorkerMessage>();
            let (result_tx, result_rx) = channel::<WorkerReply>();

            let task_closure = move || {
                while let Ok(WorkerMessage::Run(task)) = task_rx.recv() {
                    if result_tx.send(run_task(task.as_ref())).is_err() {
                        break;
                    }
                }
            };

            match thread::Builder::new()
                .name(format!("voxel-worker-{index}"))
                .spawn(task_closure)
            {
                Ok(worker) => channels.push(TaskChannel {
                    task_sender: task_tx,
                    result_receiver: result_rx,
                    num_tasks_in_flight: 0,
                    worker: Some(worker),
                }),
                Err(err) => error!("Failed to spawn worker {index}: {err}"),
            }
        }

        if channels.is_empty() {
            info!("Task manager running inline");
        } else {
            info!("Task manager started {} worker(s)", channels.len());
        }

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
            inline_results: Vec::new(),
            pending: [0; TaskKind::ALL.len()],
        }
    }

    /// Returns true if tasks run on the frame thread.
    pub fn is_inline(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of workers.
    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }

    /// Published tasks of `kind` whose results have not been handled yet.
    pub fn pending(&self, kind: TaskKind) -> usize {
        self.pending[kind.slot()]
    }

    /// Returns true when no task of any kind is queued, running, or awaiting handling.
    pub fn is_idle(&self) -> bool {
        self.pending.iter().all(|count| *count == 0)
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was sent
    /// - `Err(task)` if the worker has disconnected
    fn try_send_task(
        &mut self,
        task: Box<dyn Task + Send>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task + Send>> {
        match self.channels[channel_idx]
            .task_sender
            .send(WorkerMessage::Run(task))
        {
            Ok(_) => {
                self.channels[channel_idx].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(message) => match message.0 {
                WorkerMessage::Run(task) => Err(task),
                WorkerMessage::Shutdown => unreachable!("only Run messages are sent here"),
            },
        }
    }

    /// Finds a worker channel that can accept a new task, round-robin from the last one
    /// used.
    fn find_available_channel(&self) -> Option<usize> {
        let count = self.channels.len();
        (0..count)
            .map(|step| (self.current_channel + step) % count)
            .find(|idx| self.channels[*idx].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT)
    }

    /// Publishes a new task for execution.
    ///
    /// # Returns
    /// - `true` if the task was immediately handed to a worker
    /// - `false` if the task was queued (all workers busy, or inline mode)
    pub fn publish_task(&mut self, task: Box<dyn Task + Send>) -> bool {
        self.pending[task.kind().slot()] += 1;

        match self.find_available_channel() {
            Some(channel_idx) => match self.try_send_task(task, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    true
                }
                Err(task) => {
                    self.queued_tasks.push_back(task);
                    false
                }
            },
            None => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Hands queued tasks to free workers, or runs them all in inline mode.
    ///
    /// Tasks are taken oldest first. In inline mode, tasks published by results
    /// handled later in the frame wait for the next call.
    pub fn process_queued_tasks(&mut self) {
        if self.queued_tasks.is_empty() {
            return;
        }

        if self.is_inline() {
            while let Some(task) = self.queued_tasks.pop_front() {
                let reply = run_task(task.as_ref());
                self.inline_results.push(reply);
            }
            return;
        }

        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                break;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => {
                    // Channel is disconnected, put task back and stop processing
                    self.queued_tasks.push_front(task);
                    break;
                }
            }
        }
    }

    /// Handles every completed task result on the frame thread.
    ///
    /// # Arguments
    /// * `world` - The world passed to each result
    ///
    /// Follow-up tasks are published after all available results are handled.
    pub fn process_completed_tasks(&mut self, world: &Arc<World>) {
        let mut replies = std::mem::take(&mut self.inline_results);
        for channel in &mut self.channels {
            while let Ok(reply) = channel.result_receiver.try_recv() {
                channel.num_tasks_in_flight -= 1;
                replies.push(reply);
            }
        }

        let mut tasks_to_queue = Vec::new();
        for reply in replies {
            match reply {
                WorkerReply::Completed(kind, result) => {
                    self.pending[kind.slot()] -= 1;
                    tasks_to_queue.extend(result.handle_result(world));
                }
                WorkerReply::Panicked(kind) => {
                    self.pending[kind.slot()] -= 1;
                    error!("A {kind:?} task panicked; its work was dropped");
                }
            }
        }

        for task in tasks_to_queue {
            self.publish_task(task);
        }
    }

    /// Stops every worker and joins it.
    ///
    /// Each worker finishes the task it is running first. Queued tasks are dropped.
    pub fn shutdown(&mut self) {
        if !self.queued_tasks.is_empty() {
            warn!(
                "Dropping {} queued task(s) at shutdown",
                self.queued_tasks.len()
            );
            self.queued_tasks.clear();
        }

        for channel in &self.channels {
            let _ = channel.task_sender.send(WorkerMessage::Shutdown);
        }
        let mut stopped = 0;
        for channel in &mut self.channels {
            if let Some(worker) = channel.worker.take() {
                if worker.join().is_err() {
                    error!("A worker thread panicked during shutdown");
                }
                stopped += 1;
            }
        }
        if stopped > 0 {
            info!("Stopped {stopped} worker(s)");
        }
        self.channels.clear();
        self.inline_results.clear();
        self.pending = [0; TaskKind::ALL.len()];
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::world::test_support::flat_world;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingTask {
        counter: Arc<AtomicUsize>,
        follow_ups: usize,
    }

    impl Task for CountingTask {
        fn kind(&self) -> TaskKind {
            TaskKind::ChunkMesh
        }

        fn process(&self) -> Box<dyn TaskResult + Send> {
            self.counter.fetch_add(1, Ordering::SeqCst);
            Box::new(CountingResult {
                counter: self.counter.clone(),
                follow_ups: self.follow_ups,
            })
        }
    }

    struct CountingResult {
        counter: Arc<AtomicUsize>,
        follow_ups: usize,
    }

    impl TaskResult for CountingResult {
        fn handle_result(self: Box<Self>, _world: &Arc<World>) -> Vec<Box<dyn Task + Send>> {
            (0..self.follow_ups)
                .map(|_| {
                    Box::new(CountingTask {
                        counter: self.counter.clone(),
                        follow_ups: 0,
                    }) as Box<dyn Task + Send>
                })
                .collect()
        }
    }

    struct PanickingTask;

    impl Task for PanickingTask {
        fn kind(&self) -> TaskKind {
            TaskKind::WorldSave
        }

        fn process(&self) -> Box<dyn TaskResult + Send> {
            panic!("task failure under test");
        }
    }

    fn drain(task_manager: &mut TaskManager, world: &Arc<World>) {
        for _ in 0..10_000 {
            task_manager.process_queued_tasks();
            task_manager.process_completed_tasks(world);
            if task_manager.is_idle() {
                return;
            }
            thread::sleep(std::time::Duration::from_millis(1));
        }
        panic!("task manager never became idle");
    }

    #[test]
    fn runs_tasks_and_follow_ups_in_both_modes() {
        let world = Arc::new(flat_world());
        for workers in [0, 3] {
            let mut task_manager = TaskManager::new(workers);
            assert_eq!(task_manager.is_inline(), workers == 0);

            let counter = Arc::new(AtomicUsize::new(0));
            for _ in 0..5 {
                task_manager.publish_task(Box::new(CountingTask {
                    counter: counter.clone(),
                    follow_ups: 2,
                }));
            }
            assert_eq!(task_manager.pending(TaskKind::ChunkMesh), 5);

            drain(&mut task_manager, &world);
            assert_eq!(counter.load(Ordering::SeqCst), 15);
            task_manager.shutdown();
        }
    }

    #[test]
    fn panicking_task_is_reported_and_worker_survives() {
        let world = Arc::new(flat_world());
        let mut task_manager = TaskManager::new(1);
        let counter = Arc::new(AtomicUsize::new(0));

        task_manager.publish_task(Box::new(PanickingTask));
        task_manager.publish_task(Box::new(CountingTask {
            counter: counter.clone(),
            follow_ups: 0,
        }));
        drain(&mut task_manager, &world);

        assert_eq!(task_manager.pending(TaskKind::WorldSave), 0);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
