//! Crawl tasks and the arena that owns them.

use std::collections::VecDeque;

use url::Url;

use crate::extract::LinkHint;

/// Index of a task in its [`TaskArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(usize);

/// One URL to visit. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// Arena id.
    pub id: TaskId,
    /// URL to fetch.
    pub url: Url,
    /// Normalized form used for deduplication.
    pub normalized: String,
    /// Hops from the seed (seeds are depth 0).
    pub depth: u32,
    /// Page this URL was discovered on; `None` for seeds.
    pub origin: Option<Url>,
    /// Index of the seed this task descends from.
    pub seed: usize,
    /// Extractor hint; `None` for seeds.
    pub hint: Option<LinkHint>,
}

/// Append-only task storage plus the FIFO of pending ids.
#[derive(Debug, Default)]
pub struct TaskArena {
    tasks: Vec<CrawlTask>,
    pending: VecDeque<TaskId>,
}

impl TaskArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new task at the back of the queue and returns its id.
    pub fn push(
        &mut self,
        url: Url,
        normalized: String,
        depth: u32,
        origin: Option<Url>,
        seed: usize,
        hint: Option<LinkHint>,
    ) -> TaskId {
        let id = TaskId(self.tasks.len());
        self.tasks.push(CrawlTask {
            id,
            url,
            normalized,
            depth,
            origin,
            seed,
            hint,
        });
        self.pending.push_back(id);
        id
    }

    /// Takes the next pending task id, oldest first.
    pub fn pop(&mut self) -> Option<TaskId> {
        self.pending.pop_front()
    }

    /// Looks up a task.
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&CrawlTask> {
        self.tasks.get(id.0)
    }

    /// Tasks created so far (the progress total estimate).
    #[must_use]
    pub fn created(&self) -> usize {
        self.tasks.len()
    }

    /// Tasks still waiting in the queue.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_arena_is_fifo() {
        let mut arena = TaskArena::new();
        let a = arena.push(url("https://j.example/a"), "a".into(), 0, None, 0, None);
        let b = arena.push(url("https://j.example/b"), "b".into(), 0, None, 1, None);
        assert_eq!(arena.pop(), Some(a));
        assert_eq!(arena.pop(), Some(b));
        assert_eq!(arena.pop(), None);
    }

    #[test]
    fn test_arena_ids_grow_monotonically_and_stay_addressable() {
        let mut arena = TaskArena::new();
        let a = arena.push(url("https://j.example/a"), "a".into(), 0, None, 0, None);
        arena.pop();
        let b = arena.push(
            url("https://j.example/b"),
            "b".into(),
            1,
            Some(url("https://j.example/a")),
            0,
            Some(LinkHint::LikelyPage),
        );
        assert!(b > a);
        assert_eq!(arena.created(), 2);
        assert_eq!(arena.pending(), 1);
        assert_eq!(arena.get(a).unwrap().url.as_str(), "https://j.example/a");
        assert_eq!(arena.get(b).unwrap().depth, 1);
    }
}
