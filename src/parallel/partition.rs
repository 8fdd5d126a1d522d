//! Round-robin sharding of the job list.
//!
//! Job `i` goes to shard `i mod N`, with `N = min(limit, jobs)`. Order inside a
//! shard follows the original list. No size balancing is attempted.

use crate::job::Job;

/// Ordered subset of jobs handled by one worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shard {
    pub index: usize,
    pub jobs: Vec<Job>,
}

/// Number of workers actually spawned for `job_count` jobs
pub fn effective_workers(limit: usize, job_count: usize) -> usize {
    limit.max(1).min(job_count)
}

/// Split `jobs` into round-robin shards; empty input yields no shards
pub fn partition(jobs: Vec<Job>, limit: usize) -> Vec<Shard> {
    let workers = effective_workers(limit, jobs.len());
    let mut shards: Vec<Shard> = (0..workers)
        .map(|index| Shard {
            index,
            jobs: Vec::with_capacity(jobs.len() / workers + 1),
        })
        .collect();

    for (i, job) in jobs.into_iter().enumerate() {
        shards[i % workers].jobs.push(job);
    }

    shards
}
