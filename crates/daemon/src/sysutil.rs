// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin wrappers around `sysinfo` shared by the process registry and the
//! process tree supervisor: who's still alive, who descends from whom, and
//! what order to kill a tree in so a child is never signaled after its
//! parent has already been torn down.

use std::collections::{HashMap, HashSet};
use sysinfo::{Pid, ProcessStatus, ProcessesToUpdate, Signal, System};

/// Takes a fresh snapshot of every process on the system. Cheap enough to
/// call once per supervisor sweep; callers that only need a handful of
/// pids refreshed can use [`refresh_pids`] instead.
pub fn refreshed_system() -> System {
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::All, true);
    system
}

/// Refreshes only the given pids in an existing snapshot, for callers
/// polling a known set of processes repeatedly.
pub fn refresh_pids(system: &mut System, pids: &[u32]) {
    let ids: Vec<Pid> = pids.iter().map(|p| Pid::from_u32(*p)).collect();
    system.refresh_processes(ProcessesToUpdate::Some(&ids), true);
}

/// A zombie still has a `/proc` entry but will never respond to a signal,
/// so it counts as dead for our purposes.
pub fn is_alive(system: &System, pid: u32) -> bool {
    match system.process(Pid::from_u32(pid)) {
        None => false,
        Some(process) => !matches!(process.status(), ProcessStatus::Zombie),
    }
}

/// Walks every process on the system looking for ones whose parent chain
/// passes through `root_pid`. O(n) in the number of processes; fine at
/// supervisor sweep cadence, not meant for a hot loop.
pub fn descendants_of(system: &System, root_pid: u32) -> Vec<u32> {
    let root = Pid::from_u32(root_pid);
    let mut descendants = Vec::new();
    for (pid, process) in system.processes() {
        let mut current = process;
        loop {
            match current.parent() {
                Some(parent) if parent == root => {
                    descendants.push(pid.as_u32());
                    break;
                }
                Some(parent) => match system.process(parent) {
                    Some(next) => current = next,
                    None => break,
                },
                None => break,
            }
        }
    }
    descendants
}

/// Orders `pids` so a process always comes before any ancestor of it that's
/// also in the set, i.e. leaves first. Pids outside the parent chain (or
/// whose relationship to each other the snapshot doesn't capture) keep a
/// stable relative order at depth 0.
pub fn leaves_first(system: &System, pids: &[u32]) -> Vec<u32> {
    let set: HashSet<u32> = pids.iter().copied().collect();
    let mut depth: HashMap<u32, usize> = HashMap::new();

    for &pid in pids {
        let mut d = 0;
        let mut current = system.process(Pid::from_u32(pid));
        while let Some(process) = current {
            match process.parent() {
                Some(parent) if set.contains(&parent.as_u32()) => {
                    d += 1;
                    current = system.process(parent);
                }
                _ => break,
            }
        }
        depth.insert(pid, d);
    }

    let mut ordered = pids.to_vec();
    ordered.sort_by_key(|pid| std::cmp::Reverse(depth[pid]));
    ordered
}

/// Sends a signal to a pid if it's still present; silently a no-op if the
/// process has already exited, since that's not a failure for a kill.
pub fn send_signal(system: &System, pid: u32, signal: Signal) {
    if let Some(process) = system.process(Pid::from_u32(pid)) {
        process.kill_with(signal);
    }
}

#[cfg(test)]
#[path = "sysutil_tests.rs"]
mod tests;
